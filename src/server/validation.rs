use uuid::Uuid;

use crate::server::response::ApiError;

const MIN_LOGIN_LEN: usize = 3;
const MAX_LOGIN_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_GAME_NAME_LEN: usize = 100;

pub const DEFAULT_REPLAY_LIMIT: i64 = 5;

/// Path identifiers are parsed before any store access; a malformed id
/// is a 400, never a 404.
pub fn parse_id(value: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value).map_err(|_| ApiError::bad_request(format!("invalid {what}")))
}

/// Caller-supplied list limit. Anything that is not a positive integer
/// is silently ignored in favor of the default.
#[must_use]
pub fn parse_limit(raw: Option<&str>) -> i64 {
    match raw.and_then(|s| s.parse::<i64>().ok()) {
        Some(limit) if limit > 0 => limit,
        _ => DEFAULT_REPLAY_LIMIT,
    }
}

pub fn validate_login(login: &str) -> Result<(), ApiError> {
    if login.len() < MIN_LOGIN_LEN {
        return Err(ApiError::bad_request(format!(
            "login must be at least {MIN_LOGIN_LEN} characters"
        )));
    }
    if login.len() > MAX_LOGIN_LEN {
        return Err(ApiError::bad_request(format!(
            "login cannot exceed {MAX_LOGIN_LEN} characters"
        )));
    }
    if login.contains(char::is_whitespace) {
        return Err(ApiError::bad_request("login cannot contain whitespace"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_game_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if name.len() > MAX_GAME_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "name cannot exceed {MAX_GAME_NAME_LEN} characters"
        )));
    }
    Ok(())
}
