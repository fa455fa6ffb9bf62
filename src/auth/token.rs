use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Sessions live exactly this long from issuance. Expiry is the only
/// invalidation mechanism; there is no revocation list.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Tenant id the token is bound to.
    sub: String,
    exp: i64,
    iat: i64,
}

/// Issues and validates the signed session tokens (HS256).
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Signs a token binding `tenant` for the next [`TOKEN_TTL_HOURS`].
    pub fn issue(&self, tenant: Uuid) -> Result<String> {
        self.issue_at(tenant, Utc::now())
    }

    fn issue_at(&self, tenant: Uuid, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: tenant.to_string(),
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
            iat: issued_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| Error::Config(format!("failed to sign token: {e}")))
    }

    /// Resolves a token back to its tenant id. Malformed, tampered, and
    /// expired tokens all collapse into [`Error::InvalidToken`].
    pub fn validate(&self, token: &str) -> Result<Uuid> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| Error::InvalidToken)?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| Error::InvalidToken)
    }
}
