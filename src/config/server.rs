use std::net::SocketAddr;
use std::path::PathBuf;

use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Holds both the metadata database and the replay blob tree.
    pub data_dir: PathBuf,
    /// HS256 signing secret for session tokens. When absent an ephemeral
    /// secret is generated at startup and tokens die with the process.
    pub jwt_secret: Option<String>,
    /// Opt-in single-user mode: credential-less requests act as this
    /// tenant.
    pub default_tenant: Option<Uuid>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("replaydeck.db")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            jwt_secret: None,
            default_tenant: None,
        }
    }
}
