use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Bound on any single logical store operation; expiry surfaces to callers
/// as a transient, retryable error.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub store_timeout: Duration,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("hashnexus.db")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}
