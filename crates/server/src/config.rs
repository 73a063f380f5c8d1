use std::path::PathBuf;

pub const DEFAULT_MOVIES_PATH: &str = "movies.csv";
pub const DEFAULT_RATINGS_PATH: &str = "ratings.csv";
pub const DEFAULT_TCP_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8082";

/// Input files and listen addresses for one server process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub movies_path: PathBuf,
    pub ratings_path: PathBuf,
    /// Line protocol listener
    pub tcp_addr: String,
    /// HTTP facade listener
    pub http_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            movies_path: PathBuf::from(DEFAULT_MOVIES_PATH),
            ratings_path: PathBuf::from(DEFAULT_RATINGS_PATH),
            tcp_addr: DEFAULT_TCP_ADDR.to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_listeners_apart() {
        let config = ServerConfig::default();
        assert_eq!(config.tcp_addr, "0.0.0.0:8080");
        assert_eq!(config.http_addr, "0.0.0.0:8082");
        assert_ne!(config.tcp_addr, config.http_addr);
    }
}
