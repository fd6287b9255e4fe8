//! Server configuration from environment variables.

const DEFAULT_PORT: u16 = 4700;

/// Environment-derived settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `CADENZA_PORT`, defaults to 4700.
    pub port: u16,
    /// `CADENZA_ADMIN_PASS`. Admin signup is disabled when unset.
    pub admin_pass: Option<String>,
    /// `CADENZA_CREATOR_JOINS`: whether the creator is implicitly a
    /// participant of every occurrence.
    pub creator_joins: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("CADENZA_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let admin_pass = std::env::var("CADENZA_ADMIN_PASS")
            .ok()
            .filter(|p| !p.is_empty());
        let creator_joins = std::env::var("CADENZA_CREATOR_JOINS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        ServerConfig {
            port,
            admin_pass,
            creator_joins,
        }
    }
}
