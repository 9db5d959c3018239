use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: Option<String>,
    pub token_key: String,
    pub token_ttl_secs: u64,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    /// Loads configuration from the environment. The signing secret is
    /// mandatory; a missing TOKEN_KEY fails startup rather than every request.
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let token_ttl = env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.trim_end_matches('m').parse::<u64>().ok())
            .unwrap_or(30);

        Ok(Config {
            database_url: env::var("DATABASE_URL").ok(),
            token_key: env::var("TOKEN_KEY")?,
            token_ttl_secs: token_ttl * 60,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        })
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}
