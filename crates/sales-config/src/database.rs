use std::env;

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    /// `host` or `host:port`
    pub host: String,
    pub name: String,
    pub disable_tls: bool,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            host: "localhost".to_string(),
            name: "postgres".to_string(),
            disable_tls: true,
            max_connections: 10,
        }
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            user: env::var("SALES_DB_USER").unwrap_or(defaults.user),
            password: env::var("SALES_DB_PASSWORD").unwrap_or(defaults.password),
            host: env::var("SALES_DB_HOST").unwrap_or(defaults.host),
            name: env::var("SALES_DB_NAME").unwrap_or(defaults.name),
            disable_tls: env::var("SALES_DB_DISABLE_TLS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.disable_tls),
            max_connections: env::var("SALES_DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_connections),
        }
    }

    /// Splits `host` into hostname and port, defaulting to 5432.
    pub fn host_and_port(&self) -> (&str, u16) {
        match self.host.rsplit_once(':') {
            Some((host, port)) => match port.parse() {
                Ok(port) => (host, port),
                Err(_) => (self.host.as_str(), 5432),
            },
            None => (self.host.as_str(), 5432),
        }
    }
}
