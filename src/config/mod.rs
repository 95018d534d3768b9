#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub username: String,
    pub password: String,
    pub server: String,
    pub port: u32,
    pub database: String,
}

impl AppConfig {
    /// Environment-driven configuration. `DATABASE_URL` wins over the
    /// individual `TABLES_*` variables when set.
    pub fn from_env() -> Self {
        let database = DatabaseConfig {
            username: env_or("TABLES_USERNAME", "crmuser"),
            password: env_or("TABLES_PASSWORD", ""),
            server: env_or("TABLES_SERVER", "localhost"),
            port: std::env::var("TABLES_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5432),
            database: env_or("TABLES_DATABASE", "crmserver"),
        };
        let server = ServerConfig {
            host: env_or("SERVER_HOST", "0.0.0.0"),
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        };
        Self { server, database }
    }

    pub fn database_url(&self) -> String {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            return url;
        }
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.database.username,
            self.database.password,
            self.database.server,
            self.database.port,
            self.database.database
        )
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
