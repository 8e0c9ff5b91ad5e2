use sitewatch_core::AppError;

const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Configuration for the database connection pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// A private in-memory database, discarded with the pool.
    pub fn in_memory() -> Self {
        Self {
            url: IN_MEMORY_URL.into(),
            max_connections: 1,
        }
    }

    /// Read configuration from environment variables.
    ///
    /// - `DATABASE_URL` (optional, defaults to an in-memory database)
    /// - `DATABASE_MAX_CONNECTIONS` (optional, defaults to 5)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(
            std::env::var("DATABASE_URL").ok(),
            std::env::var("DATABASE_MAX_CONNECTIONS").ok(),
        )
    }

    fn from_vars(url: Option<String>, max_connections: Option<String>) -> Result<Self, AppError> {
        let url = url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| IN_MEMORY_URL.into());

        let max_connections = match max_connections {
            None => 5,
            Some(raw) => {
                let parsed: u32 = raw.trim().parse().map_err(|_| {
                    AppError::Config(format!(
                        "Invalid DATABASE_MAX_CONNECTIONS '{raw}': must be a positive integer"
                    ))
                })?;
                if parsed == 0 {
                    return Err(AppError::Config(
                        "DATABASE_MAX_CONNECTIONS must be at least 1".into(),
                    ));
                }
                parsed
            }
        };

        let mut config = Self {
            url,
            max_connections,
        };
        if config.is_in_memory() {
            config.max_connections = 1;
        }
        Ok(config)
    }

    /// Whether the URL names an in-memory SQLite database.
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("sqlite::memory:") || self.url.contains("mode=memory")
    }
}
