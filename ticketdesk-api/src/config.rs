/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct. Nothing reads the environment after
/// startup; the loaded [`Config`] travels in `AppState`.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `APP_ENV`: `development` or `production` (default: development)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_KEY`: Shared secret every API request must present (required)
/// - `RUN_MIGRATIONS`: Apply migrations at boot (default: true in development)
/// - `SEED_DATA`: Seed empty tables at boot (default: true)
///
/// # Example
///
/// ```no_run
/// use ticketdesk_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use std::{env, fmt, str::FromStr};

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Access gate configuration
    pub auth: AuthConfig,

    /// Boot-time database tasks
    pub startup: StartupConfig,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => anyhow::bail!("APP_ENV must be development or production, got {other}"),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    pub environment: Environment,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Access gate configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared secret expected in the `X-API-Key` header
    pub api_key: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Boot-time database tasks
#[derive(Debug, Clone, Copy)]
pub struct StartupConfig {
    pub run_migrations: bool,
    pub seed_data: bool,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// Reads a `.env` file first when one is present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `API_KEY` is missing
    /// - `API_KEY` is empty
    /// - A variable has an invalid value
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "API_PORT", 8080u16)?;

        let environment = match lookup("APP_ENV") {
            Some(value) => value.parse()?,
            None => Environment::Development,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;

        let api_key = lookup("API_KEY")
            .ok_or_else(|| anyhow::anyhow!("API_KEY environment variable is required"))?;
        if api_key.trim().is_empty() {
            anyhow::bail!("API_KEY must not be empty");
        }

        let run_migrations = parse_or(
            &lookup,
            "RUN_MIGRATIONS",
            environment == Environment::Development,
        )?;
        let seed_data = parse_or(&lookup, "SEED_DATA", true)?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                environment,
                cors_origins,
            },
            database: DatabaseConfig {
                url,
                max_connections,
            },
            auth: AuthConfig { api_key },
            startup: StartupConfig {
                run_migrations,
                seed_data,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn is_production(&self) -> bool {
        self.api.environment == Environment::Production
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {value}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgresql://localhost/ticketdesk"),
        ("API_KEY", "test-api-key"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.api.environment, Environment::Development);
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.auth.api_key, "test-api-key");
        assert!(config.startup.run_migrations);
        assert!(config.startup.seed_data);
        assert!(!config.is_production());
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = load(&[REQUIRED[0]]).unwrap_err();
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn test_empty_api_key_is_fatal() {
        let err = load(&[REQUIRED[0], ("API_KEY", "  ")]).unwrap_err();
        assert_eq!(err.to_string(), "API_KEY must not be empty");
    }

    #[test]
    fn test_missing_database_url_is_fatal() {
        assert!(load(&[REQUIRED[1]]).is_err());
    }

    #[test]
    fn test_production_skips_migrations_by_default() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("APP_ENV", "production"));
        let config = load(&vars).unwrap();

        assert!(config.is_production());
        assert!(!config.startup.run_migrations);

        vars.push(("RUN_MIGRATIONS", "true"));
        assert!(load(&vars).unwrap().startup.run_migrations);
    }

    #[test]
    fn test_cors_origins_are_split() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("CORS_ORIGINS", "https://a.example, https://b.example,"));
        let config = load(&vars).unwrap();

        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("API_PORT", "eighty"));
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("API_PORT"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = load(&REQUIRED).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("test-api-key"));
    }
}
