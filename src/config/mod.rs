use std::env;
use std::time::Duration;

/// Configuration errors raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Storage engine selected at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseConfig {
    /// In-process store, used for development and tests.
    Embedded,
    Postgres { url: String, max_connections: u32 },
}

/// Local token issuer: tokens minted by `/api/login`.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: Option<String>,
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
}

/// External OAuth2 authorization server trusted by this resource server.
#[derive(Debug, Clone, Default)]
pub struct OAuthConfig {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub jwks_uri: Option<String>,
    pub introspection_uri: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

/// Whether captured internal errors are shipped to the collector.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorReportingConfig {
    Disabled,
    Enabled {
        endpoint: String,
        token: String,
        environment: String,
    },
}

/// Account created by the startup initializer when missing.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub admin_email: String,
    pub admin_password: String,
}

/// Certificate pair for serving HTTPS directly.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: String,
    pub key_path: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub oauth: OAuthConfig,
    pub auth_timeout: Duration,
    pub jwks_cache_ttl: Duration,
    pub error_reporting: ErrorReportingConfig,
    pub frontend_url: String,
    pub bootstrap: BootstrapConfig,
    pub tls: Option<TlsConfig>,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = match var("DATABASE_URL") {
            None => DatabaseConfig::Embedded,
            Some(url) if url.eq_ignore_ascii_case("memory") => DatabaseConfig::Embedded,
            Some(url) => DatabaseConfig::Postgres {
                url,
                max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10)?,
            },
        };

        let jwt = JwtConfig {
            secret: var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "task-manager".to_string()),
            audience: var("JWT_AUDIENCE"),
            access_token_expiry_secs: parse_or(&var, "JWT_ACCESS_TOKEN_EXPIRY_SECS", 900)?,
            refresh_token_expiry_secs: parse_or(&var, "JWT_REFRESH_TOKEN_EXPIRY_SECS", 604800)?,
        };

        let oauth = OAuthConfig {
            issuer: var("OAUTH_ISSUER"),
            audience: var("OAUTH_AUDIENCE"),
            jwks_uri: var("OAUTH_JWKS_URI"),
            introspection_uri: var("OAUTH_INTROSPECTION_URI"),
            client_id: var("OAUTH_CLIENT_ID"),
            client_secret: var("OAUTH_CLIENT_SECRET"),
        };

        let error_reporting = match var("ERROR_REPORTING_TOKEN") {
            None => ErrorReportingConfig::Disabled,
            Some(token) => ErrorReportingConfig::Enabled {
                endpoint: var("ERROR_REPORTING_URL")
                    .ok_or(ConfigError::Missing("ERROR_REPORTING_URL"))?,
                token,
                environment: var("APP_ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            },
        };

        let tls = match (var("TLS_CERT_PATH"), var("TLS_KEY_PATH")) {
            (Some(cert_path), Some(key_path)) => Some(TlsConfig {
                cert_path,
                key_path,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("TLS_KEY_PATH")),
            (None, Some(_)) => return Err(ConfigError::Missing("TLS_CERT_PATH")),
        };

        Ok(Self {
            database,
            host: var("BACKEND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&var, "BACKEND_PORT", 3000)?,
            jwt,
            oauth,
            auth_timeout: Duration::from_millis(parse_or(&var, "AUTH_TIMEOUT_MS", 3000)?),
            jwks_cache_ttl: Duration::from_secs(parse_or(&var, "JWKS_CACHE_TTL_SECS", 600)?),
            error_reporting,
            frontend_url: var("FRONTEND_URL")
                .unwrap_or_else(|| "https://localhost:5173".to_string()),
            bootstrap: BootstrapConfig {
                admin_email: var("ADMIN_EMAIL")
                    .unwrap_or_else(|| "hexlet@example.com".to_string()),
                admin_password: var("ADMIN_PASSWORD").unwrap_or_else(|| "qwerty".to_string()),
            },
            tls,
            max_body_bytes: parse_or(&var, "MAX_BODY_BYTES", 1024 * 1024)?,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
