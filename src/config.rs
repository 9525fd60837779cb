/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、Clerk 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - `.env.local` → `.env` の順で dotenv を読む (先に読んだ値が優先)
 */
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Clerk token verification settings.
///
/// Either `jwt_key_pem` (networkless verification) or `secret_key`
/// (JWKS fetched from the Clerk backend API) must be present.
#[derive(Clone)]
pub struct ClerkConfig {
    pub secret_key: Option<String>,
    pub jwt_key_pem: Option<String>,
    pub issuer: String,
    pub audience: Option<String>,
    pub api_url: Url,
    pub jwks_cache_ttl_seconds: u64,
    pub leeway_seconds: u64,
}

impl std::fmt::Debug for ClerkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // secret_key / jwt_key_pem は出さない
        f.debug_struct("ClerkConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("api_url", &self.api_url.as_str())
            .field("jwks_cache_ttl_seconds", &self.jwks_cache_ttl_seconds)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub database_url: String,
    pub database_max_connections: u32,
    pub run_migrations: bool,

    pub clerk: ClerkConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::from_filename(".env.local").ok();
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (env vars in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV"));

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(
                &get("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
                parse_or("DB_PORT", get("DB_PORT"), 5432)?,
                &get("DB_USERNAME").unwrap_or_else(|| "postgres".to_string()),
                &get("DB_PASSWORD").unwrap_or_default(),
                &get("DB_DATABASE").unwrap_or_else(|| "foundation_db".to_string()),
            )?,
        };

        let database_max_connections =
            parse_or("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"), 10)?;

        // 本番以外ではスキーマを自動で揃える
        let run_migrations = match get("DATABASE_RUN_MIGRATIONS") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid("DATABASE_RUN_MIGRATIONS"))?,
            None => !app_env.is_production(),
        };

        let secret_key = get("CLERK_SECRET_KEY");
        let jwt_key_pem = get("CLERK_JWT_KEY").map(|pem| pem.replace("\\n", "\n"));
        if secret_key.is_none() && jwt_key_pem.is_none() {
            return Err(ConfigError::Missing("CLERK_SECRET_KEY"));
        }

        let issuer = get("CLERK_ISSUER").unwrap_or_else(|| "https://clerk.dev".to_string());
        Url::parse(&issuer).map_err(|_| ConfigError::Invalid("CLERK_ISSUER"))?;

        let api_url = Url::parse(
            &get("CLERK_API_URL").unwrap_or_else(|| "https://api.clerk.com".to_string()),
        )
        .map_err(|_| ConfigError::Invalid("CLERK_API_URL"))?;

        let clerk = ClerkConfig {
            secret_key,
            jwt_key_pem,
            issuer,
            audience: get("CLERK_AUDIENCE"),
            api_url,
            jwks_cache_ttl_seconds: parse_or(
                "CLERK_JWKS_CACHE_TTL_SECONDS",
                get("CLERK_JWKS_CACHE_TTL_SECONDS"),
                300,
            )?,
            leeway_seconds: parse_or(
                "ACCESS_TOKEN_LEEWAY_SECONDS",
                get("ACCESS_TOKEN_LEEWAY_SECONDS"),
                60,
            )?,
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            database_url,
            database_max_connections,
            run_migrations,
            clerk,
        })
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Compose a postgres URL from discrete DB_* settings (credentials are percent-encoded).
pub fn database_url_from_parts(
    host: &str,
    port: u16,
    username: &str,
    password: &str,
    database: &str,
) -> Result<String, ConfigError> {
    let mut url = Url::parse(&format!("postgres://{}:{}", host, port))
        .map_err(|_| ConfigError::Invalid("DB_HOST"))?;

    url.set_username(username)
        .map_err(|_| ConfigError::Invalid("DB_USERNAME"))?;
    if !password.is_empty() {
        url.set_password(Some(password))
            .map_err(|_| ConfigError::Invalid("DB_PASSWORD"))?;
    }
    url.set_path(&format!("/{}", database));

    Ok(url.to_string())
}
