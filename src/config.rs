use std::env;

use crate::error::AppError;

pub const DEFAULT_SHIPX_URL: &str = "https://api-shipx-pl.easypack24.net";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Result<Self, AppError> {
        match raw {
            "sandbox" => Ok(Environment::Sandbox),
            "production" => Ok(Environment::Production),
            other => Err(AppError::Internal(format!(
                "invalid INPOST_ENVIRONMENT: {other}"
            ))),
        }
    }

    // InPost exposes a single public ShipX host; sandbox resolves to it too.
    pub fn base_url(&self) -> &'static str {
        DEFAULT_SHIPX_URL
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub api_token: String,
    pub organization_id: String,
    pub api_url: String,
    pub environment: Environment,
    pub webhook_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let environment = match env::var("INPOST_ENVIRONMENT") {
            Ok(raw) => Environment::parse(&raw)?,
            Err(_) => Environment::Production,
        };

        let api_url =
            env::var("INPOST_API_URL").unwrap_or_else(|_| environment.base_url().to_string());

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 9000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_token: require("INPOST_API_TOKEN")?,
            organization_id: require("INPOST_ORGANIZATION_ID")?,
            api_url,
            environment,
            webhook_url: env::var("INPOST_WEBHOOK_URL").ok(),
        })
    }
}

fn require(key: &str) -> Result<String, AppError> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::InvalidData(format!("{key} is required")))
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
