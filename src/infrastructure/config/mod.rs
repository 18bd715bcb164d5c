use crate::domain::tokens::EconomyPolicy;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Required only for the Postgres backend
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub store_backend: StoreBackend,
    #[serde(skip)]
    pub economy: EconomyPolicy,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => return Err(format!("Unknown STORE_BACKEND: {}", other).into()),
        };

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err("DATABASE_URL is required when STORE_BACKEND=postgres".into());
        }

        let defaults = EconomyPolicy::default();
        let economy = EconomyPolicy {
            quiz_cost: var_or("QUIZ_COST", defaults.quiz_cost)?,
            flashcard_cost: var_or("FLASHCARD_COST", defaults.flashcard_cost)?,
            free_use_cap: var_or("FREE_USE_CAP", defaults.free_use_cap)?,
            daily_reward: var_or("DAILY_REWARD_TOKENS", defaults.daily_reward)?,
            rating_reward: var_or("RATING_REWARD_TOKENS", defaults.rating_reward)?,
            ad_reward: var_or("AD_REWARD_TOKENS", defaults.ad_reward)?,
            referrer_reward: var_or("REFERRER_REWARD_TOKENS", defaults.referrer_reward)?,
            referred_reward: var_or("REFERRED_REWARD_TOKENS", defaults.referred_reward)?,
            daily_cooldown_hours: var_or(
                "DAILY_REWARD_COOLDOWN_HOURS",
                defaults.daily_cooldown_hours,
            )?,
        };
        validate_economy(&economy)?;

        let config = Config {
            database_url,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            jwt_secret: env::var("JWT_SECRET")?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            store_backend,
            economy,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn var_or<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid {}: {}", key, e).into()),
        Err(_) => Ok(default),
    }
}

/// One year
const MAX_DAILY_COOLDOWN_HOURS: i64 = 24 * 365;

fn validate_economy(policy: &EconomyPolicy) -> Result<(), Box<dyn std::error::Error>> {
    let positive = [
        ("QUIZ_COST", policy.quiz_cost),
        ("FLASHCARD_COST", policy.flashcard_cost),
        ("DAILY_REWARD_TOKENS", policy.daily_reward),
        ("RATING_REWARD_TOKENS", policy.rating_reward),
        ("AD_REWARD_TOKENS", policy.ad_reward),
        ("REFERRER_REWARD_TOKENS", policy.referrer_reward),
        ("REFERRED_REWARD_TOKENS", policy.referred_reward),
    ];
    for (key, value) in positive {
        if value <= 0 {
            return Err(format!("{} must be positive, got {}", key, value).into());
        }
    }
    if policy.free_use_cap < 0 {
        return Err("FREE_USE_CAP must not be negative".into());
    }
    if !(1..=MAX_DAILY_COOLDOWN_HOURS).contains(&policy.daily_cooldown_hours) {
        return Err(format!(
            "DAILY_REWARD_COOLDOWN_HOURS must be between 1 and {}, got {}",
            MAX_DAILY_COOLDOWN_HOURS, policy.daily_cooldown_hours
        )
        .into());
    }
    Ok(())
}
