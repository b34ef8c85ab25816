use std::{env, fmt::Display, str::FromStr};

use bm_common::{Money, Secret};
use boost_engine::pricing::PricingPolicy;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::errors::ServerError;

const DEFAULT_BM_HOST: &str = "127.0.0.1";
const DEFAULT_BM_PORT: u16 = 8470;
const DEFAULT_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Size of the database connection pool
    pub max_connections: u32,
    pub auth: AuthConfig,
    pub pricing: PricingPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BM_HOST.to_string(),
            port: DEFAULT_BM_PORT,
            database_url: String::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
            pricing: PricingPolicy::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BM_HOST").ok().unwrap_or_else(|| DEFAULT_BM_HOST.into());
        let port = parse_env_value("BM_PORT", env::var("BM_PORT").ok(), DEFAULT_BM_PORT);
        let database_url = env::var("BM_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ BM_DATABASE_URL is not set. The database in the default location will be used.");
            String::default()
        });
        let max_connections =
            parse_env_value("BM_DB_MAX_CONNECTIONS", env::var("BM_DB_MAX_CONNECTIONS").ok(), DEFAULT_MAX_CONNECTIONS);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!("🪛️ Could not load the authentication configuration. {e}. Reverting to the default configuration.");
            AuthConfig::default()
        });
        let pricing = pricing_from_env();
        Self { host, port, database_url, max_connections, auth, pricing }
    }
}

fn pricing_from_env() -> PricingPolicy {
    let defaults = PricingPolicy::default();
    let rank_boost_base = parse_env_value(
        "BM_RANK_BOOST_BASE_PRICE",
        env::var("BM_RANK_BOOST_BASE_PRICE").ok(),
        defaults.rank_boost_base.value(),
    );
    let flat_service_base = parse_env_value(
        "BM_FLAT_SERVICE_BASE_PRICE",
        env::var("BM_FLAT_SERVICE_BASE_PRICE").ok(),
        defaults.flat_service_base.value(),
    );
    let platform_fee_percent =
        parse_env_value("BM_PLATFORM_FEE_PERCENT", env::var("BM_PLATFORM_FEE_PERCENT").ok(), defaults.platform_fee_percent);
    let policy = PricingPolicy {
        rank_boost_base: Money::from(rank_boost_base),
        flat_service_base: Money::from(flat_service_base),
        platform_fee_percent,
    };
    if policy.rank_boost_base.value() < 0 || policy.flat_service_base.value() < 0 || policy.platform_fee_percent < 0 {
        error!("🪛️ Prices and fees cannot be negative. Using the default pricing policy instead.");
        return defaults;
    }
    info!(
        "🪛️ Pricing: rank boosts from {}, other services from {}, platform fee {}%",
        policy.rank_boost_base, policy.flat_service_base, policy.platform_fee_percent
    );
    policy
}

/// Parses an environment value, logging and falling back to `default` when it is missing or malformed.
fn parse_env_value<T>(name: &str, value: Option<String>, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match value {
        None => {
            info!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
        Some(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 secret shared with the identity provider that issues access tokens.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. No access token \
             issued by the identity provider will be accepted. Set BM_JWT_SECRET to fix this. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self { jwt_secret: Secret::new(secret.into()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("BM_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [BM_JWT_SECRET]")))?;
        let config = Self::new(secret);
        if config.jwt_secret.is_blank() {
            return Err(ServerError::ConfigurationError("BM_JWT_SECRET is empty".into()));
        }
        Ok(config)
    }
}
