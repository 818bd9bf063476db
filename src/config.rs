use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use crate::pricing::PricingRules;

/// Process configuration, read once at startup. Every shop economics number
/// lives here rather than in the code that applies it.
#[derive(Debug, Clone)]
pub struct Config {
    pub channel_capacity: usize,
    pub session_file: PathBuf,
    pub pricing: PricingRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel_capacity: 32,
            session_file: PathBuf::from("coalshop-session.json"),
            pricing: PricingRules::default(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self {
            channel_capacity: try_load("SHOP_CHANNEL_CAPACITY", "32"),
            session_file: PathBuf::from(try_load::<String>(
                "SHOP_SESSION_FILE",
                "coalshop-session.json",
            )),
            pricing: PricingRules {
                base_earn_rate: try_load("SHOP_BASE_EARN_RATE", "0.01"),
                normal_fee: try_load("SHOP_NORMAL_FEE", "0.5"),
                normal_free_threshold: try_load("SHOP_NORMAL_FREE_THRESHOLD", "10"),
                express_fee: try_load("SHOP_EXPRESS_FEE", "1"),
                express_free_threshold: try_load("SHOP_EXPRESS_FREE_THRESHOLD", "15"),
            },
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
