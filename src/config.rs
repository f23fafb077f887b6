use crate::error::ConfigError;
use crate::models::DEFAULT_POWER_REDUCTION;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub node_endpoint: String,
    pub validators_file: PathBuf,
    pub delegations_file: PathBuf,
    pub multiple_delegations_file: PathBuf,
    pub validator_page_limit: u64,
    pub delegation_page_limit: u64,
    pub power_reduction: u64,
    pub request_timeout: Duration,
    pub snapshot_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            node_endpoint: string_or("NODE_ENDPOINT", "http://localhost:1317"),
            validators_file: string_or("VALIDATORS_FILE", "validators.csv").into(),
            delegations_file: string_or("DELEGATIONS_FILE", "delegations.csv").into(),
            multiple_delegations_file: string_or(
                "MULTIPLE_DELEGATIONS_FILE",
                "multipleDelegations.csv",
            )
            .into(),
            validator_page_limit: parse_or(&lookup, "VALIDATOR_PAGE_LIMIT", 100)?,
            delegation_page_limit: parse_or(&lookup, "DELEGATION_PAGE_LIMIT", 10_000)?,
            power_reduction: parse_or(&lookup, "POWER_REDUCTION", DEFAULT_POWER_REDUCTION)?,
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?),
            snapshot_file: lookup("SNAPSHOT_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialEq + Default,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    let value = raw.trim().parse::<T>().map_err(|e| ConfigError {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })?;

    // Page sizes, timeouts and the power reduction are all divisors or limits.
    if value == T::default() {
        return Err(ConfigError {
            key,
            value: raw,
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(value)
}
