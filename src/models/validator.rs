use crate::models::amount_utils::{deserialize_bigint, Dec};
use num_bigint::BigInt;
use serde::{self, Deserialize, Deserializer};

/// Default number of base units per unit of consensus power.
pub const DEFAULT_POWER_REDUCTION: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondStatus {
    Bonded,
    Unbonding,
    Unbonded,
}

impl BondStatus {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 | 1 => Some(BondStatus::Unbonded),
            2 => Some(BondStatus::Unbonding),
            3 => Some(BondStatus::Bonded),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "BOND_STATUS_UNSPECIFIED" | "BOND_STATUS_UNBONDED" => Some(BondStatus::Unbonded),
            "BOND_STATUS_UNBONDING" => Some(BondStatus::Unbonding),
            "BOND_STATUS_BONDED" => Some(BondStatus::Bonded),
            _ => None,
        }
    }
}

// The REST gateway sends the proto enum name, older dumps carry the number.
impl<'de> Deserialize<'de> for BondStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(i64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(code) => BondStatus::from_code(code)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown bond status {code}"))),
            Raw::Name(name) => BondStatus::from_name(&name)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown bond status {name}"))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub moniker: String,
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Validator {
    pub operator_address: String,
    #[serde(default)]
    pub description: Description,
    pub status: BondStatus,
    #[serde(deserialize_with = "deserialize_bigint")]
    pub tokens: BigInt,
    pub delegator_shares: Dec,
    #[serde(deserialize_with = "deserialize_bigint")]
    pub min_self_delegation: BigInt,
}

impl Validator {
    pub fn moniker(&self) -> &str {
        &self.description.moniker
    }

    pub fn is_bonded(&self) -> bool {
        self.status == BondStatus::Bonded
    }

    /// Tokens divided by the power reduction, truncated.
    pub fn voting_power(&self, power_reduction: &BigInt) -> BigInt {
        &self.tokens / power_reduction
    }
}
