use crate::models::amount_utils::{deserialize_bigint, Dec};
use num_bigint::BigInt;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(deserialize_with = "deserialize_bigint")]
    pub amount: BigInt,
}

/// One delegator's position with one validator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "DelegationResponse")]
pub struct DelegationRecord {
    pub delegator_address: String,
    pub validator_address: String,
    pub shares: Dec,
    pub balance: Coin,
}

#[derive(Deserialize)]
struct Delegation {
    delegator_address: String,
    validator_address: String,
    shares: Dec,
}

#[derive(Deserialize)]
struct DelegationResponse {
    delegation: Delegation,
    balance: Coin,
}

impl From<DelegationResponse> for DelegationRecord {
    fn from(response: DelegationResponse) -> Self {
        DelegationRecord {
            delegator_address: response.delegation.delegator_address,
            validator_address: response.delegation.validator_address,
            shares: response.delegation.shares,
            balance: response.balance,
        }
    }
}
