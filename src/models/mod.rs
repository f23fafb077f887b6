mod amount_utils;
mod delegation;
mod delegator_aggregate;
mod validator;

pub use amount_utils::{Dec, DEC_PRECISION};
pub use delegation::{Coin, DelegationRecord};
pub use delegator_aggregate::DelegatorAggregate;
pub use validator::{BondStatus, Description, Validator, DEFAULT_POWER_REDUCTION};
