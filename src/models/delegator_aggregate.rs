use crate::models::DelegationRecord;
use num_bigint::BigInt;
use num_traits::Zero;

/// Every delegation held by one delegator, with the running balance total.
///
/// Records keep arrival order. `total_balance` is only updated through
/// [`DelegatorAggregate::push`], so it always equals the sum of the records'
/// balance amounts.
#[derive(Debug, Clone)]
pub struct DelegatorAggregate {
    delegator_address: String,
    records: Vec<DelegationRecord>,
    total_balance: BigInt,
}

impl DelegatorAggregate {
    pub fn new(delegator_address: impl Into<String>) -> Self {
        Self {
            delegator_address: delegator_address.into(),
            records: Vec::new(),
            total_balance: BigInt::zero(),
        }
    }

    pub fn push(&mut self, record: DelegationRecord) {
        self.total_balance += &record.balance.amount;
        self.records.push(record);
    }

    pub fn delegator_address(&self) -> &str {
        &self.delegator_address
    }

    pub fn records(&self) -> &[DelegationRecord] {
        &self.records
    }

    pub fn total_balance(&self) -> &BigInt {
        &self.total_balance
    }

    /// True once more than one delegation record has been pushed, even when
    /// the records name the same validator.
    pub fn has_multiple_delegations(&self) -> bool {
        self.records.len() > 1
    }
}
