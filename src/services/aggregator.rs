use crate::models::{DelegationRecord, DelegatorAggregate};
use log::{debug, info};
use std::collections::BTreeMap;

/// Aggregates keyed by delegator address.
pub type DelegationsByDelegator = BTreeMap<String, DelegatorAggregate>;

pub fn aggregate_delegations(records: &[DelegationRecord]) -> DelegationsByDelegator {
    info!("Collecting delegations");
    let mut delegations = DelegationsByDelegator::new();

    for record in records {
        debug!(
            "{} -> {}: {} shares, {}{}",
            record.delegator_address,
            record.validator_address,
            record.shares,
            record.balance.amount,
            record.balance.denom
        );

        delegations
            .entry(record.delegator_address.clone())
            .or_insert_with(|| DelegatorAggregate::new(record.delegator_address.as_str()))
            .push(record.clone());
    }

    info!(
        "Collected {} delegators from {} delegations",
        delegations.len(),
        records.len()
    );
    delegations
}
