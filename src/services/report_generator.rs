use crate::models::{Dec, Validator};
use crate::repositories::ReportRow;
use crate::services::aggregator::DelegationsByDelegator;
use num_bigint::BigInt;
use num_traits::Zero;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorPowerRow<'a> {
    pub moniker: &'a str,
    pub voting_power: BigInt,
    pub self_delegation: &'a BigInt,
    pub total_delegation: &'a Dec,
}

impl ReportRow for ValidatorPowerRow<'_> {
    const HEADER: &'static [&'static str] =
        &["moniker", "voting_power", "self_delegation", "total_delegation"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.moniker.to_string(),
            self.voting_power.to_string(),
            self.self_delegation.to_string(),
            self.total_delegation.to_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatorStakeRow<'a> {
    pub delegator: &'a str,
    pub total_balance: &'a BigInt,
}

impl ReportRow for DelegatorStakeRow<'_> {
    const HEADER: &'static [&'static str] = &["delegator", "voting_power"];

    fn fields(&self) -> Vec<String> {
        vec![self.delegator.to_string(), self.total_balance.to_string()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiDelegationRow<'a> {
    pub delegator: &'a str,
    pub validator: &'a str,
    pub bonded_tokens: BigInt,
}

impl ReportRow for MultiDelegationRow<'_> {
    const HEADER: &'static [&'static str] = &["delegator", "validator", "bonded_tokens"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.delegator.to_string(),
            self.validator.to_string(),
            self.bonded_tokens.to_string(),
        ]
    }
}

/// Validators from most to least voting power.
///
/// The sort is stable: validators with equal power keep the order the node
/// returned them in.
pub fn validators_by_power<'a>(
    validators: &'a [Validator],
    power_reduction: &BigInt,
) -> Vec<ValidatorPowerRow<'a>> {
    let mut ranked: Vec<ValidatorPowerRow<'a>> = validators
        .iter()
        .map(|validator| ValidatorPowerRow {
            moniker: validator.moniker(),
            voting_power: validator.voting_power(power_reduction),
            self_delegation: &validator.min_self_delegation,
            total_delegation: &validator.delegator_shares,
        })
        .collect();

    ranked.sort_by(|a, b| b.voting_power.cmp(&a.voting_power));
    ranked
}

/// Delegators from largest to smallest total balance, ties by address.
pub fn delegators_by_stake(delegations: &DelegationsByDelegator) -> Vec<DelegatorStakeRow<'_>> {
    let mut ranked: Vec<DelegatorStakeRow<'_>> = delegations
        .iter()
        .map(|(delegator, aggregate)| DelegatorStakeRow {
            delegator: delegator.as_str(),
            total_balance: aggregate.total_balance(),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_balance
            .cmp(a.total_balance)
            .then_with(|| a.delegator.cmp(b.delegator))
    });
    ranked
}

/// One row per delegation of every delegator holding more than one
/// delegation record.
///
/// Only delegations to a bonded validator count toward active stake; rows for
/// unbonding, unbonded or unknown validators are kept with a zero amount.
pub fn multi_validator_delegations<'a>(
    validators: &'a [Validator],
    delegations: &'a DelegationsByDelegator,
) -> Vec<MultiDelegationRow<'a>> {
    let validators_by_address: HashMap<&str, &Validator> = validators
        .iter()
        .map(|validator| (validator.operator_address.as_str(), validator))
        .collect();

    delegations
        .values()
        .filter(|aggregate| aggregate.has_multiple_delegations())
        .flat_map(|aggregate| aggregate.records())
        .map(|record| {
            let bonded = validators_by_address
                .get(record.validator_address.as_str())
                .is_some_and(|validator| validator.is_bonded());

            MultiDelegationRow {
                delegator: record.delegator_address.as_str(),
                validator: record.validator_address.as_str(),
                bonded_tokens: if bonded {
                    record.balance.amount.clone()
                } else {
                    BigInt::zero()
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BondStatus, DelegationRecord};
    use crate::services::aggregator::aggregate_delegations;
    use std::str::FromStr;

    fn validator(address: &str, moniker: &str, tokens: &str, status: BondStatus) -> Validator {
        let status = match status {
            BondStatus::Bonded => 3,
            BondStatus::Unbonding => 2,
            BondStatus::Unbonded => 1,
        };
        serde_json::from_value(serde_json::json!({
            "operator_address": address,
            "status": status,
            "tokens": tokens,
            "delegator_shares": format!("{tokens}.5"),
            "description": { "moniker": moniker },
            "min_self_delegation": "1"
        }))
        .unwrap()
    }

    fn record(delegator: &str, validator: &str, amount: &str) -> DelegationRecord {
        serde_json::from_value(serde_json::json!({
            "delegation": {
                "delegator_address": delegator,
                "validator_address": validator,
                "shares": amount
            },
            "balance": { "denom": "uosmo", "amount": amount }
        }))
        .unwrap()
    }

    fn reduction() -> BigInt {
        BigInt::from(1_000_000u64)
    }

    #[test]
    fn validators_sorted_descending_and_stable() {
        let validators = vec![
            validator("v1", "first-small", "1000000", BondStatus::Bonded),
            validator("v2", "big", "9000000", BondStatus::Bonded),
            // same power as v1 once truncated
            validator("v3", "second-small", "1999999", BondStatus::Bonded),
            validator("v4", "third-small", "1000000", BondStatus::Unbonded),
        ];

        let rows = validators_by_power(&validators, &reduction());

        let monikers: Vec<_> = rows.iter().map(|r| r.moniker).collect();
        assert_eq!(
            monikers,
            vec!["big", "first-small", "second-small", "third-small"]
        );
        assert_eq!(
            rows[0].fields(),
            vec!["big", "9", "1", "9000000.500000000000000000"]
        );
    }

    #[test]
    fn voting_power_exceeding_u64_ranks_correctly() {
        let validators = vec![
            validator("v1", "small", "18446744073709551615", BondStatus::Bonded),
            validator(
                "v2",
                "huge",
                "18446744073709551615000000000",
                BondStatus::Bonded,
            ),
        ];

        let rows = validators_by_power(&validators, &reduction());

        assert_eq!(rows[0].moniker, "huge");
        assert_eq!(
            rows[0].voting_power,
            BigInt::from_str("18446744073709551615000").unwrap()
        );
    }

    #[test]
    fn delegators_sorted_by_total_then_address() {
        let records = vec![
            record("carol", "v1", "20"),
            record("alice", "v1", "5"),
            record("bob", "v1", "15"),
            record("alice", "v2", "15"),
            record("dave", "v1", "1"),
        ];
        let delegations = aggregate_delegations(&records);

        let rows = delegators_by_stake(&delegations);

        let fields: Vec<_> = rows.iter().map(|r| r.fields()).collect();
        assert_eq!(
            fields,
            vec![
                vec!["alice", "20"],
                vec!["carol", "20"],
                vec!["bob", "15"],
                vec!["dave", "1"],
            ]
        );
    }

    #[test]
    fn single_validator_delegators_are_left_out() {
        let validators = vec![
            validator("vA", "A", "1000000", BondStatus::Bonded),
            validator("vB", "B", "1000000", BondStatus::Bonded),
            validator("vC", "C", "1000000", BondStatus::Bonded),
        ];
        let records = vec![
            record("x", "vA", "1"),
            record("x", "vB", "2"),
            record("x", "vC", "3"),
            record("y", "vA", "30"),
        ];
        let delegations = aggregate_delegations(&records);

        let rows = multi_validator_delegations(&validators, &delegations);

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.delegator == "x"));
        let per_validator: Vec<_> = rows.iter().map(|r| (r.validator, r.bonded_tokens.to_string())).collect();
        assert_eq!(
            per_validator,
            vec![
                ("vA", "1".to_string()),
                ("vB", "2".to_string()),
                ("vC", "3".to_string()),
            ]
        );
    }

    #[test]
    fn non_bonded_validators_contribute_zero() {
        let validators = vec![
            validator("vA", "A", "1000000", BondStatus::Bonded),
            validator("vB", "B", "1000000", BondStatus::Unbonding),
            validator("vC", "C", "1000000", BondStatus::Unbonded),
        ];
        let records = vec![
            record("x", "vA", "10"),
            record("x", "vB", "10"),
            record("x", "vC", "10"),
            record("x", "vGone", "10"),
        ];
        let delegations = aggregate_delegations(&records);

        let rows = multi_validator_delegations(&validators, &delegations);

        let fields: Vec<_> = rows.iter().map(|r| r.fields()).collect();
        assert_eq!(
            fields,
            vec![
                vec!["x", "vA", "10"],
                vec!["x", "vB", "0"],
                vec!["x", "vC", "0"],
                vec!["x", "vGone", "0"],
            ]
        );
    }

    #[test]
    fn repeated_validator_records_are_all_reported() {
        let validators = vec![validator("vA", "A", "1000000", BondStatus::Bonded)];
        let records = vec![
            record("x", "vA", "10"),
            record("x", "vA", "5"),
            record("y", "vA", "30"),
        ];
        let delegations = aggregate_delegations(&records);

        let rows = multi_validator_delegations(&validators, &delegations);

        let fields: Vec<_> = rows.iter().map(|r| r.fields()).collect();
        assert_eq!(fields, vec![vec!["x", "vA", "10"], vec!["x", "vA", "5"]]);
    }
}
