use crate::config::Config;
use crate::error::{FetchError, SinkError};
use crate::models::{DelegationRecord, Validator};
use crate::repositories::{open_csv_sink, save_report, ReportRow};
use crate::services::aggregator::aggregate_delegations;
use crate::services::report_generator::{
    delegators_by_stake, multi_validator_delegations, validators_by_power,
};
use crate::services::retrieval::{fetch_delegations, fetch_validators};
use crate::services::staking_service::RemoteStakingService;
use log::{error, info};
use num_bigint::BigInt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validator retrieval failed: {0}")]
    Validators(#[source] FetchError<Validator>),
    /// `reports` holds the reports already written when the retrieval failed.
    #[error("delegation retrieval failed: {source}")]
    Delegations {
        #[source]
        source: FetchError<DelegationRecord>,
        reports: Vec<ReportOutcome>,
    },
}

#[derive(Debug)]
pub struct ReportOutcome {
    pub name: &'static str,
    pub path: PathBuf,
    pub result: Result<usize, SinkError>,
}

#[derive(Debug)]
pub struct RunSummary {
    pub validators: usize,
    pub delegations: usize,
    pub delegators: usize,
    pub reports: Vec<ReportOutcome>,
}

impl RunSummary {
    pub fn failed_reports(&self) -> impl Iterator<Item = &ReportOutcome> {
        self.reports.iter().filter(|report| report.result.is_err())
    }
}

/// Retrieves the staking state, aggregates it and writes all three reports.
///
/// The validators report is written as soon as the validator set is known, so
/// it survives a later delegation failure. Retrieval failures end the run. A
/// report that cannot be written is recorded in the summary and the remaining
/// reports are still produced.
pub async fn run<S>(service: &S, config: &Config) -> Result<RunSummary, PipelineError>
where
    S: RemoteStakingService + ?Sized,
{
    let validators = fetch_validators(service, config.validator_page_limit)
        .await
        .map_err(PipelineError::Validators)?;

    let power_reduction = BigInt::from(config.power_reduction);
    let mut reports = vec![write_report(
        "validators",
        &config.validators_file,
        &validators_by_power(&validators, &power_reduction),
    )];

    let delegations =
        match fetch_delegations(service, &validators, config.delegation_page_limit).await {
            Ok(delegations) => delegations,
            Err(source) => return Err(PipelineError::Delegations { source, reports }),
        };

    let delegators = aggregate_delegations(&delegations);

    reports.extend([
        write_report(
            "delegations",
            &config.delegations_file,
            &delegators_by_stake(&delegators),
        ),
        write_report(
            "multiple delegations",
            &config.multiple_delegations_file,
            &multi_validator_delegations(&validators, &delegators),
        ),
    ]);

    Ok(RunSummary {
        validators: validators.len(),
        delegations: delegations.len(),
        delegators: delegators.len(),
        reports,
    })
}

fn write_report<R: ReportRow>(name: &'static str, path: &Path, rows: &[R]) -> ReportOutcome {
    info!("Writing {} report", name);
    let result = open_csv_sink(path).and_then(|mut sink| save_report(&mut sink, rows));

    match &result {
        Ok(count) => info!("{} report: {} rows in {}", name, count, path.display()),
        Err(e) => error!("{} report failed: {}", name, e),
    }

    ReportOutcome {
        name,
        path: path.to_path_buf(),
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteQueryError;
    use crate::services::pagination::{Page, PageRequest};
    use crate::services::snapshot_service::SnapshotStakingService;
    use async_trait::async_trait;
    use std::fs;
    use std::time::Duration;

    const SNAPSHOT: &str = r#"{
        "validators": [
            {
                "operator_address": "valoperB",
                "status": "BOND_STATUS_BONDED",
                "tokens": "2000000",
                "delegator_shares": "20.000000000000000000",
                "description": { "moniker": "Bravo" },
                "min_self_delegation": "1"
            },
            {
                "operator_address": "valoperA",
                "status": "BOND_STATUS_BONDED",
                "tokens": "40000000",
                "delegator_shares": "40.000000000000000000",
                "description": { "moniker": "Alpha" },
                "min_self_delegation": "1"
            }
        ],
        "delegation_responses": [
            {
                "delegation": { "delegator_address": "osmo1x", "validator_address": "valoperA", "shares": "10.000000000000000000" },
                "balance": { "denom": "uosmo", "amount": "10" }
            },
            {
                "delegation": { "delegator_address": "osmo1y", "validator_address": "valoperA", "shares": "30.000000000000000000" },
                "balance": { "denom": "uosmo", "amount": "30" }
            },
            {
                "delegation": { "delegator_address": "osmo1x", "validator_address": "valoperB", "shares": "10.000000000000000000" },
                "balance": { "denom": "uosmo", "amount": "10" }
            }
        ]
    }"#;

    fn config_in(dir: &Path) -> Config {
        Config {
            node_endpoint: "http://unused".to_string(),
            validators_file: dir.join("validators.csv"),
            delegations_file: dir.join("delegations.csv"),
            multiple_delegations_file: dir.join("multipleDelegations.csv"),
            validator_page_limit: 1,
            delegation_page_limit: 1,
            power_reduction: 1_000_000,
            request_timeout: Duration::from_secs(1),
            snapshot_file: None,
        }
    }

    fn snapshot_service() -> SnapshotStakingService {
        SnapshotStakingService::new(serde_json::from_str(SNAPSHOT).unwrap())
    }

    #[tokio::test]
    async fn writes_all_three_reports() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let summary = run(&snapshot_service(), &config).await.unwrap();

        assert_eq!(summary.validators, 2);
        assert_eq!(summary.delegations, 3);
        assert_eq!(summary.delegators, 2);
        assert_eq!(summary.failed_reports().count(), 0);

        assert_eq!(
            fs::read_to_string(&config.validators_file).unwrap(),
            "moniker,voting_power,self_delegation,total_delegation\n\
             Alpha,40,1,40.000000000000000000\n\
             Bravo,2,1,20.000000000000000000\n"
        );
        assert_eq!(
            fs::read_to_string(&config.delegations_file).unwrap(),
            "delegator,voting_power\nosmo1y,30\nosmo1x,20\n"
        );
        // Delegation order follows validator order: valoperB was listed first.
        assert_eq!(
            fs::read_to_string(&config.multiple_delegations_file).unwrap(),
            "delegator,validator,bonded_tokens\nosmo1x,valoperB,10\nosmo1x,valoperA,10\n"
        );
    }

    #[tokio::test]
    async fn failed_report_does_not_stop_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.delegations_file = dir.path().join("missing").join("delegations.csv");

        let summary = run(&snapshot_service(), &config).await.unwrap();

        let failed: Vec<_> = summary.failed_reports().map(|r| r.name).collect();
        assert_eq!(failed, vec!["delegations"]);
        assert!(config.validators_file.exists());
        assert!(config.multiple_delegations_file.exists());
    }

    struct BrokenNode;

    #[async_trait]
    impl RemoteStakingService for BrokenNode {
        async fn list_validators(&self, _page: PageRequest) -> Result<Page<Validator>, RemoteQueryError> {
            Err(RemoteQueryError::Status {
                query: "validators",
                status: 502,
                message: "bad gateway".to_string(),
            })
        }

        async fn list_validator_delegations(
            &self,
            _validator_address: &str,
            _page: PageRequest,
        ) -> Result<Page<DelegationRecord>, RemoteQueryError> {
            unreachable!("no validators were returned")
        }
    }

    #[tokio::test]
    async fn validator_failure_writes_no_reports() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let err = run(&BrokenNode, &config).await.unwrap_err();

        assert!(matches!(err, PipelineError::Validators(_)));
        assert!(!config.validators_file.exists());
        assert!(!config.delegations_file.exists());
    }

    /// Serves the snapshot's validators but fails every delegation query.
    struct DelegationsDown(SnapshotStakingService);

    #[async_trait]
    impl RemoteStakingService for DelegationsDown {
        async fn list_validators(&self, page: PageRequest) -> Result<Page<Validator>, RemoteQueryError> {
            self.0.list_validators(page).await
        }

        async fn list_validator_delegations(
            &self,
            _validator_address: &str,
            _page: PageRequest,
        ) -> Result<Page<DelegationRecord>, RemoteQueryError> {
            Err(RemoteQueryError::Status {
                query: "validator delegations",
                status: 504,
                message: "gateway timeout".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn delegation_failure_keeps_validators_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let err = run(&DelegationsDown(snapshot_service()), &config)
            .await
            .unwrap_err();

        match err {
            PipelineError::Delegations { source, reports } => {
                assert!(matches!(
                    source.source,
                    RemoteQueryError::Status { status: 504, .. }
                ));
                let written: Vec<_> = reports.iter().map(|r| r.name).collect();
                assert_eq!(written, vec!["validators"]);
                assert!(reports[0].result.is_ok());
            }
            other => panic!("unexpected error {other:?}"),
        }

        assert_eq!(
            fs::read_to_string(&config.validators_file).unwrap(),
            "moniker,voting_power,self_delegation,total_delegation\n\
             Alpha,40,1,40.000000000000000000\n\
             Bravo,2,1,20.000000000000000000\n"
        );
        assert!(!config.delegations_file.exists());
        assert!(!config.multiple_delegations_file.exists());
    }
}
