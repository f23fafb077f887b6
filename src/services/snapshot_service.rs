use crate::error::RemoteQueryError;
use crate::models::{DelegationRecord, Validator};
use crate::services::pagination::{Page, PageRequest};
use crate::services::staking_service::RemoteStakingService;
use crate::utils::helpers::load_json;
use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A saved dump of a node's staking state, in the REST gateway's JSON shapes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StakingSnapshot {
    #[serde(default)]
    pub validators: Vec<Validator>,
    #[serde(default)]
    pub delegation_responses: Vec<DelegationRecord>,
}

/// Serves a [`StakingSnapshot`] through the same paginated interface as a live
/// node. Continuation keys are record offsets.
pub struct SnapshotStakingService {
    validators: Vec<Validator>,
    delegations_by_validator: HashMap<String, Vec<DelegationRecord>>,
}

impl SnapshotStakingService {
    pub fn new(snapshot: StakingSnapshot) -> Self {
        let mut delegations_by_validator: HashMap<String, Vec<DelegationRecord>> = HashMap::new();
        for record in snapshot.delegation_responses {
            delegations_by_validator
                .entry(record.validator_address.clone())
                .or_default()
                .push(record);
        }

        Self {
            validators: snapshot.validators,
            delegations_by_validator,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let snapshot: StakingSnapshot = load_json(path)?;
        info!(
            "Loaded snapshot {} with {} validators and {} delegations",
            path.display(),
            snapshot.validators.len(),
            snapshot.delegation_responses.len()
        );
        Ok(Self::new(snapshot))
    }
}

fn slice_page<T: Clone>(
    query: &'static str,
    records: &[T],
    page: &PageRequest,
) -> Result<Page<T>, RemoteQueryError> {
    let offset = match &page.key {
        None => 0,
        Some(key) => key
            .parse::<usize>()
            .ok()
            .filter(|offset| *offset <= records.len())
            .ok_or_else(|| RemoteQueryError::InvalidPageKey {
                query,
                key: key.clone(),
            })?,
    };

    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX).max(1);
    let end = offset.saturating_add(limit).min(records.len());
    let next_key = (end < records.len()).then(|| end.to_string());

    Ok(Page::new(records[offset..end].to_vec(), next_key))
}

#[async_trait]
impl RemoteStakingService for SnapshotStakingService {
    async fn list_validators(&self, page: PageRequest) -> Result<Page<Validator>, RemoteQueryError> {
        slice_page("validators", &self.validators, &page)
    }

    async fn list_validator_delegations(
        &self,
        validator_address: &str,
        page: PageRequest,
    ) -> Result<Page<DelegationRecord>, RemoteQueryError> {
        let records = self
            .delegations_by_validator
            .get(validator_address)
            .map(Vec::as_slice)
            .unwrap_or_default();
        slice_page("validator delegations", records, &page)
    }
}
