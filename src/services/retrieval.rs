use crate::error::FetchError;
use crate::models::{DelegationRecord, Validator};
use crate::services::pagination::fetch_all_pages;
use crate::services::staking_service::RemoteStakingService;
use log::{error, info};

pub async fn fetch_validators<S>(service: &S, page_limit: u64) -> Result<Vec<Validator>, FetchError<Validator>>
where
    S: RemoteStakingService + ?Sized,
{
    info!("Getting validators");
    let validators = fetch_all_pages(page_limit, |page| service.list_validators(page)).await?;
    info!("Fetched {} validators", validators.len());
    Ok(validators)
}

/// Collects the delegations of every validator, in validator order.
///
/// Validators are queried strictly one after another. Staking nodes do not
/// support parallel or batched queries on a connection, so this loop must not
/// be turned into concurrent requests. A failure on any validator aborts the
/// whole collection.
pub async fn fetch_delegations<S>(
    service: &S,
    validators: &[Validator],
    page_limit: u64,
) -> Result<Vec<DelegationRecord>, FetchError<DelegationRecord>>
where
    S: RemoteStakingService + ?Sized,
{
    let mut delegations = Vec::new();

    for (index, validator) in validators.iter().enumerate() {
        info!(
            "Getting delegation responses for validator {}/{}: {}",
            index + 1,
            validators.len(),
            validator.moniker()
        );

        let address = validator.operator_address.as_str();
        match fetch_all_pages(page_limit, |page| {
            service.list_validator_delegations(address, page)
        })
        .await
        {
            Ok(records) => {
                info!("{} delegations for {}", records.len(), address);
                delegations.extend(records);
            }
            Err(e) => {
                error!("Fetching delegations for {} failed: {}", address, e);
                delegations.extend(e.partial);
                return Err(FetchError::new(delegations, e.source));
            }
        }
    }

    info!("Fetched {} delegations in total", delegations.len());
    Ok(delegations)
}
