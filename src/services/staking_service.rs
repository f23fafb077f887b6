use crate::error::{ConnectionError, RemoteQueryError};
use crate::models::{DelegationRecord, Validator};
use crate::services::pagination::{Page, PageRequest};
use async_trait::async_trait;
use log::{info, warn};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const VALIDATORS_QUERY: &str = "validators";
const VALIDATOR_DELEGATIONS_QUERY: &str = "validator delegations";

/// Read access to a node's staking module, one page per call.
///
/// The node does not serve concurrent or batched staking queries on one
/// connection, so callers must issue these one at a time.
#[async_trait]
pub trait RemoteStakingService: Send + Sync {
    async fn list_validators(&self, page: PageRequest) -> Result<Page<Validator>, RemoteQueryError>;

    async fn list_validator_delegations(
        &self,
        validator_address: &str,
        page: PageRequest,
    ) -> Result<Page<DelegationRecord>, RemoteQueryError>;
}

/// Staking queries over a Cosmos SDK node's LCD REST gateway.
pub struct LcdStakingService {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct PageResponse {
    #[serde(default)]
    next_key: Option<String>,
}

#[derive(Deserialize)]
struct ValidatorsResponse {
    #[serde(default)]
    validators: Vec<Validator>,
    #[serde(default)]
    pagination: Option<PageResponse>,
}

#[derive(Deserialize)]
struct ValidatorDelegationsResponse {
    #[serde(default)]
    delegation_responses: Vec<DelegationRecord>,
    #[serde(default)]
    pagination: Option<PageResponse>,
}

#[derive(Deserialize)]
struct NodeInfoResponse {
    default_node_info: Option<DefaultNodeInfo>,
}

#[derive(Deserialize)]
struct DefaultNodeInfo {
    #[serde(default)]
    network: String,
    #[serde(default)]
    version: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

fn next_key(pagination: Option<PageResponse>) -> Option<String> {
    pagination.and_then(|p| p.next_key)
}

impl LcdStakingService {
    /// Builds the client and checks the node is reachable before any staking query runs.
    pub async fn connect(endpoint: &str, timeout: Duration) -> Result<Self, ConnectionError> {
        info!("Connecting to staking node at {}...", endpoint);
        let url = Url::parse(endpoint).map_err(|e| ConnectionError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConnectionError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ConnectionError::Client)?;
        let service = Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
        };

        let response = service
            .client
            .get(service.route("/cosmos/base/tendermint/v1beta1/node_info"))
            .send()
            .await
            .map_err(|source| ConnectionError::Unreachable {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectionError::Unhealthy {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        match response.json::<NodeInfoResponse>().await {
            Ok(NodeInfoResponse {
                default_node_info: Some(node_info),
            }) => info!(
                "Connected to network {} (node version {})",
                node_info.network, node_info.version
            ),
            Ok(_) | Err(_) => warn!("Node info response was not understood, continuing"),
        }

        Ok(service)
    }

    fn route(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_page<R: DeserializeOwned>(
        &self,
        query: &'static str,
        path: &str,
        page: &PageRequest,
    ) -> Result<R, RemoteQueryError> {
        let mut request = self
            .client
            .get(self.route(path))
            .query(&[("pagination.limit", page.limit.to_string())]);
        if let Some(key) = &page.key {
            request = request.query(&[("pagination.key", key)]);
        }

        let response = request
            .send()
            .await
            .map_err(|source| RemoteQueryError::Transport { query, source })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| RemoteQueryError::Transport { query, source })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| body.trim().to_string());
            return Err(RemoteQueryError::Status {
                query,
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|source| RemoteQueryError::Decode { query, source })
    }
}

#[async_trait]
impl RemoteStakingService for LcdStakingService {
    async fn list_validators(&self, page: PageRequest) -> Result<Page<Validator>, RemoteQueryError> {
        let response: ValidatorsResponse = self
            .get_page(VALIDATORS_QUERY, "/cosmos/staking/v1beta1/validators", &page)
            .await?;
        Ok(Page::new(response.validators, next_key(response.pagination)))
    }

    async fn list_validator_delegations(
        &self,
        validator_address: &str,
        page: PageRequest,
    ) -> Result<Page<DelegationRecord>, RemoteQueryError> {
        let path = format!(
            "/cosmos/staking/v1beta1/validators/{}/delegations",
            validator_address
        );
        let response: ValidatorDelegationsResponse = self
            .get_page(VALIDATOR_DELEGATIONS_QUERY, &path, &page)
            .await?;
        Ok(Page::new(
            response.delegation_responses,
            next_key(response.pagination),
        ))
    }
}
