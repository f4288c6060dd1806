//! HTTP backends for the destination-chain seams.
//!
//! Both talk JSON to a relay service that owns the actual signing and
//! submission. Client errors from the relay mean the chain said no;
//! server and connection errors are transport failures.

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::gateway::error::GatewayError;
use crate::traits::{ClaimGateway, RootRegistry};
use crate::types::{
    digest_from_hex, to_0x_hex, ClaimReceipt, Digest32, EpochCommitment, MembershipProof,
};

fn json_client() -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}

fn classify_send_error(e: reqwest::Error) -> anyhow::Error {
    if e.is_timeout() {
        GatewayError::Timeout.into()
    } else {
        GatewayError::Transport(e.to_string()).into()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimRequest<'a> {
    holder_address: &'a str,
    token_ids: &'a [u64],
    leaf: String,
    siblings: Vec<String>,
}

/// Claim submission through a relay endpoint.
pub struct HttpClaimGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClaimGateway {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: json_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ClaimGateway for HttpClaimGateway {
    fn name(&self) -> &'static str {
        "http-gateway"
    }

    async fn submit_claim(
        &self,
        holder_address: &str,
        token_ids: &[u64],
        proof: &MembershipProof,
    ) -> Result<ClaimReceipt> {
        let url = format!("{}/claims", self.base_url);
        let request = ClaimRequest {
            holder_address,
            token_ids,
            leaf: to_0x_hex(&proof.leaf),
            siblings: proof.siblings.iter().map(|s| to_0x_hex(s)).collect(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::Rejected(body).into())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::Transport(format!("{status}: {body}")).into())
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RootPublishRequest {
    epoch: u64,
    root: String,
    leaf_count: u64,
    committed_at: u64,
}

#[derive(Deserialize)]
struct RootResponse {
    root: String,
}

/// Published-root surface through the relay's admin endpoint.
pub struct HttpRootRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRootRegistry {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: json_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_root(&self, url: &str) -> Result<Option<Digest32>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(GatewayError::Transport(format!("{status}: {body}")));
        }

        let parsed: RootResponse = response.json().await?;
        match digest_from_hex(&parsed.root) {
            Some(root) => Ok(Some(root)),
            None => bail!("registry returned a malformed root: {}", parsed.root),
        }
    }
}

#[async_trait]
impl RootRegistry for HttpRootRegistry {
    fn name(&self) -> &'static str {
        "http-registry"
    }

    async fn publish(&self, commitment: &EpochCommitment) -> Result<()> {
        let url = format!("{}/roots", self.base_url);
        let request = RootPublishRequest {
            epoch: commitment.epoch,
            root: to_0x_hex(&commitment.root),
            leaf_count: commitment.leaf_count,
            committed_at: commitment.committed_at,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(GatewayError::Rejected(body).into())
        } else {
            Err(GatewayError::Transport(format!("{status}: {body}")).into())
        }
    }

    async fn published_root(&self, epoch: u64) -> Result<Option<Digest32>> {
        self.fetch_root(&format!("{}/roots/{epoch}", self.base_url))
            .await
    }

    async fn latest_root(&self) -> Result<Option<Digest32>> {
        self.fetch_root(&format!("{}/roots/latest", self.base_url))
            .await
    }
}
