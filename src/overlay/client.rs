use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::protocol::{
    FindSuccessorResponse, NotifyParams, API_PREFIX, ENDPOINT_NOTIFY, ENDPOINT_PREDECESSOR,
    ENDPOINT_SUCCESSOR, ENDPOINT_SUCCESSOR_LIST,
};
use super::types::NodeRef;
use crate::ring::Id;

/// Per-request deadline. A peer that takes longer is treated as unreachable.
const RPC_TIMEOUT: Duration = Duration::from_secs(2);

/// Outbound RPC capability toward any peer in the overlay.
///
/// The routing layer only ever talks to other nodes through this trait, so
/// tests can swap in an in-process transport. No implementation retries:
/// per the stabilization design, the calling task decides what a failure
/// means.
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// The peer's immediate successor. Fails when the peer is unreachable,
    /// which doubles as the liveness probe.
    async fn get_successor(&self, peer: &NodeRef) -> Result<NodeRef>;

    /// The peer's predecessor, `None` when the peer reports not having one.
    /// Transport errors are surfaced, not mapped to `None`.
    async fn get_predecessor(&self, peer: &NodeRef) -> Result<Option<NodeRef>>;

    /// Asks the peer to resolve `target`, continuing a lookup that has
    /// already taken `hops` forwards.
    async fn find_successor(&self, peer: &NodeRef, target: Id, hops: u32)
        -> Result<(u32, NodeRef)>;

    /// The peer's successor cache, nearest first.
    async fn get_successors(&self, peer: &NodeRef) -> Result<Vec<NodeRef>>;

    /// Tells the peer that `candidate` believes it is the peer's
    /// predecessor. One-way; callers tolerate failure.
    async fn notify(&self, peer: &NodeRef, candidate: &NodeRef) -> Result<()>;
}

/// [`PeerClient`] over the HTTP reference binding.
pub struct HttpPeerClient {
    http: reqwest::Client,
}

impl HttpPeerClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, peer: &NodeRef, endpoint: &str) -> String {
        format!("http://{}:{}{}{}", peer.host, peer.port, API_PREFIX, endpoint)
    }

    async fn get(&self, url: String) -> Result<reqwest::Response> {
        let response = self.http.get(url).timeout(RPC_TIMEOUT).send().await?;
        Ok(response)
    }
}

impl Default for HttpPeerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    async fn get_successor(&self, peer: &NodeRef) -> Result<NodeRef> {
        let response = self.get(self.url(peer, ENDPOINT_SUCCESSOR)).await?;
        if !response.status().is_success() {
            return Err(anyhow!("successor request to {} failed: {}", peer, response.status()));
        }
        Ok(response.json().await?)
    }

    async fn get_predecessor(&self, peer: &NodeRef) -> Result<Option<NodeRef>> {
        let response = self.get(self.url(peer, ENDPOINT_PREDECESSOR)).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow!("predecessor request to {} failed: {}", peer, response.status()));
        }
        Ok(response.json().await?)
    }

    async fn find_successor(
        &self,
        peer: &NodeRef,
        target: Id,
        hops: u32,
    ) -> Result<(u32, NodeRef)> {
        let url = format!(
            "{}/{}?hops={}",
            self.url(peer, ENDPOINT_SUCCESSOR),
            target.to_hex(),
            hops
        );
        let response = self.get(url).await?;
        if !response.status().is_success() {
            return Err(anyhow!("lookup of {} via {} failed: {}", target, peer, response.status()));
        }
        let answer: FindSuccessorResponse = response.json().await?;
        Ok((answer.hops, answer.successor))
    }

    async fn get_successors(&self, peer: &NodeRef) -> Result<Vec<NodeRef>> {
        let response = self.get(self.url(peer, ENDPOINT_SUCCESSOR_LIST)).await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "successor list request to {} failed: {}",
                peer,
                response.status()
            ));
        }
        Ok(response.json().await?)
    }

    async fn notify(&self, peer: &NodeRef, candidate: &NodeRef) -> Result<()> {
        let params = NotifyParams {
            host: candidate.host.clone(),
            port: candidate.port,
        };
        let response = self
            .http
            .post(self.url(peer, ENDPOINT_NOTIFY))
            .query(&params)
            .timeout(RPC_TIMEOUT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!("notify to {} failed: {}", peer, response.status()));
        }
        Ok(())
    }
}
