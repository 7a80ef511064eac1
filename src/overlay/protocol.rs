//! Overlay Wire Protocol
//!
//! Defines the HTTP binding of the five peer RPCs and the Data Transfer
//! Objects they exchange. Node references travel as
//! `{ host, port, id: 40-char lowercase hex }`.

use serde::{Deserialize, Serialize};

use super::types::NodeRef;

/// Path prefix of the overlay RPC binding.
pub const API_PREFIX: &str = "/dht/v1";

/// Read endpoint returning the immediate successor.
pub const ENDPOINT_SUCCESSOR: &str = "/successor";
/// Read endpoint returning the predecessor, 404 when none is known.
pub const ENDPOINT_PREDECESSOR: &str = "/predecessor";
/// Read endpoint returning the full successor cache.
pub const ENDPOINT_SUCCESSOR_LIST: &str = "/successors";
/// Write endpoint carrying a predecessor candidacy (`?Host=..&Port=..`).
pub const ENDPOINT_NOTIFY: &str = "/notify";

/// Answer to a `successor/{id}` lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct FindSuccessorResponse {
    /// Number of forwards the lookup took so far.
    pub hops: u32,
    /// The node responsible for the requested identifier.
    pub successor: NodeRef,
}

/// Query parameters of the lookup endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    /// Hop count accumulated by the forwarding peer, 0 for fresh lookups.
    pub hops: Option<u32>,
}

/// Query parameters of the notify endpoint. The caller announces its own
/// endpoint; the receiver derives the ring position itself.
#[derive(Debug, Serialize, Deserialize)]
pub struct NotifyParams {
    #[serde(rename = "Host")]
    pub host: String,
    #[serde(rename = "Port")]
    pub port: u16,
}

/// Operator-facing dump of the node's routing state, served on the health
/// endpoint for the external console.
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeStateDump {
    pub local: NodeRef,
    pub predecessor: Option<NodeRef>,
    pub successors: Vec<NodeRef>,
    /// Distinct non-self nodes currently referenced by the finger table.
    pub known_fingers: Vec<NodeRef>,
    pub cpu_usage: f32,
    pub mem_used_mb: u64,
    pub mem_total_mb: u64,
}
