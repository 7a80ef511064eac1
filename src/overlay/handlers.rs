//! Overlay API Handlers
//!
//! HTTP endpoints that expose the routing layer to peers. Each handler
//! translates a request into a call on [`ChordNode`] and maps the outcome
//! onto a status code. Malformed requests are rejected before any state is
//! touched.

use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use sysinfo::System;

use super::node::ChordNode;
use super::protocol::{FindSuccessorResponse, LookupQuery, NodeStateDump, NotifyParams};
use super::types::NodeRef;
use crate::ring::Id;

/// Returns the immediate successor.
pub async fn handle_successor(Extension(node): Extension<Arc<ChordNode>>) -> Json<NodeRef> {
    Json(node.state.successor())
}

/// Returns the predecessor, or 404 while none is known.
pub async fn handle_predecessor(
    Extension(node): Extension<Arc<ChordNode>>,
) -> (StatusCode, Json<Option<NodeRef>>) {
    match node.state.predecessor() {
        Some(predecessor) => (StatusCode::OK, Json(Some(predecessor))),
        None => (StatusCode::NOT_FOUND, Json(None)),
    }
}

/// Resolves the node responsible for the identifier in the path.
///
/// `hops` carries the forward count of a lookup already in flight; fresh
/// lookups omit it. A lookup that cannot reach any live predecessor of the
/// target reports 502, since the failure sits with a remote peer.
pub async fn handle_find_successor(
    Extension(node): Extension<Arc<ChordNode>>,
    Path(id_hex): Path<String>,
    Query(query): Query<LookupQuery>,
) -> (StatusCode, Json<Option<FindSuccessorResponse>>) {
    let target = match Id::from_hex(&id_hex) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Rejected lookup with bad identifier: {}", e);
            return (StatusCode::BAD_REQUEST, Json(None));
        }
    };

    match node.find_successor(target, query.hops.unwrap_or(0)).await {
        Ok((hops, successor)) => (
            StatusCode::OK,
            Json(Some(FindSuccessorResponse { hops, successor })),
        ),
        Err(e) => {
            tracing::error!("Lookup of {} failed: {}", target, e);
            (StatusCode::BAD_GATEWAY, Json(None))
        }
    }
}

/// Returns the full successor cache, nearest first.
pub async fn handle_successor_list(
    Extension(node): Extension<Arc<ChordNode>>,
) -> Json<Vec<NodeRef>> {
    Json(node.state.successors())
}

/// Accepts a predecessor candidacy from a peer.
pub async fn handle_notify(
    Extension(node): Extension<Arc<ChordNode>>,
    Query(params): Query<NotifyParams>,
) -> StatusCode {
    if params.host.is_empty() || params.port == 0 {
        tracing::error!("Rejected notify with empty endpoint");
        return StatusCode::BAD_REQUEST;
    }

    node.notify(NodeRef::new(params.host, params.port));
    StatusCode::OK
}

/// Dumps the routing state for the operator console.
pub async fn handle_state_dump(Extension(node): Extension<Arc<ChordNode>>) -> Json<NodeStateDump> {
    let local = node.local().clone();
    let mut known_fingers: Vec<NodeRef> = Vec::new();
    for finger in node.state.fingers() {
        if finger.node != local && !known_fingers.contains(&finger.node) {
            known_fingers.push(finger.node);
        }
    }

    let mut sys = System::new_all();
    sys.refresh_cpu();
    sys.refresh_memory();
    let cpu_usage = sys.global_cpu_info().cpu_usage();
    // sysinfo returns bytes for memory values.
    let mem_total_mb = sys.total_memory() / (1024 * 1024);
    let mem_used_mb = sys.used_memory() / (1024 * 1024);

    Json(NodeStateDump {
        local,
        predecessor: node.state.predecessor(),
        successors: node.state.successors(),
        known_fingers,
        cpu_usage,
        mem_used_mb,
        mem_total_mb,
    })
}
