use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ring::{Id, ID_BITS};

/// Number of entries kept in the successor cache.
pub const SUCCESSOR_LIST_SIZE: usize = 3;

/// Number of finger table entries, one per bit of the identifier space.
pub const FINGER_TABLE_SIZE: usize = ID_BITS;

/// Safety ceiling on forwarded lookup hops. A lookup that travels further
/// than twice around the finger space is looping through churned state and
/// is surfaced as a failure instead.
pub const MAX_LOOKUP_HOPS: u32 = 2 * ID_BITS as u32;

/// Immutable reference to a node in the overlay.
///
/// The ring position is derived from the endpoint at construction time and
/// travels with the reference on the wire (the id serializes as 40-char
/// lowercase hex). Two references denote the same node when their endpoints
/// match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRef {
    /// Hostname or IP the node's RPC endpoint listens on.
    pub host: String,
    /// TCP port of the RPC endpoint.
    pub port: u16,
    /// Ring position, `SHA1("{host}:{port}")` read little-endian.
    pub id: Id,
}

impl NodeRef {
    /// Builds a reference to the node at `host:port`, deriving its ring
    /// position.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let id = Id::from_endpoint(&host, port);
        Self { host, port, id }
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host && self.port == other.port
    }
}

impl Eq for NodeRef {}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// One finger table entry: the best-known successor of `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finger {
    /// Arc start this entry covers: `(local + 2^i) mod 2^160`.
    pub start: Id,
    /// Best-known successor of `start`. Not necessarily live right now.
    pub node: NodeRef,
}
