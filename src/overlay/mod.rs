//! Overlay Maintenance Module
//!
//! Implements the routing layer of a single Chord peer: the routing state
//! record, the `find_successor` lookup engine, the inbound notify protocol,
//! and the four periodic stabilization tasks that repair the ring under
//! churn.
//!
//! ## Core Mechanisms
//! - **Successor cache**: A short list of the nearest live successors.
//!   Slot 0 is the immediate successor; the rest absorb successor failures
//!   without losing the ring.
//! - **Finger table**: 160 routing shortcuts, entry `i` pointing at the
//!   best-known successor of `local + 2^i`. Lookups take the largest safe
//!   leap toward the target, giving O(log N) expected hops.
//! - **Stabilization**: Background tasks refresh one finger per second,
//!   probe the predecessor, repair the successor slot, and re-join through
//!   the seed if the ring splits. A stale entry only costs extra hops, so
//!   the lookup path never takes long-held locks.
//! - **Peer client**: All outbound calls go through the [`client::PeerClient`]
//!   trait, so the whole layer runs against an in-process transport in
//!   tests.

pub mod client;
pub mod handlers;
pub mod node;
pub mod protocol;
pub mod state;
pub mod types;
