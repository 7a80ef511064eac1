//! Identifier Ring Module
//!
//! Implements the 160-bit identifier space that the overlay is built on.
//! Every node endpoint hashes onto a position in `[0, 2^160)`, and all
//! routing decisions reduce to arc-membership questions on this ring.
//!
//! ## Core Concepts
//! - **Hashing**: `host:port` is hashed with SHA-1 and the digest is read as
//!   a little-endian unsigned integer. Two nodes that disagree on this
//!   convention compute different positions for the same endpoint and
//!   cannot federate.
//! - **Wrap-around**: The space is cyclic. Both range predicates handle arcs
//!   that cross zero, and an arc whose bounds coincide covers the whole
//!   ring.
//! - **Predicates**: `in_range_inclusive` answers "is this id owned by my
//!   successor?" (upper bound included); `in_range_exclusive` answers "is
//!   this finger strictly between me and the target?" (both bounds
//!   excluded).

pub mod id;

pub use id::{in_range_exclusive, in_range_inclusive, Id, ID_BITS, ID_BYTES};

#[cfg(test)]
mod tests;
