//! Chord Overlay Node Library
//!
//! This library crate defines the core modules of a single peer in a
//! Chord-style distributed hash table overlay. It serves as the foundation
//! for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The node is composed of two loosely coupled subsystems:
//!
//! - **`ring`**: The identifier algebra. Maps network endpoints onto 160-bit
//!   ring positions via SHA-1 and provides the modular range predicates that
//!   every routing decision is built on.
//! - **`overlay`**: The overlay-maintenance layer. Holds the routing state
//!   (successor cache, finger table, predecessor), runs the `find_successor`
//!   lookup engine, serves the inbound peer RPCs, and drives the periodic
//!   stabilization tasks that keep the ring correct under churn.
//!
//! Key/value placement, replication and client APIs are layered on top of
//! this crate and are not part of it.

pub mod overlay;
pub mod ring;
