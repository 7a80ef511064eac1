//! Ring Module Tests
//!
//! Validates the identifier algebra that all routing decisions depend on.
//!
//! ## Test Scopes
//! - **Hashing**: Deterministic endpoint-to-position mapping, pinned against
//!   a known SHA-1 digest.
//! - **Hex Codec**: Fixed-width round-trip and rejection of malformed input.
//! - **Range Predicates**: Wrap-around arcs, whole-ring arcs, and the
//!   totality of the inclusive predicate.
//! - **Finger Starts**: Modular `2^i` offsets including wrap past zero.

use num_bigint::BigUint;

use super::id::{in_range_exclusive, in_range_inclusive, Id, ID_BITS, ID_BYTES};

/// Builds an id from a small integer literal.
fn id(value: u64) -> Id {
    Id::from(BigUint::from(value))
}

/// Builds an id counting down from the top of the ring: `2^160 - back`.
fn id_from_top(back: u64) -> Id {
    Id::from(BigUint::from(2u8).pow(ID_BITS as u32) - BigUint::from(back))
}

// ============================================================
// ENDPOINT HASHING TESTS
// ============================================================

#[test]
fn test_known_endpoint_position() {
    // SHA1("localhost:5000") = 74ed504d...885af8ed, read little-endian.
    let position = Id::from_endpoint("localhost", 5000);
    assert_eq!(
        position.to_hex(),
        "edf85a88d3a64c0d5a54d9404a890ae14d50ed74"
    );
}

#[test]
fn test_hash_is_deterministic() {
    let a = Id::from_endpoint("localhost", 5000);
    let b = Id::from_endpoint("localhost", 5000);
    assert_eq!(a, b);
}

#[test]
fn test_distinct_endpoints_hash_apart() {
    let a = Id::from_endpoint("localhost", 5000);
    let b = Id::from_endpoint("localhost", 5001);
    let c = Id::from_endpoint("127.0.0.1", 5000);
    assert_ne!(a, b);
    assert_ne!(a, c);
}

// ============================================================
// HEX CODEC TESTS
// ============================================================

#[test]
fn test_hex_round_trip() {
    let samples = vec![
        id(0),
        id(1),
        id(0xdead_beef),
        id_from_top(1),
        Id::from_endpoint("localhost", 5000),
    ];

    for sample in samples {
        let hex = sample.to_hex();
        assert_eq!(hex.len(), ID_BYTES * 2, "hex must be fixed-width");
        assert_eq!(hex, hex.to_lowercase(), "hex must be lowercase");
        assert_eq!(Id::from_hex(&hex).unwrap(), sample);
    }
}

#[test]
fn test_hex_rejects_malformed_input() {
    assert!(Id::from_hex("").is_err());
    assert!(Id::from_hex("abc123").is_err());
    // 39 and 41 characters
    assert!(Id::from_hex(&"0".repeat(39)).is_err());
    assert!(Id::from_hex(&"0".repeat(41)).is_err());
    // right width, bad characters
    assert!(Id::from_hex(&"zz".repeat(20)).is_err());
}

#[test]
fn test_serde_wire_form_is_hex_string() {
    let position = Id::from_endpoint("localhost", 5000);
    let json = serde_json::to_string(&position).unwrap();
    assert_eq!(json, "\"edf85a88d3a64c0d5a54d9404a890ae14d50ed74\"");

    let restored: Id = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, position);

    assert!(serde_json::from_str::<Id>("\"not-an-id\"").is_err());
}

// ============================================================
// RANGE PREDICATE TESTS
// ============================================================

#[test]
fn test_inclusive_plain_arc() {
    assert!(in_range_inclusive(id(5), id(1), id(10)));
    assert!(in_range_inclusive(id(10), id(1), id(10)), "upper bound is included");
    assert!(!in_range_inclusive(id(1), id(1), id(10)), "lower bound is excluded");
    assert!(!in_range_inclusive(id(11), id(1), id(10)));
}

#[test]
fn test_inclusive_wrap_around_arc() {
    // Arc (2^160 - 3, 10] crosses zero.
    let start = id_from_top(3);
    let end = id(10);

    assert!(in_range_inclusive(id(5), start, end));
    assert!(in_range_inclusive(id_from_top(2), start, end));
    assert!(!in_range_inclusive(id(15), start, end));
    assert!(!in_range_inclusive(id_from_top(3), start, end));
}

#[test]
fn test_coincident_bounds_cover_whole_ring() {
    let bound = id(42);
    for probe in [id(0), id(41), id(42), id(43), id_from_top(1)] {
        assert!(in_range_inclusive(probe, bound, bound));
        assert!(in_range_exclusive(probe, bound, bound));
    }
}

#[test]
fn test_exclusive_excludes_both_bounds() {
    assert!(in_range_exclusive(id(5), id(1), id(10)));
    assert!(!in_range_exclusive(id(1), id(1), id(10)));
    assert!(!in_range_exclusive(id(10), id(1), id(10)));

    // Wrapping arc (2^160 - 3, 10)
    let start = id_from_top(3);
    assert!(in_range_exclusive(id_from_top(2), start, id(10)));
    assert!(in_range_exclusive(id(9), start, id(10)));
    assert!(!in_range_exclusive(id(10), start, id(10)));
    assert!(!in_range_exclusive(id(15), start, id(10)));
}

#[test]
fn test_inclusive_predicate_totality() {
    // For every triple with distinct bounds and a probe equal to neither
    // bound, the probe lies in exactly one of the two opposing arcs.
    let samples = [
        id(0),
        id(1),
        id(7),
        id(100),
        id(0xffff_ffff),
        id_from_top(5),
        id_from_top(1),
        Id::from_endpoint("localhost", 5000),
        Id::from_endpoint("localhost", 5001),
    ];

    for a in &samples {
        for b in &samples {
            if a == b {
                continue;
            }
            for probe in &samples {
                if probe == a || probe == b {
                    continue;
                }
                let forward = in_range_inclusive(*probe, *a, *b);
                let backward = in_range_inclusive(*probe, *b, *a);
                assert!(
                    forward ^ backward,
                    "probe {} must be in exactly one of ({}, {}] and ({}, {}]",
                    probe,
                    a,
                    b,
                    b,
                    a
                );
            }
        }
    }
}

// ============================================================
// FINGER START TESTS
// ============================================================

#[test]
fn test_finger_start_offsets() {
    let base = Id::from_endpoint("localhost", 5000);
    let base_value = BigUint::from(base);
    let modulus = BigUint::from(2u8).pow(ID_BITS as u32);

    for i in [0usize, 1, 7, 63, 159] {
        let expected = Id::from((base_value.clone() + BigUint::from(2u8).pow(i as u32)) % &modulus);
        assert_eq!(base.finger_start(i), expected, "finger {} start", i);
    }

    assert_eq!(id(0).finger_start(0), id(1));
    assert_eq!(id(0).finger_start(159), Id::from(BigUint::from(2u8).pow(159)));
}

#[test]
fn test_finger_start_wraps_past_zero() {
    assert_eq!(id_from_top(1).finger_start(0), id(0));
    assert_eq!(id_from_top(1).finger_start(1), id(1));
}
