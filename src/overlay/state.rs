use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use super::types::{Finger, NodeRef, FINGER_TABLE_SIZE, SUCCESSOR_LIST_SIZE};

/// The routing state of one overlay node.
///
/// Everything the stabilizer tasks and the lookup engine share lives here.
/// Each field is guarded on its own and every critical section is a plain
/// read-or-swap, so no lock is ever held across an RPC. Readers may observe
/// a table mid-refresh; a stale entry only costs a lookup extra hops.
pub struct RoutingState {
    local: NodeRef,
    seed: RwLock<NodeRef>,
    predecessor: RwLock<Option<NodeRef>>,
    successors: RwLock<Vec<NodeRef>>,
    fingers: RwLock<Vec<Finger>>,
    next_finger: AtomicUsize,
    rejoin_has_run: AtomicBool,
}

impl RoutingState {
    /// Creates the state of a solo ring: the node is its own successor, every
    /// finger points at it, the predecessor is unknown and the seed is the
    /// node itself until a join replaces it.
    pub fn new(local: NodeRef) -> Self {
        let successors = vec![local.clone(); SUCCESSOR_LIST_SIZE];
        let fingers = (0..FINGER_TABLE_SIZE)
            .map(|i| Finger {
                start: local.id.finger_start(i),
                node: local.clone(),
            })
            .collect();

        Self {
            seed: RwLock::new(local.clone()),
            local,
            predecessor: RwLock::new(None),
            successors: RwLock::new(successors),
            fingers: RwLock::new(fingers),
            next_finger: AtomicUsize::new(0),
            rejoin_has_run: AtomicBool::new(false),
        }
    }

    /// The immutable identity of this node.
    pub fn local(&self) -> &NodeRef {
        &self.local
    }

    /// The bootstrap peer. Starts as `local` and is replaced on join.
    pub fn seed(&self) -> NodeRef {
        self.seed.read().unwrap().clone()
    }

    pub fn set_seed(&self, seed: NodeRef) {
        *self.seed.write().unwrap() = seed;
    }

    /// The immediate successor (slot 0 of the cache).
    pub fn successor(&self) -> NodeRef {
        self.successors.read().unwrap()[0].clone()
    }

    /// Stores `node` as the immediate successor. A reference with an empty
    /// host or port zero can only come from a bug upstream, so this fails
    /// loudly instead of corrupting the ring.
    pub fn set_successor(&self, node: NodeRef) {
        assert!(!node.host.is_empty(), "successor must have a host");
        assert_ne!(node.port, 0, "successor must have a port");
        self.successors.write().unwrap()[0] = node;
    }

    /// A copy of the whole successor cache, nearest first.
    pub fn successors(&self) -> Vec<NodeRef> {
        self.successors.read().unwrap().clone()
    }

    /// Replaces the successor cache wholesale. Slot 0 obeys the same
    /// invariant as [`RoutingState::set_successor`].
    pub fn replace_successors(&self, list: Vec<NodeRef>) {
        assert!(!list.is_empty(), "successor cache cannot be empty");
        assert!(!list[0].host.is_empty(), "successor must have a host");
        assert_ne!(list[0].port, 0, "successor must have a port");
        *self.successors.write().unwrap() = list;
    }

    pub fn predecessor(&self) -> Option<NodeRef> {
        self.predecessor.read().unwrap().clone()
    }

    pub fn set_predecessor(&self, node: Option<NodeRef>) {
        *self.predecessor.write().unwrap() = node;
    }

    /// A copy of finger entry `i`.
    pub fn finger(&self, index: usize) -> Finger {
        self.fingers.read().unwrap()[index].clone()
    }

    /// A copy of the full finger table.
    pub fn fingers(&self) -> Vec<Finger> {
        self.fingers.read().unwrap().clone()
    }

    /// Points finger entry `index` at `node`, keeping its arc start.
    /// Out-of-range indices are ignored.
    pub fn replace_finger(&self, index: usize, node: NodeRef) {
        let mut fingers = self.fingers.write().unwrap();
        if index >= fingers.len() {
            return;
        }
        fingers[index].node = node;
    }

    /// Hands out the next finger index to refresh and advances the
    /// round-robin cursor, wrapping at the table size. Only the finger
    /// refresh task calls this.
    pub fn take_next_finger(&self) -> usize {
        let cursor = self.next_finger.load(Ordering::Relaxed);
        let index = if cursor >= FINGER_TABLE_SIZE { 0 } else { cursor };
        self.next_finger.store(index + 1, Ordering::Relaxed);
        index
    }

    /// Flips the rejoin grace flag, reporting whether it was already set.
    /// The first stabilizer tick after startup uses the `false` return as a
    /// grace period.
    pub fn rejoin_grace_elapsed(&self) -> bool {
        self.rejoin_has_run.swap(true, Ordering::Relaxed)
    }
}
