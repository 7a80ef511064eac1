use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::task::JoinHandle;

use super::client::PeerClient;
use super::state::RoutingState;
use super::types::{NodeRef, MAX_LOOKUP_HOPS, SUCCESSOR_LIST_SIZE};
use crate::ring::{in_range_exclusive, in_range_inclusive, Id};

const FIX_FINGER_INTERVAL: Duration = Duration::from_secs(1);
const CHECK_PREDECESSOR_INTERVAL: Duration = Duration::from_secs(5);
const STABILIZE_SUCCESSORS_INTERVAL: Duration = Duration::from_secs(5);
const REJOIN_INTERVAL: Duration = Duration::from_secs(30);

/// One peer of the overlay: routing state plus the logic that maintains it.
///
/// Constructed as a solo ring, optionally joined to an existing ring through
/// a seed, then kept correct by four periodic tasks launched with
/// [`ChordNode::start`]. Inbound RPC handlers call [`ChordNode::find_successor`]
/// and [`ChordNode::notify`] directly; all outbound traffic goes through the
/// injected [`PeerClient`].
pub struct ChordNode {
    pub state: RoutingState,
    client: Arc<dyn PeerClient>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ChordNode {
    pub fn new(local: NodeRef, client: Arc<dyn PeerClient>) -> Arc<Self> {
        Arc::new(Self {
            state: RoutingState::new(local),
            client,
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn local(&self) -> &NodeRef {
        self.state.local()
    }

    /// Resolves the node responsible for `target`.
    ///
    /// If the target falls between this node and its successor, the
    /// successor owns it and the lookup ends here. Otherwise the query is
    /// forwarded to the closest live finger preceding the target, carrying
    /// the incremented hop count. Transport failures and lookups that
    /// exceed the hop ceiling surface as errors; the caller decides whether
    /// to retry.
    pub async fn find_successor(&self, target: Id, hops: u32) -> Result<(u32, NodeRef)> {
        if hops >= MAX_LOOKUP_HOPS {
            return Err(anyhow!(
                "lookup of {} abandoned after {} hops",
                target,
                hops
            ));
        }

        let successor = self.state.successor();
        if in_range_inclusive(target, self.local().id, successor.id) {
            return Ok((hops, successor));
        }

        let next = self.closest_preceding_finger(target).await;
        if next == *self.local() {
            // No live finger precedes the target; the local successor is
            // the best answer we can give.
            return Ok((hops, self.state.successor()));
        }
        self.client.find_successor(&next, target, hops + 1).await
    }

    /// Picks the live node from the finger table that most closely precedes
    /// `target`, falling back to the successor cache and finally to the
    /// local node itself.
    ///
    /// The table is walked from the highest index down so the query takes
    /// the largest safe leap toward the target. Every candidate is probed
    /// with a cheap RPC before it is handed a query.
    async fn closest_preceding_finger(&self, target: Id) -> NodeRef {
        let local = self.local().clone();

        let fingers = self.state.fingers();
        for entry in fingers.iter().rev() {
            let candidate = &entry.node;
            if *candidate == local {
                continue;
            }
            if !in_range_exclusive(candidate.id, local.id, target) {
                continue;
            }
            if self.client.get_successor(candidate).await.is_ok() {
                return candidate.clone();
            }
            tracing::debug!("Skipping dead finger {}", candidate);
        }

        for candidate in self.state.successors() {
            if candidate == local {
                continue;
            }
            if !in_range_exclusive(candidate.id, local.id, target) {
                continue;
            }
            if self.client.get_successor(&candidate).await.is_ok() {
                return candidate;
            }
            tracing::debug!("Skipping dead cached successor {}", candidate);
        }

        local
    }

    /// Handles a peer announcing itself as this node's predecessor.
    ///
    /// The candidate is adopted when no predecessor is known, or when it
    /// sits between the current predecessor and this node. Anything else is
    /// ignored, which makes repeated and out-of-order calls harmless.
    pub fn notify(&self, candidate: NodeRef) {
        match self.state.predecessor() {
            None => {
                tracing::info!("Learned predecessor {}", candidate);
                self.state.set_predecessor(Some(candidate));
            }
            Some(current) => {
                if in_range_inclusive(candidate.id, current.id, self.local().id) {
                    tracing::info!("Predecessor advanced from {} to {}", current, candidate);
                    self.state.set_predecessor(Some(candidate));
                }
            }
        }
    }

    /// Joins the ring the seed belongs to.
    ///
    /// Stores the seed, verifies it answers at all, then asks it to resolve
    /// this node's own position; the answer becomes the immediate
    /// successor. The predecessor is left untouched: the upstream node will
    /// introduce itself through `notify` once stabilization runs.
    pub async fn join(&self, seed: NodeRef) -> Result<()> {
        self.state.set_seed(seed.clone());

        if let Err(e) = self.client.get_successor(&seed).await {
            return Err(anyhow!("seed {} is unreachable: {}", seed, e));
        }

        let (_, successor) = self
            .client
            .find_successor(&seed, self.local().id, 0)
            .await?;
        self.state.set_successor(successor.clone());
        tracing::info!("Joined ring via seed {}; successor is {}", seed, successor);
        Ok(())
    }

    /// Refreshes one finger table entry, round-robin over the whole table.
    pub async fn fix_next_finger(&self) {
        let index = self.state.take_next_finger();
        let start = self.state.finger(index).start;

        match self.find_successor(start, 0).await {
            Ok((_, node)) => self.state.replace_finger(index, node),
            Err(e) => tracing::error!("Refresh of finger {} failed: {}", index, e),
        }
    }

    /// Drops the predecessor if it stopped answering. Recovery is left to
    /// the next `notify` from upstream.
    pub async fn check_predecessor(&self) {
        let Some(predecessor) = self.state.predecessor() else {
            return;
        };
        if let Err(e) = self.client.get_successor(&predecessor).await {
            tracing::error!("Predecessor {} stopped responding: {}", predecessor, e);
            self.state.set_predecessor(None);
        }
    }

    /// Repairs successor slot 0 and refreshes the successor cache.
    ///
    /// The successor's predecessor may turn out to be a closer successor
    /// for this node; if so it is adopted. When the successor is gone (or
    /// knows no predecessor), the cache supplies a replacement. When the
    /// whole cache is dead the ring is declared inconsistent and the node
    /// rejoins through its seed.
    pub async fn stabilize_successors(&self) {
        let local = self.local().clone();
        let successor = self.state.successor();

        let between = match self.client.get_predecessor(&successor).await {
            Ok(Some(x)) => Some(x),
            Ok(None) => None,
            Err(e) => {
                tracing::error!("Successor {} is unreachable: {}", successor, e);
                None
            }
        };

        if let Some(x) = between {
            let adopted = if in_range_inclusive(x.id, local.id, successor.id) {
                tracing::info!("Adopting closer successor {}", x);
                self.state.set_successor(x.clone());
                x
            } else {
                successor
            };

            if let Err(e) = self.client.notify(&adopted, &local).await {
                tracing::debug!("Notify to {} failed: {}", adopted, e);
            }
            self.refresh_successor_cache(&adopted).await;
            return;
        }

        // Successor gone or knows no predecessor: first live cache entry
        // takes over.
        for candidate in self.state.successors() {
            if self.client.get_successor(&candidate).await.is_err() {
                continue;
            }
            self.state.set_successor(candidate.clone());
            if let Err(e) = self.client.notify(&candidate, &local).await {
                tracing::debug!("Notify to {} failed: {}", candidate, e);
            }
            self.refresh_successor_cache(&candidate).await;
            return;
        }

        tracing::error!("Ring consistency lost: no cached successor answers");
        let seed = self.state.seed();
        if let Err(e) = self.join(seed).await {
            tracing::error!("Rejoin through seed failed: {}", e);
        }
    }

    /// Pulls the adopted successor's cache and shifts it down by one slot
    /// behind the successor itself.
    async fn refresh_successor_cache(&self, adopted: &NodeRef) {
        match self.client.get_successors(adopted).await {
            Ok(remote) => {
                let mut list = Vec::with_capacity(SUCCESSOR_LIST_SIZE);
                list.push(adopted.clone());
                list.extend(remote.into_iter().take(SUCCESSOR_LIST_SIZE - 1));
                self.state.replace_successors(list);
            }
            Err(e) => {
                tracing::warn!("Could not refresh successor cache from {}: {}", adopted, e);
            }
        }
    }

    /// Verifies the seed is still reachable through the ring and rejoins it
    /// if the overlay has split.
    ///
    /// The very first tick is a grace period: right after startup the ring
    /// legitimately does not know the seed yet.
    pub async fn rejoin(&self) {
        if !self.state.rejoin_grace_elapsed() {
            return;
        }

        let seed = self.state.seed();
        match self.find_successor(seed.id, 0).await {
            Ok((_, owner)) if owner.id == seed.id => return,
            Ok(_) => {}
            Err(e) => tracing::debug!("Ring lookup of seed {} failed: {}", seed, e),
        }

        // The ring does not resolve the seed to itself. If the seed is
        // down that is plain churn; if it answers, the overlay has
        // partitioned and we are on the wrong side.
        if self.client.get_successor(&seed).await.is_err() {
            return;
        }
        tracing::warn!("Seed {} is alive but not on our ring; rejoining", seed);
        if let Err(e) = self.join(seed).await {
            tracing::error!("Rejoin through seed failed: {}", e);
        }
    }

    /// Launches the four maintenance tasks. Any previously launched set is
    /// cancelled first, so calling this twice does not double the ticks.
    pub fn start(self: &Arc<Self>) {
        let mut tasks = self.tasks.lock().unwrap();
        for task in tasks.drain(..) {
            task.abort();
        }
        tracing::info!("Starting overlay stabilization tasks");

        let node = Arc::clone(self);
        tasks.push(tokio::spawn(async move {
            let mut ticks = tokio::time::interval(FIX_FINGER_INTERVAL);
            loop {
                ticks.tick().await;
                node.fix_next_finger().await;
            }
        }));

        let node = Arc::clone(self);
        tasks.push(tokio::spawn(async move {
            let mut ticks = tokio::time::interval(CHECK_PREDECESSOR_INTERVAL);
            loop {
                ticks.tick().await;
                node.check_predecessor().await;
            }
        }));

        let node = Arc::clone(self);
        tasks.push(tokio::spawn(async move {
            let mut ticks = tokio::time::interval(STABILIZE_SUCCESSORS_INTERVAL);
            loop {
                ticks.tick().await;
                node.stabilize_successors().await;
            }
        }));

        let node = Arc::clone(self);
        tasks.push(tokio::spawn(async move {
            let mut ticks = tokio::time::interval(REJOIN_INTERVAL);
            loop {
                ticks.tick().await;
                node.rejoin().await;
            }
        }));
    }

    /// Cancels the maintenance tasks and waits for them to wind down.
    /// In-flight RPCs are abandoned; no durable state is at risk.
    pub async fn stop(&self) {
        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().unwrap().drain(..).collect();
        for task in &tasks {
            task.abort();
        }
        for task in tasks {
            let _ = task.await;
        }
        tracing::info!("Overlay stabilization tasks stopped");
    }
}
