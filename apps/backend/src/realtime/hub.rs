use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::match_state::{MatchStatus, TurnRecord};
use crate::domain::match_transition::MatchTransition;

const DEFAULT_CAPACITY: usize = 64;

/// Published after a match transaction commits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchUpdate {
    pub match_id: String,
    pub version: i32,
    pub status: MatchStatus,
    pub transitions: Vec<MatchTransition>,
    pub turn: Option<TurnRecord>,
}

/// Per-match broadcast channels. Cloning shares the registry.
#[derive(Debug, Clone)]
pub struct MatchHub {
    channels: Arc<DashMap<String, broadcast::Sender<Arc<MatchUpdate>>>>,
    capacity: usize,
}

impl Default for MatchHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MatchHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, match_id: &str) -> MatchSubscription {
        let rx = self
            .channels
            .entry(match_id.to_owned())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();
        debug!(match_id, "match subscription opened");
        MatchSubscription {
            match_id: match_id.to_owned(),
            rx: Some(rx),
            hub: self.clone(),
        }
    }

    /// Fans the update out to current subscribers; returns how many got it.
    pub fn publish(&self, update: MatchUpdate) -> usize {
        let Some(tx) = self.channels.get(&update.match_id).map(|e| e.value().clone()) else {
            return 0;
        };
        match tx.send(Arc::new(update)) {
            Ok(delivered) => delivered,
            Err(broadcast::error::SendError(update)) => {
                self.prune(&update.match_id);
                0
            }
        }
    }

    pub fn subscriber_count(&self, match_id: &str) -> usize {
        self.channels
            .get(match_id)
            .map_or(0, |tx| tx.receiver_count())
    }

    /// Drops the channel once nobody listens. Runs under the shard lock, so
    /// a concurrent `subscribe` either lands first or recreates the entry.
    fn prune(&self, match_id: &str) {
        self.channels
            .remove_if(match_id, |_, tx| tx.receiver_count() == 0);
    }
}

/// Receives updates for one match until dropped; dropping unsubscribes.
#[derive(Debug)]
pub struct MatchSubscription {
    match_id: String,
    rx: Option<broadcast::Receiver<Arc<MatchUpdate>>>,
    hub: MatchHub,
}

impl MatchSubscription {
    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    /// Next update. Slow subscribers skip what they missed and carry on from
    /// the newest; every update carries the full version so nothing is lost.
    pub async fn recv(&mut self) -> Option<Arc<MatchUpdate>> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(update) => return Some(update),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(match_id = %self.match_id, skipped, "match subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn try_recv(&mut self) -> Option<Arc<MatchUpdate>> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.try_recv() {
                Ok(update) => return Some(update),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

impl Drop for MatchSubscription {
    fn drop(&mut self) {
        drop(self.rx.take());
        self.hub.prune(&self.match_id);
    }
}
