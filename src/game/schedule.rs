//! Deferred, cancelable actions
//!
//! Every pending action is keyed by the entity that owns it and a `TimerKey`.
//! Scheduling an action that is already pending replaces it, cancelling is
//! idempotent, and due actions are returned in due-time order with ties broken
//! by scheduling order so a seeded run always replays the same way.

use hashbrown::HashMap;

use crate::game::state::EntityId;

/// Named action slots. An owner has at most one pending action per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Arm a UFO's gun (and kamikaze homing)
    EnableAttack,
    /// Move a parked UFO to its entry point and start it moving
    Launch,
    /// Remove a UFO with the warp-out effect
    WarpOut,
    /// Remove a laser at the end of its lifetime
    Expire,
}

/// A timer that came due during `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Due {
    pub owner: EntityId,
    pub key: TimerKey,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    at: f64,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: f64,
    next_seq: u64,
    pending: HashMap<(EntityId, TimerKey), Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds of simulated time advanced so far
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Run `key` for `owner` after `delay` seconds, replacing any pending entry
    pub fn schedule(&mut self, owner: EntityId, key: TimerKey, delay: f32) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let at = self.now + f64::from(delay.max(0.0));
        self.pending.insert((owner, key), Pending { at, seq });
    }

    /// Returns true if something was pending
    pub fn cancel(&mut self, owner: EntityId, key: TimerKey) -> bool {
        self.pending.remove(&(owner, key)).is_some()
    }

    /// Drop every pending action of `owner`
    pub fn cancel_owner(&mut self, owner: EntityId) {
        self.pending.retain(|&(o, _), _| o != owner);
    }

    pub fn is_pending(&self, owner: EntityId, key: TimerKey) -> bool {
        self.pending.contains_key(&(owner, key))
    }

    /// Seconds until the action fires
    pub fn remaining(&self, owner: EntityId, key: TimerKey) -> Option<f32> {
        self.pending
            .get(&(owner, key))
            .map(|p| (p.at - self.now).max(0.0) as f32)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Move the clock forward and take every action that is now due
    pub fn advance(&mut self, dt: f32) -> Vec<Due> {
        self.now += f64::from(dt);
        let now = self.now;

        let mut due: Vec<(f64, u64, Due)> = self
            .pending
            .iter()
            .filter(|(_, p)| p.at <= now)
            .map(|(&(owner, key), p)| (p.at, p.seq, Due { owner, key }))
            .collect();
        if due.is_empty() {
            return Vec::new();
        }

        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (_, _, d) in &due {
            self.pending.remove(&(d.owner, d.key));
        }
        due.into_iter().map(|(_, _, d)| d).collect()
    }
}
