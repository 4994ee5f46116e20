//! Match event bus.
//!
//! The controller publishes what happened each tick; HUDs, loggers and
//! summaries drain the bus at their own pace.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use duel_common::Side;

use crate::ability::AbilityKind;
use crate::fighter::AttackKind;

/// Something observable that happened during a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// A fighter's health changed
    HealthChanged {
        /// Whose health
        side: Side,
        /// New value, 0..=100
        health: f32,
    },
    /// A fighter's power meter changed
    PowerChanged {
        /// Whose meter
        side: Side,
        /// New value, 0..=100
        power: f32,
    },
    /// An attack connected
    Hit {
        /// Side that landed it
        attacker: Side,
        /// Side that took it
        defender: Side,
        /// Upper or lower
        kind: AttackKind,
        /// Health removed
        damage: f32,
    },
    /// A special ability started
    AbilityActivated {
        /// Who used it
        side: Side,
        /// Which one
        ability: AbilityKind,
    },
    /// A special ability ran out
    AbilityExpired {
        /// Whose ability
        side: Side,
        /// Which one
        ability: AbilityKind,
    },
    /// A fighter left the ring
    RingOut {
        /// Who fell out
        side: Side,
    },
    /// A fighter reached zero health
    KnockedOut {
        /// Who went down
        side: Side,
    },
    /// The match has a winner
    MatchOver {
        /// Winning side
        winner: Side,
        /// Display text, e.g. "Player Wins"
        message: String,
    },
    /// Simulation paused
    Paused,
    /// Simulation resumed
    Resumed,
    /// Match restarted with the same characters
    Reset,
}

/// Bounded broadcast channel for match events.
///
/// When nobody drains it the oldest pending events give way to new ones, so
/// the latest outcome is always readable.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<MatchEvent>,
    /// Receiver for collecting events
    receiver: Receiver<MatchEvent>,
    /// Channel capacity
    capacity: usize,
    /// Events discarded to make room
    dropped: AtomicU64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
            dropped: AtomicU64::new(0),
        }
    }

    /// Publishes an event to the bus, evicting the oldest pending event
    /// if the bus is full.
    pub fn publish(&self, mut event: MatchEvent) {
        loop {
            match self.sender.try_send(event) {
                Err(TrySendError::Full(rejected)) => {
                    if self.receiver.try_recv().is_ok() {
                        self.note_drop();
                    }
                    event = rejected;
                },
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    fn note_drop(&self) {
        let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        if dropped == 1 {
            warn!(capacity = self.capacity, "event bus full, dropping oldest events");
        } else {
            debug!(dropped, "event bus overflow");
        }
    }

    /// Returns how many events were evicted because the bus was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<MatchEvent> {
        self.receiver.try_iter().collect()
    }

    /// Drains pending events into a handler, returning how many were handled.
    pub fn dispatch(&self, handler: &mut dyn EventHandler) -> usize {
        let mut handled = 0;
        for event in self.receiver.try_iter() {
            handler.handle(&event);
            handled += 1;
        }
        handled
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<MatchEvent> {
        self.sender.clone()
    }
}

/// Consumer of match events.
pub trait EventHandler {
    /// Handles an event.
    fn handle(&mut self, event: &MatchEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        hits: usize,
        other: usize,
    }

    impl EventHandler for Counter {
        fn handle(&mut self, event: &MatchEvent) {
            match event {
                MatchEvent::Hit { .. } => self.hits += 1,
                _ => self.other += 1,
            }
        }
    }

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        bus.publish(MatchEvent::Paused);
        bus.publish(MatchEvent::Resumed);
        assert_eq!(bus.pending_count(), 2);

        let events = bus.drain();
        assert_eq!(events, vec![MatchEvent::Paused, MatchEvent::Resumed]);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_keeps_newest() {
        let bus = EventBus::new(2);
        for side in [Side::Player, Side::Enemy, Side::Player, Side::Enemy] {
            bus.publish(MatchEvent::RingOut { side });
        }
        bus.publish(MatchEvent::Reset);

        assert_eq!(bus.dropped(), 3);
        assert_eq!(
            bus.drain(),
            vec![MatchEvent::RingOut { side: Side::Enemy }, MatchEvent::Reset]
        );
    }

    #[test]
    fn test_dispatch() {
        let bus = EventBus::default();
        let sender = bus.sender();
        sender
            .send(MatchEvent::Hit {
                attacker: Side::Player,
                defender: Side::Enemy,
                kind: AttackKind::Upper,
                damage: 5.0,
            })
            .expect("bus has room");
        bus.publish(MatchEvent::RingOut { side: Side::Enemy });

        let mut counter = Counter::default();
        assert_eq!(bus.dispatch(&mut counter), 2);
        assert_eq!(counter.hits, 1);
        assert_eq!(counter.other, 1);
    }
}
