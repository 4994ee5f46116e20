//! Attack collision detection and resolution.
//!
//! Detection is a pair of pure predicates over attacker hitbox and defender
//! body. Resolution consumes a positive detection exactly once by clearing
//! the attacker's flag before applying the hit, so one swing lands at most
//! once no matter how many ticks the boxes keep overlapping.

use duel_common::{MatchError, Rect, Side, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fighter::{AttackKind, Fighter, Strike};

/// Checks whether `attacker`'s upper attack reaches `defender` this tick.
///
/// Requires an unblocked defender, a live upper attack, and overlap of the
/// hitbox with the defender's body on both axes. The vertical test uses the
/// hitbox's own band, level with the top of the attacker's body.
#[must_use]
pub fn detect_upper_attack(attacker: &Fighter, defender: &Fighter) -> bool {
    if defender.is_blocking() || !attacker.is_attacking_upper() {
        return false;
    }
    let hitbox = attacker.attack_hitbox();
    let body = defender.body.rect();
    hitbox.overlaps_horizontally(&body) && hitbox.overlaps_vertically(&body)
}

/// Checks whether `attacker`'s lower attack reaches `defender` this tick.
///
/// Same as [`detect_upper_attack`] but the band is dropped to the bottom of
/// the attacker's body, by `attacker.height - hitbox.height`.
#[must_use]
pub fn detect_lower_attack(attacker: &Fighter, defender: &Fighter) -> bool {
    if defender.is_blocking() || !attacker.is_attacking_lower() {
        return false;
    }
    let hitbox = attacker.attack_hitbox();
    let body = defender.body.rect();
    let band = lower_band(&hitbox, attacker.body.height);
    hitbox.overlaps_horizontally(&body) && band.overlaps_vertically(&body)
}

/// Dispatches to the predicate for `kind`.
#[must_use]
pub fn detect_attack(kind: AttackKind, attacker: &Fighter, defender: &Fighter) -> bool {
    match kind {
        AttackKind::Upper => detect_upper_attack(attacker, defender),
        AttackKind::Lower => detect_lower_attack(attacker, defender),
    }
}

fn lower_band(hitbox: &Rect, owner_height: f32) -> Rect {
    hitbox.translated(Vec2::new(0.0, owner_height - hitbox.height))
}

/// Borrows both fighters mutably, attacker first.
pub fn pair_mut(fighters: &mut [Fighter; 2], attacker: Side) -> (&mut Fighter, &mut Fighter) {
    let (first, second) = fighters.split_at_mut(1);
    match attacker {
        Side::Player => (&mut first[0], &mut second[0]),
        Side::Enemy => (&mut second[0], &mut first[0]),
    }
}

/// One landed attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitReport {
    /// Side that landed the attack
    pub attacker: Side,
    /// Side that was hit
    pub defender: Side,
    /// What the hit did
    pub strike: Strike,
    /// Defender health after the hit
    pub defender_health: f32,
}

/// Per-tick collision pass over both fighters.
#[derive(Debug, Clone, Default)]
pub struct CombatResolver {
    /// Total hits landed since creation
    hits_landed: u64,
}

impl CombatResolver {
    /// Creates a new resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hits landed so far.
    #[must_use]
    pub fn hits_landed(&self) -> u64 {
        self.hits_landed
    }

    /// Resolves one tick for a match's two fighters.
    ///
    /// Checks player-on-enemy then enemy-on-player for the upper attack, then
    /// the same pair for the lower attack. Every check runs every tick.
    pub fn resolve(&mut self, fighters: &mut [Fighter; 2]) -> Result<Vec<HitReport>, MatchError> {
        let mut hits = Vec::new();
        for kind in [AttackKind::Upper, AttackKind::Lower] {
            for side in Side::ALL {
                let (attacker, defender) = pair_mut(fighters, side);
                if let Some(hit) = self.resolve_between(kind, attacker, defender)? {
                    hits.push(hit);
                }
            }
        }
        Ok(hits)
    }

    /// Resolves one attack kind from `attacker` onto `defender`.
    ///
    /// Pairing a fighter with another on the same side is a caller bug.
    pub fn resolve_between(
        &mut self,
        kind: AttackKind,
        attacker: &mut Fighter,
        defender: &mut Fighter,
    ) -> Result<Option<HitReport>, MatchError> {
        if attacker.side() == defender.side() {
            return Err(MatchError::SameSide(attacker.side()));
        }
        if !detect_attack(kind, attacker, defender) {
            return Ok(None);
        }

        attacker.consume_attack(kind);
        let strike = attacker.apply_attack(kind, defender);
        self.hits_landed += 1;

        debug!(
            attacker = %attacker.side(),
            defender = %defender.side(),
            ?kind,
            damage = strike.damage,
            health = defender.health(),
            "attack landed"
        );

        Ok(Some(HitReport {
            attacker: attacker.side(),
            defender: defender.side(),
            strike,
            defender_health: defender.health(),
        }))
    }
}
