//! The fighter: a body plus health, power, attacks, blocking and abilities.
//!
//! Every operation that a player or bot can request is gated the way the
//! game feels: a refused request is a silent no-op that returns `false`, never
//! an error. Health and power are clamped to `[0, 100]` where they change.

use duel_common::{FighterId, Rect, Side, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ability::{AbilityKind, AbilityState};
use crate::animation::{AnimationAction, AnimationFlags, Animator};
use crate::body::Body;
use crate::clock::Countdown;
use crate::config::MatchConfig;
use crate::profile::CharacterProfile;

/// Full health.
pub const MAX_HEALTH: f32 = 100.0;
/// Full power meter.
pub const MAX_POWER: f32 = 100.0;

/// Horizontal movement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MoveDirection {
    /// Move left
    Left,
    /// Move right
    Right,
    /// No horizontal input
    #[default]
    Hold,
}

impl MoveDirection {
    /// Sign of the horizontal axis.
    #[must_use]
    pub const fn axis(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
            Self::Hold => 0.0,
        }
    }
}

/// The two attacks every fighter has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    /// High strike; pushes the target
    Upper,
    /// Low strike
    Lower,
}

impl AttackKind {
    /// Animation shown while the attack window is open.
    #[must_use]
    pub const fn action(self) -> AnimationAction {
        match self {
            Self::Upper => AnimationAction::AttackUpper,
            Self::Lower => AnimationAction::AttackLower,
        }
    }
}

/// Tick lengths of a fighter's timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterTimings {
    /// Active window of either attack
    pub attack_window: u32,
    /// Upper attack cooldown
    pub upper_cooldown: u32,
    /// Lower attack cooldown
    pub lower_cooldown: u32,
    /// Special ability duration
    pub ability_duration: u32,
}

impl FighterTimings {
    /// Converts a match config's millisecond durations to ticks.
    #[must_use]
    pub fn from_config(config: &MatchConfig) -> Self {
        Self {
            attack_window: config.attack_window_ticks(),
            upper_cooldown: config.upper_cooldown_ticks(),
            lower_cooldown: config.lower_cooldown_ticks(),
            ability_duration: config.ability_duration_ticks(),
        }
    }
}

impl Default for FighterTimings {
    fn default() -> Self {
        Self::from_config(&MatchConfig::default())
    }
}

/// Result of landing one attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strike {
    /// Which attack landed
    pub kind: AttackKind,
    /// Health actually removed from the target
    pub damage: f32,
    /// Signed horizontal displacement applied to the target
    pub push: f32,
    /// Attacker power after the hit
    pub attacker_power: f32,
}

/// Timer transitions that happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerEvents {
    /// An ability ran out and reverted
    pub ability_expired: Option<AbilityKind>,
    /// The upper cooldown ended
    pub upper_ready: bool,
    /// The lower cooldown ended
    pub lower_ready: bool,
}

/// One combatant in a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fighter {
    id: FighterId,
    side: Side,
    profile: CharacterProfile,
    timings: FighterTimings,
    /// Physical body
    pub body: Body,
    health: f32,
    power: f32,
    is_attacking_upper: bool,
    is_attacking_lower: bool,
    upper_window: Countdown,
    lower_window: Countdown,
    upper_cooldown: Countdown,
    lower_cooldown: Countdown,
    blocking: bool,
    moving: bool,
    dead: bool,
    animator: Animator,
    ability: AbilityState,
}

impl Fighter {
    /// Creates a fighter at full health with an empty meter.
    #[must_use]
    pub fn new(side: Side, profile: CharacterProfile, spawn: Vec2, timings: FighterTimings) -> Self {
        let body = Body::new(spawn, profile.width, profile.height);
        Self {
            id: FighterId::new(),
            side,
            profile,
            timings,
            body,
            health: MAX_HEALTH,
            power: 0.0,
            is_attacking_upper: false,
            is_attacking_lower: false,
            upper_window: Countdown::IDLE,
            lower_window: Countdown::IDLE,
            upper_cooldown: Countdown::IDLE,
            lower_cooldown: Countdown::IDLE,
            blocking: false,
            moving: false,
            dead: false,
            animator: Animator::new(),
            ability: AbilityState::default(),
        }
    }

    /// Unique ID.
    #[must_use]
    pub fn id(&self) -> FighterId {
        self.id
    }

    /// Side this fighter plays on.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Character profile.
    #[must_use]
    pub fn profile(&self) -> &CharacterProfile {
        &self.profile
    }

    /// Timer lengths.
    #[must_use]
    pub fn timings(&self) -> FighterTimings {
        self.timings
    }

    /// Current health in `[0, 100]`.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Current power in `[0, 100]`.
    #[must_use]
    pub fn power(&self) -> f32 {
        self.power
    }

    /// Whether the upper attack can still land.
    #[must_use]
    pub fn is_attacking_upper(&self) -> bool {
        self.is_attacking_upper
    }

    /// Whether the lower attack can still land.
    #[must_use]
    pub fn is_attacking_lower(&self) -> bool {
        self.is_attacking_lower
    }

    /// Whether the upper attack's cooldown has elapsed.
    #[must_use]
    pub fn can_attack_upper(&self) -> bool {
        !self.upper_cooldown.is_running()
    }

    /// Whether the lower attack's cooldown has elapsed.
    #[must_use]
    pub fn can_attack_lower(&self) -> bool {
        !self.lower_cooldown.is_running()
    }

    /// Ticks left on an attack's cooldown.
    #[must_use]
    pub fn cooldown_remaining(&self, kind: AttackKind) -> u32 {
        match kind {
            AttackKind::Upper => self.upper_cooldown.remaining(),
            AttackKind::Lower => self.lower_cooldown.remaining(),
        }
    }

    /// Whether either attack window is open.
    #[must_use]
    pub fn in_attack_window(&self) -> bool {
        self.upper_window.is_running() || self.lower_window.is_running()
    }

    /// Whether the block stance is held.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// Whether the fighter is mid-jump.
    #[must_use]
    pub fn is_jumping(&self) -> bool {
        self.body.is_jumping
    }

    /// Whether horizontal input is active.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Whether the fighter has been knocked out.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Current animation action.
    #[must_use]
    pub fn current_action(&self) -> AnimationAction {
        self.animator.action()
    }

    /// Current sprite frame.
    #[must_use]
    pub fn frame(&self) -> u32 {
        self.animator.frame()
    }

    /// Running special ability state.
    #[must_use]
    pub fn ability(&self) -> &AbilityState {
        &self.ability
    }

    /// Upper attack damage including active modifiers.
    #[must_use]
    pub fn upper_damage(&self) -> f32 {
        self.profile.upper_damage * self.ability.effect().damage_multiplier
    }

    /// Lower attack damage including active modifiers.
    #[must_use]
    pub fn lower_damage(&self) -> f32 {
        self.profile.lower_damage * self.ability.effect().damage_multiplier
    }

    /// Push distance including active modifiers.
    #[must_use]
    pub fn push_effect(&self) -> f32 {
        self.profile.push_effect * self.ability.effect().push_multiplier
    }

    /// The rectangle the fighter's attacks reach this tick.
    ///
    /// Sits directly in front of the body on the facing side, top-aligned
    /// with it, shifted by the profile's offset.
    #[must_use]
    pub fn attack_hitbox(&self) -> Rect {
        let shape = self.profile.hitbox;
        let x = if self.body.facing_right {
            self.body.position.x + self.body.width + shape.offset.x
        } else {
            self.body.position.x - shape.width - shape.offset.x
        };
        Rect::new(
            Vec2::new(x, self.body.position.y + shape.offset.y),
            shape.width,
            shape.height,
        )
    }

    /// Sets horizontal velocity. Suppressed while blocking or knocked out.
    pub fn request_move(&mut self, direction: MoveDirection) -> bool {
        if self.blocking || self.dead {
            self.body.velocity.x = 0.0;
            self.moving = false;
            return false;
        }
        self.body.velocity.x = direction.axis() * self.profile.move_speed;
        self.moving = direction != MoveDirection::Hold;
        true
    }

    /// Starts a jump unless already airborne.
    pub fn request_jump(&mut self) -> bool {
        if self.body.is_jumping || self.dead {
            return false;
        }
        self.body.velocity.y = -self.profile.jump_impulse;
        self.body.is_jumping = true;
        true
    }

    /// Starts the upper attack. See [`Fighter::start_attack`].
    pub fn start_attack_upper(&mut self) -> bool {
        self.start_attack(AttackKind::Upper)
    }

    /// Starts the lower attack. See [`Fighter::start_attack`].
    pub fn start_attack_lower(&mut self) -> bool {
        self.start_attack(AttackKind::Lower)
    }

    /// Starts an attack.
    ///
    /// Refused while the attack is cooling down, while jumping, while
    /// blocking, or while any attack window is open. On success the
    /// cooldown and the active window start together.
    pub fn start_attack(&mut self, kind: AttackKind) -> bool {
        let ready = match kind {
            AttackKind::Upper => self.can_attack_upper(),
            AttackKind::Lower => self.can_attack_lower(),
        };
        if !ready || self.dead || self.body.is_jumping || self.blocking || self.in_attack_window() {
            return false;
        }

        let window = self.timings.attack_window;
        match kind {
            AttackKind::Upper => {
                self.upper_cooldown.start(self.timings.upper_cooldown);
                self.upper_window.start(window);
                self.is_attacking_upper = true;
            },
            AttackKind::Lower => {
                self.lower_cooldown.start(self.timings.lower_cooldown);
                self.lower_window.start(window);
                self.is_attacking_lower = true;
            },
        }
        self.animator.set_action(kind.action());
        true
    }

    /// Consumes a landed attack so the same swing cannot hit again.
    pub fn consume_attack(&mut self, kind: AttackKind) {
        match kind {
            AttackKind::Upper => self.is_attacking_upper = false,
            AttackKind::Lower => self.is_attacking_lower = false,
        }
    }

    /// Enters or leaves the block stance. Blocking stops horizontal motion.
    pub fn set_blocking(&mut self, blocking: bool) {
        if self.dead {
            return;
        }
        self.blocking = blocking;
        if blocking {
            self.body.velocity.x = 0.0;
            self.moving = false;
        }
    }

    /// Lands an upper attack on `target`: damage, push, power gain.
    pub fn apply_upper_attack(&mut self, target: &mut Fighter) -> Strike {
        self.apply_attack(AttackKind::Upper, target)
    }

    /// Lands a lower attack on `target`: damage and power gain.
    pub fn apply_lower_attack(&mut self, target: &mut Fighter) -> Strike {
        self.apply_attack(AttackKind::Lower, target)
    }

    /// Lands an attack on `target`.
    ///
    /// The upper attack always pushes the target in the attacker's facing
    /// direction; the lower one only while a knockback ability runs.
    pub fn apply_attack(&mut self, kind: AttackKind, target: &mut Fighter) -> Strike {
        let effect = self.ability.effect();
        let damage = match kind {
            AttackKind::Upper => self.upper_damage(),
            AttackKind::Lower => self.lower_damage(),
        };
        let pushes = kind == AttackKind::Upper || effect.lower_attack_pushes;
        let push = if pushes {
            let direction = if self.body.facing_right { 1.0 } else { -1.0 };
            self.push_effect() * direction
        } else {
            0.0
        };

        let dealt = target.take_damage(damage);
        target.body.shove(push);
        self.gain_power(self.profile.power_increment);

        Strike {
            kind,
            damage: dealt,
            push,
            attacker_power: self.power,
        }
    }

    /// Removes health, clamped at zero. Returns the health actually removed.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health - amount.max(0.0)).clamp(0.0, MAX_HEALTH);
        before - self.health
    }

    /// Adds power, clamped at the meter's maximum.
    pub fn gain_power(&mut self, amount: f32) {
        self.power = (self.power + amount.max(0.0)).clamp(0.0, MAX_POWER);
    }

    /// Drops health to zero regardless of what is left.
    pub fn knock_out(&mut self) {
        self.health = 0.0;
    }

    /// Puts the fighter in its death state: no attacks, no motion, no block.
    pub fn mark_dead(&mut self) {
        if self.dead {
            return;
        }
        self.dead = true;
        self.health = 0.0;
        self.is_attacking_upper = false;
        self.is_attacking_lower = false;
        self.upper_window.cancel();
        self.lower_window.cancel();
        self.blocking = false;
        self.moving = false;
        self.body.velocity.x = 0.0;
        self.ability.clear();
        self.animator.set_action(AnimationAction::Death);
    }

    /// Fires `kind` if it is this fighter's ability and the meter is full.
    ///
    /// On success the effect is applied for the configured duration and
    /// the meter empties. Anything else is a no-op.
    pub fn try_ability(&mut self, kind: AbilityKind) -> bool {
        if self.dead || self.power < MAX_POWER || self.profile.ability != kind {
            return false;
        }

        if kind.effect().restores_health {
            self.health = MAX_HEALTH;
        }
        self.ability.activate(kind, self.timings.ability_duration);
        self.power = 0.0;
        debug!(side = %self.side, ability = kind.display_name(), "special ability activated");
        true
    }

    /// Fires this fighter's own ability. See [`Fighter::try_ability`].
    pub fn activate_special(&mut self) -> bool {
        self.try_ability(self.profile.ability)
    }

    /// Advances every countdown by one tick.
    ///
    /// A closing attack window clears its attacking flag and drops the
    /// attack animation back to idle.
    pub fn tick_timers(&mut self) -> TimerEvents {
        if self.upper_window.tick() {
            self.is_attacking_upper = false;
            if self.animator.action() == AnimationAction::AttackUpper {
                self.animator.set_action(AnimationAction::Idle);
            }
        }
        if self.lower_window.tick() {
            self.is_attacking_lower = false;
            if self.animator.action() == AnimationAction::AttackLower {
                self.animator.set_action(AnimationAction::Idle);
            }
        }

        let upper_ready = self.upper_cooldown.tick();
        let lower_ready = self.lower_cooldown.tick();
        let ability_expired = self.ability.tick();
        if let Some(kind) = ability_expired {
            debug!(side = %self.side, ability = kind.display_name(), "special ability expired");
        }

        TimerEvents {
            ability_expired,
            upper_ready,
            lower_ready,
        }
    }

    /// Flags the animation state machine reads.
    #[must_use]
    pub fn animation_flags(&self) -> AnimationFlags {
        AnimationFlags {
            dead: self.dead,
            upper_window: self.upper_window.is_running(),
            lower_window: self.lower_window.is_running(),
            airborne: self.body.is_jumping,
            blocking: self.blocking,
            moving: self.moving,
        }
    }

    /// Re-selects the animation action from the current flags.
    pub fn update_animation(&mut self) -> bool {
        let action = AnimationAction::select(self.animation_flags());
        self.animator.set_action(action)
    }

    /// Advances the sprite frame cursor one tick.
    pub fn advance_frame(&mut self) {
        let sheet = self.profile.sprites.get(self.animator.action());
        self.animator.advance(sheet.frames_max, sheet.frames_hold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter(side: Side, x: f32) -> Fighter {
        let profile = CharacterProfile::new("Test", AbilityKind::Fury);
        Fighter::new(side, profile, Vec2::new(x, 476.0), FighterTimings::default())
    }

    #[test]
    fn test_new_fighter_defaults() {
        let f = fighter(Side::Player, 0.0);
        assert_eq!(f.health(), 100.0);
        assert_eq!(f.power(), 0.0);
        assert!(f.can_attack_upper());
        assert!(f.can_attack_lower());
        assert_eq!(f.current_action(), AnimationAction::Idle);
    }

    #[test]
    fn test_move_suppressed_while_blocking() {
        let mut f = fighter(Side::Player, 0.0);
        assert!(f.request_move(MoveDirection::Right));
        assert_eq!(f.body.velocity.x, 5.0);

        f.set_blocking(true);
        assert_eq!(f.body.velocity.x, 0.0);
        assert!(!f.request_move(MoveDirection::Left));
        assert_eq!(f.body.velocity.x, 0.0);
        assert!(!f.is_moving());

        f.set_blocking(false);
        assert!(f.request_move(MoveDirection::Left));
        assert_eq!(f.body.velocity.x, -5.0);
    }

    #[test]
    fn test_no_double_jump() {
        let mut f = fighter(Side::Player, 0.0);
        assert!(f.request_jump());
        assert_eq!(f.body.velocity.y, -10.0);
        f.body.velocity.y = -3.0;
        assert!(!f.request_jump());
        assert_eq!(f.body.velocity.y, -3.0);
    }

    #[test]
    fn test_attack_gated_by_jump_and_block() {
        let mut f = fighter(Side::Player, 0.0);
        f.request_jump();
        assert!(!f.start_attack_upper());
        assert!(f.can_attack_upper());

        let mut f = fighter(Side::Player, 0.0);
        f.set_blocking(true);
        assert!(!f.start_attack_lower());
        assert!(f.can_attack_lower());
    }

    #[test]
    fn test_attack_windows_are_exclusive() {
        let mut f = fighter(Side::Player, 0.0);
        assert!(f.start_attack_upper());
        assert!(!f.start_attack_lower());
        assert!(f.is_attacking_upper());
        assert!(!f.is_attacking_lower());
        assert_eq!(f.current_action(), AnimationAction::AttackUpper);
    }

    #[test]
    fn test_upper_cooldown_law() {
        let mut f = fighter(Side::Player, 0.0);
        let cooldown = f.timings().upper_cooldown;
        assert!(f.start_attack_upper());
        assert!(!f.can_attack_upper());

        for _ in 0..cooldown - 1 {
            f.tick_timers();
            assert!(!f.start_attack_upper());
        }
        assert!(!f.can_attack_upper());

        let events = f.tick_timers();
        assert!(events.upper_ready);
        assert!(f.can_attack_upper());
        assert!(f.start_attack_upper());
    }

    #[test]
    fn test_window_closes_before_cooldown() {
        let mut f = fighter(Side::Player, 0.0);
        let window = f.timings().attack_window;
        f.start_attack_lower();
        for _ in 0..window {
            f.tick_timers();
        }
        assert!(!f.is_attacking_lower());
        assert_eq!(f.current_action(), AnimationAction::Idle);
        // Dead period: no hitbox and still cooling down
        assert!(!f.can_attack_lower());
        assert!(!f.start_attack_lower());
        // The other attack is free once the window has closed
        assert!(f.start_attack_upper());
    }

    #[test]
    fn test_hitbox_follows_facing() {
        let mut f = fighter(Side::Player, 100.0);
        f.body.facing_right = true;
        let hitbox = f.attack_hitbox();
        assert_eq!(hitbox.position.x, 150.0);
        assert_eq!(hitbox.width, 100.0);
        assert_eq!(hitbox.position.y, f.body.position.y);

        f.body.facing_right = false;
        assert_eq!(f.attack_hitbox().position.x, 0.0);
    }

    #[test]
    fn test_upper_attack_pushes_in_facing_direction() {
        let mut a = fighter(Side::Player, 100.0);
        let mut b = fighter(Side::Enemy, 140.0);
        a.body.facing_right = true;

        let strike = a.apply_upper_attack(&mut b);
        assert_eq!(strike.damage, 5.0);
        assert_eq!(strike.push, 200.0);
        assert_eq!(b.body.position.x, 340.0);
        assert_eq!(b.health(), 95.0);
        assert_eq!(a.power(), 35.0);

        a.body.facing_right = false;
        a.apply_upper_attack(&mut b);
        assert_eq!(b.body.position.x, 140.0);
    }

    #[test]
    fn test_lower_attack_does_not_push() {
        let mut a = fighter(Side::Player, 100.0);
        let mut b = fighter(Side::Enemy, 140.0);
        let strike = a.apply_lower_attack(&mut b);
        assert_eq!(strike.push, 0.0);
        assert_eq!(b.body.position.x, 140.0);
        assert_eq!(b.health(), 90.0);
    }

    #[test]
    fn test_power_and_health_clamp() {
        let mut a = fighter(Side::Player, 100.0);
        let mut b = fighter(Side::Enemy, 140.0);
        for hit in 1..=10 {
            a.apply_upper_attack(&mut b);
            if hit == 3 {
                assert_eq!(a.power(), 100.0);
            }
        }
        assert_eq!(a.power(), 100.0);
        assert_eq!(b.health(), 50.0);

        for _ in 0..20 {
            a.apply_lower_attack(&mut b);
        }
        assert_eq!(b.health(), 0.0);
    }

    #[test]
    fn test_ability_requires_matching_kind_and_full_meter() {
        let mut f = fighter(Side::Player, 0.0);
        assert!(!f.try_ability(AbilityKind::Fury));

        f.gain_power(100.0);
        assert!(!f.try_ability(AbilityKind::Surge));
        assert_eq!(f.power(), 100.0);

        assert!(f.try_ability(AbilityKind::Fury));
        assert_eq!(f.power(), 0.0);
        assert_eq!(f.upper_damage(), 10.0);
        assert!(!f.try_ability(AbilityKind::Fury));
    }

    #[test]
    fn test_ability_reverts() {
        let mut f = fighter(Side::Player, 0.0);
        f.gain_power(100.0);
        f.activate_special();
        let duration = f.timings().ability_duration;
        for _ in 0..duration - 1 {
            assert_eq!(f.tick_timers().ability_expired, None);
        }
        assert_eq!(f.tick_timers().ability_expired, Some(AbilityKind::Fury));
        assert_eq!(f.upper_damage(), 5.0);
    }

    #[test]
    fn test_renewal_restores_health() {
        let profile = CharacterProfile::new("Medic", AbilityKind::Renewal);
        let mut f = Fighter::new(Side::Enemy, profile, Vec2::ZERO, FighterTimings::default());
        f.take_damage(70.0);
        f.gain_power(150.0);
        assert_eq!(f.power(), 100.0);
        assert!(f.activate_special());
        assert_eq!(f.health(), 100.0);
    }

    #[test]
    fn test_knockback_makes_lower_attack_push() {
        let profile = CharacterProfile::new("Bull", AbilityKind::Knockback);
        let mut a = Fighter::new(Side::Player, profile, Vec2::new(100.0, 0.0), FighterTimings::default());
        let mut b = fighter(Side::Enemy, 140.0);
        a.gain_power(100.0);
        a.activate_special();
        let strike = a.apply_lower_attack(&mut b);
        assert_eq!(strike.push, 200.0);
    }

    #[test]
    fn test_dead_fighter_is_inert() {
        let mut f = fighter(Side::Player, 0.0);
        f.start_attack_upper();
        f.mark_dead();
        assert!(!f.is_attacking_upper());
        assert_eq!(f.current_action(), AnimationAction::Death);
        assert!(!f.request_jump());
        assert!(!f.request_move(MoveDirection::Left));
        f.update_animation();
        assert_eq!(f.current_action(), AnimationAction::Death);
    }
}
