//! The match controller.
//!
//! [`MatchContext`] owns everything one match needs: both fighters, the
//! lifecycle state, the combat resolver, configuration and the event bus.
//! Every operation goes through it; there is no global match state.
//!
//! One call to [`MatchContext::tick`] runs the whole pipeline: timers,
//! input, physics, animation, combat, ring-out and win checks, frame
//! cursors, then HUD change events.

use duel_common::{ConfigError, FighterId, MatchError, Side};
use tracing::{debug, info};

use crate::combat::{pair_mut, CombatResolver, HitReport};
use crate::config::MatchConfig;
use crate::events::{EventBus, MatchEvent};
use crate::fighter::{AttackKind, Fighter, FighterTimings};
use crate::input::InputSnapshot;
use crate::match_state::MatchState;
use crate::profile::CharacterProfile;
use crate::render::{FighterFrame, HudSnapshot, RenderSink};

/// Explicit state of one running match.
#[derive(Debug)]
pub struct MatchContext {
    config: MatchConfig,
    profiles: [CharacterProfile; 2],
    fighters: [Fighter; 2],
    state: MatchState,
    resolver: CombatResolver,
    bus: EventBus,
    /// Last (health, power) published per side
    reported: [(f32, f32); 2],
}

impl MatchContext {
    /// Sets up a match between two characters.
    pub fn new(
        config: MatchConfig,
        player: CharacterProfile,
        enemy: CharacterProfile,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        player.validate()?;
        enemy.validate()?;

        let profiles = [player, enemy];
        let fighters = Self::spawn(&config, &profiles);
        let reported = Self::gauges(&fighters);
        info!(
            player = %profiles[0].name,
            enemy = %profiles[1].name,
            "Match created"
        );

        Ok(Self {
            config,
            profiles,
            fighters,
            state: MatchState::new(),
            resolver: CombatResolver::new(),
            bus: EventBus::default(),
            reported,
        })
    }

    fn spawn(config: &MatchConfig, profiles: &[CharacterProfile; 2]) -> [Fighter; 2] {
        let timings = FighterTimings::from_config(config);
        let [player, enemy] = profiles;
        [
            Fighter::new(Side::Player, player.clone(), config.player_spawn, timings),
            Fighter::new(Side::Enemy, enemy.clone(), config.enemy_spawn, timings),
        ]
    }

    fn gauges(fighters: &[Fighter; 2]) -> [(f32, f32); 2] {
        [
            (fighters[0].health(), fighters[0].power()),
            (fighters[1].health(), fighters[1].power()),
        ]
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Match configuration.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Event bus the match publishes to.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Hits landed since the match (or last reset) began.
    #[must_use]
    pub fn hits_landed(&self) -> u64 {
        self.resolver.hits_landed()
    }

    /// Fighter on a side.
    #[must_use]
    pub fn fighter(&self, side: Side) -> &Fighter {
        &self.fighters[side.index()]
    }

    /// Mutable fighter on a side.
    pub fn fighter_mut(&mut self, side: Side) -> &mut Fighter {
        &mut self.fighters[side.index()]
    }

    /// Both fighters, player first.
    #[must_use]
    pub fn fighters(&self) -> &[Fighter; 2] {
        &self.fighters
    }

    /// Looks a fighter up by ID.
    pub fn fighter_by_id(&self, id: FighterId) -> Result<&Fighter, MatchError> {
        self.fighters
            .iter()
            .find(|f| f.id() == id)
            .ok_or(MatchError::UnknownFighter(id))
    }

    // ========================================================================
    // Tick pipeline
    // ========================================================================

    /// Advances the match by one tick.
    ///
    /// Paused or frozen matches do nothing. Once a winner is set, inputs
    /// and combat stop but physics and animation keep going until the death
    /// delay elapses.
    pub fn tick(&mut self, inputs: &[InputSnapshot; 2]) -> Result<Vec<HitReport>, MatchError> {
        if !self.state.is_running() || self.state.is_paused() {
            return Ok(Vec::new());
        }

        self.tick_timers();

        let live = self.state.accepts_input();
        for side in Side::ALL {
            let input = if live {
                inputs[side.index()]
            } else {
                InputSnapshot::new()
            };
            self.apply_input(side, &input);
        }

        self.integrate();

        for fighter in &mut self.fighters {
            fighter.update_animation();
        }

        let hits = if live {
            self.resolver.resolve(&mut self.fighters)?
        } else {
            Vec::new()
        };
        for hit in &hits {
            self.bus.publish(MatchEvent::Hit {
                attacker: hit.attacker,
                defender: hit.defender,
                kind: hit.strike.kind,
                damage: hit.strike.damage,
            });
        }

        self.check_ring_out();
        self.check_winner();

        for fighter in &mut self.fighters {
            fighter.advance_frame();
        }

        self.publish_gauges();

        if self.state.advance() {
            info!(tick = self.state.tick(), "Match frozen");
        }
        Ok(hits)
    }

    fn tick_timers(&mut self) {
        for fighter in &mut self.fighters {
            if let Some(ability) = fighter.tick_timers().ability_expired {
                self.bus.publish(MatchEvent::AbilityExpired {
                    side: fighter.side(),
                    ability,
                });
            }
        }
    }

    fn apply_input(&mut self, side: Side, input: &InputSnapshot) {
        let fighter = &mut self.fighters[side.index()];
        if fighter.is_dead() {
            return;
        }

        fighter.set_blocking(input.block);
        fighter.request_move(input.direction());
        if input.jump {
            fighter.request_jump();
        }
        if input.attack_upper {
            fighter.start_attack(AttackKind::Upper);
        }
        if input.attack_lower {
            fighter.start_attack(AttackKind::Lower);
        }
        if input.special && fighter.activate_special() {
            self.bus.publish(MatchEvent::AbilityActivated {
                side,
                ability: fighter.profile().ability,
            });
        }
    }

    fn integrate(&mut self) {
        let [player, enemy] = &mut self.fighters;
        let player_x = player.body.position.x;
        player.body.face_toward(enemy.body.position.x);
        enemy.body.face_toward(player_x);

        for fighter in &mut self.fighters {
            fighter
                .body
                .integrate(self.config.gravity, self.config.ground_y);
        }
    }

    fn publish_gauges(&mut self) {
        for side in Side::ALL {
            let fighter = &self.fighters[side.index()];
            let (health, power) = (fighter.health(), fighter.power());
            let last = &mut self.reported[side.index()];
            if health != last.0 {
                self.bus.publish(MatchEvent::HealthChanged { side, health });
            }
            if power != last.1 {
                self.bus.publish(MatchEvent::PowerChanged { side, power });
            }
            *last = (health, power);
        }
    }

    // ========================================================================
    // Match rules
    // ========================================================================

    /// Whether an x position is outside the ring.
    #[must_use]
    pub fn is_out_of_bounds(&self, x: f32) -> bool {
        x < self.config.ring_out_min_x || x > self.config.ring_out_max_x
    }

    /// Knocks out every fighter standing outside the ring.
    ///
    /// Returns the sides that rang out. Does nothing once a winner is set.
    pub fn check_ring_out(&mut self) -> Vec<Side> {
        if self.state.is_decided() {
            return Vec::new();
        }
        let mut out = Vec::new();
        for side in Side::ALL {
            let x = self.fighters[side.index()].body.position.x;
            if self.is_out_of_bounds(x) && self.fighters[side.index()].health() > 0.0 {
                self.fighters[side.index()].knock_out();
                self.bus.publish(MatchEvent::RingOut { side });
                debug!(%side, x, "ring out");
                out.push(side);
            }
        }
        out
    }

    /// Decides the match if a fighter is down.
    ///
    /// The player is checked first, so a double knockout goes to the enemy.
    /// Calling it again after a winner is set returns the same winner and
    /// changes nothing.
    pub fn check_winner(&mut self) -> Option<Side> {
        if let Some(winner) = self.state.winner() {
            return Some(winner);
        }

        let loser = Side::ALL
            .into_iter()
            .find(|side| self.fighters[side.index()].health() <= 0.0)?;
        let winner = loser.opponent();

        self.fighters[loser.index()].mark_dead();
        let delay = self.config.death_delay_ticks();
        self.state.declare_winner(winner, delay);

        let message = self.state.outcome_message().unwrap_or_default();
        info!(%winner, %loser, tick = self.state.tick(), "{message}");
        self.bus.publish(MatchEvent::KnockedOut { side: loser });
        self.bus.publish(MatchEvent::MatchOver { winner, message });
        Some(winner)
    }

    /// Lands an attack from the fighter with `attacker` ID on its opponent,
    /// if the attack connects this tick.
    ///
    /// An ID that is not part of this match is an error. Once the match is
    /// decided nothing lands.
    pub fn strike(
        &mut self,
        attacker: FighterId,
        kind: AttackKind,
    ) -> Result<Option<HitReport>, MatchError> {
        let side = self.fighter_by_id(attacker)?.side();
        if !self.state.accepts_input() {
            return Ok(None);
        }
        let (attacker, defender) = pair_mut(&mut self.fighters, side);
        let hit = self.resolver.resolve_between(kind, attacker, defender)?;
        if hit.is_some() {
            self.publish_gauges();
        }
        Ok(hit)
    }

    /// Flips pause. Ignored once the match has frozen.
    pub fn toggle_pause(&mut self) -> bool {
        if !self.state.is_running() {
            return self.state.is_paused();
        }
        let paused = self.state.toggle_pause();
        if paused {
            info!(tick = self.state.tick(), "Paused");
            self.bus.publish(MatchEvent::Paused);
        } else {
            info!(tick = self.state.tick(), "Resumed");
            self.bus.publish(MatchEvent::Resumed);
        }
        paused
    }

    /// Starts over with the same characters and configuration.
    pub fn reset(&mut self) {
        self.fighters = Self::spawn(&self.config, &self.profiles);
        self.state = MatchState::new();
        self.resolver = CombatResolver::new();
        self.reported = Self::gauges(&self.fighters);
        self.bus.drain();
        self.bus.publish(MatchEvent::Reset);
        info!("Match reset");
    }

    // ========================================================================
    // Outputs
    // ========================================================================

    /// Draw descriptions of both fighters, player first.
    #[must_use]
    pub fn render_frames(&self) -> [FighterFrame; 2] {
        [
            FighterFrame::of(&self.fighters[0]),
            FighterFrame::of(&self.fighters[1]),
        ]
    }

    /// Overlay state.
    #[must_use]
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            health: [self.fighters[0].health(), self.fighters[1].health()],
            power: [self.fighters[0].power(), self.fighters[1].power()],
            paused: self.state.is_paused(),
            outcome: self.state.outcome_message(),
            tick: self.state.tick(),
        }
    }

    /// Hands this tick's frames and overlay to a sink.
    pub fn draw(&self, sink: &mut dyn RenderSink) {
        for frame in &self.render_frames() {
            sink.draw_fighter(frame);
        }
        sink.draw_hud(&self.hud());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityKind;
    use crate::animation::AnimationAction;
    use crate::render::FrameRecorder;
    use proptest::prelude::*;

    fn context() -> MatchContext {
        let mut ctx = MatchContext::new(
            MatchConfig::default(),
            CharacterProfile::new("Kenji", AbilityKind::Fury),
            CharacterProfile::new("Brutus", AbilityKind::Knockback),
        )
        .expect("valid match");
        ctx.bus().drain();
        ctx
    }

    /// Grounds both fighters at the given x positions.
    fn place(ctx: &mut MatchContext, player_x: f32, enemy_x: f32) {
        let floor = ctx.config().ground_y;
        for (side, x) in [(Side::Player, player_x), (Side::Enemy, enemy_x)] {
            let body = &mut ctx.fighter_mut(side).body;
            body.position.x = x;
            body.position.y = floor - body.height;
            body.velocity.y = 0.0;
        }
    }

    fn idle() -> [InputSnapshot; 2] {
        [InputSnapshot::new(); 2]
    }

    fn upper(side: Side) -> [InputSnapshot; 2] {
        let mut inputs = idle();
        inputs[side.index()].attack_upper = true;
        inputs
    }

    #[test]
    fn test_upper_hit_through_tick() {
        let mut ctx = context();
        place(&mut ctx, 100.0, 140.0);

        let hits = ctx.tick(&upper(Side::Player)).expect("tick");
        assert_eq!(hits.len(), 1);
        assert_eq!(ctx.fighter(Side::Enemy).health(), 95.0);
        assert_eq!(ctx.fighter(Side::Player).power(), 35.0);
        assert_eq!(ctx.fighter(Side::Enemy).body.position.x, 340.0);

        let events = ctx.bus().drain();
        assert!(events.contains(&MatchEvent::HealthChanged {
            side: Side::Enemy,
            health: 95.0
        }));
        assert!(events.contains(&MatchEvent::PowerChanged {
            side: Side::Player,
            power: 35.0
        }));
    }

    #[test]
    fn test_one_swing_one_hit() {
        let mut ctx = context();
        place(&mut ctx, 100.0, 140.0);
        let mut inputs = idle();
        inputs[Side::Player.index()].attack_lower = true;
        ctx.tick(&inputs).expect("tick");

        for _ in 0..40 {
            ctx.tick(&idle()).expect("tick");
        }
        assert_eq!(ctx.fighter(Side::Enemy).health(), 90.0);
        assert_eq!(ctx.hits_landed(), 1);
    }

    #[test]
    fn test_blocked_attack_does_nothing() {
        let mut ctx = context();
        place(&mut ctx, 100.0, 140.0);
        let mut inputs = upper(Side::Player);
        inputs[Side::Enemy.index()].block = true;

        let hits = ctx.tick(&inputs).expect("tick");
        assert!(hits.is_empty());
        assert_eq!(ctx.fighter(Side::Enemy).health(), 100.0);
    }

    #[test]
    fn test_ring_out_next_evaluation() {
        let mut ctx = context();
        place(&mut ctx, 100.0, 800.0);
        ctx.fighter_mut(Side::Enemy).body.position.x = 1000.0;

        ctx.tick(&idle()).expect("tick");
        assert_eq!(ctx.fighter(Side::Enemy).health(), 0.0);
        assert!(ctx.fighter(Side::Enemy).is_dead());
        assert_eq!(ctx.state().winner(), Some(Side::Player));
        assert_eq!(ctx.hud().outcome.as_deref(), Some("Player Wins"));

        let events = ctx.bus().drain();
        assert!(events.contains(&MatchEvent::RingOut { side: Side::Enemy }));
    }

    #[test]
    fn test_check_winner_idempotent() {
        let mut ctx = context();
        ctx.fighter_mut(Side::Enemy).knock_out();
        let player_before = ctx.fighter(Side::Player).health();

        assert_eq!(ctx.check_winner(), Some(Side::Player));
        assert_eq!(ctx.check_winner(), Some(Side::Player));
        assert_eq!(ctx.fighter(Side::Player).health(), player_before);

        let over = ctx
            .bus()
            .drain()
            .into_iter()
            .filter(|e| matches!(e, MatchEvent::MatchOver { .. }))
            .count();
        assert_eq!(over, 1);
    }

    #[test]
    fn test_double_knockout_goes_to_enemy() {
        let mut ctx = context();
        ctx.fighter_mut(Side::Player).knock_out();
        ctx.fighter_mut(Side::Enemy).knock_out();
        assert_eq!(ctx.check_winner(), Some(Side::Enemy));
    }

    #[test]
    fn test_death_delay_then_freeze() {
        let mut ctx = context();
        place(&mut ctx, 100.0, 800.0);
        ctx.fighter_mut(Side::Enemy).knock_out();
        ctx.tick(&idle()).expect("tick");
        assert_eq!(
            ctx.fighter(Side::Enemy).current_action(),
            AnimationAction::Death
        );

        let delay = ctx.config().death_delay_ticks();
        for _ in 1..delay {
            assert!(ctx.state().is_running());
            ctx.tick(&idle()).expect("tick");
        }
        assert!(!ctx.state().is_running());

        let frozen_at = ctx.state().tick();
        ctx.tick(&upper(Side::Player)).expect("tick");
        assert_eq!(ctx.state().tick(), frozen_at);
    }

    #[test]
    fn test_no_input_after_decision() {
        let mut ctx = context();
        place(&mut ctx, 100.0, 140.0);
        ctx.fighter_mut(Side::Player).knock_out();
        ctx.tick(&idle()).expect("tick");

        ctx.tick(&upper(Side::Enemy)).expect("tick");
        assert!(!ctx.fighter(Side::Enemy).is_attacking_upper());
    }

    #[test]
    fn test_pause_freezes_timers() {
        let mut ctx = context();
        place(&mut ctx, 100.0, 800.0);
        ctx.tick(&upper(Side::Player)).expect("tick");
        let remaining = ctx.fighter(Side::Player).cooldown_remaining(AttackKind::Upper);

        assert!(ctx.toggle_pause());
        for _ in 0..100 {
            ctx.tick(&idle()).expect("tick");
        }
        assert_eq!(
            ctx.fighter(Side::Player).cooldown_remaining(AttackKind::Upper),
            remaining
        );

        assert!(!ctx.toggle_pause());
        ctx.tick(&idle()).expect("tick");
        assert_eq!(
            ctx.fighter(Side::Player).cooldown_remaining(AttackKind::Upper),
            remaining - 1
        );

        let events = ctx.bus().drain();
        assert!(events.contains(&MatchEvent::Paused));
        assert!(events.contains(&MatchEvent::Resumed));
    }

    #[test]
    fn test_special_fires_on_full_meter() {
        let mut ctx = context();
        place(&mut ctx, 100.0, 800.0);
        ctx.fighter_mut(Side::Player).gain_power(100.0);

        let mut inputs = idle();
        inputs[Side::Player.index()].special = true;
        ctx.tick(&inputs).expect("tick");

        assert_eq!(ctx.fighter(Side::Player).power(), 0.0);
        assert_eq!(ctx.fighter(Side::Player).ability().active(), Some(AbilityKind::Fury));
        assert!(ctx.bus().drain().contains(&MatchEvent::AbilityActivated {
            side: Side::Player,
            ability: AbilityKind::Fury
        }));
    }

    #[test]
    fn test_strike_by_id() {
        let mut ctx = context();
        place(&mut ctx, 100.0, 140.0);
        ctx.tick(&idle()).expect("tick");

        let id = ctx.fighter(Side::Player).id();
        assert!(ctx.fighter_mut(Side::Player).start_attack_upper());
        let hit = ctx.strike(id, AttackKind::Upper).expect("known fighter");
        assert!(hit.is_some());

        let stranger = FighterId::from_raw(u64::MAX);
        assert_eq!(
            ctx.strike(stranger, AttackKind::Upper),
            Err(MatchError::UnknownFighter(stranger))
        );
    }

    /// Enemy x, enemy health and player power.
    fn gauges(ctx: &MatchContext) -> (f32, f32, f32) {
        (
            ctx.fighter(Side::Enemy).body.position.x,
            ctx.fighter(Side::Enemy).health(),
            ctx.fighter(Side::Player).power(),
        )
    }

    #[test]
    fn test_strike_ignored_after_decision() {
        let mut ctx = context();
        place(&mut ctx, 100.0, 140.0);
        ctx.tick(&idle()).expect("tick");
        let id = ctx.fighter(Side::Player).id();

        ctx.fighter_mut(Side::Enemy).knock_out();
        assert_eq!(ctx.check_winner(), Some(Side::Player));

        let before = gauges(&ctx);
        assert!(ctx.fighter_mut(Side::Player).start_attack_lower());
        assert_eq!(ctx.strike(id, AttackKind::Lower), Ok(None));
        assert_eq!(gauges(&ctx), before);

        for _ in 0..ctx.config().death_delay_ticks() {
            ctx.tick(&idle()).expect("tick");
        }
        assert!(!ctx.state().is_running());

        let before = gauges(&ctx);
        ctx.fighter_mut(Side::Player).start_attack_upper();
        assert_eq!(ctx.strike(id, AttackKind::Upper), Ok(None));
        assert_eq!(gauges(&ctx), before);
        assert_eq!(ctx.hits_landed(), 0);
    }

    #[test]
    fn test_match_over_survives_full_bus() {
        let mut ctx = context();
        place(&mut ctx, 100.0, 800.0);
        let flips = ctx.bus().capacity() + 76;
        for _ in 0..flips {
            ctx.toggle_pause();
        }
        assert!(!ctx.state().is_paused());
        assert_eq!(ctx.bus().pending_count(), ctx.bus().capacity());

        ctx.fighter_mut(Side::Enemy).knock_out();
        ctx.tick(&idle()).expect("tick");

        let events = ctx.bus().drain();
        assert!(events.contains(&MatchEvent::MatchOver {
            winner: Side::Player,
            message: "Player Wins".into(),
        }));
        assert!(ctx.bus().dropped() > 0);
    }

    #[test]
    fn test_reset_restores_fighters() {
        let mut ctx = context();
        place(&mut ctx, 100.0, 140.0);
        ctx.tick(&upper(Side::Player)).expect("tick");
        ctx.fighter_mut(Side::Enemy).knock_out();
        ctx.check_winner();

        ctx.reset();
        assert_eq!(ctx.state().winner(), None);
        assert_eq!(ctx.fighter(Side::Enemy).health(), 100.0);
        assert_eq!(ctx.fighter(Side::Player).power(), 0.0);
        assert_eq!(ctx.hits_landed(), 0);
        assert_eq!(ctx.bus().drain(), vec![MatchEvent::Reset]);
    }

    #[test]
    fn test_facing_follows_opponent() {
        let mut ctx = context();
        place(&mut ctx, 600.0, 200.0);
        ctx.tick(&idle()).expect("tick");
        assert!(!ctx.fighter(Side::Player).body.facing_right);
        assert!(ctx.fighter(Side::Enemy).body.facing_right);
    }

    #[test]
    fn test_draw_without_renderer_state() {
        let ctx = context();
        let mut recorder = FrameRecorder::default();
        ctx.draw(&mut recorder);
        assert_eq!(recorder.frames.len(), 2);
        assert_eq!(recorder.frames[0].side, Side::Player);
        let hud = recorder.hud.expect("hud drawn");
        assert_eq!(hud.health, [100.0, 100.0]);
        assert!(!hud.paused);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MatchConfig {
            tick_rate: 0,
            ..MatchConfig::default()
        };
        let result = MatchContext::new(
            config,
            CharacterProfile::new("A", AbilityKind::Fury),
            CharacterProfile::new("B", AbilityKind::Surge),
        );
        assert!(result.is_err());
    }

    fn snapshot_from_bits(bits: u8) -> InputSnapshot {
        InputSnapshot {
            left: bits & 1 != 0,
            right: bits & 2 != 0,
            block: bits & 4 != 0,
            jump: bits & 8 != 0,
            attack_upper: bits & 16 != 0,
            attack_lower: bits & 32 != 0,
            special: bits & 64 != 0,
        }
    }

    proptest! {
        #[test]
        fn prop_gauges_stay_in_range(
            moves in prop::collection::vec((any::<u8>(), any::<u8>()), 1..400),
            start in 50.0f32..900.0,
        ) {
            let mut ctx = context();
            place(&mut ctx, start, start + 40.0);
            for (p, e) in moves {
                ctx.tick(&[snapshot_from_bits(p), snapshot_from_bits(e)]).expect("tick");
                for fighter in ctx.fighters() {
                    prop_assert!((0.0..=100.0).contains(&fighter.health()));
                    prop_assert!((0.0..=100.0).contains(&fighter.power()));
                }
            }
        }
    }
}
