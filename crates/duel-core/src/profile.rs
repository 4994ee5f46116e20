//! Character profiles and the roster.
//!
//! A profile fixes everything that differs between characters: body size,
//! damage, push, power gain, jump strength, hitbox shape, special ability and
//! the sprite-sheet metrics handed to the renderer. Rosters can be written in
//! RON.

use duel_common::{ConfigError, DuelResult, Vec2};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ability::AbilityKind;
use crate::animation::AnimationAction;

/// Frame metrics for one animation's sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteSheet {
    /// Frames in the sheet
    pub frames_max: u32,
    /// Ticks each frame is shown
    pub frames_hold: u32,
    /// Draw scale
    pub scale: f32,
    /// Offset from body origin to sprite origin
    pub crop_offset: Vec2,
}

impl Default for SpriteSheet {
    fn default() -> Self {
        Self {
            frames_max: 1,
            frames_hold: 10,
            scale: 1.0,
            crop_offset: Vec2::ZERO,
        }
    }
}

impl SpriteSheet {
    /// Creates a sheet with `frames_max` frames and default hold.
    #[must_use]
    pub fn frames(frames_max: u32) -> Self {
        Self {
            frames_max,
            ..Default::default()
        }
    }
}

/// Sprite sheets for every animation action.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteSet {
    /// Idle
    pub idle: SpriteSheet,
    /// Run
    pub run: SpriteSheet,
    /// Jump
    pub jump: SpriteSheet,
    /// Upper attack
    pub attack_upper: SpriteSheet,
    /// Lower attack
    pub attack_lower: SpriteSheet,
    /// Block
    pub block: SpriteSheet,
    /// Death
    pub death: SpriteSheet,
}

impl SpriteSet {
    /// Sheet for an action.
    #[must_use]
    pub fn get(&self, action: AnimationAction) -> &SpriteSheet {
        match action {
            AnimationAction::Idle => &self.idle,
            AnimationAction::Run => &self.run,
            AnimationAction::Jump => &self.jump,
            AnimationAction::AttackUpper => &self.attack_upper,
            AnimationAction::AttackLower => &self.attack_lower,
            AnimationAction::Block => &self.block,
            AnimationAction::Death => &self.death,
        }
    }

    /// Sets the draw scale of every sheet.
    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        for sheet in [
            &mut self.idle,
            &mut self.run,
            &mut self.jump,
            &mut self.attack_upper,
            &mut self.attack_lower,
            &mut self.block,
            &mut self.death,
        ] {
            sheet.scale = scale;
        }
        self
    }
}

/// Attack hitbox shape relative to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitboxShape {
    /// Reach in front of the body
    pub width: f32,
    /// Band height
    pub height: f32,
    /// Extra offset; x is applied in the facing direction
    pub offset: Vec2,
}

impl Default for HitboxShape {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 10.0,
            offset: Vec2::ZERO,
        }
    }
}

/// Everything that distinguishes one character from another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterProfile {
    /// Unique name
    pub name: String,
    /// Special ability unlocked by a full power meter
    pub ability: AbilityKind,
    /// Body width
    pub width: f32,
    /// Body height
    pub height: f32,
    /// Damage of the upper attack
    pub upper_damage: f32,
    /// Damage of the lower attack
    pub lower_damage: f32,
    /// Push distance of the upper attack
    pub push_effect: f32,
    /// Power gained per landed hit
    pub power_increment: f32,
    /// Initial upward speed of a jump
    pub jump_impulse: f32,
    /// Horizontal speed per tick
    pub move_speed: f32,
    /// Attack hitbox shape
    pub hitbox: HitboxShape,
    /// Sprite metrics per action
    pub sprites: SpriteSet,
}

impl Default for CharacterProfile {
    fn default() -> Self {
        Self {
            name: "Fighter".into(),
            ability: AbilityKind::Fury,
            width: 50.0,
            height: 100.0,
            upper_damage: 5.0,
            lower_damage: 10.0,
            push_effect: 200.0,
            power_increment: 35.0,
            jump_impulse: 10.0,
            move_speed: 5.0,
            hitbox: HitboxShape::default(),
            sprites: SpriteSet::default(),
        }
    }
}

impl CharacterProfile {
    /// Creates a default profile with the given name and ability.
    #[must_use]
    pub fn new(name: impl Into<String>, ability: AbilityKind) -> Self {
        Self {
            name: name.into(),
            ability,
            ..Default::default()
        }
    }

    /// Set attack damage.
    #[must_use]
    pub fn with_damage(mut self, upper: f32, lower: f32) -> Self {
        self.upper_damage = upper;
        self.lower_damage = lower;
        self
    }

    /// Set push distance.
    #[must_use]
    pub fn with_push(mut self, push: f32) -> Self {
        self.push_effect = push;
        self
    }

    /// Set power gained per hit.
    #[must_use]
    pub fn with_power_increment(mut self, increment: f32) -> Self {
        self.power_increment = increment;
        self
    }

    /// Set jump impulse and run speed.
    #[must_use]
    pub fn with_mobility(mut self, jump_impulse: f32, move_speed: f32) -> Self {
        self.jump_impulse = jump_impulse;
        self.move_speed = move_speed;
        self
    }

    /// Set hitbox shape.
    #[must_use]
    pub fn with_hitbox(mut self, hitbox: HitboxShape) -> Self {
        self.hitbox = hitbox;
        self
    }

    /// Set sprite metrics.
    #[must_use]
    pub fn with_sprites(mut self, sprites: SpriteSet) -> Self {
        self.sprites = sprites;
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidProfile {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        let numbers = [
            self.width,
            self.height,
            self.upper_damage,
            self.lower_damage,
            self.push_effect,
            self.power_increment,
            self.jump_impulse,
            self.move_speed,
            self.hitbox.width,
            self.hitbox.height,
            self.hitbox.offset.x,
            self.hitbox.offset.y,
        ];
        if numbers.iter().any(|n| !n.is_finite()) {
            return Err(invalid("numbers must be finite"));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(invalid("body size must be positive"));
        }
        if self.hitbox.width <= 0.0 || self.hitbox.height <= 0.0 {
            return Err(invalid("hitbox size must be positive"));
        }
        if self.hitbox.height > self.height {
            return Err(invalid("hitbox is taller than the body"));
        }
        for damage in [self.upper_damage, self.lower_damage] {
            if damage <= 0.0 || damage > 100.0 {
                return Err(invalid("damage must be in (0, 100]"));
            }
        }
        if self.power_increment <= 0.0 || self.power_increment > 100.0 {
            return Err(invalid("power increment must be in (0, 100]"));
        }
        if self.push_effect < 0.0 || self.jump_impulse < 0.0 || self.move_speed < 0.0 {
            return Err(invalid("push, jump and speed must not be negative"));
        }
        Ok(())
    }
}

/// The selectable characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    /// Profiles in selection order
    pub characters: Vec<CharacterProfile>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Roster {
    /// The four built-in characters, one per ability.
    #[must_use]
    pub fn builtin() -> Self {
        let sprites = SpriteSet {
            idle: SpriteSheet::frames(8),
            run: SpriteSheet::frames(8),
            jump: SpriteSheet::frames(2),
            attack_upper: SpriteSheet::frames(6),
            attack_lower: SpriteSheet::frames(6),
            block: SpriteSheet::frames(4),
            death: SpriteSheet::frames(6),
        };

        Self {
            characters: vec![
                CharacterProfile::new("Kenji", AbilityKind::Fury)
                    .with_sprites(sprites.clone().with_scale(2.5)),
                CharacterProfile::new("Brutus", AbilityKind::Knockback)
                    .with_damage(7.0, 12.0)
                    .with_power_increment(25.0)
                    .with_mobility(8.0, 4.0)
                    .with_sprites(sprites.clone().with_scale(2.8)),
                CharacterProfile::new("Mira", AbilityKind::Renewal)
                    .with_damage(4.0, 8.0)
                    .with_power_increment(40.0)
                    .with_mobility(11.0, 6.0)
                    .with_sprites(sprites.clone().with_scale(2.2)),
                CharacterProfile::new("Vega", AbilityKind::Surge)
                    .with_push(150.0)
                    .with_hitbox(HitboxShape {
                        width: 120.0,
                        ..HitboxShape::default()
                    })
                    .with_sprites(sprites.with_scale(2.4)),
            ],
        }
    }

    /// Parses a roster from RON text and validates it.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let roster: Self =
            ron::from_str(text).map_err(|e| ConfigError::RosterParse(e.to_string()))?;
        roster.validate()?;
        Ok(roster)
    }

    /// Reads and validates a RON roster file.
    pub fn load<P: AsRef<Path>>(path: P) -> DuelResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_ron_str(&text)?)
    }

    /// Serializes the roster to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::RosterParse(e.to_string()))
    }

    /// Validates every profile and checks names are unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, profile) in self.characters.iter().enumerate() {
            profile.validate()?;
            if self.characters[..i].iter().any(|p| p.name == profile.name) {
                return Err(ConfigError::DuplicateCharacter(profile.name.clone()));
            }
        }
        Ok(())
    }

    /// Looks up a character by name (case-insensitive).
    pub fn get(&self, name: &str) -> Result<&CharacterProfile, ConfigError> {
        self.characters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownCharacter(name.to_string()))
    }

    /// Character names in selection order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.characters.iter().map(|p| p.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_roster_is_valid() {
        let roster = Roster::builtin();
        assert!(roster.validate().is_ok());
        assert_eq!(roster.characters.len(), 4);

        // One character per ability
        for kind in AbilityKind::all() {
            assert_eq!(
                roster.characters.iter().filter(|p| p.ability == kind).count(),
                1
            );
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let roster = Roster::builtin();
        assert_eq!(roster.get("kenji").map(|p| p.ability), Ok(AbilityKind::Fury));
        assert_eq!(
            roster.get("Nobody"),
            Err(ConfigError::UnknownCharacter("Nobody".into()))
        );
    }

    #[test]
    fn test_ron_round_trip() {
        let roster = Roster::builtin();
        let text = roster.to_ron_string().expect("serialize");
        let parsed = Roster::from_ron_str(&text).expect("parse");
        assert_eq!(parsed, roster);
    }

    #[test]
    fn test_ron_with_defaults() {
        let text = r#"(characters: [(name: "Ash", ability: Surge, upper_damage: 6.0)])"#;
        let roster = Roster::from_ron_str(text).expect("parse");
        let ash = roster.get("Ash").expect("present");
        assert_eq!(ash.upper_damage, 6.0);
        assert_eq!(ash.lower_damage, 10.0);
        assert_eq!(ash.sprites.idle.frames_hold, 10);
    }

    #[test]
    fn test_invalid_profiles_rejected() {
        let bad = CharacterProfile::new("Zero", AbilityKind::Fury).with_damage(0.0, 10.0);
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::InvalidProfile { .. })
        ));

        let bad = CharacterProfile::new("  ", AbilityKind::Fury);
        assert!(bad.validate().is_err());

        let bad = CharacterProfile::new("Greedy", AbilityKind::Fury).with_power_increment(150.0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_non_finite_profiles_rejected() {
        let base = CharacterProfile::new("Ghost", AbilityKind::Fury);
        for bad in [
            base.clone().with_damage(f32::NAN, 10.0),
            base.clone().with_push(f32::NAN),
            base.clone().with_mobility(f32::INFINITY, 4.0),
            base.clone().with_power_increment(f32::NAN),
        ] {
            assert_eq!(
                bad.validate(),
                Err(ConfigError::InvalidProfile {
                    name: "Ghost".into(),
                    reason: "numbers must be finite".into(),
                })
            );
        }
        assert!(base.validate().is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let roster = Roster {
            characters: vec![
                CharacterProfile::new("Twin", AbilityKind::Fury),
                CharacterProfile::new("Twin", AbilityKind::Surge),
            ],
        };
        assert_eq!(
            roster.validate(),
            Err(ConfigError::DuplicateCharacter("Twin".into()))
        );
    }

    #[test]
    fn test_malformed_ron() {
        assert!(matches!(
            Roster::from_ron_str("(characters: [oops"),
            Err(ConfigError::RosterParse(_))
        ));
    }

    #[test]
    fn test_sprite_lookup() {
        let roster = Roster::builtin();
        let kenji = roster.get("Kenji").expect("present");
        assert_eq!(kenji.sprites.get(AnimationAction::Jump).frames_max, 2);
        assert_eq!(kenji.sprites.get(AnimationAction::Death).scale, 2.5);
    }
}
