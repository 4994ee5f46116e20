//! Input handling for both sides of a match.
//!
//! Raw key up/down events are tracked per key, mapped through per-side
//! bindings, and turned into one [`InputSnapshot`] per side each frame.
//! Attacks, jumps and the special fire once per press, never on hold.

use duel_common::Side;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::fighter::MoveDirection;

/// Errors that can occur in the input system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Key already bound to another control
    #[error("key {key:?} already bound to {side:?} {control:?}")]
    KeyAlreadyBound {
        /// The key that's already bound
        key: KeyCode,
        /// Side owning the existing binding
        side: Side,
        /// Control it's bound to
        control: Control,
    },
}

/// Key codes for keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    /// Space bar
    Space,
    /// Enter/Return
    Enter,
    /// Escape
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// State of a button (pressed, just pressed, released).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    /// Whether the button is currently held down
    pub pressed: bool,
    /// Whether the button was just pressed this frame
    pub just_pressed: bool,
    /// Whether the button was just released this frame
    pub just_released: bool,
}

impl ButtonState {
    /// Create a new button state (not pressed).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pressed: false,
            just_pressed: false,
            just_released: false,
        }
    }

    /// Update the button state based on whether it's currently pressed.
    pub fn update(&mut self, is_pressed: bool) {
        self.just_pressed = is_pressed && !self.pressed;
        self.just_released = !is_pressed && self.pressed;
        self.pressed = is_pressed;
    }

    /// Clear the frame-specific state (just_pressed, just_released).
    pub fn clear_frame(&mut self) {
        self.just_pressed = false;
        self.just_released = false;
    }
}

/// Per-side fighter controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    /// Move left (held)
    Left,
    /// Move right (held)
    Right,
    /// Jump (press)
    Jump,
    /// Upper attack (press)
    AttackUpper,
    /// Lower attack (press)
    AttackLower,
    /// Block (held)
    Block,
    /// Special ability (press)
    Special,
}

impl Control {
    /// Every control.
    pub const ALL: [Control; 7] = [
        Control::Left,
        Control::Right,
        Control::Jump,
        Control::AttackUpper,
        Control::AttackLower,
        Control::Block,
        Control::Special,
    ];
}

/// One side's input for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Left held
    pub left: bool,
    /// Right held
    pub right: bool,
    /// Block held
    pub block: bool,
    /// Jump pressed this frame
    pub jump: bool,
    /// Upper attack pressed this frame
    pub attack_upper: bool,
    /// Lower attack pressed this frame
    pub attack_lower: bool,
    /// Special pressed this frame
    pub special: bool,
}

impl InputSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Horizontal intent. Left and right together cancel out.
    #[must_use]
    pub fn direction(&self) -> MoveDirection {
        match (self.left, self.right) {
            (true, false) => MoveDirection::Left,
            (false, true) => MoveDirection::Right,
            _ => MoveDirection::Hold,
        }
    }

    /// Check if any movement input is active.
    #[must_use]
    pub fn has_movement(&self) -> bool {
        self.direction() != MoveDirection::Hold
    }
}

/// Key binding configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Primary key for this control
    pub primary: KeyCode,
    /// Optional secondary key
    pub secondary: Option<KeyCode>,
}

impl KeyBinding {
    /// Create a new key binding with only a primary key.
    #[must_use]
    pub const fn new(primary: KeyCode) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// Create a new key binding with primary and secondary keys.
    #[must_use]
    pub const fn with_secondary(primary: KeyCode, secondary: KeyCode) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }

    /// Check if a key matches this binding.
    #[must_use]
    pub fn matches(&self, key: KeyCode) -> bool {
        self.primary == key || self.secondary == Some(key)
    }
}

/// Tracks raw key state and maps it onto both sides' controls.
#[derive(Debug)]
pub struct InputManager {
    /// Current key states
    key_states: HashMap<KeyCode, ButtonState>,
    /// Control to key bindings, per side
    bindings: HashMap<(Side, Control), KeyBinding>,
    /// Pause key binding
    pause: KeyBinding,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Create a new input manager with default bindings.
    #[must_use]
    pub fn new() -> Self {
        let mut manager = Self {
            key_states: HashMap::new(),
            bindings: HashMap::new(),
            pause: KeyBinding::with_secondary(KeyCode::Escape, KeyCode::P),
        };
        manager.set_default_bindings();
        manager
    }

    /// Set default key bindings: WASD-side keys for the player, arrows for
    /// the enemy.
    pub fn set_default_bindings(&mut self) {
        use Control as C;
        use KeyCode as K;

        self.bindings.clear();
        for (control, key) in [
            (C::Left, K::A),
            (C::Right, K::D),
            (C::Jump, K::W),
            (C::Block, K::S),
            (C::AttackUpper, K::T),
            (C::AttackLower, K::Y),
            (C::Special, K::R),
        ] {
            self.bindings.insert((Side::Player, control), KeyBinding::new(key));
        }
        for (control, key) in [
            (C::Left, K::Left),
            (C::Right, K::Right),
            (C::Jump, K::Up),
            (C::Block, K::Down),
            (C::AttackUpper, K::K),
            (C::AttackLower, K::L),
            (C::Special, K::O),
        ] {
            self.bindings.insert((Side::Enemy, control), KeyBinding::new(key));
        }
    }

    /// Bind a control to a new key, refusing keys owned by another control.
    pub fn rebind(
        &mut self,
        side: Side,
        control: Control,
        binding: KeyBinding,
    ) -> Result<(), InputError> {
        for (&(other_side, other_control), existing) in &self.bindings {
            if (other_side, other_control) == (side, control) {
                continue;
            }
            let clash = [Some(binding.primary), binding.secondary]
                .into_iter()
                .flatten()
                .find(|key| existing.matches(*key));
            if let Some(key) = clash {
                return Err(InputError::KeyAlreadyBound {
                    key,
                    side: other_side,
                    control: other_control,
                });
            }
        }
        self.bindings.insert((side, control), binding);
        Ok(())
    }

    /// Get the current binding for a control.
    #[must_use]
    pub fn get_binding(&self, side: Side, control: Control) -> Option<&KeyBinding> {
        self.bindings.get(&(side, control))
    }

    /// Update a key state.
    pub fn update_key(&mut self, key: KeyCode, is_pressed: bool) {
        self.key_states.entry(key).or_default().update(is_pressed);
    }

    /// Clear frame-specific state. Call at the end of each frame.
    pub fn end_frame(&mut self) {
        for state in self.key_states.values_mut() {
            state.clear_frame();
        }
    }

    /// Check if a key is currently pressed.
    #[must_use]
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.key_states.get(&key).is_some_and(|state| state.pressed)
    }

    /// Check if a key was just pressed this frame.
    #[must_use]
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.key_states
            .get(&key)
            .is_some_and(|state| state.just_pressed)
    }

    fn binding_active(&self, binding: &KeyBinding, check: impl Fn(KeyCode) -> bool) -> bool {
        check(binding.primary) || binding.secondary.is_some_and(&check)
    }

    /// Check if a control is currently held.
    #[must_use]
    pub fn is_control_pressed(&self, side: Side, control: Control) -> bool {
        self.bindings
            .get(&(side, control))
            .is_some_and(|b| self.binding_active(b, |k| self.is_key_pressed(k)))
    }

    /// Check if a control was just pressed this frame.
    #[must_use]
    pub fn is_control_just_pressed(&self, side: Side, control: Control) -> bool {
        self.bindings
            .get(&(side, control))
            .is_some_and(|b| self.binding_active(b, |k| self.is_key_just_pressed(k)))
    }

    /// Check if the pause key was just pressed this frame.
    #[must_use]
    pub fn pause_just_pressed(&self) -> bool {
        self.binding_active(&self.pause, |k| self.is_key_just_pressed(k))
    }

    /// Builds one side's snapshot for this frame.
    #[must_use]
    pub fn snapshot(&self, side: Side) -> InputSnapshot {
        InputSnapshot {
            left: self.is_control_pressed(side, Control::Left),
            right: self.is_control_pressed(side, Control::Right),
            block: self.is_control_pressed(side, Control::Block),
            jump: self.is_control_just_pressed(side, Control::Jump),
            attack_upper: self.is_control_just_pressed(side, Control::AttackUpper),
            attack_lower: self.is_control_just_pressed(side, Control::AttackLower),
            special: self.is_control_just_pressed(side, Control::Special),
        }
    }
}
