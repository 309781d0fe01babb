//! Player input.
//!
//! Each frame the [`InputSystem`] samples which [`Action`]s are held down,
//! compares that with the previous sample to derive a [`ButtonState`] per
//! action, and steers every [`PlayerControl`] entity's [`Movement`]:
//!
//! | state                | effect on the action's axis |
//! |----------------------|-----------------------------|
//! | `Pressed` / `Held`   | set to the action's direction (±1) |
//! | `Released`           | set to 0                    |
//! | `Up`                 | unchanged                   |
//!
//! Axes are applied in the order up, down, left, right, so holding two
//! opposite directions resolves to the later one.

use std::collections::{HashSet, VecDeque};

use tracing::trace;

use manic_component::QueryDescriptor;
use manic_components::{Movement, PlayerControl};

use crate::context::FrameContext;
use crate::error::SystemError;
use crate::system::System;

/// Something the player can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Steer towards the top of the screen.
    MoveUp,
    /// Steer towards the bottom of the screen.
    MoveDown,
    /// Steer left.
    MoveLeft,
    /// Steer right.
    MoveRight,
    /// Shoot.
    Fire,
    /// Precision movement.
    Slow,
    /// Toggle the pause menu.
    Pause,
}

const ACTION_COUNT: usize = 7;

impl Action {
    /// Every action, in the order movement axes are applied.
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Fire,
        Action::Slow,
        Action::Pause,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Edge-detected state of an action between two samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonState {
    /// Not down in either sample.
    #[default]
    Up,
    /// Went down this frame.
    Pressed,
    /// Down in both samples.
    Held,
    /// Came up this frame.
    Released,
}

impl ButtonState {
    /// Derive the state from the previous and current samples.
    #[must_use]
    pub fn from_samples(was_down: bool, is_down: bool) -> Self {
        match (was_down, is_down) {
            (false, false) => Self::Up,
            (false, true) => Self::Pressed,
            (true, true) => Self::Held,
            (true, false) => Self::Released,
        }
    }

    /// Returns `true` for `Pressed` and `Held`.
    #[must_use]
    pub fn is_down(self) -> bool {
        matches!(self, Self::Pressed | Self::Held)
    }
}

/// Supplies the set of actions currently held down.
///
/// Implemented by whatever maps physical devices to actions; keyboard and
/// gamepad bindings live on that side of the seam.
pub trait InputSource {
    /// Actions held down right now. Duplicates are ignored.
    fn sample(&mut self) -> Vec<Action>;
}

/// Replays a fixed sequence of samples, one per frame.
///
/// Once the script runs out every action reads as up.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<Action>>,
}

impl ScriptedInput {
    /// Replay `frames` in order, one sample per update.
    #[must_use]
    pub fn new(frames: impl IntoIterator<Item = Vec<Action>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Number of samples not yet replayed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> Vec<Action> {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Applies sampled input to player-controlled entities.
#[derive(Debug)]
pub struct InputSystem<S> {
    source: S,
    previous: HashSet<Action>,
    states: [ButtonState; ACTION_COUNT],
}

impl<S: InputSource> InputSystem<S> {
    /// Create an input system reading from `source`, with every action up.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            previous: HashSet::new(),
            states: [ButtonState::Up; ACTION_COUNT],
        }
    }

    /// State of `action` as derived on the last update.
    #[must_use]
    pub fn state(&self, action: Action) -> ButtonState {
        self.states[action.index()]
    }

    fn resample(&mut self) {
        let down: HashSet<Action> = self.source.sample().into_iter().collect();
        for action in Action::ALL {
            self.states[action.index()] =
                ButtonState::from_samples(self.previous.contains(&action), down.contains(&action));
        }
        self.previous = down;
    }

    fn steer(&self, movement: &mut Movement) {
        apply_axis(&mut movement.velocity.y, self.state(Action::MoveUp), -1.0);
        apply_axis(&mut movement.velocity.y, self.state(Action::MoveDown), 1.0);
        apply_axis(&mut movement.velocity.x, self.state(Action::MoveLeft), -1.0);
        apply_axis(&mut movement.velocity.x, self.state(Action::MoveRight), 1.0);
    }
}

fn apply_axis(axis: &mut f32, state: ButtonState, direction: f32) {
    match state {
        ButtonState::Pressed | ButtonState::Held => *axis = direction,
        ButtonState::Released => *axis = 0.0,
        ButtonState::Up => {}
    }
}

impl<S: InputSource> System for InputSystem<S> {
    fn name(&self) -> &'static str {
        "input"
    }

    fn query(&self) -> QueryDescriptor {
        QueryDescriptor::new()
            .read::<PlayerControl>()
            .write::<Movement>()
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), SystemError> {
        self.query().check(ctx.world.registry())?;
        self.resample();

        for entity in ctx.world.store::<PlayerControl>()?.keys() {
            let mut movement = ctx.world.store::<Movement>()?.get(entity)?;
            let before = movement.velocity;
            self.steer(&mut movement);
            if movement.velocity != before {
                trace!(%entity, velocity = ?movement.velocity, "player steered");
                ctx.world.store_mut::<Movement>()?.set(entity, movement)?;
            }
        }
        Ok(())
    }
}
