//! Countdown timers and timed despawns.

use std::time::Duration;

use tracing::{debug, trace};

use manic_component::{Entity, QueryDescriptor};
use manic_components::Timer;

use crate::context::FrameContext;
use crate::error::SystemError;
use crate::system::System;

/// Advances every [`Timer`] by the frame's elapsed milliseconds.
///
/// Timers work in whole milliseconds; the sub-millisecond remainder of each
/// frame is carried into the next one so short frames do not drift. Entities
/// whose timer finished with `despawn_on_finish` set are destroyed after the
/// walk over the store, never during it. If any of them is not a live
/// entity the frame fails before a single one is destroyed.
#[derive(Debug, Default)]
pub struct TimerSystem {
    carry: Duration,
}

impl TimerSystem {
    /// Create a timer system with no carried time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole milliseconds to apply this frame.
    fn take_millis(&mut self, elapsed: Duration) -> u32 {
        let total = self.carry + elapsed;
        let millis = total.as_millis();
        self.carry = total - Duration::from_millis(millis as u64);
        u32::try_from(millis).unwrap_or(u32::MAX)
    }
}

impl System for TimerSystem {
    fn name(&self) -> &'static str {
        "timer"
    }

    fn query(&self) -> QueryDescriptor {
        QueryDescriptor::new().write::<Timer>()
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), SystemError> {
        let elapsed_ms = self.take_millis(ctx.elapsed);
        let timers = ctx.world.store_mut::<Timer>()?;

        let mut expired: Vec<Entity> = Vec::new();
        for entity in timers.keys() {
            let mut timer = timers.get(entity)?;
            if timer.is_finished() && !timer.despawn_on_finish {
                continue;
            }
            timer.advance(elapsed_ms);
            trace!(%entity, value_ms = timer.value_ms, remaining_ms = timer.remaining_ms(), "timer advanced");
            if timer.is_finished() && timer.despawn_on_finish {
                expired.push(entity);
            }
            timers.set(entity, timer)?;
        }

        for &entity in &expired {
            ctx.world.allocator().check_live(entity)?;
        }
        for entity in expired {
            ctx.world.destroy(entity)?;
            debug!(%entity, tick_id = ctx.tick_id, "timer expired, entity despawned");
        }
        Ok(())
    }
}
