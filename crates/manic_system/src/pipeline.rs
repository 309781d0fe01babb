//! Ordered execution of systems.
//!
//! The pipeline owns the system list and runs it once per frame. Order is
//! registration order; there is no parallelism, so each system observes the
//! writes of every system before it in the same frame.

use std::time::Duration;

use tracing::{debug, info, trace};

use manic_component::World;

use crate::context::FrameContext;
use crate::error::SystemError;
use crate::system::System;

/// An ordered list of systems.
#[derive(Default)]
pub struct Pipeline {
    systems: Vec<Box<dyn System>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a system; it runs after every system already pushed.
    pub fn push<S: System + 'static>(&mut self, system: S) -> &mut Self {
        debug!(system = system.name(), position = self.systems.len(), "system added to pipeline");
        self.systems.push(Box::new(system));
        self
    }

    /// Number of systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns `true` if no system has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// System names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Checks every system's query against the world's registry.
    ///
    /// # Errors
    ///
    /// [`SystemError::InvalidQuery`] for the first system that accesses an
    /// unregistered component.
    pub fn validate(&self, world: &World) -> Result<(), SystemError> {
        for system in &self.systems {
            let query = system.query();
            query
                .check(world.registry())
                .map_err(|source| SystemError::InvalidQuery {
                    system: system.name(),
                    source,
                })?;
            debug!(
                system = system.name(),
                reads = query.reads.len(),
                writes = query.writes.len(),
                "query validated"
            );
        }
        info!(systems = self.systems.len(), "pipeline validated");
        Ok(())
    }

    /// Runs every system once, in order.
    ///
    /// # Errors
    ///
    /// [`SystemError::Failed`] naming the first system whose update failed.
    /// Systems after it do not run this frame.
    pub fn run_frame(
        &mut self,
        world: &mut World,
        tick_id: u64,
        elapsed: Duration,
    ) -> Result<(), SystemError> {
        let mut ctx = FrameContext::new(world, tick_id, elapsed);
        for system in &mut self.systems {
            trace!(tick_id, system = system.name(), "running system");
            system
                .update(&mut ctx)
                .map_err(|source| SystemError::Failed {
                    system: system.name(),
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use manic_component::{EcsError, QueryDescriptor};
    use manic_components::Timer;
    use manic_math::Position;

    use super::*;

    /// Records its name into a shared log, optionally failing.
    struct Probe {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
        fail: bool,
    }

    impl System for Probe {
        fn name(&self) -> &'static str {
            self.name
        }

        fn query(&self) -> QueryDescriptor {
            QueryDescriptor::new().read::<Timer>()
        }

        fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), SystemError> {
            self.log.borrow_mut().push(self.name);
            if self.fail {
                ctx.world.store::<Position>()?;
            }
            Ok(())
        }
    }

    fn probe(name: &'static str, log: &Rc<RefCell<Vec<&'static str>>>, fail: bool) -> Probe {
        Probe {
            name,
            log: Rc::clone(log),
            fail,
        }
    }

    #[test]
    fn test_systems_run_in_push_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pipeline = Pipeline::new();
        pipeline
            .push(probe("first", &log, false))
            .push(probe("second", &log, false));
        assert_eq!(pipeline.names(), vec!["first", "second"]);

        let mut world = World::new();
        pipeline.run_frame(&mut world, 1, Duration::ZERO).unwrap();
        pipeline.run_frame(&mut world, 2, Duration::ZERO).unwrap();
        assert_eq!(*log.borrow(), vec!["first", "second", "first", "second"]);
    }

    #[test]
    fn test_failure_names_system_and_stops_frame() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pipeline = Pipeline::new();
        pipeline
            .push(probe("ok", &log, false))
            .push(probe("broken", &log, true))
            .push(probe("never", &log, false));

        let mut world = World::new();
        let err = pipeline.run_frame(&mut world, 1, Duration::ZERO).unwrap_err();
        assert!(matches!(err, SystemError::Failed { system: "broken", .. }));
        assert_eq!(
            err.ecs(),
            Some(&EcsError::NotRegistered("Position".to_owned()))
        );
        assert_eq!(*log.borrow(), vec!["ok", "broken"]);
    }

    #[test]
    fn test_validate_requires_declared_stores() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pipeline = Pipeline::new();
        pipeline.push(probe("timers", &log, false));

        let mut world = World::new();
        let err = pipeline.validate(&world).unwrap_err();
        assert!(matches!(err, SystemError::InvalidQuery { system: "timers", .. }));

        world.registry_mut().register_default::<Timer>().unwrap();
        pipeline.validate(&world).unwrap();
        // Validation never runs a system.
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_empty_pipeline_is_a_noop() {
        let mut pipeline = Pipeline::new();
        let mut world = World::new();
        let e = world.spawn().unwrap();
        assert!(pipeline.is_empty());
        pipeline.validate(&world).unwrap();
        pipeline.run_frame(&mut world, 1, Duration::from_secs(1)).unwrap();
        assert!(world.is_alive(e));
        assert_eq!(world.entity_count(), 1);
    }
}
