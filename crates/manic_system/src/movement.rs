//! Velocity integration.

use tracing::trace;

use manic_component::QueryDescriptor;
use manic_components::{Confined, Movement};
use manic_math::{Point, Position};

use crate::context::FrameContext;
use crate::error::SystemError;
use crate::system::System;

/// Moves every entity that has both [`Movement`] and [`Position`].
///
/// Per entity and frame:
///
/// 1. `speed` is clamped to `max_speed` and the clamp is persisted.
/// 2. A non-unit, non-zero velocity is normalised, so velocity only sets the
///    direction.
/// 3. The position advances by `velocity * speed * elapsed_secs`, each axis
///    truncated toward zero to whole pixels.
/// 4. Entities with [`Confined`] are clamped into its bounds.
#[derive(Debug, Default)]
pub struct MovementSystem;

impl MovementSystem {
    /// Create the movement system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Applies steps 1 to 3 to a copy of the entity's values.
fn integrate(movement: &mut Movement, position: &mut Position, elapsed_secs: f64) {
    if movement.speed > movement.max_speed {
        movement.speed = movement.max_speed;
    }
    let adjustment = f64::from(movement.speed) * elapsed_secs;

    let squared = movement.velocity.length_squared();
    if squared != 0.0 && squared != 1.0 {
        movement.velocity = movement.velocity.normalize();
    }

    // `as` truncates toward zero and saturates on overflow.
    let offset = Point::new(
        (f64::from(movement.velocity.x) * adjustment) as i32,
        (f64::from(movement.velocity.y) * adjustment) as i32,
    );
    *position = position.translated(offset);
}

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn query(&self) -> QueryDescriptor {
        QueryDescriptor::new()
            .read::<Confined>()
            .write::<Movement>()
            .write::<Position>()
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), SystemError> {
        // Fail fast on a missing store even when nothing moves.
        self.query().check(ctx.world.registry())?;
        let elapsed_secs = ctx.elapsed_secs();

        for entity in ctx.world.store::<Movement>()?.keys() {
            let positions = ctx.world.store::<Position>()?;
            if !positions.contains(entity) {
                continue;
            }
            let mut position = positions.get(entity)?;
            let mut movement = ctx.world.store::<Movement>()?.get(entity)?;

            integrate(&mut movement, &mut position, elapsed_secs);

            if let Ok(confined) = ctx.world.store::<Confined>()?.get_ref(entity) {
                position.point = confined.bounds.clamp(position.point);
            }

            trace!(%entity, x = position.point.x, y = position.point.y, "moved");
            ctx.world.store_mut::<Position>()?.set(entity, position)?;
            ctx.world.store_mut::<Movement>()?.set(entity, movement)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use manic_component::{EcsError, Entity, World};
    use manic_math::{Bounds, Vec2};

    use super::*;

    fn movement_world() -> World {
        let mut world = World::new();
        let registry = world.registry_mut();
        registry.register_default::<Position>().unwrap();
        registry.register_default::<Movement>().unwrap();
        registry.register_default::<Confined>().unwrap();
        world
    }

    fn run(world: &mut World, elapsed: Duration) {
        let mut ctx = FrameContext::new(world, 1, elapsed);
        MovementSystem::new().update(&mut ctx).unwrap();
    }

    fn point(world: &World, entity: Entity) -> Point {
        world.store::<Position>().unwrap().get(entity).unwrap().point
    }

    #[test]
    fn test_only_moving_entity_changes() {
        let mut world = movement_world();
        let ids: Vec<Entity> = (0..3).map(|_| world.spawn().unwrap()).collect();
        assert_eq!(ids, vec![Entity(0), Entity(1), Entity(2)]);
        for &id in &ids {
            world
                .store_mut::<Position>()
                .unwrap()
                .add(id, Position::new(id, 0, 0))
                .unwrap();
        }
        world
            .store_mut::<Movement>()
            .unwrap()
            .add(
                Entity(1),
                Movement::idle(Entity(1), 100, 100).heading(Vec2::new(1.0, 0.0)),
            )
            .unwrap();

        run(&mut world, Duration::from_millis(100));

        assert_eq!(point(&world, Entity(1)), Point::new(10, 0));
        assert_eq!(point(&world, Entity(0)), Point::ZERO);
        assert_eq!(point(&world, Entity(2)), Point::ZERO);
    }

    #[test]
    fn test_speed_is_clamped_and_persisted() {
        let mut world = movement_world();
        let e = world.spawn().unwrap();
        world.store_mut::<Position>().unwrap().add(e, Position::new(e, 0, 0)).unwrap();
        world
            .store_mut::<Movement>()
            .unwrap()
            .add(e, Movement::idle(e, 500, 50).heading(Vec2::new(0.0, 1.0)))
            .unwrap();

        run(&mut world, Duration::from_secs(1));

        assert_eq!(point(&world, e), Point::new(0, 50));
        assert_eq!(world.store::<Movement>().unwrap().get(e).unwrap().speed, 50);
    }

    #[test]
    fn test_diagonal_velocity_is_normalised() {
        let mut world = movement_world();
        let e = world.spawn().unwrap();
        world.store_mut::<Position>().unwrap().add(e, Position::new(e, 0, 0)).unwrap();
        world
            .store_mut::<Movement>()
            .unwrap()
            .add(e, Movement::idle(e, 100, 100).heading(Vec2::new(3.0, 4.0)))
            .unwrap();

        run(&mut world, Duration::from_secs(1));

        // (0.6, 0.8) * 100, truncated.
        let p = point(&world, e);
        assert!((59..=60).contains(&p.x), "x = {}", p.x);
        assert!((79..=80).contains(&p.y), "y = {}", p.y);
        let v = world.store::<Movement>().unwrap().get(e).unwrap().velocity;
        assert!((v.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_negative_offsets_truncate_toward_zero() {
        let mut world = movement_world();
        let e = world.spawn().unwrap();
        world.store_mut::<Position>().unwrap().add(e, Position::new(e, 10, 10)).unwrap();
        world
            .store_mut::<Movement>()
            .unwrap()
            .add(e, Movement::idle(e, 15, 15).heading(Vec2::new(-1.0, 0.0)))
            .unwrap();

        // 15 px/s for 0.1 s is 1.5 px, which truncates to 1.
        run(&mut world, Duration::from_millis(100));
        assert_eq!(point(&world, e), Point::new(9, 10));
    }

    #[test]
    fn test_confined_entity_is_clamped() {
        let mut world = movement_world();
        let e = world.spawn().unwrap();
        world.store_mut::<Position>().unwrap().add(e, Position::new(e, 95, 5)).unwrap();
        world
            .store_mut::<Movement>()
            .unwrap()
            .add(e, Movement::idle(e, 100, 100).heading(Vec2::new(1.0, 0.0)))
            .unwrap();
        world
            .store_mut::<Confined>()
            .unwrap()
            .add(
                e,
                Confined {
                    entity: e,
                    bounds: Bounds::from_size(0, 0, 100, 100),
                },
            )
            .unwrap();

        run(&mut world, Duration::from_secs(1));
        assert_eq!(point(&world, e), Point::new(100, 5));
    }

    #[test]
    fn test_movement_without_position_is_skipped() {
        let mut world = movement_world();
        let e = world.spawn().unwrap();
        world
            .store_mut::<Movement>()
            .unwrap()
            .add(e, Movement::idle(e, 10, 10).heading(Vec2::X))
            .unwrap();

        run(&mut world, Duration::from_secs(1));
        assert!(!world.store::<Position>().unwrap().contains(e));
    }

    #[test]
    fn test_missing_store_fails_fast() {
        let mut world = World::new();
        world.registry_mut().register_default::<Movement>().unwrap();
        let mut ctx = FrameContext::new(&mut world, 1, Duration::ZERO);
        let err = MovementSystem::new().update(&mut ctx).unwrap_err();
        assert!(matches!(err, SystemError::Ecs(EcsError::NotRegistered(_))));
    }
}
