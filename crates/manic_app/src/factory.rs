//! Entity assembly.
//!
//! Each `spawn_*` function allocates an id and adds one value struct per
//! participating store. If any add fails the partial entity is destroyed
//! before the error is returned, so a failed spawn leaves no trace.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use manic_component::{EcsError, Entity, World};
use manic_components::{Confined, ImageHandle, Movement, PlayerControl, Sprite, Timer};
use manic_math::{Bounds, Point, Position, Rotation, Vec2};

/// Tunables for the player entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTemplate {
    /// Starting point, pulled inside the screen if it lies outside.
    pub spawn: Point,
    /// Initial speed in pixels per second.
    pub speed: i32,
    /// Speed cap.
    pub max_speed: i32,
    /// Sprite image.
    pub image: ImageHandle,
}

impl Default for PlayerTemplate {
    fn default() -> Self {
        Self {
            spawn: Point::new(30, 30),
            speed: 250,
            max_speed: 250,
            image: ImageHandle(0),
        }
    }
}

/// Tunables for enemies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTemplate {
    /// Vertical spawn line; enemies are spread horizontally along it.
    pub spawn_y: i32,
    /// Direction of travel.
    pub heading: Vec2,
    /// Initial speed in pixels per second.
    pub speed: i32,
    /// Speed cap.
    pub max_speed: i32,
    /// Sprite image.
    pub image: ImageHandle,
    /// Despawn after this long; 0 keeps the enemy forever.
    pub lifetime_ms: u32,
}

impl Default for EnemyTemplate {
    fn default() -> Self {
        Self {
            spawn_y: -50,
            heading: Vec2::new(0.0, 1.0),
            speed: 150,
            max_speed: 150,
            image: ImageHandle(1),
            lifetime_ms: 8_000,
        }
    }
}

/// Tunables for projectiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTemplate {
    /// Fixed speed in pixels per second.
    pub speed: i32,
    /// Sprite image.
    pub image: ImageHandle,
    /// Despawn after this long.
    pub lifetime_ms: u32,
}

impl Default for ProjectileTemplate {
    fn default() -> Self {
        Self {
            speed: 120,
            image: ImageHandle(2),
            lifetime_ms: 2_000,
        }
    }
}

/// Registers an empty store for every gameplay component.
///
/// # Errors
///
/// [`EcsError::DuplicateRegistration`] if any store already exists.
pub fn register_components(world: &mut World) -> Result<(), EcsError> {
    let registry = world.registry_mut();
    registry.register_default::<Position>()?;
    registry.register_default::<Rotation>()?;
    registry.register_default::<Movement>()?;
    registry.register_default::<Timer>()?;
    registry.register_default::<Sprite>()?;
    registry.register_default::<PlayerControl>()?;
    registry.register_default::<Confined>()?;
    Ok(())
}

/// Spawns the player, confined to `bounds`.
///
/// # Errors
///
/// Any allocation or store error; the partial entity is rolled back.
pub fn spawn_player(
    world: &mut World,
    template: &PlayerTemplate,
    bounds: Bounds,
) -> Result<Entity, EcsError> {
    let spawn = bounds.clamp(template.spawn);
    if !bounds.contains(template.spawn) {
        warn!(requested = ?template.spawn, clamped = ?spawn, "player spawn outside screen");
    }
    assemble(world, "player", |world, entity| {
        world
            .store_mut::<Position>()?
            .add(entity, Position { entity, point: spawn })?;
        world
            .store_mut::<Movement>()?
            .add(entity, Movement::idle(entity, template.speed, template.max_speed))?;
        world
            .store_mut::<Sprite>()?
            .add(entity, Sprite::new(entity, template.image))?;
        world
            .store_mut::<PlayerControl>()?
            .add(entity, PlayerControl { entity })?;
        world
            .store_mut::<Confined>()?
            .add(entity, Confined { entity, bounds })?;
        Ok(())
    })
}

/// Spawns an enemy at `at`, travelling along the template heading.
///
/// # Errors
///
/// Any allocation or store error; the partial entity is rolled back.
pub fn spawn_enemy(world: &mut World, template: &EnemyTemplate, at: Point) -> Result<Entity, EcsError> {
    assemble(world, "enemy", |world, entity| {
        attach_body(world, entity, at, template.heading, template.speed, template.max_speed)?;
        world
            .store_mut::<Sprite>()?
            .add(entity, Sprite::new(entity, template.image))?;
        if template.lifetime_ms > 0 {
            world
                .store_mut::<Timer>()?
                .add(entity, Timer::lifetime(entity, template.lifetime_ms))?;
        }
        Ok(())
    })
}

/// Spawns a projectile at `at` flying along `direction`.
///
/// # Errors
///
/// Any allocation or store error; the partial entity is rolled back.
pub fn spawn_projectile(
    world: &mut World,
    template: &ProjectileTemplate,
    at: Point,
    direction: Vec2,
) -> Result<Entity, EcsError> {
    assemble(world, "projectile", |world, entity| {
        attach_body(world, entity, at, direction, template.speed, template.speed)?;
        world
            .store_mut::<Sprite>()?
            .add(entity, Sprite::new(entity, template.image))?;
        world
            .store_mut::<Timer>()?
            .add(entity, Timer::lifetime(entity, template.lifetime_ms))?;
        Ok(())
    })
}

/// Position, movement and a rotation facing the direction of travel.
fn attach_body(
    world: &mut World,
    entity: Entity,
    at: Point,
    heading: Vec2,
    speed: i32,
    max_speed: i32,
) -> Result<(), EcsError> {
    world
        .store_mut::<Position>()?
        .add(entity, Position { entity, point: at })?;
    world
        .store_mut::<Movement>()?
        .add(entity, Movement::idle(entity, speed, max_speed).heading(heading))?;
    let radians = if heading == Vec2::ZERO {
        0.0
    } else {
        heading.y.atan2(heading.x)
    };
    world
        .store_mut::<Rotation>()?
        .add(entity, Rotation::none(entity).rotated(radians))?;
    Ok(())
}

fn assemble<F>(world: &mut World, kind: &'static str, attach: F) -> Result<Entity, EcsError>
where
    F: FnOnce(&mut World, Entity) -> Result<(), EcsError>,
{
    let entity = world.spawn()?;
    if let Err(err) = attach(world, entity) {
        warn!(%entity, kind, %err, "spawn failed, rolling back");
        world.destroy(entity)?;
        return Err(err);
    }
    debug!(%entity, kind, "entity assembled");
    Ok(entity)
}
