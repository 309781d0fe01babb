//! Sprite rendering.
//!
//! The render system does not draw anything itself. It walks the visible
//! sprites and issues one [`DrawCommand`] per sprite to a [`Canvas`], which
//! owns the actual graphics backend.

use manic_component::{Entity, QueryDescriptor};
use manic_components::{ImageHandle, Sprite};
use manic_math::{Point, Position, Rotation, Vec2};

use crate::context::FrameContext;
use crate::error::SystemError;
use crate::system::System;

/// One sprite to draw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// Entity the sprite belongs to.
    pub entity: Entity,
    /// Image to draw.
    pub image: ImageHandle,
    /// Top-left corner in screen pixels.
    pub at: Point,
    /// Clockwise rotation in radians, 0 when the entity has no [`Rotation`].
    pub rotation: f32,
    /// Rotation pivot relative to `at`.
    pub origin: Vec2,
}

/// Destination for draw commands.
///
/// Every frame is bracketed by `begin` and `end`.
pub trait Canvas {
    /// Start a frame.
    ///
    /// # Errors
    ///
    /// [`SystemError::Render`] if the backend cannot start drawing.
    fn begin(&mut self) -> Result<(), SystemError>;

    /// Queue one sprite.
    ///
    /// # Errors
    ///
    /// [`SystemError::Render`] if the backend rejects the command.
    fn draw(&mut self, command: DrawCommand) -> Result<(), SystemError>;

    /// Finish and present the frame.
    ///
    /// # Errors
    ///
    /// [`SystemError::Render`] if presenting fails.
    fn end(&mut self) -> Result<(), SystemError>;
}

/// Draws every visible [`Sprite`] that has a [`Position`].
#[derive(Debug)]
pub struct RenderSystem<C> {
    canvas: C,
}

impl<C: Canvas> RenderSystem<C> {
    /// Create a render system drawing to `canvas`.
    #[must_use]
    pub fn new(canvas: C) -> Self {
        Self { canvas }
    }
}

impl<C: Canvas> System for RenderSystem<C> {
    fn name(&self) -> &'static str {
        "render"
    }

    fn query(&self) -> QueryDescriptor {
        QueryDescriptor::new()
            .read::<Sprite>()
            .read::<Position>()
            .read::<Rotation>()
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), SystemError> {
        let sprites = ctx.world.store::<Sprite>()?;
        let positions = ctx.world.store::<Position>()?;
        let rotations = ctx.world.store::<Rotation>()?;

        self.canvas.begin()?;
        // Ascending entity order keeps overlapping sprites stable between frames.
        for (entity, sprite) in sprites.iter() {
            if !sprite.visible {
                continue;
            }
            let Ok(position) = positions.get_ref(entity) else {
                continue;
            };
            let (rotation, origin) = rotations
                .get_ref(entity)
                .map_or((0.0, Vec2::ZERO), |r| (r.radians, r.origin));

            self.canvas.draw(DrawCommand {
                entity,
                image: sprite.image,
                at: position.point,
                rotation,
                origin,
            })?;
        }
        self.canvas.end()
    }
}
