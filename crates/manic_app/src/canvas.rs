//! A canvas that logs draw commands instead of rasterising them.

use tracing::{debug, trace};

use manic_system::{Canvas, DrawCommand, SystemError};

/// Headless [`Canvas`]: every draw becomes a trace event.
#[derive(Debug, Default)]
pub struct TracingCanvas {
    frames: u64,
    frame_draws: usize,
    total_draws: u64,
    in_frame: bool,
}

impl TracingCanvas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Canvas for TracingCanvas {
    fn begin(&mut self) -> Result<(), SystemError> {
        if self.in_frame {
            return Err(SystemError::Render("begin called twice without end".to_owned()));
        }
        self.in_frame = true;
        self.frame_draws = 0;
        Ok(())
    }

    fn draw(&mut self, command: DrawCommand) -> Result<(), SystemError> {
        if !self.in_frame {
            return Err(SystemError::Render("draw outside of a frame".to_owned()));
        }
        trace!(
            entity = %command.entity,
            image = command.image.0,
            x = command.at.x,
            y = command.at.y,
            rotation = command.rotation,
            "draw"
        );
        self.frame_draws += 1;
        self.total_draws += 1;
        Ok(())
    }

    fn end(&mut self) -> Result<(), SystemError> {
        if !self.in_frame {
            return Err(SystemError::Render("end called without begin".to_owned()));
        }
        self.in_frame = false;
        self.frames += 1;
        debug!(
            frame = self.frames,
            sprites = self.frame_draws,
            total = self.total_draws,
            "frame presented"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use manic_component::Entity;
    use manic_components::ImageHandle;
    use manic_math::{Point, Vec2};

    use super::*;

    fn command() -> DrawCommand {
        DrawCommand {
            entity: Entity(0),
            image: ImageHandle(0),
            at: Point::ZERO,
            rotation: 0.0,
            origin: Vec2::ZERO,
        }
    }

    #[test]
    fn test_counts_frames_and_draws() {
        let mut canvas = TracingCanvas::new();
        for _ in 0..2 {
            canvas.begin().unwrap();
            canvas.draw(command()).unwrap();
            canvas.draw(command()).unwrap();
            canvas.end().unwrap();
        }
        assert_eq!(canvas.frames, 2);
        assert_eq!(canvas.total_draws, 4);
    }

    #[test]
    fn test_rejects_unbracketed_calls() {
        let mut canvas = TracingCanvas::new();
        assert!(matches!(canvas.draw(command()), Err(SystemError::Render(_))));
        assert!(canvas.end().is_err());
        canvas.begin().unwrap();
        assert!(canvas.begin().is_err());
    }
}
