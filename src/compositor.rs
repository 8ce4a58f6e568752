use crate::framebuffer::FrameBuffer;
use crate::player::Effects;
use crate::render::BACKGROUND;
use glam::{IVec2, Vec2};

/// pixels the trail is smeared along the facing direction
pub const TRAIL_OFFSET: f32 = 4.;
/// angular speed of the shake oscillation, radians per second
pub const SHAKE_FREQUENCY: f32 = 45.;

pub fn trail_offset(facing: f32) -> IVec2 {
    // truncation toward zero keeps the smear symmetric for opposite headings
    (Vec2::from_angle(facing) * TRAIL_OFFSET).as_ivec2()
}

pub fn shake_offset(shake: u32, elapsed: f32) -> IVec2 {
    if shake == 0 {
        return IVec2::ZERO;
    }
    let phase = elapsed * SHAKE_FREQUENCY;
    (Vec2::new(phase.sin(), phase.cos()) * shake as f32)
        .round()
        .as_ivec2()
}

/// Owns the previous frame and the presented output.
pub struct Compositor {
    previous: Option<FrameBuffer>,
    output: FrameBuffer,
}

impl Compositor {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            previous: None,
            output: FrameBuffer::new(width, height),
        }
    }

    /// Blend last tick's frame into `frame` as a trail, keep the result for the
    /// next tick, then return it translated by the current shake.
    pub fn composite(
        &mut self,
        frame: &mut FrameBuffer,
        effects: Effects,
        facing: f32,
        elapsed: f32,
    ) -> &FrameBuffer {
        if effects.trail > 0 {
            if let Some(previous) = &self.previous {
                frame.blend_from(previous, trail_offset(facing), effects.trail);
            }
        }

        match &mut self.previous {
            Some(previous) => previous.copy_from(frame),
            None => self.previous = Some(frame.clone()),
        }

        frame.translate_into(
            &mut self.output,
            shake_offset(effects.shake, elapsed),
            BACKGROUND,
        );
        &self.output
    }
}
