//! Grid raycaster: player physics, DDA ray casting, column rendering and a
//! trail/shake compositor over a software frame buffer.

pub mod compositor;
pub mod framebuffer;
pub mod input;
pub mod map;
pub mod player;
pub mod ray;
pub mod render;

/// simulation ticks per second, also the frame rate cap
pub const TICKS_PER_SECOND: u32 = 60;
