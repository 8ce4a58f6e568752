use crate::StringToAnyhow;
use glam::Vec2;
use gridcast::compositor::Compositor;
use gridcast::framebuffer::FrameBuffer;
use gridcast::input::Input;
use gridcast::map::Map;
use gridcast::player::GameState;
use gridcast::ray::{cast_rays, HitRecord, NUM_RAYS};
use gridcast::render;
use sdl2::keyboard::Keycode;
use sdl2::render::{Canvas, Texture};
use sdl2::video::Window;
use std::collections::HashSet;

pub(crate) struct Game {
    map: Map,
    pub state: GameState,
    input: Input,
    hits: Vec<HitRecord>,
    frame: FrameBuffer,
    compositor: Compositor,
    pub canvas: Canvas<Window>,
}

impl Game {
    /// initialize game
    pub fn new(
        canvas: Canvas<Window>,
        map: Map,
        state: GameState,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            map,
            state,
            input: Input::default(),
            hits: Vec::with_capacity(NUM_RAYS),
            frame: FrameBuffer::new(width, height),
            compositor: Compositor::new(width, height),
            canvas,
        }
    }

    /// handle key presses (not repeats)
    pub fn key_once(&mut self, key: Keycode) {
        match key {
            // view toggle
            Keycode::Tab => {
                self.state.scheme = self.state.scheme.toggled();
                log::debug!("switched to {:?}", self.state.scheme);
            }
            Keycode::Space => self.input.jump = true,
            Keycode::Q => self.input.dash = true,
            _ => {}
        }
    }

    /// refresh movement intents from the keys currently held
    pub fn held_keys(&mut self, keys: &HashSet<Keycode>) {
        let held = |k: &[Keycode]| k.iter().any(|k| keys.contains(k));

        self.input.forward = held(&[Keycode::W, Keycode::Up]);
        self.input.back = held(&[Keycode::S, Keycode::Down]);
        self.input.strafe_left = held(&[Keycode::A]);
        self.input.strafe_right = held(&[Keycode::D]);
        self.input.rotate_left = held(&[Keycode::A, Keycode::Left]);
        self.input.rotate_right = held(&[Keycode::D, Keycode::Right]);
    }

    /// accumulate relative mouse motion until the next tick
    pub fn look(&mut self, xrel: i32, yrel: i32) {
        self.input.look += Vec2::new(xrel as f32, yrel as f32);
    }

    pub fn tick(&mut self) {
        self.state.tick(&self.map, &self.input);
        self.input.consume();
    }

    /// cast, render and composite the current state, then upload it through
    /// `texture` and copy it to the canvas
    pub fn draw(&mut self, texture: &mut Texture) -> anyhow::Result<()> {
        let misses = cast_rays(&self.map, &self.state.player, &mut self.hits);
        if misses > 0 {
            log::debug!("{misses} rays left the map at {}", self.state.player.pos);
        }

        render::draw(&mut self.frame, &self.map, &self.state, &self.hits);
        let output = self.compositor.composite(
            &mut self.frame,
            self.state.effects,
            self.state.player.angle,
            self.state.elapsed(),
        );

        texture.update(None, output.bytes(), output.pitch())?;
        self.canvas.copy(texture, None, None).ah()?;

        Ok(())
    }
}
