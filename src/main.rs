use game::Game;
use gridcast::map::{Map, DEFAULT_MAP};
use gridcast::player::{GameState, Player};
use gridcast::TICKS_PER_SECOND;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

mod game;

// helper trait to convert strings into std::error types
trait StringToAnyhow<T> {
    fn ah(self) -> anyhow::Result<T>;
}

impl<T> StringToAnyhow<T> for Result<T, String> {
    fn ah(self) -> anyhow::Result<T> {
        self.map_err(|err| anyhow::anyhow!("{err}"))
    }
}

// dimensions of screen
const WIDTH: usize = 960;
const HEIGHT: usize = 540;

/// map from the first argument, or the built-in one
fn load_map() -> anyhow::Result<Map> {
    match std::env::args_os().nth(1) {
        Some(path) => Map::load(Path::new(&path)),
        None => {
            log::info!("using built-in map");
            Map::parse(DEFAULT_MAP)
        }
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("GRIDCAST_LOG");

    let map = load_map()?;
    let state = GameState::spawn(&map, Player::default())?;

    // sdl boilerplate
    log::info!("initializing sdl2");
    let sdl_ctx = sdl2::init().ah()?;
    log::info!("initializing video");
    let video = sdl_ctx.video().ah()?;

    log::info!("initializing window");
    let mut window = video
        .window("gridcast", WIDTH as u32, HEIGHT as u32)
        .position_centered()
        .build()?;
    window.set_resizable(false);
    log::info!("creating canvas");
    let canvas = window.into_canvas().build()?;

    // one streaming texture, refilled every frame
    let texture_creator = canvas.texture_creator();
    let mut texture = texture_creator.create_texture_streaming(
        PixelFormatEnum::RGB24,
        WIDTH as u32,
        HEIGHT as u32,
    )?;

    // mouse look
    sdl_ctx.mouse().set_relative_mouse_mode(true);

    log::info!("pumping events");
    let mut events = sdl_ctx.event_pump().ah()?;

    let mut keys = HashSet::new();

    log::info!("initializing game state");
    let mut game = Game::new(canvas, map, state, WIDTH, HEIGHT);

    let delta = Duration::from_secs(1) / TICKS_PER_SECOND;

    'main_loop: loop {
        let prev = Instant::now();

        // handle events
        for ev in events.poll_iter() {
            match ev {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main_loop,
                Event::KeyDown {
                    keycode: Some(k),
                    repeat,
                    ..
                } => {
                    keys.insert(k);

                    if !repeat {
                        game.key_once(k);
                    }
                }
                Event::KeyUp {
                    keycode: Some(k), ..
                } => {
                    keys.remove(&k);
                }
                Event::MouseMotion { xrel, yrel, .. } => game.look(xrel, yrel),
                _ => {}
            }
        }

        game.held_keys(&keys);
        game.tick();

        // draw game
        if let Err(err) = game.draw(&mut texture) {
            log::error!("error while drawing tick {}: {err}", game.state.ticks);
            Err(err)?;
        }
        game.canvas.present();

        let diff = prev.elapsed();
        if diff < delta {
            std::thread::sleep(delta - diff);
        }
    }

    Ok(())
}
