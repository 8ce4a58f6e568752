use crate::framebuffer::{FrameBuffer, Rgb};
use crate::map::{Cell, Map, TILE_SIZE};
use crate::player::{ControlScheme, GameState, Player, MAX_PITCH};
use crate::ray::{HitRecord, FOV, NUM_RAYS};
use glam::{IVec2, Vec2};

/// on-screen wall height is this divided by distance
pub const WALL_HEIGHT_SCALE: f32 = 16_000.;
/// added to every distance before dividing by it
pub const DISTANCE_EPSILON: f32 = 1e-4;
pub const SHADE_FALLOFF: f32 = 1e-4;
/// how strongly the eye height shifts walls, scaled by their proximity
pub const JUMP_PARALLAX: f32 = 0.12;
/// floor rise per unit of eye height
pub const FLOOR_RISE: f32 = 0.008;

pub const BACKGROUND: Rgb = Rgb::gray(30);
pub const CEILING: Rgb = Rgb::gray(50);
pub const FLOOR: Rgb = Rgb::gray(100);

const MAP_WALL: Rgb = Rgb::gray(90);
const MAP_OPEN: Rgb = Rgb::gray(30);
const MAP_PLAYER: Rgb = Rgb::new(0, 200, 255);
const MAP_RAY: Rgb = Rgb::new(255, 100, 0);
const MAP_CONE: Rgb = Rgb::new(0, 255, 255);
const MAP_CONE_ALPHA: u8 = 50;
/// length of the field of view cone, in screen pixels
const MAP_CONE_LENGTH: f32 = 200.;
/// rays drawn in the top-down view
const MAP_RAYS: usize = 60;

/// screen rectangle and gray level of one wall strip
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct WallColumn {
    pub x: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub shade: u8,
}

pub fn shade(distance: f32) -> u8 {
    (255. / (1. + distance * distance * SHADE_FALLOFF)).clamp(0., 255.) as u8
}

/// vertical shift of the whole view from looking up or down
fn pitch_shift(player: &Player, half_height: f32) -> f32 {
    player.pitch.clamp(-MAX_PITCH, MAX_PITCH).tan() * half_height
}

/// screen row where the ceiling meets the floor
pub fn horizon(player: &Player, screen_height: usize) -> f32 {
    let half = (screen_height / 2) as f32;
    half + pitch_shift(player, half)
}

pub fn wall_column(hit: &HitRecord, player: &Player, width: usize, height: usize) -> WallColumn {
    let column_width = width as f32 / NUM_RAYS as f32;
    let half = (height / 2) as f32;
    let projection_plane = width as f32 / (2. * (FOV / 2.).tan());
    let distance = hit.distance + DISTANCE_EPSILON;

    let wall_height = WALL_HEIGHT_SCALE / distance;
    let jump_offset = player.eye_z * (projection_plane / distance) * JUMP_PARALLAX;
    let top = half - (wall_height / 2.).floor() + pitch_shift(player, half) + jump_offset;

    WallColumn {
        x: (hit.column as f32 * column_width) as i32,
        top: top as i32,
        width: (column_width + 1.) as i32,
        height: wall_height.min(i32::MAX as f32) as i32,
        shade: shade(hit.distance),
    }
}

/// Clear to the background and paint ceiling and floor bands.
pub fn draw_horizon(frame: &mut FrameBuffer, player: &Player) {
    let width = frame.width() as i32;
    let height = frame.height() as i32;
    let horizon = horizon(player, frame.height());
    let floor_top = horizon - player.eye_z * FLOOR_RISE;

    frame.fill(BACKGROUND);
    frame.fill_rect(0, 0, width, horizon as i32, CEILING);
    frame.fill_rect(0, floor_top as i32, width, height, FLOOR);
}

/// First-person view. Columns without a hit keep whatever is behind them.
pub fn draw_first_person(frame: &mut FrameBuffer, hits: &[HitRecord], player: &Player) {
    draw_horizon(frame, player);

    let (width, height) = (frame.width(), frame.height());
    for hit in hits {
        let col = wall_column(hit, player, width, height);
        frame.fill_rect(col.x, col.top, col.width, col.height, Rgb::gray(col.shade));
    }
}

/// Placement of the map in the top-down view: uniformly scaled and centred.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TopDownView {
    scale: f32,
    offset: Vec2,
}

impl TopDownView {
    pub fn fit(map: &Map, frame: &FrameBuffer) -> Self {
        let world = Vec2::new(map.width() as f32, map.height() as f32) * TILE_SIZE;
        let screen = Vec2::new(frame.width() as f32, frame.height() as f32);
        let scale = (screen / world).min_element();

        Self {
            scale,
            offset: ((screen - world * scale) / 2.).floor(),
        }
    }

    pub fn project(&self, p: Vec2) -> Vec2 {
        self.offset + p * self.scale
    }

    pub fn to_screen(&self, p: Vec2) -> IVec2 {
        self.project(p).as_ivec2()
    }
}

/// Outline of the field of view: the apex followed by `MAP_RAYS + 1` points on
/// the arc from the left edge of the view to the right edge.
fn view_cone(apex: Vec2, facing: f32) -> Vec<Vec2> {
    let start = facing - FOV / 2.;
    let step = FOV / MAP_RAYS as f32;
    std::iter::once(apex)
        .chain((0..=MAP_RAYS).map(|i| {
            apex + Vec2::from_angle(start + i as f32 * step) * MAP_CONE_LENGTH
        }))
        .collect()
}

/// Debug view: the whole map, a translucent view cone, the player and a fan
/// of rays.
pub fn draw_top_down(frame: &mut FrameBuffer, map: &Map, hits: &[HitRecord], player: &Player) {
    frame.fill(BACKGROUND);
    let view = TopDownView::fit(map, frame);

    let tile = (TILE_SIZE * view.scale).ceil() as i32;
    for (at, cell) in map.iter() {
        let corner = view.to_screen(Map::cell_to_world(at));
        let color = match cell {
            Cell::Wall => MAP_WALL,
            Cell::Open => MAP_OPEN,
        };
        frame.fill_rect(corner.x, corner.y, tile, tile, color);
    }

    let cone = view_cone(view.project(player.pos), player.angle);
    frame.blend_polygon(&cone, MAP_CONE, MAP_CONE_ALPHA);

    let eye = view.to_screen(player.pos);
    let stride = (NUM_RAYS / MAP_RAYS).max(1);
    for hit in hits.iter().filter(|hit| hit.column % stride == 0) {
        frame.draw_line(eye, view.to_screen(hit.point), MAP_RAY);
    }

    frame.fill_circle(eye, 6, MAP_PLAYER);
    let nose = eye + (Vec2::from_angle(player.angle) * 20.).as_ivec2();
    frame.draw_line(eye, nose, MAP_PLAYER);
}

/// Draw the view belonging to the active control scheme.
pub fn draw(frame: &mut FrameBuffer, map: &Map, state: &GameState, hits: &[HitRecord]) {
    match state.scheme {
        ControlScheme::FirstPerson => draw_first_person(frame, hits, &state.player),
        ControlScheme::TopDown => draw_top_down(frame, map, hits, &state.player),
    }
}
