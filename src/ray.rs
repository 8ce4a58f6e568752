use crate::map::{Cell, Map, TILE_SIZE};
use crate::player::Player;
use glam::{IVec2, Vec2};
use std::f32::consts::FRAC_PI_2;

/// horizontal field of view
pub const FOV: f32 = FRAC_PI_2;
/// rays per frame, one per screen column strip
pub const NUM_RAYS: usize = 320;

/// per-axis step length when a direction component is exactly zero
const PARALLEL: f32 = 1e30;

/// Which grid line the ray crossed when it hit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    /// stepped along X, the wall face is vertical on the map
    X,
    /// stepped along Y, the wall face is horizontal on the map
    Y,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct HitRecord {
    pub column: usize,
    pub angle: f32,
    /// distance to the wall along the view direction, world units
    pub distance: f32,
    pub side: Side,
    pub step: IVec2,
    /// the wall cell that was hit
    pub cell: IVec2,
    /// world position where the ray met the wall
    pub point: Vec2,
    /// cells traversed before the hit
    pub steps: u32,
}

/// Outcome of walking one ray through the grid.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Cast {
    Hit(HitRecord),
    /// the ray left the map after `steps` cells without meeting a wall
    Escaped { steps: u32 },
}

impl Cast {
    pub fn hit(self) -> Option<HitRecord> {
        match self {
            Cast::Hit(hit) => Some(hit),
            Cast::Escaped { .. } => None,
        }
    }

    /// grid cells entered, including the one that ended the walk
    pub fn steps(&self) -> u32 {
        match self {
            Cast::Hit(hit) => hit.steps,
            Cast::Escaped { steps } => *steps,
        }
    }
}

fn inv_abs(v: f32) -> f32 {
    if v == 0. {
        PARALLEL
    } else {
        (1. / v).abs()
    }
}

/// angle of ray `column` out of `NUM_RAYS` spread across the FOV
pub fn ray_angle(facing: f32, column: usize) -> f32 {
    facing - FOV / 2. + column as f32 * (FOV / NUM_RAYS as f32)
}

/// Walk the grid from `origin` along `angle` until a wall cell is entered.
///
/// Returns `Cast::Escaped` if the ray leaves the map first. The distance in the
/// record is projected onto `facing`, which removes the fisheye bulge of a fan
/// of rays.
pub fn cast_ray(map: &Map, origin: Vec2, facing: f32, angle: f32, column: usize) -> Cast {
    let dir = Vec2::from_angle(angle);
    let delta = Vec2::new(inv_abs(dir.x), inv_abs(dir.y));
    let mut cell = Map::cell_of(origin);
    let corner = Map::cell_to_world(cell);

    let step = IVec2::new(
        if dir.x < 0. { -1 } else { 1 },
        if dir.y < 0. { -1 } else { 1 },
    );

    // distance along the ray to the first grid line on each axis
    let first = Vec2::new(
        if dir.x < 0. {
            origin.x - corner.x
        } else {
            corner.x + TILE_SIZE - origin.x
        },
        if dir.y < 0. {
            origin.y - corner.y
        } else {
            corner.y + TILE_SIZE - origin.y
        },
    );
    let mut side_dist = first * delta;

    let mut steps = 0;
    let side = loop {
        let side = if side_dist.x < side_dist.y {
            side_dist.x += delta.x * TILE_SIZE;
            cell.x += step.x;
            Side::X
        } else {
            side_dist.y += delta.y * TILE_SIZE;
            cell.y += step.y;
            Side::Y
        };
        steps += 1;

        match map.cell(cell) {
            None => {
                log::trace!("ray {column} left the map at {cell}");
                return Cast::Escaped { steps };
            }
            Some(Cell::Wall) => break side,
            Some(Cell::Open) => {}
        }
    };

    let tiles = origin / TILE_SIZE;
    let along_ray = TILE_SIZE
        * match side {
            Side::X => (cell.x as f32 - tiles.x + (1 - step.x) as f32 / 2.) / dir.x,
            Side::Y => (cell.y as f32 - tiles.y + (1 - step.y) as f32 / 2.) / dir.y,
        };

    Cast::Hit(HitRecord {
        column,
        angle,
        distance: along_ray * (facing - angle).cos(),
        side,
        step,
        cell,
        point: origin + dir * along_ray,
        steps,
    })
}

/// Cast every column of the view into `out`, in column order.
/// Columns whose ray escapes the map are skipped; the number skipped is returned.
pub fn cast_rays(map: &Map, player: &Player, out: &mut Vec<HitRecord>) -> usize {
    out.clear();

    let mut misses = 0;
    for column in 0..NUM_RAYS {
        let angle = ray_angle(player.angle, column);
        match cast_ray(map, player.pos, player.angle, angle, column) {
            Cast::Hit(hit) => out.push(hit),
            Cast::Escaped { .. } => misses += 1,
        }
    }

    misses
}
