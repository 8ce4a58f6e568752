use anyhow::Context;
use glam::{IVec2, Vec2};
use std::fs::read_to_string;
use std::path::Path;

/// world units spanned by one grid cell
pub const TILE_SIZE: f32 = 100.;

/// the level shipped with the binary
pub const DEFAULT_MAP: &str = include_str!("../map/default.map");

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Open,
    Wall,
}

impl Cell {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Cell::Open),
            '1' => Some(Cell::Wall),
            _ => None,
        }
    }
}

/// Immutable rectangular tile grid. Everything outside the grid counts as wall.
#[derive(Clone, PartialEq, Debug)]
pub struct Map {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Map {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        log::info!("loading map at {}", path.display());
        let file = read_to_string(path)
            .with_context(|| format!("could not read map {}", path.display()))?;
        Self::parse(&file)
    }

    /// Parse rows of `1` (wall) and `0` (open). Rows must all have the same length.
    pub fn parse(src: &str) -> anyhow::Result<Self> {
        let mut width = None;
        let mut height = 0;
        let mut cells = vec![];

        for (row, line) in src
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .enumerate()
        {
            let len = line.chars().count();
            match width {
                None => width = Some(len),
                Some(w) if w != len => {
                    anyhow::bail!("map row {row} has length {len}, expected {w}")
                }
                Some(_) => {}
            }

            for (col, c) in line.chars().enumerate() {
                let cell = Cell::from_char(c)
                    .with_context(|| format!("invalid tile {c:?} at row {row}, column {col}"))?;
                cells.push(cell);
            }
            height += 1;
        }

        let Some(width) = width else {
            anyhow::bail!("map has no rows");
        };
        log::info!("parsed {width}x{height} map");

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// cell at grid coordinates, `None` outside the grid
    pub fn cell(&self, at: IVec2) -> Option<Cell> {
        if at.x < 0 || at.y < 0 || at.x as usize >= self.width || at.y as usize >= self.height {
            return None;
        }
        Some(self.cells[at.y as usize * self.width + at.x as usize])
    }

    pub fn is_wall_cell(&self, at: IVec2) -> bool {
        self.cell(at).map_or(true, |cell| cell == Cell::Wall)
    }

    /// grid coordinates of the cell containing a world position
    pub fn cell_of(pos: Vec2) -> IVec2 {
        (pos / TILE_SIZE).floor().as_ivec2()
    }

    pub fn is_wall(&self, x: f32, y: f32) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return true;
        }
        self.is_wall_cell(Self::cell_of(Vec2::new(x, y)))
    }

    /// world-space origin (top-left corner) of a cell
    pub fn cell_to_world(at: IVec2) -> Vec2 {
        at.as_vec2() * TILE_SIZE
    }

    pub fn iter(&self) -> impl Iterator<Item = (IVec2, Cell)> + '_ {
        self.cells.iter().enumerate().map(|(idx, cell)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (IVec2::new(x as i32, y as i32), *cell)
        })
    }
}
