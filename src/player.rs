use crate::input::Input;
use crate::map::Map;
use crate::TICKS_PER_SECOND;
use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

pub const PLAYER_RADIUS: f32 = 20.;
pub const BASE_SPEED: f32 = 4.;
pub const DASH_SPEED: f32 = 20.;
pub const AIR_SPEED_MULTIPLIER: f32 = 1.2;
/// turn rate of the top-down scheme, radians per tick
pub const ROTATE_SPEED: f32 = 0.05;

pub const MOUSE_SENSITIVITY: f32 = 0.002;
pub const MAX_PITCH: f32 = 80. * PI / 180.;

pub const GRAVITY: f32 = 0.6;
pub const JUMP_VELOCITY: f32 = 18.;
pub const GROUND_LEVEL: f32 = 0.;

pub const DASH_TICKS: u32 = 6;
pub const DASH_SHAKE: u32 = 4;
pub const DASH_TRAIL: u8 = 160;
pub const TRAIL_DECAY: u8 = 10;

/// vertical physics mode
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Vertical {
    Grounded,
    Airborne { z_vel: f32 },
}

impl Vertical {
    /// Jumping is only possible from the ground; in the air the request is dropped.
    pub fn jump(self) -> Self {
        match self {
            Vertical::Grounded => Vertical::Airborne {
                z_vel: JUMP_VELOCITY,
            },
            airborne => airborne,
        }
    }

    pub fn is_grounded(self) -> bool {
        self == Vertical::Grounded
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dash {
    Idle,
    Dashing { ticks_left: u32 },
}

impl Dash {
    /// Start a dash. A request while already dashing does nothing.
    pub fn request(self) -> Self {
        match self {
            Dash::Idle => Dash::Dashing {
                ticks_left: DASH_TICKS,
            },
            dashing => dashing,
        }
    }

    /// one tick of dash time passes
    pub fn advance(self) -> Self {
        match self {
            Dash::Dashing { ticks_left } if ticks_left > 1 => Dash::Dashing {
                ticks_left: ticks_left - 1,
            },
            _ => Dash::Idle,
        }
    }

    pub fn ticks_left(self) -> u32 {
        match self {
            Dash::Idle => 0,
            Dash::Dashing { ticks_left } => ticks_left,
        }
    }
}

/// Screen-space effects driven by the dash, consumed by the compositor.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Effects {
    /// shake amplitude in pixels
    pub shake: u32,
    /// blend alpha of the previous frame
    pub trail: u8,
}

impl Effects {
    fn refresh(&mut self) {
        self.shake = DASH_SHAKE;
        self.trail = DASH_TRAIL;
    }

    fn decay(&mut self) {
        self.shake = self.shake.saturating_sub(1);
        self.trail = self.trail.saturating_sub(TRAIL_DECAY);
    }
}

/// How movement keys turn into motion. Also picks the view that gets rendered.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ControlScheme {
    /// mouse look, WASD walks and strafes
    #[default]
    FirstPerson,
    /// W/S walk along the facing, A/D turn
    TopDown,
}

impl ControlScheme {
    pub fn toggled(self) -> Self {
        match self {
            ControlScheme::FirstPerson => ControlScheme::TopDown,
            ControlScheme::TopDown => ControlScheme::FirstPerson,
        }
    }

    pub fn uses_mouse_look(self) -> bool {
        self == ControlScheme::FirstPerson
    }

    /// Map intents to a displacement and a facing change for this tick.
    ///
    /// The displacement never exceeds `speed`, so pressing two directions at
    /// once does not move faster than one.
    pub fn intents_to_displacement(self, angle: f32, speed: f32, input: &Input) -> (Vec2, f32) {
        let forward = Vec2::from_angle(angle);
        let mut step = Vec2::ZERO;
        let mut turn = 0.;

        if input.forward {
            step += forward;
        }
        if input.back {
            step -= forward;
        }

        match self {
            ControlScheme::FirstPerson => {
                if input.strafe_left {
                    step += Vec2::from_angle(angle - FRAC_PI_2);
                }
                if input.strafe_right {
                    step += Vec2::from_angle(angle + FRAC_PI_2);
                }
            }
            ControlScheme::TopDown => {
                if input.rotate_left {
                    turn -= ROTATE_SPEED;
                }
                if input.rotate_right {
                    turn += ROTATE_SPEED;
                }
            }
        }

        ((step * speed).clamp_length_max(speed), turn)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Player {
    pub pos: Vec2,
    /// facing, radians; only ever fed to trig so it is left unwrapped
    pub angle: f32,
    pub pitch: f32,
    /// eye height above the ground, raised by jumping
    pub eye_z: f32,
    pub vertical: Vertical,
    pub dash: Dash,
    pub radius: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(150., 150.),
            angle: 0.,
            pitch: 0.,
            eye_z: GROUND_LEVEL,
            vertical: Vertical::Grounded,
            dash: Dash::Idle,
            radius: PLAYER_RADIUS,
        }
    }
}

impl Player {
    pub fn at(pos: Vec2, angle: f32) -> Self {
        Self {
            pos,
            angle,
            ..Default::default()
        }
    }

    /// Apply mouse motion. Pitch stays within `MAX_PITCH` of level.
    pub fn look(&mut self, delta: Vec2) {
        self.angle += delta.x * MOUSE_SENSITIVITY;
        self.pitch = (self.pitch - delta.y * MOUSE_SENSITIVITY).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Move by `delta`, resolving each axis separately so the player slides
    /// along walls. An axis is rejected when either edge of the collision disc
    /// on that axis would end up in a wall. Y is tested against the updated X.
    pub fn move_with_collision(&mut self, map: &Map, delta: Vec2) {
        let r = self.radius;

        let new_x = self.pos.x + delta.x;
        if !map.is_wall(new_x + r, self.pos.y) && !map.is_wall(new_x - r, self.pos.y) {
            self.pos.x = new_x;
        }

        let new_y = self.pos.y + delta.y;
        if !map.is_wall(self.pos.x, new_y + r) && !map.is_wall(self.pos.x, new_y - r) {
            self.pos.y = new_y;
        }
    }

    /// Whether the centre and the four edge points of the collision disc are
    /// all in open cells.
    pub fn fits(&self, map: &Map) -> bool {
        let Vec2 { x, y } = self.pos;
        let r = self.radius;
        [(x, y), (x + r, y), (x - r, y), (x, y + r), (x, y - r)]
            .into_iter()
            .all(|(x, y)| !map.is_wall(x, y))
    }

    /// One tick of gravity while airborne.
    fn fall(&mut self) {
        let Vertical::Airborne { z_vel } = self.vertical else {
            return;
        };

        let z_vel = z_vel - GRAVITY;
        self.eye_z += z_vel;
        if self.eye_z <= GROUND_LEVEL {
            log::debug!("landed");
            self.eye_z = GROUND_LEVEL;
            self.vertical = Vertical::Grounded;
        } else {
            self.vertical = Vertical::Airborne { z_vel };
        }
    }

    fn move_speed(&self) -> f32 {
        let speed = match self.dash {
            Dash::Dashing { .. } => DASH_SPEED,
            Dash::Idle => BASE_SPEED,
        };

        if self.vertical.is_grounded() {
            speed
        } else {
            speed * AIR_SPEED_MULTIPLIER
        }
    }
}

/// Everything the simulation mutates between frames.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct GameState {
    pub player: Player,
    pub effects: Effects,
    pub scheme: ControlScheme,
    pub ticks: u64,
}

impl GameState {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            ..Default::default()
        }
    }

    /// Start a game on `map`, refusing a spawn pose that overlaps a wall.
    /// Collision only ever rejects moves, so a player placed inside a wall
    /// would stay stuck there.
    pub fn spawn(map: &Map, player: Player) -> anyhow::Result<Self> {
        if !player.fits(map) {
            anyhow::bail!(
                "spawn {} (radius {}) is inside a wall of the {}x{} map",
                player.pos,
                player.radius,
                map.width(),
                map.height()
            );
        }
        Ok(Self::new(player))
    }

    /// seconds of simulated time
    pub fn elapsed(&self) -> f32 {
        self.ticks as f32 / TICKS_PER_SECOND as f32
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self, map: &Map, input: &Input) {
        let player = &mut self.player;

        if self.scheme.uses_mouse_look() {
            player.look(input.look);
        }

        if input.jump {
            let before = player.vertical;
            player.vertical = before.jump();
            if before != player.vertical {
                log::debug!("jump");
            }
        }
        if input.dash && player.dash == Dash::Idle {
            log::debug!("dash");
            player.dash = player.dash.request();
        }

        let speed = player.move_speed();
        match player.dash {
            Dash::Dashing { .. } => self.effects.refresh(),
            Dash::Idle => self.effects.decay(),
        }
        player.dash = player.dash.advance();

        let (step, turn) = self.scheme.intents_to_displacement(player.angle, speed, input);
        player.angle += turn;
        player.move_with_collision(map, step);
        player.fall();

        self.ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{DEFAULT_MAP, TILE_SIZE};
    use proptest::prelude::*;

    fn default_map() -> Map {
        Map::parse(DEFAULT_MAP).unwrap()
    }

    /// a room of open cells surrounded by a one tile wall
    fn room(width: usize, height: usize) -> Map {
        let src = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                            '1'
                        } else {
                            '0'
                        }
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        Map::parse(&src).unwrap()
    }

    fn bounding_points_clear(map: &Map, player: &Player) -> bool {
        let Vec2 { x, y } = player.pos;
        let r = player.radius;
        !map.is_wall(x + r, y)
            && !map.is_wall(x - r, y)
            && !map.is_wall(x, y + r)
            && !map.is_wall(x, y - r)
    }

    #[test]
    fn default_spawn_fits_default_map() {
        let state = GameState::spawn(&default_map(), Player::default()).unwrap();
        assert_eq!(state.player.pos, Vec2::new(150., 150.));
    }

    #[test]
    fn spawn_inside_wall_is_rejected() {
        // the default spawn (150, 150) is in cell (1, 1), a wall here
        let map = Map::parse("1111\n1101\n1001\n1111\n").unwrap();
        let err = GameState::spawn(&map, Player::default()).unwrap_err();
        assert!(err.to_string().contains("inside a wall"));

        let map = Map::parse("111\n111\n111\n").unwrap();
        assert!(GameState::spawn(&map, Player::default()).is_err());
    }

    #[test]
    fn walks_forward_at_base_speed() {
        let map = default_map();
        let mut state = GameState::default();
        let input = Input {
            forward: true,
            ..Default::default()
        };
        state.tick(&map, &input);
        assert!((state.player.pos.x - 154.).abs() < 1e-4);
        assert!((state.player.pos.y - 150.).abs() < 1e-4);
    }

    #[test]
    fn slides_along_wall_when_moving_diagonally() {
        let map = default_map();
        // row 0 is wall; the player hugs it
        let mut player = Player::at(Vec2::new(300., 121.), 0.);
        player.move_with_collision(&map, Vec2::new(5., -5.));
        assert_eq!(player.pos, Vec2::new(305., 121.));
    }

    #[test]
    fn blocked_axis_is_rejected_entirely() {
        let map = default_map();
        let mut player = Player::at(Vec2::new(1075., 150.), 0.);
        player.move_with_collision(&map, Vec2::new(10., 0.));
        assert_eq!(player.pos.x, 1075.);
    }

    #[test]
    fn diagonal_input_is_not_faster() {
        let input = Input {
            forward: true,
            strafe_right: true,
            ..Default::default()
        };
        let (step, turn) = ControlScheme::FirstPerson.intents_to_displacement(0.3, 4., &input);
        assert!((step.length() - 4.).abs() < 1e-4);
        assert_eq!(turn, 0.);
    }

    #[test]
    fn top_down_turns_instead_of_strafing() {
        let input = Input {
            strafe_left: true,
            rotate_left: true,
            ..Default::default()
        };
        let (step, turn) = ControlScheme::TopDown.intents_to_displacement(0., 4., &input);
        assert_eq!(step, Vec2::ZERO);
        assert_eq!(turn, -ROTATE_SPEED);

        let (step, turn) = ControlScheme::FirstPerson.intents_to_displacement(0., 4., &input);
        assert!((step - Vec2::new(0., -4.)).length() < 1e-4);
        assert_eq!(turn, 0.);
    }

    #[test]
    fn top_down_ignores_mouse_look() {
        let map = default_map();
        let mut state = GameState {
            scheme: ControlScheme::TopDown,
            ..Default::default()
        };
        let input = Input {
            look: Vec2::new(100., 100.),
            ..Default::default()
        };
        state.tick(&map, &input);
        assert_eq!(state.player.angle, 0.);
        assert_eq!(state.player.pitch, 0.);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut player = Player::default();
        player.look(Vec2::new(50., -10_000.));
        assert_eq!(player.pitch, MAX_PITCH);
        assert!((player.angle - 0.1).abs() < 1e-6);
        player.look(Vec2::new(0., 20_000.));
        assert_eq!(player.pitch, -MAX_PITCH);
    }

    #[test]
    fn jump_returns_to_ground() {
        let map = default_map();
        let mut state = GameState::default();
        let jump = Input {
            jump: true,
            ..Default::default()
        };
        state.tick(&map, &jump);
        assert!(!state.player.vertical.is_grounded());

        let mut apex = state.player.eye_z;
        let mut ticks = 1;
        while !state.player.vertical.is_grounded() {
            assert!(ticks < 62, "never landed");
            state.tick(&map, &Input::default());
            apex = apex.max(state.player.eye_z);
            ticks += 1;
        }

        // v0 / g = 30 ticks up, the same down
        assert!((58..=61).contains(&ticks), "landed after {ticks} ticks");
        assert!((apex - 261.).abs() < 1.);
        assert_eq!(state.player.eye_z, GROUND_LEVEL);
    }

    #[test]
    fn jump_is_ignored_while_airborne() {
        let map = default_map();
        let mut state = GameState::default();
        let jump = Input {
            jump: true,
            ..Default::default()
        };
        state.tick(&map, &jump);
        let Vertical::Airborne { z_vel } = state.player.vertical else {
            panic!("should be airborne");
        };
        state.tick(&map, &jump);
        assert_eq!(
            state.player.vertical,
            Vertical::Airborne {
                z_vel: z_vel - GRAVITY
            }
        );
    }

    #[test]
    fn airborne_movement_is_faster() {
        let map = default_map();
        let mut state = GameState::default();
        let input = Input {
            forward: true,
            jump: true,
            ..Default::default()
        };
        state.tick(&map, &input);
        assert!((state.player.pos.x - (150. + BASE_SPEED * AIR_SPEED_MULTIPLIER)).abs() < 1e-4);
    }

    #[test]
    fn dash_lasts_exactly_its_duration() {
        let map = default_map();
        let mut state = GameState::default();
        let dash = Input {
            dash: true,
            ..Default::default()
        };
        state.tick(&map, &dash);
        assert_eq!(state.player.dash.ticks_left(), DASH_TICKS - 1);
        assert_eq!(state.effects.shake, DASH_SHAKE);
        assert_eq!(state.effects.trail, DASH_TRAIL);

        let mut previous = state.player.dash.ticks_left();
        for _ in 1..DASH_TICKS {
            // retriggering mid-dash must not reset the timer
            state.tick(&map, &dash);
            let left = state.player.dash.ticks_left();
            assert_eq!(left, previous - 1);
            previous = left;
        }
        assert_eq!(state.player.dash, Dash::Idle);
    }

    #[test]
    fn dash_request_sets_full_duration() {
        assert_eq!(
            Dash::Idle.request(),
            Dash::Dashing {
                ticks_left: DASH_TICKS
            }
        );
        let mid = Dash::Dashing { ticks_left: 2 };
        assert_eq!(mid.request(), mid);
        assert_eq!(Dash::Dashing { ticks_left: 1 }.advance(), Dash::Idle);
    }

    #[test]
    fn effects_decay_after_dash() {
        let map = default_map();
        let mut state = GameState {
            effects: Effects {
                shake: DASH_SHAKE,
                trail: DASH_TRAIL,
            },
            ..Default::default()
        };
        state.tick(&map, &Input::default());
        assert_eq!(state.effects.shake, DASH_SHAKE - 1);
        assert_eq!(state.effects.trail, DASH_TRAIL - TRAIL_DECAY);

        for _ in 0..32 {
            state.tick(&map, &Input::default());
        }
        assert_eq!(state.effects, Effects::default());
    }

    #[test]
    fn dash_moves_at_dash_speed() {
        let map = room(40, 5);
        let mut state = GameState::new(Player::at(Vec2::new(250., 250.), 0.));
        let input = Input {
            forward: true,
            dash: true,
            ..Default::default()
        };
        state.tick(&map, &input);
        assert!((state.player.pos.x - (250. + DASH_SPEED)).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn never_penetrates_room_walls(
            w in 3usize..10,
            h in 3usize..10,
            moves in proptest::collection::vec((-30f32..30., -30f32..30.), 1..200),
        ) {
            let map = room(w, h);
            let mut player = Player::at(Vec2::splat(TILE_SIZE * 1.5), 0.);
            prop_assert!(bounding_points_clear(&map, &player));
            for (dx, dy) in moves {
                player.move_with_collision(&map, Vec2::new(dx, dy));
                prop_assert!(bounding_points_clear(&map, &player));
            }
        }

        #[test]
        fn centre_never_enters_a_wall(
            walls in proptest::collection::vec(any::<bool>(), 64),
            moves in proptest::collection::vec((-30f32..30., -30f32..30.), 1..200),
        ) {
            let src = (0..8)
                .map(|y| {
                    (0..8)
                        .map(|x| {
                            let border = x == 0 || y == 0 || x == 7 || y == 7;
                            let start = x == 1 && y == 1;
                            if border || (walls[y * 8 + x] && !start) { '1' } else { '0' }
                        })
                        .collect::<String>()
                })
                .collect::<Vec<_>>()
                .join("\n");
            let map = Map::parse(&src).unwrap();
            let mut player = Player::default();
            for (dx, dy) in moves {
                player.move_with_collision(&map, Vec2::new(dx, dy));
                prop_assert!(!map.is_wall(player.pos.x, player.pos.y));
            }
        }
    }
}
