//! Game state and rules: movement, locking, line clears, scoring and the
//! lost state.

use embedded_graphics::pixelcolor::Rgb888;
use rand_core::RngCore;

use crate::{
    bag::{PieceBag, random_below},
    court::Court,
    input::{Action, InputSnapshot},
    piece::{PieceKind, Rotation, for_each_occupied_cell},
    timing::{SpeedCurve, TickDuration},
};

/// Message shown once the game is lost.
pub const GAME_OVER: &str = "Game Over !";

/// Points for every piece that locks.
pub const LOCK_SCORE: u32 = 10;

/// Points for clearing `rows` rows at once: 100, 200, 400, 800.
pub const fn line_clear_score(rows: u8) -> u32 {
    if rows == 0 { 0 } else { 100 << (rows - 1) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    const fn offset(self) -> (i32, i32) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
        }
    }
}

/// The falling piece, or the queued next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    /// Column of the bounding box's left edge.
    pub x: i32,
    /// Row of the bounding box's top edge.
    pub y: i32,
    pub color: Rgb888,
}

impl ActivePiece {
    /// Upright piece with its box's top-left corner at `(x, y)`.
    pub const fn new(kind: PieceKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            rotation: Rotation::Up,
            x,
            y,
            color: kind.color(),
        }
    }

    pub fn for_each_cell(&self, visit: impl FnMut(i32, i32)) {
        for_each_occupied_cell(self.kind, self.x, self.y, self.rotation, visit);
    }
}

/// What a single gravity step did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DropOutcome {
    /// The piece moved down one row.
    Fell,
    /// The piece locked, `rows` rows were cleared and the next piece spawned.
    Locked { rows: u8 },
    /// The piece locked and the next one had no room; the game is over.
    Lost { rows: u8 },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GameConfig {
    pub speed: SpeedCurve,
}

/// Tetris session.
///
/// Owns the court, the current and next pieces, the bag they are drawn from
/// and the random source. Input and gravity are fed in by the caller; the
/// engine never blocks or reads a clock itself.
pub struct GameEngine<R> {
    config: GameConfig,
    rng: R,
    bag: PieceBag,
    court: Court,
    current: ActivePiece,
    next: ActivePiece,
    playing: bool,
    lost: bool,
    score: u32,
    rows: u32,
    step: TickDuration,
    since_drop: TickDuration,
    notification: Option<&'static str>,
}

impl<R: RngCore> GameEngine<R> {
    /// A new game, already in play.
    pub fn new(config: GameConfig, rng: R) -> Self {
        let placeholder = ActivePiece::new(PieceKind::O, 0, 0);
        let mut engine = Self {
            config,
            rng,
            bag: PieceBag::new(),
            court: Court::new(),
            current: placeholder,
            next: placeholder,
            playing: false,
            lost: false,
            score: 0,
            rows: 0,
            step: config.speed.interval(0),
            since_drop: TickDuration::from_ticks(0),
            notification: None,
        };
        engine.reset();
        engine
    }

    /// Start over: empty court, zero score and rows, two fresh pieces.
    ///
    /// The bag is kept, so piece frequencies stay balanced across games.
    pub fn reset(&mut self) {
        self.court.clear();
        self.set_rows(0);
        self.score = 0;
        self.since_drop = TickDuration::from_ticks(0);
        self.current = self.draw_next_piece();
        self.next = self.draw_next_piece();
        self.lost = false;
        self.notification = None;
        self.playing = true;
        info!("new game: {} then {}", self.current.kind, self.next.kind);
    }

    /// Take a piece from the bag and place it upright in a random column on
    /// the top row.
    pub fn draw_next_piece(&mut self) -> ActivePiece {
        let kind = self.bag.draw(&mut self.rng);
        let columns = (Court::WIDTH - kind.size() + 1) as u32;
        let x = random_below(&mut self.rng, columns) as i32;
        ActivePiece::new(kind, x, 0)
    }

    // ── Collision ───────────────────────────────────────────────────────

    /// Whether `kind` at `(x, y, rotation)` would leave the court sideways,
    /// go through the floor, or overlap a locked cell. Cells above the top
    /// row are allowed.
    pub fn is_occupied(&self, kind: PieceKind, x: i32, y: i32, rotation: Rotation) -> bool {
        let mut blocked = false;
        for_each_occupied_cell(kind, x, y, rotation, |cx, cy| {
            if cx < 0 || cx >= Court::WIDTH || cy >= Court::HEIGHT || self.court.get(cx, cy).is_some() {
                blocked = true;
            }
        });
        blocked
    }

    pub fn is_unoccupied(&self, kind: PieceKind, x: i32, y: i32, rotation: Rotation) -> bool {
        !self.is_occupied(kind, x, y, rotation)
    }

    // ── Movement ────────────────────────────────────────────────────────

    /// Shift the current piece one cell. Returns `false`, leaving the piece
    /// where it was, if the target is blocked.
    pub fn move_piece(&mut self, direction: Direction) -> bool {
        let (dx, dy) = direction.offset();
        let (x, y) = (self.current.x + dx, self.current.y + dy);
        if self.is_unoccupied(self.current.kind, x, y, self.current.rotation) {
            self.current.x = x;
            self.current.y = y;
            true
        } else {
            false
        }
    }

    /// Turn the current piece clockwise in place. There are no wall kicks:
    /// a blocked rotation is refused.
    pub fn rotate(&mut self) -> bool {
        let rotation = self.current.rotation.next();
        if self.is_unoccupied(self.current.kind, self.current.x, self.current.y, rotation) {
            self.current.rotation = rotation;
            true
        } else {
            false
        }
    }

    /// One gravity step. Does nothing and returns `None` unless a game is in
    /// progress.
    pub fn drop(&mut self) -> Option<DropOutcome> {
        if !self.playing {
            return None;
        }
        if self.move_piece(Direction::Down) {
            return Some(DropOutcome::Fell);
        }

        self.score += LOCK_SCORE;
        self.lock_piece();
        let rows = self.remove_lines();
        self.current = self.next;
        self.next = self.draw_next_piece();

        let spawn = self.current;
        if self.is_occupied(spawn.kind, spawn.x, spawn.y, spawn.rotation) {
            self.lose();
            Some(DropOutcome::Lost { rows })
        } else {
            Some(DropOutcome::Locked { rows })
        }
    }

    /// Write the current piece into the court.
    fn lock_piece(&mut self) {
        let piece = self.current;
        let court = &mut self.court;
        piece.for_each_cell(|x, y| {
            court.set(x, y, Some(piece.kind));
        });
    }

    /// Clear complete rows and score them. Returns how many were cleared.
    pub fn remove_lines(&mut self) -> u8 {
        let n = self.court.remove_lines();
        if n > 0 {
            self.set_rows(self.rows + u32::from(n));
            self.score += line_clear_score(n);
            debug!("cleared {} rows, score {}", n, self.score);
        }
        n
    }

    fn set_rows(&mut self, rows: u32) {
        self.rows = rows;
        self.step = self.config.speed.interval(rows);
    }

    /// End the game. Gravity stops until the next reset.
    pub fn lose(&mut self) {
        if !self.lost {
            info!("game over: score {}, rows {}", self.score, self.rows);
        }
        self.playing = false;
        self.lost = true;
        self.notification = Some(GAME_OVER);
    }

    // ── Input & time ────────────────────────────────────────────────────

    /// Apply one control. Movement after a lost game starts a new one first.
    /// Returns whether anything changed.
    pub fn apply(&mut self, action: Action) -> bool {
        if action == Action::Forfeit {
            let was_lost = self.lost;
            self.lose();
            return !was_lost;
        }

        let restarted = self.lost;
        if restarted {
            self.reset();
        }
        let moved = match action {
            Action::MoveLeft => self.move_piece(Direction::Left),
            Action::MoveRight => self.move_piece(Direction::Right),
            Action::Rotate => self.rotate(),
            Action::Forfeit => false,
        };
        restarted || moved
    }

    /// Apply every control pressed this frame.
    pub fn handle_input(&mut self, input: InputSnapshot) -> bool {
        input
            .actions()
            .fold(false, |changed, action| self.apply(action) | changed)
    }

    /// Advance the drop timer by `elapsed`; once it runs past the current
    /// interval the piece drops one step and the timer restarts.
    pub fn tick(&mut self, elapsed: TickDuration) -> Option<DropOutcome> {
        if !self.playing {
            return None;
        }
        self.since_drop =
            TickDuration::from_ticks(self.since_drop.ticks().saturating_add(elapsed.ticks()));
        if self.since_drop > self.step {
            self.since_drop = TickDuration::from_ticks(0);
            self.drop()
        } else {
            None
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub const fn court(&self) -> &Court {
        &self.court
    }

    /// Mutable court, for setting up positions (puzzles, tests).
    pub const fn court_mut(&mut self) -> &mut Court {
        &mut self.court
    }

    pub const fn current(&self) -> &ActivePiece {
        &self.current
    }

    pub const fn next_piece(&self) -> &ActivePiece {
        &self.next
    }

    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    pub const fn is_lost(&self) -> bool {
        self.lost
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Rows cleared this game.
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Current time between gravity steps.
    pub const fn drop_interval(&self) -> TickDuration {
        self.step
    }

    pub const fn notification(&self) -> Option<&'static str> {
        self.notification
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

    use super::*;

    fn engine(seed: u64) -> GameEngine<ChaCha8Rng> {
        GameEngine::new(GameConfig::default(), ChaCha8Rng::seed_from_u64(seed))
    }

    #[test]
    fn new_game_is_playing_with_spawned_pieces() {
        let game = engine(1);
        assert!(game.is_playing() && !game.is_lost());
        assert_eq!(game.score(), 0);
        for piece in [game.current(), game.next_piece()] {
            assert_eq!(piece.y, 0);
            assert_eq!(piece.rotation, Rotation::Up);
            assert!(piece.x >= 0 && piece.x <= Court::WIDTH - piece.kind.size());
            assert_eq!(piece.color, piece.kind.color());
        }
    }

    #[test]
    fn boundaries_are_occupied_except_the_top() {
        let game = engine(2);
        let o = PieceKind::O;
        assert!(game.is_occupied(o, -1, 5, Rotation::Up));
        assert!(game.is_occupied(o, Court::WIDTH - 1, 5, Rotation::Up));
        assert!(game.is_occupied(o, 5, Court::HEIGHT - 1, Rotation::Up));
        assert!(game.is_unoccupied(o, 5, -1, Rotation::Up));
        assert!(game.is_unoccupied(o, 5, -10, Rotation::Up));
        assert!(game.is_unoccupied(o, 0, Court::HEIGHT - 2, Rotation::Up));
        assert!(game.is_unoccupied(o, Court::WIDTH - 2, 0, Rotation::Up));
    }

    #[test]
    fn locked_cells_block() {
        let mut game = engine(3);
        game.court_mut().set(6, 6, Some(PieceKind::T));
        assert!(game.is_occupied(PieceKind::O, 5, 5, Rotation::Up));
        assert!(game.is_unoccupied(PieceKind::O, 3, 5, Rotation::Up));
    }

    #[test]
    fn blocked_move_leaves_piece_in_place() {
        let mut game = engine(4);
        while game.move_piece(Direction::Left) {}
        let before = *game.current();
        assert_eq!(before.x + leftmost_column(&before), 0);
        assert!(!game.move_piece(Direction::Left));
        assert_eq!(*game.current(), before);
    }

    #[test]
    fn rotation_into_the_wall_is_refused() {
        let mut game = engine(9);
        // Upright-right I fills column 2 of its box; at x = 12 that is the
        // last court column, and the next (horizontal) rotation would stick
        // out past it.
        game.current = ActivePiece {
            rotation: Rotation::Right,
            ..ActivePiece::new(PieceKind::I, 12, 5)
        };
        assert!(game.is_unoccupied(PieceKind::I, 12, 5, Rotation::Right));
        let before = *game.current();

        assert!(!game.rotate());
        assert_eq!(*game.current(), before);
        assert_eq!(game.current().rotation, Rotation::Right);
    }

    #[test]
    fn rotation_into_a_locked_cell_is_refused() {
        let mut game = engine(10);
        game.current = ActivePiece::new(PieceKind::T, 5, 5);
        // T pointing right needs row 0, column 1 of its box, which the
        // upright T leaves empty.
        game.court_mut().set(6, 5, Some(PieceKind::O));
        assert!(game.is_unoccupied(PieceKind::T, 5, 5, Rotation::Up));
        let before = *game.current();

        assert!(!game.rotate());
        assert_eq!(game.current().rotation, Rotation::Up);
        assert_eq!(*game.current(), before);

        game.court_mut().set(6, 5, None);
        assert!(game.rotate());
        assert_eq!(game.current().rotation, Rotation::Right);
    }

    #[test]
    fn clearing_rows_speeds_up_gravity() {
        let config = GameConfig {
            speed: SpeedCurve {
                start: TickDuration::from_ticks(300),
                decrement_per_row: TickDuration::from_ticks(20),
                min: TickDuration::from_ticks(100),
            },
        };
        let mut game = GameEngine::new(config, ChaCha8Rng::seed_from_u64(11));
        assert_eq!(game.drop_interval().ticks(), 300);

        for y in 13..15 {
            for x in 0..Court::WIDTH {
                game.court_mut().set(x, y, Some(PieceKind::L));
            }
        }
        assert_eq!(game.remove_lines(), 2);
        assert_eq!(game.drop_interval().ticks(), 260);

        // The new interval governs the next drop.
        assert_eq!(game.tick(TickDuration::from_ticks(260)), None);
        assert_eq!(game.tick(TickDuration::from_ticks(1)), Some(DropOutcome::Fell));

        for _ in 0..6 {
            for y in 11..15 {
                for x in 0..Court::WIDTH {
                    game.court_mut().set(x, y, Some(PieceKind::L));
                }
            }
            game.remove_lines();
        }
        assert_eq!(game.rows(), 26);
        assert_eq!(game.drop_interval().ticks(), 100);

        game.reset();
        assert_eq!(game.drop_interval().ticks(), 300);
    }

    fn leftmost_column(piece: &ActivePiece) -> i32 {
        let mut min = i32::MAX;
        for_each_occupied_cell(piece.kind, 0, 0, piece.rotation, |x, _| min = min.min(x));
        min
    }

    #[test]
    fn line_clear_bonus_doubles() {
        assert_eq!(line_clear_score(0), 0);
        assert_eq!(line_clear_score(1), 100);
        assert_eq!(line_clear_score(2), 200);
        assert_eq!(line_clear_score(3), 400);
        assert_eq!(line_clear_score(4), 800);
    }

    #[test]
    fn tick_drops_only_after_interval_passes() {
        let mut game = engine(5);
        let y = game.current().y;
        assert_eq!(game.tick(TickDuration::from_ticks(300)), None);
        assert_eq!(game.current().y, y);
        assert_eq!(game.tick(TickDuration::from_ticks(1)), Some(DropOutcome::Fell));
        assert_eq!(game.current().y, y + 1);
        // Timer restarted.
        assert_eq!(game.tick(TickDuration::from_ticks(200)), None);
    }

    #[test]
    fn piece_falls_to_the_floor_and_locks() {
        let mut game = engine(6);
        let kind = game.current().kind;
        let mut falls = 0;
        let outcome = loop {
            match game.drop() {
                Some(DropOutcome::Fell) => falls += 1,
                other => break other,
            }
        };
        assert_eq!(outcome, Some(DropOutcome::Locked { rows: 0 }));
        assert!(falls > 0);
        assert_eq!(game.score(), LOCK_SCORE);
        assert_eq!(game.court().occupied_cells().count(), 4);
        assert!(game.court().occupied_cells().all(|(_, _, k)| k == kind));
        assert!(
            game.court()
                .occupied_cells()
                .any(|(_, y, _)| y == Court::HEIGHT - 1)
        );
    }

    #[test]
    fn forfeit_loses_and_stops_gravity() {
        let mut game = engine(7);
        assert!(game.apply(Action::Forfeit));
        assert!(game.is_lost() && !game.is_playing());
        assert_eq!(game.notification(), Some(GAME_OVER));
        assert_eq!(game.tick(TickDuration::from_ticks(10_000)), None);
        assert_eq!(game.drop(), None);
        assert!(!game.apply(Action::Forfeit));
    }
}
