//! Core game state and logic
//!
//! The engine is a frame-driven state machine. The host calls [`Engine::update`]
//! once per frame and the input layer calls the command methods between
//! frames. Within one update the order is always: spawn, gravity, lock,
//! line clear (scoring and leveling).

use crate::bag::Bag;
use crate::board::{Board, HIDDEN_ROWS};
use crate::feedback::{Message, SoundEffect};
use crate::highscore::{HighScore, HighScoreError, HighScores, MAX_HIGH_SCORES};
use crate::piece::Piece;
use crate::score::{SOFT_DROP_POINTS, Score};
use crate::snapshot::Snapshot;
use crate::tetromino::RotationDirection;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::cell::OnceCell;
use std::collections::VecDeque;
use tracing::{debug, info, trace};

/// Row-clear labels
const CLEAR_MESSAGE_DURATION: f32 = 1.0;
const CLEAR_MESSAGE_SPEED: f32 = 4.0;
/// "Level Up!" banner
const LEVEL_MESSAGE_DURATION: f32 = 1.5;
const LEVEL_MESSAGE_SPEED: f32 = 2.0;

/// Tunables for one engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub board_width: usize,
    pub board_height: usize,
    /// Seconds a grounded piece waits before locking
    pub lock_delay: f32,
    /// Lock delay after a hard drop
    pub drop_lock_delay: f32,
    /// Seconds full rows stay on screen before removal
    pub line_clear_delay: f32,
    pub rows_per_level: u32,
    /// Name put on high score records
    pub player_name: String,
    pub max_high_scores: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_width: crate::board::BOARD_WIDTH,
            board_height: crate::board::BOARD_HEIGHT,
            lock_delay: 0.5,
            drop_lock_delay: 0.1,
            line_clear_delay: 0.3,
            rows_per_level: crate::score::ROWS_PER_LEVEL,
            player_name: "Player".to_string(),
            max_high_scores: MAX_HIGH_SCORES,
        }
    }
}

/// Where the state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Waiting to bring in the next piece
    Spawning,
    Falling,
    /// Grounded, lock delay counting
    Locking,
    /// Full rows shown, clear delay counting
    LineClearing,
    GameOver,
}

/// The falling-block engine
#[derive(Debug)]
pub struct Engine<R = ChaCha8Rng> {
    config: EngineConfig,
    board: Board,
    bag: Bag<R>,
    current: Option<Piece>,
    next: Option<Piece>,
    hold: Option<Piece>,
    /// Landing spot of `current`, computed on demand
    ghost: OnceCell<Piece>,
    score: Score,
    high_scores: HighScores,
    messages: VecDeque<Message>,
    sound_effect: Option<SoundEffect>,
    /// Seconds since the last gravity step
    fall_timer: f32,
    /// Seconds spent in lock delay, and the delay that applies
    lock_timer: Option<f32>,
    lock_limit: f32,
    /// Seconds spent showing full rows
    clear_timer: Option<f32>,
    /// Lowest full row waiting to be removed
    clear_row: usize,
    /// A hard drop of the current piece is in flight
    dropped: bool,
    /// Command latches, released by the matching `done_*` call
    drop_latched: bool,
    rotated_left: bool,
    rotated_right: bool,
    /// Hold was used since the last lock
    hold_used: bool,
    game_over: bool,
    paused: bool,
}

impl Engine<ChaCha8Rng> {
    /// Create an engine whose piece sequence is fixed by `seed`
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    pub fn new(config: EngineConfig, rng: R) -> Self {
        Self {
            board: Board::new(config.board_width, config.board_height),
            bag: Bag::new(rng),
            current: None,
            next: None,
            hold: None,
            ghost: OnceCell::new(),
            score: Score::new(config.rows_per_level),
            high_scores: HighScores::new(),
            messages: VecDeque::new(),
            sound_effect: None,
            fall_timer: 0.0,
            lock_timer: None,
            lock_limit: config.lock_delay,
            clear_timer: None,
            clear_row: 0,
            dropped: false,
            drop_latched: false,
            rotated_left: false,
            rotated_right: false,
            hold_used: false,
            game_over: false,
            paused: false,
            config,
        }
    }

    /// Start a new game. High scores are kept
    pub fn reset(&mut self) {
        self.board = Board::new(self.config.board_width, self.config.board_height);
        self.bag.clear();
        self.current = None;
        self.next = None;
        self.hold = None;
        self.ghost.take();
        self.score = Score::new(self.config.rows_per_level);
        self.messages.clear();
        self.sound_effect = None;
        self.fall_timer = 0.0;
        self.lock_timer = None;
        self.lock_limit = self.config.lock_delay;
        self.clear_timer = None;
        self.clear_row = 0;
        self.dropped = false;
        self.drop_latched = false;
        self.rotated_left = false;
        self.rotated_right = false;
        self.hold_used = false;
        self.game_over = false;
        self.paused = false;
        debug!("engine reset");
    }

    /// Advance the game by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if self.game_over || self.paused {
            return;
        }

        if self.current.is_none() && self.clear_timer.is_none() && !self.spawn() {
            self.finish_game();
            return;
        }

        // Countdowns started during this update begin counting next update
        let locking = self.lock_timer.is_some();
        let clearing = self.clear_timer.is_some();

        self.apply_gravity(dt);

        if locking {
            self.advance_lock_delay(dt);
        }
        if clearing {
            self.advance_clear_delay(dt);
        }
    }

    fn apply_gravity(&mut self, dt: f32) {
        let interval = self.score.fall_interval();
        let Some(piece) = self.current.as_mut() else {
            return;
        };

        self.fall_timer += dt;
        if self.lock_timer.is_some() || !(self.dropped || self.fall_timer >= interval) {
            return;
        }
        self.fall_timer = 0.0;

        if piece.move_down(&self.board) {
            piece.points += SOFT_DROP_POINTS;
            self.ghost.take();
        } else {
            self.lock_limit = if self.dropped {
                self.config.drop_lock_delay
            } else {
                self.config.lock_delay
            };
            self.lock_timer = Some(0.0);
        }
    }

    fn advance_lock_delay(&mut self, dt: f32) {
        let Some(elapsed) = self.lock_timer else {
            return;
        };
        let elapsed = elapsed + dt;
        if elapsed >= self.lock_limit {
            self.lock_piece();
        } else {
            self.lock_timer = Some(elapsed);
        }
    }

    fn advance_clear_delay(&mut self, dt: f32) {
        let Some(elapsed) = self.clear_timer else {
            return;
        };
        let elapsed = elapsed + dt;
        if elapsed >= self.config.line_clear_delay {
            self.clear_timer = None;
            self.remove_rows();
        } else {
            self.clear_timer = Some(elapsed);
        }
    }

    /// Bring the next piece into play. Returns false if it is blocked
    fn spawn(&mut self) -> bool {
        let mut piece = match self.next.take() {
            Some(piece) => piece,
            None => Piece::new(self.bag.next()),
        };
        self.next = Some(Piece::new(self.bag.next()));
        self.fall_timer = 0.0;
        self.dropped = false;
        self.ghost.take();

        if !piece.move_to_start_position(&self.board) {
            return false;
        }
        trace!(kind = ?piece.kind(), x = piece.x, "spawned piece");
        self.current = Some(piece);
        true
    }

    /// Commit the current piece to the board
    fn lock_piece(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };
        self.ghost.take();
        self.lock_timer = None;
        self.fall_timer = 0.0;
        self.dropped = false;
        self.hold_used = false;

        self.score.add_drop_points(piece.points);
        let label = self.board.copy_piece(&piece);
        self.sound_effect = Some(SoundEffect::Collided);
        debug!(kind = ?piece.kind(), x = piece.x, y = piece.y, "locked piece");

        match label {
            Some(text) => {
                self.clear_row = self.board.full_rows().last().copied().unwrap_or(0);
                let row = self.screen_row(self.clear_row);
                self.messages.push_back(Message::new(
                    text,
                    row,
                    CLEAR_MESSAGE_DURATION,
                    CLEAR_MESSAGE_SPEED,
                ));
                self.clear_timer = Some(0.0);
            }
            None => self.score.lock_without_clear(),
        }
    }

    /// Remove the full rows and account for them
    fn remove_rows(&mut self) {
        let level = self.score.level;
        let removed = self.board.remove_full_rows(level, &mut self.score.points);
        if removed == 0 {
            return;
        }
        self.sound_effect = Some(SoundEffect::LineDeleted);

        let outcome = self.score.add_cleared_rows(removed);
        if outcome.back_to_back {
            let row = self.screen_row(self.clear_row) - 1;
            self.messages.push_back(Message::new(
                "Back-to-back!",
                row,
                CLEAR_MESSAGE_DURATION,
                CLEAR_MESSAGE_SPEED,
            ));
        }
        for _ in 0..outcome.levels_gained {
            let middle = (self.board.height() - HIDDEN_ROWS) as i32 / 2;
            self.messages.push_back(Message::new(
                "Level Up!",
                middle,
                LEVEL_MESSAGE_DURATION,
                LEVEL_MESSAGE_SPEED,
            ));
            self.sound_effect = Some(SoundEffect::LevelUp);
        }
        if outcome.levels_gained > 0 {
            info!(level = self.score.level, "level up");
        }
    }

    /// Spawn failed: freeze the board and record the score
    fn finish_game(&mut self) {
        self.game_over = true;
        self.current = None;
        self.ghost.take();
        self.lock_timer = None;

        let record = HighScore::new(
            self.config.player_name.clone(),
            self.score.points,
            self.score.lines,
            self.score.level,
        );
        let rank = self.high_scores.insert(record, self.config.max_high_scores);
        self.sound_effect = Some(SoundEffect::GameOver);
        info!(
            points = self.score.points,
            lines = self.score.lines,
            level = self.score.level,
            ?rank,
            "game over"
        );
    }

    fn screen_row(&self, row: usize) -> i32 {
        row as i32 - HIDDEN_ROWS as i32
    }

    fn accepts_commands(&self) -> bool {
        !self.game_over && !self.paused && !self.dropped && self.current.is_some()
    }

    /// Run a movement on the current piece, resetting delays on success
    fn try_move(&mut self, movement: impl FnOnce(&mut Piece, &Board) -> bool) -> bool {
        if !self.accepts_commands() {
            return false;
        }
        let Some(piece) = self.current.as_mut() else {
            return false;
        };
        if !movement(piece, &self.board) {
            return false;
        }
        self.after_move();
        true
    }

    /// Lock delay has no reset limit: every successful move restarts it
    fn after_move(&mut self) {
        self.ghost.take();
        if self.lock_timer.is_some() {
            let grounded = self
                .current
                .as_ref()
                .is_some_and(|piece| piece.is_grounded(&self.board));
            self.lock_timer = grounded.then_some(0.0);
        }
        if self.clear_timer.is_some() {
            self.clear_timer = Some(0.0);
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.try_move(|piece, board| piece.move_left(board))
    }

    pub fn move_right(&mut self) -> bool {
        self.try_move(|piece, board| piece.move_right(board))
    }

    /// Soft drop one row
    pub fn move_down(&mut self) -> bool {
        let moved = self.try_move(|piece, board| {
            let moved = piece.move_down(board);
            if moved {
                piece.points += SOFT_DROP_POINTS;
            }
            moved
        });
        if moved {
            self.fall_timer = 0.0;
        }
        moved
    }

    pub fn rotate_left(&mut self) -> bool {
        if self.rotated_left || !self.accepts_commands() {
            return false;
        }
        self.rotated_left = true;
        self.try_move(|piece, board| piece.rotate(RotationDirection::CounterClockwise, board))
    }

    pub fn rotate_right(&mut self) -> bool {
        if self.rotated_right || !self.accepts_commands() {
            return false;
        }
        self.rotated_right = true;
        self.try_move(|piece, board| piece.rotate(RotationDirection::Clockwise, board))
    }

    /// The rotate-left key was released
    pub fn done_rotated_left(&mut self) {
        self.rotated_left = false;
    }

    /// The rotate-right key was released
    pub fn done_rotated_right(&mut self) {
        self.rotated_right = false;
    }

    /// Hard drop. The piece locks after the short drop lock delay and no
    /// other command applies to it in the meantime
    pub fn drop(&mut self) -> bool {
        if self.drop_latched || !self.accepts_commands() {
            return false;
        }
        let Some(piece) = self.current.as_mut() else {
            return false;
        };
        let distance = piece.drop(&self.board);
        self.drop_latched = true;
        self.dropped = true;
        self.lock_timer = None;
        self.ghost.take();
        trace!(distance, "hard drop");
        true
    }

    /// The drop key was released
    pub fn done_dropped(&mut self) {
        self.drop_latched = false;
    }

    /// Swap the current piece with the hold slot, once per lock
    pub fn hold(&mut self) -> bool {
        if self.hold_used || !self.accepts_commands() {
            return false;
        }
        let Some(current) = self.current.take() else {
            return false;
        };

        let mut stored = current.clone();
        stored.rotate_to_start();
        stored.held = true;

        if let Some(mut incoming) = self.hold.take() {
            incoming.held = false;
            if !incoming.move_to_start_position(&self.board) {
                incoming.rotate_to_start();
                incoming.held = true;
                self.hold = Some(incoming);
                self.current = Some(current);
                return false;
            }
            self.current = Some(incoming);
        }
        // With an empty slot the next update spawns from the queue

        debug!(kind = ?stored.kind(), "held piece");
        self.hold = Some(stored);
        self.hold_used = true;
        self.lock_timer = None;
        self.fall_timer = 0.0;
        self.ghost.take();
        self.sound_effect = Some(SoundEffect::Hold);
        true
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Replace the high score table with a saved one
    pub fn set_high_scores(&mut self, bytes: &[u8]) -> Result<(), HighScoreError> {
        self.high_scores = HighScores::load(bytes)?;
        Ok(())
    }

    /// Encode the high score table for storage
    pub fn get_high_scores(&self) -> Vec<u8> {
        self.high_scores.save()
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Take the oldest pending message
    pub fn next_message(&mut self) -> Option<Message> {
        self.messages.pop_front()
    }

    /// The pending sound effect, if any
    pub fn sound_effect(&self) -> Option<SoundEffect> {
        self.sound_effect
    }

    pub fn clear_sound_effect(&mut self) {
        self.sound_effect = None;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    pub fn next(&self) -> Option<&Piece> {
        self.next.as_ref()
    }

    pub fn hold_piece(&self) -> Option<&Piece> {
        self.hold.as_ref()
    }

    /// Where the current piece would land
    pub fn ghost(&self) -> Option<&Piece> {
        let current = self.current.as_ref()?;
        Some(self.ghost.get_or_init(|| current.ghost(&self.board)))
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn points_text(&self) -> String {
        self.score.points.to_string()
    }

    pub fn level_text(&self) -> String {
        self.score.level.to_string()
    }

    pub fn lines_to_clear_text(&self) -> String {
        self.score.lines_to_clear().to_string()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn can_hold(&self) -> bool {
        !self.hold_used
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::GameOver
        } else if self.clear_timer.is_some() {
            Phase::LineClearing
        } else if self.current.is_none() {
            Phase::Spawning
        } else if self.lock_timer.is_some() {
            Phase::Locking
        } else {
            Phase::Falling
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read-only copy of everything a renderer needs
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}
