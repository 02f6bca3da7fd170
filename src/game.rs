//! Session state machine and tick scheduling
//!
//! The session owns the grid, the active piece, score and speed state. It
//! has no internal timers: the host calls `advance(delta)` and the session
//! decides whether a gravity tick or a deferred row collapse is due. All
//! mutation happens inside `advance`, the intent path and the pointer path,
//! each of which runs to completion before returning.

use crate::grid::Grid;
use crate::piece::Piece;
use crate::spawner::Spawner;
use std::time::Duration;
use tracing::{debug, info};

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Playing,
    Paused,
    GameOver,
}

/// Decoded input intents the session consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    SoftDrop,
    /// Drops to the floor immediately; the landing itself still resolves on
    /// the next gravity tick
    HardDrop,
    Rotate,
}

/// Discrete notifications for the audio/render collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A piece locked without completing any row
    PieceLanded,
    /// Rows were detected full and marked; collapse follows half a tick later
    RowsCleared(usize),
    /// The session ended; carries the final score
    GameOver { score: u64 },
}

/// Observer for game events; the session raises signals, it plays nothing
pub trait EventSink {
    fn on_event(&mut self, event: GameEvent);
}

/// Abstract input feed drained once per `advance` call
pub trait InputSource {
    fn poll_intent(&mut self) -> Option<Intent>;
}

/// Tunable session parameters
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Square board surface in pixels
    pub board_px: u32,
    /// Cell size in pixels; grid dimensions are derived from the two
    pub cell_px: u32,
    /// Gravity interval at level 1
    pub start_interval: Duration,
    /// Multiplier applied to the interval on each level-up, in (0, 1)
    pub speed_factor: f64,
    /// Freezes per level before speeding up
    pub level_threshold: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            board_px: 480,
            cell_px: 30,
            start_interval: Duration::from_millis(500),
            speed_factor: 0.85,
            level_threshold: 16,
        }
    }
}

/// A scheduled row collapse, armed when rows are marked Clearing
#[derive(Debug, Clone)]
struct PendingCollapse {
    rows: Vec<usize>,
    remaining: Duration,
    /// Session generation the batch belongs to; stale batches are dropped
    generation: u64,
}

/// One game session
pub struct Session {
    grid: Grid,
    current: Option<Piece>,
    spawner: Spawner,
    config: SessionConfig,
    state: SessionState,
    score: u64,
    level: u32,
    fall_interval: Duration,
    fallen_in_level: u32,
    tick_accum: Duration,
    pending: Option<PendingCollapse>,
    generation: u64,
    offset_y: f32,
    events: Option<Box<dyn EventSink>>,
    input: Option<Box<dyn InputSource>>,
    game_over_cb: Option<Box<dyn FnMut(u64)>>,
}

impl Session {
    /// Create an idle session; `start` begins play
    pub fn new(config: SessionConfig) -> Result<Self, String> {
        Self::with_seed(config, rand::random())
    }

    /// Create a session with a fixed piece-sequence seed
    pub fn with_seed(config: SessionConfig, seed: u64) -> Result<Self, String> {
        if config.start_interval.is_zero() {
            return Err("start interval must be positive".to_string());
        }
        if !(config.speed_factor > 0.0 && config.speed_factor < 1.0) {
            return Err(format!(
                "speed factor must be in (0, 1), got {}",
                config.speed_factor
            ));
        }
        let grid = Grid::from_pixel_size(config.board_px, config.cell_px)?;
        let offset_y =
            (config.board_px as f32 - config.cell_px as f32 * grid.height() as f32) / 2.0;
        let fall_interval = config.start_interval;
        Ok(Self {
            grid,
            current: None,
            spawner: Spawner::with_seed(seed),
            config,
            state: SessionState::Idle,
            score: 0,
            level: 1,
            fall_interval,
            fallen_in_level: 0,
            tick_accum: Duration::ZERO,
            pending: None,
            generation: 0,
            offset_y,
            events: None,
            input: None,
            game_over_cb: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn fall_interval(&self) -> Duration {
        self.fall_interval
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn current_piece(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    /// Cell size in pixels, for the renderer and the pointer channel
    pub fn cell_px(&self) -> f32 {
        self.config.cell_px as f32
    }

    /// Vertical centring offset of the playfield on the board surface
    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    /// Register the event observer
    pub fn set_event_sink(&mut self, sink: Box<dyn EventSink>) {
        self.events = Some(sink);
    }

    /// Register the observer called exactly once with the final score
    pub fn on_game_over<F>(&mut self, callback: F)
    where
        F: FnMut(u64) + 'static,
    {
        self.game_over_cb = Some(Box::new(callback));
    }

    /// Attach the input feed polled during `advance`
    pub fn attach(&mut self, input: Box<dyn InputSource>) {
        self.input = Some(input);
    }

    /// Detach the input feed, returning it to the caller
    pub fn detach(&mut self) -> Option<Box<dyn InputSource>> {
        self.input.take()
    }

    /// Reset all state and begin playing
    pub fn start(&mut self) {
        self.grid.reset();
        self.score = 0;
        self.level = 1;
        self.fall_interval = self.config.start_interval;
        self.fallen_in_level = 0;
        self.tick_accum = Duration::ZERO;
        self.pending = None;
        self.generation += 1;
        self.current = Some(self.spawner.next(&mut self.grid));
        self.state = SessionState::Playing;
        info!(
            generation = self.generation,
            width = self.grid.width(),
            height = self.grid.height(),
            "session started"
        );
    }

    /// Suspend ticking and the collapse countdown; grid and score persist
    pub fn pause(&mut self) {
        if self.state == SessionState::Playing {
            self.state = SessionState::Paused;
            debug!("session paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state == SessionState::Paused {
            self.state = SessionState::Playing;
            debug!("session resumed");
        }
    }

    /// Single authoritative step function: drains input, runs the deferred
    /// collapse countdown, then fires as many gravity ticks as `delta` covers
    pub fn advance(&mut self, delta: Duration) {
        if self.state != SessionState::Playing {
            return;
        }

        if let Some(mut source) = self.input.take() {
            while let Some(intent) = source.poll_intent() {
                self.apply_intent(intent);
            }
            self.input = Some(source);
        }

        self.run_pending_collapse(delta);

        self.tick_accum += delta;
        while self.tick_accum >= self.fall_interval && self.state == SessionState::Playing {
            self.tick_accum -= self.fall_interval;
            self.on_tick();
        }
    }

    /// Map an intent to the corresponding piece operation; returns whether
    /// any state changed
    pub fn apply_intent(&mut self, intent: Intent) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }
        let Some(piece) = self.current.as_mut() else {
            return false;
        };
        match intent {
            Intent::MoveLeft => piece.move_left(&mut self.grid),
            Intent::MoveRight => piece.move_right(&mut self.grid),
            Intent::SoftDrop => piece.move_down(&mut self.grid),
            Intent::HardDrop => {
                let mut moved = false;
                while piece.move_down(&mut self.grid) {
                    moved = true;
                }
                moved
            }
            Intent::Rotate => piece.rotate(&mut self.grid),
        }
    }

    /// Pointer quadrant mapping: left and right quarter strips move, the
    /// bottom strip soft-drops, the centre rotates
    pub fn on_pointer_down(&mut self, x: f32, y: f32) -> bool {
        let size = self.config.board_px as f32;
        let intent = if x > size * 0.75 {
            Intent::MoveRight
        } else if x < size * 0.25 {
            Intent::MoveLeft
        } else if y > size * 0.75 {
            Intent::SoftDrop
        } else {
            Intent::Rotate
        };
        self.apply_intent(intent)
    }

    /// Drag-to-move: steps the piece one column toward the pointer
    pub fn on_pointer_move(&mut self, x: f32, _y: f32) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }
        let Some(piece) = self.current.as_mut() else {
            return false;
        };
        let target = (x / self.config.cell_px as f32).floor() as i32 - piece.col_count() / 2;
        if target < piece.col {
            piece.move_left(&mut self.grid)
        } else if target > piece.col {
            piece.move_right(&mut self.grid)
        } else {
            false
        }
    }

    fn emit(&mut self, event: GameEvent) {
        if let Some(sink) = self.events.as_mut() {
            sink.on_event(event);
        }
    }

    fn run_pending_collapse(&mut self, delta: Duration) {
        let Some(mut pending) = self.pending.take() else {
            return;
        };
        if delta < pending.remaining {
            pending.remaining -= delta;
            self.pending = Some(pending);
            return;
        }
        if pending.generation != self.generation {
            debug!("discarding stale collapse batch");
            return;
        }
        self.grid.collapse_rows(&pending.rows);
        let gained = (pending.rows.len() * self.grid.width()) as u64;
        self.score += gained;
        debug!(
            rows = pending.rows.len(),
            gained,
            score = self.score,
            "rows collapsed"
        );
    }

    fn on_tick(&mut self) {
        let fell = match self.current.as_mut() {
            Some(piece) => !piece.move_down(&mut self.grid),
            None => return,
        };

        if fell {
            let full = self.grid.find_full_rows();
            if full.is_empty() {
                self.emit(GameEvent::PieceLanded);
            } else {
                self.grid.mark_rows_clearing(&full);
                debug!(rows = ?full, "rows marked clearing");
                self.emit(GameEvent::RowsCleared(full.len()));
                self.pending = Some(PendingCollapse {
                    rows: full,
                    remaining: self.fall_interval / 2,
                    generation: self.generation,
                });
            }

            if let Some(piece) = self.current.take() {
                piece.freeze(&mut self.grid);
            }
            self.fallen_in_level += 1;

            let mut next = self.spawner.next(&mut self.grid);
            let viable = next.move_down(&mut self.grid);
            self.current = Some(next);
            if !viable {
                self.game_over();
                return;
            }
        }

        if self.fallen_in_level > self.config.level_threshold {
            self.level += 1;
            self.fallen_in_level = 0;
            self.fall_interval = self.fall_interval.mul_f64(self.config.speed_factor);
            // The new cadence starts from a clean phase
            self.tick_accum = Duration::ZERO;
            info!(
                level = self.level,
                interval_ms = self.fall_interval.as_millis() as u64,
                "level up"
            );
        }
    }

    fn game_over(&mut self) {
        self.state = SessionState::GameOver;
        self.pending = None;
        let score = self.score;
        info!(score, "game over");
        self.emit(GameEvent::GameOver { score });
        if let Some(mut callback) = self.game_over_cb.take() {
            callback(score);
        }
    }
}
