//! quadfall — a falling-block puzzle engine
//!
//! The simulation core lives in [`grid`], [`piece`], [`spawner`] and
//! [`game`]; the session is driven entirely through
//! [`Session::advance`](game::Session::advance), so hosts and tests control
//! time explicitly. [`animate`], [`input`] and [`ui`] are the terminal
//! host's collaborators and never feed back into the simulation.

pub mod animate;
pub mod game;
pub mod grid;
pub mod input;
pub mod piece;
pub mod settings;
pub mod spawner;
pub mod tetromino;
pub mod ui;

pub use game::{EventSink, GameEvent, InputSource, Intent, Session, SessionConfig, SessionState};
pub use grid::{CellState, Grid};
pub use piece::Piece;
pub use spawner::Spawner;
pub use tetromino::ShapeKind;
