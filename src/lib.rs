//! Turn-based two-player naval combat: grid and fleet model, placement
//! validation, shot resolution, a hunt/target AI opponent, and the match
//! session plus lobby registry that pair two endpoints into a game.

mod board;
mod config;
mod error;
mod game;
mod grid;
mod lobby;
mod logging;
mod opponent;
mod protocol;
mod session;
mod ship;

pub use board::*;
pub use config::*;
pub use error::*;
pub use game::*;
pub use grid::*;
pub use lobby::*;
pub use logging::init_logging;
pub use opponent::*;
pub use protocol::*;
pub use session::*;
pub use ship::*;
