pub mod api;
pub mod board;
pub mod cache;

pub use api::{BoardApi, DirectApi};
pub use board::{interpret_drop, DropTarget, MoveIntent};
pub use cache::BoardState;
