//! Shared per-session status and the aggregate status view

mod board;
mod render;

pub use board::{SessionStatus, StatusBoard, StatusKey};
pub use render::{render_board, spawn_renderer};
