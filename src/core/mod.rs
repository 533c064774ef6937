pub mod commands;
pub mod config;
pub mod state;

pub use state::ShellState;
