pub mod cli;
pub mod color;
pub mod config;
pub mod date;
pub mod error;
pub mod export;
pub mod history;
pub mod palette;
pub mod pipeline;
pub mod preview;
pub mod session;
pub mod tui;
