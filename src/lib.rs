pub mod config;
pub mod core;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod layout;
pub mod log;
pub mod util;

// Backend access
pub mod api;

// Decoupled game loop architecture
pub mod actors;
pub mod app;
pub mod render;
pub mod tea;
pub mod ui;

pub use error::{Error, Result};
