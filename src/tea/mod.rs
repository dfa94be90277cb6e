//! The Elm Architecture (TEA) for the board TUI.
//!
//! - `Model`: board state, the reorder engine and UI state
//! - `Message`: inputs to the update function
//! - `Command`: side effects returned by the update function
//! - `update`: applies a message to the model

pub mod command;
pub mod message;
pub mod model;
pub mod update;

pub use command::Command;
pub use message::Message;
pub use model::{InputKind, Mode, Model, Notification, NotificationLevel, PendingDelete};
pub use update::update;
