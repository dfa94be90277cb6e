//! Integration test suite for the kanban client.
//!
//! These tests drive the real update loop with mouse and key events and run
//! the resulting commands against the in-memory backend, so every step from
//! pointer press to server state is exercised together.
//!
//! # Test Categories
//!
//! - `reorder_flow`: Drag, drop, persist and refresh round trips
//! - `reconciliation`: Rejected placements and out-of-order refreshes
//! - `board_editing`: Task and column editing from the keyboard
//!
//! # CI Compatibility
//!
//! No server is needed; the backend is `MemoryBoardApi`.

mod fixtures;

mod board_editing;
mod reconciliation;
mod reorder_flow;
