//! Drag and drop round trips.
//!
//! Each test drags with the mouse, lets the placement update and the
//! follow-up refresh run against the in-memory backend, and checks that the
//! board and the server agree.

use std::time::Duration;

use kanban_board::config::Config;
use kanban_board::tea::Message;

use crate::fixtures::{done_x, row_before, titles, todo_x, Board};

/// Test: Cross-column drop lands between two cards
/// Given Todo [A, B, C] and Done [D]
/// When D is dropped just above B's midpoint
/// Then both the board and the server read [A, D, B, C]
#[tokio::test]
async fn test_cross_column_drop_round_trip() {
    let mut board = Board::new(&["A", "B", "C"], &["D"]).await;

    board.drag_and_drop("D", todo_x(), row_before(1));

    // Optimistic order is visible before the server answers
    assert_eq!(board.local_order(board.todo), titles(&["A", "D", "B", "C"]));
    assert!(board.local_order(board.done).is_empty());

    board.settle().await;

    assert_eq!(board.api.placement_calls(), 1);
    assert_eq!(board.server_order(board.todo).await, titles(&["A", "D", "B", "C"]));
    assert_eq!(board.local_order(board.todo), titles(&["A", "D", "B", "C"]));
    assert!(board.server_order(board.done).await.is_empty());
    assert!(board.model.notification.is_none());
}

/// Test: Moving a card down within its column
/// Given Todo [A, B, C]
/// When A is dropped just above C
/// Then the order is [B, A, C] everywhere
#[tokio::test]
async fn test_same_column_move_down() {
    let mut board = Board::new(&["A", "B", "C"], &[]).await;

    board.drag_and_drop("A", todo_x(), row_before(2));
    board.settle().await;

    assert_eq!(board.local_order(board.todo), titles(&["B", "A", "C"]));
    assert_eq!(board.server_order(board.todo).await, titles(&["B", "A", "C"]));
}

/// Test: Releasing below the last card appends
/// Given Todo [A, B, C]
/// When A is released in the empty area under the cards
/// Then A becomes the last card
#[tokio::test]
async fn test_drop_below_last_card_appends() {
    let mut board = Board::new(&["A", "B", "C"], &[]).await;

    board.drag_and_drop("A", todo_x(), 16);
    board.settle().await;

    assert_eq!(board.local_order(board.todo), titles(&["B", "C", "A"]));
    assert_eq!(board.server_order(board.todo).await, titles(&["B", "C", "A"]));
}

/// Test: Dropping into an empty column
#[tokio::test]
async fn test_drop_into_empty_column() {
    let mut board = Board::new(&["A", "B"], &[]).await;

    board.drag_and_drop("B", done_x(), 10);
    board.settle().await;

    assert_eq!(board.local_order(board.todo), titles(&["A"]));
    assert_eq!(board.local_order(board.done), titles(&["B"]));
    assert_eq!(board.server_order(board.done).await, titles(&["B"]));
    let stored = board.api.stored_task(board.task_id("B")).unwrap();
    assert_eq!(stored.position, 0);
}

/// Test: Dropping a card where it already is
/// Then no placement update reaches the server
#[tokio::test]
async fn test_drop_in_place_is_not_persisted() {
    let mut board = Board::new(&["A", "B", "C"], &[]).await;

    // B sits at index 1; releasing over its own card keeps it there.
    board.drag_and_drop("B", todo_x(), row_before(1));
    board.settle().await;

    assert_eq!(board.api.placement_calls(), 0);
    assert_eq!(board.local_order(board.todo), titles(&["A", "B", "C"]));
}

/// Test: Releasing outside every column cancels the drag
#[tokio::test]
async fn test_release_on_title_bar_cancels() {
    let mut board = Board::new(&["A", "B"], &["C"]).await;

    board.drag_and_drop("C", todo_x(), 0);
    board.settle().await;

    assert!(!board.model.engine.is_dragging());
    assert_eq!(board.api.placement_calls(), 0);
    assert_eq!(board.local_order(board.done), titles(&["C"]));
}

/// Test: Several moves in a row keep positions strictly increasing
#[tokio::test]
async fn test_consecutive_moves_keep_positions_contiguous() {
    let mut board = Board::new(&["A", "B", "C", "D"], &["E"]).await;

    board.drag_and_drop("D", todo_x(), row_before(0));
    board.settle().await;
    board.drag_and_drop("E", todo_x(), row_before(2));
    board.settle().await;
    board.drag_and_drop("A", done_x(), 10);
    board.settle().await;

    assert_eq!(board.local_order(board.todo), titles(&["D", "E", "B", "C"]));
    assert_eq!(board.server_order(board.todo).await, titles(&["D", "E", "B", "C"]));
    assert_eq!(board.server_order(board.done).await, titles(&["A"]));

    let positions: Vec<u32> = board
        .model
        .store
        .tasks_in_column(board.todo)
        .iter()
        .map(|t| t.position)
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", positions);
}

/// Test: The board shows the drop before a slow server confirms it
/// Given a backend that answers after 100ms
/// When a card is dropped
/// Then the store already holds the new order while the server still has the old one
#[tokio::test]
async fn test_drop_is_optimistic_with_slow_backend() {
    let mut board = Board::with_options(
        &["A", "B"],
        &["C"],
        Config::default(),
        Some(Duration::from_millis(100)),
    )
    .await;

    board.drag_and_drop("C", todo_x(), row_before(0));

    assert_eq!(board.local_order(board.todo), titles(&["C", "A", "B"]));
    let stored = board.api.stored_task(board.task_id("C")).unwrap();
    assert_eq!(stored.column_id, board.done);

    match board.next_message().await {
        Some(Message::PlacementPersisted(task)) => assert_eq!(task.column_id, board.todo),
        other => panic!("expected PlacementPersisted, got {:?}", other),
    }
}
