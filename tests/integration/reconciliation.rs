//! Rejected placements and out-of-order refreshes.
//!
//! The backend is made to fail placement updates, or its responses are
//! delivered in a different order than they were requested, and the board
//! must end up matching the server.

use kanban_board::api::BoardApi;
use kanban_board::config::{Config, PersistFailurePolicy};
use kanban_board::core::Placement;
use kanban_board::tea::{Command, Message, NotificationLevel};

use crate::fixtures::{done_x, row_before, titles, todo_x, Board};

fn error_text(board: &Board) -> String {
    let notification = board
        .model
        .notification
        .clone()
        .expect("expected a notification");
    assert_eq!(notification.level, NotificationLevel::Error);
    notification.message
}

/// Test: Rejected same-column move is rolled back
/// Given Todo [A, B, C] and a backend that rejects the next placement
/// When A is dropped before C
/// Then the board returns to [A, B, C] and reports the failure
#[tokio::test]
async fn test_rejected_move_rolls_back() {
    let mut board = Board::new(&["A", "B", "C"], &[]).await;
    board.api.fail_next_placements(1);

    board.drag_and_drop("A", todo_x(), row_before(2));
    assert_eq!(board.local_order(board.todo), titles(&["B", "A", "C"]));

    board.settle().await;

    assert_eq!(board.api.placement_calls(), 1);
    assert_eq!(board.local_order(board.todo), titles(&["A", "B", "C"]));
    assert_eq!(board.server_order(board.todo).await, titles(&["A", "B", "C"]));
    let message = error_text(&board);
    assert!(message.contains("'A'"), "{}", message);
    assert!(message.contains("moved back"), "{}", message);
}

/// Test: Rejected cross-column move goes back to its source column
#[tokio::test]
async fn test_rejected_cross_column_move_rolls_back() {
    let mut board = Board::new(&["A", "B", "C"], &["D", "E"]).await;
    board.api.fail_next_placements(1);

    board.drag_and_drop("E", todo_x(), row_before(1));
    board.settle().await;

    assert_eq!(board.local_order(board.todo), titles(&["A", "B", "C"]));
    assert_eq!(board.local_order(board.done), titles(&["D", "E"]));
    let positions: Vec<u32> = board
        .model
        .store
        .tasks_in_column(board.todo)
        .iter()
        .map(|t| t.position)
        .collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

/// Test: A later move still works after a rollback
#[tokio::test]
async fn test_retry_after_rollback_succeeds() {
    let mut board = Board::new(&["A", "B"], &["C"]).await;
    board.api.fail_next_placements(1);

    board.drag_and_drop("C", todo_x(), row_before(0));
    board.settle().await;
    assert_eq!(board.local_order(board.done), titles(&["C"]));

    board.drag_and_drop("C", todo_x(), row_before(0));
    board.settle().await;

    assert_eq!(board.api.placement_calls(), 2);
    assert_eq!(board.local_order(board.todo), titles(&["C", "A", "B"]));
    assert_eq!(board.server_order(board.todo).await, titles(&["C", "A", "B"]));
}

/// Test: Keep policy leaves the optimistic placement
/// Given on_persist_failure = keep
/// When a drop is rejected
/// Then the card stays where it was dropped until the next reload
#[tokio::test]
async fn test_keep_policy_leaves_optimistic_placement() {
    let config = Config {
        on_persist_failure: PersistFailurePolicy::Keep,
        ..Config::default()
    };
    let mut board = Board::with_options(&["A", "B"], &["C"], config, None).await;
    board.api.fail_next_placements(1);

    board.drag_and_drop("C", todo_x(), row_before(1));
    board.settle().await;

    assert_eq!(board.local_order(board.todo), titles(&["A", "C", "B"]));
    assert_eq!(board.server_order(board.done).await, titles(&["C"]));
    assert!(error_text(&board).contains("kept locally"));

    // The next full load brings back the server's truth.
    board.reload();
    board.settle().await;
    assert_eq!(board.local_order(board.todo), titles(&["A", "B"]));
    assert_eq!(board.local_order(board.done), titles(&["C"]));
}

/// Test: Refresh responses that arrive out of order
/// Given two task refreshes where the older one is delivered last
/// Then the older response is discarded
#[tokio::test]
async fn test_older_refresh_delivered_last_is_discarded() {
    let mut board = Board::new(&["A", "B", "C"], &[]).await;

    let first = board.model.engine.next_refresh_seq();
    board.run(Command::RefreshTasks { seq: first });
    let older = board.next_message().await.expect("first refresh");

    // Another client moves A to the end in between.
    let a = board.task_id("A");
    board
        .api
        .update_task_placement(a, Placement::new(board.todo, 3))
        .await
        .unwrap();

    let second = board.model.engine.next_refresh_seq();
    board.run(Command::RefreshTasks { seq: second });
    let newer = board.next_message().await.expect("second refresh");

    board.send(newer);
    board.send(older);

    assert_eq!(board.model.engine.last_applied_refresh(), second);
    assert_eq!(board.local_order(board.todo), titles(&["B", "C", "A"]));
}

/// Test: A board load racing a task refresh
/// Then whichever was requested last wins, regardless of arrival order
#[tokio::test]
async fn test_snapshot_and_refresh_share_ordering() {
    let mut board = Board::new(&["A", "B"], &["C"]).await;

    let c = board.task_id("C");
    let load = board.model.engine.next_refresh_seq();
    board
        .api
        .update_task_placement(c, Placement::new(board.todo, 0))
        .await
        .unwrap();
    let refresh = board.model.engine.next_refresh_seq();
    board.run(Command::RefreshTasks { seq: refresh });
    let refreshed = board.next_message().await.expect("refresh");

    // The load was requested before the refresh, so it is stale on arrival.
    board.api.update_task_placement(c, Placement::new(board.done, 0)).await.unwrap();
    let stale_load = Message::BoardLoaded {
        seq: load,
        snapshot: board.api.fetch_project_snapshot(board.project).await.unwrap(),
    };

    board.send(refreshed);
    board.send(stale_load);

    assert_eq!(board.local_order(board.todo), titles(&["C", "A", "B"]));
}

/// Test: A rejected drop after a refresh already moved the card
/// Given a refresh applied between the drop and its failure
/// When the failure arrives
/// Then the board reloads instead of rolling back over newer data
#[tokio::test]
async fn test_failure_after_refresh_reloads_instead_of_rolling_back() {
    let mut board = Board::new(&["A", "B"], &["C"]).await;
    board.api.fail_next_placements(1);

    board.drag_and_drop("C", todo_x(), row_before(0));
    let failure = board.next_message().await.expect("placement failure");
    assert!(matches!(failure, Message::PlacementFailed { .. }));

    // Server truth still has C in Done.
    let seq = board.model.engine.next_refresh_seq();
    board.run(Command::RefreshTasks { seq });
    let refreshed = board.next_message().await.expect("refresh");
    board.send(refreshed);
    assert_eq!(board.local_order(board.done), titles(&["C"]));

    board.send(failure);
    assert!(error_text(&board).contains("reloading"));
    board.settle().await;

    assert_eq!(board.local_order(board.todo), titles(&["A", "B"]));
    assert_eq!(board.local_order(board.done), titles(&["C"]));
}

/// Test: Cancelled drag sends nothing and changes nothing
#[tokio::test]
async fn test_escape_during_drag_cancels() {
    let mut board = Board::new(&["A"], &["B"]).await;

    let (x, y) = board.card_cell("A");
    board.press(x, y);
    board.drag_to(done_x(), 5);
    board.key(crossterm::event::KeyCode::Esc);
    board.release(done_x(), 5);
    board.settle().await;

    assert_eq!(board.api.placement_calls(), 0);
    assert_eq!(board.local_order(board.todo), titles(&["A"]));
    assert_eq!(board.local_order(board.done), titles(&["B"]));
}
