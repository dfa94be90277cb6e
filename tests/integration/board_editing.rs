//! Task and column editing from the keyboard.
//!
//! These tests type into the board the way a user would and check the
//! resulting server state after the commands complete.

use crossterm::event::KeyCode;

use kanban_board::api::BoardApi;
use kanban_board::tea::{Mode, NotificationLevel};

use kanban_board::core::UserId;

use crate::fixtures::{titles, user, Board};

fn column_names(board: &Board) -> Vec<String> {
    board
        .api
        .columns_of(board.project)
        .into_iter()
        .map(|c| c.name)
        .collect()
}

/// Test: Creating a task
/// Given the Todo column is selected and a user is logged in
/// When the user types a title after 'n', then a description
/// Then the task is appended on the server, assigned to that user, and selected
#[tokio::test]
async fn test_new_task_is_appended_and_selected() {
    let mut board = Board::new(&["A"], &[]).await;
    board.model.current_user = Some(user(5, "me@example.com"));

    board.key(KeyCode::Char('n'));
    assert!(matches!(board.model.mode, Mode::Input(_)));
    board.type_text("Write tests");
    board.key(KeyCode::Enter);
    board.type_text("Cover the drop rules");
    board.key(KeyCode::Enter);
    board.settle().await;

    assert_eq!(board.local_order(board.todo), titles(&["A", "Write tests"]));
    assert_eq!(board.server_order(board.todo).await, titles(&["A", "Write tests"]));
    let id = board.task_id("Write tests");
    assert_eq!(board.model.selected_task_id(), Some(id));

    let stored = board.api.stored_task(id).unwrap();
    assert_eq!(stored.description.as_deref(), Some("Cover the drop rules"));
    assert_eq!(stored.assigned_to, Some(UserId(5)));
}

/// Test: Blank titles are rejected before reaching the server
#[tokio::test]
async fn test_blank_task_title_is_rejected() {
    let mut board = Board::new(&["A"], &[]).await;

    board.key(KeyCode::Char('n'));
    board.type_text("   ");
    board.key(KeyCode::Enter);
    board.settle().await;

    assert_eq!(board.server_order(board.todo).await, titles(&["A"]));
    let notification = board.model.notification.clone().unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);
}

/// Test: Editing a task title
#[tokio::test]
async fn test_edit_task_title() {
    let mut board = Board::new(&["Draft"], &[]).await;

    board.key(KeyCode::Char('e'));
    assert_eq!(board.model.input_buffer, "Draft");
    for _ in 0.."Draft".len() {
        board.key(KeyCode::Backspace);
    }
    board.type_text("Final");
    board.key(KeyCode::Enter);
    board.settle().await;

    assert_eq!(board.local_order(board.todo), titles(&["Final"]));
    assert_eq!(board.server_order(board.todo).await, titles(&["Final"]));
}

/// Test: Editing a task's description and assignee
/// Given a project with two members
/// When the description is rewritten and the task is assigned by email
/// Then the server keeps both and the board shows the saved task
#[tokio::test]
async fn test_edit_description_and_assignee() {
    let mut board = Board::new(&["Draft"], &[]).await;
    board.api.seed_member(board.project, user(5, "me@example.com"));
    board.api.seed_member(board.project, user(6, "ann@example.com"));
    board.reload();
    board.settle().await;

    board.key(KeyCode::Char('E'));
    board.type_text("Needs a second pass");
    board.key(KeyCode::Enter);
    board.settle().await;

    board.key(KeyCode::Char('a'));
    board.type_text("ann@example.com");
    board.key(KeyCode::Enter);
    board.settle().await;

    let id = board.task_id("Draft");
    let stored = board.api.stored_task(id).unwrap();
    assert_eq!(stored.description.as_deref(), Some("Needs a second pass"));
    assert_eq!(stored.assigned_to, Some(UserId(6)));
    let local = board.model.store.task(id).unwrap();
    assert_eq!(local.assigned_to, Some(UserId(6)));
    assert_eq!(local.description.as_deref(), Some("Needs a second pass"));

    // Reassigning to someone outside the project changes nothing.
    board.key(KeyCode::Char('a'));
    assert_eq!(board.model.input_buffer, "ann@example.com");
    board.clear_input();
    board.type_text("stranger@example.com");
    board.key(KeyCode::Enter);
    board.settle().await;
    assert_eq!(board.api.stored_task(id).unwrap().assigned_to, Some(UserId(6)));
    let notification = board.model.notification.clone().unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);
}

/// Test: Deleting a task needs confirmation
#[tokio::test]
async fn test_delete_task_after_confirmation() {
    let mut board = Board::new(&["A", "B"], &[]).await;

    // Declined
    board.key(KeyCode::Char('d'));
    board.key(KeyCode::Char('n'));
    board.settle().await;
    assert_eq!(board.server_order(board.todo).await, titles(&["A", "B"]));

    // Accepted
    board.key(KeyCode::Char('d'));
    board.key(KeyCode::Char('y'));
    board.settle().await;
    assert_eq!(board.local_order(board.todo), titles(&["B"]));
    assert_eq!(board.server_order(board.todo).await, titles(&["B"]));
}

/// Test: Adding a column puts it last and selects it
#[tokio::test]
async fn test_new_column() {
    let mut board = Board::new(&[], &[]).await;

    board.key(KeyCode::Char('N'));
    board.type_text("Review");
    board.key(KeyCode::Enter);
    board.settle().await;

    assert_eq!(column_names(&board), titles(&["Todo", "Done", "Review"]));
    assert_eq!(board.model.selected_column, 2);
    assert_eq!(board.model.store.columns().len(), 3);
}

/// Test: Renaming a column
#[tokio::test]
async fn test_rename_column() {
    let mut board = Board::new(&["A"], &["B"]).await;

    board.key(KeyCode::Char('l'));
    board.key(KeyCode::Char('R'));
    board.clear_input();
    board.type_text("Shipped");
    board.key(KeyCode::Enter);
    board.settle().await;

    assert_eq!(column_names(&board), titles(&["Todo", "Shipped"]));
    assert_eq!(board.model.store.columns()[1].name, "Shipped");
    assert_eq!(board.local_order(board.done), titles(&["B"]));
}

/// Test: Moving a column right saves every column's position
#[tokio::test]
async fn test_shift_column_right() {
    let mut board = Board::new(&["A"], &["B"]).await;

    board.key(KeyCode::Char('L'));
    board.settle().await;

    assert_eq!(column_names(&board), titles(&["Done", "Todo"]));
    assert_eq!(board.model.selected_column, 1);

    // Tasks stay in their columns after the reorder
    board.reload();
    board.settle().await;
    assert_eq!(board.local_order(board.todo), titles(&["A"]));
    assert_eq!(board.model.store.columns()[0].name, "Done");
}

/// Test: Deleting a column removes its tasks too
#[tokio::test]
async fn test_delete_column_cascades() {
    let mut board = Board::new(&["A"], &["B", "C"]).await;

    board.key(KeyCode::Char('l'));
    board.key(KeyCode::Char('D'));
    board.key(KeyCode::Enter);
    board.settle().await;

    assert_eq!(column_names(&board), titles(&["Todo"]));
    assert!(board.model.store.tasks_in_column(board.done).is_empty());
    assert!(board.server_order(board.done).await.is_empty());
    assert_eq!(board.model.selected_column, 0);
}

/// Test: A failing edit reports the error and reloads the board
#[tokio::test]
async fn test_failed_delete_reloads() {
    let mut board = Board::new(&["A"], &[]).await;

    // Another client removes the task first.
    let a = board.task_id("A");
    board.api.delete_task(a).await.unwrap();

    board.key(KeyCode::Char('d'));
    board.key(KeyCode::Char('y'));
    board.settle().await;

    let notification = board.model.notification.clone().unwrap();
    assert!(notification.message.starts_with("Failed to delete task"));
    assert!(board.local_order(board.todo).is_empty());
    assert!(!board.model.loading);
}
