//! Terminal UI rendering for the board.
//!
//! - One bordered block per column, cards stacked top to bottom
//! - Selection uses the REVERSED modifier to adapt to the terminal theme
//! - The card being dragged stays in place dimmed; a floating proxy follows the mouse
//!
//! This module renders from RenderState (immutable snapshot) - it never
//! mutates application state. Geometry comes from [`BoardLayout`], the same
//! layout the update loop hit-tests against.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::layout::{to_screen_rect, BoardLayout, ColumnSlot};
use crate::render::{ColumnView, RenderState, TaskView};
use crate::tea::{InputKind, Mode, Notification, NotificationLevel};
use crate::util::truncate;

// Color tokens
const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;
const COLOR_BORDER: Color = Color::DarkGray;
const COLOR_BORDER_ACTIVE: Color = Color::White;
const COLOR_PROXY: Color = Color::Cyan;
const COLOR_LOADING: Color = Color::Yellow;

/// What the keymap legend should offer right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeymapContext {
    Board { has_task: bool },
    Dragging,
    TextInput,
    DeleteConfirm,
}

impl KeymapContext {
    fn from_render_state(state: &RenderState) -> Self {
        match state.mode {
            Mode::Input(InputKind::Confirm) => KeymapContext::DeleteConfirm,
            Mode::Input(_) => KeymapContext::TextInput,
            Mode::Board if state.proxy.is_some() => KeymapContext::Dragging,
            Mode::Board => {
                let has_task = state
                    .columns
                    .get(state.selected_column)
                    .is_some_and(|c| state.selected_task < c.tasks.len());
                KeymapContext::Board { has_task }
            }
        }
    }
}

/// A single keybinding entry for display.
struct Keybinding(&'static str, &'static str);

/// A group of related keybindings (separated by │).
struct KeybindingGroup(Vec<Keybinding>);

fn keybindings_for_context(ctx: KeymapContext) -> Vec<KeybindingGroup> {
    match ctx {
        KeymapContext::Board { has_task } => {
            let task_actions = if has_task {
                vec![
                    Keybinding("n", "new"),
                    Keybinding("e", "title"),
                    Keybinding("E", "description"),
                    Keybinding("a", "assign"),
                    Keybinding("d", "delete"),
                ]
            } else {
                vec![Keybinding("n", "new")]
            };
            vec![
                KeybindingGroup(vec![Keybinding("hjkl", "move"), Keybinding("drag", "reorder")]),
                KeybindingGroup(task_actions),
                KeybindingGroup(vec![
                    Keybinding("N", "column"),
                    Keybinding("R", "rename"),
                    Keybinding("H/L", "shift"),
                    Keybinding("D", "drop column"),
                ]),
                KeybindingGroup(vec![Keybinding("r", "reload"), Keybinding("q", "quit")]),
            ]
        }
        KeymapContext::Dragging => vec![KeybindingGroup(vec![
            Keybinding("release", "drop"),
            Keybinding("Esc", "cancel"),
        ])],
        KeymapContext::TextInput => vec![KeybindingGroup(vec![
            Keybinding("Enter", "submit"),
            Keybinding("Esc", "cancel"),
        ])],
        KeymapContext::DeleteConfirm => vec![KeybindingGroup(vec![
            Keybinding("y", "delete"),
            Keybinding("Esc", "cancel"),
        ])],
    }
}

/// Main render function - entry point for all UI drawing.
pub fn draw(frame: &mut Frame, state: &RenderState) {
    let layout = BoardLayout::compute(frame.area(), &state.layout_columns());

    render_title(frame, state, layout.title);

    if state.columns.is_empty() {
        let message = if state.loading {
            "Loading board..."
        } else {
            "No columns. Press 'N' to add one."
        };
        let line = Line::from(Span::styled(message, Style::default().fg(COLOR_TEXT_DIMMED)));
        frame.render_widget(Paragraph::new(line), layout.board);
    }

    for (index, (view, slot)) in state.columns.iter().zip(layout.columns.iter()).enumerate() {
        let selected = index == state.selected_column;
        render_column(frame, view, slot, selected.then_some(state.selected_task));
    }

    if let Some(ref proxy) = state.proxy {
        let area = to_screen_rect(proxy.rect, frame.area());
        render_proxy(frame, &proxy.title, area);
    }

    render_statusbar(frame, state, layout.status);

    // Notifications take over the status line, except while typing
    if let (Some(notification), Mode::Board) = (&state.notification, state.mode) {
        render_notification(frame, notification, layout.status);
    }
}

fn render_title(frame: &mut Frame, state: &RenderState, area: Rect) {
    let mut spans = vec![
        Span::styled(
            state.project_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", state.backend),
            Style::default().fg(COLOR_TEXT_MUTED),
        ),
    ];
    if state.loading {
        spans.push(Span::styled("  loading", Style::default().fg(COLOR_LOADING)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render one column block and the cards that fit inside it.
/// `selected_task` is set when this is the selected column.
fn render_column(
    frame: &mut Frame,
    view: &ColumnView,
    slot: &ColumnSlot,
    selected_task: Option<usize>,
) {
    let border_color = if selected_task.is_some() {
        COLOR_BORDER_ACTIVE
    } else {
        COLOR_BORDER
    };
    let title = format!(" {} ({}) ", view.name, view.tasks.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            truncate(&title, slot.area.width.saturating_sub(2) as usize),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(block, slot.area);

    for (index, card) in slot.cards.iter().enumerate() {
        if let Some(task) = view.tasks.get(index) {
            render_card(frame, task, card.area, selected_task == Some(index));
        }
    }

    if slot.hidden > 0 && slot.area.height > 1 {
        let more = Rect::new(
            slot.area.x + 1,
            slot.area.bottom() - 1,
            slot.area.width.saturating_sub(2),
            1,
        );
        let text = truncate(&format!(" +{} more ", slot.hidden), more.width as usize);
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(COLOR_TEXT_DIMMED))),
            more,
        );
    }
}

fn render_card(frame: &mut Frame, task: &TaskView, area: Rect, is_selected: bool) {
    let width = area.width.saturating_sub(2) as usize;
    let mut style = Style::default();
    if is_selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    if task.dragging {
        style = style.fg(COLOR_TEXT_MUTED);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if task.dragging {
            COLOR_TEXT_MUTED
        } else {
            COLOR_BORDER
        }));
    let line = Line::from(Span::styled(truncate(&task.title, width), style));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// The floating card under the pointer while dragging.
fn render_proxy(frame: &mut Frame, title: &str, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(COLOR_PROXY));
    let line = Line::from(Span::styled(
        truncate(title, area.width.saturating_sub(2) as usize),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Render the bottom line. Shows either:
/// - Input prompt (when in Input mode)
/// - "?" indicator only (when keymap is collapsed)
/// - "? │ <full keymap>" (when keymap is expanded via '?' toggle)
fn render_statusbar(frame: &mut Frame, state: &RenderState, area: Rect) {
    let line = match state.mode {
        Mode::Input(kind) => render_input_line(state, kind),
        Mode::Board => render_keymap_line(state),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_keymap_line(state: &RenderState) -> Line<'static> {
    let groups = keybindings_for_context(KeymapContext::from_render_state(state));

    let key_style = Style::default().fg(COLOR_TEXT_DIMMED);
    let desc_style = Style::default().fg(COLOR_TEXT_MUTED);
    let sep_style = Style::default().fg(COLOR_TEXT_MUTED);

    let help_style = if state.show_keymap {
        Style::default()
    } else {
        Style::default().fg(COLOR_TEXT_MUTED)
    };
    let mut spans: Vec<Span> = vec![Span::styled("?", help_style)];

    if state.show_keymap {
        for group in groups.iter().filter(|g| !g.0.is_empty()) {
            spans.push(Span::styled(" │ ", sep_style));
            for (key_idx, keybinding) in group.0.iter().enumerate() {
                if key_idx > 0 {
                    spans.push(Span::styled(" • ", sep_style));
                }
                spans.push(Span::styled(keybinding.0, key_style));
                spans.push(Span::styled(format!(" {}", keybinding.1), desc_style));
            }
        }
    }

    Line::from(spans)
}

/// Render input prompt for the bottom line (replaces keymap when in input mode).
fn render_input_line(state: &RenderState, kind: InputKind) -> Line<'static> {
    let hint_style = Style::default().fg(COLOR_TEXT_MUTED);
    let label_style = Style::default().fg(Color::Reset);
    let input_style = Style::default().fg(Color::White);
    let cursor_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::SLOW_BLINK);

    let mut spans: Vec<Span> = if matches!(kind, InputKind::Confirm) {
        vec![Span::styled("y • Esc  ", hint_style)]
    } else {
        vec![Span::styled("Enter • Esc  ", hint_style)]
    };

    if matches!(kind, InputKind::Confirm) {
        spans.push(Span::styled(kind.label().to_string(), label_style));
    } else {
        spans.push(Span::styled(format!("{}: ", kind.label()), label_style));
        spans.push(Span::styled(state.input_buffer.clone(), input_style));
        spans.push(Span::styled("_", cursor_style));
    }

    Line::from(spans)
}

/// Render notification on the bottom line.
/// - Error: Red text with "Error:" prefix and bold styling
/// - Info: Green text without prefix
fn render_notification(frame: &mut Frame, notification: &Notification, area: Rect) {
    if area.height == 0 {
        return;
    }
    frame.render_widget(Clear, area);

    let line = match notification.level {
        NotificationLevel::Error => Line::from(vec![
            Span::styled(
                "Error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                notification.message.clone(),
                Style::default().fg(Color::Red),
            ),
        ]),
        NotificationLevel::Info => Line::from(Span::styled(
            notification.message.clone(),
            Style::default().fg(Color::Green),
        )),
    };

    frame.render_widget(Paragraph::new(line), area);
}
