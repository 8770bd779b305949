use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::collection::{ActionKind, BulkKind, PendingAction};
use crate::draft::TaskDraft;
use crate::row::{status_text, TaskRow};
use crate::task::Priority;

use super::app::{AppState, StatusKind};
use super::editor::{EditorFieldId, EditorKind, EditorState, FilterPicker};

const STATUS_WIDTH: usize = 6;
const PRIORITY_WIDTH: usize = 6;
const DUE_WIDTH: usize = 8;
const LABEL_WIDTH: usize = 12;
const HELP_KEY_WIDTH: usize = 14;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_DETAIL: Color = Color::Rgb(180, 156, 92);

pub fn render(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);
    let header = chunks[0];
    let main = chunks[1];
    let footer = chunks[2];

    render_header(frame, app, header);

    let creating = matches!(
        app.editor.as_ref().map(EditorState::kind),
        Some(EditorKind::NewTask)
    );
    if app.is_narrow() && creating {
        render_form(frame, app, main);
    } else if app.is_narrow() {
        render_list(frame, app, main);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)].as_ref())
            .split(main);
        render_list(frame, app, chunks[0]);
        render_form(frame, app, chunks[1]);
    }

    render_footer(frame, app, footer);

    if let Some(picker) = app.picker.as_ref() {
        render_filter_modal(frame, area, picker);
    }
    if let Some(pending) = app.confirm.as_ref() {
        render_confirm_modal(frame, area, pending);
    }
}

fn render_header(frame: &mut Frame, app: &AppState, area: Rect) {
    let state = app.page.state();
    let search_label = if app.search_active {
        format!("search: {}_", app.search_input)
    } else if state.search.trim().is_empty() {
        "search: -".to_string()
    } else {
        format!("search: {}", state.search.trim())
    };
    let status_label = match state.is_done {
        Some(is_done) => format!("status: {}", status_text(is_done)),
        None => "status: all".to_string(),
    };
    let priority_label = match state.priority {
        Some(priority) => format!("priority: {priority}"),
        None => "priority: all".to_string(),
    };

    let spans = vec![
        Span::styled(
            "Tasks",
            Style::default()
                .fg(COLOR_INFO)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ),
        Span::raw("  "),
        Span::styled(app.page_summary(), Style::default().fg(COLOR_MUTED)),
        Span::raw("  "),
        Span::styled(search_label, Style::default().fg(COLOR_INFO)),
        Span::raw("  "),
        Span::styled(status_label, Style::default().fg(COLOR_WARNING)),
        Span::raw("  "),
        Span::styled(priority_label, Style::default().fg(COLOR_ACCENT)),
    ];

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(COLOR_BG_MUTED)),
    );
    frame.render_widget(widget, area);
}

fn render_list(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let content_width = area.width.saturating_sub(2) as usize;
    let help_lines = if app.show_help {
        build_list_help_lines(content_width)
    } else {
        Vec::new()
    };
    let help_reserved = if help_lines.is_empty() {
        0
    } else {
        help_lines.len() + 1
    };

    if let Some(bar) = app.bulk_bar() {
        lines.push(Line::from(Span::styled(
            bar,
            Style::default()
                .fg(COLOR_WARNING)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    let rows = app.collection.rows();
    if rows.is_empty() {
        let message = if app.page.is_loading() {
            "Loading..."
        } else if app.page.has_active_filters() {
            "No tasks match your filter criteria."
        } else {
            "No tasks found."
        };
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(COLOR_MUTED),
        )));
    } else {
        let list_height = (area.height as usize)
            .saturating_sub(2)
            .saturating_sub(lines.len())
            .saturating_sub(help_reserved);
        let (start, end) = list_window(rows.len(), app.cursor, list_height);
        for (idx, row) in rows.iter().enumerate().take(end).skip(start) {
            let focused = app.cursor == Some(idx);
            let selected = app.collection.is_selected(row.id());
            lines.push(render_list_row(row, focused, selected, content_width));
            if let Some(editor) = row.editor() {
                let state = app
                    .editor
                    .as_ref()
                    .filter(|_| app.is_editing_row(row.id()));
                let indent = 4;
                let editor_width = content_width.saturating_sub(indent);
                for line in build_editor_lines(state, editor.draft(), editor_width) {
                    let mut spans = vec![Span::raw(" ".repeat(indent))];
                    spans.extend(line.spans);
                    lines.push(Line::from(spans));
                }
                if state.is_none() {
                    lines.push(Line::from(vec![
                        Span::raw(" ".repeat(indent)),
                        Span::styled(
                            "e edit  enter collapse",
                            Style::default().fg(COLOR_MUTED_DARK),
                        ),
                    ]));
                }
            }
        }
    }

    if !help_lines.is_empty() {
        lines.push(Line::from(""));
        lines.extend(help_lines);
    }

    let title = format!("Tasks ({})", app.page.total_count());
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_form(frame: &mut Frame, app: &AppState, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let state = app
        .editor
        .as_ref()
        .filter(|editor| editor.kind() == EditorKind::NewTask);
    let mut lines = build_editor_lines(state, app.form.draft(), content_width);
    if state.is_none() {
        lines.push(Line::from(""));
        let hint = if app.pending_create {
            "creating..."
        } else {
            "c start typing"
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    }
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("New Task")
                .border_style(Style::default().fg(COLOR_BORDER_DETAIL)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let hint = app.footer_hint();
    let hint_span = Span::styled(hint, Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let mut pager = Vec::new();
    pager.push(Span::styled(
        if app.page.has_previous() { "< prev" } else { "      " },
        Style::default().fg(COLOR_ACCENT),
    ));
    pager.push(Span::raw("   "));
    pager.push(Span::styled(
        app.page_summary(),
        Style::default().fg(COLOR_ACCENT),
    ));
    pager.push(Span::raw("   "));
    pager.push(Span::styled(
        if app.page.has_next() { "next >" } else { "      " },
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, Line::from(pager)])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}

fn render_filter_modal(frame: &mut Frame, area: Rect, picker: &FilterPicker) {
    let content_width = 26u16.min(area.width.saturating_sub(6));
    let height = (picker.len() as u16 + 4).min(area.height.saturating_sub(4));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, label) in picker.labels().enumerate() {
        let color = label
            .parse::<Priority>()
            .map(priority_color)
            .unwrap_or(COLOR_INFO);
        let mut span = Span::styled(
            label.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        );
        if idx == picker.selected_index() {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(span));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "enter apply  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(picker.title()))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_confirm_modal(frame: &mut Frame, area: Rect, pending: &PendingAction) {
    let content_width = area.width.saturating_sub(8).min(64);
    let height = 8u16.min(area.height.saturating_sub(6).max(7));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let destructive = !matches!(
        pending.kind(),
        ActionKind::Bulk(BulkKind::MarkDone)
    );
    let color = if destructive { COLOR_ERROR } else { COLOR_WARNING };
    let ids: Vec<String> = pending.ids().iter().map(ToString::to_string).collect();
    let id_width = (content_width as usize).saturating_sub(8);

    let lines = vec![
        Line::from(Span::styled(
            pending.prompt(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            label_span("IDs: "),
            Span::styled(truncate_text(&ids.join(", "), id_width), id_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "enter/y confirm  esc/n cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];

    let title = if destructive { "Delete" } else { "Mark Done" };
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn build_editor_lines(
    editor: Option<&EditorState>,
    draft: &TaskDraft,
    width: usize,
) -> Vec<Line<'static>> {
    if let Some(editor) = editor.filter(|editor| editor.confirming()) {
        return build_confirm_lines(editor, draft, width);
    }

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, field) in EditorFieldId::ALL.iter().enumerate() {
        let is_active = editor.is_some_and(|editor| idx == editor.active_index());
        let label = format!("{:<LABEL_WIDTH$}", field.label());
        let mut value = field.value(draft);
        let placeholder = value.trim().is_empty() && !is_active;
        if placeholder {
            value = if field.required() {
                "<required>".to_string()
            } else {
                "(optional)".to_string()
            };
        }
        let value_style = if placeholder {
            Style::default().fg(COLOR_MUTED)
        } else if *field == EditorFieldId::Priority {
            Style::default().fg(priority_color(draft.priority))
        } else {
            Style::default().fg(COLOR_TEXT)
        };
        let value_width = width.saturating_sub(LABEL_WIDTH + 2);
        let mut value = truncate_text(&value, value_width.saturating_sub(1));
        if is_active && *field != EditorFieldId::Priority {
            value.push('_');
        }
        let mut spans = vec![
            Span::styled(label, Style::default().fg(COLOR_TEXT)),
            Span::raw(" "),
            Span::styled(value, value_style),
        ];
        if is_active {
            for span in &mut spans {
                span.style = span.style.add_modifier(Modifier::REVERSED);
            }
        }
        lines.push(Line::from(spans));
    }

    if let Some(error) = editor.and_then(EditorState::error) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines
}

fn build_confirm_lines(editor: &EditorState, draft: &TaskDraft, width: usize) -> Vec<Line<'static>> {
    let heading = match editor.kind() {
        EditorKind::NewTask => "Create this task?",
        EditorKind::EditTask(_) => "Save changes?",
    };
    let mut lines: Vec<Line<'static>> = vec![
        Line::from(Span::styled(
            heading,
            Style::default()
                .fg(COLOR_WARNING)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            label_span("Title: "),
            Span::styled(
                truncate_text(draft.title.trim(), width.saturating_sub(8)),
                id_style(),
            ),
        ]),
        Line::from(vec![
            label_span("Priority: "),
            Span::styled(
                draft.priority.to_string(),
                Style::default().fg(priority_color(draft.priority)),
            ),
        ]),
    ];
    let due = if draft.due_date.trim().is_empty() {
        "(none)".to_string()
    } else {
        draft.due_date.trim().to_string()
    };
    lines.push(Line::from(vec![
        label_span("Due: "),
        Span::styled(due, Style::default().fg(COLOR_TEXT)),
    ]));
    let description = draft.description.replace('\n', " ");
    if description.trim().is_empty() {
        lines.push(Line::from(vec![
            label_span("Description: "),
            Span::styled("(none)".to_string(), Style::default().fg(COLOR_MUTED_DARK)),
        ]));
    } else {
        lines.push(Line::from(vec![
            label_span("Description: "),
            Span::styled(
                truncate_text(&description, width.saturating_sub(14)),
                Style::default().fg(COLOR_TEXT),
            ),
        ]));
    }

    if let Some(error) = editor.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "enter/y confirm  e back  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));
    lines
}

fn build_list_help_lines(width: usize) -> Vec<Line<'static>> {
    vec![
        help_header("More commands"),
        help_line("j/k or up/down", "move cursor", width),
        help_line("n/p or arrows", "next or previous page", width),
        help_line("z", "cycle page size", width),
        help_line("space", "select task", width),
        help_line("a/A", "select all / clear selection", width),
        help_line("X", "mark selected as done", width),
        help_line("D", "delete selected", width),
        help_line("enter", "expand or collapse task", width),
        help_line("e", "edit task", width),
        help_line("x", "toggle done", width),
        help_line("d", "delete task", width),
        help_line("c", "new task", width),
        help_line("/", "search", width),
        help_line("s", "status filter", width),
        help_line("P", "priority filter", width),
        help_line("r", "reload tasks", width),
        help_line("q/esc", "quit", width),
        help_line("?", "hide help", width),
    ]
}

fn help_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
    ))
}

fn help_line(keys: &str, desc: &str, width: usize) -> Line<'static> {
    let key_text = pad_text(keys, HELP_KEY_WIDTH.min(width));
    let desc_width = width.saturating_sub(HELP_KEY_WIDTH + 1);
    let desc_text = truncate_text(desc, desc_width);
    Line::from(vec![
        Span::styled(
            key_text,
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(desc_text, Style::default().fg(COLOR_MUTED)),
    ])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_list_row(row: &TaskRow, focused: bool, selected: bool, width: usize) -> Line<'static> {
    let summary = row.summary();
    let marker = if selected { "[x]" } else { "[ ]" };
    let status = pad_text(summary.status, STATUS_WIDTH);
    let priority = pad_text(summary.priority.as_str(), PRIORITY_WIDTH);
    let due = pad_text(&summary.due_label, DUE_WIDTH);
    let used = marker.len() + STATUS_WIDTH + PRIORITY_WIDTH + DUE_WIDTH + 5;
    let title = truncate_text(&summary.title, width.saturating_sub(used));

    let mut title_style = Style::default().fg(COLOR_TEXT);
    if summary.strikethrough {
        title_style = title_style
            .fg(COLOR_MUTED_DARK)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    let status_style = if summary.strikethrough {
        Style::default().fg(COLOR_SUCCESS).bg(COLOR_BG_MUTED)
    } else {
        Style::default().fg(COLOR_INFO).bg(COLOR_BG_MUTED)
    };
    let mut spans = vec![
        Span::styled(marker, Style::default().fg(COLOR_WARNING)),
        Span::raw(" "),
        Span::styled(status, status_style.add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(
            priority,
            Style::default()
                .fg(priority_color(summary.priority))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(due, Style::default().fg(COLOR_MUTED)),
        Span::raw(" "),
        Span::styled(title, title_style),
    ];

    if focused {
        for span in &mut spans {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }

    Line::from(spans)
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Rgb(255, 87, 87),
        Priority::Normal => COLOR_WARNING,
        Priority::Low => COLOR_ACCENT,
    }
}

fn pad_text(value: &str, width: usize) -> String {
    let mut text = value.to_string();
    if text.len() > width {
        text = truncate_text(&text, width);
    }
    format!("{text:width$}")
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

fn label_span(label: &str) -> Span<'static> {
    Span::styled(label.to_string(), Style::default().fg(COLOR_MUTED_DARK))
}

fn id_style() -> Style {
    Style::default()
        .fg(COLOR_MUTED)
        .add_modifier(Modifier::BOLD)
}
