use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use mission_core::api::{
    format_date, format_datetime, format_time, AgentStatus, AgentsView, CommentAuthor,
    DashboardView, Priority, Route, StatusFilter, TaskDetailView, TaskStatus, TasksView,
};

use super::app::{Alert, App, InputMode};
use super::page::Page;

pub fn draw(f: &mut Frame<'_>, app: &App) {
    let size = f.area();
    if app.show_splash {
        draw_splash(f, size);
        return;
    }

    let footer_height = if matches!(app.input_mode, InputMode::Instruction(_)) {
        3
    } else {
        2
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(footer_height),
        ])
        .split(size);

    draw_header(f, chunks[0], app);
    match &app.page {
        Page::Login => draw_login(f, chunks[1]),
        Page::Dashboard(m) => draw_dashboard(f, chunks[1], &m.view),
        Page::Agents(m) => draw_agents(f, chunks[1], &m.view),
        Page::Tasks(m) => draw_tasks(f, chunks[1], &m.view),
        Page::Detail(m) => draw_detail(f, chunks[1], &m.view),
    }
    draw_footer(f, chunks[2], app);

    if let InputMode::Confirm(request) = &app.input_mode {
        if let Some(prompt) = request.action().confirm_prompt() {
            draw_popup(f, size, "Confirm", prompt, "y: yes  n: no", Color::Yellow);
        }
    }
    if let Some(alert) = &app.alert {
        draw_alert(f, size, alert);
    }
}

fn draw_header(f: &mut Frame<'_>, area: Rect, app: &App) {
    let mut parts = vec![Span::styled(
        "Mission Control",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if app.route != Route::Login {
        for (key, label, route) in [
            ("1", "Dashboard", Route::Dashboard),
            ("2", "Agents", Route::Agents),
            ("3", "Tasks", Route::Tasks),
        ] {
            let style = if app.route == route {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            parts.push(Span::raw("  "));
            parts.push(Span::styled(format!("[{key}] {label}"), style));
        }
        if let Route::TaskDetail(id) = &app.route {
            parts.push(Span::raw("  "));
            parts.push(Span::styled(
                format!("Task {id}"),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        }
    }

    parts.push(Span::raw("  "));
    if app.page.is_loading() {
        parts.push(Span::styled("loading", Style::default().fg(Color::Yellow)));
    } else if let Some(err) = app.page.last_error() {
        parts.push(Span::styled(
            format!("stale ({})", truncate(err, 32)),
            Style::default().fg(Color::Red),
        ));
    } else if app.route != Route::Login {
        parts.push(Span::styled("live", Style::default().fg(Color::Green)));
    }

    let header =
        Paragraph::new(Line::from(parts)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn draw_login(f: &mut Frame<'_>, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Mission Control",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Agent fleet dashboard"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to sign in",
            Style::default().fg(Color::Cyan),
        )),
    ];
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Sign in"));
    f.render_widget(widget, centered_rect(50, 9, area));
}

fn draw_dashboard(f: &mut Frame<'_>, area: Rect, view: &DashboardView) {
    let agent_rows = view.agents().len().clamp(1, 6) as u16;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(agent_rows + 2), Constraint::Min(0)])
        .split(area);

    let agent_lines: Vec<Line> = if view.agents().is_empty() {
        vec![Line::from(Span::styled(
            "No agents",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        view.agents()
            .iter()
            .map(|a| {
                Line::from(vec![
                    Span::styled("● ", agent_status_style(a.status)),
                    Span::styled(
                        format!("{:<12}", a.name),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("{:<24}", a.role), Style::default().fg(Color::Gray)),
                    Span::styled(a.status.as_str(), agent_status_style(a.status)),
                ])
            })
            .collect()
    };
    f.render_widget(
        Paragraph::new(agent_lines).block(panel_block("Agents".to_string())),
        rows[0],
    );

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(rows[1]);

    let board_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(cols[0]);
    for (column, slot) in view.columns().iter().zip(board_cols.iter()) {
        let mut lines = Vec::new();
        for task in &column.tasks {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ", task.priority),
                    priority_style(task.priority),
                ),
                Span::raw(task.title.clone()),
            ]));
            let assignee = view.assignee_name(task).unwrap_or("unassigned");
            lines.push(Line::from(Span::styled(
                format!("  {assignee} · {}", task.comment_count_label()),
                Style::default().fg(Color::DarkGray),
            )));
        }
        let block = panel_block(column.header()).border_style(task_status_style(column.status));
        f.render_widget(
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: false }),
            *slot,
        );
    }

    let activity: Vec<Line> = if view.activities().is_empty() {
        vec![Line::from(Span::styled(
            "No activity yet",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        view.activities()
            .iter()
            .map(|a| {
                let who = mission_core::api::agent_display_name(view.agents(), &a.agent_id);
                Line::from(vec![
                    Span::styled(
                        format!("{} ", format_time(&a.timestamp)),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(format!("{who}: "), Style::default().fg(Color::Cyan)),
                    Span::raw(a.message.clone()),
                ])
            })
            .collect()
    };
    f.render_widget(
        Paragraph::new(activity)
            .block(panel_block("Activity".to_string()))
            .wrap(Wrap { trim: false }),
        cols[1],
    );
}

fn draw_agents(f: &mut Frame<'_>, area: Rect, view: &AgentsView) {
    let mut lines = Vec::new();
    if view.agents().is_empty() {
        lines.push(Line::from(Span::styled(
            "No agents",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (idx, agent) in view.agents().iter().enumerate() {
        let selected = idx == view.selected();
        let marker = if selected { "> " } else { "  " };
        let name_style = if selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(agent.name.clone(), name_style),
            Span::raw("  "),
            Span::styled(agent.status.as_str(), agent_status_style(agent.status)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("    {}", agent.role),
            Style::default().fg(Color::Gray),
        )));
        let task = match agent.current_task_id.as_deref() {
            Some(id) => format!("Working on {id}"),
            None => "No active task".to_string(),
        };
        lines.push(Line::from(Span::styled(
            format!("    {}  |  {task}", agent.heartbeat_label()),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
    }
    let offset = scroll_for(view.selected() * 4, area.height.saturating_sub(2));
    f.render_widget(
        Paragraph::new(lines)
            .block(panel_block(format!("Agents ({})", view.agents().len())))
            .scroll((offset, 0)),
        area,
    );
}

fn draw_tasks(f: &mut Frame<'_>, area: Rect, view: &TasksView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let mut bar = vec![filter_span(
        format!("all ({})", view.total()),
        view.filter() == StatusFilter::All,
    )];
    for status in TaskStatus::ALL {
        bar.push(Span::raw("  "));
        bar.push(filter_span(
            format!("{} ({})", status.label(), view.count(status)),
            view.filter() == StatusFilter::Only(status),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(bar)), rows[0]);

    let visible = view.visible();
    let mut lines = Vec::new();
    if visible.is_empty() {
        lines.push(Line::from(Span::styled(
            "No tasks found",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (idx, task) in visible.iter().enumerate() {
        let selected = idx == view.selected();
        let title_style = if selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::raw(if selected { "> " } else { "  " }),
            Span::styled(
                format!("{:<12}", task.status.label()),
                task_status_style(task.status),
            ),
            Span::styled(
                format!("{:<7}", task.priority.as_str()),
                priority_style(task.priority),
            ),
            Span::styled(task.title.clone(), title_style),
        ]));
        lines.push(Line::from(Span::styled(
            format!("    {}", truncate(&task.description, 100)),
            Style::default().fg(Color::Gray),
        )));
        let mut meta = format!(
            "    {} · {} · {}",
            view.assignee_name(task).unwrap_or("unassigned"),
            task.comment_count_label(),
            format_date(&task.created_at)
        );
        for tag in &task.tags {
            meta.push_str(&format!(" #{tag}"));
        }
        lines.push(Line::from(Span::styled(
            meta,
            Style::default().fg(Color::DarkGray),
        )));
    }
    let offset = scroll_for(view.selected() * 3, rows[1].height.saturating_sub(2));
    f.render_widget(
        Paragraph::new(lines)
            .block(panel_block(format!("Tasks [{}]", view.filter().label())))
            .scroll((offset, 0)),
        rows[1],
    );
}

fn draw_detail(f: &mut Frame<'_>, area: Rect, view: &TaskDetailView) {
    let Some(task) = view.task() else {
        let msg = if view.state().is_loading() {
            "Loading task..."
        } else {
            "Task not found"
        };
        f.render_widget(
            Paragraph::new(msg)
                .alignment(Alignment::Center)
                .block(panel_block("Task".to_string())),
            area,
        );
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(area);

    let assigned = match view.assigned_agent() {
        Some(agent) => format!("{} ({})", agent.name, agent.role),
        None => match task.assignee.as_deref() {
            Some(id) => id.to_string(),
            None => "Unassigned".to_string(),
        },
    };
    let mut info = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                format!("{} ", task.priority),
                priority_style(task.priority),
            ),
            Span::styled(task.status.label(), task_status_style(task.status)),
            Span::styled(
                format!("  id {}  created {}", task.id, format_datetime(&task.created_at)),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(format!("Assigned to: {assigned}")),
    ];
    if !task.tags.is_empty() {
        info.push(Line::from(Span::styled(
            format!("Tags: {}", task.tags.join(", ")),
            Style::default().fg(Color::Gray),
        )));
    }
    info.push(Line::from(""));
    info.push(Line::from(if task.description.is_empty() {
        "No description".to_string()
    } else {
        task.description.clone()
    }));
    f.render_widget(
        Paragraph::new(info)
            .block(panel_block("Task".to_string()))
            .wrap(Wrap { trim: false }),
        rows[0],
    );

    let mut comments = Vec::new();
    if task.comments.is_empty() {
        comments.push(Line::from(Span::styled(
            "No comments yet",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for comment in &task.comments {
        let (who, style) = match comment.author_kind(view.agents()) {
            CommentAuthor::Agent(agent) => (
                format!("{} [agent]", agent.name),
                Style::default().fg(Color::Cyan),
            ),
            CommentAuthor::Human(name) => {
                (format!("{name} [human]"), Style::default().fg(Color::Magenta))
            }
        };
        comments.push(Line::from(vec![
            Span::styled(who, style.add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  {}", format_datetime(&comment.timestamp)),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        comments.push(Line::from(format!("  {}", comment.text)));
    }
    // Newest comments sit at the bottom; keep them in view.
    let height = rows[1].height.saturating_sub(2) as usize;
    let offset = comments.len().saturating_sub(height) as u16;
    f.render_widget(
        Paragraph::new(comments)
            .block(panel_block(format!("Comments ({})", task.comments.len())))
            .scroll((offset, 0)),
        rows[1],
    );
}

fn draw_footer(f: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::TOP);
    let inner = block.inner(area);

    if let InputMode::Instruction(editor) = &app.input_mode {
        let status = if app.is_busy() {
            "sending..."
        } else {
            "Enter: send  Esc: cancel"
        };
        let lines = vec![
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan)),
                Span::raw(editor.text().to_string()),
            ]),
            Line::from(Span::styled(status, Style::default().fg(Color::Gray))),
        ];
        f.render_widget(Paragraph::new(lines).block(block), area);
        f.set_cursor_position((input_cursor_x(inner, editor.cursor_col()), inner.y));
        return;
    }

    let hint = footer_hint(app);
    let line = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Cyan)),
        Span::styled(hint, Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(Paragraph::new(line).block(block), area);
}

pub(crate) fn footer_hint(app: &App) -> String {
    if app.is_busy() {
        return "working...".to_string();
    }
    let page = match &app.page {
        Page::Login => return "Enter: sign in  q: quit".to_string(),
        Page::Dashboard(_) => "",
        Page::Agents(_) => "j/k:select  Enter:open task  ",
        Page::Tasks(_) => "j/k:select  f:filter  Enter:open  ",
        Page::Detail(m) => {
            if m.view.task().is_some_and(|t| t.assignee.is_some()) {
                "i:instruct  s:stop agent  x:delete  Esc:back  "
            } else {
                "i:instruct  x:delete  Esc:back  "
            }
        }
    };
    format!("{page}1/2/3:pages  r:refresh  L:logout  q:quit")
}

fn draw_alert(f: &mut Frame<'_>, area: Rect, alert: &Alert) {
    let color = if alert.is_error {
        Color::Red
    } else {
        Color::Green
    };
    draw_popup(
        f,
        area,
        &alert.title,
        &alert.message,
        "press any key",
        color,
    );
}

fn draw_popup(f: &mut Frame<'_>, area: Rect, title: &str, body: &str, hint: &str, color: Color) {
    let popup = centered_rect(60, 7, area);
    let lines = vec![
        Line::from(""),
        Line::from(body.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title.to_string()),
        );
    f.render_widget(Clear, popup);
    f.render_widget(widget, popup);
}

fn draw_splash(f: &mut Frame<'_>, area: Rect) {
    f.render_widget(Block::default().borders(Borders::ALL), area);
    let banner = [
        "  __  __ _         _              ",
        " |  \\/  (_)___ ___(_) ___  _ __  ",
        " | |\\/| | / __/ __| |/ _ \\| '_ \\ ",
        " | |  | | \\__ \\__ \\ | (_) | | | |",
        " |_|  |_|_|___/___/_|\\___/|_| |_|",
        "          Mission Control",
        "",
        "Connecting...",
    ];
    let lines: Vec<Line> = banner.into_iter().map(Line::from).collect();
    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let inner = Rect {
        y: area.y + top,
        height: area.height.saturating_sub(top),
        ..area
    };
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn panel_block(title: String) -> Block<'static> {
    Block::default().borders(Borders::ALL).title(title)
}

fn filter_span(text: String, active: bool) -> Span<'static> {
    if active {
        Span::styled(
            text,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(text, Style::default().fg(Color::Gray))
    }
}

fn agent_status_style(status: AgentStatus) -> Style {
    match status {
        AgentStatus::Active => Style::default().fg(Color::Green),
        AgentStatus::Idle => Style::default().fg(Color::Gray),
        AgentStatus::Blocked => Style::default().fg(Color::Red),
    }
}

fn task_status_style(status: TaskStatus) -> Style {
    match status {
        TaskStatus::Inbox => Style::default().fg(Color::Gray),
        TaskStatus::Assigned => Style::default().fg(Color::Blue),
        TaskStatus::InProgress => Style::default().fg(Color::Yellow),
        TaskStatus::Review => Style::default().fg(Color::Magenta),
        TaskStatus::Done => Style::default().fg(Color::Green),
    }
}

fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::DarkGray),
    }
}

/// Keep line `line` visible in a viewport `height` rows tall.
fn scroll_for(line: usize, height: u16) -> u16 {
    let height = height as usize;
    if height == 0 || line < height {
        return 0;
    }
    (line + 1 - height) as u16
}

/// Terminal column for the editor cursor, after the "> " prompt, kept on
/// the last cell of `inner` for long input.
fn input_cursor_x(inner: Rect, col: usize) -> u16 {
    let col = u16::try_from(col).unwrap_or(u16::MAX);
    inner
        .x
        .saturating_add(2)
        .saturating_add(col)
        .min(inner.right().saturating_sub(1))
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
