//! Read-only listings: `agents`, `tasks`, `board`, `activity`.
use std::fmt::Write as _;

use crate::commands::cli::{ActivityArgs, OutputArgs, TasksArgs};
use crate::commands::print_json;
use crate::context::AppContext;
use mission_core::api as core_api;
use mission_core::api::{Activity, Agent, StatusFilter, Task, TaskStatus};

pub async fn handle_agents(args: OutputArgs, ctx: &AppContext) -> Result<(), core_api::CliError> {
    ctx.require_session()?;
    let agents = ctx.api.list_agents().await?;
    if args.json {
        return print_json(&agents);
    }
    print!("{}", render_agents(&agents));
    Ok(())
}

pub async fn handle_tasks(args: TasksArgs, ctx: &AppContext) -> Result<(), core_api::CliError> {
    ctx.require_session()?;
    let (tasks, agents) = futures::try_join!(ctx.api.list_tasks(), ctx.api.list_agents())?;
    if args.json {
        let visible = core_api::filter_by_status(&tasks, args.status);
        return print_json(&visible);
    }
    print!("{}", render_tasks(&tasks, &agents, args.status));
    Ok(())
}

pub async fn handle_board(args: OutputArgs, ctx: &AppContext) -> Result<(), core_api::CliError> {
    ctx.require_session()?;
    let (tasks, agents) = futures::try_join!(ctx.api.list_tasks(), ctx.api.list_agents())?;
    if args.json {
        let mut board = serde_json::Map::new();
        for column in core_api::group_by_status(&tasks) {
            board.insert(
                column.status.as_str().to_string(),
                serde_json::json!(column.tasks),
            );
        }
        return print_json(&board);
    }
    print!("{}", render_board(&tasks, &agents));
    Ok(())
}

pub async fn handle_activity(
    args: ActivityArgs,
    ctx: &AppContext,
) -> Result<(), core_api::CliError> {
    ctx.require_session()?;
    let limit = args.limit.unwrap_or(ctx.cfg.poll.activity_limit);
    let (activities, agents) = futures::try_join!(
        ctx.api.list_activities(limit),
        ctx.api.list_agents()
    )?;
    if args.json {
        return print_json(&activities);
    }
    print!("{}", render_activity(&activities, &agents));
    Ok(())
}

pub fn render_agents(agents: &[Agent]) -> String {
    if agents.is_empty() {
        return "No agents\n".to_string();
    }
    let mut out = String::new();
    for agent in agents {
        let task = match agent.current_task_id.as_deref() {
            Some(id) => format!("Working on {id}"),
            None => "No active task".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<12} {:<24} {:<8} {}  {}",
            agent.name,
            agent.role,
            agent.status.as_str(),
            agent.heartbeat_label(),
            task
        );
    }
    out
}

/// Filter bar with per-status counts, then one row per visible task.
pub fn render_tasks(tasks: &[Task], agents: &[Agent], filter: StatusFilter) -> String {
    let mut out = String::new();
    let mut bar = vec![format!("all ({})", tasks.len())];
    for status in TaskStatus::ALL {
        bar.push(format!(
            "{} ({})",
            status.label(),
            core_api::count_with_status(tasks, status)
        ));
    }
    let _ = writeln!(out, "Filter: {}  [{}]", filter.label(), bar.join("  "));

    let visible = core_api::filter_by_status(tasks, filter);
    if visible.is_empty() {
        out.push_str("No tasks found\n");
        return out;
    }
    for task in visible {
        let _ = writeln!(
            out,
            "[{}] {:<6} {}  ({})",
            task.status.label(),
            task.priority.as_str(),
            task.title,
            task.id
        );
        if !task.description.is_empty() {
            let _ = writeln!(out, "    {}", task.description);
        }
        let mut meta = vec![
            assignee_label(task, agents),
            task.comment_count_label(),
            core_api::format_date(&task.created_at),
        ];
        if !task.tags.is_empty() {
            meta.push(
                task.tags
                    .iter()
                    .map(|t| format!("#{t}"))
                    .collect::<Vec<_>>()
                    .join(" "),
            );
        }
        let _ = writeln!(out, "    {}", meta.join(" | "));
    }
    out
}

pub fn render_board(tasks: &[Task], agents: &[Agent]) -> String {
    let mut out = String::new();
    for column in core_api::group_by_status(tasks) {
        let _ = writeln!(out, "{}", column.header());
        if column.tasks.is_empty() {
            out.push_str("  (empty)\n");
        }
        for task in column.tasks {
            let _ = writeln!(
                out,
                "  - [{}] {} ({}, {})",
                task.priority,
                task.title,
                assignee_label(task, agents),
                task.comment_count_label()
            );
        }
    }
    out
}

pub fn render_activity(activities: &[Activity], agents: &[Agent]) -> String {
    if activities.is_empty() {
        return "No activity yet\n".to_string();
    }
    let mut out = String::new();
    for activity in activities {
        let _ = writeln!(
            out,
            "{}  {:<12} {}",
            core_api::format_time(&activity.timestamp),
            core_api::agent_display_name(agents, &activity.agent_id),
            activity.message
        );
    }
    out
}

pub(crate) fn assignee_label(task: &Task, agents: &[Agent]) -> String {
    match task.assignee.as_deref() {
        Some(id) => core_api::agent_display_name(agents, id).to_string(),
        None => "unassigned".to_string(),
    }
}
