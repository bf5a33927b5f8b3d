//! `task show|comment|stop|delete`: the detail view's operations, one shot.
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use crate::commands::cli::TaskCommand;
use crate::commands::list::assignee_label;
use crate::commands::print_json;
use crate::context::AppContext;
use mission_core::api as core_api;
use mission_core::api::{Agent, ApiError, CommentAuthor, Task, TaskAction, ValidationError};

pub async fn handle_task(cmd: TaskCommand, ctx: &AppContext) -> Result<(), core_api::CliError> {
    ctx.require_session()?;
    match cmd {
        TaskCommand::Show { id, json } => handle_show(&id, json, ctx).await,
        TaskCommand::Comment { id, text } => {
            let outcome =
                core_api::add_instruction(ctx.api.as_ref(), &id, &ctx.cfg.operator.author, &text)
                    .await
                    .map_err(|e| action_error(TaskAction::AddInstruction, e))?;
            println!("{}", outcome.message());
            Ok(())
        }
        TaskCommand::Stop { id, yes } => {
            if !confirmed(TaskAction::StopAgent, yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            let outcome = core_api::stop_agent(ctx.api.as_ref(), &id)
                .await
                .map_err(|e| action_error(TaskAction::StopAgent, e))?;
            println!("{}", outcome.message());
            Ok(())
        }
        TaskCommand::Delete { id, yes } => {
            if !confirmed(TaskAction::DeleteTask, yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            let outcome = core_api::delete_task(ctx.api.as_ref(), &id)
                .await
                .map_err(|e| action_error(TaskAction::DeleteTask, e))?;
            println!("{}", outcome.message());
            Ok(())
        }
    }
}

async fn handle_show(id: &str, json: bool, ctx: &AppContext) -> Result<(), core_api::CliError> {
    let (tasks, agents) = futures::try_join!(ctx.api.list_tasks(), ctx.api.list_agents())?;
    let task = tasks
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| ApiError::from(ValidationError::TaskNotFound(id.to_string())))?;
    if json {
        return print_json(task);
    }
    print!("{}", render_task(task, &agents));
    Ok(())
}

fn action_error(action: TaskAction, source: ApiError) -> core_api::CliError {
    // Validation failures keep their own category for the exit code.
    if source.is_validation() {
        return core_api::CliError::Api(source);
    }
    core_api::CliError::Action {
        context: action.failure_message(),
        source,
    }
}

fn confirmed(action: TaskAction, yes: bool) -> Result<bool, core_api::CliError> {
    match action.confirm_prompt() {
        Some(_) if yes => Ok(true),
        Some(prompt) => {
            let stdin = io::stdin();
            Ok(ask(prompt, &mut stdin.lock(), &mut io::stdout())?)
        }
        None => Ok(true),
    }
}

/// `[y/N]` prompt; anything but `y`/`yes` declines.
pub fn ask(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

pub fn render_task(task: &Task, agents: &[Agent]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", task.title);
    let _ = writeln!(
        out,
        "[{}] [{}] id {}  created {}",
        task.priority,
        task.status.label(),
        task.id,
        core_api::format_datetime(&task.created_at)
    );
    let _ = writeln!(out, "Assigned to: {}", assignee_label(task, agents));
    if !task.tags.is_empty() {
        let _ = writeln!(out, "Tags: {}", task.tags.join(", "));
    }
    out.push('\n');
    if task.description.is_empty() {
        out.push_str("No description\n");
    } else {
        let _ = writeln!(out, "{}", task.description);
    }
    out.push('\n');
    let _ = writeln!(out, "Comments ({})", task.comments.len());
    for comment in &task.comments {
        let who = match comment.author_kind(agents) {
            CommentAuthor::Agent(agent) => format!("{} (agent)", agent.name),
            CommentAuthor::Human(name) => format!("{name} (human)"),
        };
        let _ = writeln!(
            out,
            "  {}  {}: {}",
            core_api::format_datetime(&comment.timestamp),
            who,
            comment.text
        );
    }
    out
}
