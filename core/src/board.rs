//! Task board helpers: status filters, column grouping and display formatting.

use chrono::{DateTime, Local, Utc};

use crate::model::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == status,
        }
    }

    /// all → inbox → … → done → all
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Only(TaskStatus::ALL[0]),
            StatusFilter::Only(status) => {
                let idx = TaskStatus::ALL
                    .iter()
                    .position(|s| *s == status)
                    .unwrap_or(0);
                match TaskStatus::ALL.get(idx + 1) {
                    Some(next) => StatusFilter::Only(*next),
                    None => StatusFilter::All,
                }
            }
        }
    }

    pub fn label(self) -> String {
        match self {
            StatusFilter::All => "all".to_string(),
            StatusFilter::Only(status) => status.label(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("all") {
            return Some(StatusFilter::All);
        }
        TaskStatus::parse(s).map(StatusFilter::Only)
    }
}

/// Tasks matching `filter`, in their original relative order.
pub fn filter_by_status(tasks: &[Task], filter: StatusFilter) -> Vec<&Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

pub fn count_with_status(tasks: &[Task], status: TaskStatus) -> usize {
    tasks.iter().filter(|t| t.status == status).count()
}

#[derive(Debug)]
pub struct BoardColumn<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

impl BoardColumn<'_> {
    /// Column header, e.g. `IN PROGRESS (3)`.
    pub fn header(&self) -> String {
        format!("{} ({})", self.status.label().to_uppercase(), self.tasks.len())
    }
}

/// One column per status in board order; each keeps the input order.
pub fn group_by_status(tasks: &[Task]) -> Vec<BoardColumn<'_>> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| BoardColumn {
            status,
            tasks: tasks.iter().filter(|t| t.status == status).collect(),
        })
        .collect()
}

pub fn format_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

pub fn format_datetime(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use pretty_assertions::assert_eq;

    fn task(id: &str, status: TaskStatus) -> Task {
        let ts = "2026-02-01T09:00:00Z".parse().unwrap();
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            description: String::new(),
            status,
            assignee: None,
            priority: Priority::Medium,
            created_at: ts,
            updated_at: ts,
            comments: vec![],
            tags: vec![],
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn filter_keeps_matching_subset_in_order() {
        let tasks = vec![
            task("a", TaskStatus::Review),
            task("b", TaskStatus::Inbox),
            task("c", TaskStatus::Review),
            task("d", TaskStatus::Done),
            task("e", TaskStatus::Review),
        ];
        let review = filter_by_status(&tasks, StatusFilter::Only(TaskStatus::Review));
        assert_eq!(ids(&review), vec!["a", "c", "e"]);
        assert_eq!(filter_by_status(&tasks, StatusFilter::All).len(), 5);
        assert!(filter_by_status(&tasks, StatusFilter::Only(TaskStatus::Assigned)).is_empty());
    }

    #[test]
    fn grouping_places_same_status_together_in_order() {
        let tasks = vec![
            task("first", TaskStatus::Done),
            task("middle", TaskStatus::Inbox),
            task("last", TaskStatus::Done),
        ];
        let columns = group_by_status(&tasks);
        let statuses: Vec<TaskStatus> = columns.iter().map(|c| c.status).collect();
        assert_eq!(statuses, TaskStatus::ALL.to_vec());

        let done = columns.iter().find(|c| c.status == TaskStatus::Done).unwrap();
        assert_eq!(ids(&done.tasks), vec!["first", "last"]);
        assert_eq!(done.header(), "DONE (2)");

        let inbox = &columns[0];
        assert_eq!(ids(&inbox.tasks), vec!["middle"]);
    }

    #[test]
    fn filter_cycles_through_statuses() {
        let mut f = StatusFilter::All;
        let mut seen = vec![];
        for _ in 0..6 {
            f = f.next();
            seen.push(f.label());
        }
        assert_eq!(
            seen,
            vec!["inbox", "assigned", "in progress", "review", "done", "all"]
        );
    }

    #[test]
    fn filter_parse() {
        assert_eq!(StatusFilter::parse("ALL"), Some(StatusFilter::All));
        assert_eq!(
            StatusFilter::parse("in_progress"),
            Some(StatusFilter::Only(TaskStatus::InProgress))
        );
        assert_eq!(StatusFilter::parse("blocked"), None);
    }

    #[test]
    fn counts_per_status() {
        let tasks = vec![task("a", TaskStatus::Inbox), task("b", TaskStatus::Inbox)];
        assert_eq!(count_with_status(&tasks, TaskStatus::Inbox), 2);
        assert_eq!(count_with_status(&tasks, TaskStatus::Done), 0);
    }
}
