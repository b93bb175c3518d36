//! Daily task metrics consumed by the insight engine
//!
//! Metrics are computed outside this crate and handed in as an immutable
//! snapshot. `MetricsProvider` is the seam the host application implements;
//! it is treated as a pure function of owner + current time.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::insight::OwnerId;

/// Immutable aggregate of one owner's task counts as of a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMetrics {
    /// The day the counts were computed for
    pub date: NaiveDate,
    pub total_todos: u32,
    pub completed_count: u32,
    pub in_progress_count: u32,
    pub not_started_count: u32,
    pub cancelled_count: u32,
    pub overdue_count: u32,
    pub due_today_count: u32,
    /// Due within the next seven days
    pub upcoming_count: u32,
    /// Percentage of todos completed (0-100)
    pub completion_rate: f64,
    /// Count per priority label (sorted map for stable rendering)
    pub by_priority: BTreeMap<String, u32>,
    /// Count per status label (sorted map for stable rendering)
    pub by_status: BTreeMap<String, u32>,
}

impl TaskMetrics {
    /// Render the snapshot as the user message sent to a provider
    pub fn prompt_message(&self) -> String {
        let mut msg = String::new();
        msg.push_str(&format!(
            "Here are my todo metrics for today ({}):\n\n",
            self.date
        ));
        msg.push_str(&format!("Total todos: {}\n", self.total_todos));
        msg.push_str(&format!("Completed: {}\n", self.completed_count));
        msg.push_str(&format!("In Progress: {}\n", self.in_progress_count));
        msg.push_str(&format!("Not Started: {}\n", self.not_started_count));
        msg.push_str(&format!("Cancelled: {}\n", self.cancelled_count));
        msg.push_str(&format!("Overdue: {}\n", self.overdue_count));
        msg.push_str(&format!("Due Today: {}\n", self.due_today_count));
        msg.push_str(&format!(
            "Upcoming (next 7 days): {}\n",
            self.upcoming_count
        ));
        msg.push_str(&format!("Completion Rate: {}%\n\n", self.completion_rate));

        msg.push_str("By Priority:\n");
        for (priority, count) in &self.by_priority {
            msg.push_str(&format!("  - {}: {}\n", priority, count));
        }

        msg.push_str("\nBy Status:\n");
        for (status, count) in &self.by_status {
            msg.push_str(&format!("  - {}: {}\n", status, count));
        }

        msg
    }
}

/// Source of daily metrics snapshots
pub trait MetricsProvider: Send + Sync {
    /// Compute the current snapshot for an owner
    fn snapshot(&self, owner: &OwnerId) -> Result<TaskMetrics>;
}
