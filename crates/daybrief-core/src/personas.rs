//! Persona catalog for summary generation
//!
//! A fixed, compiled-in set of audience templates. Each persona carries the
//! system prompt used to shape generated summaries; the rest of the crate
//! refers to a persona only by its code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Audience template applied to a generated summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Persona {
    /// High-level, outcome-focused, no task noise
    Executive,
    /// Structured, technical, standup-ready
    Developer,
    /// Learning-oriented, clarity-first
    Student,
    /// Low cognitive load, actionable
    FocusSupport,
    /// Flow-oriented, non-rigid
    Creative,
    /// Process, throughput, accountability
    Operations,
    /// Friendly but practical
    Personal,
    /// Collaborative and transparent
    Standup,
    /// Reflective but concrete
    WeeklyReview,
    /// For dashboards or notifications
    Minimal,
}

impl Persona {
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Executive => "EXECUTIVE",
            Persona::Developer => "DEVELOPER",
            Persona::Student => "STUDENT",
            Persona::FocusSupport => "FOCUS_SUPPORT",
            Persona::Creative => "CREATIVE",
            Persona::Operations => "OPERATIONS",
            Persona::Personal => "PERSONAL",
            Persona::Standup => "STANDUP",
            Persona::WeeklyReview => "WEEKLY_REVIEW",
            Persona::Minimal => "MINIMAL",
        }
    }

    /// All personas in catalog order
    pub fn all() -> &'static [Persona] {
        &[
            Persona::Executive,
            Persona::Developer,
            Persona::Student,
            Persona::FocusSupport,
            Persona::Creative,
            Persona::Operations,
            Persona::Personal,
            Persona::Standup,
            Persona::WeeklyReview,
            Persona::Minimal,
        ]
    }

    /// Human-readable name for pickers and reports
    pub fn display_name(&self) -> &'static str {
        match self {
            Persona::Executive => "Executive / Manager",
            Persona::Developer => "Software Engineer / Developer",
            Persona::Student => "Student",
            Persona::FocusSupport => "Focus Support",
            Persona::Creative => "Creative (Designer, Writer, Artist)",
            Persona::Operations => "Operations / Support / Logistics",
            Persona::Personal => "Personal Life / Home Tasks",
            Persona::Standup => "Team Standup (Shared)",
            Persona::WeeklyReview => "Weekly Review (Individual)",
            Persona::Minimal => "Ultra-Minimal",
        }
    }

    /// One-line description of the summary style
    pub fn description(&self) -> &'static str {
        match self {
            Persona::Executive => "High-level, outcome-focused, no task noise.",
            Persona::Developer => "Structured, technical, standup-ready.",
            Persona::Student => "Learning-oriented, clarity-first.",
            Persona::FocusSupport => "Low cognitive load, actionable.",
            Persona::Creative => "Flow-oriented, non-rigid.",
            Persona::Operations => "Process, throughput, accountability.",
            Persona::Personal => "Friendly but practical.",
            Persona::Standup => "Collaborative and transparent.",
            Persona::WeeklyReview => "Reflective but concrete.",
            Persona::Minimal => "For dashboards or notifications.",
        }
    }

    /// System prompt sent to the provider for this persona
    pub fn prompt(&self) -> &'static str {
        match self {
            Persona::Executive => {
                "Summarize today's todo list into a high-level progress update. \
                 Focus on outcomes, risks, and what still needs attention. \
                 Keep it concise and suitable for leadership review."
            }
            Persona::Developer => {
                "Convert my todo list into a daily engineering summary. \
                 Separate completed work, in-progress tasks, and carry-overs. \
                 Highlight blockers, decisions made, and next technical steps."
            }
            Persona::Student => {
                "Summarize my daily tasks with a focus on learning progress. \
                 Identify what was completed, what needs review, and what should \
                 be prioritized tomorrow. Keep the language simple and clear."
            }
            Persona::FocusSupport => {
                "Simplify my todo list into a clear and calm daily summary. \
                 Reduce it to the most important tasks only. \
                 Suggest the next single action to start tomorrow."
            }
            Persona::Creative => {
                "Summarize my daily tasks in a way that reflects creative progress. \
                 Highlight what was created, what is evolving, and what ideas \
                 should be revisited. Avoid rigid structure."
            }
            Persona::Operations => {
                "Turn my todo list into an operational daily report. \
                 Show completed tasks, pending items, and any delays or \
                 dependencies. Keep it factual and process-focused."
            }
            Persona::Personal => {
                "Summarize my personal todo list for the day. \
                 Highlight what got done, what can wait, and the top priorities \
                 for tomorrow. Keep it short and encouraging."
            }
            Persona::Standup => {
                "Create a standup-style summary from my todo list. \
                 Include what was completed, what I'm working on, and anything \
                 blocking progress. Keep it brief and team-friendly."
            }
            Persona::WeeklyReview => {
                "Review my todo list for the week and summarize progress. \
                 Identify patterns, recurring delays, and key accomplishments. \
                 Suggest one improvement for next week."
            }
            Persona::Minimal => {
                "Summarize my todo list in under 5 bullet points. \
                 Prioritize clarity and action over detail."
            }
        }
    }

    /// Catalog entry for this persona
    pub fn info(&self) -> PersonaInfo {
        PersonaInfo {
            code: self.as_str(),
            display_name: self.display_name(),
            description: self.description(),
        }
    }

    /// Full catalog listing in catalog order
    pub fn catalog() -> Vec<PersonaInfo> {
        Self::all().iter().map(|p| p.info()).collect()
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EXECUTIVE" => Ok(Persona::Executive),
            "DEVELOPER" => Ok(Persona::Developer),
            "STUDENT" => Ok(Persona::Student),
            "FOCUS_SUPPORT" => Ok(Persona::FocusSupport),
            "CREATIVE" => Ok(Persona::Creative),
            "OPERATIONS" => Ok(Persona::Operations),
            "PERSONAL" => Ok(Persona::Personal),
            "STANDUP" => Ok(Persona::Standup),
            "WEEKLY_REVIEW" => Ok(Persona::WeeklyReview),
            "MINIMAL" => Ok(Persona::Minimal),
            _ => Err(format!("Unknown persona: {}", s)),
        }
    }
}

/// Read-only catalog entry for persona pickers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaInfo {
    pub code: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
}
