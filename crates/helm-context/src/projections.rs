//! Views over a session's state-entry log, and where they go in a request.
//!
//! | Projection  | Entries                                                       |
//! |-------------|---------------------------------------------------------------|
//! | past        | up to and including the last `conversation` entry (or all)    |
//! | new         | strictly after the last `conversation` entry (none if absent) |
//! | last output | the most recent entry's response only                         |
//!
//! Past and new exclude entries authored by the orchestrator itself. Each
//! projection is rendered as a single assistant message prefixed with
//! [`STATE_CONTEXT_MARKER`], which keeps it out of compaction.

use chrono::SecondsFormat;

use helm_core::constants::STATE_CONTEXT_MARKER;
use helm_core::messages::{Message, first_user_index, last_user_index};
use helm_core::state::StateEntry;

use crate::constants::{LAST_OUTPUT_LABEL, NEW_CONTEXT_LABEL, PAST_CONTEXT_LABEL};

/// The three projections of one state-entry log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Projections {
    past: Vec<StateEntry>,
    new: Vec<StateEntry>,
    last_output: Option<String>,
}

impl Projections {
    /// Derive projections from `entries` (oldest first).
    pub fn from_entries(entries: &[StateEntry], orchestrator_role: &str) -> Self {
        let keep = |e: &&StateEntry| !e.is_authored_by(orchestrator_role);
        let boundary = entries.iter().rposition(StateEntry::is_conversation);

        let (past, new): (Vec<StateEntry>, Vec<StateEntry>) = match boundary {
            Some(b) => (
                entries[..=b].iter().filter(keep).cloned().collect(),
                entries[b + 1..].iter().filter(keep).cloned().collect(),
            ),
            None => (entries.iter().filter(keep).cloned().collect(), Vec::new()),
        };

        Self {
            past,
            new,
            last_output: entries.last().map(|e| e.response.clone()),
        }
    }

    /// Entries in the past projection.
    pub fn past(&self) -> &[StateEntry] {
        &self.past
    }

    /// Entries in the new projection.
    pub fn new_entries(&self) -> &[StateEntry] {
        &self.new
    }

    /// Most recent response, if any.
    pub fn last_output(&self) -> Option<&str> {
        self.last_output.as_deref()
    }

    /// Whether every projection is empty.
    pub fn is_empty(&self) -> bool {
        self.past.is_empty() && self.new.is_empty() && self.last_output.is_none()
    }

    /// Past projection as a state-context message.
    pub fn past_message(&self) -> Option<Message> {
        render_entries(PAST_CONTEXT_LABEL, &self.past)
    }

    /// New projection as a state-context message.
    pub fn new_message(&self) -> Option<Message> {
        render_entries(NEW_CONTEXT_LABEL, &self.new)
    }

    /// Last-output projection as a state-context message.
    pub fn last_output_message(&self) -> Option<Message> {
        let body = self.last_output.as_deref()?.trim();
        if body.is_empty() {
            return None;
        }
        Some(state_message(LAST_OUTPUT_LABEL, body))
    }

    /// Decision and planner calls: last output before the first user message.
    pub fn insert_for_decision(&self, messages: &mut Vec<Message>) {
        if let Some(msg) = self.last_output_message() {
            insert_before_first_user(messages, msg);
        }
    }

    /// Evaluator calls: past before the user messages, new after them.
    pub fn insert_for_evaluation(&self, messages: &mut Vec<Message>) {
        if let Some(msg) = self.past_message() {
            insert_before_first_user(messages, msg);
        }
        if let Some(msg) = self.new_message() {
            match last_user_index(messages) {
                Some(i) => messages.insert(i + 1, msg),
                None => messages.push(msg),
            }
        }
    }

    /// Ordinary calls: past projection only.
    pub fn insert_for_passthrough(&self, messages: &mut Vec<Message>) {
        if let Some(msg) = self.past_message() {
            insert_before_first_user(messages, msg);
        }
    }
}

fn insert_before_first_user(messages: &mut Vec<Message>, msg: Message) {
    match first_user_index(messages) {
        Some(i) => messages.insert(i, msg),
        None => messages.push(msg),
    }
}

fn state_message(label: &str, body: &str) -> Message {
    Message::assistant(format!("{STATE_CONTEXT_MARKER} {label}\n\n{body}"))
}

fn render_entries(label: &str, entries: &[StateEntry]) -> Option<Message> {
    if entries.is_empty() {
        return None;
    }
    let body = entries
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n");
    Some(state_message(label, &body))
}

fn format_entry(entry: &StateEntry) -> String {
    let ts = entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
    let author = entry
        .agent_role
        .as_deref()
        .or(entry.role.as_deref())
        .unwrap_or("agent");
    match entry.task_description.as_deref() {
        Some(task) if !task.is_empty() => {
            format!("[{ts}] {author} (task: {task})\n{}", entry.response.trim_end())
        }
        _ => format!("[{ts}] {author}\n{}", entry.response.trim_end()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
