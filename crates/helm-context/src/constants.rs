//! Context constants.

/// Default recent-window and chunk size, in assistant messages.
pub const DEFAULT_COMPACTION_WINDOW: usize = 4;

/// Default summary cache capacity.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Instruction appended after a chunk when asking the model to summarize it.
pub const SUMMARIZATION_INSTRUCTION: &str = "\
Summarize the assistant messages above as a compact factual record. \
Do not add commentary or speculation. Use exactly this layout:

Actions performed:
- <one line per action>
Artifacts produced:
- <files, tables, identifiers or values created; \"none\" if nothing>
Commands executed:
- <commands, queries or tool calls with key arguments; \"none\" if nothing>";

/// Label of the past projection message.
pub const PAST_CONTEXT_LABEL: &str = "Past context (up to the last conversation turn)";

/// Label of the new projection message.
pub const NEW_CONTEXT_LABEL: &str = "New context (since the last conversation turn)";

/// Label of the last-output projection message.
pub const LAST_OUTPUT_LABEL: &str = "Last output";
