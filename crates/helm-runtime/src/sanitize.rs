//! Message sanitation.

use helm_core::messages::Message;

/// Drop messages that are blank after trimming and strip trailing
/// whitespace from the rest. Order is preserved.
pub fn sanitize(messages: &[Message]) -> Vec<Message> {
    messages
        .iter()
        .filter(|m| !m.content.trim().is_empty())
        .map(|m| Message::new(m.role, m.content.trim_end()))
        .collect()
}
