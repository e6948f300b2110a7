//! Prefix commands recognised in chat messages.
//!
//! The first space-separated word selects a mode. `@system` runs a
//! knowledge-base lookup, `@debug` and `@admin` are reserved, anything else
//! is a question for the assistant.

pub const SYSTEM_PREFIX: &str = "@system";
pub const RESERVED_PREFIXES: [&str; 2] = ["@debug", "@admin"];

pub const LIST_DATASETS: &str = "knowledge_list";
pub const LIST_DOCUMENTS: &str = "knowledge_document_list";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    /// Forward the whole message to the assistant.
    Ask(&'a str),
    /// List knowledge bases.
    ListDatasets,
    /// List documents of one knowledge base.
    ListDocuments(&'a str),
    /// Unknown or incomplete `@system` command.
    SystemHelp,
    /// A reserved mode that is not available.
    Unsupported,
}

/// Classify a trimmed, non-empty message.
#[must_use]
pub fn parse(message: &str) -> ChatCommand<'_> {
    let mut words = message.split_whitespace();
    let prefix = words.next().unwrap_or_default();

    if RESERVED_PREFIXES.contains(&prefix) {
        return ChatCommand::Unsupported;
    }
    if prefix != SYSTEM_PREFIX {
        return ChatCommand::Ask(message);
    }

    let action = words.next().map(str::to_ascii_lowercase);
    match action.as_deref() {
        Some(LIST_DATASETS) => ChatCommand::ListDatasets,
        Some(LIST_DOCUMENTS) => match words.next() {
            Some(id) if is_resource_id(id) => ChatCommand::ListDocuments(id),
            _ => ChatCommand::SystemHelp,
        },
        _ => ChatCommand::SystemHelp,
    }
}

/// Identifiers are interpolated into upstream paths; only plain ids pass.
fn is_resource_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
#[path = "command_test.rs"]
mod tests;
