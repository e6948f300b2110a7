//! Chat assistant proxy.
//!
//! DESIGN
//! ======
//! Browsers never see the upstream API key: they post a message here and the
//! server forwards it to a Dify-compatible backend. Messages starting with a
//! prefix command are handled by [`command`]; system commands list the
//! backend's knowledge bases and documents, and every reply carries
//! follow-up options the client renders as buttons.

pub mod command;
pub mod dify;

use serde::{Deserialize, Serialize};

use command::{ChatCommand, LIST_DATASETS, LIST_DOCUMENTS, SYSTEM_PREFIX};

pub const HELP_TEXT: &str = "Please use one of the system commands:";
pub const UNSUPPORTED_TEXT: &str = "This mode is not available. Please try again.";
pub const PICK_DOCUMENT_TEXT: &str = "Pick the content you need:";
pub const EMPTY_LISTING_TEXT: &str = "Nothing found.";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("API request failed: {0}")]
    ApiRequest(String),
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },
    #[error("API response parse failed: {0}")]
    ApiParse(String),
}

// =============================================================================
// TYPES
// =============================================================================

/// A question forwarded to the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatQuery {
    pub text: String,
    /// Continues an earlier conversation when present.
    pub conversation_id: Option<String>,
    /// Stable end-user identifier required by the backend.
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatAnswer {
    pub text: String,
    pub conversation_id: Option<String>,
}

/// A knowledge base or a document inside one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KnowledgeItem {
    pub id: String,
    pub name: String,
}

/// What the client does when a reply option is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionAction {
    /// Send `content` as the next message.
    Send,
    /// Copy `content` to the input box.
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyOption {
    pub label: String,
    pub content: String,
    pub action: OptionAction,
}

/// Response body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub user: String,
    pub options: Vec<ReplyOption>,
}

/// Provider-neutral chat backend. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Ask the assistant a question.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] if the request fails or the response is malformed.
    async fn ask(&self, query: &ChatQuery) -> Result<ChatAnswer, ChatError>;

    /// List knowledge bases.
    ///
    /// # Errors
    ///
    /// See [`ChatBackend::ask`].
    async fn list_datasets(&self) -> Result<Vec<KnowledgeItem>, ChatError>;

    /// List documents of a knowledge base.
    ///
    /// # Errors
    ///
    /// See [`ChatBackend::ask`].
    async fn list_documents(&self, dataset_id: &str) -> Result<Vec<KnowledgeItem>, ChatError>;
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Answer one trimmed, non-empty message on behalf of `query.user`.
///
/// # Errors
///
/// Propagates backend failures; prefix commands that need no backend call
/// never fail.
pub async fn respond(backend: &dyn ChatBackend, query: ChatQuery) -> Result<ChatReply, ChatError> {
    match command::parse(&query.text) {
        ChatCommand::Ask(text) => {
            let answer = backend.ask(&query).await?;
            Ok(ChatReply {
                text: answer.text,
                conversation_id: answer.conversation_id,
                options: vec![option("Ask again", text, OptionAction::Send)],
                user: query.user,
            })
        }
        ChatCommand::ListDatasets => {
            let datasets = backend.list_datasets().await?;
            let options = datasets
                .into_iter()
                .map(|d| {
                    let content = format!("{SYSTEM_PREFIX} {LIST_DOCUMENTS} {}", d.id);
                    option(&d.name, &content, OptionAction::Send)
                })
                .collect();
            Ok(listing_reply(query, options))
        }
        ChatCommand::ListDocuments(dataset_id) => {
            let documents = backend.list_documents(dataset_id).await?;
            let options = documents
                .into_iter()
                .map(|d| option(&d.name, &d.id, OptionAction::Copy))
                .collect();
            Ok(listing_reply(query, options))
        }
        ChatCommand::SystemHelp => Ok(ChatReply {
            text: HELP_TEXT.to_owned(),
            conversation_id: query.conversation_id,
            user: query.user,
            options: vec![
                option("List knowledge bases", &format!("{SYSTEM_PREFIX} {LIST_DATASETS}"), OptionAction::Send),
                option("List documents", &format!("{SYSTEM_PREFIX} {LIST_DOCUMENTS}"), OptionAction::Copy),
            ],
        }),
        ChatCommand::Unsupported => Ok(ChatReply {
            text: UNSUPPORTED_TEXT.to_owned(),
            conversation_id: query.conversation_id,
            user: query.user,
            options: Vec::new(),
        }),
    }
}

fn listing_reply(query: ChatQuery, options: Vec<ReplyOption>) -> ChatReply {
    let text = if options.is_empty() { EMPTY_LISTING_TEXT } else { PICK_DOCUMENT_TEXT };
    ChatReply { text: text.to_owned(), conversation_id: query.conversation_id, user: query.user, options }
}

fn option(label: &str, content: &str, action: OptionAction) -> ReplyOption {
    ReplyOption { label: label.to_owned(), content: content.to_owned(), action }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
