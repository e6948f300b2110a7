use super::*;

use std::sync::Mutex;

/// Backend returning canned data and recording what it was asked.
#[derive(Default)]
struct MockBackend {
    asked: Mutex<Vec<ChatQuery>>,
    documents_for: Mutex<Vec<String>>,
    datasets: Vec<KnowledgeItem>,
    fail: bool,
}

#[async_trait::async_trait]
impl ChatBackend for MockBackend {
    async fn ask(&self, query: &ChatQuery) -> Result<ChatAnswer, ChatError> {
        if self.fail {
            return Err(ChatError::ApiResponse { status: 500, body: "boom".into() });
        }
        self.asked.lock().unwrap().push(query.clone());
        Ok(ChatAnswer { text: format!("echo: {}", query.text), conversation_id: Some("conv-1".into()) })
    }

    async fn list_datasets(&self) -> Result<Vec<KnowledgeItem>, ChatError> {
        Ok(self.datasets.clone())
    }

    async fn list_documents(&self, dataset_id: &str) -> Result<Vec<KnowledgeItem>, ChatError> {
        self.documents_for.lock().unwrap().push(dataset_id.to_owned());
        Ok(vec![item("doc-1", "Bylaws.pdf")])
    }
}

fn item(id: &str, name: &str) -> KnowledgeItem {
    KnowledgeItem { id: id.into(), name: name.into() }
}

fn query(text: &str) -> ChatQuery {
    ChatQuery { text: text.into(), conversation_id: None, user: "visitor-1".into() }
}

#[tokio::test]
async fn questions_are_forwarded_with_ask_again_option() {
    let backend = MockBackend::default();
    let reply = respond(&backend, query("When is the next meeting?")).await.unwrap();

    assert_eq!(reply.text, "echo: When is the next meeting?");
    assert_eq!(reply.conversation_id.as_deref(), Some("conv-1"));
    assert_eq!(reply.user, "visitor-1");
    assert_eq!(reply.options, vec![option("Ask again", "When is the next meeting?", OptionAction::Send)]);
    assert_eq!(backend.asked.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn conversation_id_is_passed_through() {
    let backend = MockBackend::default();
    let q = ChatQuery { conversation_id: Some("conv-9".into()), ..query("hi") };
    respond(&backend, q).await.unwrap();
    assert_eq!(backend.asked.lock().unwrap()[0].conversation_id.as_deref(), Some("conv-9"));
}

#[tokio::test]
async fn dataset_listing_links_to_document_listing() {
    let backend = MockBackend { datasets: vec![item("ds-1", "Handbook")], ..Default::default() };
    let reply = respond(&backend, query("@system knowledge_list")).await.unwrap();

    assert_eq!(reply.text, PICK_DOCUMENT_TEXT);
    assert_eq!(
        reply.options,
        vec![option("Handbook", "@system knowledge_document_list ds-1", OptionAction::Send)]
    );
    assert!(backend.asked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_listing_says_so() {
    let backend = MockBackend::default();
    let reply = respond(&backend, query("@system knowledge_list")).await.unwrap();
    assert_eq!(reply.text, EMPTY_LISTING_TEXT);
    assert!(reply.options.is_empty());
}

#[tokio::test]
async fn document_listing_offers_copyable_ids() {
    let backend = MockBackend::default();
    let reply = respond(&backend, query("@system knowledge_document_list ds-1")).await.unwrap();
    assert_eq!(reply.options, vec![option("Bylaws.pdf", "doc-1", OptionAction::Copy)]);
    assert_eq!(*backend.documents_for.lock().unwrap(), vec!["ds-1".to_owned()]);
}

#[tokio::test]
async fn unknown_system_command_returns_help() {
    let backend = MockBackend::default();
    let reply = respond(&backend, query("@system nope")).await.unwrap();
    assert_eq!(reply.text, HELP_TEXT);
    assert_eq!(reply.options.len(), 2);
    assert_eq!(reply.options[0].content, "@system knowledge_list");
}

#[tokio::test]
async fn reserved_modes_never_reach_the_backend() {
    let backend = MockBackend { fail: true, ..Default::default() };
    let reply = respond(&backend, query("@debug dump")).await.unwrap();
    assert_eq!(reply.text, UNSUPPORTED_TEXT);
    assert!(reply.options.is_empty());
}

#[tokio::test]
async fn backend_failure_propagates() {
    let backend = MockBackend { fail: true, ..Default::default() };
    let err = respond(&backend, query("hello")).await.unwrap_err();
    assert!(matches!(err, ChatError::ApiResponse { status: 500, .. }));
}

#[test]
fn reply_serializes_snake_case_actions() {
    let reply = ChatReply {
        text: "t".into(),
        conversation_id: None,
        user: "u".into(),
        options: vec![option("a", "b", OptionAction::Copy)],
    };
    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"text": "t", "user": "u", "options": [{"label": "a", "content": "b", "action": "copy"}]})
    );
}
