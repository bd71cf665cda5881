//! Streaming chat sessions.

mod common;

use std::sync::Arc;

use common::{text, ScriptedProvider};
use nodes::chat::CHAT_TEMPERATURE;
use nodes::ChatSession;
use pipeline::{ChatRole, LlmError};

#[tokio::test]
async fn history_carries_earlier_turns() {
    let provider = Arc::new(ScriptedProvider::texts(["Paris.", "About 2.1 million."]));
    let mut session = ChatSession::with_history(provider.clone(), "I am a large language model.");

    let mut streamed = String::new();
    let first = session
        .ask("Capital of France?", &mut |d| streamed.push_str(d))
        .await
        .unwrap();
    session.ask("Population?", &mut |_| {}).await.unwrap();

    assert_eq!(first, "Paris.");
    assert_eq!(streamed, "Paris.");
    assert_eq!(session.history().len(), 4);

    let second = &provider.requests()[1];
    assert_eq!(second.temperature, Some(CHAT_TEMPERATURE));
    let roles: Vec<ChatRole> = second.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        [ChatRole::System, ChatRole::User, ChatRole::Assistant, ChatRole::User]
    );
}

#[tokio::test]
async fn failed_turn_leaves_history_untouched() {
    let provider = Arc::new(ScriptedProvider::new([
        Ok(text("Hi.")),
        Err(LlmError::Http {
            status: 429,
            message: "slow down".into(),
        }),
    ]));
    let mut session = ChatSession::with_history(provider, "system");

    session.ask("Hello", &mut |_| {}).await.unwrap();
    let err = session.ask("Again", &mut |_| {}).await.unwrap_err();

    assert!(matches!(err, LlmError::Http { status: 429, .. }));
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn one_shot_sessions_forget_previous_turns() {
    let provider = Arc::new(ScriptedProvider::texts(["a", "b"]));
    let mut session = ChatSession::new(provider.clone(), "system");

    session.ask("first", &mut |_| {}).await.unwrap();
    session.ask("second", &mut |_| {}).await.unwrap();

    assert!(session.history().is_empty());
    assert_eq!(provider.requests()[1].messages.len(), 2);
}
