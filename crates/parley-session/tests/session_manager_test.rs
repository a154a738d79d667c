use std::sync::Arc;
use std::time::Duration;

use parley_llm::testing::ScriptedClient;
use parley_llm::{ImageData, Message};
use parley_session::{ImageSource, ModelBinding, Persona, Priming, SessionManager};
use parley_types::{ConversationId, Modality, ParleyError};

fn manager(client: Arc<ScriptedClient>) -> SessionManager {
    SessionManager::new(ModelBinding::new(client.clone(), "text-model"))
        .with_vision(ModelBinding::new(client, "vision-model"))
}

fn png() -> ImageData {
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgb8(1, 1)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    ImageData::new("image/png", bytes)
}

#[tokio::test]
async fn test_send_appends_user_and_reply() {
    let client = Arc::new(ScriptedClient::new());
    let manager = manager(client.clone());
    let id = manager.create(Modality::Text, None).await.unwrap();

    let reply = manager.send(&id, "hello", None).await.unwrap();
    assert_eq!(reply, "reply to: hello");

    let history = manager.history(&id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role(), "user");
    assert_eq!(history[1].content().as_text(), Some("reply to: hello"));
}

#[tokio::test]
async fn test_history_is_sent_as_context() {
    let client = Arc::new(ScriptedClient::new());
    let manager = manager(client.clone());
    let id = manager.create(Modality::Text, None).await.unwrap();

    manager.send(&id, "one", None).await.unwrap();
    manager.send(&id, "two", None).await.unwrap();

    let requests = client.requests();
    assert_eq!(requests[1].model, "text-model");
    assert_eq!(requests[1].messages.len(), 3);
    assert_eq!(requests[1].messages[0].content().as_text(), Some("one"));
}

#[tokio::test]
async fn test_image_on_text_session_is_rejected_without_calling_model() {
    let client = Arc::new(ScriptedClient::new());
    let manager = manager(client.clone());
    let id = manager.create(Modality::Text, None).await.unwrap();

    let err = manager.send(&id, "what is this", Some(png())).await.unwrap_err();
    assert!(matches!(err, ParleyError::Capability(_)));
    assert_eq!(client.call_count(), 0);
    assert!(manager.history(&id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_multimodal_session_uses_vision_binding() {
    let client = Arc::new(ScriptedClient::new());
    let manager = manager(client.clone());
    let id = manager.create(Modality::Multimodal, None).await.unwrap();

    manager.describe_image(&id, png(), None).await.unwrap();

    let request = &client.requests()[0];
    assert_eq!(request.model, "vision-model");
    assert_eq!(request.messages[0].content().image_count(), 1);
    assert_eq!(
        request.messages[0].content().text_lossy(),
        "Please analyze this image and describe what you see:"
    );
}

#[tokio::test]
async fn test_multimodal_requires_vision_binding() {
    let client = Arc::new(ScriptedClient::new());
    let manager = SessionManager::new(ModelBinding::new(client.clone(), "text-model"));

    let err = manager.create(Modality::Multimodal, None).await.unwrap_err();
    assert!(matches!(err, ParleyError::Capability(_)));
    assert!(manager.is_empty().await);
}

#[tokio::test]
async fn test_reset_clears_history_and_keeps_prepended_priming() {
    let client = Arc::new(ScriptedClient::new());
    let manager = manager(client.clone());
    let priming = Persona::topic_expert("astronomy", None).priming();
    let id = manager.create(Modality::Text, Some(priming)).await.unwrap();

    // Prepend mode never makes a setup call
    assert_eq!(client.call_count(), 0);

    manager.send(&id, "q1", None).await.unwrap();
    manager.send(&id, "q2", None).await.unwrap();
    manager.reset(&id).await.unwrap();

    assert!(manager.history(&id).await.unwrap().is_empty());

    manager.send(&id, "q3", None).await.unwrap();
    let last = client.requests().pop().unwrap();
    assert_eq!(last.messages.len(), 2);
    assert_eq!(last.messages[0].role(), "system");
    assert!(last.messages[0]
        .content()
        .text_lossy()
        .starts_with("I want you to act as an expert on astronomy."));
}

#[tokio::test]
async fn test_replay_priming_is_hidden_and_replayed_on_reset() {
    let client = Arc::new(ScriptedClient::new());
    let manager = manager(client.clone());
    let id = manager
        .create(Modality::Text, Some(Priming::replay("act as a pirate")))
        .await
        .unwrap();

    assert_eq!(client.prompts(), vec!["act as a pirate"]);
    assert!(manager.history(&id).await.unwrap().is_empty());

    manager.send(&id, "ahoy", None).await.unwrap();
    let request = client.requests().pop().unwrap();
    assert_eq!(request.messages.len(), 3);
    assert_eq!(request.messages[0].content().as_text(), Some("act as a pirate"));

    manager.reset(&id).await.unwrap();
    assert_eq!(client.prompts().last().map(String::as_str), Some("act as a pirate"));
    assert!(manager.history(&id).await.unwrap().is_empty());
    assert!(manager.info(&id).await.unwrap().primed);
}

#[tokio::test]
async fn test_failed_replay_priming_does_not_fail_create() {
    let client = Arc::new(ScriptedClient::new().fail_when("persona"));
    let manager = manager(client.clone());

    let id = manager
        .create(Modality::Text, Some(Priming::replay("persona setup")))
        .await
        .unwrap();
    assert!(!manager.info(&id).await.unwrap().primed);
}

#[tokio::test]
async fn test_model_failure_is_typed_and_leaves_history_untouched() {
    let client = Arc::new(ScriptedClient::new().fail_when("explode"));
    let manager = manager(client.clone());
    let id = manager.create(Modality::Text, None).await.unwrap();

    let err = manager.send(&id, "please explode", None).await.unwrap_err();
    assert!(matches!(err, ParleyError::ModelInvocation(_)));
    assert!(manager.history(&id).await.unwrap().is_empty());

    // The session survives the failure
    assert!(manager.send(&id, "fine", None).await.is_ok());
}

#[tokio::test]
async fn test_unknown_session() {
    let manager = manager(Arc::new(ScriptedClient::new()));
    let missing = ConversationId::new("nope");

    assert!(matches!(
        manager.send(&missing, "x", None).await,
        Err(ParleyError::SessionNotFound(_))
    ));
    assert!(matches!(
        manager.reset(&missing).await,
        Err(ParleyError::SessionNotFound(_))
    ));
    assert!(!manager.remove(&missing).await);
}

#[tokio::test]
async fn test_get_or_create_is_idempotent() {
    let client = Arc::new(ScriptedClient::new());
    let manager = manager(client);
    let id = ConversationId::default();

    manager.get_or_create(&id, Modality::Text).await.unwrap();
    manager.send(&id, "hi", None).await.unwrap();
    let info = manager.get_or_create(&id, Modality::Text).await.unwrap();

    assert_eq!(info.turns, 1);
    assert_eq!(manager.len().await, 1);
}

#[tokio::test]
async fn test_reset_modality_only_touches_that_modality() {
    let client = Arc::new(ScriptedClient::new());
    let manager = manager(client);
    let text = manager.create(Modality::Text, None).await.unwrap();
    let image = manager.create(Modality::Multimodal, None).await.unwrap();

    manager.send(&text, "a", None).await.unwrap();
    manager.send(&image, "b", None).await.unwrap();

    assert_eq!(manager.reset_modality(Modality::Text).await, 1);
    assert!(manager.history(&text).await.unwrap().is_empty());
    assert_eq!(manager.history(&image).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_concurrent_sends_to_one_session_are_serialized() {
    let client = Arc::new(ScriptedClient::new().with_delay(Duration::from_millis(20)));
    let manager = Arc::new(manager(client));
    let id = manager.create(Modality::Text, None).await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..5 {
        let manager = manager.clone();
        let id = id.clone();
        tasks.push(tokio::spawn(async move {
            manager.send(&id, &format!("msg {}", i), None).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let history = manager.history(&id).await.unwrap();
    assert_eq!(history.len(), 10);
    for pair in history.chunks(2) {
        let question = pair[0].content().text_lossy();
        let answer = pair[1].content().text_lossy();
        assert_eq!(answer, format!("reply to: {}", question));
    }
}

#[tokio::test]
async fn test_send_source_decodes_base64() {
    use base64::Engine;

    let client = Arc::new(ScriptedClient::new());
    let manager = manager(client.clone());
    let id = manager.create(Modality::Multimodal, None).await.unwrap();

    let uri = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&png().data)
    );
    manager
        .send_source(&id, "look", Some(ImageSource::base64(uri)))
        .await
        .unwrap();

    let history = manager.history(&id).await.unwrap();
    assert!(matches!(&history[0], Message::Human { content } if content.image_count() == 1));
}

#[tokio::test]
async fn test_ask_with_prompt_default_prefix() {
    let client = Arc::new(ScriptedClient::new());
    let manager = manager(client.clone());
    let id = manager.create(Modality::Text, None).await.unwrap();

    manager.ask_with_prompt(&id, None, "some text").await.unwrap();
    assert_eq!(
        client.prompts()[0],
        "Please analyze the following text and provide insights:\n\nsome text"
    );
}
