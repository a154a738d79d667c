use parley_llm::{Content, ContentPart, ImageData, Message};

#[test]
fn test_content_text_creation() {
    let content = Content::text("Hello, world!");
    assert_eq!(content.as_text(), Some("Hello, world!"));
    assert_eq!(content.image_count(), 0);
}

#[test]
fn test_content_from_string() {
    let content: Content = "Test".into();
    assert_eq!(content.as_text(), Some("Test"));
}

#[test]
fn test_content_with_image_is_not_plain_text() {
    let content = Content::with_image("Describe this", ImageData::new("image/png", vec![1]));
    assert_eq!(content.as_text(), None);
    assert_eq!(content.text_lossy(), "Describe this");
    assert_eq!(content.image_count(), 1);
}

#[test]
fn test_message_roles() {
    assert_eq!(Message::system("You are helpful").role(), "system");
    assert_eq!(Message::human("Hello").role(), "user");
    assert_eq!(Message::ai("Hi there!").role(), "assistant");
}

#[test]
fn test_message_serialization_human() {
    let msg = Message::human("Hello");
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"role\":\"user\""));
    assert!(json.contains("Hello"));
}

#[test]
fn test_message_deserialization() {
    let json = r#"{"role":"assistant","content":"Test"}"#;
    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg.role(), "assistant");
    assert_eq!(msg.content().as_text(), Some("Test"));
}

#[test]
fn test_image_part_serializes_bytes_as_base64() {
    let msg = Message::human(Content::with_image("look", ImageData::new("image/gif", b"GIF".to_vec())));
    let value = serde_json::to_value(&msg).unwrap();

    assert_eq!(value["content"][1]["type"], "image");
    assert_eq!(value["content"][1]["image"]["data"], "R0lG");

    let back: Message = serde_json::from_value(value).unwrap();
    match back.content() {
        Content::Parts(parts) => match &parts[1] {
            ContentPart::Image { image } => assert_eq!(image.data, b"GIF".to_vec()),
            other => panic!("unexpected part: {:?}", other),
        },
        other => panic!("unexpected content: {:?}", other),
    }
}

#[test]
fn test_image_data_uri() {
    let image = ImageData::new("image/png", vec![1, 2, 3]);
    assert_eq!(image.to_data_uri(), "data:image/png;base64,AQID");
    assert!(!format!("{:?}", image).contains("[1, 2, 3]"));
}
