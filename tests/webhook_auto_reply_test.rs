use anyhow::Result;
use bulk_dispatch::{AutoReplyClassifier, AutoResponder, SendOutcome, TomlConfig, WebhookPayload};
use httpmock::prelude::*;
use tokio_test::{assert_err, assert_ok};

/// 完整的 webhook → 自動回覆流程
/// 1. 解析平台送來的 payload
/// 2. 依關鍵字挑選回覆
/// 3. 以單一收件人批次送出
#[tokio::test]
async fn test_webhook_payload_triggers_auto_replies() -> Result<()> {
    let server = MockServer::start();

    let greeting = server.mock(|when, then| {
        when.method(POST)
            .path("/v22.0/829658253562571/messages")
            .body_contains("\"to\":\"15550001\"")
            .body_contains("Thanks for reaching out");
        then.status(200)
            .json_body(serde_json::json!({"messages": [{"id": "wamid.greeting"}]}));
    });

    let order = server.mock(|when, then| {
        when.method(POST)
            .path("/v22.0/829658253562571/messages")
            .body_contains("\"to\":\"15550002\"")
            .body_contains("order number");
        then.status(401).json_body(serde_json::json!({
            "error": {"message": "Error validating access token", "code": 190}
        }));
    });

    let config = TomlConfig::from_toml_str(&format!(
        r#"
[whatsapp]
api_base_url = "{}"
phone_number_id = "829658253562571"
access_token = "webhook-token"
"#,
        server.base_url()
    ))?;

    let payload = WebhookPayload::parse(
        r#"{
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"value": {"messages": [
                {"from": "15550001", "id": "wamid.in1", "type": "text", "text": {"body": "Hey!"}},
                {"from": "15550009", "id": "wamid.in2", "type": "sticker"}
            ]}}]},
            {"changes": [{"value": {"messages": [
                {"from": "15550002", "id": "wamid.in3", "type": "text", "text": {"body": "Where is my delivery?"}}
            ]}}]}]
        }"#,
    )?;

    let responder = AutoResponder::new(config.build_dispatcher()?, AutoReplyClassifier::default());
    let outcomes = responder.handle_payload(&payload).await;

    greeting.assert();
    order.assert();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].is_success());
    match &outcomes[1] {
        SendOutcome::Failure {
            recipient,
            error_detail,
        } => {
            assert_eq!(recipient.as_str(), "15550002");
            assert_eq!(
                error_detail,
                "WhatsApp API error: Error validating access token"
            );
        }
        other => panic!("expected failure, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_payload_without_object_is_rejected() {
    assert_err!(WebhookPayload::parse(r#"{"entry": []}"#));
    let payload = assert_ok!(WebhookPayload::parse(r#"{"object": "whatsapp_business_account"}"#));
    assert!(payload.inbound_texts().is_empty());
}
