use super::*;

#[test]
fn test_api_request_serialization() {
    let request = ApiRequest {
        model: "gpt-4o-mini".to_string(),
        messages: vec![ApiMessage::system("Be brief"), ApiMessage::user("Define XFN")],
        max_tokens: Some(150),
        temperature: Some(0.5),
    };

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["model"], "gpt-4o-mini");
    assert_eq!(json["max_tokens"], 150);
    assert_eq!(json["messages"][0]["role"], "system");
    assert_eq!(json["messages"][1]["content"], "Define XFN");
}

#[test]
fn test_api_request_skip_none_fields() {
    let request = ApiRequest {
        model: "gpt-4o-mini".to_string(),
        messages: vec![],
        max_tokens: None,
        temperature: None,
    };

    let json = serde_json::to_value(&request).unwrap();
    assert!(json.get("max_tokens").is_none());
    assert!(json.get("temperature").is_none());
}

#[test]
fn test_api_response_first_text() {
    let json = r#"{
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "  Team Execution Alignment.\n"}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }"#;
    let response: ApiResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.first_text(), Some("Team Execution Alignment."));
    assert_eq!(response.usage.unwrap().total_tokens, 15);
}

#[test]
fn test_api_response_no_choices() {
    let response: ApiResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
    assert!(response.first_text().is_none());
}

#[test]
fn test_api_response_blank_or_null_content() {
    let blank: ApiResponse =
        serde_json::from_str(r#"{"choices": [{"message": {"content": "   "}}]}"#).unwrap();
    assert!(blank.first_text().is_none());

    let null: ApiResponse =
        serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
    assert!(null.first_text().is_none());
}

#[test]
fn test_error_message_from_body() {
    let body = r#"{"error": {"message": "Invalid API key", "type": "invalid_request_error"}}"#;
    assert_eq!(error_message(body), "Invalid API key");
}

#[test]
fn test_error_message_plain_body() {
    assert_eq!(error_message("Internal Server Error"), "Internal Server Error");
}
