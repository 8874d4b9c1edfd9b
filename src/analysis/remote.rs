//! Remote vision model analysis
//!
//! Sends the photo to a vision-capable chat model that answers with a flat
//! JSON object, then validates that answer. The response text is untrusted:
//! every deviation from the contract maps to a distinct [`AnalysisError`].

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::{
    encode_jpeg_base64, jpeg_data_url, AnalysisError, Analyzer, ChatCompletionRequest,
    ChatMessage, ContentPart, HttpTransport, ImageUrl, Transport,
};
use super::wire::ChatCompletionResponse;
use crate::config::RemoteConfig;
use crate::models::{NutrientProfile, UnifiedResult};

/// Confidence attached to every remote result; the model reports none
pub const REMOTE_RESULT_CONFIDENCE: f64 = 0.85;

/// Token budget for the model's answer
pub const MAX_TOKENS: u32 = 300;

/// Fixed low temperature to keep the JSON contract stable
pub const TEMPERATURE: f32 = 0.2;

/// Longest excerpt of a malformed payload kept in the error
pub const MALFORMED_EXCERPT_CHARS: usize = 200;

/// `food_name` value meaning "no food in the image"
const UNKNOWN_FOOD: &str = "unknown";

/// Image detail level; "low" keeps token cost down
const IMAGE_DETAIL: &str = "low";

pub const SYSTEM_PROMPT: &str = "You are a nutrition expert. Given a photo of a meal, identify the food \
and estimate its nutritional content for one typical serving. \
Respond ONLY with a JSON object, without markdown or code fences, using exactly this schema: \
{\"food_name\":\"...\",\"serving_size\":\"...\",\"calories\":0,\"protein\":0,\"carbs\":0,\"fat\":0,\"fiber\":0,\"sugar\":0} \
All numeric values must be JSON numbers, not strings. \
Calories are in kcal; protein, carbs, fat, fiber and sugar are in grams. \
If the image does not contain food, set food_name to \"unknown\" and every numeric value to 0.";

const USER_PROMPT: &str =
    "What food is in this photo? Identify it and estimate the nutritional content per serving.";

/// The flat object the model is instructed to return
#[derive(Debug, Deserialize)]
struct NutrientPayload {
    food_name: String,
    serving_size: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    fiber: f64,
    sugar: f64,
}

/// Analyzer backed by a remote vision model
pub struct RemoteAnalyzer<T: Transport> {
    transport: T,
    model: String,
}

impl RemoteAnalyzer<HttpTransport> {
    /// Build an HTTP-backed analyzer from configuration
    pub fn from_config(config: &RemoteConfig) -> Result<Self, AnalysisError> {
        let transport = HttpTransport::new(&config.endpoint, &config.api_key, config.timeout)?;
        info!(
            "Remote analysis enabled: endpoint={}, model={}",
            config.endpoint, config.model
        );
        Ok(Self::new(transport, &config.model))
    }
}

impl<T: Transport> RemoteAnalyzer<T> {
    pub fn new(transport: T, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the request for one photo
    pub fn build_request(&self, image: &[u8]) -> Result<ChatCompletionRequest, AnalysisError> {
        let encoded = encode_jpeg_base64(image)?;

        Ok(ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(vec![
                    ContentPart::Text {
                        text: USER_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: jpeg_data_url(&encoded),
                            detail: IMAGE_DETAIL,
                        },
                    },
                ]),
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        })
    }
}

#[async_trait]
impl<T: Transport> Analyzer for RemoteAnalyzer<T> {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn analyze(&self, image: &[u8]) -> Result<UnifiedResult, AnalysisError> {
        let request = self.build_request(image)?;
        let response = self.transport.send(&request).await?;
        let result = interpret_response(response.status, &response.body)?;
        info!("Vision model identified '{}'", result.food_name);
        Ok(result)
    }
}

/// Validate a raw endpoint response
///
/// Checks run in order: status, envelope text, payload shape, sentinel.
pub fn interpret_response(status: u16, body: &str) -> Result<UnifiedResult, AnalysisError> {
    if !(200..300).contains(&status) {
        warn!("Vision model returned status {}", status);
        return Err(AnalysisError::RemoteRejected(status, body.to_string()));
    }

    let content = extract_content(body).ok_or(AnalysisError::EmptyResponse)?;
    parse_payload(&content)
}

/// First choice's message content, if present and not blank
fn extract_content(body: &str) -> Option<String> {
    let envelope: ChatCompletionResponse = serde_json::from_str(body).ok()?;
    envelope
        .choices
        .into_iter()
        .next()?
        .message
        .content
        .filter(|c| !c.trim().is_empty())
}

/// Parse the model's answer text into a result
pub fn parse_payload(text: &str) -> Result<UnifiedResult, AnalysisError> {
    let payload: NutrientPayload = serde_json::from_str(strip_code_fence(text)).map_err(|e| {
        warn!("Vision model payload does not match the contract: {}", e);
        AnalysisError::MalformedPayload(excerpt(text))
    })?;

    let food_name = payload.food_name.trim();
    if food_name.eq_ignore_ascii_case(UNKNOWN_FOOD) {
        return Err(AnalysisError::NoSubjectDetected);
    }
    if food_name.is_empty() {
        warn!("Vision model returned a blank food_name");
        return Err(AnalysisError::MalformedPayload(excerpt(text)));
    }

    let nutrients = NutrientProfile {
        calories: payload.calories,
        protein: payload.protein,
        carbs: payload.carbs,
        fat: payload.fat,
        fiber: payload.fiber,
        sugar: payload.sugar,
    };
    if let Some(field) = nutrients.invalid_field() {
        warn!("Vision model returned an invalid {} value", field);
        return Err(AnalysisError::MalformedPayload(excerpt(text)));
    }

    Ok(UnifiedResult {
        food_name: food_name.to_string(),
        serving_size: payload.serving_size.trim().to_string(),
        nutrients,
        confidence: REMOTE_RESULT_CONFIDENCE,
    })
}

/// Remove markdown code fence markers (opening with optional language tag, closing, or both)
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let inner = match trimmed.strip_prefix("```") {
        Some(rest) => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        None => trimmed,
    };

    let inner = inner.trim();
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn excerpt(text: &str) -> String {
    text.chars().take(MALFORMED_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::analysis::upload::test_support::png_bytes;
    use crate::analysis::{MessageContent, TransportResponse};

    const PIZZA_JSON: &str = r#"{"food_name":"Pizza","serving_size":"1 slice (107g)","calories":285,"protein":12.2,"carbs":35.7,"fat":10.4,"fiber":2.5,"sugar":3.8}"#;

    /// Wrap payload text in a chat completion envelope
    fn envelope(content: &str) -> String {
        serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
        })
        .to_string()
    }

    /// Returns one canned response and records the request it was given
    struct ScriptedTransport {
        response: Result<TransportResponse, String>,
        seen: Mutex<Vec<ChatCompletionRequest>>,
    }

    impl ScriptedTransport {
        fn replying(status: u16, body: String) -> Self {
            Self {
                response: Ok(TransportResponse { status, body }),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &ChatCompletionRequest) -> Result<TransportResponse, AnalysisError> {
            self.seen.lock().unwrap().push(request.clone());
            self.response.clone().map_err(AnalysisError::Transport)
        }
    }

    #[test]
    fn test_valid_payload() {
        let result = interpret_response(200, &envelope(PIZZA_JSON)).unwrap();
        assert_eq!(result.food_name, "Pizza");
        assert_eq!(result.serving_size, "1 slice (107g)");
        assert_eq!(result.nutrients.calories, 285.0);
        assert_eq!(result.nutrients.sugar, 3.8);
        assert_eq!(result.confidence, REMOTE_RESULT_CONFIDENCE);
    }

    #[test]
    fn test_code_fenced_payload_parses_identically() {
        let bare = parse_payload(PIZZA_JSON).unwrap();
        let fenced = parse_payload(&format!("```json\n{}\n```", PIZZA_JSON)).unwrap();
        let plain_fence = parse_payload(&format!("  ```\n{}\n```  \n", PIZZA_JSON)).unwrap();
        let one_line = parse_payload(&format!("```json{}```", PIZZA_JSON)).unwrap();
        assert_eq!(bare, fenced);
        assert_eq!(bare, plain_fence);
        assert_eq!(bare, one_line);
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```JSON\r\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("{\"a\":1}```\n"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_closing_fence_only_parses() {
        let result = parse_payload(&format!("{}\n```\n", PIZZA_JSON)).unwrap();
        assert_eq!(result, parse_payload(PIZZA_JSON).unwrap());
    }

    #[test]
    fn test_blank_food_name_is_malformed() {
        let json = PIZZA_JSON.replace("\"food_name\":\"Pizza\"", "\"food_name\":\"  \"");
        match parse_payload(&json) {
            Err(AnalysisError::MalformedPayload(raw)) => assert!(raw.contains("food_name")),
            other => panic!("expected MalformedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_sentinel_is_no_subject() {
        let json = r#"{"food_name":"unknown","serving_size":"","calories":0,"protein":0,"carbs":0,"fat":0,"fiber":0,"sugar":0}"#;
        assert!(matches!(
            interpret_response(200, &envelope(json)),
            Err(AnalysisError::NoSubjectDetected)
        ));

        let shouted = json.replace("unknown", "UNKNOWN");
        assert!(matches!(
            parse_payload(&shouted),
            Err(AnalysisError::NoSubjectDetected)
        ));
    }

    #[test]
    fn test_missing_numeric_field_is_malformed() {
        let json = r#"{"food_name":"Pizza","serving_size":"1 slice","calories":285,"protein":12,"carbs":35,"fat":10,"fiber":2}"#;
        match interpret_response(200, &envelope(json)) {
            Err(AnalysisError::MalformedPayload(raw)) => {
                assert!(!raw.is_empty());
                assert!(raw.starts_with(r#"{"food_name":"Pizza""#));
            }
            other => panic!("expected MalformedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_string_number_is_malformed() {
        let json = PIZZA_JSON.replace("\"calories\":285", "\"calories\":\"285\"");
        assert!(matches!(
            parse_payload(&json),
            Err(AnalysisError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_negative_nutrient_is_malformed() {
        let json = PIZZA_JSON.replace("\"fat\":10.4", "\"fat\":-1");
        assert!(matches!(
            parse_payload(&json),
            Err(AnalysisError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_malformed_excerpt_is_bounded() {
        let long = format!("I think this is pizza. {}", "blah ".repeat(200));
        match parse_payload(&long) {
            Err(AnalysisError::MalformedPayload(raw)) => {
                assert_eq!(raw.chars().count(), MALFORMED_EXCERPT_CHARS);
                assert!(raw.starts_with("I think this is pizza."));
            }
            other => panic!("expected MalformedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_non_success_status_is_rejected() {
        let body = r#"{"error":{"message":"Incorrect API key provided"}}"#;
        match interpret_response(401, body) {
            Err(AnalysisError::RemoteRejected(status, text)) => {
                assert_eq!(status, 401);
                assert_eq!(text, body);
            }
            other => panic!("expected RemoteRejected, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_text_is_empty_response() {
        let no_choices = r#"{"choices":[]}"#;
        let null_content = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let blank_content = envelope("   \n");

        for body in [no_choices, null_content, blank_content.as_str(), "<html>bad gateway</html>"] {
            assert!(matches!(
                interpret_response(200, body),
                Err(AnalysisError::EmptyResponse)
            ));
        }
    }

    #[test]
    fn test_build_request_shape() {
        let analyzer = RemoteAnalyzer::new(ScriptedTransport::failing("unused"), "gpt-4o");
        let request = analyzer.build_request(&png_bytes()).unwrap();

        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.max_tokens, MAX_TOKENS);
        assert_eq!(request.temperature, TEMPERATURE);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["content"], SYSTEM_PROMPT);
        let parts = &json["messages"][1]["content"];
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["detail"], "low");
        assert!(parts[1]["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));

        match &request.messages[1].content {
            MessageContent::Parts(parts) => assert_eq!(parts.len(), 2),
            MessageContent::Text(_) => panic!("user turn should carry parts"),
        }
    }

    #[tokio::test]
    async fn test_analyze_round_trip_through_transport() {
        let analyzer = RemoteAnalyzer::new(
            ScriptedTransport::replying(200, envelope(&format!("```json\n{}\n```", PIZZA_JSON))),
            "gpt-4o-mini",
        );

        let result = analyzer.analyze(&png_bytes()).await.unwrap();
        assert_eq!(result.food_name, "Pizza");
        assert_eq!(result.confidence, REMOTE_RESULT_CONFIDENCE);

        let seen = analyzer.transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_invalid_image_never_reaches_transport() {
        let analyzer = RemoteAnalyzer::new(ScriptedTransport::replying(200, envelope(PIZZA_JSON)), "gpt-4o");

        let result = analyzer.analyze(b"not an image").await;
        assert!(matches!(result, Err(AnalysisError::InvalidImage(_))));
        assert!(analyzer.transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_surfaced_once() {
        let analyzer = RemoteAnalyzer::new(ScriptedTransport::failing("connection refused"), "gpt-4o");

        let result = analyzer.analyze(&png_bytes()).await;
        assert!(matches!(result, Err(AnalysisError::Transport(ref m)) if m == "connection refused"));
        assert_eq!(analyzer.transport.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let analyzer = RemoteAnalyzer::new(
            ScriptedTransport::replying(429, "rate limited".to_string()),
            "gpt-4o",
        );

        let result = analyzer.analyze(&png_bytes()).await;
        assert!(matches!(result, Err(AnalysisError::RemoteRejected(429, _))));
        assert_eq!(analyzer.transport.seen.lock().unwrap().len(), 1);
    }
}
