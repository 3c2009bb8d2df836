/*!
 * Chat-completions stub on top of `wiremock`.
 *
 * Replies are mounted one at a time and each answers a single request, so
 * they are served in the order they were pushed.
 */

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Standard `choices[0].message.content` reply
pub fn content(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }]
    }))
}

/// Flat `{"content": ...}` reply
pub fn flat(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "content": text }))
}

/// Raw reply with an arbitrary status
pub fn status(code: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_string(body)
}

/// Request as seen by the server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

impl From<&Request> for RecordedRequest {
    fn from(request: &Request) -> Self {
        Self {
            path: request.url.path().to_string(),
            authorization: request
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: serde_json::from_slice(&request.body).unwrap_or(Value::Null),
        }
    }
}

impl RecordedRequest {
    pub fn model(&self) -> &str {
        self.body["model"].as_str().unwrap_or_default()
    }

    pub fn message(&self, index: usize) -> &str {
        self.body["messages"][index]["content"].as_str().unwrap_or_default()
    }
}

pub struct FakeServer {
    server: MockServer,
}

impl FakeServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to hand to the client
    pub fn endpoint(&self) -> String {
        format!("{}/v1", self.server.uri())
    }

    /// Queue the next reply
    pub async fn push(&self, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .respond_with(response)
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(RecordedRequest::from)
            .collect()
    }
}
