//! Blocking HTTP plumbing shared by the provider adapters.

use super::VisionError;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

pub(crate) const MAX_TOKENS: u32 = 4096;
pub(crate) const TEMPERATURE: f32 = 0.1;

pub(crate) fn client(timeout: Duration) -> Result<Client, VisionError> {
    Client::builder()
        .user_agent(concat!("aiready/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|e| VisionError::Unavailable(e.to_string()))
}

/// Send a request and decode the JSON reply, turning HTTP errors into
/// [`VisionError::Request`].
pub(crate) fn send_json(request: RequestBuilder) -> Result<Value, VisionError> {
    let response = request
        .send()
        .map_err(|e| VisionError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        let snippet: String = body.chars().take(300).collect();
        return Err(VisionError::Request(format!("HTTP {}: {}", status, snippet)));
    }

    response
        .json::<Value>()
        .map_err(|e| VisionError::MalformedResponse(e.to_string()))
}

/// Read the text reply at a JSON pointer.
pub(crate) fn text_at(reply: &Value, pointer: &str) -> Result<String, VisionError> {
    reply
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| VisionError::MalformedResponse(format!("no text at {}", pointer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_at() {
        let reply = json!({"choices": [{"message": {"content": "hello"}}]});
        assert_eq!(text_at(&reply, "/choices/0/message/content").unwrap(), "hello");
        assert!(matches!(
            text_at(&reply, "/content/0/text"),
            Err(VisionError::MalformedResponse(_))
        ));
    }
}
