//! OpenAI chat-completions adapter.

use super::http::{self, MAX_TOKENS, TEMPERATURE};
use super::{VisionError, VisionProvider};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::Client;
use serde_json::json;

const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }
}

impl VisionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, prompt: &str, image: &[u8], mime_type: &str) -> Result<String, VisionError> {
        let data_uri = format!("data:{};base64,{}", mime_type, STANDARD.encode(image));
        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": prompt},
                    {"type": "image_url", "image_url": {"url": data_uri, "detail": "high"}}
                ]
            }],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });

        let reply = http::send_json(
            self.client
                .post(ENDPOINT)
                .bearer_auth(&self.api_key)
                .json(&body),
        )?;
        http::text_at(&reply, "/choices/0/message/content")
    }
}
