//! Google Gemini generateContent adapter.

use super::http::{self, MAX_TOKENS, TEMPERATURE};
use super::{VisionError, VisionProvider};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::Client;
use serde_json::json;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }
}

impl VisionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, prompt: &str, image: &[u8], mime_type: &str) -> Result<String, VisionError> {
        let body = json!({
            "contents": [{
                "parts": [
                    {"text": prompt},
                    {"inline_data": {"mime_type": mime_type, "data": STANDARD.encode(image)}}
                ]
            }],
            "generationConfig": {
                "maxOutputTokens": MAX_TOKENS,
                "temperature": TEMPERATURE,
            }
        });

        let url = format!("{}/{}:generateContent", BASE_URL, self.model);
        let reply = http::send_json(
            self.client
                .post(url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body),
        )?;
        http::text_at(&reply, "/candidates/0/content/parts/0/text")
    }
}
