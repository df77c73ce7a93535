use std::time::Duration;

use base64::Engine as _;
use pipeline_logging::pipeline_debug;
use serde::Deserialize;
use serde_json::json;

use crate::{EntryId, ExtractError, ExtractFailureKind, ExtractionRequest, ReceiptFields};

#[derive(Debug, Clone)]
pub struct ExtractSettings {
    /// Secret for the upstream API. `None` means extraction cannot run and
    /// every attempt fails with a credential error.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    /// Derives structured receipt fields from the file's raw bytes.
    /// Single attempt; retry policy belongs to the caller, if anywhere.
    async fn extract(
        &self,
        entry_id: EntryId,
        request: &ExtractionRequest,
    ) -> Result<ReceiptFields, ExtractError>;
}

/// Extraction client for the Gemini `generateContent` endpoint. The file is
/// inlined base64 next to a natural-language instruction, and the response
/// is constrained to a machine-checkable JSON schema.
#[derive(Debug, Clone)]
pub struct GeminiExtractor {
    settings: ExtractSettings,
}

impl GeminiExtractor {
    pub fn new(settings: ExtractSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ExtractError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| ExtractError::new(ExtractFailureKind::Network, err.to_string()))
    }
}

fn instruction(media_type: &str) -> String {
    let kind = if media_type.contains("pdf") {
        "PDF"
    } else {
        "image"
    };
    format!(
        "Extract receipt information from this {kind}.\n\n\
         Return the following information:\n\
         - date: The date of the receipt in YYYY-MM-DD format\n\
         - merchant: The name of the merchant/store\n\
         - description: A brief description of the items purchased (5 words or less)\n\
         - total: The total amount including taxes. Use positive numbers for purchases \
         and negative numbers for returns/refunds\n\
         - cardLast4: The last 4 digits of the payment card, if visible\n\n\
         Analyze the receipt carefully and extract accurate information."
    )
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "date": { "type": "STRING", "description": "Receipt date, YYYY-MM-DD" },
            "merchant": { "type": "STRING" },
            "description": { "type": "STRING", "description": "5 words or less" },
            "total": { "type": "NUMBER" },
            "cardLast4": { "type": "STRING", "nullable": true }
        },
        "required": ["date", "merchant", "description", "total"]
    })
}

#[async_trait::async_trait]
impl Extractor for GeminiExtractor {
    async fn extract(
        &self,
        entry_id: EntryId,
        request: &ExtractionRequest,
    ) -> Result<ReceiptFields, ExtractError> {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            return Err(ExtractError::new(
                ExtractFailureKind::MissingCredential,
                "API key is required",
            ));
        };

        let client = self.build_client()?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.api_base, self.settings.model
        );
        let encoded = base64::engine::general_purpose::STANDARD.encode(&request.bytes);
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": instruction(&request.media_type) },
                    { "inline_data": {
                        "mime_type": request.media_type,
                        "data": encoded
                    }}
                ]
            }],
            "generationConfig": {
                "response_mime_type": "application/json",
                "response_schema": response_schema()
            }
        });

        pipeline_debug!(
            "entry {}: extracting {} ({} bytes)",
            entry_id,
            request.file_name,
            request.bytes.len()
        );

        let response = client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::new(
                ExtractFailureKind::HttpStatus(status.as_u16()),
                format!("extraction request failed: {status}"),
            ));
        }

        let payload: GenerateContentResponse =
            response.json().await.map_err(map_reqwest_error)?;
        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| {
                ExtractError::new(
                    ExtractFailureKind::EmptyResponse,
                    "model returned no candidate text",
                )
            })?;

        let fields: ReceiptFields = serde_json::from_str(&text).map_err(|err| {
            ExtractError::new(
                ExtractFailureKind::SchemaViolation,
                format!("model output is not valid receipt JSON: {err}"),
            )
        })?;
        validate_fields(&fields)?;
        Ok(fields)
    }
}

fn validate_fields(fields: &ReceiptFields) -> Result<(), ExtractError> {
    if !is_iso_date(&fields.date) {
        return Err(ExtractError::new(
            ExtractFailureKind::SchemaViolation,
            format!("date {:?} is not in YYYY-MM-DD form", fields.date),
        ));
    }
    if !fields.total.is_finite() {
        return Err(ExtractError::new(
            ExtractFailureKind::SchemaViolation,
            "total is not a finite number",
        ));
    }
    if let Some(last4) = &fields.card_last4 {
        if last4.chars().count() != 4 {
            return Err(ExtractError::new(
                ExtractFailureKind::SchemaViolation,
                format!("card suffix {last4:?} is not 4 characters"),
            ));
        }
    }
    Ok(())
}

fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn map_reqwest_error(err: reqwest::Error) -> ExtractError {
    if err.is_timeout() {
        return ExtractError::new(ExtractFailureKind::Timeout, err.to_string());
    }
    ExtractError::new(ExtractFailureKind::Network, err.to_string())
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}
