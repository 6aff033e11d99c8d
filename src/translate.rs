use crate::constants::SUCCESS_STATUS;
use crate::error::{Error, Result};
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;

/// Remote translation seam. Implementations return the raw translated text;
/// slug sanitizing happens in the resolver.
pub trait Translator: Send + Sync {
    fn translate<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<String>>;
}

// ============================================================================
// MyMemory
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    #[serde(default)]
    response_status: Option<Value>,
    #[serde(default)]
    response_data: Option<MyMemoryData>,
    #[serde(default)]
    response_details: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryData {
    #[serde(default)]
    translated_text: Option<String>,
}

/// Client for the MyMemory `get` endpoint
#[derive(Debug, Clone)]
pub struct MyMemory {
    client: reqwest::Client,
    endpoint: String,
    langpair: String,
}

impl MyMemory {
    pub fn new(endpoint: impl Into<String>, langpair: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            langpair: langpair.into(),
        }
    }

    fn request_url(&self, text: &str) -> String {
        format!(
            "{}?q={}&langpair={}",
            self.endpoint,
            urlencoding::encode(text),
            urlencoding::encode(&self.langpair)
        )
    }
}

impl Translator for MyMemory {
    fn translate<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let body = self
                .client
                .get(self.request_url(text))
                .send()
                .await?
                .text()
                .await?;
            parse_response(&body)
        })
    }
}

/// Extract the translated text, treating any deviation from
/// `{responseStatus: 200, responseData: {translatedText: "..."}}` as failure.
fn parse_response(body: &str) -> Result<String> {
    let response: MyMemoryResponse = serde_json::from_str(body)?;

    let status = response.response_status.as_ref().and_then(Value::as_u64);
    let translated = response
        .response_data
        .and_then(|d| d.translated_text)
        .filter(|t| !t.is_empty());

    match (status, translated) {
        (Some(SUCCESS_STATUS), Some(text)) => Ok(text),
        _ => {
            let details = match response.response_details {
                Some(Value::String(s)) if !s.is_empty() => s,
                Some(Value::Null) | None => "Unknown error".to_string(),
                Some(other) => other.to_string(),
            };
            Err(Error::Translation(details))
        }
    }
}
