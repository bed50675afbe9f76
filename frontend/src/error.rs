//! Error type for backend calls and DOM mounting.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum WidgetError {
    /// Request never got a response
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("HTTP error {status}: {status_text}")]
    Http { status: u16, status_text: String },

    /// Body was not the expected JSON
    #[error("Invalid JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A DOM call failed while mounting
    #[error("DOM error: {0}")]
    Dom(String),
}

impl WidgetError {
    pub fn dom(context: &str, value: JsValue) -> Self {
        Self::Dom(format!("{}: {:?}", context, value))
    }

    /// Text shown to the user: the transport's status text when there is one.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Http { status_text, .. } if !status_text.trim().is_empty() => {
                status_text.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

impl From<gloo_net::Error> for WidgetError {
    fn from(err: gloo_net::Error) -> Self {
        Self::Network(err.to_string())
    }
}
