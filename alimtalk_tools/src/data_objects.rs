use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A template message for a single recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlimtalkMessage {
    /// Digits only, e.g. `01012345678`
    pub recipient_no: String,
    pub template_parameters: BTreeMap<String, String>,
}

impl AlimtalkMessage {
    pub fn new<S: Into<String>>(recipient_no: S) -> Self {
        Self { recipient_no: recipient_no.into(), template_parameters: BTreeMap::new() }
    }

    /// Sets the value for the template's `#{key}` placeholder.
    pub fn with_parameter<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.template_parameters.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub sender_key: String,
    pub template_code: String,
    pub recipient_list: Vec<Recipient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub recipient_no: String,
    pub template_parameter: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHeader {
    pub result_code: i64,
    pub result_message: String,
    pub is_successful: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlimtalkResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}
