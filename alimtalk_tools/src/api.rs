use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};

use crate::{
    config::AlimtalkConfig,
    data_objects::{AlimtalkMessage, AlimtalkResponse, Recipient, SendRequest},
    AlimtalkApiError,
};

#[derive(Clone)]
pub struct AlimtalkApi {
    config: AlimtalkConfig,
    client: Arc<Client>,
}

impl std::fmt::Debug for AlimtalkApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AlimtalkApi ({:?})", self.config)
    }
}

impl AlimtalkApi {
    pub fn new(config: AlimtalkConfig) -> Result<Self, AlimtalkApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(config.secret_key.reveal().as_str())
            .map_err(|e| AlimtalkApiError::Initialization(e.to_string()))?;
        headers.insert("X-Secret-Key", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json;charset=UTF-8"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| AlimtalkApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &AlimtalkConfig {
        &self.config
    }

    /// The request body for sending `message` with the configured template.
    pub fn send_request(&self, message: AlimtalkMessage) -> SendRequest {
        SendRequest {
            sender_key: self.config.sender_key.clone(),
            template_code: self.config.template_code.clone(),
            recipient_list: vec![Recipient {
                recipient_no: message.recipient_no,
                template_parameter: message.template_parameters,
            }],
        }
    }

    /// Sends one template message. A response with `isSuccessful: false` is reported as
    /// [`AlimtalkApiError::Rejected`].
    pub async fn send(&self, message: AlimtalkMessage) -> Result<AlimtalkResponse, AlimtalkApiError> {
        let url = self.config.messages_url();
        let body = self.send_request(message);
        trace!("Sending alimtalk request to {url}");
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AlimtalkApiError::RestResponseError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| AlimtalkApiError::RestResponseError(e.to_string()))?;
            return Err(AlimtalkApiError::QueryError { status, message });
        }
        let result =
            response.json::<AlimtalkResponse>().await.map_err(|e| AlimtalkApiError::JsonError(e.to_string()))?;
        if !result.header.is_successful {
            let code = result.header.result_code;
            return Err(AlimtalkApiError::Rejected { code, message: result.header.result_message });
        }
        debug!("Alimtalk message accepted. {}", result.header.result_message);
        Ok(result)
    }
}
