use log::*;
use rpg_common::Secret;

pub const DEFAULT_ALIMTALK_API_URL: &str = "https://api-alimtalk.cloud.toast.com";

#[derive(Debug, Clone, Default)]
pub struct AlimtalkConfig {
    pub api_url: String,
    pub app_key: String,
    pub secret_key: Secret<String>,
    /// The registered KakaoTalk channel that messages are sent from
    pub sender_key: String,
    /// The approved template for payment confirmation notices
    pub template_code: String,
}

impl AlimtalkConfig {
    /// Reads the `RPG_ALIMTALK_*` variables. Returns `None`, with a warning, if the app key, secret key, sender key or
    /// template code is missing, since no message could be sent without them.
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("RPG_ALIMTALK_API_URL").unwrap_or_else(|_| {
            info!("RPG_ALIMTALK_API_URL not set, using {DEFAULT_ALIMTALK_API_URL}");
            DEFAULT_ALIMTALK_API_URL.to_string()
        });
        let app_key = required("RPG_ALIMTALK_APP_KEY")?;
        let secret_key = Secret::new(required("RPG_ALIMTALK_SECRET_KEY")?);
        let sender_key = required("RPG_ALIMTALK_SENDER_KEY")?;
        let template_code = required("RPG_ALIMTALK_TEMPLATE_CODE")?;
        Some(Self { api_url, app_key, secret_key, sender_key, template_code })
    }

    pub fn messages_url(&self) -> String {
        format!("{}/alimtalk/v2.3/appkeys/{}/messages", self.api_url.trim_end_matches('/'), self.app_key)
    }
}

fn required(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => {
            warn!("{key} is not set. Alimtalk messages cannot be sent.");
            None
        },
    }
}
