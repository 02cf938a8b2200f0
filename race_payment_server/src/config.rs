use std::{env, net::IpAddr};

#[cfg(feature = "alimtalk")]
use alimtalk_tools::AlimtalkConfig;
use log::*;
use race_payment_engine::reconciliation_objects::BankAccount;
use rpg_common::{helpers::parse_boolean_flag, Secret};

const DEFAULT_RPG_HOST: &str = "127.0.0.1";
const DEFAULT_RPG_PORT: u16 = 8360;
const DEFAULT_RPG_DATABASE_URL: &str = "sqlite://data/race_registrations.db";
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The account entrants pay into. Reported on every order handed to the bank-matching agent.
    pub bank_account: BankAccount,
    pub webhook: WebhookConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    /// How many payment confirmed events may queue up before confirmations wait for the notifier.
    pub event_buffer_size: usize,
    /// Alimtalk credentials. If `None`, payments are confirmed as usual but no notices are sent.
    #[cfg(feature = "alimtalk")]
    pub alimtalk: Option<AlimtalkConfig>,
}

/// Access control for the `/bank` routes.
#[derive(Clone, Debug, Default)]
pub struct WebhookConfig {
    /// If set, every request must carry this value in its `x-api-key` header.
    pub api_key: Option<Secret<String>>,
    /// If set, requests are only accepted from these addresses.
    /// To explicitly disable the whitelist, set `RPG_WEBHOOK_IP_WHITELIST` to "false", "none", or "0".
    pub whitelist: Option<Vec<IpAddr>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPG_HOST.to_string(),
            port: DEFAULT_RPG_PORT,
            database_url: DEFAULT_RPG_DATABASE_URL.to_string(),
            bank_account: BankAccount::default(),
            webhook: WebhookConfig::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            #[cfg(feature = "alimtalk")]
            alimtalk: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("RPG_HOST").ok().unwrap_or_else(|| DEFAULT_RPG_HOST.into());
        let port = env::var("RPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for RPG_PORT. {e} Using the default, {DEFAULT_RPG_PORT}, instead."
                    );
                    DEFAULT_RPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_RPG_PORT);
        let database_url = env::var("RPG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ RPG_DATABASE_URL is not set. Using the default, {DEFAULT_RPG_DATABASE_URL}.");
            DEFAULT_RPG_DATABASE_URL.to_string()
        });
        let bank_account = bank_account_from_env();
        let webhook = WebhookConfig::from_env_or_defaults();
        let use_x_forwarded_for = parse_boolean_flag(env::var("RPG_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("RPG_USE_FORWARDED").ok(), false);
        let event_buffer_size = env::var("RPG_EVENT_BUFFER_SIZE")
            .ok()
            .and_then(|s| {
                s.parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .or_else(|| {
                        warn!("🪛️ Invalid configuration value for RPG_EVENT_BUFFER_SIZE: {s}");
                        None
                    })
            })
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        #[cfg(feature = "alimtalk")]
        let alimtalk = AlimtalkConfig::from_env();
        #[cfg(feature = "alimtalk")]
        if alimtalk.is_none() {
            warn!("🪛️ Alimtalk is not configured. Payment confirmed notices will not be sent.");
        }
        Self {
            host,
            port,
            database_url,
            bank_account,
            webhook,
            use_x_forwarded_for,
            use_forwarded,
            event_buffer_size,
            #[cfg(feature = "alimtalk")]
            alimtalk,
        }
    }
}

fn bank_account_from_env() -> BankAccount {
    let account_no = env::var("RPG_BANK_ACCOUNT_NO").ok().unwrap_or_else(|| {
        error!(
            "🪛️ RPG_BANK_ACCOUNT_NO is not set. Please set it to the account entrants transfer their fees into. Orders \
             will be reported without an account number."
        );
        String::default()
    });
    let bank_code_name = env::var("RPG_BANK_CODE_NAME").ok().unwrap_or_else(|| {
        error!("🪛️ RPG_BANK_CODE_NAME is not set. Please set it to the name of the bank holding RPG_BANK_ACCOUNT_NO.");
        String::default()
    });
    BankAccount::new(account_no, bank_code_name)
}

impl WebhookConfig {
    pub fn from_env_or_defaults() -> Self {
        let api_key = env::var("RPG_WEBHOOK_API_KEY").ok().filter(|s| !s.trim().is_empty()).map(Secret::new);
        if api_key.is_none() {
            warn!("🪛️ RPG_WEBHOOK_API_KEY is not set. The /bank routes will not check an API key.");
        }
        let whitelist = env::var("RPG_WEBHOOK_IP_WHITELIST").ok().and_then(|s| parse_whitelist(&s));
        match &whitelist {
            Some(whitelist) if whitelist.is_empty() => {
                warn!(
                    "🚨️ The webhook IP whitelist was configured, but is empty. The server will run, but won't \
                     authorise any bank-matching requests."
                );
            },
            None => {
                info!("🪛️ No webhook IP whitelist is set.");
            },
            Some(v) => {
                let addrs = v.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
                info!("🪛️ Webhook IP whitelist: {addrs}");
            },
        }
        Self { api_key, whitelist }
    }
}

/// Parses a comma-separated list of IP addresses. Invalid entries are skipped with a warning. "none", "false" and "0"
/// switch the whitelist off.
pub fn parse_whitelist(s: &str) -> Option<Vec<IpAddr>> {
    if ["none", "false", "0"].contains(&s.trim().to_lowercase().as_str()) {
        info!(
            "🪛️ Webhook IP whitelist is disabled. If this is not what you want, set RPG_WEBHOOK_IP_WHITELIST to a \
             comma-separated list of IP addresses to enable it."
        );
        return None;
    }
    let ip_addrs = s
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            s.parse()
                .map_err(|e| {
                    warn!("🪛️ Ignoring invalid IP address ({s}) in RPG_WEBHOOK_IP_WHITELIST: {e}");
                })
                .ok()
        })
        .collect::<Vec<IpAddr>>();
    Some(ip_addrs)
}
