use std::{net::IpAddr, time::Duration};

use actix_web::{
    body::BoxBody,
    dev::{Server, Service, ServiceFactory, ServiceRequest, ServiceResponse},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    Error,
    HttpServer,
    Scope,
};
use constant_time_eq::constant_time_eq;
use futures::future::{ok, Either};
use log::*;
use race_payment_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    traits::RegistrationDatabase,
    ReconciliationApi,
    SqliteDatabase,
};
use rpg_common::Secret;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    helpers::get_remote_ip,
    routes::{health, BankConfirmPutRoute, BankConfirmRoute, BankOrderRoute, BankOrdersRoute},
};

pub const API_KEY_HEADER: &str = "x-api-key";

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let hooks = create_event_hooks(&config, &db);
    let handlers = EventHandlers::new(config.event_buffer_size, hooks);
    let producers = handlers.producers();
    handlers.start_handlers();
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

#[cfg(feature = "alimtalk")]
fn create_event_hooks(config: &ServerConfig, db: &SqliteDatabase) -> EventHooks {
    match &config.alimtalk {
        Some(alimtalk) => crate::integrations::alimtalk::create_notification_hooks(alimtalk.clone(), db.clone())
            .unwrap_or_else(|e| {
                error!("📨️ Could not start the alimtalk client. Payment confirmed notices will not be sent. {e}");
                EventHooks::default()
            }),
        None => EventHooks::default(),
    }
}

#[cfg(not(feature = "alimtalk"))]
fn create_event_hooks(_config: &ServerConfig, _db: &SqliteDatabase) -> EventHooks {
    info!("📨️ Built without alimtalk support. Payment confirmed notices will not be sent.");
    EventHooks::default()
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let bind_addr = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let reconciliation_api = ReconciliationApi::new(db.clone(), producers.clone(), config.bank_account.clone());
        let guard = WebhookGuard::from_config(&config);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("rpg::access_log"))
            .app_data(web::Data::new(reconciliation_api))
            .service(health)
            .service(bank_scope::<SqliteDatabase>(guard))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind(bind_addr)?
    .run();
    Ok(srv)
}

/// Decides who may call the `/bank` routes.
///
/// A request must carry the configured API key (if any) and come from a whitelisted address (if a whitelist is set).
/// With neither configured, every request is let through.
#[derive(Clone, Debug, Default)]
pub struct WebhookGuard {
    pub api_key: Option<Secret<String>>,
    pub whitelist: Option<Vec<IpAddr>>,
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl WebhookGuard {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            api_key: config.webhook.api_key.clone(),
            whitelist: config.webhook.whitelist.clone(),
            use_x_forwarded_for: config.use_x_forwarded_for,
            use_forwarded: config.use_forwarded,
        }
    }

    pub fn check(&self, req: &ServiceRequest) -> Result<(), ServerError> {
        if let Some(key) = &self.api_key {
            let supplied = req.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
            let matches = supplied.is_some_and(|v| constant_time_eq(v.as_bytes(), key.reveal().as_bytes()));
            if !matches {
                return Err(ServerError::WebhookUnauthorized("Missing or incorrect API key".into()));
            }
        }
        if let Some(whitelist) = &self.whitelist {
            let peer_ip = get_remote_ip(req.request(), self.use_x_forwarded_for, self.use_forwarded);
            match peer_ip {
                Some(ip) if whitelist.contains(&ip) => trace!("🏦️ Bank-matching request from {ip}"),
                Some(ip) => return Err(ServerError::WebhookUnauthorized(format!("{ip} is not whitelisted"))),
                None => {
                    return Err(ServerError::WebhookUnauthorized("No IP address found in remote peer request".into()))
                },
            }
        }
        Ok(())
    }
}

/// The `/bank` scope, with its routes behind the [`WebhookGuard`].
pub fn bank_scope<B: RegistrationDatabase + 'static>(
    guard: WebhookGuard,
) -> Scope<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = Error,
        InitError = (),
    >,
> {
    web::scope("/bank")
        .wrap_fn(move |req, srv| match guard.check(&req) {
            Ok(()) => Either::Left(srv.call(req)),
            Err(e) => {
                warn!("🏦️ Denying access to {}. {e}", req.path());
                Either::Right(ok(req.error_response(e)))
            },
        })
        .service(BankOrdersRoute::<B>::new())
        .service(BankOrderRoute::<B>::new())
        .service(BankConfirmRoute::<B>::new())
        .service(BankConfirmPutRoute::<B>::new())
}
