//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Database work is always awaited, never blocked on.
//!
//! The `/bank` handlers answer every protocol outcome, failures included, with HTTP 200 and a `return_code` in the
//! body. Only the access guard in front of them uses a non-200 status.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use race_payment_engine::{traits::RegistrationDatabase, ReconciliationApi, RegistrationError};

use crate::data_objects::{
    parse_request,
    ConfirmRequest,
    ConfirmResponse,
    OrderDetailRequest,
    OrderDetailResponse,
    OrderListResponse,
    ReturnStatus,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

#[get("/health")]
pub async fn health() -> impl Responder {
    "👍️\n"
}

//----------------------------------------------   Bank matching  ----------------------------------------------------
route!(bank_orders => Get "/orders" impl RegistrationDatabase);
/// Route handler for the pending order list
///
/// The bank-matching agent polls this to learn which transfers it should look out for. Every registration awaiting
/// payment is listed, newest first.
///
/// If the store cannot be read, the agent gets the `401` envelope with an empty list. It treats this as "try again
/// later".
pub async fn bank_orders<B: RegistrationDatabase>(api: web::Data<ReconciliationApi<B>>) -> HttpResponse {
    trace!("💻️ Received pending order list request");
    match api.list_pending_orders().await {
        Ok(orders) => {
            debug!("💻️ Returning {} pending orders", orders.len());
            HttpResponse::Ok().json(OrderListResponse::new(orders))
        },
        Err(e) => {
            error!("💻️ Could not list pending orders. {e}");
            HttpResponse::Ok().json(OrderListResponse::failed(ReturnStatus::unauthorized()))
        },
    }
}

route!(bank_order => Post "/order" impl RegistrationDatabase);
/// Route handler for a single order, e.g. `{"order_id": "R1"}`. The order is returned whatever its payment status.
pub async fn bank_order<B: RegistrationDatabase>(
    body: web::Bytes,
    api: web::Data<ReconciliationApi<B>>,
) -> HttpResponse {
    trace!("💻️ Received order detail request");
    let id = match parse_request::<OrderDetailRequest>(&body).and_then(|r| r.registration_id()) {
        Ok(id) => id,
        Err(e) => {
            debug!("💻️ Malformed order detail request. {e}");
            return HttpResponse::Ok().json(ReturnStatus::malformed());
        },
    };
    match api.order_detail(&id).await {
        Ok(order) => HttpResponse::Ok().json(OrderDetailResponse { order }),
        Err(RegistrationError::OrderNotFound(_)) => {
            debug!("💻️ Order detail requested for unknown order {id}");
            HttpResponse::Ok().json(ReturnStatus::order_not_found())
        },
        Err(e) => {
            error!("💻️ Could not fetch order {id}. {e}");
            HttpResponse::Ok().json(ReturnStatus::server_error())
        },
    }
}

route!(bank_confirm => Post "/confirm" impl RegistrationDatabase);
/// Route handler for payment confirmations
///
/// The body lists the orders the agent has matched to transfers: `{"requests": [{"order_id": "R1"}, ...]}`. Each
/// order is confirmed on its own, so the response can mix successes and failures. The batch is only reported as
/// `정상` if every order was confirmed.
pub async fn bank_confirm<B: RegistrationDatabase>(
    body: web::Bytes,
    api: web::Data<ReconciliationApi<B>>,
) -> HttpResponse {
    trace!("💻️ Received payment confirmation request");
    let ids = match parse_request::<ConfirmRequest>(&body).and_then(|r| r.registration_ids()) {
        Ok(ids) => ids,
        Err(e) => {
            debug!("💻️ Malformed payment confirmation request. {e}");
            return HttpResponse::Ok().json(ConfirmResponse::failed(ReturnStatus::malformed()));
        },
    };
    let results = api.confirm_orders(&ids).await;
    HttpResponse::Ok().json(ConfirmResponse::from_results(&results))
}

route!(bank_confirm_put => Put "/confirm" impl RegistrationDatabase);
/// Some agent versions send confirmations with `PUT`. Identical to [`bank_confirm`].
pub async fn bank_confirm_put<B: RegistrationDatabase>(
    body: web::Bytes,
    api: web::Data<ReconciliationApi<B>>,
) -> HttpResponse {
    bank_confirm(body, api).await
}
