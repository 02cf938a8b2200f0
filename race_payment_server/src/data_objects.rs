//! Wire types for the bank-matching agent's protocol.
//!
//! Every response other than the order list and the order detail is wrapped in a [`ReturnStatus`] envelope:
//! `{"return_code": 200, "description": "정상", ...}`. The agent reads the outcome from `return_code`, never from the
//! HTTP status.
use race_payment_engine::{
    db_types::RegistrationId,
    reconciliation_objects::{ConfirmResult, OrderRecord},
};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

pub const RETURN_CODE_OK: u16 = 200;
pub const RETURN_CODE_MALFORMED: u16 = 400;
pub const RETURN_CODE_UNAUTHORIZED: u16 = 401;
pub const RETURN_CODE_ORDER_ERROR: u16 = 415;
pub const RETURN_CODE_SERVER_ERROR: u16 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnStatus {
    pub return_code: u16,
    pub description: String,
}

impl ReturnStatus {
    pub fn new<S: Into<String>>(return_code: u16, description: S) -> Self {
        Self { return_code, description: description.into() }
    }

    pub fn ok() -> Self {
        Self::new(RETURN_CODE_OK, "정상")
    }

    pub fn malformed() -> Self {
        Self::new(RETURN_CODE_MALFORMED, "요청 format 오류")
    }

    pub fn unauthorized() -> Self {
        Self::new(RETURN_CODE_UNAUTHORIZED, "인증 정보 오류")
    }

    pub fn order_not_found() -> Self {
        Self::new(RETURN_CODE_ORDER_ERROR, "존재하지 않는 주문번호")
    }

    /// At least one order of a confirmation batch failed
    pub fn order_id_error() -> Self {
        Self::new(RETURN_CODE_ORDER_ERROR, "order_id 오류")
    }

    pub fn server_error() -> Self {
        Self::new(RETURN_CODE_SERVER_ERROR, "서버 오류")
    }
}

//----------------------------------------------   Requests  ----------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetailRequest {
    pub order_id: String,
}

impl OrderDetailRequest {
    pub fn registration_id(&self) -> Result<RegistrationId, ServerError> {
        order_id(&self.order_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmRequestItem {
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub requests: Vec<ConfirmRequestItem>,
}

impl ConfirmRequest {
    /// The ids to confirm, in request order. An empty batch, or any blank id, makes the whole request malformed.
    pub fn registration_ids(&self) -> Result<Vec<RegistrationId>, ServerError> {
        if self.requests.is_empty() {
            return Err(ServerError::MalformedRequest("The confirmation batch is empty".into()));
        }
        self.requests.iter().map(|r| order_id(&r.order_id)).collect()
    }
}

fn order_id(s: &str) -> Result<RegistrationId, ServerError> {
    if s.trim().is_empty() {
        return Err(ServerError::MalformedRequest("order_id is empty".into()));
    }
    Ok(RegistrationId::from(s.to_string()))
}

/// Parses a JSON request body. Anything that is not the expected shape is a [`ServerError::MalformedRequest`].
pub fn parse_request<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, ServerError> {
    serde_json::from_slice(body).map_err(|e| ServerError::MalformedRequest(e.to_string()))
}

//----------------------------------------------   Responses  ----------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResponse {
    #[serde(flatten)]
    pub status: Option<ReturnStatus>,
    pub orders: Vec<OrderRecord>,
}

impl OrderListResponse {
    pub fn new(orders: Vec<OrderRecord>) -> Self {
        Self { status: None, orders }
    }

    pub fn failed(status: ReturnStatus) -> Self {
        Self { status: Some(status), orders: vec![] }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetailResponse {
    pub order: OrderRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmResponseItem {
    pub order_id: String,
    pub description: String,
}

impl From<&ConfirmResult> for ConfirmResponseItem {
    fn from(result: &ConfirmResult) -> Self {
        Self { order_id: result.order_id.clone(), description: result.outcome.description() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmResponse {
    #[serde(flatten)]
    pub status: ReturnStatus,
    pub orders: Vec<ConfirmResponseItem>,
}

impl ConfirmResponse {
    /// `정상` if every order was confirmed, otherwise `order_id 오류` with one entry per order.
    pub fn from_results(results: &[ConfirmResult]) -> Self {
        let status = if results.iter().all(|r| r.outcome.is_success()) {
            ReturnStatus::ok()
        } else {
            ReturnStatus::order_id_error()
        };
        Self { status, orders: results.iter().map(ConfirmResponseItem::from).collect() }
    }

    pub fn failed(status: ReturnStatus) -> Self {
        Self { status, orders: vec![] }
    }
}
