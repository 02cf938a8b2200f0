use serde::{Deserialize, Serialize};

use crate::{
    db_types::{PaymentStatus, ReconciliationView, Won},
    helpers::format_order_date,
};

/// The account that entrants transfer their fees into. It is the same for every order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    pub account_no: String,
    pub bank_code_name: String,
}

impl BankAccount {
    pub fn new<S: Into<String>>(account_no: S, bank_code_name: S) -> Self {
        Self { account_no: account_no.into(), bank_code_name: bank_code_name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_name: String,
}

/// A registration as the bank-matching agent sees it: an order awaiting a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    /// The registrant
    pub buyer_name: String,
    /// The name expected on the incoming transfer
    pub billing_name: String,
    pub bank_account_no: String,
    pub bank_code_name: String,
    pub order_price_amount: Won,
    /// `YYYY-MM-DD HH:MM:SS`, Korea Standard Time
    pub order_date: String,
    pub items: Vec<OrderItem>,
}

impl OrderRecord {
    pub fn from_view(view: &ReconciliationView, account: &BankAccount) -> Self {
        Self {
            order_id: view.id.to_string(),
            buyer_name: view.name.clone(),
            billing_name: view.depositor_name.clone(),
            bank_account_no: account.account_no.clone(),
            bank_code_name: account.bank_code_name.clone(),
            order_price_amount: view.entry_fee,
            order_date: format_order_date(&view.created_at),
            items: vec![OrderItem { product_name: view.product_name() }],
        }
    }
}

/// What happened to one order of a confirmation batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    NotFound,
    /// The registration exists but is not awaiting payment
    NotPending(PaymentStatus),
    /// The store failed while looking up or updating the order. Carries the error message for the logs.
    UpdateFailed(String),
}

impl ConfirmOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConfirmOutcome::Confirmed)
    }

    /// The per-order description reported back to the bank-matching agent.
    pub fn description(&self) -> String {
        match self {
            ConfirmOutcome::Confirmed => "성공".to_string(),
            ConfirmOutcome::NotFound => "존재하지 않는 주문".to_string(),
            ConfirmOutcome::NotPending(status) => format!("입금대기 상태가 아님 (현재: {})", status.label()),
            ConfirmOutcome::UpdateFailed(_) => "업데이트 실패".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmResult {
    /// Echoes the order id exactly as it was requested
    pub order_id: String,
    pub outcome: ConfirmOutcome,
}
