use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::ReconciliationView;

/// Emitted once per successful `pending -> confirmed` transition, after the write has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmedEvent {
    pub registration: ReconciliationView,
    pub confirmed_at: DateTime<Utc>,
}

impl PaymentConfirmedEvent {
    pub fn new(registration: ReconciliationView) -> Self {
        Self { registration, confirmed_at: Utc::now() }
    }
}
