use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use rpg_common::Won;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::helpers::hash_guest_password;

//--------------------------------------   RegistrationId     ---------------------------------------------------------
/// The opaque identifier of a registration. The bank-matching agent knows it as the `order_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct RegistrationId(pub String);

impl FromStr for RegistrationId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConversionError("A registration id cannot be empty".into()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<String> for RegistrationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RegistrationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for RegistrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl RegistrationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A fresh identifier of the form `R{yyMMddHHmmss}{6 random hex digits}`.
    pub fn random() -> Self {
        let stamp = Utc::now().format("%y%m%d%H%M%S");
        let salt = rand::random::<u32>() & 0x00ff_ffff;
        Self(format!("R{stamp}{salt:06X}"))
    }
}

//--------------------------------------   PaymentStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Registered, waiting for the bank transfer to be matched.
    Pending,
    /// The bank transfer has been matched and the entry is paid.
    Confirmed,
    /// The registration was withdrawn before payment.
    Cancelled,
}

impl PaymentStatus {
    /// The label the bank-matching agent and the back office see for this status.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "입금대기",
            PaymentStatus::Confirmed => "입금확인",
            PaymentStatus::Cancelled => "취소",
        }
    }

    pub fn is_final(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Confirmed => write!(f, "confirmed"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------    Competition       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Competition {
    pub id: i64,
    pub title: String,
    /// Start of the event
    pub date: DateTime<Utc>,
    pub location: String,
    /// `None` means there is no cap on the number of entrants.
    pub max_participants: Option<i64>,
    pub current_participants: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCompetition {
    pub title: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub max_participants: Option<i64>,
}

impl NewCompetition {
    pub fn new<S: Into<String>>(title: S, date: DateTime<Utc>, location: S) -> Self {
        Self { title: title.into(), date, location: location.into(), max_participants: None }
    }

    pub fn with_max_participants(mut self, max: i64) -> Self {
        self.max_participants = Some(max);
        self
    }
}

//--------------------------------------  ParticipationGroup  ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipationGroup {
    pub id: i64,
    pub competition_id: i64,
    pub name: String,
    pub distance: Option<String>,
    pub entry_fee: Won,
    pub max_participants: Option<i64>,
    pub current_participants: i64,
}

#[derive(Debug, Clone)]
pub struct NewParticipationGroup {
    pub competition_id: i64,
    pub name: String,
    pub distance: Option<String>,
    pub entry_fee: Won,
    pub max_participants: Option<i64>,
}

impl NewParticipationGroup {
    pub fn new<S: Into<String>>(competition_id: i64, name: S, entry_fee: Won) -> Self {
        Self { competition_id, name: name.into(), distance: None, entry_fee, max_participants: None }
    }

    pub fn with_distance<S: Into<String>>(mut self, distance: S) -> Self {
        self.distance = Some(distance.into());
        self
    }

    pub fn with_max_participants(mut self, max: i64) -> Self {
        self.max_participants = Some(max);
        self
    }
}

//--------------------------------------    Registration      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registration {
    pub id: RegistrationId,
    pub competition_id: i64,
    pub participation_group_id: Option<i64>,
    /// The member who registered. Guest registrations have no user id.
    pub user_id: Option<String>,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    /// The name the bank will show on the incoming transfer
    pub depositor_name: String,
    pub distance: Option<String>,
    pub entry_fee: Won,
    pub payment_status: PaymentStatus,
    #[serde(skip)]
    pub guest_password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRegistration {
    /// Leave empty to have an id generated on insert
    pub id: Option<RegistrationId>,
    pub competition_id: i64,
    pub participation_group_id: Option<i64>,
    pub user_id: Option<String>,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub depositor_name: String,
    /// Taken from the participation group when not given
    pub distance: Option<String>,
    /// Taken from the participation group when not given
    pub entry_fee: Option<Won>,
    pub guest_password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewRegistration {
    /// A registration where the depositor is the registrant. Use [`Self::with_depositor`] when somebody else pays.
    pub fn new<S: Into<String>>(competition_id: i64, name: S, phone: S) -> Self {
        let name = name.into();
        Self {
            id: None,
            competition_id,
            participation_group_id: None,
            user_id: None,
            depositor_name: name.clone(),
            name,
            phone: phone.into(),
            email: None,
            distance: None,
            entry_fee: None,
            guest_password_hash: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_id<I: Into<RegistrationId>>(mut self, id: I) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_group(mut self, group_id: i64) -> Self {
        self.participation_group_id = Some(group_id);
        self
    }

    pub fn with_user<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_depositor<S: Into<String>>(mut self, depositor_name: S) -> Self {
        self.depositor_name = depositor_name.into();
        self
    }

    pub fn with_distance<S: Into<String>>(mut self, distance: S) -> Self {
        self.distance = Some(distance.into());
        self
    }

    pub fn with_entry_fee(mut self, fee: Won) -> Self {
        self.entry_fee = Some(fee);
        self
    }

    /// Guest (non-member) registrations are looked up again with the registrant's name and this password.
    pub fn with_guest_password(mut self, password: &str) -> Self {
        self.guest_password_hash = Some(hash_guest_password(password));
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

//--------------------------------------  ReconciliationView  ---------------------------------------------------------
/// A registration joined with its competition and participation group.
///
/// The joined columns are optional since the referenced rows are not guaranteed to exist (e.g. after an admin deletes
/// a participation group). Use the accessor methods to get the documented fallback values.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconciliationView {
    pub id: RegistrationId,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub depositor_name: String,
    pub distance: Option<String>,
    pub entry_fee: Won,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub competition_title: Option<String>,
    pub competition_date: Option<DateTime<Utc>>,
    pub competition_location: Option<String>,
    pub group_name: Option<String>,
    pub group_distance: Option<String>,
}

pub const FALLBACK_COMPETITION_TITLE: &str = "대회";
pub const FALLBACK_GROUP_NAME: &str = "일반부";

impl ReconciliationView {
    /// `"{competition title} {group name}"`, using `대회` and `일반부` for missing parts.
    pub fn product_name(&self) -> String {
        let title = self.competition_title.as_deref().unwrap_or(FALLBACK_COMPETITION_TITLE);
        let group = self.group_name.as_deref().unwrap_or(FALLBACK_GROUP_NAME);
        format!("{title} {group}")
    }

    /// The participation group's distance, falling back to the distance recorded on the registration itself.
    pub fn resolved_distance(&self) -> Option<&str> {
        self.group_distance.as_deref().or(self.distance.as_deref())
    }
}

//--------------------------------------  ParticipantCount    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantCount {
    pub current: i64,
    pub max: Option<i64>,
}

impl ParticipantCount {
    pub fn is_full(&self) -> bool {
        self.max.map(|m| self.current >= m).unwrap_or(false)
    }

    /// `None` when the count is uncapped
    pub fn remaining(&self) -> Option<i64> {
        self.max.map(|m| (m - self.current).max(0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCapacity {
    pub group_id: i64,
    pub name: String,
    pub count: ParticipantCount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionCapacity {
    pub competition_id: i64,
    pub count: ParticipantCount,
    pub groups: Vec<GroupCapacity>,
}
