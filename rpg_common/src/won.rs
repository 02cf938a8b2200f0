use std::{
    fmt::Display,
    iter::Sum,
    ops::Add,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const KRW_CURRENCY_CODE: &str = "KRW";

//--------------------------------------        Won          ---------------------------------------------------------
/// An amount of Korean won. Entry fees and transfer amounts are always whole won.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Won(i64);

op!(binary Won, Add, add);
op!(binary Won, Sub, sub);
op!(inplace Won, AddAssign, add_assign);
op!(inplace Won, SubAssign, sub_assign);
op!(unary Won, Neg, neg);

impl Sum for Won {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in won: {0}")]
pub struct WonConversionError(String);

impl From<i64> for Won {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for Won {
    type Error = WonConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        i64::try_from(value).map(Self).map_err(|_| WonConversionError(format!("{value} is too large")))
    }
}

impl FromStr for Won {
    type Err = WonConversionError;

    /// Accepts plain integers as well as amounts with thousands separators, e.g. `30,000`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_end_matches('원').replace(',', "");
        digits.parse::<i64>().map(Self).map_err(|e| WonConversionError(format!("{s}: {e}")))
    }
}

impl Display for Won {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}원", self.to_grouped_string())
    }
}

impl Won {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// The amount with thousands separators and no currency suffix, e.g. `1,250,000`.
    pub fn to_grouped_string(&self) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if self.0 < 0 {
            grouped.push('-');
        }
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        grouped
    }
}
