use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    #[default]
    OneTime,
    Monthly,
    Yearly,
}

impl BillingPeriod {
    pub const fn code(&self) -> &'static str {
        match self {
            BillingPeriod::OneTime => "one_time",
            BillingPeriod::Monthly => "monthly",
            BillingPeriod::Yearly => "yearly",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "one_time" => Some(BillingPeriod::OneTime),
            "monthly" => Some(BillingPeriod::Monthly),
            "yearly" => Some(BillingPeriod::Yearly),
            _ => None,
        }
    }
}

impl FromStr for BillingPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        BillingPeriod::from_code(s.trim()).ok_or_else(|| {
            AppError::bad_request("billingPeriod must be one of: one_time, monthly, yearly")
        })
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
