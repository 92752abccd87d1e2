use kernel::error::app_error::{AppError, AppResult};

/// Length of the revenue window in months, 1..=24
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsMonths(u8);

impl AnalyticsMonths {
    pub const DEFAULT: u8 = 6;
    pub const MAX: u8 = 24;

    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(Self(Self::DEFAULT));
        };
        raw.parse::<u8>()
            .ok()
            .filter(|m| (1..=Self::MAX).contains(m))
            .map(Self)
            .ok_or_else(|| {
                AppError::bad_request(format!("months must be between 1 and {}", Self::MAX))
            })
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for AnalyticsMonths {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}
