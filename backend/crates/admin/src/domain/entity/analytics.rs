//! BI analytics series

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::Serialize;

/// First day of a calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// `YYYY-MM`
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// The `count` months ending with the month of `now`, oldest first
    pub fn window(now: DateTime<Utc>, count: u8) -> Vec<YearMonth> {
        let Some(current) = YearMonth::of(now).first_day() else {
            return Vec::new();
        };
        (0..u32::from(count))
            .rev()
            .filter_map(|back| current.checked_sub_months(Months::new(back)))
            .map(|d| YearMonth {
                year: d.year(),
                month: d.month(),
            })
            .collect()
    }
}

/// Paid revenue for one month, summed by `paid_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: i64,
    pub invoices: u64,
}

/// Paid totals as stored, one entry per month that had payments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueBucket {
    pub month: YearMonth,
    pub revenue: i64,
    pub invoices: u64,
}

/// Fill the window with zero months where nothing was paid
pub fn revenue_series(window: &[YearMonth], buckets: &[RevenueBucket]) -> Vec<MonthlyRevenue> {
    window
        .iter()
        .map(|month| {
            let bucket = buckets.iter().find(|b| b.month == *month);
            MonthlyRevenue {
                month: month.label(),
                revenue: bucket.map_or(0, |b| b.revenue),
                invoices: bucket.map_or(0, |b| b.invoices),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// One entry per known status, in `statuses` order, zero when absent
pub fn distribution<'a>(
    statuses: impl IntoIterator<Item = &'a str>,
    counts: &[(String, u64)],
) -> Vec<StatusCount> {
    statuses
        .into_iter()
        .map(|status| StatusCount {
            status: status.to_string(),
            count: counts
                .iter()
                .find(|(s, _)| s == status)
                .map_or(0, |(_, c)| *c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_window_crosses_year_boundary() {
        let months = YearMonth::window(at(2024, 2, 29), 4);
        let labels: Vec<_> = months.iter().map(YearMonth::label).collect();
        assert_eq!(labels, ["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_window_of_one_is_current_month() {
        let months = YearMonth::window(at(2024, 7, 31), 1);
        assert_eq!(months, [YearMonth { year: 2024, month: 7 }]);
    }

    #[test]
    fn test_revenue_series_fills_gaps() {
        let window = YearMonth::window(at(2024, 3, 1), 3);
        let buckets = [RevenueBucket {
            month: YearMonth { year: 2024, month: 2 },
            revenue: 5_000_000,
            invoices: 2,
        }];
        let series = revenue_series(&window, &buckets);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].revenue, 0);
        assert_eq!(series[1].month, "2024-02");
        assert_eq!(series[1].revenue, 5_000_000);
        assert_eq!(series[1].invoices, 2);
        assert_eq!(series[2].revenue, 0);
    }

    #[test]
    fn test_distribution_lists_every_status() {
        let counts = vec![("open".to_string(), 3), ("closed".to_string(), 1)];
        let dist = distribution(["open", "in_progress", "resolved", "closed"], &counts);
        let pairs: Vec<_> = dist.iter().map(|d| (d.status.as_str(), d.count)).collect();
        assert_eq!(
            pairs,
            [("open", 3), ("in_progress", 0), ("resolved", 0), ("closed", 1)]
        );
    }
}
