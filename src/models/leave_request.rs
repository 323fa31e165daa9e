//! Leave request history records.
//!
//! Requests are read from an append-mostly ledger. Each one draws from the
//! allocation of its quota year, which may differ from the calendar year in
//! which the leave is actually taken.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The quota year as stored, before validation.
///
/// Legacy rows sometimes hold the year as text. Anything else is kept as-is
/// so one bad row cannot make the whole history unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawQuotaYear {
    /// A numeric year.
    Year(i32),
    /// A textual year, valid only if it parses as an integer.
    Text(String),
    /// Any other JSON value, never a valid year.
    Other(serde_json::Value),
}

/// A historical leave request transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRow {
    /// Optional identifier of the request, used in diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The employee who requested leave.
    pub employee_id: String,
    /// The leave type drawn from.
    pub leave_type_id: String,
    /// Number of days requested.
    pub days_requested: i32,
    /// The quota year the request draws from. Null on legacy rows.
    #[serde(default)]
    pub leave_quota_year: Option<RawQuotaYear>,
    /// The first day of leave.
    pub start_date: NaiveDate,
}

impl RequestRow {
    /// Resolves the quota year the request is deducted from.
    ///
    /// A missing quota year falls back to the calendar year of `start_date`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` if the stored quota year is not numeric.
    ///
    /// # Examples
    ///
    /// ```
    /// use leave_engine::models::{RawQuotaYear, RequestRow};
    /// use chrono::NaiveDate;
    ///
    /// let mut request = RequestRow {
    ///     id: None,
    ///     employee_id: "emp_001".to_string(),
    ///     leave_type_id: "annual".to_string(),
    ///     days_requested: 2,
    ///     leave_quota_year: None,
    ///     start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
    /// };
    /// assert_eq!(request.quota_year().unwrap(), 2025);
    ///
    /// request.leave_quota_year = Some(RawQuotaYear::Text("2024".to_string()));
    /// assert_eq!(request.quota_year().unwrap(), 2024);
    /// ```
    pub fn quota_year(&self) -> EngineResult<i32> {
        match &self.leave_quota_year {
            None => Ok(self.start_date.year()),
            Some(RawQuotaYear::Year(year)) => Ok(*year),
            Some(RawQuotaYear::Text(text)) => {
                text.trim()
                    .parse::<i32>()
                    .map_err(|_| EngineError::MalformedRecord {
                        record: self.describe(),
                        message: format!("leave_quota_year '{}' is not a number", text),
                    })
            }
            Some(RawQuotaYear::Other(value)) => Err(EngineError::MalformedRecord {
                record: self.describe(),
                message: format!("leave_quota_year {} is not a year", value),
            }),
        }
    }

    /// Returns the requested days after validating they are not negative.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` for a negative day count.
    pub fn validated_days(&self) -> EngineResult<i32> {
        if self.days_requested < 0 {
            return Err(EngineError::MalformedRecord {
                record: self.describe(),
                message: format!("days_requested is negative ({})", self.days_requested),
            });
        }
        Ok(self.days_requested)
    }

    /// A human-readable identifier for diagnostics.
    pub fn describe(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!(
                "{}/{}/{}",
                self.employee_id, self.leave_type_id, self.start_date
            ),
        }
    }
}
