//! Leave type policy records.
//!
//! A [`LeaveType`] carries the policy that governs how a balance is derived:
//! its default yearly allocation and whether unused days may be deferred.

use serde::{Deserialize, Serialize};

/// A leave type policy record from the catalog.
///
/// Immutable for the duration of a computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveType {
    /// Unique identifier for the leave type.
    pub id: String,
    /// Human-readable name (e.g., "Annual Leave").
    pub name: String,
    /// Days allocated per year when no employee-specific override exists.
    pub default_days: i32,
    /// Whether unused days may be carried into the following year.
    #[serde(default)]
    pub can_defer: bool,
    /// Display-only upper bound. Never applied as a ceiling on balances.
    #[serde(default)]
    pub max_days: Option<i32>,
}

impl LeaveType {
    /// Finds a leave type by id in a catalog listing.
    ///
    /// # Examples
    ///
    /// ```
    /// use leave_engine::models::LeaveType;
    ///
    /// let types = vec![LeaveType {
    ///     id: "annual".to_string(),
    ///     name: "Annual Leave".to_string(),
    ///     default_days: 12,
    ///     can_defer: true,
    ///     max_days: None,
    /// }];
    /// assert!(LeaveType::find(&types, "annual").is_some());
    /// assert!(LeaveType::find(&types, "sick").is_none());
    /// ```
    pub fn find<'a>(types: &'a [LeaveType], id: &str) -> Option<&'a LeaveType> {
        types.iter().find(|t| t.id == id)
    }
}
