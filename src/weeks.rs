use tracing::warn;

use crate::client::ApiClient;
use crate::models::{MAX_WEEK, MIN_WEEK};
use crate::service;

/// Known week numbers, used only as a hint for the plan form. Refreshing is
/// best effort: a failed refresh keeps whatever was known before.
#[derive(Debug, Clone, Default)]
pub struct WeekValidation {
    existing_weeks: Vec<i64>,
}

impl WeekValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_weeks(weeks: impl IntoIterator<Item = i64>) -> Self {
        Self {
            existing_weeks: weeks.into_iter().collect(),
        }
    }

    pub fn existing_weeks(&self) -> &[i64] {
        &self.existing_weeks
    }

    /// Returns whether the refresh succeeded. Errors are logged, never returned.
    pub async fn refetch_weeks(&mut self, client: &ApiClient) -> bool {
        match service::get_all(client).await {
            Ok(records) => {
                self.existing_weeks = records.iter().map(|record| record.week_number).collect();
                true
            }
            Err(err) => {
                warn!(error = %err, "could not refresh existing weeks");
                false
            }
        }
    }

    /// `max + 1`, wrapping to week 1 past the end of the year. Gaps are not
    /// filled: {1, 2, 3, 5} suggests 6.
    pub fn next_available_week(&self) -> i64 {
        self.existing_weeks
            .iter()
            .max()
            .and_then(|max| max.checked_add(1))
            .filter(|week| *week <= MAX_WEEK)
            .unwrap_or(MIN_WEEK)
    }

    pub fn is_week_exists(&self, week: i64) -> bool {
        self.existing_weeks.contains(&week)
    }
}
