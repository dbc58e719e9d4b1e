//! Week-relative availability lookup.
//!
//! An employee who has stored nothing for a week is treated as available
//! every day, so people who never filled in the form stay schedulable.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use shiftdesk_models::ids::{BusinessId, UserId};
use shiftdesk_models::schedule::{AvailabilityRecord, DayCode};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AvailabilityIndex {
    week_start: NaiveDate,
    /// Users with at least one in-window record, mapped to their available days.
    days: HashMap<UserId, BTreeSet<DayCode>>,
}

impl AvailabilityIndex {
    /// Indexes the records of one business and week. Records for another
    /// business or week are skipped, as are dates outside the seven-day
    /// window starting at `week_start`.
    pub fn build(
        business_id: BusinessId,
        week_start: NaiveDate,
        records: &[AvailabilityRecord],
    ) -> Self {
        let mut days: HashMap<UserId, BTreeSet<DayCode>> = HashMap::new();

        for record in records
            .iter()
            .filter(|r| r.business_id == business_id && r.week_start == week_start)
        {
            let Some(day) = DayCode::for_date(week_start, record.date) else {
                warn!(
                    user_id = %record.user_id,
                    date = %record.date,
                    week_start = %week_start,
                    "Ignoring availability record outside its week"
                );
                continue;
            };

            let entry = days.entry(record.user_id).or_default();
            if record.available {
                entry.insert(day);
            }
        }

        Self { week_start, days }
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    pub fn has_records(&self, user_id: UserId) -> bool {
        self.days.contains_key(&user_id)
    }

    pub fn available_days(&self, user_id: UserId) -> BTreeSet<DayCode> {
        match self.days.get(&user_id) {
            Some(days) => days.clone(),
            None => DayCode::ALL.into_iter().collect(),
        }
    }
}
