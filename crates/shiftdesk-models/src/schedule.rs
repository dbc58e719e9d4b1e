//! Scheduling domain types: day codes, shift slots, availability and shifts.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{BusinessId, ShiftId, ShiftSlotId, UserId};

// =============================================================================
// Day codes
// =============================================================================

/// Day within a schedule week, counted from the week's start date.
///
/// `Mon` is offset 0 from `week_start` whatever weekday that date falls on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum DayCode {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayCode {
    pub const ALL: [DayCode; 7] = [
        DayCode::Mon,
        DayCode::Tue,
        DayCode::Wed,
        DayCode::Thu,
        DayCode::Fri,
        DayCode::Sat,
        DayCode::Sun,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DayCode::Mon => "mon",
            DayCode::Tue => "tue",
            DayCode::Wed => "wed",
            DayCode::Thu => "thu",
            DayCode::Fri => "fri",
            DayCode::Sat => "sat",
            DayCode::Sun => "sun",
        }
    }

    pub const fn offset(self) -> i64 {
        self as i64
    }

    /// Day code for a day offset inside the week, `None` outside `0..=6`.
    pub fn from_offset(offset: i64) -> Option<DayCode> {
        usize::try_from(offset)
            .ok()
            .and_then(|i| DayCode::ALL.get(i).copied())
    }

    /// Day code of `date` in the week starting at `week_start`.
    pub fn for_date(week_start: NaiveDate, date: NaiveDate) -> Option<DayCode> {
        DayCode::from_offset((date - week_start).num_days())
    }

    pub fn date_in_week(self, week_start: NaiveDate) -> NaiveDate {
        week_start + Duration::days(self.offset())
    }
}

impl fmt::Display for DayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayCode::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown day code '{}'", s))
    }
}

/// Calendar date of every day code in a week.
pub fn week_days(week_start: NaiveDate) -> BTreeMap<DayCode, NaiveDate> {
    DayCode::ALL
        .into_iter()
        .map(|d| (d, d.date_in_week(week_start)))
        .collect()
}

// =============================================================================
// Clock time
// =============================================================================

/// Wall-clock time of day, accepted as `HH:MM` or `HH:MM:SS`.
///
/// Both spellings of the same instant compare equal, which is what shift to
/// slot matching relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema)]
#[schema(value_type = String, example = "09:00")]
pub struct ClockTime(pub NaiveTime);

impl ClockTime {
    pub fn hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(ClockTime)
    }
}

impl FromStr for ClockTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .map(ClockTime)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use chrono::Timelike;
        if self.0.second() == 0 {
            write!(f, "{}", self.0.format("%H:%M"))
        } else {
            write!(f, "{}", self.0.format("%H:%M:%S"))
        }
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(t: NaiveTime) -> Self {
        ClockTime(t)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Slots, availability, shifts
// =============================================================================

/// A recurring staffing requirement, independent of any particular week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShiftSlot {
    pub id: ShiftSlotId,
    pub business_id: BusinessId,
    pub day_of_week: DayCode,
    pub slot_name: String,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub required_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityRecord {
    pub business_id: BusinessId,
    pub user_id: UserId,
    pub week_start: NaiveDate,
    pub date: NaiveDate,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityEntry {
    pub date: NaiveDate,
    pub available: bool,
}

/// Shift as produced by a proposer, before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProposedShift {
    pub employee_id: UserId,
    pub day: DayCode,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PersistedShift {
    pub id: ShiftId,
    pub business_id: BusinessId,
    pub week_start: NaiveDate,
    pub employee_id: UserId,
    pub day: DayCode,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

/// Common view over proposed and persisted shifts.
pub trait ShiftTiming {
    fn employee_id(&self) -> UserId;
    fn day(&self) -> DayCode;
    fn start_time(&self) -> ClockTime;
    fn end_time(&self) -> ClockTime;
}

impl ShiftTiming for ProposedShift {
    fn employee_id(&self) -> UserId {
        self.employee_id
    }
    fn day(&self) -> DayCode {
        self.day
    }
    fn start_time(&self) -> ClockTime {
        self.start_time
    }
    fn end_time(&self) -> ClockTime {
        self.end_time
    }
}

impl ShiftTiming for PersistedShift {
    fn employee_id(&self) -> UserId {
        self.employee_id
    }
    fn day(&self) -> DayCode {
        self.day
    }
    fn start_time(&self) -> ClockTime {
        self.start_time
    }
    fn end_time(&self) -> ClockTime {
        self.end_time
    }
}

/// An employee together with the days they can work in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeAvailability {
    pub id: UserId,
    pub full_name: Option<String>,
    pub availability: BTreeSet<DayCode>,
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SlotCoverage {
    pub required: u32,
    pub scheduled: u32,
    pub coverage_pct: f64,
    /// `"{start}-{end}"` of the slot.
    pub slot_times: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DayCoverage {
    pub required: u32,
    pub scheduled: u32,
    pub coverage_pct: f64,
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateShiftSlotDto {
    pub day_of_week: DayCode,
    #[validate(length(
        min = 1,
        max = 64,
        message = "Slot name must be between 1 and 64 characters"
    ))]
    pub slot_name: String,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[validate(range(min = 1, message = "Required count must be at least 1"))]
    pub required_count: u32,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateShiftSlotDto {
    pub day_of_week: Option<DayCode>,
    #[validate(length(
        min = 1,
        max = 64,
        message = "Slot name must be between 1 and 64 characters"
    ))]
    pub slot_name: Option<String>,
    pub start_time: Option<ClockTime>,
    pub end_time: Option<ClockTime>,
    #[validate(range(min = 1, message = "Required count must be at least 1"))]
    pub required_count: Option<u32>,
}

impl UpdateShiftSlotDto {
    pub fn apply(self, slot: &ShiftSlot) -> ShiftSlot {
        ShiftSlot {
            id: slot.id,
            business_id: slot.business_id,
            day_of_week: self.day_of_week.unwrap_or(slot.day_of_week),
            slot_name: self.slot_name.unwrap_or_else(|| slot.slot_name.clone()),
            start_time: self.start_time.unwrap_or(slot.start_time),
            end_time: self.end_time.unwrap_or(slot.end_time),
            required_count: self.required_count.unwrap_or(slot.required_count),
        }
    }
}

/// A proposed week of shifts, for validation or submission.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ScheduleProposalDto {
    pub week_start: NaiveDate,
    #[validate(length(max = 1000, message = "Too many shifts in one proposal"))]
    pub shifts: Vec<ProposedShift>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetAvailabilityDto {
    pub week_start: NaiveDate,
    #[validate(length(max = 7, message = "At most one entry per day of the week"))]
    pub entries: Vec<AvailabilityEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleSubmissionResponse {
    pub message: String,
    pub shifts_created: usize,
    pub coverage: BTreeMap<String, SlotCoverage>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeekCoverageResponse {
    pub week_start: NaiveDate,
    pub slots: BTreeMap<String, SlotCoverage>,
    #[schema(value_type = BTreeMap<String, DayCoverage>)]
    pub days: BTreeMap<DayCode, DayCoverage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    pub user_id: UserId,
    pub week_start: NaiveDate,
    pub entries: Vec<AvailabilityEntry>,
    pub available_days: BTreeSet<DayCode>,
}
