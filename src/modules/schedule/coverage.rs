//! Staffing coverage of a week against its shift slots.

use std::collections::{BTreeMap, HashMap};

use shiftdesk_models::schedule::{
    ClockTime, DayCode, DayCoverage, ShiftSlot, ShiftTiming, SlotCoverage,
};

/// Scheduled headcount as a percentage of the required headcount, rounded to
/// one decimal. Not capped, so over-staffing shows up above 100.
pub fn coverage_pct(scheduled: u32, required: u32) -> f64 {
    if required == 0 {
        return 100.0;
    }
    (f64::from(scheduled) / f64::from(required) * 1000.0).round() / 10.0
}

/// Coverage per slot. A shift fills a slot when day, start and end all match
/// exactly.
///
/// Keys look like `fri-morning-09:00-13:00`. When two slots would share a
/// key, the one with the lowest id keeps it and the others get their slot id
/// appended, whatever order the slots arrive in.
pub fn slot_coverage<S: ShiftTiming>(
    shifts: &[S],
    slots: &[ShiftSlot],
) -> BTreeMap<String, SlotCoverage> {
    let mut counts: HashMap<(DayCode, ClockTime, ClockTime), u32> = HashMap::new();
    for shift in shifts {
        *counts
            .entry((shift.day(), shift.start_time(), shift.end_time()))
            .or_default() += 1;
    }

    let mut ordered: Vec<&ShiftSlot> = slots.iter().collect();
    ordered.sort_by_key(|s| s.id);

    let mut coverage = BTreeMap::new();
    for slot in ordered {
        let scheduled = counts
            .get(&(slot.day_of_week, slot.start_time, slot.end_time))
            .copied()
            .unwrap_or(0);

        let mut key = format!(
            "{}-{}-{}-{}",
            slot.day_of_week, slot.slot_name, slot.start_time, slot.end_time
        );
        if coverage.contains_key(&key) {
            key = format!("{}-{}", key, slot.id);
        }

        coverage.insert(
            key,
            SlotCoverage {
                required: slot.required_count,
                scheduled,
                coverage_pct: coverage_pct(scheduled, slot.required_count),
                slot_times: format!("{}-{}", slot.start_time, slot.end_time),
            },
        );
    }

    coverage
}

/// Total required headcount per day against the number of shifts that day.
/// Days with neither slots nor shifts are left out.
pub fn day_coverage<S: ShiftTiming>(
    shifts: &[S],
    slots: &[ShiftSlot],
) -> BTreeMap<DayCode, DayCoverage> {
    let mut totals: BTreeMap<DayCode, (u32, u32)> = BTreeMap::new();
    for slot in slots {
        let required = &mut totals.entry(slot.day_of_week).or_default().0;
        *required = required.saturating_add(slot.required_count);
    }
    for shift in shifts {
        totals.entry(shift.day()).or_default().1 += 1;
    }

    totals
        .into_iter()
        .map(|(day, (required, scheduled))| {
            (
                day,
                DayCoverage {
                    required,
                    scheduled,
                    coverage_pct: coverage_pct(scheduled, required),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shiftdesk_models::ids::{BusinessId, ShiftSlotId, UserId};
    use shiftdesk_models::schedule::ProposedShift;

    fn time(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    fn slot(id: u128, day: DayCode, name: &str, start: &str, end: &str, required: u32) -> ShiftSlot {
        ShiftSlot {
            id: ShiftSlotId::from_u128(id),
            business_id: BusinessId::from_u128(1),
            day_of_week: day,
            slot_name: name.to_string(),
            start_time: time(start),
            end_time: time(end),
            required_count: required,
        }
    }

    fn shifts(n: u128, day: DayCode, start: &str, end: &str) -> Vec<ProposedShift> {
        (0..n)
            .map(|i| ProposedShift {
                employee_id: UserId::from_u128(100 + i),
                day,
                start_time: time(start),
                end_time: time(end),
            })
            .collect()
    }

    fn friday_morning(required: u32, scheduled: u128) -> SlotCoverage {
        let report = slot_coverage(
            &shifts(scheduled, DayCode::Fri, "09:00", "13:00"),
            &[slot(1, DayCode::Fri, "morning", "09:00", "13:00", required)],
        );
        report["fri-morning-09:00-13:00"].clone()
    }

    #[test]
    fn test_percentage_follows_headcount() {
        assert_eq!(friday_morning(2, 2).coverage_pct, 100.0);
        assert_eq!(friday_morning(2, 1).coverage_pct, 50.0);
        assert_eq!(friday_morning(0, 0).coverage_pct, 100.0);
        assert_eq!(friday_morning(2, 3).coverage_pct, 150.0);
    }

    #[test]
    fn test_percentage_rounds_to_one_decimal() {
        assert_eq!(coverage_pct(1, 3), 33.3);
        assert_eq!(coverage_pct(2, 3), 66.7);
    }

    #[test]
    fn test_slot_times_and_counts_are_reported() {
        let cov = friday_morning(2, 1);
        assert_eq!(cov.required, 2);
        assert_eq!(cov.scheduled, 1);
        assert_eq!(cov.slot_times, "09:00-13:00");
    }

    #[test]
    fn test_seconds_in_times_still_match() {
        let report = slot_coverage(
            &shifts(1, DayCode::Fri, "09:00:00", "13:00:00"),
            &[slot(1, DayCode::Fri, "morning", "09:00", "13:00", 1)],
        );
        assert_eq!(report["fri-morning-09:00-13:00"].scheduled, 1);
    }

    #[test]
    fn test_shifts_on_other_days_or_times_do_not_count() {
        let mut proposed = shifts(1, DayCode::Thu, "09:00", "13:00");
        proposed.extend(shifts(1, DayCode::Fri, "09:00", "14:00"));
        let report = slot_coverage(
            &proposed,
            &[slot(1, DayCode::Fri, "morning", "09:00", "13:00", 1)],
        );
        assert_eq!(report["fri-morning-09:00-13:00"].scheduled, 0);
        assert_eq!(report["fri-morning-09:00-13:00"].coverage_pct, 0.0);
    }

    #[test]
    fn test_colliding_keys_stay_distinct() {
        let report = slot_coverage::<ProposedShift>(
            &[],
            &[
                slot(1, DayCode::Mon, "open", "08:00", "12:00", 1),
                slot(2, DayCode::Mon, "open", "08:00", "12:00", 2),
            ],
        );
        assert_eq!(report.len(), 2);
        let suffixed = format!("mon-open-08:00-12:00-{}", ShiftSlotId::from_u128(2));
        assert_eq!(report[&suffixed].required, 2);
    }

    #[test]
    fn test_colliding_keys_do_not_depend_on_slot_order() {
        let first = slot(1, DayCode::Mon, "open", "08:00", "12:00", 5);
        let second = slot(2, DayCode::Mon, "open", "08:00", "12:00", 1);

        let forward = slot_coverage::<ProposedShift>(&[], &[first.clone(), second.clone()]);
        let reversed = slot_coverage::<ProposedShift>(&[], &[second, first]);

        assert_eq!(forward, reversed);
        assert_eq!(forward["mon-open-08:00-12:00"].required, 5);
    }

    #[test]
    fn test_day_totals_saturate_instead_of_overflowing() {
        let huge = u32::MAX / 2;
        let report = day_coverage::<ProposedShift>(
            &[],
            &[
                slot(1, DayCode::Mon, "a", "08:00", "12:00", huge),
                slot(2, DayCode::Mon, "b", "12:00", "16:00", huge),
                slot(3, DayCode::Mon, "c", "16:00", "20:00", huge),
            ],
        );
        assert_eq!(report[&DayCode::Mon].required, u32::MAX);
        assert_eq!(report[&DayCode::Mon].coverage_pct, 0.0);
    }

    #[test]
    fn test_day_coverage_sums_slots_per_day() {
        let mut proposed = shifts(3, DayCode::Mon, "08:00", "12:00");
        proposed.extend(shifts(1, DayCode::Sat, "10:00", "14:00"));
        let report = day_coverage(
            &proposed,
            &[
                slot(1, DayCode::Mon, "open", "08:00", "12:00", 2),
                slot(2, DayCode::Mon, "close", "12:00", "20:00", 2),
                slot(3, DayCode::Tue, "open", "08:00", "12:00", 1),
            ],
        );

        assert_eq!(report[&DayCode::Mon].required, 4);
        assert_eq!(report[&DayCode::Mon].scheduled, 3);
        assert_eq!(report[&DayCode::Mon].coverage_pct, 75.0);
        assert_eq!(report[&DayCode::Tue].coverage_pct, 0.0);
        assert_eq!(report[&DayCode::Sat].coverage_pct, 100.0);
        assert!(!report.contains_key(&DayCode::Sun));
    }
}
