//! Hard-constraint checks for a proposed schedule.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use shiftdesk_models::ids::UserId;
use shiftdesk_models::schedule::{DayCode, EmployeeAvailability, ShiftTiming, ValidationReport};

/// Checks every shift for double booking and availability.
///
/// Evaluation never stops early: errors are collected for every shift, in
/// the order the shifts were given. An employee id missing from `employees`
/// has no availability at all.
pub fn validate_schedule<S: ShiftTiming>(
    shifts: &[S],
    employees: &[EmployeeAvailability],
) -> ValidationReport {
    let by_id: HashMap<UserId, &EmployeeAvailability> =
        employees.iter().map(|e| (e.id, e)).collect();
    let mut assigned: BTreeMap<DayCode, BTreeSet<UserId>> = BTreeMap::new();
    let mut errors = Vec::new();

    for shift in shifts {
        let day = shift.day();
        let employee_id = shift.employee_id();

        if !assigned.entry(day).or_default().insert(employee_id) {
            errors.push(format!("Employee {} scheduled twice on {}", employee_id, day));
        }

        let employee = by_id.get(&employee_id);
        let available = employee.is_some_and(|e| e.availability.contains(&day));
        if !available {
            let name = employee
                .and_then(|e| e.full_name.as_deref())
                .unwrap_or("Unknown");
            errors.push(format!(
                "Employee {} ({}) not available on {}",
                employee_id, name, day
            ));
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shiftdesk_models::schedule::{ClockTime, ProposedShift};

    const ALICE: UserId = UserId::from_u128(10);
    const BOB: UserId = UserId::from_u128(11);

    fn shift(employee_id: UserId, day: DayCode) -> ProposedShift {
        ProposedShift {
            employee_id,
            day,
            start_time: ClockTime::hm(9, 0).unwrap(),
            end_time: ClockTime::hm(17, 0).unwrap(),
        }
    }

    fn employee(id: UserId, name: &str, days: &[DayCode]) -> EmployeeAvailability {
        EmployeeAvailability {
            id,
            full_name: Some(name.to_string()),
            availability: days.iter().copied().collect(),
        }
    }

    #[test]
    fn test_clean_schedule_is_valid() {
        let report = validate_schedule(
            &[shift(ALICE, DayCode::Mon), shift(BOB, DayCode::Mon)],
            &[
                employee(ALICE, "Alice", &DayCode::ALL),
                employee(BOB, "Bob", &[DayCode::Mon]),
            ],
        );
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_double_booking_is_reported_once() {
        let report = validate_schedule(
            &[shift(ALICE, DayCode::Mon), shift(ALICE, DayCode::Mon)],
            &[employee(ALICE, "Alice", &DayCode::ALL)],
        );
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![format!("Employee {} scheduled twice on mon", ALICE)]
        );
    }

    #[test]
    fn test_unavailable_day_is_reported_once() {
        let report = validate_schedule(
            &[shift(ALICE, DayCode::Mon)],
            &[employee(ALICE, "Alice", &[DayCode::Tue])],
        );
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![format!("Employee {} (Alice) not available on mon", ALICE)]
        );
    }

    #[test]
    fn test_errors_accumulate_in_shift_order() {
        let report = validate_schedule(
            &[
                shift(BOB, DayCode::Sun),
                shift(ALICE, DayCode::Tue),
                shift(ALICE, DayCode::Tue),
            ],
            &[
                employee(ALICE, "Alice", &[DayCode::Mon]),
                employee(BOB, "Bob", &[DayCode::Mon]),
            ],
        );
        assert_eq!(
            report.errors,
            vec![
                format!("Employee {} (Bob) not available on sun", BOB),
                format!("Employee {} (Alice) not available on tue", ALICE),
                format!("Employee {} scheduled twice on tue", ALICE),
                format!("Employee {} (Alice) not available on tue", ALICE),
            ]
        );
    }

    #[test]
    fn test_unknown_employee_has_no_availability() {
        let stranger = UserId::from_u128(99);
        let report = validate_schedule(&[shift(stranger, DayCode::Fri)], &[]);
        assert_eq!(
            report.errors,
            vec![format!("Employee {} (Unknown) not available on fri", stranger)]
        );
    }

    #[test]
    fn test_same_employee_on_different_days_is_fine() {
        let report = validate_schedule(
            &[shift(ALICE, DayCode::Mon), shift(ALICE, DayCode::Tue)],
            &[employee(ALICE, "Alice", &DayCode::ALL)],
        );
        assert!(report.valid);
    }

    #[test]
    fn test_warnings_serialize_as_empty_array() {
        let report = validate_schedule::<ProposedShift>(&[], &[]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["warnings"], serde_json::json!([]));
        assert_eq!(json["valid"], serde_json::json!(true));
    }
}
