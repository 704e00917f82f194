// src/capacity.rs
//
// Interval-overlap arithmetic and capacity accounting for bookings.
// Kept free of sqlx so the invariants are plain unit-testable.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// A booking window that holds capacity: half-open [start_at, end_at).
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub quantity: i32,
}

/// Half-open interval intersection. Touching endpoints do not overlap:
/// a 10:00–12:00 booking leaves 12:00–14:00 free.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Sum of quantities of windows overlapping [start, end).
pub fn booked_during(windows: &[Window], start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    windows
        .iter()
        .filter(|w| overlaps(w.start_at, w.end_at, start, end))
        .map(|w| w.quantity as i64)
        .sum()
}

/// Units of capacity still free over [start, end), floored at zero.
pub fn remaining(capacity: i32, windows: &[Window], start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (capacity as i64 - booked_during(windows, start, end)).max(0)
}

/// UTC instant at midnight opening calendar day `day`.
pub fn day_start(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap())
}

/// Per-day booked counts for the inclusive date range [from, to]:
/// a window counts on day `d` iff it overlaps [d 00:00, d+1 00:00) UTC.
/// Feeds the availability_days materialization.
pub fn day_tally(windows: &[Window], from: NaiveDate, to: NaiveDate) -> Vec<(NaiveDate, i64)> {
    let mut out = Vec::new();
    let mut day = from;
    while day <= to {
        let next = day.succ_opt().unwrap();
        out.push((day, booked_during(windows, day_start(day), day_start(next))));
        day = next;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2025, 6, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        )
    }

    fn w(start: DateTime<Utc>, end: DateTime<Utc>, quantity: i32) -> Window {
        Window { start_at: start, end_at: end, quantity }
    }

    #[test]
    fn overlap_classification() {
        let (s, e) = (t(1, 10), t(1, 12));
        // disjoint before / after
        assert!(!overlaps(t(1, 7), t(1, 9), s, e));
        assert!(!overlaps(t(1, 13), t(1, 15), s, e));
        // touching endpoints: half-open, no overlap
        assert!(!overlaps(t(1, 8), t(1, 10), s, e));
        assert!(!overlaps(t(1, 12), t(1, 14), s, e));
        // partial left / right
        assert!(overlaps(t(1, 9), t(1, 11), s, e));
        assert!(overlaps(t(1, 11), t(1, 13), s, e));
        // fully contains / fully contained
        assert!(overlaps(t(1, 9), t(1, 13), s, e));
        assert!(overlaps(t(1, 10), t(1, 11), s, e));
        // identical
        assert!(overlaps(s, e, s, e));
    }

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (t(1, 7), t(1, 9)),
            (t(1, 9), t(1, 11)),
            (t(1, 10), t(1, 12)),
            (t(1, 11), t(1, 13)),
            (t(1, 9), t(1, 13)),
            (t(1, 12), t(1, 14)),
        ];
        for (a_start, a_end) in cases {
            for (b_start, b_end) in cases {
                assert_eq!(
                    overlaps(a_start, a_end, b_start, b_end),
                    overlaps(b_start, b_end, a_start, a_end),
                );
            }
        }
    }

    #[test]
    fn capacity_one_hall_reference_case() {
        // capacity-1 hall with a confirmed 10:00–12:00 booking
        let existing = [w(t(1, 10), t(1, 12), 1)];
        // 11:00–13:00 must be rejected
        assert_eq!(remaining(1, &existing, t(1, 11), t(1, 13)), 0);
        // 12:00–14:00 must be accepted (end is exclusive)
        assert_eq!(remaining(1, &existing, t(1, 12), t(1, 14)), 1);
    }

    #[test]
    fn quantities_accumulate_across_overlapping_bookings() {
        let existing = [
            w(t(1, 9), t(1, 12), 2),
            w(t(1, 11), t(1, 14), 3),
            w(t(1, 20), t(1, 22), 5), // disjoint, must not count
        ];
        assert_eq!(booked_during(&existing, t(1, 11), t(1, 12)), 5);
        assert_eq!(booked_during(&existing, t(1, 8), t(1, 10)), 2);
        assert_eq!(booked_during(&existing, t(1, 14), t(1, 15)), 0);
        assert_eq!(remaining(10, &existing, t(1, 10), t(1, 13)), 5);
    }

    #[test]
    fn remaining_floors_at_zero() {
        let existing = [w(t(1, 9), t(1, 17), 4)];
        assert_eq!(remaining(3, &existing, t(1, 10), t(1, 11)), 0);
    }

    #[test]
    fn day_tally_walks_calendar_days() {
        // 2-unit stay spanning the night of the 1st into the 3rd
        let windows = [w(t(1, 15), t(3, 11), 2), w(t(2, 10), t(2, 12), 1)];
        let from = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let tally = day_tally(&windows, from, to);
        assert_eq!(
            tally,
            vec![
                (NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), 2),
                (NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(), 3),
                (NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(), 2),
                (NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(), 0),
            ]
        );
    }

    #[test]
    fn checkout_at_midnight_does_not_spill_into_next_day() {
        let windows = [w(t(1, 0), t(2, 0), 1)];
        let from = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert_eq!(
            day_tally(&windows, from, to),
            vec![
                (NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), 1),
                (NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(), 0),
            ]
        );
    }

    #[test]
    fn day_tally_single_day_range() {
        let from = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let tally = day_tally(&[w(t(2, 9), t(2, 10), 7)], from, from);
        assert_eq!(tally, vec![(from, 7)]);
    }
}
