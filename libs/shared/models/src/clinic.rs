use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Singleton clinic configuration row. Absence of this row is an operator
/// error surfaced at startup, not something to paper over per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicSettings {
    pub slot_duration_min: i32,
    pub booking_window_days: i32,
    pub utc_offset_minutes: i32,
}

impl ClinicSettings {
    /// Clinic-local timezone as a fixed UTC offset. The clinic operates in
    /// a single DST-free region, so a fixed offset is exact.
    pub fn clinic_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
    }

    /// UTC bounds [start, end) of the clinic-local calendar day containing
    /// the given instant. Queue scoping and the daily roster both bucket
    /// by this day.
    pub fn clinic_day_bounds(&self, instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let offset = self.clinic_offset();
        let day = instant.with_timezone(&offset).date_naive();
        let start = offset
            .from_local_datetime(&day.and_time(NaiveTime::MIN))
            .single()
            .expect("fixed offsets map local datetimes unambiguously")
            .with_timezone(&Utc);
        (start, start + Duration::days(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clinic_offset_defaults_to_utc_on_out_of_range_values() {
        let settings = ClinicSettings {
            slot_duration_min: 15,
            booking_window_days: 7,
            utc_offset_minutes: 100_000,
        };
        assert_eq!(settings.clinic_offset().local_minus_utc(), 0);
    }

    #[test]
    fn singapore_offset_is_eight_hours() {
        let settings = ClinicSettings {
            slot_duration_min: 15,
            booking_window_days: 7,
            utc_offset_minutes: 480,
        };
        assert_eq!(settings.clinic_offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn day_bounds_follow_the_clinic_calendar_not_utc() {
        let settings = ClinicSettings {
            slot_duration_min: 15,
            booking_window_days: 7,
            utc_offset_minutes: 480,
        };

        // 23:00 UTC on the 1st is already the 2nd in clinic time.
        let late_evening_utc = Utc.with_ymd_and_hms(2026, 3, 1, 23, 0, 0).unwrap();
        let (start, end) = settings.clinic_day_bounds(late_evening_utc);

        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 16, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 2, 16, 0, 0).unwrap());
    }
}
