use std::collections::HashSet;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::AvailableSlot;

/// Fixed clinic working windows, clinic-local wall time.
/// Morning consultation block and afternoon consultation block.
const WORKING_WINDOWS: [(u32, u32, u32, u32); 2] = [(9, 0, 12, 0), (14, 0, 17, 0)];

/// Statuses that occupy a slot. Completed and no-show appointments free
/// their slot for rebooking.
const OCCUPYING_STATUSES: &str = "in.(booked,arrived,in_consultation)";

#[derive(Debug, Deserialize)]
struct OccupiedRow {
    scheduled_start: DateTime<Utc>,
}

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Compute bookable start times for a doctor on a clinic-local date.
    ///
    /// Dates outside [today, today + booking_window_days] yield an empty
    /// list. A missing clinic_settings row propagates as an error.
    pub async fn get_available_slots(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<AvailableSlot>> {
        debug!("Calculating available slots for doctor {} on {}", doctor_id, date);

        let settings = self
            .supabase
            .get_clinic_settings(None)
            .await
            .context("Failed to load clinic settings")?;

        if settings.slot_duration_min <= 0 {
            return Err(anyhow!(
                "clinic_settings.slot_duration_min must be positive, got {}",
                settings.slot_duration_min
            ));
        }

        let offset = settings.clinic_offset();
        let today = Utc::now().with_timezone(&offset).date_naive();

        if !within_booking_window(date, today, settings.booking_window_days) {
            debug!("Date {} is outside the booking window", date);
            return Ok(vec![]);
        }

        let occupied = self.get_occupied_starts(doctor_id, date, &offset).await?;

        let slots = generate_slots(date, &offset, settings.slot_duration_min, &occupied);
        debug!("Found {} available slots", slots.len());

        Ok(slots)
    }

    /// Exact scheduled-start instants already taken for this doctor/day.
    async fn get_occupied_starts(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        offset: &FixedOffset,
    ) -> Result<HashSet<DateTime<Utc>>> {
        let day_start = clinic_datetime(date, NaiveTime::MIN, offset);
        let day_end = day_start + Duration::days(1);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&scheduled_start=gte.{}&scheduled_start=lt.{}&status={}&select=scheduled_start",
            doctor_id,
            urlencoding::encode(&day_start.to_rfc3339()),
            urlencoding::encode(&day_end.to_rfc3339()),
            OCCUPYING_STATUSES,
        );

        let rows: Vec<OccupiedRow> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .context("Failed to load existing appointments")?;

        Ok(rows.into_iter().map(|row| row.scheduled_start).collect())
    }
}

fn within_booking_window(date: NaiveDate, today: NaiveDate, window_days: i32) -> bool {
    let window_days = window_days.max(0) as i64;
    date >= today && date <= today + Duration::days(window_days)
}

fn clinic_datetime(date: NaiveDate, time: NaiveTime, offset: &FixedOffset) -> DateTime<Utc> {
    // FixedOffset mappings are total, so the single() result always exists.
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .expect("fixed offsets map local datetimes unambiguously")
        .with_timezone(&Utc)
}

/// Walk each working window from its open time in slot-duration steps,
/// keeping candidates whose full duration fits inside the window and whose
/// exact start instant is unoccupied.
fn generate_slots(
    date: NaiveDate,
    offset: &FixedOffset,
    slot_duration_min: i32,
    occupied: &HashSet<DateTime<Utc>>,
) -> Vec<AvailableSlot> {
    let step = Duration::minutes(slot_duration_min as i64);
    let mut slots = Vec::new();

    for (open_h, open_m, close_h, close_m) in WORKING_WINDOWS {
        let open = NaiveTime::from_hms_opt(open_h, open_m, 0).unwrap();
        let close = NaiveTime::from_hms_opt(close_h, close_m, 0).unwrap();
        let window_end = clinic_datetime(date, close, offset);
        let mut current = clinic_datetime(date, open, offset);

        while current + step <= window_end {
            if !occupied.contains(&current) {
                slots.push(AvailableSlot {
                    starts_at: current,
                    label: current.with_timezone(offset).format("%H:%M").to_string(),
                });
            }
            current += step;
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sgt() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn full_day_produces_the_expected_grid() {
        let slots = generate_slots(date(), &sgt(), 15, &HashSet::new());

        // 09:00-12:00 and 14:00-17:00 at 15 minutes: 12 slots per window.
        assert_eq!(slots.len(), 24);
        assert_eq!(slots[0].label, "09:00");
        assert_eq!(slots[11].label, "11:45");
        assert_eq!(slots[12].label, "14:00");
        assert_eq!(slots[23].label, "16:45");
    }

    #[test]
    fn slots_are_ascending_evenly_spaced_and_unique() {
        let slots = generate_slots(date(), &sgt(), 15, &HashSet::new());

        for pair in slots[..12].windows(2) {
            assert_eq!(pair[1].starts_at - pair[0].starts_at, Duration::minutes(15));
        }
        let mut starts: Vec<_> = slots.iter().map(|s| s.starts_at).collect();
        let original = starts.clone();
        starts.sort();
        starts.dedup();
        assert_eq!(starts, original);
    }

    #[test]
    fn slot_instants_are_utc_converted_from_clinic_time() {
        let slots = generate_slots(date(), &sgt(), 15, &HashSet::new());

        // 09:00 SGT == 01:00 UTC.
        assert_eq!(
            slots[0].starts_at,
            Utc.with_ymd_and_hms(2026, 3, 2, 1, 0, 0).unwrap()
        );
    }

    #[test]
    fn occupied_instants_are_excluded_by_exact_match() {
        let nine_am_utc = Utc.with_ymd_and_hms(2026, 3, 2, 1, 0, 0).unwrap();
        let occupied: HashSet<_> = [nine_am_utc].into_iter().collect();

        let slots = generate_slots(date(), &sgt(), 15, &occupied);

        assert_eq!(slots.len(), 23);
        assert!(slots.iter().all(|s| s.starts_at != nine_am_utc));
        assert_eq!(slots[0].label, "09:15");
    }

    #[test]
    fn off_grid_appointments_do_not_block_slots() {
        // 09:07 SGT is not a slot boundary; exact-match policy ignores it.
        let off_grid = Utc.with_ymd_and_hms(2026, 3, 2, 1, 7, 0).unwrap();
        let occupied: HashSet<_> = [off_grid].into_iter().collect();

        let slots = generate_slots(date(), &sgt(), 15, &occupied);
        assert_eq!(slots.len(), 24);
    }

    #[test]
    fn last_slot_fits_entirely_inside_the_window() {
        // 25-minute slots in a 3-hour window: the last start is 11:30,
        // since an 11:55 slot would spill past 12:00.
        let slots = generate_slots(date(), &sgt(), 25, &HashSet::new());
        let morning: Vec<_> = slots.iter().filter(|s| s.label.as_str() < "12:00").collect();

        assert_eq!(morning.last().unwrap().label, "11:30");
    }

    #[test]
    fn booking_window_bounds_are_inclusive() {
        let today = date();
        assert!(within_booking_window(today, today, 7));
        assert!(within_booking_window(today + Duration::days(7), today, 7));
        assert!(!within_booking_window(today + Duration::days(8), today, 7));
        assert!(!within_booking_window(today - Duration::days(1), today, 7));
    }
}
