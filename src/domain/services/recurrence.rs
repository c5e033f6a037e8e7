use chrono::{DateTime, Datelike, Duration, Months, Utc};
use crate::domain::models::session::RecurringRule;

pub const DEFAULT_HORIZON_WEEKS: u32 = 4;
pub const MAX_HORIZON_WEEKS: u32 = 52;

pub fn validate_horizon(weeks: u32) -> Result<(), String> {
    if weeks == 0 || weeks > MAX_HORIZON_WEEKS {
        return Err(format!("Horizon must be between 1 and {} weeks", MAX_HORIZON_WEEKS));
    }
    Ok(())
}

/// Expands a recurrence rule into concrete start times within a horizon of
/// whole calendar weeks (Sunday-aligned, starting with the week containing
/// `first_occurrence`). Every result carries the time of day of
/// `first_occurrence`, the list is strictly ascending, and nothing earlier
/// than `first_occurrence` is ever returned.
pub fn compute_occurrences(
    first_occurrence: DateTime<Utc>,
    rule: &RecurringRule,
    horizon_weeks: u32,
    include_first: bool,
) -> Vec<DateTime<Utc>> {
    let week_start = start_of_week(first_occurrence);
    let window_end = week_start + Duration::weeks(horizon_weeks as i64);

    let mut occurrences = Vec::new();

    match rule {
        RecurringRule::Daily { interval, .. } => {
            let step = Duration::days((*interval).max(1) as i64);
            let mut cursor = first_occurrence;
            while cursor < window_end {
                occurrences.push(cursor);
                cursor += step;
            }
        }
        RecurringRule::Weekly { interval, days_of_week, .. } => {
            let step = (*interval).max(1) as usize;
            let mut days = days_of_week.clone().unwrap_or_default();
            if days.is_empty() {
                days.push(first_occurrence.weekday().num_days_from_sunday() as u8);
            }
            days.sort_unstable();
            days.dedup();

            for week in (0..horizon_weeks).step_by(step) {
                let base = week_start + Duration::weeks(week as i64);
                for day in days.iter().filter(|d| **d <= 6) {
                    occurrences.push(base + Duration::days(*day as i64));
                }
            }
        }
        RecurringRule::Monthly { interval, .. } => {
            // Stepping in calendar months clamps Jan 31 + 1 month to the
            // end of February rather than skipping the month.
            let step = (*interval).max(1);
            let mut months_ahead = 0u32;
            loop {
                let Some(candidate) = first_occurrence.checked_add_months(Months::new(months_ahead))
                else {
                    break;
                };
                if candidate >= window_end {
                    break;
                }
                occurrences.push(candidate);
                months_ahead += step;
            }
        }
    }

    occurrences.retain(|ts| match ts.cmp(&first_occurrence) {
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => include_first,
        std::cmp::Ordering::Greater => true,
    });
    if let Some(end_date) = rule.end_date() {
        occurrences.retain(|ts| *ts <= end_date);
    }

    occurrences.sort_unstable();
    occurrences.dedup();

    if let Some(cap) = rule.end_after_occurrences() {
        occurrences.truncate(cap as usize);
    }

    occurrences
}

// Sunday of the week containing `ts`, at the same time of day so that
// window boundaries compare cleanly against generated candidates.
fn start_of_week(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts - Duration::days(ts.weekday().num_days_from_sunday() as i64)
}
