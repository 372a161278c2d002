use crate::datasets::{DAILY_AVERAGES, HOURLY_COUNTS};
use crate::errors::PeakError;
use crate::models::{
    AnalyticsResponse, DailyAverageSample, DailyPoint, HourlyPoint, HourlySample, PeakDay,
    PeakHour,
};
use std::ptr;

/// Returns the element with the largest key.
///
/// Scans left to right and only replaces the current best on a strictly
/// greater key, so the first of several equal maxima wins.
pub fn find_peak<T, K, F>(items: &[T], key: F) -> Result<&T, PeakError>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let (first, rest) = items.split_first().ok_or(PeakError::Empty)?;
    let mut best = first;
    let mut best_key = key(first);
    for item in rest {
        let candidate = key(item);
        if candidate > best_key {
            best = item;
            best_key = candidate;
        }
    }
    Ok(best)
}

pub fn peak_day() -> Result<&'static DailyAverageSample, PeakError> {
    find_peak(&DAILY_AVERAGES, |sample| sample.average)
}

pub fn peak_hour() -> Result<&'static HourlySample, PeakError> {
    find_peak(&HOURLY_COUNTS, |sample| sample.count)
}

pub fn build_analytics() -> Result<AnalyticsResponse, PeakError> {
    let top_day = peak_day()?;
    let top_hour = peak_hour()?;

    let daily = DAILY_AVERAGES
        .iter()
        .map(|sample| DailyPoint {
            day: sample.label().to_string(),
            average: sample.average,
            peak: ptr::eq(sample, top_day),
        })
        .collect();

    let hourly = HOURLY_COUNTS
        .iter()
        .map(|sample| HourlyPoint {
            hour: sample.label(),
            count: sample.count,
            peak: ptr::eq(sample, top_hour),
        })
        .collect();

    Ok(AnalyticsResponse {
        daily,
        hourly,
        peak_day: PeakDay {
            day: top_day.label().to_string(),
            average: top_day.average,
        },
        peak_hour: PeakHour {
            hour: top_hour.label(),
            count: top_hour.count,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn peak_of_partial_week_is_saturday() {
        let week = [
            DailyAverageSample { day: Weekday::Mon, average: 120 },
            DailyAverageSample { day: Weekday::Fri, average: 250 },
            DailyAverageSample { day: Weekday::Sat, average: 300 },
            DailyAverageSample { day: Weekday::Sun, average: 220 },
        ];
        let peak = find_peak(&week, |s| s.average).unwrap();
        assert_eq!(peak.label(), "Sáb");
        assert_eq!(peak.average, 300);
    }

    #[test]
    fn ties_resolve_to_first_occurrence() {
        let values = [(1, 'a'), (7, 'b'), (3, 'c'), (7, 'd')];
        let peak = find_peak(&values, |v| v.0).unwrap();
        assert_eq!(peak.1, 'b');
        assert!(ptr::eq(peak, &values[1]));
    }

    #[test]
    fn empty_input_is_an_error() {
        let values: [u32; 0] = [];
        assert_eq!(find_peak(&values, |v| *v), Err(PeakError::Empty));
    }

    #[test]
    fn peak_dominates_every_element() {
        let peak = peak_hour().unwrap();
        assert!(HOURLY_COUNTS.iter().all(|s| peak.count >= s.count));
    }

    #[test]
    fn repeated_calls_agree() {
        assert_eq!(peak_day().unwrap(), peak_day().unwrap());
        assert_eq!(peak_hour().unwrap(), peak_hour().unwrap());
    }

    #[test]
    fn hourly_peak_is_six_pm() {
        let peak = peak_hour().unwrap();
        assert_eq!(peak.label(), "18:00");
        assert_eq!(peak.count, 300);
    }

    #[test]
    fn analytics_flags_exactly_one_peak_per_series() {
        let analytics = build_analytics().unwrap();
        assert_eq!(analytics.daily.len(), 7);
        assert_eq!(analytics.hourly.len(), 12);
        assert_eq!(analytics.daily.iter().filter(|p| p.peak).count(), 1);
        assert_eq!(analytics.hourly.iter().filter(|p| p.peak).count(), 1);

        let flagged = analytics.daily.iter().find(|p| p.peak).unwrap();
        assert_eq!(flagged.day, analytics.peak_day.day);
        assert_eq!(flagged.average, analytics.peak_day.average);
        assert_eq!(analytics.peak_hour.hour, "18:00");
    }
}
