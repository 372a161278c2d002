use crate::models::{DailyAverageSample, HourlySample};
use chrono::Weekday;

// Simulated figures until a reporting backend supplies real ones.
pub static DAILY_AVERAGES: [DailyAverageSample; 7] = [
    DailyAverageSample { day: Weekday::Mon, average: 120 },
    DailyAverageSample { day: Weekday::Tue, average: 150 },
    DailyAverageSample { day: Weekday::Wed, average: 180 },
    DailyAverageSample { day: Weekday::Thu, average: 200 },
    DailyAverageSample { day: Weekday::Fri, average: 250 },
    DailyAverageSample { day: Weekday::Sat, average: 300 },
    DailyAverageSample { day: Weekday::Sun, average: 220 },
];

pub static HOURLY_COUNTS: [HourlySample; 12] = [
    HourlySample { hour: 0, count: 20 },
    HourlySample { hour: 2, count: 10 },
    HourlySample { hour: 4, count: 5 },
    HourlySample { hour: 6, count: 15 },
    HourlySample { hour: 8, count: 50 },
    HourlySample { hour: 10, count: 100 },
    HourlySample { hour: 12, count: 180 },
    HourlySample { hour: 14, count: 220 },
    HourlySample { hour: 16, count: 250 },
    HourlySample { hour: 18, count: 300 },
    HourlySample { hour: 20, count: 280 },
    HourlySample { hour: 22, count: 150 },
];

pub fn day_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Seg",
        Weekday::Tue => "Ter",
        Weekday::Wed => "Qua",
        Weekday::Thu => "Qui",
        Weekday::Fri => "Sex",
        Weekday::Sat => "Sáb",
        Weekday::Sun => "Dom",
    }
}

pub fn hour_label(hour: u8) -> String {
    format!("{hour:02}:00")
}

impl DailyAverageSample {
    pub fn label(&self) -> &'static str {
        day_label(self.day)
    }
}

impl HourlySample {
    pub fn label(&self) -> String {
        hour_label(self.hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_dataset_covers_the_week_in_order() {
        let labels: Vec<_> = DAILY_AVERAGES.iter().map(|s| s.label()).collect();
        assert_eq!(labels, ["Seg", "Ter", "Qua", "Qui", "Sex", "Sáb", "Dom"]);
    }

    #[test]
    fn hourly_dataset_uses_two_hour_steps() {
        let labels: Vec<_> = HOURLY_COUNTS.iter().map(|s| s.label()).collect();
        assert_eq!(labels.first().map(String::as_str), Some("00:00"));
        assert_eq!(labels.last().map(String::as_str), Some("22:00"));
        assert!(HOURLY_COUNTS.windows(2).all(|w| w[1].hour - w[0].hour == 2));
    }
}
