use chrono::Weekday;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyAverageSample {
    pub day: Weekday,
    pub average: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourlySample {
    pub hour: u8,
    pub count: u32,
}

/// Counter triple pushed by the event stream.
///
/// `people_inside` is signed: an inconsistent upstream can report more exits
/// than entries and the value is displayed as received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveCounterState {
    pub people_in: u64,
    pub people_out: u64,
    pub people_inside: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveResponse {
    pub people_in: u64,
    pub people_out: u64,
    pub people_inside: i64,
    pub seq: Option<u64>,
    pub updated_at: Option<String>,
    pub status: ConnectionStatus,
}

#[derive(Debug, Serialize)]
pub struct DailyPoint {
    pub day: String,
    pub average: u32,
    pub peak: bool,
}

#[derive(Debug, Serialize)]
pub struct HourlyPoint {
    pub hour: String,
    pub count: u32,
    pub peak: bool,
}

#[derive(Debug, Serialize)]
pub struct PeakDay {
    pub day: String,
    pub average: u32,
}

#[derive(Debug, Serialize)]
pub struct PeakHour {
    pub hour: String,
    pub count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub daily: Vec<DailyPoint>,
    pub hourly: Vec<HourlyPoint>,
    pub peak_day: PeakDay,
    pub peak_hour: PeakHour,
}
