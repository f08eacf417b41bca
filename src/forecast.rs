use chrono::{DateTime, Days, Local};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Records returned per request.
pub const FORECAST_DAYS: u64 = 5;

/// Inclusive lower, exclusive upper bound of generated temperatures.
pub const TEMPERATURE_RANGE_C: std::ops::Range<i32> = -20..55;

pub const SUMMARY: &str = "Test";

/// One day of the generated forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecast {
    pub date: DateTime<Local>,
    pub temperature_c: i32,
    pub temperature_f: i32,
    pub summary: String,
}

impl WeatherForecast {
    pub fn new(date: DateTime<Local>, temperature_c: i32, summary: impl Into<String>) -> Self {
        Self {
            date,
            temperature_c,
            temperature_f: fahrenheit(temperature_c),
            summary: summary.into(),
        }
    }
}

/// `32 + C / 0.5556`, truncated toward zero.
pub fn fahrenheit(celsius: i32) -> i32 {
    32 + (celsius as f64 / 0.5556) as i32
}

/// Forecast for the [`FORECAST_DAYS`] days following `now`, day+1 first.
pub fn generate<R: Rng>(now: DateTime<Local>, rng: &mut R) -> Vec<WeatherForecast> {
    (1..=FORECAST_DAYS)
        .map(|offset| {
            let date = now
                .checked_add_days(Days::new(offset))
                .unwrap_or_else(|| now + chrono::Duration::days(offset as i64));
            WeatherForecast::new(date, rng.gen_range(TEMPERATURE_RANGE_C), SUMMARY)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn five_consecutive_days_after_now() {
        let now = Local.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let forecast = generate(now, &mut StdRng::seed_from_u64(7));

        assert_eq!(forecast.len(), 5);
        assert_eq!(forecast[0].date.date_naive(), (now + Duration::days(1)).date_naive());
        assert_eq!(forecast[4].date.date_naive(), (now + Duration::days(5)).date_naive());
        for pair in forecast.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn temperatures_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            for day in generate(Local::now(), &mut rng) {
                assert!(TEMPERATURE_RANGE_C.contains(&day.temperature_c));
                assert_eq!(day.summary, "Test");
            }
        }
    }

    #[test]
    fn fahrenheit_truncates() {
        assert_eq!(fahrenheit(0), 32);
        assert_eq!(fahrenheit(20), 67);
        assert_eq!(fahrenheit(-20), -3);
        assert_eq!(fahrenheit(54), 129);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let now = Local.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let json = serde_json::to_value(WeatherForecast::new(now, 21, "Test")).unwrap();
        assert_eq!(json["temperatureC"], 21);
        assert_eq!(json["temperatureF"], 69);
        assert_eq!(json["summary"], "Test");
        assert!(json["date"].as_str().unwrap().starts_with("2024-03-10T09:00:00"));
    }
}
