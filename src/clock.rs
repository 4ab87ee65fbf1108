use std::fmt;

use anyhow::Result;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::alarm::model::MealTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    Thailand,
    Usa,
    Japan,
    Uk,
    France,
    Germany,
    Australia,
}

impl Country {
    pub const ALL: [Country; 7] = [
        Country::Thailand,
        Country::Usa,
        Country::Japan,
        Country::Uk,
        Country::France,
        Country::Germany,
        Country::Australia,
    ];

    pub fn timezone(self) -> Tz {
        match self {
            Country::Thailand => chrono_tz::Asia::Bangkok,
            Country::Usa => chrono_tz::America::New_York,
            Country::Japan => chrono_tz::Asia::Tokyo,
            Country::Uk => chrono_tz::Europe::London,
            Country::France => chrono_tz::Europe::Paris,
            Country::Germany => chrono_tz::Europe::Berlin,
            Country::Australia => chrono_tz::Australia::Sydney,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Country::Thailand => "Thailand",
            Country::Usa => "USA",
            Country::Japan => "Japan",
            Country::Uk => "UK",
            Country::France => "France",
            Country::Germany => "Germany",
            Country::Australia => "Australia",
        }
    }
}

impl Default for Country {
    fn default() -> Self {
        Country::Thailand
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

pub trait ClockSource: Send + Sync {
    fn now_utc(&self) -> Result<DateTime<Utc>>;
}

pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_utc(&self) -> Result<DateTime<Utc>> {
        Ok(Utc::now())
    }
}

pub struct WallClock {
    source: Box<dyn ClockSource>,
    country: Country,
}

impl WallClock {
    pub fn new(source: Box<dyn ClockSource>, country: Country) -> Self {
        Self { source, country }
    }

    pub fn system(country: Country) -> Self {
        Self::new(Box::new(SystemClock), country)
    }

    pub fn country(&self) -> Country {
        self.country
    }

    pub fn set_country(&mut self, country: Country) {
        self.country = country;
    }

    pub fn now(&self) -> Result<DateTime<Tz>> {
        let utc = self.source.now_utc()?;
        Ok(utc.with_timezone(&self.country.timezone()))
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TimeDisplayMode {
    Hour24,
    Hour12,
}

pub fn format_clock_time(now: &DateTime<Tz>, mode: TimeDisplayMode) -> String {
    match mode {
        TimeDisplayMode::Hour24 => format!(
            "{:02}:{:02}:{:02}",
            now.hour(),
            now.minute(),
            now.second()
        ),
        TimeDisplayMode::Hour12 => {
            let (is_pm, hour12) = now.hour12();
            let meridiem = if is_pm { "PM" } else { "AM" };
            format!(
                "{:02}:{:02}:{:02} {}",
                hour12,
                now.minute(),
                now.second(),
                meridiem
            )
        }
    }
}

pub fn format_meal_time(time: MealTime, mode: TimeDisplayMode) -> String {
    match mode {
        TimeDisplayMode::Hour24 => time.to_string(),
        TimeDisplayMode::Hour12 => {
            let meridiem = if time.hour() >= 12 { "PM" } else { "AM" };
            let hour12 = match time.hour() % 12 {
                0 => 12,
                hour => hour,
            };
            format!("{}:{:02} {}", hour12, time.minute(), meridiem)
        }
    }
}

#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockSource for FixedClock {
    fn now_utc(&self) -> Result<DateTime<Utc>> {
        Ok(self.0)
    }
}

#[cfg(test)]
pub struct FailingClock;

#[cfg(test)]
impl ClockSource for FailingClock {
    fn now_utc(&self) -> Result<DateTime<Utc>> {
        anyhow::bail!("clock source offline")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn every_country_maps_to_its_zone() {
        let expected = [
            (Country::Thailand, "Asia/Bangkok"),
            (Country::Usa, "America/New_York"),
            (Country::Japan, "Asia/Tokyo"),
            (Country::Uk, "Europe/London"),
            (Country::France, "Europe/Paris"),
            (Country::Germany, "Europe/Berlin"),
            (Country::Australia, "Australia/Sydney"),
        ];
        assert_eq!(expected.len(), Country::ALL.len());
        for (country, zone) in expected {
            assert_eq!(country.timezone().name(), zone, "{country} zone");
        }
    }

    #[test]
    fn wall_clock_converts_to_country_zone() {
        let instant = Utc
            .with_ymd_and_hms(2026, 8, 25, 2, 0, 0)
            .single()
            .expect("valid instant");

        let bangkok = WallClock::new(Box::new(FixedClock(instant)), Country::Thailand);
        assert_eq!(bangkok.now().expect("clock works").hour(), 9);

        // New York observes daylight saving in August
        let new_york = WallClock::new(Box::new(FixedClock(instant)), Country::Usa);
        assert_eq!(new_york.now().expect("clock works").hour(), 22);
    }

    #[test]
    fn set_country_moves_the_wall_time() {
        let instant = Utc
            .with_ymd_and_hms(2026, 8, 25, 2, 0, 0)
            .single()
            .expect("valid instant");
        let mut clock = WallClock::new(Box::new(FixedClock(instant)), Country::Thailand);

        clock.set_country(Country::Japan);
        assert_eq!(clock.country(), Country::Japan);
        assert_eq!(clock.now().expect("clock works").hour(), 11);
    }

    #[test]
    fn clock_time_formats_in_both_modes() {
        let now = Utc
            .with_ymd_and_hms(2026, 8, 25, 6, 5, 9)
            .single()
            .expect("valid instant")
            .with_timezone(&chrono_tz::Asia::Bangkok);

        assert_eq!(format_clock_time(&now, TimeDisplayMode::Hour24), "13:05:09");
        assert_eq!(
            format_clock_time(&now, TimeDisplayMode::Hour12),
            "01:05:09 PM"
        );
    }

    #[test]
    fn midnight_renders_as_twelve_in_hour12() {
        let now = chrono_tz::Asia::Bangkok
            .with_ymd_and_hms(2026, 8, 25, 0, 0, 0)
            .single()
            .expect("valid instant");

        assert_eq!(format_clock_time(&now, TimeDisplayMode::Hour24), "00:00:00");
        assert_eq!(
            format_clock_time(&now, TimeDisplayMode::Hour12),
            "12:00:00 AM"
        );
    }

    #[test]
    fn meal_times_render_in_both_modes() {
        let dinner = MealTime::new(18, 0).expect("valid meal time");
        assert_eq!(format_meal_time(dinner, TimeDisplayMode::Hour24), "18:00");
        assert_eq!(format_meal_time(dinner, TimeDisplayMode::Hour12), "6:00 PM");

        let breakfast = MealTime::new(9, 5).expect("valid meal time");
        assert_eq!(format_meal_time(breakfast, TimeDisplayMode::Hour12), "9:05 AM");

        let past_midnight = MealTime::new(0, 30).expect("valid meal time");
        assert_eq!(
            format_meal_time(past_midnight, TimeDisplayMode::Hour12),
            "12:30 AM"
        );

        let noon = MealTime::new(12, 0).expect("valid meal time");
        assert_eq!(format_meal_time(noon, TimeDisplayMode::Hour12), "12:00 PM");
    }

    #[test]
    fn country_names_match_the_selector() {
        let names: Vec<&str> = Country::ALL
            .iter()
            .map(|country| country.display_name())
            .collect();
        assert_eq!(
            names,
            vec!["Thailand", "USA", "Japan", "UK", "France", "Germany", "Australia"]
        );
        assert_eq!(Country::default(), Country::Thailand);
    }

    #[test]
    fn failing_source_surfaces_the_error() {
        let clock = WallClock::new(Box::new(FailingClock), Country::Thailand);
        let err = clock.now().expect_err("source is down");
        assert!(err.to_string().contains("clock source offline"));
    }
}
