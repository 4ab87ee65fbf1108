use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{NaiveTime, Timelike};
use serde::Deserialize;
use thiserror::Error;

use crate::clock::Country;

pub(crate) const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlarmError {
    #[error("no meal alarm with id {0}")]
    NotFound(AlarmId),
    #[error("invalid alarm time '{0}'; expected HH:MM between 00:00 and 23:59")]
    InvalidTime(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlarmId(pub u64);

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealTime {
    hour: u32,
    minute: u32,
}

impl MealTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, AlarmError> {
        if hour > 23 || minute > 59 {
            return Err(AlarmError::InvalidTime(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    pub fn parse(input: &str) -> Result<Self, AlarmError> {
        let trimmed = input.trim();
        let time = NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map_err(|_| AlarmError::InvalidTime(trimmed.to_string()))?;
        Ok(Self {
            hour: time.hour(),
            minute: time.minute(),
        })
    }

    pub(crate) fn from_minutes(total: u32) -> Self {
        let wrapped = total % MINUTES_PER_DAY;
        Self {
            hour: wrapped / 60,
            minute: wrapped % 60,
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn minutes_from_midnight(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    pub fn plus_minutes(self, minutes: u32) -> Self {
        Self::from_minutes(self.minutes_from_midnight() + minutes)
    }
}

impl fmt::Display for MealTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmEntry {
    pub id: AlarmId,
    pub time: MealTime,
    pub label: String,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct SeedAlarm {
    pub time: MealTime,
    pub label: String,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct AlarmSeed {
    pub country: Option<Country>,
    pub alarms: Vec<SeedAlarm>,
}

impl AlarmSeed {
    pub fn default_meals() -> Self {
        let meal = |hour: u32, label: &str| SeedAlarm {
            time: MealTime::from_minutes(hour * 60),
            label: label.to_string(),
            enabled: true,
        };
        Self {
            country: None,
            alarms: vec![
                meal(9, "Breakfast Time!"),
                meal(13, "Lunch Time!"),
                meal(18, "Dinner Time!"),
            ],
        }
    }
}

pub fn load_alarm_seed(path: &Path) -> Result<AlarmSeed> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("unable to read alarm file {}", path.display()))?;
    parse_alarm_seed_text(&content)
}

pub fn parse_alarm_seed_text(content: &str) -> Result<AlarmSeed> {
    let raw = serde_json::from_str::<AlarmSeedFile>(content).map_err(|err| {
        let line = err.line();
        let column = err.column();
        anyhow::anyhow!("invalid JSON at line {line}, column {column}: {err}")
    })?;

    if raw.version != 1 {
        bail!(
            "unsupported alarm file version {}; expected version 1",
            raw.version
        );
    }

    let mut alarms = Vec::with_capacity(raw.alarms.len());
    for alarm in raw.alarms {
        let time = MealTime::parse(&alarm.time)
            .with_context(|| format!("alarm '{}' has an unusable time", alarm.label))?;
        alarms.push(SeedAlarm {
            time,
            label: alarm.label,
            enabled: alarm.enabled,
        });
    }

    Ok(AlarmSeed {
        country: raw.country,
        alarms,
    })
}

#[derive(Debug, Deserialize)]
struct AlarmSeedFile {
    version: u32,
    #[serde(default)]
    country: Option<Country>,
    alarms: Vec<SeedAlarmFile>,
}

#[derive(Debug, Deserialize)]
struct SeedAlarmFile {
    time: String,
    label: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_enabled() -> bool {
    true
}
