// ABOUTME: Workflow schedule configuration (daily and cron triggers)
// ABOUTME: Decides which trigger wins when several are configured

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn wildcard() -> String {
    "*".to_string()
}

fn default_skip_delayed_by() -> Option<u64> {
    Some(1)
}

fn default_skip_on_overtime() -> bool {
    true
}

/// Five-field cron specification. Unset fields match everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronSchedule {
    #[serde(default = "wildcard")]
    pub minutes: String,
    #[serde(default = "wildcard")]
    pub hours: String,
    #[serde(default = "wildcard")]
    pub day_of_month: String,
    #[serde(default = "wildcard")]
    pub month: String,
    #[serde(default = "wildcard")]
    pub day_of_week: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub daily: Option<String>,
    #[serde(default)]
    pub cron: Option<CronSchedule>,
    /// Seconds; only rendered when strictly positive
    #[serde(default = "default_skip_delayed_by")]
    pub skip_delayed_by: Option<u64>,
    #[serde(default = "default_skip_on_overtime")]
    pub skip_on_overtime: bool,
}

/// The single trigger a schedule renders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger<'a> {
    Cron(&'a CronSchedule),
    Daily(&'a str),
}

impl Default for CronSchedule {
    fn default() -> Self {
        Self {
            minutes: wildcard(),
            hours: wildcard(),
            day_of_month: wildcard(),
            month: wildcard(),
            day_of_week: wildcard(),
        }
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.minutes, self.hours, self.day_of_month, self.month, self.day_of_week
        )
    }
}

impl FromStr for CronSchedule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        match fields.as_slice() {
            [minutes, hours, day_of_month, month, day_of_week] => Ok(Self {
                minutes: minutes.to_string(),
                hours: hours.to_string(),
                day_of_month: day_of_month.to_string(),
                month: month.to_string(),
                day_of_week: day_of_week.to_string(),
            }),
            _ => Err(format!(
                "Invalid cron specification '{}': expected 5 fields, got {}",
                s,
                fields.len()
            )),
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            daily: None,
            cron: None,
            skip_delayed_by: default_skip_delayed_by(),
            skip_on_overtime: default_skip_on_overtime(),
        }
    }
}

impl Schedule {
    pub fn daily(time: impl Into<String>) -> Self {
        Self {
            daily: Some(time.into()),
            ..Default::default()
        }
    }

    pub fn cron(cron: CronSchedule) -> Self {
        Self {
            cron: Some(cron),
            ..Default::default()
        }
    }

    pub fn with_skip_delayed_by(mut self, seconds: Option<u64>) -> Self {
        self.skip_delayed_by = seconds;
        self
    }

    pub fn with_skip_on_overtime(mut self, skip: bool) -> Self {
        self.skip_on_overtime = skip;
        self
    }

    /// Cron always wins over daily; there is no finer-grained ladder.
    pub fn trigger(&self) -> Option<Trigger<'_>> {
        if let Some(cron) = &self.cron {
            return Some(Trigger::Cron(cron));
        }
        self.daily.as_deref().map(Trigger::Daily)
    }
}
