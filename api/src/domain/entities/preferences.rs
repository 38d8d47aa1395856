//! Per-user client preferences
//!
//! Selected club/person and display settings, persisted locally per account.

use serde::{Deserialize, Serialize};

use super::club::ClubId;
use super::person::PersonId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThemeMode {
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateFormat {
    #[default]
    DayMonthYear,
    MonthDayYear,
    YearMonthDay,
}

impl DateFormat {
    /// chrono format string for this preference
    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::DayMonthYear => "%d.%m.%Y",
            DateFormat::MonthDayYear => "%m/%d/%Y",
            DateFormat::YearMonthDay => "%Y-%m-%d",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "H24")]
    TwentyFourHour,
    #[serde(rename = "H12")]
    TwelveHour,
}

impl TimeFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            TimeFormat::TwentyFourHour => "%H:%M",
            TimeFormat::TwelveHour => "%I:%M %p",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub selected_club_id: Option<ClubId>,
    pub selected_person_id: Option<PersonId>,
    pub theme_mode: ThemeMode,
    pub date_format: DateFormat,
    pub time_format: TimeFormat,
}

impl Preferences {
    /// Render a timestamp with the preferred date and time formats
    pub fn format_date_time(&self, at: chrono::DateTime<chrono::Utc>) -> String {
        at.format(&format!(
            "{} {}",
            self.date_format.pattern(),
            self.time_format.pattern()
        ))
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"themeMode":"DARK"}"#).unwrap();
        assert_eq!(prefs.theme_mode, ThemeMode::Dark);
        assert_eq!(prefs.date_format, DateFormat::DayMonthYear);
        assert!(prefs.selected_club_id.is_none());
    }

    #[test]
    fn formats_with_preferences() {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 18, 30, 0).unwrap();
        let mut prefs = Preferences::default();
        assert_eq!(prefs.format_date_time(at), "07.03.2026 18:30");

        prefs.date_format = DateFormat::YearMonthDay;
        prefs.time_format = TimeFormat::TwelveHour;
        assert_eq!(prefs.format_date_time(at), "2026-03-07 06:30 PM");
    }
}
