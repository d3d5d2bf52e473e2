#![forbid(unsafe_code)]

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// UTC wall-clock time (`HH:MM`) at which the daily summary is reduced.
///
/// Malformed values deserialize to the default of `23:00` instead of failing
/// the whole configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DailyTime(NaiveTime);

impl DailyTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl Default for DailyTime {
    fn default() -> Self {
        Self(NaiveTime::from_hms_opt(23, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a valid HH:MM time")]
pub struct InvalidDailyTime(String);

impl FromStr for DailyTime {
    type Err = InvalidDailyTime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidDailyTime(s.to_owned());
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let (hh, mm) = (&s[..2], &s[3..]);
        if !hh.bytes().chain(mm.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour = hh.parse().map_err(|_| invalid())?;
        let minute = mm.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for DailyTime {
    type Error = Infallible;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(value.parse().unwrap_or_default())
    }
}

impl From<DailyTime> for String {
    fn from(value: DailyTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DailyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DailySummary {
    pub time_gmt: DailyTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_valid_times() {
        assert_eq!("07:05".parse::<DailyTime>(), Ok(DailyTime::new(7, 5).unwrap()));
        assert_eq!("00:00".parse::<DailyTime>().unwrap().to_string(), "00:00");
    }

    #[test]
    fn rejects_malformed_times() {
        for raw in ["7:05", "24:00", "12:60", "ab:cd", "12-30", "", "12:300"] {
            assert!(raw.parse::<DailyTime>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn malformed_falls_back_to_default() {
        let time = DailyTime::try_from("nonsense".to_owned()).unwrap();
        assert_eq!(time.to_string(), "23:00");
    }

    proptest! {
        #[test]
        fn display_roundtrips(hour in 0u32..24, minute in 0u32..60) {
            let time = DailyTime::new(hour, minute).unwrap();
            prop_assert_eq!(time.to_string().parse::<DailyTime>(), Ok(time));
        }
    }
}
