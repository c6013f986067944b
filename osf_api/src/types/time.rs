//! Timestamps as the OSF API writes them.
//!
//! Most fields are zone-less (`2021-03-04T05:06:07.123456`) and meant as UTC;
//! some carry a `Z` or an offset. Both forms parse into [`OsfTime`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A UTC timestamp parsed from either RFC 3339 or zone-less ISO 8601.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct OsfTime(pub DateTime<Utc>);

impl OsfTime {
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for OsfTime {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl FromStr for OsfTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match DateTime::parse_from_rfc3339(s) {
            Ok(parsed) => Ok(Self(parsed.with_timezone(&Utc))),
            Err(_) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| Self(naive.and_utc())),
        }
    }
}

impl fmt::Display for OsfTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl Serialize for OsfTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for OsfTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::OsfTime;

    #[test]
    fn parses_zoned_and_zoneless_forms() {
        let zoned: OsfTime = "1951-05-28T00:00:00.000Z".parse().unwrap();
        assert_eq!(zoned.0.year(), 1951);

        let plain: OsfTime = "2021-03-04T05:06:07".parse().unwrap();
        assert_eq!(plain.0.hour(), 5);

        let micros: OsfTime = "2021-03-04T05:06:07.123456".parse().unwrap();
        assert_eq!(micros.0.nanosecond(), 123_456_000);

        let offset: OsfTime = "2021-03-04T07:06:07+02:00".parse().unwrap();
        assert_eq!(offset.0.hour(), 5);
    }

    #[test]
    fn rejects_garbage() {
        assert!("yesterday".parse::<OsfTime>().is_err());
        assert!(serde_json::from_str::<OsfTime>("12").is_err());
    }

    #[test]
    fn serializes_as_rfc3339() {
        let t: OsfTime = "2021-03-04T05:06:07".parse().unwrap();
        assert_eq!(
            serde_json::to_string(&t).unwrap(),
            "\"2021-03-04T05:06:07+00:00\""
        );
    }
}
