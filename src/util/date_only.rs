//! Deserializes an optional ISO 8601 timestamp such as `2021-03-14T12:30:00Z` into only its date component. Use
//! together with `#[serde(default)]`.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let timestamp: Option<String> = Deserialize::deserialize(deserializer)?;

    timestamp
        .map(|timestamp| parse(&timestamp).map_err(de::Error::custom))
        .transpose()
}

pub(crate) fn parse(timestamp: &str) -> Result<NaiveDate, chrono::ParseError> {
    let date = timestamp.split_once('T').map_or(timestamp, |(date, _)| date);
    NaiveDate::parse_from_str(date, DATE_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_time_component() {
        assert_eq!(
            parse("2021-03-14T12:30:00Z").unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 14).unwrap()
        );
    }

    #[test]
    fn accepts_bare_date() {
        assert_eq!(parse("1999-12-31").unwrap(), NaiveDate::from_ymd_opt(1999, 12, 31).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("yesterday").is_err());
    }
}
