// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chrono::{DateTime, Utc};

use crate::error::StandingsError;

/// Converts the stored freeze setting (seconds since the Unix epoch) into a UTC instant.
///
/// A missing or blank setting means the scoreboard is not frozen.
pub fn parse_freeze(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, StandingsError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    let secs: i64 = raw
        .parse()
        .map_err(|_| StandingsError::InvalidFreezeTimestamp(raw.to_string()))?;
    DateTime::from_timestamp(secs, 0)
        .map(Some)
        .ok_or_else(|| StandingsError::InvalidFreezeTimestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_freeze() {
        assert_eq!(parse_freeze(None).unwrap(), None);
        assert_eq!(parse_freeze(Some("")).unwrap(), None);
        assert_eq!(parse_freeze(Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_epoch_seconds() {
        let freeze = parse_freeze(Some("1700000000")).unwrap().unwrap();
        assert_eq!(freeze.to_rfc3339(), "2023-11-14T22:13:20+00:00");

        let epoch = parse_freeze(Some("0")).unwrap().unwrap();
        assert_eq!(epoch.timestamp(), 0);
    }

    #[test]
    fn test_garbage_is_rejected() {
        for raw in ["soon", "1700000000.5", "99999999999999999999"] {
            assert!(matches!(
                parse_freeze(Some(raw)),
                Err(StandingsError::InvalidFreezeTimestamp(_))
            ));
        }
    }
}
