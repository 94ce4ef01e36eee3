use serde::{Deserialize, Serialize};

/// Named trading sessions with fixed UTC hour ranges.
///
/// The Asian session wraps around midnight: 22:00-23:59 and 00:00-06:59.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Session {
    London,
    #[serde(alias = "NY")]
    NewYork,
    Asian,
}

impl Session {
    /// True if the given UTC hour falls inside this session's range.
    /// Bounds are inclusive, matching the broker's session definitions.
    pub fn contains_hour(&self, hour: u32) -> bool {
        match self {
            Session::London => (7..=16).contains(&hour),
            Session::NewYork => (13..=21).contains(&hour),
            Session::Asian => (22..=23).contains(&hour) || hour <= 6,
        }
    }
}

/// Stateless session gate: true iff the hour falls in at least one of the
/// configured sessions.
pub fn in_trading_session(sessions: &[Session], hour: u32) -> bool {
    sessions.iter().any(|s| s.contains_hour(hour))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_london_range() {
        assert!(!Session::London.contains_hour(6));
        assert!(Session::London.contains_hour(7));
        assert!(Session::London.contains_hour(16));
        assert!(!Session::London.contains_hour(17));
    }

    #[test]
    fn test_new_york_range() {
        assert!(!Session::NewYork.contains_hour(12));
        assert!(Session::NewYork.contains_hour(13));
        assert!(Session::NewYork.contains_hour(21));
        assert!(!Session::NewYork.contains_hour(22));
    }

    #[test]
    fn test_asian_wraps_around_midnight() {
        for hour in [22, 23, 0, 1, 6] {
            assert!(Session::Asian.contains_hour(hour), "hour {hour}");
        }
        for hour in [7, 12, 21] {
            assert!(!Session::Asian.contains_hour(hour), "hour {hour}");
        }
    }

    #[test]
    fn test_gate_over_configured_subset() {
        let sessions = vec![Session::London];
        assert!(in_trading_session(&sessions, 10));
        // 23:00 is Asian only, which is not configured here
        assert!(!in_trading_session(&sessions, 23));
    }

    #[test]
    fn test_gate_full_set_covers_overlap() {
        let all = vec![Session::London, Session::NewYork, Session::Asian];
        // 13-16 is covered by both London and NY
        assert!(in_trading_session(&all, 14));
        // London+NY+Asian together cover every hour of the day
        for hour in 0..24 {
            assert!(in_trading_session(&all, hour), "hour {hour}");
        }
    }

    #[test]
    fn test_empty_session_set_never_trades() {
        for hour in 0..24 {
            assert!(!in_trading_session(&[], hour));
        }
    }
}
