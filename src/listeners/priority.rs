//! # Handler priority tiers.
//!
//! [`HandlerPriority`] orders handlers for the same event. Tiers are compared by
//! declaration order; a lower tier always runs before a higher one.
//!
//! ```text
//! First │ Earliest Earlier Early SlightlyEarly │ Normal │ SlightlyLate Late Later Latest │ Last
//! ──────┴──────────────────────────────────────┴────────┴────────────────────────────────┴─────
//! reserved            general (early)          default           general (late)        reserved
//! ```
//!
//! `First` and `Last` are meant for handlers that alter control flow for everyone
//! else (e.g. cancelling up front, or observing the final outcome).

use std::fmt;
use std::str::FromStr;

/// One of the eleven dispatch tiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandlerPriority {
    /// Reserved: runs before every other tier.
    First,
    Earliest,
    Earlier,
    Early,
    SlightlyEarly,
    /// Default tier.
    #[default]
    Normal,
    SlightlyLate,
    Late,
    Later,
    Latest,
    /// Reserved: runs after every other tier.
    Last,
}

impl HandlerPriority {
    /// All tiers in dispatch order.
    pub const ALL: [HandlerPriority; 11] = [
        HandlerPriority::First,
        HandlerPriority::Earliest,
        HandlerPriority::Earlier,
        HandlerPriority::Early,
        HandlerPriority::SlightlyEarly,
        HandlerPriority::Normal,
        HandlerPriority::SlightlyLate,
        HandlerPriority::Late,
        HandlerPriority::Later,
        HandlerPriority::Latest,
        HandlerPriority::Last,
    ];

    /// Zero-based position in dispatch order.
    #[inline]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Returns `true` for the two reserved extremes.
    #[inline]
    pub fn is_reserved(self) -> bool {
        matches!(self, HandlerPriority::First | HandlerPriority::Last)
    }

    /// Stable kebab-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            HandlerPriority::First => "first",
            HandlerPriority::Earliest => "earliest",
            HandlerPriority::Earlier => "earlier",
            HandlerPriority::Early => "early",
            HandlerPriority::SlightlyEarly => "slightly-early",
            HandlerPriority::Normal => "normal",
            HandlerPriority::SlightlyLate => "slightly-late",
            HandlerPriority::Late => "late",
            HandlerPriority::Later => "later",
            HandlerPriority::Latest => "latest",
            HandlerPriority::Last => "last",
        }
    }
}

impl fmt::Display for HandlerPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`HandlerPriority::from_str`] for unknown names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown handler priority '{0}'")]
pub struct ParsePriorityError(String);

impl FromStr for HandlerPriority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        HandlerPriority::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ParsePriorityError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_eleven_tiers_in_order() {
        assert_eq!(HandlerPriority::ALL.len(), 11);
        for (i, p) in HandlerPriority::ALL.iter().enumerate() {
            assert_eq!(p.ordinal(), i);
        }
        assert!(HandlerPriority::ALL.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_default_is_middle_tier() {
        assert_eq!(HandlerPriority::default(), HandlerPriority::Normal);
        assert_eq!(HandlerPriority::Normal.ordinal(), 5);
    }

    #[test]
    fn test_reserved_extremes() {
        let reserved: Vec<_> = HandlerPriority::ALL
            .into_iter()
            .filter(|p| p.is_reserved())
            .collect();
        assert_eq!(reserved, vec![HandlerPriority::First, HandlerPriority::Last]);
    }

    #[test]
    fn test_parse_accepts_display_and_snake_case() {
        assert_eq!("slightly-late".parse::<HandlerPriority>(), Ok(HandlerPriority::SlightlyLate));
        assert_eq!("SLIGHTLY_EARLY".parse::<HandlerPriority>(), Ok(HandlerPriority::SlightlyEarly));
        assert_eq!(HandlerPriority::Latest.to_string(), "latest");
        assert!("urgent".parse::<HandlerPriority>().is_err());
    }
}
