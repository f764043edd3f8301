//! Subscription tiers
//!
//! This module defines the fixed, ordered set of subscription tiers that
//! gate which events a user may see.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Subscription tier of a user or an event.
///
/// Declaration order is the privilege order, so the derived `Ord` is the
/// tier hierarchy: `Free < Silver < Gold < Platinum`.
///
/// # Examples
///
/// ```
/// use tiergate_tiers::Tier;
///
/// assert!(Tier::Gold > Tier::Silver);
/// assert_eq!(Tier::parse("platinum"), Some(Tier::Platinum));
/// assert_eq!(Tier::from_label(Some("bronze")), Tier::Free);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Lowest tier, visible to every authenticated user
    Free,

    /// Silver subscription
    Silver,

    /// Gold subscription
    Gold,

    /// Platinum subscription
    Platinum,
}

impl Tier {
    /// Every tier, lowest first.
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Silver, Tier::Gold, Tier::Platinum];

    /// Position of this tier in [`Tier::ALL`].
    pub fn index(self) -> usize {
        match self {
            Tier::Free => 0,
            Tier::Silver => 1,
            Tier::Gold => 2,
            Tier::Platinum => 3,
        }
    }

    /// Parse a stored tier label.
    ///
    /// Only the exact lowercase labels are members of the set; anything
    /// else (including `""` and differently cased labels) is rejected.
    ///
    /// # Returns
    ///
    /// `Some(Tier)` if valid, `None` otherwise
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Tier::Free),
            "silver" => Some(Tier::Silver),
            "gold" => Some(Tier::Gold),
            "platinum" => Some(Tier::Platinum),
            _ => None,
        }
    }

    /// Coerce an optional raw label into a tier.
    ///
    /// Absent or unrecognized labels are downgraded to [`Tier::Free`],
    /// never rejected.
    pub fn from_label(label: Option<&str>) -> Self {
        label.and_then(Self::parse).unwrap_or_default()
    }

    /// Get string representation of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
            Tier::Platinum => "platinum",
        }
    }

    /// Get a human-readable display name for the tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Free => "Free",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
        }
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Free
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label is not one of the known tiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tier label: {0:?}")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownTier(s.to_string()))
    }
}
