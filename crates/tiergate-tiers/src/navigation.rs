//! Tier navigation model
//!
//! Describes the tier selector shown to a signed-in user: one entry per
//! tier the user may browse, with exactly one entry marked active.

use serde::Serialize;

use crate::access::allowed_tiers_for;
use crate::tier::Tier;

/// A single entry of the tier selector.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct NavEntry {
    /// Tier this entry selects
    pub tier: Tier,

    /// Human-readable label
    pub label: &'static str,

    /// Whether this entry is the current selection
    pub active: bool,
}

/// Tier selector for a user.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Navigation {
    user_tier: Tier,
    active: Tier,
    entries: Vec<NavEntry>,
}

impl Navigation {
    /// Build the selector for `user_tier`, honoring a requested selection
    /// (typically the `tier` query parameter) when the user may see it.
    pub fn new(user_tier: Tier, requested: Option<&str>) -> Self {
        let active = select_active_tier(user_tier, requested);
        let entries = allowed_tiers_for(user_tier)
            .iter()
            .map(|tier| NavEntry {
                tier,
                label: tier.display_name(),
                active: tier == active,
            })
            .collect();

        Self {
            user_tier,
            active,
            entries,
        }
    }

    /// The user's own tier.
    pub fn user_tier(&self) -> Tier {
        self.user_tier
    }

    /// The currently selected tier.
    pub fn active_tier(&self) -> Tier {
        self.active
    }

    /// Entries, lowest tier first.
    pub fn entries(&self) -> &[NavEntry] {
        &self.entries
    }
}

/// Pick the selected tier.
///
/// A requested tier wins only if it parses and lies within the user's
/// allowed set; otherwise the selection is the user's own tier.
pub fn select_active_tier(user_tier: Tier, requested: Option<&str>) -> Tier {
    let allowed = allowed_tiers_for(user_tier);
    requested
        .and_then(Tier::parse)
        .filter(|tier| allowed.contains(*tier))
        .unwrap_or(user_tier)
}
