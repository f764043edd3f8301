//! Tier-based access filtering
//!
//! A user may see events of their own tier and every tier below it. The
//! set of visible tiers is always a prefix of [`Tier::ALL`], so it is
//! represented by its highest member.

use serde::{Serialize, Serializer};

use crate::tier::Tier;

/// Ordered set of tiers at or below a ceiling tier.
///
/// Never empty and always contains [`Tier::Free`].
///
/// # Examples
///
/// ```
/// use tiergate_tiers::{allowed_tiers_for, Tier};
///
/// let allowed = allowed_tiers_for(Tier::Gold);
/// assert_eq!(allowed.as_slice(), &[Tier::Free, Tier::Silver, Tier::Gold]);
/// assert!(!allowed.contains(Tier::Platinum));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllowedTierSet {
    ceiling: Tier,
}

impl AllowedTierSet {
    /// Build the set of tiers at or below `ceiling`.
    pub fn up_to(ceiling: Tier) -> Self {
        Self { ceiling }
    }

    /// Tiers in the set, lowest first.
    pub fn as_slice(&self) -> &'static [Tier] {
        &Tier::ALL[..=self.ceiling.index()]
    }

    /// Check whether a tier is visible under this set.
    pub fn contains(&self, tier: Tier) -> bool {
        tier <= self.ceiling
    }

    /// Highest tier in the set.
    pub fn max(&self) -> Tier {
        self.ceiling
    }

    /// Lowest tier in the set.
    pub fn min(&self) -> Tier {
        Tier::Free
    }

    /// Number of tiers in the set.
    pub fn len(&self) -> usize {
        self.ceiling.index() + 1
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over the tiers, lowest first.
    pub fn iter(&self) -> impl Iterator<Item = Tier> + 'static {
        self.as_slice().iter().copied()
    }

    /// Stored labels of the tiers, lowest first.
    pub fn labels(&self) -> Vec<&'static str> {
        self.iter().map(|t| t.as_str()).collect()
    }
}

impl Serialize for AllowedTierSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.as_slice())
    }
}

/// Compute the tiers visible to a user holding `tier`.
///
/// This is the single enforcement rule shared by the tier-status route,
/// the events route and the navigation model.
pub fn allowed_tiers_for(tier: Tier) -> AllowedTierSet {
    AllowedTierSet::up_to(tier)
}

/// Compute the visible tiers from a raw stored label.
///
/// Labels outside the known set yield the `free`-only set.
pub fn allowed_tiers_for_label(label: &str) -> AllowedTierSet {
    allowed_tiers_for(Tier::parse(label).unwrap_or_default())
}
