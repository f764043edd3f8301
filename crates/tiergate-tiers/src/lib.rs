//! # Tiergate Tiers
//!
//! This crate defines the subscription tiers that gate event visibility
//! and the single access rule built on them.
//!
//! ## Overview
//!
//! The tiergate-tiers crate handles:
//! - **Tiers**: The closed, ordered set `free < silver < gold < platinum`
//! - **Access**: The set of tiers at or below a user's tier
//! - **Navigation**: The tier selector derived from the same rule
//!
//! ## Usage
//!
//! ```rust
//! use tiergate_tiers::{allowed_tiers_for, Tier};
//!
//! // Stored labels are parsed at the boundary; invalid ones become `free`
//! let tier = Tier::from_label(Some("gold"));
//!
//! let allowed = allowed_tiers_for(tier);
//! assert_eq!(allowed.labels(), vec!["free", "silver", "gold"]);
//! ```

pub mod access;
pub mod navigation;
pub mod tier;

// Re-export main types for convenience
pub use access::{allowed_tiers_for, allowed_tiers_for_label, AllowedTierSet};
pub use navigation::{select_active_tier, NavEntry, Navigation};
pub use tier::{Tier, UnknownTier};
