//! Platform size catalog.
//!
//! Maps a [`PlatformProfile`] to the ordered list of icon widths that platform
//! expects. The lists are static; resolving a profile never fails and has no
//! side effects.
//!
//! ```text
//! ios      29 48 55 58 87 88 80 120 180 40 76 152 167 172 196
//! android  48 72 96 144 192
//! all      29 48 55 58 87 88 80 120 180 40 76 152 167 48 72 96 144 192 172 196
//! ```
//!
//! `all` has its own list rather than a concatenation: it holds every iOS and
//! Android width, with the two newest iOS sizes (172, 196) last. 48 appears
//! twice.
//!
//! Catalog order is the iteration order of the pipeline and therefore the
//! entry order of generated archives. It is intentionally not sorted.
//!
//! Parsing a profile string is the only fallible step and happens at the
//! boundary ([`PlatformProfile::from_str`]). Unknown strings are rejected;
//! there is no fallback profile.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// iOS app icon, spotlight, settings and notification widths.
pub const IOS_SIZES: &[u32] = &[
    29, 48, 55, 58, 87, 88, 80, 120, 180, 40, 76, 152, 167, 172, 196,
];

/// Android launcher widths, mdpi through xxxhdpi.
pub const ANDROID_SIZES: &[u32] = &[48, 72, 96, 144, 192];

/// Every iOS and Android width, in the order the combined set is rendered.
pub const ALL_SIZES: &[u32] = &[
    29, 48, 55, 58, 87, 88, 80, 120, 180, 40, 76, 152, 167, 48, 72, 96, 144, 192, 172, 196,
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown platform profile '{0}' (expected one of: ios, android, all)")]
pub struct UnknownProfileError(pub String);

/// Target platform selecting which [`SizeSet`] to render.
///
/// Config files accept the same spellings as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PlatformProfile {
    Ios,
    Android,
    #[default]
    All,
}

impl PlatformProfile {
    pub const ALL_PROFILES: [PlatformProfile; 3] = [Self::Ios, Self::Android, Self::All];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::All => "all",
        }
    }
}

impl fmt::Display for PlatformProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformProfile {
    type Err = UnknownProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL_PROFILES
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownProfileError(s.to_string()))
    }
}

impl TryFrom<String> for PlatformProfile {
    type Error = UnknownProfileError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Ordered icon widths. Duplicates are allowed; see [`SizeSet::distinct`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSet(Vec<u32>);

impl SizeSet {
    pub fn new(widths: Vec<u32>) -> Self {
        Self(widths)
    }

    pub fn widths(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unique widths, keeping the first occurrence of each.
    ///
    /// Two equal widths would produce the same `icon_<w>.png`, so the
    /// pipeline renders each distinct width once.
    pub fn distinct(&self) -> SizeSet {
        let mut seen = std::collections::HashSet::new();
        SizeSet(self.0.iter().copied().filter(|w| seen.insert(*w)).collect())
    }
}

impl<'a> IntoIterator for &'a SizeSet {
    type Item = &'a u32;
    type IntoIter = std::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Resolve the widths for a profile, in catalog order.
pub fn resolve(profile: PlatformProfile) -> SizeSet {
    match profile {
        PlatformProfile::Ios => SizeSet::new(IOS_SIZES.to_vec()),
        PlatformProfile::Android => SizeSet::new(ANDROID_SIZES.to_vec()),
        PlatformProfile::All => SizeSet::new(ALL_SIZES.to_vec()),
    }
}
