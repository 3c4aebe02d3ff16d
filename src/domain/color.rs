//! Per-region color tokens.
//!
//! Colors are opaque `#rrggbb` strings for the renderer. Callers may override
//! any region; everything else falls back to a fixed palette indexed by the
//! region's position in the selection.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::RegionFilter;
use crate::error::CoreError;

/// Qualitative palette used when no override exists.
pub const PALETTE: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

/// A validated `#rrggbb` color (stored lowercase).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorToken(String);

impl ColorToken {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let s = s.trim();
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| CoreError::InvalidColor(s.to_string()))?;
        Ok(Self(format!("#{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        // Validated on construction, so every channel parses.
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        (channel(1), channel(3), channel(5))
    }
}

impl FromStr for ColorToken {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ColorToken {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ColorToken> for String {
    fn from(value: ColorToken) -> Self {
        value.0
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Palette color for the region at `index` in the selection (cycles).
pub fn default_color(index: usize) -> ColorToken {
    ColorToken(PALETTE[index % PALETTE.len()].to_string())
}

/// Region → color for one render request, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorAssignment(IndexMap<String, ColorToken>);

impl ColorAssignment {
    pub fn get(&self, region: &str) -> Option<&ColorToken> {
        self.0.get(region)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColorToken)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Assign a color to every selected region: override first, palette otherwise.
///
/// Overrides for regions outside the filter are ignored.
pub fn resolve_colors(filter: &RegionFilter, overrides: &HashMap<String, ColorToken>) -> ColorAssignment {
    let map = filter
        .iter()
        .enumerate()
        .map(|(idx, region)| {
            let color = overrides
                .get(region)
                .cloned()
                .unwrap_or_else(|| default_color(idx));
            (region.to_string(), color)
        })
        .collect();
    ColorAssignment(map)
}

/// Parse a `REGION=#rrggbb` CLI pair.
pub fn parse_color_override(s: &str) -> Result<(String, ColorToken), CoreError> {
    let (region, color) = s
        .rsplit_once('=')
        .ok_or_else(|| CoreError::InvalidColor(s.to_string()))?;
    let region = region.trim();
    if region.is_empty() {
        return Err(CoreError::InvalidColor(s.to_string()));
    }
    Ok((region.to_string(), ColorToken::parse(color)?))
}
