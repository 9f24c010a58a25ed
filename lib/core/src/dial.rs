//! Dial settings: per-request positions along named dimensions.

use crate::{Error, Result, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The neutral dial position for every dimension.
pub const NEUTRAL: f32 = 0.5;

/// Validated mapping from dimension name to a dial value in [0, 1].
///
/// Values outside the range (or NaN) are rejected rather than clamped.
/// Iteration is ordered by dimension name, so results never depend on the
/// order the caller supplied the dials in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f32>", into = "BTreeMap<String, f32>")]
pub struct DialSetting {
    values: BTreeMap<String, f32>,
}

impl DialSetting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a setting from `(dimension, value)` pairs, rejecting the first
    /// invalid value.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f32)>,
        K: Into<String>,
    {
        let mut setting = Self::new();
        for (dimension, value) in pairs {
            setting.set(dimension, value)?;
        }
        Ok(setting)
    }

    /// Set one dial, replacing any previous value for that dimension.
    pub fn set(&mut self, dimension: impl Into<String>, value: f32) -> Result<()> {
        let dimension = dimension.into();
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::DialOutOfRange {
                stage: Stage::Dial,
                dimension,
                value,
            });
        }
        self.values.insert(dimension, value);
        Ok(())
    }

    /// Builder-style variant of [`DialSetting::set`].
    pub fn with(mut self, dimension: impl Into<String>, value: f32) -> Result<Self> {
        self.set(dimension, value)?;
        Ok(self)
    }

    #[inline]
    pub fn get(&self, dimension: &str) -> Option<f32> {
        self.values.get(dimension).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// True when every dial sits at the neutral point (or there are none).
    pub fn is_neutral(&self) -> bool {
        self.values.values().all(|v| *v == NEUTRAL)
    }

    /// Parse `name=value` pairs such as `love=0.9`.
    pub fn parse_assignment(assignment: &str) -> Result<(String, f32)> {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            Error::InvalidConfig(format!("dial `{assignment}` must look like name=value"))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidConfig(format!("dial `{assignment}` has an empty name")));
        }
        let value: f32 = value
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("dial `{assignment}` has a non-numeric value")))?;
        Ok((name.to_string(), value))
    }
}

impl TryFrom<BTreeMap<String, f32>> for DialSetting {
    type Error = Error;

    fn try_from(values: BTreeMap<String, f32>) -> Result<Self> {
        Self::from_pairs(values)
    }
}

impl From<DialSetting> for BTreeMap<String, f32> {
    fn from(setting: DialSetting) -> Self {
        setting.values
    }
}

/// Human-readable band a dial value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialLevel {
    VeryLow,
    ModeratelyLow,
    Balanced,
    ModeratelyHigh,
    VeryHigh,
}

impl DialLevel {
    pub fn of(value: f32) -> Self {
        if value < 0.2 {
            DialLevel::VeryLow
        } else if value < 0.4 {
            DialLevel::ModeratelyLow
        } else if value < 0.6 {
            DialLevel::Balanced
        } else if value < 0.8 {
            DialLevel::ModeratelyHigh
        } else {
            DialLevel::VeryHigh
        }
    }
}

impl fmt::Display for DialLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DialLevel::VeryLow => "very low",
            DialLevel::ModeratelyLow => "moderately low",
            DialLevel::Balanced => "balanced",
            DialLevel::ModeratelyHigh => "moderately high",
            DialLevel::VeryHigh => "very high",
        };
        f.write_str(label)
    }
}
