use std::str::FromStr;

use serde::Serialize;

use pcd_core::pointcloud::point::PointRecord;
use pcd_exporter::raster::{DataScale, Palette};

use crate::error::ConfigError;

/// Standard ASPRS classification codes that can be excluded by name.
pub mod class {
    pub const NEVER_CLASSIFIED: u8 = 0;
    pub const UNCLASSIFIED: u8 = 1;
    pub const GROUND: u8 = 2;
    pub const LOW_VEGETATION: u8 = 3;
    pub const MEDIUM_VEGETATION: u8 = 4;
    pub const HIGH_VEGETATION: u8 = 5;
    pub const BUILDING: u8 = 6;
    pub const LOW_POINT: u8 = 7;
    pub const MODEL_KEY_POINT: u8 = 8;
    pub const WATER: u8 = 9;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Elevation,
    Intensity,
    Classification,
    ScanAngle,
    Rgb,
}

impl Attribute {
    pub fn data_scale(&self) -> DataScale {
        match self {
            Attribute::Rgb => DataScale::Rgb,
            _ => DataScale::Continuous,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Attribute::Rgb => Palette::Rgb,
            Attribute::Intensity => Palette::Grey,
            _ => Palette::Spectrum,
        }
    }
}

impl FromStr for Attribute {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "z (elevation)" | "elevation" | "z" => Ok(Attribute::Elevation),
            "intensity" => Ok(Attribute::Intensity),
            "classification" => Ok(Attribute::Classification),
            "scan angle" | "scan_angle" | "scan-angle" => Ok(Attribute::ScanAngle),
            "rgb data" | "rgb" => Ok(Attribute::Rgb),
            _ => Err(ConfigError::UnknownAttribute(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnPolicy {
    All,
    First,
    Last,
}

impl ReturnPolicy {
    pub fn accepts(&self, point: &PointRecord) -> bool {
        match self {
            ReturnPolicy::All => true,
            ReturnPolicy::First => point.is_first_return(),
            ReturnPolicy::Last => point.is_last_return(),
        }
    }
}

impl FromStr for ReturnPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all points" | "all" => Ok(ReturnPolicy::All),
            "first return" | "first" => Ok(ReturnPolicy::First),
            "last return" | "last" => Ok(ReturnPolicy::Last),
            _ => Err(ConfigError::UnknownReturnPolicy(s.to_string())),
        }
    }
}

pub const CLASS_SLOTS: usize = 32;

/// Fixed-size exclusion table indexed by classification code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassFilter {
    excluded: [bool; CLASS_SLOTS],
}

impl ClassFilter {
    /// Codes outside the table are ignored.
    pub fn exclude(mut self, code: u8) -> Self {
        if let Some(slot) = self.excluded.get_mut(code as usize) {
            *slot = true;
        }
        self
    }

    pub fn exclude_if(self, code: u8, condition: bool) -> Self {
        if condition {
            self.exclude(code)
        } else {
            self
        }
    }

    pub fn is_excluded(&self, code: u8) -> bool {
        self.excluded.get(code as usize).copied().unwrap_or(false)
    }
}

/// Parses a maximum search distance; `"not specified"` or an empty string disables it.
pub fn parse_max_distance(value: &str) -> Result<Option<f64>, ConfigError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("not specified") {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber {
            name: "maximum search distance",
            value: value.to_string(),
        })
}

/// Settings shared read-only by every file of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    pub suffix: String,
    pub attribute: Attribute,
    pub return_policy: ReturnPolicy,
    pub weight: f64,
    pub max_distance: Option<f64>,
    pub neighbours: usize,
    pub resolution: f64,
    pub excluded_classes: ClassFilter,
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Squared search radius, infinite when no maximum distance is set.
    pub fn max_distance_sq(&self) -> f64 {
        self.max_distance
            .map(|d| d * d)
            .unwrap_or(f64::INFINITY)
    }
}

#[derive(Debug, Clone)]
pub struct RunConfigBuilder {
    suffix: String,
    attribute: Attribute,
    return_policy: ReturnPolicy,
    weight: f64,
    max_distance: Option<f64>,
    neighbours: usize,
    resolution: f64,
    excluded_classes: ClassFilter,
}

impl Default for RunConfigBuilder {
    fn default() -> Self {
        Self {
            suffix: "IDW".to_string(),
            attribute: Attribute::Elevation,
            return_policy: ReturnPolicy::All,
            weight: 2.0,
            max_distance: None,
            neighbours: 8,
            resolution: 1.0,
            excluded_classes: ClassFilter::default(),
        }
    }
}

impl RunConfigBuilder {
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into().trim().to_string();
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn return_policy(mut self, return_policy: ReturnPolicy) -> Self {
        self.return_policy = return_policy;
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn max_distance(mut self, max_distance: Option<f64>) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn neighbours(mut self, neighbours: usize) -> Self {
        self.neighbours = neighbours;
        self
    }

    pub fn resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn excluded_classes(mut self, excluded_classes: ClassFilter) -> Self {
        self.excluded_classes = excluded_classes;
        self
    }

    pub fn build(self) -> Result<RunConfig, ConfigError> {
        if !(self.resolution > 0.0 && self.resolution.is_finite()) {
            return Err(ConfigError::NonPositiveResolution(self.resolution));
        }
        if !(self.weight >= 0.0 && self.weight.is_finite()) {
            return Err(ConfigError::InvalidWeight(self.weight));
        }
        if self.neighbours == 0 {
            return Err(ConfigError::InvalidNeighbourCount);
        }
        if let Some(d) = self.max_distance {
            if !(d > 0.0 && d.is_finite()) {
                return Err(ConfigError::InvalidMaxDistance(d));
            }
        }

        Ok(RunConfig {
            suffix: self.suffix,
            attribute: self.attribute,
            return_policy: self.return_policy,
            weight: self.weight,
            max_distance: self.max_distance,
            neighbours: self.neighbours,
            resolution: self.resolution,
            excluded_classes: self.excluded_classes,
        })
    }
}
