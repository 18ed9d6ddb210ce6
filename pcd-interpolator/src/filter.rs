use std::collections::TryReserveError;

use pcd_core::pointcloud::point::{BoundingRect, PointRecord};

use crate::config::{Attribute, ClassFilter, ReturnPolicy, RunConfig};

/// Packs 8-bit channels as `0xAABBGGRR` with alpha forced to 255.
pub fn pack_rgb(rgb: [u8; 3]) -> u32 {
    let [r, g, b] = rgb;
    0xFF00_0000 | ((b as u32) << 16) | ((g as u32) << 8) | r as u32
}

pub fn unpack_rgb(packed: u32) -> [u8; 3] {
    [packed as u8, (packed >> 8) as u8, (packed >> 16) as u8]
}

/// Cell value of a colour: the packed word read as a signed 32-bit integer.
pub fn rgb_to_cell(rgb: [u8; 3]) -> f64 {
    pack_rgb(rgb) as i32 as f64
}

pub fn cell_to_rgb(value: f64) -> [u8; 3] {
    unpack_rgb(value as i32 as u32)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilteredPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Default)]
pub struct FilteredPoints {
    pub points: Vec<FilteredPoint>,
    pub extent: BoundingRect,
}

/// Selects the points of a file that take part in the interpolation.
#[derive(Debug, Clone, Copy)]
pub struct PointFilter {
    attribute: Attribute,
    return_policy: ReturnPolicy,
    excluded_classes: ClassFilter,
}

impl PointFilter {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            attribute: config.attribute,
            return_policy: config.return_policy,
            excluded_classes: config.excluded_classes,
        }
    }

    pub fn accepts(&self, point: &PointRecord) -> bool {
        !point.withheld
            && !self.excluded_classes.is_excluded(point.classification)
            && self.return_policy.accepts(point)
    }

    pub fn extract(&self, point: &PointRecord) -> f64 {
        match self.attribute {
            Attribute::Elevation => point.z,
            Attribute::Intensity => point.intensity as f64,
            Attribute::Classification => point.classification as f64,
            Attribute::ScanAngle => point.scan_angle as f64,
            Attribute::Rgb => rgb_to_cell(point.rgb8()),
        }
    }

    pub fn count(&self, records: &[PointRecord]) -> usize {
        records.iter().filter(|p| self.accepts(p)).count()
    }

    /// Counts the qualifying points first so the buffer is allocated once.
    pub fn apply(&self, records: &[PointRecord]) -> Result<FilteredPoints, TryReserveError> {
        let mut points = Vec::new();
        points.try_reserve_exact(self.count(records))?;

        let mut extent = BoundingRect::default();
        for record in records.iter().filter(|p| self.accepts(p)) {
            extent.expand(record.x, record.y);
            points.push(FilteredPoint {
                x: record.x,
                y: record.y,
                value: self.extract(record),
            });
        }

        Ok(FilteredPoints { points, extent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::class;
    use pcd_core::pointcloud::point::Color;

    fn record(x: f64, y: f64, z: f64) -> PointRecord {
        PointRecord::new(x, y, z)
    }

    fn filter(config: RunConfig) -> PointFilter {
        PointFilter::new(&config)
    }

    #[test]
    fn rgb_round_trip() {
        for v in 0..=255u8 {
            for rgb in [[v, 0, 0], [0, v, 0], [0, 0, v], [v, 255 - v, v / 2]] {
                let packed = pack_rgb(rgb);
                assert_eq!(packed >> 24, 0xFF);
                assert_eq!(unpack_rgb(packed), rgb);
            }
        }
        assert_eq!(pack_rgb([0x11, 0x22, 0x33]), 0xFF33_2211);
    }

    #[test]
    fn rgb_cells_are_negative_and_decode() {
        let value = rgb_to_cell([0x11, 0x22, 0x33]);
        assert_eq!(value, -13_426_159.0);
        assert_eq!(cell_to_rgb(value), [0x11, 0x22, 0x33]);

        for rgb in [[0, 0, 0], [255, 255, 255], [1, 128, 254]] {
            let value = rgb_to_cell(rgb);
            assert!(value < 0.0);
            assert_eq!(cell_to_rgb(value), rgb);
            // the body stores cells as f32
            assert_eq!(cell_to_rgb(value as f32 as f64), rgb);
        }
    }

    #[test]
    fn skips_withheld_and_excluded_points() {
        let config = RunConfig::builder()
            .excluded_classes(ClassFilter::default().exclude(class::LOW_POINT))
            .build()
            .unwrap();
        let filter = filter(config);

        let mut withheld = record(0.0, 0.0, 1.0);
        withheld.withheld = true;
        let mut noise = record(1.0, 0.0, 2.0);
        noise.classification = class::LOW_POINT;
        let mut ground = record(2.0, 3.0, 3.0);
        ground.classification = class::GROUND;

        let filtered = filter.apply(&[withheld, noise, ground]).unwrap();
        assert_eq!(
            filtered.points,
            vec![FilteredPoint {
                x: 2.0,
                y: 3.0,
                value: 3.0
            }]
        );
        assert_eq!(filtered.extent.min, [2.0, 3.0]);
        assert_eq!(filtered.extent.max, [2.0, 3.0]);
    }

    #[test]
    fn applies_return_policy() {
        let returns = [(1, 3), (2, 3), (3, 3), (1, 1)];
        let records: Vec<PointRecord> = returns
            .iter()
            .map(|&(number, count)| {
                let mut p = record(number as f64, count as f64, 0.0);
                p.return_number = number;
                p.number_of_returns = count;
                p
            })
            .collect();

        let count = |policy| {
            filter(RunConfig::builder().return_policy(policy).build().unwrap()).count(&records)
        };
        assert_eq!(count(ReturnPolicy::All), 4);
        assert_eq!(count(ReturnPolicy::First), 2);
        assert_eq!(count(ReturnPolicy::Last), 2);
    }

    #[test]
    fn extracts_selected_attribute() {
        let mut p = record(0.0, 0.0, 12.5);
        p.intensity = 300;
        p.classification = class::HIGH_VEGETATION;
        p.scan_angle = -7.5;
        p.color = Some(Color {
            r: 65535,
            g: 0,
            b: 65535,
        });

        let extract = |attribute| {
            filter(RunConfig::builder().attribute(attribute).build().unwrap()).extract(&p)
        };
        assert_eq!(extract(Attribute::Elevation), 12.5);
        assert_eq!(extract(Attribute::Intensity), 300.0);
        assert_eq!(extract(Attribute::Classification), 5.0);
        assert_eq!(extract(Attribute::ScanAngle), -7.5);
        assert_eq!(extract(Attribute::Rgb), 0xFFFF_00FF_u32 as i32 as f64);
    }

    #[test]
    fn empty_when_everything_is_excluded() {
        let config = RunConfig::builder()
            .excluded_classes(ClassFilter::default().exclude(class::NEVER_CLASSIFIED))
            .build()
            .unwrap();
        let filtered = filter(config)
            .apply(&[record(0.0, 0.0, 1.0), record(1.0, 1.0, 2.0)])
            .unwrap();
        assert!(filtered.points.is_empty());
        assert!(filtered.extent.is_empty());
    }
}
