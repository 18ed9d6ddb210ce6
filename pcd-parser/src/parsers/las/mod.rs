use std::path::{Path, PathBuf};

use las::Reader;

use pcd_core::pointcloud::point::{Color, PointRecord};

use super::{check_and_get_extension, Parser, ParserProvider};
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, Default)]
pub struct LasParserProvider;

impl ParserProvider for LasParserProvider {
    fn get_parser(&self, path: &Path) -> Box<dyn Parser> {
        Box::new(LasParser {
            filename: path.to_path_buf(),
        })
    }
}

pub struct LasParser {
    pub filename: PathBuf,
}

impl LasParser {
    fn open(&self) -> Result<Reader, ParseError> {
        check_and_get_extension(&self.filename)?;
        Reader::from_path(&self.filename).map_err(|source| ParseError::Las {
            path: self.filename.clone(),
            source,
        })
    }

    fn convert_las_point(las_point: las::Point) -> PointRecord {
        PointRecord {
            x: las_point.x,
            y: las_point.y,
            z: las_point.z,
            intensity: las_point.intensity,
            classification: u8::from(las_point.classification),
            return_number: las_point.return_number,
            number_of_returns: las_point.number_of_returns,
            scan_angle: las_point.scan_angle,
            withheld: las_point.is_withheld,
            color: las_point.color.map(|c| Color {
                r: c.red,
                g: c.green,
                b: c.blue,
            }),
        }
    }
}

impl Parser for LasParser {
    fn point_count(&self) -> Result<u64, ParseError> {
        let reader = self.open()?;
        Ok(reader.header().number_of_points())
    }

    fn parse(&self) -> Result<Vec<PointRecord>, ParseError> {
        let start = std::time::Instant::now();
        let mut reader = self.open()?;

        let declared = reader.header().number_of_points();
        let capacity = usize::try_from(declared).map_err(|_| ParseError::TooManyPoints {
            path: self.filename.clone(),
            count: declared,
        })?;
        let mut points = Vec::new();
        points.try_reserve_exact(capacity)?;

        for las_point in reader.points() {
            let las_point = las_point.map_err(|source| ParseError::Las {
                path: self.filename.clone(),
                source,
            })?;
            points.push(Self::convert_las_point(las_point));
        }

        log::debug!(
            "read {} points from {:?} in {:?}",
            points.len(),
            self.filename,
            start.elapsed()
        );
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_read_error() {
        let parser = LasParserProvider.get_parser(Path::new("does/not/exist.las"));
        assert!(matches!(parser.point_count(), Err(ParseError::Las { .. })));
        assert!(matches!(parser.parse(), Err(ParseError::Las { .. })));
    }

    #[test]
    fn unsupported_extension_is_rejected_before_opening() {
        let parser = LasParserProvider.get_parser(Path::new("points.xyz"));
        assert!(matches!(
            parser.point_count(),
            Err(ParseError::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn converts_las_attributes() {
        let las_point = las::Point {
            x: 1.5,
            y: 2.5,
            z: 3.5,
            intensity: 700,
            return_number: 2,
            number_of_returns: 3,
            classification: las::point::Classification::Ground,
            is_withheld: true,
            scan_angle: -12.0,
            color: Some(las::Color {
                red: 10,
                green: 20,
                blue: 30,
            }),
            ..Default::default()
        };

        let record = LasParser::convert_las_point(las_point);
        assert_eq!((record.x, record.y, record.z), (1.5, 2.5, 3.5));
        assert_eq!(record.intensity, 700);
        assert_eq!(record.return_number, 2);
        assert_eq!(record.number_of_returns, 3);
        assert_eq!(record.classification, 2);
        assert!(record.withheld);
        assert_eq!(record.scan_angle, -12.0);
        assert_eq!(
            record.color,
            Some(Color {
                r: 10,
                g: 20,
                b: 30
            })
        );
    }
}
