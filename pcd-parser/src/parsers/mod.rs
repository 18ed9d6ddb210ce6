use std::{ffi::OsStr, path::Path};

use pcd_core::pointcloud::point::PointRecord;

use crate::error::ParseError;

pub mod las;

pub trait ParserProvider: Send + Sync {
    fn get_parser(&self, path: &Path) -> Box<dyn Parser>;
}

pub trait Parser {
    /// Number of point records declared by the file. Reads metadata only.
    fn point_count(&self) -> Result<u64, ParseError>;

    fn parse(&self) -> Result<Vec<PointRecord>, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Las,
    Laz,
}

pub fn get_extension(extension: &str) -> Option<Extension> {
    match extension.to_ascii_lowercase().as_str() {
        "las" => Some(Extension::Las),
        "laz" => Some(Extension::Laz),
        _ => None,
    }
}

pub fn check_and_get_extension(path: &Path) -> Result<Extension, ParseError> {
    path.extension()
        .and_then(OsStr::to_str)
        .and_then(get_extension)
        .ok_or_else(|| ParseError::UnsupportedExtension(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(get_extension("las"), Some(Extension::Las));
        assert_eq!(get_extension("LAZ"), Some(Extension::Laz));
        assert_eq!(get_extension("csv"), None);
    }

    #[test]
    fn rejects_unknown_files() {
        assert_eq!(
            check_and_get_extension(Path::new("tile.Las")).unwrap(),
            Extension::Las
        );
        assert!(matches!(
            check_and_get_extension(Path::new("tile.txt")),
            Err(ParseError::UnsupportedExtension(_))
        ));
        assert!(matches!(
            check_and_get_extension(Path::new("tile")),
            Err(ParseError::UnsupportedExtension(_))
        ));
    }
}
