//! Whitebox raster output.
//!
//! A raster is a pair of files: a `.dep` text header made of `Key:\tValue`
//! lines and a `.tas` body holding the cell values as row-major `f32` in the
//! host byte order, matching the `float` data type the header declares.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use byteorder::{NativeEndian, WriteBytesExt as _};
use chrono::Local;

use pcd_core::raster::{GridSpec, Surface, NO_DATA};

use crate::error::ExportError;

pub const HEADER_EXTENSION: &str = "dep";
pub const BODY_EXTENSION: &str = "tas";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterPaths {
    pub header: PathBuf,
    pub body: PathBuf,
}

impl RasterPaths {
    /// `dir/tile.las` with suffix `IDW` becomes `dir/tile IDW.dep` and `dir/tile IDW.tas`.
    pub fn derive(input: &Path, suffix: &str) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = suffix.trim();
        let name = if suffix.is_empty() {
            stem
        } else {
            format!("{} {}", stem, suffix)
        };

        let header = input.with_file_name(format!("{}.{}", name, HEADER_EXTENSION));
        let body = input.with_file_name(format!("{}.{}", name, BODY_EXTENSION));
        Self { header, body }
    }

    /// Deletes a stale header and its body. Nothing happens when no header exists.
    pub fn remove_existing(&self) -> Result<(), ExportError> {
        if !self.header.exists() {
            return Ok(());
        }
        log::debug!("removing existing output {:?}", self.header);
        fs::remove_file(&self.header).map_err(ExportError::io(&self.header))?;
        match fs::remove_file(&self.body) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ExportError::io(&self.body)(e)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataScale {
    Continuous,
    Rgb,
}

impl DataScale {
    pub fn label(&self) -> &'static str {
        match self {
            DataScale::Continuous => "continuous",
            DataScale::Rgb => "rgb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Rgb,
    Grey,
    Spectrum,
}

impl Palette {
    pub fn file_name(&self) -> &'static str {
        match self {
            Palette::Rgb => "rgb.pal",
            Palette::Grey => "grey.pal",
            Palette::Spectrum => "spectrum.pal",
        }
    }
}

pub fn byte_order_label() -> &'static str {
    if cfg!(target_endian = "little") {
        "LITTLE_ENDIAN"
    } else {
        "BIG_ENDIAN"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterHeader {
    pub grid: GridSpec,
    pub data_scale: DataScale,
    pub palette: Palette,
    pub metadata: Vec<String>,
}

impl RasterHeader {
    pub fn new(grid: GridSpec, data_scale: DataScale, palette: Palette) -> Self {
        Self {
            grid,
            data_scale,
            palette,
            metadata: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, entry: impl Into<String>) -> Self {
        self.metadata.push(entry.into());
        self
    }

    /// Records the producing tool and the current local time.
    pub fn with_creation_metadata(self, tool_name: &str) -> Self {
        self.with_metadata(format!("Created by the {} tool.", tool_name))
            .with_metadata(format!(
                "Created on {}",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            ))
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let grid = &self.grid;
        // Min and Max are placeholders; readers recompute them from the body.
        writeln!(writer, "Min:\t{}", f64::from(i32::MAX))?;
        writeln!(writer, "Max:\t{}", f64::from(i32::MIN))?;
        writeln!(writer, "North:\t{}", grid.north)?;
        writeln!(writer, "South:\t{}", grid.south)?;
        writeln!(writer, "East:\t{}", grid.east)?;
        writeln!(writer, "West:\t{}", grid.west)?;
        writeln!(writer, "Cols:\t{}", grid.cols)?;
        writeln!(writer, "Rows:\t{}", grid.rows)?;
        writeln!(writer, "Data Type:\tfloat")?;
        writeln!(writer, "Z Units:\tnot specified")?;
        writeln!(writer, "XY Units:\tnot specified")?;
        writeln!(writer, "Projection:\tnot specified")?;
        writeln!(writer, "Data Scale:\t{}", self.data_scale.label())?;
        writeln!(writer, "Preferred Palette:\t{}", self.palette.file_name())?;
        writeln!(writer, "NoData:\t{}", NO_DATA)?;
        writeln!(writer, "Byte Order:\t{}", byte_order_label())?;
        for entry in &self.metadata {
            writeln!(writer, "Metadata Entry:\t{}", entry)?;
        }
        Ok(())
    }
}

/// Writes every cell as a 4-byte float.
pub fn write_body<W: Write>(surface: &Surface, writer: &mut W) -> io::Result<()> {
    for &value in surface.values() {
        writer.write_f32::<NativeEndian>(value as f32)?;
    }
    Ok(())
}

/// Writes `surface` to `paths`, replacing any previous output.
pub fn write_raster(
    paths: &RasterPaths,
    header: &RasterHeader,
    surface: &Surface,
) -> Result<(), ExportError> {
    paths.remove_existing()?;

    let file = File::create(&paths.header).map_err(ExportError::io(&paths.header))?;
    let mut writer = BufWriter::new(file);
    header
        .write_to(&mut writer)
        .and_then(|_| writer.flush())
        .map_err(ExportError::io(&paths.header))?;

    let file = File::create(&paths.body).map_err(ExportError::io(&paths.body))?;
    let mut writer = BufWriter::new(file);
    write_body(surface, &mut writer)
        .and_then(|_| writer.flush())
        .map_err(ExportError::io(&paths.body))?;

    log::info!(
        "wrote {} x {} raster to {:?}",
        surface.grid().rows,
        surface.grid().cols,
        paths.header
    );
    Ok(())
}
