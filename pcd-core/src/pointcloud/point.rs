#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl Color {
    /// LAS stores colour channels normalized to 16 bits.
    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            (self.r as f64 / 65535.0 * 255.0) as u8,
            (self.g as f64 / 65535.0 * 255.0) as u8,
            (self.b as f64 / 65535.0 * 255.0) as u8,
        ]
    }
}

/// A single point record as delivered by a point-cloud reader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub intensity: u16,
    pub classification: u8,
    pub return_number: u8,
    pub number_of_returns: u8,
    pub scan_angle: f32,
    pub withheld: bool,
    pub color: Option<Color>,
}

impl PointRecord {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            return_number: 1,
            number_of_returns: 1,
            ..Default::default()
        }
    }

    pub fn is_first_return(&self) -> bool {
        self.return_number == 1
    }

    pub fn is_last_return(&self) -> bool {
        self.return_number == self.number_of_returns
    }

    /// Points without colour channels are treated as black.
    pub fn rgb8(&self) -> [u8; 3] {
        self.color.map(|c| c.to_rgb8()).unwrap_or([0, 0, 0])
    }
}

// Planimetric (x, y) extent of a set of points. An empty rect has inverted bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRect {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Default for BoundingRect {
    fn default() -> Self {
        Self {
            min: [f64::INFINITY, f64::INFINITY],
            max: [f64::NEG_INFINITY, f64::NEG_INFINITY],
        }
    }
}

impl BoundingRect {
    pub fn expand(&mut self, x: f64, y: f64) {
        self.min[0] = self.min[0].min(x);
        self.min[1] = self.min[1].min(y);
        self.max[0] = self.max[0].max(x);
        self.max[1] = self.max[1].max(y);
    }

    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1]
    }
}
