/// RGBA color with 8 bits per channel, matching the canvas pixel layout
pub type Rgba = [u8; 4];

/// Identifies one ongoing contact with the surface (e.g. one tool tip)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ContactId(pub u32);

/// Axis-aligned pixel rectangle (x, y, width, height)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from inclusive corner coordinates
    pub fn from_inclusive(x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Self {
        Self {
            x: x_min,
            y: y_min,
            width: x_max - x_min + 1,
            height: y_max - y_min + 1,
        }
    }

    /// Smallest rectangle containing both
    pub fn union(self, other: PixelRect) -> PixelRect {
        let x_min = self.x.min(other.x);
        let y_min = self.y.min(other.y);
        let x_end = (self.x + self.width).max(other.x + other.width);
        let y_end = (self.y + self.height).max(other.y + other.height);
        PixelRect::new(x_min, y_min, x_end - x_min, y_end - y_min)
    }

    /// Union of two optional regions
    pub fn merge(a: Option<PixelRect>, b: Option<PixelRect>) -> Option<PixelRect> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, None) => a,
            (None, b) => b,
        }
    }

    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}
