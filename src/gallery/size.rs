use std::fmt;

pub const DEFAULT_MIN_SIZE: u32 = 200;
pub const DEFAULT_MAX_SIZE: u32 = 380;
pub const DEFAULT_SIZE: u32 = 220;
pub const DEFAULT_STEP: u32 = 10;

/// Declared bounds of the thumbnail size control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl SizeRange {
    /// Build a range, swapping inverted bounds and forcing a non-zero step.
    pub fn new(min: u32, max: u32, step: u32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min: min.max(1),
            max: max.max(1),
            step: step.max(1),
        }
    }

    pub fn clamp(&self, px: i64) -> u32 {
        px.clamp(self.min as i64, self.max as i64) as u32
    }
}

impl Default for SizeRange {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SIZE, DEFAULT_MAX_SIZE, DEFAULT_STEP)
    }
}

/// Grid layout parameter: auto-fit columns, each `minmax(min_px, 1fr)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTemplate {
    pub min_px: u32,
}

impl GridTemplate {
    /// Number of auto-fit columns for a container `width_px` wide.
    pub fn columns(&self, width_px: u32) -> usize {
        if self.min_px == 0 {
            return 1;
        }
        ((width_px / self.min_px) as usize).max(1)
    }

    /// Column width in terminal cells, sharing the remainder as `1fr` does.
    pub fn column_cells(&self, width_cells: u16, cell_px: u16) -> (usize, u16) {
        let width_px = width_cells as u32 * cell_px.max(1) as u32;
        let columns = self.columns(width_px);
        let cells = (width_cells as usize / columns).max(1) as u16;
        (columns, cells)
    }
}

impl fmt::Display for GridTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "repeat(auto-fit, minmax({}px, 1fr))", self.min_px)
    }
}

/// Current thumbnail size within its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbSize {
    range: SizeRange,
    px: u32,
}

impl ThumbSize {
    pub fn new(range: SizeRange, initial: u32) -> Self {
        Self {
            range,
            px: range.clamp(initial as i64),
        }
    }

    /// Set the size, constrained to the range; returns the applied value.
    pub fn set(&mut self, px: i64) -> u32 {
        self.px = self.range.clamp(px);
        self.px
    }

    /// Move by `steps` multiples of the range step.
    pub fn step_by(&mut self, steps: i32) -> u32 {
        let delta = steps as i64 * self.range.step as i64;
        self.set(self.px as i64 + delta)
    }

    pub fn px(&self) -> u32 {
        self.px
    }

    pub fn range(&self) -> SizeRange {
        self.range
    }

    pub fn template(&self) -> GridTemplate {
        GridTemplate { min_px: self.px }
    }
}
