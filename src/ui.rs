pub mod layout;
pub mod theme;

pub use layout::draw;

/// Fallback cell size when the terminal doesn't report pixels.
const FALLBACK_CELL_PX: (u16, u16) = (8, 16);

/// Pixel size of one terminal cell (width, height).
pub fn cell_size_px() -> (u16, u16) {
    crossterm::terminal::window_size()
        .ok()
        .and_then(|size| cell_size_from(size.columns, size.rows, size.width, size.height))
        .unwrap_or(FALLBACK_CELL_PX)
}

fn cell_size_from(columns: u16, rows: u16, width: u16, height: u16) -> Option<(u16, u16)> {
    if columns == 0 || rows == 0 || width == 0 || height == 0 {
        return None;
    }
    Some(((width / columns).max(1), (height / rows).max(1)))
}
