use super::center_vertically;
use crate::app::{App, Focus, ImagePurpose};
use crate::ui::theme::GridTheme;
use crate::utils::truncate_label;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use ratatui_image::StatefulImage;

/// Border rows plus the caption line.
const CARD_CHROME_ROWS: u16 = 3;
const MIN_IMAGE_ROWS: u16 = 2;

/// Height of a card whose image area is `col_cells` wide, at 4:3.
fn card_rows(col_cells: u16, cell_px: (u16, u16)) -> u16 {
    let (cell_w, cell_h) = (cell_px.0.max(1) as u32, cell_px.1.max(1) as u32);
    let image_px_h = col_cells as u32 * cell_w * 3 / 4;
    let rows = (image_px_h / cell_h).min(u16::MAX as u32) as u16;
    rows.max(MIN_IMAGE_ROWS) + CARD_CHROME_ROWS
}

/// First row to draw so `cursor_row` stays on screen.
fn scroll_for(
    cursor_row: usize,
    scroll_row: usize,
    visible_rows: usize,
    total_rows: usize,
) -> usize {
    let visible_rows = visible_rows.max(1);
    let mut scroll = scroll_row;
    if cursor_row < scroll {
        scroll = cursor_row;
    } else if cursor_row >= scroll + visible_rows {
        scroll = cursor_row + 1 - visible_rows;
    }
    scroll.min(total_rows.saturating_sub(visible_rows))
}

pub(super) fn draw_grid(f: &mut Frame, app: &mut App, area: Rect, theme: &GridTheme) {
    let cards = app.visible_cards();
    if cards.is_empty() {
        let message = if app.gallery.index().is_empty() {
            "No photos"
        } else {
            "No matching photos"
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(theme.fg_muted))
            .alignment(Alignment::Center);
        f.render_widget(empty, center_vertically(area, 1));
        return;
    }
    if area.width == 0 || area.height == 0 {
        return;
    }

    // Resolve the auto-fit template against the current width.
    let template = app.gallery.surface().grid;
    let (columns, col_cells) = template.column_cells(area.width, app.ui.cell_px.0);
    app.ui.grid_columns = columns;

    let card_h = card_rows(col_cells, app.ui.cell_px).min(area.height);
    let visible_rows = (area.height / card_h.max(1)).max(1) as usize;
    let total_rows = cards.len().div_ceil(columns);

    let cursor = app.ui.cursor.min(cards.len() - 1);
    app.ui.cursor = cursor;
    app.ui.scroll_row = scroll_for(
        cursor / columns,
        app.ui.scroll_row,
        visible_rows,
        total_rows,
    );

    let start = app.ui.scroll_row * columns;
    let end = (start + visible_rows * columns).min(cards.len());

    // Visible thumbnails first, then one row ahead.
    for &item in &cards[start..end] {
        app.request_thumbnail(item);
    }
    for &item in &cards[end..(end + columns).min(cards.len())] {
        app.request_thumbnail(item);
    }

    let grid_focused = app.ui.focus == Focus::Grid;

    for (slot, position) in (start..end).enumerate() {
        let item = cards[position];
        let col = (slot % columns) as u16;
        let row = (slot / columns) as u16;

        let x = area.x + col * col_cells;
        let y = area.y + row * card_h;
        if x + col_cells > area.right() || y + card_h > area.bottom() {
            continue;
        }
        let card_area = Rect::new(x, y, col_cells, card_h);
        app.ui.hits.cards.push((card_area, item));

        let caption = app
            .gallery
            .index()
            .get(item)
            .map(|i| i.display_caption().to_string())
            .unwrap_or_default();
        let is_cursor = grid_focused && position == cursor;
        let is_loading = app.is_loading(item);

        // Clear previous image artifacts (Kitty protocol caches images)
        f.render_widget(Clear, card_area);

        let border_style = if is_cursor {
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.border)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(theme.card_bg));
        let inner = block.inner(card_area);
        f.render_widget(block, card_area);

        if inner.height == 0 {
            continue;
        }
        let image_area = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);
        let caption_area = Rect::new(inner.x, inner.bottom() - 1, inner.width, 1);

        if let Some(protocol) = app.get_thumbnail(item) {
            f.render_stateful_widget(StatefulImage::new(None), image_area, protocol);
        } else if is_loading {
            let loading = Paragraph::new("...")
                .style(Style::default().fg(theme.accent))
                .alignment(Alignment::Center);
            f.render_widget(loading, center_vertically(image_area, 1));
        } else if app.has_failed(item, ImagePurpose::Thumb) {
            let unreadable = Paragraph::new("unreadable")
                .style(Style::default().fg(theme.fg_muted))
                .alignment(Alignment::Center);
            f.render_widget(unreadable, center_vertically(image_area, 1));
        }

        let caption_style = if is_cursor {
            Style::default().fg(theme.highlight)
        } else {
            Style::default().fg(theme.fg_secondary)
        };
        let label = Paragraph::new(truncate_label(&caption, inner.width as usize))
            .style(caption_style)
            .alignment(Alignment::Center);
        f.render_widget(label, caption_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_rows_follow_column_width() {
        // 30 cells * 8px = 240px wide, 180px tall image, 16px rows.
        assert_eq!(card_rows(30, (8, 16)), 11 + CARD_CHROME_ROWS);
        assert_eq!(card_rows(1, (8, 16)), MIN_IMAGE_ROWS + CARD_CHROME_ROWS);
    }

    #[test]
    fn scroll_keeps_cursor_row_visible() {
        assert_eq!(scroll_for(0, 0, 3, 10), 0);
        assert_eq!(scroll_for(5, 0, 3, 10), 3);
        assert_eq!(scroll_for(1, 3, 3, 10), 1);
        // Never scrolls past the last full page.
        assert_eq!(scroll_for(9, 9, 3, 10), 7);
    }
}
