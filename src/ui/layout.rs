use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

mod grid;
mod header;
mod lightbox;
mod popups;

use grid::draw_grid;
use header::{draw_footer, draw_header, draw_status, draw_toolbar};
use lightbox::draw_lightbox;
use popups::{draw_grid_placeholder, draw_help_popup};

pub fn draw(f: &mut Frame, app: &mut App) {
    let theme = app.ui.theme.clone();
    let area = f.area();
    app.ui.hits.clear();

    // ratatui-image renders straight to the terminal, bypassing widget
    // z-order, so grid images are skipped while anything overlays them.
    let overlay_active = app.ui.show_help || app.gallery.is_open();

    if app.is_fullscreen() {
        // No chrome: the grid or lightbox gets every cell.
        if app.gallery.is_open() {
            draw_lightbox(f, app, area, &theme);
        } else if app.ui.show_help {
            draw_grid_placeholder(f, area, &theme);
        } else {
            draw_grid(f, app, area, &theme);
        }
        if app.ui.show_help {
            draw_help_popup(f, app, area, &theme);
        }
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let has_status = app.ui.status_message.is_some();
    let mut constraints = vec![
        Constraint::Length(1), // Header
        Constraint::Length(3), // Toolbar
    ];
    if has_status {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(4)); // Grid
    constraints.push(Constraint::Length(1)); // Footer

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let mut chunk_idx = 0;
    draw_header(f, app, chunks[chunk_idx], &theme);
    chunk_idx += 1;
    draw_toolbar(f, app, chunks[chunk_idx], &theme);
    chunk_idx += 1;

    if has_status {
        draw_status(f, app, chunks[chunk_idx], &theme);
        chunk_idx += 1;
    }

    if overlay_active {
        draw_grid_placeholder(f, chunks[chunk_idx], &theme);
    } else {
        draw_grid(f, app, chunks[chunk_idx], &theme);
    }
    chunk_idx += 1;

    draw_footer(f, app, chunks[chunk_idx], &theme);

    if app.gallery.is_open() {
        draw_lightbox(f, app, area, &theme);
    }
    if app.ui.show_help {
        draw_help_popup(f, app, area, &theme);
    }
}

fn center_vertically(area: Rect, height: u16) -> Rect {
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(area.x, y, area.width, height.min(area.height))
}

/// Centered rectangle of `width` x `height`, clipped to `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn grid_shows_captions_and_records_card_regions() {
        let (mut app, _) = app(desert_page());
        let screen = render(&mut app, 120, 40);

        assert!(screen.contains("Desert"));
        assert!(screen.contains("Ocean"));
        assert!(screen.contains("Slideshow: Off"));
        assert_eq!(app.ui.hits.cards.len(), 3);
        assert!(app.ui.grid_columns >= 1);
    }

    #[test]
    fn lightbox_overlay_shows_caption_and_close_affordance() {
        let (mut app, _) = app(desert_page());
        app.dispatch(crate::app::Action::Open(1));
        let screen = render(&mut app, 100, 30);

        assert!(screen.contains("Ocean"));
        assert!(screen.contains("✕"));
        assert!(app.ui.hits.close.is_some());
        assert!(app.ui.hits.cards.is_empty());
    }

    #[test]
    fn filtered_out_cards_are_not_drawn() {
        let (mut app, _) = app(desert_page());
        app.gallery.apply_query("ocean");
        render(&mut app, 120, 40);

        let drawn: Vec<usize> = app.ui.hits.cards.iter().map(|&(_, i)| i).collect();
        assert_eq!(drawn, vec![1]);
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let (mut app, _) = app(desert_page());
        render(&mut app, 6, 4);
        app.dispatch(crate::app::Action::Open(0));
        render(&mut app, 6, 4);
        app.dispatch(crate::app::Action::ToggleHelp);
        render(&mut app, 6, 4);
    }

    #[test]
    fn centered_is_clipped_to_area() {
        let area = Rect::new(2, 2, 10, 5);
        assert_eq!(centered(area, 4, 3), Rect::new(5, 3, 4, 3));
        assert_eq!(centered(area, 40, 30), area);
    }
}
