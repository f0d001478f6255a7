use super::{center_vertically, centered};
use crate::app::{App, ImagePurpose};
use crate::ui::theme::GridTheme;
use crate::utils::truncate_label;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use ratatui_image::StatefulImage;
use std::time::Duration;

const CLOSE_GLYPH: &str = " ✕ ";

/// "3/12" within the filtered view, "–/12" when the item is filtered out.
fn position_label(position: Option<usize>, len: usize) -> String {
    match position {
        Some(p) => format!("{}/{}", p + 1, len),
        None => format!("–/{}", len),
    }
}

pub(super) fn draw_lightbox(f: &mut Frame, app: &mut App, area: Rect, theme: &GridTheme) {
    let Some(slot) = app.gallery.surface().lightbox.clone() else {
        return;
    };

    // Backdrop: clicks here close the lightbox.
    f.render_widget(Clear, area);
    f.render_widget(
        Block::default().style(Style::default().bg(theme.backdrop)),
        area,
    );

    let panel_area = centered(
        area,
        area.width.saturating_sub(4).max(area.width * 9 / 10),
        area.height.saturating_sub(2).max(area.height * 9 / 10),
    );
    let position = position_label(
        app.gallery.filtered().position(slot.item),
        app.gallery.filtered().len(),
    );

    let title_width = panel_area.width.saturating_sub(12) as usize;
    let block = Block::default()
        .title(format!(" {} ", truncate_label(&slot.caption, title_width)))
        .title_style(
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg));
    let inner = block.inner(panel_area);
    f.render_widget(block, panel_area);
    app.ui.hits.lightbox = Some(panel_area);

    // Close affordance on the top border.
    let close_width = CLOSE_GLYPH.chars().count() as u16;
    if panel_area.width > close_width + 2 {
        let close_area = Rect::new(
            panel_area.right() - close_width - 1,
            panel_area.y,
            close_width,
            1,
        );
        f.render_widget(
            Paragraph::new(CLOSE_GLYPH).style(
                Style::default()
                    .fg(theme.warning)
                    .add_modifier(Modifier::BOLD),
            ),
            close_area,
        );
        app.ui.hits.close = Some(close_area);
    }

    if inner.height < 2 {
        return;
    }
    let image_area = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);
    let info_area = Rect::new(inner.x, inner.bottom() - 1, inner.width, 1);

    app.request_full_image(slot.item);
    if let Some(protocol) = app.get_full_image(slot.item) {
        f.render_stateful_widget(StatefulImage::new(None), image_area, protocol);
    } else if let Some(protocol) = app.get_thumbnail(slot.item) {
        // Low-resolution stand-in until the full image arrives.
        f.render_stateful_widget(StatefulImage::new(None), image_area, protocol);
    } else if app.has_failed(slot.item, ImagePurpose::Full) {
        let unreadable = Paragraph::new(format!("Cannot display {}", slot.source.display()))
            .style(Style::default().fg(theme.fg_muted))
            .alignment(Alignment::Center);
        f.render_widget(unreadable, center_vertically(image_area, 1));
    } else {
        let loading = Paragraph::new(format!("Loading {}…", slot.source.display()))
            .style(Style::default().fg(theme.fg_muted))
            .alignment(Alignment::Center);
        f.render_widget(loading, center_vertically(image_area, 1));
    }

    let sep = Span::styled(" │ ", Style::default().fg(theme.fg_muted));
    let indicator = slideshow_indicator(
        app.gallery.autoplay_label(),
        app.gallery.autoplay_running(),
        app.gallery.autoplay_period(),
    );
    let indicator_style = if app.gallery.autoplay_running() {
        Style::default().fg(theme.success)
    } else {
        Style::default().fg(theme.fg_muted)
    };
    let info = Line::from(vec![
        Span::styled(position, Style::default().fg(theme.accent)),
        sep.clone(),
        Span::styled(indicator, indicator_style),
        sep.clone(),
        Span::styled("←/→", Style::default().fg(theme.accent)),
        Span::styled(" prev/next", Style::default().fg(theme.fg_muted)),
        sep.clone(),
        Span::styled(
            app.config.keybindings.autoplay.clone(),
            Style::default().fg(theme.accent),
        ),
        Span::styled(" slideshow", Style::default().fg(theme.fg_muted)),
        sep,
        Span::styled("Esc", Style::default().fg(theme.accent)),
        Span::styled(" close", Style::default().fg(theme.fg_muted)),
    ]);
    f.render_widget(Paragraph::new(info).alignment(Alignment::Center), info_area);
}

/// Slideshow state, with the period while it runs.
fn slideshow_indicator(label: &str, running: bool, period: Duration) -> String {
    if running {
        format!("{} ({:.1}s)", label, period.as_secs_f32())
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slideshow_indicator_shows_period_while_running() {
        let period = Duration::from_millis(2500);
        assert_eq!(
            slideshow_indicator("Slideshow: On", true, period),
            "Slideshow: On (2.5s)"
        );
        assert_eq!(
            slideshow_indicator("Slideshow: Off", false, period),
            "Slideshow: Off"
        );
    }

    #[test]
    fn position_label_marks_filtered_out_items() {
        assert_eq!(position_label(Some(0), 3), "1/3");
        assert_eq!(position_label(None, 3), "–/3");
    }
}
