use crate::app::{App, Focus};
use crate::gallery::controls::ControlKind;
use crate::ui::theme::GridTheme;
use crate::utils::truncate_label;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use ratatui_image::picker::ProtocolType;

const SEARCH_WIDTH: u16 = 34;
const CONTROL_GAP: u16 = 1;

pub(super) fn draw_status(f: &mut Frame, app: &App, area: Rect, theme: &GridTheme) {
    if let Some(message) = &app.ui.status_message {
        let line = Line::from(vec![
            Span::styled("⚠ ", Style::default().fg(theme.warning)),
            Span::styled(message, Style::default().fg(theme.warning)),
        ]);
        f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }
}

pub(super) fn draw_header(f: &mut Frame, app: &App, area: Rect, theme: &GridTheme) {
    let shown = app.gallery.filtered().len();
    let total = app.gallery.index().len();
    let sep = || Span::styled(" │ ", Style::default().fg(theme.fg_muted));

    let mut spans = vec![
        Span::styled(
            " lightgrid ",
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        ),
        sep(),
        Span::styled(app.title.clone(), Style::default().fg(theme.fg_primary)),
        sep(),
        Span::styled(
            format!("{}/{} shown", shown, total),
            Style::default().fg(theme.accent),
        ),
        sep(),
        Span::styled(
            format!("{}px", app.gallery.thumbnail_size().px()),
            Style::default().fg(theme.fg_secondary),
        ),
        Span::styled(" ", Style::default()),
        Span::styled(
            format!("[img:{}]", protocol_label(app)),
            Style::default().fg(theme.accent_alt),
        ),
    ];

    if app.gallery.autoplay_running() {
        spans.push(Span::styled(" ", Style::default()));
        spans.push(Span::styled("[▶]", Style::default().fg(theme.success)));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

/// Text shown inside a control's box.
fn control_text(kind: &ControlKind, focused: bool) -> String {
    match kind {
        ControlKind::Search { value, placeholder } => {
            if value.is_empty() && !focused {
                format!("/ {}", placeholder)
            } else if focused {
                format!("/ {}█", value)
            } else {
                format!("/ {}", value)
            }
        }
        ControlKind::Range { value, .. } => format!("◀ {}px ▶", value),
        ControlKind::Button { label } => label.clone(),
        ControlKind::Checkbox { checked, label } => {
            format!("[{}] {}", if *checked { "x" } else { " " }, label)
        }
    }
}

fn control_width(kind: &ControlKind, text: &str) -> u16 {
    match kind {
        ControlKind::Search { .. } => SEARCH_WIDTH,
        _ => text.chars().count() as u16 + 4,
    }
}

pub(super) fn draw_toolbar(f: &mut Frame, app: &mut App, area: Rect, theme: &GridTheme) {
    let focused_id = match app.ui.focus {
        Focus::Control(id) => Some(id),
        Focus::Grid => None,
    };

    let mut x = area.x;
    let mut regions = Vec::new();

    for (id, control) in app.toolbar.controls() {
        let focused = focused_id == Some(id);
        let text = control_text(&control.kind, focused);
        let width = control_width(&control.kind, &text).min(area.right().saturating_sub(x));
        if width < 4 {
            break;
        }
        let rect = Rect::new(x, area.y, width, area.height);

        let border = if focused {
            theme.border_focused
        } else {
            theme.border
        };
        let text_style = match &control.kind {
            ControlKind::Search { value, .. } if value.is_empty() && !focused => {
                Style::default().fg(theme.fg_muted)
            }
            ControlKind::Checkbox { checked: true, .. } => Style::default().fg(theme.success),
            _ => Style::default().fg(theme.fg_primary),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        let inner = block.inner(rect);
        f.render_widget(block, rect);
        let label = Paragraph::new(truncate_label(&text, inner.width as usize))
            .style(text_style)
            .alignment(Alignment::Center);
        f.render_widget(label, inner);

        regions.push((rect, id));
        x = x.saturating_add(width + CONTROL_GAP);
    }

    app.ui.hits.controls = regions;
}

pub(super) fn draw_footer(f: &mut Frame, app: &App, area: Rect, theme: &GridTheme) {
    let sep = Span::styled(" │ ", Style::default().fg(theme.fg_muted));
    let kb = &app.config.keybindings;
    let key = |k: String| Span::styled(k, Style::default().fg(theme.accent));
    let what = |w: &'static str| Span::styled(w, Style::default().fg(theme.fg_muted));

    let help = Line::from(vec![
        key("←↑↓→".to_string()),
        what(" move"),
        sep.clone(),
        key("Enter".to_string()),
        what(" open"),
        sep.clone(),
        key(kb.search.clone()),
        what(" search"),
        sep.clone(),
        key("+/-".to_string()),
        what(" size"),
        sep.clone(),
        key(kb.autoplay.clone()),
        what(" slideshow"),
        sep.clone(),
        key(kb.fullscreen.clone()),
        what(" fullscreen"),
        sep.clone(),
        key("Tab".to_string()),
        what(" focus"),
        sep.clone(),
        key(kb.help.clone()),
        what(" help"),
        sep,
        key(kb.quit.clone()),
        what(" quit"),
    ]);

    f.render_widget(Paragraph::new(help).alignment(Alignment::Center), area);
}

pub(super) fn protocol_label(app: &App) -> &'static str {
    app.thumbnails
        .image_picker
        .as_ref()
        .map(|p| match p.protocol_type {
            ProtocolType::Halfblocks => "HB",
            ProtocolType::Sixel => "SIX",
            ProtocolType::Kitty => "KTY",
            ProtocolType::Iterm2 => "IT2",
        })
        .unwrap_or("N/A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_shows_placeholder_until_focused() {
        let kind = ControlKind::Search {
            value: String::new(),
            placeholder: "Search".to_string(),
        };
        assert_eq!(control_text(&kind, false), "/ Search");
        assert_eq!(control_text(&kind, true), "/ █");
    }

    #[test]
    fn checkbox_text_mirrors_state() {
        let on = ControlKind::Checkbox {
            checked: true,
            label: "Slideshow: On".to_string(),
        };
        assert_eq!(control_text(&on, false), "[x] Slideshow: On");
    }
}
