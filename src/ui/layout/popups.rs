use super::{center_vertically, centered};
use crate::app::App;
use crate::ui::theme::GridTheme;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub(super) fn draw_grid_placeholder(f: &mut Frame, area: Rect, theme: &GridTheme) {
    // Images would render over the overlay.
    let text = Paragraph::new("·")
        .style(Style::default().fg(theme.fg_muted))
        .alignment(Alignment::Center);
    f.render_widget(text, center_vertically(area, 1));
}

fn section<'a>(title: &'a str, theme: &GridTheme) -> Line<'a> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(theme.highlight)
            .add_modifier(Modifier::BOLD),
    ))
}

fn entry<'a>(keys: String, what: &'a str, theme: &GridTheme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", keys), Style::default().fg(theme.accent)),
        Span::styled(what, Style::default().fg(theme.fg_secondary)),
    ])
}

pub(super) fn draw_help_popup(f: &mut Frame, app: &App, area: Rect, theme: &GridTheme) {
    let kb = &app.config.keybindings;

    let help_text = vec![
        section("Grid", theme),
        entry(
            format!("←↑↓→ {}{}jk", kb.prev, kb.next),
            "Move cursor",
            theme,
        ),
        entry("Enter".to_string(), "Open photo", theme),
        entry("Click".to_string(), "Open photo", theme),
        entry("+ / -".to_string(), "Thumbnail size", theme),
        entry("Tab".to_string(), "Focus toolbar", theme),
        Line::from(""),
        section("Lightbox", theme),
        entry(
            format!("←/→ {}/{}", kb.prev, kb.next),
            "Previous / next",
            theme,
        ),
        entry("Esc".to_string(), "Close", theme),
        entry(kb.autoplay.clone(), "Toggle slideshow", theme),
        Line::from(""),
        section("Toolbar", theme),
        entry(kb.search.clone(), "Search captions and tags", theme),
        entry("Ctrl-U".to_string(), "Clear search", theme),
        entry("Home/End".to_string(), "Smallest / largest size", theme),
        entry("Space".to_string(), "Press button or checkbox", theme),
        Line::from(""),
        section("General", theme),
        entry(kb.fullscreen.clone(), "Toggle fullscreen", theme),
        entry(kb.help.clone(), "Toggle help", theme),
        entry(kb.quit.clone(), "Quit", theme),
    ];

    let popup_area = centered(area, 46, help_text.len() as u16 + 2);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" lightgrid help ")
        .title_style(
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.bg));

    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);
    f.render_widget(Paragraph::new(help_text), inner);
}
