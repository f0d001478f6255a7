//! Key and mouse resolution.
//!
//! Both resolvers are pure: they look at an [`InputContext`] snapshot and an
//! event and name the [`Action`] to take. `App::dispatch` performs it.

use super::config::KeybindingsConfig;
use super::HitMap;
use crate::gallery::controls::{ControlId, SearchEdit};
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleHelp,
    CloseHelp,
    /// Open the lightbox on an item index.
    Open(usize),
    /// Open the lightbox on the card under the grid cursor.
    ActivateCursor,
    Close,
    Next,
    Prev,
    MoveCursor(CursorMove),
    FocusSearch,
    FocusGrid,
    FocusNext,
    FocusPrev,
    Search(SearchEdit),
    StepSize(i32),
    SizeToMin,
    SizeToMax,
    ToggleAutoplay,
    ToggleFullscreen,
    /// Press the focused button or checkbox.
    ActivateControl,
    /// Mouse click on a toolbar control.
    ClickControl(ControlId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Left,
    Right,
    Up,
    Down,
    First,
    Last,
}

/// What currently holds keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusKind {
    Grid,
    Search,
    Range,
    Button,
    Checkbox,
}

pub struct InputContext<'a> {
    pub keys: &'a KeybindingsConfig,
    pub lightbox_open: bool,
    pub help_open: bool,
    pub focus: FocusKind,
}

pub fn resolve_key(ctx: &InputContext<'_>, key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let code = key.code;
    let kb = ctx.keys;

    if key.modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    // Help popup blocks other input.
    if ctx.help_open {
        return match code {
            KeyCode::Esc | KeyCode::Enter => Some(Action::CloseHelp),
            _ if kb.matches(code, &kb.help) => Some(Action::CloseHelp),
            _ => None,
        };
    }

    if ctx.lightbox_open {
        return resolve_lightbox_key(kb, code);
    }

    match ctx.focus {
        FocusKind::Search => return resolve_search_key(key),
        FocusKind::Range => {
            let action = match code {
                KeyCode::Left | KeyCode::Char('-') => Some(Action::StepSize(-1)),
                KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => {
                    Some(Action::StepSize(1))
                }
                KeyCode::Home => Some(Action::SizeToMin),
                KeyCode::End => Some(Action::SizeToMax),
                KeyCode::Esc | KeyCode::Enter => Some(Action::FocusGrid),
                _ => None,
            };
            if action.is_some() {
                return action;
            }
        }
        FocusKind::Button | FocusKind::Checkbox => match code {
            KeyCode::Enter | KeyCode::Char(' ') => return Some(Action::ActivateControl),
            KeyCode::Esc => return Some(Action::FocusGrid),
            _ => {}
        },
        FocusKind::Grid => {}
    }

    resolve_global_key(ctx, code)
}

fn resolve_lightbox_key(kb: &KeybindingsConfig, code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Esc => Some(Action::Close),
        KeyCode::Right => Some(Action::Next),
        KeyCode::Left => Some(Action::Prev),
        _ if kb.matches(code, &kb.next) => Some(Action::Next),
        _ if kb.matches(code, &kb.prev) => Some(Action::Prev),
        _ if kb.matches(code, &kb.autoplay) => Some(Action::ToggleAutoplay),
        _ if kb.matches(code, &kb.fullscreen) => Some(Action::ToggleFullscreen),
        _ if kb.matches(code, &kb.help) => Some(Action::ToggleHelp),
        _ if kb.matches(code, &kb.quit) => Some(Action::Quit),
        _ => None,
    }
}

fn resolve_search_key(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc | KeyCode::Enter => Some(Action::FocusGrid),
        KeyCode::Tab => Some(Action::FocusNext),
        KeyCode::BackTab => Some(Action::FocusPrev),
        KeyCode::Backspace => Some(Action::Search(SearchEdit::Backspace)),
        KeyCode::Char('u') if ctrl => Some(Action::Search(SearchEdit::Clear)),
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            Some(Action::Search(SearchEdit::Insert(c)))
        }
        _ => None,
    }
}

fn resolve_global_key(ctx: &InputContext<'_>, code: KeyCode) -> Option<Action> {
    let kb = ctx.keys;
    let on_grid = ctx.focus == FocusKind::Grid;

    match code {
        KeyCode::Tab => return Some(Action::FocusNext),
        KeyCode::BackTab => return Some(Action::FocusPrev),
        KeyCode::Char('+') | KeyCode::Char('=') => return Some(Action::StepSize(1)),
        KeyCode::Char('-') => return Some(Action::StepSize(-1)),
        _ => {}
    }

    if kb.matches(code, &kb.quit) {
        return Some(Action::Quit);
    }
    if kb.matches(code, &kb.search) {
        return Some(Action::FocusSearch);
    }
    if kb.matches(code, &kb.help) {
        return Some(Action::ToggleHelp);
    }
    if kb.matches(code, &kb.autoplay) {
        return Some(Action::ToggleAutoplay);
    }
    if kb.matches(code, &kb.fullscreen) {
        return Some(Action::ToggleFullscreen);
    }

    if !on_grid {
        return None;
    }

    match code {
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::ActivateCursor),
        KeyCode::Left => Some(Action::MoveCursor(CursorMove::Left)),
        KeyCode::Right => Some(Action::MoveCursor(CursorMove::Right)),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveCursor(CursorMove::Up)),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveCursor(CursorMove::Down)),
        KeyCode::Home => Some(Action::MoveCursor(CursorMove::First)),
        KeyCode::End => Some(Action::MoveCursor(CursorMove::Last)),
        _ if kb.matches(code, &kb.prev) => Some(Action::MoveCursor(CursorMove::Left)),
        _ if kb.matches(code, &kb.next) => Some(Action::MoveCursor(CursorMove::Right)),
        _ => None,
    }
}

pub fn resolve_mouse(hits: &HitMap, lightbox_open: bool, event: MouseEvent) -> Option<Action> {
    let at = Position::new(event.column, event.row);

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {}
        MouseEventKind::ScrollDown if !lightbox_open => {
            return Some(Action::MoveCursor(CursorMove::Down));
        }
        MouseEventKind::ScrollUp if !lightbox_open => {
            return Some(Action::MoveCursor(CursorMove::Up));
        }
        _ => return None,
    }

    if lightbox_open {
        if contains(hits.close, at) {
            return Some(Action::Close);
        }
        if contains(hits.lightbox, at) {
            return None;
        }
        // Backdrop.
        return Some(Action::Close);
    }

    if let Some(&(_, item)) = hits.cards.iter().find(|(rect, _)| rect.contains(at)) {
        return Some(Action::Open(item));
    }
    hits.controls
        .iter()
        .find(|(rect, _)| rect.contains(at))
        .map(|&(_, id)| Action::ClickControl(id))
}

fn contains(rect: Option<Rect>, at: Position) -> bool {
    rect.map(|r| r.contains(at)).unwrap_or(false)
}
