use super::input::{self, Action, CursorMove, FocusKind, InputContext};
use super::{App, Focus};
use crate::gallery::controls::{ControlId, ControlKind};
use crossterm::event::{KeyEvent, MouseEvent};

impl App {
    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctx = InputContext {
            keys: &self.config.keybindings,
            lightbox_open: self.gallery.is_open(),
            help_open: self.ui.show_help,
            focus: self.focus_kind(),
        };
        if let Some(action) = input::resolve_key(&ctx, key) {
            self.dispatch(action);
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        if self.ui.show_help {
            return;
        }
        if let Some(action) = input::resolve_mouse(&self.ui.hits, self.gallery.is_open(), event) {
            self.dispatch(action);
        }
    }

    /// Timer tick from the slideshow task.
    pub fn handle_autoplay_tick(&mut self, generation: u64) {
        if self.gallery.autoplay_tick(generation) {
            self.follow_lightbox();
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.ui.should_quit = true,
            Action::ToggleHelp => self.ui.show_help = !self.ui.show_help,
            Action::CloseHelp => self.ui.show_help = false,
            Action::Open(item) => {
                if self.gallery.open(item) {
                    self.follow_lightbox();
                }
            }
            Action::ActivateCursor => {
                if let Some(&item) = self.visible_cards().get(self.ui.cursor) {
                    self.dispatch(Action::Open(item));
                }
            }
            Action::Close => self.gallery.close(),
            Action::Next => {
                self.gallery.next();
                self.follow_lightbox();
            }
            Action::Prev => {
                self.gallery.prev();
                self.follow_lightbox();
            }
            Action::MoveCursor(movement) => self.move_cursor(movement),
            Action::FocusSearch => self.ui.focus = Focus::Control(self.handles.search),
            Action::FocusGrid => self.ui.focus = Focus::Grid,
            Action::FocusNext => self.cycle_focus(1),
            Action::FocusPrev => self.cycle_focus(-1),
            Action::Search(edit) => {
                if let Some(query) = self.toolbar.edit_search(self.handles.search, edit) {
                    self.gallery.apply_query(&query);
                    self.clamp_cursor();
                }
            }
            Action::StepSize(steps) => {
                self.gallery.step_thumbnail_size(steps);
            }
            Action::SizeToMin => {
                let min = self.gallery.thumbnail_size().range().min;
                self.gallery.set_thumbnail_size(min as i64);
            }
            Action::SizeToMax => {
                let max = self.gallery.thumbnail_size().range().max;
                self.gallery.set_thumbnail_size(max as i64);
            }
            Action::ToggleAutoplay => self.toggle_autoplay(),
            Action::ToggleFullscreen => self.toggle_fullscreen(),
            Action::ActivateControl => {
                if let Focus::Control(id) = self.ui.focus {
                    self.activate_control(id);
                }
            }
            Action::ClickControl(id) => {
                self.ui.focus = Focus::Control(id);
                self.activate_control(id);
            }
        }

        self.sync_controls();
    }

    fn focus_kind(&self) -> FocusKind {
        match self.focused_control().map(|(_, kind)| kind) {
            None => FocusKind::Grid,
            Some(ControlKind::Search { .. }) => FocusKind::Search,
            Some(ControlKind::Range { .. }) => FocusKind::Range,
            Some(ControlKind::Button { .. }) => FocusKind::Button,
            Some(ControlKind::Checkbox { .. }) => FocusKind::Checkbox,
        }
    }

    fn activate_control(&mut self, id: ControlId) {
        if id == self.handles.autoplay {
            self.toggle_autoplay();
        } else if id == self.handles.fullscreen {
            self.toggle_fullscreen();
        }
    }

    /// Checkbox change: the new checked state decides start or stop.
    fn toggle_autoplay(&mut self) {
        if let Some(checked) = self.toolbar.toggle_checkbox(self.handles.autoplay) {
            self.gallery.set_autoplay(checked);
        }
    }

    fn toggle_fullscreen(&mut self) {
        let was = self.fullscreen.is_fullscreen();
        let now = crate::fullscreen::toggle_fullscreen(self.fullscreen.as_mut());
        if was == now {
            self.ui.status_message = Some("Fullscreen unavailable".to_string());
        } else {
            self.ui.status_message = None;
        }
    }

    /// Grid, then each toolbar control in order, then back to the grid.
    fn cycle_focus(&mut self, direction: isize) {
        if self.toolbar.is_empty() {
            self.ui.focus = Focus::Grid;
            return;
        }
        let slots = self.toolbar.len() as isize + 1;
        let current = match self.ui.focus {
            Focus::Grid => 0,
            Focus::Control(id) => self.toolbar.position(id) as isize + 1,
        };
        let next = (current + direction).rem_euclid(slots);
        self.ui.focus = match next {
            0 => Focus::Grid,
            n => self
                .toolbar
                .id_at(n as usize - 1)
                .map(Focus::Control)
                .unwrap_or(Focus::Grid),
        };
    }

    fn move_cursor(&mut self, movement: CursorMove) {
        let total = self.visible_cards().len();
        if total == 0 {
            self.ui.cursor = 0;
            return;
        }
        let columns = self.ui.grid_columns.max(1);
        let last = total - 1;
        let cursor = self.ui.cursor.min(last);

        self.ui.cursor = match movement {
            CursorMove::Left => cursor.saturating_sub(1),
            CursorMove::Right => (cursor + 1).min(last),
            CursorMove::Up => cursor.saturating_sub(columns),
            CursorMove::Down => (cursor + columns).min(last),
            CursorMove::First => 0,
            CursorMove::Last => last,
        };
    }

    fn clamp_cursor(&mut self) {
        let total = self.visible_cards().len();
        self.ui.cursor = self.ui.cursor.min(total.saturating_sub(1));
    }

    /// Keep the grid cursor on the item shown in the lightbox.
    fn follow_lightbox(&mut self) {
        let Some(current) = self.gallery.lightbox().current() else {
            return;
        };
        if let Some(pos) = self.visible_cards().iter().position(|&i| i == current) {
            self.ui.cursor = pos;
        }
    }
}
