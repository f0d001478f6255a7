//! Toolbar controls.
//!
//! A page may declare any of the four controls by identifier. Declared
//! controls are discovered first, in a fixed order; whatever is still missing
//! is synthesized by the `ensure_*` steps and appended after them. Event
//! handling only ever sees [`ControlId`] handles, so both origins behave the
//! same.

use super::autoplay::{LABEL_OFF, LABEL_ON};
use super::size::{SizeRange, DEFAULT_SIZE};
use serde::{Deserialize, Serialize};

pub const SEARCH_ID: &str = "search";
pub const SIZE_ID: &str = "size";
pub const FULLSCREEN_ID: &str = "fullscreen";
pub const AUTOPLAY_ID: &str = "autoplay";

const SEARCH_PLACEHOLDER: &str = "Search by caption or tag…";
const FULLSCREEN_LABEL: &str = "Fullscreen";

/// Controls declared by the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ControlDecls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<RangeDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullscreen: Option<ButtonDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoplay: Option<CheckboxDecl>,
}

impl ControlDecls {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.size.is_none()
            && self.fullscreen.is_none()
            && self.autoplay.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchDecl {
    pub placeholder: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RangeDecl {
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub step: Option<u32>,
    pub value: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ButtonDecl {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CheckboxDecl {
    #[serde(default)]
    pub checked: bool,
    pub label: Option<String>,
}

/// Values used for synthesized controls and for gaps in declared ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlDefaults {
    pub size_range: SizeRange,
    pub size_value: u32,
    pub autoplay_checked: bool,
}

impl Default for ControlDefaults {
    fn default() -> Self {
        Self {
            size_range: SizeRange::default(),
            size_value: DEFAULT_SIZE,
            autoplay_checked: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOrigin {
    Page,
    Synthesized,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Search { value: String, placeholder: String },
    Range { range: SizeRange, value: u32 },
    Button { label: String },
    Checkbox { checked: bool, label: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub id: &'static str,
    pub origin: ControlOrigin,
    pub kind: ControlKind,
}

/// Handles to the four controls the gallery binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarHandles {
    pub search: ControlId,
    pub size: ControlId,
    pub fullscreen: ControlId,
    pub autoplay: ControlId,
}

#[derive(Debug, Clone, Default)]
pub struct Toolbar {
    controls: Vec<Control>,
    defaults: ControlDefaults,
}

impl Toolbar {
    /// Register the controls the page already declares.
    pub fn discover(decls: &ControlDecls, defaults: ControlDefaults) -> Self {
        let mut toolbar = Self {
            controls: Vec::new(),
            defaults,
        };

        if let Some(decl) = &decls.search {
            toolbar.push(SEARCH_ID, ControlOrigin::Page, search_kind(Some(decl)));
        }
        if let Some(decl) = &decls.size {
            let kind = range_kind(Some(decl), &defaults);
            toolbar.push(SIZE_ID, ControlOrigin::Page, kind);
        }
        if let Some(decl) = &decls.fullscreen {
            toolbar.push(FULLSCREEN_ID, ControlOrigin::Page, button_kind(Some(decl)));
        }
        if let Some(decl) = &decls.autoplay {
            let kind = checkbox_kind(Some(decl), &defaults);
            toolbar.push(AUTOPLAY_ID, ControlOrigin::Page, kind);
        }

        toolbar
    }

    pub fn ensure_search(&mut self) -> ControlId {
        self.find(SEARCH_ID)
            .unwrap_or_else(|| self.push(SEARCH_ID, ControlOrigin::Synthesized, search_kind(None)))
    }

    pub fn ensure_size(&mut self) -> ControlId {
        if let Some(id) = self.find(SIZE_ID) {
            return id;
        }
        let kind = range_kind(None, &self.defaults);
        self.push(SIZE_ID, ControlOrigin::Synthesized, kind)
    }

    pub fn ensure_fullscreen(&mut self) -> ControlId {
        self.find(FULLSCREEN_ID).unwrap_or_else(|| {
            self.push(FULLSCREEN_ID, ControlOrigin::Synthesized, button_kind(None))
        })
    }

    pub fn ensure_autoplay(&mut self) -> ControlId {
        if let Some(id) = self.find(AUTOPLAY_ID) {
            return id;
        }
        let kind = checkbox_kind(None, &self.defaults);
        self.push(AUTOPLAY_ID, ControlOrigin::Synthesized, kind)
    }

    pub fn ensure_all(&mut self) -> ToolbarHandles {
        ToolbarHandles {
            search: self.ensure_search(),
            size: self.ensure_size(),
            fullscreen: self.ensure_fullscreen(),
            autoplay: self.ensure_autoplay(),
        }
    }

    pub fn get(&self, id: ControlId) -> Option<&Control> {
        self.controls.get(id.0)
    }

    pub fn controls(&self) -> impl Iterator<Item = (ControlId, &Control)> {
        self.controls
            .iter()
            .enumerate()
            .map(|(i, c)| (ControlId(i), c))
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Handle at a toolbar position, for focus cycling.
    pub fn id_at(&self, position: usize) -> Option<ControlId> {
        (position < self.controls.len()).then_some(ControlId(position))
    }

    pub fn position(&self, id: ControlId) -> usize {
        id.0
    }

    pub fn search_value(&self, id: ControlId) -> &str {
        match self.get(id).map(|c| &c.kind) {
            Some(ControlKind::Search { value, .. }) => value,
            _ => "",
        }
    }

    /// Edit the search text; returns the new value.
    pub fn edit_search(&mut self, id: ControlId, edit: SearchEdit) -> Option<String> {
        let Some(ControlKind::Search { value, .. }) = self.kind_mut(id) else {
            return None;
        };
        match edit {
            SearchEdit::Insert(c) => value.push(c),
            SearchEdit::Backspace => {
                value.pop();
            }
            SearchEdit::Clear => value.clear(),
        }
        Some(value.clone())
    }

    pub fn range_value(&self, id: ControlId) -> Option<(SizeRange, u32)> {
        match self.get(id).map(|c| &c.kind) {
            Some(ControlKind::Range { range, value }) => Some((*range, *value)),
            _ => None,
        }
    }

    pub fn set_range_value(&mut self, id: ControlId, px: u32) {
        if let Some(ControlKind::Range { range, value }) = self.kind_mut(id) {
            *value = range.clamp(px as i64);
        }
    }

    pub fn is_checked(&self, id: ControlId) -> bool {
        matches!(
            self.get(id).map(|c| &c.kind),
            Some(ControlKind::Checkbox { checked: true, .. })
        )
    }

    /// Flip a checkbox; returns the new checked state.
    pub fn toggle_checkbox(&mut self, id: ControlId) -> Option<bool> {
        if let Some(ControlKind::Checkbox { checked, .. }) = self.kind_mut(id) {
            *checked = !*checked;
            return Some(*checked);
        }
        None
    }

    /// Reflect the slideshow state on its checkbox.
    pub fn set_checkbox(&mut self, id: ControlId, on: bool, text: &str) {
        if let Some(ControlKind::Checkbox { checked, label }) = self.kind_mut(id) {
            *checked = on;
            *label = text.to_string();
        }
    }

    fn kind_mut(&mut self, id: ControlId) -> Option<&mut ControlKind> {
        self.controls.get_mut(id.0).map(|c| &mut c.kind)
    }

    fn find(&self, id: &str) -> Option<ControlId> {
        let position = self.controls.iter().position(|c| c.id == id)?;
        Some(ControlId(position))
    }

    fn push(&mut self, id: &'static str, origin: ControlOrigin, kind: ControlKind) -> ControlId {
        self.controls.push(Control { id, origin, kind });
        ControlId(self.controls.len() - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEdit {
    Insert(char),
    Backspace,
    Clear,
}

fn search_kind(decl: Option<&SearchDecl>) -> ControlKind {
    ControlKind::Search {
        value: decl.and_then(|d| d.value.clone()).unwrap_or_default(),
        placeholder: decl
            .and_then(|d| d.placeholder.clone())
            .unwrap_or_else(|| SEARCH_PLACEHOLDER.to_string()),
    }
}

fn range_kind(decl: Option<&RangeDecl>, defaults: &ControlDefaults) -> ControlKind {
    let base = defaults.size_range;
    let range = SizeRange::new(
        decl.and_then(|d| d.min).unwrap_or(base.min),
        decl.and_then(|d| d.max).unwrap_or(base.max),
        decl.and_then(|d| d.step).unwrap_or(base.step),
    );
    let value = decl.and_then(|d| d.value).unwrap_or(defaults.size_value);
    ControlKind::Range {
        range,
        value: range.clamp(value as i64),
    }
}

fn button_kind(decl: Option<&ButtonDecl>) -> ControlKind {
    ControlKind::Button {
        label: decl
            .and_then(|d| d.label.clone())
            .unwrap_or_else(|| FULLSCREEN_LABEL.to_string()),
    }
}

fn checkbox_kind(decl: Option<&CheckboxDecl>, defaults: &ControlDefaults) -> ControlKind {
    let checked = decl.map(|d| d.checked).unwrap_or(defaults.autoplay_checked);
    let fallback = if checked { LABEL_ON } else { LABEL_OFF };
    ControlKind::Checkbox {
        checked,
        label: decl
            .and_then(|d| d.label.clone())
            .unwrap_or_else(|| fallback.to_string()),
    }
}
