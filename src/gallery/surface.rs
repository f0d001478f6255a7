use super::item::Item;
use super::size::GridTemplate;
use crate::page::ElementId;
use std::collections::HashSet;
use std::path::PathBuf;

/// Rendering boundary the gallery controllers write to.
pub trait GallerySurface {
    /// Show or hide the card wrapping `element`.
    fn set_card_visible(&mut self, element: ElementId, visible: bool);
    fn set_grid_template(&mut self, template: GridTemplate);
    fn show_lightbox(&mut self, item: &Item);
    fn hide_lightbox(&mut self);
    fn set_autoplay_indicator(&mut self, running: bool, label: &str);
}

/// What the lightbox currently displays.
#[derive(Debug, Clone, PartialEq)]
pub struct LightboxSlot {
    pub item: usize,
    pub source: PathBuf,
    pub caption: String,
}

/// Retained view state read by the terminal renderer.
#[derive(Debug, Clone)]
pub struct ViewModel {
    hidden: HashSet<ElementId>,
    pub grid: GridTemplate,
    pub lightbox: Option<LightboxSlot>,
    pub autoplay_running: bool,
    pub autoplay_label: String,
}

impl ViewModel {
    pub fn new(grid: GridTemplate) -> Self {
        Self {
            hidden: HashSet::new(),
            grid,
            lightbox: None,
            autoplay_running: false,
            autoplay_label: super::autoplay::LABEL_OFF.to_string(),
        }
    }

    pub fn is_visible(&self, element: ElementId) -> bool {
        !self.hidden.contains(&element)
    }

    #[cfg(test)]
    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }
}

impl GallerySurface for ViewModel {
    fn set_card_visible(&mut self, element: ElementId, visible: bool) {
        if visible {
            self.hidden.remove(&element);
        } else {
            self.hidden.insert(element);
        }
    }

    fn set_grid_template(&mut self, template: GridTemplate) {
        self.grid = template;
    }

    fn show_lightbox(&mut self, item: &Item) {
        self.lightbox = Some(LightboxSlot {
            item: item.index,
            source: item.source.clone(),
            caption: item.display_caption().to_string(),
        });
    }

    fn hide_lightbox(&mut self) {
        self.lightbox = None;
    }

    fn set_autoplay_indicator(&mut self, running: bool, label: &str) {
        self.autoplay_running = running;
        self.autoplay_label = label.to_string();
    }
}
