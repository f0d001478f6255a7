use crate::fullscreen::FullscreenApi;
use crate::gallery::autoplay::Scheduler;
use crate::gallery::controls::{ControlId, ControlKind, ControlOrigin, Toolbar, ToolbarHandles};
use crate::gallery::item::ItemIndex;
use crate::gallery::surface::ViewModel;
use crate::gallery::{Gallery, GallerySettings};
use crate::page::Page;
use crossterm::event;
use lru::LruCache;
use ratatui::layout::Rect;
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::mpsc::SyncSender;
use std::time::Duration;

mod actions;
mod config;
mod input;
mod runtime;
mod thumbnails;

pub use config::Config;
pub use runtime::run_tui;
#[cfg_attr(not(test), allow(unused_imports))]
pub(crate) use input::Action;

/// Which rendition of an item is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImagePurpose {
    Thumb,
    Full,
}

/// Request to load an image in background
pub struct ImageRequest {
    pub item: usize,
    pub source: PathBuf,
    pub purpose: ImagePurpose,
    pub generation: u64,
}

/// Response from image loading
pub struct ImageResponse {
    pub item: usize,
    pub purpose: ImagePurpose,
    pub image: image::DynamicImage,
    pub generation: u64,
}

/// An image the worker could not decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFailure {
    pub item: usize,
    pub purpose: ImagePurpose,
    pub generation: u64,
}

/// Events from background threads and timers
pub enum AppEvent {
    Key(event::KeyEvent),
    Mouse(event::MouseEvent),
    ImageReady(ImageResponse),
    ImageFailed(ImageFailure),
    Resize,
    Tick,
    AutoplayTick(u64),
}

/// Where keyboard input goes outside the lightbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Grid,
    Control(ControlId),
}

/// Screen regions recorded while drawing, for mouse hit testing.
#[derive(Debug, Default, Clone)]
pub struct HitMap {
    pub cards: Vec<(Rect, usize)>,
    pub controls: Vec<(Rect, ControlId)>,
    pub lightbox: Option<Rect>,
    pub close: Option<Rect>,
}

impl HitMap {
    pub fn clear(&mut self) {
        self.cards.clear();
        self.controls.clear();
        self.lightbox = None;
        self.close = None;
    }
}

/// UI-related transient state (popups, focus, grid cursor).
pub struct UiState {
    pub should_quit: bool,
    pub show_help: bool,
    pub focus: Focus,
    /// Cursor position among the visible cards
    pub cursor: usize,
    /// First visible grid row
    pub scroll_row: usize,
    /// Columns of the last drawn grid
    pub grid_columns: usize,
    pub status_message: Option<String>,
    pub hits: HitMap,
    /// Terminal cell size in pixels (width, height)
    pub cell_px: (u16, u16),
    /// Cached theme (updated on theme-change detection, not every frame)
    pub theme: crate::ui::theme::GridTheme,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            should_quit: false,
            show_help: false,
            focus: Focus::Grid,
            cursor: 0,
            scroll_row: 0,
            grid_columns: 1,
            status_message: None,
            hits: HitMap::default(),
            cell_px: (8, 16),
            theme: crate::ui::theme::grid_theme(),
        }
    }
}

/// Image rendering state.
pub struct ThumbnailState {
    pub image_picker: Option<Picker>,
    pub cache: LruCache<usize, Box<dyn StatefulProtocol>>,
    pub loading: HashSet<usize>,
    /// Lightbox image for the item it was loaded for
    pub full: Option<(usize, Box<dyn StatefulProtocol>)>,
    pub full_loading: Option<usize>,
    /// Renditions that failed to decode; never requested again
    pub failed: HashSet<(usize, ImagePurpose)>,
    request_tx: Option<SyncSender<ImageRequest>>,
    generation: u64,
}

impl ThumbnailState {
    pub fn new(image_picker: Option<Picker>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            image_picker,
            cache: LruCache::new(capacity),
            loading: HashSet::new(),
            full: None,
            full_loading: None,
            failed: HashSet::new(),
            request_tx: None,
            generation: 0,
        }
    }
}

/// Startup overrides from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchOptions {
    pub size: Option<u32>,
    pub interval: Option<Duration>,
    pub autoplay: bool,
    pub fullscreen: bool,
}

pub type AppGallery = Gallery<ViewModel, Box<dyn Scheduler>>;

pub struct App {
    pub title: String,
    pub gallery: AppGallery,
    pub toolbar: Toolbar,
    pub handles: ToolbarHandles,
    pub config: Config,
    pub ui: UiState,
    pub thumbnails: ThumbnailState,
    pub fullscreen: Box<dyn FullscreenApi>,
}

impl App {
    /// Build the gallery for `page`. Later sources win: built-in defaults,
    /// config, page-declared controls, command line.
    pub fn new(
        page: Page,
        config: Config,
        scheduler: Box<dyn Scheduler>,
        fullscreen: Box<dyn FullscreenApi>,
        image_picker: Option<Picker>,
        launch: LaunchOptions,
    ) -> Self {
        let mut toolbar = Toolbar::discover(&page.controls, config.control_defaults());
        let declared = toolbar.len();
        let handles = toolbar.ensure_all();
        tracing::debug!(
            declared,
            synthesized = toolbar
                .controls()
                .filter(|(_, c)| c.origin == ControlOrigin::Synthesized)
                .count(),
            "toolbar ready"
        );

        let (size_range, declared_size) = toolbar
            .range_value(handles.size)
            .unwrap_or((config.size_range(), config.thumbnails.default_size));
        let settings = GallerySettings {
            size_range,
            initial_size: launch.size.unwrap_or(declared_size),
            autoplay_period: launch
                .interval
                .unwrap_or_else(|| config.slideshow_interval()),
        };

        let index = ItemIndex::scan(&page.images);
        tracing::info!(
            items = index.len(),
            title = %page.title,
            source = ?page.source,
            "gallery indexed"
        );
        if page.is_empty() {
            tracing::warn!("gallery page has no images");
        }

        let surface = ViewModel::new(crate::gallery::size::GridTemplate {
            min_px: settings.initial_size,
        });
        let gallery = Gallery::new(index, surface, scheduler, settings);
        let capacity = config.thumbnails.memory_capacity;

        let mut app = Self {
            title: page.title,
            gallery,
            toolbar,
            handles,
            config,
            ui: UiState::default(),
            thumbnails: ThumbnailState::new(image_picker, capacity),
            fullscreen,
        };

        app.start(launch);
        app
    }

    /// Apply the initial control values the way change events would.
    fn start(&mut self, launch: LaunchOptions) {
        let query = self.toolbar.search_value(self.handles.search).to_string();
        if !query.is_empty() {
            self.gallery.apply_query(&query);
        }

        if launch.autoplay || self.toolbar.is_checked(self.handles.autoplay) {
            self.gallery.start_autoplay();
        }
        self.sync_controls();

        if launch.fullscreen || self.config.display.start_fullscreen {
            crate::fullscreen::toggle_fullscreen(self.fullscreen.as_mut());
        }
    }

    /// Mirror gallery state onto the toolbar.
    pub fn sync_controls(&mut self) {
        let running = self.gallery.autoplay_running();
        let label = self.gallery.autoplay_label();
        self.toolbar.set_checkbox(self.handles.autoplay, running, label);
        let px = self.gallery.thumbnail_size().px();
        self.toolbar.set_range_value(self.handles.size, px);
    }

    /// Item indices of the cards currently shown, in document order.
    pub fn visible_cards(&self) -> Vec<usize> {
        let view = self.gallery.surface();
        self.gallery
            .items()
            .iter()
            .filter(|item| view.is_visible(item.element))
            .map(|item| item.index)
            .collect()
    }

    pub fn focused_control(&self) -> Option<(ControlId, &ControlKind)> {
        match self.ui.focus {
            Focus::Grid => None,
            Focus::Control(id) => self.toolbar.get(id).map(|c| (id, &c.kind)),
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.is_fullscreen()
    }
}
