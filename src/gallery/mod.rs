//! Gallery state and controllers.
//!
//! [`Gallery`] is the one mutable state object: item index, filtered view,
//! lightbox, slideshow and thumbnail size. Rendering goes through an injected
//! [`GallerySurface`] and timers through an injected [`Scheduler`], so the
//! whole thing runs without a terminal.

pub mod autoplay;
pub mod controls;
pub mod filter;
pub mod item;
pub mod lightbox;
pub mod size;
pub mod surface;

use autoplay::{Autoplay, Scheduler};
use filter::FilteredView;
use item::{Item, ItemIndex};
use lightbox::{navigation_target, Lightbox};
use size::{SizeRange, ThumbSize};
use std::time::Duration;
use surface::GallerySurface;

/// Startup parameters resolved from config, page controls and CLI.
#[derive(Debug, Clone, Copy)]
pub struct GallerySettings {
    pub size_range: SizeRange,
    pub initial_size: u32,
    pub autoplay_period: Duration,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            size_range: SizeRange::default(),
            initial_size: size::DEFAULT_SIZE,
            autoplay_period: autoplay::DEFAULT_INTERVAL,
        }
    }
}

pub struct Gallery<S, T> {
    index: ItemIndex,
    filtered: FilteredView,
    lightbox: Lightbox,
    autoplay: Autoplay<T>,
    size: ThumbSize,
    surface: S,
}

impl<S: GallerySurface, T: Scheduler> Gallery<S, T> {
    pub fn new(index: ItemIndex, surface: S, scheduler: T, settings: GallerySettings) -> Self {
        let size = ThumbSize::new(settings.size_range, settings.initial_size);
        let mut gallery = Self {
            filtered: FilteredView::all(&index),
            index,
            lightbox: Lightbox::Closed,
            autoplay: Autoplay::new(scheduler, settings.autoplay_period),
            size,
            surface,
        };

        gallery.surface.set_grid_template(size.template());
        gallery.sync_autoplay_indicator();
        gallery
    }

    /// Recompute the filtered view and show exactly its cards.
    pub fn apply_query(&mut self, query: &str) {
        self.filtered = FilteredView::compute(&self.index, query);

        for item in self.index.items() {
            let visible = self.filtered.contains(item.index);
            self.surface.set_card_visible(item.element, visible);
        }

        tracing::debug!(
            query = %filter::normalize_query(query),
            matches = self.filtered.len(),
            total = self.index.len(),
            "applied gallery query"
        );
    }

    /// Set the minimum column width, clamped to the size range.
    pub fn set_thumbnail_size(&mut self, px: i64) -> u32 {
        let applied = self.size.set(px);
        self.apply_template();
        applied
    }

    /// Step the thumbnail size by whole range steps.
    pub fn step_thumbnail_size(&mut self, steps: i32) -> u32 {
        let applied = self.size.step_by(steps);
        self.apply_template();
        applied
    }

    /// Open the lightbox on item `index`. Out-of-range indices are ignored.
    pub fn open(&mut self, index: usize) -> bool {
        let Some(item) = self.index.get(index) else {
            return false;
        };
        self.lightbox = Lightbox::Open { current: index };
        self.surface.show_lightbox(item);
        tracing::debug!(item = index, "lightbox opened");
        true
    }

    /// Close the lightbox. Always stops the slideshow.
    pub fn close(&mut self) {
        if self.lightbox.is_open() {
            tracing::debug!("lightbox closed");
        }
        self.lightbox = Lightbox::Closed;
        self.surface.hide_lightbox();
        self.stop_autoplay();
    }

    /// Move `delta` items through the filtered view (or the whole index
    /// when the view is empty), wrapping around.
    pub fn navigate(&mut self, delta: isize) {
        let Some(current) = self.lightbox.current() else {
            return;
        };
        if let Some(target) = navigation_target(self.index.len(), &self.filtered, current, delta) {
            self.open(target);
        }
    }

    pub fn next(&mut self) {
        self.navigate(1);
    }

    pub fn prev(&mut self) {
        self.navigate(-1);
    }

    pub fn start_autoplay(&mut self) {
        self.autoplay.start();
        self.sync_autoplay_indicator();
        tracing::info!(
            period_ms = self.autoplay.period().as_millis() as u64,
            "slideshow started"
        );
    }

    pub fn stop_autoplay(&mut self) {
        let was_running = self.autoplay.is_running();
        self.autoplay.stop();
        self.sync_autoplay_indicator();
        if was_running {
            tracing::info!("slideshow stopped");
        }
    }

    /// Checkbox change handler.
    pub fn set_autoplay(&mut self, on: bool) {
        if on {
            self.start_autoplay();
        } else {
            self.stop_autoplay();
        }
    }

    /// Timer callback: advance when the tick belongs to the live timer.
    pub fn autoplay_tick(&mut self, generation: u64) -> bool {
        if !self.autoplay.accepts(generation) {
            return false;
        }
        self.next();
        true
    }

    pub fn items(&self) -> &[Item] {
        self.index.items()
    }

    pub fn index(&self) -> &ItemIndex {
        &self.index
    }

    pub fn filtered(&self) -> &FilteredView {
        &self.filtered
    }

    pub fn lightbox(&self) -> Lightbox {
        self.lightbox
    }

    pub fn is_open(&self) -> bool {
        self.lightbox.is_open()
    }

    pub fn autoplay_running(&self) -> bool {
        self.autoplay.is_running()
    }

    pub fn autoplay_period(&self) -> Duration {
        self.autoplay.period()
    }

    pub fn autoplay_label(&self) -> &'static str {
        self.autoplay.label()
    }

    pub fn thumbnail_size(&self) -> ThumbSize {
        self.size
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn apply_template(&mut self) {
        let template = self.size.template();
        tracing::debug!(%template, "grid template changed");
        self.surface.set_grid_template(template);
    }

    fn sync_autoplay_indicator(&mut self) {
        let running = self.autoplay.is_running();
        let label = self.autoplay.label();
        self.surface.set_autoplay_indicator(running, label);
    }
}

#[cfg(test)]
mod tests {
    use super::autoplay::{ManualScheduler, LABEL_OFF, LABEL_ON};
    use super::surface::ViewModel;
    use super::*;
    use crate::page::{ElementId, ImageElement};
    use std::path::PathBuf;

    type TestGallery = Gallery<ViewModel, ManualScheduler>;

    fn element(i: usize, alt: &str, tags: &str) -> ImageElement {
        ImageElement {
            handle: ElementId(i),
            src: PathBuf::from(format!("/photos/{i}.jpg")),
            alt: Some(alt.to_string()),
            data_tags: Some(tags.to_string()),
        }
    }

    fn gallery_from(elements: &[ImageElement]) -> (TestGallery, ManualScheduler) {
        let scheduler = ManualScheduler::default();
        let settings = GallerySettings::default();
        let view = ViewModel::new(size::GridTemplate {
            min_px: settings.initial_size,
        });
        let index = ItemIndex::scan(elements);
        let gallery = Gallery::new(index, view, scheduler.clone(), settings);
        (gallery, scheduler)
    }

    fn desert_gallery() -> (TestGallery, ManualScheduler) {
        gallery_from(&[
            element(0, "Desert", "sand,sunset"),
            element(1, "Ocean", "water"),
            element(2, "Desert Night", "sand,stars"),
        ])
    }

    #[test]
    fn desert_example_navigates_filtered_set() {
        let (mut gallery, _) = desert_gallery();
        gallery.apply_query("desert");
        assert_eq!(gallery.filtered().members(), &[0, 2]);

        gallery.open(0);
        gallery.navigate(1);
        assert_eq!(gallery.lightbox(), Lightbox::Open { current: 2 });
        assert_eq!(
            gallery.surface().lightbox.as_ref().unwrap().caption,
            "Desert Night"
        );
    }

    #[test]
    fn query_toggles_card_visibility() {
        let (mut gallery, _) = desert_gallery();
        gallery.apply_query("ocean");
        let view = gallery.surface();
        assert!(!view.is_visible(ElementId(0)));
        assert!(view.is_visible(ElementId(1)));
        assert!(!view.is_visible(ElementId(2)));

        gallery.apply_query("");
        assert_eq!(gallery.surface().hidden_count(), 0);
        assert_eq!(gallery.filtered().len(), 3);
    }

    #[test]
    fn duplicate_captions_are_shown_by_identity() {
        let (mut gallery, _) = gallery_from(&[
            element(0, "Beach", "day"),
            element(1, "Beach", "night"),
            element(2, "Forest", ""),
        ]);
        gallery.apply_query("night");
        let view = gallery.surface();
        assert!(!view.is_visible(ElementId(0)));
        assert!(view.is_visible(ElementId(1)));
        assert!(!view.is_visible(ElementId(2)));
    }

    #[test]
    fn navigate_round_trip_restores_current() {
        let (mut gallery, _) = desert_gallery();
        gallery.open(1);
        gallery.navigate(1);
        gallery.navigate(-1);
        assert_eq!(gallery.lightbox().current(), Some(1));
    }

    #[test]
    fn navigate_wraps_both_ways() {
        let (mut gallery, _) = desert_gallery();
        gallery.open(2);
        gallery.next();
        assert_eq!(gallery.lightbox().current(), Some(0));
        gallery.prev();
        assert_eq!(gallery.lightbox().current(), Some(2));
    }

    #[test]
    fn filter_change_while_open_restarts_from_position_zero() {
        let (mut gallery, _) = desert_gallery();
        gallery.open(1);
        gallery.apply_query("desert");
        // Ocean is no longer visible but stays current until navigation.
        assert_eq!(gallery.lightbox().current(), Some(1));
        gallery.next();
        assert_eq!(gallery.lightbox().current(), Some(2));
    }

    #[test]
    fn navigate_is_noop_when_closed() {
        let (mut gallery, _) = desert_gallery();
        gallery.navigate(1);
        assert_eq!(gallery.lightbox(), Lightbox::Closed);
        assert!(gallery.surface().lightbox.is_none());
    }

    #[test]
    fn open_updates_lightbox_slot_and_ignores_out_of_range() {
        let (mut gallery, _) = desert_gallery();
        assert!(!gallery.open(7));
        assert!(!gallery.is_open());

        assert!(gallery.open(1));
        let slot = gallery.surface().lightbox.clone().unwrap();
        assert_eq!(slot.item, 1);
        assert_eq!(slot.caption, "Ocean");
        assert_eq!(slot.source, PathBuf::from("/photos/1.jpg"));
    }

    #[test]
    fn open_ignores_filter_membership() {
        let (mut gallery, _) = desert_gallery();
        gallery.apply_query("desert");
        assert!(gallery.open(1));
        assert_eq!(gallery.lightbox().current(), Some(1));
    }

    #[test]
    fn close_always_stops_autoplay() {
        let (mut gallery, scheduler) = desert_gallery();
        gallery.start_autoplay();
        gallery.open(0);
        gallery.close();

        assert!(!gallery.autoplay_running());
        assert!(scheduler.active_generations().is_empty());
        assert_eq!(gallery.surface().autoplay_label, LABEL_OFF);
        assert!(gallery.surface().lightbox.is_none());
    }

    #[test]
    fn start_twice_keeps_one_timer_and_label_on() {
        let (mut gallery, scheduler) = desert_gallery();
        gallery.start_autoplay();
        gallery.start_autoplay();

        assert_eq!(scheduler.active_generations().len(), 1);
        assert!(gallery.surface().autoplay_running);
        assert_eq!(gallery.surface().autoplay_label, LABEL_ON);
    }

    #[test]
    fn autoplay_tick_advances_only_for_live_generation() {
        let (mut gallery, scheduler) = desert_gallery();
        gallery.open(0);
        gallery.start_autoplay();
        gallery.start_autoplay();
        let live = scheduler.active_generations()[0];

        assert!(!gallery.autoplay_tick(live - 1));
        assert_eq!(gallery.lightbox().current(), Some(0));

        assert!(gallery.autoplay_tick(live));
        assert_eq!(gallery.lightbox().current(), Some(1));
    }

    #[test]
    fn autoplay_tick_while_closed_does_nothing() {
        let (mut gallery, scheduler) = desert_gallery();
        gallery.set_autoplay(true);
        let live = scheduler.active_generations()[0];
        assert!(gallery.autoplay_tick(live));
        assert!(!gallery.is_open());
    }

    #[test]
    fn thumbnail_size_is_clamped_and_applied() {
        let (mut gallery, _) = desert_gallery();
        assert_eq!(gallery.surface().grid.min_px, 220);
        assert_eq!(gallery.set_thumbnail_size(1_000), 380);
        assert_eq!(gallery.surface().grid.min_px, 380);
        assert_eq!(gallery.step_thumbnail_size(-2), 360);
        assert_eq!(gallery.surface().grid.min_px, 360);
    }

    #[test]
    fn empty_index_operations_are_noops() {
        let (mut gallery, _) = gallery_from(&[]);
        gallery.apply_query("anything");
        gallery.apply_query("");
        assert!(!gallery.open(0));
        gallery.navigate(1);
        gallery.navigate(-1);
        gallery.start_autoplay();
        gallery.autoplay_tick(1);
        assert!(!gallery.is_open());
        gallery.close();
        assert!(gallery.filtered().is_empty());
        assert!(!gallery.autoplay_running());
    }
}
