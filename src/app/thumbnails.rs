use super::{App, ImageFailure, ImagePurpose, ImageRequest, ImageResponse};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use std::io::Write;
use std::sync::mpsc::SyncSender;

const MAX_IN_FLIGHT_PER_COLUMN: usize = 2;

impl App {
    /// Request a grid thumbnail to be loaded in background.
    pub fn request_thumbnail(&mut self, item: usize) {
        // Skip if already loaded, loading or undecodable.
        if self.thumbnails.cache.contains(&item)
            || self.thumbnails.loading.contains(&item)
            || self.has_failed(item, ImagePurpose::Thumb)
        {
            return;
        }
        if self.thumbnails.loading.len() >= self.max_in_flight_thumbnail_requests() {
            return;
        }
        let Some(source) = self.gallery.index().get(item).map(|i| i.source.clone()) else {
            return;
        };

        if self.send_image_request(item, source, ImagePurpose::Thumb) {
            self.thumbnails.loading.insert(item);
        }
    }

    /// Request the lightbox rendition of the current item.
    pub fn request_full_image(&mut self, item: usize) {
        let have = self.thumbnails.full.as_ref().map(|(i, _)| *i) == Some(item);
        if have
            || self.thumbnails.full_loading == Some(item)
            || self.has_failed(item, ImagePurpose::Full)
        {
            return;
        }
        let Some(source) = self.gallery.index().get(item).map(|i| i.source.clone()) else {
            return;
        };

        if self.send_image_request(item, source, ImagePurpose::Full) {
            self.thumbnails.full_loading = Some(item);
        }
    }

    fn send_image_request(
        &self,
        item: usize,
        source: std::path::PathBuf,
        purpose: ImagePurpose,
    ) -> bool {
        let Some(tx) = &self.thumbnails.request_tx else {
            return false;
        };
        tx.try_send(ImageRequest {
            item,
            source,
            purpose,
            generation: self.thumbnails.generation,
        })
        .is_ok()
    }

    fn max_in_flight_thumbnail_requests(&self) -> usize {
        let cols = self.ui.grid_columns.max(1);
        (cols * MAX_IN_FLIGHT_PER_COLUMN).clamp(6, 16)
    }

    pub(super) fn new_image_picker() -> Picker {
        let mut picker = Picker::from_termios().unwrap_or_else(|_| Picker::new((8, 16)));
        picker.guess_protocol();
        picker
    }

    /// Clear in-memory image state and purge terminal-side image IDs.
    pub(super) fn reset_thumbnail_cache(&mut self) {
        clear_terminal_images();
        self.thumbnails.cache.clear();
        self.thumbnails.loading.clear();
        self.thumbnails.full = None;
        self.thumbnails.full_loading = None;
        self.thumbnails.generation = self.thumbnails.generation.wrapping_add(1);
    }

    /// Handle a decoded image from the background thread.
    pub fn handle_image_ready(&mut self, response: ImageResponse) {
        if response.generation != self.thumbnails.generation {
            return;
        }

        match response.purpose {
            ImagePurpose::Thumb => {
                self.thumbnails.loading.remove(&response.item);
                if response.item >= self.gallery.index().len() {
                    return;
                }
                if let Some(picker) = &mut self.thumbnails.image_picker {
                    let protocol = picker.new_resize_protocol(response.image);
                    self.thumbnails.cache.put(response.item, protocol);
                }
            }
            ImagePurpose::Full => {
                if self.thumbnails.full_loading == Some(response.item) {
                    self.thumbnails.full_loading = None;
                }
                // Only keep it if the lightbox still shows this item.
                if self.gallery.lightbox().current() != Some(response.item) {
                    return;
                }
                if let Some(picker) = &mut self.thumbnails.image_picker {
                    let protocol = picker.new_resize_protocol(response.image);
                    self.thumbnails.full = Some((response.item, protocol));
                }
            }
        }
    }

    /// Release the slot of an image the worker could not decode.
    pub fn handle_image_failed(&mut self, failure: ImageFailure) {
        if failure.generation != self.thumbnails.generation {
            return;
        }

        match failure.purpose {
            ImagePurpose::Thumb => {
                self.thumbnails.loading.remove(&failure.item);
            }
            ImagePurpose::Full => {
                if self.thumbnails.full_loading == Some(failure.item) {
                    self.thumbnails.full_loading = None;
                }
            }
        }
        self.thumbnails.failed.insert((failure.item, failure.purpose));
    }

    pub fn has_failed(&self, item: usize, purpose: ImagePurpose) -> bool {
        self.thumbnails.failed.contains(&(item, purpose))
    }

    /// Thumbnail protocol for an item (also updates LRU order).
    pub fn get_thumbnail(&mut self, item: usize) -> Option<&mut Box<dyn StatefulProtocol>> {
        self.thumbnails.cache.get_mut(&item)
    }

    /// Lightbox protocol, if loaded for `item`.
    pub fn get_full_image(&mut self, item: usize) -> Option<&mut Box<dyn StatefulProtocol>> {
        match &mut self.thumbnails.full {
            Some((loaded, protocol)) if *loaded == item => Some(protocol),
            _ => None,
        }
    }

    pub fn is_loading(&self, item: usize) -> bool {
        self.thumbnails.loading.contains(&item)
    }

    /// Set the image request channel.
    pub fn set_image_channel(&mut self, tx: SyncSender<ImageRequest>) {
        self.thumbnails.request_tx = Some(tx);
    }

    /// Handle terminal resize: protocols are sized for the old terminal
    /// dimensions and render garbled if reused.
    pub fn handle_resize(&mut self) {
        self.reset_thumbnail_cache();
        if self.thumbnails.image_picker.is_some() {
            self.thumbnails.image_picker = Some(Self::new_image_picker());
        }
        self.ui.cell_px = crate::ui::cell_size_px();
    }
}

fn is_kitty_terminal() -> bool {
    std::env::var("TERM")
        .map(|t| t.contains("kitty"))
        .unwrap_or(false)
        || std::env::var("KITTY_WINDOW_ID").is_ok()
}

/// Purge all Kitty graphics protocol images from the terminal.
///
/// Sends `APC G a=d,d=A ST`, which deletes every stored image and its
/// placements. Other terminals never see it.
fn clear_terminal_images() {
    if !is_kitty_terminal() {
        return;
    }
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(b"\x1b_Ga=d,d=A\x1b\\");
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use std::sync::mpsc;

    fn response(item: usize, purpose: ImagePurpose, generation: u64) -> ImageResponse {
        ImageResponse {
            item,
            purpose,
            image: image::DynamicImage::new_rgba8(1, 1),
            generation,
        }
    }

    #[test]
    fn in_flight_thumbnail_requests_are_bounded() {
        let elements = (0..40).map(|i| element(i, "x", None)).collect();
        let (mut app, _) = app(page(elements));
        app.ui.grid_columns = 3;

        let max_in_flight = app.max_in_flight_thumbnail_requests();
        let (tx, _rx) = mpsc::sync_channel(64);
        app.set_image_channel(tx);

        for item in 0..max_in_flight {
            app.request_thumbnail(item);
        }
        assert_eq!(app.thumbnails.loading.len(), max_in_flight);

        app.request_thumbnail(max_in_flight + 1);
        assert!(!app.is_loading(max_in_flight + 1));
    }

    #[test]
    fn request_thumbnail_does_not_mark_loading_when_queue_is_full() {
        let (mut app, _) = app(desert_page());
        let (tx, _rx) = mpsc::sync_channel(1);
        app.set_image_channel(tx);

        app.request_thumbnail(0);
        assert!(app.is_loading(0));

        app.request_thumbnail(1);
        assert!(!app.is_loading(1));
    }

    #[test]
    fn out_of_range_items_are_never_requested() {
        let (mut app, _) = app(desert_page());
        let (tx, rx) = mpsc::sync_channel(4);
        app.set_image_channel(tx);

        app.request_thumbnail(99);
        app.request_full_image(99);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stale_generation_is_ignored() {
        let (mut app, _) = app(desert_page());
        app.thumbnails.generation = 2;
        app.thumbnails.loading.insert(0);

        app.handle_image_ready(response(0, ImagePurpose::Thumb, 1));
        assert!(app.is_loading(0));

        app.handle_image_ready(response(0, ImagePurpose::Thumb, 2));
        assert!(!app.is_loading(0));
    }

    #[test]
    fn failed_decode_frees_the_slot_and_is_not_retried() {
        let elements = (0..40).map(|i| element(i, "x", None)).collect();
        let (mut app, _) = app(page(elements));
        let max_in_flight = app.max_in_flight_thumbnail_requests();
        let (tx, rx) = mpsc::sync_channel(64);
        app.set_image_channel(tx);

        for item in 0..40 {
            app.request_thumbnail(item);
        }
        assert_eq!(app.thumbnails.loading.len(), max_in_flight);

        while let Ok(request) = rx.try_recv() {
            app.handle_image_failed(ImageFailure {
                item: request.item,
                purpose: request.purpose,
                generation: request.generation,
            });
        }
        assert!(app.thumbnails.loading.is_empty());
        assert!(app.has_failed(0, ImagePurpose::Thumb));

        for item in 0..40 {
            app.request_thumbnail(item);
        }
        let retried: Vec<_> = rx.try_iter().map(|r| r.item).collect();
        assert_eq!(retried.len(), max_in_flight);
        assert!(retried.iter().all(|&item| item >= max_in_flight));
    }

    #[test]
    fn failed_full_image_is_requested_once() {
        let (mut app, _) = app(desert_page());
        let (tx, rx) = mpsc::sync_channel(4);
        app.set_image_channel(tx);

        app.request_full_image(1);
        let request = rx.try_recv().unwrap();
        app.handle_image_failed(ImageFailure {
            item: request.item,
            purpose: request.purpose,
            generation: request.generation,
        });
        assert!(app.thumbnails.full_loading.is_none());

        app.request_full_image(1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stale_failure_keeps_the_slot() {
        let (mut app, _) = app(desert_page());
        app.thumbnails.generation = 3;
        app.thumbnails.loading.insert(0);

        app.handle_image_failed(ImageFailure {
            item: 0,
            purpose: ImagePurpose::Thumb,
            generation: 2,
        });
        assert!(app.is_loading(0));
        assert!(!app.has_failed(0, ImagePurpose::Thumb));
    }

    #[test]
    fn full_image_request_is_sent_once_per_item() {
        let (mut app, _) = app(desert_page());
        let (tx, rx) = mpsc::sync_channel(4);
        app.set_image_channel(tx);

        app.request_full_image(2);
        app.request_full_image(2);
        let first = rx.try_recv().unwrap();
        assert_eq!((first.item, first.purpose), (2, ImagePurpose::Full));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_image_for_a_closed_lightbox_is_dropped() {
        let (mut app, _) = app(desert_page());
        app.thumbnails.full_loading = Some(1);
        app.handle_image_ready(response(1, ImagePurpose::Full, 0));
        assert!(app.thumbnails.full_loading.is_none());
        assert!(app.thumbnails.full.is_none());
    }
}
