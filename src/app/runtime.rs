use super::{
    App, AppEvent, ImageFailure, ImagePurpose, ImageRequest, ImageResponse, LaunchOptions,
};
use crate::fullscreen;
use crate::gallery::autoplay::TokioScheduler;
use crate::page::Page;
use crate::thumbnail::ImageLoader;
use crate::ui;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::collections::HashMap;
use std::io;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread;
use std::time::{Duration, Instant};

const IMAGE_REQUEST_QUEUE_CAPACITY: usize = 512;
const APP_EVENT_QUEUE_CAPACITY: usize = 1024;

pub async fn run_tui(page: Page, config: super::Config, launch: LaunchOptions) -> Result<()> {
    // Bounded event queue avoids unbounded memory growth during heavy image churn.
    let (event_tx, event_rx) = mpsc::sync_channel::<AppEvent>(APP_EVENT_QUEUE_CAPACITY);
    let (image_tx, image_rx) = mpsc::sync_channel::<ImageRequest>(IMAGE_REQUEST_QUEUE_CAPACITY);

    // Slideshow ticks are dropped when the queue is full; the next one comes
    // a period later.
    let tick_tx = event_tx.clone();
    let scheduler = TokioScheduler::new(tokio::runtime::Handle::current(), move |generation| {
        let _ = tick_tx.try_send(AppEvent::AutoplayTick(generation));
    });
    let fullscreen = fullscreen::detect(config.display.fullscreen, config.display.window_ops);

    // from_termios() queries the terminal for font size,
    // guess_protocol() then picks Kitty, Sixel, iTerm2 or halfblocks.
    let image_picker = Some(App::new_image_picker());

    let loader = ImageLoader::new(
        super::Config::cache_dir().join("thumbs"),
        config.thumbnails.width,
        config.thumbnails.height,
        config.thumbnails.quality,
    );

    let mut app = App::new(
        page,
        config,
        Box::new(scheduler),
        fullscreen,
        image_picker,
        launch,
    );
    app.ui.cell_px = ui::cell_size_px();
    app.set_image_channel(image_tx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let event_tx_image = event_tx.clone();
    thread::spawn(move || {
        image_worker(image_rx, event_tx_image, loader);
    });

    let event_tx_input = event_tx.clone();
    thread::spawn(move || {
        input_worker(event_tx_input);
    });
    drop(event_tx);

    // The loop blocks; keep runtime workers free for slideshow timers.
    let res = tokio::task::block_in_place(|| run_app(&mut terminal, &mut app, event_rx));

    // Stop the slideshow task before the terminal goes away.
    app.gallery.stop_autoplay();
    if app.is_fullscreen() {
        let _ = app.fullscreen.exit();
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

/// Background thread that decodes images using fast_image_resize.
fn image_worker(rx: Receiver<ImageRequest>, tx: SyncSender<AppEvent>, loader: ImageLoader) {
    while let Ok(first_request) = rx.recv() {
        // Drain available work and keep only the newest generation, so a
        // resize doesn't leave the worker decoding superseded requests.
        let requests = collect_latest_requests(first_request, &rx);

        for request in requests {
            let result = match request.purpose {
                ImagePurpose::Thumb => loader.load_thumbnail(&request.source),
                ImagePurpose::Full => loader.load_full(&request.source),
            };
            match result {
                Ok(image) => {
                    let response = ImageResponse {
                        item: request.item,
                        purpose: request.purpose,
                        image,
                        generation: request.generation,
                    };
                    if !send_image_ready(&tx, response) {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        path = %request.source.display(),
                        error = %e,
                        "image decode failed"
                    );
                    let failure = ImageFailure {
                        item: request.item,
                        purpose: request.purpose,
                        generation: request.generation,
                    };
                    if tx.send(AppEvent::ImageFailed(failure)).is_err() {
                        return;
                    }
                }
            }
        }
    }
}

fn send_image_ready(tx: &SyncSender<AppEvent>, response: ImageResponse) -> bool {
    tx.send(AppEvent::ImageReady(response)).is_ok()
}

fn collect_latest_requests(
    first_request: ImageRequest,
    rx: &Receiver<ImageRequest>,
) -> Vec<ImageRequest> {
    let mut latest_generation = first_request.generation;
    let mut latest: HashMap<(usize, ImagePurpose), ImageRequest> = HashMap::new();
    latest.insert((first_request.item, first_request.purpose), first_request);

    while let Ok(request) = rx.try_recv() {
        if request.generation > latest_generation {
            latest_generation = request.generation;
            latest.clear();
        }

        if request.generation == latest_generation {
            latest.insert((request.item, request.purpose), request);
        }
    }

    // Lightbox images first.
    let mut requests: Vec<_> = latest.into_values().collect();
    requests.sort_by_key(|r| (r.purpose != ImagePurpose::Full, r.item));
    requests
}

/// Background thread that polls for input events.
fn input_worker(tx: SyncSender<AppEvent>) {
    loop {
        if event::poll(Duration::from_millis(50)).unwrap_or(false) {
            let forwarded = match event::read() {
                Ok(Event::Key(key)) => tx.send(AppEvent::Key(key)),
                Ok(Event::Mouse(mouse)) => tx.send(AppEvent::Mouse(mouse)),
                Ok(Event::Resize(_, _)) => tx.send(AppEvent::Resize),
                _ => Ok(()),
            };
            if forwarded.is_err() {
                break;
            }
        } else {
            match tx.try_send(AppEvent::Tick) {
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
    }
}

fn coalesce_image_events(events: Vec<AppEvent>) -> Vec<AppEvent> {
    let mut coalesced = Vec::with_capacity(events.len());
    let mut latest_generation: Option<u64> = None;
    let mut latest: HashMap<(usize, ImagePurpose), ImageResponse> = HashMap::new();

    for event in events {
        match event {
            AppEvent::ImageReady(response) => {
                match latest_generation {
                    None => latest_generation = Some(response.generation),
                    Some(gen) if response.generation > gen => {
                        latest_generation = Some(response.generation);
                        latest.clear();
                    }
                    Some(gen) if response.generation < gen => continue,
                    Some(_) => {}
                }
                latest.insert((response.item, response.purpose), response);
            }
            other => coalesced.push(other),
        }
    }

    if !latest.is_empty() {
        let mut images: Vec<_> = latest.into_values().collect();
        images.sort_by_key(|r| r.item);
        coalesced.extend(images.into_iter().map(AppEvent::ImageReady));
    }

    coalesced
}

fn handle_event<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event: AppEvent,
) -> Result<()> {
    match event {
        AppEvent::Key(key) => app.handle_key(key),
        AppEvent::Mouse(mouse) => app.handle_mouse(mouse),
        AppEvent::ImageReady(response) => app.handle_image_ready(response),
        AppEvent::ImageFailed(failure) => app.handle_image_failed(failure),
        AppEvent::AutoplayTick(generation) => app.handle_autoplay_tick(generation),
        AppEvent::Resize => {
            app.handle_resize();
            terminal.clear()?;
        }
        AppEvent::Tick => {}
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_rx: Receiver<AppEvent>,
) -> Result<()> {
    let mut last_theme_check = Instant::now();
    let mut current_theme_is_light = ui::theme::is_light_theme();
    let mut was_fullscreen = app.is_fullscreen();
    let mut needs_redraw = true;

    loop {
        // Check for theme change every 500ms and force full redraw.
        if last_theme_check.elapsed() >= Duration::from_millis(500) {
            let new_is_light = ui::theme::is_light_theme();
            if new_is_light != current_theme_is_light {
                current_theme_is_light = new_is_light;
                app.ui.theme = ui::theme::grid_theme();
                terminal.clear()?;
                needs_redraw = true;
            }
            last_theme_check = Instant::now();
        }

        // Only redraw when needed (event received or state changed).
        if needs_redraw {
            terminal.draw(|f| ui::draw(f, app))?;
            needs_redraw = false;
        }

        // Block until event arrives (with timeout for theme checks).
        let events = match event_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                needs_redraw = true;
                let mut events = vec![event];
                while let Ok(e) = event_rx.try_recv() {
                    events.push(e);
                }
                coalesce_image_events(events)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(()),
        };

        for event in events {
            handle_event(terminal, app, event)?;
        }

        // Chrome appears or disappears; stale image placements must go.
        if app.is_fullscreen() != was_fullscreen {
            was_fullscreen = app.is_fullscreen();
            app.handle_resize();
            terminal.clear()?;
        }

        if app.ui.should_quit {
            return Ok(());
        }
    }
}
