//! Fullscreen capability.
//!
//! In the terminal, fullscreen means hiding the gallery chrome so the grid
//! or lightbox gets every cell. Terminals that understand XTWINOPS can also
//! be asked to maximise their window. Any failure is absorbed by
//! [`toggle_fullscreen`]; callers never see it.

use std::io::{self, Write};
use thiserror::Error;

const XTWINOPS_ENTER: &[u8] = b"\x1b[10;1t";
const XTWINOPS_EXIT: &[u8] = b"\x1b[10;0t";

#[derive(Debug, Error)]
pub enum FullscreenError {
    #[error("fullscreen is not supported by this terminal")]
    Unsupported,
    #[error("terminal write failed: {0}")]
    Io(#[from] io::Error),
}

pub trait FullscreenApi {
    fn is_fullscreen(&self) -> bool;
    fn request(&mut self) -> Result<(), FullscreenError>;
    fn exit(&mut self) -> Result<(), FullscreenError>;
}

/// Pick the fullscreen backend for this session.
pub fn detect(enabled: bool, window_ops: bool) -> Box<dyn FullscreenApi> {
    if enabled && !is_dumb_terminal() {
        Box::new(TerminalFullscreen::new(window_ops))
    } else {
        tracing::debug!(enabled, "fullscreen unavailable");
        Box::new(Unsupported)
    }
}

pub struct TerminalFullscreen {
    active: bool,
    window_ops: bool,
}

impl TerminalFullscreen {
    pub fn new(window_ops: bool) -> Self {
        Self {
            active: false,
            window_ops,
        }
    }

    fn send(&self, sequence: &[u8]) -> Result<(), FullscreenError> {
        if !self.window_ops {
            return Ok(());
        }
        let mut stdout = io::stdout();
        stdout.write_all(sequence)?;
        stdout.flush()?;
        Ok(())
    }
}

impl FullscreenApi for TerminalFullscreen {
    fn is_fullscreen(&self) -> bool {
        self.active
    }

    fn request(&mut self) -> Result<(), FullscreenError> {
        self.send(XTWINOPS_ENTER)?;
        self.active = true;
        Ok(())
    }

    fn exit(&mut self) -> Result<(), FullscreenError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.send(XTWINOPS_EXIT)
    }
}

/// Environment with no fullscreen support at all.
#[derive(Debug, Default)]
pub struct Unsupported;

impl FullscreenApi for Unsupported {
    fn is_fullscreen(&self) -> bool {
        false
    }

    fn request(&mut self) -> Result<(), FullscreenError> {
        Err(FullscreenError::Unsupported)
    }

    fn exit(&mut self) -> Result<(), FullscreenError> {
        Err(FullscreenError::Unsupported)
    }
}

/// Request fullscreen, or leave it when already active. Never fails.
pub fn toggle_fullscreen(api: &mut dyn FullscreenApi) -> bool {
    let result = if api.is_fullscreen() {
        api.exit()
    } else {
        api.request()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "fullscreen toggle ignored");
    }
    api.is_fullscreen()
}

fn is_dumb_terminal() -> bool {
    matches!(std::env::var("TERM").as_deref(), Ok("dumb"))
}
