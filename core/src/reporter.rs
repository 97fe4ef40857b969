//! Reporter
//!
//! Progress and preview notifications emitted by a renderer.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Receives progress and preview notifications. Implementations are called
/// from the rendering thread.
pub trait Reporter: Send + Sync {
    /// A new stage has started.
    ///
    /// * `name` - Name of the stage.
    fn new_stage(&self, name: &str);

    /// The current stage has finished.
    fn complete_stage(&self);

    /// Progress of the current stage.
    ///
    /// * `percent` - Percentage in `[0, 100]`.
    fn progress(&self, percent: f64);

    /// Returns true if the reporter wants a new preview image.
    fn need_preview(&self) -> bool {
        false
    }

    /// Delivers a preview image.
    ///
    /// * `pixels` - 8-bit RGBA pixels in row-major order.
    /// * `width`  - Width in pixels.
    /// * `height` - Height in pixels.
    fn new_preview(&self, _pixels: Vec<[u8; 4]>, _width: u32, _height: u32) {}
}

/// Atomic reference counted `Reporter`.
pub type ArcReporter = Arc<dyn Reporter>;

/// Ignores every notification.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn new_stage(&self, _name: &str) {}

    fn complete_stage(&self) {}

    fn progress(&self, _percent: f64) {}
}

/// Draws a progress bar per stage on the terminal.
#[derive(Default)]
pub struct ConsoleReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    /// Create a new `ConsoleReporter`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for ConsoleReporter {
    fn new_stage(&self, name: &str) {
        let bar = ProgressBar::new(100);
        bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(4));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise} - {eta_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.set_message(name.to_string());

        if let Ok(mut current) = self.bar.lock() {
            if let Some(old) = current.replace(bar) {
                old.finish_and_clear();
            }
        }
    }

    fn complete_stage(&self) {
        if let Ok(mut current) = self.bar.lock() {
            if let Some(bar) = current.take() {
                bar.finish();
            }
        }
    }

    fn progress(&self, percent: f64) {
        if let Ok(current) = self.bar.lock() {
            if let Some(bar) = current.as_ref() {
                bar.set_position(percent.clamp(0.0, 100.0) as u64);
            }
        }
    }
}

/// A preview image.
#[derive(Clone, Debug, PartialEq)]
pub struct Preview {
    /// 8-bit RGBA pixels in row-major order.
    pub pixels: Vec<[u8; 4]>,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

#[derive(Default)]
struct PreviewState {
    stage: String,
    percent: f64,
    last_preview: Option<Instant>,
    preview: Option<Preview>,
}

/// Keeps the latest progress and preview for callers that poll, asking for
/// a new preview at most once per interval.
pub struct PreviewReporter {
    interval: Duration,
    state: Mutex<PreviewState>,
}

impl PreviewReporter {
    /// Create a new `PreviewReporter`.
    ///
    /// * `interval` - Minimum time between previews.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Mutex::new(PreviewState::default()),
        }
    }

    /// Returns the name of the current stage and its progress.
    pub fn status(&self) -> (String, f64) {
        self.state
            .lock()
            .map(|s| (s.stage.clone(), s.percent))
            .unwrap_or_default()
    }

    /// Takes the latest preview, if a new one arrived since the last call.
    pub fn take_preview(&self) -> Option<Preview> {
        self.state.lock().ok().and_then(|mut s| s.preview.take())
    }
}

impl Reporter for PreviewReporter {
    fn new_stage(&self, name: &str) {
        if let Ok(mut s) = self.state.lock() {
            s.stage = name.to_string();
            s.percent = 0.0;
        }
    }

    fn complete_stage(&self) {
        if let Ok(mut s) = self.state.lock() {
            s.percent = 100.0;
        }
    }

    fn progress(&self, percent: f64) {
        if let Ok(mut s) = self.state.lock() {
            s.percent = percent;
        }
    }

    fn need_preview(&self) -> bool {
        self.state
            .lock()
            .map(|s| s.last_preview.map_or(true, |t| t.elapsed() >= self.interval))
            .unwrap_or(false)
    }

    fn new_preview(&self, pixels: Vec<[u8; 4]>, width: u32, height: u32) {
        if let Ok(mut s) = self.state.lock() {
            s.last_preview = Some(Instant::now());
            s.preview = Some(Preview {
                pixels,
                width,
                height,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_throttled() {
        let reporter = PreviewReporter::new(Duration::from_secs(3600));
        assert!(reporter.need_preview());
        reporter.new_preview(vec![[0, 0, 0, 255]], 1, 1);
        assert!(!reporter.need_preview());
        assert_eq!(reporter.take_preview().map(|p| p.width), Some(1));
        assert!(reporter.take_preview().is_none());
    }

    #[test]
    fn status_tracks_stage() {
        let reporter = PreviewReporter::new(Duration::ZERO);
        reporter.new_stage("render");
        reporter.progress(42.0);
        assert_eq!(reporter.status(), ("render".to_string(), 42.0));
        reporter.complete_stage();
        assert_eq!(reporter.status().1, 100.0);
        assert!(reporter.need_preview());
    }
}
