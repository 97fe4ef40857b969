//! Async Renderer

use super::*;
use crossbeam_channel::{bounded, Receiver};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

struct Job {
    handle: JoinHandle<()>,
    result: Receiver<Result<RenderResult>>,
}

/// Runs a renderer on a background thread.
pub struct AsyncRenderer {
    renderer: ArcRenderer,
    stop: StopToken,
    job: Mutex<Option<Job>>,
}

impl AsyncRenderer {
    /// Create a new `AsyncRenderer`.
    ///
    /// * `renderer` - The renderer to run.
    pub fn new(renderer: ArcRenderer) -> Self {
        Self {
            renderer,
            stop: StopToken::new(),
            job: Mutex::new(None),
        }
    }

    /// Starts rendering in the background. Fails if a render is already
    /// running or its result has not been collected.
    pub fn render_async(&self) -> Result<()> {
        let mut job = self
            .job
            .lock()
            .map_err(|_| Error::Runtime("async renderer lock poisoned".to_string()))?;
        if job.is_some() {
            return Err(Error::Runtime("a render is already in progress".to_string()));
        }

        self.stop.reset();
        let (tx, rx) = bounded(1);
        let renderer = self.renderer.clone();
        let stop = self.stop.clone();
        let handle = thread::Builder::new()
            .name("render".to_string())
            .spawn(move || {
                let result = renderer.render(&stop);
                if tx.send(result).is_err() {
                    warn!("Render result dropped; nobody is waiting for it");
                }
            })
            .map_err(|e| Error::Runtime(format!("unable to spawn render thread: {e}")))?;

        *job = Some(Job { handle, result: rx });
        Ok(())
    }

    /// Returns true while the background render is running.
    pub fn is_rendering(&self) -> bool {
        self.job
            .lock()
            .map(|job| job.as_ref().map_or(false, |j| !j.handle.is_finished()))
            .unwrap_or(false)
    }

    /// Asks the background render to stop after its current iteration.
    pub fn stop_async(&self) {
        self.stop.stop();
    }

    /// Waits for the background render and returns its result.
    pub fn wait_async(&self) -> Result<RenderResult> {
        let job = self
            .job
            .lock()
            .map_err(|_| Error::Runtime("async renderer lock poisoned".to_string()))?
            .take()
            .ok_or_else(|| Error::Runtime("no render in progress".to_string()))?;

        let result = job
            .result
            .recv()
            .map_err(|_| Error::Runtime("render thread terminated without a result".to_string()));
        if job.handle.join().is_err() {
            return Err(Error::Runtime("render thread panicked".to_string()));
        }
        result?
    }
}
