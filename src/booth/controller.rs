//! The photobooth controller and its capture loop.

use super::{BoothError, BoothHandle, Event, EventQueue};
use crate::capture::{Camera, CameraBackend, CameraError, CaptureConfig, Frame};
use crate::config::StorageConfig;
use crate::display::{Display, DisplayBackend, Origin};
use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use crate::storage::{CaptureRecord, CaptureSaver, ImageStore, StorageError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Capture loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Previewing and dispatching events.
    Running,
    /// Torn down. Terminal.
    Stopped,
}

/// Counters accumulated by the capture loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Completed loop iterations.
    pub ticks: u64,
    /// Camera frames copied into the preview buffer.
    pub preview_frames: u64,
    /// Captures written to storage.
    pub captures_saved: u64,
    /// Captures dropped because of a camera or storage failure.
    pub capture_failures: u64,
    /// Events acted upon.
    pub events_dispatched: u64,
    /// Events thrown away after shutdown began.
    pub events_discarded: u64,
}

/// Owns the camera, the display and the event queue.
///
/// Input sources reach the booth only through [`BoothHandle`]s; everything
/// else runs on the thread that calls [`Photobooth::run`].
pub struct Photobooth<C: Camera, D: Display, S: ImageStore> {
    camera: C,
    display: D,
    store: S,
    saver: CaptureSaver,
    /// Preview buffer, overwritten in place whenever the camera has a frame.
    frame_buffer: Frame,
    queue: EventQueue,
    state: LoopState,
    stats: LoopStats,
    tick_interval: Option<Duration>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl<C: Camera, D: Display, S: ImageStore> Photobooth<C, D, S> {
    /// Opens the camera and the display and allocates the preview buffer.
    ///
    /// Cameras are enumerated before the display surface is created, so a
    /// booth without a camera never takes over the screen.
    pub fn initialize<CB, DB>(
        capture: &CaptureConfig,
        storage: &StorageConfig,
        cameras: &mut CB,
        displays: &mut DB,
        store: S,
    ) -> Result<Self, BoothError>
    where
        CB: CameraBackend<Camera = C>,
        DB: DisplayBackend<Surface = D>,
    {
        capture.validate()?;

        let devices = cameras.list_devices()?;
        if devices.is_empty() {
            return Err(BoothError::NoCameraDetected);
        }
        tracing::info!(count = devices.len(), "Cameras detected");

        let device = devices
            .get(capture.device_index as usize)
            .ok_or_else(|| {
                CameraError::DeviceNotFound(format!(
                    "index {} out of {} detected",
                    capture.device_index,
                    devices.len()
                ))
            })?;
        let mut camera = cameras.open(device, capture)?;

        let resolution = capture.resolution();
        let display = match displays.create_fullscreen(resolution) {
            Ok(display) => display,
            Err(e) => {
                camera.stop();
                return Err(e.into());
            }
        };

        tracing::info!(
            device = %device,
            %resolution,
            save_directory = %storage.save_directory.display(),
            "Photobooth initialized"
        );

        Ok(Self {
            camera,
            display,
            store,
            saver: CaptureSaver::new(storage.save_directory.clone()),
            frame_buffer: Frame::blank(resolution),
            queue: EventQueue::new(),
            state: LoopState::Running,
            stats: LoopStats::default(),
            tick_interval: capture.tick_interval(),
            metrics: None,
        })
    }

    /// Publishes loop counters to `registry` after every tick.
    pub fn with_metrics(mut self, registry: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(registry);
        self
    }

    /// Returns a producer handle for input sources.
    pub fn handle(&self) -> BoothHandle {
        BoothHandle::new(self.queue.clone())
    }

    /// Queues a capture request.
    pub fn on_capture_signal(&self) {
        self.queue.push(Event::CaptureRequested);
    }

    /// Queues a shutdown request.
    pub fn on_quit_signal(&self) {
        self.queue.push(Event::QuitRequested);
    }

    /// Runs the capture loop until a quit request has been handled.
    pub fn run(&mut self) -> LoopStats {
        tracing::info!("Capture loop started");
        while self.tick() == LoopState::Running {}
        tracing::info!(
            ticks = self.stats.ticks,
            captures = self.stats.captures_saved,
            failures = self.stats.capture_failures,
            "Capture loop finished"
        );
        self.stats
    }

    /// Runs one loop iteration: preview, then the queued events.
    pub fn tick(&mut self) -> LoopState {
        if self.state == LoopState::Stopped {
            return self.state;
        }
        let started = Instant::now();

        self.preview();
        if self.display.close_requested() {
            tracing::info!("Display asked to close");
            self.queue.push(Event::QuitRequested);
        }

        for event in self.queue.drain() {
            if self.state == LoopState::Stopped {
                self.stats.events_discarded += 1;
                tracing::debug!(?event, "Event discarded after shutdown");
                continue;
            }
            self.dispatch(event);
        }

        self.stats.ticks += 1;
        self.publish_metrics();

        if self.state == LoopState::Running {
            self.pace(started);
        }
        self.state
    }

    fn preview(&mut self) {
        if self.camera.has_new_frame() {
            match self.camera.fetch_into(&mut self.frame_buffer) {
                Ok(()) => self.stats.preview_frames += 1,
                Err(e) => tracing::trace!(error = %e, "No preview frame this tick"),
            }
        }

        self.display.draw(&self.frame_buffer, Origin::TOP_LEFT);
        if let Err(e) = self.display.present() {
            tracing::warn!(error = %e, "Failed to present preview");
        }
    }

    fn dispatch(&mut self, event: Event) {
        self.stats.events_dispatched += 1;
        match event {
            Event::CaptureRequested => match self.capture() {
                Ok(record) => {
                    self.stats.captures_saved += 1;
                    tracing::info!(
                        path = %record.path.display(),
                        sequence = record.sequence,
                        saved_at = %record.saved_at.to_rfc3339(),
                        "Capture saved"
                    );
                }
                Err(e) => {
                    self.stats.capture_failures += 1;
                    tracing::error!(error = %e, "Capture dropped");
                }
            },
            Event::QuitRequested => self.teardown(),
        }
    }

    /// Saves a frame fetched straight from the camera, not the preview copy.
    fn capture(&mut self) -> Result<CaptureRecord, StorageError> {
        let frame = self
            .camera
            .fetch()
            .map_err(|e| StorageError::ImageWriteFailed {
                path: self.saver.directory().to_path_buf(),
                reason: format!("camera produced no frame: {e}"),
            })?;
        self.saver.save(&mut self.store, &frame)
    }

    /// Tears down immediately without going through the queue.
    ///
    /// Used when startup fails after the hardware was claimed. Does nothing
    /// once the loop has stopped.
    pub fn shutdown(&mut self) {
        if self.state == LoopState::Running {
            self.teardown();
        }
    }

    fn teardown(&mut self) {
        tracing::info!("Shutting down photobooth");
        self.camera.stop();
        self.display.release();
        self.state = LoopState::Stopped;
    }

    fn pace(&self, started: Instant) {
        if let Some(interval) = self.tick_interval {
            let elapsed = started.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
    }

    fn publish_metrics(&self) {
        if let Some(registry) = &self.metrics {
            let running = self.state == LoopState::Running;
            registry.update(&MetricsSnapshot::from_stats(&self.stats, running));
        }
    }

    /// Current loop state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Counters so far.
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// The preview buffer.
    pub fn frame_buffer(&self) -> &Frame {
        &self.frame_buffer
    }

    /// The camera handle.
    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// Mutable access to the camera handle.
    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    /// The display surface.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Mutable access to the display surface.
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// The image store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the image store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{MockBackend, MockCamera};
    use crate::display::{HeadlessBackend, HeadlessDisplay};
    use crate::storage::MemoryStore;

    type TestBooth = Photobooth<MockCamera, HeadlessDisplay, MemoryStore>;

    fn booth() -> TestBooth {
        let capture = CaptureConfig {
            width: 8,
            height: 6,
            preview_fps: 0,
            ..Default::default()
        };
        let storage = StorageConfig {
            save_directory: "/booth/saved_images".into(),
        };
        Photobooth::initialize(
            &capture,
            &storage,
            &mut MockBackend::new(),
            &mut HeadlessBackend::new(),
            MemoryStore::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_tick_previews_without_events() {
        let mut booth = booth();
        assert_eq!(booth.tick(), LoopState::Running);

        assert_eq!(booth.stats().preview_frames, 1);
        assert_eq!(booth.display().presents(), 1);
        assert_eq!(booth.frame_buffer().sequence(), 1);
    }

    #[test]
    fn test_capture_uses_fresh_frame() {
        let mut booth = booth();
        booth.tick();
        booth.on_capture_signal();
        booth.tick();

        // Preview took frames 1 and 2; the capture fetched frame 3.
        let written = booth.store().written();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].1, 3);
        assert_eq!(booth.frame_buffer().sequence(), 2);
    }

    #[test]
    fn test_quit_discards_later_events() {
        let mut booth = booth();
        booth.on_quit_signal();
        booth.on_capture_signal();

        assert_eq!(booth.tick(), LoopState::Stopped);
        assert_eq!(booth.stats().events_discarded, 1);
        assert_eq!(booth.camera().stops(), 1);
        assert!(booth.display().is_released());
        assert!(booth.store().written().is_empty());
    }

    #[test]
    fn test_tick_after_stop_is_inert() {
        let mut booth = booth();
        booth.on_quit_signal();
        booth.tick();
        booth.on_capture_signal();

        assert_eq!(booth.tick(), LoopState::Stopped);
        assert_eq!(booth.stats().ticks, 1);
        assert_eq!(booth.camera().polls_after_stop(), 0);
        assert_eq!(booth.camera().stops(), 1);
    }

    #[test]
    fn test_fetch_failure_counts_as_capture_failure() {
        let mut booth = booth();
        booth.tick();
        booth.camera_mut().script_ready([false]);
        booth.camera_mut().script_fetches([false]);
        booth.on_capture_signal();

        assert_eq!(booth.tick(), LoopState::Running);
        assert_eq!(booth.stats().capture_failures, 1);
        assert_eq!(booth.store().write_attempts(), 0);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut booth = booth();
        booth.shutdown();
        booth.shutdown();
        booth.on_quit_signal();
        booth.tick();

        assert_eq!(booth.state(), LoopState::Stopped);
        assert_eq!(booth.camera().stops(), 1);
    }

    #[test]
    fn test_display_close_requests_quit() {
        let mut booth = booth();
        booth.display_mut().request_close();
        assert_eq!(booth.tick(), LoopState::Stopped);
        assert_eq!(booth.camera().stops(), 1);
    }

    #[test]
    fn test_metrics_published() {
        let registry = Arc::new(MetricsRegistry::new().unwrap());
        let mut booth = booth().with_metrics(Arc::clone(&registry));
        booth.on_capture_signal();
        booth.tick();

        let output = registry.encode().unwrap();
        assert!(output.contains("photobooth_captures_total 1"));
        assert!(output.contains("photobooth_running 1"));
    }
}
