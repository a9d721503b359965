//! Borderless preview window built on `minifb`.

use super::{Display, DisplayBackend, DisplayError, Origin};
use crate::capture::{Frame, Resolution};
use minifb::{Key, Window, WindowOptions};

const WINDOW_TITLE: &str = "photobooth";

/// Opens borderless, top-most windows covering the configured resolution.
#[derive(Debug, Default)]
pub struct MinifbBackend;

impl MinifbBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

impl DisplayBackend for MinifbBackend {
    type Surface = MinifbDisplay;

    fn create_fullscreen(&mut self, resolution: Resolution) -> Result<MinifbDisplay, DisplayError> {
        let options = WindowOptions {
            borderless: true,
            title: false,
            resize: false,
            topmost: true,
            ..WindowOptions::default()
        };
        let mut window = Window::new(
            WINDOW_TITLE,
            resolution.width as usize,
            resolution.height as usize,
            options,
        )
        .map_err(|e| DisplayError::CreateFailed(e.to_string()))?;
        window.set_cursor_visibility(false);

        tracing::info!(%resolution, "Preview window created");

        Ok(MinifbDisplay {
            window: Some(window),
            resolution,
            buffer: vec![0u32; resolution.pixel_count()],
        })
    }
}

/// A live preview window.
pub struct MinifbDisplay {
    /// `None` once released.
    window: Option<Window>,
    resolution: Resolution,
    /// 0RGB back buffer, reused every tick.
    buffer: Vec<u32>,
}

impl Display for MinifbDisplay {
    fn draw(&mut self, frame: &Frame, origin: Origin) {
        let surface_w = self.resolution.width as i64;
        let surface_h = self.resolution.height as i64;
        let frame_w = frame.width() as i64;
        let pixels = frame.pixels();

        for row in 0..frame.height() as i64 {
            let y = row + origin.y as i64;
            if y < 0 || y >= surface_h {
                continue;
            }
            // Clip the row horizontally against the surface.
            let x_start = (origin.x as i64).max(0);
            let x_end = (origin.x as i64 + frame_w).min(surface_w);
            for x in x_start..x_end {
                let col = x - origin.x as i64;
                let src = ((row * frame_w + col) * 3) as usize;
                let Some(rgb) = pixels.get(src..src + 3) else {
                    continue;
                };
                let value = ((rgb[0] as u32) << 16) | ((rgb[1] as u32) << 8) | rgb[2] as u32;
                self.buffer[(y * surface_w + x) as usize] = value;
            }
        }
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        let window = self
            .window
            .as_mut()
            .ok_or_else(|| DisplayError::PresentFailed("window released".into()))?;
        window
            .update_with_buffer(
                &self.buffer,
                self.resolution.width as usize,
                self.resolution.height as usize,
            )
            .map_err(|e| DisplayError::PresentFailed(e.to_string()))
    }

    fn release(&mut self) {
        // Dropping the window closes it.
        if self.window.take().is_some() {
            tracing::info!("Preview window closed");
        }
    }

    fn close_requested(&self) -> bool {
        match &self.window {
            Some(window) => !window.is_open() || window.is_key_down(Key::Escape),
            None => false,
        }
    }
}
