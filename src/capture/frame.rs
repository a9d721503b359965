//! Frame type representing a captured RGB image with metadata.

use std::time::Instant;

/// Bytes per pixel for packed RGB8 data.
pub const BYTES_PER_PIXEL: usize = 3;

/// Output size of the camera and the preview surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Creates a resolution from width and height.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Returns the size of a packed RGB8 buffer at this resolution.
    #[inline]
    pub fn rgb_len(&self) -> usize {
        self.pixel_count() * BYTES_PER_PIXEL
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A single captured frame from the camera.
///
/// The preview loop keeps one `Frame` alive for the whole session and
/// rewrites it in place with [`Frame::overwrite`], so steady-state preview
/// does not allocate.
#[derive(Clone)]
pub struct Frame {
    /// Packed RGB8 pixel data, row-major.
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    /// Time the pixels were last written.
    timestamp: Instant,
    /// Camera sequence number of the pixels. Zero for a blank buffer.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame with the given parameters.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Allocates a black frame sized to `resolution`.
    pub fn blank(resolution: Resolution) -> Self {
        Self::new(
            vec![0u8; resolution.rgb_len()],
            resolution.width,
            resolution.height,
            0,
        )
    }

    /// Replaces the pixel contents in place.
    ///
    /// The existing allocation is reused whenever `pixels` fits in it.
    pub fn overwrite(&mut self, pixels: &[u8], width: u32, height: u32, sequence: u64) {
        self.pixels.clear();
        self.pixels.extend_from_slice(pixels);
        self.width = width;
        self.height = height;
        self.sequence = sequence;
        self.timestamp = Instant::now();
    }

    /// Returns a reference to the raw RGB8 pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the frame dimensions.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Returns the time the pixels were last written.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the capacity of the pixel allocation in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.pixels.capacity()
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.resolution().rgb_len()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}
