// Pixel buffers and small geometry types shared by the engine and the demo.

/// Native resolution of the sensor's color and depth streams.
pub const FRAME_WIDTH: usize = 640;
pub const FRAME_HEIGHT: usize = 480;

/// Color frames are B,G,R,X with one byte per channel.
pub const COLOR_BYTES_PER_PIXEL: usize = 4;

/// Low bits of a depth sample holding the 1-based player index (0 = nobody).
pub const PLAYER_INDEX_BITMASK: u16 = 0x07;
pub const PLAYER_INDEX_BITMASK_WIDTH: u16 = 3;

/// Window pixels, row-major, 0x00RRGGBB as minifb wants them.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }
}

/// One color frame in the sensor's byte layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>, // width * height * 4, B,G,R,X per pixel
}

impl ColorFrame {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, data: vec![0u8; width * height * COLOR_BYTES_PER_PIXEL] }
    }

    /// Reallocate when the incoming frame has a different size.
    /// Returns true when the buffer was replaced.
    pub fn ensure_size(&mut self, width: usize, height: usize) -> bool {
        let len = width * height * COLOR_BYTES_PER_PIXEL;
        if self.width == width && self.height == height && self.data.len() == len {
            return false;
        }
        log::debug!(
            "color buffer reallocated: {}x{} -> {}x{}",
            self.width, self.height, width, height
        );
        *self = Self::new(width, height);
        true
    }

    /// Byte offset of the blue channel of pixel (x,y).
    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * COLOR_BYTES_PER_PIXEL
    }

    /// The (r,g,b) triple at (x,y).
    pub fn rgb_at(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let o = self.offset(x, y);
        (self.data[o + 2], self.data[o + 1], self.data[o])
    }

    pub fn set_rgb(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
        let o = self.offset(x, y);
        self.data[o] = b;
        self.data[o + 1] = g;
        self.data[o + 2] = r;
    }
}

/// One depth frame: depth in millimetres above the player index bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepthFrame {
    pub width: usize,
    pub height: usize,
    pub samples: Vec<u16>,
}

impl DepthFrame {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, samples: vec![0u16; width * height] }
    }

    /// Same contract as [`ColorFrame::ensure_size`].
    pub fn ensure_size(&mut self, width: usize, height: usize) -> bool {
        let len = width * height;
        if self.width == width && self.height == height && self.samples.len() == len {
            return false;
        }
        log::debug!(
            "depth buffer reallocated: {}x{} -> {}x{}",
            self.width, self.height, width, height
        );
        *self = Self::new(width, height);
        true
    }

    /// Pack a depth (mm) and a 1-based player index into one sample.
    #[inline]
    pub fn pack(depth_mm: u16, player: u16) -> u16 {
        (depth_mm << PLAYER_INDEX_BITMASK_WIDTH) | (player & PLAYER_INDEX_BITMASK)
    }

    #[inline]
    pub fn player_index_at(&self, x: usize, y: usize) -> u16 {
        self.samples[y * self.width + x] & PLAYER_INDEX_BITMASK
    }

    #[inline]
    pub fn depth_mm_at(&self, x: usize, y: usize) -> u16 {
        self.samples[y * self.width + x] >> PLAYER_INDEX_BITMASK_WIDTH
    }
}

/// A position in color-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance_squared(self, other: Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Whole-pixel coordinates, truncated toward zero.
    #[inline]
    pub fn to_pixel(self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// Axis-aligned rectangle in pixel space; containment is half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Widened to i64 so rectangles reaching past `i32::MAX` (from a config
    /// file, say) cannot overflow.
    #[inline]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        let (px, py) = (px as i64, py as i64);
        let (x, y) = (self.x as i64, self.y as i64);
        px >= x && px < x + self.width as i64 && py >= y && py < y + self.height as i64
    }
}
