// Demo window and the overlays drawn on top of the painted frame.
// Visual: the painted camera image fills the window; optional stick figures,
// a mouse crosshair and one line of HUD text sit on top of it.

use crate::error::{Error, Result};
use crate::joint::BONES;
use crate::projector::ProjectedJoints;
use crate::types::{COLOR_BYTES_PER_PIXEL, ColorFrame, FrameBuffer, Point2};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window,
}

impl Drawer {
    /// Open a `width` x `height` window capped at `target_fps`.
    pub fn new(title: &str, width: usize, height: usize, target_fps: usize) -> Result<Self> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(target_fps);
        Ok(Self { window })
    }

    /// Show `screen`; also pumps the window's input events.
    pub fn present(&mut self, screen: &FrameBuffer) -> Result<()> {
        self.window
            .update_with_buffer(&screen.pixels, screen.width, screen.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Mouse position in frame pixels, clamped to the window.
    pub fn mouse_pos(&self) -> Option<(usize, usize)> {
        let (x, y) = self.window.get_mouse_pos(MouseMode::Clamp)?;
        Some((x.max(0.0) as usize, y.max(0.0) as usize))
    }

    /// True once per S key press (no auto-repeat).
    pub fn s_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::S, KeyRepeat::No)
    }
}

/// Convert B,G,R,X sensor bytes into 0x00RRGGBB window pixels.
/// `fb` follows the frame's size.
pub fn blit_color_frame(fb: &mut FrameBuffer, frame: &ColorFrame) {
    if (fb.width, fb.height) != (frame.width, frame.height) {
        *fb = FrameBuffer::new(frame.width, frame.height);
    }
    for (dst, px) in fb.pixels.iter_mut().zip(frame.data.chunks_exact(COLOR_BYTES_PER_PIXEL)) {
        *dst = u32::from_be_bytes([0, px[2], px[1], px[0]]);
    }
}

fn plot(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 || x as usize >= fb.width || y as usize >= fb.height {
        return;
    }
    fb.pixels[y as usize * fb.width + x as usize] = color;
}

/// 1-pixel line, stepping along the longer axis.
fn line(fb: &mut FrameBuffer, (x0, y0): (i32, i32), (x1, y1): (i32, i32), color: u32) {
    let steps = (x1 - x0).abs().max((y1 - y0).abs());
    if steps == 0 {
        plot(fb, x0, y0, color);
        return;
    }
    let (sx, sy) = ((x1 - x0) as f32 / steps as f32, (y1 - y0) as f32 / steps as f32);
    for i in 0..=steps {
        let (x, y) = (x0 as f32 + sx * i as f32, y0 as f32 + sy * i as f32);
        plot(fb, x.round() as i32, y.round() as i32, color);
    }
}

fn square(fb: &mut FrameBuffer, (cx, cy): (i32, i32), half: i32, color: u32) {
    for y in cy - half..=cy + half {
        for x in cx - half..=cx + half {
            plot(fb, x, y, color);
        }
    }
}

/// Stick figure for every occupied slot: bones, then a dot per joint.
pub fn draw_skeletons(
    fb: &mut FrameBuffer,
    joints: &ProjectedJoints,
    bone_color: u32,
    joint_color: u32,
) {
    // Joints can project far off-screen; keep line lengths bounded.
    let limit = (fb.width.max(fb.height) * 4) as f32;
    let px = |p: Point2| (p.x.clamp(-limit, limit) as i32, p.y.clamp(-limit, limit) as i32);

    for (_, points) in joints.occupied() {
        for (a, b) in BONES {
            line(fb, px(points[a.index()]), px(points[b.index()]), bone_color);
        }
        for &p in points {
            square(fb, px(p), 2, joint_color);
        }
    }
}

/// Plus sign with an open center, arms `size` pixels long.
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    const GAP: i32 = 2;
    for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
        line(fb, (cx + dx * GAP, cy + dy * GAP), (cx + dx * size, cy + dy * size), color);
    }
    plot(fb, cx, cy, color);
}

/* ---------- HUD font ---------- */

const GLYPH_W: i32 = 5;
const GLYPH_ADVANCE: i32 = GLYPH_W + 1;

/// 5x7 glyphs, one byte per row, bit 4 is the leftmost column.
/// Only what the HUD prints: digits, the status words and a little punctuation.
const FONT: &[(char, [u8; 7])] = &[
    ('0', [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E]),
    ('1', [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('2', [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F]),
    ('3', [0x1E, 0x01, 0x01, 0x0E, 0x01, 0x01, 0x1E]),
    ('4', [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02]),
    ('5', [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E]),
    ('6', [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E]),
    ('7', [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
    ('8', [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E]),
    ('9', [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C]),
    ('A', [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]),
    ('D', [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C]),
    ('E', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F]),
    ('F', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10]),
    ('I', [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('K', [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11]),
    ('L', [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F]),
    ('M', [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11]),
    ('N', [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11]),
    ('O', [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
    ('P', [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10]),
    ('R', [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11]),
    ('S', [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E]),
    ('T', [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    ('U', [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
    ('|', [0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    (':', [0x00, 0x04, 0x00, 0x00, 0x04, 0x00, 0x00]),
    ('.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00]),
];

fn glyph(ch: char) -> Option<&'static [u8; 7]> {
    FONT.iter().find(|(c, _)| *c == ch).map(|(_, rows)| rows)
}

/// HUD text with a one-pixel drop shadow. Unknown characters (and spaces)
/// just advance the pen.
pub fn draw_text_5x7(fb: &mut FrameBuffer, x: i32, y: i32, text: &str, color: u32) {
    for (i, ch) in text.chars().enumerate() {
        let Some(rows) = glyph(ch) else { continue };
        let left = x + i as i32 * GLYPH_ADVANCE;
        for (offset, ink) in [(1, 0x00_00_00_00), (0, color)] {
            for (row, bits) in (0..).zip(rows) {
                for col in 0..GLYPH_W {
                    if (bits >> (GLYPH_W - 1 - col)) & 1 == 1 {
                        plot(fb, left + col + offset, y + row + offset, ink);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::{JointKind, SlotId};

    #[test]
    fn test_blit_swaps_channels() {
        let mut frame = ColorFrame::new(2, 1);
        frame.set_rgb(0, 0, 0x12, 0x34, 0x56);
        let mut fb = FrameBuffer::new(2, 1);
        blit_color_frame(&mut fb, &frame);
        assert_eq!(fb.pixels[0], 0x00_12_34_56);
        assert_eq!(fb.pixels[1], 0);
    }

    #[test]
    fn test_blit_follows_frame_size() {
        let frame = ColorFrame::new(4, 3);
        let mut fb = FrameBuffer::new(640, 480);
        blit_color_frame(&mut fb, &frame);
        assert_eq!((fb.width, fb.height, fb.pixels.len()), (4, 3, 12));
    }

    #[test]
    fn test_line_reaches_both_ends() {
        let mut fb = FrameBuffer::new(20, 20);
        line(&mut fb, (2, 3), (15, 9), 7);
        assert_eq!(fb.pixels[3 * 20 + 2], 7);
        assert_eq!(fb.pixels[9 * 20 + 15], 7);
        assert_eq!(fb.pixels.iter().filter(|p| **p == 7).count(), 14);
    }

    #[test]
    fn test_skeleton_drawing_stays_in_bounds() {
        let mut joints = ProjectedJoints::new();
        let mut points = [Point2::new(50.0, 50.0); JointKind::COUNT];
        points[JointKind::Head.index()] = Point2::new(-1.0e9, 1.0e9);
        joints.set_slot(SlotId::new(1).unwrap(), points);

        let mut fb = FrameBuffer::new(100, 100);
        draw_skeletons(&mut fb, &joints, 0xFFFFFF, 0x00FF00);
        assert_eq!(fb.pixels[50 * 100 + 50], 0x00FF00);
    }

    #[test]
    fn test_crosshair_leaves_a_gap() {
        let mut fb = FrameBuffer::new(21, 21);
        draw_crosshair(&mut fb, 10, 10, 6, 1);
        assert_eq!(fb.pixels[10 * 21 + 10], 1);
        assert_eq!(fb.pixels[10 * 21 + 11], 0);
        assert_eq!(fb.pixels[10 * 21 + 16], 1);
        assert_eq!(fb.pixels[4 * 21 + 10], 1);
    }

    #[test]
    fn test_text_skips_unknown_glyphs() {
        let mut fb = FrameBuffer::new(64, 16);
        draw_text_5x7(&mut fb, 1, 1, "? ", 0xFFFFFF);
        assert!(fb.pixels.iter().all(|p| *p == 0));
        draw_text_5x7(&mut fb, 1, 1, "PAINTED", 0xFFFFFF);
        assert!(fb.pixels.iter().any(|p| *p == 0xFFFFFF));
    }
}
