// Frame compositor: lays each person's joint paint over their own pixels.
// Visual expectation: a soft cloud of color hugs every tracked body, strongest
// right at a joint and fading out about 150 px away; background pixels stay raw.

use crate::joint::{JointKind, SlotId};
use crate::paint::{Bucket, PaintColor, PaintGrid};
use crate::projector::ProjectedJoints;
use crate::types::{ColorFrame, DepthFrame, Point2};

/// Who (if anyone) occupies a pixel of the color frame.
pub trait Segmentation {
    fn owner(&self, x: usize, y: usize) -> Option<SlotId>;
}

/// Caller-supplied mapping from color pixel to owning slot.
impl<F> Segmentation for F
where
    F: Fn(usize, usize) -> Option<SlotId>,
{
    fn owner(&self, x: usize, y: usize) -> Option<SlotId> {
        self(x, y)
    }
}

/// Reads player indices from a depth frame already registered to the color
/// frame. When the two resolutions differ, color coordinates are scaled
/// onto the depth grid (nearest sample).
pub struct AlignedDepth<'a> {
    depth: &'a DepthFrame,
    color_width: usize,
    color_height: usize,
}

impl<'a> AlignedDepth<'a> {
    pub fn new(depth: &'a DepthFrame, color_width: usize, color_height: usize) -> Self {
        Self { depth, color_width, color_height }
    }
}

impl Segmentation for AlignedDepth<'_> {
    fn owner(&self, x: usize, y: usize) -> Option<SlotId> {
        if self.depth.width == 0 || self.depth.height == 0 {
            return None;
        }
        let depth_size = (self.depth.width, self.depth.height);
        let same_size = depth_size == (self.color_width, self.color_height);
        let (dx, dy) = if same_size {
            (x, y)
        } else {
            (
                (x * self.depth.width / self.color_width.max(1)).min(self.depth.width - 1),
                (y * self.depth.height / self.color_height.max(1)).min(self.depth.height - 1),
            )
        };
        SlotId::from_player_index(self.depth.player_index_at(dx, dy))
    }
}

pub struct Compositor {
    blend_radius_sq: f64,
}

impl Compositor {
    pub fn new(blend_radius: f32) -> Self {
        let r = blend_radius as f64;
        Self { blend_radius_sq: r * r }
    }

    /// Paint `frame` in place.
    ///
    /// Bucket swatches are stamped first; then every owned pixel gets its
    /// owner's blended joint paint composited over it. Unowned pixels, and
    /// owned pixels with no joint in range, keep their camera color.
    pub fn composite<S: Segmentation + ?Sized>(
        &self,
        frame: &mut ColorFrame,
        segmentation: &S,
        joints: &ProjectedJoints,
        palette: &PaintGrid,
        buckets: &[Bucket],
    ) {
        for y in 0..frame.height {
            for x in 0..frame.width {
                let o = frame.offset(x, y);

                for bucket in buckets {
                    if bucket.area.contains(x as i32, y as i32) {
                        frame.data[o] = bucket.color.b;
                        frame.data[o + 1] = bucket.color.g;
                        frame.data[o + 2] = bucket.color.r;
                    }
                }

                let Some(slot) = segmentation.owner(x, y) else { continue };
                let Some(points) = joints.slot(slot) else { continue };
                let pixel = Point2::new(x as f32, y as f32);
                let Some(paint) = self.blend_joints(points, palette.slot(slot), pixel) else {
                    continue;
                };

                frame.data[o] = over(frame.data[o], paint.b, paint.a);
                frame.data[o + 1] = over(frame.data[o + 1], paint.g, paint.a);
                frame.data[o + 2] = over(frame.data[o + 2], paint.r, paint.a);
                // o + 3 stays as the sensor delivered it
            }
        }
    }

    /// Inverse-distance-weighted mix of the joint colors within the blend
    /// radius of `pixel`, weight `1 / (d^2 + 1)`. `None` when no joint is close.
    pub fn blend_joints(
        &self,
        points: &[Point2; JointKind::COUNT],
        colors: &[PaintColor; JointKind::COUNT],
        pixel: Point2,
    ) -> Option<PaintColor> {
        let (mut r, mut g, mut b, mut a, mut sum) = (0.0f64, 0.0f64, 0.0f64, 0.0f64, 0.0f64);
        for (pos, color) in points.iter().zip(colors) {
            let dist = pos.distance_squared(pixel) as f64;
            if dist > self.blend_radius_sq {
                continue;
            }
            let coeff = 1.0 / (dist + 1.0);
            r += color.r as f64 * coeff;
            g += color.g as f64 * coeff;
            b += color.b as f64 * coeff;
            a += color.a as f64 * coeff;
            sum += coeff;
        }
        if sum <= 0.0 {
            return None;
        }
        // `as u8` truncates (and saturates), matching the byte casts of the blend.
        Some(PaintColor::new((r / sum) as u8, (g / sum) as u8, (b / sum) as u8, (a / sum) as u8))
    }
}

/// "Over" compositing of one channel: `((255 - a) * bg + a * fg) / 255`.
#[inline]
pub fn over(background: u8, foreground: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    (((255 - a) * background as u32 + a * foreground as u32) / 255) as u8
}
