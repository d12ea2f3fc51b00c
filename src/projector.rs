// Joint projector: skeleton space (metres) -> color image pixels.
// Visual expectation: a projected joint lands on the matching body part in the video.

use crate::joint::{JointKind, MAX_SLOTS, Skeleton, SkeletonPoint, SlotId};
use crate::types::{FRAME_HEIGHT, FRAME_WIDTH, Point2};

/// Maps a skeleton-space point onto the color image.
pub trait ColorMapper {
    /// `None` when no sensor is active, which turns the whole frame into a no-op.
    fn map_to_color(&self, point: SkeletonPoint) -> Option<Point2>;

    /// False while there is no sensor to map with.
    fn is_active(&self) -> bool {
        true
    }
}

/// Nominal focal length of the 640x480 color camera, in pixels.
pub const COLOR_NOMINAL_FOCAL_LENGTH: f32 = 531.15;

/// Points at or behind the lens are pushed this far (metres) in front of it.
const MIN_DEPTH: f32 = 1e-3;

/// Plain pinhole projection with the sensor's nominal color intrinsics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeMapper {
    pub focal_x: f32,
    pub focal_y: f32,
    pub center_x: f32,
    pub center_y: f32,
}

impl PinholeMapper {
    /// Nominal intrinsics scaled to a `width` x `height` color frame.
    pub fn for_resolution(width: usize, height: usize) -> Self {
        let sx = width as f32 / FRAME_WIDTH as f32;
        let sy = height as f32 / FRAME_HEIGHT as f32;
        Self {
            focal_x: COLOR_NOMINAL_FOCAL_LENGTH * sx,
            focal_y: COLOR_NOMINAL_FOCAL_LENGTH * sy,
            center_x: width as f32 / 2.0,
            center_y: height as f32 / 2.0,
        }
    }

    pub fn project(&self, p: SkeletonPoint) -> Point2 {
        let z = p.z.max(MIN_DEPTH);
        Point2::new(
            self.center_x + self.focal_x * p.x / z,
            self.center_y - self.focal_y * p.y / z, // skeleton y points up, image y down
        )
    }

    /// The skeleton point at depth `z` that projects onto `pixel`.
    pub fn unproject(&self, pixel: Point2, z: f32) -> SkeletonPoint {
        SkeletonPoint::new(
            (pixel.x - self.center_x) * z / self.focal_x,
            (self.center_y - pixel.y) * z / self.focal_y,
            z,
        )
    }
}

impl Default for PinholeMapper {
    fn default() -> Self {
        Self::for_resolution(FRAME_WIDTH, FRAME_HEIGHT)
    }
}

impl ColorMapper for PinholeMapper {
    fn map_to_color(&self, point: SkeletonPoint) -> Option<Point2> {
        Some(self.project(point))
    }
}

/// This frame's 2-D joint positions for every occupied slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectedJoints {
    slots: [Option<[Point2; JointKind::COUNT]>; MAX_SLOTS],
}

impl ProjectedJoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_slot(&mut self, slot: SlotId, points: [Point2; JointKind::COUNT]) {
        self.slots[slot.index()] = Some(points);
    }

    /// Joint positions of `slot`, or `None` when nobody is tracked there.
    pub fn slot(&self, slot: SlotId) -> Option<&[Point2; JointKind::COUNT]> {
        self.slots[slot.index()].as_ref()
    }

    /// Occupied slots in ascending order.
    pub fn occupied(&self) -> impl Iterator<Item = (SlotId, &[Point2; JointKind::COUNT])> {
        SlotId::all().filter_map(|slot| self.slot(slot).map(|points| (slot, points)))
    }
}

/// Project every joint of every tracked skeleton.
/// Returns `None` as soon as the mapper reports that no sensor is active.
pub fn project_skeletons<M: ColorMapper + ?Sized>(
    mapper: &M,
    skeletons: &[Option<Skeleton>; MAX_SLOTS],
) -> Option<ProjectedJoints> {
    if !mapper.is_active() {
        return None;
    }
    let mut projected = ProjectedJoints::new();
    for slot in SlotId::all() {
        let Some(skeleton) = &skeletons[slot.index()] else { continue };
        let mut points = [Point2::default(); JointKind::COUNT];
        for joint in JointKind::ALL {
            points[joint.index()] = mapper.map_to_color(skeleton.get(joint))?;
        }
        projected.set_slot(slot, points);
    }
    Some(projected)
}
