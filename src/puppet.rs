// Stand-in for the depth sensor: stick-figure "puppets" that the engine tracks
// as if they were people, plus color frames from the webcam (or a test pattern).
// Visual expectation: two figures sway their arms and drift toward each other;
// the first one's right hand follows the mouse. Their bodies are what gets painted.

use crate::camera::CameraCapture;
use crate::joint::{JointKind, MAX_SLOTS, Skeleton, SkeletonPoint, SlotId};
use crate::projector::{ColorMapper, PinholeMapper};
use crate::sensor::{FrameSource, SkeletonTracker};
use crate::types::{ColorFrame, DepthFrame, Point2};

/// Depth written where nobody stands (mm).
const BACKGROUND_DEPTH_MM: u16 = 4000;
/// How far puppets stand from the sensor (metres).
const PUPPET_DEPTH: f32 = 2.2;
/// Half-thickness of a limb in the segmentation mask (metres).
const LIMB_RADIUS: f32 = 0.07;
/// Frames per simulated second; the puppets move on frame time, not wall time.
const SIM_FPS: f32 = 30.0;

/// Joint offsets from the hip center of a relaxed figure (x right, y up, metres).
const REST_POSE: [(f32, f32); JointKind::COUNT] = [
    (0.0, 0.0),     // HipCenter
    (0.0, 0.10),    // Spine
    (0.0, 0.45),    // ShoulderCenter
    (0.0, 0.62),    // Head
    (-0.18, 0.40),  // ShoulderLeft
    (-0.30, 0.15),  // ElbowLeft
    (-0.35, -0.05), // WristLeft
    (-0.37, -0.12), // HandLeft
    (0.18, 0.40),   // ShoulderRight
    (0.30, 0.15),   // ElbowRight
    (0.35, -0.05),  // WristRight
    (0.37, -0.12),  // HandRight
    (-0.10, -0.05), // HipLeft
    (-0.12, -0.45), // KneeLeft
    (-0.13, -0.85), // AnkleLeft
    (-0.15, -0.90), // FootLeft
    (0.10, -0.05),  // HipRight
    (0.12, -0.45),  // KneeRight
    (0.13, -0.85),  // AnkleRight
    (0.15, -0.90),  // FootRight
];

const LEFT_ARM: [JointKind; 3] = [JointKind::ElbowLeft, JointKind::WristLeft, JointKind::HandLeft];
const RIGHT_ARM: [JointKind; 3] =
    [JointKind::ElbowRight, JointKind::WristRight, JointKind::HandRight];

/// One simulated person.
#[derive(Debug, Clone, Copy)]
pub struct Puppet {
    pub slot: SlotId,
    pub home_x: f32, // where the hip center drifts around (metres)
    pub phase: f32,  // desynchronizes the puppets' motion
}

impl Puppet {
    /// Pose at time `t` (seconds). `reach` pins the right hand to a point.
    pub fn pose(&self, t: f32, reach: Option<SkeletonPoint>) -> Skeleton {
        let root_x = self.home_x + 0.35 * (0.4 * t + self.phase).sin();
        // 0 (arms down) .. 2.2 rad (overhead)
        let lift = 1.1 * (1.0 + (1.3 * t + self.phase).sin());

        let mut offsets = REST_POSE;
        let sl = REST_POSE[JointKind::ShoulderLeft.index()];
        let sr = REST_POSE[JointKind::ShoulderRight.index()];
        for joint in LEFT_ARM {
            offsets[joint.index()] = rotate_about(REST_POSE[joint.index()], sl, -lift);
        }
        for joint in RIGHT_ARM {
            offsets[joint.index()] = rotate_about(REST_POSE[joint.index()], sr, lift);
        }

        let mut skeleton = Skeleton::default();
        for joint in JointKind::ALL {
            let (dx, dy) = offsets[joint.index()];
            skeleton.set(joint, SkeletonPoint::new(root_x + dx, dy, PUPPET_DEPTH));
        }

        if let Some(target) = reach {
            let shoulder = skeleton.get(JointKind::ShoulderRight);
            let elbow = SkeletonPoint::new(
                (shoulder.x + target.x) / 2.0,
                (shoulder.y + target.y) / 2.0 - 0.05,
                PUPPET_DEPTH,
            );
            skeleton.set(JointKind::ElbowRight, elbow);
            let wrist = SkeletonPoint::new(target.x, target.y + 0.05, PUPPET_DEPTH);
            skeleton.set(JointKind::WristRight, wrist);
            let hand = SkeletonPoint::new(target.x, target.y, PUPPET_DEPTH);
            skeleton.set(JointKind::HandRight, hand);
        }
        skeleton
    }
}

/// Rotate `p` around `pivot` by `angle` radians (counter-clockwise, y up).
fn rotate_about(p: (f32, f32), pivot: (f32, f32), angle: f32) -> (f32, f32) {
    let (s, c) = angle.sin_cos();
    let (dx, dy) = (p.0 - pivot.0, p.1 - pivot.1);
    (pivot.0 + dx * c - dy * s, pivot.1 + dx * s + dy * c)
}

pub struct PuppetSensor {
    camera: Option<CameraCapture>,
    mapper: PinholeMapper,
    puppets: Vec<Puppet>,
    current: [Option<Skeleton>; MAX_SLOTS],
    width: usize,
    height: usize,
    frame_index: u64,
}

impl PuppetSensor {
    /// `count` puppets (clamped to 1..=6) spread across the view.
    pub fn new(camera: Option<CameraCapture>, count: usize, width: usize, height: usize) -> Self {
        let count = count.clamp(1, MAX_SLOTS);
        let spacing = 0.9;
        let puppets = SlotId::all()
            .take(count)
            .map(|slot| {
                let i = slot.index() as f32;
                Puppet {
                    slot,
                    home_x: (i - (count as f32 - 1.0) / 2.0) * spacing,
                    phase: i * 2.1,
                }
            })
            .collect();

        Self {
            camera,
            mapper: PinholeMapper::for_resolution(width, height),
            puppets,
            current: [None; MAX_SLOTS],
            width,
            height,
            frame_index: 0,
        }
    }

    /// Step the simulation one frame; `mouse` drives the first puppet's right hand.
    pub fn advance(&mut self, mouse: Option<(usize, usize)>) {
        self.frame_index += 1;
        let t = self.frame_index as f32 / SIM_FPS;
        let reach = mouse
            .map(|(x, y)| self.mapper.unproject(Point2::new(x as f32, y as f32), PUPPET_DEPTH));

        self.current = [None; MAX_SLOTS];
        for (i, puppet) in self.puppets.iter().enumerate() {
            let reach = if i == 0 { reach } else { None };
            self.current[puppet.slot.index()] = Some(puppet.pose(t, reach));
        }
    }

    /// Moving diagonal stripes, used when no webcam is available.
    fn fill_test_pattern(&self, frame: &mut ColorFrame) {
        frame.ensure_size(self.width, self.height);
        let shift = self.frame_index as usize;
        for y in 0..self.height {
            for x in 0..self.width {
                let band = ((x + y + shift) / 40) % 2;
                let base = if band == 0 { 70 } else { 110 };
                let o = frame.offset(x, y);
                frame.data[o] = base + (y * 60 / self.height) as u8;
                frame.data[o + 1] = base;
                frame.data[o + 2] = base + (x * 60 / self.width) as u8;
                frame.data[o + 3] = 0xFF;
            }
        }
    }

    /// Stamp one limb segment into the depth frame as a thick capsule.
    fn stamp_limb(&self, depth: &mut DepthFrame, a: SkeletonPoint, b: SkeletonPoint, player: u16) {
        let pa = self.mapper.project(a);
        let pb = self.mapper.project(b);
        let radius = LIMB_RADIUS * self.mapper.focal_x / PUPPET_DEPTH;
        let sample = DepthFrame::pack((a.z * 1000.0) as u16, player);

        let x0 = (pa.x.min(pb.x) - radius).floor().max(0.0) as usize;
        let y0 = (pa.y.min(pb.y) - radius).floor().max(0.0) as usize;
        let x1 = ((pa.x.max(pb.x) + radius).ceil().max(0.0) as usize).min(depth.width);
        let y1 = ((pa.y.max(pb.y) + radius).ceil().max(0.0) as usize).min(depth.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Point2::new(x as f32, y as f32);
                if distance_to_segment_sq(p, pa, pb) <= radius * radius {
                    depth.samples[y * depth.width + x] = sample;
                }
            }
        }
    }
}

/// Squared distance from `p` to the segment `a`-`b`.
fn distance_to_segment_sq(p: Point2, a: Point2, b: Point2) -> f32 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f32::EPSILON {
        return p.distance_squared(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance_squared(Point2::new(a.x + abx * t, a.y + aby * t))
}

impl FrameSource for PuppetSensor {
    fn is_running(&self) -> bool {
        true
    }

    fn try_color_frame(&mut self, frame: &mut ColorFrame) -> bool {
        match self.camera.as_mut() {
            Some(camera) => camera.try_frame(frame),
            None => {
                self.fill_test_pattern(frame);
                true
            }
        }
    }

    fn try_depth_frame(&mut self, frame: &mut DepthFrame) -> bool {
        frame.ensure_size(self.width, self.height);
        frame.samples.fill(DepthFrame::pack(BACKGROUND_DEPTH_MM, 0));
        for puppet in &self.puppets {
            let Some(skeleton) = &self.current[puppet.slot.index()] else { continue };
            for (a, b) in crate::joint::BONES {
                let player = puppet.slot.player_index();
                self.stamp_limb(frame, skeleton.get(a), skeleton.get(b), player);
            }
        }
        true
    }
}

impl SkeletonTracker for PuppetSensor {
    fn skeletons(&self) -> [Option<Skeleton>; MAX_SLOTS] {
        self.current
    }
}

impl ColorMapper for PuppetSensor {
    fn map_to_color(&self, point: SkeletonPoint) -> Option<Point2> {
        self.mapper.map_to_color(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FRAME_HEIGHT, FRAME_WIDTH};

    fn sensor(count: usize) -> PuppetSensor {
        PuppetSensor::new(None, count, FRAME_WIDTH, FRAME_HEIGHT)
    }

    #[test]
    fn test_puppet_count_is_clamped() {
        let mut s = sensor(10);
        s.advance(None);
        assert_eq!(s.skeletons().iter().flatten().count(), MAX_SLOTS);

        let mut s = sensor(0);
        s.advance(None);
        assert_eq!(s.skeletons().iter().flatten().count(), 1);
    }

    #[test]
    fn test_hand_follows_mouse() {
        let mut s = sensor(2);
        s.advance(Some((500, 120)));
        let hand = s.skeletons()[0].unwrap().get(JointKind::HandRight);
        let p = s.map_to_color(hand).unwrap();
        assert!((p.x - 500.0).abs() < 0.5 && (p.y - 120.0).abs() < 0.5, "{p:?}");
        // Only the first puppet reaches.
        let other = s.skeletons()[1].unwrap().get(JointKind::HandRight);
        let q = s.map_to_color(other).unwrap();
        assert!((q.x - 500.0).abs() > 0.5 || (q.y - 120.0).abs() > 0.5);
    }

    #[test]
    fn test_segmentation_marks_bodies_with_player_index() {
        let mut s = sensor(1);
        s.advance(None);
        let mut depth = DepthFrame::new(1, 1);
        assert!(s.try_depth_frame(&mut depth));
        assert_eq!((depth.width, depth.height), (FRAME_WIDTH, FRAME_HEIGHT));

        let spine = s.map_to_color(s.skeletons()[0].unwrap().get(JointKind::Spine)).unwrap();
        let (x, y) = spine.to_pixel();
        assert_eq!(depth.player_index_at(x as usize, y as usize), 1);
        assert_eq!(depth.depth_mm_at(x as usize, y as usize), 2200);
        assert_eq!(depth.player_index_at(0, 0), 0);
        assert_eq!(depth.depth_mm_at(0, 0), BACKGROUND_DEPTH_MM);
    }

    #[test]
    fn test_test_pattern_without_camera() {
        let mut s = sensor(1);
        let mut frame = ColorFrame::new(2, 2);
        assert!(s.try_color_frame(&mut frame));
        assert_eq!(frame.data.len(), FRAME_WIDTH * FRAME_HEIGHT * 4);
        assert!(frame.data.chunks_exact(4).all(|px| px[3] == 0xFF));
    }

    #[test]
    fn test_segment_distance() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        assert_eq!(distance_to_segment_sq(Point2::new(5.0, 3.0), a, b), 9.0);
        assert_eq!(distance_to_segment_sq(Point2::new(-4.0, 3.0), a, b), 25.0);
        assert_eq!(distance_to_segment_sq(Point2::new(1.0, 1.0), a, a), 2.0);
    }
}
