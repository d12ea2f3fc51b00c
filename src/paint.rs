// Paint assigner: the persistent color of every (slot, joint) pair.
// Visual expectations per update:
// 1) every joint's paint gets a little more transparent,
// 2) every 60 updates the buckets swap to fresh random colors,
// 3) a hand (or any joint) inside a bucket picks up that bucket's color,
// 4) a joint next to a fresher (more opaque) joint catches its color.

use crate::config::PaintConfig;
use crate::joint::{JointGrid, JointKind, SlotId};
use crate::projector::ProjectedJoints;
use crate::rng::Rng32;
use crate::types::Rect;

pub const OPAQUE: u8 = 255;

/// RGB plus opacity; alpha 0 means the paint has fully faded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaintColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PaintColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, OPAQUE)
    }

    fn random(rng: &mut Rng32, a: u8) -> Self {
        Self::new(rng.next_u8(), rng.next_u8(), rng.next_u8(), a)
    }
}

pub type PaintGrid = JointGrid<PaintColor>;

/// A fixed rectangle that hands out its (always opaque) color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub area: Rect,
    pub color: PaintColor,
}

impl Bucket {
    pub fn new(area: Rect, r: u8, g: u8, b: u8) -> Self {
        Self { area, color: PaintColor::opaque(r, g, b) }
    }

    /// Whether a projected joint touches this bucket.
    #[inline]
    pub fn touches(&self, x: f32, y: f32) -> bool {
        self.area.contains(x as i32, y as i32)
    }
}

pub struct PaintAssigner {
    grid: PaintGrid,
    buckets: Vec<Bucket>,
    frames_since_rotation: u32,
    rotation_period: u32,
    fade_step: u8,
    diffusion_radius_sq: f32,
    rng: Rng32,
}

impl PaintAssigner {
    /// Random opaque-ish starting colors, buckets as configured.
    pub fn new(config: &PaintConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => Rng32::from_seed(seed),
            None => Rng32::from_clock(),
        };
        let grid = JointGrid::from_fn(|_, _| PaintColor::random(&mut rng, config.initial_alpha));
        let buckets = config
            .buckets
            .iter()
            .map(|b| {
                let [r, g, bl] = b.color;
                Bucket::new(Rect::new(b.x, b.y, b.width, b.height), r, g, bl)
            })
            .collect();

        Self {
            grid,
            buckets,
            frames_since_rotation: 0,
            rotation_period: config.rotation_period,
            fade_step: config.fade_step,
            diffusion_radius_sq: config.diffusion_radius * config.diffusion_radius,
            rng,
        }
    }

    pub fn grid(&self) -> &PaintGrid {
        &self.grid
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn paint(&self, slot: SlotId, joint: JointKind) -> PaintColor {
        self.grid[(slot, joint)]
    }

    pub fn set_paint(&mut self, slot: SlotId, joint: JointKind, color: PaintColor) {
        self.grid[(slot, joint)] = color;
    }

    /// Step 1: every cell loses `fade_step` alpha, never going below 0.
    pub fn fade(&mut self) {
        let step = self.fade_step;
        for cell in self.grid.values_mut() {
            cell.a = cell.a.saturating_sub(step);
        }
    }

    /// Step 2: count one update; on the period boundary recolor all buckets.
    /// Returns true on the update that recolored them.
    pub fn advance_bucket_rotation(&mut self) -> bool {
        if self.rotation_period == 0 {
            return false;
        }
        self.frames_since_rotation += 1;
        if self.frames_since_rotation < self.rotation_period {
            return false;
        }
        self.frames_since_rotation = 0;
        for bucket in &mut self.buckets {
            bucket.color = PaintColor::random(&mut self.rng, OPAQUE);
        }
        log::debug!("recolored {} buckets", self.buckets.len());
        true
    }

    /// Step 3: joints inside a bucket take its color. Later buckets win on overlap.
    pub fn assign_from_buckets(&mut self, joints: &ProjectedJoints) {
        for (slot, points) in joints.occupied() {
            for joint in JointKind::ALL {
                let pos = points[joint.index()];
                for bucket in &self.buckets {
                    if bucket.touches(pos.x, pos.y) {
                        self.grid[(slot, joint)] = bucket.color;
                    }
                }
            }
        }
    }

    /// Step 4: a joint near a more opaque joint copies that joint's color.
    ///
    /// Runs in place over all ordered pairs, ascending by slot then joint on
    /// both sides, so a cell updated earlier in the pass can feed a later one.
    pub fn diffuse(&mut self, joints: &ProjectedJoints) {
        let tracked: Vec<_> = joints.occupied().collect();
        for &(slot_a, points_a) in &tracked {
            for joint_a in JointKind::ALL {
                let pos = points_a[joint_a.index()];
                for &(slot_b, points_b) in &tracked {
                    for joint_b in JointKind::ALL {
                        if slot_a == slot_b && joint_a == joint_b {
                            continue;
                        }
                        let dist = pos.distance_squared(points_b[joint_b.index()]);
                        if dist > self.diffusion_radius_sq {
                            continue;
                        }
                        let source = self.grid[(slot_b, joint_b)];
                        if source.a <= self.grid[(slot_a, joint_a)].a {
                            continue;
                        }
                        self.grid[(slot_a, joint_a)] = source;
                    }
                }
            }
        }
    }

    /// Fade and bucket rotation: the part of an update that runs every cycle.
    pub fn tick(&mut self) {
        self.fade();
        self.advance_bucket_rotation();
    }

    /// Bucket pickup then diffusion, for a frame with tracking data.
    pub fn assign(&mut self, joints: &ProjectedJoints) {
        self.assign_from_buckets(joints);
        self.diffuse(joints);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BucketConfig;
    use crate::types::Point2;

    fn config(buckets: Vec<BucketConfig>) -> PaintConfig {
        PaintConfig { seed: Some(1234), buckets, ..PaintConfig::default() }
    }

    fn slot(i: usize) -> SlotId {
        SlotId::new(i).unwrap()
    }

    /// Joints laid out on a coarse lattice, well outside each other's diffusion radius.
    fn spread(slots: &[usize]) -> ProjectedJoints {
        let mut joints = ProjectedJoints::new();
        for &s in slots {
            let points = std::array::from_fn(|j| {
                Point2::new(20.0 + 30.0 * j as f32, 30.0 + 70.0 * s as f32)
            });
            joints.set_slot(slot(s), points);
        }
        joints
    }

    fn fill(assigner: &mut PaintAssigner, color: PaintColor) {
        for s in SlotId::all() {
            for j in JointKind::ALL {
                assigner.set_paint(s, j, color);
            }
        }
    }

    #[test]
    fn test_starts_fully_opaque() {
        let assigner = PaintAssigner::new(&config(vec![]));
        assert!(assigner.grid().iter().all(|(_, _, c)| c.a == OPAQUE));
    }

    #[test]
    fn test_fade_floors_at_zero() {
        let mut assigner = PaintAssigner::new(&config(vec![]));
        assigner.set_paint(slot(0), JointKind::Head, PaintColor::new(1, 2, 3, 1));
        assigner.fade();
        assert_eq!(assigner.paint(slot(0), JointKind::Head), PaintColor::new(1, 2, 3, 0));
        assigner.fade();
        assert_eq!(assigner.paint(slot(0), JointKind::Head).a, 0);
        assert_eq!(assigner.paint(slot(5), JointKind::FootRight).a, 253);
    }

    #[test]
    fn test_alpha_never_rises_without_events() {
        let mut assigner = PaintAssigner::new(&config(vec![]));
        let mut before = assigner.grid().clone();
        for _ in 0..300 {
            assigner.tick();
            for (s, j, c) in assigner.grid().iter() {
                assert!(c.a <= before[(s, j)].a);
            }
            before = assigner.grid().clone();
        }
    }

    #[test]
    fn test_buckets_recolor_once_every_sixty_updates() {
        let buckets = PaintConfig::default().buckets;
        let mut assigner = PaintAssigner::new(&config(buckets));
        let original: Vec<Bucket> = assigner.buckets().to_vec();
        for _ in 0..59 {
            assert!(!assigner.advance_bucket_rotation());
        }
        assert_eq!(assigner.buckets(), &original[..]);
        assert!(assigner.advance_bucket_rotation());
        assert!(assigner.buckets().iter().all(|b| b.color.a == OPAQUE));
        assert!(assigner.buckets().iter().zip(&original).all(|(b, o)| b.area == o.area));

        let rotations = (0..120).filter(|_| assigner.advance_bucket_rotation()).count();
        assert_eq!(rotations, 2);
    }

    #[test]
    fn test_zero_period_never_rotates() {
        let mut cfg = config(PaintConfig::default().buckets);
        cfg.rotation_period = 0;
        let mut assigner = PaintAssigner::new(&cfg);
        assert!((0..200).all(|_| !assigner.advance_bucket_rotation()));
    }

    #[test]
    fn test_joint_in_bucket_turns_opaque_blue() {
        let blue = BucketConfig { x: 10, y: 100, width: 100, height: 100, color: [0, 0, 255] };
        let mut assigner = PaintAssigner::new(&config(vec![blue]));
        fill(&mut assigner, PaintColor::new(200, 10, 10, 3));

        let mut joints = spread(&[0]);
        let mut points = *joints.slot(slot(0)).unwrap();
        points[JointKind::HandLeft.index()] = Point2::new(50.5, 150.2);
        joints.set_slot(slot(0), points);

        assigner.assign(&joints);
        assert_eq!(assigner.paint(slot(0), JointKind::HandLeft), PaintColor::opaque(0, 0, 255));
        // Right edge is exclusive.
        points[JointKind::HandLeft.index()] = Point2::new(110.0, 150.0);
        joints.set_slot(slot(0), points);
        assigner.set_paint(slot(0), JointKind::HandLeft, PaintColor::new(1, 1, 1, 1));
        assigner.assign_from_buckets(&joints);
        assert_eq!(assigner.paint(slot(0), JointKind::HandLeft), PaintColor::new(1, 1, 1, 1));
    }

    #[test]
    fn test_oversized_bucket_from_config_is_safe() {
        let huge = BucketConfig {
            x: 10,
            y: 0,
            width: i32::MAX,
            height: i32::MAX,
            color: [7, 8, 9],
        };
        let mut assigner = PaintAssigner::new(&config(vec![huge]));
        fill(&mut assigner, PaintColor::new(1, 1, 1, 1));
        assigner.assign_from_buckets(&spread(&[0]));
        assert_eq!(assigner.paint(slot(0), JointKind::FootRight), PaintColor::opaque(7, 8, 9));
    }

    #[test]
    fn test_untracked_slots_ignore_buckets() {
        let everywhere = BucketConfig { x: 0, y: 0, width: 640, height: 480, color: [9, 9, 9] };
        let mut assigner = PaintAssigner::new(&config(vec![everywhere]));
        fill(&mut assigner, PaintColor::new(1, 1, 1, 1));
        assigner.assign_from_buckets(&spread(&[2]));
        assert_eq!(assigner.paint(slot(2), JointKind::Head), PaintColor::opaque(9, 9, 9));
        assert_eq!(assigner.paint(slot(0), JointKind::Head), PaintColor::new(1, 1, 1, 1));
    }

    #[test]
    fn test_diffusion_copies_fresher_paint_across_people() {
        let mut assigner = PaintAssigner::new(&config(vec![]));
        fill(&mut assigner, PaintColor::new(0, 0, 0, 10));
        let faded = PaintColor::new(10, 20, 30, 50);
        let fresh = PaintColor::new(200, 100, 0, 200);
        assigner.set_paint(slot(0), JointKind::HandLeft, faded);
        assigner.set_paint(slot(1), JointKind::HandRight, fresh);

        let mut joints = spread(&[0, 1]);
        let mut a = *joints.slot(slot(0)).unwrap();
        a[JointKind::HandLeft.index()] = Point2::new(300.0, 300.0);
        joints.set_slot(slot(0), a);
        let mut b = *joints.slot(slot(1)).unwrap();
        b[JointKind::HandRight.index()] = Point2::new(310.0, 300.0);
        joints.set_slot(slot(1), b);

        assigner.diffuse(&joints);
        assert_eq!(assigner.paint(slot(0), JointKind::HandLeft), fresh);
        assert_eq!(assigner.paint(slot(1), JointKind::HandRight), fresh);
    }

    #[test]
    fn test_diffusion_needs_strictly_higher_alpha_and_range() {
        let mut assigner = PaintAssigner::new(&config(vec![]));
        fill(&mut assigner, PaintColor::new(0, 0, 0, 10));
        assigner.set_paint(slot(0), JointKind::Head, PaintColor::new(1, 0, 0, 80));
        assigner.set_paint(slot(0), JointKind::Spine, PaintColor::new(0, 1, 0, 80));
        assigner.set_paint(slot(0), JointKind::HipCenter, PaintColor::new(0, 0, 1, 90));

        let mut joints = spread(&[0]);
        let mut points = *joints.slot(slot(0)).unwrap();
        points[JointKind::Head.index()] = Point2::new(400.0, 400.0);
        points[JointKind::Spine.index()] = Point2::new(400.0, 420.0); // exactly on the radius
        points[JointKind::HipCenter.index()] = Point2::new(430.0, 400.0); // 30 px away
        joints.set_slot(slot(0), points);

        let before = assigner.grid().clone();
        assigner.diffuse(&joints);
        assert_eq!(assigner.grid(), &before);
    }

    #[test]
    fn test_diffusion_order_is_slot_then_joint_in_place() {
        let mut assigner = PaintAssigner::new(&config(vec![]));
        fill(&mut assigner, PaintColor::new(0, 0, 0, 5));
        let a = PaintColor::new(1, 0, 0, 10);
        let b = PaintColor::new(0, 1, 0, 50);
        let c = PaintColor::new(0, 0, 1, 200);
        assigner.set_paint(slot(0), JointKind::HipCenter, a);
        assigner.set_paint(slot(0), JointKind::Spine, b);
        assigner.set_paint(slot(0), JointKind::ShoulderCenter, c);

        // HipCenter - Spine - ShoulderCenter in a row, 15 px apart.
        let mut joints = spread(&[0]);
        let mut points = *joints.slot(slot(0)).unwrap();
        points[JointKind::HipCenter.index()] = Point2::new(100.0, 400.0);
        points[JointKind::Spine.index()] = Point2::new(115.0, 400.0);
        points[JointKind::ShoulderCenter.index()] = Point2::new(130.0, 400.0);
        joints.set_slot(slot(0), points);

        assigner.diffuse(&joints);
        // HipCenter is visited first and sees Spine's old color;
        // Spine then catches ShoulderCenter's.
        assert_eq!(assigner.paint(slot(0), JointKind::HipCenter), b);
        assert_eq!(assigner.paint(slot(0), JointKind::Spine), c);
        assert_eq!(assigner.paint(slot(0), JointKind::ShoulderCenter), c);
    }

    #[test]
    fn test_diffusion_never_lowers_alpha() {
        let mut assigner = PaintAssigner::new(&PaintConfig {
            seed: Some(99),
            initial_alpha: 255,
            ..PaintConfig::default()
        });
        for _ in 0..37 {
            assigner.fade();
        }
        assigner.set_paint(slot(1), JointKind::Head, PaintColor::new(5, 5, 5, 3));

        // Everyone piled on one spot.
        let mut joints = ProjectedJoints::new();
        joints.set_slot(slot(0), [Point2::new(200.0, 200.0); JointKind::COUNT]);
        joints.set_slot(slot(1), [Point2::new(205.0, 200.0); JointKind::COUNT]);

        let before = assigner.grid().clone();
        assigner.diffuse(&joints);
        for (s, j, c) in assigner.grid().iter() {
            assert!(c.a >= before[(s, j)].a);
        }
        assert_eq!(assigner.paint(slot(1), JointKind::Head).a, 218);
    }
}
