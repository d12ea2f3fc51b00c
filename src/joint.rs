// Tracked people, their joints and the per-(slot, joint) table.

use std::ops::{Index, IndexMut};

/// How many people the sensor tracks at once.
pub const MAX_SLOTS: usize = 6;

/// The 20 skeleton joints, in the order the tracker reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum JointKind {
    HipCenter = 0,
    Spine = 1,
    ShoulderCenter = 2,
    Head = 3,
    ShoulderLeft = 4,
    ElbowLeft = 5,
    WristLeft = 6,
    HandLeft = 7,
    ShoulderRight = 8,
    ElbowRight = 9,
    WristRight = 10,
    HandRight = 11,
    HipLeft = 12,
    KneeLeft = 13,
    AnkleLeft = 14,
    FootLeft = 15,
    HipRight = 16,
    KneeRight = 17,
    AnkleRight = 18,
    FootRight = 19,
}

impl JointKind {
    pub const COUNT: usize = 20;

    pub const ALL: [JointKind; JointKind::COUNT] = [
        Self::HipCenter,
        Self::Spine,
        Self::ShoulderCenter,
        Self::Head,
        Self::ShoulderLeft,
        Self::ElbowLeft,
        Self::WristLeft,
        Self::HandLeft,
        Self::ShoulderRight,
        Self::ElbowRight,
        Self::WristRight,
        Self::HandRight,
        Self::HipLeft,
        Self::KneeLeft,
        Self::AnkleLeft,
        Self::FootLeft,
        Self::HipRight,
        Self::KneeRight,
        Self::AnkleRight,
        Self::FootRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Bones drawn by the wireframe overlay (start joint, end joint).
pub const BONES: [(JointKind, JointKind); 19] = [
    // torso
    (JointKind::Head, JointKind::ShoulderCenter),
    (JointKind::ShoulderCenter, JointKind::ShoulderLeft),
    (JointKind::ShoulderCenter, JointKind::ShoulderRight),
    (JointKind::ShoulderCenter, JointKind::Spine),
    (JointKind::Spine, JointKind::HipCenter),
    (JointKind::HipCenter, JointKind::HipLeft),
    (JointKind::HipCenter, JointKind::HipRight),
    // left arm
    (JointKind::ShoulderLeft, JointKind::ElbowLeft),
    (JointKind::ElbowLeft, JointKind::WristLeft),
    (JointKind::WristLeft, JointKind::HandLeft),
    // right arm
    (JointKind::ShoulderRight, JointKind::ElbowRight),
    (JointKind::ElbowRight, JointKind::WristRight),
    (JointKind::WristRight, JointKind::HandRight),
    // left leg
    (JointKind::HipLeft, JointKind::KneeLeft),
    (JointKind::KneeLeft, JointKind::AnkleLeft),
    (JointKind::AnkleLeft, JointKind::FootLeft),
    // right leg
    (JointKind::HipRight, JointKind::KneeRight),
    (JointKind::KneeRight, JointKind::AnkleRight),
    (JointKind::AnkleRight, JointKind::FootRight),
];

/// Identifies one of the [`MAX_SLOTS`] tracked-person slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(u8);

impl SlotId {
    pub fn new(index: usize) -> Option<Self> {
        (index < MAX_SLOTS).then_some(Self(index as u8))
    }

    /// Slot owning a pixel, from the 1-based player index in a depth sample.
    pub fn from_player_index(player: u16) -> Option<Self> {
        if player == 0 {
            return None;
        }
        Self::new(player as usize - 1)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The 1-based player index written into depth samples.
    #[inline]
    pub fn player_index(self) -> u16 {
        self.0 as u16 + 1
    }

    pub fn all() -> impl Iterator<Item = SlotId> {
        (0..MAX_SLOTS as u8).map(SlotId)
    }
}

/// A joint position in skeleton space (metres, y up, z away from the sensor).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkeletonPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl SkeletonPoint {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One tracked person: a 3-D position for every joint kind.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Skeleton {
    pub joints: [SkeletonPoint; JointKind::COUNT],
}

impl Skeleton {
    pub fn get(&self, joint: JointKind) -> SkeletonPoint {
        self.joints[joint.index()]
    }

    pub fn set(&mut self, joint: JointKind, point: SkeletonPoint) {
        self.joints[joint.index()] = point;
    }
}

/// A value for every (slot, joint) pair, indexed by `grid[(slot, joint)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct JointGrid<T> {
    cells: [[T; JointKind::COUNT]; MAX_SLOTS],
}

impl<T> JointGrid<T> {
    pub fn from_fn(mut f: impl FnMut(SlotId, JointKind) -> T) -> Self {
        Self {
            cells: std::array::from_fn(|s| {
                std::array::from_fn(|j| f(SlotId(s as u8), JointKind::ALL[j]))
            }),
        }
    }

    /// All 20 values of one slot, in joint order.
    pub fn slot(&self, slot: SlotId) -> &[T; JointKind::COUNT] {
        &self.cells[slot.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, JointKind, &T)> {
        self.cells.iter().enumerate().flat_map(|(s, row)| {
            row.iter().enumerate().map(move |(j, v)| (SlotId(s as u8), JointKind::ALL[j], v))
        })
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut().flat_map(|row| row.iter_mut())
    }
}

impl<T: Copy> JointGrid<T> {
    pub fn filled(value: T) -> Self {
        Self { cells: [[value; JointKind::COUNT]; MAX_SLOTS] }
    }
}

impl<T> Index<(SlotId, JointKind)> for JointGrid<T> {
    type Output = T;

    fn index(&self, (slot, joint): (SlotId, JointKind)) -> &T {
        &self.cells[slot.index()][joint.index()]
    }
}

impl<T> IndexMut<(SlotId, JointKind)> for JointGrid<T> {
    fn index_mut(&mut self, (slot, joint): (SlotId, JointKind)) -> &mut T {
        &mut self.cells[slot.index()][joint.index()]
    }
}
