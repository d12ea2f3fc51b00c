// The paint engine: projector -> assigner -> compositor, once per frame.
// Visual expectation: after `update`, `color_frame()` holds the camera image
// with each tracked person's body tinted by the paint their joints carry.

use crate::compositor::{AlignedDepth, Compositor, Segmentation};
use crate::config::PaintConfig;
use crate::paint::PaintAssigner;
use crate::projector::{ColorMapper, ProjectedJoints, project_skeletons};
use crate::sensor::{FrameSource, SkeletonTracker};
use crate::types::{ColorFrame, DepthFrame, FRAME_HEIGHT, FRAME_WIDTH};

/// What one `update` managed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No sensor, or it cannot map joints: only the fade ran.
    SensorInactive,
    /// Sensor running but no new color frame yet: only the fade ran.
    NoColorFrame,
    /// New color frame and paint assigned, but no depth frame to segment it.
    Unpainted,
    /// Paint composited onto the new color frame.
    Painted,
}

pub struct PaintEngine {
    assigner: PaintAssigner,
    compositor: Compositor,
    color: ColorFrame,
    depth: DepthFrame,
    joints: Option<ProjectedJoints>,
    last_outcome: Option<FrameOutcome>,
}

impl PaintEngine {
    pub fn new(config: &PaintConfig) -> Self {
        log::info!("paint engine: {} buckets", config.buckets.len());
        Self {
            assigner: PaintAssigner::new(config),
            compositor: Compositor::new(config.blend_radius),
            color: ColorFrame::new(FRAME_WIDTH, FRAME_HEIGHT),
            depth: DepthFrame::new(FRAME_WIDTH, FRAME_HEIGHT),
            joints: None,
            last_outcome: None,
        }
    }

    /// Run one frame against `sensor`.
    ///
    /// Fade and bucket rotation always run. Everything else is skipped when
    /// the sensor is down or no new color frame is ready; compositing is
    /// skipped when the depth frame is late.
    pub fn update<S>(&mut self, sensor: &mut S) -> FrameOutcome
    where
        S: FrameSource + SkeletonTracker + ColorMapper,
    {
        let outcome = self.run_frame(sensor);
        if self.last_outcome != Some(outcome) {
            log::debug!("frame outcome: {:?}", outcome);
            self.last_outcome = Some(outcome);
        }
        outcome
    }

    fn run_frame<S>(&mut self, sensor: &mut S) -> FrameOutcome
    where
        S: FrameSource + SkeletonTracker + ColorMapper,
    {
        self.assigner.tick();

        if !sensor.is_running() {
            self.joints = None;
            return FrameOutcome::SensorInactive;
        }
        let skeletons = sensor.skeletons();
        let Some(joints) = project_skeletons(&*sensor, &skeletons) else {
            self.joints = None;
            return FrameOutcome::SensorInactive;
        };
        if !sensor.try_color_frame(&mut self.color) {
            return FrameOutcome::NoColorFrame;
        }

        self.assigner.assign(&joints);

        let outcome = if sensor.try_depth_frame(&mut self.depth) {
            let segmentation = AlignedDepth::new(&self.depth, self.color.width, self.color.height);
            self.compositor.composite(
                &mut self.color,
                &segmentation,
                &joints,
                self.assigner.grid(),
                self.assigner.buckets(),
            );
            FrameOutcome::Painted
        } else {
            FrameOutcome::Unpainted
        };
        self.joints = Some(joints);
        outcome
    }

    /// Paint a caller-owned frame with the current paint, without polling a sensor.
    pub fn composite<S: Segmentation + ?Sized>(
        &self,
        frame: &mut ColorFrame,
        segmentation: &S,
        joints: &ProjectedJoints,
    ) {
        let (palette, buckets) = (self.assigner.grid(), self.assigner.buckets());
        self.compositor.composite(frame, segmentation, joints, palette, buckets);
    }

    /// The last color frame received, painted if the last update said so.
    pub fn color_frame(&self) -> &ColorFrame {
        &self.color
    }

    /// Joint positions of the last frame that got as far as assignment.
    pub fn joints(&self) -> Option<&ProjectedJoints> {
        self.joints.as_ref()
    }

    pub fn assigner(&self) -> &PaintAssigner {
        &self.assigner
    }

    pub fn assigner_mut(&mut self) -> &mut PaintAssigner {
        &mut self.assigner
    }
}
