// The sensor as the engine sees it: frame polling and skeleton tracking.
// Coordinate mapping lives in `projector::ColorMapper`.

use crate::joint::{MAX_SLOTS, Skeleton};
use crate::types::{ColorFrame, DepthFrame};

/// Non-blocking access to the color and depth streams.
pub trait FrameSource {
    /// False when there is no sensor, or it is not streaming.
    fn is_running(&self) -> bool;

    /// Copy the next color frame into `frame` if one is ready, resizing the
    /// buffer when the stream's resolution changed. Never waits.
    fn try_color_frame(&mut self, frame: &mut ColorFrame) -> bool;

    /// Same contract as [`FrameSource::try_color_frame`], for depth.
    fn try_depth_frame(&mut self, frame: &mut DepthFrame) -> bool;
}

/// Up to [`MAX_SLOTS`] tracked people, indexed by slot.
pub trait SkeletonTracker {
    fn skeletons(&self) -> [Option<Skeleton>; MAX_SLOTS];
}
