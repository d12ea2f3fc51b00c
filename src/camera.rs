// Opens a webcam on a background thread and hands out its newest frame without waiting.
// Visual expectation: when the engine polls `try_frame()`, the live camera image
// lands in the color buffer in the sensor's B,G,R,X layout, ready to paint over.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::CameraConfig;
use crate::error::{Error, Result};
use crate::types::ColorFrame;

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};
use image::{RgbImage, imageops::FilterType};

pub struct CameraCapture {
    latest: Arc<Mutex<Option<RgbImage>>>,
    running: Arc<AtomicBool>,
    width: u32,  // what the device actually delivers
    height: u32,
    target_width: u32, // what the engine works in
    target_height: u32,
    handle: Option<thread::JoinHandle<()>>,
}

/// How long `drop` waits for the capture thread to stop the stream.
const STOP_TIMEOUT: Duration = Duration::from_millis(500);

/// Open the device and start streaming (runs on the capture thread).
fn open_camera(config: &CameraConfig) -> Result<Camera> {
    let idx = CameraIndex::Index(config.index);

    let fmt = CameraFormat::new(
        Resolution::new(config.width, config.height),
        FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
        config.fps,
    );

    // Ask for RGB frames, closest to our requested size and rate.
    let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

    let mut cam =
        Camera::new(idx, req).map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;
    cam.open_stream()
        .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;
    Ok(cam)
}

/// Pull one frame and decode it to RGB (blocks until the device has one).
fn grab_rgb(cam: &mut Camera) -> Result<RgbImage> {
    let frame = cam
        .frame()
        .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;
    frame
        .decode_image::<RgbFormat>()
        .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))
}

impl CameraCapture {
    /// Start the capture thread and wait until the device is streaming.
    pub fn start(config: &CameraConfig) -> Result<Self> {
        let latest = Arc::new(Mutex::new(None::<RgbImage>));
        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(u32, u32)>>();

        let thread_config = config.clone();
        let latest_ref = Arc::clone(&latest);
        let running_ref = Arc::clone(&running);
        let handle = thread::spawn(move || {
            let mut cam = match open_camera(&thread_config) {
                Ok(cam) => cam,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            // The stream might choose a slightly different resolution.
            let actual = cam.resolution();
            let _ = ready_tx.send(Ok((actual.width(), actual.height())));

            while running_ref.load(Ordering::Relaxed) {
                match grab_rgb(&mut cam) {
                    Ok(img) => {
                        if let Ok(mut slot) = latest_ref.lock() {
                            *slot = Some(img); // older unread frame is dropped
                        }
                    }
                    Err(e) => log::warn!("{e}"),
                }
            }
            if let Err(e) = cam.stop_stream() {
                log::warn!("Stop stream: {e}");
            }
        });

        let (width, height) = ready_rx
            .recv()
            .map_err(|_| Error::CameraInit("capture thread exited before streaming".into()))??;
        log::info!("camera {} streaming at {}x{}", config.index, width, height);

        Ok(Self {
            latest,
            running,
            width,
            height,
            target_width: config.width,
            target_height: config.height,
            handle: Some(handle),
        })
    }

    /// Copy the newest frame into `out` as B,G,R,X, if one arrived since the last call.
    /// Frames are resized to the configured size when the device picked another.
    pub fn try_frame(&mut self, out: &mut ColorFrame) -> bool {
        let Some(mut img) = self.latest.lock().ok().and_then(|mut slot| slot.take()) else {
            return false;
        };
        if img.dimensions() != (self.target_width, self.target_height) {
            let (w, h) = (self.target_width, self.target_height);
            img = image::imageops::resize(&img, w, h, FilterType::Triangle);
        }

        let (w, h) = img.dimensions();
        out.ensure_size(w as usize, h as usize);
        for (px, dst) in img.pixels().zip(out.data.chunks_exact_mut(4)) {
            dst[0] = px[2];
            dst[1] = px[1];
            dst[2] = px[0];
            dst[3] = 0xFF;
        }
        true
    }

    /// Resolution the device settled on (before resizing).
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        // The worker notices the flag after its current `frame()` call returns.
        if let Some(handle) = self.handle.take() {
            if !join_within(handle, STOP_TIMEOUT) {
                log::warn!("capture thread still blocked after {:?}; detaching it", STOP_TIMEOUT);
            }
        }
    }
}

/// Join `handle` if it finishes within `timeout`; otherwise leave it detached.
/// Returns false when the thread was left running.
fn join_within(handle: thread::JoinHandle<()>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
    if handle.join().is_err() {
        log::warn!("capture thread panicked");
    }
    true
}
