// What you SEE:
// • Live camera (or a striped test pattern) is the base image.
// • Stick-figure puppets stand in for tracked people; their bodies get painted.
// • Move a puppet's hand into the blue/green squares to pick up paint; touch
//   another puppet to pass it on. The first puppet's right hand follows your mouse.
// • S toggles the skeleton wireframe. ESC quits.

use anyhow::Context;
use body_paint::camera::CameraCapture;
use body_paint::config::Config;
use body_paint::draw::{Drawer, blit_color_frame, draw_crosshair, draw_skeletons, draw_text_5x7};
use body_paint::engine::{FrameOutcome, PaintEngine};
use body_paint::puppet::PuppetSensor;
use body_paint::types::FrameBuffer;
use std::time::{Duration, Instant};

const CONFIG_PATH: &str = "bodypaint.toml";

/// Frames per second, averaged over one-second windows.
struct FpsMeter {
    window_start: Instant,
    frames: u32,
    last: f32,
}

impl FpsMeter {
    fn new() -> Self {
        Self { window_start: Instant::now(), frames: 0, last: 0.0 }
    }

    /// Count a frame; returns the new rate when a window closes.
    fn frame(&mut self) -> Option<f32> {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        self.last = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = Instant::now();
        Some(self.last)
    }

    fn last(&self) -> f32 {
        self.last
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load_or_default(CONFIG_PATH);
    let (w, h) = (config.camera.width as usize, config.camera.height as usize);

    /* --- Sensor: webcam color + simulated tracking ---
       Visual: puppets over live video, or over stripes without a camera. */
    let camera = if config.camera.enabled {
        match CameraCapture::start(&config.camera) {
            Ok(cam) => {
                let (cw, ch) = cam.resolution();
                if (cw, ch) != (config.camera.width, config.camera.height) {
                    log::info!("camera frames resized {}x{} -> {}x{}", cw, ch, w, h);
                }
                Some(cam)
            }
            Err(e) => {
                log::warn!("{e}; falling back to the test pattern");
                None
            }
        }
    } else {
        None
    };
    let mut sensor = PuppetSensor::new(camera, config.demo.puppets, w, h);
    let mut engine = PaintEngine::new(&config.paint);

    let mut drawer = Drawer::new(&config.demo.title, w, h, config.demo.target_fps)
        .context("opening the window")?;
    let mut screen = FrameBuffer::new(w, h);
    let mut show_skeleton = config.demo.show_skeleton;

    let mut fps = FpsMeter::new();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        if drawer.s_pressed_once() { show_skeleton = !show_skeleton; }

        /* 1) Move the puppets, then run the engine on whatever the sensor has. */
        sensor.advance(drawer.mouse_pos());
        let outcome = engine.update(&mut sensor);

        /* 2) Painted frame -> window pixels, plus overlays. */
        blit_color_frame(&mut screen, engine.color_frame());
        if show_skeleton {
            if let Some(joints) = engine.joints() {
                draw_skeletons(&mut screen, joints, 0x00_FF_FF_FF, 0x00_FF_CC_33);
            }
        }
        if let Some((mx, my)) = drawer.mouse_pos() {
            draw_crosshair(&mut screen, mx as i32, my as i32, 12, 0x00_FF_CC_33);
        }

        let status = match outcome {
            FrameOutcome::Painted => "PAINTED",
            FrameOutcome::Unpainted => "UNPAINTED",
            FrameOutcome::NoColorFrame => "NO FRAME",
            FrameOutcome::SensorInactive => "NO SENSOR",
        };
        let skel = if show_skeleton { "SKEL ON" } else { "SKEL OFF" };
        let hud = format!("{status} | {skel} | FPS: {:.1}", fps.last());
        draw_text_5x7(&mut screen, 8, 8, &hud, 0x00_FF_FF_FF);

        /* 3) Present to the window. */
        drawer.present(&screen)?;

        /* 4) Once a second: refresh the HUD rate and log it. */
        if let Some(rate) = fps.frame() {
            log::debug!("FPS: {:.1}", rate);
        }
    }

    Ok(())
}
