//! Body Paint: tracked people paint the live video with their joints.
//!
//! Per frame, [`engine::PaintEngine`] projects skeleton joints into the color
//! image ([`projector`]), updates the persistent joint paint ([`paint`]) and
//! composites it over every pixel the depth stream assigns to a person
//! ([`compositor`]).

pub mod camera;
pub mod compositor;
pub mod config;
pub mod draw;
pub mod engine;
pub mod error;
pub mod joint;
pub mod paint;
pub mod projector;
pub mod puppet;
pub mod rng;
pub mod sensor;
pub mod types;
