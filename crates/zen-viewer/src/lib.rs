// src/lib.rs
//! Zen Particles viewer library.
//!
//! A GPU particle field steered by live hand gestures: fist tension breathes
//! the field, a clench-and-release scatters it, and a pinch draws glowing
//! strokes over it. Landmarks arrive from an external detector process over
//! a JSON-lines pipe; everything else runs in this process.

pub mod app;
pub mod camera;
pub mod config;
pub mod field;
pub mod ink;
pub mod renderer;
pub mod shapes;
pub mod tracker;
pub mod ui;
