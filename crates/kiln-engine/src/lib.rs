//! Kiln engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by applications:
//! device/surface management, the window runtime, and the mesh render path.

pub mod core;
pub mod device;
pub mod window;
pub mod time;

pub mod logging;
pub mod math;
pub mod mesh;
pub mod render;
pub mod texture;
