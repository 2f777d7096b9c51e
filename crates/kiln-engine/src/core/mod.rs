//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the runtime (platform
//! loop) and applications: a delegate trait receiving draw/resize callbacks
//! and a per-frame context. It avoids leaking runtime internals into user
//! code.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
