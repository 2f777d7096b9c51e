use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// The runtime forwards the platform view's callbacks here: raw window
/// events, drawable-size changes, and one draw call per frame.
pub trait App {
    /// Called for window events.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called when a window's drawable size changed, after the surface has
    /// been reconfigured. Typical use: update the camera aspect ratio.
    fn on_resize(&mut self, window_id: WindowId, size: PhysicalSize<u32>) {
        let _ = (window_id, size);
    }

    /// Called once per rendered frame per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
