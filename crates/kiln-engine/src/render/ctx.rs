use winit::dpi::PhysicalSize;

/// Drawable size in physical pixels.
///
/// Tracked by the runtime on resize and handed to renderers each frame;
/// renderers use it for depth-buffer sizing and aspect ratio.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width / height, guarding against a zero-height drawable.
    #[inline]
    pub fn aspect(self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

impl From<PhysicalSize<u32>> for Viewport {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// Renderer-facing context (device/queue + surface format + viewport).
///
/// This is intentionally small and stable.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub viewport: Viewport, // physical px
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            viewport,
        }
    }
}

/// Target for drawing (encoder + color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_validity() {
        assert!(Viewport::new(1280, 720).is_valid());
        assert!(!Viewport::new(0, 720).is_valid());
        assert!(!Viewport::new(1280, 0).is_valid());
    }

    #[test]
    fn viewport_aspect_guards_zero_height() {
        let v = Viewport::new(800, 0);
        assert!(v.aspect().is_finite());
    }

    #[test]
    fn viewport_aspect_wide() {
        let v = Viewport::new(1920, 1080);
        assert!((v.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }
}
