//! Texture loading and upload.
//!
//! PNG bytes are decoded with the `image` crate, converted to RGBA8, and
//! uploaded as an sRGB texture. Untextured draws use [`Texture::white`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image has zero extent ({width}x{height})")]
    ZeroExtent { width: u32, height: u32 },
}

/// A 2D color texture plus its view and sampler.
pub struct Texture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    size: (u32, u32),
}

impl Texture {
    /// Decodes PNG bytes and uploads them as an sRGB texture.
    pub fn from_png_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
    ) -> Result<Self, TextureError> {
        let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        if width == 0 || height == 0 {
            return Err(TextureError::ZeroExtent { width, height });
        }

        Ok(Self::from_rgba8(device, queue, &rgba, (width, height), label))
    }

    /// Uploads raw RGBA8 pixels (tightly packed, `width * height * 4` bytes).
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pixels: &[u8],
        (width, height): (u32, u32),
        label: &str,
    ) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);

        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            size: (width, height),
        }
    }

    /// 1x1 opaque white texture, used as the fallback binding.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba8(device, queue, &[255, 255, 255, 255], (1, 1), "kiln white")
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Texture size in texels.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }
}
