//! Array-backed wgpu textures.
//!
//! [`ArrayTexture`] pairs a validated array layout with a texture owned
//! by wgpu and keeps the two in sync: create once, then [`refresh`]
//! whenever the source bytes change. Sources whose rows can go to the
//! GPU queue as-is are written with their own pitch and never touch a
//! CPU staging buffer; everything else is gathered into one reusable
//! staging allocation first - unless the policy forbids copying.
//!
//! [`refresh`]: ArrayTexture::refresh

use crate::error::{ArrayTexError, Result};
use crate::interface::ArraySource;
use crate::layout::ArrayLayout;
use crate::types::{CopyPolicy, PixelFormat, TextureOptions};

/// A wgpu texture fed from a described byte buffer.
pub struct ArrayTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    format: PixelFormat,
    layout: ArrayLayout,
    policy: CopyPolicy,
    /// Reused by the repack/expansion paths so steady-state refresh
    /// does not reallocate.
    staging: Vec<u8>,
}

impl ArrayTexture {
    /// Create a texture from a source, inferring the pixel format from
    /// the array shape.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &impl ArraySource,
        policy: CopyPolicy,
    ) -> Result<Self> {
        Self::with_options(device, queue, source, None, policy, TextureOptions::default())
    }

    /// Create a texture with an explicit pixel format.
    ///
    /// The format's channel count must match the array.
    pub fn with_format(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &impl ArraySource,
        format: PixelFormat,
        policy: CopyPolicy,
    ) -> Result<Self> {
        Self::with_options(
            device,
            queue,
            source,
            Some(format),
            policy,
            TextureOptions::default(),
        )
    }

    /// Create a texture with full control over format and options.
    pub fn with_options(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &impl ArraySource,
        format: Option<PixelFormat>,
        policy: CopyPolicy,
        options: TextureOptions,
    ) -> Result<Self> {
        let spec = source.spec();
        let layout = ArrayLayout::resolve(&spec, source.as_bytes().len())?;

        let format = match format {
            Some(format) if format.channels() != layout.channels() => {
                return Err(ArrayTexError::FormatMismatch {
                    format,
                    expected: format.channels(),
                    actual: layout.channels(),
                });
            },
            Some(format) => format,
            None => PixelFormat::from_channels(layout.channels())?,
        };

        let limit = device.limits().max_texture_dimension_2d;
        if layout.width() > limit || layout.height() > limit {
            return Err(ArrayTexError::TextureTooLarge {
                width: layout.width(),
                height: layout.height(),
                limit,
            });
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(options.label.as_deref().unwrap_or("array texture")),
            size: wgpu::Extent3d {
                width: layout.width(),
                height: layout.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: format.texture_format(options.srgb),
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | options.extra_usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!(
            "created {}x{} array texture ({:?} as {:?})",
            layout.width(),
            layout.height(),
            format,
            format.texture_format(options.srgb),
        );

        let mut this = Self {
            texture,
            view,
            format,
            layout,
            policy,
            staging: Vec::new(),
        };
        this.write(queue, source.as_bytes(), layout, wgpu::Origin3d::ZERO)?;
        Ok(this)
    }

    /// Push the source's current contents to the GPU.
    ///
    /// The texture is kept; only the pixel data travels. Works with the
    /// source the texture was created from (mutated in place) or with
    /// any other source of the same width, height and channel count.
    /// The layout is re-validated per call because an equal-shaped
    /// source may still be strided differently.
    pub fn refresh(&mut self, queue: &wgpu::Queue, source: &impl ArraySource) -> Result<()> {
        let spec = source.spec();
        let layout = ArrayLayout::resolve(&spec, source.as_bytes().len())?;
        if layout.dimensions() != self.layout.dimensions() {
            let [w, h, c] = self.layout.dimensions();
            let [sw, sh, sc] = layout.dimensions();
            return Err(ArrayTexError::ShapeChanged {
                expected: [h, w, c],
                actual: [sh, sw, sc],
            });
        }
        self.layout = layout;
        self.write(queue, source.as_bytes(), layout, wgpu::Origin3d::ZERO)
    }

    /// Blit a whole source into a sub-rectangle of the texture.
    ///
    /// The source must have the texture's channel count; its width and
    /// height, placed at `(x, y)`, must lie inside the texture.
    pub fn write_region(
        &mut self,
        queue: &wgpu::Queue,
        source: &impl ArraySource,
        x: u32,
        y: u32,
    ) -> Result<()> {
        let spec = source.spec();
        let layout = ArrayLayout::resolve(&spec, source.as_bytes().len())?;
        if layout.channels() != self.format.channels() {
            return Err(ArrayTexError::FormatMismatch {
                format: self.format,
                expected: self.format.channels(),
                actual: layout.channels(),
            });
        }
        check_region(
            x,
            y,
            layout.width(),
            layout.height(),
            self.layout.width(),
            self.layout.height(),
        )?;
        self.write(queue, source.as_bytes(), layout, wgpu::Origin3d { x, y, z: 0 })
    }

    /// The texture owned by wgpu.
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// A default view of the texture, ready for binding.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Client pixel format of the source data.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Width and height in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.layout.width(), self.layout.height())
    }

    /// Select an upload path and write `bytes` under `layout` at
    /// `origin`.
    fn write(
        &mut self,
        queue: &wgpu::Queue,
        bytes: &[u8],
        layout: ArrayLayout,
        origin: wgpu::Origin3d,
    ) -> Result<()> {
        let extent = wgpu::Extent3d {
            width: layout.width(),
            height: layout.height(),
            depth_or_array_layers: 1,
        };

        if self.format.needs_expansion() {
            if self.policy == CopyPolicy::Forbid {
                return Err(ArrayTexError::ConversionRequired {
                    format: self.format,
                });
            }
            expand_rgb_rows(&layout, bytes, &mut self.staging);
            let pitch = layout.width() * 4;
            write_texels(queue, &self.texture, origin, &self.staging, pitch, extent);
        } else if layout.is_row_uploadable() {
            // Zero-copy: hand wgpu the caller's rows with their own
            // pitch. Any staging from here on is the GPU library's
            // business.
            let data = &bytes[layout.base_offset()..];
            write_texels(queue, &self.texture, origin, data, layout.row_pitch() as u32, extent);
        } else {
            if self.policy == CopyPolicy::Forbid {
                return Err(ArrayTexError::NotContiguous);
            }
            log::debug!(
                "repacking {}x{} source with strides {:?} for upload",
                layout.width(),
                layout.height(),
                layout.strides(),
            );
            gather_rows(&layout, bytes, &mut self.staging);
            let pitch = layout.row_bytes() as u32;
            write_texels(queue, &self.texture, origin, &self.staging, pitch, extent);
        }
        Ok(())
    }
}

/// One `Queue::write_texture` call with an explicit row pitch.
fn write_texels(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    origin: wgpu::Origin3d,
    data: &[u8],
    bytes_per_row: u32,
    extent: wgpu::Extent3d,
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(bytes_per_row),
            rows_per_image: Some(extent.height),
        },
        extent,
    );
}

/// Bounds check for a region blit.
fn check_region(x: u32, y: u32, width: u32, height: u32, tex_width: u32, tex_height: u32) -> Result<()> {
    let fits = x.checked_add(width).is_some_and(|right| right <= tex_width)
        && y.checked_add(height).is_some_and(|bottom| bottom <= tex_height);
    if fits {
        Ok(())
    } else {
        Err(ArrayTexError::RegionOutOfBounds {
            x,
            y,
            width,
            height,
            tex_width,
            tex_height,
        })
    }
}

/// Gather an arbitrarily strided layout into packed rows.
fn gather_rows(layout: &ArrayLayout, src: &[u8], dst: &mut Vec<u8>) {
    dst.clear();
    dst.reserve(layout.row_bytes() * layout.height() as usize);
    for row in 0..layout.height() {
        if let Some(range) = layout.row_range(row) {
            dst.extend_from_slice(&src[range]);
        } else {
            for col in 0..layout.width() {
                for channel in 0..layout.channels() {
                    dst.push(src[layout.offset_of(row, col, channel)]);
                }
            }
        }
    }
}

/// Expand 3-channel rows to RGBA with opaque alpha, gathering through
/// the strides as needed.
fn expand_rgb_rows(layout: &ArrayLayout, src: &[u8], dst: &mut Vec<u8>) {
    dst.clear();
    dst.reserve(layout.width() as usize * layout.height() as usize * 4);
    for row in 0..layout.height() {
        if let Some(range) = layout.row_range(row) {
            for px in src[range].chunks_exact(3) {
                dst.extend_from_slice(&[px[0], px[1], px[2], u8::MAX]);
            }
        } else {
            for col in 0..layout.width() {
                dst.extend_from_slice(&[
                    src[layout.offset_of(row, col, 0)],
                    src[layout.offset_of(row, col, 1)],
                    src[layout.offset_of(row, col, 2)],
                    u8::MAX,
                ]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::ArraySpec;
    use crate::types::ElementType;

    #[test]
    fn gather_contiguous_is_identity() {
        let spec = ArraySpec::contiguous(vec![2, 3], ElementType::U8);
        let layout = ArrayLayout::resolve(&spec, 6).unwrap();
        let src = [0u8, 1, 2, 3, 4, 5];
        let mut dst = Vec::new();
        gather_rows(&layout, &src, &mut dst);
        assert_eq!(dst, src);
    }

    #[test]
    fn gather_strips_row_padding() {
        // 2 rows of 3 gray pixels, rows padded to 4 bytes.
        let spec = ArraySpec::strided(vec![2, 3], vec![4, 1], ElementType::U8);
        let layout = ArrayLayout::resolve(&spec, 7).unwrap();
        let src = [10u8, 11, 12, 0xee, 20, 21, 22];
        let mut dst = Vec::new();
        gather_rows(&layout, &src, &mut dst);
        assert_eq!(dst, [10, 11, 12, 20, 21, 22]);
    }

    #[test]
    fn gather_flipped_view() {
        // Bottom-up 2x2 gray view of row-major data.
        let spec = ArraySpec::strided(vec![2, 2], vec![-2, 1], ElementType::U8);
        let layout = ArrayLayout::resolve(&spec, 4).unwrap();
        let src = [0u8, 1, 2, 3];
        let mut dst = Vec::new();
        gather_rows(&layout, &src, &mut dst);
        assert_eq!(dst, [2, 3, 0, 1]);
    }

    #[test]
    fn gather_elementwise_strides() {
        // Every other byte viewed as a 2x2 gray image.
        let spec = ArraySpec::strided(vec![2, 2], vec![4, 2], ElementType::U8);
        let layout = ArrayLayout::resolve(&spec, 7).unwrap();
        let src = [0u8, 9, 2, 9, 4, 9, 6];
        let mut dst = Vec::new();
        gather_rows(&layout, &src, &mut dst);
        assert_eq!(dst, [0, 2, 4, 6]);
    }

    #[test]
    fn gather_reuses_allocation() {
        let spec = ArraySpec::contiguous(vec![2, 3], ElementType::U8);
        let layout = ArrayLayout::resolve(&spec, 6).unwrap();
        let src = [0u8; 6];
        let mut dst = Vec::with_capacity(64);
        gather_rows(&layout, &src, &mut dst);
        assert_eq!(dst.len(), 6);
        assert!(dst.capacity() >= 64);
    }

    #[test]
    fn expand_contiguous_rgb() {
        let spec = ArraySpec::contiguous(vec![1, 2, 3], ElementType::U8);
        let layout = ArrayLayout::resolve(&spec, 6).unwrap();
        let src = [1u8, 2, 3, 4, 5, 6];
        let mut dst = Vec::new();
        expand_rgb_rows(&layout, &src, &mut dst);
        assert_eq!(dst, [1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn expand_padded_rgb_rows() {
        // 2 rows of 1 RGB pixel, rows padded to 4 bytes.
        let spec = ArraySpec::strided(vec![2, 1, 3], vec![4, 3, 1], ElementType::U8);
        let layout = ArrayLayout::resolve(&spec, 7).unwrap();
        let src = [1u8, 2, 3, 0xee, 7, 8, 9];
        let mut dst = Vec::new();
        expand_rgb_rows(&layout, &src, &mut dst);
        assert_eq!(dst, [1, 2, 3, 255, 7, 8, 9, 255]);
    }

    #[test]
    fn expand_strided_rgb() {
        // Channels stored planar-distance 2 apart within a pixel.
        let spec = ArraySpec::strided(vec![1, 1, 3], vec![6, 6, 2], ElementType::U8);
        let layout = ArrayLayout::resolve(&spec, 5).unwrap();
        let src = [1u8, 9, 2, 9, 3];
        let mut dst = Vec::new();
        expand_rgb_rows(&layout, &src, &mut dst);
        assert_eq!(dst, [1, 2, 3, 255]);
    }

    #[test]
    fn region_bounds() {
        assert!(check_region(0, 0, 320, 240, 320, 240).is_ok());
        assert!(check_region(64, 64, 32, 32, 320, 240).is_ok());
        assert!(check_region(300, 0, 32, 32, 320, 240).is_err());
        assert!(check_region(0, 239, 1, 2, 320, 240).is_err());
        // Offsets near u32::MAX must not wrap.
        assert!(check_region(u32::MAX, 0, 2, 2, 320, 240).is_err());
    }
}
