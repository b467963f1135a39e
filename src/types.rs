//! Core types describing array data and its GPU representation.

use crate::error::{ArrayTexError, Result};

/// Sample type of one array element.
///
/// The equivalent of the protocol's type string. Upload accepts only
/// [`ElementType::U8`]; the other variants exist so sources can describe
/// themselves honestly and get a precise error back instead of having
/// their bytes reinterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl ElementType {
    /// Size of one sample in bytes.
    pub fn size(self) -> usize {
        match self {
            ElementType::U8 | ElementType::I8 => 1,
            ElementType::U16 | ElementType::I16 => 2,
            ElementType::U32 | ElementType::I32 | ElementType::F32 => 4,
            ElementType::F64 => 8,
        }
    }
}

/// Client pixel format of an array, as stored in the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Single-channel luminance.
    Gray,
    /// Interleaved red, green, blue.
    Rgb,
    /// Interleaved red, green, blue, alpha.
    Rgba,
}

impl PixelFormat {
    /// Number of interleaved channels per pixel in the source data.
    pub fn channels(self) -> u32 {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }

    /// Infer the format from an array's channel count.
    ///
    /// Rank-2 arrays resolve to one channel. Matches the constructor
    /// defaults of the protocol: 1 channel is luminance, 3 is RGB,
    /// 4 is RGBA, anything else has no sensible display format.
    pub fn from_channels(channels: u32) -> Result<Self> {
        match channels {
            1 => Ok(PixelFormat::Gray),
            3 => Ok(PixelFormat::Rgb),
            4 => Ok(PixelFormat::Rgba),
            other => Err(ArrayTexError::BadChannelCount {
                channels: other as usize,
            }),
        }
    }

    /// Bytes per texel as uploaded.
    ///
    /// RGB has no 3-channel 8-bit texture format and is expanded to
    /// RGBA on the way to the GPU.
    pub fn upload_bytes_per_texel(self) -> u32 {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb | PixelFormat::Rgba => 4,
        }
    }

    /// The wgpu texture format this data is uploaded as.
    pub fn texture_format(self, srgb: bool) -> wgpu::TextureFormat {
        match (self, srgb) {
            (PixelFormat::Gray, _) => wgpu::TextureFormat::R8Unorm,
            (PixelFormat::Rgb | PixelFormat::Rgba, false) => wgpu::TextureFormat::Rgba8Unorm,
            (PixelFormat::Rgb | PixelFormat::Rgba, true) => wgpu::TextureFormat::Rgba8UnormSrgb,
        }
    }

    /// True when upload always goes through a CPU-side conversion.
    pub(crate) fn needs_expansion(self) -> bool {
        matches!(self, PixelFormat::Rgb)
    }
}

/// Whether the adapter may copy pixel data to satisfy an upload.
///
/// The zero-copy promise is only meaningful if the caller can insist on
/// it: under [`CopyPolicy::Forbid`], any source whose layout would force
/// a CPU-side repack or format conversion is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyPolicy {
    /// Repack or convert on the CPU when the data cannot go to the GPU
    /// queue as-is.
    #[default]
    Allow,
    /// Fail instead of copying.
    Forbid,
}

/// Options for texture creation.
#[derive(Debug, Clone)]
pub struct TextureOptions {
    /// Debug label attached to the wgpu texture.
    pub label: Option<String>,
    /// Sample color data as sRGB. Off by default: the adapter displays
    /// bytes as given and leaves color interpretation to the caller.
    pub srgb: bool,
    /// Extra usages ORed into `TEXTURE_BINDING | COPY_DST`.
    pub extra_usage: wgpu::TextureUsages,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            label: None,
            srgb: false,
            extra_usage: wgpu::TextureUsages::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_sizes() {
        assert_eq!(ElementType::U8.size(), 1);
        assert_eq!(ElementType::I16.size(), 2);
        assert_eq!(ElementType::F32.size(), 4);
        assert_eq!(ElementType::F64.size(), 8);
    }

    #[test]
    fn format_from_channels() {
        assert_eq!(PixelFormat::from_channels(1).unwrap(), PixelFormat::Gray);
        assert_eq!(PixelFormat::from_channels(3).unwrap(), PixelFormat::Rgb);
        assert_eq!(PixelFormat::from_channels(4).unwrap(), PixelFormat::Rgba);

        assert!(matches!(
            PixelFormat::from_channels(2),
            Err(ArrayTexError::BadChannelCount { channels: 2 })
        ));
        assert!(matches!(
            PixelFormat::from_channels(5),
            Err(ArrayTexError::BadChannelCount { channels: 5 })
        ));
    }

    #[test]
    fn texture_format_mapping() {
        assert_eq!(
            PixelFormat::Gray.texture_format(false),
            wgpu::TextureFormat::R8Unorm
        );
        assert_eq!(
            PixelFormat::Rgba.texture_format(false),
            wgpu::TextureFormat::Rgba8Unorm
        );
        assert_eq!(
            PixelFormat::Rgba.texture_format(true),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        // RGB uploads as expanded RGBA
        assert_eq!(
            PixelFormat::Rgb.texture_format(false),
            wgpu::TextureFormat::Rgba8Unorm
        );
    }

    #[test]
    fn upload_texel_sizes() {
        assert_eq!(PixelFormat::Gray.upload_bytes_per_texel(), 1);
        assert_eq!(PixelFormat::Rgb.upload_bytes_per_texel(), 4);
        assert_eq!(PixelFormat::Rgba.upload_bytes_per_texel(), 4);
        assert!(PixelFormat::Rgb.needs_expansion());
        assert!(!PixelFormat::Rgba.needs_expansion());
    }
}
