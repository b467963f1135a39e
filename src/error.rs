//! Central error types for arraytex.
//!
//! Every failure the adapter can produce is a local validation error
//! surfaced immediately to the caller; nothing is retried or deferred.

use thiserror::Error;

use crate::types::{ElementType, PixelFormat};

/// Main error type for arraytex operations.
#[derive(Error, Debug)]
pub enum ArrayTexError {
    /// Sample type other than unsigned 8-bit
    #[error("unsupported element type {found:?}: only U8 samples can be uploaded")]
    UnsupportedElement { found: ElementType },

    /// Array rank outside the supported 2/3
    #[error("array must have 2 or 3 dimensions, got {rank}")]
    BadRank { rank: usize },

    /// No pixel format matches the channel count
    #[error("could not determine a pixel format for {channels} channels")]
    BadChannelCount { channels: usize },

    /// Explicit format does not match the array's channel count
    #[error("format {format:?} expects {expected} channels, array has {actual}")]
    FormatMismatch {
        format: PixelFormat,
        expected: u32,
        actual: u32,
    },

    /// A dimension is zero
    #[error("array has a zero-sized dimension and cannot be displayed")]
    EmptyArray,

    /// Stride list length differs from the shape rank
    #[error("stride specification has {strides} entries for {dims} dimensions")]
    StrideRankMismatch { strides: usize, dims: usize },

    /// The described layout reaches past the end of the buffer
    #[error("layout spans {required} bytes but the buffer holds {actual}")]
    BufferTooSmall { required: usize, actual: usize },

    /// Shape/stride arithmetic does not fit the address space
    #[error("layout size overflows the address space")]
    LayoutOverflow,

    /// Non-contiguous data under `CopyPolicy::Forbid`
    #[error("copying is not allowed but data is not C contiguous")]
    NotContiguous,

    /// Format conversion needed under `CopyPolicy::Forbid`
    #[error("converting {format:?} data for upload requires copying, which is not allowed")]
    ConversionRequired { format: PixelFormat },

    /// Refresh with a source of a different shape
    #[error("array shape changed: texture holds {expected:?}, source is {actual:?}")]
    ShapeChanged { expected: [u32; 3], actual: [u32; 3] },

    /// Region update outside the texture bounds
    #[error("region {width}x{height} at ({x}, {y}) exceeds the {tex_width}x{tex_height} texture")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        tex_width: u32,
        tex_height: u32,
    },

    /// Array larger than the device allows for 2D textures
    #[error("{width}x{height} exceeds the device's {limit}px texture limit")]
    TextureTooLarge { width: u32, height: u32, limit: u32 },

    /// No usable GPU adapter
    #[error("no suitable GPU adapter: {0}")]
    AdapterRequest(#[from] wgpu::RequestAdapterError),

    /// Device creation failed
    #[error("failed to create GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
}

/// Type alias for Results using ArrayTexError.
pub type Result<T> = std::result::Result<T, ArrayTexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArrayTexError::BadRank { rank: 4 };
        assert_eq!(err.to_string(), "array must have 2 or 3 dimensions, got 4");

        let err = ArrayTexError::BufferTooSmall {
            required: 1024,
            actual: 512,
        };
        assert_eq!(
            err.to_string(),
            "layout spans 1024 bytes but the buffer holds 512"
        );
    }

    #[test]
    fn test_shape_changed_display() {
        let err = ArrayTexError::ShapeChanged {
            expected: [240, 320, 4],
            actual: [240, 320, 3],
        };
        assert!(err.to_string().contains("[240, 320, 4]"));
        assert!(err.to_string().contains("[240, 320, 3]"));
    }

    #[test]
    fn test_element_type_display() {
        let err = ArrayTexError::UnsupportedElement {
            found: ElementType::F32,
        };
        assert!(err.to_string().contains("F32"));
        assert!(err.to_string().contains("U8"));
    }
}
