//! The array-description protocol.
//!
//! Anything that can describe its pixel data as a raw byte buffer with
//! a shape, optional byte strides and an element type can be displayed.
//! [`ArraySource`] is that seam; [`RawArray`] is the escape hatch for
//! buffers originating outside any known container (FFI frames, mapped
//! files, hand-built test data).

use crate::types::ElementType;

/// Description of a raw pixel buffer: shape, byte strides, element type.
///
/// Shapes are row-major: `[height, width]` for single-channel data or
/// `[height, width, channels]` for interleaved data. Strides are in
/// bytes per dimension; `None` declares the buffer C contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySpec {
    /// Extent of each dimension.
    pub shape: Vec<usize>,
    /// Byte stride per dimension, or `None` for C contiguous data.
    pub strides: Option<Vec<isize>>,
    /// Sample type of each element.
    pub element: ElementType,
}

impl ArraySpec {
    /// Describe a C-contiguous buffer.
    pub fn contiguous(shape: impl Into<Vec<usize>>, element: ElementType) -> Self {
        Self {
            shape: shape.into(),
            strides: None,
            element,
        }
    }

    /// Describe an explicitly strided buffer.
    pub fn strided(
        shape: impl Into<Vec<usize>>,
        strides: impl Into<Vec<isize>>,
        element: ElementType,
    ) -> Self {
        Self {
            shape: shape.into(),
            strides: Some(strides.into()),
            element,
        }
    }
}

/// A type whose pixel data can be exposed as a described byte buffer.
///
/// Implementors hand out a borrowed view; the adapter never takes
/// ownership and reads the bytes again on every upload, so in-place
/// mutation between uploads is the expected usage pattern.
pub trait ArraySource {
    /// Describe the memory layout of the pixel data.
    fn spec(&self) -> ArraySpec;

    /// The raw bytes backing the array.
    ///
    /// For negative strides the slice still starts at the lowest
    /// address in memory; the layout resolution computes where element
    /// `(0, 0, 0)` sits inside it.
    fn as_bytes(&self) -> &[u8];
}

impl<T: ArraySource + ?Sized> ArraySource for &T {
    fn spec(&self) -> ArraySpec {
        (**self).spec()
    }

    fn as_bytes(&self) -> &[u8] {
        (**self).as_bytes()
    }
}

/// Borrowed bytes described by hand.
#[derive(Debug, Clone)]
pub struct RawArray<'a> {
    bytes: &'a [u8],
    spec: ArraySpec,
}

impl<'a> RawArray<'a> {
    /// View a C-contiguous `u8` buffer under the given shape.
    pub fn new(bytes: &'a [u8], shape: impl Into<Vec<usize>>) -> Self {
        Self {
            bytes,
            spec: ArraySpec::contiguous(shape, ElementType::U8),
        }
    }

    /// View a `u8` buffer under the given shape and byte strides.
    pub fn with_strides(
        bytes: &'a [u8],
        shape: impl Into<Vec<usize>>,
        strides: impl Into<Vec<isize>>,
    ) -> Self {
        Self {
            bytes,
            spec: ArraySpec::strided(shape, strides, ElementType::U8),
        }
    }

    /// View a contiguous slice of plain-old-data pixels, e.g.
    /// `&[[u8; 4]]`, under the given shape.
    pub fn from_pod<T: bytemuck::Pod>(pixels: &'a [T], shape: impl Into<Vec<usize>>) -> Self {
        Self::new(bytemuck::cast_slice(pixels), shape)
    }

    /// Override the element type.
    ///
    /// Non-`U8` elements are rejected at upload; this exists so callers
    /// describing foreign buffers do not have to lie about their type.
    pub fn with_element(mut self, element: ElementType) -> Self {
        self.spec.element = element;
        self
    }
}

impl ArraySource for RawArray<'_> {
    fn spec(&self) -> ArraySpec {
        self.spec.clone()
    }

    fn as_bytes(&self) -> &[u8] {
        self.bytes
    }
}

/// Decoded images are contiguous interleaved 8-bit buffers.
impl<P> ArraySource for image::ImageBuffer<P, Vec<u8>>
where
    P: image::Pixel<Subpixel = u8>,
{
    fn spec(&self) -> ArraySpec {
        ArraySpec::contiguous(
            vec![
                self.height() as usize,
                self.width() as usize,
                P::CHANNEL_COUNT as usize,
            ],
            ElementType::U8,
        )
    }

    fn as_bytes(&self) -> &[u8] {
        self.as_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_array_contiguous_spec() {
        let data = [0u8; 24];
        let arr = RawArray::new(&data, [2, 3, 4]);
        let spec = arr.spec();
        assert_eq!(spec.shape, vec![2, 3, 4]);
        assert_eq!(spec.strides, None);
        assert_eq!(spec.element, ElementType::U8);
        assert_eq!(arr.as_bytes().len(), 24);
    }

    #[test]
    fn raw_array_strided_spec() {
        let data = [0u8; 32];
        let arr = RawArray::with_strides(&data, [2, 3, 4], [16, 4, 1]);
        let spec = arr.spec();
        assert_eq!(spec.strides, Some(vec![16, 4, 1]));
    }

    #[test]
    fn raw_array_from_pod_pixels() {
        let pixels = [[1u8, 2, 3, 4], [5, 6, 7, 8]];
        let arr = RawArray::from_pod(&pixels, [1, 2, 4]);
        assert_eq!(arr.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(arr.spec().shape, vec![1, 2, 4]);
    }

    #[test]
    fn raw_array_element_override() {
        let data = [0u8; 8];
        let arr = RawArray::new(&data, [2, 4]).with_element(ElementType::U16);
        assert_eq!(arr.spec().element, ElementType::U16);
    }

    #[test]
    fn image_buffer_spec() {
        let img = image::RgbaImage::new(320, 240);
        let spec = img.spec();
        assert_eq!(spec.shape, vec![240, 320, 4]);
        assert_eq!(spec.strides, None);
        assert_eq!(img.as_bytes().len(), 320 * 240 * 4);

        let gray = image::GrayImage::new(4, 2);
        assert_eq!(gray.spec().shape, vec![2, 4, 1]);
    }

    #[test]
    fn reference_sources_delegate() {
        let data = [0u8; 6];
        let arr = RawArray::new(&data, [2, 3]);
        let by_ref: &dyn ArraySource = &arr;
        assert_eq!((&by_ref).spec(), arr.spec());
    }
}
