//! Validated layouts for strided pixel arrays.
//!
//! Resolution turns a transient [`ArraySpec`] into an [`ArrayLayout`]
//! whose invariants hold for a concrete buffer length: every element
//! reachable through the strides lies inside the buffer, and the
//! extents fit the GPU's 32-bit dimensions. All arithmetic is checked;
//! a descriptor that does not fit the address space is an error, not a
//! wrap-around.

use crate::error::{ArrayTexError, Result};
use crate::interface::ArraySpec;
use crate::types::ElementType;

/// A validated two- or three-dimensional byte layout.
///
/// Strides are stored per dimension as `[row, column, channel]`; rank-2
/// specs resolve to a single channel. Negative strides (flipped views)
/// are valid: `base_offset` then points at element `(0, 0, 0)` inside
/// the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayLayout {
    height: u32,
    width: u32,
    channels: u32,
    strides: [isize; 3],
    base_offset: usize,
    span: usize,
}

impl ArrayLayout {
    /// Validate a descriptor against the length of the buffer it
    /// claims to describe.
    pub fn resolve(spec: &ArraySpec, data_len: usize) -> Result<Self> {
        if spec.element != ElementType::U8 {
            return Err(ArrayTexError::UnsupportedElement {
                found: spec.element,
            });
        }

        let rank = spec.shape.len();
        let (height, width, channels) = match rank {
            2 => (spec.shape[0], spec.shape[1], 1),
            3 => (spec.shape[0], spec.shape[1], spec.shape[2]),
            _ => return Err(ArrayTexError::BadRank { rank }),
        };
        if height == 0 || width == 0 || channels == 0 {
            return Err(ArrayTexError::EmptyArray);
        }

        let strides = match &spec.strides {
            Some(given) => {
                if given.len() != rank {
                    return Err(ArrayTexError::StrideRankMismatch {
                        strides: given.len(),
                        dims: rank,
                    });
                }
                match rank {
                    2 => [given[0], given[1], 1],
                    _ => [given[0], given[1], given[2]],
                }
            },
            None => {
                // C contiguous: the stride of each dimension is the
                // product of the faster-varying extents.
                let col = isize::try_from(channels).map_err(|_| ArrayTexError::LayoutOverflow)?;
                let row = isize::try_from(width)
                    .ok()
                    .and_then(|w| w.checked_mul(col))
                    .ok_or(ArrayTexError::LayoutOverflow)?;
                [row, col, 1]
            },
        };

        // Furthest reachable offsets in both directions decide the span
        // and where element (0, 0, 0) sits.
        let last =
            |extent: usize| isize::try_from(extent - 1).map_err(|_| ArrayTexError::LayoutOverflow);
        let extents = [
            last(height)?.checked_mul(strides[0]),
            last(width)?.checked_mul(strides[1]),
            last(channels)?.checked_mul(strides[2]),
        ];
        let mut max_off: isize = 0;
        let mut min_off: isize = 0;
        for extent in extents {
            let extent = extent.ok_or(ArrayTexError::LayoutOverflow)?;
            if extent >= 0 {
                max_off = max_off
                    .checked_add(extent)
                    .ok_or(ArrayTexError::LayoutOverflow)?;
            } else {
                min_off = min_off
                    .checked_add(extent)
                    .ok_or(ArrayTexError::LayoutOverflow)?;
            }
        }

        let base_offset = min_off.unsigned_abs();
        let span = max_off
            .checked_sub(min_off)
            .and_then(|total| total.checked_add(1))
            .ok_or(ArrayTexError::LayoutOverflow)? as usize;

        if span > data_len {
            return Err(ArrayTexError::BufferTooSmall {
                required: span,
                actual: data_len,
            });
        }

        let height = u32::try_from(height).map_err(|_| ArrayTexError::LayoutOverflow)?;
        let width = u32::try_from(width).map_err(|_| ArrayTexError::LayoutOverflow)?;
        let channels = u32::try_from(channels).map_err(|_| ArrayTexError::LayoutOverflow)?;

        Ok(Self {
            height,
            width,
            channels,
            strides,
            base_offset,
            span,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Interleaved channels per pixel.
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// `[width, height, channels]` of the layout, for shape comparisons.
    pub fn dimensions(&self) -> [u32; 3] {
        [self.width, self.height, self.channels]
    }

    /// Byte strides as `[row, column, channel]`.
    pub fn strides(&self) -> [isize; 3] {
        self.strides
    }

    /// Byte offset of element `(0, 0, 0)` inside the buffer.
    pub fn base_offset(&self) -> usize {
        self.base_offset
    }

    /// Bytes the layout spans inside the buffer.
    pub fn span(&self) -> usize {
        self.span
    }

    /// Bytes from the start of one row to the next.
    ///
    /// For contiguous data this is `width * channels`; strided sources
    /// keep whatever their descriptor declared.
    pub fn row_pitch(&self) -> isize {
        self.strides[0]
    }

    /// Bytes in one unpadded row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// True when the layout is C contiguous: each stride equals the
    /// product of the faster-varying extents.
    pub fn is_contiguous(&self) -> bool {
        self.strides[2] == 1
            && self.strides[1] == self.channels as isize
            && self.strides[0] == self.row_bytes() as isize
    }

    /// True when whole rows can be handed to the GPU queue as-is.
    ///
    /// Wider than full contiguity: rows may carry trailing padding,
    /// because the upload call accepts a per-row pitch. Requires packed
    /// pixels within each row, a forward row stride of at least one
    /// unpadded row, and a pitch expressible in texel units of a
    /// 32-bit upload descriptor.
    pub fn is_row_uploadable(&self) -> bool {
        if self.strides[2] != 1 || self.strides[1] != self.channels as isize {
            return false;
        }
        let pitch = self.strides[0];
        pitch >= self.row_bytes() as isize
            && pitch as usize % self.channels as usize == 0
            && u32::try_from(pitch).is_ok()
    }

    /// Byte offset of element `(row, col, channel)`.
    pub(crate) fn offset_of(&self, row: u32, col: u32, channel: u32) -> usize {
        let off = self.base_offset as isize
            + row as isize * self.strides[0]
            + col as isize * self.strides[1]
            + channel as isize * self.strides[2];
        // Resolution proved every reachable element is in bounds.
        off as usize
    }

    /// The byte range of one row, when rows are internally packed.
    pub(crate) fn row_range(&self, row: u32) -> Option<std::ops::Range<usize>> {
        if self.strides[2] != 1 || self.strides[1] != self.channels as isize {
            return None;
        }
        let start = self.offset_of(row, 0, 0);
        Some(start..start + self.row_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::ArraySpec;

    fn u8_spec(shape: &[usize]) -> ArraySpec {
        ArraySpec::contiguous(shape.to_vec(), ElementType::U8)
    }

    #[test]
    fn contiguous_rank3() {
        let layout = ArrayLayout::resolve(&u8_spec(&[240, 320, 4]), 240 * 320 * 4).unwrap();
        assert_eq!(layout.dimensions(), [320, 240, 4]);
        assert_eq!(layout.strides(), [320 * 4, 4, 1]);
        assert_eq!(layout.row_pitch(), 320 * 4);
        assert_eq!(layout.base_offset(), 0);
        assert!(layout.is_contiguous());
        assert!(layout.is_row_uploadable());
    }

    #[test]
    fn contiguous_rank2_defaults_to_one_channel() {
        let layout = ArrayLayout::resolve(&u8_spec(&[240, 320]), 240 * 320).unwrap();
        assert_eq!(layout.channels(), 1);
        assert_eq!(layout.strides(), [320, 1, 1]);
        assert!(layout.is_contiguous());
    }

    #[test]
    fn explicit_strides_matching_contiguous() {
        let spec = ArraySpec::strided(vec![2, 3, 4], vec![12, 4, 1], ElementType::U8);
        let layout = ArrayLayout::resolve(&spec, 24).unwrap();
        assert!(layout.is_contiguous());
        assert!(layout.is_row_uploadable());
    }

    #[test]
    fn padded_rows_upload_without_repacking() {
        // 3 pixels of RGBA per row, rows padded to 16 bytes.
        let spec = ArraySpec::strided(vec![2, 3, 4], vec![16, 4, 1], ElementType::U8);
        let layout = ArrayLayout::resolve(&spec, 16 + 12).unwrap();
        assert!(!layout.is_contiguous());
        assert!(layout.is_row_uploadable());
        assert_eq!(layout.row_pitch(), 16);
        assert_eq!(layout.row_bytes(), 12);
    }

    #[test]
    fn interleave_gaps_force_repacking() {
        // Every other byte of a 2-channel-wide buffer viewed as gray.
        let spec = ArraySpec::strided(vec![2, 3], vec![6, 2], ElementType::U8);
        let layout = ArrayLayout::resolve(&spec, 12).unwrap();
        assert!(!layout.is_contiguous());
        assert!(!layout.is_row_uploadable());
        assert!(layout.row_range(0).is_none());
    }

    #[test]
    fn flipped_view_has_base_offset() {
        // 2x2 gray image viewed bottom-up.
        let spec = ArraySpec::strided(vec![2, 2], vec![-2, 1], ElementType::U8);
        let layout = ArrayLayout::resolve(&spec, 4).unwrap();
        assert_eq!(layout.base_offset(), 2);
        assert_eq!(layout.span(), 4);
        assert!(!layout.is_row_uploadable());
        assert_eq!(layout.offset_of(0, 0, 0), 2);
        assert_eq!(layout.offset_of(1, 1, 0), 1);
        assert_eq!(layout.row_range(1), Some(0..2));
    }

    #[test]
    fn buffer_too_small() {
        let err = ArrayLayout::resolve(&u8_spec(&[2, 3, 4]), 23).unwrap_err();
        assert!(matches!(
            err,
            ArrayTexError::BufferTooSmall {
                required: 24,
                actual: 23
            }
        ));
    }

    #[test]
    fn padded_rows_need_no_final_padding() {
        // The last row only needs its unpadded bytes, like GL and wgpu.
        let spec = ArraySpec::strided(vec![2, 3, 4], vec![16, 4, 1], ElementType::U8);
        assert!(ArrayLayout::resolve(&spec, 16 + 12).is_ok());
        assert!(ArrayLayout::resolve(&spec, 16 + 11).is_err());
    }

    #[test]
    fn bad_rank() {
        assert!(matches!(
            ArrayLayout::resolve(&u8_spec(&[16]), 16),
            Err(ArrayTexError::BadRank { rank: 1 })
        ));
        assert!(matches!(
            ArrayLayout::resolve(&u8_spec(&[2, 2, 2, 2]), 16),
            Err(ArrayTexError::BadRank { rank: 4 })
        ));
    }

    #[test]
    fn zero_dimension() {
        assert!(matches!(
            ArrayLayout::resolve(&u8_spec(&[0, 320, 4]), 0),
            Err(ArrayTexError::EmptyArray)
        ));
        assert!(matches!(
            ArrayLayout::resolve(&u8_spec(&[240, 320, 0]), 0),
            Err(ArrayTexError::EmptyArray)
        ));
    }

    #[test]
    fn non_u8_elements_rejected() {
        let spec = ArraySpec::contiguous(vec![2, 2], ElementType::U16);
        assert!(matches!(
            ArrayLayout::resolve(&spec, 8),
            Err(ArrayTexError::UnsupportedElement {
                found: ElementType::U16
            })
        ));
    }

    #[test]
    fn stride_rank_mismatch() {
        let spec = ArraySpec::strided(vec![2, 3, 4], vec![12, 1], ElementType::U8);
        assert!(matches!(
            ArrayLayout::resolve(&spec, 24),
            Err(ArrayTexError::StrideRankMismatch {
                strides: 2,
                dims: 3
            })
        ));
    }

    #[test]
    fn stride_arithmetic_overflow() {
        let spec = ArraySpec::strided(
            vec![usize::MAX / 2, 2, 4],
            vec![isize::MAX / 2, 4, 1],
            ElementType::U8,
        );
        assert!(matches!(
            ArrayLayout::resolve(&spec, usize::MAX),
            Err(ArrayTexError::LayoutOverflow)
        ));
    }

    #[test]
    fn broadcast_row_stride() {
        // A single row repeated via stride 0 spans just that row.
        let spec = ArraySpec::strided(vec![100, 4, 1], vec![0, 1, 1], ElementType::U8);
        let layout = ArrayLayout::resolve(&spec, 4).unwrap();
        assert_eq!(layout.span(), 4);
        assert!(!layout.is_row_uploadable());
        assert_eq!(layout.row_range(57), Some(0..4));
    }
}
