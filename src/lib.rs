//! Display strided byte buffers as wgpu textures.
//!
//! `arraytex` is a thin adapter between anything that can describe its
//! pixel data as a raw buffer - shape, byte strides, element type, the
//! numpy array-interface model - and a texture owned by [wgpu]. Rows
//! that can be handed to the GPU queue as-is travel without a CPU-side
//! copy; everything else is repacked through one reusable staging
//! buffer, unless the caller forbids copying.
//!
//! The hard texture engineering (allocation, format negotiation, GPU
//! staging, device management) lives inside wgpu. This crate
//! contributes the descriptor protocol ([`ArraySource`]), the layout
//! validation ([`ArrayLayout`]) and the upload paths
//! ([`ArrayTexture`]).
//!
//! # Example
//!
//! ```no_run
//! use arraytex::{ArrayTexture, CopyPolicy, GpuContext, RawArray};
//!
//! # fn main() -> arraytex::Result<()> {
//! let ctx = GpuContext::new_blocking()?;
//!
//! let mut pixels = vec![0u8; 240 * 320 * 4];
//! let mut texture = ArrayTexture::new(
//!     ctx.device(),
//!     ctx.queue(),
//!     &RawArray::new(&pixels, [240, 320, 4]),
//!     CopyPolicy::Allow,
//! )?;
//!
//! // Mutate the pixels, then push the new contents to the GPU. The
//! // texture is kept; only the data travels.
//! pixels.fill(128);
//! texture.refresh(ctx.queue(), &RawArray::new(&pixels, [240, 320, 4]))?;
//! # Ok(())
//! # }
//! ```
//!
//! Decoded [`image`] buffers implement [`ArraySource`] directly:
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let ctx = arraytex::GpuContext::new_blocking()?;
//! let photo = image::open("photo.png")?.to_rgba8();
//! let texture = arraytex::ArrayTexture::new(
//!     ctx.device(),
//!     ctx.queue(),
//!     &photo,
//!     arraytex::CopyPolicy::Forbid,
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! [wgpu]: https://docs.rs/wgpu

mod blit;
mod error;
mod gpu;
mod interface;
mod layout;
mod texture;
mod types;

pub use blit::TextureBlitter;
pub use error::{ArrayTexError, Result};
pub use gpu::GpuContext;
pub use interface::{ArraySource, ArraySpec, RawArray};
pub use layout::ArrayLayout;
pub use texture::ArrayTexture;
pub use types::{CopyPolicy, ElementType, PixelFormat, TextureOptions};
