//! Pixel format registry: byte sizes, numeric class, and the
//! format-to-format converters used at the color-output boundary.
//!
//! Grounded on `original_source/core/include/plaid/format.h` and
//! `attachment_transition.{h,cpp}`, which pack a channel count, a
//! per-channel byte width and a numeric-class tag into a single `u16`
//! and derive `format_size`/class predicates by masking. This crate
//! keeps the same semantics but represents `Format` as a plain enum,
//! following the teacher's habit of leaning on `vk::Format`-style enums
//! rather than hand-rolled bit tricks for small, fixed vocabularies.

use log::warn;

/// A pixel/texel format understood by the attachment layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Single-channel float, the conventional on-disk depth format.
    R32f,
    Rg32f,
    Rgb32f,
    Rgba32f,
    Rgba32u,
    Bgra8u,
}

/// The numeric interpretation of a format's channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericClass {
    Float,
    SignedInt,
    UnsignedInt,
}

impl Format {
    /// Number of channels carried by this format.
    pub const fn channel_count(self) -> u32 {
        match self {
            Format::R32f => 1,
            Format::Rg32f => 2,
            Format::Rgb32f => 3,
            Format::Rgba32f | Format::Rgba32u => 4,
            Format::Bgra8u => 4,
        }
    }

    /// Per-channel byte width.
    pub const fn channel_width(self) -> u32 {
        match self {
            Format::R32f | Format::Rg32f | Format::Rgb32f | Format::Rgba32f | Format::Rgba32u => 4,
            Format::Bgra8u => 1,
        }
    }

    /// Numeric class of the format's channels.
    pub const fn numeric_class(self) -> NumericClass {
        match self {
            Format::R32f | Format::Rg32f | Format::Rgb32f | Format::Rgba32f => NumericClass::Float,
            Format::Rgba32u | Format::Bgra8u => NumericClass::UnsignedInt,
        }
    }
}

/// Total bytes per texel of `f`.
pub const fn format_size(f: Format) -> u32 {
    f.channel_count() * f.channel_width()
}

/// A function that converts one source texel into one destination
/// texel, given the raw bytes of both.
pub type ConverterFn = fn(src: &[u8], dst: &mut [u8]);

fn rgb32f_to_bgra8u(src: &[u8], dst: &mut [u8]) {
    let r = f32::from_le_bytes(src[0..4].try_into().unwrap());
    let g = f32::from_le_bytes(src[4..8].try_into().unwrap());
    let b = f32::from_le_bytes(src[8..12].try_into().unwrap());
    let r = (r * 255.0).clamp(0.0, 255.0) as u32;
    let g = (g * 255.0).clamp(0.0, 255.0) as u32;
    let b = (b * 255.0).clamp(0.0, 255.0) as u32;
    let packed = (r << 16) | (g << 8) | b;
    dst[0..4].copy_from_slice(&packed.to_le_bytes());
}

fn rgba32f_to_bgra8u(src: &[u8], dst: &mut [u8]) {
    let r = f32::from_le_bytes(src[0..4].try_into().unwrap());
    let g = f32::from_le_bytes(src[4..8].try_into().unwrap());
    let b = f32::from_le_bytes(src[8..12].try_into().unwrap());
    let a = f32::from_le_bytes(src[12..16].try_into().unwrap());
    let r = (r * 255.0).clamp(0.0, 255.0) as u32;
    let g = (g * 255.0).clamp(0.0, 255.0) as u32;
    let b = (b * 255.0).clamp(0.0, 255.0) as u32;
    let a = (a * 255.0).clamp(0.0, 255.0) as u32;
    let packed = (a << 24) | (r << 16) | (g << 8) | b;
    dst[0..4].copy_from_slice(&packed.to_le_bytes());
}

fn rgba32u_to_bgra8u(src: &[u8], dst: &mut [u8]) {
    let r = u32::from_le_bytes(src[0..4].try_into().unwrap()) as u8;
    let g = u32::from_le_bytes(src[4..8].try_into().unwrap()) as u8;
    let b = u32::from_le_bytes(src[8..12].try_into().unwrap()) as u8;
    let a = u32::from_le_bytes(src[12..16].try_into().unwrap()) as u8;
    let packed = ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32);
    dst[0..4].copy_from_slice(&packed.to_le_bytes());
}

fn identity_copy(src: &[u8], dst: &mut [u8]) {
    let n = src.len().min(dst.len());
    dst[..n].copy_from_slice(&src[..n]);
}

/// Finds a converter from `src` to `dst`, or `None` if no such
/// conversion is implemented.
///
/// Pipeline construction that requires an unsupported conversion fails
/// with [`crate::error::PlaidError::UnsupportedFormatConversion`].
pub fn match_converter(src: Format, dst: Format) -> Option<ConverterFn> {
    if src == dst {
        return Some(identity_copy);
    }
    match (src, dst) {
        (Format::Rgb32f, Format::Bgra8u) => Some(rgb32f_to_bgra8u),
        (Format::Rgba32f, Format::Bgra8u) => Some(rgba32f_to_bgra8u),
        (Format::Rgba32u, Format::Bgra8u) => Some(rgba32u_to_bgra8u),
        _ => {
            warn!("no converter registered for {src:?} -> {dst:?}");
            None
        }
    }
}
