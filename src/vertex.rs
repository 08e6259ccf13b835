//! Vertex-input and fixed-function pipeline state: binding/attribute
//! descriptions, primitive topology, polygon mode and cull mode.
//!
//! Grounded on `original_source/core/include/plaid/pipeline.h`'s
//! `vertex_input_binding_description` / `vertex_input_attribute_description`
//! / `primitive_topology` / `polygon_mode` / `cull_modes`, translated
//! from the original's bitmask-of-`uint8_t` cull mode into a
//! `bitflags!` type, the idiom this pack reaches for whenever a small
//! set of orthogonal flags needs combining (see `Category5`'s
//! generated protocol flags).

use crate::format::Format;
use bitflags::bitflags;

/// Whether a vertex-input binding advances per vertex or per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexInputRate {
    Vertex,
    Instance,
}

/// Describes one vertex-buffer binding slot: its stride and whether
/// it advances per vertex or per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexInputBindingDescription {
    pub binding: u8,
    pub stride: u32,
    pub input_rate: VertexInputRate,
}

/// Describes one vertex attribute as the caller declares it: which
/// binding it's fetched from, its shader `location`, its format (used
/// only to size it) and its byte offset within the binding's stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexInputAttributeDescription {
    pub location: u8,
    pub binding: u8,
    pub format: Format,
    pub offset: u32,
}

/// The planned form of an attribute: the binding's stride folded in,
/// partitioned by input-rate, as computed at pipeline construction
/// (spec step 3 of §4.5 in the design notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttributePlan {
    pub location: u8,
    pub binding: u8,
    pub stride: u32,
    pub offset: u32,
}

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
    TriangleStrip,
    /// Declared for ABI fidelity with the original engine; draws
    /// issued with this topology fail with `unsupported_topology`.
    LineStrip,
}

/// How a rasterized primitive's interior is filled. Only `Fill` is
/// implemented; the others are carried for API fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    Fill,
    Line,
    Point,
}

bitflags! {
    /// Which winding-order faces of a primitive are discarded.
    #[derive(Default)]
    pub struct CullMode: u8 {
        const NONE = 0;
        const FRONT = 1 << 0;
        const BACK = 1 << 1;
    }
}

/// The rectangle clip-space coordinates map into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cull_mode_combines() {
        let both = CullMode::FRONT | CullMode::BACK;
        assert!(both.contains(CullMode::FRONT));
        assert!(both.contains(CullMode::BACK));
        assert!(!CullMode::NONE.contains(CullMode::FRONT));
    }
}
