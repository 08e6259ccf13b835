//! Shared fixtures for the scenario integration tests under `tests/`.
//!
//! One file per scenario group (`spec.md` §8's S1–S6), all built on
//! top of these two tiny shaders: a vertex shader that forwards a
//! `Vec3` clip position and a fragment shader that writes a uniform
//! (descriptor-bound) `Vec3` color straight to its output. Scenarios
//! that need per-vertex color or per-instance offsets build their own
//! small shader pair instead of reusing these.

use caliban_sw::{
    AttachmentDescription, AttachmentReference, ConstSlotTable, CullMode, Format, GraphicsPipeline,
    GraphicsPipelineCreateInfo, LoadOp, MutSlotTable, PolygonMode, PrimitiveTopology, RenderPass, RenderPassCreateInfo,
    ShaderModule, ShaderStageVariable, ShaderVariablesMeta, StoreOp, SubpassDescription, VertexInputAttributeDescription,
    VertexInputBindingDescription, VertexInputRate, Viewport,
};
use glam::{Vec3, Vec4};

/// `{x, y, z}` clip-space position, `w` implied `1.0`.
#[repr(C)]
pub struct PosVertex {
    pub pos: Vec3,
}

pub unsafe fn vs_passthrough_pos(
    _uniform: *const ConstSlotTable,
    input: *const ConstSlotTable,
    _output: *const MutSlotTable,
    builtin: *mut *mut u8,
) {
    let input = &*input;
    let pos = *(input[0] as *const Vec3);
    *((*builtin) as *mut Vec4) = Vec4::new(pos.x, pos.y, pos.z, 1.0);
}

pub unsafe fn fs_uniform_color(
    uniform: *const ConstSlotTable,
    _input: *const ConstSlotTable,
    output: *const MutSlotTable,
    _builtin: *mut *mut u8,
) {
    let uniform = &*uniform;
    let output = &*output;
    let color = *(uniform[0] as *const Vec3);
    *(output[0] as *mut Vec3) = color;
}

pub fn position_only_vertex_shader() -> ShaderModule {
    ShaderModule { variables_meta: ShaderVariablesMeta { inputs: vec![], outputs: vec![] }, entry: vs_passthrough_pos }
}

pub fn uniform_color_fragment_shader() -> ShaderModule {
    ShaderModule {
        variables_meta: ShaderVariablesMeta {
            inputs: vec![],
            outputs: vec![ShaderStageVariable { format: Format::Rgb32f, location: 0, size: 12, align: 4, interpolator: None }],
        },
        entry: fs_uniform_color,
    }
}

pub fn color_attachment(load_op: LoadOp, store_op: StoreOp) -> AttachmentDescription {
    AttachmentDescription { format: Format::Bgra8u, load_op, store_op, stencil_load_op: LoadOp::DontCare, stencil_store_op: StoreOp::DontCare }
}

pub fn depth_attachment_description(load_op: LoadOp) -> AttachmentDescription {
    AttachmentDescription {
        format: Format::R32f,
        load_op: LoadOp::DontCare,
        store_op: StoreOp::DontCare,
        stencil_load_op: load_op,
        stencil_store_op: StoreOp::Store,
    }
}

/// A render pass with one color attachment (id 0) and one depth
/// attachment (id 1), both used by a single subpass.
pub fn render_pass_with_depth(color_load: LoadOp, color_store: StoreOp) -> RenderPass {
    RenderPass::new(RenderPassCreateInfo {
        attachments: vec![color_attachment(color_load, color_store), depth_attachment_description(LoadOp::Clear)],
        subpasses: vec![SubpassDescription {
            color_attachments: vec![AttachmentReference { id: 0, format: Format::Bgra8u }],
            depth_stencil_attachment: Some(AttachmentReference { id: 1, format: Format::R32f }),
            ..Default::default()
        }],
        dependencies: vec![],
    })
    .unwrap()
}

/// Builds a pipeline whose vertex input is a single `PosVertex` per
/// vertex (location 0, binding 0) and whose fragment shader writes a
/// uniform color, over `render_pass`'s subpass 0.
pub fn solid_color_pipeline(render_pass: &RenderPass, topology: PrimitiveTopology, cull_mode: CullMode) -> GraphicsPipeline {
    GraphicsPipeline::new(GraphicsPipelineCreateInfo {
        render_pass,
        subpass: 0,
        vertex_bindings: vec![VertexInputBindingDescription {
            binding: 0,
            stride: std::mem::size_of::<PosVertex>() as u32,
            input_rate: VertexInputRate::Vertex,
        }],
        vertex_attributes: vec![VertexInputAttributeDescription { location: 0, binding: 0, format: Format::Rgb32f, offset: 0 }],
        vertex_shader: position_only_vertex_shader(),
        fragment_shader: uniform_color_fragment_shader(),
        topology,
        polygon_mode: PolygonMode::Fill,
        cull_mode,
        viewport: Viewport { x: 0.0, y: 0.0, width: 1.0, height: 1.0 },
    })
    .unwrap()
}

pub fn bgra_pixel(buf: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = (y as usize * width as usize + x as usize) * 4;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

pub fn depth_pixel(buf: &[u8], width: u32, x: u32, y: u32) -> f32 {
    let i = (y as usize * width as usize + x as usize) * 4;
    f32::from_le_bytes(buf[i..i + 4].try_into().unwrap())
}
