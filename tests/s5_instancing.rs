//! Per-instance attribute fetch: a `vec2` offset bound at
//! instance-rate shifts a small unit triangle to three non-overlapping
//! screen positions in a single draw call. Mirrors `spec.md` §8 S5.

mod common;

use caliban_sw::{
    AttachmentReference, ClearColor, ClearValue, ConstSlotTable, CullMode, Format, FrameBuffer, GraphicsPipeline,
    GraphicsPipelineCreateInfo, LoadOp, MutSlotTable, PolygonMode, PrimitiveTopology, RenderPass, RenderPassCreateInfo,
    Renderer, ShaderModule, ShaderStageVariable, ShaderVariablesMeta, StoreOp, SubpassDescription,
    VertexInputAttributeDescription, VertexInputBindingDescription, VertexInputRate, Viewport,
};
use common::{bgra_pixel, color_attachment};
use glam::{Vec2, Vec3, Vec4};

const WIDTH: u32 = 100;
const HEIGHT: u32 = 100;

#[repr(C)]
struct Vertex {
    pos: Vec2,
}
#[repr(C)]
struct InstanceOffset {
    offset: Vec2,
}

unsafe fn vs_instanced(
    _uniform: *const ConstSlotTable,
    input: *const ConstSlotTable,
    _output: *const MutSlotTable,
    builtin: *mut *mut u8,
) {
    let input = &*input;
    let pos = *(input[0] as *const Vec2);
    let offset = *(input[1] as *const Vec2);
    let shifted = pos + offset;
    *((*builtin) as *mut Vec4) = Vec4::new(shifted.x, shifted.y, 0.0, 1.0);
}

unsafe fn fs_uniform_white(
    _uniform: *const ConstSlotTable,
    _input: *const ConstSlotTable,
    output: *const MutSlotTable,
    _builtin: *mut *mut u8,
) {
    let output = &*output;
    *(output[0] as *mut Vec3) = Vec3::new(1.0, 1.0, 1.0);
}

#[test]
fn three_instances_shift_to_non_overlapping_bands() {
    let render_pass = RenderPass::new(RenderPassCreateInfo {
        attachments: vec![color_attachment(LoadOp::Clear, StoreOp::Store)],
        subpasses: vec![SubpassDescription {
            color_attachments: vec![AttachmentReference { id: 0, format: Format::Bgra8u }],
            ..Default::default()
        }],
        dependencies: vec![],
    })
    .unwrap();

    let vertex_shader = ShaderModule { variables_meta: ShaderVariablesMeta { inputs: vec![], outputs: vec![] }, entry: vs_instanced };
    let fragment_shader = ShaderModule {
        variables_meta: ShaderVariablesMeta {
            inputs: vec![],
            outputs: vec![ShaderStageVariable { format: Format::Rgb32f, location: 0, size: 12, align: 4, interpolator: None }],
        },
        entry: fs_uniform_white,
    };

    let mut pipeline = GraphicsPipeline::new(GraphicsPipelineCreateInfo {
        render_pass: &render_pass,
        subpass: 0,
        vertex_bindings: vec![
            VertexInputBindingDescription { binding: 0, stride: std::mem::size_of::<Vertex>() as u32, input_rate: VertexInputRate::Vertex },
            VertexInputBindingDescription { binding: 1, stride: std::mem::size_of::<InstanceOffset>() as u32, input_rate: VertexInputRate::Instance },
        ],
        vertex_attributes: vec![
            VertexInputAttributeDescription { location: 0, binding: 0, format: Format::Rg32f, offset: 0 },
            VertexInputAttributeDescription { location: 1, binding: 1, format: Format::Rg32f, offset: 0 },
        ],
        vertex_shader,
        fragment_shader,
        topology: PrimitiveTopology::TriangleList,
        polygon_mode: PolygonMode::Fill,
        cull_mode: CullMode::NONE,
        viewport: Viewport { x: 0.0, y: 0.0, width: WIDTH as f32, height: HEIGHT as f32 },
    })
    .unwrap();

    let vertices = [
        Vertex { pos: Vec2::new(-0.05, -0.05) },
        Vertex { pos: Vec2::new(0.05, -0.05) },
        Vertex { pos: Vec2::new(0.0, 0.05) },
    ];
    let offsets = [
        InstanceOffset { offset: Vec2::new(0.0, 0.0) },
        InstanceOffset { offset: Vec2::new(0.2, 0.0) },
        InstanceOffset { offset: Vec2::new(0.4, 0.0) },
    ];

    let mut color_buffer = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    let frame_buffer = unsafe { FrameBuffer::new(WIDTH, HEIGHT, vec![color_buffer.as_mut_ptr()]) };

    let renderer = Renderer::new();
    let mut state = renderer.begin_render_pass(&render_pass, &frame_buffer, vec![ClearValue::Color(ClearColor::Float([0.0, 0.0, 0.0, 1.0]))]).unwrap();
    state.bind_vertex_buffer(0, vertices.as_ptr() as *const u8);
    state.bind_vertex_buffer(1, offsets.as_ptr() as *const u8);
    state.draw(&mut pipeline, 3, 3, 0, 0).unwrap();
    drop(state);

    let sentinel = [0x00, 0x00, 0x00, 0x01];
    let white = [0xFF, 0xFF, 0xFF, 0x00];
    // Band centers: ndc 0.0, 0.2, 0.4 -> screen x 50, 60, 70.
    for center in [50u32, 60, 70] {
        assert_eq!(bgra_pixel(&color_buffer, WIDTH, center, 50), white, "band center x={center}");
    }
    // Gaps between bands, and far outside all three, must stay clear.
    for gap in [20u32, 55, 65, 90] {
        assert_eq!(bgra_pixel(&color_buffer, WIDTH, gap, 50), sentinel, "gap x={gap}");
    }
}
