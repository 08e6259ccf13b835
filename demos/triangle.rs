//! Renders a single coloured triangle with the software pipeline and
//! writes the result to `triangle.png` next to the binary.
//!
//! Mirrors scenario S1 of the design notes (a fullscreen-ish triangle,
//! unlit) but with a per-vertex colour attribute instead of a constant
//! fragment colour, to exercise perspective-correct interpolation.

use anyhow::Result;
use caliban_sw::{
    AttachmentDescription, AttachmentReference, ClearColor, ClearDepthStencil, ClearValue, ConstSlotTable, CullMode,
    Format, FrameBuffer, GraphicsPipeline, GraphicsPipelineCreateInfo, LoadOp, MutSlotTable, PolygonMode,
    PrimitiveTopology, RenderPass, RenderPassCreateInfo, Renderer, ShaderModule, ShaderStageVariable,
    ShaderVariablesMeta, StoreOp, SubpassDescription, VertexInputAttributeDescription, VertexInputBindingDescription,
    VertexInputRate, Viewport,
};
use glam::{Vec2, Vec3, Vec4};
use log::info;

const WIDTH: u32 = 256;
const HEIGHT: u32 = 256;

#[repr(C)]
struct Vertex {
    pos: Vec2,
    color: Vec3,
}

unsafe fn vertex_entry(
    _uniform: *const ConstSlotTable,
    input: *const ConstSlotTable,
    output: *const MutSlotTable,
    builtin: *mut *mut u8,
) {
    let input = &*input;
    let output = &*output;
    let pos = *(input[0] as *const Vec2);
    let color = *(input[1] as *const Vec3);
    *(output[0] as *mut Vec3) = color;
    *((*builtin) as *mut Vec4) = Vec4::new(pos.x, pos.y, 0.5, 1.0);
}

unsafe fn fragment_entry(
    _uniform: *const ConstSlotTable,
    input: *const ConstSlotTable,
    output: *const MutSlotTable,
    _builtin: *mut *mut u8,
) {
    let input = &*input;
    let output = &*output;
    let color = *(input[0] as *const Vec3);
    *(output[0] as *mut Vec3) = color;
}

fn main() -> Result<()> {
    std::env::set_var("RUST_LOG", "info");
    pretty_env_logger::init();

    let render_pass = RenderPass::new(RenderPassCreateInfo {
        attachments: vec![
            AttachmentDescription {
                format: Format::Bgra8u,
                load_op: LoadOp::Clear,
                store_op: StoreOp::Store,
                stencil_load_op: LoadOp::DontCare,
                stencil_store_op: StoreOp::DontCare,
            },
            AttachmentDescription {
                format: Format::R32f,
                load_op: LoadOp::Clear,
                store_op: StoreOp::DontCare,
                stencil_load_op: LoadOp::Clear,
                stencil_store_op: StoreOp::DontCare,
            },
        ],
        subpasses: vec![SubpassDescription {
            color_attachments: vec![AttachmentReference { id: 0, format: Format::Bgra8u }],
            depth_stencil_attachment: Some(AttachmentReference { id: 1, format: Format::R32f }),
            ..Default::default()
        }],
        dependencies: vec![],
    })?;

    let vertex_shader = ShaderModule {
        variables_meta: ShaderVariablesMeta {
            inputs: vec![],
            outputs: vec![ShaderStageVariable {
                format: Format::Rgb32f,
                location: 0,
                size: 12,
                align: 4,
                interpolator: None,
            }],
        },
        entry: vertex_entry,
    };
    let fragment_shader = ShaderModule {
        variables_meta: ShaderVariablesMeta {
            inputs: vec![ShaderStageVariable {
                format: Format::Rgb32f,
                location: 0,
                size: 12,
                align: 4,
                interpolator: Some(caliban_sw::shader::interpolate_vec3),
            }],
            outputs: vec![ShaderStageVariable {
                format: Format::Rgb32f,
                location: 0,
                size: 12,
                align: 4,
                interpolator: None,
            }],
        },
        entry: fragment_entry,
    };

    let mut pipeline = GraphicsPipeline::new(GraphicsPipelineCreateInfo {
        render_pass: &render_pass,
        subpass: 0,
        vertex_bindings: vec![VertexInputBindingDescription {
            binding: 0,
            stride: std::mem::size_of::<Vertex>() as u32,
            input_rate: VertexInputRate::Vertex,
        }],
        vertex_attributes: vec![
            VertexInputAttributeDescription { location: 0, binding: 0, format: Format::Rg32f, offset: 0 },
            VertexInputAttributeDescription { location: 1, binding: 0, format: Format::Rgb32f, offset: 8 },
        ],
        vertex_shader,
        fragment_shader,
        topology: PrimitiveTopology::TriangleList,
        polygon_mode: PolygonMode::Fill,
        cull_mode: CullMode::BACK,
        viewport: Viewport { x: 0.0, y: 0.0, width: WIDTH as f32, height: HEIGHT as f32 },
    })?;

    let vertices = [
        Vertex { pos: Vec2::new(0.0, -0.8), color: Vec3::new(1.0, 0.0, 0.0) },
        Vertex { pos: Vec2::new(0.8, 0.8), color: Vec3::new(0.0, 1.0, 0.0) },
        Vertex { pos: Vec2::new(-0.8, 0.8), color: Vec3::new(0.0, 0.0, 1.0) },
    ];

    let mut color_buffer = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    let mut depth_buffer = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    let frame_buffer =
        unsafe { FrameBuffer::new(WIDTH, HEIGHT, vec![color_buffer.as_mut_ptr(), depth_buffer.as_mut_ptr()]) };

    let renderer = Renderer::new();
    let mut state = renderer.begin_render_pass(
        &render_pass,
        &frame_buffer,
        vec![
            ClearValue::Color(ClearColor::Float([0.0, 0.0, 0.0, 1.0])),
            ClearValue::DepthStencil(ClearDepthStencil { depth: 1.0, stencil: 0 }),
        ],
    )?;
    state.bind_vertex_buffer(0, vertices.as_ptr() as *const u8);
    state.draw(&mut pipeline, 3, 1, 0, 0)?;
    drop(state);

    let path = "triangle.png";
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(writer, WIDTH, HEIGHT);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    let mut rgba = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    for texel in 0..(WIDTH * HEIGHT) as usize {
        let b = color_buffer[texel * 4];
        let g = color_buffer[texel * 4 + 1];
        let r = color_buffer[texel * 4 + 2];
        let a = color_buffer[texel * 4 + 3];
        rgba[texel * 4] = r;
        rgba[texel * 4 + 1] = g;
        rgba[texel * 4 + 2] = b;
        rgba[texel * 4 + 3] = a;
    }
    writer.write_image_data(&rgba)?;

    info!("wrote {path}");
    Ok(())
}
