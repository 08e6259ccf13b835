//! `store_op = dont_care` skips writing fragment output bytes back to
//! the attachment entirely, so a pre-filled buffer survives a draw
//! byte-for-byte. Mirrors `spec.md` §8 S6. The render pass here also
//! has no depth/stencil attachment at all, exercising the pipeline's
//! null-depth-attachment path (early-Z is skipped, every fragment
//! would otherwise pass).

mod common;

use caliban_sw::{
    AttachmentReference, ClearColor, ClearValue, FrameBuffer, LoadOp, PrimitiveTopology, RenderPass,
    RenderPassCreateInfo, Renderer, StoreOp, SubpassDescription,
};
use common::{color_attachment, solid_color_pipeline};
use caliban_sw::{CullMode, Format};
use common::PosVertex;
use glam::Vec3;

const WIDTH: u32 = 4;
const HEIGHT: u32 = 4;

#[test]
fn dont_care_store_leaves_buffer_untouched() {
    let render_pass = RenderPass::new(RenderPassCreateInfo {
        attachments: vec![color_attachment(LoadOp::Load, StoreOp::DontCare)],
        subpasses: vec![SubpassDescription {
            color_attachments: vec![AttachmentReference { id: 0, format: Format::Bgra8u }],
            ..Default::default()
        }],
        dependencies: vec![],
    })
    .unwrap();
    let mut pipeline = solid_color_pipeline(&render_pass, PrimitiveTopology::TriangleList, CullMode::NONE);

    let pattern: [u8; 4] = 0xDEADBEEFu32.to_le_bytes();
    let mut color_buffer = Vec::with_capacity((WIDTH * HEIGHT * 4) as usize);
    for _ in 0..WIDTH * HEIGHT {
        color_buffer.extend_from_slice(&pattern);
    }
    let before = color_buffer.clone();
    let frame_buffer = unsafe { FrameBuffer::new(WIDTH, HEIGHT, vec![color_buffer.as_mut_ptr()]) };

    let renderer = Renderer::new();
    let mut state = renderer.begin_render_pass(&render_pass, &frame_buffer, vec![ClearValue::Color(ClearColor::Float([0.0; 4]))]).unwrap();
    let vertices = [
        PosVertex { pos: Vec3::new(-4.0, -4.0, 0.5) },
        PosVertex { pos: Vec3::new(4.0, -4.0, 0.5) },
        PosVertex { pos: Vec3::new(0.0, 4.0, 0.5) },
    ];
    let white = Vec3::new(1.0, 1.0, 1.0);
    state.bind_vertex_buffer(0, vertices.as_ptr() as *const u8);
    state.bind_descriptor_set(0, &white as *const Vec3 as *const u8);
    state.draw(&mut pipeline, 3, 1, 0, 0).unwrap();
    drop(state);

    assert_eq!(color_buffer, before, "dont_care store_op must not write any attachment bytes, load_op=load skips the clear too");
}
