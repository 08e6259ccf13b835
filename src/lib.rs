//! caliban-sw: a single-threaded, CPU-only software implementation of
//! a Vulkan-style rasterizing graphics pipeline.
//!
//! Given a [`render_pass::RenderPass`] description, a
//! [`pipeline::GraphicsPipeline`] (a vertex/fragment shader pair,
//! input layout, topology), vertex/descriptor buffers, and a
//! [`frame::FrameBuffer`] of attachments, this crate rasterizes
//! primitives into the color and depth attachments — no GPU offload,
//! no multithreaded draw execution, no tessellation/geometry/compute
//! stages, no samplers or mipmaps, no MSAA, no blending beyond
//! overwrite, no stencil test logic.
//!
//! The typical session:
//!
//! ```ignore
//! let render_pass = RenderPass::new(render_pass_create_info)?;
//! let mut pipeline = GraphicsPipeline::new(pipeline_create_info)?;
//! let frame_buffer = unsafe { FrameBuffer::new(width, height, attachments) };
//! let renderer = Renderer::new();
//! let mut state = renderer.begin_render_pass(&render_pass, &frame_buffer, clear_values)?;
//! state.bind_vertex_buffer(0, vertices.as_ptr());
//! state.draw(&mut pipeline, vertex_count, 1, 0, 0)?;
//! ```

pub mod buffers;
pub mod commands;
pub mod descriptors;
pub mod error;
pub mod format;
pub mod frame;
pub mod geometry;
pub mod interstage;
pub mod pipeline;
pub mod render_pass;
pub mod shader;
pub mod state;
pub mod vertex;

pub use descriptors::BindingTable;
pub use error::{PlaidError, Result};
pub use format::{Format, NumericClass};
pub use frame::FrameBuffer;
pub use geometry::{Extent2D, Offset2D, Rect2D};
pub use pipeline::{DrawTarget, GraphicsPipeline, GraphicsPipelineCreateInfo};
pub use render_pass::{
    AttachmentDescription, AttachmentReference, LoadOp, RenderPass, RenderPassCreateInfo, StoreOp,
    SubpassDependency, SubpassDescription,
};
pub use shader::{
    ConstSlotTable, EntryFn, InterpolatorFn, MutSlotTable, ShaderModule, ShaderStageVariable, ShaderVariablesMeta,
    SLOT_COUNT,
};
pub use state::{ClearColor, ClearDepthStencil, ClearValue, Renderer, RenderPassState};
pub use vertex::{
    CullMode, PolygonMode, PrimitiveTopology, VertexAttributePlan, VertexInputAttributeDescription,
    VertexInputBindingDescription, VertexInputRate, Viewport,
};
