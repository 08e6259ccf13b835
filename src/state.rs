//! Render-pass state: the bookkeeping layer between a bound render
//! pass/frame buffer and the pipeline's `draw`.
//!
//! Grounded on `spec.md` §4.4 ("pure value/coordinate bookkeeping; all
//! real work lives in the pipeline's `draw`") and, for the exclusivity
//! guard, on the teacher's `sync.rs` RAII fence/semaphore wrappers —
//! generalized here from a process-wide flag (per the design notes'
//! re-architecture) into an `AtomicBool` owned by a [`Renderer`],
//! released by a guard's `Drop`.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, trace};

use crate::descriptors::BindingTable;
use crate::error::{PlaidError, Result};
use crate::format::{match_converter, Format, NumericClass};
use crate::frame::FrameBuffer;
use crate::pipeline::{DrawTarget, GraphicsPipeline};
use crate::render_pass::{LoadOp, RenderPass, StoreOp};

/// A clear value for a color attachment, tagged by the attachment's
/// numeric class so the right union member is read.
#[derive(Debug, Clone, Copy)]
pub enum ClearColor {
    Float([f32; 4]),
    SignedInt([i32; 4]),
    UnsignedInt([u32; 4]),
}

/// A clear value for a depth/stencil attachment. Only the depth half
/// is ever consulted; see [`crate::render_pass::AttachmentDescription`]
/// for why the field driving it is named `stencil_load_op`.
#[derive(Debug, Clone, Copy)]
pub struct ClearDepthStencil {
    pub depth: f32,
    #[allow(dead_code)]
    pub stencil: u32,
}

/// One attachment's clear value, matching §6's `clear_values[i]` union.
#[derive(Debug, Clone, Copy)]
pub enum ClearValue {
    Color(ClearColor),
    DepthStencil(ClearDepthStencil),
}

impl ClearColor {
    fn as_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        match self {
            ClearColor::Float(c) => {
                for (i, v) in c.iter().enumerate() {
                    bytes[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
                }
            }
            ClearColor::SignedInt(c) => {
                for (i, v) in c.iter().enumerate() {
                    bytes[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
                }
            }
            ClearColor::UnsignedInt(c) => {
                for (i, v) in c.iter().enumerate() {
                    bytes[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
                }
            }
        }
        bytes
    }

    /// The format this clear value's bytes are laid out as, so a
    /// converter to the attachment's real format can be found.
    fn source_format(&self) -> Format {
        match self {
            ClearColor::Float(_) => Format::Rgba32f,
            ClearColor::SignedInt(_) | ClearColor::UnsignedInt(_) => Format::Rgba32u,
        }
    }
}

/// Process-wide-free exclusivity token: at most one [`RenderPassState`]
/// may be live per `Renderer` at a time.
#[derive(Default)]
pub struct Renderer {
    in_progress: AtomicBool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer { in_progress: AtomicBool::new(false) }
    }

    /// Begins a render-pass session, failing with
    /// [`PlaidError::RenderPassInProgress`] if one is already open on
    /// this renderer.
    pub fn begin_render_pass<'a>(
        &'a self,
        render_pass: &'a RenderPass,
        frame_buffer: &'a FrameBuffer,
        clear_values: Vec<ClearValue>,
    ) -> Result<RenderPassState<'a>> {
        if self.in_progress.swap(true, Ordering::AcqRel) {
            return Err(PlaidError::RenderPassInProgress);
        }
        let mut state = RenderPassState {
            renderer: self,
            render_pass,
            frame_buffer,
            clear_values,
            current_subpass: 0,
            descriptor_set: BindingTable::new(),
            vertex_buffers: BindingTable::new(),
            index_buffer: None,
        };
        state.load_subpass_attachments();
        info!(target: "caliban_sw::state", "render pass begun: {} subpasses", render_pass.subpasses_count());
        Ok(state)
    }
}

/// A scoped, non-owning view over a bound render pass and frame
/// buffer: current subpass, bound descriptor-set/vertex-buffer
/// tables, and the clear-value array. Releases its renderer's
/// exclusivity flag on `Drop`.
pub struct RenderPassState<'a> {
    renderer: &'a Renderer,
    render_pass: &'a RenderPass,
    frame_buffer: &'a FrameBuffer,
    clear_values: Vec<ClearValue>,
    current_subpass: usize,
    descriptor_set: BindingTable,
    vertex_buffers: BindingTable,
    index_buffer: Option<*const u8>,
}

impl<'a> RenderPassState<'a> {
    pub fn bind_descriptor_set(&mut self, binding: u8, bytes: *const u8) {
        self.descriptor_set.bind(binding, bytes);
    }

    pub fn bind_vertex_buffer(&mut self, binding: u8, bytes: *const u8) {
        self.vertex_buffers.bind(binding, bytes);
    }

    pub fn bind_index_buffer(&mut self, bytes: *const u8) {
        self.index_buffer = Some(bytes);
    }

    /// Advances to the next subpass, loading/clearing its attachments
    /// exactly as [`Renderer::begin_render_pass`] did for subpass 0.
    ///
    /// Attachment load is resolved here rather than inside
    /// [`GraphicsPipeline::draw`]: the spec's draw procedure lists
    /// "attachment load" as its first step, but scenario S2 requires a
    /// second `draw` on the same subpass to see the first draw's
    /// depth writes, so a literal per-draw reload is wrong. Loading
    /// once when a subpass becomes current satisfies both.
    pub fn next_subpass(&mut self) {
        self.current_subpass += 1;
        self.load_subpass_attachments();
        trace!(target: "caliban_sw::state", "advanced to subpass {}", self.current_subpass);
    }

    fn load_subpass_attachments(&self) {
        if self.current_subpass >= self.render_pass.subpasses_count() {
            return;
        }
        let subpass = self.render_pass.subpass(self.current_subpass);
        let width = self.frame_buffer.width() as usize;
        let height = self.frame_buffer.height() as usize;
        if width == 0 || height == 0 {
            return;
        }

        for reference in &subpass.color_attachments {
            let attachment = self.render_pass.attachment(reference.id);
            if attachment.load_op != LoadOp::Clear {
                continue;
            }
            let Some(ClearValue::Color(clear)) = self.clear_values.get(reference.id as usize) else { continue };
            self.fill_attachment(reference.id, attachment.format, clear.source_format(), &clear.as_bytes());
        }

        if let Some(reference) = &subpass.depth_stencil_attachment {
            let attachment = self.render_pass.attachment(reference.id);
            if attachment.stencil_load_op != LoadOp::Clear {
                return;
            }
            let Some(ClearValue::DepthStencil(clear)) = self.clear_values.get(reference.id as usize) else { return };
            self.fill_attachment(reference.id, attachment.format, Format::R32f, &clear.depth.to_le_bytes());
        }
    }

    fn fill_attachment(&self, attachment_id: u8, dst_format: Format, src_format: Format, src_bytes: &[u8]) {
        let Some(converter) = match_converter(src_format, dst_format) else { return };
        let width = self.frame_buffer.width() as usize;
        let height = self.frame_buffer.height() as usize;
        let stride = crate::format::format_size(dst_format) as usize;
        let base = self.frame_buffer.attachment(attachment_id);
        if base.is_null() {
            return;
        }
        for texel in 0..width * height {
            let dst = unsafe { std::slice::from_raw_parts_mut(base.add(texel * stride), stride) };
            converter(src_bytes, dst);
        }
    }

    fn color_attachments(&self) -> Vec<*mut u8> {
        let subpass = self.render_pass.subpass(self.current_subpass);
        subpass.color_attachments.iter().map(|r| self.frame_buffer.attachment(r.id)).collect()
    }

    fn depth_attachment(&self) -> *mut u8 {
        self.render_pass
            .subpass(self.current_subpass)
            .depth_stencil_attachment
            .as_ref()
            .map(|r| self.frame_buffer.attachment(r.id))
            .unwrap_or(std::ptr::null_mut())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        pipeline: &mut GraphicsPipeline,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) -> Result<()> {
        let color_attachments = self.color_attachments();
        let target = DrawTarget {
            width: self.frame_buffer.width(),
            height: self.frame_buffer.height(),
            color_attachments: &color_attachments,
            depth_attachment: self.depth_attachment(),
            descriptor_set: &self.descriptor_set,
            vertex_buffers: &self.vertex_buffers,
        };
        pipeline.draw(&target, vertex_count, instance_count, first_vertex, first_instance, None)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_indexed(
        &self,
        pipeline: &mut GraphicsPipeline,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) -> Result<()> {
        let color_attachments = self.color_attachments();
        let target = DrawTarget {
            width: self.frame_buffer.width(),
            height: self.frame_buffer.height(),
            color_attachments: &color_attachments,
            depth_attachment: self.depth_attachment(),
            descriptor_set: &self.descriptor_set,
            vertex_buffers: &self.vertex_buffers,
        };
        pipeline.draw(&target, vertex_count, instance_count, first_vertex, first_instance, self.index_buffer)
    }
}

impl<'a> Drop for RenderPassState<'a> {
    fn drop(&mut self) {
        self.renderer.in_progress.store(false, Ordering::Release);
    }
}

/// The numeric class a format belongs to, named for pairing a
/// `ClearColor` variant with the attachment it targets.
pub fn expected_clear_variant(format: Format) -> NumericClass {
    format.numeric_class()
}
