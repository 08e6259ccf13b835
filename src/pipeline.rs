//! The graphics pipeline: shader-I/O layout planning at construction,
//! and the clip/rasterize/shade/blit draw loop at execution time.
//!
//! This is the core of the crate. Grounded on `spec.md` §4.5/§4.6 for
//! the algorithm itself, and on the teacher's `pipeline.rs` for the
//! shape of the module: a `*CreateInfo` struct consumed by a
//! fallible constructor, heavy doc comments on the non-obvious steps,
//! sparser ones on the mechanical parts — the same imbalance the
//! teacher's own `create_pipeline`/`create_render_pass` show.

use glam::{Vec3, Vec4};
use log::{info, trace, warn};

use crate::commands::{clip_triangle, fan_triangulate, ClipVertex};
use crate::descriptors::BindingTable;
use crate::error::{PlaidError, Result};
use crate::format::{match_converter, ConverterFn, Format};
use crate::interstage::AlignedBuffer;
use crate::render_pass::{RenderPass, StoreOp, SubpassDescription};
use crate::shader::{ConstSlotTable, MutSlotTable, ShaderModule, ShaderStageVariable, SLOT_COUNT};
use crate::vertex::{
    CullMode, PolygonMode, PrimitiveTopology, VertexAttributePlan, VertexInputAttributeDescription,
    VertexInputBindingDescription, VertexInputRate, Viewport,
};

/// Three rolling slots hold the currently-assembled triangle's shaded
/// vertex outputs (reused across triangles in strip mode); three more
/// are scratch for vertices a clip plane introduced, one per fan
/// subtriangle position, freshly (re)synthesized before each
/// subtriangle is rasterized. This is a generalization of the design
/// notes' literal "three vertex slots plus one fragment-input alias"
/// description: that description only accounts for a whole-vertex
/// barycentric blend, not for re-deriving a clip-introduced vertex's
/// *own* full attribute set first. See DESIGN.md for the writeup.
const ROLLING_SLOTS: usize = 3;
const SYNTH_SLOTS: usize = 3;
const FRAGMENT_INPUT_SLOT: usize = ROLLING_SLOTS + SYNTH_SLOTS;
const VERTEX_OUTPUT_SLOTS: usize = FRAGMENT_INPUT_SLOT + 1;

/// Per-location offset inside a planned interstage struct.
#[derive(Debug, Clone, Copy)]
struct PlannedVariable {
    location: u8,
    offset: u32,
    size: u32,
}

/// Lays out `vars` as a single packed struct: sorts by alignment
/// ascending and sweeps once to compute each variable's offset,
/// following §4.5 step 4 literally (ascending, not the usual
/// descending-for-least-padding order — the spec fixes this, and
/// nothing here depends on padding efficiency).
///
/// Returns the per-variable offsets, the struct's total size (itself
/// rounded up to the struct's own alignment, so arrays of it pack
/// cleanly) and the maximum alignment among `vars`.
fn plan_struct_layout(vars: &[ShaderStageVariable]) -> (Vec<PlannedVariable>, u32, u32) {
    let mut order: Vec<&ShaderStageVariable> = vars.iter().collect();
    order.sort_by_key(|v| v.align);

    let mut offset = 0u32;
    let mut max_align = 1u32;
    let mut planned = Vec::with_capacity(order.len());
    for v in order {
        let align = v.align.max(1);
        offset = align_up(offset, align);
        planned.push(PlannedVariable { location: v.location, offset, size: v.size });
        offset += v.size;
        max_align = max_align.max(align);
    }
    let size = align_up(offset, max_align);
    (planned, size, max_align)
}

fn align_up(offset: u32, align: u32) -> u32 {
    (offset + align - 1) / align * align
}

/// Where a fragment-shader output's bytes end up: which position in
/// the subpass's color-attachment list (what `DrawTarget::
/// color_attachments` is actually indexed by — see `crate::state`'s
/// `color_attachments()`, not the frame-buffer-wide attachment id),
/// how far apart consecutive texels are (0 when `store_op` is
/// `dont_care`, meaning "don't write"), and the converter from the
/// shader's output format to the attachment's format.
#[derive(Debug, Clone, Copy)]
struct FragmentOutputBinding {
    /// Frame-buffer-wide attachment id, kept only for diagnostics.
    attachment_id: u8,
    /// Index into the subpass's own color-attachment array — and so
    /// into `DrawTarget::color_attachments`, which is built from that
    /// same array.
    subpass_color_index: usize,
    attachment_stride: u32,
    converter: ConverterFn,
}

/// Construction input for [`GraphicsPipeline::new`].
pub struct GraphicsPipelineCreateInfo<'a> {
    pub render_pass: &'a RenderPass,
    pub subpass: usize,
    pub vertex_bindings: Vec<VertexInputBindingDescription>,
    pub vertex_attributes: Vec<VertexInputAttributeDescription>,
    pub vertex_shader: ShaderModule,
    pub fragment_shader: ShaderModule,
    pub topology: PrimitiveTopology,
    pub polygon_mode: PolygonMode,
    pub cull_mode: CullMode,
    pub viewport: Viewport,
}

impl<'a> GraphicsPipelineCreateInfo<'a> {
    fn subpass(&self) -> &SubpassDescription {
        self.render_pass.subpass(self.subpass)
    }
}

/// The pipeline engine: owns its precomputed shader-I/O layout and
/// its single interstage heap block, and exposes `draw`/`draw_indexed`.
pub struct GraphicsPipeline {
    topology: PrimitiveTopology,
    #[allow(dead_code)]
    polygon_mode: PolygonMode,
    cull_mode: CullMode,
    viewport: Viewport,

    per_vertex_attributes: Vec<VertexAttributePlan>,
    per_instance_attributes: Vec<VertexAttributePlan>,

    vertex_shader: ShaderModule,
    fragment_shader: ShaderModule,

    /// Per-location offsets shared by every vertex-output-shaped slot
    /// (the rolling triangle, the synthesis scratch, and the final
    /// fragment-input slot all share this one layout).
    interstage_layout: Vec<PlannedVariable>,
    vertex_output_stride: u32,

    fragment_output_layout: Vec<PlannedVariable>,
    fragment_output_size: u32,

    fragment_output_bindings: Vec<(u8, FragmentOutputBinding)>,

    heap: AlignedBuffer,
}

impl GraphicsPipeline {
    /// Plans vertex-input fetch, shader-I/O layout and fragment-output
    /// attachment bindings, then allocates the pipeline's single
    /// interstage heap block. See §4.5 of the design notes for the
    /// exact planning algorithm.
    pub fn new(create_info: GraphicsPipelineCreateInfo) -> Result<Self> {
        // Step 2-3: a 256-wide map of binding -> stride/input_rate,
        // then partition attributes by their binding's input rate.
        let mut binding_stride = [0u32; SLOT_COUNT];
        let mut binding_rate: [Option<VertexInputRate>; SLOT_COUNT] = [None; SLOT_COUNT];
        for binding in &create_info.vertex_bindings {
            binding_stride[binding.binding as usize] = binding.stride;
            binding_rate[binding.binding as usize] = Some(binding.input_rate);
        }

        let mut per_vertex_attributes = Vec::new();
        let mut per_instance_attributes = Vec::new();
        for attribute in &create_info.vertex_attributes {
            let plan = VertexAttributePlan {
                location: attribute.location,
                binding: attribute.binding,
                stride: binding_stride[attribute.binding as usize],
                offset: attribute.offset,
            };
            match binding_rate[attribute.binding as usize] {
                Some(VertexInputRate::Instance) => per_instance_attributes.push(plan),
                _ => per_vertex_attributes.push(plan),
            }
        }

        // Step 4: plan the interstage layout. Every vertex-output-shaped
        // slot (rolling triangle, clip-synthesis scratch, final
        // fragment input) shares this one layout; the fragment-output
        // region is planned independently.
        let (interstage_layout, vertex_output_stride, vertex_align) =
            plan_struct_layout(&create_info.vertex_shader.variables_meta.outputs);
        let (fragment_output_layout, fragment_output_size, fragment_align) =
            plan_struct_layout(&create_info.fragment_shader.variables_meta.outputs);

        let align = vertex_align.max(fragment_align);
        let total_size = VERTEX_OUTPUT_SLOTS as u32 * vertex_output_stride + fragment_output_size;
        if total_size == 0 {
            return Err(PlaidError::OutOfMemory);
        }
        let heap = AlignedBuffer::new(total_size as usize, align.max(1) as usize)?;

        // Step 6: resolve each fragment-shader output against the
        // subpass's color attachments, at the matching location.
        let subpass = create_info.subpass();
        let mut fragment_output_bindings = Vec::new();
        for output in &create_info.fragment_shader.variables_meta.outputs {
            let subpass_color_index = output.location as usize;
            let Some(reference) = subpass.color_attachments.get(subpass_color_index) else {
                continue;
            };
            let attachment = create_info.render_pass.attachment(reference.id);
            let attachment_stride =
                if attachment.store_op == StoreOp::Store { crate::format::format_size(attachment.format) } else { 0 };
            let converter = match_converter(output.format, attachment.format).ok_or(
                PlaidError::UnsupportedFormatConversion { src: output.format, dst: attachment.format },
            )?;
            fragment_output_bindings.push((
                output.location,
                FragmentOutputBinding {
                    attachment_id: reference.id,
                    subpass_color_index,
                    attachment_stride,
                    converter,
                },
            ));
        }

        info!(
            target: "caliban_sw::pipeline",
            "pipeline built: vertex_output_stride={vertex_output_stride} fragment_output_size={fragment_output_size} heap_bytes={total_size}"
        );

        Ok(GraphicsPipeline {
            topology: create_info.topology,
            polygon_mode: create_info.polygon_mode,
            cull_mode: create_info.cull_mode,
            viewport: create_info.viewport,
            per_vertex_attributes,
            per_instance_attributes,
            vertex_shader: create_info.vertex_shader,
            fragment_shader: create_info.fragment_shader,
            interstage_layout,
            vertex_output_stride,
            fragment_output_layout,
            fragment_output_size,
            fragment_output_bindings,
            heap,
        })
    }

    fn vertex_output_slot_base(&self, slot: usize) -> *mut u8 {
        unsafe { self.heap.as_ptr().add(slot * self.vertex_output_stride as usize) }
    }

    fn fragment_output_base(&self) -> *mut u8 {
        unsafe { self.heap.as_ptr().add(VERTEX_OUTPUT_SLOTS * self.vertex_output_stride as usize) }
    }

    fn vertex_output_ptr(&self, slot: usize, location: u8) -> *const u8 {
        self.interstage_layout
            .iter()
            .find(|v| v.location == location)
            .map(|v| unsafe { self.vertex_output_slot_base(slot).add(v.offset as usize) as *const u8 })
            .unwrap_or(std::ptr::null())
    }

    fn build_vertex_output_table(&self, slot: usize) -> MutSlotTable {
        let mut table: MutSlotTable = [std::ptr::null_mut(); SLOT_COUNT];
        let base = self.vertex_output_slot_base(slot);
        for v in &self.interstage_layout {
            table[v.location as usize] = unsafe { base.add(v.offset as usize) };
        }
        table
    }

    fn build_fragment_output_table(&self) -> MutSlotTable {
        let mut table: MutSlotTable = [std::ptr::null_mut(); SLOT_COUNT];
        let base = self.fragment_output_base();
        for v in &self.fragment_output_layout {
            table[v.location as usize] = unsafe { base.add(v.offset as usize) };
        }
        table
    }

    /// Runs the full `draw`/`draw_indexed` procedure described in
    /// §4.6. Attachment load is the caller's (the render-pass state's)
    /// responsibility at subpass-begin time, not repeated here — see
    /// `crate::state` for why.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        frame: &DrawTarget,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
        index_buffer: Option<*const u8>,
    ) -> Result<()> {
        if frame.width == 0 || frame.height == 0 {
            return Ok(());
        }
        if vertex_count < 3 {
            return Ok(());
        }
        #[cfg(feature = "validate")]
        self.revalidate_interstage_layout();
        match self.topology {
            PrimitiveTopology::TriangleList => {
                self.draw_triangle_list(frame, vertex_count, instance_count, first_vertex, first_instance, index_buffer)
            }
            PrimitiveTopology::TriangleStrip => {
                self.draw_triangle_strip(frame, vertex_count, instance_count, first_vertex, first_instance, index_buffer)
            }
            PrimitiveTopology::LineStrip => Err(PlaidError::UnsupportedTopology("line_strip")),
        }
    }

    /// Re-derives the interstage layout from the shader's declared
    /// outputs and checks it still matches what construction computed.
    /// Gated behind the `validate` feature (see `SPEC_FULL.md` §2):
    /// cheap enough to run every draw in a debug build, wasted work in
    /// release, where the layout cannot change after construction
    /// anyway (the pipeline holds no `&mut` to its shader modules
    /// between draws).
    #[cfg(feature = "validate")]
    fn revalidate_interstage_layout(&self) {
        let (recomputed, stride, _align) = plan_struct_layout(&self.vertex_shader.variables_meta.outputs);
        debug_assert_eq!(stride, self.vertex_output_stride, "vertex-output stride drifted since construction");
        debug_assert_eq!(recomputed.len(), self.interstage_layout.len(), "vertex-output variable count drifted");
        let (recomputed_fs, fs_size, _) = plan_struct_layout(&self.fragment_shader.variables_meta.outputs);
        debug_assert_eq!(fs_size, self.fragment_output_size, "fragment-output size drifted since construction");
        debug_assert_eq!(recomputed_fs.len(), self.fragment_output_layout.len(), "fragment-output variable count drifted");
    }

    fn fetch_vertex_input_table(
        &self,
        vertex_buffers: &BindingTable,
        attributes: &[VertexAttributePlan],
        fetch_index: u32,
    ) -> ConstSlotTable {
        let mut table: ConstSlotTable = [std::ptr::null(); SLOT_COUNT];
        for attribute in attributes {
            let base = vertex_buffers.get(attribute.binding);
            if base.is_null() {
                continue;
            }
            let element_offset = fetch_index as usize * attribute.stride as usize + attribute.offset as usize;
            table[attribute.location as usize] = unsafe { base.add(element_offset) };
        }
        table
    }

    fn invoke_vertex_shader(
        &self,
        descriptor_set: &BindingTable,
        vertex_buffers: &BindingTable,
        per_instance_table: &ConstSlotTable,
        fetch_index: u32,
        output_slot: usize,
    ) -> Vec4 {
        let mut input_table = self.fetch_vertex_input_table(vertex_buffers, &self.per_vertex_attributes, fetch_index);
        for (location, ptr) in per_instance_table.iter().enumerate() {
            if !ptr.is_null() {
                input_table[location] = *ptr;
            }
        }
        let output_table = self.build_vertex_output_table(output_slot);
        let mut clip_position = Vec4::ZERO;
        let mut builtin: *mut u8 = &mut clip_position as *mut Vec4 as *mut u8;
        unsafe {
            (self.vertex_shader.entry)(
                descriptor_set.as_slots() as *const ConstSlotTable,
                &input_table as *const ConstSlotTable,
                &output_table as *const MutSlotTable,
                &mut builtin as *mut *mut u8,
            );
        }
        clip_position
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_triangle_list(
        &mut self,
        frame: &DrawTarget,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
        index_buffer: Option<*const u8>,
    ) -> Result<()> {
        let triangle_count = vertex_count / 3;
        for instance in first_instance..first_instance + instance_count {
            let per_instance_table =
                self.fetch_vertex_input_table(frame.vertex_buffers, &self.per_instance_attributes, instance);
            for t in 0..triangle_count {
                let mut clip = [Vec4::ZERO; ROLLING_SLOTS];
                for k in 0..ROLLING_SLOTS {
                    let logical = first_vertex + t * 3 + k as u32;
                    let fetch_index = unsafe { crate::buffers::vertex_fetch_offset(index_buffer, logical) };
                    clip[k] = self.invoke_vertex_shader(
                        frame.descriptor_set,
                        frame.vertex_buffers,
                        &per_instance_table,
                        fetch_index,
                        k,
                    );
                }
                self.clip_and_rasterize(frame, clip, [0, 1, 2])?;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_triangle_strip(
        &mut self,
        frame: &DrawTarget,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
        index_buffer: Option<*const u8>,
    ) -> Result<()> {
        for instance in first_instance..first_instance + instance_count {
            let per_instance_table =
                self.fetch_vertex_input_table(frame.vertex_buffers, &self.per_instance_attributes, instance);

            // Rolling triangle: slot `ring[k]` holds logical vertex
            // `k` of the currently-assembled triangle. The first
            // three logical vertices each get a fresh slot; from the
            // fourth on, only the newest vertex is (re)shaded, into
            // the slot that held the oldest one (state machine in
            // §4.6.3: (0,1,2) -> (3,1,2) -> (3,4,2) -> (3,4,5) -> …,
            // here taken modulo `ROLLING_SLOTS` instead of growing
            // unbounded).
            let mut clip = [Vec4::ZERO; ROLLING_SLOTS];
            let ring = [0usize, 1, 2];
            let first_count = ROLLING_SLOTS.min(vertex_count as usize) as u32;
            for k in 0..first_count {
                let logical = first_vertex + k;
                let fetch_index = unsafe { crate::buffers::vertex_fetch_offset(index_buffer, logical) };
                clip[k as usize] =
                    self.invoke_vertex_shader(frame.descriptor_set, frame.vertex_buffers, &per_instance_table, fetch_index, ring[k as usize]);
            }
            if vertex_count >= 3 {
                self.clip_and_rasterize(frame, clip, ring)?;
            }

            let mut oldest = 0usize;
            for i in 3..vertex_count {
                let logical = first_vertex + i;
                let fetch_index = unsafe { crate::buffers::vertex_fetch_offset(index_buffer, logical) };
                let slot = ring[oldest];
                clip[oldest] =
                    self.invoke_vertex_shader(frame.descriptor_set, frame.vertex_buffers, &per_instance_table, fetch_index, slot);
                oldest = (oldest + 1) % ROLLING_SLOTS;
                self.clip_and_rasterize(frame, clip, ring)?;
            }
        }
        Ok(())
    }

    /// Clips one triangle (given as clip-space positions `clip[0..3]`
    /// and the rolling-triangle slots those positions live in),
    /// fan-triangulates the clipped polygon, and rasterizes each
    /// resulting subtriangle.
    fn clip_and_rasterize(&mut self, frame: &DrawTarget, clip: [Vec4; ROLLING_SLOTS], slots: [usize; ROLLING_SLOTS]) -> Result<()> {
        let polygon = clip_triangle(clip[0], clip[1], clip[2]);
        if polygon.len() < 3 {
            trace!(target: "caliban_sw::pipeline", "triangle fully clipped away");
            return Ok(());
        }

        for (a, b, c) in fan_triangulate(polygon.len()) {
            let tri = [polygon[a], polygon[b], polygon[c]];
            self.rasterize(frame, tri, slots)?;
        }
        Ok(())
    }

    /// Synthesizes a clip-introduced vertex's full attribute set by
    /// interpolating all three original rolling-triangle vertices
    /// with its barycentric weight, writing the result into scratch
    /// slot `ROLLING_SLOTS + synth_index`.
    ///
    /// Using the barycentric weight against all three original
    /// vertices (rather than chaining through whichever two
    /// polygon-local vertices a single clip plane produced this one
    /// from) is what makes this correct for vertices that cross more
    /// than one clip plane: `ClipVertex::bary` already composes that
    /// chain, see `crate::commands`.
    fn synthesize_clipped_vertex(&self, v: &ClipVertex, original_slots: [usize; ROLLING_SLOTS], synth_index: usize) {
        let target_slot = ROLLING_SLOTS + synth_index;
        let bases = original_slots.map(|slot| self.vertex_output_slot_base(slot));
        let dst_base = self.vertex_output_slot_base(target_slot);
        for var in &self.interstage_layout {
            let Some(interpolator) = self
                .fragment_shader
                .variables_meta
                .inputs
                .iter()
                .find(|input| input.location == var.location)
                .and_then(|input| input.interpolator)
            else {
                continue;
            };
            let src = bases.map(|base| unsafe { base.add(var.offset as usize) } as *const u8);
            let dst = unsafe { dst_base.add(var.offset as usize) };
            unsafe { interpolator(src, v.bary, dst) };
        }
    }

    /// Resolves each of a subtriangle's three clip-polygon vertices to
    /// a concrete vertex-output-shaped slot: an original rolling slot
    /// for unclipped vertices (barycentric weight exactly `1.0` on one
    /// original vertex), or a freshly synthesized scratch slot (see
    /// [`Self::synthesize_clipped_vertex`]) for clip-introduced ones.
    fn resolve_triangle_slots(&self, tri: &[ClipVertex; 3], original_slots: [usize; ROLLING_SLOTS]) -> [usize; 3] {
        let mut resolved = [0usize; 3];
        for (i, v) in tri.iter().enumerate() {
            if let Some(k) = v.bary.iter().position(|&w| w == 1.0) {
                resolved[i] = original_slots[k];
            } else {
                self.synthesize_clipped_vertex(v, original_slots, i);
                resolved[i] = ROLLING_SLOTS + i;
            }
        }
        resolved
    }

    fn rasterize(&mut self, frame: &DrawTarget, tri: [ClipVertex; 3], original_slots: [usize; ROLLING_SLOTS]) -> Result<()> {
        let resolved_slots = self.resolve_triangle_slots(&tri, original_slots);

        let width = frame.width as f32;
        let height = frame.height as f32;
        let mut view = [Vec4::ZERO; 3];
        for (i, v) in tri.iter().enumerate() {
            let p = v.position;
            view[i] =
                Vec4::new((p.x / p.w + 1.0) / 2.0 * width, (p.y / p.w + 1.0) / 2.0 * height, p.z / p.w, p.w);
        }

        let ab = (view[1] - view[0]).truncate();
        let ac = (view[2] - view[0]).truncate();
        let signed_area = ab.x * ac.y - ab.y * ac.x;
        if signed_area == 0.0 {
            return Ok(());
        }
        let front_facing = signed_area < 0.0;
        let culled = match self.cull_mode {
            c if c.contains(CullMode::FRONT) && c.contains(CullMode::BACK) => true,
            c if c.contains(CullMode::FRONT) => front_facing,
            c if c.contains(CullMode::BACK) => !front_facing,
            _ => false,
        };
        if culled {
            return Ok(());
        }

        let l = view.iter().map(|v| v.x.floor()).fold(f32::INFINITY, f32::min).max(0.0) as i32;
        let r =
            view.iter().map(|v| v.x.floor()).fold(f32::NEG_INFINITY, f32::max).min(frame.width as f32 - 1.0) as i32;
        let t = view.iter().map(|v| v.y.floor()).fold(f32::INFINITY, f32::min).max(0.0) as i32;
        let b =
            view.iter().map(|v| v.y.floor()).fold(f32::NEG_INFINITY, f32::max).min(frame.height as f32 - 1.0) as i32;

        let a = view[0];
        let bv = view[1];
        let cv = view[2];
        let ab2 = bv - a;
        let ac2 = cv - a;
        let m = ab2.x * ac2.y - ab2.y * ac2.x;
        if m == 0.0 {
            return Ok(());
        }

        for y in t..=b {
            for x in l..=r {
                let p = Vec4::new(x as f32 + 0.5, y as f32 + 0.5, 0.0, 0.0);
                let ap = p - a;
                let um = ac2.x * ap.y - ac2.y * ap.x;
                let vm = ap.x * ab2.y - ap.y * ab2.x;
                let u = um / m;
                let v = vm / m;
                if u < 0.0 || v < 0.0 || u + v > 1.0 {
                    continue;
                }
                let pb = 1.0 - u - v;
                let cz = pb * view[0].z + u * view[1].z + v * view[2].z;

                // A subpass is not required to bind a depth/stencil
                // attachment (`spec.md` §3: `depth_stencil_attachment?`
                // is optional); with none bound there is no buffer to
                // test or write against, so early-Z is skipped and
                // every fragment passes.
                let depth_ptr = if frame.depth_attachment.is_null() {
                    None
                } else {
                    Some(unsafe {
                        frame.depth_attachment.add((y as usize * frame.width as usize + x as usize) * 4) as *mut f32
                    })
                };
                if let Some(depth_ptr) = depth_ptr {
                    let stored = unsafe { *depth_ptr };
                    if !(cz < stored) {
                        continue;
                    }
                    unsafe { *depth_ptr = cz };
                }

                let k_inv = 1.0 / (pb * view[0].z + u * view[1].z + v * view[2].z);
                let weights = [pb * view[0].z * k_inv, u * view[1].z * k_inv, v * view[2].z * k_inv];

                let fragment_input_table = self.build_vertex_output_table(FRAGMENT_INPUT_SLOT);
                for input in &self.fragment_shader.variables_meta.inputs {
                    let Some(interpolator) = input.interpolator else { continue };
                    let src = [0usize, 1, 2].map(|i| self.vertex_output_ptr(resolved_slots[i], input.location));
                    let dst = fragment_input_table[input.location as usize];
                    if dst.is_null() || src.iter().any(|p| p.is_null()) {
                        continue;
                    }
                    unsafe { interpolator(src, weights, dst) };
                }

                let fragment_output_table = self.build_fragment_output_table();
                let mut fragcoord = Vec3::new(x as f32 + 0.5, y as f32 + 0.5, cz);
                let mut builtin: *mut u8 = &mut fragcoord as *mut Vec3 as *mut u8;
                unsafe {
                    (self.fragment_shader.entry)(
                        frame.descriptor_set.as_slots() as *const ConstSlotTable,
                        (&fragment_input_table as *const MutSlotTable).cast::<ConstSlotTable>(),
                        &fragment_output_table as *const MutSlotTable,
                        &mut builtin as *mut *mut u8,
                    );
                }

                for (location, binding) in &self.fragment_output_bindings {
                    if binding.attachment_stride == 0 {
                        continue;
                    }
                    let src_ptr = fragment_output_table[*location as usize];
                    if src_ptr.is_null() {
                        continue;
                    }
                    let Some(&attachment_ptr) = frame.color_attachments.get(binding.subpass_color_index) else {
                        warn!(
                            target: "caliban_sw::pipeline",
                            "fragment output bound to attachment {} has no matching subpass color attachment",
                            binding.attachment_id
                        );
                        continue;
                    };
                    if attachment_ptr.is_null() {
                        warn!(
                            target: "caliban_sw::pipeline",
                            "fragment output bound to unattached attachment {}", binding.attachment_id
                        );
                        continue;
                    }
                    let dst_offset = (y as usize * frame.width as usize + x as usize) * binding.attachment_stride as usize;
                    let src_size = self
                        .fragment_output_layout
                        .iter()
                        .find(|v| v.location == *location)
                        .map(|v| v.size as usize)
                        .unwrap_or(0);
                    let src = unsafe { std::slice::from_raw_parts(src_ptr, src_size) };
                    let dst = unsafe {
                        std::slice::from_raw_parts_mut(attachment_ptr.add(dst_offset), binding.attachment_stride as usize)
                    };
                    (binding.converter)(src, dst);
                }
            }
        }
        Ok(())
    }

    pub fn fragment_output_format(&self) -> Option<Format> {
        self.fragment_shader.variables_meta.outputs.first().map(|v| v.format)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

/// Everything a single `draw` call needs from the bound render-pass
/// state: the frame's extent, the color/depth attachment pointers
/// already resolved for the current subpass, and the bound
/// descriptor-set/vertex-buffer tables.
///
/// Kept separate from [`crate::state::RenderPassState`] so the
/// pipeline engine never depends on the state module, matching the
/// spec's "the state forwards the draw to the pipeline, which reads
/// its bound resources from the state" data flow without creating a
/// dependency cycle between the two modules.
pub struct DrawTarget<'a> {
    pub width: u32,
    pub height: u32,
    pub color_attachments: &'a [*mut u8],
    pub depth_attachment: *mut u8,
    pub descriptor_set: &'a BindingTable,
    pub vertex_buffers: &'a BindingTable,
}
