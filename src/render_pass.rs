//! Render pass: the immutable description of which attachments exist
//! and how subpasses use them.
//!
//! Grounded on `original_source/core/include/plaid/render_pass.h` and
//! `core/src/render_pass.cpp`, which construct a `render_pass` by deep
//! copying the caller's attachment/subpass arrays (including each
//! subpass's own reference arrays) so the caller's arrays may be
//! freed or reused immediately after the call.

use crate::error::{PlaidError, Result};
use crate::format::Format;

/// What happens to an attachment's prior contents when a subpass
/// using it begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOp {
    Load,
    Clear,
    DontCare,
}

/// What happens to an attachment's contents when a subpass using it
/// ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Store,
    DontCare,
}

/// How a render pass will use one attachment slot.
///
/// `stencil_load_op`/`stencil_store_op` are, per the original source,
/// actually read for the *depth* clear/store behavior of a combined
/// depth/stencil attachment — this crate keeps the field names as
/// specified rather than renaming them to `depth_load_op`, since no
/// stencil test logic exists to give the "correct" name any meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentDescription {
    pub format: Format,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
}

/// A reference from a subpass to one of the render pass's attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentReference {
    pub id: u8,
    pub format: Format,
}

/// One coherent step within a render pass, naming the attachments it
/// reads and writes.
#[derive(Debug, Clone, Default)]
pub struct SubpassDescription {
    pub input_attachments: Vec<AttachmentReference>,
    pub color_attachments: Vec<AttachmentReference>,
    pub depth_stencil_attachment: Option<AttachmentReference>,
}

/// A sub-pass-to-subpass ordering constraint. Accepted for API
/// fidelity but not yet used: the engine has no cross-subpass barrier
/// logic to enforce against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubpassDependency {
    pub src_subpass: u16,
    pub dst_subpass: u16,
}

/// Construction input for [`RenderPass::new`].
#[derive(Debug, Clone, Default)]
pub struct RenderPassCreateInfo {
    pub attachments: Vec<AttachmentDescription>,
    pub subpasses: Vec<SubpassDescription>,
    pub dependencies: Vec<SubpassDependency>,
}

/// An immutable, independently-owned description of a render pass.
#[derive(Debug, Clone)]
pub struct RenderPass {
    attachments: Vec<AttachmentDescription>,
    subpasses: Vec<SubpassDescription>,
    #[allow(dead_code)]
    dependencies: Vec<SubpassDependency>,
}

impl RenderPass {
    /// Builds a render pass from `create_info`, deep-copying every
    /// array it references.
    ///
    /// Fails with [`PlaidError::InvalidAttachmentReference`] if any
    /// subpass names an attachment id outside `0..attachments.len()`.
    pub fn new(create_info: RenderPassCreateInfo) -> Result<Self> {
        let attachments_count = create_info.attachments.len();
        for (subpass_idx, subpass) in create_info.subpasses.iter().enumerate() {
            let refs = subpass
                .input_attachments
                .iter()
                .chain(subpass.color_attachments.iter())
                .chain(subpass.depth_stencil_attachment.iter());
            for reference in refs {
                if reference.id as usize >= attachments_count {
                    return Err(PlaidError::InvalidAttachmentReference {
                        subpass: subpass_idx as u16,
                        attachment: reference.id,
                        attachments_count: attachments_count as u16,
                    });
                }
            }
        }

        log::info!(
            target: "caliban_sw::render_pass",
            "render pass built: {} attachments, {} subpasses",
            attachments_count,
            create_info.subpasses.len()
        );

        Ok(RenderPass {
            attachments: create_info.attachments,
            subpasses: create_info.subpasses,
            dependencies: create_info.dependencies,
        })
    }

    pub fn attachments_count(&self) -> usize {
        self.attachments.len()
    }

    pub fn attachment(&self, id: u8) -> &AttachmentDescription {
        &self.attachments[id as usize]
    }

    pub fn subpasses_count(&self) -> usize {
        self.subpasses.len()
    }

    pub fn subpass(&self, index: usize) -> &SubpassDescription {
        &self.subpasses[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color_attachment() -> AttachmentDescription {
        AttachmentDescription {
            format: Format::Bgra8u,
            load_op: LoadOp::Clear,
            store_op: StoreOp::Store,
            stencil_load_op: LoadOp::DontCare,
            stencil_store_op: StoreOp::DontCare,
        }
    }

    #[test]
    fn rejects_out_of_range_attachment_reference() {
        let create_info = RenderPassCreateInfo {
            attachments: vec![color_attachment()],
            subpasses: vec![SubpassDescription {
                color_attachments: vec![AttachmentReference { id: 1, format: Format::Bgra8u }],
                ..Default::default()
            }],
            dependencies: vec![],
        };
        let err = RenderPass::new(create_info).unwrap_err();
        assert!(matches!(err, PlaidError::InvalidAttachmentReference { attachment: 1, attachments_count: 1, .. }));
    }

    #[test]
    fn accepts_in_range_reference() {
        let create_info = RenderPassCreateInfo {
            attachments: vec![color_attachment()],
            subpasses: vec![SubpassDescription {
                color_attachments: vec![AttachmentReference { id: 0, format: Format::Bgra8u }],
                ..Default::default()
            }],
            dependencies: vec![],
        };
        let render_pass = RenderPass::new(create_info).unwrap();
        assert_eq!(render_pass.attachments_count(), 1);
        assert_eq!(render_pass.subpasses_count(), 1);
    }
}
