use crate::format::Format;
use thiserror::Error;

/// Errors produced by the core of the pipeline engine.
///
/// Every variant here is a programming mistake on the caller's part:
/// there is no retry path, and none of these are recovered internally.
#[derive(Error, Debug)]
pub enum PlaidError {
    /// A [`crate::state::RenderPassState`] was begun while another one,
    /// created from the same [`crate::state::Renderer`], was still live.
    #[error("a render pass is already in progress on this renderer")]
    RenderPassInProgress,

    /// A subpass referenced an attachment id outside the render pass's
    /// attachment array.
    #[error(
        "subpass {subpass} references attachment {attachment}, but the render pass only has {attachments_count} attachments"
    )]
    InvalidAttachmentReference {
        subpass: u16,
        attachment: u8,
        attachments_count: u16,
    },

    /// Pipeline construction could not find a converter from a
    /// fragment-shader output format to the bound color attachment's
    /// format.
    #[error("no converter from fragment output format {src:?} to attachment format {dst:?}")]
    UnsupportedFormatConversion { src: Format, dst: Format },

    /// `draw`/`draw_indexed` was called with a topology this engine
    /// does not implement.
    #[error("unsupported topology: {0}")]
    UnsupportedTopology(&'static str),

    /// The pipeline's interstage heap block could not be allocated
    /// (zero-size allocation when outputs are declared, or the global
    /// allocator failed).
    #[error("failed to allocate the pipeline's interstage buffer")]
    OutOfMemory,
}

pub type Result<T> = std::result::Result<T, PlaidError>;
