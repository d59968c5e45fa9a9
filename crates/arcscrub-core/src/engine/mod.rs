//! Shared machinery for container operations: recursion context, scratch
//! space and atomic output publication.

pub mod atomic;
pub mod context;
pub mod scratch;

pub use atomic::PendingOutput;
pub use context::StripContext;
pub use scratch::ScratchSpace;
