//! Format handlers.

pub mod compression;
pub mod detect;
pub mod tar;
pub mod text;
pub mod traits;
pub mod zip;

// Re-export main types for convenience
pub use compression::CompressionVariant;
pub use self::tar::TarStripper;
pub use text::PlainTextStripper;
pub use traits::HandlerSpec;
pub use traits::Stripper;
pub use self::zip::ZipInspector;
