//! Metadata inspection and removal for files and archives.
//!
//! `arcscrub-core` detects a file's format from its content, reports the
//! metadata it carries and writes a sanitized copy. Tar, tar.gz and tar.bz2
//! containers are rebuilt member by member: every member's bookkeeping
//! (timestamps, owner ids and names) is zeroed and every regular member is
//! sanitized by the handler its own content resolves to, recursively. Zip
//! files are inspected only.
//!
//! Output is built in a temporary file and published with one rename, so a
//! failed operation never leaves the original partially written.
//!
//! # Examples
//!
//! ```no_run
//! use arcscrub_core::EngineConfig;
//! use arcscrub_core::get_metadata;
//! use arcscrub_core::remove_all;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::default();
//! for (member, record) in &get_metadata("dist.tar.gz", &config)? {
//!     println!("{member}: {record}");
//! }
//! remove_all("dist.tar.gz", false, &config)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod formats;
pub mod registry;
pub mod report;

/// In-memory fixture builders. Enabled for unit tests and by the
/// `test-utils` feature.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main API types
pub use api::get_metadata;
pub use api::is_clean;
pub use api::open_stripper;
pub use api::remove_all;
pub use config::CLEANED_SUFFIX;
pub use config::EngineConfig;
pub use config::StripperConfig;
pub use config::UnsupportedMemberPolicy;
pub use engine::StripContext;
pub use error::Result;
pub use error::StripError;
pub use formats::HandlerSpec;
pub use formats::Stripper;
pub use formats::detect::detect_mime;
pub use registry::Constructor;
pub use registry::ContainerKind;
pub use registry::FormatRegistry;
pub use registry::LeafCapability;
pub use report::CleanOutcome;
pub use report::MetadataRecord;
pub use report::MetadataReport;
pub use report::TarBookkeeping;
pub use report::ZipEntryMetadata;
