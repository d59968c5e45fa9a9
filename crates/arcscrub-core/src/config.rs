//! Configuration for stripping operations.

use std::path::Path;
use std::path::PathBuf;

/// Suffix appended to the original path when a sanitized copy is kept next
/// to the original.
pub const CLEANED_SUFFIX: &str = ".cleaned";

/// Default maximum container nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// What a container handler does with a member no handler can sanitize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedMemberPolicy {
    /// Fail the whole container operation.
    #[default]
    Abort,
    /// Copy the member unmodified (bookkeeping still zeroed) and log a
    /// warning.
    PassThrough,
}

/// Engine-wide limits and policies shared by every handler in one
/// operation.
///
/// # Examples
///
/// ```
/// use arcscrub_core::EngineConfig;
/// use arcscrub_core::UnsupportedMemberPolicy;
///
/// let config = EngineConfig::default().with_max_depth(4);
/// assert_eq!(config.max_depth, 4);
/// assert_eq!(config.unsupported_members, UnsupportedMemberPolicy::Abort);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of container levels below the top-level file.
    pub max_depth: usize,

    /// Policy for members whose format has no usable handler.
    pub unsupported_members: UnsupportedMemberPolicy,

    /// Directory under which scratch spaces are created (`None` = system
    /// temp directory).
    pub scratch_root: Option<PathBuf>,
}

impl Default for EngineConfig {
    /// Default values:
    /// - `max_depth`: 16
    /// - `unsupported_members`: `Abort`
    /// - `scratch_root`: `None`
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            unsupported_members: UnsupportedMemberPolicy::Abort,
            scratch_root: None,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration that passes unsupported members through
    /// instead of aborting.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            unsupported_members: UnsupportedMemberPolicy::PassThrough,
            ..Self::default()
        }
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the unsupported-member policy.
    #[must_use]
    pub fn with_unsupported_members(mut self, policy: UnsupportedMemberPolicy) -> Self {
        self.unsupported_members = policy;
        self
    }

    /// Sets the scratch root directory.
    #[must_use]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }
}

/// Per-file configuration of a single handler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripperConfig {
    /// File the handler operates on.
    pub path: PathBuf,

    /// Keep the original and write the sanitized copy to
    /// `path + CLEANED_SUFFIX`.
    pub backup: bool,
}

impl StripperConfig {
    /// Creates a configuration for `path`.
    pub fn new(path: impl Into<PathBuf>, backup: bool) -> Self {
        Self {
            path: path.into(),
            backup,
        }
    }

    /// Path the sanitized copy is written to when `backup` is set.
    #[must_use]
    pub fn cleaned_path(&self) -> PathBuf {
        cleaned_path(&self.path)
    }
}

/// Returns `path` with [`CLEANED_SUFFIX`] appended to its file name.
#[must_use]
pub fn cleaned_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(CLEANED_SUFFIX);
    PathBuf::from(name)
}
