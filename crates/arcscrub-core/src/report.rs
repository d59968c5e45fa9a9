//! Metadata reports and operation outcomes.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::path::PathBuf;

/// Bookkeeping metadata a tar header attaches to every member.
///
/// A member is clean at the container level iff every field holds its
/// default (zero or empty) value.
///
/// # Examples
///
/// ```
/// use arcscrub_core::TarBookkeeping;
///
/// assert!(TarBookkeeping::default().is_clean());
///
/// let dirty = TarBookkeeping {
///     mtime: 1_234_567,
///     ..TarBookkeeping::default()
/// };
/// assert!(!dirty.is_clean());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TarBookkeeping {
    /// Modification time in epoch seconds.
    pub mtime: u64,
    /// Owner user id.
    pub uid: u64,
    /// Owner group id.
    pub gid: u64,
    /// Owner user name.
    pub uname: String,
    /// Owner group name.
    pub gname: String,
}

impl TarBookkeeping {
    /// Returns `true` if no bookkeeping field deviates from its default.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mtime == 0
            && self.uid == 0
            && self.gid == 0
            && self.uname.is_empty()
            && self.gname.is_empty()
    }
}

/// Per-entry metadata reported for zip containers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZipEntryMetadata {
    /// Entry comment.
    pub comment: String,
    /// Last modification date-time, formatted `YYYY-MM-DD HH:MM:SS`.
    pub modified: String,
    /// Host system code from the "version made by" field.
    pub create_system: u8,
    /// Creating tool version from the "version made by" field.
    pub create_version: u8,
}

/// One reported attribute set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataRecord {
    /// Tar bookkeeping fields of a member.
    Tar(TarBookkeeping),
    /// Zip entry fields.
    Zip(ZipEntryMetadata),
    /// Scalar field reported by a leaf handler.
    Field(String),
}

impl fmt::Display for MetadataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tar(meta) => write!(
                f,
                "mtime={} uid={} gid={} uname={:?} gname={:?}",
                meta.mtime, meta.uid, meta.gid, meta.uname, meta.gname
            ),
            Self::Zip(meta) => write!(
                f,
                "comment={:?} modified={} system={} zip_version={}",
                meta.comment, meta.modified, meta.create_system, meta.create_version
            ),
            Self::Field(value) => f.write_str(value),
        }
    }
}

/// Metadata found in a file, keyed by member path (containers) or field
/// name (leaf formats).
///
/// Reports are built fresh by every `get_metadata` call. Nested reports are
/// merged under `"<member>/<inner key>"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataReport {
    entries: BTreeMap<String, MetadataRecord>,
}

impl MetadataReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `record` under `key`, replacing any previous record.
    pub fn insert(&mut self, key: impl Into<String>, record: MetadataRecord) {
        self.entries.insert(key.into(), record);
    }

    /// Merges every entry of `nested` under `"<prefix>/<key>"`.
    pub fn merge_nested(&mut self, prefix: &str, nested: Self) {
        let prefix = prefix.trim_end_matches('/');
        for (key, record) in nested.entries {
            self.entries.insert(format!("{prefix}/{key}"), record);
        }
    }

    /// Returns the record stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetadataRecord> {
        self.entries.get(key)
    }

    /// Returns `true` if no metadata was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of reported entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, MetadataRecord> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a MetadataReport {
    type Item = (&'a String, &'a MetadataRecord);
    type IntoIter = btree_map::Iter<'a, String, MetadataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(String, MetadataRecord)> for MetadataReport {
    fn from_iter<I: IntoIterator<Item = (String, MetadataRecord)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Where `remove_all` left the sanitized bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanOutcome {
    /// The file that was sanitized.
    pub source: PathBuf,
    /// The file now holding sanitized content.
    pub cleaned: PathBuf,
    /// Whether the original was kept alongside the cleaned copy.
    pub backup: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bookkeeping_clean_each_field() {
        let fields = [
            TarBookkeeping {
                mtime: 1,
                ..TarBookkeeping::default()
            },
            TarBookkeeping {
                uid: 1000,
                ..TarBookkeeping::default()
            },
            TarBookkeeping {
                gid: 100,
                ..TarBookkeeping::default()
            },
            TarBookkeeping {
                uname: "alice".into(),
                ..TarBookkeeping::default()
            },
            TarBookkeeping {
                gname: "users".into(),
                ..TarBookkeeping::default()
            },
        ];
        for meta in fields {
            assert!(!meta.is_clean(), "{meta:?} should be dirty");
        }
    }

    #[test]
    fn test_merge_nested_prefixes_keys() {
        let mut inner = MetadataReport::new();
        inner.insert(
            "f.txt",
            MetadataRecord::Tar(TarBookkeeping {
                uid: 1000,
                ..TarBookkeeping::default()
            }),
        );

        let mut outer = MetadataReport::new();
        outer.merge_nested("inner.tar", inner);

        assert_eq!(outer.len(), 1);
        assert!(outer.get("inner.tar/f.txt").is_some());
    }

    #[test]
    fn test_merge_nested_trailing_slash() {
        let mut inner = MetadataReport::new();
        inner.insert("Author", MetadataRecord::Field("bob".into()));

        let mut outer = MetadataReport::new();
        outer.merge_nested("docs/", inner);
        assert_eq!(
            outer.get("docs/Author"),
            Some(&MetadataRecord::Field("bob".into()))
        );
    }

    #[test]
    fn test_record_display() {
        let record = MetadataRecord::Tar(TarBookkeeping {
            mtime: 5,
            uid: 1,
            gid: 2,
            uname: "u".into(),
            gname: "g".into(),
        });
        assert_eq!(
            record.to_string(),
            "mtime=5 uid=1 gid=2 uname=\"u\" gname=\"g\""
        );
    }

    #[test]
    fn test_report_iteration_is_sorted() {
        let report: MetadataReport = [
            ("b".to_string(), MetadataRecord::Field("2".into())),
            ("a".to_string(), MetadataRecord::Field("1".into())),
        ]
        .into_iter()
        .collect();
        let keys: Vec<_> = report.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
