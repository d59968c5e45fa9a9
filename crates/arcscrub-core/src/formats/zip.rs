//! Zip container inspection.
//!
//! Zip support is read-only: entries are reported but never rewritten.

use std::fs::File;
use std::io::BufReader;
use std::io::Seek;
use std::io::SeekFrom;

use byteorder::LittleEndian;
use byteorder::ReadBytesExt;

use crate::MetadataRecord;
use crate::MetadataReport;
use crate::Result;
use crate::StripError;
use crate::ZipEntryMetadata;
use crate::engine::StripContext;
use crate::formats::traits::HandlerSpec;
use crate::formats::traits::Stripper;

/// Offset of "version made by" inside a central directory file header,
/// right after the 4-byte signature.
const VERSION_MADE_BY_OFFSET: u64 = 4;

/// Timestamp reported for entries without a usable DOS date-time.
const DOS_EPOCH: &str = "1980-01-01 00:00:00";

/// Zip handler that reports per-entry metadata.
///
/// `is_clean` always answers `false` and `remove_all` is not supported.
pub struct ZipInspector {
    spec: HandlerSpec,
}

impl ZipInspector {
    /// Creates an inspector for the zip file described by `spec`.
    #[must_use]
    pub const fn new(spec: HandlerSpec) -> Self {
        Self { spec }
    }

    fn entries(&self) -> Result<Vec<(String, ZipEntryMetadata)>> {
        let file = File::open(&self.spec.path)
            .map_err(|e| StripError::extraction(&self.spec.path, e))?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| {
            StripError::extraction(&self.spec.path, format!("failed to open ZIP archive: {e}"))
        })?;

        // Second handle for raw central-directory reads.
        let mut raw = BufReader::new(File::open(&self.spec.path)?);
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i).map_err(|e| {
                StripError::extraction(&self.spec.path, format!("failed to read ZIP entry: {e}"))
            })?;

            let made_by = read_version_made_by(&mut raw, entry.central_header_start())
                .map_err(|e| {
                    StripError::extraction(
                        &self.spec.path,
                        format!("{}: bad central directory header: {e}", entry.name()),
                    )
                })?;
            let [create_system, create_version] = made_by.to_be_bytes();

            let modified = entry.last_modified().map_or_else(
                || DOS_EPOCH.to_string(),
                |dt| {
                    format!(
                        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                        dt.year(),
                        dt.month(),
                        dt.day(),
                        dt.hour(),
                        dt.minute(),
                        dt.second()
                    )
                },
            );

            entries.push((
                entry.name().to_string(),
                ZipEntryMetadata {
                    comment: entry.comment().to_string(),
                    modified,
                    create_system,
                    create_version,
                },
            ));
        }
        Ok(entries)
    }
}

fn read_version_made_by<R: std::io::Read + Seek>(
    reader: &mut R,
    central_header_start: u64,
) -> std::io::Result<u16> {
    reader.seek(SeekFrom::Start(central_header_start + VERSION_MADE_BY_OFFSET))?;
    reader.read_u16::<LittleEndian>()
}

impl Stripper for ZipInspector {
    fn is_clean(&self, _cx: &StripContext<'_>) -> Result<bool> {
        Ok(false)
    }

    fn get_metadata(&self, _cx: &StripContext<'_>) -> Result<MetadataReport> {
        Ok(self
            .entries()?
            .into_iter()
            .map(|(name, meta)| (name, MetadataRecord::Zip(meta)))
            .collect())
    }

    fn remove_all(&self, _cx: &StripContext<'_>) -> Result<()> {
        Err(StripError::OperationUnsupported {
            format: "zip",
            operation: "remove_all",
        })
    }

    fn format_name(&self) -> &str {
        "zip"
    }
}
