//! Tar-family container handler.
//!
//! One algorithm covers plain, gzip and bzip2 tarballs; the
//! [`CompressionVariant`] only decides which codec wraps the stream.
//!
//! Every operation walks the members in source order. Regular members are
//! extracted into a per-operation [`ScratchSpace`](crate::engine::ScratchSpace)
//! and handed to whatever handler the registry resolves for their content,
//! one nesting level deeper. `remove_all` rebuilds the archive into a
//! [`PendingOutput`] with zeroed bookkeeping and publishes it with a single
//! rename once every member has been written.

use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::ops::ControlFlow;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use tar::EntryType;
use tar::Header;

use crate::MetadataRecord;
use crate::MetadataReport;
use crate::Result;
use crate::StripError;
use crate::TarBookkeeping;
use crate::engine::PendingOutput;
use crate::engine::ScratchSpace;
use crate::engine::StripContext;
use crate::engine::scratch::normalize_member_path;
use crate::formats::compression::CompressionVariant;
use crate::formats::compression::TarSink;
use crate::formats::compression::TarSource;
use crate::formats::traits::HandlerSpec;
use crate::formats::traits::Stripper;

/// Mode used when a header carries an unparsable mode field.
const FALLBACK_MODE: u32 = 0o644;

const BLOCK_LEN: usize = 512;

/// Byte range of the checksum field in a tar header.
const CKSUM_FIELD: std::ops::Range<usize> = 148..156;

/// Member kinds that survive a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Regular file content, delegated to a nested handler.
    Regular,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Hard link to an earlier member.
    Hardlink,
}

impl MemberKind {
    /// Classifies a header type.
    ///
    /// Returns `Ok(None)` for extension headers, which carry metadata of
    /// their own and are never copied to the output.
    fn classify(entry_type: EntryType) -> std::result::Result<Option<Self>, &'static str> {
        match entry_type {
            EntryType::Directory => Ok(Some(Self::Directory)),
            EntryType::Symlink => Ok(Some(Self::Symlink)),
            EntryType::Link => Ok(Some(Self::Hardlink)),
            EntryType::XHeader | EntryType::XGlobalHeader => Ok(None),
            EntryType::Char | EntryType::Block | EntryType::Fifo => {
                Err("special files (char/block devices, FIFOs) are not supported")
            }
            // Regular, contiguous, sparse and unknown types are read as file content
            _ => Ok(Some(Self::Regular)),
        }
    }

    const fn tar_type(self) -> EntryType {
        match self {
            Self::Regular => EntryType::Regular,
            Self::Directory => EntryType::Directory,
            Self::Symlink => EntryType::Symlink,
            Self::Hardlink => EntryType::Link,
        }
    }
}

/// One member as seen by an operation.
struct TarMember<'a, R: Read> {
    entry: tar::Entry<'a, R>,
    kind: MemberKind,
    /// Normalized relative path.
    path: PathBuf,
    /// Report key: the normalized path joined with `/`.
    key: String,
    mode: u32,
    bookkeeping: TarBookkeeping,
}

/// Handler for tar, tar.gz and tar.bz2 containers.
pub struct TarStripper {
    spec: HandlerSpec,
    variant: CompressionVariant,
}

impl TarStripper {
    /// Creates a handler for the tarball described by `spec`.
    #[must_use]
    pub const fn new(spec: HandlerSpec, variant: CompressionVariant) -> Self {
        Self { spec, variant }
    }

    /// Compression wrapped around the tar stream.
    #[must_use]
    pub const fn variant(&self) -> CompressionVariant {
        self.variant
    }

    /// Errors name the file as the user knows it, not its scratch copy.
    fn display_path(&self) -> &Path {
        Path::new(&self.spec.display_name)
    }

    fn extraction_error(&self, reason: impl std::fmt::Display) -> StripError {
        StripError::extraction(self.display_path(), reason)
    }

    fn rebuild_error(&self, reason: impl std::fmt::Display) -> StripError {
        StripError::rebuild(self.display_path(), reason)
    }

    /// Checks that the (decompressed) stream opens with a tar header.
    ///
    /// A gzip or bzip2 payload that is not a tarball is reported as
    /// [`StripError::FormatUnsupported`], so the unsupported-member policy
    /// applies to it like any other unknown format.
    fn ensure_tar_stream(&self) -> Result<()> {
        let file = File::open(&self.spec.path).map_err(|e| self.extraction_error(e))?;
        let mut block = Vec::with_capacity(BLOCK_LEN);
        self.variant
            .open_reader(file)
            .take(BLOCK_LEN as u64)
            .read_to_end(&mut block)
            .map_err(|e| self.extraction_error(format!("failed to decompress: {e}")))?;

        if starts_tar_stream(&block) {
            return Ok(());
        }
        Err(StripError::FormatUnsupported {
            mime: self.spec.mime.clone(),
            path: self.display_path().to_path_buf(),
        })
    }

    /// Visits every member in source order until `visit` breaks.
    fn for_each_member<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(TarMember<'_, TarSource>) -> Result<ControlFlow<()>>,
    {
        self.ensure_tar_stream()?;

        let file = File::open(&self.spec.path).map_err(|e| self.extraction_error(e))?;
        let mut archive = tar::Archive::new(self.variant.open_reader(file));
        let entries = archive
            .entries()
            .map_err(|e| self.extraction_error(format!("failed to read entries: {e}")))?;

        for entry_result in entries {
            let mut entry = entry_result
                .map_err(|e| self.extraction_error(format!("failed to read entry: {e}")))?;

            let raw_path = entry
                .path()
                .map_err(|e| self.extraction_error(format!("invalid member path: {e}")))?
                .into_owned();

            let kind = match MemberKind::classify(entry.header().entry_type()) {
                Ok(Some(kind)) => kind,
                Ok(None) => {
                    tracing::debug!(member = %raw_path.display(), "dropping extension header");
                    continue;
                }
                Err(reason) => {
                    return Err(self.extraction_error(format!("{}: {reason}", raw_path.display())));
                }
            };

            let path = normalize_member_path(&raw_path)?;
            if path.as_os_str().is_empty() {
                if kind == MemberKind::Directory {
                    tracing::debug!(member = %raw_path.display(), "skipping archive root entry");
                    continue;
                }
                return Err(StripError::UnsafeMemberPath { path: raw_path });
            }

            let bookkeeping = PaxBookkeeping::read(&mut entry)
                .and_then(|pax| pax.resolve(entry.header()))
                .map_err(|e| self.extraction_error(format!("{}: {e}", raw_path.display())))?;
            let mode = entry.header().mode().unwrap_or(FALLBACK_MODE);

            let member = TarMember {
                key: member_key(&path),
                entry,
                kind,
                path,
                mode,
                bookkeeping,
            };
            tracing::debug!(
                member = %member.key,
                kind = ?member.kind,
                container = %self.spec.display_name,
                "visiting member"
            );

            if visit(member)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Copies a regular member's content into the scratch space.
    ///
    /// Each member gets its own numbered subdirectory, so members whose
    /// paths collide or nest inside each other never share a scratch file.
    fn extract(
        &self,
        scratch: &ScratchSpace,
        index: usize,
        member: &mut TarMember<'_, TarSource>,
    ) -> Result<PathBuf> {
        let slot = PathBuf::from(index.to_string()).join(&member.path);
        let (target, mut file) = scratch.create_member(&slot)?;
        io::copy(&mut member.entry, &mut file)
            .map_err(|e| self.extraction_error(format!("{}: {e}", member.key)))?;
        file.flush()?;
        Ok(target)
    }

    fn append_regular<W: Write>(
        &self,
        builder: &mut tar::Builder<W>,
        member: &TarMember<'_, TarSource>,
        content: &Path,
    ) -> Result<()> {
        let size = std::fs::metadata(content)?.len();
        let mut header = zeroed_header(MemberKind::Regular, member.mode)
            .map_err(|e| self.rebuild_error(e))?;
        header.set_size(size);
        header.set_cksum();

        let mut file = File::open(content)?;
        builder
            .append_data(&mut header, &member.path, &mut file)
            .map_err(|e| self.rebuild_error(format!("{}: {e}", member.key)))
    }

    fn append_directory<W: Write>(
        &self,
        builder: &mut tar::Builder<W>,
        member: &TarMember<'_, TarSource>,
    ) -> Result<()> {
        let mut header = zeroed_header(MemberKind::Directory, member.mode)
            .map_err(|e| self.rebuild_error(e))?;
        header.set_cksum();
        builder
            .append_data(&mut header, &member.path, io::empty())
            .map_err(|e| self.rebuild_error(format!("{}: {e}", member.key)))
    }

    fn append_link<W: Write>(
        &self,
        builder: &mut tar::Builder<W>,
        member: &TarMember<'_, TarSource>,
    ) -> Result<()> {
        let target = member
            .entry
            .link_name()
            .map_err(|e| self.extraction_error(format!("{}: invalid link target: {e}", member.key)))?
            .ok_or_else(|| {
                self.extraction_error(format!("{}: link has no target", member.key))
            })?
            .into_owned();

        let mut header = zeroed_header(member.kind, member.mode)
            .map_err(|e| self.rebuild_error(e))?;
        header.set_cksum();
        builder
            .append_link(&mut header, &member.path, &target)
            .map_err(|e| self.rebuild_error(format!("{}: {e}", member.key)))
    }

    /// Finishes the tar stream and the compressor around it.
    fn finish_output(&self, builder: tar::Builder<TarSink<BufWriter<&File>>>) -> Result<()> {
        let sink = builder
            .into_inner()
            .map_err(|e| self.rebuild_error(format!("failed to finish archive: {e}")))?;
        let mut writer = sink
            .finish()
            .map_err(|e| self.rebuild_error(format!("failed to finish compression: {e}")))?;
        writer
            .flush()
            .map_err(|e| self.rebuild_error(format!("failed to flush output: {e}")))
    }
}

impl Stripper for TarStripper {
    fn is_clean(&self, cx: &StripContext<'_>) -> Result<bool> {
        let scratch = cx.scratch()?;
        let mut clean = true;
        let mut index = 0;

        self.for_each_member(|mut member| {
            if !member.bookkeeping.is_clean() {
                tracing::debug!(member = %member.key, "member bookkeeping is dirty");
                clean = false;
                return Ok(ControlFlow::Break(()));
            }
            if member.kind != MemberKind::Regular {
                return Ok(ControlFlow::Continue(()));
            }

            index += 1;
            let extracted = self.extract(&scratch, index, &mut member)?;
            let nested = cx.nested()?;
            let verdict = nested
                .open_member(&member.key, &extracted)
                .and_then(|handler| handler.is_clean(&nested));
            let verdict = cx.tolerate_unsupported(&member.key, verdict)?;
            scratch.discard(&extracted)?;

            // A member nothing can inspect passes through; it cannot be
            // reported as carrying metadata.
            if verdict == Some(false) {
                tracing::debug!(member = %member.key, "member content is dirty");
                clean = false;
                return Ok(ControlFlow::Break(()));
            }
            Ok(ControlFlow::Continue(()))
        })?;

        scratch.reclaim()?;
        Ok(clean)
    }

    fn get_metadata(&self, cx: &StripContext<'_>) -> Result<MetadataReport> {
        let scratch = cx.scratch()?;
        let mut report = MetadataReport::new();
        let mut index = 0;

        self.for_each_member(|mut member| {
            if !member.bookkeeping.is_clean() {
                report.insert(
                    member.key.clone(),
                    MetadataRecord::Tar(member.bookkeeping.clone()),
                );
            }
            if member.kind != MemberKind::Regular {
                return Ok(ControlFlow::Continue(()));
            }

            index += 1;
            let extracted = self.extract(&scratch, index, &mut member)?;
            let nested = cx.nested()?;
            let inner = nested
                .open_member(&member.key, &extracted)
                .and_then(|handler| handler.get_metadata(&nested));
            if let Some(inner) = cx.tolerate_unsupported(&member.key, inner)? {
                report.merge_nested(&member.key, inner);
            }
            scratch.discard(&extracted)?;
            Ok(ControlFlow::Continue(()))
        })?;

        scratch.reclaim()?;
        Ok(report)
    }

    fn remove_all(&self, cx: &StripContext<'_>) -> Result<()> {
        let scratch = cx.scratch()?;
        let pending = PendingOutput::beside(&self.spec.path)?;
        let sink = self
            .variant
            .open_writer(BufWriter::new(pending.as_file()));
        let mut builder = tar::Builder::new(sink);
        let mut index = 0;

        self.for_each_member(|mut member| {
            match member.kind {
                MemberKind::Directory => self.append_directory(&mut builder, &member)?,
                MemberKind::Symlink | MemberKind::Hardlink => {
                    self.append_link(&mut builder, &member)?;
                }
                MemberKind::Regular => {
                    index += 1;
                    let extracted = self.extract(&scratch, index, &mut member)?;
                    let nested = cx.nested()?;
                    let outcome = nested
                        .open_member(&member.key, &extracted)
                        .and_then(|handler| handler.remove_all(&nested));
                    // On pass-through the extracted bytes are appended as-is.
                    cx.tolerate_unsupported(&member.key, outcome)?;
                    self.append_regular(&mut builder, &member, &extracted)?;
                    scratch.discard(&extracted)?;
                }
            }
            Ok(ControlFlow::Continue(()))
        })?;

        self.finish_output(builder)?;
        scratch.reclaim()?;

        let target = pending.persist(&self.spec.stripper_config())?;
        tracing::debug!(
            container = %self.spec.display_name,
            output = %target.display(),
            "container rebuilt"
        );
        Ok(())
    }

    fn format_name(&self) -> &str {
        self.variant.format_name()
    }
}

/// Builds a header of `kind` with every bookkeeping field zeroed.
fn zeroed_header(kind: MemberKind, mode: u32) -> io::Result<Header> {
    let mut header = Header::new_gnu();
    header.set_entry_type(kind.tar_type());
    header.set_mode(mode);
    header.set_size(0);
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    header.set_username("")?;
    header.set_groupname("")?;
    Ok(header)
}

/// Returns `true` if `block` is a valid first tar block: a header with a
/// matching checksum, or the all-zero end marker of an empty archive.
fn starts_tar_stream(block: &[u8]) -> bool {
    if block.len() < BLOCK_LEN {
        return false;
    }
    if block.iter().all(|&b| b == 0) {
        return true;
    }
    let expected: u32 = block
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            if CKSUM_FIELD.contains(&i) {
                u32::from(b' ')
            } else {
                u32::from(b)
            }
        })
        .sum();
    Header::from_byte_slice(block)
        .cksum()
        .is_ok_and(|stored| stored == expected)
}

/// Bookkeeping carried by a member's pax records.
///
/// Pax records win over the header; header fields are only parsed for the
/// values no record supplies.
#[derive(Debug, Default)]
struct PaxBookkeeping {
    mtime: Option<u64>,
    uid: Option<u64>,
    gid: Option<u64>,
    uname: Option<String>,
    gname: Option<String>,
}

impl PaxBookkeeping {
    fn read<R: Read>(entry: &mut tar::Entry<'_, R>) -> io::Result<Self> {
        let mut pax = Self::default();
        let Some(extensions) = entry.pax_extensions()? else {
            return Ok(pax);
        };
        for extension in extensions {
            let extension = extension?;
            let (Ok(key), Ok(value)) = (extension.key(), extension.value()) else {
                continue;
            };
            match key {
                // Fractional seconds are truncated; unparsable times count as dirty.
                "mtime" => {
                    pax.mtime = Some(
                        value
                            .split('.')
                            .next()
                            .and_then(|secs| secs.parse().ok())
                            .unwrap_or(1),
                    );
                }
                "uid" => pax.uid = Some(value.parse().unwrap_or(u64::MAX)),
                "gid" => pax.gid = Some(value.parse().unwrap_or(u64::MAX)),
                "uname" => pax.uname = Some(value.to_string()),
                "gname" => pax.gname = Some(value.to_string()),
                _ => {}
            }
        }
        Ok(pax)
    }

    fn resolve(self, header: &Header) -> io::Result<TarBookkeeping> {
        Ok(TarBookkeeping {
            mtime: self.mtime.map_or_else(|| header.mtime(), Ok)?,
            uid: self.uid.map_or_else(|| header.uid(), Ok)?,
            gid: self.gid.map_or_else(|| header.gid(), Ok)?,
            uname: self
                .uname
                .unwrap_or_else(|| lossy(header.username_bytes())),
            gname: self
                .gname
                .unwrap_or_else(|| lossy(header.groupname_bytes())),
        })
    }
}

fn lossy(bytes: Option<&[u8]>) -> String {
    bytes
        .map(|b| String::from_utf8_lossy(b).into_owned())
        .unwrap_or_default()
}

fn member_key(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
