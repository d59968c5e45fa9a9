//! Test utilities for building fixture archives in memory.
//!
//! Shared by unit tests, the integration tests and the CLI tests so that no
//! binary fixtures need to be checked in.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;

use byteorder::LittleEndian;
use byteorder::WriteBytesExt;

use crate::TarBookkeeping;

/// DOS time for 12:30:44.
const FIXTURE_DOS_TIME: u16 = (12 << 11) | (30 << 5) | (44 / 2);
/// DOS date for 2021-06-15.
const FIXTURE_DOS_DATE: u16 = ((2021 - 1980) << 9) | (6 << 5) | 15;
/// "Version made by": Unix host, zip spec 3.0.
const FIXTURE_VERSION_MADE_BY: u16 = (3 << 8) | 30;

/// Bookkeeping for a member owned by `uname` (uid and gid both `id`).
///
/// # Examples
///
/// ```
/// use arcscrub_core::test_utils::owned_by;
///
/// let owner = owned_by(1_234_567, 1000, "alice");
/// assert_eq!(owner.gname, "alice");
/// ```
#[must_use]
pub fn owned_by(mtime: u64, id: u64, uname: &str) -> TarBookkeeping {
    TarBookkeeping {
        mtime,
        uid: id,
        gid: id,
        uname: uname.to_string(),
        gname: uname.to_string(),
    }
}

/// Gzip-compresses `data`.
#[must_use]
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Bzip2-compresses `data`.
#[must_use]
pub fn bzip2(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Creates an in-memory ZIP archive from a list of entries.
///
/// Each entry is a tuple of (path, content). Files are stored uncompressed
/// with mode 0o644.
///
/// # Examples
///
/// ```
/// use arcscrub_core::test_utils::create_test_zip;
///
/// let zip_data = create_test_zip(vec![("file.txt", b"hello"), ("dir/nested.txt", b"world")]);
/// ```
#[must_use]
pub fn create_test_zip(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    use zip::write::SimpleFileOptions;
    use zip::write::ZipWriter;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o644);

    for (path, data) in entries {
        zip.start_file(path, options).unwrap();
        zip.write_all(data).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// Builder for TAR fixtures with explicit bookkeeping.
///
/// Members added without an owner get zeroed bookkeeping, so an archive built
/// only from them is already clean.
///
/// # Examples
///
/// ```
/// use arcscrub_core::test_utils::TarTestBuilder;
/// use arcscrub_core::test_utils::owned_by;
///
/// let tar_data = TarTestBuilder::new()
///     .add_directory("dir/")
///     .add_file_owned("dir/file.txt", b"content", &owned_by(99, 1000, "alice"))
///     .add_symlink("link", "dir/file.txt")
///     .build();
/// ```
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Creates a new TAR test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Adds a regular file with zeroed bookkeeping.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_owned(path, data, &TarBookkeeping::default())
    }

    /// Adds a regular file carrying `owner` bookkeeping.
    #[must_use]
    pub fn add_file_owned(mut self, path: &str, data: &[u8], owner: &TarBookkeeping) -> Self {
        let mut header = header_with(tar::EntryType::Regular, 0o644, owner);
        header.set_size(data.len() as u64);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a directory with zeroed bookkeeping.
    #[must_use]
    pub fn add_directory(self, path: &str) -> Self {
        self.add_directory_owned(path, &TarBookkeeping::default())
    }

    /// Adds a directory carrying `owner` bookkeeping.
    #[must_use]
    pub fn add_directory_owned(mut self, path: &str, owner: &TarBookkeeping) -> Self {
        let mut header = header_with(tar::EntryType::Directory, 0o755, owner);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a symlink to the archive.
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        let mut header = header_with(tar::EntryType::Symlink, 0o777, &TarBookkeeping::default());
        header.set_cksum();
        self.builder.append_link(&mut header, path, target).unwrap();
        self
    }

    /// Adds a hardlink to the archive.
    #[must_use]
    pub fn add_hardlink(mut self, path: &str, target: &str) -> Self {
        let mut header = header_with(tar::EntryType::Link, 0o644, &TarBookkeeping::default());
        header.set_cksum();
        self.builder.append_link(&mut header, path, target).unwrap();
        self
    }

    /// Adds a FIFO entry.
    #[must_use]
    pub fn add_fifo(mut self, path: &str) -> Self {
        let mut header = header_with(tar::EntryType::Fifo, 0o644, &TarBookkeeping::default());
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a regular file whose name is written verbatim, bypassing the
    /// path checks of the tar crate (for `..` and absolute names).
    #[must_use]
    pub fn add_raw_path_file(mut self, path: &str, data: &[u8]) -> Self {
        let mut header = header_with(tar::EntryType::Regular, 0o644, &TarBookkeeping::default());
        let name = &mut header.as_gnu_mut().unwrap().name;
        name[..path.len()].copy_from_slice(path.as_bytes());
        header.set_size(data.len() as u64);
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Adds a regular file with zeroed header bookkeeping, preceded by a pax
    /// extended header holding `records`.
    #[must_use]
    pub fn add_pax_file(mut self, path: &str, data: &[u8], records: &[(&str, &str)]) -> Self {
        self.append_pax(records);
        self.add_file(path, data)
    }

    /// Like [`add_pax_file`](Self::add_pax_file), but the header's uid and
    /// gid fields are left blank, as some writers do when pax supplies them.
    #[must_use]
    pub fn add_pax_file_blank_ids(
        mut self,
        path: &str,
        data: &[u8],
        records: &[(&str, &str)],
    ) -> Self {
        self.append_pax(records);
        let mut header = header_with(tar::EntryType::Regular, 0o644, &TarBookkeeping::default());
        header.as_old_mut().uid = [0; 8];
        header.as_old_mut().gid = [0; 8];
        header.set_size(data.len() as u64);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    fn append_pax(&mut self, records: &[(&str, &str)]) {
        self.builder
            .append_pax_extensions(records.iter().map(|(key, value)| (*key, value.as_bytes())))
            .unwrap();
    }

    /// Builds and returns the TAR archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn header_with(entry_type: tar::EntryType, mode: u32, owner: &TarBookkeeping) -> tar::Header {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_mode(mode);
    header.set_size(0);
    header.set_mtime(owner.mtime);
    header.set_uid(owner.uid);
    header.set_gid(owner.gid);
    header.set_username(&owner.uname).unwrap();
    header.set_groupname(&owner.gname).unwrap();
    header
}

/// Writes stored ZIP archives byte by byte.
///
/// `zip::ZipWriter` cannot set per-entry comments, so fixtures that need
/// them are assembled by hand. Every entry is dated 2021-06-15 12:30:44 and
/// marked as made by a Unix host with zip 3.0.
///
/// # Examples
///
/// ```
/// use arcscrub_core::test_utils::RawZipBuilder;
///
/// let zip_data = RawZipBuilder::new()
///     .add_entry("notes.txt", b"hello", "secret")
///     .build();
/// assert_eq!(&zip_data[..4], b"PK\x03\x04");
/// ```
#[derive(Default)]
pub struct RawZipBuilder {
    entries: Vec<(String, Vec<u8>, String)>,
}

impl RawZipBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stored entry with an entry comment.
    #[must_use]
    pub fn add_entry(mut self, name: &str, data: &[u8], comment: &str) -> Self {
        self.entries
            .push((name.to_string(), data.to_vec(), comment.to_string()));
        self
    }

    /// Builds and returns the ZIP archive data.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for (name, data, comment) in &self.entries {
            let mut crc = flate2::Crc::new();
            crc.update(data);
            let crc = crc.sum();
            let offset = out.len() as u32;

            out.write_u32::<LittleEndian>(0x0403_4b50).unwrap();
            out.write_u16::<LittleEndian>(20).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(FIXTURE_DOS_TIME).unwrap();
            out.write_u16::<LittleEndian>(FIXTURE_DOS_DATE).unwrap();
            out.write_u32::<LittleEndian>(crc).unwrap();
            out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
            out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
            out.write_u16::<LittleEndian>(name.len() as u16).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_all(name.as_bytes()).unwrap();
            out.write_all(data).unwrap();

            central.write_u32::<LittleEndian>(0x0201_4b50).unwrap();
            central
                .write_u16::<LittleEndian>(FIXTURE_VERSION_MADE_BY)
                .unwrap();
            central.write_u16::<LittleEndian>(20).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(FIXTURE_DOS_TIME).unwrap();
            central.write_u16::<LittleEndian>(FIXTURE_DOS_DATE).unwrap();
            central.write_u32::<LittleEndian>(crc).unwrap();
            central.write_u32::<LittleEndian>(data.len() as u32).unwrap();
            central.write_u32::<LittleEndian>(data.len() as u32).unwrap();
            central.write_u16::<LittleEndian>(name.len() as u16).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(comment.len() as u16).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u32::<LittleEndian>(0o100_644 << 16).unwrap();
            central.write_u32::<LittleEndian>(offset).unwrap();
            central.write_all(name.as_bytes()).unwrap();
            central.write_all(comment.as_bytes()).unwrap();
        }

        let central_offset = out.len() as u32;
        out.write_all(&central).unwrap();

        let count = self.entries.len() as u16;
        out.write_u32::<LittleEndian>(0x0605_4b50).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(count).unwrap();
        out.write_u16::<LittleEndian>(count).unwrap();
        out.write_u32::<LittleEndian>(central.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(central_offset).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out
    }
}
