//! Compression layers for tar-family containers.
//!
//! Tar, tar.gz and tar.bz2 share one stripping algorithm; the only
//! difference between them is the stream wrapped around the tar data on the
//! way in and on the way out.

use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;

use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

/// Compression applied around a tar stream.
///
/// # Examples
///
/// ```
/// use arcscrub_core::formats::compression::CompressionVariant;
///
/// assert_eq!(CompressionVariant::Gzip.format_name(), "tar.gz");
/// assert_eq!(CompressionVariant::None.format_name(), "tar");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionVariant {
    /// Plain tar.
    None,
    /// Gzip (deflate) compression.
    Gzip,
    /// Bzip2 compression.
    Bzip2,
}

impl CompressionVariant {
    /// Returns the format label of a tar with this compression.
    #[must_use]
    pub const fn format_name(self) -> &'static str {
        match self {
            Self::None => "tar",
            Self::Gzip => "tar.gz",
            Self::Bzip2 => "tar.bz2",
        }
    }

    /// Wraps `file` in the matching decompressor.
    #[must_use]
    pub fn open_reader(self, file: File) -> TarSource {
        let reader = BufReader::new(file);
        match self {
            Self::None => TarSource::Plain(reader),
            Self::Gzip => TarSource::Gzip(GzDecoder::new(reader)),
            Self::Bzip2 => TarSource::Bzip2(BzDecoder::new(reader)),
        }
    }

    /// Wraps `writer` in the matching compressor at default level.
    pub fn open_writer<W: Write>(self, writer: W) -> TarSink<W> {
        match self {
            Self::None => TarSink::Plain(writer),
            Self::Gzip => TarSink::Gzip(GzEncoder::new(writer, flate2::Compression::default())),
            Self::Bzip2 => TarSink::Bzip2(BzEncoder::new(writer, bzip2::Compression::default())),
        }
    }
}

/// Decompressed tar byte stream.
pub enum TarSource {
    /// Uncompressed.
    Plain(BufReader<File>),
    /// Gzip-decoded.
    Gzip(GzDecoder<BufReader<File>>),
    /// Bzip2-decoded.
    Bzip2(BzDecoder<BufReader<File>>),
}

impl Read for TarSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(r) => r.read(buf),
            Self::Gzip(r) => r.read(buf),
            Self::Bzip2(r) => r.read(buf),
        }
    }
}

/// Compressing writer for a rebuilt tar stream.
pub enum TarSink<W: Write> {
    /// Uncompressed.
    Plain(W),
    /// Gzip-encoded.
    Gzip(GzEncoder<W>),
    /// Bzip2-encoded.
    Bzip2(BzEncoder<W>),
}

impl<W: Write> TarSink<W> {
    /// Writes the compressor trailer and returns the inner writer.
    ///
    /// Dropping a sink instead would swallow trailer write errors.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Plain(mut w) => {
                w.flush()?;
                Ok(w)
            }
            Self::Gzip(w) => w.finish(),
            Self::Bzip2(w) => w.finish(),
        }
    }
}

impl<W: Write> Write for TarSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
            Self::Bzip2(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
            Self::Bzip2(w) => w.flush(),
        }
    }
}
