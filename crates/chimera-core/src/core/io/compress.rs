//! Transparent gzip handling for report and domain-table files.

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Appends `.gz` to `path` unless it already ends with it.
pub fn with_gz_suffix(path: &Path) -> PathBuf {
    if is_gzip_path(path) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".gz");
        PathBuf::from(name)
    }
}

pub enum MaybeGzWriter<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> Write for MaybeGzWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            MaybeGzWriter::Plain(w) => w.write(buf),
            MaybeGzWriter::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            MaybeGzWriter::Plain(w) => w.flush(),
            MaybeGzWriter::Gzip(w) => w.flush(),
        }
    }
}

impl<W: Write> MaybeGzWriter<W> {
    /// Writes the gzip trailer (if any) and returns the inner writer.
    pub fn finish(self) -> io::Result<W> {
        match self {
            MaybeGzWriter::Plain(w) => Ok(w),
            MaybeGzWriter::Gzip(w) => w.finish(),
        }
    }
}

/// Creates `path`, gzip-compressing when it carries a `.gz` extension.
pub fn create_file(path: &Path) -> io::Result<MaybeGzWriter<BufWriter<File>>> {
    let file = BufWriter::new(File::create(path)?);
    if is_gzip_path(path) {
        Ok(MaybeGzWriter::Gzip(GzEncoder::new(file, Compression::default())))
    } else {
        Ok(MaybeGzWriter::Plain(file))
    }
}

/// Opens `path` for line reading, detecting gzip content by its magic bytes.
pub fn open_file(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let mut file = BufReader::new(File::open(path)?);
    let magic = file.fill_buf()?;
    if magic.len() >= 2 && magic[0] == 0x1f && magic[1] == 0x8b {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(file))
    }
}

pub fn read_to_string(path: &Path) -> io::Result<String> {
    let mut content = String::new();
    open_file(path)?.read_to_string(&mut content)?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn gz_suffix_is_appended_once() {
        assert_eq!(
            with_gz_suffix(Path::new("out/2lue.txt")),
            PathBuf::from("out/2lue.txt.gz")
        );
        assert_eq!(
            with_gz_suffix(Path::new("out/2lue.txt.gz")),
            PathBuf::from("out/2lue.txt.gz")
        );
        assert!(is_gzip_path(Path::new("file.GZ")));
        assert!(!is_gzip_path(Path::new("file.txt")));
    }

    #[test]
    fn compressed_file_reads_back_transparently() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt.gz");
        let mut writer = create_file(&path).unwrap();
        writer.write_all(b"line one\nline two\n").unwrap();
        writer.finish().unwrap().flush().unwrap();

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
        assert_eq!(read_to_string(&path).unwrap(), "line one\nline two\n");
    }

    #[test]
    fn plain_file_reads_back_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        let mut writer = create_file(&path).unwrap();
        writer.write_all(b"plain\n").unwrap();
        writer.finish().unwrap().flush().unwrap();

        assert_eq!(read_to_string(&path).unwrap(), "plain\n");
    }
}
