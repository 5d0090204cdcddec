use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use reportdrop_protocol::constants::{MIME_CSV, MIME_LEGACY_EXCEL, MIME_MODERN_EXCEL};

use crate::TransferError;

/// An immutable report file: name, declared content type and where its
/// bytes live.
///
/// Files opened with [`FileHandle::from_path`] stay on disk and are read a
/// range at a time. Cloning is cheap either way.
#[derive(Debug, Clone)]
pub struct FileHandle {
    name: String,
    mime_type: String,
    size: u64,
    source: FileSource,
}

#[derive(Debug, Clone)]
pub(crate) enum FileSource {
    Memory(Arc<[u8]>),
    Disk(Arc<Path>),
}

impl FileHandle {
    /// Wraps in-memory bytes. `mime_type` may be empty when the source
    /// did not declare one.
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        let data: Arc<[u8]> = data.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: data.len() as u64,
            source: FileSource::Memory(data),
        }
    }

    /// Opens a file on disk, declaring the content type from its extension.
    ///
    /// Only metadata is read here; the bytes are read when chunks are.
    pub fn from_path(path: &Path) -> Result<Self, TransferError> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(TransferError::NotAFile(path.display().to_string()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = guess_mime_type(&name).to_string();
        Ok(Self {
            name,
            mime_type,
            size: metadata.len(),
            source: FileSource::Disk(Arc::from(path)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size in bytes, as seen when the handle was created.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Backing path for disk files, `None` for in-memory ones.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Disk(path) => Some(&**path),
            FileSource::Memory(_) => None,
        }
    }

    pub(crate) fn source(&self) -> &FileSource {
        &self.source
    }

    /// Reads `range` of the file.
    ///
    /// Fails with an I/O error if a disk file shrank below the range.
    pub fn read_range(&self, range: Range<u64>) -> Result<Vec<u8>, TransferError> {
        if range.end > self.size || range.start > range.end {
            return Err(TransferError::OutOfRange {
                start: range.start,
                end: range.end,
                size: self.size,
            });
        }
        match &self.source {
            FileSource::Memory(data) => Ok(data[range.start as usize..range.end as usize].to_vec()),
            FileSource::Disk(path) => {
                let mut file = std::fs::File::open(path)?;
                read_span(&mut file, range)
            }
        }
    }

    /// Reads the whole file.
    pub fn read_all(&self) -> Result<Vec<u8>, TransferError> {
        self.read_range(0..self.size)
    }

    /// Lowercased text after the last `.` of the name, if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

pub(crate) fn read_span(file: &mut std::fs::File, range: Range<u64>) -> Result<Vec<u8>, TransferError> {
    let mut buf = vec![0u8; (range.end - range.start) as usize];
    file.seek(SeekFrom::Start(range.start))?;
    file.read_exact(&mut buf)?;
    Ok(buf)
}

/// Content type for a report file name, or `""` when the extension is unknown.
fn guess_mime_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => MIME_CSV,
        "xls" => MIME_LEGACY_EXCEL,
        "xlsx" => MIME_MODERN_EXCEL,
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        let f = FileHandle::new("Report.XLSX", "", b"x".to_vec());
        assert_eq!(f.extension().as_deref(), Some("xlsx"));
    }

    #[test]
    fn no_extension() {
        let f = FileHandle::new("report", "", Vec::<u8>::new());
        assert_eq!(f.extension(), None);
        let f = FileHandle::new("report.", "", Vec::<u8>::new());
        assert_eq!(f.extension(), None);
    }

    #[test]
    fn guess_known_types() {
        assert_eq!(guess_mime_type("a.csv"), MIME_CSV);
        assert_eq!(guess_mime_type("a.XLS"), MIME_LEGACY_EXCEL);
        assert_eq!(guess_mime_type("a.b.xlsx"), MIME_MODERN_EXCEL);
        assert_eq!(guess_mime_type("a.txt"), "");
        assert_eq!(guess_mime_type("noext"), "");
    }

    #[test]
    fn from_path_reads_metadata_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labor.csv");
        std::fs::write(&path, b"a,b\n1,2\n").unwrap();

        let f = FileHandle::from_path(&path).unwrap();
        assert_eq!(f.name(), "labor.csv");
        assert_eq!(f.mime_type(), MIME_CSV);
        assert_eq!(f.size(), 8);
        assert_eq!(f.path(), Some(path.as_path()));

        // Content changes after opening show up on the next read.
        std::fs::write(&path, b"x,y\n3,4\n").unwrap();
        assert_eq!(f.read_all().unwrap(), b"x,y\n3,4\n");
        assert_eq!(f.read_range(4..8).unwrap(), b"3,4\n");
    }

    #[test]
    fn disk_file_truncated_after_open_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labor.csv");
        std::fs::write(&path, b"a,b\n1,2\n").unwrap();
        let f = FileHandle::from_path(&path).unwrap();

        std::fs::write(&path, b"a").unwrap();
        assert!(matches!(f.read_all(), Err(TransferError::Io(_))));
    }

    #[test]
    fn from_path_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileHandle::from_path(&dir.path().join("missing.csv"));
        assert!(matches!(result, Err(TransferError::Io(_))));
    }

    #[test]
    fn from_path_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileHandle::from_path(dir.path());
        assert!(matches!(result, Err(TransferError::NotAFile(_))));
    }

    #[test]
    fn memory_ranges() {
        let f = FileHandle::new("a.csv", MIME_CSV, b"0123456789".to_vec());
        assert_eq!(f.path(), None);
        assert_eq!(f.read_range(2..5).unwrap(), b"234");
        assert_eq!(f.read_all().unwrap(), b"0123456789");
        assert!(matches!(
            f.read_range(8..11),
            Err(TransferError::OutOfRange { size: 10, .. })
        ));
    }
}
