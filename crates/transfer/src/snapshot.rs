use std::path::Path;

use crate::TransferError;

/// Number of chunks needed to cover `size` bytes at `chunk_size` bytes
/// per chunk. A zero-length file has zero chunks.
pub fn total_chunks(size: usize, chunk_size: usize) -> usize {
    size.div_ceil(chunk_size)
}

/// Immutable in-memory capture of a source file.
///
/// Created once per upload session and held until the session completes
/// or is reset. The whole file is buffered up front; chunks are borrowed
/// slices into the buffer, so iterating them never copies data.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    name: String,
    media_type: String,
    data: Vec<u8>,
}

/// A contiguous byte range of a [`FileSnapshot`].
///
/// The last chunk of a file may be shorter than the configured chunk
/// size; every other chunk is exactly that size.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    /// 0-based sequence index.
    pub index: usize,
    /// Total chunk count for the snapshot at the slicing chunk size.
    pub total: usize,
    /// The chunk bytes.
    pub data: &'a [u8],
}

impl FileSnapshot {
    /// Captures a snapshot by reading the entire file at `path`.
    ///
    /// The media type is guessed from the file extension, falling back
    /// to `application/octet-stream`.
    pub fn from_path(path: &Path) -> Result<Self, TransferError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| TransferError::InvalidName(path.display().to_string()))?
            .to_string();
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        let data = std::fs::read(path)?;
        Ok(Self {
            name,
            media_type,
            data,
        })
    }

    /// Builds a snapshot from bytes already in memory.
    pub fn from_bytes(name: impl Into<String>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data,
        }
    }

    /// Target file name on the receiver.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type of the source file.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Total size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The raw file bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Chunk count at the given chunk size.
    pub fn total_chunks(&self, chunk_size: usize) -> usize {
        total_chunks(self.data.len(), chunk_size)
    }

    /// Returns the chunk at `index`, or `None` if `index` is past the
    /// end of the file.
    pub fn chunk(&self, index: usize, chunk_size: usize) -> Option<Chunk<'_>> {
        let total = self.total_chunks(chunk_size);
        if index >= total {
            return None;
        }
        let start = index * chunk_size;
        let end = (start + chunk_size).min(self.data.len());
        Some(Chunk {
            index,
            total,
            data: &self.data[start..end],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn snapshot(data: &[u8]) -> FileSnapshot {
        FileSnapshot::from_bytes("test.bin", "application/octet-stream", data.to_vec())
    }

    #[test]
    fn chunk_count_is_ceiling_division() {
        assert_eq!(total_chunks(0, 10), 0);
        assert_eq!(total_chunks(1, 10), 1);
        assert_eq!(total_chunks(10, 10), 1);
        assert_eq!(total_chunks(11, 10), 2);
        assert_eq!(total_chunks(25, 10), 3);
        assert_eq!(total_chunks(120_000, 50_000), 3);
    }

    #[test]
    fn chunks_concatenate_to_original() {
        // Exercise both adjacent (size % chunk == 0) and ragged boundaries.
        for len in [0usize, 1, 9, 10, 11, 25, 100] {
            let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let snap = snapshot(&data);
            let mut rebuilt = Vec::new();
            for i in 0..snap.total_chunks(10) {
                rebuilt.extend_from_slice(snap.chunk(i, 10).unwrap().data);
            }
            assert_eq!(rebuilt, data, "length {len}");
        }
    }

    #[test]
    fn last_chunk_may_be_short() {
        let snap = snapshot(&[0u8; 25]);
        let last = snap.chunk(2, 10).unwrap();
        assert_eq!(last.data.len(), 5);
        assert_eq!(last.total, 3);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail_chunk() {
        let snap = snapshot(&[0u8; 20]);
        assert_eq!(snap.total_chunks(10), 2);
        assert!(snap.chunk(2, 10).is_none());
    }

    #[test]
    fn out_of_range_index_is_none() {
        let snap = snapshot(b"abc");
        assert!(snap.chunk(1, 10).is_none());
        assert!(snapshot(b"").chunk(0, 10).is_none());
    }

    #[test]
    fn from_path_captures_name_size_and_media_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"hello chunkferry").unwrap();

        let snap = FileSnapshot::from_path(&path).unwrap();
        assert_eq!(snap.name(), "notes.txt");
        assert_eq!(snap.size(), 16);
        assert_eq!(snap.media_type(), "text/plain");
        assert_eq!(snap.data(), b"hello chunkferry");
    }

    #[test]
    fn from_path_unknown_extension_falls_back_to_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.zzz");
        std::fs::write(&path, b"x").unwrap();

        let snap = FileSnapshot::from_path(&path).unwrap();
        assert_eq!(snap.media_type(), "application/octet-stream");
    }

    #[test]
    fn from_path_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileSnapshot::from_path(&dir.path().join("absent.bin"));
        assert!(matches!(result, Err(TransferError::Io(_))));
    }
}
