use std::io::{Cursor, Write};

use zip::{write::FileOptions, ZipWriter};

use crate::{
    error::{ForgeError, Result},
    models::OutputFormat,
};

pub const ARCHIVE_FILE_NAME: &str = "output_files.zip";

/// In-memory zip builder for bulk download. Entries are named
/// `output_file_<n>.<ext>` in insertion order, 1-indexed.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    extension: &'static str,
    count: usize,
}

impl ArchiveBuilder {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            extension: format.extension(),
            count: 0,
        }
    }

    pub fn add_image(&mut self, bytes: &[u8]) -> Result<()> {
        let name = format!("output_file_{}.{}", self.count + 1, self.extension);
        self.writer
            .start_file(name, FileOptions::default())
            .map_err(|e| ForgeError::ArchiveError(e.to_string()))?;
        self.writer.write_all(bytes)?;
        self.count += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn finish(mut self) -> Result<Vec<u8>> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| ForgeError::ArchiveError(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::ZipArchive;

    #[test]
    fn test_entries_named_sequentially() {
        let mut builder = ArchiveBuilder::new(OutputFormat::Png);
        builder.add_image(b"first").unwrap();
        builder.add_image(b"second").unwrap();
        builder.add_image(b"third").unwrap();
        assert_eq!(builder.len(), 3);

        let bytes = builder.finish().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);
        for (i, expected) in ["output_file_1.png", "output_file_2.png", "output_file_3.png"]
            .iter()
            .enumerate()
        {
            let entry = archive.by_index(i).unwrap();
            assert_eq!(entry.name(), *expected);
        }
    }

    #[test]
    fn test_extension_follows_format() {
        let mut builder = ArchiveBuilder::new(OutputFormat::Webp);
        builder.add_image(b"img").unwrap();
        let bytes = builder.finish().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), "output_file_1.webp");
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let builder = ArchiveBuilder::new(OutputFormat::Jpg);
        assert!(builder.is_empty());
        let bytes = builder.finish().unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
