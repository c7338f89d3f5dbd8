//! # Packaging
//!
//! Bundles the generated documents into a single zip archive for download.

use crate::codegen::{GeneratedFile, GeneratedProject};
use crate::error::Result;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Write the main document followed by every auxiliary document into a zip
/// archive. An archive is produced even when there are no auxiliary files.
pub fn package(main: &GeneratedFile, auxiliary: &[GeneratedFile]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    // Fixed entry timestamps keep the archive bytes reproducible.
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    for file in std::iter::once(main).chain(auxiliary) {
        tracing::debug!("[SAGC] Archiving {} ({} bytes)", file.name, file.content.len());
        writer.start_file(file.name.as_str(), options)?;
        writer.write_all(file.content.as_bytes())?;
    }

    Ok(writer.finish()?.into_inner())
}

impl GeneratedProject {
    pub fn to_archive(&self) -> Result<Vec<u8>> {
        package(&self.main, &self.auxiliary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn file(name: &str, content: &str) -> GeneratedFile {
        GeneratedFile {
            name: name.into(),
            content: content.into(),
        }
    }

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn archive_without_auxiliary_files_holds_main_only() {
        let bytes = package(&file("spade_code.py", "import spade\n"), &[]).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(read_entry(&bytes, "spade_code.py"), "import spade\n");
    }

    #[test]
    fn auxiliary_files_follow_main() {
        let bytes = package(
            &file("spade_code.py", "main"),
            &[file("alice_program.asl", "!start.")],
        )
        .unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"spade_code.py"));
        assert_eq!(read_entry(&bytes, "alice_program.asl"), "!start.");
    }

    #[test]
    fn packaging_is_deterministic() {
        let main = file("spade_code.py", "print('hi')\n");
        assert_eq!(package(&main, &[]).unwrap(), package(&main, &[]).unwrap());
    }
}
