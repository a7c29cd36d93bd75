use sevenz_rust2::{Password, SevenZReader};
use std::io::{self, Cursor, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use zip::ZipArchive;

use crate::domain::error::SubtitleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Rar,
    SevenZip,
}

impl ArchiveFormat {
    /// Accepts `zip`, `.zip`, `ZIP` and the like.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim_start_matches('.').to_lowercase().as_str() {
            "zip" => Some(ArchiveFormat::Zip),
            "rar" => Some(ArchiveFormat::Rar),
            "7z" | "sevenzip" => Some(ArchiveFormat::SevenZip),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => ".zip",
            ArchiveFormat::Rar => ".rar",
            ArchiveFormat::SevenZip => ".7z",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Rar => "rar",
            ArchiveFormat::SevenZip => "7z",
        }
    }

    /// Format to retry with when a downloaded package does not open as declared.
    fn fallback(self) -> Option<Self> {
        match self {
            ArchiveFormat::SevenZip => Some(ArchiveFormat::Zip),
            ArchiveFormat::Zip => Some(ArchiveFormat::Rar),
            ArchiveFormat::Rar => None,
        }
    }
}

/// A name as listed by the archive library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub name: String,
    pub is_directory: bool,
}

/// An opened archive held fully in memory.
pub enum ArchiveReader {
    Zip(ZipArchive<Cursor<Vec<u8>>>),
    Rar(RarContainer),
    SevenZip(SevenZipContainer),
}

impl ArchiveReader {
    pub fn open(format: ArchiveFormat, bytes: Vec<u8>) -> Result<Self, SubtitleError> {
        match format {
            ArchiveFormat::Zip => ZipArchive::new(Cursor::new(bytes))
                .map(ArchiveReader::Zip)
                .map_err(|e| SubtitleError::malformed(format.label(), e)),
            ArchiveFormat::Rar => RarContainer::new(&bytes).map(ArchiveReader::Rar),
            ArchiveFormat::SevenZip => SevenZipContainer::new(bytes).map(ArchiveReader::SevenZip),
        }
    }

    /// Open a downloaded package, falling back 7z -> zip -> rar when the
    /// declared format is wrong.
    pub fn open_package(declared: ArchiveFormat, bytes: &[u8]) -> Result<Self, SubtitleError> {
        let mut format = declared;
        loop {
            match ArchiveReader::open(format, bytes.to_vec()) {
                Ok(reader) => return Ok(reader),
                Err(e) => match format.fallback() {
                    Some(next) => {
                        log::debug!(
                            "package does not open as {}: {e}; trying {}",
                            format.label(),
                            next.label()
                        );
                        format = next;
                    }
                    None => return Err(e),
                },
            }
        }
    }

    pub fn format(&self) -> ArchiveFormat {
        match self {
            ArchiveReader::Zip(_) => ArchiveFormat::Zip,
            ArchiveReader::Rar(_) => ArchiveFormat::Rar,
            ArchiveReader::SevenZip(_) => ArchiveFormat::SevenZip,
        }
    }

    pub fn entries(&mut self) -> Result<Vec<RawEntry>, SubtitleError> {
        match self {
            ArchiveReader::Zip(archive) => {
                let mut entries = Vec::with_capacity(archive.len());
                for index in 0..archive.len() {
                    let file = archive
                        .by_index_raw(index)
                        .map_err(|e| SubtitleError::malformed("zip", e))?;
                    entries.push(RawEntry {
                        name: file.name().to_string(),
                        is_directory: file.is_dir(),
                    });
                }
                Ok(entries)
            }
            ArchiveReader::Rar(rar) => rar.entries(),
            ArchiveReader::SevenZip(sevenz) => sevenz.entries(),
        }
    }

    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, SubtitleError> {
        match self {
            ArchiveReader::Zip(archive) => {
                let mut file = match archive.by_name(name) {
                    Ok(file) => file,
                    Err(zip::result::ZipError::FileNotFound) => {
                        return Err(SubtitleError::MissingEntry(name.to_string()))
                    }
                    Err(e) => return Err(SubtitleError::malformed("zip", e)),
                };
                let mut data = Vec::with_capacity(file.size() as usize);
                file.read_to_end(&mut data)?;
                Ok(data)
            }
            ArchiveReader::Rar(rar) => rar.read_entry(name),
            ArchiveReader::SevenZip(sevenz) => sevenz.read_entry(name),
        }
    }
}

/// unrar only reads from disk, so the bytes are parked in a temp file that
/// lives as long as the container.
pub struct RarContainer {
    file: NamedTempFile,
}

impl RarContainer {
    fn new(bytes: &[u8]) -> Result<Self, SubtitleError> {
        let mut file = tempfile::Builder::new()
            .prefix("getsub-")
            .suffix(".rar")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        unrar::Archive::new(file.path())
            .open_for_listing()
            .map_err(|e| SubtitleError::malformed("rar", e))?;
        Ok(Self { file })
    }

    fn entries(&self) -> Result<Vec<RawEntry>, SubtitleError> {
        let archive = unrar::Archive::new(self.file.path())
            .open_for_listing()
            .map_err(|e| SubtitleError::malformed("rar", e))?;

        let mut entries = Vec::new();
        for header in archive {
            let header = header.map_err(|e| SubtitleError::malformed("rar", e))?;
            entries.push(RawEntry {
                name: rar_entry_name(&header.filename),
                is_directory: header.is_directory(),
            });
        }
        Ok(entries)
    }

    fn read_entry(&self, name: &str) -> Result<Vec<u8>, SubtitleError> {
        let mut archive = unrar::Archive::new(self.file.path())
            .open_for_processing()
            .map_err(|e| SubtitleError::malformed("rar", e))?;

        while let Some(header) = archive
            .read_header()
            .map_err(|e| SubtitleError::malformed("rar", e))?
        {
            let entry = header.entry();
            if entry.is_file() && rar_entry_name(&entry.filename) == name {
                let (data, _) = header
                    .read()
                    .map_err(|e| SubtitleError::malformed("rar", e))?;
                return Ok(data);
            }
            archive = header
                .skip()
                .map_err(|e| SubtitleError::malformed("rar", e))?;
        }
        Err(SubtitleError::MissingEntry(name.to_string()))
    }
}

fn rar_entry_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

pub struct SevenZipContainer {
    bytes: Vec<u8>,
}

impl SevenZipContainer {
    fn new(bytes: Vec<u8>) -> Result<Self, SubtitleError> {
        SevenZReader::new(Cursor::new(bytes.as_slice()), Password::empty())
            .map_err(|e| SubtitleError::malformed("7z", e))?;
        Ok(Self { bytes })
    }

    fn reader(&self) -> Result<SevenZReader<Cursor<&[u8]>>, SubtitleError> {
        SevenZReader::new(Cursor::new(self.bytes.as_slice()), Password::empty())
            .map_err(|e| SubtitleError::malformed("7z", e))
    }

    fn entries(&self) -> Result<Vec<RawEntry>, SubtitleError> {
        let reader = self.reader()?;
        Ok(reader
            .archive()
            .files
            .iter()
            .map(|entry| RawEntry {
                name: entry.name.clone(),
                is_directory: entry.is_directory,
            })
            .collect())
    }

    fn read_entry(&self, name: &str) -> Result<Vec<u8>, SubtitleError> {
        let mut reader = self.reader()?;
        let mut found = None;
        reader
            .for_each_entries(|entry, data| {
                if entry.name == name && !entry.is_directory {
                    let mut buf = Vec::with_capacity(entry.size as usize);
                    data.read_to_end(&mut buf)?;
                    found = Some(buf);
                    return Ok(false);
                }
                // Solid blocks decode sequentially; drain entries we skip.
                io::copy(data, &mut io::sink())?;
                Ok(true)
            })
            .map_err(|e| SubtitleError::malformed("7z", e))?;
        found.ok_or_else(|| SubtitleError::MissingEntry(name.to_string()))
    }
}
