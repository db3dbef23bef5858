use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use binrw::{BinRead, BinWrite};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::ClassFile;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum JarError {
    Io(std::io::Error),
    Zip(zip::result::ZipError),
    ClassParse(binrw::Error),
}

impl std::fmt::Display for JarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JarError::Io(e) => write!(f, "I/O error: {e}"),
            JarError::Zip(e) => write!(f, "ZIP error: {e}"),
            JarError::ClassParse(e) => write!(f, "class parse error: {e}"),
        }
    }
}

impl std::error::Error for JarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JarError::Io(e) => Some(e),
            JarError::Zip(e) => Some(e),
            JarError::ClassParse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for JarError {
    fn from(e: std::io::Error) -> Self {
        JarError::Io(e)
    }
}

impl From<zip::result::ZipError> for JarError {
    fn from(e: zip::result::ZipError) -> Self {
        JarError::Zip(e)
    }
}

impl From<binrw::Error> for JarError {
    fn from(e: binrw::Error) -> Self {
        JarError::ClassParse(e)
    }
}

pub type JarResult<T> = Result<T, JarError>;

// ---------------------------------------------------------------------------
// JarFile
// ---------------------------------------------------------------------------

/// In-memory representation of a JAR (ZIP) archive.
///
/// Entries are stored as a `BTreeMap<String, Vec<u8>>` mapping entry paths to
/// raw bytes. This avoids lifetime issues with `ZipArchive`, allows free
/// mutation before writing, and gives the indexer a stable snapshot: a scan
/// always sees the jar as it was when loaded.
#[derive(Clone, Debug, Default)]
pub struct JarFile {
    entries: BTreeMap<String, Vec<u8>>,
}

impl JarFile {
    /// Create an empty JAR.
    pub fn new() -> Self {
        JarFile {
            entries: BTreeMap::new(),
        }
    }

    // -- Reading --

    /// Read a JAR from any reader.
    pub fn read<R: Read + Seek>(reader: R) -> JarResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut entries = BTreeMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.insert(name, data);
        }

        Ok(JarFile { entries })
    }

    /// Read a JAR from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> JarResult<Self> {
        Self::read(Cursor::new(bytes))
    }

    /// Read a JAR from a file path.
    pub fn open(path: impl AsRef<Path>) -> JarResult<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Self::read(reader)
    }

    // -- Writing --

    /// Write the JAR to any writer using Deflated compression.
    pub fn write<W: Write + Seek>(&self, writer: W) -> JarResult<()> {
        let mut zip_writer = zip::ZipWriter::new(writer);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in &self.entries {
            zip_writer.start_file(name.as_str(), options)?;
            zip_writer.write_all(data)?;
        }

        zip_writer.finish()?;
        Ok(())
    }

    /// Serialize the JAR to a byte vector.
    pub fn to_bytes(&self) -> JarResult<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.write(&mut buf)?;
        Ok(buf.into_inner())
    }

    /// Write the JAR to a file path.
    pub fn save(&self, path: impl AsRef<Path>) -> JarResult<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        self.write(writer)
    }

    // -- Entry access --

    /// Iterate over all entry paths (sorted).
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    /// Iterate over the internal class names of all `.class` entries.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.entry_names()
            .filter_map(|n| n.strip_suffix(".class"))
    }

    /// Get the raw bytes of an entry.
    pub fn get_entry(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(|v| v.as_slice())
    }

    /// Get the raw bytes of a class by internal name.
    pub fn get_class_bytes(&self, class_name: &str) -> Option<&[u8]> {
        self.get_entry(&format!("{class_name}.class"))
    }

    /// Insert or replace an entry.
    pub fn set_entry(&mut self, path: impl Into<String>, data: Vec<u8>) {
        self.entries.insert(path.into(), data);
    }

    /// Remove an entry, returning its data if it existed.
    pub fn remove_entry(&mut self, path: &str) -> Option<Vec<u8>> {
        self.entries.remove(path)
    }

    /// Check whether an entry exists.
    pub fn contains_entry(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    // -- ClassFile integration --

    /// Parse a class by internal name into a `ClassFile`.
    pub fn parse_class(&self, class_name: &str) -> JarResult<ClassFile> {
        let data = self.get_class_bytes(class_name).ok_or_else(|| {
            JarError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("class not found: {class_name}"),
            ))
        })?;
        let mut cursor = Cursor::new(data);
        let class_file = ClassFile::read(&mut cursor)?;
        Ok(class_file)
    }

    /// Serialize a `ClassFile` and store it under its internal name.
    pub fn set_class(&mut self, class_name: &str, class_file: &ClassFile) -> JarResult<()> {
        let mut buf = Cursor::new(Vec::new());
        class_file.write(&mut buf)?;
        self.set_entry(format!("{class_name}.class"), buf.into_inner());
        Ok(())
    }
}
