//! File resources: logical file names mapped to local files or in-memory text
//!
//! Downloading and caching happen elsewhere. By the time a loader runs, every
//! file it may need is either a local path or a string already in memory.

use crate::error::{OmicsError, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

/// A single readable resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Path(PathBuf),
    /// Text held in memory, mostly for tests and piped input
    Inline(String),
}

/// Ordered mapping of logical file name to resource
#[derive(Debug, Clone, Default)]
pub struct FileResources {
    entries: Vec<(String, Resource)>,
}

impl FileResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a resource under `name`
    pub fn insert(&mut self, name: impl Into<String>, resource: Resource) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = resource,
            None => self.entries.push((name, resource)),
        }
    }

    pub fn insert_path(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.insert(name, Resource::Path(path.into()));
    }

    pub fn insert_inline(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.insert(name, Resource::Inline(content.into()));
    }

    /// Builder-style variant of [`FileResources::insert_path`]
    pub fn with_path(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.insert_path(name, path);
        self
    }

    /// Builder-style variant of [`FileResources::insert_inline`]
    pub fn with_inline(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert_inline(name, content);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Logical names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// First logical name matching `predicate`
    pub fn find_name(&self, predicate: impl Fn(&str) -> bool) -> Option<&str> {
        self.names().find(|n| predicate(n))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Open a resource for buffered reading.
    ///
    /// Files whose logical name or path ends in `.gz` are decompressed on the fly.
    pub fn open(&self, name: &str) -> Result<Box<dyn BufRead>> {
        let resource = self
            .get(name)
            .ok_or_else(|| OmicsError::ResourceNotFound(name.to_string()))?;

        match resource {
            Resource::Inline(content) => Ok(Box::new(Cursor::new(content.clone().into_bytes()))),
            Resource::Path(path) => {
                let file = File::open(path).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        OmicsError::ResourceNotFound(format!("{} ({})", name, path.display()))
                    } else {
                        OmicsError::Io(e)
                    }
                })?;

                if is_gzip(name) || is_gzip_path(path) {
                    Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
                } else {
                    Ok(Box::new(BufReader::new(file)))
                }
            },
        }
    }

    /// Read a resource fully into a string
    pub fn read_to_string(&self, name: &str) -> Result<String> {
        let mut reader = self.open(name)?;
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Ok(content)
    }
}

impl<N: Into<String>, P: Into<PathBuf>> FromIterator<(N, P)> for FileResources {
    fn from_iter<I: IntoIterator<Item = (N, P)>>(iter: I) -> Self {
        let mut resources = FileResources::new();
        for (name, path) in iter {
            resources.insert_path(name, path);
        }
        resources
    }
}

fn is_gzip(name: &str) -> bool {
    name.ends_with(".gz")
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Parse a `NAME=PATH` pair as given on the command line
pub fn parse_resource_arg(arg: &str) -> Result<(String, PathBuf)> {
    let (name, path) = arg
        .split_once('=')
        .ok_or_else(|| OmicsError::Parse(format!("expected NAME=PATH, got '{}'", arg)))?;

    if name.trim().is_empty() || path.trim().is_empty() {
        return Err(OmicsError::Parse(format!("expected NAME=PATH, got '{}'", arg)));
    }

    Ok((name.trim().to_string(), PathBuf::from(path.trim())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_inline_resource() {
        let resources = FileResources::new().with_inline("entry.list", "IPR000001\tDomain\n");
        let content = resources.read_to_string("entry.list").unwrap();
        assert_eq!(content, "IPR000001\tDomain\n");
    }

    #[test]
    fn test_missing_resource() {
        let resources = FileResources::new();
        assert!(matches!(
            resources.open("go-basic.obo"),
            Err(OmicsError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_insert_replaces_and_keeps_order() {
        let mut resources = FileResources::new();
        resources.insert_path("a.obo", "/tmp/a.obo");
        resources.insert_path("b.gaf", "/tmp/b.gaf");
        resources.insert_path("a.obo", "/tmp/other.obo");

        assert_eq!(resources.len(), 2);
        assert_eq!(resources.names().collect::<Vec<_>>(), vec!["a.obo", "b.gaf"]);
        assert_eq!(
            resources.get("a.obo"),
            Some(&Resource::Path(PathBuf::from("/tmp/other.obo")))
        );
    }

    #[test]
    fn test_gzip_resource_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goa_human.gaf.gz");

        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"!gaf-version: 2.2\n").unwrap();
        encoder.finish().unwrap();

        let resources = FileResources::new().with_path("goa_human.gaf.gz", &path);
        assert_eq!(
            resources.read_to_string("goa_human.gaf.gz").unwrap(),
            "!gaf-version: 2.2\n"
        );
    }

    #[test]
    fn test_parse_resource_arg() {
        let (name, path) = parse_resource_arg("go-basic.obo=/data/go-basic.obo").unwrap();
        assert_eq!(name, "go-basic.obo");
        assert_eq!(path, PathBuf::from("/data/go-basic.obo"));

        assert!(parse_resource_arg("go-basic.obo").is_err());
        assert!(parse_resource_arg("=/data/x").is_err());
    }
}
