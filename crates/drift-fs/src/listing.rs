//! Directory listings as three deterministically sorted name lists

use std::fs;

use crate::{Error, NormalizedPath, Result};

/// Snapshot of a directory's entries, split by kind and sorted by name.
///
/// The split and ordering are what make directory hashes independent of
/// the order the underlying filesystem enumerates entries. Symlinks are
/// classified by the link itself, never by what it points at, so a
/// dangling link is still a link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
    pub links: Vec<String>,
}

impl Listing {
    /// Read a directory into a sorted listing.
    pub fn read(path: &NormalizedPath) -> Result<Self> {
        let native = path.to_native();
        if !native.is_dir() {
            return Err(Error::NotADirectory { path: native });
        }

        let mut listing = Listing::default();
        let entries = fs::read_dir(&native).map_err(|e| Error::io(&native, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&native, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            // symlink_metadata never follows the link
            let meta = fs::symlink_metadata(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            if meta.file_type().is_symlink() {
                listing.links.push(name);
            } else if meta.is_dir() {
                listing.dirs.push(name);
            } else {
                listing.files.push(name);
            }
        }

        listing.dirs.sort_unstable();
        listing.files.sort_unstable();
        listing.links.sort_unstable();
        Ok(listing)
    }

    /// True when a name appears in any category.
    pub fn contains(&self, name: &str) -> bool {
        self.dirs.iter().any(|n| n == name)
            || self.files.iter().any(|n| n == name)
            || self.links.iter().any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty() && self.links.is_empty()
    }
}
