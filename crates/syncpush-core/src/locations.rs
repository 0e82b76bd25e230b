//! Local-to-remote location mapping.
//!
//! The mapping lives in a plain text file with one
//! `<absolute local path> <remote>` pair per line. A line belongs to a
//! local path when it starts with that exact path followed by a space.

use crate::error::{Result, SyncError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the mapping file inside the user's home directory.
pub const LOCATIONS_FILE_NAME: &str = "locations.ini";

/// In-memory view of the location file.
#[derive(Debug, Clone)]
pub struct LocationStore {
    path: PathBuf,
    lines: Vec<String>,
}

impl LocationStore {
    /// Loads the mapping file at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let lines = match fs::read_to_string(&path) {
            Ok(contents) => contents
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No location file at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(SyncError::io(&path, e)),
        };
        Ok(Self { path, lines })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the remote mapped to `local`, if any.
    pub fn lookup(&self, local: &Path) -> Option<&str> {
        let key = local.to_string_lossy();
        self.lines
            .iter()
            .find_map(|line| remote_for(line, &key))
            .filter(|remote| !remote.is_empty())
    }

    /// Maps `local` to `remote`, replacing any previous mapping.
    pub fn set(&mut self, local: &Path, remote: &str) {
        self.remove(local);
        self.lines
            .push(format!("{} {}", local.to_string_lossy(), remote.trim()));
    }

    /// Drops the mapping for `local`. Returns whether one existed.
    pub fn remove(&mut self, local: &Path) -> bool {
        let key = local.to_string_lossy();
        let before = self.lines.len();
        self.lines.retain(|line| remote_for(line, &key).is_none());
        self.lines.len() != before
    }

    /// Raw mapping lines, in file order.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Writes the mapping back to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
            }
        }

        let mut contents = self.lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        fs::write(&self.path, contents).map_err(|e| SyncError::io(&self.path, e))
    }
}

fn remote_for<'a>(line: &'a str, local: &str) -> Option<&'a str> {
    line.strip_prefix(local)?.strip_prefix(' ').map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = LocationStore::open(dir.path().join(LOCATIONS_FILE_NAME)).unwrap();
        assert_eq!(store.entries().count(), 0);
        assert!(store.lookup(Path::new("/home/me/site")).is_none());
    }

    #[test]
    fn test_lookup_matches_whole_path() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(LOCATIONS_FILE_NAME);
        fs::write(
            &file,
            "/home/me/site-old host:/old\n/home/me/site host:/new\n",
        )
        .unwrap();

        let store = LocationStore::open(&file).unwrap();
        assert_eq!(store.lookup(Path::new("/home/me/site")), Some("host:/new"));
        assert_eq!(store.lookup(Path::new("/home/me/site-old")), Some("host:/old"));
        assert!(store.lookup(Path::new("/home/me")).is_none());
    }

    #[test]
    fn test_lookup_handles_spaces_in_local_path() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(LOCATIONS_FILE_NAME);
        fs::write(&file, "/home/me/my site host:/dst\n").unwrap();

        let store = LocationStore::open(&file).unwrap();
        assert_eq!(store.lookup(Path::new("/home/me/my site")), Some("host:/dst"));
    }

    #[test]
    fn test_set_replaces_and_persists() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("nested").join(LOCATIONS_FILE_NAME);
        let local = Path::new("/home/me/site");

        let mut store = LocationStore::open(&file).unwrap();
        store.set(local, "host:/a");
        store.set(local, "host:/b\n");
        store.save().unwrap();

        let contents = fs::read_to_string(&file).unwrap();
        assert_eq!(contents, "/home/me/site host:/b\n");

        let reopened = LocationStore::open(&file).unwrap();
        assert_eq!(reopened.lookup(local), Some("host:/b"));
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(LOCATIONS_FILE_NAME);
        let mut store = LocationStore::open(&file).unwrap();
        store.set(Path::new("/a"), "host:/a");
        store.set(Path::new("/b"), "host:/b");

        assert!(store.remove(Path::new("/a")));
        assert!(!store.remove(Path::new("/a")));

        let entries: Vec<_> = store.entries().collect();
        assert_eq!(entries, vec!["/b host:/b"]);
    }
}
