//! Filesystem access to the site being checked

use std::{
    fs,
    path::{
        Component,
        Path,
        PathBuf,
    },
};

use walkdir::WalkDir;

use crate::{
    config::SiteConfig,
    error::{
        CheckError,
        CheckResult,
    },
};

/// Handle on a site checkout and the configuration used to check it
#[derive(Debug, Clone)]
pub struct Site {
    root:   PathBuf,
    config: SiteConfig,
}

impl Site {
    /// Create a site handle
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Create a site handle with the default configuration
    pub fn with_defaults(root: impl Into<PathBuf>) -> Self {
        Self::new(root, SiteConfig::default())
    }

    /// Site root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Active configuration
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Absolute path of a site-relative path
    pub fn abs(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }

    /// Site-relative POSIX path of `path`; paths outside the root are
    /// returned as-is
    pub fn rel(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        to_posix(rel)
    }

    /// Whether a site-relative path is a regular file
    pub fn is_file(&self, rel: impl AsRef<Path>) -> bool {
        self.abs(rel).is_file()
    }

    /// Whether a site-relative path is a directory
    pub fn is_dir(&self, rel: impl AsRef<Path>) -> bool {
        self.abs(rel).is_dir()
    }

    /// Read a site-relative file as text, replacing invalid UTF-8
    pub fn read_text(&self, rel: impl AsRef<Path>) -> CheckResult<String> {
        let path = self.abs(rel);
        let bytes = fs::read(&path).map_err(|e| CheckError::io(path, e))?;
        Ok(decode_text(bytes))
    }

    /// Size in bytes of a site-relative file
    pub fn file_size(&self, rel: impl AsRef<Path>) -> CheckResult<u64> {
        let path = self.abs(rel);
        fs::metadata(&path).map(|m| m.len()).map_err(|e| CheckError::io(path, e))
    }

    /// Every regular file under `start` (site-relative), as sorted POSIX
    /// paths relative to the site root. Directories named in `skip_dirs`
    /// are not entered.
    pub fn list_files(&self, start: &str, skip_dirs: &[String]) -> CheckResult<Vec<String>> {
        let start_dir = self.abs(start);
        let mut files = Vec::new();

        let walker = WalkDir::new(&start_dir).follow_links(false).into_iter().filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !skip_dirs.iter().any(|skip| entry.file_name() == skip.as_str())
        });

        for entry in walker {
            let entry = entry.map_err(|e| CheckError::Walk {
                path:    start_dir.clone(),
                message: e.to_string(),
            })?;
            if entry.file_type().is_file() {
                files.push(self.rel(entry.path()));
            }
        }

        files.sort();
        Ok(files)
    }

    /// Names of the immediate subdirectories of a site-relative directory,
    /// sorted
    pub fn subdirectories(&self, rel: &str) -> CheckResult<Vec<String>> {
        let dir = self.abs(rel);
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| CheckError::io(&dir, e))? {
            let entry = entry.map_err(|e| CheckError::io(&dir, e))?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Decode file bytes as UTF-8, substituting U+FFFD for invalid sequences
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Convert a path to a `/`-separated string
pub fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Lexically normalize a path, resolving `.` and `..` without touching the
/// filesystem
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                },
                Some(Component::RootDir | Component::Prefix(_)) => {},
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
