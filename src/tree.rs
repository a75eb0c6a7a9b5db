use std::collections::HashSet;
use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use tokio::fs;

/// A filesystem node the server is willing to talk about. Absence is
/// represented by `None` at the classification site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    Directory(PathBuf),
    File(PathBuf),
}

impl Entry {
    pub fn path(&self) -> &Path {
        match self {
            Entry::Directory(path) | Entry::File(path) => path,
        }
    }
}

#[derive(Debug)]
pub enum TreeError {
    Outside,
    CycleDetected(PathBuf),
    Io(io::Error),
}

impl From<io::Error> for TreeError {
    fn from(err: io::Error) -> Self {
        TreeError::Io(err)
    }
}

/// The directory tree scoped to a gallery root. The root must already be
/// canonical; containment checks compare canonical paths against it.
#[derive(Clone, Debug)]
pub struct Tree {
    root: PathBuf,
}

impl Tree {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a decoded request path onto the root without touching the
    /// filesystem. `..`, root and prefix components are rejected outright.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, TreeError> {
        let trimmed = relative.trim_start_matches(['/', '\\']);
        let mut normalized = PathBuf::new();

        for component in Path::new(trimmed).components() {
            match component {
                Component::Normal(segment) => normalized.push(segment),
                Component::CurDir => continue,
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(TreeError::Outside);
                }
            }
        }

        Ok(self.root.join(normalized))
    }

    /// Resolves and classifies a request path. Entries whose canonical
    /// location escapes the root (symlinks pointing elsewhere) count as
    /// outside, not merely absent.
    pub async fn lookup(&self, relative: &str) -> Result<Option<Entry>, TreeError> {
        let target = self.resolve(relative)?;
        let Some(entry) = classify(&target).await else {
            return Ok(None);
        };
        match fs::canonicalize(entry.path()).await {
            Ok(canonical) if canonical.starts_with(&self.root) => Ok(Some(entry)),
            Ok(_) => Err(TreeError::Outside),
            Err(_) => Ok(None),
        }
    }

    /// Lists a directory's immediate children in OS listing order. Children
    /// that no longer classify (broken symlinks, permission failures) are
    /// dropped; an unreadable directory itself is an error.
    pub async fn list_children(&self, dir: &Path) -> Result<Vec<Entry>, TreeError> {
        let mut reader = fs::read_dir(dir).await?;
        let mut entries = Vec::new();

        while let Some(child) = reader.next_entry().await? {
            if let Some(entry) = classify(&child.path()).await {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    /// Depth-first traversal collecting every file under `dir`, directories
    /// recursed into in listing order and never yielded themselves. Each
    /// call re-reads the filesystem. Entries whose canonical location
    /// escapes the root (symlinks pointing elsewhere) are skipped, the same
    /// containment `lookup` enforces. Revisiting a directory already seen
    /// in this traversal (a symlink loop) aborts the walk.
    pub async fn walk(&self, dir: &Path) -> Result<Vec<PathBuf>, TreeError> {
        let mut files = Vec::new();
        let mut visited = HashSet::new();
        if let Ok(canonical) = fs::canonicalize(dir).await {
            visited.insert(canonical);
        }
        self.walk_into(dir, &mut files, &mut visited).await?;
        Ok(files)
    }

    fn walk_into<'a>(
        &'a self,
        dir: &'a Path,
        files: &'a mut Vec<PathBuf>,
        visited: &'a mut HashSet<PathBuf>,
    ) -> Pin<Box<dyn Future<Output = Result<(), TreeError>> + Send + 'a>> {
        Box::pin(async move {
            for entry in self.list_children(dir).await? {
                // Entries that vanished or escape the root since listing
                // are dropped, like children that fail to classify.
                let Ok(canonical) = fs::canonicalize(entry.path()).await else {
                    continue;
                };
                if !canonical.starts_with(&self.root) {
                    continue;
                }
                match entry {
                    Entry::Directory(path) => {
                        if !visited.insert(canonical) {
                            return Err(TreeError::CycleDetected(path));
                        }
                        self.walk_into(&path, files, visited).await?;
                    }
                    Entry::File(path) => files.push(path),
                }
            }
            Ok(())
        })
    }
}

async fn classify(path: &Path) -> Option<Entry> {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Some(Entry::Directory(path.to_path_buf())),
        Ok(metadata) if metadata.is_file() => Some(Entry::File(path.to_path_buf())),
        _ => None,
    }
}

/// Strips the `base` prefix from `pathname` if present, otherwise returns
/// `pathname` unchanged. Not a security boundary.
pub fn relative_to<'a>(base: &str, pathname: &'a str) -> &'a str {
    pathname.strip_prefix(base).unwrap_or(pathname)
}

/// Joins two path segments with exactly one separator between them.
pub fn join(a: &str, b: &str) -> String {
    format!("{}/{}", a.trim_end_matches('/'), b.trim_start_matches('/'))
}
