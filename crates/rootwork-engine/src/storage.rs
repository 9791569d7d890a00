//! Bundle storage: read-only access to a bundle's repositories and the
//! derived-artifacts area

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use rootwork_core::{BundlePath, SourceRange};
use rootwork_indexer::walker;

/// One repository inside a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: &str, repo: &str) -> Self {
        RepoRef {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    pub fn of(path: &BundlePath) -> Self {
        RepoRef::new(&path.owner, &path.repo)
    }

    /// Bundle path of a file inside this repository.
    pub fn file(&self, rel_path: &str) -> BundlePath {
        BundlePath::new(&self.owner, &self.repo, rel_path)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Resolves bundle ids to storage handles.
#[async_trait::async_trait]
pub trait BundleStore: Send + Sync {
    /// `Ok(None)` when no bundle has this id.
    async fn open(&self, bundle_id: &str) -> Result<Option<Arc<dyn BundleStorage>>>;
}

/// Read-only view of one bundle.
#[async_trait::async_trait]
pub trait BundleStorage: Send + Sync {
    fn bundle_id(&self) -> &str;

    /// Repositories in sorted order.
    async fn list_repos(&self) -> Result<Vec<RepoRef>>;

    /// Every file of a repository, repository-relative and sorted.
    fn repo_files(&self, repo: &RepoRef) -> Result<Vec<String>>;

    /// Code files of a repository, produced lazily in sorted order.
    fn code_files(&self, repo: &RepoRef) -> Box<dyn Iterator<Item = String>>;

    async fn read_file(&self, path: &BundlePath) -> std::io::Result<String>;

    /// Locator citing `range` of a bundle file.
    fn uri(&self, path: &str, range: &SourceRange) -> String {
        bundle_uri(self.bundle_id(), path, range)
    }

    /// Directory for derived artifacts such as the global graph cache.
    fn derived_dir(&self) -> PathBuf;
}

/// `bundle://<bundleId>/<path>#L<start>-L<end>`
pub fn bundle_uri(bundle_id: &str, path: &str, range: &SourceRange) -> String {
    format!(
        "bundle://{}/{}#L{}-L{}",
        bundle_id, path, range.start_line, range.end_line
    )
}

/// Bundles laid out on disk as `<root>/<bundleId>/repos/<owner>/<repo>/norm/...`.
#[derive(Debug, Clone)]
pub struct FsBundleStore {
    root: PathBuf,
}

impl FsBundleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsBundleStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open synchronously; used by the CLI for cache maintenance.
    pub fn bundle(&self, bundle_id: &str) -> Option<FsBundle> {
        if bundle_id.is_empty()
            || bundle_id.contains(['/', '\\'])
            || bundle_id == "."
            || bundle_id == ".."
        {
            return None;
        }
        let dir = self.root.join(bundle_id);
        dir.is_dir().then(|| FsBundle::new(bundle_id, dir))
    }
}

#[async_trait::async_trait]
impl BundleStore for FsBundleStore {
    async fn open(&self, bundle_id: &str) -> Result<Option<Arc<dyn BundleStorage>>> {
        Ok(self
            .bundle(bundle_id)
            .map(|b| Arc::new(b) as Arc<dyn BundleStorage>))
    }
}

#[derive(Debug, Clone)]
pub struct FsBundle {
    id: String,
    dir: PathBuf,
}

impl FsBundle {
    pub fn new(id: &str, dir: impl Into<PathBuf>) -> Self {
        FsBundle {
            id: id.to_string(),
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn norm_root(&self, repo: &RepoRef) -> PathBuf {
        self.dir
            .join("repos")
            .join(&repo.owner)
            .join(&repo.repo)
            .join("norm")
    }
}

async fn sorted_dirs(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
    }
    names.sort();
    Ok(names)
}

#[async_trait::async_trait]
impl BundleStorage for FsBundle {
    fn bundle_id(&self) -> &str {
        &self.id
    }

    async fn list_repos(&self) -> Result<Vec<RepoRef>> {
        let repos_dir = self.dir.join("repos");
        if !repos_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut repos = Vec::new();
        for owner in sorted_dirs(&repos_dir).await? {
            for repo in sorted_dirs(&repos_dir.join(&owner)).await? {
                let repo = RepoRef::new(&owner, &repo);
                if self.norm_root(&repo).is_dir() {
                    repos.push(repo);
                }
            }
        }
        Ok(repos)
    }

    fn repo_files(&self, repo: &RepoRef) -> Result<Vec<String>> {
        let root = self.norm_root(repo);
        if !root.is_dir() {
            anyhow::bail!("repository {} has no normalized tree", repo);
        }
        let mut files: Vec<String> = walker::all_files(&root).collect();
        files.sort();
        Ok(files)
    }

    fn code_files(&self, repo: &RepoRef) -> Box<dyn Iterator<Item = String>> {
        Box::new(walker::code_files(&self.norm_root(repo)))
    }

    async fn read_file(&self, path: &BundlePath) -> std::io::Result<String> {
        let full = self
            .norm_root(&RepoRef::of(path))
            .join(path.rel_path.replace('/', std::path::MAIN_SEPARATOR_STR));
        tokio::fs::read_to_string(full).await
    }

    fn derived_dir(&self) -> PathBuf {
        self.dir.join("derived")
    }
}
