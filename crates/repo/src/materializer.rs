//! On-demand materialization of module code.
//!
//! `materialize` turns a repository reference into a local directory of
//! ready-to-run code: clone (shallow, branch-aware), dependency install,
//! optional subfolder extraction. Results are registered in the
//! [`CheckoutCache`]; concurrent requests for the same key serialize through
//! [`KeyedLocks`] and the losers reuse the winner's checkout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::CheckoutCache;
use crate::error::MaterializeError;
use crate::keylock::KeyedLocks;
use crate::reporef::RepoRef;

pub struct Materializer {
    work_dir: PathBuf,
    cache: Arc<CheckoutCache>,
    locks: KeyedLocks,
}

impl Materializer {
    pub fn new(work_dir: PathBuf, cache: Arc<CheckoutCache>, locks: KeyedLocks) -> Self {
        Self {
            work_dir,
            cache,
            locks,
        }
    }

    /// Produce a local directory containing the module's code.
    ///
    /// Cache hits (same repository reference, directory still on disk) are
    /// returned immediately with a recency bump and no locking. Otherwise the
    /// key's lock is taken, the cache re-checked (another caller may have
    /// just finished the same work), and only then is the repository cloned.
    pub async fn materialize(
        &self,
        module_id: Uuid,
        repository: Option<&str>,
        subfolder: Option<&str>,
    ) -> Result<PathBuf, MaterializeError> {
        let repository = repository
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(MaterializeError::MissingRepository)?;

        let key = CheckoutCache::cache_key(module_id, subfolder);

        if let Some(path) = self.cache.valid_path(&key, repository) {
            debug!(%module_id, key = %key, "checkout cache hit");
            return Ok(path);
        }

        let _guard = self.locks.acquire(&key).await;

        // Re-check under the lock: a concurrent caller may have finished
        // this exact materialization while we waited.
        if let Some(path) = self.cache.valid_path(&key, repository) {
            debug!(%module_id, key = %key, "checkout materialized by concurrent caller");
            return Ok(path);
        }

        let path = self.clone_and_prepare(&key, repository, subfolder).await?;
        self.cache.insert(&key, path.clone(), repository);
        info!(%module_id, key = %key, path = %path.display(), "module checkout materialized");

        Ok(path)
    }

    /// Clone, install, and (optionally) extract the requested subfolder.
    async fn clone_and_prepare(
        &self,
        key: &str,
        repository: &str,
        subfolder: Option<&str>,
    ) -> Result<PathBuf, MaterializeError> {
        let repo_ref = RepoRef::parse(repository);
        let effective_subfolder = subfolder
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or(repo_ref.path.as_deref());

        std::fs::create_dir_all(&self.work_dir)?;
        let clone_dir = self.work_dir.join(fresh_dir_name(key));

        if let Err(e) = self.run_clone(&repo_ref, &clone_dir).await {
            remove_best_effort(&clone_dir);
            return Err(e);
        }

        self.install_node_deps(&clone_dir).await;

        let checkout = match effective_subfolder {
            Some(sub) => {
                let src = clone_dir.join(sub);
                if !src.is_dir() {
                    remove_best_effort(&clone_dir);
                    return Err(MaterializeError::FolderNotFound(sub.to_string()));
                }

                let dest = self.work_dir.join(fresh_dir_name(key));
                if let Err(e) = copy_dir_recursive(&src, &dest) {
                    remove_best_effort(&dest);
                    remove_best_effort(&clone_dir);
                    return Err(e.into());
                }
                remove_best_effort(&clone_dir);
                dest
            }
            None => clone_dir,
        };

        Ok(checkout)
    }

    async fn run_clone(&self, repo_ref: &RepoRef, dest: &Path) -> Result<(), MaterializeError> {
        let mut cmd = Command::new("git");
        cmd.arg("clone").arg("--depth").arg("1");
        if let Some(branch) = &repo_ref.branch {
            cmd.arg("--branch").arg(branch);
        }
        cmd.arg(&repo_ref.url).arg(dest);

        debug!(url = %repo_ref.url, branch = ?repo_ref.branch, dest = %dest.display(), "cloning repository");

        let output = cmd
            .output()
            .await
            .map_err(|e| MaterializeError::CloneFailed(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(MaterializeError::CloneFailed(stderr));
        }

        Ok(())
    }

    /// Install node dependencies when the clone carries a package.json.
    /// Install failures never fail materialization; the module may still run.
    async fn install_node_deps(&self, checkout: &Path) {
        if !checkout.join("package.json").exists() {
            return;
        }

        debug!(dir = %checkout.display(), "installing node dependencies");
        let result = Command::new("npm")
            .arg("install")
            .current_dir(checkout)
            .output()
            .await;

        match result {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(
                    dir = %checkout.display(),
                    stderr = %stderr.trim(),
                    "npm install failed; continuing without installed dependencies"
                );
            }
            Err(e) => {
                warn!(
                    dir = %checkout.display(),
                    error = %e,
                    "could not run npm install; continuing without installed dependencies"
                );
            }
        }
    }
}

/// Unique on-disk directory name for a cache key.
fn fresh_dir_name(key: &str) -> String {
    let safe: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect();
    format!("{}-{}", safe, &Uuid::new_v4().simple().to_string()[..8])
}

fn remove_best_effort(path: &Path) {
    if let Err(e) = std::fs::remove_dir_all(path) {
        if path.exists() {
            warn!(path = %path.display(), error = %e, "failed to remove checkout directory");
        }
    }
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_dir_name_is_fs_safe_and_unique() {
        let key = "7a6e9f3c::probes/http";
        let a = fresh_dir_name(key);
        let b = fresh_dir_name(key);
        assert_ne!(a, b);
        assert!(!a.contains('/'));
        assert!(!a.contains(':'));
        assert!(a.starts_with("7a6e9f3c--probes-http-"));
    }

    #[test]
    fn test_copy_dir_recursive_copies_nested_tree() {
        let src = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("lib")).unwrap();
        std::fs::write(src.path().join("module.js"), "code").unwrap();
        std::fs::write(src.path().join("lib/util.js"), "util").unwrap();

        let dest = tempfile::tempdir().unwrap();
        let target = dest.path().join("copy");
        copy_dir_recursive(src.path(), &target).unwrap();

        assert_eq!(std::fs::read_to_string(target.join("module.js")).unwrap(), "code");
        assert_eq!(std::fs::read_to_string(target.join("lib/util.js")).unwrap(), "util");
    }

    #[tokio::test]
    async fn test_missing_repository_rejected() {
        let work = tempfile::tempdir().unwrap();
        let materializer = Materializer::new(
            work.path().to_path_buf(),
            Arc::new(CheckoutCache::new()),
            KeyedLocks::new(),
        );

        for reference in [None, Some(""), Some("   ")] {
            let err = materializer
                .materialize(Uuid::new_v4(), reference, None)
                .await
                .unwrap_err();
            assert!(matches!(err, MaterializeError::MissingRepository));
        }
    }

    #[tokio::test]
    async fn test_clone_failure_cleans_up_and_surfaces_stderr() {
        let work = tempfile::tempdir().unwrap();
        let materializer = Materializer::new(
            work.path().to_path_buf(),
            Arc::new(CheckoutCache::new()),
            KeyedLocks::new(),
        );

        let missing = work.path().join("does-not-exist.git");
        let err = materializer
            .materialize(Uuid::new_v4(), Some(missing.to_str().unwrap()), None)
            .await
            .unwrap_err();

        assert!(matches!(err, MaterializeError::CloneFailed(_)));
        // Only the (empty) work root remains; the partial clone was removed.
        let leftover: Vec<_> = std::fs::read_dir(work.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert!(leftover.is_empty(), "partial clone left behind: {leftover:?}");
    }
}
