//! Materializer tests against real local git repositories.
//!
//! `git clone` accepts filesystem paths, so each test builds a scratch
//! repository with `git` itself and materializes from it.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use uuid::Uuid;

use watchtower_repo::{CheckoutCache, KeyedLocks, MaterializeError, Materializer};

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-c")
        .arg("user.email=ci@watchtower.test")
        .arg("-c")
        .arg("user.name=watchtower-ci")
        .arg("-c")
        .arg("commit.gpgsign=false")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {args:?} failed in {}", dir.display());
}

/// Create a committed git repository at `dir` containing `files`.
fn init_repo(dir: &Path, files: &[(&str, &str)]) {
    std::fs::create_dir_all(dir).unwrap();
    git(dir, &["-c", "init.defaultBranch=main", "init"]);
    for (rel, contents) in files {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-m", "module code"]);
}

struct Fixture {
    _root: tempfile::TempDir,
    work_dir: PathBuf,
    repo_dir: PathBuf,
    cache: Arc<CheckoutCache>,
    materializer: Arc<Materializer>,
}

fn fixture(files: &[(&str, &str)]) -> Fixture {
    let root = tempfile::tempdir().unwrap();
    let work_dir = root.path().join("work");
    let repo_dir = root.path().join("origin");
    init_repo(&repo_dir, files);

    let cache = Arc::new(CheckoutCache::new());
    let materializer = Arc::new(Materializer::new(
        work_dir.clone(),
        cache.clone(),
        KeyedLocks::new(),
    ));

    Fixture {
        _root: root,
        work_dir,
        repo_dir,
        cache,
        materializer,
    }
}

fn checkout_dirs(work_dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(work_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn materialize_clones_once_and_serves_from_cache() {
    let fx = fixture(&[("module.sh", "#!/bin/sh\ncat >/dev/null\necho '{}'\n")]);
    let module_id = Uuid::new_v4();
    let repo = fx.repo_dir.to_str().unwrap().to_string();

    let first = fx
        .materializer
        .materialize(module_id, Some(&repo), None)
        .await
        .unwrap();
    assert!(first.join("module.sh").exists());

    let second = fx
        .materializer
        .materialize(module_id, Some(&repo), None)
        .await
        .unwrap();
    assert_eq!(first, second, "cache hit returned a different path");
    assert_eq!(checkout_dirs(&fx.work_dir).len(), 1, "second call cloned again");
}

#[tokio::test]
async fn materialize_extracts_subfolder_and_discards_clone() {
    let fx = fixture(&[
        ("probes/http/module.js", "console.log('{}')\n"),
        ("probes/dns/module.js", "console.log('{}')\n"),
        ("README.md", "modules\n"),
    ]);
    let repo = fx.repo_dir.to_str().unwrap().to_string();

    let path = fx
        .materializer
        .materialize(Uuid::new_v4(), Some(&repo), Some("probes/http"))
        .await
        .unwrap();

    // The checkout is the subfolder itself, not the full clone.
    assert!(path.join("module.js").exists());
    assert!(!path.join(".git").exists());
    assert!(!path.join("README.md").exists());
    assert_eq!(checkout_dirs(&fx.work_dir).len(), 1, "full clone not discarded");
}

#[tokio::test]
async fn materialize_missing_subfolder_fails_and_cleans_up() {
    let fx = fixture(&[("module.sh", "#!/bin/sh\necho '{}'\n")]);
    let repo = fx.repo_dir.to_str().unwrap().to_string();

    let err = fx
        .materializer
        .materialize(Uuid::new_v4(), Some(&repo), Some("no/such/dir"))
        .await
        .unwrap_err();

    match err {
        MaterializeError::FolderNotFound(sub) => assert_eq!(sub, "no/such/dir"),
        other => panic!("expected FolderNotFound, got {other:?}"),
    }
    assert!(checkout_dirs(&fx.work_dir).is_empty(), "failed clone left behind");
}

#[tokio::test]
async fn concurrent_requests_share_one_clone() {
    let fx = fixture(&[("module.sh", "#!/bin/sh\necho '{}'\n")]);
    let module_id = Uuid::new_v4();
    let repo = fx.repo_dir.to_str().unwrap().to_string();

    let mut handles = Vec::new();
    for _ in 0..6 {
        let materializer = fx.materializer.clone();
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            materializer
                .materialize(module_id, Some(&repo), None)
                .await
                .unwrap()
        }));
    }

    let mut paths = Vec::new();
    for h in handles {
        paths.push(h.await.unwrap());
    }

    paths.dedup();
    assert_eq!(paths.len(), 1, "concurrent callers got different checkouts");
    assert_eq!(
        checkout_dirs(&fx.work_dir).len(),
        1,
        "more than one clone ran for the same key"
    );
}

#[tokio::test]
async fn changed_repository_reference_forces_rematerialization() {
    let fx = fixture(&[("module.sh", "#!/bin/sh\necho '{\"v\":1}'\n")]);
    let module_id = Uuid::new_v4();
    let repo_a = fx.repo_dir.to_str().unwrap().to_string();

    let other = fx._root.path().join("origin-b");
    init_repo(&other, &[("module.sh", "#!/bin/sh\necho '{\"v\":2}'\n")]);
    let repo_b = other.to_str().unwrap().to_string();

    let first = fx
        .materializer
        .materialize(module_id, Some(&repo_a), None)
        .await
        .unwrap();

    let second = fx
        .materializer
        .materialize(module_id, Some(&repo_b), None)
        .await
        .unwrap();

    assert_ne!(first, second, "stale checkout served for a new reference");
    let contents = std::fs::read_to_string(second.join("module.sh")).unwrap();
    assert!(contents.contains("\"v\":2"));
}

#[tokio::test]
async fn vanished_checkout_is_rematerialized() {
    let fx = fixture(&[("module.sh", "#!/bin/sh\necho '{}'\n")]);
    let module_id = Uuid::new_v4();
    let repo = fx.repo_dir.to_str().unwrap().to_string();

    let first = fx
        .materializer
        .materialize(module_id, Some(&repo), None)
        .await
        .unwrap();

    // Simulate the sweeper (or an operator) deleting the directory.
    std::fs::remove_dir_all(&first).unwrap();

    let second = fx
        .materializer
        .materialize(module_id, Some(&repo), None)
        .await
        .unwrap();
    assert!(second.join("module.sh").exists());
    assert_eq!(fx.cache.len(), 1);
}
