//! Entrypoint discovery inside a materialized checkout.
//!
//! A module's entrypoint is a file named `module.js`, `module.py`, or
//! `module.sh` anywhere in the checkout. When several exist, the more
//! specific ecosystem wins (js, then py, then sh), shallower paths first.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ecosystem {
    Node,
    Python,
    Shell,
}

impl Ecosystem {
    /// Interpreter used to spawn the entrypoint.
    pub fn interpreter(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Python => "python3",
            Self::Shell => "sh",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entrypoint {
    pub path: PathBuf,
    pub ecosystem: Ecosystem,
}

impl Entrypoint {
    /// Directory the module process runs in.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }
}

const CANDIDATES: &[(&str, Ecosystem)] = &[
    ("module.js", Ecosystem::Node),
    ("module.py", Ecosystem::Python),
    ("module.sh", Ecosystem::Shell),
];

/// Recursively search `root` for a module entrypoint.
pub fn find_entrypoint(root: &Path) -> Option<Entrypoint> {
    let mut best: Option<(usize, usize, Entrypoint)> = None;

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let Some(priority) = CANDIDATES.iter().position(|(n, _)| *n == name) else {
            continue;
        };

        let depth = entry.depth();
        let candidate = Entrypoint {
            path: entry.path().to_path_buf(),
            ecosystem: CANDIDATES[priority].1,
        };

        match &best {
            Some((p, d, _)) if (priority, depth) >= (*p, *d) => {}
            _ => best = Some((priority, depth, candidate)),
        }
    }

    best.map(|(_, _, entrypoint)| entrypoint)
}

// ── Tests ────────────────────────────────────────────────────────────
