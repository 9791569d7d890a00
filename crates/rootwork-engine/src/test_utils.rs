//! Test utilities: on-disk fixture bundles

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rootwork_core::EngineConfig;
use rootwork_indexer::{ImportExtractor, TreeSitterParser};
use tempfile::TempDir;

use crate::generator::GraphGenerator;
use crate::search::{ScanSearch, SearchBackend};
use crate::storage::{BundleStore, FsBundleStore};

pub const BUNDLE_ID: &str = "b1";

/// A bundle store in a temp dir holding one bundle, [`BUNDLE_ID`].
pub struct FixtureBundle {
    pub temp_dir: TempDir,
}

impl FixtureBundle {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(BUNDLE_ID).join("repos")).unwrap();
        FixtureBundle { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn bundle_dir(&self) -> PathBuf {
        self.root().join(BUNDLE_ID)
    }

    /// Write `content` at a bundle-relative path such as `repos/o/r/norm/a.ts`.
    pub fn write(&self, bundle_path: &str, content: &str) -> &Self {
        let full = self.bundle_dir().join(bundle_path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
        self
    }

    pub fn store(&self) -> Arc<FsBundleStore> {
        Arc::new(FsBundleStore::new(self.root()))
    }

    pub fn generator(&self) -> GraphGenerator {
        self.generator_with(
            ImportExtractor::new(Arc::new(TreeSitterParser::default())),
            EngineConfig::default(),
        )
    }

    pub fn heuristic_generator(&self) -> GraphGenerator {
        self.generator_with(ImportExtractor::heuristic_only(), EngineConfig::default())
    }

    pub fn generator_with(&self, extractor: ImportExtractor, config: EngineConfig) -> GraphGenerator {
        let store: Arc<dyn BundleStore> = self.store();
        let search: Arc<dyn SearchBackend> = Arc::new(ScanSearch::new(store.clone()));
        GraphGenerator::new(store, search, extractor, config)
    }
}

/// A small TypeScript repository with one caller chain.
pub fn create_ts_bundle() -> FixtureBundle {
    let bundle = FixtureBundle::new();
    bundle
        .write(
            "repos/acme/web/norm/src/index.ts",
            r#"import { loadUsers } from './services/users';
import { formatName } from './util/format';
import express from 'express';

export function main() {
    const users = loadUsers();
    return users.map(formatName);
}
"#,
        )
        .write(
            "repos/acme/web/norm/src/services/users.ts",
            r#"import { formatName } from '../util/format';

export function loadUsers() {
    return ['ada', 'linus'].map((n) => formatName(n));
}
"#,
        )
        .write(
            "repos/acme/web/norm/src/util/format.ts",
            r#"export function formatName(name: string): string {
    return name.trim();
}
"#,
        )
        .write(
            "repos/acme/web/norm/src/cli.ts",
            r#"import { loadUsers } from './services/users';

function run() {
    console.log(loadUsers());
}

run();
"#,
        );
    bundle
}
