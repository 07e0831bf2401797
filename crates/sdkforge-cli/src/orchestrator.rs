//! Sequences one build: morph the document, invoke each generator into
//! its scratch tree, rewrite the generated text through the directive
//! engine, synthesize side-channel pages, and reconcile scratch into the
//! stable output. A failed generator stops its pipeline before the sync,
//! so broken output is never promoted.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use walkdir::WalkDir;

use sdkforge_core::config::ForgeConfig;
use sdkforge_core::{document, morph};
use sdkforge_scribe::DirectiveEngine;
use sdkforge_sync::synchronize;

use crate::generator::GeneratorInvocation;

/// Directories under a scratch tree whose files get directive rewriting;
/// everything else the generator produced passes through untouched.
const INSPECTED_DIRS: [&str; 2] = ["docs", "lib"];

/// Root documentation file, rewritten alongside the inspected dirs.
const DOC_ROOT_FILE: &str = "README.md";

/// Name of the morphed document written into the scratch root.
const MORPHED_SPEC: &str = "openapi.json";

pub struct BuildOrchestrator {
    config: ForgeConfig,
}

impl BuildOrchestrator {
    /// The orchestrator owns the configuration; everything downstream
    /// borrows it.
    pub fn new(config: ForgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    /// Re-read configuration from disk, e.g. between watch-mode builds.
    pub fn reload_config(&mut self, path: &Path) -> Result<()> {
        if let Some(config) = sdkforge_core::config::load_config(path)
            .map_err(anyhow::Error::msg)?
        {
            self.config = config;
        }
        Ok(())
    }

    /// Run one full build across every configured generator.
    pub fn build(&self) -> Result<()> {
        let mut doc = document::from_path(&self.config.spec)
            .with_context(|| format!("failed to load {}", self.config.spec.display()))?;
        morph(&mut doc)?;

        let morphed_path = self.config.scratch.join(MORPHED_SPEC);
        doc.write_to_path(&morphed_path)
            .with_context(|| format!("failed to write {}", morphed_path.display()))?;
        info!("morphed document written to {}", morphed_path.display());

        for generator in &self.config.generators {
            // Scratch persists across builds: the generator overwrites its
            // own files, and pages `create` synthesized earlier stay put so
            // they are never regenerated over a hand-reconciled copy.
            let scratch = self.config.scratch.join(&generator.name);
            fs::create_dir_all(&scratch)?;

            GeneratorInvocation {
                generator,
                spec_path: morphed_path.clone(),
                output_dir: scratch.clone(),
            }
            .run()?;

            let engine = DirectiveEngine::load(&generator.templates, &self.config.docs)
                .with_context(|| {
                    format!("failed to load scribe sources from {}",
                        generator.templates.display())
                })?;
            let rewritten = rewrite_generated(&engine, &scratch)?;
            let created = engine.create(&scratch)?;
            info!(
                "{}: rewrote {rewritten} file(s), created {} page(s)",
                generator.name,
                created.len()
            );

            let output = self.config.output.join(&generator.name);
            let report = synchronize(&scratch, &output)?;
            info!(
                "{}: synchronized into {} ({} action(s))",
                generator.name,
                output.display(),
                report.actions.len()
            );
        }

        Ok(())
    }
}

/// Run the directive engine's `parse` over every inspected generated
/// file, rewriting in place. Files that are not valid UTF-8 pass through
/// untouched.
fn rewrite_generated(engine: &DirectiveEngine, root: &Path) -> Result<usize> {
    let mut files: Vec<PathBuf> = Vec::new();
    let doc_root = root.join(DOC_ROOT_FILE);
    if doc_root.is_file() {
        files.push(doc_root);
    }
    for dir in INSPECTED_DIRS {
        let dir = root.join(dir);
        if !dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    }

    let mut rewritten = 0;
    for path in files {
        let Ok(text) = fs::read_to_string(&path) else {
            continue;
        };
        let rel = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();
        let parsed = engine.parse(&text, &rel);
        if parsed != text {
            fs::write(&path, parsed)
                .with_context(|| format!("failed to rewrite {}", path.display()))?;
            rewritten += 1;
        }
    }
    Ok(rewritten)
}
