use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;
use minijinja::{Environment, Value, context};

use sdkforge_core::config::DocsConfig;

use crate::description::{self, DESCRIPTION_FILE, ScribeDescription};
use crate::directive::{self, Segment};
use crate::error::ScribeError;
use crate::transforms::TransformRegistry;

/// File template name (without extension) rendered by `create`.
const FILE_TEMPLATE_STEM: &str = "scribe-file";

/// Fragment template filename prefix: `scribe-fragment-{name}.<ext>`.
const FRAGMENT_PREFIX: &str = "scribe-fragment-";

/// Documentation directory `create` writes under.
const DOCS_DIR: &str = "docs";

/// The documentation synthesizer. Loaded once per build from a generator's
/// template directory; all state is immutable afterwards.
pub struct DirectiveEngine {
    description: ScribeDescription,
    file_template: Option<String>,
    fragments: IndexMap<String, String>,
    transforms: TransformRegistry,
    env: Environment<'static>,
    config: DocsConfig,
}

impl DirectiveEngine {
    /// Read `scribe.yml`, the optional file template, and every fragment
    /// template from `source_dir`. A malformed description is fatal; a
    /// missing one means the engine has nothing to render.
    pub fn load(source_dir: &Path, docs: &DocsConfig) -> Result<Self, ScribeError> {
        let description = description::load(&source_dir.join(DESCRIPTION_FILE))?;

        let mut file_template = None;
        let mut fragments = IndexMap::new();
        if source_dir.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(source_dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file())
                .collect();
            entries.sort();
            for path in entries {
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if stem == FILE_TEMPLATE_STEM {
                    file_template = Some(fs::read_to_string(&path)?);
                } else if let Some(name) = stem.strip_prefix(FRAGMENT_PREFIX) {
                    fragments.insert(name.to_string(), fs::read_to_string(&path)?);
                }
            }
        }

        let transforms = TransformRegistry::new(docs);
        let mut env = Environment::new();
        transforms.install(&mut env);

        Ok(Self {
            description,
            file_template,
            fragments,
            transforms,
            env,
            config: docs.clone(),
        })
    }

    /// Synthesize documentation pages for every class in the description.
    ///
    /// Existing files are never overwritten, so a hand-reconciled page
    /// survives any number of rebuilds. Returns the paths written.
    pub fn create(&self, output_root: &Path) -> Result<Vec<PathBuf>, ScribeError> {
        let Some(template) = &self.file_template else {
            return Ok(Vec::new());
        };
        let mut written = Vec::new();

        for (fragment_path, entry) in &self.description {
            if entry.classes.is_empty() {
                continue;
            }
            let dir = output_root.join(DOCS_DIR).join(fragment_path);
            fs::create_dir_all(&dir)?;

            // One "../" per nesting level below the docs root, plus one
            // for the docs root itself, so relative links always resolve.
            let depth = 1 + fragment_path.matches('/').count();
            let root_path = "../".repeat(depth);

            for class in &entry.classes {
                let target = dir.join(format!("{}.md", class.class_name));
                if target.exists() {
                    debug!("scribe: keeping existing {}", target.display());
                    continue;
                }
                let rendered = self.env.render_str(
                    template,
                    context! {
                        class => Value::from_serialize(class),
                        fragment => fragment_path,
                        root_path => &root_path,
                        config => Value::from_serialize(&self.config),
                    },
                )?;
                fs::write(&target, rendered)?;
                written.push(target);
            }
        }

        Ok(written)
    }

    /// Rewrite the inline directives in `text`. Pure text-to-text; soft
    /// misses (unknown fragment template, unknown transform) resolve to
    /// empty output rather than errors.
    pub fn parse(&self, text: &str, relative_file_path: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for segment in directive::scan(text) {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Fragment { name, path } => {
                    out.push_str(&self.render_fragment(&name, &path, relative_file_path));
                }
                Segment::Block { name, body } => match self.transforms.get(&name) {
                    Some(transform) => out.push_str(&transform(body)),
                    None => {
                        debug!("scribe: unknown transform `{name}`, dropping block");
                    }
                },
            }
        }
        out
    }

    fn render_fragment(&self, name: &str, path: &str, file: &str) -> String {
        let Some(template) = self.fragments.get(name) else {
            debug!("scribe: no fragment template `{name}`");
            return String::new();
        };
        let data = match self.description.get(path) {
            Some(entry) => Value::from_serialize(entry),
            None => {
                debug!("scribe: no description entry for `{path}`");
                Value::from(())
            }
        };
        let result = self.env.render_str(
            template,
            context! {
                file => file,
                fragment => path,
                data => data,
                config => Value::from_serialize(&self.config),
            },
        );
        match result {
            Ok(rendered) => rendered,
            Err(err) => {
                debug!("scribe: fragment `{name}` failed to render: {err}");
                String::new()
            }
        }
    }

    pub fn description(&self) -> &ScribeDescription {
        &self.description
    }

    pub fn has_file_template(&self) -> bool {
        self.file_template.is_some()
    }
}
