//! The external code generator boundary. The generator is opaque: it is
//! handed the morphed document, a template directory, and an output
//! directory, and judged only by its exit code, its stderr, and the file
//! tree it leaves behind.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use thiserror::Error;

use sdkforge_core::config::GeneratorConfig;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("failed to spawn generator `{bin}`: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("generator `{name}` failed (exit {status:?}): {stderr}")]
    Failed {
        name: String,
        status: Option<i32>,
        stderr: String,
    },
}

/// One generator run, fully parameterized up front.
pub struct GeneratorInvocation<'a> {
    pub generator: &'a GeneratorConfig,
    pub spec_path: PathBuf,
    pub output_dir: PathBuf,
}

impl GeneratorInvocation<'_> {
    /// Build the argument vector handed to the generator executable.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--input".to_string(),
            self.spec_path.display().to_string(),
            "--generator".to_string(),
            self.generator.name.clone(),
            "--templates".to_string(),
            self.generator.templates.display().to_string(),
            "--output".to_string(),
            self.output_dir.display().to_string(),
        ];
        if let Some(config_file) = &self.generator.config_file {
            args.push("--config".to_string());
            args.push(config_file.display().to_string());
        }
        for (from, to) in &self.generator.schema_mappings {
            args.push("--schema-mapping".to_string());
            args.push(format!("{from}={to}"));
        }
        args
    }

    /// Run to completion. Success requires a zero exit and silent stderr;
    /// anything else is a build failure, never a partial result.
    pub fn run(&self) -> Result<(), GeneratorError> {
        let bin: &Path = &self.generator.bin;
        debug!(
            "invoking {} {}",
            bin.display(),
            self.args().join(" ")
        );
        let output = Command::new(bin)
            .args(self.args())
            .output()
            .map_err(|source| GeneratorError::Spawn {
                bin: bin.display().to_string(),
                source,
            })?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() || !stderr.is_empty() {
            return Err(GeneratorError::Failed {
                name: self.generator.name.clone(),
                status: output.status.code(),
                stderr,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GeneratorConfig {
        let yaml = r#"
name: php
bin: openapi-generator
templates: templates/php
config_file: config/php.yaml
schema_mappings:
  PayloadWidget: Widget
"#;
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_args_include_every_parameter() {
        let generator = config();
        let invocation = GeneratorInvocation {
            generator: &generator,
            spec_path: PathBuf::from("scratch/openapi.json"),
            output_dir: PathBuf::from("scratch/php"),
        };
        let args = invocation.args();
        assert_eq!(args[0..2], ["--input", "scratch/openapi.json"]);
        assert!(args.contains(&"--generator".to_string()));
        assert!(args.contains(&"php".to_string()));
        assert!(args.contains(&"--config".to_string()));
        assert!(args.contains(&"PayloadWidget=Widget".to_string()));
    }

    #[test]
    fn test_args_without_optional_parts() {
        let generator: GeneratorConfig =
            serde_yaml_ng::from_str("name: py\ntemplates: t\n").unwrap();
        let invocation = GeneratorInvocation {
            generator: &generator,
            spec_path: PathBuf::from("s.json"),
            output_dir: PathBuf::from("out"),
        };
        let args = invocation.args();
        assert!(!args.contains(&"--config".to_string()));
        assert!(!args.contains(&"--schema-mapping".to_string()));
    }
}
