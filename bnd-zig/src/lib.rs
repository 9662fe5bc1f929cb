//! bnd-zig — C API declaration list → Zig bindings generator.
//!
//! Reads the JSON declaration list produced by a C header parser (structs,
//! enums, constant groups and functions with string-encoded C types) and
//! emits a Zig source file exposing the same API with Zig naming and
//! `extern struct` layouts where they are safe.
//!
//! # Quick start
//!
//! Generate every module listed in a config (suitable for `build.rs`):
//!
//! ```no_run
//! use std::path::Path;
//!
//! // Reads config TOML, reads each JSON input, writes each .zig file.
//! bnd_zig::run(Path::new("bnd-zig.toml"), None).unwrap();
//! ```
//!
//! Or translate a single declaration list without touching the disk:
//!
//! ```no_run
//! use std::path::Path;
//! use bnd_zig::config::GenOptions;
//!
//! let module = bnd_zig::load_module(Path::new("sokol_gfx.json")).unwrap();
//! let zig_source = bnd_zig::generate_module(&module, &GenOptions::default()).unwrap();
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

pub mod classify;
pub mod config;
pub mod emit;
pub mod model;
pub mod naming;
pub mod parse;

/// Run the full pipeline for every module in a config file: read each JSON
/// input, generate Zig source, and write the output file.
///
/// `config_path` is the path to a `bnd-zig.toml` configuration file.
/// `output` optionally overrides the output path; it is only accepted when
/// the config lists exactly one module.
///
/// Returns the paths that were written.
pub fn run(config_path: &Path, output: Option<&Path>) -> Result<Vec<PathBuf>> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    info!(modules = cfg.module.len(), "loaded configuration");

    if output.is_some() && cfg.module.len() != 1 {
        anyhow::bail!(
            "--output needs a config with exactly one module, {} has {}",
            config_path.display(),
            cfg.module.len()
        );
    }

    let mut written = Vec::new();
    for module_cfg in &cfg.module {
        let input = module_cfg.input_path(base_dir);
        let output_path = match output {
            Some(p) => p.to_path_buf(),
            None => module_cfg.output_path(base_dir),
        };
        generate_file(&input, &output_path, &module_cfg.options(&cfg))?;
        written.push(output_path);
    }
    Ok(written)
}

/// Generate every module of a config file and return `(output path, source)`
/// pairs without writing to disk.
pub fn generate(config_path: &Path) -> Result<Vec<(PathBuf, String)>> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    cfg.module
        .iter()
        .map(|module_cfg| -> Result<(PathBuf, String)> {
            let module = load_module(&module_cfg.input_path(base_dir))?;
            let source = generate_module(&module, &module_cfg.options(&cfg))?;
            Ok((module_cfg.output_path(base_dir), source))
        })
        .collect()
}

/// Translate one JSON declaration list into one Zig file.
///
/// The whole output is produced in memory before the output file is
/// created, so a missing or malformed input leaves nothing on disk.
pub fn generate_file(input: &Path, output: &Path, options: &config::GenOptions) -> Result<()> {
    let module = load_module(input)?;
    let source = generate_module(&module, options)?;

    std::fs::write(output, &source)
        .with_context(|| format!("writing output to {}", output.display()))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        size = source.len(),
        "{} => {}",
        input.display(),
        output.display()
    );
    Ok(())
}

/// Read and parse a JSON declaration list.
pub fn load_module(path: &Path) -> Result<model::Module> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading input {}", path.display()))?;
    let module: model::Module = serde_json::from_str(&content)
        .with_context(|| format!("parsing declaration list {}", path.display()))?;
    Ok(module)
}

/// Generate Zig source for an already-loaded module.
///
/// Runs the three passes in order: registry pre-scan, layout-compatibility
/// analysis, then emission.
pub fn generate_module(
    module: &model::Module,
    options: &config::GenOptions,
) -> Result<String> {
    let mut registry = classify::build_type_registry(module);
    classify::analyze_layouts(module, &mut registry);

    info!(
        module = %module.module,
        decls = module.decls.len(),
        structs = registry.struct_count(),
        extern_structs = registry.compatible_count(),
        "analyzed module"
    );

    emit::emit_module(module, &registry, options)
        .with_context(|| format!("emitting module {}", module.module))
}
