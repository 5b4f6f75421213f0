use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{debug, info_span};

use erkas_cli::pipeline::{RunOptions, run_pipeline};
use erkas_cli::types::RunResult;
use erkas_core::CancellationToken;
use erkas_model::{PipelineConfig, Role, SourceKind};

use crate::cli::{RolesArgs, RunArgs};
use crate::summary::apply_table_style;

pub fn run_roles(args: &RolesArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut table = Table::new();
    table.set_header(vec!["Role", "Canonical column", "Fragment", "Required"]);
    apply_table_style(&mut table);
    for role in Role::ALL {
        table.add_row(vec![
            role.to_string(),
            role.canonical_name().to_string(),
            config.roles.fragment(role).to_string(),
            if role.is_required() { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{table}");

    let mut generations = Table::new();
    generations.set_header(vec!["Format", "Legacy columns", "Current columns"]);
    apply_table_style(&mut generations);
    for kind in SourceKind::ALL {
        let signature = config.generations.for_kind(kind);
        generations.add_row(vec![
            kind.format_tag().to_string(),
            signature.legacy.to_string(),
            signature.current.to_string(),
        ]);
    }
    println!("{generations}");
    Ok(())
}

pub fn run(args: &RunArgs, cancel: &CancellationToken) -> Result<RunResult> {
    let config = load_config(args.config.as_deref())?;
    let output_dir = resolve_output_dir(args, &config);
    let span = info_span!("erkas", input_dir = %args.input_dir.display());
    let _guard = span.enter();

    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel()).context("install interrupt handler")?;

    let options = RunOptions {
        input_dir: args.input_dir.clone(),
        output_dir,
        config,
        jobs: args.jobs,
        finalize_partial: args.finalize_partial,
        show_progress: io::stderr().is_terminal(),
    };
    run_pipeline(&options, cancel)
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            let config = PipelineConfig::from_path(path)
                .with_context(|| format!("load config {}", path.display()))?;
            debug!(path = %path.display(), "configuration loaded");
            Ok(config)
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// `--output-dir`, then the configured root, then `<INPUT_DIR>/output`.
fn resolve_output_dir(args: &RunArgs, config: &PipelineConfig) -> PathBuf {
    args.output_dir
        .clone()
        .or_else(|| config.output_root.clone())
        .unwrap_or_else(|| args.input_dir.join("output"))
}
