// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod report;
pub mod resolve;

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::engine::{EmacsEngine, LiterateEngine};
use crate::errors::RunError;
use crate::report::Reporter;
use crate::resolve::FreshnessSet;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the reporter task
/// - the engine adapter
/// - the resolve → tangle → compile sequence
///
/// Every failure is rendered exactly once before the error is returned:
/// setup failures directly, pipeline failures through the reporter. The
/// caller only turns the result into an exit status.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = match setup(&args) {
        Ok(cfg) => cfg,
        Err(error) => {
            // The reporter is not running yet; render the failure directly.
            eprintln!("{} {error:#}", report::style::auto().failed("✗"));
            return Err(error);
        }
    };

    let (reporter, render_task) =
        report::spawn_reporter(args.interactive, args.verbose, cfg.report.tick_ms);
    let engine = EmacsEngine::from_config(&cfg.engine);

    let outcome = run_pipeline(&args, &cfg, &engine, &reporter).await;
    if let Err(error) = &outcome {
        reporter.finish_failed(format!("{error:#}")).await;
    }

    // Closing the last handle lets the render task drain and exit.
    drop(reporter);
    let _ = render_task.await;

    outcome
}

/// Working-directory, configuration, and source-file checks that run before
/// the reporter task exists.
fn setup(args: &CliArgs) -> Result<ConfigFile> {
    if let Some(dir) = &args.cd {
        env::set_current_dir(dir)
            .with_context(|| format!("changing directory to {}", dir.display()))?;
        debug!(dir = %dir.display(), "changed working directory");
    }

    let cfg = config::load_or_default()?;

    if !args.file.exists() {
        return Err(RunError::MissingSource(args.file.clone()).into());
    }

    Ok(cfg)
}

/// The resolve → tangle → compile sequence, synchronous and one step at a
/// time; only the reporter runs alongside it.
///
/// Generic over the engine so the whole sequence can be driven by a fake in
/// tests.
pub async fn run_pipeline(
    args: &CliArgs,
    cfg: &ConfigFile,
    engine: &impl LiterateEngine,
    reporter: &Reporter,
) -> Result<()> {
    reporter
        .begin(format!("checking {}", args.file.display()))
        .await;

    let plan = build_plan(args, cfg, engine, reporter).await?;
    debug!(
        to_tangle = plan.to_tangle.len(),
        to_compile = plan.to_compile.len(),
        "freshness resolution complete"
    );

    if plan.is_empty() {
        reporter
            .finish_ok(format!("{} is up to date", args.file.display()))
            .await;
        return Ok(());
    }

    for source in &plan.to_tangle {
        reporter
            .update(format!("tangling {}", source.display()))
            .await;
        engine.tangle(source, reporter).await?;
        info!(source = %source.display(), "tangled");
    }

    let mut compiled = 0;
    if args.compile && !plan.to_compile.is_empty() {
        let files: Vec<PathBuf> = plan.to_compile.iter().cloned().collect();
        reporter
            .update(format!("byte-compiling {} file(s)", files.len()))
            .await;
        engine.compile(&files, reporter).await?;
        compiled = files.len();
        info!(count = compiled, "byte-compiled");
    }

    reporter
        .finish_done(format!(
            "tangled {} file(s), compiled {compiled}",
            plan.to_tangle.len()
        ))
        .await;

    Ok(())
}

/// Dependency pre-check first; target discovery runs only when no
/// dependency forced a full rebuild.
async fn build_plan(
    args: &CliArgs,
    cfg: &ConfigFile,
    engine: &impl LiterateEngine,
    reporter: &Reporter,
) -> Result<FreshnessSet> {
    let forced = resolve::dependency_forced(
        &args.file,
        &args.dependency,
        &cfg.engine.tangle_extension,
    );
    if !forced.is_empty() {
        info!(
            source = %args.file.display(),
            "dependency change forces a full re-tangle"
        );
        return Ok(forced);
    }

    let targets = engine.list_targets(&args.file, reporter).await?;
    Ok(resolve::resolve_targets(&args.file, targets, args.compile))
}
