use std::error::Error;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use clap::Parser;
use tempfile::tempdir;

use orgtangle::cli::CliArgs;
use orgtangle::config::ConfigFile;
use orgtangle::engine::LiterateEngine;
use orgtangle::errors::RunError;
use orgtangle::report::{Reporter, spawn_reporter};
use orgtangle::resolve::TangleTarget;
use orgtangle::run_pipeline;

type TestResult = Result<(), Box<dyn Error>>;

/// In-memory engine: serves a canned target list and records invocations.
struct FakeEngine {
    targets: Vec<TangleTarget>,
    fail_list: bool,
    fail_tangle: bool,
    fail_compile: bool,
    tangled: Mutex<Vec<PathBuf>>,
    compiled: Mutex<Vec<PathBuf>>,
}

impl FakeEngine {
    fn new(targets: Vec<TangleTarget>) -> Self {
        Self {
            targets,
            fail_list: false,
            fail_tangle: false,
            fail_compile: false,
            tangled: Mutex::new(Vec::new()),
            compiled: Mutex::new(Vec::new()),
        }
    }
}

impl LiterateEngine for FakeEngine {
    async fn list_targets(
        &self,
        source: &Path,
        _log: &Reporter,
    ) -> Result<Vec<TangleTarget>, RunError> {
        if self.fail_list {
            return Err(RunError::Discovery {
                file: source.to_path_buf(),
                detail: "unparseable block".to_string(),
            });
        }
        Ok(self.targets.clone())
    }

    async fn tangle(&self, source: &Path, _log: &Reporter) -> Result<(), RunError> {
        if self.fail_tangle {
            return Err(RunError::Tangle(source.to_path_buf()));
        }
        self.tangled.lock().unwrap().push(source.to_path_buf());
        Ok(())
    }

    async fn compile(&self, files: &[PathBuf], _log: &Reporter) -> Result<(), RunError> {
        if self.fail_compile {
            return Err(RunError::Compile("engine exited with code 1".to_string()));
        }
        self.compiled.lock().unwrap().extend(files.iter().cloned());
        Ok(())
    }
}

fn touch(path: &Path, when: SystemTime) -> TestResult {
    fs::write(path, "x")?;
    File::options().write(true).open(path)?.set_modified(when)?;
    Ok(())
}

fn at(secs: u64) -> SystemTime {
    SystemTime::now() - Duration::from_secs(3600) + Duration::from_secs(secs)
}

fn args_for(file: &Path, extra: &[&str]) -> CliArgs {
    let mut argv = vec!["orgtangle".to_string(), "-f".to_string()];
    argv.push(file.display().to_string());
    argv.extend(extra.iter().map(|s| s.to_string()));
    CliArgs::parse_from(argv)
}

async fn drive(
    args: &CliArgs,
    engine: &FakeEngine,
) -> (Result<(), orgtangle::errors::Error>, Vec<PathBuf>, Vec<PathBuf>) {
    let cfg = ConfigFile::default();
    let (reporter, render_task) = spawn_reporter(false, false, 10);
    let outcome = run_pipeline(args, &cfg, engine, &reporter).await;
    drop(reporter);
    render_task.await.expect("render task panicked");
    let tangled = engine.tangled.lock().unwrap().clone();
    let compiled = engine.compiled.lock().unwrap().clone();
    (outcome, tangled, compiled)
}

#[tokio::test]
async fn fresh_tree_invokes_nothing() -> TestResult {
    let dir = tempdir()?;
    let src = dir.path().join("init.org");
    let dest = dir.path().join("init.el");
    touch(&src, at(0))?;
    touch(&dest, at(10))?;

    let engine = FakeEngine::new(vec![TangleTarget::new(&src, &dest)]);
    let args = args_for(&src, &[]);
    let (outcome, tangled, compiled) = drive(&args, &engine).await;

    outcome?;
    assert!(tangled.is_empty());
    assert!(compiled.is_empty());
    Ok(())
}

#[tokio::test]
async fn stale_primary_is_tangled_and_compiled() -> TestResult {
    let dir = tempdir()?;
    let src = dir.path().join("init.org");
    let dest = dir.path().join("init.el");
    touch(&src, at(0))?;

    let engine = FakeEngine::new(vec![TangleTarget::new(&src, &dest)]);
    let args = args_for(&src, &["--compile"]);
    let (outcome, tangled, compiled) = drive(&args, &engine).await;

    outcome?;
    assert_eq!(tangled, vec![src]);
    assert_eq!(compiled, vec![dest]);
    Ok(())
}

#[tokio::test]
async fn collapse_without_compile_flag_skips_compilation() -> TestResult {
    let dir = tempdir()?;
    let src = dir.path().join("init.org");
    let dest = dir.path().join("init.el");
    touch(&src, at(0))?;

    // The collapse rule fills the compile set, but invocation is gated on
    // the --compile flag downstream.
    let engine = FakeEngine::new(vec![TangleTarget::new(&src, &dest)]);
    let args = args_for(&src, &[]);
    let (outcome, tangled, compiled) = drive(&args, &engine).await;

    outcome?;
    assert_eq!(tangled.len(), 1);
    assert!(compiled.is_empty());
    Ok(())
}

#[tokio::test]
async fn newer_dependency_skips_discovery_and_forces_tangle() -> TestResult {
    let dir = tempdir()?;
    let src = dir.path().join("init.org");
    let output = dir.path().join("init.el");
    let dep = dir.path().join("site.el");
    touch(&src, at(0))?;
    touch(&output, at(10))?;
    touch(&dep, at(20))?;

    // Canned targets all fresh; only the dependency can force work.
    let engine = FakeEngine::new(vec![TangleTarget::new(&src, &output)]);
    let dep_arg = dep.display().to_string();
    let args = args_for(&src, &["-d", &dep_arg, "--compile"]);
    let (outcome, tangled, compiled) = drive(&args, &engine).await;

    outcome?;
    assert_eq!(tangled, vec![src]);
    assert_eq!(compiled, vec![output]);
    Ok(())
}

#[tokio::test]
async fn discovery_failure_aborts_before_tangling() -> TestResult {
    let dir = tempdir()?;
    let src = dir.path().join("init.org");
    touch(&src, at(0))?;

    let mut engine = FakeEngine::new(Vec::new());
    engine.fail_list = true;
    let args = args_for(&src, &["--compile"]);
    let (outcome, tangled, compiled) = drive(&args, &engine).await;

    let err = outcome.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RunError>(),
        Some(RunError::Discovery { .. })
    ));
    assert!(tangled.is_empty());
    assert!(compiled.is_empty());
    Ok(())
}

#[tokio::test]
async fn compile_failure_surfaces_after_tangling() -> TestResult {
    let dir = tempdir()?;
    let src = dir.path().join("init.org");
    let dest = dir.path().join("init.el");
    touch(&src, at(0))?;

    let mut engine = FakeEngine::new(vec![TangleTarget::new(&src, &dest)]);
    engine.fail_compile = true;
    let args = args_for(&src, &["--compile"]);
    let (outcome, tangled, compiled) = drive(&args, &engine).await;

    let err = outcome.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RunError>(),
        Some(RunError::Compile(_))
    ));
    // Tangling had already happened; only the compile step failed.
    assert_eq!(tangled, vec![src]);
    assert!(compiled.is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_source_fails_before_the_engine_runs() -> TestResult {
    let dir = tempdir()?;
    let src = dir.path().join("absent.org");

    let args = args_for(&src, &[]);
    let err = orgtangle::run(args).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RunError>(),
        Some(RunError::MissingSource(_))
    ));
    Ok(())
}

#[tokio::test]
async fn tangle_failure_aborts_the_run() -> TestResult {
    let dir = tempdir()?;
    let src = dir.path().join("init.org");
    let dest = dir.path().join("init.el");
    touch(&src, at(0))?;

    let mut engine = FakeEngine::new(vec![TangleTarget::new(&src, &dest)]);
    engine.fail_tangle = true;
    let args = args_for(&src, &["--compile"]);
    let (outcome, _tangled, compiled) = drive(&args, &engine).await;

    assert!(outcome.is_err());
    assert!(compiled.is_empty());
    Ok(())
}
