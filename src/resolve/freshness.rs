// src/resolve/freshness.rs

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

/// Extension marking a destination as byte-compilable.
const COMPILABLE_EXTENSION: &str = "el";

/// Extension of a destination's compiled sibling.
const COMPILED_EXTENSION: &str = "elc";

/// One file the engine would produce, as reported by its dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TangleTarget {
    /// Literate source the block lives in.
    pub source: PathBuf,
    /// File the block tangles to.
    pub dest: PathBuf,
}

impl TangleTarget {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }
}

/// The outcome of freshness resolution: what to re-tangle, what to compile.
///
/// Both sets are created empty for one invocation and discarded at the end;
/// mtimes on disk are the only persisted comparison state. `BTreeSet` keeps
/// iteration order deterministic for invocation and reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreshnessSet {
    /// Literate sources that must be re-tangled.
    pub to_tangle: BTreeSet<PathBuf>,
    /// Tangled outputs whose compiled siblings must be rebuilt.
    pub to_compile: BTreeSet<PathBuf>,
}

impl FreshnessSet {
    /// True when nothing needs to be rebuilt.
    pub fn is_empty(&self) -> bool {
        self.to_tangle.is_empty() && self.to_compile.is_empty()
    }
}

/// The engine's default output for a literate source: the source path with
/// its extension replaced by `tangle_extension`.
pub fn default_output(primary: &Path, tangle_extension: &str) -> PathBuf {
    primary.with_extension(tangle_extension)
}

/// Dependency pre-check: if any `--dependency` file exists and the default
/// output is not newer than it, the whole source must be re-tangled.
///
/// Returns the forced set, or `None` when no dependency fired. A dependency
/// file that does not exist is skipped, not an error. "Not newer than" means
/// a missing default output, or an mtime less than or equal to the
/// dependency's, so mtime ties force a rebuild here.
pub fn dependency_forced(
    primary: &Path,
    dependencies: &[PathBuf],
    tangle_extension: &str,
) -> FreshnessSet {
    let mut set = FreshnessSet::default();
    let output = default_output(primary, tangle_extension);

    for dep in dependencies {
        if !dep.exists() {
            warn!(dependency = %dep.display(), "dependency file does not exist; skipping");
            continue;
        }
        if !is_newer(&output, dep) {
            debug!(
                dependency = %dep.display(),
                output = %output.display(),
                "dependency newer than default output; forcing full re-tangle"
            );
            set.to_tangle.insert(primary.to_path_buf());
            set.to_compile.insert(output.clone());
        }
    }

    set
}

/// Resolve freshness over the discovered target list.
///
/// Visits each (source, destination) pair once, keyed by destination with
/// first occurrence winning, and applies the staleness rules:
///
/// - Missing destination, or destination strictly older than its source:
///   the source must be re-tangled. The destination additionally joins the
///   compile set when compilation was requested and it is compilable.
/// - Otherwise, a compilable, non-hidden destination whose compiled sibling
///   is missing or older than it joins the compile set (again only when
///   compilation was requested).
///
/// Mtime ties count as up to date.
///
/// Collapse rule: re-tangling the primary source regenerates every output,
/// so if the primary source ends up in `to_tangle`, partial results are
/// discarded in favour of "tangle everything, compile everything": the
/// tangle set becomes exactly the primary source and the compile set becomes
/// every compilable destination seen, stale or not.
pub fn resolve_targets(
    primary: &Path,
    targets: impl IntoIterator<Item = TangleTarget>,
    compile_requested: bool,
) -> FreshnessSet {
    let mut set = FreshnessSet::default();
    let mut all_compile: BTreeSet<PathBuf> = BTreeSet::new();
    let mut seen_dests: HashSet<PathBuf> = HashSet::new();

    for target in targets {
        if !seen_dests.insert(target.dest.clone()) {
            debug!(dest = %target.dest.display(), "duplicate destination; keeping first pair");
            continue;
        }

        let compilable = is_compilable(&target.dest);
        if compilable {
            all_compile.insert(target.dest.clone());
        }

        if dest_is_stale(&target.source, &target.dest) {
            debug!(
                source = %target.source.display(),
                dest = %target.dest.display(),
                "destination missing or older than source; re-tangling"
            );
            set.to_tangle.insert(target.source.clone());
            if compile_requested && compilable {
                set.to_compile.insert(target.dest.clone());
            }
        } else if compile_requested
            && compilable
            && !is_hidden(&target.dest)
            && compiled_sibling_stale(&target.dest)
        {
            debug!(
                dest = %target.dest.display(),
                "compiled sibling missing or older than destination; recompiling"
            );
            set.to_compile.insert(target.dest.clone());
        }
    }

    if set.to_tangle.contains(primary) {
        debug!(
            primary = %primary.display(),
            compile_set = all_compile.len(),
            "primary source stale; collapsing to full re-tangle"
        );
        set.to_tangle = BTreeSet::from([primary.to_path_buf()]);
        set.to_compile = all_compile;
    }

    set
}

/// Full resolver contract: dependency pre-check first, target enumeration
/// only when no dependency fired.
///
/// When a dependency forces the primary source, the target list is never
/// consulted; the forced set already names the primary source and its
/// default output, which the full re-tangle will regenerate.
///
/// This is the single-call surface over the two phases, for callers that
/// already hold a target list. The pipeline itself composes
/// [`dependency_forced`] and [`resolve_targets`] instead, because its target
/// list comes from an async engine invocation that must be skipped entirely
/// when a dependency fires.
pub fn resolve(
    primary: &Path,
    dependencies: &[PathBuf],
    targets: impl IntoIterator<Item = TangleTarget>,
    compile_requested: bool,
    tangle_extension: &str,
) -> FreshnessSet {
    let forced = dependency_forced(primary, dependencies, tangle_extension);
    if !forced.is_empty() {
        return forced;
    }

    resolve_targets(primary, targets, compile_requested)
}

/// Destination staleness: missing, or strictly older than its source.
///
/// A pair whose source mtime is unreadable counts as fresh; the engine just
/// parsed the source, so only the destination's state matters.
fn dest_is_stale(source: &Path, dest: &Path) -> bool {
    match (mtime(dest), mtime(source)) {
        (None, _) => true,
        (Some(dest_time), Some(source_time)) => dest_time < source_time,
        (Some(_), None) => false,
    }
}

/// Compiled-sibling staleness: `foo.el` needs recompiling when `foo.elc` is
/// missing or older than `foo.el`.
fn compiled_sibling_stale(dest: &Path) -> bool {
    let sibling = dest.with_extension(COMPILED_EXTENSION);
    match (mtime(&sibling), mtime(dest)) {
        (None, _) => true,
        (Some(sibling_time), Some(dest_time)) => sibling_time < dest_time,
        (Some(_), None) => false,
    }
}

fn is_compilable(dest: &Path) -> bool {
    dest.extension().is_some_and(|ext| ext == COMPILABLE_EXTENSION)
}

/// Hidden destinations (dot-prefixed file names) are never picked up by the
/// compiled-sibling rule.
fn is_hidden(dest: &Path) -> bool {
    dest.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// True when `path` exists and its mtime is strictly greater than `other`'s.
/// A missing `path` is never newer; a missing `other` makes `path` newer.
fn is_newer(path: &Path, other: &Path) -> bool {
    match (mtime(path), mtime(other)) {
        (Some(a), Some(b)) => a > b,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
