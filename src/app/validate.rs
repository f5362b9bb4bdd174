use crate::app::cli::Invocation;
use crate::app::config::Settings;
use crate::app::error::CheckError;
use crate::app::models::{RunConfig, TotalGroup, TreeGroup};
use crate::app::paths::{expand_home, names_folder, normalize, required_parent};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

/// Working directory and home directory the paths are resolved against.
#[derive(Debug, Clone)]
pub struct Environment {
    pub cwd: PathBuf,
    pub home: Option<PathBuf>,
}

impl Environment {
    pub fn current() -> Result<Self> {
        Ok(Self {
            cwd: env::current_dir().context("Failed to get current directory")?,
            home: dirs::home_dir(),
        })
    }

    /// Where `path` lives on disk, for existence checks.
    fn on_disk(&self, path: &Path) -> PathBuf {
        self.cwd.join(path)
    }
}

/// Turns the parsed command line into a [`RunConfig`], checking every path
/// before anything is written.
pub fn resolve(
    invocation: Invocation,
    settings: Settings,
    env: &Environment,
) -> Result<RunConfig, CheckError> {
    if invocation.folders.is_empty() && invocation.totals.is_empty() {
        return Err(CheckError::Usage(
            "At least one -f/--folder or -t/--total group is required".to_string(),
        ));
    }

    let ignore_missing = invocation.ignore || settings.ignore_missing;
    let home = env.home.as_deref();

    let mut trees = Vec::with_capacity(invocation.folders.len());
    for group in &invocation.folders {
        let (raw_dest, raw_sources) = split_group(group, "-f")?;
        let destination = expand_home(raw_dest, home)?;
        check_parent(raw_dest, &destination)?;

        let existing = env.on_disk(&destination);
        if existing.exists() && !existing.is_dir() {
            return Err(CheckError::DestinationNotFolder(destination));
        }

        trees.push(TreeGroup {
            destination,
            sources: expand_all(raw_sources, home)?,
        });
    }

    let mut totals = Vec::with_capacity(invocation.totals.len());
    for group in &invocation.totals {
        let (raw_dest, raw_sources) = split_group(group, "-t")?;
        let destination = expand_home(raw_dest, home)?;
        if names_folder(raw_dest) || env.on_disk(&destination).is_dir() {
            return Err(CheckError::TotalIsFolder(destination));
        }
        check_parent(raw_dest, &destination)?;

        totals.push(TotalGroup {
            destination,
            sources: expand_all(raw_sources, home)?,
        });
    }

    if !ignore_missing {
        let all_sources = trees
            .iter()
            .flat_map(|g| &g.sources)
            .chain(totals.iter().flat_map(|g| &g.sources));
        for source in all_sources {
            if !env.on_disk(source).is_dir() {
                return Err(CheckError::InvalidSource(source.clone()));
            }
        }
    }

    let git_root = match &invocation.git {
        Some(raw) => Some(resolve_git_root(raw, &trees, env)?),
        None => None,
    };

    for group in &trees {
        warn_on_shared_names(group);
    }

    Ok(RunConfig {
        trees,
        totals,
        ignore_missing,
        git_root,
        tools: settings.tools,
    })
}

fn split_group<'a>(group: &'a [PathBuf], flag: &str) -> Result<(&'a Path, &'a [PathBuf]), CheckError> {
    match group.split_first() {
        Some((dest, sources)) if !sources.is_empty() => Ok((dest.as_path(), sources)),
        Some((dest, _)) => Err(CheckError::Usage(format!(
            "'{} {}' must be followed by at least one folder",
            flag,
            dest.display()
        ))),
        None => Err(CheckError::Usage(format!(
            "'{}' needs an output and at least one folder",
            flag
        ))),
    }
}

fn check_parent(raw: &Path, expanded: &Path) -> Result<(), CheckError> {
    match required_parent(raw, expanded) {
        Some(parent) if !parent.is_dir() => Err(CheckError::MissingParent {
            dest: expanded.to_path_buf(),
            parent: parent.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

fn expand_all(raw: &[PathBuf], home: Option<&Path>) -> Result<Vec<PathBuf>, CheckError> {
    raw.iter().map(|p| expand_home(p, home)).collect()
}

fn resolve_git_root(raw: &Path, trees: &[TreeGroup], env: &Environment) -> Result<PathBuf, CheckError> {
    let root = expand_home(raw, env.home.as_deref())?;
    if env.on_disk(&root).is_dir() {
        return Ok(root);
    }

    // Not there yet, but fine if a -f group is about to create it
    let wanted = normalize(&root, &env.cwd);
    let created_by_group = trees
        .iter()
        .any(|g| normalize(&g.destination, &env.cwd) == wanted);

    if created_by_group {
        Ok(root)
    } else {
        Err(CheckError::InvalidGitRoot(root))
    }
}

fn warn_on_shared_names(group: &TreeGroup) {
    let mut seen = HashSet::new();
    for source in &group.sources {
        if let Some(name) = source.file_name() {
            if !seen.insert(name) {
                log::warn!(
                    "More than one folder named {:?} goes to '{}'; the last one wins",
                    name,
                    group.destination.display()
                );
            }
        }
    }
}
