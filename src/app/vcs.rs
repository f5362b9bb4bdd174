use crate::app::error::CheckError;
use crate::app::models::RunConfig;
use crate::app::paths::normalize;
use crate::app::runner::{CommandLine, CommandRunner};
use pathdiff::diff_paths;
use std::path::{Path, PathBuf};

/// Commit message for a snapshot, in the style of `date`.
pub fn commit_message() -> String {
    chrono::Local::now()
        .format("%a %b %e %H:%M:%S %Y")
        .to_string()
}

/// Stages everything under `root` and commits it, creating the repository
/// first if `root` is not inside one.
pub fn commit_snapshot<R: CommandRunner + ?Sized>(
    runner: &R,
    git: &str,
    root: &Path,
    message: &str,
) -> Result<(), CheckError> {
    let status = CommandLine::new(git, ["status"]).in_dir(root).quiet();
    let in_repo = matches!(runner.run(&status), Ok(out) if out.success());

    if !in_repo {
        log::info!("No git repository at '{}', creating one", root.display());
        let init = CommandLine::new(git, ["init"]).in_dir(root).quiet();
        match runner.run(&init) {
            Ok(out) if out.success() => {}
            Ok(_) | Err(_) => return Err(CheckError::GitInit(root.to_path_buf())),
        }
    }

    let add = CommandLine::new(git, ["add", "-A", "."]).in_dir(root).quiet();
    let added = runner.run(&add).map_err(|source| CheckError::Spawn {
        command: add.display(),
        source,
    })?;
    if !added.success() {
        return Err(CheckError::GitAdd {
            root: root.to_path_buf(),
            command: add.display(),
            status: added.status_text(),
        });
    }

    let commit = CommandLine::new(git, ["commit", "-m", message])
        .in_dir(root)
        .quiet();
    let committed = runner.run(&commit).map_err(|source| CheckError::Spawn {
        command: commit.display(),
        source,
    })?;
    if committed.success() {
        log::info!("Committed snapshot in '{}'", root.display());
    } else {
        // Usually "nothing to commit" on an unchanged re-run
        log::warn!(
            "'{}' in '{}' exited with {}, nothing was committed",
            commit.display(),
            root.display(),
            committed.status_text()
        );
    }
    Ok(())
}

/// Destinations that will not be part of a commit at `root`, each paired
/// with its path relative to `root`.
pub fn outside_root(config: &RunConfig, root: &Path, cwd: &Path) -> Vec<(PathBuf, PathBuf)> {
    let root = normalize(root, cwd);
    config
        .trees
        .iter()
        .map(|g| &g.destination)
        .chain(config.totals.iter().map(|g| &g.destination))
        .filter_map(|dest| {
            let full = normalize(dest, cwd);
            if full.starts_with(&root) {
                return None;
            }
            let relative = diff_paths(&full, &root).unwrap_or_else(|| full.clone());
            Some((dest.clone(), relative))
        })
        .collect()
}
