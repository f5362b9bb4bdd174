use crate::app::error::CheckError;
use crate::app::models::{RunConfig, TotalGroup, TreeGroup};
use crate::app::paths::listing_name;
use crate::app::runner::{capture, CommandLine, CommandRunner};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// What a source folder looks like right now. Missing and empty folders are
/// usually unmounted filesystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Missing,
    Empty,
    Populated,
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceState::Missing => write!(f, "not found"),
            SourceState::Empty => write!(f, "is empty"),
            SourceState::Populated => write!(f, "has content"),
        }
    }
}

pub fn probe(path: &Path) -> SourceState {
    if !path.is_dir() {
        return SourceState::Missing;
    }
    match fs::read_dir(path) {
        Ok(mut entries) => {
            if entries.next().is_none() {
                SourceState::Empty
            } else {
                SourceState::Populated
            }
        }
        // Unreadable folders are handed to the tool so it can report them
        Err(_) => SourceState::Populated,
    }
}

/// Writes every tree and total group of a [`RunConfig`].
pub struct Snapshot<'a, R: CommandRunner> {
    config: &'a RunConfig,
    runner: &'a R,
}

impl<'a, R: CommandRunner> Snapshot<'a, R> {
    pub fn new(config: &'a RunConfig, runner: &'a R) -> Self {
        Self { config, runner }
    }

    pub fn write_all(&self) -> Result<(), CheckError> {
        for group in &self.config.trees {
            self.write_tree_group(group)?;
        }
        for group in &self.config.totals {
            self.write_total_group(group)?;
        }
        Ok(())
    }

    fn write_tree_group(&self, group: &TreeGroup) -> Result<(), CheckError> {
        fs::create_dir_all(&group.destination).map_err(|source| CheckError::CreateFolder {
            path: group.destination.clone(),
            source,
        })?;

        for source in &group.sources {
            if self.config.ignore_missing {
                let state = probe(source);
                if state != SourceState::Populated {
                    log::info!("Skipping '{}': {}", source.display(), state);
                    continue;
                }
            }

            let line = CommandLine::tool(&self.config.tools.tree, [source.as_path()]);
            let listing = capture(self.runner, &line)?;

            let target = group.destination.join(listing_name(source));
            fs::write(&target, listing).map_err(|e| write_error(&target, e))?;
            log::info!("Wrote '{}'", target.display());
        }
        Ok(())
    }

    fn write_total_group(&self, group: &TotalGroup) -> Result<(), CheckError> {
        let states: Vec<SourceState> = group.sources.iter().map(|s| probe(s)).collect();
        let has_content = states.contains(&SourceState::Populated);

        if self.config.ignore_missing && !has_content {
            log::info!(
                "Skipping '{}': none of its folders has content",
                group.destination.display()
            );
            return Ok(());
        }

        let file = File::create(&group.destination)
            .map_err(|e| write_error(&group.destination, e))?;
        let mut out = BufWriter::new(file);

        for (source, state) in group.sources.iter().zip(states) {
            self.write_total_entry(&mut out, &group.destination, source, state)?;
        }

        out.flush().map_err(|e| write_error(&group.destination, e))?;
        log::info!("Wrote '{}'", group.destination.display());
        Ok(())
    }

    fn write_total_entry<W: Write>(
        &self,
        out: &mut W,
        destination: &Path,
        source: &Path,
        state: SourceState,
    ) -> Result<(), CheckError> {
        let header = source.display().to_string();
        let underline = "=".repeat(header.chars().count());
        writeln!(out, "{}\n{}", header, underline).map_err(|e| write_error(destination, e))?;

        match (self.config.ignore_missing, state) {
            (true, SourceState::Missing) | (true, SourceState::Empty) => {
                log::info!("'{}' {}", source.display(), state);
                writeln!(out, "{}", state).map_err(|e| write_error(destination, e))?;
            }
            _ => {
                let children = children_of(source);
                let line = CommandLine::tool(
                    &self.config.tools.du,
                    children.iter().map(PathBuf::as_path),
                );
                let summary = capture(self.runner, &line)?;
                out.write_all(&summary)
                    .map_err(|e| write_error(destination, e))?;
            }
        }

        writeln!(out).map_err(|e| write_error(destination, e))
    }
}

/// Immediate children of `source`, sorted by name. A folder with no readable
/// children is summarized as itself.
fn children_of(source: &Path) -> Vec<PathBuf> {
    let mut children: Vec<PathBuf> = match fs::read_dir(source) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(err) => {
            log::warn!("Cannot list '{}': {}", source.display(), err);
            Vec::new()
        }
    };

    if children.is_empty() {
        return vec![source.to_path_buf()];
    }
    children.sort();
    children
}

fn write_error(path: &Path, source: io::Error) -> CheckError {
    CheckError::Write {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::Tools;
    use crate::app::runner::stub::{failed, ok, StubRunner};
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        /// `full/` with two entries, `empty/` with none.
        fn new() -> Self {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let full = dir.path().join("full");
            fs::create_dir_all(full.join("b_dir")).unwrap();
            fs::write(full.join("a.txt"), "content").unwrap();
            fs::create_dir(dir.path().join("empty")).unwrap();
            Self { dir }
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.dir.path().join(rel)
        }

        fn config(&self, trees: Vec<TreeGroup>, totals: Vec<TotalGroup>, ignore: bool) -> RunConfig {
            RunConfig {
                trees,
                totals,
                ignore_missing: ignore,
                git_root: None,
                tools: Tools::default(),
            }
        }
    }

    #[test]
    fn probe_classifies_sources() {
        let fx = Fixture::new();
        assert_eq!(probe(&fx.path("full")), SourceState::Populated);
        assert_eq!(probe(&fx.path("empty")), SourceState::Empty);
        assert_eq!(probe(&fx.path("gone")), SourceState::Missing);
        assert_eq!(probe(&fx.path("full/a.txt")), SourceState::Missing);
    }

    #[test]
    fn probe_counts_a_lone_hidden_entry_as_content() {
        let fx = Fixture::new();
        let mounted = fx.path("mounted");
        fs::create_dir(&mounted).unwrap();
        fs::write(mounted.join(".keep"), "").unwrap();

        assert_eq!(probe(&mounted), SourceState::Populated);
    }

    #[test]
    fn tree_group_writes_one_file_per_source() {
        let fx = Fixture::new();
        let dest = fx.path("out/pc1");
        let config = fx.config(
            vec![TreeGroup {
                destination: dest.clone(),
                sources: vec![fx.path("full/"), fx.path("empty")],
            }],
            vec![],
            false,
        );
        let runner = StubRunner::new(|line| {
            Ok(ok(format!("listing of {}\n", line.argv.last().unwrap().to_string_lossy())))
        });

        Snapshot::new(&config, &runner).write_all().unwrap();

        assert_eq!(
            fs::read_to_string(dest.join("full")).unwrap(),
            format!("listing of {}\n", fx.path("full/").display())
        );
        assert!(dest.join("empty").is_file(), "empty sources still run without ignore");

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0].display(),
            format!("tree --du -h --charset=ascii -F {}", fx.path("full/").display())
        );
    }

    #[test]
    fn tree_group_skips_missing_and_empty_in_ignore_mode() {
        let fx = Fixture::new();
        let dest = fx.path("out");
        let config = fx.config(
            vec![TreeGroup {
                destination: dest.clone(),
                sources: vec![fx.path("gone"), fx.path("empty"), fx.path("full")],
            }],
            vec![],
            true,
        );
        let runner = StubRunner::echo();

        Snapshot::new(&config, &runner).write_all().unwrap();

        assert!(dest.is_dir());
        assert!(!dest.join("gone").exists());
        assert!(!dest.join("empty").exists());
        assert!(dest.join("full").is_file());
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn tree_destination_occupied_by_file_fails() {
        let fx = Fixture::new();
        let dest = fx.path("full/a.txt");
        let config = fx.config(
            vec![TreeGroup {
                destination: dest,
                sources: vec![fx.path("full")],
            }],
            vec![],
            false,
        );
        let runner = StubRunner::echo();

        let err = Snapshot::new(&config, &runner).write_all().unwrap_err();
        assert!(matches!(err, CheckError::CreateFolder { .. }));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn failing_tool_aborts_the_run() {
        let fx = Fixture::new();
        let config = fx.config(
            vec![
                TreeGroup {
                    destination: fx.path("first"),
                    sources: vec![fx.path("full")],
                },
                TreeGroup {
                    destination: fx.path("second"),
                    sources: vec![fx.path("full")],
                },
            ],
            vec![],
            false,
        );
        let runner = StubRunner::new(|_| Ok(failed(2)));

        let err = Snapshot::new(&config, &runner).write_all().unwrap_err();
        match err {
            CheckError::CommandFailed { command, status } => {
                assert!(command.starts_with("tree "));
                assert_eq!(status, "status 2");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!fx.path("first/full").exists());
        assert!(!fx.path("second").exists());
    }

    #[test]
    fn spawn_failure_names_the_command() {
        let fx = Fixture::new();
        let config = fx.config(
            vec![TreeGroup {
                destination: fx.path("out"),
                sources: vec![fx.path("full")],
            }],
            vec![],
            false,
        );
        let runner = StubRunner::new(|_| Err(io::Error::new(io::ErrorKind::NotFound, "no tree")));

        let err = Snapshot::new(&config, &runner).write_all().unwrap_err();
        assert!(matches!(err, CheckError::Spawn { command, .. } if command.starts_with("tree ")));
    }

    #[test]
    fn total_group_writes_headers_and_summaries_in_order() {
        let fx = Fixture::new();
        let out = fx.path("totals.txt");
        let full = fx.path("full");
        let empty = fx.path("empty");
        let config = fx.config(
            vec![],
            vec![TotalGroup {
                destination: out.clone(),
                sources: vec![full.clone(), empty.clone()],
            }],
            false,
        );
        let runner = StubRunner::echo();

        Snapshot::new(&config, &runner).write_all().unwrap();

        let full_header = full.display().to_string();
        let empty_header = empty.display().to_string();
        let expected = format!(
            "{fh}\n{fu}\ndu -sch {a} {b}\n\n{eh}\n{eu}\ndu -sch {e}\n\n",
            fh = full_header,
            fu = "=".repeat(full_header.len()),
            a = full.join("a.txt").display(),
            b = full.join("b_dir").display(),
            eh = empty_header,
            eu = "=".repeat(empty_header.len()),
            e = empty.display(),
        );
        assert_eq!(fs::read_to_string(&out).unwrap(), expected);
    }

    #[test]
    fn total_group_uses_placeholders_in_ignore_mode() {
        let fx = Fixture::new();
        let out = fx.path("totals.txt");
        let gone = fx.path("gone");
        let empty = fx.path("empty");
        let full = fx.path("full");
        let config = fx.config(
            vec![],
            vec![TotalGroup {
                destination: out.clone(),
                sources: vec![gone.clone(), empty.clone(), full.clone()],
            }],
            true,
        );
        let runner = StubRunner::new(|_| Ok(ok("8.0K\ttotal\n")));

        Snapshot::new(&config, &runner).write_all().unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let blocks: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(blocks.len(), 4, "three blocks and a trailing empty piece: {text:?}");
        assert!(blocks[0].ends_with("\nnot found"));
        assert!(blocks[1].ends_with("\nis empty"));
        assert!(blocks[2].ends_with("\n8.0K\ttotal"));
        assert!(blocks[2].starts_with(&full.display().to_string()));
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn total_group_without_content_is_skipped_whole() {
        let fx = Fixture::new();
        let out = fx.path("totals.txt");
        let config = fx.config(
            vec![],
            vec![TotalGroup {
                destination: out.clone(),
                sources: vec![fx.path("empty"), fx.path("gone")],
            }],
            true,
        );
        let runner = StubRunner::echo();

        Snapshot::new(&config, &runner).write_all().unwrap();

        assert!(!out.exists());
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn rerun_overwrites_with_same_content() {
        let fx = Fixture::new();
        let out = fx.path("totals.txt");
        let config = fx.config(
            vec![TreeGroup {
                destination: fx.path("trees"),
                sources: vec![fx.path("full")],
            }],
            vec![TotalGroup {
                destination: out.clone(),
                sources: vec![fx.path("full")],
            }],
            false,
        );
        let runner = StubRunner::echo();

        Snapshot::new(&config, &runner).write_all().unwrap();
        let first = (
            fs::read(&out).unwrap(),
            fs::read(fx.path("trees/full")).unwrap(),
        );
        Snapshot::new(&config, &runner).write_all().unwrap();
        let second = (
            fs::read(&out).unwrap(),
            fs::read(fx.path("trees/full")).unwrap(),
        );

        assert_eq!(first, second);
        assert_eq!(runner.programs(), vec!["tree", "du", "tree", "du"]);
    }

    #[test]
    fn children_are_sorted_and_fall_back_to_the_folder() {
        let fx = Fixture::new();
        assert_eq!(
            children_of(&fx.path("full")),
            vec![fx.path("full/a.txt"), fx.path("full/b_dir")]
        );
        assert_eq!(children_of(&fx.path("empty")), vec![fx.path("empty")]);
    }
}
