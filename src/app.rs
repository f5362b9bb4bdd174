// Declare modules
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod paths;
pub mod runner;
pub mod snapshot;
pub mod validate;
pub mod vcs;

use anyhow::Result;
use clap::error::ErrorKind;
use std::ffi::OsString;

use self::cli::Invocation;
use self::config::{load_settings, Settings};
use self::models::RunConfig;
use self::runner::{CommandRunner, SystemRunner};
use self::snapshot::Snapshot;
use self::validate::Environment;

/// Parses arguments, validates every path, then writes the output.
pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    // 1. Parse Args
    if args.len() <= 1 {
        cli::command().print_help()?;
        return Ok(());
    }
    let invocation = match Invocation::parse_from(&args) {
        Ok(invocation) => invocation,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print()?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if invocation.examples {
        print!("{}", cli::EXAMPLES);
        return Ok(());
    }

    // 2. Load settings and the environment paths resolve against
    let settings = load_settings()?;
    let env = Environment::current()?;

    // 3. Validate, then write
    snapshot_with(invocation, settings, &env, &SystemRunner)
}

fn snapshot_with<R: CommandRunner>(
    invocation: Invocation,
    settings: Settings,
    env: &Environment,
    runner: &R,
) -> Result<()> {
    let config = validate::resolve(invocation, settings, env)?;
    execute(&config, env, runner)
}

/// Writes all groups, then commits if a git root was given.
pub fn execute<R: CommandRunner>(config: &RunConfig, env: &Environment, runner: &R) -> Result<()> {
    Snapshot::new(config, runner).write_all()?;

    if let Some(root) = &config.git_root {
        for (dest, relative) in vcs::outside_root(config, root, &env.cwd) {
            log::warn!(
                "'{}' is outside the git root ({}), it will not be committed",
                dest.display(),
                relative.display()
            );
        }
        vcs::commit_snapshot(runner, &config.tools.git, root, &vcs::commit_message())?;
    }

    Ok(())
}
