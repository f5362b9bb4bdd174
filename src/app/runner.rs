use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::app::error::CheckError;
use crate::app::models::ToolCommand;

/// One external command: program and arguments, where to run it, and
/// whether its stderr should reach the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub argv: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub quiet: bool,
}

impl CommandLine {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut argv = vec![OsString::from(program)];
        argv.extend(args.into_iter().map(Into::into));
        Self {
            argv,
            cwd: None,
            quiet: false,
        }
    }

    /// `tool`'s fixed arguments followed by `paths`.
    pub fn tool<'a, I>(tool: &ToolCommand, paths: I) -> Self
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut line = Self::new(&tool.program, tool.args.iter());
        line.argv
            .extend(paths.into_iter().map(|p| p.as_os_str().to_os_string()));
        line
    }

    pub fn in_dir(mut self, cwd: &Path) -> Self {
        self.cwd = Some(cwd.to_path_buf());
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Shell-like rendering for messages.
    pub fn display(&self) -> String {
        self.argv
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("status {}", code),
            None => "a signal".to_string(),
        }
    }
}

/// Runs external commands to completion and captures their stdout.
pub trait CommandRunner {
    fn run(&self, line: &CommandLine) -> io::Result<CommandOutput>;
}

/// Runs `line` and returns its stdout, failing on spawn errors and non-zero exits.
pub fn capture<R: CommandRunner + ?Sized>(
    runner: &R,
    line: &CommandLine,
) -> Result<Vec<u8>, CheckError> {
    let output = runner.run(line).map_err(|source| CheckError::Spawn {
        command: line.display(),
        source,
    })?;
    if !output.success() {
        return Err(CheckError::CommandFailed {
            command: line.display(),
            status: output.status_text(),
        });
    }
    Ok(output.stdout)
}

/// Spawns real processes.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, line: &CommandLine) -> io::Result<CommandOutput> {
        let (program, args) = line
            .argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;

        log::debug!("Running: {}", line.display());

        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null());
        if let Some(cwd) = &line.cwd {
            cmd.current_dir(cwd);
        }
        cmd.stderr(if line.quiet {
            Stdio::null()
        } else {
            Stdio::inherit()
        });

        let output = cmd.output()?;
        Ok(CommandOutput {
            stdout: output.stdout,
            code: output.status.code(),
        })
    }
}
