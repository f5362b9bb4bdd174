use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{0}")]
    Usage(String),

    #[error("Cannot expand '{0}': home directory is unknown")]
    NoHome(PathBuf),

    #[error("'{dest}' is an absolute or ~ path, so its parent '{parent}' must exist!")]
    MissingParent { dest: PathBuf, parent: PathBuf },

    #[error("'{0}' exists and is not a folder, it cannot hold tree output")]
    DestinationNotFolder(PathBuf),

    #[error("'{0}' is a folder, --total needs a file name")]
    TotalIsFolder(PathBuf),

    #[error("'{0}' is not a valid folder!")]
    InvalidSource(PathBuf),

    #[error("'{0}' does not exist and is not one of the --folder outputs. Check your -g option")]
    InvalidGitRoot(PathBuf),

    #[error("Failed to create folder '{path}'")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to run '{command}'")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("'{command}' exited with {status}")]
    CommandFailed { command: String, status: String },

    #[error("Failed to write '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Something went wrong when creating a git repo in '{0}'")]
    GitInit(PathBuf),

    #[error("Failed to stage changes in '{root}': '{command}' exited with {status}")]
    GitAdd {
        root: PathBuf,
        command: String,
        status: String,
    },
}
