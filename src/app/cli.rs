use clap::{value_parser, Arg, ArgAction, ArgMatches, Command, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

pub const EXAMPLES: &str = "\
Run tree on /etc and put the output into a folder called PC1:
    $ tree_check -f PC1 /etc

Run tree on /var and /usr, output into PC1, then run tree on /home
and put that output into the current folder:
    $ tree_check -f PC1 /var /usr -f . /home

Write the disk usage of everything under /var and /home into totals.txt:
    $ tree_check -t totals.txt /var /home

Snapshot two machines' mount points under ~/snapshots and commit the
result to a git repository rooted there. Mount points that are missing
or empty (not mounted right now) are skipped instead of failing:
    $ tree_check -i -g ~/snapshots \\
        -f ~/snapshots/nas /mnt/nas /mnt/backup \\
        -t ~/snapshots/totals.txt /mnt/nas /mnt/backup

Output folders given as absolute or ~ paths need their parent folder to
exist already; only the last component is created.
";

/// Flags that clap can map onto plain fields. The repeated group flags are
/// declared on the command in [`command`] and read back per occurrence.
#[derive(Parser, Debug)]
#[command(
    name = "tree_check",
    author,
    version,
    about = "Snapshot folder trees and disk usage into files, optionally committed to git",
    disable_version_flag = true
)]
pub struct Cli {
    /// Commit everything under ROOT to git after writing the output
    #[arg(short = 'g', long = "git", value_name = "ROOT")]
    pub git: Option<PathBuf>,

    /// Skip source folders that are missing or empty instead of failing
    #[arg(short = 'i', long = "ignore")]
    pub ignore: bool,

    /// Show usage examples and exit
    #[arg(short = 'e', long = "examples")]
    pub examples: bool,
}

/// Parsed command line, with each `-f`/`-t` occurrence kept as its own group.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub folders: Vec<Vec<PathBuf>>,
    pub totals: Vec<Vec<PathBuf>>,
    pub git: Option<PathBuf>,
    pub ignore: bool,
    pub examples: bool,
}

pub fn command() -> Command {
    Cli::command()
        .arg(
            Arg::new("folder")
                .short('f')
                .long("folder")
                .value_name("PATH")
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .help("DEST SRC...: run tree on every SRC, one output file per SRC inside folder DEST"),
        )
        .arg(
            Arg::new("total")
                .short('t')
                .long("total")
                .value_name("PATH")
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .help("OUTFILE SRC...: append the disk usage of every SRC's contents to OUTFILE"),
        )
        .arg(
            Arg::new("version")
                .short('v')
                .long("version")
                .action(ArgAction::Version)
                .help("Print version"),
        )
}

impl Invocation {
    pub fn parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;
        let cli = Cli::from_arg_matches(&matches)?;

        Ok(Self {
            folders: occurrences(&matches, "folder"),
            totals: occurrences(&matches, "total"),
            git: cli.git,
            ignore: cli.ignore,
            examples: cli.examples,
        })
    }
}

fn occurrences(matches: &ArgMatches, id: &str) -> Vec<Vec<PathBuf>> {
    matches
        .get_occurrences::<PathBuf>(id)
        .map(|groups| groups.map(|values| values.cloned().collect()).collect())
        .unwrap_or_default()
}
