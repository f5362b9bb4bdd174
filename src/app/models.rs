use std::path::PathBuf;

/// A program plus the arguments placed before the per-run paths.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// External programs used for listing, summarizing and committing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub tree: ToolCommand,
    pub du: ToolCommand,
    pub git: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            tree: ToolCommand::new("tree", &["--du", "-h", "--charset=ascii", "-F"]),
            du: ToolCommand::new("du", &["-sch"]),
            git: "git".to_string(),
        }
    }
}

/// A `-f DEST SRC...` occurrence: one listing file per source inside `destination`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeGroup {
    pub destination: PathBuf,
    pub sources: Vec<PathBuf>,
}

/// A `-t OUTFILE SRC...` occurrence: every source's usage summary in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalGroup {
    pub destination: PathBuf,
    pub sources: Vec<PathBuf>,
}

/// Everything a run needs, resolved and validated up front.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub trees: Vec<TreeGroup>,
    pub totals: Vec<TotalGroup>,
    pub ignore_missing: bool,
    pub git_root: Option<PathBuf>,
    pub tools: Tools,
}
