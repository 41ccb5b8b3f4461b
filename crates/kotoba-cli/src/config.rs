use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "kotoba", version, about = "Run Kotoba scripts, or start the REPL when no file is given")]
pub struct Cli {
    /// Script to run (*.ktb). Omit to start the REPL.
    pub file: Option<PathBuf>,

    /// What to do with the script
    #[arg(long = "emit", value_enum, default_value_t = Emit::Run)]
    pub emit: Emit,

    /// Extra directory to search for `取込` modules (repeatable)
    #[arg(short = 'I', long = "module-path", action = ArgAction::Append)]
    pub module_path: Vec<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace). KOTOBA_LOG overrides.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Module directories from the environment, searched last
    #[arg(long = "kotoba-path", env = "KOTOBA_PATH", value_delimiter = ':', hide = true)]
    pub env_path: Vec<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emit {
    /// Execute the script
    Run,
    /// Print the parse tree as JSON
    Parse,
    /// Print the lowered AST as JSON
    Ast,
}

impl Cli {
    /// Module search path: the script's directory, then `-I` dirs, then KOTOBA_PATH.
    pub fn search_path(&self, script_dir: Option<&Path>) -> Vec<PathBuf> {
        script_dir
            .map(Path::to_path_buf)
            .into_iter()
            .chain(self.module_path.iter().cloned())
            .chain(self.env_path.iter().filter(|p| !p.as_os_str().is_empty()).cloned())
            .collect()
    }

    pub fn default_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
