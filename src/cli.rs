use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "log4j-scout")]
#[command(about = "Light, local Log4Shell scanner for running JVMs and filesystem trees")]
pub struct Cli {
    /// Directories or archives to scan; when omitted, candidates are
    /// mined from the running JVM process listing
    #[arg(value_name = "PATH")]
    pub include: Vec<PathBuf>,

    /// Exact path to skip (repeatable); a matching directory is pruned
    /// with its whole subtree
    #[arg(long, value_name = "PATH")]
    pub exclude: Vec<PathBuf>,

    /// Do not flag log4j 1.x JMSAppender indicators
    #[arg(long)]
    pub ignore_v1: bool,

    /// Never download a JDK; require jps on PATH for process discovery
    #[arg(long)]
    pub no_jps_download: bool,

    /// Load fingerprint sets from a JSON file instead of the built-in table
    #[arg(long, value_name = "FILE")]
    pub signatures: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Verbose diagnostics on stderr
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
