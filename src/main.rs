use anyhow::{Result, bail};
use clap::Parser;
use log::info;
use log4j_scout::cli::{Cli, OutputFormat};
use log4j_scout::inspect::Inspector;
use log4j_scout::jps::Jps;
use log4j_scout::report::render_text;
use log4j_scout::signatures::FingerprintDb;
use log4j_scout::walk::ExclusionSet;
use log4j_scout::{mine, provision, scan};
use std::path::PathBuf;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let db = match &cli.signatures {
        Some(path) => FingerprintDb::from_json_file(path)?,
        None => FingerprintDb::builtin(),
    };
    let inspector = Inspector::new(db).ignore_v1(cli.ignore_v1);
    let excludes = ExclusionSet::new(cli.exclude.clone());

    let targets = if cli.include.is_empty() {
        discover_targets(&cli)?
    } else {
        cli.include.clone()
    };

    let summary = scan::run_scan(&targets, &excludes, &inspector);

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print!("{}", render_text(&summary)),
    }

    if summary.found {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("LOG4J_SCOUT_LOG", default_level),
    )
    .target(env_logger::Target::Stderr)
    .init();
}

/// Mines scan targets from the running-JVM listing. Only the inability to
/// obtain any process source at all is fatal here; explicit include paths
/// never go through this.
fn discover_targets(cli: &Cli) -> Result<Vec<PathBuf>> {
    let jps = match Jps::locate() {
        Some(jps) => jps,
        None if cli.no_jps_download => bail!(MISSING_JPS_HELP),
        None => {
            info!("no jps on PATH, provisioning one");
            Jps::new(provision::provision_jps()?)
        }
    };

    let lines = jps.lines()?;
    let jars = mine::extract_jar_paths(&lines);
    let dirs = mine::extract_dir_paths(&lines);
    info!(
        "mined {} jar and {} directory candidate(s) from {} process line(s)",
        jars.len(),
        dirs.len(),
        lines.len()
    );

    Ok(jars
        .into_iter()
        .chain(dirs)
        .map(PathBuf::from)
        .collect())
}

const MISSING_JPS_HELP: &str = "\
no 'jps' executable was found on PATH and downloading one is disabled. Either:
* install an Oracle JDK or OpenJDK matching your java installation (java -version shows which);
* drop --no-jps-download so a JDK can be fetched just for its jps; or
* run with explicit directories to scan as positional arguments";
