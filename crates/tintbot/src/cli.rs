use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tintbot_core::NamerConfig;

use crate::commands::{
    BlendArgs, ConvertArgs, LookupArgs, NameArgs, NearestArgs, Session, load_profile, run_blend,
    run_convert, run_lookup, run_name, run_nearest, run_stats,
};
use crate::error::{CliError, Result};
use crate::logging::{self, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "tintbot",
    about = "Name, blend, and look up colors against a word-list catalog",
    version
)]
pub struct Cli {
    /// Directory holding the reference TSV files.
    #[arg(long, global = true, default_value = "data")]
    pub data: PathBuf,

    /// Seed for choosing among colors that share a base name.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// `key=value` settings file; replaces `TINTBOT_*` environment settings.
    #[arg(long, global = true)]
    pub profile: Option<PathBuf>,

    /// Fail on the first malformed reference row.
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Suggest compound names for a color.
    Name(NameArgs),

    /// Mix two colors or catalog names in Lab space.
    Blend(BlendArgs),

    /// Colors for a catalog name, or the name for a catalog color.
    Lookup(LookupArgs),

    /// Closest catalog entries to a color.
    Nearest(NearestArgs),

    /// Show a color in every supported encoding.
    Convert(ConvertArgs),

    /// Summarize the loaded reference data.
    Stats,
}

/// Parse the process arguments and run.
///
/// `--help` and `--version` are printed by clap and exit 0; every other
/// argument error comes back as [`CliError::Usage`].
pub fn run_from_env() -> Result<()> {
    logging::init(LogFormat::from_env());
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => error.exit(),
        Err(error) => return Err(CliError::Usage(error)),
    };
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(cli, &mut out)
}

/// Run one command, writing its report to `out`.
pub fn execute(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = match &cli.profile {
        Some(path) => load_profile(path)?,
        None => NamerConfig::from_env()?,
    };
    let config = if cli.strict {
        config.with_strict(true)
    } else {
        config
    };
    let mut session = Session::new(cli.data, config, cli.seed, cli.json);

    match cli.command {
        Commands::Name(args) => run_name(&mut session, args, out),
        Commands::Blend(args) => run_blend(&mut session, args, out),
        Commands::Lookup(args) => run_lookup(&mut session, args, out),
        Commands::Nearest(args) => run_nearest(&mut session, args, out),
        Commands::Convert(args) => run_convert(&session, args, out),
        Commands::Stats => run_stats(&mut session, out),
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["tintbot", "name", "#370028", "-k", "3", "--json", "--seed", "7"]);
        assert!(cli.json);
        assert_eq!(cli.seed, Some(7));
        match cli.command {
            Commands::Name(args) => {
                assert_eq!(args.color, "#370028");
                assert_eq!(args.k, Some(3));
            }
            other => panic!("expected name command, got {other:?}"),
        }
    }

    #[test]
    fn head_amount_conflicts_with_weights() {
        let result = Cli::try_parse_from([
            "tintbot",
            "blend",
            "amber",
            "bunny",
            "--head-amount",
            "0.3",
            "--weights",
            "0.1,0.2,0.3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn remember_requires_recent_file() {
        assert!(Cli::try_parse_from(["tintbot", "name", "#370028", "--remember"]).is_err());
    }
}
