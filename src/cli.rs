//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Retarget virtual-dataset source paths inside a container, in place.
///
/// Every virtual dataset reachable from the root has the first occurrence
/// of FROM in each of its source-file paths replaced with TO. The file is
/// modified in place; copy it first if you want a fallback.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Container file to operate on (modified in place)
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Source path prefix to match and replace
    #[arg(value_name = "FROM")]
    pub from: String,

    /// Source path prefix to insert in place of FROM
    #[arg(value_name = "TO")]
    pub to: String,

    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Print per-object and per-mapping detail
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_three_positionals() {
        let cli = Cli::parse_from(["vdsmv", "scan.vdsc", "/data/old", "/data/new"]);
        assert_eq!(cli.file, PathBuf::from("scan.vdsc"));
        assert_eq!(cli.from, "/data/old");
        assert_eq!(cli.to, "/data/new");
        assert!(!cli.verbose);
    }

    #[test]
    fn missing_positionals_are_an_error() {
        assert!(Cli::try_parse_from(["vdsmv", "scan.vdsc", "/data/old"]).is_err());
    }
}
