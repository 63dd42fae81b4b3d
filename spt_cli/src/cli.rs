use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Validate, analyze and report SPT soundings (NBR 6484:2020).
#[derive(Debug, Parser)]
#[command(name = "geospt", version, about)]
pub struct Cli {
    /// Settings file, instead of ./geospt.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debug logging (overridden by GEOSPT_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compliance review of a sounding bundle.
    Validate(ValidateArgs),
    /// Statistics and geotechnical analysis of the samples.
    Stats(StatsArgs),
    /// Assemble the report, optionally rendering it to PDF.
    Report(ReportArgs),
    /// Soil classification suggestions for an NSPT value.
    Classify(ClassifyArgs),
    /// Copy a bundle into a new draft under another code.
    Duplicate(DuplicateArgs),
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Bundle file (.spt.json)
    pub bundle: PathBuf,
    /// Print the review as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    pub bundle: PathBuf,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    pub bundle: PathBuf,
    /// Print the assembled document as JSON
    #[arg(long)]
    pub json: bool,
    /// Write the rendered PDF here
    #[arg(long, value_name = "OUT")]
    pub pdf: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    #[arg(long)]
    pub nspt: i32,
    /// Visual description from the field log, e.g. "argila"
    #[arg(long)]
    pub hint: Option<String>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DuplicateArgs {
    pub bundle: PathBuf,
    /// Code of the new sounding
    #[arg(long)]
    pub code: String,
    /// Where to write the new bundle
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from(["geospt", "validate", "sp-01.spt.json", "--json"]).unwrap();
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.bundle, PathBuf::from("sp-01.spt.json"));
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "geospt",
            "report",
            "sp-01.spt.json",
            "--pdf",
            "out.pdf",
            "--config",
            "custom.toml",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Report(args) => assert_eq!(args.pdf, Some(PathBuf::from("out.pdf"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_classify_requires_nspt() {
        assert!(Cli::try_parse_from(["geospt", "classify"]).is_err());

        let cli =
            Cli::try_parse_from(["geospt", "classify", "--nspt", "12", "--hint", "areia"]).unwrap();
        match cli.command {
            Commands::Classify(args) => {
                assert_eq!(args.nspt, 12);
                assert_eq!(args.hint.as_deref(), Some("areia"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_requires_code_and_out() {
        let missing_out =
            Cli::try_parse_from(["geospt", "duplicate", "a.spt.json", "--code", "SP-02"]);
        assert!(missing_out.is_err());
    }
}
