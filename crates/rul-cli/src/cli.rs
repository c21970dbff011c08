//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use rul_transform::ScalerKind;

#[derive(Parser)]
#[command(
    name = "rul",
    version,
    about = "Fit and apply remaining-useful-life transformers on CSV datasets",
    long_about = "Fit feature and target pipelines on a directory of lives (one CSV file per\n\
                  life) and apply them per life to produce aligned feature and target tables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fit a transformer on a dataset and print a summary.
    Fit(FitArgs),

    /// Fit a transformer and write every transformed life as CSV.
    Transform(TransformArgs),

    /// Split a concatenated target column back into lives.
    Segments(SegmentsArgs),
}

/// Options shared by the commands that fit a transformer.
#[derive(Args)]
pub struct PipelineArgs {
    /// Directory holding one CSV file per life.
    #[arg(value_name = "DATASET_DIR")]
    pub dataset_dir: PathBuf,

    /// Name of the target column.
    #[arg(long = "target", default_value = "RUL")]
    pub target: String,

    /// Timestamp column passed to the target pipeline along with the target.
    #[arg(long = "time-feature", value_name = "COLUMN")]
    pub time_feature: Option<String>,

    /// Columns to keep (comma separated).
    #[arg(long = "features", value_delimiter = ',', conflicts_with = "discard")]
    pub features: Option<Vec<String>>,

    /// Columns to drop (comma separated).
    #[arg(long = "discard", value_delimiter = ',')]
    pub discard: Option<Vec<String>>,

    /// Pipeline options as JSON; flags override its fields.
    #[arg(long = "options", value_name = "PATH")]
    pub options: Option<PathBuf>,

    /// Fraction of the lives used for fitting, in (0, 1].
    #[arg(long = "proportion", default_value_t = 1.0)]
    pub proportion: f64,

    /// Clip the target into [0, MAX_LIFE].
    #[arg(long = "max-life", conflicts_with = "max_life_quantile")]
    pub max_life: Option<f64>,

    /// Clip the target at this quantile of the fitted target values.
    #[arg(long = "max-life-quantile", value_name = "Q")]
    pub max_life_quantile: Option<f64>,

    /// Keep every n-th row of each life at transform time.
    #[arg(long = "resample-every", value_name = "N")]
    pub resample_every: Option<usize>,

    /// Scaler applied to the features.
    #[arg(long = "scaler", value_enum)]
    pub scaler: Option<ScalerArg>,

    /// Remove outliers outside [Q1 - K*IQR, Q3 + K*IQR].
    #[arg(long = "outlier-iqr", value_name = "K")]
    pub outlier_iqr: Option<f64>,

    /// Skip forward-fill imputation.
    #[arg(long = "no-impute")]
    pub no_impute: bool,
}

#[derive(Args)]
pub struct FitArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Print the transformer description as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct TransformArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Output directory for the transformed lives.
    #[arg(long = "output", value_name = "DIR")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct SegmentsArgs {
    /// CSV file holding a concatenated target column.
    #[arg(value_name = "CSV")]
    pub path: PathBuf,

    /// Name of the target column.
    #[arg(long = "column", default_value = "RUL")]
    pub column: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScalerArg {
    None,
    MinMax,
    Robust,
}

impl From<ScalerArg> for ScalerKind {
    fn from(arg: ScalerArg) -> Self {
        match arg {
            ScalerArg::None => Self::None,
            ScalerArg::MinMax => Self::MinMax,
            ScalerArg::Robust => Self::Robust,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_feature_list() {
        let cli = Cli::parse_from(["rul", "fit", "data", "--features", "a,b", "--json"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(
            args.pipeline.features,
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert!(args.json);
        assert_eq!(args.pipeline.target, "RUL");
    }

    #[test]
    fn features_and_discard_conflict() {
        let parsed = Cli::try_parse_from([
            "rul", "fit", "data", "--features", "a", "--discard", "b",
        ]);
        assert!(parsed.is_err());
    }
}
