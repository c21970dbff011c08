use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rul_cli::pipeline::{
    FitRequest, TargetClip, export_lives, fit, load_options, segment_lengths,
};
use rul_model::LivesDataset;
use tracing::info;

use crate::cli::{FitArgs, PipelineArgs, SegmentsArgs, TransformArgs};
use crate::summary::{print_export_summary, print_fit_summary, print_segments};

pub fn run_fit(args: &FitArgs) -> Result<()> {
    let request = fit_request(&args.pipeline)?;
    let (_, _, report) = fit(&request)?;
    if args.json {
        let json = serde_json::to_string_pretty(&report.description)
            .context("serialize transformer description")?;
        println!("{json}");
    } else {
        print_fit_summary(&report);
    }
    Ok(())
}

pub fn run_transform(args: &TransformArgs) -> Result<()> {
    let request = fit_request(&args.pipeline)?;
    let (dataset, transformer, report) = fit(&request)?;

    let progress = ProgressBar::new(dataset.n_lives() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} lives")
            .context("progress bar template")?
            .progress_chars("#>-"),
    );
    let written = export_lives(&dataset, &transformer, &args.output, |_| progress.inc(1))?;
    progress.finish_and_clear();

    info!(lives = written.len(), output = %args.output.display(), "transformed lives written");
    print_export_summary(&report, &written);
    Ok(())
}

pub fn run_segments(args: &SegmentsArgs) -> Result<()> {
    let lengths = segment_lengths(&args.path, &args.column)?;
    print_segments(&lengths);
    Ok(())
}

/// Options file first, then flags on top.
fn fit_request(args: &PipelineArgs) -> Result<FitRequest> {
    let mut options = load_options(args.options.as_deref())?;
    if let Some(features) = &args.features {
        options.features = Some(features.clone());
        options.discard = None;
    }
    if let Some(discard) = &args.discard {
        options.discard = Some(discard.clone());
        options.features = None;
    }
    if let Some(every) = args.resample_every {
        options.resample_every = Some(every);
    }
    if let Some(scaler) = args.scaler {
        options.scaler = scaler.into();
    }
    if let Some(k) = args.outlier_iqr {
        options.outlier_iqr_factor = Some(k);
    }
    if args.no_impute {
        options.impute = false;
    }
    let clip = match (args.max_life, args.max_life_quantile) {
        (Some(max_life), _) => TargetClip::MaxLife(max_life),
        (None, Some(q)) => TargetClip::Quantile(q),
        (None, None) => TargetClip::None,
    };
    Ok(FitRequest {
        dataset_dir: args.dataset_dir.clone(),
        target: args.target.clone(),
        time_feature: args.time_feature.clone(),
        options,
        proportion: args.proportion,
        clip,
    })
}
