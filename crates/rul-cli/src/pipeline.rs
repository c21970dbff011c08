//! Fit and export steps behind the CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use polars::prelude::{Column, DataFrame};
use rul_core::{Transformer, TransformerDescription, split_lives_indices};
use rul_ingest::{CsvLivesDataset, read_life_csv, write_csv};
use rul_model::{LIFE_ID_COLUMN, LivesDataset};
use rul_model::frame::{column_names, finite_values};
use rul_transform::{
    PiecewiseRul, PiecewiseRulQuantile, Pipeline, PipelineOptions, RESAMPLER_STEP_NAME, Resampler,
    transformation_pipeline,
};
use tracing::{debug, info, info_span};

pub const TARGET_CLIP_STEP_NAME: &str = "clip";

/// Clipping applied to the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetClip {
    None,
    MaxLife(f64),
    Quantile(f64),
}

/// Everything needed to build and fit a transformer.
#[derive(Debug, Clone)]
pub struct FitRequest {
    pub dataset_dir: PathBuf,
    pub target: String,
    pub time_feature: Option<String>,
    pub options: PipelineOptions,
    pub proportion: f64,
    pub clip: TargetClip,
}

/// Outcome of fitting a transformer on a dataset.
#[derive(Debug, Clone)]
pub struct FitReport {
    pub dataset_dir: PathBuf,
    pub lives: usize,
    pub fitted_lives: usize,
    pub rows: usize,
    pub features: Vec<String>,
    pub n_features: usize,
    pub description: TransformerDescription,
}

/// Read pipeline options from a JSON file, or defaults when no file is given.
pub fn load_options(path: Option<&Path>) -> Result<PipelineOptions> {
    let Some(path) = path else {
        return Ok(PipelineOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read options {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse options {}", path.display()))
}

/// Feature pipeline options for `request`.
///
/// Without an explicit `features` or `discard` list the target, the time
/// feature and the life id are discarded, so they never reach the feature
/// matrix and every life is selected by name.
pub fn feature_options(request: &FitRequest) -> PipelineOptions {
    let mut options = request.options.clone();
    if options.features.is_none() && options.discard.is_none() {
        let mut discard = vec![request.target.clone(), LIFE_ID_COLUMN.to_string()];
        discard.extend(request.time_feature.iter().cloned());
        debug!(?discard, "no feature filter given, discarding non-feature columns");
        options.discard = Some(discard);
    }
    options
}

/// Build the transformer described by `request`.
///
/// The target pipeline mirrors the feature resampling so that both halves of
/// a transformed life keep the same rows.
pub fn build_transformer(request: &FitRequest) -> Result<Transformer> {
    let pipeline =
        transformation_pipeline(&feature_options(request)).context("build feature pipeline")?;
    let mut transformer = Transformer::new(request.target.as_str(), pipeline);
    if let Some(time) = &request.time_feature {
        transformer = transformer.with_time_feature(time.as_str());
    }

    let mut target = Pipeline::new();
    if let Some(every) = request.options.resample_every {
        target = target.add_step(RESAMPLER_STEP_NAME, Resampler::new(every)?);
    }
    target = match request.clip {
        TargetClip::None => target,
        TargetClip::MaxLife(max_life) => {
            target.add_step(TARGET_CLIP_STEP_NAME, PiecewiseRul::new(max_life))
        }
        TargetClip::Quantile(q) => target.add_step(
            TARGET_CLIP_STEP_NAME,
            PiecewiseRulQuantile::new(q).context("target quantile")?,
        ),
    };
    if !target.steps().is_empty() {
        transformer = transformer.with_target_pipeline(target);
    }
    Ok(transformer)
}

/// Open the dataset, build the transformer and fit it.
pub fn fit(request: &FitRequest) -> Result<(CsvLivesDataset, Transformer, FitReport)> {
    let span = info_span!("fit", dataset = %request.dataset_dir.display());
    let _guard = span.enter();

    let dataset = CsvLivesDataset::open(&request.dataset_dir, request.target.as_str())
        .context("open dataset")?;
    let mut transformer = build_transformer(request)?;
    let table = dataset
        .to_frame(request.proportion)
        .context("materialize lives")?;
    transformer.fit_frame(&table).context("fit transformer")?;

    let fitted_lives = count_lives(&table);
    let report = FitReport {
        dataset_dir: request.dataset_dir.clone(),
        lives: dataset.n_lives(),
        fitted_lives,
        rows: table.height(),
        features: transformer.features()?.to_vec(),
        n_features: transformer.n_features()?,
        description: transformer.description(),
    };
    info!(
        lives = report.lives,
        fitted_lives,
        n_features = report.n_features,
        "fit complete"
    );
    Ok((dataset, transformer, report))
}

fn count_lives(table: &DataFrame) -> usize {
    table
        .column(LIFE_ID_COLUMN)
        .ok()
        .and_then(|column| column.n_unique().ok())
        .unwrap_or(0)
}

/// Transform every life of `dataset` and write it to `output_dir` under its
/// source file name. `on_life` is called after each written life.
pub fn export_lives(
    dataset: &CsvLivesDataset,
    transformer: &Transformer,
    output_dir: &Path,
    mut on_life: impl FnMut(usize),
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;
    let mut written = Vec::with_capacity(dataset.n_lives());
    for (index, source) in dataset.files().iter().enumerate() {
        let life = dataset
            .life(index)
            .with_context(|| format!("read life {}", source.display()))?;
        let mut table = transformed_table(transformer, &life)
            .with_context(|| format!("transform life {}", source.display()))?;
        let Some(name) = source.file_name() else {
            bail!("life file without a name: {}", source.display());
        };
        let path = output_dir.join(name);
        write_csv(&mut table, &path)?;
        debug!(index, path = %path.display(), rows = table.height(), "wrote life");
        written.push(path);
        on_life(index);
    }
    Ok(written)
}

/// Features followed by the target; a target column whose name clashes with a
/// feature gets a `_target` suffix.
pub fn transformed_table(transformer: &Transformer, life: &DataFrame) -> Result<DataFrame> {
    let features = transformer.transform_x_frame(life)?;
    let target = transformer.transform_y(life)?.to_frame()?;
    let taken = column_names(&features);
    let mut columns: Vec<Column> = features.get_columns().to_vec();
    for column in target.get_columns() {
        let mut column = column.clone();
        if taken.iter().any(|name| name == column.name().as_str()) {
            let renamed = format!("{}_target", column.name());
            column.rename(renamed.into());
        }
        columns.push(column);
    }
    Ok(DataFrame::new(columns)?)
}

/// Lengths of the lives found in a concatenated target column.
pub fn segment_lengths(path: &Path, column: &str) -> Result<Vec<usize>> {
    let df = read_life_csv(path)?;
    let target = df
        .column(column)
        .with_context(|| format!("column '{column}' in {}", path.display()))?;
    let values = finite_values(target)?;
    Ok(split_lives_indices(&values)
        .into_iter()
        .map(|range| range.len())
        .collect())
}
