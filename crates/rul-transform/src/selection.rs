//! Feature selection stages.
//!
//! - [`ByNameFeatureSelector`] / [`DiscardByNameFeatureSelector`] pick columns
//!   by name from whole-life tables. The retained names are resolved once at
//!   fit time against the table seen then; transform looks the same names up
//!   in each life.
//! - [`NullProportionSelector`] and [`VarianceThreshold`] learn a support mask
//!   over the columns of a numeric table.

use std::collections::HashSet;

use polars::prelude::DataFrame;
use rul_model::frame::{column_names, ensure_numeric, finite_values, select_positions, select_widening};
use rul_model::{Result, RulError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::stage::{Stage, describe_stage};

/// Columns retained by a name-based selector, resolved at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedColumns {
    /// Retained names, in the column order of the fitted table.
    pub names: Vec<String>,
    /// Positions of the retained names in the fitted table.
    pub indices: Vec<usize>,
}

impl ResolvedColumns {
    fn resolve(df: &DataFrame, keep: impl Fn(&str) -> bool) -> Self {
        let mut names = Vec::new();
        let mut indices = Vec::new();
        for (idx, name) in column_names(df).into_iter().enumerate() {
            if keep(&name) {
                names.push(name);
                indices.push(idx);
            }
        }
        Self { names, indices }
    }
}

/// Keeps the requested columns; an empty request keeps every column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ByNameFeatureSelector {
    features: Vec<String>,
    resolved: Option<ResolvedColumns>,
}

impl ByNameFeatureSelector {
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            features: features.into_iter().map(Into::into).collect(),
            resolved: None,
        }
    }

    /// Number of requested feature names.
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    pub fn resolved(&self) -> Option<&ResolvedColumns> {
        self.resolved.as_ref()
    }
}

impl Stage for ByNameFeatureSelector {
    fn kind(&self) -> &'static str {
        "ByNameFeatureSelector"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let requested: HashSet<&str> = self.features.iter().map(String::as_str).collect();
        let resolved =
            ResolvedColumns::resolve(df, |name| requested.is_empty() || requested.contains(name));
        debug!(
            requested = self.features.len(),
            retained = resolved.names.len(),
            "resolved feature selection"
        );
        self.resolved = Some(resolved);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let resolved = self
            .resolved
            .as_ref()
            .ok_or_else(|| RulError::not_fitted(self.kind()))?;
        select_widening(df, &resolved.names)
    }

    fn support(&self) -> Option<Vec<usize>> {
        self.resolved.as_ref().map(|r| r.indices.clone())
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(self.clone())
    }
}

/// Keeps every column except the listed ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscardByNameFeatureSelector {
    features: Vec<String>,
    resolved: Option<ResolvedColumns>,
}

impl DiscardByNameFeatureSelector {
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            features: features.into_iter().map(Into::into).collect(),
            resolved: None,
        }
    }

    /// Number of feature names to discard.
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    pub fn resolved(&self) -> Option<&ResolvedColumns> {
        self.resolved.as_ref()
    }
}

impl Stage for DiscardByNameFeatureSelector {
    fn kind(&self) -> &'static str {
        "DiscardByNameFeatureSelector"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let discard: HashSet<&str> = self.features.iter().map(String::as_str).collect();
        let resolved = ResolvedColumns::resolve(df, |name| !discard.contains(name));
        debug!(
            discarded = df.width() - resolved.names.len(),
            retained = resolved.names.len(),
            "resolved feature discard"
        );
        self.resolved = Some(resolved);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let resolved = self
            .resolved
            .as_ref()
            .ok_or_else(|| RulError::not_fitted(self.kind()))?;
        select_widening(df, &resolved.names)
    }

    fn support(&self) -> Option<Vec<usize>> {
        self.resolved.as_ref().map(|r| r.indices.clone())
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(self.clone())
    }
}

/// Drops numeric columns whose proportion of finite values is too low.
///
/// A column is kept when its finite proportion is strictly greater than
/// `min_null_proportion`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullProportionSelector {
    min_null_proportion: f64,
    not_null_proportion: Option<Vec<f64>>,
    mask: Option<Vec<bool>>,
}

impl Default for NullProportionSelector {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl NullProportionSelector {
    pub fn new(min_null_proportion: f64) -> Self {
        Self {
            min_null_proportion,
            not_null_proportion: None,
            mask: None,
        }
    }

    pub fn mask(&self) -> Option<&[bool]> {
        self.mask.as_deref()
    }

    pub fn not_null_proportion(&self) -> Option<&[f64]> {
        self.not_null_proportion.as_deref()
    }
}

impl Stage for NullProportionSelector {
    fn kind(&self) -> &'static str {
        "NullProportionSelector"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        ensure_numeric(df)?;
        #[allow(clippy::cast_precision_loss)]
        let height = df.height() as f64;
        let mut proportions = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            #[allow(clippy::cast_precision_loss)]
            let finite = finite_values(column)?.len() as f64;
            proportions.push(finite / height);
        }
        let mask: Vec<bool> = proportions
            .iter()
            .map(|p| *p > self.min_null_proportion)
            .collect();
        debug!(
            columns = mask.len(),
            retained = mask.iter().filter(|keep| **keep).count(),
            "fitted null proportion mask"
        );
        self.not_null_proportion = Some(proportions);
        self.mask = Some(mask);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mask = self
            .mask
            .as_ref()
            .ok_or_else(|| RulError::not_fitted(self.kind()))?;
        select_masked(df, mask)
    }

    fn support(&self) -> Option<Vec<usize>> {
        self.mask.as_deref().map(mask_indices)
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(self.clone())
    }
}

/// Drops numeric columns whose variance is not above `threshold`.
///
/// Variance is the population variance of the finite values of a column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VarianceThreshold {
    threshold: f64,
    variances: Option<Vec<f64>>,
}

impl VarianceThreshold {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            variances: None,
        }
    }

    pub fn variances(&self) -> Option<&[f64]> {
        self.variances.as_deref()
    }

    fn mask(&self) -> Option<Vec<bool>> {
        self.variances
            .as_ref()
            .map(|vars| vars.iter().map(|v| *v > self.threshold).collect())
    }
}

impl Stage for VarianceThreshold {
    fn kind(&self) -> &'static str {
        "VarianceThreshold"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        ensure_numeric(df)?;
        let mut variances = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            variances.push(crate::stats::variance(&finite_values(column)?));
        }
        self.variances = Some(variances);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mask = self.mask().ok_or_else(|| RulError::not_fitted(self.kind()))?;
        select_masked(df, &mask)
    }

    fn support(&self) -> Option<Vec<usize>> {
        self.mask().as_deref().map(mask_indices)
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(self.clone())
    }
}

fn mask_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(idx, keep)| keep.then_some(idx))
        .collect()
}

fn select_masked(df: &DataFrame, mask: &[bool]) -> Result<DataFrame> {
    if df.width() != mask.len() {
        return Err(RulError::ShapeMismatch {
            expected: mask.len(),
            got: df.width(),
        });
    }
    select_positions(df, &mask_indices(mask))
}
