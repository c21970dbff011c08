//! The dataset-of-lives contract.
//!
//! A dataset is an ordered collection of independent lives. Each life is a
//! table whose rows are time ordered and whose target column decreases
//! towards zero at failure. Implementors only provide raw access to a life;
//! life-id injection, materialization and schema queries are provided.

use std::collections::BTreeSet;

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use tracing::debug;

use crate::error::{Result, RulError};
use crate::frame::{column_names, concat_diagonal};

/// Name of the life identifier column injected into every life.
pub const LIFE_ID_COLUMN: &str = "life";

pub trait LivesDataset {
    /// Number of lives in the dataset.
    fn n_lives(&self) -> usize;

    /// Raw table of the life at `index`.
    fn get_life(&self, index: usize) -> Result<DataFrame>;

    /// Name of the column holding the remaining useful life.
    fn rul_column(&self) -> &str;

    /// Life at `index` with the [`LIFE_ID_COLUMN`] injected.
    fn life(&self, index: usize) -> Result<DataFrame> {
        let mut df = self.get_life(index)?;
        let id = u32::try_from(index)
            .map_err(|_| RulError::InvalidParameter(format!("life index {index} too large")))?;
        let height = df.height();
        df.with_column(life_id_column(id, height))?;
        Ok(df)
    }

    /// Concatenate the first `ceil(n_lives * proportion)` lives into one table.
    ///
    /// Row order inside each life is preserved and every row carries its
    /// life id. Lives with differing columns are stacked over the union of
    /// their schemas.
    fn to_frame(&self, proportion: f64) -> Result<DataFrame> {
        if !(proportion > 0.0 && proportion <= 1.0) {
            return Err(RulError::InvalidParameter(format!(
                "proportion must be in (0, 1], got {proportion}"
            )));
        }
        let n_lives = self.n_lives();
        if n_lives == 0 {
            return Err(RulError::EmptyData("dataset has no lives".to_string()));
        }
        let take = lives_for_proportion(n_lives, proportion);
        debug!(n_lives, take, proportion, "materializing lives");
        let lives = (0..take)
            .map(|index| self.life(index))
            .collect::<Result<Vec<_>>>()?;
        concat_diagonal(&lives)
    }

    /// Columns present in every life, life id included, sorted by name.
    fn common_features(&self) -> Result<Vec<String>> {
        let mut common: Option<BTreeSet<String>> = None;
        for index in 0..self.n_lives() {
            let names: BTreeSet<String> = column_names(&self.life(index)?).into_iter().collect();
            common = Some(match common {
                Some(existing) => existing.intersection(&names).cloned().collect(),
                None => names,
            });
        }
        Ok(common.unwrap_or_default().into_iter().collect())
    }

    /// Iterate over the lives, life id injected.
    fn iter(&self) -> LivesIter<'_, Self>
    where
        Self: Sized,
    {
        LivesIter {
            dataset: self,
            next: 0,
        }
    }
}

fn lives_for_proportion(n_lives: usize, proportion: f64) -> usize {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let take = (n_lives as f64 * proportion).ceil() as usize;
    take.clamp(1, n_lives)
}

pub struct LivesIter<'a, D: LivesDataset> {
    dataset: &'a D,
    next: usize,
}

impl<D: LivesDataset> Iterator for LivesIter<'_, D> {
    type Item = Result<DataFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.dataset.n_lives() {
            return None;
        }
        let life = self.dataset.life(self.next);
        self.next += 1;
        Some(life)
    }
}

/// Lives held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryLives {
    lives: Vec<DataFrame>,
    rul_column: String,
}

impl InMemoryLives {
    pub fn new(lives: Vec<DataFrame>, rul_column: impl Into<String>) -> Self {
        Self {
            lives,
            rul_column: rul_column.into(),
        }
    }

    pub fn push(&mut self, life: DataFrame) {
        self.lives.push(life);
    }
}

impl LivesDataset for InMemoryLives {
    fn n_lives(&self) -> usize {
        self.lives.len()
    }

    fn get_life(&self, index: usize) -> Result<DataFrame> {
        self.lives.get(index).cloned().ok_or_else(|| {
            RulError::InvalidParameter(format!(
                "life index {index} out of range ({} lives)",
                self.lives.len()
            ))
        })
    }

    fn rul_column(&self) -> &str {
        &self.rul_column
    }
}

/// A dataset restricted to, and reordered by, a list of life indices.
///
/// Life ids of a folded dataset are positions in the fold, not in the
/// underlying dataset.
#[derive(Debug, Clone)]
pub struct FoldedDataset<'a, D: LivesDataset> {
    dataset: &'a D,
    indices: Vec<usize>,
}

impl<'a, D: LivesDataset> FoldedDataset<'a, D> {
    pub fn new(dataset: &'a D, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl<D: LivesDataset> LivesDataset for FoldedDataset<'_, D> {
    fn n_lives(&self) -> usize {
        self.indices.len()
    }

    fn get_life(&self, index: usize) -> Result<DataFrame> {
        let inner = self.indices.get(index).copied().ok_or_else(|| {
            RulError::InvalidParameter(format!(
                "fold index {index} out of range ({} lives)",
                self.indices.len()
            ))
        })?;
        self.dataset.get_life(inner)
    }

    fn rul_column(&self) -> &str {
        self.dataset.rul_column()
    }
}

/// Column of a life id, for callers that build lives by hand.
pub fn life_id_column(id: u32, height: usize) -> Column {
    Series::new(LIFE_ID_COLUMN.into(), vec![id; height]).into_column()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn life(n: usize, extra: bool) -> DataFrame {
        let mut cols = vec![
            Series::new("feature1".into(), vec![1.0; n]).into_column(),
            Series::new("RUL".into(), (0..n).rev().map(|v| v as f64).collect::<Vec<_>>())
                .into_column(),
        ];
        if extra {
            cols.push(Series::new("feature3".into(), vec![0.5; n]).into_column());
        }
        DataFrame::new(cols).unwrap()
    }

    #[test]
    fn proportion_rounds_up_and_stays_in_range() {
        assert_eq!(lives_for_proportion(5, 1.0), 5);
        assert_eq!(lives_for_proportion(5, 0.5), 3);
        assert_eq!(lives_for_proportion(5, 0.01), 1);
    }

    #[test]
    fn to_frame_rejects_bad_proportion() {
        let ds = InMemoryLives::new(vec![life(3, false)], "RUL");
        assert!(matches!(
            ds.to_frame(0.0),
            Err(RulError::InvalidParameter(_))
        ));
        assert!(matches!(
            ds.to_frame(1.5),
            Err(RulError::InvalidParameter(_))
        ));
    }

    #[test]
    fn to_frame_fails_on_empty_dataset() {
        let ds = InMemoryLives::new(Vec::new(), "RUL");
        assert!(matches!(ds.to_frame(1.0), Err(RulError::EmptyData(_))));
    }

    #[test]
    fn life_injects_id_column() {
        let ds = InMemoryLives::new(vec![life(3, false), life(2, false)], "RUL");
        let second = ds.life(1).unwrap();
        let ids = second.column(LIFE_ID_COLUMN).unwrap().u32().unwrap();
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![Some(1), Some(1)]);
    }

    #[test]
    fn folded_dataset_reorders_lives() {
        let ds = InMemoryLives::new(vec![life(3, false), life(4, false), life(5, true)], "RUL");
        let folded = FoldedDataset::new(&ds, vec![2, 0]);
        assert_eq!(folded.n_lives(), 2);
        assert_eq!(folded.get_life(0).unwrap().height(), 5);
        assert_eq!(folded.get_life(1).unwrap().height(), 3);
        assert_eq!(folded.rul_column(), "RUL");
    }
}
