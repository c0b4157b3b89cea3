//! Fixed-shape probability matrices supplied by the topic model.
//!
//! Both matrices are thin wrappers over [`ndarray::Array2`] that validate their
//! entries once at construction, so the engines downstream can index them
//! without re-checking shape or sign.
//!
//! ```text
//! DocumentTopics   N × T   P(topic | document)
//! TopicWords       T × W   P(word  | topic), top-W words per topic
//! ```

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Check that every entry is finite and non-negative.
fn validate_entries(data: &Array2<f64>) -> Result<()> {
    for ((row, col), &value) in data.indexed_iter() {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidValue { row, col, value });
        }
    }
    Ok(())
}

/// Stack equally-long rows into a matrix.
fn stack_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    if rows.is_empty() {
        return Err(Error::EmptyInput);
    }
    let d = rows[0].len();
    if let Some(r) = rows.iter().find(|r| r.len() != d) {
        return Err(Error::DimensionMismatch {
            expected: d,
            found: r.len(),
        });
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), d), flat).map_err(|e| Error::ShapeMismatch {
        expected: format!("{} x {}", rows.len(), d),
        actual: e.to_string(),
    })
}

/// Document-topic proportions, one row per document in canonical id order.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTopics {
    data: Array2<f64>,
}

impl DocumentTopics {
    /// Build from per-document topic vectors.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] for no documents, [`Error::DimensionMismatch`]
    /// for ragged rows, [`Error::InvalidValue`] for negative or non-finite entries.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        Self::from_array(stack_rows(rows)?)
    }

    /// Wrap an existing `N × T` array.
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(Error::EmptyInput);
        }
        validate_entries(&data)?;
        Ok(Self { data })
    }

    /// Number of documents (N).
    pub fn n_docs(&self) -> usize {
        self.data.nrows()
    }

    /// Number of topics (T).
    pub fn n_topics(&self) -> usize {
        self.data.ncols()
    }

    /// Topic vector of one document.
    ///
    /// # Panics
    ///
    /// If `doc >= n_docs()`.
    pub fn row(&self, doc: usize) -> ArrayView1<'_, f64> {
        self.data.row(doc)
    }

    /// Euclidean norm ("modulus") of every document vector.
    pub fn norms(&self) -> Vec<f64> {
        self.data
            .rows()
            .into_iter()
            .map(|r| r.dot(&r).sqrt())
            .collect()
    }

    /// Borrow the underlying matrix.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }
}

/// Topic-word probabilities for the top-W words of every topic.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicWords {
    data: Array2<f64>,
}

impl TopicWords {
    /// Build from per-topic word probability rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        Self::from_array(stack_rows(rows)?)
    }

    /// Wrap an existing `T × W` array.
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(Error::EmptyInput);
        }
        validate_entries(&data)?;
        Ok(Self { data })
    }

    /// Number of topics (T).
    pub fn n_topics(&self) -> usize {
        self.data.nrows()
    }

    /// Number of words considered per topic (W).
    pub fn n_words(&self) -> usize {
        self.data.ncols()
    }

    /// Borrow the underlying matrix.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_document_topics_shape() {
        let docs = DocumentTopics::from_rows(&[vec![0.5, 0.5], vec![1.0, 0.0], vec![0.0, 1.0]])
            .unwrap();
        assert_eq!(docs.n_docs(), 3);
        assert_eq!(docs.n_topics(), 2);
        assert_eq!(docs.row(1).to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_norms() {
        let docs = DocumentTopics::from_array(array![[3.0, 4.0], [0.0, 0.0]]).unwrap();
        assert_eq!(docs.norms(), vec![5.0, 0.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = DocumentTopics::from_rows(&[vec![0.5, 0.5], vec![1.0]]).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_negative_and_nan_rejected() {
        let err = DocumentTopics::from_rows(&[vec![0.5, -0.1]]).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { row: 0, col: 1, .. }));

        let err = TopicWords::from_rows(&[vec![0.1], vec![f64::NAN]]).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { row: 1, col: 0, .. }));
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(DocumentTopics::from_rows(&[]).unwrap_err(), Error::EmptyInput);
        assert_eq!(
            TopicWords::from_array(Array2::zeros((0, 4))).unwrap_err(),
            Error::EmptyInput
        );
    }

    #[test]
    fn test_topic_words_shape() {
        let tw = TopicWords::from_rows(&[vec![0.2, 0.1, 0.05], vec![0.3, 0.0, 0.1]]).unwrap();
        assert_eq!(tw.n_topics(), 2);
        assert_eq!(tw.n_words(), 3);
    }
}
