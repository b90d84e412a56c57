//! Tabular export envelope primitives.
//!
//! Record exports hand CSV collaborators a header plus string rows. This
//! crate owns that envelope and enforces its single invariant: every row has
//! exactly as many cells as there are columns. The envelope is serialisable
//! so it can travel through the flat-JSON snapshot channel unchanged.

use serde::{Deserialize, Serialize};

/// Errors raised while building or deserialising a [`TabularDocument`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TabularError {
    /// A row's cell count does not match the column count.
    #[error("row has {actual} cells but the document has {expected} columns")]
    ColumnMismatch {
        /// Number of columns declared by the document header.
        expected: usize,
        /// Number of cells in the offending row.
        actual: usize,
    },
}

/// A rectangular export document: a header and zero or more string rows.
///
/// ## Invariants
/// - Every row has exactly `columns.len()` cells; [`TabularDocument::push_row`]
///   and deserialisation both enforce this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TabularDocumentDto", into = "TabularDocumentDto")]
pub struct TabularDocument {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TabularDocument {
    /// Create an empty document with the given column header.
    pub fn new<C, S>(columns: C) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a document from a header and pre-assembled rows.
    ///
    /// # Errors
    ///
    /// Returns [`TabularError::ColumnMismatch`] if any row's arity differs
    /// from the column count.
    pub fn from_rows<C, S>(columns: C, rows: Vec<Vec<String>>) -> Result<Self, TabularError>
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut document = Self::new(columns);
        for row in rows {
            document.push_row(row)?;
        }
        Ok(document)
    }

    /// Append a row.
    ///
    /// # Errors
    ///
    /// Returns [`TabularError::ColumnMismatch`] if the row's arity differs
    /// from the column count.
    pub fn push_row<R, S>(&mut self, row: R) -> Result<(), TabularError>
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells: Vec<String> = row.into_iter().map(Into::into).collect();
        if cells.len() != self.columns.len() {
            return Err(TabularError::ColumnMismatch {
                expected: self.columns.len(),
                actual: cells.len(),
            });
        }
        self.rows.push(cells);
        Ok(())
    }

    /// Column header, in export order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows, in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the document has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Wire shape used to re-validate the arity invariant on deserialisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TabularDocumentDto {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl From<TabularDocument> for TabularDocumentDto {
    fn from(value: TabularDocument) -> Self {
        let TabularDocument { columns, rows } = value;
        Self { columns, rows }
    }
}

impl TryFrom<TabularDocumentDto> for TabularDocument {
    type Error = TabularError;

    fn try_from(value: TabularDocumentDto) -> Result<Self, Self::Error> {
        let TabularDocumentDto { columns, rows } = value;
        Self::from_rows(columns, rows)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn push_row_accepts_matching_arity() {
        let mut document = TabularDocument::new(["name", "age"]);
        document
            .push_row(["Alice", "20"])
            .expect("matching arity should be accepted");

        assert_eq!(document.row_count(), 1);
        assert!(!document.is_empty());
    }

    #[rstest]
    #[case::too_few(vec!["Alice".to_owned()], 1)]
    #[case::too_many(vec!["Alice".to_owned(), "20".to_owned(), "extra".to_owned()], 3)]
    fn push_row_rejects_arity_mismatch(#[case] row: Vec<String>, #[case] actual: usize) {
        let mut document = TabularDocument::new(["name", "age"]);
        let error = document.push_row(row).expect_err("mismatch should fail");

        assert_eq!(
            error,
            TabularError::ColumnMismatch {
                expected: 2,
                actual,
            }
        );
        assert!(document.is_empty());
    }

    #[rstest]
    fn serde_round_trip_preserves_document() {
        let mut document = TabularDocument::new(["student_id", "course_id"]);
        document
            .push_row(["S1", "C1"])
            .expect("row should be accepted");

        let json = serde_json::to_string(&document).expect("document should serialise");
        let restored: TabularDocument =
            serde_json::from_str(&json).expect("document should deserialise");

        assert_eq!(restored, document);
    }

    #[rstest]
    fn deserialisation_rejects_ragged_rows() {
        let json = r#"{"columns":["a","b"],"rows":[["1"]]}"#;
        let result: Result<TabularDocument, _> = serde_json::from_str(json);

        assert!(result.is_err());
    }

    #[rstest]
    fn from_rows_preserves_order() {
        let rows = vec![
            vec!["S2".to_owned(), "C1".to_owned()],
            vec!["S1".to_owned(), "C2".to_owned()],
        ];
        let document = TabularDocument::from_rows(["student_id", "course_id"], rows)
            .expect("rows should be accepted");

        assert_eq!(document.rows().first().map(|row| row.join(",")), Some("S2,C1".to_owned()));
        assert_eq!(document.row_count(), 2);
    }
}
