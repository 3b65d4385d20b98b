//! Writeback operations: the unit of work handed to the sink.

use std::fmt;

use crate::db::DbValue;

/// Marker replaced by the sink with one placeholder tuple per row,
/// e.g. `($1, $2, $3), ($4, $5, $6)`.
pub const VALUES_MARKER: &str = "{values}";

/// A row that can be written back to the database.
///
/// Every implementation renders a fixed number of bound parameters in a
/// fixed, type-specific order; `field_count()` must always equal
/// `params().len()`.
pub trait DatabaseRow: fmt::Debug + Send + Sync {
    /// Stamp the row with the chain it was observed on.
    fn with_chain_name(&mut self, chain_name: &str);

    /// Bound parameters in the column order of the row's statement.
    fn params(&self) -> Vec<DbValue>;

    /// Number of bound parameters a single row contributes.
    fn field_count(&self) -> usize;
}

/// A statement template plus the ordered rows to execute it with.
#[derive(Debug, Default)]
pub struct WritebackOp {
    /// SQL template containing [`VALUES_MARKER`].
    pub statement: String,
    pub rows: Vec<Box<dyn DatabaseRow>>,
}

impl WritebackOp {
    pub fn new(statement: impl Into<String>, rows: Vec<Box<dyn DatabaseRow>>) -> Self {
        Self {
            statement: statement.into(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Bound parameters per row, or `None` when there are no rows.
    pub fn field_count(&self) -> Option<usize> {
        self.rows.first().map(|row| row.field_count())
    }

    /// Stamp every row with `chain_name`.
    pub fn with_chain_name(mut self, chain_name: &str) -> Self {
        for row in self.rows.iter_mut() {
            row.with_chain_name(chain_name);
        }
        self
    }

    /// Split into statements carrying at most `limit` bound parameters each.
    ///
    /// When `limit` is an exact multiple of the row arity, rows are grouped
    /// `limit / arity` at a time. Otherwise every row gets its own statement.
    /// Row order is preserved across and within the returned ops.
    ///
    /// # Panics
    ///
    /// Panics if a single row needs more than `limit` bound parameters.
    pub fn split_statements(self, limit: usize) -> Vec<WritebackOp> {
        let Some(fields) = self.field_count() else {
            return Vec::new();
        };

        assert!(fields > 0, "row type renders no bound parameters");
        assert!(
            fields <= limit,
            "a single row needs {} bound parameters but the limit is {}",
            fields,
            limit
        );

        let rows_per_statement = if limit % fields == 0 {
            limit / fields
        } else {
            1
        };

        let statement = self.statement;
        let mut ops = Vec::with_capacity(self.rows.len().div_ceil(rows_per_statement));
        let mut rows = self.rows.into_iter().peekable();

        while rows.peek().is_some() {
            let chunk: Vec<Box<dyn DatabaseRow>> =
                rows.by_ref().take(rows_per_statement).collect();
            ops.push(WritebackOp {
                statement: statement.clone(),
                rows: chunk,
            });
        }

        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct AccountRow {
        chain_name: String,
        address: String,
        sequence_number: u64,
        account_number: u64,
    }

    impl AccountRow {
        fn boxed(address: &str, sequence_number: u64) -> Box<dyn DatabaseRow> {
            Box::new(AccountRow {
                chain_name: "chain".to_string(),
                address: address.to_string(),
                sequence_number,
                account_number: 1,
            })
        }
    }

    impl DatabaseRow for AccountRow {
        fn with_chain_name(&mut self, chain_name: &str) {
            self.chain_name = chain_name.to_string();
        }

        fn params(&self) -> Vec<DbValue> {
            vec![
                DbValue::Text(self.chain_name.clone()),
                DbValue::Text(self.address.clone()),
                DbValue::Uint64(self.sequence_number),
                DbValue::Uint64(self.account_number),
            ]
        }

        fn field_count(&self) -> usize {
            4
        }
    }

    fn four_rows(statement: &str) -> WritebackOp {
        WritebackOp::new(
            statement,
            (0..4).map(|i| AccountRow::boxed(&format!("address{}", i), i)).collect(),
        )
    }

    fn addresses(ops: &[WritebackOp]) -> Vec<DbValue> {
        ops.iter()
            .flat_map(|op| op.rows.iter().map(|row| row.params()[1].clone()))
            .collect()
    }

    #[test]
    fn test_limit_not_multiple_of_arity_splits_one_row_each() {
        let ops = four_rows("").split_statements(15);

        assert_eq!(ops.len(), 4);
        assert!(ops.iter().all(|op| op.len() == 1));
    }

    #[test]
    fn test_limit_equal_to_arity_splits_one_row_each() {
        let ops = four_rows("statement").split_statements(4);

        assert_eq!(ops.len(), 4);
        assert!(ops.iter().all(|op| op.statement == "statement"));
    }

    #[test]
    fn test_large_limit_keeps_single_statement() {
        let ops = four_rows("statement").split_statements(40);

        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].len(), 4);
    }

    #[test]
    fn test_exact_multiple_groups_rows_and_keeps_order() {
        let ops = four_rows("statement").split_statements(12);

        assert_eq!(ops.iter().map(WritebackOp::len).collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(
            addresses(&ops),
            (0..4)
                .map(|i| DbValue::Text(format!("address{}", i)))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_fallback_keeps_order() {
        let ops = four_rows("statement").split_statements(7);

        assert_eq!(ops.len(), 4);
        assert_eq!(
            addresses(&ops),
            (0..4)
                .map(|i| DbValue::Text(format!("address{}", i)))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_empty_op_splits_into_nothing() {
        let ops = WritebackOp::default().split_statements(10);
        assert!(ops.is_empty());
    }

    #[test]
    #[should_panic(expected = "a single row needs 4 bound parameters but the limit is 3")]
    fn test_row_wider_than_limit_panics() {
        four_rows("statement").split_statements(3);
    }

    #[test]
    fn test_with_chain_name_stamps_every_row() {
        let op = four_rows("statement").with_chain_name("cosmos-hub");

        assert!(op
            .rows
            .iter()
            .all(|row| row.params()[0] == DbValue::Text("cosmos-hub".to_string())));
        assert_eq!(op.len(), 4);
    }
}
