use async_trait::async_trait;
use bytes::BytesMut;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::types::ToSql;
use tokio_postgres::NoTls;

use super::error::DbError;
use super::types::DbValue;
use crate::writeback::{Sink, WritebackOp, VALUES_MARKER};

pub struct DbPool {
    pool: Pool,
}

impl DbPool {
    pub async fn new(database_url: &str, pool_size: usize) -> Result<Self, DbError> {
        let config = database_url
            .parse::<tokio_postgres::Config>()
            .map_err(|e| DbError::InvalidConnectionString(e.to_string()))?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = Manager::from_config(config, NoTls, manager_config);

        let pool = Pool::builder(manager)
            .max_size(pool_size)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(DbError::BuildError)?;

        let _conn = pool.get().await?;
        tracing::info!("Database connection pool created successfully");

        Ok(Self { pool })
    }

    /// Create the tables described by `schemas`, in order.
    pub async fn run_migrations(&self, schemas: &[String]) -> Result<(), DbError> {
        super::migrations::run(&self.pool, schemas).await
    }
}

#[async_trait]
impl Sink for DbPool {
    /// Execute every op of one writeback batch inside a single transaction.
    async fn write(&self, ops: Vec<WritebackOp>) -> Result<(), DbError> {
        if ops.iter().all(|op| op.is_empty()) {
            return Ok(());
        }

        let mut client = self.pool.get().await?;
        let transaction = client.transaction().await?;

        for op in ops.iter().filter(|op| !op.is_empty()) {
            let (sql, params) = build_writeback_sql(op)?;

            let params_refs: Vec<&(dyn ToSql + Sync)> =
                params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

            if let Err(e) = transaction.execute(&sql, &params_refs[..]).await {
                let db_err: DbError = e.into();
                tracing::error!(
                    "SQL execution failed\n  SQL: {}\n  Rows: {}\n  Error: {}",
                    op.statement,
                    op.len(),
                    db_err
                );
                return Err(db_err);
            }
        }

        transaction.commit().await?;
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
enum SqlParam {
    Null,
    Bool(bool),
    Int64(i64),
    Text(String),
    TextArray(Vec<String>),
}

impl ToSql for SqlParam {
    fn to_sql(
        &self,
        ty: &tokio_postgres::types::Type,
        out: &mut BytesMut,
    ) -> Result<tokio_postgres::types::IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            SqlParam::Null => Ok(tokio_postgres::types::IsNull::Yes),
            SqlParam::Bool(v) => v.to_sql(ty, out),
            SqlParam::Int64(v) => v.to_sql(ty, out),
            SqlParam::Text(v) => v.to_sql(ty, out),
            SqlParam::TextArray(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(ty: &tokio_postgres::types::Type) -> bool {
        <bool as ToSql>::accepts(ty)
            || <i64 as ToSql>::accepts(ty)
            || <String as ToSql>::accepts(ty)
            || <Vec<String> as ToSql>::accepts(ty)
    }

    tokio_postgres::types::to_sql_checked!();
}

fn convert_db_value(value: DbValue) -> Result<SqlParam, DbError> {
    Ok(match value {
        DbValue::Null => SqlParam::Null,
        DbValue::Bool(v) => SqlParam::Bool(v),
        DbValue::Uint64(v) => {
            SqlParam::Int64(i64::try_from(v).map_err(|_| DbError::IntegerOverflow(v))?)
        }
        DbValue::Text(v) => SqlParam::Text(v),
        DbValue::TextArray(v) => SqlParam::TextArray(v),
    })
}

/// Render the `{values}` marker of `op.statement` as one placeholder tuple
/// per row, numbering parameters from `$1`, and collect the parameters.
fn build_writeback_sql(op: &WritebackOp) -> Result<(String, Vec<SqlParam>), DbError> {
    if op.statement.is_empty() {
        return Err(DbError::EmptyStatement { rows: op.len() });
    }
    if !op.statement.contains(VALUES_MARKER) {
        return Err(DbError::MissingValuesMarker(op.statement.clone()));
    }

    let mut params = Vec::with_capacity(op.len() * op.field_count().unwrap_or(0));
    let mut tuples = Vec::with_capacity(op.len());

    for row in &op.rows {
        let mut placeholders = Vec::with_capacity(row.field_count());
        for value in row.params() {
            params.push(convert_db_value(value)?);
            placeholders.push(format!("${}", params.len()));
        }
        tuples.push(format!("({})", placeholders.join(", ")));
    }

    let sql = op.statement.replacen(VALUES_MARKER, &tuples.join(", "), 1);
    Ok((sql, params))
}
