use deadpool_postgres::Pool;

use super::error::DbError;

/// Run the module table schemas in order, in one transaction.
///
/// Every schema is a `CREATE TABLE IF NOT EXISTS` statement, so running them
/// again on restart is harmless.
pub async fn run(pool: &Pool, schemas: &[String]) -> Result<(), DbError> {
    if schemas.is_empty() {
        tracing::info!("No table schemas to apply");
        return Ok(());
    }

    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    for (i, schema) in schemas.iter().enumerate() {
        tx.batch_execute(schema).await.map_err(|e| {
            DbError::MigrationError(format!(
                "Failed to apply schema {}: {}\n  SQL: {}",
                i, e, schema
            ))
        })?;
    }

    tx.commit().await?;

    tracing::info!("Applied {} table schemas", schemas.len());
    Ok(())
}
