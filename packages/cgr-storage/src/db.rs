use std::str::FromStr;

use sqlx::{
	PgPool,
	postgres::{PgConnectOptions, PgPoolOptions},
};

use crate::{Error, Result, schema};

const SCHEMA_LOCK_ID: i64 = 4_170_301;

#[derive(Clone)]
pub struct Db {
	pub pool: PgPool,
	schema: Option<String>,
}
impl Db {
	pub async fn connect(cfg: &cgr_config::Postgres) -> Result<Self> {
		let mut options = PgConnectOptions::from_str(&cfg.dsn)?;

		if let Some(schema) = cfg.schema.as_deref() {
			if !cgr_config::is_plain_identifier(schema) {
				return Err(Error::InvalidArgument(format!(
					"Schema name {schema:?} is not a plain identifier."
				)));
			}

			options = options.options([("search_path", schema)]);
		}

		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect_with(options).await?;

		Ok(Self { pool, schema: cfg.schema.clone() })
	}

	pub fn schema(&self) -> Option<&str> {
		self.schema.as_deref()
	}

	/// Creates the fingerprint and cache tables if they are missing.
	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and automatically released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)")
			.bind(SCHEMA_LOCK_ID)
			.execute(&mut *tx)
			.await?;

		if let Some(schema) = self.schema.as_deref() {
			// Validated in `connect`; identifiers cannot be bound as parameters.
			let create = format!(r#"CREATE SCHEMA IF NOT EXISTS "{schema}""#);

			sqlx::query(&create).execute(&mut *tx).await?;
		}

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		tracing::debug!(schema = self.schema.as_deref().unwrap_or("public"), "Schema ensured.");

		Ok(())
	}
}
