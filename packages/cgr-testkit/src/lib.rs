//! Disposable Postgres databases and fixture builders for integration tests.

pub mod fixtures;

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

const DSN_ENV: &str = "CGR_PG_DSN";
const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

/// A freshly created database, dropped on [`TestDatabase::cleanup`] or, failing that, on drop.
pub struct TestDatabase {
	name: String,
	dsn: String,
	/// `None` once the database has been dropped.
	maintenance: Option<PgConnectOptions>,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn).map_err(Error::InvalidDsn)?;
		let (maintenance, mut conn) = open_maintenance(&base).await?;
		let name = format!("cgr_test_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
			.await
			.map_err(|source| Error::Create { name: name.clone(), source })?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance: Some(maintenance) })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Storage settings pointing at this database.
	pub fn postgres_config(&self, schema: Option<&str>) -> cgr_config::Postgres {
		cgr_config::Postgres {
			dsn: self.dsn.clone(),
			pool_max_conns: 2,
			schema: schema.map(str::to_string),
		}
	}

	pub async fn cleanup(mut self) -> Result<()> {
		match self.maintenance.take() {
			Some(maintenance) => drop_database(&self.name, &maintenance).await,
			None => Ok(()),
		}
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		let Some(maintenance) = self.maintenance.take() else {
			return;
		};
		let name = self.name.clone();
		// The owning runtime may be shutting down, so the drop runs on a private one.
		let handle = thread::spawn(move || {
			let outcome = Builder::new_current_thread()
				.enable_all()
				.build()
				.map_err(|err| err.to_string())
				.and_then(|runtime| {
					runtime
						.block_on(drop_database(&name, &maintenance))
						.map_err(|err| err.to_string())
				});

			if let Err(err) = outcome {
				eprintln!("Leaked test database {name}: {err}");
			}
		});

		let _ = handle.join();
	}
}

pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

async fn open_maintenance(base: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut last_err = None;

	for database in MAINTENANCE_DATABASES {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => last_err = Some(err),
		}
	}

	Err(Error::AdminUnavailable(last_err.unwrap_or(sqlx::Error::PoolClosed)))
}

async fn drop_database(name: &str, maintenance: &PgConnectOptions) -> Result<()> {
	let to_err = |source| Error::Drop { name: name.to_string(), source };
	let mut conn = PgConnection::connect_with(maintenance).await.map_err(to_err)?;

	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#).as_str())
		.await
		.map_err(to_err)?;

	Ok(())
}
