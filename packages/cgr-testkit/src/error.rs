pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("CGR_PG_DSN is not a valid Postgres DSN: {0}")]
	InvalidDsn(#[source] sqlx::Error),
	#[error("No maintenance database accepted a connection; last error: {0}")]
	AdminUnavailable(#[source] sqlx::Error),
	#[error("Failed to create test database {name}: {source}")]
	Create { name: String, source: sqlx::Error },
	#[error("Failed to drop test database {name}: {source}")]
	Drop { name: String, source: sqlx::Error },
}
