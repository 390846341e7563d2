#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Conflict: {0}")]
	Conflict(String),
	#[error("Corrupt row: {0}")]
	Corrupt(String),
}
impl Error {
	pub(crate) fn from_write(err: sqlx::Error, what: impl FnOnce() -> String) -> Self {
		let unique = err.as_database_error().map(|db_err| db_err.is_unique_violation());

		if unique.unwrap_or(false) { Self::Conflict(what()) } else { Self::Sqlx(err) }
	}
}
