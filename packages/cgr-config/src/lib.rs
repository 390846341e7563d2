mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Cache, Config, Postgres, Search, Service, Storage};

use std::{fs, path::Path};

const MAX_IDENTIFIER_LEN: usize = 63;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	if let Some(schema) = cfg.storage.postgres.schema.as_deref()
		&& !is_plain_identifier(schema)
	{
		return Err(Error::Validation {
			message: "storage.postgres.schema must match [A-Za-z_][A-Za-z0-9_]* and be at most 63 characters."
				.to_string(),
		});
	}

	if cfg.search.deferred_threshold == 0 {
		return Err(Error::Validation {
			message: "search.deferred_threshold must be greater than zero.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.search.similarity_threshold) {
		return Err(Error::Validation {
			message: "search.similarity_threshold must be between 0.0 and 1.0.".to_string(),
		});
	}
	if cfg.search.store_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.store_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.search.cache_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.cache_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.retention_seconds <= 0 {
		return Err(Error::Validation {
			message: "cache.retention_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.sweep_interval_seconds == 0 {
		return Err(Error::Validation {
			message: "cache.sweep_interval_seconds must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

/// True for identifiers that can be used unquoted in Postgres without case folding surprises.
pub fn is_plain_identifier(value: &str) -> bool {
	let mut chars = value.chars();
	let Some(first) = chars.next() else {
		return false;
	};

	if value.len() > MAX_IDENTIFIER_LEN {
		return false;
	}
	if !(first.is_ascii_alphabetic() || first == '_') {
		return false;
	}

	chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.postgres.schema.as_deref().map(|schema| schema.trim().is_empty()).unwrap_or(false)
	{
		cfg.storage.postgres.schema = None;
	}
	if let Some(schema) = cfg.storage.postgres.schema.as_mut() {
		*schema = schema.trim().to_string();
	}

	cfg.service.log_level = cfg.service.log_level.trim().to_string();
}
