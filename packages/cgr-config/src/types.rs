use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub cache: Cache,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	#[serde(default = "default_http_bind")]
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
	/// Optional. Postgres schema holding the fingerprint and cache tables. Applied as the
	/// connection `search_path`, so every statement stays schema-agnostic.
	#[serde(default)]
	pub schema: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	/// Deduplicated result sizes at or above this value are cached instead of returned inline.
	#[serde(default = "default_deferred_threshold")]
	pub deferred_threshold: u32,
	/// Minimum Tanimoto score a `similar` candidate must reach to be kept. Ignored by
	/// `substructure`. Defaults to 0.6, the `smlar.threshold` default.
	#[serde(default = "default_similarity_threshold")]
	pub similarity_threshold: f32,
	#[serde(default = "default_store_timeout_ms")]
	pub store_timeout_ms: u64,
	#[serde(default = "default_cache_timeout_ms")]
	pub cache_timeout_ms: u64,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			deferred_threshold: default_deferred_threshold(),
			similarity_threshold: default_similarity_threshold(),
			store_timeout_ms: default_store_timeout_ms(),
			cache_timeout_ms: default_cache_timeout_ms(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cache {
	#[serde(default = "default_retention_seconds")]
	pub retention_seconds: i64,
	#[serde(default = "default_sweep_interval_seconds")]
	pub sweep_interval_seconds: u64,
}
impl Default for Cache {
	fn default() -> Self {
		Self {
			retention_seconds: default_retention_seconds(),
			sweep_interval_seconds: default_sweep_interval_seconds(),
		}
	}
}

fn default_http_bind() -> String {
	"127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_deferred_threshold() -> u32 {
	1_000
}

fn default_similarity_threshold() -> f32 {
	0.6
}

fn default_store_timeout_ms() -> u64 {
	30_000
}

fn default_cache_timeout_ms() -> u64 {
	10_000
}

fn default_retention_seconds() -> i64 {
	86_400
}

fn default_sweep_interval_seconds() -> u64 {
	86_400
}
