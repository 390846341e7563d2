use std::fmt::{self, Write as _};

use cgr_domain::Collection;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid fingerprint in {context}: {message}")]
	InvalidFingerprint { context: QueryContext, message: String },
	#[error("Unknown operator in {context}; expected similar or substructure.")]
	UnknownOperator { context: QueryContext },
	#[error("Fingerprint store unavailable for {context}: {message}")]
	StoreUnavailable { context: QueryContext, message: String },
	#[error("A live cached result set already exists for {context}.")]
	CacheWriteConflict { context: QueryContext },
	#[error("Failed to cache result set for {context}: {message}")]
	CacheWriteFailure { context: QueryContext, message: String },
	#[error("Failed to read cached result set for {context}: {message}")]
	CacheReadFailure { context: QueryContext, message: String },
	#[error("Failed to sweep the {collection} result cache: {message}")]
	SweepFailure { collection: Collection, message: String },
	#[error("{stage} timed out after {timeout_ms} ms{}.", for_context(.context))]
	Timeout { stage: Stage, timeout_ms: u64, context: Option<QueryContext> },
}
impl Error {
	pub fn context(&self) -> Option<&QueryContext> {
		match self {
			Self::InvalidFingerprint { context, .. }
			| Self::UnknownOperator { context }
			| Self::StoreUnavailable { context, .. }
			| Self::CacheWriteConflict { context }
			| Self::CacheWriteFailure { context, .. }
			| Self::CacheReadFailure { context, .. } => Some(context),
			Self::Timeout { context, .. } => context.as_ref(),
			Self::SweepFailure { .. } => None,
		}
	}
}

/// Identifies the query an error belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
	pub collection: Collection,
	/// Operator as supplied by the caller, which may be unparseable.
	pub operator: Option<String>,
	/// Lowercase hex of the caller's signature.
	pub signature: String,
}
impl QueryContext {
	pub fn new(collection: Collection, signature: &[u8]) -> Self {
		Self { collection, operator: None, signature: signature_hex(signature) }
	}

	pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
		self.operator = Some(operator.into());

		self
	}
}
impl fmt::Display for QueryContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} query with signature {:?}", self.collection, self.signature)?;

		if let Some(operator) = self.operator.as_deref() {
			write!(f, " and operator {operator:?}")?;
		}

		Ok(())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	FetchCandidates,
	CachePut,
	CacheGet,
	Sweep(Collection),
}
impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::FetchCandidates => f.write_str("Candidate retrieval"),
			Self::CachePut => f.write_str("Cache write"),
			Self::CacheGet => f.write_str("Cache read"),
			Self::Sweep(collection) => write!(f, "Sweep of the {collection} result cache"),
		}
	}
}

fn for_context(context: &Option<QueryContext>) -> String {
	context.as_ref().map(|context| format!(" for {context}")).unwrap_or_default()
}

pub(crate) fn signature_hex(signature: &[u8]) -> String {
	let mut out = String::with_capacity(signature.len() * 2);

	for byte in signature {
		let _ = write!(out, "{byte:02x}");
	}

	out
}
