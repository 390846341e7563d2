use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown search operator {0:?}; expected similar or substructure.")]
pub struct ParseOperatorError(pub String);

/// Retrieval predicate applied by the fingerprint index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
	/// Candidate fingerprints share at least one feature with the query.
	Similar,
	/// Candidate fingerprints contain every feature of the query.
	Substructure,
}
impl Operator {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Similar => "similar",
			Self::Substructure => "substructure",
		}
	}
}
impl FromStr for Operator {
	type Err = ParseOperatorError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim() {
			"similar" => Ok(Self::Similar),
			"substructure" => Ok(Self::Substructure),
			_ => Err(ParseOperatorError(raw.to_string())),
		}
	}
}
impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Independent fingerprint collections. Each has its own index and result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
	/// Entries are molecule structures, parents are molecules.
	Molecules,
	/// Entries are reaction indexes, parents are reactions.
	Reactions,
}
impl Collection {
	pub const ALL: [Self; 2] = [Self::Molecules, Self::Reactions];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Molecules => "molecules",
			Self::Reactions => "reactions",
		}
	}
}
impl fmt::Display for Collection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
