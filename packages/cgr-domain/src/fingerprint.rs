use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FingerprintError {
	#[error("Feature id {0} is negative.")]
	NegativeFeature(i32),
	#[error("Fingerprint has no features.")]
	Empty,
}

/// Sparse set of feature ids, kept sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub struct Fingerprint {
	features: Vec<i32>,
}
impl Fingerprint {
	/// Builds a fingerprint from feature ids in any order. Duplicates collapse.
	pub fn new<I>(features: I) -> Result<Self, FingerprintError>
	where
		I: IntoIterator<Item = i32>,
	{
		let mut features: Vec<i32> = features.into_iter().collect();

		if let Some(negative) = features.iter().copied().find(|feature| *feature < 0) {
			return Err(FingerprintError::NegativeFeature(negative));
		}

		features.sort_unstable();
		features.dedup();

		Ok(Self { features })
	}

	/// Same as [`Fingerprint::new`], but also rejects an empty set. Queries go through here.
	pub fn query<I>(features: I) -> Result<Self, FingerprintError>
	where
		I: IntoIterator<Item = i32>,
	{
		let fingerprint = Self::new(features)?;

		if fingerprint.is_empty() {
			return Err(FingerprintError::Empty);
		}

		Ok(fingerprint)
	}

	pub fn len(&self) -> usize {
		self.features.len()
	}

	pub fn is_empty(&self) -> bool {
		self.features.is_empty()
	}

	pub fn as_slice(&self) -> &[i32] {
		&self.features
	}

	pub fn into_vec(self) -> Vec<i32> {
		self.features
	}

	pub fn intersection_len(&self, other: &Self) -> usize {
		let (mut left, mut right) = (self.features.iter(), other.features.iter());
		let (mut a, mut b) = (left.next(), right.next());
		let mut shared = 0;

		while let (Some(x), Some(y)) = (a, b) {
			match x.cmp(y) {
				Ordering::Less => a = left.next(),
				Ordering::Greater => b = right.next(),
				Ordering::Equal => {
					shared += 1;
					a = left.next();
					b = right.next();
				},
			}
		}

		shared
	}

	pub fn overlaps(&self, other: &Self) -> bool {
		self.intersection_len(other) > 0
	}

	/// Containment test used by substructure retrieval: every feature of `other` is present here.
	pub fn contains(&self, other: &Self) -> bool {
		other.len() <= self.len() && self.intersection_len(other) == other.len()
	}
}
impl TryFrom<Vec<i32>> for Fingerprint {
	type Error = FingerprintError;

	fn try_from(features: Vec<i32>) -> Result<Self, Self::Error> {
		Self::new(features)
	}
}
impl From<Fingerprint> for Vec<i32> {
	fn from(fingerprint: Fingerprint) -> Self {
		fingerprint.features
	}
}
