use crate::Fingerprint;

/// Tanimoto (Jaccard) coefficient `|A ∩ B| / (|A| + |B| - |A ∩ B|)`.
///
/// Two empty fingerprints are identical and score `1.0`; an empty fingerprint against a
/// non-empty one scores `0.0`.
pub fn tanimoto(a: &Fingerprint, b: &Fingerprint) -> f32 {
	let shared = a.intersection_len(b);
	let union = a.len() + b.len() - shared;

	if union == 0 {
		return 1.0;
	}

	(shared as f64 / union as f64) as f32
}
