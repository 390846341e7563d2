/// Outcome of the size check applied to a deduplicated result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
	Inline,
	Defer,
}
impl GateDecision {
	/// Results with `len >= threshold` are deferred to the cache.
	pub fn for_len(len: usize, threshold: u32) -> Self {
		if len >= threshold as usize { Self::Defer } else { Self::Inline }
	}
}
