use std::collections::{HashMap, hash_map::Entry};

use crate::{ScoredCandidate, SearchHit, SearchResult};

/// Collapses candidates to the best entry per parent and orders the survivors.
///
/// Within a parent the highest score wins; equal scores keep the lowest `entry_id`. The output is
/// sorted by score descending, then `parent_id` ascending.
pub fn reduce<I>(candidates: I) -> SearchResult
where
	I: IntoIterator<Item = ScoredCandidate>,
{
	let mut best: HashMap<i32, ScoredCandidate> = HashMap::new();

	for candidate in candidates {
		match best.entry(candidate.parent_id) {
			Entry::Vacant(slot) => {
				slot.insert(candidate);
			},
			Entry::Occupied(mut slot) =>
				if outranks(&candidate, slot.get()) {
					slot.insert(candidate);
				},
		}
	}

	let mut hits: Vec<SearchHit> = best
		.into_values()
		.map(|candidate| SearchHit {
			parent_id: candidate.parent_id,
			entry_id: candidate.entry_id,
			score: candidate.score,
		})
		.collect();

	hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.parent_id.cmp(&b.parent_id)));

	SearchResult { hits }
}

fn outranks(candidate: &ScoredCandidate, current: &ScoredCandidate) -> bool {
	candidate
		.score
		.total_cmp(&current.score)
		.then(current.entry_id.cmp(&candidate.entry_id))
		.is_gt()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn candidate(entry_id: i32, parent_id: i32, score: f32) -> ScoredCandidate {
		ScoredCandidate { entry_id, parent_id, score }
	}

	#[test]
	fn keeps_best_entry_per_parent() {
		let result = reduce([
			candidate(1, 10, 0.4),
			candidate(2, 10, 0.9),
			candidate(3, 20, 0.5),
			candidate(4, 10, 0.7),
		]);

		assert_eq!(
			result.hits,
			vec![
				SearchHit { parent_id: 10, entry_id: 2, score: 0.9 },
				SearchHit { parent_id: 20, entry_id: 3, score: 0.5 },
			]
		);
	}

	#[test]
	fn equal_scores_keep_lowest_entry_id() {
		let forward = reduce([candidate(7, 10, 0.5), candidate(3, 10, 0.5), candidate(5, 10, 0.5)]);
		let backward =
			reduce([candidate(5, 10, 0.5), candidate(3, 10, 0.5), candidate(7, 10, 0.5)]);

		assert_eq!(forward.hits[0].entry_id, 3);
		assert_eq!(forward, backward);
	}

	#[test]
	fn equal_scores_across_parents_order_by_parent_id() {
		let result = reduce([candidate(1, 30, 0.5), candidate(2, 10, 0.5), candidate(3, 20, 0.8)]);
		let parents: Vec<i32> = result.hits.iter().map(|hit| hit.parent_id).collect();

		assert_eq!(parents, vec![20, 10, 30]);
	}

	#[test]
	fn empty_input_is_empty_result() {
		assert!(reduce(Vec::new()).is_empty());
	}
}
