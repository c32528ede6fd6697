//! Deterministic enumeration of fixed-size item combinations.
//!
//! Builds are unordered selections of `build_size` distinct pool indices.
//! Enumeration is lexicographic over strictly ascending index tuples, and
//! restartable from any rank via combinatorial unranking, so interrupted
//! runs can resume without replaying the prefix.

/// Index-based combination used on the hot enumeration path. Each entry
/// is an index into the item pool held by the caller.
pub type IndexCombination = Vec<usize>;

/// Compute C(n, k): how many distinct builds of `build_size` items can
/// be drawn from a pool of `pool_size`.
///
/// Returns 0 when `build_size > pool_size` and 1 when `build_size == 0`.
/// Arithmetic is done in `u128`; C(619, 6) and far beyond stay exact.
pub fn combinations_count(pool_size: usize, build_size: usize) -> u128 {
    if build_size > pool_size {
        return 0;
    }
    if build_size == 0 {
        return 1;
    }
    // Symmetry keeps the loop short: C(n, k) = C(n, n - k).
    let k = build_size.min(pool_size - build_size);
    let mut numerator = 1u128;
    let mut denominator = 1u128;
    for i in 0..k {
        numerator *= (pool_size - i) as u128;
        denominator *= (i + 1) as u128;
    }
    numerator / denominator
}

/// Unrank a 0-based lexicographic rank into its strictly ascending index
/// tuple using the combinatorial number system.
///
/// Elements are fixed left to right: position `slot` takes the smallest
/// index whose suffix combinations still cover the remaining rank.
/// Returns an empty vector for invalid inputs (`build_size == 0`,
/// `build_size > pool_size`, or a rank past the end).
pub fn unrank_combination(rank: u128, pool_size: usize, build_size: usize) -> IndexCombination {
    if build_size == 0
        || build_size > pool_size
        || rank >= combinations_count(pool_size, build_size)
    {
        return Vec::new();
    }

    let mut indices = Vec::with_capacity(build_size);
    let mut remaining = rank;
    let mut candidate = 0usize;
    for slot in 0..build_size {
        let to_place = build_size - slot;
        loop {
            // Combinations available if `candidate` fills this slot.
            let tail = combinations_count(pool_size - candidate - 1, to_place - 1);
            if remaining < tail {
                break;
            }
            remaining -= tail;
            candidate += 1;
        }
        indices.push(candidate);
        candidate += 1;
    }
    indices
}

/// Rank of a sorted index tuple, the inverse of [`unrank_combination`].
pub fn rank_combination(combo: &[usize], pool_size: usize) -> u128 {
    let build_size = combo.len();
    if build_size == 0 || build_size > pool_size {
        return 0;
    }

    let mut rank = 0u128;
    let mut floor = 0usize;
    for (slot, &chosen) in combo.iter().enumerate() {
        let to_place = build_size - slot;
        for skipped in floor..chosen {
            rank += combinations_count(pool_size - skipped - 1, to_place - 1);
        }
        floor = chosen + 1;
    }
    rank
}

/// Lazy, finite, restartable enumeration of every `build_size`-index
/// combination of `{0 .. pool_size-1}` in lexicographic order.
///
/// Starts at `(0, 1, …, k-1)`; advancing increments the rightmost index
/// that has room and resets everything to its right to consecutive
/// successors. A pool smaller than the build size yields an empty
/// sequence.
pub struct SeekableCombinationIterator {
    pool_size: usize,
    build_size: usize,
    current: IndexCombination,
    exhausted: bool,
}

impl SeekableCombinationIterator {
    pub fn new(pool_size: usize, build_size: usize) -> Self {
        Self::starting_at(pool_size, build_size, 0)
    }

    /// Start enumeration at `start_rank` instead of the beginning.
    /// Seeking costs O(k · n) via unranking rather than replaying the
    /// whole prefix.
    pub fn starting_at(pool_size: usize, build_size: usize, start_rank: u128) -> Self {
        if build_size == 0 {
            // C(n, 0) = 1: a single empty build.
            return Self {
                pool_size,
                build_size,
                current: Vec::new(),
                exhausted: start_rank > 0,
            };
        }

        if build_size > pool_size {
            return Self {
                pool_size,
                build_size,
                current: Vec::new(),
                exhausted: true,
            };
        }

        let current = if start_rank == 0 {
            (0..build_size).collect()
        } else {
            unrank_combination(start_rank, pool_size, build_size)
        };
        let exhausted = current.is_empty();
        Self {
            pool_size,
            build_size,
            current,
            exhausted,
        }
    }

    fn advance(&mut self) {
        let k = self.build_size;
        for i in (0..k).rev() {
            let max_val = self.pool_size - (k - i);
            if self.current[i] < max_val {
                self.current[i] += 1;
                for j in (i + 1)..k {
                    self.current[j] = self.current[j - 1] + 1;
                }
                return;
            }
        }
        self.exhausted = true;
    }
}

impl Iterator for SeekableCombinationIterator {
    type Item = IndexCombination;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let combo = self.current.clone();
        if self.build_size == 0 {
            self.exhausted = true;
        } else {
            self.advance();
        }
        Some(combo)
    }
}

/// Accumulates combinations into fixed-capacity batches for the pipeline.
/// Concatenating every emitted batch reproduces the unbatched sequence
/// exactly; the final batch may be partial.
pub struct CombinationBatcher {
    iter: SeekableCombinationIterator,
}

impl CombinationBatcher {
    pub fn new(pool_size: usize, build_size: usize, start_rank: u64) -> Self {
        let iter =
            SeekableCombinationIterator::starting_at(pool_size, build_size, u128::from(start_rank));
        Self { iter }
    }

    pub fn next_batch(&mut self, batch_size: usize) -> Option<Vec<IndexCombination>> {
        let mut batch = Vec::with_capacity(batch_size);
        while batch.len() < batch_size {
            match self.iter.next() {
                Some(combo) => batch.push(combo),
                None => break,
            }
        }
        if batch.is_empty() { None } else { Some(batch) }
    }
}
