use std::borrow::Borrow;
use std::collections::HashSet;

use rand::Rng;
use tracing::debug;

use crate::question::Question;

/// Random draws spent looking for an unseen question before settling for
/// any index other than the current one.
pub const MAX_UNSEEN_TRIES: usize = 50;

/// Uniform index in `0..len` different from `current`. With `current` of
/// `None` any index is acceptable. Returns `current` (or 0) when there is
/// nothing else to pick.
pub fn random_next_index<R: Rng + ?Sized>(
    len: usize,
    current: Option<usize>,
    rng: &mut R,
) -> usize {
    let fallback = current.unwrap_or(0);
    match current {
        None if len > 0 => rng.gen_range(0..len),
        Some(cur) if len > 1 => {
            // Draw from the other len-1 slots and shift past `cur`.
            let idx = rng.gen_range(0..len - 1);
            if idx >= cur { idx + 1 } else { idx }
        }
        _ => fallback,
    }
}

/// Next practice index, preferring questions whose id is not in `seen`.
///
/// Bounded: after [`MAX_UNSEEN_TRIES`] misses it falls back to any index
/// other than `current`, which may repeat a seen question.
pub fn pick_random_unseen_index<Q, R>(
    pool: &[Q],
    current: usize,
    seen: &HashSet<u64>,
    rng: &mut R,
) -> usize
where
    Q: Borrow<Question>,
    R: Rng + ?Sized,
{
    let n = pool.len();
    if n <= 1 {
        return current;
    }

    for _ in 0..MAX_UNSEEN_TRIES {
        let idx = rng.gen_range(0..n);
        if idx == current {
            continue;
        }
        let question: &Question = pool[idx].borrow();
        if !seen.contains(&question.id) {
            return idx;
        }
    }

    debug!(pool = n, seen = seen.len(), "no unseen question found, falling back");
    random_next_index(n, Some(current), rng)
}
