//! Probabilistic choice among near-best moves.
//!
//! Always playing the top move makes the engine predictable. Candidates
//! within `acceptable_distance` pawns of the best are kept and weighted by
//! `((t - d) / t)^1.8`, so the best move stays the most likely pick.

use rand::Rng;

use crate::search::evaluation::EvaluatedMove;

const WEIGHT_EXPONENT: f64 = 1.8;

/// Picks a move from `sorted` (best first). Returns `None` only for an
/// empty list. A mating or mated best move is returned outright, as is the
/// best move when `acceptable_distance` is not positive.
pub fn select_move<R: Rng + ?Sized>(
    sorted: &[EvaluatedMove],
    acceptable_distance: f64,
    rng: &mut R,
) -> Option<EvaluatedMove> {
    let best = *sorted.first()?;
    let Some(best_score) = best.evaluation.as_numeric() else {
        return Some(best);
    };
    if acceptable_distance <= 0.0 {
        return Some(best);
    }

    let weighted: Vec<(EvaluatedMove, f64)> = sorted
        .iter()
        .filter_map(|candidate| {
            let distance = best_score - candidate.evaluation.as_numeric()?;
            (distance < acceptable_distance).then(|| {
                let share = (acceptable_distance - distance) / acceptable_distance;
                (*candidate, share.powf(WEIGHT_EXPONENT))
            })
        })
        .collect();

    let total: f64 = weighted.iter().map(|(_, weight)| weight).sum();
    if total <= 0.0 {
        return Some(best);
    }

    let draw = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for (candidate, weight) in &weighted {
        cumulative += weight;
        if draw < cumulative {
            return Some(*candidate);
        }
    }
    weighted.last().map(|(candidate, _)| *candidate).or(Some(best))
}
