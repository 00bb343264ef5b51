//! Parallel root-move evaluation.
//!
//! Every root move is evaluated on its own fork of the board by a worker of
//! a `rayon` pool. The request thread keeps exactly `threads` evaluations in
//! flight: each finished result is collected from a `crossbeam` channel,
//! reported as progress, and replaced by the next pending move. Workers
//! never share mutable state; the only thing they have in common is the
//! cancellation flag.

use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crossbeam_channel::unbounded;
use tracing::{debug, info};

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::moves::chess_move::Move;
use crate::search::evaluation::{sort_best_first, EvaluatedMove, Evaluation};
use crate::search::minimax::evaluate_move_in_place;
use crate::search::pruner::SearchTreePruner;

/// Shared cooperative stop flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once the token has been cancelled.
    #[inline]
    pub fn check(&self) -> ChessResult<()> {
        if self.is_cancelled() {
            Err(ChessError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProgress {
    pub completed: usize,
    pub total: usize,
}

/// Number of hardware threads, at least one.
pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

pub struct SearchPool {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl std::fmt::Debug for SearchPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPool")
            .field("threads", &self.threads)
            .finish()
    }
}

impl SearchPool {
    pub fn new(threads: usize) -> ChessResult<Self> {
        let threads = threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("damson-search-{index}"))
            .build()
            .map_err(|err| ChessError::Internal(format!("cannot start search pool: {err}")))?;
        info!(threads, "search pool ready");
        Ok(Self { pool, threads })
    }

    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Evaluates every move in `moves` (all legal in `board`) and returns
    /// them best first. `on_progress` runs on the calling thread after each
    /// finished evaluation.
    ///
    /// The first failing evaluation stops new submissions; evaluations
    /// already running are drained and its error is returned.
    pub fn evaluate_root_moves<F>(
        &self,
        board: &Board,
        moves: &[Move],
        pruner: &SearchTreePruner,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> ChessResult<Vec<EvaluatedMove>>
    where
        F: FnMut(SearchProgress),
    {
        let total = moves.len();
        let mut results = Vec::with_capacity(total);
        if total == 0 {
            return Ok(results);
        }

        let (sender, receiver) = unbounded::<(Move, ChessResult<Evaluation>)>();
        let pruner = Arc::new(pruner.clone());
        let submit = |mv: Move| {
            let mut fork = board.fork();
            let pruner = Arc::clone(&pruner);
            let cancel = cancel.clone();
            let sender = sender.clone();
            self.pool.spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    evaluate_move_in_place(&mut fork, mv, &pruner, &cancel)
                }))
                .unwrap_or_else(|payload| Err(ChessError::Internal(panic_message(payload.as_ref()))));
                // The receiver only goes away once the request gave up.
                let _ = sender.send((mv, outcome));
            });
        };

        let mut pending = moves.iter().copied();
        let mut in_flight = 0usize;
        for mv in pending.by_ref().take(self.threads) {
            submit(mv);
            in_flight += 1;
        }

        let mut completed = 0usize;
        let mut first_error: Option<ChessError> = None;
        while in_flight > 0 {
            let (mv, outcome) = receiver
                .recv()
                .map_err(|_| ChessError::Internal("search workers disconnected".to_owned()))?;
            in_flight -= 1;
            completed += 1;

            match outcome {
                Ok(evaluation) => {
                    debug!(%mv, %evaluation, completed, total, "root move evaluated");
                    results.push(EvaluatedMove { mv, evaluation });
                }
                Err(err) => {
                    debug!(%mv, error = %err, "root move evaluation failed");
                    first_error.get_or_insert(err);
                }
            }
            on_progress(SearchProgress { completed, total });

            if first_error.is_none() {
                if let Some(next) = pending.next() {
                    submit(next);
                    in_flight += 1;
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }
        sort_best_first(&mut results);
        Ok(results)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        format!("search worker panicked: {text}")
    } else if let Some(text) = payload.downcast_ref::<String>() {
        format!("search worker panicked: {text}")
    } else {
        "search worker panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::StartConfig;
    use crate::search::minimax::evaluate_move;
    use crate::search::pruner::Difficulty;

    fn quick() -> SearchTreePruner {
        SearchTreePruner::new(vec![usize::MAX], 1, 4)
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(token.check().is_ok());
        clone.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(ChessError::Cancelled));
    }

    #[test]
    fn pool_matches_sequential_evaluation() {
        let board = Board::replay(&StartConfig::Classic, &["e2-e4", "e7-e5", "g1-f3"]).expect("replay");
        let moves = board.legal_moves();
        let pruner = quick();
        let cancel = CancelToken::new();
        let pool = SearchPool::new(3).expect("pool");

        let mut progress = Vec::new();
        let parallel = pool
            .evaluate_root_moves(&board, &moves, &pruner, &cancel, |p| progress.push(p))
            .expect("parallel evaluation");

        assert_eq!(parallel.len(), moves.len());
        assert!(parallel
            .windows(2)
            .all(|pair| pair[0].evaluation >= pair[1].evaluation));
        for evaluated in &parallel {
            let sequential = evaluate_move(&board, evaluated.mv, &pruner, &cancel).expect("sequential");
            assert_eq!(sequential, evaluated.evaluation, "{}", evaluated.mv);
        }

        assert_eq!(progress.len(), moves.len());
        assert_eq!(progress.last().map(|p| p.completed), Some(moves.len()));
        assert!(progress.iter().all(|p| p.total == moves.len()));
    }

    #[test]
    fn pool_leaves_the_board_untouched() {
        let board = Board::new(&StartConfig::Classic).expect("classic board");
        let before = board.to_string();
        let pool = SearchPool::new(2).expect("pool");
        pool.evaluate_root_moves(
            &board,
            &board.legal_moves(),
            &quick(),
            &CancelToken::new(),
            |_| {},
        )
        .expect("evaluation");
        assert_eq!(board.to_string(), before);
    }

    #[test]
    fn cancelled_search_reports_cancellation() {
        let board = Board::new(&StartConfig::Classic).expect("classic board");
        let cancel = CancelToken::new();
        cancel.cancel();
        let pool = SearchPool::new(2).expect("pool");
        let outcome = pool.evaluate_root_moves(
            &board,
            &board.legal_moves(),
            &Difficulty::Expert.pruner(),
            &cancel,
            |_| {},
        );
        assert_eq!(outcome, Err(ChessError::Cancelled));
    }

    #[test]
    fn no_moves_no_work() {
        let board = Board::new(&StartConfig::Classic).expect("classic board");
        let pool = SearchPool::new(1).expect("pool");
        let results = pool
            .evaluate_root_moves(&board, &[], &quick(), &CancelToken::new(), |_| {
                panic!("no progress expected")
            })
            .expect("empty evaluation");
        assert!(results.is_empty());
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "search worker panicked: boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "search worker panicked: bang");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "search worker panicked");
    }
}
