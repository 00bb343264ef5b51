//! Engine entry points.
//!
//! A request names a start configuration and the move codes played so far.
//! The engine replays them (every code is re-validated), consults the
//! opening book for classic games, and otherwise evaluates all legal moves
//! on the search pool and picks one of the near-best ones.
//!
//! Settings and the pool sit behind a lock so options can change while
//! background requests run. Each request takes a snapshot when it starts and
//! keeps its pool alive until it finishes.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::engines::engine_config::{EngineConfig, CORES_OPTION};
use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_rules::StartConfig;
use crate::search::evaluation::EvaluatedMove;
use crate::search::minimax::evaluate_move;
use crate::search::move_selection::select_move;
use crate::search::threading::{CancelToken, SearchPool, SearchProgress};
use crate::tables::opening_book::OpeningBook;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    Book,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineMove {
    pub evaluated: EvaluatedMove,
    pub source: MoveSource,
}

impl std::fmt::Display for EngineMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.source {
            MoveSource::Book => write!(f, "{} [book]", self.evaluated),
            MoveSource::Search => write!(f, "{}", self.evaluated),
        }
    }
}

/// Settings plus the pool built for them.
#[derive(Clone)]
struct EngineState {
    config: EngineConfig,
    pool: Arc<SearchPool>,
}

pub struct ChessEngine {
    state: RwLock<EngineState>,
    book: Arc<OpeningBook>,
    rng: Mutex<StdRng>,
}

impl ChessEngine {
    /// Engine with the bundled opening book (when enabled in `config`).
    pub fn new(config: EngineConfig) -> ChessResult<Self> {
        let book = if config.book_enabled {
            OpeningBook::load_default()
        } else {
            OpeningBook::default()
        };
        Self::with_book(config, book)
    }

    pub fn with_book(config: EngineConfig, book: OpeningBook) -> ChessResult<Self> {
        let pool = Arc::new(SearchPool::new(config.cores)?);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        info!(
            cores = config.cores,
            difficulty = %config.difficulty,
            book_lines = book.line_count(),
            "engine ready"
        );
        Ok(Self {
            state: RwLock::new(EngineState { config, pool }),
            book: Arc::new(book),
            rng: Mutex::new(rng),
        })
    }

    /// Current settings.
    pub fn config(&self) -> ChessResult<EngineConfig> {
        Ok(self.snapshot()?.config)
    }

    pub fn threads(&self) -> ChessResult<usize> {
        Ok(self.snapshot()?.pool.threads())
    }

    /// Sets `"core#"` or `"Difficulty"`. A new core count starts a new
    /// pool; requests already running keep the old one until they finish.
    pub fn set_option(&self, name: &str, value: &str) -> ChessResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| ChessError::Internal("engine settings poisoned".to_owned()))?;
        let mut next = state.config.clone();
        next.apply_option(name, value)?;
        if name.eq_ignore_ascii_case(CORES_OPTION) && next.cores != state.pool.threads() {
            info!(from = state.pool.threads(), to = next.cores, "reconfiguring search pool");
            state.pool = Arc::new(SearchPool::new(next.cores)?);
        }
        state.config = next;
        Ok(())
    }

    /// All legal moves after `codes`, best first.
    pub fn evaluate_moves_best_move_first<S: AsRef<str>>(
        &self,
        codes: &[S],
        start: &StartConfig,
    ) -> ChessResult<Vec<EvaluatedMove>> {
        self.evaluate_moves_best_move_first_with_progress(codes, start, &CancelToken::new(), |_| {})
    }

    pub fn evaluate_moves_best_move_first_with_progress<S, F>(
        &self,
        codes: &[S],
        start: &StartConfig,
        cancel: &CancelToken,
        on_progress: F,
    ) -> ChessResult<Vec<EvaluatedMove>>
    where
        S: AsRef<str>,
        F: FnMut(SearchProgress),
    {
        let board = Board::replay(start, codes)?;
        let state = self.snapshot()?;
        search(&state, &board, cancel, on_progress)
    }

    /// The move to play after `codes`: a book move in known classic
    /// openings, otherwise a searched one.
    pub fn compute_move<S: AsRef<str>>(
        &self,
        codes: &[S],
        start: &StartConfig,
        cancel: &CancelToken,
    ) -> ChessResult<EngineMove> {
        let board = Board::replay(start, codes)?;
        if board.legal_moves().is_empty() {
            return Err(ChessError::NoLegalMoves);
        }
        let state = self.snapshot()?;

        if state.config.book_enabled {
            if let Some(engine_move) = self.book_move(&state.config, &board, start, cancel)? {
                return Ok(engine_move);
            }
        }

        let sorted = search(&state, &board, cancel, |progress| {
            debug!(completed = progress.completed, total = progress.total, "search progress");
        })?;
        let best = sorted.first().copied().ok_or(ChessError::NoLegalMoves)?;
        let evaluated = {
            let mut rng = self.lock_rng()?;
            select_move(&sorted, state.config.acceptable_distance, &mut *rng)
        }
        .unwrap_or(best);
        info!(chosen = %evaluated, best = %best, "move selected");
        Ok(EngineMove {
            evaluated,
            source: MoveSource::Search,
        })
    }

    fn snapshot(&self) -> ChessResult<EngineState> {
        self.state
            .read()
            .map(|state| state.clone())
            .map_err(|_| ChessError::Internal("engine settings poisoned".to_owned()))
    }

    fn book_move(
        &self,
        config: &EngineConfig,
        board: &Board,
        start: &StartConfig,
        cancel: &CancelToken,
    ) -> ChessResult<Option<EngineMove>> {
        let started = Instant::now();
        let played = board.played_moves();
        let choice = {
            let mut rng = self.lock_rng()?;
            self.book.lookup(start, &played, &mut *rng)
        };
        let Some(mv) = choice else {
            return Ok(None);
        };
        let evaluation = evaluate_move(board, mv, &config.book_pruner, cancel)?;
        wait_at_least(config.book_min_latency, started, cancel)?;
        debug!(%mv, %evaluation, "book move");
        Ok(Some(EngineMove {
            evaluated: EvaluatedMove { mv, evaluation },
            source: MoveSource::Book,
        }))
    }

    fn lock_rng(&self) -> ChessResult<MutexGuard<'_, StdRng>> {
        self.rng
            .lock()
            .map_err(|_| ChessError::Internal("engine random source poisoned".to_owned()))
    }
}

fn search<F: FnMut(SearchProgress)>(
    state: &EngineState,
    board: &Board,
    cancel: &CancelToken,
    on_progress: F,
) -> ChessResult<Vec<EvaluatedMove>> {
    let moves = board.legal_moves();
    if moves.is_empty() {
        return Err(ChessError::NoLegalMoves);
    }
    let started = Instant::now();
    let sorted = state
        .pool
        .evaluate_root_moves(board, &moves, &state.config.pruner(), cancel, on_progress)?;
    info!(
        moves = moves.len(),
        threads = state.pool.threads(),
        difficulty = %state.config.difficulty,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "search finished"
    );
    Ok(sorted)
}

/// Sleeps until `min` has passed since `started`, waking up regularly to
/// honour cancellation.
fn wait_at_least(min: Duration, started: Instant, cancel: &CancelToken) -> ChessResult<()> {
    const SLICE: Duration = Duration::from_millis(20);
    loop {
        cancel.check()?;
        let elapsed = started.elapsed();
        if elapsed >= min {
            return Ok(());
        }
        thread::sleep((min - elapsed).min(SLICE));
    }
}
