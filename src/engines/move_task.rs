//! Background move computation with cancellation.
//!
//! `MoveTask` runs one `compute_move` request on its own thread so the
//! caller stays responsive. The result arrives through a one-shot channel;
//! an optional callback runs on the task thread when the result is ready
//! unless the task was cancelled first. Dropping an unfinished task cancels
//! it. The engine's search pool is shared and outlives every task.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use tracing::debug;

use crate::engines::chess_engine::{ChessEngine, EngineMove};
use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::StartConfig;
use crate::search::threading::CancelToken;

type Callback = Box<dyn FnOnce(&ChessResult<EngineMove>) + Send + 'static>;

pub struct MoveTask {
    cancel: CancelToken,
    receiver: Receiver<ChessResult<EngineMove>>,
    handle: Option<JoinHandle<()>>,
}

impl MoveTask {
    pub fn spawn(engine: Arc<ChessEngine>, codes: Vec<String>, start: StartConfig) -> ChessResult<Self> {
        Self::start(engine, codes, start, None)
    }

    /// Like [`MoveTask::spawn`]; `on_done` sees the result before it is
    /// handed to the channel.
    pub fn spawn_with_callback<F>(
        engine: Arc<ChessEngine>,
        codes: Vec<String>,
        start: StartConfig,
        on_done: F,
    ) -> ChessResult<Self>
    where
        F: FnOnce(&ChessResult<EngineMove>) + Send + 'static,
    {
        Self::start(engine, codes, start, Some(Box::new(on_done)))
    }

    fn start(
        engine: Arc<ChessEngine>,
        codes: Vec<String>,
        start: StartConfig,
        on_done: Option<Callback>,
    ) -> ChessResult<Self> {
        let cancel = CancelToken::new();
        let (sender, receiver) = bounded(1);
        let token = cancel.clone();

        let handle = thread::Builder::new()
            .name("damson-move-task".to_owned())
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    engine.compute_move(&codes, &start, &token)
                }))
                .unwrap_or_else(|_| Err(ChessError::Internal("move task panicked".to_owned())));

                if token.is_cancelled() {
                    debug!("move task cancelled, result dropped");
                    let _ = sender.send(Err(ChessError::Cancelled));
                    return;
                }
                if let Some(callback) = on_done {
                    callback(&result);
                }
                let _ = sender.send(result);
            })
            .map_err(|err| ChessError::Internal(format!("cannot start move task: {err}")))?;

        Ok(Self {
            cancel,
            receiver,
            handle: Some(handle),
        })
    }

    /// Asks the computation to stop. The callback will not run afterwards.
    pub fn cancel(&self) {
        debug!("cancelling move task");
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |handle| handle.is_finished())
    }

    /// The result if it is ready, without blocking.
    pub fn try_result(&self) -> Option<ChessResult<EngineMove>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ChessError::Internal(
                "move task ended without a result".to_owned(),
            ))),
        }
    }

    /// Blocks until the task delivers its result.
    pub fn wait(mut self) -> ChessResult<EngineMove> {
        let result = self
            .receiver
            .recv()
            .map_err(|_| ChessError::Internal("move task ended without a result".to_owned()))?;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        result
    }
}

impl Drop for MoveTask {
    fn drop(&mut self) {
        if self.handle.as_ref().is_some_and(|handle| !handle.is_finished()) {
            self.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use crate::engines::chess_engine::MoveSource;
    use crate::engines::engine_config::EngineConfig;
    use crate::search::pruner::Difficulty;
    use crate::tables::opening_book::OpeningBook;

    fn engine(book: &str, latency: Duration) -> Arc<ChessEngine> {
        let config = EngineConfig {
            cores: 2,
            difficulty: Difficulty::Easy,
            book_enabled: true,
            book_min_latency: latency,
            seed: Some(3),
            ..EngineConfig::default()
        };
        Arc::new(ChessEngine::with_book(config, OpeningBook::from_text(book)).expect("engine"))
    }

    #[test]
    fn task_delivers_the_move_and_runs_the_callback() {
        let engine = engine("e2-e4,e7-e5", Duration::ZERO);
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let task = MoveTask::spawn_with_callback(engine, Vec::new(), StartConfig::Classic, move |result| {
            assert!(result.is_ok());
            flag.store(true, Ordering::SeqCst);
        })
        .expect("task");
        let played = task.wait().expect("move");
        assert_eq!(played.source, MoveSource::Book);
        assert_eq!(played.evaluated.mv.code(), "e2-e4");
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn cancelled_task_skips_the_callback() {
        let engine = engine("e2-e4,e7-e5", Duration::from_secs(5));
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let task = MoveTask::spawn_with_callback(engine, Vec::new(), StartConfig::Classic, move |_| {
            flag.store(true, Ordering::SeqCst);
        })
        .expect("task");
        task.cancel();
        assert!(task.is_cancelled());
        assert_eq!(task.wait(), Err(ChessError::Cancelled));
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn results_can_be_polled() {
        let engine = engine("", Duration::ZERO);
        let task = MoveTask::spawn(engine, vec!["e2-e4".to_owned()], StartConfig::Classic).expect("task");
        let result = loop {
            if let Some(result) = task.try_result() {
                break result;
            }
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(result.expect("move").source, MoveSource::Search);
    }

    #[test]
    fn errors_are_delivered_not_raised() {
        let engine = engine("", Duration::ZERO);
        let task = MoveTask::spawn(engine, vec!["e2-e5".to_owned()], StartConfig::Classic).expect("task");
        assert!(matches!(task.wait(), Err(ChessError::IllegalMove { .. })));
    }

    #[test]
    fn cores_can_change_while_a_task_runs() {
        let engine = engine("e2-e4,e7-e5", Duration::from_millis(300));
        let task = MoveTask::spawn(Arc::clone(&engine), Vec::new(), StartConfig::Classic).expect("task");
        engine.set_option("core#", "1").expect("one core is always available");
        assert!(!task.is_finished());

        let played = task.wait().expect("running task finishes on its old pool");
        assert_eq!(played.source, MoveSource::Book);
        assert_eq!(engine.threads().expect("threads"), 1);

        let later = engine
            .compute_move(&["a2-a3"], &StartConfig::Classic, &CancelToken::new())
            .expect("later request uses the new pool");
        assert_eq!(later.source, MoveSource::Search);
    }

    #[test]
    fn dropping_a_running_task_cancels_it() {
        let engine = engine("e2-e4,e7-e5", Duration::from_secs(5));
        let task = MoveTask::spawn(Arc::clone(&engine), Vec::new(), StartConfig::Classic).expect("task");
        let token = task.cancel.clone();
        drop(task);
        assert!(token.is_cancelled());
    }
}
