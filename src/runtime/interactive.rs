//! Periodic refresh task for an interactive session.
//!
//! The task owns a cancellation channel and waits on it between redraws, so ending the session
//! wakes it immediately instead of after a full interval.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::history::{HistoryError, LogHistory, SessionId};

/// Roughly sixty redraws per second.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_micros(1_000_000 / 60);

type RenderFn = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Clone)]
pub struct InteractiveOptions {
    pub interval: Duration,
    /// Thread name for the refresh task.
    pub name: String,
}

impl Default for InteractiveOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            name: "tape-log-refresh".to_string(),
        }
    }
}

impl InteractiveOptions {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// A live interactive line redrawn by a background thread until ended.
pub struct InteractiveSession {
    history: LogHistory,
    id: SessionId,
    render: RenderFn,
    cancel: Option<Sender<()>>,
    thread: Option<JoinHandle<Result<(), HistoryError>>>,
    ended: bool,
}

impl std::fmt::Debug for InteractiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractiveSession")
            .field("id", &self.id)
            .field("stream", self.history.stream_key())
            .field("running", &self.thread.is_some())
            .field("ended", &self.ended)
            .finish()
    }
}

impl InteractiveSession {
    /// Begins a session on `history` and starts redrawing `render()` every `options.interval`.
    ///
    /// Each redraw writes the rendered text followed by a newline.
    pub fn start<R>(
        history: LogHistory,
        options: InteractiveOptions,
        render: R,
    ) -> Result<Self, HistoryError>
    where
        R: Fn() -> String + Send + Sync + 'static,
    {
        let render: RenderFn = Arc::new(render);
        let id = history.begin_interactive_session();
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

        let task_history = history.clone();
        let task_render = Arc::clone(&render);
        let interval = options.interval;
        let spawned = thread::Builder::new().name(options.name).spawn(move || {
            loop {
                if !task_history.has_interactive_session(id) {
                    return Ok(());
                }
                match redraw(&task_history, id, &task_render()) {
                    Ok(()) => {}
                    // Another session is mid-rewrite on this stream; try again next tick.
                    Err(err) if err.is_concurrent_rewrite() => {
                        tracing::trace!(session = %id, "refresh skipped: {err}");
                    }
                    Err(HistoryError::UnknownSession(_)) => return Ok(()),
                    Err(err) => {
                        tracing::warn!(session = %id, "refresh stopped: {err}");
                        return Err(err);
                    }
                }
                match cancel_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return Ok(()),
                }
            }
        });

        let thread = match spawned {
            Ok(thread) => thread,
            Err(err) => {
                history.end_interactive_session(id)?;
                return Err(err.into());
            }
        };

        Ok(Self {
            history,
            id,
            render,
            cancel: Some(cancel_tx),
            thread: Some(thread),
            ended: false,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        !self.ended && self.history.has_interactive_session(self.id)
    }

    /// Redraws immediately, outside the periodic schedule.
    pub fn refresh(&self) -> Result<(), HistoryError> {
        redraw(&self.history, self.id, &(self.render)())
    }

    /// Stops the refresh task, draws the final state, and ends the session.
    ///
    /// The final state is `final_message` when given, otherwise one last `render()`. The first
    /// error from the task, the final draw, or ending the session is returned.
    pub fn end(mut self, final_message: Option<&str>) -> Result<(), HistoryError> {
        self.finish(final_message)
    }

    fn stop_task(&mut self) -> Result<(), HistoryError> {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        match self.thread.take().map(JoinHandle::join) {
            Some(Ok(result)) => result,
            Some(Err(_)) => {
                tracing::warn!(session = %self.id, "refresh task panicked");
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn finish(&mut self, final_message: Option<&str>) -> Result<(), HistoryError> {
        if self.ended {
            return Ok(());
        }
        self.ended = true;

        let stopped = self.stop_task();
        if !self.history.has_interactive_session(self.id) {
            return stopped;
        }
        let content = match final_message {
            Some(message) => message.to_string(),
            None => (self.render)(),
        };
        // Waits out a rewrite another session has in flight on this stream.
        let history = &self.history;
        let drawn = history
            .do_interactive_write_when_idle(self.id, || history.write(&format!("{content}\n")));
        let ended = self.history.end_interactive_session(self.id);
        stopped.and(drawn).and(ended)
    }
}

impl Drop for InteractiveSession {
    fn drop(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        let _ = self.stop_task();
        if self.history.has_interactive_session(self.id) {
            let _ = self.history.end_interactive_session(self.id);
        }
    }
}

fn redraw(history: &LogHistory, id: SessionId, content: &str) -> Result<(), HistoryError> {
    history.do_interactive_write(id, || history.write(&format!("{content}\n")))
}
