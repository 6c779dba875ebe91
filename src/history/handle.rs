//! Shared state for one physical stream and the operations that mutate it.
//!
//! Invariant: `history` is non-empty only while at least one session is active, and read in
//! order it mirrors the lines currently on screen (truncated at the anchor while a rewrite is in
//! flight).
//!
//! Locking: `state` is held only for short, non-suspending sections and never while a render
//! callback runs. The rewrite lock (`StreamState::rewrite`) records the session and thread that
//! own the in-flight rewrite. Writes from that thread are part of the rewrite; writes and session
//! changes from other threads wait on `idle` until the rewrite ends.

use std::fmt;
use std::io::Write;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::stream::{StreamKey, StreamSink};
use crate::history::error::HistoryError;
use crate::history::line::{append_to_history, LogLine, SessionId};

#[derive(Debug, Clone, Copy)]
struct RewriteOwner {
    session: SessionId,
    thread: ThreadId,
}

struct StreamState {
    sink: StreamSink,
    history: Vec<LogLine>,
    active: Vec<SessionId>,
    rewrite: Option<RewriteOwner>,
    released: bool,
}

impl StreamState {
    fn has_session(&self, id: SessionId) -> bool {
        self.active.contains(&id)
    }

    /// Tag for a write issued by the current thread: the rewriting session if this thread owns
    /// the in-flight rewrite.
    fn rewrite_tag(&self) -> Option<SessionId> {
        let current = thread::current().id();
        self.rewrite
            .filter(|owner| owner.thread == current)
            .map(|owner| owner.session)
    }

    fn blocked_by_other_thread(&self) -> bool {
        let current = thread::current().id();
        self.rewrite.is_some_and(|owner| owner.thread != current)
    }

    fn update_history(&mut self, session: Option<SessionId>, text: &str) {
        if self.active.is_empty() {
            return;
        }
        append_to_history(&mut self.history, session, text);
    }

    fn emit(&mut self, gate: &mut OutputGate) -> Result<(), HistoryError> {
        gate.flush(&mut *self.sink)?;
        Ok(())
    }
}

/// Lines captured at the start of a rewrite that must be re-emitted after it.
struct ReplayPlan {
    before: Vec<LogLine>,
    replay: Vec<LogLine>,
}

pub struct StreamHandle {
    key: StreamKey,
    state: Mutex<StreamState>,
    idle: Condvar,
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("StreamHandle")
            .field("key", &self.key)
            .field("history_len", &state.history.len())
            .field("active_sessions", &state.active)
            .field("rewriting", &state.rewrite.map(|owner| owner.session))
            .finish()
    }
}

impl StreamHandle {
    pub(crate) fn new(key: StreamKey, sink: StreamSink) -> Self {
        Self {
            key,
            state: Mutex::new(StreamState {
                sink,
                history: Vec::new(),
                active: Vec::new(),
                rewrite: None,
                released: false,
            }),
            idle: Condvar::new(),
        }
    }

    pub fn key(&self) -> &StreamKey {
        &self.key
    }

    fn lock(&self) -> MutexGuard<'_, StreamState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the state once no other thread is mid-rewrite.
    fn lock_idle(&self) -> MutexGuard<'_, StreamState> {
        let mut state = self.lock();
        while state.blocked_by_other_thread() {
            state = self.idle.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        state
    }

    fn lock_writable(&self) -> Result<MutexGuard<'_, StreamState>, HistoryError> {
        let state = self.lock_idle();
        if state.released {
            return Err(HistoryError::Released(self.key.clone()));
        }
        Ok(state)
    }

    /// Snapshot of the tracked lines.
    pub fn history(&self) -> Vec<LogLine> {
        self.lock().history.clone()
    }

    /// Snapshot of the active session identifiers, in the order they began.
    pub fn active_sessions(&self) -> Vec<SessionId> {
        self.lock().active.clone()
    }

    /// Session owning the in-flight rewrite, if any.
    pub fn rewriting_session(&self) -> Option<SessionId> {
        self.lock().rewrite.map(|owner| owner.session)
    }

    /// Write entry point.
    ///
    /// Inside a rewrite (on the rewriting thread) the current terminal line is erased first and
    /// the content is tagged with the rewriting session.
    pub fn write(&self, content: &str) -> Result<(), HistoryError> {
        let mut state = self.lock_writable()?;
        let tag = state.rewrite_tag();
        state.update_history(tag, content);

        let mut gate = OutputGate::new();
        if tag.is_some() {
            gate.push(TerminalCmd::EraseLine);
        }
        gate.push(TerminalCmd::bytes(content));
        state.emit(&mut gate)
    }

    /// Intercepted write path used by plain writers: always tagged `None`, never erases.
    pub fn write_plain(&self, content: &str) -> Result<(), HistoryError> {
        let mut state = self.lock_writable()?;
        state.update_history(None, content);
        let mut gate = OutputGate::new();
        gate.push(TerminalCmd::bytes(content));
        state.emit(&mut gate)
    }

    pub fn flush(&self) -> Result<(), HistoryError> {
        let mut state = self.lock_writable()?;
        state.sink.flush()?;
        Ok(())
    }

    pub fn begin_interactive_session(&self) -> SessionId {
        let id = SessionId::mint();
        let mut state = self.lock_idle();
        state.active.push(id);
        tracing::debug!(stream = %self.key, session = %id, "interactive session started");
        id
    }

    pub fn has_interactive_session(&self, id: SessionId) -> bool {
        self.lock().has_session(id)
    }

    /// Ends `id`: its lines become plain lines, and the history is dropped once no session
    /// remains.
    pub fn end_interactive_session(&self, id: SessionId) -> Result<(), HistoryError> {
        let mut state = self.lock_idle();
        if !state.has_session(id) {
            return Err(HistoryError::UnknownSession(id));
        }

        for line in state
            .history
            .iter_mut()
            .filter(|line| line.session == Some(id))
        {
            line.session = None;
        }
        state.active.retain(|active| *active != id);
        if state.active.is_empty() {
            state.history.clear();
        }
        tracing::debug!(
            stream = %self.key,
            session = %id,
            remaining = state.active.len(),
            "interactive session ended"
        );
        Ok(())
    }

    /// Redraws the lines of session `id` in place.
    ///
    /// The lines from the session's first line (the anchor) downward are erased; `render` then
    /// writes the session's new content through [`StreamHandle::write`], and every line from
    /// another writer that was below the anchor is replayed. Replayed lines whose content is
    /// already on screen at the same row are skipped with a cursor move.
    ///
    /// Only one rewrite may be in flight per stream; a nested or concurrent call fails with
    /// `ConcurrentRewrite`. The lock is released even if `render` fails or panics.
    pub fn do_interactive_write<F>(&self, id: SessionId, render: F) -> Result<(), HistoryError>
    where
        F: FnOnce() -> Result<(), HistoryError>,
    {
        let guard = self.acquire_rewrite(id, false)?;
        self.run_rewrite(guard, id, render)
    }

    /// Like [`StreamHandle::do_interactive_write`], but waits for a rewrite in flight on another
    /// thread to finish instead of failing. A nested call from inside `render` still fails with
    /// `ConcurrentRewrite`.
    pub fn do_interactive_write_when_idle<F>(
        &self,
        id: SessionId,
        render: F,
    ) -> Result<(), HistoryError>
    where
        F: FnOnce() -> Result<(), HistoryError>,
    {
        let guard = self.acquire_rewrite(id, true)?;
        self.run_rewrite(guard, id, render)
    }

    fn run_rewrite<F>(
        &self,
        mut guard: RewriteGuard<'_>,
        id: SessionId,
        render: F,
    ) -> Result<(), HistoryError>
    where
        F: FnOnce() -> Result<(), HistoryError>,
    {
        let plan = self.prepare_rewrite(id)?;

        let rendered = render();
        let replayed = match plan {
            Some(plan) => self.replay(plan),
            None => Ok(()),
        };

        guard.release()?;
        rendered.and(replayed)
    }

    fn acquire_rewrite(&self, id: SessionId, wait: bool) -> Result<RewriteGuard<'_>, HistoryError> {
        let mut state = if wait { self.lock_idle() } else { self.lock() };
        if state.released {
            return Err(HistoryError::Released(self.key.clone()));
        }
        if !state.has_session(id) {
            return Err(HistoryError::UnknownSession(id));
        }
        if let Some(owner) = state.rewrite {
            return Err(HistoryError::ConcurrentRewrite {
                active: owner.session,
                requested: id,
            });
        }
        state.rewrite = Some(RewriteOwner {
            session: id,
            thread: thread::current().id(),
        });
        Ok(RewriteGuard {
            handle: self,
            released: false,
        })
    }

    /// Hides the cursor and moves it up to the anchor, then truncates the history there.
    fn prepare_rewrite(&self, id: SessionId) -> Result<Option<ReplayPlan>, HistoryError> {
        let mut state = self.lock();
        let mut gate = OutputGate::new();
        gate.push(TerminalCmd::HideCursor);

        let anchor = state
            .history
            .iter()
            .position(|line| line.session == Some(id));
        let plan = anchor.map(|anchor| {
            let before = state.history.clone();
            let replay: Vec<LogLine> = before[anchor..]
                .iter()
                .filter(|line| line.session != Some(id))
                .cloned()
                .collect();
            gate.push(TerminalCmd::MoveUp(before.len() - anchor));
            tracing::trace!(
                stream = %self.key,
                session = %id,
                anchor,
                erased = before.len() - anchor,
                replay = replay.len(),
                "rewrite prepared"
            );
            (anchor, ReplayPlan { before, replay })
        });

        // History still mirrors the screen if the sink rejects the cursor move.
        state.emit(&mut gate)?;
        Ok(plan.map(|(anchor, plan)| {
            state.history.truncate(anchor);
            plan
        }))
    }

    fn replay(&self, plan: ReplayPlan) -> Result<(), HistoryError> {
        let mut state = self.lock();
        let mut gate = OutputGate::new();
        let mut row = state.history.len();
        let mut skipped = 0usize;

        for line in plan.replay {
            // Tags are part of the comparison; replayed lines keep theirs.
            if plan.before.get(row) == Some(&line) {
                gate.push(TerminalCmd::MoveDown(1));
                skipped += 1;
            } else {
                gate.push(TerminalCmd::EraseLine);
                gate.push(TerminalCmd::bytes(line.content.as_str()));
            }
            state.history.push(line);
            row += 1;
        }

        tracing::trace!(stream = %self.key, skipped, "rewrite replayed");
        state.emit(&mut gate)
    }

    /// Detaches the sink, leaving a handle that rejects further output.
    pub(crate) fn detach(&self, placeholder: StreamSink) -> StreamSink {
        let mut state = self.lock_idle();
        state.released = true;
        state.history.clear();
        std::mem::replace(&mut state.sink, placeholder)
    }
}

/// Holds the rewrite lock; releasing clears it, shows the cursor and wakes waiting writers.
struct RewriteGuard<'a> {
    handle: &'a StreamHandle,
    released: bool,
}

impl RewriteGuard<'_> {
    fn release(&mut self) -> Result<(), HistoryError> {
        self.released = true;
        let mut state = self.handle.lock();
        state.rewrite = None;
        let mut gate = OutputGate::new();
        gate.push(TerminalCmd::ShowCursor);
        let shown = state.emit(&mut gate);
        drop(state);
        self.handle.idle.notify_all();
        shown
    }
}

impl Drop for RewriteGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StreamHandle;
    use crate::core::stream::{SharedSink, StreamKey};
    use crate::history::error::HistoryError;
    use crate::history::line::LogLine;
    use pretty_assertions::assert_eq;

    fn new_handle() -> (StreamHandle, SharedSink) {
        let sink = SharedSink::new();
        (StreamHandle::new(StreamKey::named("test"), sink.boxed()), sink)
    }

    #[test]
    fn writes_without_sessions_are_not_tracked() {
        let (handle, sink) = new_handle();
        handle.write("one\n").expect("write");
        handle.write("two").expect("write");
        assert!(handle.history().is_empty());
        assert_eq!(sink.contents(), "one\ntwo");
    }

    #[test]
    fn ending_unknown_session_fails() {
        let (handle, _sink) = new_handle();
        let (other, _) = new_handle();
        let foreign = other.begin_interactive_session();
        assert!(matches!(
            handle.end_interactive_session(foreign),
            Err(HistoryError::UnknownSession(id)) if id == foreign
        ));
    }

    #[test]
    fn ending_one_of_two_sessions_untags_its_lines() {
        let (handle, _sink) = new_handle();
        let a = handle.begin_interactive_session();
        let b = handle.begin_interactive_session();
        handle
            .do_interactive_write(a, || handle.write("a\n"))
            .expect("rewrite a");
        handle
            .do_interactive_write(b, || handle.write("b\n"))
            .expect("rewrite b");

        handle.end_interactive_session(a).expect("end a");
        assert_eq!(
            handle.history(),
            vec![LogLine::new(None, "a\n"), LogLine::new(Some(b), "b\n")]
        );
        assert_eq!(handle.active_sessions(), vec![b]);
    }

    #[test]
    fn panicking_render_releases_lock() {
        let (handle, sink) = new_handle();
        let id = handle.begin_interactive_session();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = handle.do_interactive_write(id, || panic!("render blew up"));
        }));
        assert!(result.is_err());
        assert_eq!(handle.rewriting_session(), None);
        assert!(sink.contents().ends_with("\x1b[?25h"));
        handle
            .do_interactive_write(id, || handle.write("ok\n"))
            .expect("lock was released");
    }

    #[test]
    fn render_error_is_returned_after_release() {
        let (handle, _sink) = new_handle();
        let id = handle.begin_interactive_session();
        let err = handle
            .do_interactive_write(id, || Err(HistoryError::UnknownSession(id)))
            .expect_err("render error propagates");
        assert!(matches!(err, HistoryError::UnknownSession(_)));
        assert_eq!(handle.rewriting_session(), None);
    }

    #[test]
    fn sink_failure_propagates_unchanged() {
        let (handle, sink) = new_handle();
        sink.set_failing(true);
        let err = handle.write("lost\n").expect_err("must fail");
        match err {
            HistoryError::Io(source) => assert_eq!(source.kind(), std::io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejected_cursor_move_keeps_history_intact() {
        let (handle, sink) = new_handle();
        let id = handle.begin_interactive_session();
        handle
            .do_interactive_write(id, || handle.write("p1\n"))
            .expect("first draw");
        handle.write("LOG\n").expect("plain write");

        sink.set_failing(true);
        let result = handle.do_interactive_write(id, || handle.write("p2\n"));
        assert!(matches!(result, Err(HistoryError::Io(_))));
        assert!(handle.rewriting_session().is_none());
        assert_eq!(
            handle.history(),
            vec![LogLine::new(Some(id), "p1\n"), LogLine::new(None, "LOG\n")]
        );

        sink.set_failing(false);
        handle
            .do_interactive_write(id, || handle.write("p3\n"))
            .expect("redraw after recovery");
        assert_eq!(
            handle.history(),
            vec![LogLine::new(Some(id), "p3\n"), LogLine::new(None, "LOG\n")]
        );
    }

    #[test]
    fn idle_rewrite_still_rejects_nesting() {
        let (handle, _sink) = new_handle();
        let outer = handle.begin_interactive_session();
        let inner = handle.begin_interactive_session();
        let mut nested = None;
        handle
            .do_interactive_write(outer, || {
                nested = Some(handle.do_interactive_write_when_idle(inner, || Ok(())));
                Ok(())
            })
            .expect("outer rewrite");
        assert!(matches!(
            nested,
            Some(Err(HistoryError::ConcurrentRewrite { .. }))
        ));
    }
}
