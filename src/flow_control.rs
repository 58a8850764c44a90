//! Flow-control windows (RFC 9113 Section 5.2).
//!
//! Every stream, and the connection itself as stream 0, has two controllers:
//! [`IncomingFlowController`] tracks how much the peer may still send us and
//! decides when to announce more with WINDOW_UPDATE;
//! [`OutgoingFlowController`] tracks how much we may still send the peer and
//! lets writers block until credit arrives.
//!
//! Credit is signed: a SETTINGS change can legitimately push a window below
//! zero. Growing a window past 2^31-1 is a FLOW_CONTROL_ERROR, scoped to the
//! stream (or to the connection for stream 0).

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{ErrorCode, H2Error};
use crate::settings::{Http2Settings, MAX_WINDOW_SIZE};

fn checked_credit(stream_id: u32, credit: i64, diff: i64) -> Result<i64, H2Error> {
    let updated = credit + diff;
    if updated > i64::from(MAX_WINDOW_SIZE) {
        return Err(H2Error::stream(
            ErrorCode::FlowControlError,
            "Credit overflow",
            stream_id,
        ));
    }
    Ok(updated)
}

fn window_delta(old: &Http2Settings, new: &Http2Settings) -> i64 {
    i64::from(new.initial_window_size) - i64::from(old.initial_window_size)
}

#[derive(Debug)]
struct OutgoingState {
    credit: i64,
    closed: bool,
}

/// Credit we have for sending DATA to the peer.
#[derive(Debug)]
pub struct OutgoingFlowController {
    stream_id: u32,
    state: Mutex<OutgoingState>,
    credit_available: Condvar,
}

impl OutgoingFlowController {
    pub fn new(stream_id: u32, initial_credit: u32) -> Self {
        tracing::trace!(stream_id, credit = initial_credit, "outgoing flow controller created");
        Self {
            stream_id,
            state: Mutex::new(OutgoingState {
                credit: i64::from(initial_credit),
                closed: false,
            }),
            credit_available: Condvar::new(),
        }
    }

    pub fn stream_id(&self) -> u32 {
        self.stream_id
    }

    pub fn credit(&self) -> i64 {
        self.state.lock().credit
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Take `bytes` of credit if available, without blocking.
    pub fn withdraw(&self, bytes: usize) -> bool {
        if bytes == 0 {
            return true;
        }
        let Ok(needed) = i64::try_from(bytes) else {
            return false;
        };
        let mut state = self.state.lock();
        if state.closed || needed > state.credit {
            return false;
        }
        state.credit -= needed;
        tracing::trace!(stream_id = self.stream_id, bytes, credit = state.credit, "outgoing credit withdrawn");
        true
    }

    /// Block until `bytes` of credit can be taken or `timeout` elapses.
    ///
    /// Returns `Ok(false)` on timeout. A closed controller fails with
    /// STREAM_CLOSED so the writer stops waiting. A timeout too large to
    /// form a deadline waits without one.
    pub fn wait_until_withdraw(&self, bytes: usize, timeout: Duration) -> Result<bool, H2Error> {
        let deadline = Instant::now().checked_add(timeout);
        let needed = i64::try_from(bytes).ok();
        let mut state = self.state.lock();
        let mut timed_out = false;
        loop {
            if state.closed {
                return Err(H2Error::stream(
                    ErrorCode::StreamClosed,
                    "Flow controller closed while waiting for credit",
                    self.stream_id,
                ));
            }
            // no window can ever hold more than i64::MAX
            let Some(needed) = needed else {
                return Ok(false);
            };
            if needed <= state.credit {
                state.credit -= needed;
                tracing::trace!(stream_id = self.stream_id, bytes, credit = state.credit, "outgoing credit withdrawn");
                return Ok(true);
            }
            if timed_out {
                return Ok(false);
            }
            match deadline {
                Some(deadline) => {
                    timed_out = self
                        .credit_available
                        .wait_until(&mut state, deadline)
                        .timed_out();
                }
                None => self.credit_available.wait(&mut state),
            }
        }
    }

    /// Add the increment from a WINDOW_UPDATE and wake waiting writers.
    pub fn apply_window_update(&self, increment: u32) -> Result<(), H2Error> {
        self.add_credit(i64::from(increment))
    }

    /// Apply a change of the peer's SETTINGS_INITIAL_WINDOW_SIZE to this window.
    pub fn apply_settings_change(&self, old: &Http2Settings, new: &Http2Settings) -> Result<(), H2Error> {
        self.add_credit(window_delta(old, new))
    }

    fn add_credit(&self, diff: i64) -> Result<(), H2Error> {
        if diff == 0 {
            return Ok(());
        }
        let mut state = self.state.lock();
        state.credit = checked_credit(self.stream_id, state.credit, diff)?;
        tracing::trace!(stream_id = self.stream_id, diff, credit = state.credit, "outgoing credit changed");
        self.credit_available.notify_all();
        Ok(())
    }

    /// Mark the stream or connection closed and wake every waiter.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.credit_available.notify_all();
    }
}

#[derive(Debug)]
struct IncomingState {
    credit: i64,
    max_credit: i64,
    pending: i64,
}

/// Credit the peer has for sending DATA to us.
#[derive(Debug)]
pub struct IncomingFlowController {
    stream_id: u32,
    state: Mutex<IncomingState>,
}

impl IncomingFlowController {
    pub fn new(stream_id: u32, initial_credit: u32) -> Self {
        tracing::trace!(stream_id, credit = initial_credit, "incoming flow controller created");
        Self {
            stream_id,
            state: Mutex::new(IncomingState {
                credit: i64::from(initial_credit),
                max_credit: i64::from(initial_credit),
                pending: 0,
            }),
        }
    }

    pub fn stream_id(&self) -> u32 {
        self.stream_id
    }

    pub fn credit(&self) -> i64 {
        self.state.lock().credit
    }

    /// Charge received DATA against the window. `false` means the peer overran it.
    pub fn withdraw(&self, bytes: usize) -> bool {
        if bytes == 0 {
            return true;
        }
        let Ok(needed) = i64::try_from(bytes) else {
            return false;
        };
        let mut state = self.state.lock();
        if needed > state.credit {
            return false;
        }
        state.credit -= needed;
        tracing::trace!(stream_id = self.stream_id, bytes, credit = state.credit, "incoming credit withdrawn");
        true
    }

    /// Give back `diff` bytes of credit once the data has been consumed.
    ///
    /// Returns the WINDOW_UPDATE increment to send, or 0 while the returned
    /// credit is still below half of the maximum window. An increment never
    /// exceeds 2^31-1; anything beyond stays pending for the next commit.
    pub fn increment_credit(&self, diff: u32) -> Result<u32, H2Error> {
        if diff == 0 {
            return Ok(0);
        }
        let mut state = self.state.lock();
        state.credit = checked_credit(self.stream_id, state.credit, i64::from(diff))?;
        state.pending += i64::from(diff);
        tracing::trace!(stream_id = self.stream_id, diff, credit = state.credit, "incoming credit returned");

        if state.pending >= state.max_credit / 2 {
            let commit = state.pending.min(i64::from(MAX_WINDOW_SIZE));
            state.pending -= commit;
            tracing::debug!(stream_id = self.stream_id, increment = commit, "committing window update");
            return Ok(commit as u32);
        }
        Ok(0)
    }

    /// Apply a change of our own SETTINGS_INITIAL_WINDOW_SIZE to this window.
    pub fn apply_settings_change(&self, old: &Http2Settings, new: &Http2Settings) -> Result<(), H2Error> {
        let diff = window_delta(old, new);
        let mut state = self.state.lock();
        state.credit = checked_credit(self.stream_id, state.credit, diff)?;
        state.max_credit = i64::from(new.initial_window_size);
        tracing::trace!(stream_id = self.stream_id, diff, credit = state.credit, "incoming window resized");
        Ok(())
    }
}

/// Apply a peer SETTINGS change to every stream-level outgoing window.
///
/// The connection window (stream 0) is not governed by
/// SETTINGS_INITIAL_WINDOW_SIZE and is skipped.
pub fn apply_settings_to_all<'a, I>(controllers: I, old: &Http2Settings, new: &Http2Settings) -> Result<(), H2Error>
where
    I: IntoIterator<Item = &'a OutgoingFlowController>,
{
    if old.initial_window_size == new.initial_window_size {
        return Ok(());
    }
    for controller in controllers {
        if controller.stream_id() != 0 {
            controller.apply_settings_change(old, new)?;
        }
    }
    Ok(())
}
