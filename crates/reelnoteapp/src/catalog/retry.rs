//! Bounded retry with exponential backoff.
//!
//! Only transport failures that may go away on their own (timeouts, refused or
//! reset connections) are retried. A non-2xx response is an answer from the
//! server and is returned as is.

use std::io;
use std::time::Duration;

use log::info;

use crate::cancel::CancelFlag;
use crate::error::{ReelnoteError, Result};

const MAX_BACKOFF: Duration = Duration::from_secs(10);
const SLEEP_SLICE: Duration = Duration::from_millis(100);
const STATUS_BODY_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connection,
    Status(u16),
    Other,
}

pub fn is_retryable(kind: FailureKind) -> bool {
    matches!(kind, FailureKind::Timeout | FailureKind::Connection)
}

/// Wait before retrying after failed attempt `attempt` (1-based):
/// `min(2^(attempt-1) s, 10 s)`.
pub fn backoff_delay(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(4);
    Duration::from_secs(1u64 << exponent).min(MAX_BACKOFF)
}

/// One failed attempt, classified.
#[derive(Debug)]
pub struct AttemptFailure {
    pub kind: FailureKind,
    pub error: ReelnoteError,
}

impl AttemptFailure {
    pub fn fatal(error: impl Into<ReelnoteError>) -> Self {
        Self {
            kind: FailureKind::Other,
            error: error.into(),
        }
    }

    pub fn from_ureq(error: ureq::Error) -> Self {
        match error {
            ureq::Error::Status(status, response) => {
                let body = response.into_string().unwrap_or_default();
                let body: String = body.trim().chars().take(STATUS_BODY_LIMIT).collect();
                Self {
                    kind: FailureKind::Status(status),
                    error: ReelnoteError::HttpStatus { status, body },
                }
            }
            ureq::Error::Transport(transport) => Self {
                kind: classify_transport(&transport),
                error: ReelnoteError::Transport(transport.to_string()),
            },
        }
    }

    pub fn from_io(error: io::Error) -> Self {
        Self {
            kind: classify_io(&error),
            error: ReelnoteError::Transport(error.to_string()),
        }
    }
}

fn classify_transport(transport: &ureq::Transport) -> FailureKind {
    let message = transport.to_string().to_ascii_lowercase();
    if message.contains("timed out") || message.contains("timeout") {
        return FailureKind::Timeout;
    }
    match transport.kind() {
        ureq::ErrorKind::ConnectionFailed | ureq::ErrorKind::Dns | ureq::ErrorKind::Io => {
            FailureKind::Connection
        }
        _ => FailureKind::Other,
    }
}

fn classify_io(error: &io::Error) -> FailureKind {
    match error.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => FailureKind::Timeout,
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => FailureKind::Connection,
        _ => FailureKind::Other,
    }
}

/// Runs `op` up to `max_attempts` times. Cancellation is checked before every
/// attempt and during backoff.
pub fn run_with_retry<T, F>(
    max_attempts: u32,
    cancel: &CancelFlag,
    label: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> std::result::Result<T, AttemptFailure>,
{
    run_with_retry_and_sleep(max_attempts, cancel, label, &mut op, sleep_cancellable)
}

fn run_with_retry_and_sleep<T, F, S>(
    max_attempts: u32,
    cancel: &CancelFlag,
    label: &str,
    op: &mut F,
    mut sleep: S,
) -> Result<T>
where
    F: FnMut() -> std::result::Result<T, AttemptFailure> + ?Sized,
    S: FnMut(Duration, &CancelFlag) -> Result<()>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        cancel.check()?;
        match op() {
            Ok(value) => return Ok(value),
            Err(failure) if is_retryable(failure.kind) && attempt < max_attempts => {
                let delay = backoff_delay(attempt);
                info!(
                    "{} failed ({}), retrying in {}s (attempt {}/{})",
                    label,
                    failure.error,
                    delay.as_secs(),
                    attempt + 1,
                    max_attempts
                );
                sleep(delay, cancel)?;
                attempt += 1;
            }
            Err(failure) => return Err(failure.error),
        }
    }
}

fn sleep_cancellable(delay: Duration, cancel: &CancelFlag) -> Result<()> {
    let mut remaining = delay;
    while !remaining.is_zero() {
        cancel.check()?;
        let slice = remaining.min(SLEEP_SLICE);
        std::thread::sleep(slice);
        remaining -= slice;
    }
    cancel.check()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn timeout() -> AttemptFailure {
        AttemptFailure::from_io(io::Error::new(io::ErrorKind::TimedOut, "timed out"))
    }

    fn run<T>(
        max_attempts: u32,
        cancel: &CancelFlag,
        op: &mut dyn FnMut() -> std::result::Result<T, AttemptFailure>,
    ) -> (Result<T>, Vec<Duration>) {
        let slept = RefCell::new(Vec::new());
        let result = run_with_retry_and_sleep(max_attempts, cancel, "test", op, |d, _| {
            slept.borrow_mut().push(d);
            Ok(())
        });
        (result, slept.into_inner())
    }

    #[test]
    fn backoff_schedule_is_capped() {
        let delays: Vec<u64> = (1..=6).map(|n| backoff_delay(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 10, 10]);
    }

    #[test]
    fn only_transport_failures_are_retryable() {
        assert!(is_retryable(FailureKind::Timeout));
        assert!(is_retryable(FailureKind::Connection));
        assert!(!is_retryable(FailureKind::Status(503)));
        assert!(!is_retryable(FailureKind::Other));
    }

    #[test]
    fn io_errors_are_classified() {
        let reset = AttemptFailure::from_io(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert_eq!(reset.kind, FailureKind::Connection);
        let denied =
            AttemptFailure::from_io(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert_eq!(denied.kind, FailureKind::Other);
    }

    #[test]
    fn retries_timeouts_until_success() {
        let mut calls = 0;
        let (result, slept) = run(3, &CancelFlag::new(), &mut || {
            calls += 1;
            if calls < 3 {
                Err(timeout())
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
        assert_eq!(slept, vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let (result, slept) = run::<()>(3, &CancelFlag::new(), &mut || {
            calls += 1;
            Err(timeout())
        });
        assert!(matches!(result, Err(ReelnoteError::Transport(_))));
        assert_eq!(calls, 3);
        assert_eq!(slept.len(), 2);
    }

    #[test]
    fn status_failures_are_not_retried() {
        let mut calls = 0;
        let (result, slept) = run::<()>(3, &CancelFlag::new(), &mut || {
            calls += 1;
            Err(AttemptFailure {
                kind: FailureKind::Status(500),
                error: ReelnoteError::HttpStatus {
                    status: 500,
                    body: String::new(),
                },
            })
        });
        assert!(matches!(
            result,
            Err(ReelnoteError::HttpStatus { status: 500, .. })
        ));
        assert_eq!(calls, 1);
        assert!(slept.is_empty());
    }

    #[test]
    fn cancelled_flag_stops_before_first_attempt() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let mut calls = 0;
        let (result, _) = run(3, &cancel, &mut || {
            calls += 1;
            Ok(())
        });
        assert!(matches!(result, Err(ReelnoteError::Cancelled)));
        assert_eq!(calls, 0);
    }

    #[test]
    fn cancellable_sleep_returns_early() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        assert!(matches!(
            sleep_cancellable(Duration::from_secs(10), &cancel),
            Err(ReelnoteError::Cancelled)
        ));
    }
}
