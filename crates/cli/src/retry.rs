//! Reconnect policy for the line protocol client.
//!
//! The server may still be loading its catalog when the client starts, so
//! connecting retries on a fixed delay. The wait itself goes through a
//! [`Sleeper`] so tests can run the loop without real time passing.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// `None` retries forever
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retry forever with a constant delay between attempts
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    fn exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt >= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RETRY_DELAY)
    }
}

pub trait Sleeper {
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(delay)
    }
}

/// Call `connect` until it succeeds or the policy gives up.
///
/// Every failure is logged. With an unbounded policy this only returns once
/// a connection is made; with a bound it returns the last error.
pub async fn connect_with_retry<F, Fut, T, E>(
    mut connect: F,
    policy: &RetryPolicy,
    sleeper: &impl Sleeper,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match connect().await {
            Ok(conn) => return Ok(conn),
            Err(e) if policy.exhausted(attempt) => {
                return Err(anyhow::Error::new(e).context(format!(
                    "Failed to connect after {} attempts",
                    attempt
                )));
            }
            Err(e) => {
                warn!(
                    attempt,
                    "Failed to connect to server ({}), retrying in {:?}", e, policy.delay
                );
                sleeper.sleep(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Returns immediately and remembers every requested delay
    #[derive(Default)]
    struct RecordingSleeper {
        delays: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        fn delays(&self) -> Vec<Duration> {
            self.delays.lock().unwrap().clone()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, delay: Duration) -> impl Future<Output = ()> + Send {
            self.delays.lock().unwrap().push(delay);
            std::future::ready(())
        }
    }

    fn refused() -> io::Error {
        io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused")
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let sleeper = RecordingSleeper::default();
        let mut calls = 0;

        let conn = connect_with_retry(
            || {
                calls += 1;
                let result = if calls < 3 { Err(refused()) } else { Ok(calls) };
                async move { result }
            },
            &RetryPolicy::default(),
            &sleeper,
        )
        .await
        .unwrap();

        assert_eq!(conn, 3);
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(3); 2]);
    }

    #[tokio::test]
    async fn test_first_attempt_success_never_sleeps() {
        let sleeper = RecordingSleeper::default();

        let conn = connect_with_retry(
            || async { Ok::<_, io::Error>("connected") },
            &RetryPolicy::fixed(Duration::from_millis(10)),
            &sleeper,
        )
        .await
        .unwrap();

        assert_eq!(conn, "connected");
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_bounded_policy_gives_up() {
        let sleeper = RecordingSleeper::default();
        let mut calls = 0;
        let policy = RetryPolicy::fixed(Duration::from_millis(250)).with_max_attempts(Some(4));

        let result: Result<()> = connect_with_retry(
            || {
                calls += 1;
                async { Err(refused()) }
            },
            &policy,
            &sleeper,
        )
        .await;

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("after 4 attempts"));
        assert_eq!(calls, 4);
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(250); 3]);
    }

    #[tokio::test]
    async fn test_connects_once_server_appears() {
        // Reserve a port, then release it so the first attempts are refused
        let probe = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = probe.local_addr().unwrap();
        drop(probe);

        let listener: Arc<Mutex<Option<std::net::TcpListener>>> = Arc::default();
        let slot = listener.clone();
        let sleeper = RecordingSleeper::default();
        let mut attempts = 0;

        let stream = connect_with_retry(
            || {
                attempts += 1;
                if attempts == 2 {
                    *slot.lock().unwrap() = Some(std::net::TcpListener::bind(addr).unwrap());
                }
                tokio::net::TcpStream::connect(addr)
            },
            &RetryPolicy::fixed(Duration::from_secs(1)).with_max_attempts(Some(5)),
            &sleeper,
        )
        .await
        .unwrap();

        assert_eq!(stream.peer_addr().unwrap(), addr);
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(1)]);
    }
}
