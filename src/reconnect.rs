use super::*;

/// How many consecutive failures a driver tolerates before giving up, and how
/// long it waits between attempts. A negative maximum retries forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_reconnects: i64,
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_reconnects: -1,
            delay: Duration::from_secs(5),
        }
    }
}

impl ReconnectPolicy {
    /// `failures` counts consecutive failed attempts, including the first
    /// connection.
    pub fn exhausted(&self, failures: u64) -> bool {
        u64::try_from(self.max_reconnects).is_ok_and(|max| failures > max)
    }

    /// Sleeps for the retry delay. Returns `false` if cancelled first.
    pub async fn wait(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = sleep(self.delay) => true,
        }
    }

    pub fn describe(&self, failures: u64) -> String {
        if self.max_reconnects < 0 {
            format!("{failures}/unlimited")
        } else {
            format!("{failures}/{}", self.max_reconnects)
        }
    }
}
