#[cfg(test)]
#[path = "timer_test.rs"]
mod tests;

use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::domain::models::Event;

const TICK: time::Duration = time::Duration::from_secs(1);

/// Single-shot countdown for the active question. Each `start` replaces the
/// previous countdown; a cancelled countdown never fires.
pub struct RoundTimer {
    duration: u64,
    token: Option<CancellationToken>,
}

impl RoundTimer {
    pub fn new(duration: u64) -> RoundTimer {
        return RoundTimer {
            duration,
            token: None,
        };
    }

    pub fn duration(&self) -> u64 {
        return self.duration;
    }

    /// Sends a `TimerTick` every second and a single `TimerExpired` once the
    /// countdown reaches zero.
    pub fn start(&mut self, epoch: u64, round_index: usize, tx: mpsc::UnboundedSender<Event>) {
        self.cancel();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let duration = self.duration;

        tokio::spawn(async move {
            let mut remaining = duration;
            while remaining > 0 {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => return,
                    _ = time::sleep(TICK) => {}
                }

                remaining -= 1;
                let event = if remaining == 0 {
                    Event::TimerExpired { epoch, round_index }
                } else {
                    Event::TimerTick {
                        epoch,
                        round_index,
                        remaining,
                    }
                };

                if tx.send(event).is_err() {
                    return;
                }
            }
        });

        tracing::debug!(round = round_index, seconds = duration, "Timer started");
        self.token = Some(token);
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
