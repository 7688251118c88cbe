use std::time::{Duration, Instant};

/// Default delay before a "no results" notification fires after the last
/// query change.
pub const NO_MATCH_DELAY: Duration = Duration::from_millis(1000);

/// Identifies one scheduled notification. A newer schedule invalidates every
/// earlier token, so only the most recent one can ever fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeToken(u64);

#[derive(Debug, Clone, Copy)]
struct Pending {
    token: NoticeToken,
    due_at: Instant,
}

/// Single-slot cancelable timer used to debounce user-visible notifications.
///
/// The host event loop drives it: `schedule` on every triggering event,
/// `poll` on every tick. At most one notification is pending at a time, and
/// a pending notification fires at most once.
#[derive(Debug)]
pub struct NoticeTimer {
    delay: Duration,
    next_token: u64,
    pending: Option<Pending>,
}

impl NoticeTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_token: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Schedules a notification `delay` from `now`, superseding any pending
    /// one. Returns the token that will fire if nothing else is scheduled.
    pub fn schedule(&mut self, now: Instant) -> NoticeToken {
        let token = NoticeToken(self.next_token);
        self.next_token += 1;
        self.pending = Some(Pending {
            token,
            due_at: now + self.delay,
        });
        token
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Fires the pending notification if its deadline has passed. Consumes
    /// the slot, so a given token is returned at most once.
    pub fn poll(&mut self, now: Instant) -> Option<NoticeToken> {
        let pending = self.pending?;
        if now < pending.due_at {
            return None;
        }
        self.pending = None;
        Some(pending.token)
    }
}

impl Default for NoticeTimer {
    fn default() -> Self {
        Self::new(NO_MATCH_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn does_not_fire_before_the_delay() {
        let mut timer = NoticeTimer::new(Duration::from_millis(1000));
        let start = Instant::now();
        timer.schedule(start);
        assert_eq!(timer.poll(start), None);
        assert_eq!(timer.poll(start + Duration::from_millis(999)), None);
        assert!(timer.is_pending());
    }

    #[test]
    fn fires_exactly_once_after_the_delay() {
        let mut timer = NoticeTimer::new(Duration::from_millis(1000));
        let start = Instant::now();
        let token = timer.schedule(start);
        let fired = timer.poll(start + Duration::from_millis(1000));
        assert_eq!(fired, Some(token));
        assert_eq!(timer.poll(start + Duration::from_secs(10)), None);
        assert!(!timer.is_pending());
    }

    #[test]
    fn rescheduling_invalidates_the_previous_token() {
        let mut timer = NoticeTimer::new(Duration::from_millis(1000));
        let start = Instant::now();
        let first = timer.schedule(start);
        let second = timer.schedule(start + Duration::from_millis(500));

        // The first deadline passes, but only the most recent schedule may
        // ever fire.
        assert_eq!(timer.poll(start + Duration::from_millis(1200)), None);

        let fired = timer.poll(start + Duration::from_millis(1500));
        assert_eq!(fired, Some(second));
        assert_ne!(first, second);
    }

    #[test]
    fn cancel_drops_the_pending_notification() {
        let mut timer = NoticeTimer::new(Duration::from_millis(100));
        let start = Instant::now();
        timer.schedule(start);
        timer.cancel();
        assert_eq!(timer.poll(start + Duration::from_secs(1)), None);
    }
}
