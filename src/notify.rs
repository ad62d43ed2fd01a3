use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How long a notification stays up when nobody dismisses it. Matches the
/// web client's toast timeout.
pub const AUTO_DISMISS: Duration = Duration::from_millis(4200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Success,
    Error,
}

/// Handle for dismissing a notification early. Tokens are monotonically
/// increasing and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(u64);

#[derive(Debug, Clone)]
pub struct Notification {
    pub token: Token,
    pub kind: Kind,
    pub title: String,
    pub detail: String,
    expires_at: Instant,
}

/// Short-lived, stacked, auto-dismissing messages.
///
/// Pure local timer state: expiry is evaluated lazily on read, so there is no
/// background task to cancel when a view goes away.
pub struct Notifier {
    ttl: Duration,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_token: u64,
    active: Vec<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_ttl(AUTO_DISMISS)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn notify(&self, kind: Kind, title: &str, detail: &str) -> Token {
        let mut inner = self.lock();
        let token = Token(inner.next_token);
        inner.next_token += 1;
        inner.active.push(Notification {
            token,
            kind,
            title: title.to_string(),
            detail: detail.to_string(),
            expires_at: Instant::now() + self.ttl,
        });
        token
    }

    pub fn success(&self, title: &str, detail: &str) -> Token {
        self.notify(Kind::Success, title, detail)
    }

    pub fn error(&self, title: &str, detail: &str) -> Token {
        self.notify(Kind::Error, title, detail)
    }

    /// Removes one notification; the rest of the stack is untouched.
    pub fn dismiss(&self, token: Token) {
        self.lock().active.retain(|n| n.token != token);
    }

    /// Live notifications in arrival order, pruning anything past its TTL.
    pub fn active(&self) -> Vec<Notification> {
        let mut inner = self.lock();
        let now = Instant::now();
        inner.active.retain(|n| n.expires_at > now);
        inner.active.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("notifier state poisoned")
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
