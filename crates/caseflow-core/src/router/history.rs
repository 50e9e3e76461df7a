//! Navigation surface: where the application currently is and how it got there.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// Something that can move the application to another location.
///
/// The session store and the HTTP pipeline only ever navigate to the login
/// view; they depend on this trait instead of on the router.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

#[derive(Debug, Default)]
struct HistoryInner {
    current: Option<String>,
    entries: Vec<String>,
}

/// Ordered log of committed locations.
#[derive(Debug, Default)]
pub struct History {
    inner: Mutex<HistoryInner>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HistoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> Option<String> {
        self.lock().current.clone()
    }

    /// Every committed location, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.lock().entries.clone()
    }

    /// Number of navigations so far. A change between two reads means some
    /// other flow navigated in between.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn commit(&self, path: &str) {
        let mut inner = self.lock();
        inner.current = Some(path.to_string());
        inner.entries.push(path.to_string());
        debug!(path, "Navigated");
    }
}

impl Navigator for History {
    fn navigate(&self, path: &str) {
        self.commit(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_records_in_order() {
        let history = History::new();
        assert!(history.is_empty());
        assert_eq!(history.current(), None);

        history.navigate("/login");
        history.navigate("/projects");
        assert_eq!(history.current().as_deref(), Some("/projects"));
        assert_eq!(history.entries(), vec!["/login", "/projects"]);
        assert_eq!(history.len(), 2);
    }
}
