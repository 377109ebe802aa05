//! In-flight request tracking shared by the state containers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Result of an operation whose response may arrive after a newer request
/// of the same kind was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update<T> {
    Applied(T),
    /// A newer request was issued meanwhile; the response was dropped.
    Superseded,
}

impl<T> Update<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Update::Applied(value) => Some(value),
            Update::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Update::Superseded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Monotonic counter; only the holder of the latest ticket may write.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    pub fn issue(&self) -> Ticket {
        Ticket(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.0.load(Ordering::SeqCst) == ticket.0
    }

    /// Makes every ticket issued so far stale.
    pub fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

// A panic while holding the lock leaves plain data behind, so poisoning is ignored.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
