//! Bulkhead (concurrency limit with a bounded wait queue).
//!
//! # Responsibilities
//! - Bound the number of provider calls executing at once
//! - Hold a bounded number of additional callers in a FIFO queue
//! - Reject callers beyond both limits immediately
//!
//! # Design Decisions
//! - Admission is a lock-free counter (running + queued) checked synchronously,
//!   so rejection never waits
//! - Execution slots come from a fair Tokio semaphore (FIFO queueing)
//! - Tickets and permits are RAII guards; every exit path releases them,
//!   including timeouts, errors and caller cancellation

use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::{Semaphore, SemaphorePermit};

/// The bulkhead has no free slot and no room in its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bulkhead full: {max_parallel} running and {max_queued} queued")]
pub struct BulkheadRejected {
    pub max_parallel: usize,
    pub max_queued: usize,
}

/// Concurrency limiter shared by all calls of one client.
#[derive(Debug)]
pub struct Bulkhead {
    max_parallel: usize,
    max_queued: usize,
    /// Callers admitted (running + waiting).
    admitted: AtomicUsize,
    slots: Semaphore,
}

impl Bulkhead {
    /// Create a bulkhead allowing `max_parallel` running and `max_queued` waiting calls.
    pub fn new(max_parallel: usize, max_queued: usize) -> Self {
        let max_parallel = max_parallel.max(1);
        Self {
            max_parallel,
            max_queued,
            admitted: AtomicUsize::new(0),
            slots: Semaphore::new(max_parallel),
        }
    }

    /// Try to admit a caller. Never waits.
    pub fn try_enter(&self) -> Result<BulkheadTicket<'_>, BulkheadRejected> {
        let capacity = self.max_parallel + self.max_queued;
        let mut prev = self.admitted.load(Ordering::Acquire);
        loop {
            if prev >= capacity {
                return Err(self.rejected());
            }
            match self.admitted.compare_exchange_weak(
                prev,
                prev + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(x) => prev = x,
            }
        }
        Ok(BulkheadTicket { bulkhead: self })
    }

    /// Calls currently holding an execution slot.
    pub fn in_flight(&self) -> usize {
        self.max_parallel - self.slots.available_permits()
    }

    /// Calls admitted but still waiting for a slot.
    pub fn queued(&self) -> usize {
        self.admitted
            .load(Ordering::Acquire)
            .saturating_sub(self.in_flight())
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    pub fn max_queued(&self) -> usize {
        self.max_queued
    }

    fn rejected(&self) -> BulkheadRejected {
        BulkheadRejected {
            max_parallel: self.max_parallel,
            max_queued: self.max_queued,
        }
    }
}

/// An admitted caller waiting for an execution slot.
#[derive(Debug)]
pub struct BulkheadTicket<'a> {
    bulkhead: &'a Bulkhead,
}

impl<'a> BulkheadTicket<'a> {
    /// Wait in the queue until an execution slot is free.
    pub async fn ready(self) -> Result<BulkheadPermit<'a>, BulkheadRejected> {
        let bulkhead: &'a Bulkhead = self.bulkhead;
        match bulkhead.slots.acquire().await {
            Ok(slot) => Ok(BulkheadPermit {
                _slot: slot,
                _ticket: self,
            }),
            // The semaphore is never closed; treat it as a rejection if it ever is.
            Err(_) => Err(bulkhead.rejected()),
        }
    }
}

impl Drop for BulkheadTicket<'_> {
    fn drop(&mut self) {
        self.bulkhead.admitted.fetch_sub(1, Ordering::AcqRel);
    }
}

/// An execution slot. Released on drop.
#[derive(Debug)]
pub struct BulkheadPermit<'a> {
    // Field order matters: the slot is returned before the admission count drops.
    _slot: SemaphorePermit<'a>,
    _ticket: BulkheadTicket<'a>,
}
