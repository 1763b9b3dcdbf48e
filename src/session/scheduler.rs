// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Proactive renewal of the access credential
//!
//! When a credential is obtained its expiry is read from the payload and a
//! single tokio task is armed to renew it `lead` seconds before it expires.
//! Arming a new renewal always aborts the previous one, so at most one
//! renewal is ever pending. Credentials without a readable expiry arm
//! nothing: they are only renewed reactively, after a 401.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;

use crate::utility::decode_credential;

/// Delay before a renewal must fire.
///
/// The renewal fires `lead_secs` before `exp`, clamped to "now" for
/// credentials that are about to expire or already expired.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use turbo_badges::session::scheduler::renewal_delay;
///
/// assert_eq!(renewal_delay(1_200, 1_000, 60), Duration::from_secs(140));
/// assert_eq!(renewal_delay(990, 1_000, 60), Duration::ZERO);
/// ```
pub fn renewal_delay(exp: i64, now: i64, lead_secs: i64) -> Duration {
    let seconds = exp.saturating_sub(now).saturating_sub(lead_secs);
    Duration::from_secs(seconds.max(0) as u64)
}

struct PendingRenewal {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Owner of the one outstanding renewal timer of a session
pub struct RenewalScheduler {
    lead_secs: i64,
    generation: AtomicU64,
    pending: Arc<Mutex<Option<PendingRenewal>>>,
}

fn lock_slot(slot: &Mutex<Option<PendingRenewal>>) -> MutexGuard<'_, Option<PendingRenewal>> {
    // A poisoned slot still holds a valid handle
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RenewalScheduler {
    pub fn new(lead_secs: i64) -> Self {
        Self {
            lead_secs,
            generation: AtomicU64::new(0),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    pub fn lead_secs(&self) -> i64 {
        self.lead_secs
    }

    /// Arm `renew` to run once before `credential` expires.
    ///
    /// Any previously armed renewal is cancelled first. Returns the delay of
    /// the armed timer, or `None` when the credential carries no expiry and
    /// nothing was armed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, credential: &str, now: i64, renew: F) -> Option<Duration>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let exp = decode_credential(credential).exp;

        // Cancel and re-arm under one lock so concurrent calls leave one timer
        let mut pending = lock_slot(&self.pending);

        let exp = match exp {
            Some(exp) => exp,
            None => {
                if let Some(previous) = pending.take() {
                    previous.handle.abort();
                }
                debug!("Credential carries no expiry, no renewal scheduled");
                return None;
            }
        };

        let delay = renewal_delay(exp, now, self.lead_secs);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let slot = Arc::clone(&self.pending);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Release the slot before renewing: the renewal re-arms the
            // scheduler and must not abort the task running it.
            {
                let mut pending = lock_slot(&slot);
                if pending
                    .as_ref()
                    .is_some_and(|current| current.generation == generation)
                {
                    pending.take();
                }
            }

            debug!("Renewal timer fired");
            renew.await;
        });

        if let Some(previous) = pending.replace(PendingRenewal { generation, handle }) {
            previous.handle.abort();
            debug!("Previous credential renewal replaced");
        }

        debug!("Credential renewal scheduled in {}s", delay.as_secs());
        Some(delay)
    }

    /// Cancel the pending renewal, if any. Returns true when one was cancelled.
    pub fn cancel(&self) -> bool {
        match lock_slot(&self.pending).take() {
            Some(previous) => {
                previous.handle.abort();
                debug!("Pending credential renewal cancelled");
                true
            }
            None => false,
        }
    }

    /// True while a renewal is armed and has not fired yet
    pub fn is_pending(&self) -> bool {
        lock_slot(&self.pending)
            .as_ref()
            .is_some_and(|pending| !pending.handle.is_finished())
    }
}

impl Drop for RenewalScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
