//! Single-run trigger.
//!
//! A front end disables its "run" control while a pipeline run is active and
//! enables it again whatever the outcome. [`Trigger`] models that control:
//! [`Trigger::try_begin`] hands out at most one [`RunGuard`], and dropping the
//! guard re-enables the trigger.

use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;

use crate::datasets::DatasetBackend;
use crate::error::{AohError, Result};
use crate::pipeline;
use crate::types::{Provisioned, ValidationRequest};

/// Guards against overlapping runs from the same session.
#[derive(Debug)]
pub struct Trigger {
    enabled: AtomicBool,
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new()
    }
}

impl Trigger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
        }
    }

    /// `true` when no run is active.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Disables the trigger for the lifetime of the returned guard.
    ///
    /// Returns `None` if a run is already active.
    #[must_use]
    pub fn try_begin(&self) -> Option<RunGuard<'_>> {
        self.enabled
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard { trigger: self })
    }

    /// Runs the pipeline while holding the trigger.
    ///
    /// # Errors
    ///
    /// Returns [`AohError::RunInProgress`] if another run holds the trigger,
    /// otherwise whatever [`pipeline::run`] returns.
    pub fn run<B>(&self, backend: &B, request: &ValidationRequest) -> Result<Provisioned>
    where
        B: DatasetBackend + ?Sized,
    {
        let Some(_guard) = self.try_begin() else {
            warn!("Ignoring run request while another run is active");
            return Err(AohError::RunInProgress);
        };
        pipeline::run(backend, request)
    }
}

/// Keeps the trigger disabled until dropped.
#[derive(Debug)]
pub struct RunGuard<'a> {
    trigger: &'a Trigger,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.trigger.enabled.store(true, Ordering::Release);
    }
}
