//! Initialization gate and lifecycle state tracking.
//!
//! The state sits behind a synchronous mutex so it can be read at any time,
//! including while initialization is in progress. A separate async mutex
//! serialises initialization so the schema runs at most once.

use std::{
  future::Future,
  sync::{Mutex, MutexGuard, PoisonError},
};

use census_core::StoreState;

use crate::{Error, Result};

pub struct Lifecycle {
  state: Mutex<StoreState>,
  init:  tokio::sync::Mutex<()>,
}

impl Default for Lifecycle {
  fn default() -> Self { Self::new() }
}

impl Lifecycle {
  pub fn new() -> Self {
    Self {
      state: Mutex::new(StoreState::Uninitialized),
      init:  tokio::sync::Mutex::new(()),
    }
  }

  fn lock(&self) -> MutexGuard<'_, StoreState> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn state(&self) -> StoreState { self.lock().clone() }

  /// Run `init` exactly once. Concurrent callers wait for the first one;
  /// once ready, later calls return immediately.
  pub async fn ensure_initialized<F, Fut>(&self, init: F) -> Result<()>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
  {
    if check(&self.lock())? {
      return Ok(());
    }

    let _guard = self.init.lock().await;
    {
      // Observe and claim under one guard; a close in between must stick.
      let mut state = self.lock();
      if check(&state)? {
        return Ok(());
      }
      *state = StoreState::Initializing;
    }
    let outcome = init().await;

    let mut state = self.lock();
    // A concurrent close wins over a late initialization result.
    if *state == StoreState::Closed {
      return Err(Error::Closed);
    }
    match outcome {
      Ok(()) => {
        *state = StoreState::Ready;
        Ok(())
      }
      Err(e) => {
        let reason = e.to_string();
        *state = StoreState::Failed { reason: reason.clone() };
        Err(Error::Initialization(reason))
      }
    }
  }

  /// Move to `Closed`. Returns `false` if the store was already closed.
  pub fn mark_closed(&self) -> bool {
    let mut state = self.lock();
    if *state == StoreState::Closed {
      return false;
    }
    *state = StoreState::Closed;
    true
  }
}

/// `Ok(true)` when ready, `Ok(false)` when initialization is still needed,
/// and an error when the store can never serve requests again.
fn check(state: &StoreState) -> Result<bool> {
  match state {
    StoreState::Ready => Ok(true),
    StoreState::Closed => Err(Error::Closed),
    StoreState::Failed { reason } => Err(Error::Initialization(reason.clone())),
    StoreState::Uninitialized | StoreState::Initializing => Ok(false),
  }
}
