//! Failure injection shared by the mocks.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use roadmate_core::BackendError;

/// Operation name to the error it should fail with.
///
/// Operation names are the trait method names (`"fetch_requests"`,
/// `"stk_push"`, ...). A fault stays armed until cleared.
#[derive(Debug, Default)]
pub struct Faults {
    armed: Mutex<HashMap<String, BackendError>>,
}

impl Faults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `operation` fail with `error` until cleared.
    pub fn fail(&self, operation: &str, error: BackendError) {
        lock(&self.armed).insert(operation.to_string(), error);
    }

    pub fn clear(&self, operation: &str) {
        lock(&self.armed).remove(operation);
    }

    /// The armed error for `operation`, if any.
    pub fn check(&self, operation: &str) -> Result<(), BackendError> {
        match lock(&self.armed).get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_stays_armed_until_cleared() {
        let faults = Faults::new();
        assert!(faults.check("stk_push").is_ok());

        faults.fail("stk_push", BackendError::Transport("down".to_string()));
        assert!(faults.check("stk_push").is_err());
        assert!(faults.check("stk_push").is_err());
        assert!(faults.check("fetch_requests").is_ok());

        faults.clear("stk_push");
        assert!(faults.check("stk_push").is_ok());
    }
}
