//! The signed-in mechanic, shared across the application.
//!
//! There is exactly one [`ProfileWriter`], owned by the login/logout flow.
//! Everything else holds a [`ProfileReader`], which can be cloned freely
//! and observes every change the writer makes.

use tokio::sync::watch;
use tracing::info;

use crate::model::Mechanic;

/// Constructor for the writer/reader pair.
#[derive(Debug)]
pub struct ProfileStore;

impl ProfileStore {
    /// Create an empty store (nobody signed in).
    pub fn channel() -> (ProfileWriter, ProfileReader) {
        let (tx, rx) = watch::channel(None);
        (ProfileWriter { tx }, ProfileReader { rx })
    }
}

/// Sole writer of the profile store. Not clonable.
#[derive(Debug)]
pub struct ProfileWriter {
    tx: watch::Sender<Option<Mechanic>>,
}

impl ProfileWriter {
    /// Record the mechanic returned by a successful login.
    pub fn sign_in(&mut self, mechanic: Mechanic) {
        info!(mechanic_id = %mechanic.id, "Mechanic signed in");
        self.tx.send_replace(Some(mechanic));
    }

    /// Clear the store, returning the mechanic that was signed in.
    pub fn sign_out(&mut self) -> Option<Mechanic> {
        let previous = self.tx.send_replace(None);
        if let Some(ref m) = previous {
            info!(mechanic_id = %m.id, "Mechanic signed out");
        }
        previous
    }

    /// Update the online flag. Returns whether anything changed.
    pub fn set_online(&mut self, online: bool) -> bool {
        self.tx.send_if_modified(|current| match current {
            Some(mechanic) if mechanic.online != online => {
                mechanic.online = online;
                true
            }
            _ => false,
        })
    }

    /// Another reader on the same store.
    pub fn reader(&self) -> ProfileReader {
        ProfileReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only view of the profile store.
#[derive(Debug, Clone)]
pub struct ProfileReader {
    rx: watch::Receiver<Option<Mechanic>>,
}

impl ProfileReader {
    /// Snapshot of the signed-in mechanic.
    pub fn current(&self) -> Option<Mechanic> {
        self.rx.borrow().clone()
    }

    /// Identifier of the signed-in mechanic.
    pub fn mechanic_id(&self) -> Option<String> {
        self.rx.borrow().as_ref().map(|m| m.id.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Wait for the next change. Returns `false` once the writer is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
