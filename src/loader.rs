//! Background loading of contacts
//!
//! The provider API blocks on SQLite I/O. Interactive callers run it on
//! tokio's blocking pool through `load`, or keep a `ContactLoader` that
//! re-queries whenever its locator is notified and publishes the latest
//! rows on a watch channel.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use crate::{Error, Result};
use crate::contact::{Column, Contact};
use crate::locator::Locator;
use crate::observer::Subscription;
use crate::provider::ContactProvider;

/// Run one query off the calling task
pub async fn load(
    provider: Arc<ContactProvider>,
    locator: Locator,
    sort_key: Option<Column>,
) -> Result<Vec<Contact>> {
    tokio::task::spawn_blocking(move || provider.read(locator, sort_key))
        .await
        .map_err(|e| Error::Task(e.to_string()))?
}

/// Keeps the rows for one locator current.
///
/// Dropping the loader stops the reload task and releases its subscription.
pub struct ContactLoader {
    locator: Locator,
    rows: watch::Receiver<Arc<Vec<Contact>>>,
    subscription: Option<Subscription>,
    task: JoinHandle<()>,
}

impl ContactLoader {
    /// Subscribe to `locator`, load it once, then reload on every change.
    pub async fn start(
        provider: Arc<ContactProvider>,
        locator: Locator,
        sort_key: Option<Column>,
    ) -> Result<Self> {
        let (changed_tx, mut changed_rx) = mpsc::unbounded_channel();
        // Subscribed before the first load so no mutation falls in between.
        let subscription = provider.observers().subscribe(locator, move |event| {
            let _ = changed_tx.send(*event);
        });

        let initial = load(Arc::clone(&provider), locator, sort_key).await?;
        let (rows_tx, rows_rx) = watch::channel(Arc::new(initial));

        let task = tokio::spawn(async move {
            while changed_rx.recv().await.is_some() {
                // One reload covers a burst of notifications.
                while changed_rx.try_recv().is_ok() {}

                match load(Arc::clone(&provider), locator, sort_key).await {
                    Ok(rows) => {
                        if rows_tx.send(Arc::new(rows)).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("Reloading {} failed: {}", locator, e),
                }
            }
        });

        Ok(Self {
            locator,
            rows: rows_rx,
            subscription: Some(subscription),
            task,
        })
    }

    pub fn locator(&self) -> Locator {
        self.locator
    }

    /// Latest loaded rows
    pub fn rows(&self) -> Arc<Vec<Contact>> {
        self.rows.borrow().clone()
    }

    /// Wait for the next reload and return its rows
    pub async fn changed(&mut self) -> Result<Arc<Vec<Contact>>> {
        self.rows
            .changed()
            .await
            .map_err(|_| Error::Task(format!("loader for {} stopped", self.locator)))?;
        Ok(self.rows.borrow_and_update().clone())
    }

    /// Another receiver of the loaded rows
    pub fn watch(&self) -> watch::Receiver<Arc<Vec<Contact>>> {
        self.rows.clone()
    }
}

impl Drop for ContactLoader {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.release();
        }
        self.task.abort();
    }
}
