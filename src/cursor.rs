//! Result sets returned by queries
//!
//! A cursor holds the rows of one query together with a subscription on the
//! queried locator. Any change notification for that locator marks the
//! cursor stale; `requery` fetches fresh rows.

use crate::contact::{Column, Contact};
use crate::locator::Locator;
use crate::observer::{ObserverRegistry, Subscription};
use crate::provider::ContactProvider;
use crate::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Rows of a query plus staleness tracking
#[derive(Debug)]
pub struct ContactCursor {
    locator: Locator,
    sort_key: Option<Column>,
    rows: Vec<Contact>,
    stale: Arc<AtomicBool>,
    subscription: Subscription,
}

impl ContactCursor {
    pub(crate) fn new(
        locator: Locator,
        sort_key: Option<Column>,
        rows: Vec<Contact>,
        observers: &ObserverRegistry,
    ) -> Self {
        let stale = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stale);
        let subscription = observers.subscribe(locator, move |_| {
            flag.store(true, Ordering::Release);
        });

        Self {
            locator,
            sort_key,
            rows,
            stale,
            subscription,
        }
    }

    /// Locator this cursor was queried with
    pub fn locator(&self) -> Locator {
        self.locator
    }

    pub fn sort_key(&self) -> Option<Column> {
        self.sort_key
    }

    pub fn rows(&self) -> &[Contact] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&Contact> {
        self.rows.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contact> {
        self.rows.iter()
    }

    /// True once a mutation covered by this cursor's locator has happened
    /// since the rows were read.
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    /// Re-read the rows through `provider`, keeping the same subscription.
    pub fn requery(&mut self, provider: &ContactProvider) -> Result<()> {
        // Cleared before reading so a change racing the read leaves it set.
        self.stale.store(false, Ordering::Release);
        match provider.read(self.locator, self.sort_key) {
            Ok(rows) => {
                self.rows = rows;
                Ok(())
            }
            Err(e) => {
                self.stale.store(true, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Release the subscription and keep the rows
    pub fn into_rows(self) -> Vec<Contact> {
        let Self { rows, subscription, .. } = self;
        subscription.release();
        rows
    }

    /// Release the subscription
    pub fn close(self) {
        self.subscription.release();
    }
}

impl<'a> IntoIterator for &'a ContactCursor {
    type Item = &'a Contact;
    type IntoIter = std::slice::Iter<'a, Contact>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
