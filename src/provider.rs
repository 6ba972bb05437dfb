//! Contact provider - locator-addressed CRUD over the storage engine
//!
//! Every request names its target with a locator string:
//! - `query` accepts the collection or an item
//! - `insert` accepts only the collection and returns the new item's locator
//! - `update` and `delete` accept only an item
//!
//! Successful mutations notify observers after the write has been applied
//! and after the store lock is released, so observers may re-query from
//! inside their callback.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use crate::{Error, Result};
use crate::contact::{Column, Contact, ContactFields};
use crate::cursor::ContactCursor;
use crate::locator::{self, Locator, ResourceKind};
use crate::observer::{ChangeEvent, ChangeKind, ObserverRegistry, Subscription};
use crate::storage::ContactStore;

/// Request router and change notifier in front of a `ContactStore`.
///
/// Owns no persistent state of its own. Shareable across threads; store
/// access is serialized through one mutex.
pub struct ContactProvider {
    store: Mutex<ContactStore>,
    observers: ObserverRegistry,
}

impl ContactProvider {
    /// Wrap an opened store
    pub fn new(store: ContactStore) -> Self {
        Self {
            store: Mutex::new(store),
            observers: ObserverRegistry::new(),
        }
    }

    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(ContactStore::open(path)?))
    }

    /// Provider over an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(ContactStore::open_in_memory()?))
    }

    /// Classify a locator string
    pub fn resolve(&self, locator: &str) -> Result<ResourceKind> {
        locator::resolve(locator)
    }

    /// Read the collection or one item.
    ///
    /// The cursor is subscribed to `locator`: a collection cursor goes stale
    /// on any mutation, an item cursor only on mutations of that item.
    pub fn query(&self, locator: &str, sort_key: Option<Column>) -> Result<ContactCursor> {
        self.query_at(Locator::parse(locator)?, sort_key)
    }

    /// `query` for an already parsed locator
    pub fn query_at(&self, locator: Locator, sort_key: Option<Column>) -> Result<ContactCursor> {
        let rows = self.read(locator, sort_key)?;
        Ok(ContactCursor::new(locator, sort_key, rows, &self.observers))
    }

    /// Insert a contact through the collection locator.
    ///
    /// Returns the locator of the new item. Notifies collection observers.
    pub fn insert(&self, locator: &str, fields: &ContactFields) -> Result<Locator> {
        self.insert_at(Locator::parse(locator)?, fields)
    }

    /// `insert` for an already parsed locator
    pub fn insert_at(&self, locator: Locator, fields: &ContactFields) -> Result<Locator> {
        if locator.kind() != ResourceKind::Collection {
            return Err(Error::InvalidLocator(format!("cannot insert into {}", locator)));
        }

        let id = self.store().insert_row(fields)?;
        if id < 1 {
            return Err(Error::InsertFailed(format!("{} returned row id {}", locator, id)));
        }
        tracing::debug!("Inserted contact {}", id);

        self.observers
            .notify(&ChangeEvent::new(Locator::collection(), ChangeKind::Insert));
        Ok(Locator::item(id))
    }

    /// Replace all fields of one contact.
    ///
    /// Returns rows affected; 0 means no such contact and sends no
    /// notification.
    pub fn update(&self, locator: &str, fields: &ContactFields) -> Result<usize> {
        self.update_at(Locator::parse(locator)?, fields)
    }

    /// `update` for an already parsed locator
    pub fn update_at(&self, locator: Locator, fields: &ContactFields) -> Result<usize> {
        let id = Self::item_id(locator, "update")?;

        let updated = self.store().update_row(id, fields)?;
        tracing::debug!("Updated contact {} ({} row(s))", id, updated);

        if updated > 0 {
            self.observers
                .notify(&ChangeEvent::new(locator, ChangeKind::Update));
        }
        Ok(updated)
    }

    /// Delete one contact. Returns rows affected, notifying only when > 0.
    pub fn delete(&self, locator: &str) -> Result<usize> {
        self.delete_at(Locator::parse(locator)?)
    }

    /// `delete` for an already parsed locator
    pub fn delete_at(&self, locator: Locator) -> Result<usize> {
        let id = Self::item_id(locator, "delete")?;

        let deleted = self.store().delete_row(id)?;
        tracing::debug!("Deleted contact {} ({} row(s))", id, deleted);

        if deleted > 0 {
            self.observers
                .notify(&ChangeEvent::new(locator, ChangeKind::Delete));
        }
        Ok(deleted)
    }

    /// Register `on_change` for mutations at or beneath `locator`
    pub fn subscribe<F>(&self, locator: &str, on_change: F) -> Result<Subscription>
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let target = Locator::parse(locator)?;
        Ok(self.observers.subscribe(target, on_change))
    }

    /// The observer registry mutations are announced on
    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    /// Count all contacts
    pub fn count(&self) -> Result<usize> {
        self.store().count()
    }

    /// Read rows for a parsed locator without registering anything
    pub(crate) fn read(&self, locator: Locator, sort_key: Option<Column>) -> Result<Vec<Contact>> {
        let store = self.store();
        match locator.kind() {
            ResourceKind::Collection => store.query_rows(None, sort_key),
            ResourceKind::Item(id) => store.query_rows(Some(id), sort_key),
        }
    }

    fn item_id(locator: Locator, operation: &str) -> Result<i64> {
        match locator.kind() {
            ResourceKind::Item(id) => Ok(id),
            ResourceKind::Collection => Err(Error::InvalidLocator(format!(
                "cannot {} {}: an item locator is required",
                operation, locator
            ))),
        }
    }

    fn store(&self) -> MutexGuard<'_, ContactStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CONTACTS: &str = "content://addressbook/contacts";

    fn counting(provider: &ContactProvider, locator: &str) -> (Subscription, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let sub = provider
            .subscribe(locator, move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        (sub, count)
    }

    #[test]
    fn test_insert_returns_item_locator() {
        let provider = ContactProvider::open_in_memory().unwrap();
        let created = provider.insert(CONTACTS, &ContactFields::named("Ada")).unwrap();
        assert_eq!(created, Locator::item(1));

        let cursor = provider.query(&created.to_string(), None).unwrap();
        assert_eq!(cursor.len(), 1);
        assert_eq!(cursor.first().unwrap().name(), "Ada");
    }

    #[test]
    fn test_operations_reject_wrong_kind() {
        let provider = ContactProvider::open_in_memory().unwrap();
        let fields = ContactFields::named("Ada");

        assert!(matches!(
            provider.insert("content://addressbook/contacts/1", &fields),
            Err(Error::InvalidLocator(_))
        ));
        assert!(matches!(provider.update(CONTACTS, &fields), Err(Error::InvalidLocator(_))));
        assert!(matches!(provider.delete(CONTACTS), Err(Error::InvalidLocator(_))));
        assert_eq!(provider.count().unwrap(), 0);
    }

    #[test]
    fn test_malformed_locator_fails_everywhere() {
        let provider = ContactProvider::open_in_memory().unwrap();
        let fields = ContactFields::named("Ada");
        let bad = "content://addressbook/contacts/abc";

        assert!(matches!(provider.resolve(bad), Err(Error::InvalidLocator(_))));
        assert!(matches!(provider.query(bad, None), Err(Error::InvalidLocator(_))));
        assert!(matches!(provider.insert(bad, &fields), Err(Error::InvalidLocator(_))));
        assert!(matches!(provider.update(bad, &fields), Err(Error::InvalidLocator(_))));
        assert!(matches!(provider.delete(bad), Err(Error::InvalidLocator(_))));
        assert!(matches!(provider.subscribe(bad, |_| {}), Err(Error::InvalidLocator(_))));
    }

    #[test]
    fn test_insert_notifies_collection_only() {
        let provider = ContactProvider::open_in_memory().unwrap();
        let (_all, all_count) = counting(&provider, CONTACTS);
        let (_item, item_count) = counting(&provider, "content://addressbook/contacts/1");

        provider.insert(CONTACTS, &ContactFields::named("Ada")).unwrap();

        assert_eq!(all_count.load(Ordering::SeqCst), 1);
        assert_eq!(item_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_update_notifies_item_and_collection() {
        let provider = ContactProvider::open_in_memory().unwrap();
        let one = provider.insert(CONTACTS, &ContactFields::named("Ada")).unwrap();
        let two = provider.insert(CONTACTS, &ContactFields::named("Grace")).unwrap();

        let (_all, all_count) = counting(&provider, CONTACTS);
        let (_one, one_count) = counting(&provider, &one.to_string());
        let (_two, two_count) = counting(&provider, &two.to_string());

        assert_eq!(provider.update(&one.to_string(), &ContactFields::named("Ada L.")).unwrap(), 1);

        assert_eq!(all_count.load(Ordering::SeqCst), 1);
        assert_eq!(one_count.load(Ordering::SeqCst), 1);
        assert_eq!(two_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_rows_sends_nothing() {
        let provider = ContactProvider::open_in_memory().unwrap();
        let (_all, all_count) = counting(&provider, CONTACTS);
        let missing = "content://addressbook/contacts/42";

        assert_eq!(provider.update(missing, &ContactFields::named("x")).unwrap(), 0);
        assert_eq!(provider.delete(missing).unwrap(), 0);
        assert_eq!(all_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_negative_item_is_a_missing_row() {
        let provider = ContactProvider::open_in_memory().unwrap();
        let (_all, all_count) = counting(&provider, CONTACTS);
        let negative = "content://addressbook/contacts/-1";

        assert_eq!(provider.resolve(negative).unwrap(), ResourceKind::Item(-1));
        assert!(provider.query(negative, None).unwrap().is_empty());
        assert_eq!(provider.update(negative, &ContactFields::named("x")).unwrap(), 0);
        assert_eq!(provider.delete(negative).unwrap(), 0);
        assert_eq!(all_count.load(Ordering::SeqCst), 0);
    }

    /// Provider over a file whose table carries `triggers`, added from a
    /// second connection after the first contact was written.
    fn provider_with_triggers(dir: &tempfile::TempDir, triggers: &str) -> (ContactProvider, Locator) {
        let path = dir.path().join("contacts.db");
        let provider = ContactProvider::open(&path).unwrap();
        let ada = provider.insert(CONTACTS, &ContactFields::named("Ada")).unwrap();
        rusqlite::Connection::open(&path).unwrap().execute_batch(triggers).unwrap();
        (provider, ada)
    }

    #[test]
    fn test_failed_writes_send_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (provider, ada) = provider_with_triggers(
            &dir,
            "CREATE TRIGGER no_inserts BEFORE INSERT ON contacts BEGIN SELECT RAISE(ABORT, 'full'); END;
             CREATE TRIGGER no_updates BEFORE UPDATE ON contacts BEGIN SELECT RAISE(ABORT, 'locked'); END;
             CREATE TRIGGER no_deletes BEFORE DELETE ON contacts BEGIN SELECT RAISE(ABORT, 'locked'); END;",
        );
        let (_all, all_count) = counting(&provider, CONTACTS);
        let (_item, item_count) = counting(&provider, &ada.to_string());

        assert!(matches!(provider.insert(CONTACTS, &ContactFields::named("Grace")), Err(Error::Write(_))));
        assert!(matches!(provider.update(&ada.to_string(), &ContactFields::named("x")), Err(Error::Write(_))));
        assert!(matches!(provider.delete(&ada.to_string()), Err(Error::Write(_))));

        assert_eq!(all_count.load(Ordering::SeqCst), 0);
        assert_eq!(item_count.load(Ordering::SeqCst), 0);
        assert_eq!(provider.count().unwrap(), 1);
    }

    #[test]
    fn test_insert_without_row_is_insert_failed() {
        let dir = tempfile::tempdir().unwrap();
        let (provider, _) = provider_with_triggers(
            &dir,
            "CREATE TRIGGER drop_inserts BEFORE INSERT ON contacts BEGIN SELECT RAISE(IGNORE); END;",
        );
        let (_all, all_count) = counting(&provider, CONTACTS);

        let err = provider.insert(CONTACTS, &ContactFields::named("Grace")).unwrap_err();
        assert!(matches!(err, Error::InsertFailed(_)));
        assert_eq!(all_count.load(Ordering::SeqCst), 0);
        assert_eq!(provider.count().unwrap(), 1);
    }

    #[test]
    fn test_cursor_staleness() {
        let provider = ContactProvider::open_in_memory().unwrap();
        let one = provider.insert(CONTACTS, &ContactFields::named("Ada")).unwrap();
        let two = provider.insert(CONTACTS, &ContactFields::named("Grace")).unwrap();

        let mut all = provider.query(CONTACTS, Some(Column::Name)).unwrap();
        let item_one = provider.query(&one.to_string(), None).unwrap();
        assert!(!all.is_stale());

        provider.delete(&two.to_string()).unwrap();
        assert!(all.is_stale());
        assert!(!item_one.is_stale());

        all.requery(&provider).unwrap();
        assert!(!all.is_stale());
        assert_eq!(all.len(), 1);

        provider.update(&one.to_string(), &ContactFields::named("Ada L.")).unwrap();
        assert!(all.is_stale());
        assert!(item_one.is_stale());
    }

    #[test]
    fn test_closed_cursor_unsubscribes() {
        let provider = ContactProvider::open_in_memory().unwrap();
        let cursor = provider.query(CONTACTS, None).unwrap();
        assert_eq!(provider.observers().len(), 1);
        cursor.close();
        assert!(provider.observers().is_empty());
    }

    #[test]
    fn test_observer_can_requery_inside_callback() {
        let provider = Arc::new(ContactProvider::open_in_memory().unwrap());
        let seen = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&provider);
        let rows = Arc::clone(&seen);
        let _sub = provider
            .subscribe(CONTACTS, move |_| {
                if let Some(provider) = weak.upgrade() {
                    let cursor = provider.query(CONTACTS, None).unwrap();
                    rows.store(cursor.len(), Ordering::SeqCst);
                }
            })
            .unwrap();

        provider.insert(CONTACTS, &ContactFields::named("Ada")).unwrap();
        provider.insert(CONTACTS, &ContactFields::named("Grace")).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_inserts_get_distinct_ids() {
        let provider = Arc::new(ContactProvider::open_in_memory().unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let provider = Arc::clone(&provider);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|i| {
                            provider
                                .insert(CONTACTS, &ContactFields::named(format!("{}-{}", t, i)))
                                .unwrap()
                                .id()
                                .unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<i64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&200));
    }
}
