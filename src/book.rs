//! AddressBook - the interface presentation code works against
//!
//! Thin id-based wrapper over `ContactProvider`: builds locators, maps
//! rows-affected counts to booleans, and keeps the sort convention used by
//! the contacts list (name, case-insensitive, ascending).

use std::path::Path;
use std::sync::Arc;
use crate::{Error, Result};
use crate::contact::{Column, Contact, ContactFields};
use crate::cursor::ContactCursor;
use crate::locator::Locator;
use crate::observer::{ChangeEvent, Subscription};
use crate::provider::ContactProvider;

/// Contacts address book backed by a shared provider
#[derive(Clone)]
pub struct AddressBook {
    provider: Arc<ContactProvider>,
}

impl AddressBook {
    pub fn new(provider: Arc<ContactProvider>) -> Self {
        Self { provider }
    }

    /// Open (or create) the address book stored at `path`
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Arc::new(ContactProvider::open(path)?)))
    }

    /// In-memory address book (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Arc::new(ContactProvider::open_in_memory()?)))
    }

    /// The provider behind this book
    pub fn provider(&self) -> &Arc<ContactProvider> {
        &self.provider
    }

    /// All contacts, optionally sorted by name (case-insensitive ascending).
    ///
    /// The cursor goes stale after any mutation of the table.
    pub fn list(&self, sort_by_name: bool) -> Result<ContactCursor> {
        let sort_key = sort_by_name.then_some(Column::Name);
        self.provider.query_at(Locator::collection(), sort_key)
    }

    /// All contacts ordered by an arbitrary column
    pub fn list_sorted_by(&self, column: Column) -> Result<ContactCursor> {
        self.provider.query_at(Locator::collection(), Some(column))
    }

    /// One contact, or `None` when no contact has `id`
    pub fn get(&self, id: i64) -> Result<Option<Contact>> {
        let cursor = self.provider.query_at(Locator::item(id), None)?;
        Ok(cursor.into_rows().into_iter().next())
    }

    /// Create a contact and return its new id
    pub fn create(&self, fields: &ContactFields) -> Result<i64> {
        let created = self.provider.insert_at(Locator::collection(), fields)?;
        created
            .id()
            .ok_or_else(|| Error::InsertFailed(format!("{} is not an item locator", created)))
    }

    /// Replace every field of contact `id`.
    ///
    /// Fields left `None` are cleared. Returns `false` when no contact has `id`.
    pub fn save(&self, id: i64, fields: &ContactFields) -> Result<bool> {
        let updated = self.provider.update_at(Locator::item(id), fields)?;
        Ok(updated > 0)
    }

    /// Delete contact `id`. Returns `false` when no contact has `id`.
    ///
    /// Any confirmation step belongs to the caller and happens before this.
    pub fn remove(&self, id: i64) -> Result<bool> {
        let deleted = self.provider.delete_at(Locator::item(id))?;
        Ok(deleted > 0)
    }

    /// Watch a locator for changes
    pub fn subscribe<F>(&self, locator: &Locator, on_change: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.provider.observers().subscribe(*locator, on_change)
    }

    /// Stop watching. Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        subscription.release()
    }

    /// Number of stored contacts
    pub fn count(&self) -> Result<usize> {
        self.provider.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn full_fields(name: &str) -> ContactFields {
        ContactFields {
            name: Some(name.to_string()),
            phone: Some("555-0199".to_string()),
            email: Some("someone@example.com".to_string()),
            street: Some("1 Main St".to_string()),
            city: Some("Boston".to_string()),
            state: Some("MA".to_string()),
            zip: Some("02101".to_string()),
        }
    }

    #[test]
    fn test_create_then_get() {
        let book = AddressBook::open_in_memory().unwrap();
        let id = book.create(&full_fields("Ada")).unwrap();

        let contact = book.get(id).unwrap().unwrap();
        assert_eq!(contact, Contact::new(id, full_fields("Ada")));
    }

    #[test]
    fn test_save_replaces_every_field() {
        let book = AddressBook::open_in_memory().unwrap();
        let id = book.create(&full_fields("Ada")).unwrap();

        let replacement = ContactFields {
            phone: Some(String::new()),
            ..ContactFields::named("Ada Lovelace")
        };
        assert!(book.save(id, &replacement).unwrap());

        let contact = book.get(id).unwrap().unwrap();
        assert_eq!(contact.fields, replacement);
        assert_eq!(contact.fields.city, None);
    }

    #[test]
    fn test_save_and_remove_missing() {
        let book = AddressBook::open_in_memory().unwrap();
        assert!(!book.save(7, &full_fields("Ghost")).unwrap());
        assert!(!book.remove(7).unwrap());
        assert!(book.get(7).unwrap().is_none());
    }

    #[test]
    fn test_ids_below_one_are_not_found() {
        let book = AddressBook::open_in_memory().unwrap();
        book.create(&full_fields("Ada")).unwrap();

        for id in [0, -1, i64::MIN] {
            assert!(book.get(id).unwrap().is_none());
            assert!(!book.save(id, &full_fields("Ghost")).unwrap());
            assert!(!book.remove(id).unwrap());
        }
        assert_eq!(book.count().unwrap(), 1);
    }

    #[test]
    fn test_remove() {
        let book = AddressBook::open_in_memory().unwrap();
        let keep = book.create(&full_fields("Ada")).unwrap();
        let gone = book.create(&full_fields("Grace")).unwrap();

        assert!(book.remove(gone).unwrap());
        assert!(book.get(gone).unwrap().is_none());

        let ids: Vec<i64> = book.list(true).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![keep]);
    }

    #[test]
    fn test_list_sorted_by_name() {
        let book = AddressBook::open_in_memory().unwrap();
        for name in ["bob", "Alice", "carol"] {
            book.create(&ContactFields::named(name)).unwrap();
        }

        let names: Vec<String> = book.list(true).unwrap().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["Alice", "bob", "carol"]);
        assert_eq!(book.list(false).unwrap().len(), 3);
    }

    #[test]
    fn test_subscribers_get_one_notification_per_mutation() {
        let book = AddressBook::open_in_memory().unwrap();
        let first = book.create(&ContactFields::named("Ada")).unwrap();
        let second = book.create(&ContactFields::named("Grace")).unwrap();

        let all = Arc::new(AtomicUsize::new(0));
        let other = Arc::new(AtomicUsize::new(0));
        let all_seen = Arc::clone(&all);
        let other_seen = Arc::clone(&other);
        let all_sub = book.subscribe(&Locator::collection(), move |_| {
            all_seen.fetch_add(1, Ordering::SeqCst);
        });
        let other_sub = book.subscribe(&Locator::item(second), move |_| {
            other_seen.fetch_add(1, Ordering::SeqCst);
        });

        book.create(&ContactFields::named("Edsger")).unwrap();
        assert_eq!(all.load(Ordering::SeqCst), 1);
        book.save(first, &ContactFields::named("Ada L.")).unwrap();
        assert_eq!(all.load(Ordering::SeqCst), 2);
        book.remove(first).unwrap();
        assert_eq!(all.load(Ordering::SeqCst), 3);
        assert_eq!(other.load(Ordering::SeqCst), 0);

        assert!(book.unsubscribe(all_sub));
        book.remove(second).unwrap();
        assert_eq!(all.load(Ordering::SeqCst), 3);
        assert_eq!(other.load(Ordering::SeqCst), 1);
        drop(other_sub);
    }
}
