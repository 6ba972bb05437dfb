use crate::contact::Contact;
use tabled::{settings::Style, Table, Tabled};

/// One line of the contacts list
#[derive(Tabled)]
pub struct ContactRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Phone")]
    pub phone: String,
}

impl From<&Contact> for ContactRow {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id,
            name: contact.name().to_string(),
            phone: contact.fields.phone.clone().unwrap_or_default(),
        }
    }
}

/// Render contacts as a rounded table; empty input renders as an empty string
pub fn contact_table<'a>(contacts: impl IntoIterator<Item = &'a Contact>) -> String {
    let rows: Vec<ContactRow> = contacts.into_iter().map(ContactRow::from).collect();
    if rows.is_empty() {
        return String::new();
    }

    Table::new(&rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactFields;

    #[test]
    fn test_contact_table() {
        let contacts = vec![
            Contact::new(1, ContactFields::named("Ada")),
            Contact::new(2, ContactFields {
                phone: Some("555-0100".to_string()),
                ..ContactFields::named("Grace")
            }),
        ];

        let table = contact_table(&contacts);
        assert!(table.contains("Name"));
        assert!(table.contains("Ada"));
        assert!(table.contains("555-0100"));
        assert!(contact_table(&Vec::<Contact>::new()).is_empty());
    }
}
