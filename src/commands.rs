use crate::{OutputMode, emit_success};
use addressbook::config::{self, AddressBookConfig};
use addressbook::ui::{self, Icons, contact_table, detail_row, section, success};
use addressbook::{AddressBook, Column, Contact, ContactFields, Locator};
use std::path::Path;

/// Contact fields accepted by `add` and `edit`
#[derive(clap::Args, Debug, Default)]
pub struct FieldArgs {
    /// Contact name (required to be non-blank)
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub street: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub zip: Option<String>,
}

impl FieldArgs {
    /// Overlay the given flags onto `fields`; flags not given leave values alone
    pub fn apply_to(self, fields: &mut ContactFields) {
        let given = [
            (Column::Name, self.name),
            (Column::Phone, self.phone),
            (Column::Email, self.email),
            (Column::Street, self.street),
            (Column::City, self.city),
            (Column::State, self.state),
            (Column::Zip, self.zip),
        ];
        for (column, value) in given {
            if value.is_some() {
                fields.set(column, value);
            }
        }
    }
}

pub fn run_init(
    output_mode: OutputMode,
    config_path: &Path,
    database: Option<&Path>,
    cwd: &Path,
    force: bool,
) -> anyhow::Result<()> {
    let database = database
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config::default_database_path_in(Path::new("")));
    let config = AddressBookConfig {
        database: Some(database.to_string_lossy().to_string()),
    };
    config::write_config(config_path, &config, force)?;

    let resolved = config::resolve_database_path(None, Some(&config), config_path, cwd);
    AddressBook::open(&resolved)?;

    if output_mode.is_human() {
        success(&format!("Wrote {}", config_path.display()));
        println!("{} Database: {}", Icons::DATABASE, resolved.display());
    } else {
        let data = serde_json::json!({
            "config": config_path.display().to_string(),
            "database": resolved.display().to_string(),
        });
        emit_success(output_mode, "init", data)?;
    }
    Ok(())
}

pub fn run_list(book: &AddressBook, output_mode: OutputMode, sort_key: Option<Column>) -> anyhow::Result<()> {
    let cursor = match sort_key {
        Some(column) => book.list_sorted_by(column)?,
        None => book.list(false)?,
    };

    if output_mode.is_human() {
        ui::header(Icons::BOOK, &format!("Contacts ({})", cursor.len()));
        if cursor.is_empty() {
            println!("{} {}", Icons::EMPTY, ui::muted("No contacts yet. Add one with `addressbook add --name <NAME>`."));
        } else {
            println!("{}", contact_table(&cursor));
        }
    } else {
        emit_success(output_mode, "list", serde_json::to_value(cursor.rows())?)?;
    }
    Ok(())
}

pub fn run_show(book: &AddressBook, output_mode: OutputMode, id: i64) -> anyhow::Result<()> {
    let Some(contact) = book.get(id)? else {
        anyhow::bail!("No contact with id {}", id);
    };

    if output_mode.is_human() {
        print_contact(&contact);
    } else {
        emit_success(output_mode, "show", serde_json::to_value(&contact)?)?;
    }
    Ok(())
}

pub fn run_add(book: &AddressBook, output_mode: OutputMode, args: FieldArgs) -> anyhow::Result<()> {
    let mut fields = ContactFields::default();
    args.apply_to(&mut fields);
    if !fields.has_name() {
        anyhow::bail!("A contact needs a name (use --name)");
    }

    let id = book.create(&fields)?;
    let locator = Locator::item(id);

    if output_mode.is_human() {
        ui::done(Icons::NEW, "Contact added");
        println!("  {}", ui::muted(&locator.to_string()));
    } else {
        let data = serde_json::json!({
            "id": id,
            "locator": locator,
        });
        emit_success(output_mode, "add", data)?;
    }
    Ok(())
}

pub fn run_edit(book: &AddressBook, output_mode: OutputMode, id: i64, args: FieldArgs) -> anyhow::Result<()> {
    let Some(existing) = book.get(id)? else {
        anyhow::bail!("No contact with id {}", id);
    };

    // Start from what is stored, like the edit form; every field is written back.
    let mut fields = existing.fields;
    args.apply_to(&mut fields);
    if !fields.has_name() {
        anyhow::bail!("A contact needs a name");
    }

    if !book.save(id, &fields)? {
        anyhow::bail!("Contact {} was not updated", id);
    }

    if output_mode.is_human() {
        ui::done(Icons::MOD, "Contact updated");
        print_contact(&Contact::new(id, fields));
    } else {
        emit_success(output_mode, "edit", serde_json::to_value(Contact::new(id, fields))?)?;
    }
    Ok(())
}

pub fn run_remove(book: &AddressBook, output_mode: OutputMode, id: i64, yes: bool) -> anyhow::Result<()> {
    let Some(contact) = book.get(id)? else {
        anyhow::bail!("No contact with id {}", id);
    };

    if !yes && !confirm(&format!("Delete contact \"{}\"? This cannot be undone. [y/N] ", contact.name()))? {
        if output_mode.is_human() {
            ui::warn("Cancelled; nothing was deleted");
        } else {
            emit_success(output_mode, "remove", serde_json::json!({ "id": id, "deleted": false }))?;
        }
        return Ok(());
    }

    let deleted = book.remove(id)?;

    if output_mode.is_human() {
        if deleted {
            ui::done(Icons::DEL, "Contact deleted");
        } else {
            ui::error(&format!("Contact {} no longer exists", id));
        }
    } else {
        emit_success(output_mode, "remove", serde_json::json!({ "id": id, "deleted": deleted }))?;
    }
    Ok(())
}

pub fn run_stats(book: &AddressBook, output_mode: OutputMode, database: &Path) -> anyhow::Result<()> {
    let count = book.count()?;

    if output_mode.is_human() {
        ui::header(Icons::DATABASE, &format!("Address book ({})", database.display()));
        println!("  Contacts: {}", count);
    } else {
        let data = serde_json::json!({
            "database": database.display().to_string(),
            "contacts": count,
        });
        emit_success(output_mode, "stats", data)?;
    }
    Ok(())
}

fn print_contact(contact: &Contact) {
    let fields = &contact.fields;
    ui::header(Icons::PERSON, contact.name());
    println!("  {}", ui::muted(&Locator::item(contact.id).to_string()));

    section("Contact");
    detail_row(Icons::PHONE, "Phone", fields.phone.as_deref());
    detail_row(Icons::EMAIL, "Email", fields.email.as_deref());

    section("Address");
    detail_row(Icons::HOME, "Street", fields.street.as_deref());
    detail_row(Icons::HOME, "City", fields.city.as_deref());
    detail_row(Icons::HOME, "State", fields.state.as_deref());
    detail_row(Icons::HOME, "Zip", fields.zip.as_deref());
}

/// Ask a yes/no question on the terminal; anything but y/yes is a no.
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    let term = console::Term::stderr();
    if !term.is_term() {
        anyhow::bail!("Refusing to delete without confirmation; pass --yes when not interactive");
    }

    term.write_str(prompt)?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_only_overrides_given_flags() {
        let mut fields = ContactFields {
            phone: Some("555-0100".to_string()),
            city: Some("Boston".to_string()),
            ..ContactFields::named("Ada")
        };
        let args = FieldArgs {
            city: Some("London".to_string()),
            zip: Some(String::new()),
            ..FieldArgs::default()
        };

        args.apply_to(&mut fields);

        assert_eq!(fields.name.as_deref(), Some("Ada"));
        assert_eq!(fields.phone.as_deref(), Some("555-0100"));
        assert_eq!(fields.city.as_deref(), Some("London"));
        assert_eq!(fields.zip.as_deref(), Some(""));
    }
}
