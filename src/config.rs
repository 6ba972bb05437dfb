use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AddressBookConfig {
    pub database: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("addressbook.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".addressbook").join("addressbook.db")
}

/// Read the config at `path`; a missing file is `None`, not an error
pub fn load_config(path: &Path) -> anyhow::Result<Option<AddressBookConfig>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => anyhow::bail!("reading {}: {}", path.display(), e),
    };

    let config: AddressBookConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("parsing {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Write `config` to `path`, refusing to replace an existing file unless `force`
pub fn write_config(path: &Path, config: &AddressBookConfig, force: bool) -> anyhow::Result<()> {
    let contents = toml::to_string_pretty(config)?;

    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(path).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => {
            anyhow::anyhow!("config already exists at {} (use --force to overwrite)", path.display())
        }
        _ => anyhow::anyhow!("writing {}: {}", path.display(), e),
    })?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

/// Database path: explicit flag, then config file, then the default under `base`.
///
/// A relative path from the config file is taken relative to the config
/// file's directory.
pub fn resolve_database_path(
    flag: Option<&Path>,
    config: Option<&AddressBookConfig>,
    config_path: &Path,
    base: &Path,
) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }

    if let Some(database) = config.and_then(|c| c.database.as_deref()) {
        let database = Path::new(database);
        if database.is_absolute() {
            return database.to_path_buf();
        }
        let config_dir = config_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(base);
        return config_dir.join(database);
    }

    default_database_path_in(base)
}
