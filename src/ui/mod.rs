pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{detail_row, done, error, header, muted, section, success, warn};
pub use table::{contact_table, ContactRow};
pub use theme::{theme, Theme};
