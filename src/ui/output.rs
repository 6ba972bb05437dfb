use crate::ui::{theme, Icons};

pub fn header(icon: &str, text: &str) {
    let theme = theme();
    println!("{} {}", icon, theme.paint(&theme.title, text));
}

pub fn success(label: &str) {
    done(Icons::CHECK, label);
}

/// A completed action, marked with `icon`
pub fn done(icon: &str, label: &str) {
    let theme = theme();
    println!("{} {}", icon, theme.paint(&theme.done, label));
}

pub fn error(label: &str) {
    let theme = theme();
    eprintln!("{} {}", Icons::CROSS, theme.paint(&theme.failed, label));
}

pub fn warn(label: &str) {
    let theme = theme();
    eprintln!("{} {}", Icons::WARN, theme.paint(&theme.caution, label));
}

pub fn section(title: &str) {
    let theme = theme();
    println!();
    println!("━{}━", theme.paint(&theme.title, title));
}

/// One `label: value` line of a detail view; unset values print as a dash
pub fn detail_row(icon: &str, label: &str, value: Option<&str>) {
    let value = value.filter(|v| !v.is_empty()).unwrap_or("-");
    println!("  {} {} {}", icon, theme().label(label), value);
}

pub fn muted(text: &str) -> String {
    let theme = theme();
    theme.paint(&theme.locator, text)
}
