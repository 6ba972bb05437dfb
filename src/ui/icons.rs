pub struct Icons;

impl Icons {
    pub const BOOK: &str = "📒";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const PERSON: &str = "👤";
    pub const PHONE: &str = "📱";
    pub const EMAIL: &str = "✉️";
    pub const HOME: &str = "🏠";
    pub const NEW: &str = "✨";
    pub const MOD: &str = "📝";
    pub const DEL: &str = "🗑️";
    pub const DATABASE: &str = "🗄️";
    pub const EMPTY: &str = "∅";
}
