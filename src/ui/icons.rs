//! Shared UI icons.
//!
//! Each icon falls back to plain ASCII on terminals without emoji support.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");

// Article indicators
pub static DRAFT: Emoji<'_, '_> = Emoji("📝 ", "[DRAFT]");
pub static TAG: Emoji<'_, '_> = Emoji("🏷️  ", "#");
pub static USER: Emoji<'_, '_> = Emoji("👤 ", "@");
pub static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "?");
