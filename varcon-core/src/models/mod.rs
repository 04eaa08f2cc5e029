pub mod key;
pub mod schema;
pub mod table;

// re-export for cleaner imports
pub use self::key::{ChromNaming, KEY_WIDTH, OriginalKey, TrackedVariant, VariantKey};
pub use self::schema::Schema;
pub use self::table::{RaggedRows, Row, Table};
