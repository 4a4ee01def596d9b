//! SQLite schema definitions for the contact store.
//!
//! The `contacts` table layout matches the address book database
//! (`contactBase.db`) written by earlier clients, so an existing file can be
//! opened as-is. Column types are advisory in SQLite; values are written as
//! text, except `image` which is always a BLOB (empty when there is no photo).
//!
//! Older files may hold several rows for one `uuid`. Such files still open;
//! reads see only the first row (lowest `_id`) of each identifier, and new
//! duplicates are refused at insert time.

/// Table name
pub const CONTACTS_TABLE: &str = "contacts";

/// SQL statement to create the contacts table.
pub const CREATE_CONTACTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS contacts (
    _id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT,
    name TEXT,
    email TEXT,
    favorite TEXT,
    address TEXT,
    image BLOB
)
";

/// SQL statement to index contacts by identifier.
///
/// Not unique: legacy files may already contain repeated identifiers.
pub const CREATE_UUID_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_contacts_uuid ON contacts(uuid)
";

/// Row filter keeping the first row of each identifier.
pub const FIRST_ROW_PER_UUID: &str = "_id IN (SELECT MIN(_id) FROM contacts GROUP BY uuid)";

/// Number of identifiers stored in more than one row.
pub const COUNT_REPEATED_UUIDS: &str =
    "SELECT COUNT(*) FROM (SELECT uuid FROM contacts GROUP BY uuid HAVING COUNT(*) > 1)";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_CONTACTS_TABLE, CREATE_UUID_INDEX];

/// Stored value for a favorite contact.
pub const FAVORITE_TRUE: &str = "true";

/// Stored value for a non-favorite contact.
pub const FAVORITE_FALSE: &str = "false";
