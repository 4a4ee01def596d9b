// # SQLite Contact Store
//
// SQLite-backed implementation of ContactStore.
//
// ## Encoding
//
// | Column     | Stored as                                   |
// |------------|---------------------------------------------|
// | `uuid`     | hyphenated UUID string                      |
// | `name`     | text or NULL                                |
// | `email`    | text or NULL                                |
// | `favorite` | literal `"true"` / `"false"`                |
// | `address`  | text or NULL                                |
// | `image`    | BLOB, zero-length when there is no photo    |
//
// ## Threading
//
// `rusqlite::Connection` is not `Sync`, so the connection sits behind a
// mutex and every call runs on tokio's blocking pool.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::schema::{
    COUNT_REPEATED_UUIDS, FAVORITE_FALSE, FAVORITE_TRUE, FIRST_ROW_PER_UUID, SCHEMA_STATEMENTS,
};
use crate::contact::Contact;
use crate::error::{Error, Result};
use crate::traits::ContactStore;

const SELECT_COLUMNS: &str = "SELECT uuid, name, email, favorite, address, image FROM contacts";

/// SQLite contact store
///
/// # Example
///
/// ```rust,no_run
/// use contacts_core::{Contact, ContactStore, SqliteContactStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = SqliteContactStore::open("/var/lib/contacts/contactBase.db")?;
///
///     store.add(&Contact::new().with_name("Ada")).await?;
///     let everyone = store.get_all().await?;
///     assert_eq!(everyone.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct SqliteContactStore {
    /// Path to the database file (`:memory:` for in-memory databases)
    path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteContactStore {
    /// Open or create a contact database at the given path
    ///
    /// Creates parent directories if needed and initializes the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        debug!("Opening contact database at {}", path.display());
        let conn = Connection::open(&path)?;
        Self::initialize_schema(&conn)?;

        info!("Contact database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn initialize_schema(conn: &Connection) -> Result<()> {
        for statement in SCHEMA_STATEMENTS {
            conn.execute_batch(statement)?;
        }

        let repeated: i64 = conn.query_row(COUNT_REPEATED_UUIDS, [], |row| row.get(0))?;
        if repeated > 0 {
            warn!(
                "{} contact uuid(s) stored in more than one row; only the first row of each is used",
                repeated
            );
        }
        Ok(())
    }

    /// Run `op` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| Error::store("SQLite connection lock poisoned"))?;
            op(&guard)
        })
        .await
        .map_err(|e| Error::store(format!("SQLite task failed: {}", e)))?
    }

    fn query_contacts(conn: &Connection, sql: &str) -> Result<Vec<Contact>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], ContactRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(ContactRow::into_contact).collect()
    }
}

/// Raw column values of one `contacts` row
struct ContactRow {
    uuid: String,
    name: Option<String>,
    email: Option<String>,
    favorite: Option<String>,
    address: Option<String>,
    image: Option<Vec<u8>>,
}

impl ContactRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uuid: row.get("uuid")?,
            name: row.get("name")?,
            email: row.get("email")?,
            favorite: row.get("favorite")?,
            address: row.get("address")?,
            image: row.get("image")?,
        })
    }

    fn into_contact(self) -> Result<Contact> {
        let id = Uuid::parse_str(&self.uuid).map_err(|e| {
            Error::store(format!("Invalid uuid '{}' in contacts table: {}", self.uuid, e))
        })?;

        let mut contact = Contact::with_id(id);
        contact.name = self.name;
        contact.email = self.email;
        contact.is_favorite = self.favorite.as_deref() == Some(FAVORITE_TRUE);
        contact.address = self.address;
        contact.image = self.image.filter(|bytes| !bytes.is_empty());
        Ok(contact)
    }
}

fn favorite_value(contact: &Contact) -> &'static str {
    if contact.is_favorite {
        FAVORITE_TRUE
    } else {
        FAVORITE_FALSE
    }
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn get_all(&self) -> Result<Vec<Contact>> {
        self.with_conn(|conn| {
            Self::query_contacts(
                conn,
                &format!("{} WHERE {} ORDER BY _id", SELECT_COLUMNS, FIRST_ROW_PER_UUID),
            )
        })
        .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Contact>> {
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    &format!("{} WHERE uuid = ?1 ORDER BY _id LIMIT 1", SELECT_COLUMNS),
                    [id.to_string()],
                    ContactRow::from_row,
                )
                .optional()?;
            row.map(ContactRow::into_contact).transpose()
        })
        .await
    }

    async fn add(&self, contact: &Contact) -> Result<()> {
        let contact = contact.clone();
        self.with_conn(move |conn| {
            let id = contact.id().to_string();
            let existing: i64 = conn.query_row(
                "SELECT COUNT(*) FROM contacts WHERE uuid = ?1",
                [&id],
                |row| row.get(0),
            )?;
            if existing > 0 {
                return Err(Error::duplicate(id));
            }

            let image = contact.image.clone().unwrap_or_default();
            conn.execute(
                r"
                INSERT INTO contacts (uuid, name, email, favorite, address, image)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
                params![
                    id,
                    contact.name,
                    contact.email,
                    favorite_value(&contact),
                    contact.address,
                    image,
                ],
            )?;
            debug!("Inserted contact {}", id);
            Ok(())
        })
        .await
    }

    async fn update(&self, contact: &Contact) -> Result<()> {
        let contact = contact.clone();
        self.with_conn(move |conn| {
            let id = contact.id().to_string();
            let image = contact.image.clone().unwrap_or_default();
            let changed = conn.execute(
                r"
                UPDATE contacts
                SET name = ?2, email = ?3, favorite = ?4, address = ?5, image = ?6
                WHERE uuid = ?1
                ",
                params![
                    id,
                    contact.name,
                    contact.email,
                    favorite_value(&contact),
                    contact.address,
                    image,
                ],
            )?;
            if changed == 0 {
                return Err(Error::not_found(id));
            }
            debug!("Updated contact {}", id);
            Ok(())
        })
        .await
    }

    async fn favorites(&self) -> Result<Vec<Contact>> {
        self.with_conn(|conn| {
            Self::query_contacts(
                conn,
                &format!(
                    "{} WHERE {} AND favorite = '{}' ORDER BY _id",
                    SELECT_COLUMNS, FIRST_ROW_PER_UUID, FAVORITE_TRUE
                ),
            )
        })
        .await
    }

    async fn flush(&self) -> Result<()> {
        // Every statement commits on its own
        Ok(())
    }
}
