use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl FromSql for RequestStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(FromSqlError::Other(
                format!("unknown request status: {other}").into(),
            )),
        }
    }
}

impl ToSql for RequestStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

fn hashname_from_row(row: &Row<'_>) -> rusqlite::Result<HashName> {
    Ok(HashName {
        hashname_id: row.get(0)?,
        handle: row.get(1)?,
        owner_address: row.get(2)?,
        is_active: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<AttachmentRequest> {
    Ok(AttachmentRequest {
        request_id: row.get(0)?,
        seed_id: row.get(1)?,
        hashname_id: row.get(2)?,
        requester_address: row.get(3)?,
        status: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        resolved_at: row
            .get::<_, Option<String>>(6)?
            .map(|s| parse_datetime(&s)),
        decision_note: row.get(7)?,
    })
}

const REQUEST_COLUMNS: &str = "request_id, seed_id, hashname_id, requester_address, status, \
                               created_at, resolved_at, decision_note";

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Nonce operations

    fn get_nonce(&self, address: &str) -> Result<Option<Nonce>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT address, nonce, expires_at FROM auth_nonces WHERE address = ?1",
            params![address],
            |row| {
                Ok(Nonce {
                    address: row.get(0)?,
                    value: row.get(1)?,
                    expires_at: parse_datetime(&row.get::<_, String>(2)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn put_nonce(&self, nonce: &Nonce) -> Result<()> {
        self.conn().execute(
            "INSERT INTO auth_nonces (address, nonce, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(address) DO UPDATE SET nonce = ?2, expires_at = ?3",
            params![
                nonce.address,
                nonce.value,
                format_datetime(&nonce.expires_at)
            ],
        )?;
        Ok(())
    }

    fn delete_nonce(&self, address: &str, value: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM auth_nonces WHERE address = ?1 AND nonce = ?2",
            params![address, value],
        )?;
        Ok(rows > 0)
    }

    // Seed operations

    fn create_seed(&self, title: &str, author_address: Option<&str>) -> Result<Seed> {
        let created_at = Utc::now();
        let conn = self.conn();
        conn.execute(
            "INSERT INTO seeds (title, author_address, created_at) VALUES (?1, ?2, ?3)",
            params![title, author_address, format_datetime(&created_at)],
        )?;
        Ok(Seed {
            seed_id: conn.last_insert_rowid(),
            title: title.to_string(),
            author_address: author_address.map(str::to_string),
            created_at,
        })
    }

    fn get_seed(&self, seed_id: i64) -> Result<Option<Seed>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT seed_id, title, author_address, created_at FROM seeds WHERE seed_id = ?1",
            params![seed_id],
            |row| {
                Ok(Seed {
                    seed_id: row.get(0)?,
                    title: row.get(1)?,
                    author_address: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // HashName operations

    fn create_hashname(&self, handle: &str) -> Result<HashName> {
        let created_at = Utc::now();
        let conn = self.conn();
        conn.execute(
            "INSERT INTO hashnames (handle, owner_address, is_active, created_at)
             VALUES (?1, NULL, 1, ?2)",
            params![handle, format_datetime(&created_at)],
        )?;
        Ok(HashName {
            hashname_id: conn.last_insert_rowid(),
            handle: handle.to_string(),
            owner_address: None,
            is_active: true,
            created_at,
        })
    }

    fn get_hashname(&self, hashname_id: i64) -> Result<Option<HashName>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT hashname_id, handle, owner_address, is_active, created_at
             FROM hashnames WHERE hashname_id = ?1",
            params![hashname_id],
            hashname_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_hashname_by_handle(&self, handle: &str) -> Result<Option<HashName>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT hashname_id, handle, owner_address, is_active, created_at
             FROM hashnames WHERE handle = ?1",
            params![handle],
            hashname_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn claim_hashname_if_unowned(&self, hashname_id: i64, owner: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE hashnames SET owner_address = ?1
             WHERE hashname_id = ?2 AND owner_address IS NULL",
            params![owner, hashname_id],
        )?;
        Ok(rows > 0)
    }

    fn set_hashname_active(&self, hashname_id: i64, active: bool) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE hashnames SET is_active = ?1 WHERE hashname_id = ?2",
            params![active, hashname_id],
        )?;
        Ok(rows > 0)
    }

    // Attachment request operations

    fn insert_request(
        &self,
        seed_id: i64,
        hashname_id: i64,
        requester_address: &str,
    ) -> Result<AttachmentRequest> {
        let created_at = Utc::now();
        let conn = self.conn();
        conn.execute(
            "INSERT INTO attachment_requests
                 (seed_id, hashname_id, requester_address, status, created_at)
             VALUES (?1, ?2, ?3, 'pending', ?4)",
            params![
                seed_id,
                hashname_id,
                requester_address,
                format_datetime(&created_at)
            ],
        )?;
        Ok(AttachmentRequest {
            request_id: conn.last_insert_rowid(),
            seed_id,
            hashname_id,
            requester_address: requester_address.to_string(),
            status: RequestStatus::Pending,
            created_at,
            resolved_at: None,
            decision_note: None,
        })
    }

    fn get_request(&self, request_id: i64) -> Result<Option<AttachmentRequest>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {REQUEST_COLUMNS} FROM attachment_requests WHERE request_id = ?1"),
            params![request_id],
            request_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_pending_request(
        &self,
        seed_id: i64,
        hashname_id: i64,
    ) -> Result<Option<AttachmentRequest>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {REQUEST_COLUMNS} FROM attachment_requests
                 WHERE seed_id = ?1 AND hashname_id = ?2 AND status = 'pending'
                 LIMIT 1"
            ),
            params![seed_id, hashname_id],
            request_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_pending_requests(&self, hashname_id: i64) -> Result<Vec<AttachmentRequest>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {REQUEST_COLUMNS} FROM attachment_requests
             WHERE hashname_id = ?1 AND status = 'pending'
             ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map(params![hashname_id], request_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn resolve_request_if_pending(
        &self,
        request_id: i64,
        status: RequestStatus,
        resolved_at: DateTime<Utc>,
        note: Option<&str>,
    ) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE attachment_requests
             SET status = ?1, resolved_at = ?2, decision_note = ?3
             WHERE request_id = ?4 AND status = 'pending'",
            params![status, format_datetime(&resolved_at), note, request_id],
        )?;
        Ok(rows > 0)
    }

    // Attachment operations

    fn get_attachment(&self, seed_id: i64, hashname_id: i64) -> Result<Option<Attachment>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT seed_id, hashname_id, attached_by_address, attached_at
             FROM attachments WHERE seed_id = ?1 AND hashname_id = ?2",
            params![seed_id, hashname_id],
            |row| {
                Ok(Attachment {
                    seed_id: row.get(0)?,
                    hashname_id: row.get(1)?,
                    attached_by_address: row.get(2)?,
                    attached_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn insert_attachment_if_absent(
        &self,
        seed_id: i64,
        hashname_id: i64,
        by_address: &str,
    ) -> Result<bool> {
        let rows = self.conn().execute(
            "INSERT OR IGNORE INTO attachments
                 (seed_id, hashname_id, attached_by_address, attached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                seed_id,
                hashname_id,
                by_address,
                format_datetime(&Utc::now())
            ],
        )?;
        Ok(rows > 0)
    }
}
