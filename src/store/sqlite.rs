use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

use super::schema::SCHEMA;
use super::{Admission, Store};
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

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
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

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Role::parse(s).ok_or_else(|| FromSqlError::Other(format!("invalid role: {s}").into()))
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        AccountType::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("invalid account type: {s}").into()))
    }
}

impl ToSql for MediaState {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MediaState {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        MediaState::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("invalid media state: {s}").into()))
    }
}

const USER_COLUMNS: &str = "id, name, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_datetime(&row.get::<_, String>(2)?),
        updated_at: parse_datetime(&row.get::<_, String>(3)?),
    })
}

const TOKEN_COLUMNS: &str =
    "id, token_hash, token_lookup, is_admin, user_id, created_at, expires_at, last_used_at";

fn token_from_row(row: &Row<'_>) -> rusqlite::Result<Token> {
    Ok(Token {
        id: row.get(0)?,
        token_hash: row.get(1)?,
        token_lookup: row.get(2)?,
        is_admin: row.get(3)?,
        user_id: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        expires_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
        last_used_at: row.get::<_, Option<String>>(7)?.map(|s| parse_datetime(&s)),
    })
}

const ACCOUNT_COLUMNS: &str = "id, user_id, account_type, paid_months, created_at, superseded_at";

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        user_id: row.get(1)?,
        account_type: row.get(2)?,
        paid_months: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        superseded_at: row.get::<_, Option<String>>(5)?.map(|s| parse_datetime(&s)),
    })
}

const REPO_COLUMNS: &str = "r.id, r.user_id, r.name, r.created_at, r.updated_at";

fn repo_from_row(row: &Row<'_>) -> rusqlite::Result<Repo> {
    Ok(Repo {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?),
        updated_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn access_from_row(row: &Row<'_>) -> rusqlite::Result<RepoAccess> {
    Ok(RepoAccess {
        id: row.get(0)?,
        user_id: row.get(1)?,
        repo_id: row.get(2)?,
        role: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

const BOX_COLUMNS: &str = "id, repo_id, user_id, name, description, created_at, updated_at";

fn box_from_row(row: &Row<'_>) -> rusqlite::Result<RepoBox> {
    Ok(RepoBox {
        id: row.get(0)?,
        repo_id: row.get(1)?,
        user_id: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

const MEDIA_SELECT: &str = "SELECT m.id, m.box_id, b.repo_id, m.user_id, m.file_name, m.size_bytes,
            m.checksum, m.state, m.created_at, m.updated_at
     FROM box_media m JOIN boxes b ON b.id = m.box_id";

fn media_from_row(row: &Row<'_>) -> rusqlite::Result<BoxMedia> {
    Ok(BoxMedia {
        id: row.get(0)?,
        box_id: row.get(1)?,
        repo_id: row.get(2)?,
        user_id: row.get(3)?,
        file_name: row.get(4)?,
        size_bytes: row.get(5)?,
        checksum: row.get(6)?,
        state: row.get(7)?,
        created_at: parse_datetime(&row.get::<_, String>(8)?),
        updated_at: parse_datetime(&row.get::<_, String>(9)?),
    })
}

fn insert_user(conn: &Connection, user: &User) -> Result<()> {
    let result = conn.execute(
        "INSERT INTO users (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            user.id,
            user.name,
            format_datetime(&user.created_at),
            format_datetime(&user.updated_at),
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(Error::AlreadyExists)
        }
        Err(e) => Err(Error::from(e)),
    }
}

/// Supersedes the user's current account and inserts the new one. Callers
/// run this inside a transaction.
fn insert_account(conn: &Connection, account: &NewAccount) -> Result<Account> {
    let now = Utc::now();

    conn.execute(
        "UPDATE accounts SET superseded_at = ?1 WHERE user_id = ?2 AND superseded_at IS NULL",
        params![format_datetime(&now), account.user_id],
    )?;

    conn.execute(
        "INSERT INTO accounts (user_id, account_type, paid_months, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            account.user_id,
            account.account_type,
            account.paid_months,
            format_datetime(&now),
        ],
    )?;

    Ok(Account {
        id: conn.last_insert_rowid(),
        user_id: account.user_id.clone(),
        account_type: account.account_type,
        paid_months: account.paid_months,
        created_at: now,
        superseded_at: None,
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        insert_user(&self.conn(), user)
    }

    fn create_user_with_account(&self, user: &User, account: &NewAccount) -> Result<Account> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        insert_user(&tx, user)?;
        let account = insert_account(&tx, account)?;

        tx.commit()?;
        Ok(account)
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE name = ?1"),
                params![name],
                user_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id > ?1 ORDER BY id LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![cursor, limit], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_user(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, is_admin, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.is_admin,
                token.user_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::TokenLookupCollision)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_token_by_id(&self, id: &str) -> Result<Option<Token>> {
        self.conn()
            .query_row(
                &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE id = ?1"),
                params![id],
                token_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        self.conn()
            .query_row(
                &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE token_lookup = ?1"),
                params![lookup],
                token_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_user_tokens(&self, user_id: &str) -> Result<Vec<Token>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens WHERE user_id = ?1 ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map(params![user_id], token_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_token(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tokens WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    fn has_admin_token(&self) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM tokens WHERE is_admin = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Account operations

    fn create_account(&self, account: &NewAccount) -> Result<Account> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let account = insert_account(&tx, account)?;

        tx.commit()?;
        Ok(account)
    }

    fn get_current_account(&self, user_id: &str) -> Result<Option<Account>> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts
                     WHERE user_id = ?1 AND superseded_at IS NULL"
                ),
                params![user_id],
                account_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE user_id = ?1 ORDER BY id DESC"
        ))?;

        let rows = stmt.query_map(params![user_id], account_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Repo operations

    fn create_repo(&self, user_id: &str, name: &str, admit: Admission<'_>) -> Result<Repo> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM repos WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        admit(count)?;

        let now = Utc::now();
        tx.execute(
            "INSERT INTO repos (user_id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![user_id, name, format_datetime(&now)],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO repo_access (user_id, repo_id, role, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, id, Role::Owner, format_datetime(&now)],
        )?;

        tx.commit()?;

        Ok(Repo {
            id,
            user_id: user_id.to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    fn get_repo(&self, id: i64) -> Result<Option<Repo>> {
        self.conn()
            .query_row(
                &format!("SELECT {REPO_COLUMNS} FROM repos r WHERE r.id = ?1"),
                params![id],
                repo_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_accessible_repos(&self, user_id: &str) -> Result<Vec<Repo>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT {REPO_COLUMNS}
             FROM repos r
             JOIN repo_access a ON a.repo_id = r.id
             WHERE a.user_id = ?1
             ORDER BY r.id"
        ))?;

        let rows = stmt.query_map(params![user_id], repo_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_user_repos(&self, user_id: &str) -> Result<i64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM repos WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn update_repo(&self, repo: &Repo) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE repos SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![repo.name, format_datetime(&repo.updated_at), repo.id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound("repo"));
        }
        Ok(())
    }

    fn delete_repo(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM repos WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Repo access operations

    fn create_repo_access(&self, user_id: &str, repo_id: i64, role: Role) -> Result<RepoAccess> {
        let conn = self.conn();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO repo_access (user_id, repo_id, role, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, repo_id, role, format_datetime(&now)],
        )?;

        Ok(RepoAccess {
            id: conn.last_insert_rowid(),
            user_id: user_id.to_string(),
            repo_id,
            role,
            created_at: now,
        })
    }

    fn list_repo_access(&self, repo_id: i64) -> Result<Vec<RepoAccess>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, repo_id, role, created_at
             FROM repo_access WHERE repo_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![repo_id], access_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_user_roles(&self, user_id: &str, repo_id: i64) -> Result<Vec<Role>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT role FROM repo_access WHERE user_id = ?1 AND repo_id = ?2")?;

        let rows = stmt.query_map(params![user_id, repo_id], |row| row.get(0))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Box operations

    fn create_box(&self, new_box: &NewRepoBox, admit: Admission<'_>) -> Result<RepoBox> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM boxes WHERE repo_id = ?1",
            params![new_box.repo_id],
            |row| row.get(0),
        )?;
        admit(count)?;

        let now = Utc::now();
        tx.execute(
            "INSERT INTO boxes (repo_id, user_id, name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                new_box.repo_id,
                new_box.user_id,
                new_box.name,
                new_box.description,
                format_datetime(&now),
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;

        Ok(RepoBox {
            id,
            repo_id: new_box.repo_id,
            user_id: new_box.user_id.clone(),
            name: new_box.name.clone(),
            description: new_box.description.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    fn get_box(&self, id: i64) -> Result<Option<RepoBox>> {
        self.conn()
            .query_row(
                &format!("SELECT {BOX_COLUMNS} FROM boxes WHERE id = ?1"),
                params![id],
                box_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_boxes(&self, repo_id: i64) -> Result<Vec<RepoBox>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {BOX_COLUMNS} FROM boxes WHERE repo_id = ?1 ORDER BY id"
        ))?;

        let rows = stmt.query_map(params![repo_id], box_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_boxes(&self, repo_id: i64) -> Result<i64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM boxes WHERE repo_id = ?1",
            params![repo_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn update_box(&self, repo_box: &RepoBox) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE boxes SET name = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                repo_box.name,
                repo_box.description,
                format_datetime(&repo_box.updated_at),
                repo_box.id
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound("box"));
        }
        Ok(())
    }

    fn delete_box(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM boxes WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Media operations

    fn create_media(&self, media: &NewBoxMedia) -> Result<BoxMedia> {
        let conn = self.conn();
        let now = Utc::now();

        let repo_id: i64 = conn
            .query_row(
                "SELECT repo_id FROM boxes WHERE id = ?1",
                params![media.box_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(Error::NotFound("box"))?;

        conn.execute(
            "INSERT INTO box_media (box_id, user_id, file_name, state, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                media.box_id,
                media.user_id,
                media.file_name,
                MediaState::Pending,
                format_datetime(&now),
            ],
        )?;

        Ok(BoxMedia {
            id: conn.last_insert_rowid(),
            box_id: media.box_id,
            repo_id,
            user_id: media.user_id.clone(),
            file_name: media.file_name.clone(),
            size_bytes: 0,
            checksum: None,
            state: MediaState::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_media(&self, id: i64) -> Result<Option<BoxMedia>> {
        self.conn()
            .query_row(
                &format!("{MEDIA_SELECT} WHERE m.id = ?1"),
                params![id],
                media_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_media(&self, box_id: i64) -> Result<Vec<BoxMedia>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{MEDIA_SELECT} WHERE m.box_id = ?1 ORDER BY m.id"))?;

        let rows = stmt.query_map(params![box_id], media_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_repo_media(&self, repo_id: i64) -> Result<Vec<BoxMedia>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{MEDIA_SELECT} WHERE b.repo_id = ?1 ORDER BY m.id"))?;

        let rows = stmt.query_map(params![repo_id], media_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn mark_media_ready(
        &self,
        id: i64,
        size_bytes: i64,
        checksum: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE box_media SET size_bytes = ?1, checksum = ?2, state = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                size_bytes,
                checksum,
                MediaState::Ready,
                format_datetime(&updated_at),
                id
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound("media"));
        }
        Ok(())
    }

    fn update_media(&self, media: &BoxMedia) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE box_media SET file_name = ?1, size_bytes = ?2, checksum = ?3, state = ?4,
                    updated_at = ?5
             WHERE id = ?6",
            params![
                media.file_name,
                media.size_bytes,
                media.checksum,
                media.state,
                format_datetime(&media.updated_at),
                media.id
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound("media"));
        }
        Ok(())
    }

    fn delete_media(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM box_media WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}
