use crate::sqlite_column;
use crate::sqlite_persistence::{
    read_schema_version, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
use anyhow::{bail, Context, Result};
use rusqlite::{params, types::Type, Connection, ErrorCode, OptionalExtension};
use std::{
    path::Path,
    str::FromStr,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tracing::{debug, info};

use super::auth::{HarmonistHasher, HashedPassword, UsernamePasswordCredentials};
use super::user_store::{UserAuthCredentialsStore, UserStore};

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("handle", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_user_handle", "handle")],
};
const USER_PASSWORD_CREDENTIALS_V_0: Table = Table {
    name: "user_password_credentials",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("salt", &SqlType::Text, non_null = true),
        sqlite_column!("hash", &SqlType::Text, non_null = true),
        sqlite_column!("hasher", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_tried", &SqlType::Integer),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    indices: &[],
};

const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[USER_TABLE_V_0, USER_PASSWORD_CREDENTIALS_V_0],
    migration: None,
}];

fn system_time_from_column_result(value: i64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(value.max(0) as u64)
}

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let db_path = db_path.as_ref();
        let latest_schema = VERSIONED_SCHEMAS
            .last()
            .context("No user database schema defined")?;

        let conn = if db_path.exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open user database {:?}", db_path))?
        } else {
            info!("Creating user database at {:?}", db_path);
            let conn = Connection::open(db_path)
                .with_context(|| format!("Failed to create user database {:?}", db_path))?;
            latest_schema.create(&conn)?;
            conn
        };
        conn.execute("PRAGMA foreign_keys = ON;", [])?;

        let version = read_schema_version(&conn)?;
        match VERSIONED_SCHEMAS.get(version) {
            Some(schema) => schema.validate(&conn)?,
            None => bail!("Database version {} is too new", version),
        }

        Self::migrate_if_needed(&conn, version)?;

        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        for schema in VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!("Migrating user db to version {}", schema.version);
                migration_fn(conn)?;
            }
            schema.stamp(conn)?;
        }
        Ok(())
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _) if inner.code == ErrorCode::ConstraintViolation
    )
}

impl UserStore for SqliteUserStore {
    fn create_user_with_password(
        &self,
        user_handle: &str,
        password: &HashedPassword,
    ) -> Result<Option<usize>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        match tx.execute(
            &format!("INSERT INTO {} (handle) VALUES (?1)", USER_TABLE_V_0.name),
            params![user_handle],
        ) {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                debug!("Handle {} already taken", user_handle);
                return Ok(None);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to create user {}", user_handle))
            }
        }
        let user_id = tx.last_insert_rowid() as usize;

        tx.execute(
            &format!(
                "INSERT INTO {} (user_id, salt, hash, hasher) VALUES (?1, ?2, ?3, ?4)",
                USER_PASSWORD_CREDENTIALS_V_0.name
            ),
            params![
                user_id,
                password.salt,
                password.hash,
                password.hasher.to_string()
            ],
        )
        .context("Failed to store password credentials")?;

        tx.commit()?;
        Ok(Some(user_id))
    }

    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        let user_id = conn
            .query_row(
                &format!("SELECT id FROM {} WHERE handle = ?1", USER_TABLE_V_0.name),
                params![user_handle],
                |row| row.get::<usize, usize>(0),
            )
            .optional()?;
        Ok(user_id)
    }
}

impl UserAuthCredentialsStore for SqliteUserStore {
    fn get_user_auth_credentials(
        &self,
        user_handle: &str,
    ) -> Result<Option<UsernamePasswordCredentials>> {
        let conn = self.conn.lock().unwrap();
        let credentials = conn
            .query_row(
                "SELECT c.user_id, c.salt, c.hash, c.hasher, c.created, c.last_tried, c.last_used \
                 FROM user_password_credentials c JOIN user u ON u.id = c.user_id \
                 WHERE u.handle = ?1",
                params![user_handle],
                |row| {
                    let hasher = HarmonistHasher::from_str(&row.get::<usize, String>(3)?)
                        .map_err(|err| {
                            rusqlite::Error::FromSqlConversionFailure(3, Type::Text, err.into())
                        })?;
                    Ok(UsernamePasswordCredentials {
                        user_id: row.get(0)?,
                        password: HashedPassword {
                            salt: row.get(1)?,
                            hash: row.get(2)?,
                            hasher,
                        },
                        created: system_time_from_column_result(row.get(4)?),
                        last_tried: row
                            .get::<usize, Option<i64>>(5)?
                            .map(system_time_from_column_result),
                        last_used: row
                            .get::<usize, Option<i64>>(6)?
                            .map(system_time_from_column_result),
                    })
                },
            )
            .optional()?;
        Ok(credentials)
    }

    fn record_password_attempt(&self, user_id: usize, succeeded: bool) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let sql = if succeeded {
            format!(
                "UPDATE {} SET last_tried = {now}, last_used = {now} WHERE user_id = ?1",
                USER_PASSWORD_CREDENTIALS_V_0.name,
                now = DEFAULT_TIMESTAMP
            )
        } else {
            format!(
                "UPDATE {} SET last_tried = {} WHERE user_id = ?1",
                USER_PASSWORD_CREDENTIALS_V_0.name, DEFAULT_TIMESTAMP
            )
        };
        conn.execute(&sql, params![user_id])?;
        Ok(())
    }
}
