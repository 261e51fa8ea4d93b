use crate::db::models::{AdminUser, SiteConfig, Testimonial, User};
use crate::db::schema::SQLITE_INIT;
use crate::db::tables::ContentTable;
use crate::editor::{ContentSink, OrderEntry, Orderable};
use crate::error::CmsError;
use crate::types::{Content, NewUser};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, QueryBuilder, Row, Sqlite};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

/// Open (creating if missing) the database at `database_url`.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, CmsError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(connect_opts)
        .await?;
    Ok(pool)
}

#[derive(Clone)]
pub struct ContentStorage {
    pool: SqlitePool,
}

impl ContentStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), CmsError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// All rows, ascending `order`, ties by id.
    pub async fn list<T: ContentTable>(&self) -> Result<Vec<T>, CmsError> {
        let sql = format!(
            r#"SELECT {} FROM {} ORDER BY "order" ASC, id ASC"#,
            T::COLUMNS,
            T::TABLE
        );
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    /// Visible rows only, same ordering as [`Self::list`].
    pub async fn list_active<T: ContentTable>(&self) -> Result<Vec<T>, CmsError> {
        let sql = format!(
            r#"SELECT {} FROM {} WHERE is_active = 1 ORDER BY "order" ASC, id ASC"#,
            T::COLUMNS,
            T::TABLE
        );
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn get<T: ContentTable>(&self, id: i64) -> Result<Option<T>, CmsError> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?", T::COLUMNS, T::TABLE);
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Insert and return the stored row. Without an explicit order the row
    /// goes after the current last one.
    pub async fn create<T: ContentTable>(&self, new: &T::New) -> Result<T, CmsError> {
        let mut qb = QueryBuilder::<Sqlite>::new("INSERT INTO ");
        qb.push(T::TABLE)
            .push(" (")
            .push(T::INSERT_COLUMNS)
            .push(r#", "order") VALUES ("#);
        {
            let mut values = qb.separated(", ");
            T::bind_insert(&mut values, new);
            values
                .push("COALESCE(")
                .push_bind_unseparated(T::requested_order(new))
                .push_unseparated(r#", (SELECT COALESCE(MAX("order"), -1) + 1 FROM "#)
                .push_unseparated(T::TABLE)
                .push_unseparated("))");
        }
        qb.push(") RETURNING ").push(T::COLUMNS);

        let row = qb.build_query_as::<T>().fetch_one(&self.pool).await?;
        debug!(entity = T::ENTITY, id = row.id(), order = row.order(), "row inserted");
        Ok(row)
    }

    /// Apply the fields present in `patch`. A missing id is `NotFound`.
    pub async fn update<T: ContentTable>(&self, id: i64, patch: &T::Patch) -> Result<T, CmsError> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE ");
        qb.push(T::TABLE).push(" SET ");
        let assigned = {
            let mut set = qb.separated(", ");
            T::bind_patch(&mut set, patch)
        };
        if assigned == 0 {
            return self
                .get::<T>(id)
                .await?
                .ok_or_else(|| CmsError::not_found(T::ENTITY, id));
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(T::COLUMNS);

        qb.build_query_as::<T>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CmsError::not_found(T::ENTITY, id))
    }

    /// Remove by id. Returns whether a row existed; deleting twice is fine.
    pub async fn delete<T: ContentTable>(&self, id: i64) -> Result<bool, CmsError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", T::TABLE);
        let res = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    /// Write every `(id, order)` pair in one transaction. Ids that do not
    /// exist are skipped; the number of rows actually updated is returned.
    pub async fn reorder<T: ContentTable>(&self, entries: &[OrderEntry]) -> Result<u64, CmsError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for e in entries {
            if !seen.insert(e.id) {
                return Err(CmsError::InvalidReorder(format!("duplicate id {}", e.id)));
            }
            if e.order < 0 {
                return Err(CmsError::InvalidReorder(format!(
                    "negative order for id {}",
                    e.id
                )));
            }
        }

        let sql = format!(r#"UPDATE {} SET "order" = ? WHERE id = ?"#, T::TABLE);
        let mut tx = self.pool.begin().await?;
        let mut updated = 0;
        for e in entries {
            updated += sqlx::query(&sql)
                .bind(e.order)
                .bind(e.id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        Ok(updated)
    }

    /// Set or clear the photo of one testimonial.
    pub async fn set_testimonial_photo(
        &self,
        id: i64,
        photo: Option<&str>,
    ) -> Result<Testimonial, CmsError> {
        let sql = format!(
            "UPDATE {} SET photo = ? WHERE id = ? RETURNING {}",
            Testimonial::TABLE,
            Testimonial::COLUMNS
        );
        sqlx::query_as::<_, Testimonial>(&sql)
            .bind(photo)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CmsError::not_found(Testimonial::ENTITY, id))
    }

    pub async fn get_site_config(&self, key: &str) -> Result<Option<SiteConfig>, CmsError> {
        let row = sqlx::query("SELECT id, key, value, updated_at FROM site_config WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_site_config).transpose()
    }

    pub async fn get_all_site_configs(&self) -> Result<Vec<SiteConfig>, CmsError> {
        let rows = sqlx::query("SELECT id, key, value, updated_at FROM site_config ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_site_config).collect()
    }

    /// Upsert by unique key in a single statement.
    /// Uses SQLite `INSERT ... ON CONFLICT(key) DO UPDATE ... RETURNING`.
    pub async fn set_site_config(&self, key: &str, value: &Value) -> Result<SiteConfig, CmsError> {
        let value_json = serde_json::to_string(value)?;
        let updated_at = Utc::now().to_rfc3339();
        let row = sqlx::query(
            r#"
            INSERT INTO site_config (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value=excluded.value,
                updated_at=excluded.updated_at
            RETURNING id, key, value, updated_at
            "#,
        )
        .bind(key)
        .bind(value_json)
        .bind(updated_at)
        .fetch_one(&self.pool)
        .await?;
        Self::row_to_site_config(row)
    }

    pub async fn delete_site_config(&self, key: &str) -> Result<bool, CmsError> {
        let res = sqlx::query("DELETE FROM site_config WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>, CmsError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT id, username, password FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, CmsError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, username, password FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, CmsError> {
        Ok(sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password) VALUES (?, ?) RETURNING id, username, password",
        )
        .bind(&user.username)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn get_admin_user(&self, username: &str) -> Result<Option<AdminUser>, CmsError> {
        Ok(sqlx::query_as::<_, AdminUser>(
            "SELECT id, username, password FROM admin_users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn create_admin_user(&self, user: &NewUser) -> Result<AdminUser, CmsError> {
        Ok(sqlx::query_as::<_, AdminUser>(
            "INSERT INTO admin_users (username, password) VALUES (?, ?) RETURNING id, username, password",
        )
        .bind(&user.username)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await?)
    }

    fn row_to_site_config(row: SqliteRow) -> Result<SiteConfig, CmsError> {
        let id: i64 = row.try_get("id")?;
        let key: String = row.try_get("key")?;
        let value_json: String = row.try_get("value")?;
        let updated_at_str: String = row.try_get("updated_at")?;

        let value: Value =
            serde_json::from_str(&value_json).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let updated_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);

        Ok(SiteConfig {
            id,
            key,
            value,
            updated_at,
        })
    }
}

/// Lets an editor run directly against the database, without HTTP.
impl<T: ContentTable> ContentSink<T> for ContentStorage {
    async fn fetch_all(&self) -> Result<Vec<T>, CmsError> {
        self.list::<T>().await
    }

    async fn persist_order(&self, entries: &[OrderEntry]) -> Result<(), CmsError> {
        self.reorder::<T>(entries).await.map(|_| ())
    }

    async fn create(&self, new: &T::New) -> Result<T, CmsError> {
        ContentStorage::create::<T>(self, new).await
    }

    async fn update(&self, id: i64, patch: &T::Patch) -> Result<T, CmsError> {
        ContentStorage::update::<T>(self, id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<(), CmsError> {
        ContentStorage::delete::<T>(self, id).await.map(|_| ())
    }
}
