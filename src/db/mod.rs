//! SQLite store behind the sandbox host.
//!
//! Holds generic posts, taxonomy terms and directory users, keyed by the
//! REST base of their type. The store knows nothing about projects or todos;
//! custom fields are kept as an opaque JSON map.

mod schema;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use serde_json::{Map, Value};

/// A stored post of any type.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub id: u64,
    pub post_type: String,
    pub title: String,
    pub content: String,
    pub status: String,
    pub acf: Map<String, Value>,
    pub author: Option<u64>,
    /// Attached term ids, by taxonomy.
    pub terms: BTreeMap<String, Vec<u64>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub status: String,
    pub acf: Map<String, Value>,
    pub author: Option<u64>,
    pub terms: BTreeMap<String, Vec<u64>>,
}

/// Partial post update. `acf` keys are merged into the stored map; a
/// taxonomy present in `terms` replaces that taxonomy's terms.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    pub acf: Option<Map<String, Value>>,
    pub terms: BTreeMap<String, Vec<u64>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRecord {
    pub id: u64,
    pub taxonomy: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// `0` for a root term.
    pub parent: u64,
    /// Published posts carrying the term.
    pub count: u64,
}

#[derive(Debug, Clone, Default)]
pub struct NewTerm {
    pub name: String,
    pub description: String,
    pub parent: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub token: String,
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "wisdm-central")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("sandbox.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // User operations
    // ============================================================

    /// Add a directory user. The slug doubles as the bearer token.
    pub fn create_user(&self, name: &str) -> Result<UserRecord> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let slug = unique_slug(&conn, "SELECT COUNT(*) FROM users WHERE slug = ?1", None, name)?;
        conn.execute(
            "INSERT INTO users (name, slug, token, created_at) VALUES (?, ?, ?, ?)",
            (name, &slug, &slug, Utc::now().to_rfc3339()),
        )?;
        Ok(UserRecord {
            id: conn.last_insert_rowid() as u64,
            name: name.to_string(),
            token: slug.clone(),
            slug,
        })
    }

    pub fn get_user(&self, id: u64) -> Result<Option<UserRecord>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let user = conn
            .query_row(
                "SELECT id, name, slug, token FROM users WHERE id = ?",
                [id as i64],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn list_users(&self) -> Result<Vec<UserRecord>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare("SELECT id, name, slug, token FROM users ORDER BY name")?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    pub fn user_by_token(&self, token: &str) -> Result<Option<UserRecord>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let user = conn
            .query_row(
                "SELECT id, name, slug, token FROM users WHERE token = ?",
                [token],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    // ============================================================
    // Post operations
    // ============================================================

    pub fn create_post(&self, post_type: &str, input: NewPost) -> Result<PostRecord> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        tx.execute(
            "INSERT INTO posts (post_type, title, content, status, acf, author, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                post_type,
                &input.title,
                &input.content,
                &input.status,
                Value::Object(input.acf).to_string(),
                input.author.map(|id| id as i64),
                &now,
                &now,
            ),
        )?;
        let id = tx.last_insert_rowid() as u64;
        for (taxonomy, ids) in &input.terms {
            set_post_terms(&tx, id, taxonomy, ids)?;
        }
        tx.commit()?;

        load_post(&conn, post_type, id)?
            .ok_or_else(|| anyhow::anyhow!("Post {} vanished after insert", id))
    }

    pub fn get_post(&self, post_type: &str, id: u64) -> Result<Option<PostRecord>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        load_post(&conn, post_type, id)
    }

    /// Published posts of a type, newest first, optionally restricted to
    /// those carrying one term.
    pub fn list_posts(
        &self,
        post_type: &str,
        term: Option<(&str, u64)>,
    ) -> Result<Vec<PostRecord>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let (taxonomy, term_id) = match term {
            Some((taxonomy, id)) => (Some(taxonomy), Some(id as i64)),
            None => (None, None),
        };
        let mut stmt = conn.prepare(
            "SELECT id FROM posts p
             WHERE p.post_type = ?1 AND p.status = 'publish'
               AND (?2 IS NULL OR p.id IN (
                   SELECT pt.post_id FROM post_terms pt JOIN terms t ON t.id = pt.term_id
                   WHERE t.id = ?2 AND t.taxonomy = ?3))
             ORDER BY p.id DESC",
        )?;
        let ids = stmt
            .query_map((post_type, term_id, taxonomy), |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut posts = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(post) = load_post(&conn, post_type, id as u64)? {
                posts.push(post);
            }
        }
        Ok(posts)
    }

    pub fn update_post(
        &self,
        post_type: &str,
        id: u64,
        patch: PostPatch,
    ) -> Result<Option<PostRecord>> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let Some(existing) = load_post(&conn, post_type, id)? else {
            return Ok(None);
        };

        let mut acf = existing.acf;
        if let Some(changes) = patch.acf {
            acf.extend(changes);
        }

        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE posts SET title = ?, content = ?, status = ?, acf = ?, updated_at = ? WHERE id = ?",
            (
                patch.title.unwrap_or(existing.title),
                patch.content.unwrap_or(existing.content),
                patch.status.unwrap_or(existing.status),
                Value::Object(acf).to_string(),
                Utc::now().to_rfc3339(),
                id as i64,
            ),
        )?;
        for (taxonomy, ids) in &patch.terms {
            set_post_terms(&tx, id, taxonomy, ids)?;
        }
        tx.commit()?;

        load_post(&conn, post_type, id)
    }

    // ============================================================
    // Term operations
    // ============================================================

    pub fn create_term(&self, taxonomy: &str, input: NewTerm) -> Result<TermRecord> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let slug = unique_slug(
            &conn,
            "SELECT COUNT(*) FROM terms WHERE slug = ?1 AND taxonomy = ?2",
            Some(taxonomy),
            &input.name,
        )?;
        conn.execute(
            "INSERT INTO terms (taxonomy, name, slug, description, parent) VALUES (?, ?, ?, ?, ?)",
            (
                taxonomy,
                &input.name,
                &slug,
                &input.description,
                input.parent as i64,
            ),
        )?;
        Ok(TermRecord {
            id: conn.last_insert_rowid() as u64,
            taxonomy: taxonomy.to_string(),
            name: input.name,
            slug,
            description: input.description,
            parent: input.parent,
            count: 0,
        })
    }

    pub fn get_term(&self, taxonomy: &str, id: u64) -> Result<Option<TermRecord>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let term = conn
            .query_row(
                &format!("{TERM_SELECT} WHERE t.taxonomy = ? AND t.id = ?"),
                (taxonomy, id as i64),
                term_from_row,
            )
            .optional()?;
        Ok(term)
    }

    /// Terms of a taxonomy by name, optionally only the direct children of
    /// `parent` (`0` selects root terms).
    pub fn list_terms(&self, taxonomy: &str, parent: Option<u64>) -> Result<Vec<TermRecord>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "{TERM_SELECT} WHERE t.taxonomy = ?1 AND (?2 IS NULL OR t.parent = ?2) ORDER BY t.name"
        ))?;
        let terms = stmt
            .query_map((taxonomy, parent.map(|p| p as i64)), term_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(terms)
    }
}

const TERM_SELECT: &str = "SELECT t.id, t.taxonomy, t.name, t.slug, t.description, t.parent,
        (SELECT COUNT(*) FROM post_terms pt JOIN posts p ON p.id = pt.post_id
         WHERE pt.term_id = t.id AND p.status = 'publish')
     FROM terms t";

fn load_post(conn: &Connection, post_type: &str, id: u64) -> Result<Option<PostRecord>> {
    let post = conn
        .query_row(
            "SELECT id, post_type, title, content, status, acf, author, created_at, updated_at
             FROM posts WHERE post_type = ? AND id = ?",
            (post_type, id as i64),
            post_from_row,
        )
        .optional()?;
    let Some(mut post) = post else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT t.taxonomy, t.id FROM post_terms pt JOIN terms t ON t.id = pt.term_id
         WHERE pt.post_id = ? ORDER BY pt.position",
    )?;
    let rows = stmt.query_map([id as i64], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
    })?;
    for row in rows {
        let (taxonomy, term) = row?;
        post.terms.entry(taxonomy).or_default().push(term);
    }
    Ok(Some(post))
}

fn set_post_terms(conn: &Connection, post: u64, taxonomy: &str, ids: &[u64]) -> Result<()> {
    conn.execute(
        "DELETE FROM post_terms WHERE post_id = ?1
           AND term_id IN (SELECT id FROM terms WHERE taxonomy = ?2)",
        (post as i64, taxonomy),
    )?;
    for (position, term) in ids.iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO post_terms (post_id, term_id, position) VALUES (?, ?, ?)",
            (post as i64, *term as i64, position as i64),
        )
        .with_context(|| format!("Failed to attach term {} to post {}", term, post))?;
    }
    Ok(())
}

fn post_from_row(row: &Row) -> rusqlite::Result<PostRecord> {
    Ok(PostRecord {
        id: row.get::<_, i64>(0)? as u64,
        post_type: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        status: row.get(4)?,
        acf: parse_acf(row.get::<_, String>(5)?),
        author: row.get::<_, Option<i64>>(6)?.map(|id| id as u64),
        terms: BTreeMap::new(),
        created_at: parse_datetime(row.get::<_, String>(7)?),
        updated_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

fn term_from_row(row: &Row) -> rusqlite::Result<TermRecord> {
    Ok(TermRecord {
        id: row.get::<_, i64>(0)? as u64,
        taxonomy: row.get(1)?,
        name: row.get(2)?,
        slug: row.get(3)?,
        description: row.get(4)?,
        parent: row.get::<_, i64>(5)? as u64,
        count: row.get::<_, i64>(6)? as u64,
    })
}

fn user_from_row(row: &Row) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get::<_, i64>(0)? as u64,
        name: row.get(1)?,
        slug: row.get(2)?,
        token: row.get(3)?,
    })
}

/// Lowercase ASCII slug; runs of anything else collapse to one dash.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// `slugify(name)`, suffixed `-2`, `-3`, ... until `count_sql` finds no row.
fn unique_slug(
    conn: &Connection,
    count_sql: &str,
    scope: Option<&str>,
    name: &str,
) -> Result<String> {
    let base = slugify(name);
    let mut candidate = base.clone();
    let mut n = 2;
    loop {
        let taken: i64 = match scope {
            Some(scope) => conn.query_row(count_sql, (&candidate, scope), |row| row.get(0))?,
            None => conn.query_row(count_sql, [&candidate], |row| row.get(0))?,
        };
        if taken == 0 {
            return Ok(candidate);
        }
        candidate = format!("{}-{}", base, n);
        n += 1;
    }
}

fn parse_acf(s: String) -> Map<String, Value> {
    match serde_json::from_str(&s) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert_eq!(slugify("Diwali Prep 2024"), "diwali-prep-2024");
        assert_eq!(slugify("  Asha & Ravi!  "), "asha-ravi");
        assert_eq!(slugify("???"), "untitled");
    }

    #[test]
    fn acf_that_is_not_an_object_reads_empty() {
        assert!(parse_acf("[]".to_string()).is_empty());
        assert!(parse_acf("garbage".to_string()).is_empty());
    }
}
