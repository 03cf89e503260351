//! Fragment storage operations

use super::vectors::embedding_to_bytes;
use super::KnowledgeBase;
use crate::error::{CampusRagError, Result};
use crate::search::DocumentFragment;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Characters of the content hash used as a fragment id
pub const FRAGMENT_ID_CHARS: usize = 12;

/// Hash content using SHA-256
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Short fragment id (hash prefix)
pub fn fragment_id_from_hash(hash: &str) -> String {
    hash.chars().take(FRAGMENT_ID_CHARS).collect()
}

/// A pre-chunked fragment to store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFragment {
    pub content: String,
    pub source: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl NewFragment {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Result of storing a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inserted {
    pub id: String,
    /// False when identical content was already stored
    pub created: bool,
}

pub(crate) const FRAGMENT_COLUMNS: &str = "f.hash, f.content, f.source, f.metadata";

/// Map a row selected with `FRAGMENT_COLUMNS` into a fragment
pub(crate) fn fragment_from_row(row: &Row<'_>) -> rusqlite::Result<DocumentFragment> {
    let hash: String = row.get(0)?;
    let metadata_json: String = row.get(3)?;
    let metadata: HashMap<String, serde_json::Value> =
        serde_json::from_str(&metadata_json).unwrap_or_default();

    let mut fragment = DocumentFragment::new(
        fragment_id_from_hash(&hash),
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
    );
    fragment.metadata = metadata;
    Ok(fragment)
}

/// Row id of the single fragment whose hash starts with `id`
pub(crate) fn resolve_rowid(conn: &Connection, id: &str) -> Result<i64> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CampusRagError::InvalidInput(format!("invalid fragment id: {}", id)));
    }

    let mut stmt = conn.prepare("SELECT id FROM fragments WHERE hash LIKE ?1 || '%' LIMIT 2")?;
    let rowids = stmt
        .query_map(params![id.to_lowercase()], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    match rowids.as_slice() {
        [] => Err(CampusRagError::FragmentNotFound(id.to_string())),
        [rowid] => Ok(*rowid),
        _ => Err(CampusRagError::InvalidInput(format!("ambiguous fragment id: {}", id))),
    }
}

impl KnowledgeBase {
    /// Store a fragment, optionally with its embedding
    ///
    /// Identical content is stored once; a second insert returns the
    /// existing id and leaves the stored row untouched.
    pub fn insert_fragment(&self, fragment: NewFragment, embedding: Option<&[f32]>) -> Result<Inserted> {
        if fragment.content.trim().is_empty() {
            return Err(CampusRagError::InvalidInput(
                "fragment content is empty".to_string(),
            ));
        }

        let hash = hash_content(&fragment.content);
        let title = fragment
            .metadata
            .get("title")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let metadata = serde_json::to_string(&fragment.metadata)?;
        let now = Utc::now().to_rfc3339();

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "INSERT OR IGNORE INTO fragments (hash, content, source, title, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![hash, fragment.content, fragment.source, title, metadata, now],
        )?;

        if rows > 0 {
            if let Some(embedding) = embedding {
                let rowid = tx.last_insert_rowid();
                tx.execute(
                    "INSERT OR REPLACE INTO embeddings (fragment_id, dimensions, embedding, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![rowid, embedding.len() as i64, embedding_to_bytes(embedding), now],
                )?;
            }
        }
        tx.commit()?;

        Ok(Inserted {
            id: fragment_id_from_hash(&hash),
            created: rows > 0,
        })
    }

    /// Look up a fragment by id or by any longer hash prefix
    pub fn get_fragment(&self, id: &str) -> Result<DocumentFragment> {
        let conn = self.conn()?;
        let rowid = resolve_rowid(&conn, id)?;
        let fragment = conn.query_row(
            &format!("SELECT {} FROM fragments f WHERE f.id = ?1", FRAGMENT_COLUMNS),
            params![rowid],
            fragment_from_row,
        )?;
        Ok(fragment)
    }

    /// Whether identical content is already stored
    pub fn contains_content(&self, content: &str) -> Result<bool> {
        let hash = hash_content(content);
        let found = self
            .conn()?
            .query_row(
                "SELECT 1 FROM fragments WHERE hash = ?1",
                params![hash],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Number of stored fragments
    pub fn count_fragments(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM fragments", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Distinct fragment sources with fragment counts
    pub fn sources(&self) -> Result<Vec<(String, usize)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT source, COUNT(*) FROM fragments GROUP BY source ORDER BY COUNT(*) DESC, source",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kb() -> KnowledgeBase {
        let kb = KnowledgeBase::open_in_memory().unwrap();
        kb.initialize().unwrap();
        kb
    }

    #[test]
    fn test_hash_content_is_stable() {
        assert_eq!(hash_content("abc"), hash_content("abc"));
        assert_eq!(hash_content("abc").len(), 64);
        assert_eq!(fragment_id_from_hash(&hash_content("abc")).len(), FRAGMENT_ID_CHARS);
    }

    #[test]
    fn test_insert_and_get() {
        let kb = kb();
        let inserted = kb
            .insert_fragment(
                NewFragment::new("BSCS fee is PKR 171,350", "fees.pdf")
                    .with_metadata("title", json!("Fee Structure")),
                None,
            )
            .unwrap();
        assert!(inserted.created);

        let fragment = kb.get_fragment(&inserted.id).unwrap();
        assert_eq!(fragment.source, "fees.pdf");
        assert_eq!(fragment.title(), Some("Fee Structure"));
        assert_eq!(kb.count_fragments().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_content_is_ignored() {
        let kb = kb();
        let first = kb.insert_fragment(NewFragment::new("same", "a"), None).unwrap();
        let second = kb.insert_fragment(NewFragment::new("same", "b"), None).unwrap();
        assert_eq!(first.id, second.id);
        assert!(!second.created);
        assert_eq!(kb.count_fragments().unwrap(), 1);
        assert_eq!(kb.get_fragment(&first.id).unwrap().source, "a");
        assert!(kb.contains_content("same").unwrap());
    }

    #[test]
    fn test_empty_content_rejected() {
        assert!(matches!(
            kb().insert_fragment(NewFragment::new("  ", "a"), None),
            Err(CampusRagError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_get_missing_and_invalid() {
        let kb = kb();
        assert!(matches!(kb.get_fragment("abcdef"), Err(CampusRagError::FragmentNotFound(_))));
        assert!(matches!(kb.get_fragment("%"), Err(CampusRagError::InvalidInput(_))));
    }

    #[test]
    fn test_sources() {
        let kb = kb();
        kb.insert_fragment(NewFragment::new("one", "fees.pdf"), None).unwrap();
        kb.insert_fragment(NewFragment::new("two", "fees.pdf"), None).unwrap();
        kb.insert_fragment(NewFragment::new("three", "net.html"), None).unwrap();
        assert_eq!(
            kb.sources().unwrap(),
            vec![("fees.pdf".to_string(), 2), ("net.html".to_string(), 1)]
        );
    }
}
