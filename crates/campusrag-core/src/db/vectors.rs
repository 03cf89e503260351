//! Embedding storage and brute-force cosine search

use super::content::{fragment_from_row, fragment_id_from_hash, resolve_rowid, FRAGMENT_COLUMNS};
use super::KnowledgeBase;
use crate::error::{CampusRagError, Result};
use crate::search::DocumentFragment;
use chrono::Utc;
use rusqlite::params;

impl KnowledgeBase {
    /// Store or replace the embedding of a fragment
    pub fn set_embedding(&self, id: &str, embedding: &[f32]) -> Result<()> {
        if embedding.is_empty() {
            return Err(CampusRagError::InvalidInput("embedding is empty".to_string()));
        }

        let conn = self.conn()?;
        let rowid = resolve_rowid(&conn, id)?;
        conn.execute(
            "INSERT OR REPLACE INTO embeddings (fragment_id, dimensions, embedding, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                rowid,
                embedding.len() as i64,
                embedding_to_bytes(embedding),
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Number of stored embeddings
    pub fn count_embeddings(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Whether any fragment has an embedding
    pub fn has_vector_index(&self) -> bool {
        self.count_embeddings().map(|n| n > 0).unwrap_or(false)
    }

    /// Fragments without an embedding, as (id, content)
    pub fn fragments_missing_embeddings(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT f.hash, f.content FROM fragments f
             LEFT JOIN embeddings e ON e.fragment_id = f.id
             WHERE e.fragment_id IS NULL
             ORDER BY f.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    fragment_id_from_hash(&row.get::<_, String>(0)?),
                    row.get::<_, String>(1)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Fragments whose cosine similarity to `query_vector` is at least `floor`
    ///
    /// Scores are the similarities, most similar first. Embeddings of a
    /// different width than the query never match.
    pub fn search_vectors(
        &self,
        query_vector: &[f32],
        floor: f64,
        limit: usize,
    ) -> Result<Vec<DocumentFragment>> {
        if query_vector.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, e.embedding FROM fragments f
             JOIN embeddings e ON e.fragment_id = f.id
             WHERE e.dimensions = ?1",
            FRAGMENT_COLUMNS
        ))?;

        let mut scored = stmt
            .query_map(params![query_vector.len() as i64], |row| {
                let fragment = fragment_from_row(row)?;
                let bytes: Vec<u8> = row.get(4)?;
                Ok((fragment, bytes))
            })?
            .filter_map(|row| match row {
                Ok((fragment, bytes)) => {
                    let similarity = cosine_similarity(query_vector, &bytes_to_embedding(&bytes)) as f64;
                    (similarity >= floor).then(|| fragment.with_score(similarity))
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable embedding row: {}", e);
                    None
                }
            })
            .collect::<Vec<_>>();

        crate::search::sort_by_relevance(&mut scored);
        scored.truncate(limit);
        Ok(scored)
    }
}

/// Convert f32 vector to bytes for storage
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes back to f32 vector
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
