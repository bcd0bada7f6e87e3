//! LanceDB vector index for locally stored legislation passages.
//!
//! One table holds the passages: `full_reference` (Utf8), `text` (Utf8) and
//! `embedding` (FixedSizeList<Float32>). Queries are embedded with the same
//! [`Embeddings`] implementation used to populate the table, which
//! [`LanceIndex::index_sources`] fills from JSON Lines passage records
//! (`taxlaw index <file>`).

use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, FixedSizeListBuilder, Float32Builder, LargeStringArray, RecordBatchIterator,
    StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use futures::TryStreamExt;
use serde::Deserialize;
use lancedb::query::{ExecutableQuery, QueryBase};
use tracing::info;

use crate::{Embeddings, RetrievalError, SearchMatch, VectorIndex};

pub const PASSAGES_TABLE: &str = "tax_passages";

/// A passage ready to be written to the index.
#[derive(Debug, Clone)]
pub struct Passage {
    pub full_reference: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// One line of a passages file: `{"full_reference": "...", "text": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PassageSource {
    pub full_reference: String,
    pub text: String,
}

/// Parse JSON Lines passage records, ignoring blank lines.
pub fn read_passage_sources(jsonl: &str) -> Result<Vec<PassageSource>, RetrievalError> {
    jsonl
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| RetrievalError::Other(format!("passages line {}: {e}", i + 1)))
        })
        .collect()
}

/// Similarity search over a LanceDB passages table.
pub struct LanceIndex {
    db: lancedb::Connection,
    table: String,
    embeddings: Arc<dyn Embeddings>,
}

impl LanceIndex {
    /// Connect to a LanceDB database at the given path.
    ///
    /// Creates the database directory if it doesn't exist.
    pub async fn open(path: &Path, embeddings: Arc<dyn Embeddings>) -> Result<Self, RetrievalError> {
        let uri = path
            .to_str()
            .ok_or_else(|| RetrievalError::Other("non-UTF8 database path".into()))?;
        let db = lancedb::connect(uri).execute().await?;
        Ok(Self {
            db,
            table: PASSAGES_TABLE.to_string(),
            embeddings,
        })
    }

    /// List table names in the database.
    pub async fn table_names(&self) -> Result<Vec<String>, RetrievalError> {
        let names = self.db.table_names().execute().await?;
        Ok(names)
    }

    /// Count rows in the passages table.
    pub async fn passage_count(&self) -> Result<usize, RetrievalError> {
        let table = self.db.open_table(&self.table).execute().await?;
        let count = table.count_rows(None).await?;
        Ok(count)
    }

    /// Create (or replace) the passages table.
    pub async fn write_passages(&self, passages: &[Passage]) -> Result<(), RetrievalError> {
        let batch = passages_batch(passages)?;
        let rows = batch.num_rows();
        let schema = batch.schema();
        let reader = RecordBatchIterator::new(vec![Ok(batch)], schema);

        let existing = self.table_names().await?;
        if existing.contains(&self.table) {
            self.db.drop_table(&self.table, &[]).await?;
        }

        self.db
            .create_table(&self.table, Box::new(reader))
            .execute()
            .await?;

        info!(table = %self.table, rows, "created LanceDB passages table");
        Ok(())
    }

    /// Embed each passage text and replace the table with the result.
    /// Returns the number of rows now in the table.
    pub async fn index_sources(&self, sources: &[PassageSource]) -> Result<usize, RetrievalError> {
        let mut passages = Vec::with_capacity(sources.len());
        for source in sources {
            let embedding = self.embeddings.embed_query(&source.text).await?;
            passages.push(Passage {
                full_reference: source.full_reference.clone(),
                text: source.text.clone(),
                embedding,
            });
        }
        self.write_passages(&passages).await?;
        self.passage_count().await
    }
}

#[async_trait]
impl VectorIndex for LanceIndex {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchMatch>, RetrievalError> {
        let vector = self.embeddings.embed_query(query).await?;
        let table = self.db.open_table(&self.table).execute().await?;
        let batches: Vec<RecordBatch> = table
            .vector_search(vector.as_slice())?
            .limit(k)
            .execute()
            .await?
            .try_collect()
            .await?;

        let mut matches = Vec::new();
        for batch in &batches {
            let references = string_column(batch, "full_reference")?;
            let texts = string_column(batch, "text")?;
            for (reference, text) in references.into_iter().zip(texts) {
                matches.push(SearchMatch::new(&reference, text));
            }
        }
        matches.truncate(k);
        info!(k, returned = matches.len(), "lance similarity search");
        Ok(matches)
    }
}

/// Build a single RecordBatch from passages. All embeddings must share a length.
fn passages_batch(passages: &[Passage]) -> Result<RecordBatch, RetrievalError> {
    let dim = passages
        .first()
        .map(|p| p.embedding.len())
        .ok_or_else(|| RetrievalError::Other("no passages provided".into()))?;
    if passages.iter().any(|p| p.embedding.len() != dim) {
        return Err(RetrievalError::Other(format!(
            "all embeddings must have dimension {dim}"
        )));
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("full_reference", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new(
            "embedding",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                dim as i32,
            ),
            true,
        ),
    ]));

    let references = StringArray::from_iter_values(passages.iter().map(|p| p.full_reference.as_str()));
    let texts = StringArray::from_iter_values(passages.iter().map(|p| p.text.as_str()));

    let mut emb_builder = FixedSizeListBuilder::new(Float32Builder::new(), dim as i32);
    for passage in passages {
        let values = emb_builder.values();
        for &val in &passage.embedding {
            values.append_value(val);
        }
        emb_builder.append(true);
    }

    Ok(RecordBatch::try_new(
        schema,
        vec![
            Arc::new(references),
            Arc::new(texts),
            Arc::new(emb_builder.finish()),
        ],
    )?)
}

/// Extract a string column, accepting both `Utf8` and `LargeUtf8`.
fn string_column(batch: &RecordBatch, name: &str) -> Result<Vec<String>, RetrievalError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| RetrievalError::Other(format!("missing column {name}")))?;
    if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
        Ok((0..arr.len()).map(|i| arr.value(i).to_string()).collect())
    } else if let Some(arr) = col.as_any().downcast_ref::<LargeStringArray>() {
        Ok((0..arr.len()).map(|i| arr.value(i).to_string()).collect())
    } else {
        Err(RetrievalError::Other(format!(
            "unexpected {name} column type: {:?}",
            col.data_type()
        )))
    }
}
