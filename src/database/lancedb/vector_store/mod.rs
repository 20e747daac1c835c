
use super::{IndexMetadata, METADATA_FILE_NAME};
use crate::documents::DocumentKind;
use crate::embeddings::Chunk;
use crate::index::{IndexedChunk, VectorIndex};
use crate::{AssistantError, Result};
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const TABLE_NAME: &str = "chunks";

/// Durable home of a [`VectorIndex`]: one LanceDB table plus a metadata sidecar
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
    table_name: String,
}

impl IndexStore {
    /// Create a store rooted at `path`; nothing is touched on disk until save or load
    #[inline]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table_name: TABLE_NAME.to_string(),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_FILE_NAME)
    }

    async fn connect(&self) -> Result<Connection> {
        let uri = self.path.to_string_lossy();
        debug!("Connecting to LanceDB at {}", uri);
        lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to connect to LanceDB: {}", e)))
    }

    /// Whether a saved index exists at this location
    #[inline]
    pub async fn exists(&self) -> Result<bool> {
        if !self.path.is_dir() {
            return Ok(false);
        }
        let connection = self.connect().await?;
        self.table_exists(&connection).await
    }

    async fn table_exists(&self, connection: &Connection) -> Result<bool> {
        let table_names = connection
            .table_names()
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to list tables: {}", e)))?;
        Ok(table_names.contains(&self.table_name))
    }

    /// Persist the index, replacing whatever was stored before.
    ///
    /// Saving the same index twice leaves the store in the same state.
    #[inline]
    pub async fn save(&self, index: &VectorIndex) -> Result<()> {
        if index.is_empty() {
            return Err(AssistantError::Database(
                "Refusing to save an empty index".to_string(),
            ));
        }

        std::fs::create_dir_all(&self.path).map_err(|e| {
            AssistantError::Database(format!("Failed to create index directory: {}", e))
        })?;

        let connection = self.connect().await?;
        self.drop_table_if_exists(&connection).await?;

        let schema = Self::create_schema(index.dimension())?;
        connection
            .create_empty_table(&self.table_name, Arc::clone(&schema))
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to create table: {}", e)))?;

        let table = connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to open table: {}", e)))?;

        let record_batch = Self::create_record_batch(index, schema)?;
        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to insert chunks: {}", e)))?;

        self.write_metadata(&IndexMetadata::new(
            index.model(),
            index.dimension(),
            index.len(),
        ))?;

        info!(
            "Saved {} chunks ({} dimensions) to {}",
            index.len(),
            index.dimension(),
            self.path.display()
        );
        Ok(())
    }

    /// Restore a previously saved index.
    ///
    /// Returns `Ok(None)` when nothing has been saved at this location.
    #[inline]
    pub async fn load(&self) -> Result<Option<VectorIndex>> {
        if !self.path.is_dir() {
            debug!("No index directory at {}", self.path.display());
            return Ok(None);
        }

        let connection = self.connect().await?;
        if !self.table_exists(&connection).await? {
            debug!("No chunks table in {}", self.path.display());
            return Ok(None);
        }

        let table = connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to open table: {}", e)))?;

        let row_count = table
            .count_rows(None)
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to count rows: {}", e)))?;
        if row_count == 0 {
            warn!("Stored index at {} is empty", self.path.display());
            return Ok(None);
        }

        let mut stream = table
            .query()
            .limit(row_count)
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to query table: {}", e)))?;

        let mut rows = Vec::with_capacity(row_count);
        while let Some(batch) = stream
            .try_next()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to read result stream: {}", e)))?
        {
            rows.extend(Self::parse_batch(&batch)?);
        }
        rows.sort_by_key(|(ordinal, _)| *ordinal);

        let model = match self.read_metadata() {
            Some(metadata) => metadata.model,
            None => {
                warn!("Index metadata missing; embedding model is unknown");
                "unknown".to_string()
            }
        };

        let entries = rows.into_iter().map(|(_, entry)| entry).collect();
        let index = VectorIndex::from_entries(entries, &model)?;
        info!(
            "Loaded {} chunks from {}",
            index.len(),
            self.path.display()
        );
        Ok(Some(index))
    }

    /// Read the metadata sidecar; absent or unreadable metadata yields `None`
    #[inline]
    pub fn read_metadata(&self) -> Option<IndexMetadata> {
        let path = self.metadata_path();
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!("Ignoring unreadable index metadata {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write_metadata(&self, metadata: &IndexMetadata) -> Result<()> {
        let content = serde_json::to_string_pretty(metadata).map_err(|e| {
            AssistantError::Database(format!("Failed to serialize index metadata: {}", e))
        })?;
        std::fs::write(self.metadata_path(), content).map_err(|e| {
            AssistantError::Database(format!("Failed to write index metadata: {}", e))
        })
    }

    async fn drop_table_if_exists(&self, connection: &Connection) -> Result<()> {
        if self.table_exists(connection).await? {
            info!("Dropping existing chunks table");
            connection
                .drop_table(&self.table_name)
                .await
                .map_err(|e| AssistantError::Database(format!("Failed to drop table: {}", e)))?;
        }
        Ok(())
    }

    fn create_schema(vector_dim: usize) -> Result<Arc<Schema>> {
        let vector_dim = i32::try_from(vector_dim).map_err(|_| {
            AssistantError::Database(format!("Vector dimension {} is too large", vector_dim))
        })?;
        Ok(Arc::new(Schema::new(vec![
            Field::new("ordinal", DataType::UInt32, false),
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    vector_dim,
                ),
                false,
            ),
            Field::new("source", DataType::Utf8, false),
            Field::new("row", DataType::UInt32, true),
            Field::new("kind", DataType::Utf8, false),
            Field::new("chunk_index", DataType::UInt32, false),
            Field::new("char_offset", DataType::UInt32, false),
            Field::new("content", DataType::Utf8, false),
        ])))
    }

    fn create_record_batch(index: &VectorIndex, schema: Arc<Schema>) -> Result<RecordBatch> {
        let entries = index.entries();
        let len = entries.len();
        let vector_dim = index.dimension();

        let mut ordinals = Vec::with_capacity(len);
        let mut ids = Vec::with_capacity(len);
        let mut flat_values = Vec::with_capacity(len * vector_dim);
        let mut sources = Vec::with_capacity(len);
        let mut rows = Vec::with_capacity(len);
        let mut kinds = Vec::with_capacity(len);
        let mut chunk_indices = Vec::with_capacity(len);
        let mut char_offsets = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);

        for (ordinal, entry) in entries.iter().enumerate() {
            let chunk = &entry.chunk;
            ordinals.push(to_u32(ordinal, "ordinal")?);
            ids.push(chunk.id.as_str());
            flat_values.extend_from_slice(&entry.vector);
            sources.push(chunk.source.as_str());
            rows.push(chunk.row.map(|row| to_u32(row, "row")).transpose()?);
            kinds.push(chunk.kind.to_string());
            chunk_indices.push(to_u32(chunk.chunk_index, "chunk_index")?);
            char_offsets.push(to_u32(chunk.char_offset, "char_offset")?);
            contents.push(chunk.content.as_str());
        }

        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_dim = i32::try_from(vector_dim).map_err(|_| {
            AssistantError::Database(format!("Vector dimension {} is too large", vector_dim))
        })?;
        let vector_array =
            FixedSizeListArray::try_new(field, vector_dim, Arc::new(values_array), None).map_err(
                |e| AssistantError::Database(format!("Failed to create vector array: {}", e)),
            )?;

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(UInt32Array::from(ordinals)),
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(sources)),
            Arc::new(UInt32Array::from(rows)),
            Arc::new(StringArray::from(kinds)),
            Arc::new(UInt32Array::from(chunk_indices)),
            Arc::new(UInt32Array::from(char_offsets)),
            Arc::new(StringArray::from(contents)),
        ];

        RecordBatch::try_new(schema, arrays)
            .map_err(|e| AssistantError::Database(format!("Failed to create record batch: {}", e)))
    }

    /// Parse one record batch into (ordinal, entry) pairs
    fn parse_batch(batch: &RecordBatch) -> Result<Vec<(u32, IndexedChunk)>> {
        let ordinals = column::<UInt32Array>(batch, "ordinal")?;
        let ids = column::<StringArray>(batch, "id")?;
        let vectors = column::<FixedSizeListArray>(batch, "vector")?;
        let sources = column::<StringArray>(batch, "source")?;
        let rows = column::<UInt32Array>(batch, "row")?;
        let kinds = column::<StringArray>(batch, "kind")?;
        let chunk_indices = column::<UInt32Array>(batch, "chunk_index")?;
        let char_offsets = column::<UInt32Array>(batch, "char_offset")?;
        let contents = column::<StringArray>(batch, "content")?;

        let mut parsed = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            let kind = DocumentKind::parse(kinds.value(i)).ok_or_else(|| {
                AssistantError::Database(format!("Unknown document kind '{}'", kinds.value(i)))
            })?;

            let vector_values = vectors.value(i);
            let vector = vector_values
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(|| AssistantError::Database("Invalid vector item type".to_string()))?
                .values()
                .to_vec();

            let chunk = Chunk {
                id: ids.value(i).to_string(),
                source: sources.value(i).to_string(),
                row: if rows.is_null(i) {
                    None
                } else {
                    Some(rows.value(i) as usize)
                },
                kind,
                chunk_index: chunk_indices.value(i) as usize,
                char_offset: char_offsets.value(i) as usize,
                content: contents.value(i).to_string(),
            };

            parsed.push((ordinals.value(i), IndexedChunk { chunk, vector }));
        }

        debug!("Parsed {} stored chunks", parsed.len());
        Ok(parsed)
    }
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .ok_or_else(|| AssistantError::Database(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| AssistantError::Database(format!("Invalid {} column type", name)))
}

fn to_u32(value: usize, field: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| AssistantError::Database(format!("{} value {} exceeds u32", field, value)))
}
