//! Tantivy-based search index module.
//!
//! Full-text search over clip titles, streamers and submitters with field boosting.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{BooleanQuery, BoostQuery, Occur, QueryParser};
use tantivy::schema::{Field, Schema, Value, STORED, STRING, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::Clip;

const BOOST_TITLE: f32 = 10.0;
const BOOST_STREAMER: f32 = 8.0;
const BOOST_SUBMITTER: f32 = 4.0;

/// Search result with clip id and relevance score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub clip_id: String,
    pub score: f32,
}

/// One page of hits plus the number of documents that matched.
#[derive(Debug, Clone, Default)]
pub struct SearchHits {
    pub total: usize,
    pub results: Vec<SearchResult>,
}

/// Search index schema fields.
struct SearchFields {
    clip_id: Field,
    title: Field,
    streamer: Field,
    submitter: Field,
}

/// Tantivy search index for clips.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: SearchFields,
    /// Fingerprint of the clip set currently indexed.
    indexed: RwLock<Option<u64>>,
}

impl SearchIndex {
    /// Create or open a search index at the specified path.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        let mut schema_builder = Schema::builder();
        let clip_id = schema_builder.add_text_field("clip_id", STRING | STORED);
        let title = schema_builder.add_text_field("title", TEXT);
        let streamer = schema_builder.add_text_field("streamer", TEXT);
        let submitter = schema_builder.add_text_field("submitter", TEXT);
        let schema = schema_builder.build();

        let fields = SearchFields {
            clip_id,
            title,
            streamer,
            submitter,
        };

        let index = Index::open_in_dir(index_path)
            .or_else(|_| Index::create_in_dir(index_path, schema.clone()))
            .map_err(|e| AppError::Search(format!("Failed to open/create index: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        let writer = index
            .writer_with_num_threads(1, 20_000_000)
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
            indexed: RwLock::new(None),
        })
    }

    /// Replace the index content with the given clips.
    pub async fn rebuild(&self, clips: &[Clip]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;
        self.replace_documents(&mut writer, clips)?;
        *self.indexed.write().await = Some(fingerprint(clips));
        Ok(())
    }

    /// Rebuild only if `clips` differs from the indexed clip set.
    ///
    /// Returns whether a rebuild happened.
    pub async fn refresh(&self, clips: &[Clip]) -> Result<bool, AppError> {
        let current = fingerprint(clips);
        if *self.indexed.read().await == Some(current) {
            return Ok(false);
        }

        let mut writer = self.writer.write().await;
        // Another request may have rebuilt while we waited for the writer
        if *self.indexed.read().await == Some(current) {
            return Ok(false);
        }
        self.replace_documents(&mut writer, clips)?;
        *self.indexed.write().await = Some(current);
        Ok(true)
    }

    fn replace_documents(&self, writer: &mut IndexWriter, clips: &[Clip]) -> Result<(), AppError> {
        writer.delete_all_documents()?;
        for clip in clips {
            writer.add_document(doc!(
                self.fields.clip_id => clip.id.clone(),
                self.fields.title => clip.title.clone(),
                self.fields.streamer => clip.streamer.clone(),
                self.fields.submitter => clip.submitter.clone()
            ))?;
        }
        writer.commit()?;

        self.reader.reload()?;

        tracing::debug!("Search index rebuilt with {} clips", clips.len());
        Ok(())
    }

    /// Search for clips matching the query.
    pub fn search(
        &self,
        query_str: &str,
        limit: usize,
        offset: usize,
    ) -> Result<SearchHits, AppError> {
        if query_str.trim().is_empty() || limit == 0 {
            return Ok(SearchHits::default());
        }

        let searcher = self.reader.searcher();
        let num_docs = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
        // The collector preallocates its heap, so never ask for more than exists
        let wanted = limit.saturating_add(offset).min(num_docs);
        if wanted == 0 {
            return Ok(SearchHits::default());
        }

        let field_queries = [
            (self.fields.title, BOOST_TITLE),
            (self.fields.streamer, BOOST_STREAMER),
            (self.fields.submitter, BOOST_SUBMITTER),
        ];

        let mut subqueries: Vec<(Occur, Box<dyn tantivy::query::Query>)> = Vec::new();
        for (field, boost) in field_queries {
            let mut field_parser = QueryParser::for_index(&self.index, vec![field]);
            field_parser.set_conjunction_by_default();
            let (field_query, _errors) = field_parser.parse_query_lenient(query_str);
            subqueries.push((Occur::Should, Box::new(BoostQuery::new(field_query, boost))));
        }
        let combined_query = BooleanQuery::new(subqueries);

        let (top_docs, total) = searcher
            .search(&combined_query, &(TopDocs::with_limit(wanted), Count))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let results = top_docs
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|(score, doc_address)| {
                let doc: TantivyDocument = searcher.doc(doc_address).ok()?;
                let clip_id = doc.get_first(self.fields.clip_id)?.as_str()?.to_string();
                Some(SearchResult { clip_id, score })
            })
            .collect();

        Ok(SearchHits { total, results })
    }
}

fn fingerprint(clips: &[Clip]) -> u64 {
    let mut hasher = DefaultHasher::new();
    clips.len().hash(&mut hasher);
    for clip in clips {
        clip.id.hash(&mut hasher);
        clip.title.hash(&mut hasher);
        clip.streamer.hash(&mut hasher);
        clip.submitter.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn clip(id: &str, title: &str, streamer: &str) -> Clip {
        Clip {
            id: id.to_string(),
            streamer: streamer.to_string(),
            title: title.to_string(),
            link: String::new(),
            url: String::new(),
            submitter: "someone".to_string(),
            upvotes: 0,
            downvotes: 0,
            created_at: Utc::now(),
            comments: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_search_by_title_and_streamer() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let clips = vec![
            clip("1", "Insane clutch round", "northwind"),
            clip("2", "Funny fail compilation", "southpaw"),
        ];
        index.rebuild(&clips).await.unwrap();

        let hits = index.search("clutch", 10, 0).unwrap();
        assert_eq!(hits.total, 1);
        assert_eq!(hits.results[0].clip_id, "1");

        let hits = index.search("southpaw", 10, 0).unwrap();
        assert_eq!(hits.results[0].clip_id, "2");
    }

    #[tokio::test]
    async fn test_rebuild_replaces_documents() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        index.rebuild(&[clip("1", "old clip", "x")]).await.unwrap();
        index.rebuild(&[clip("2", "new clip", "x")]).await.unwrap();

        let hits = index.search("clip", 10, 0).unwrap();
        assert_eq!(hits.results.len(), 1);
        assert_eq!(hits.results[0].clip_id, "2");
    }

    #[tokio::test]
    async fn test_search_empty_query() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();

        let hits = index.search("", 10, 0).unwrap();
        assert!(hits.results.is_empty());
        assert_eq!(hits.total, 0);
    }

    #[tokio::test]
    async fn test_total_counts_every_hit() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();
        index
            .rebuild(&[
                clip("1", "ranked clutch", "a"),
                clip("2", "clutch again", "b"),
                clip("3", "another clutch", "c"),
            ])
            .await
            .unwrap();

        let hits = index.search("clutch", 1, 1).unwrap();
        assert_eq!(hits.total, 3);
        assert_eq!(hits.results.len(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_paging() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();
        index.rebuild(&[clip("1", "clutch", "a")]).await.unwrap();

        let hits = index.search("clutch", 10, usize::MAX).unwrap();
        assert!(hits.results.is_empty());
        assert_eq!(hits.total, 1);

        let hits = index.search("clutch", 0, 0).unwrap();
        assert!(hits.results.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_only_when_clips_change() {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open(temp_dir.path()).unwrap();
        let clips = vec![clip("1", "clutch", "a"), clip("2", "fail", "b")];

        assert!(index.refresh(&clips).await.unwrap());
        assert!(!index.refresh(&clips).await.unwrap());

        assert!(index.refresh(&clips[..1]).await.unwrap());
        assert_eq!(index.search("fail", 10, 0).unwrap().total, 0);

        let mut renamed = clips[..1].to_vec();
        renamed[0].title = "ace".to_string();
        assert!(index.refresh(&renamed).await.unwrap());
        assert_eq!(index.search("ace", 10, 0).unwrap().total, 1);
    }
}
