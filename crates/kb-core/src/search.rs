use crate::{
    document::Document,
    error::{KbError, Result},
};
use serde::Serialize;
use tantivy::{
    collector::TopDocs,
    query::QueryParser,
    schema::{Field, Schema, Value, STORED, STRING, TEXT},
    Index, IndexWriter, ReloadPolicy, TantivyDocument,
};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub path: String,
    pub category: String,
    pub title: String,
    pub score: f32,
}

// ---------------------------------------------------------------------------
// DocumentIndex
// ---------------------------------------------------------------------------

struct Fields {
    path: Field,
    category: Field,
    title: Field,
    body: Field,
}

pub struct DocumentIndex {
    index: Index,
    reader: tantivy::IndexReader,
    fields: Fields,
}

impl DocumentIndex {
    /// Build an ephemeral in-RAM index from the given documents.
    ///
    /// Indexed fields:
    /// - `path`     — STRING (exact-match, stored)
    /// - `category` — STRING (exact-match, stored) — allows `category:Prompts` scoping
    /// - `title`    — TEXT (tokenized, stored)
    /// - `body`     — TEXT (tokenized, not stored) — base name plus document body
    pub fn build(documents: &[&Document]) -> Result<Self> {
        let (schema, fields) = build_schema();

        let index = Index::create_in_ram(schema);

        let mut writer: IndexWriter = index
            .writer(15_000_000)
            .map_err(|e| KbError::Search(e.to_string()))?;

        for d in documents {
            let mut doc = TantivyDocument::default();
            doc.add_text(fields.path, &d.path);
            doc.add_text(fields.category, &d.category);
            doc.add_text(fields.title, d.title());

            // Base name is tokenized so "fix" finds "fix-issue.md".
            let mut body = d.base_name().replace(['-', '_'], " ");
            if let Some(desc) = d.front_matter.as_ref().and_then(|fm| fm.description.as_ref()) {
                body.push(' ');
                body.push_str(desc);
            }
            body.push(' ');
            body.push_str(d.body());
            doc.add_text(fields.body, body);

            writer
                .add_document(doc)
                .map_err(|e| KbError::Search(e.to_string()))?;
        }

        writer
            .commit()
            .map_err(|e| KbError::Search(e.to_string()))?;

        // Manual reload — we only ever read after the single commit above
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e: tantivy::TantivyError| KbError::Search(e.to_string()))?;

        Ok(Self {
            index,
            reader,
            fields,
        })
    }

    /// BM25 full-text search. Returns up to `limit` results sorted by score descending.
    ///
    /// Supported query syntax:
    /// - Bare terms: `swift concurrency`   (AND by default)
    /// - Phrase:     `"exact phrase"`
    /// - Boolean:    `hook OR command`, `issue NOT closed`
    /// - Field scope: `category:Prompts`, `title:review`
    /// - Prefix:     `refact*`
    pub fn search(&self, query_str: &str, limit: usize) -> Result<Vec<SearchResult>> {
        if limit == 0 {
            return Ok(vec![]);
        }
        let searcher = self.reader.searcher();

        let default_fields = vec![self.fields.title, self.fields.body];
        let mut parser = QueryParser::for_index(&self.index, default_fields);
        parser.set_conjunction_by_default();

        let query = match parser.parse_query(query_str) {
            Ok(q) => q,
            Err(_) => return Ok(vec![]),
        };

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(|e| KbError::Search(e.to_string()))?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (score, doc_addr) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(doc_addr)
                .map_err(|e| KbError::Search(e.to_string()))?;

            let stored = |field: Field| {
                doc.get_first(field)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            };

            results.push(SearchResult {
                path: stored(self.fields.path),
                category: stored(self.fields.category),
                title: stored(self.fields.title),
                score,
            });
        }

        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// Schema construction
// ---------------------------------------------------------------------------

fn build_schema() -> (Schema, Fields) {
    let mut builder = Schema::builder();

    let path = builder.add_text_field("path", STRING | STORED);
    let category = builder.add_text_field("category", STRING | STORED);
    let title = builder.add_text_field("title", TEXT | STORED);
    let body = builder.add_text_field("body", TEXT);

    let schema = builder.build();
    let fields = Fields {
        path,
        category,
        title,
        body,
    };
    (schema, fields)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
