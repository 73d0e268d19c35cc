use crate::config::{Config, SearchConfig, Tokenize};
use crate::types::{Document, SearchOptions, SearchRecord, SearchResult};
use crate::{Error, Result};
use std::collections::HashSet;
use std::time::Instant;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, PhraseQuery, Query, RegexQuery, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions, Value,
};
use tantivy::tokenizer::{
    AsciiFoldingFilter, LowerCaser, RemoveLongFilter, SimpleTokenizer, TextAnalyzer, TokenStream,
};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term, doc};
use tracing::{debug, info, warn};

const CONTENT_TOKENIZER: &str = "docsite_content";
const MAX_TOKEN_LEN: usize = 40;
const WRITER_MEMORY_BUDGET: usize = 50_000_000;

/// In-memory full-text index over one corpus snapshot.
///
/// Built once from a slice of documents and never mutated afterwards; a
/// rebuild produces a new `SearchIndex`.
pub struct SearchIndex {
    reader: IndexReader,
    url_field: Field,
    title_field: Field,
    page_title_field: Field,
    content_field: Field,
    search: SearchConfig,
    len: usize,
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("len", &self.len)
            .field("search", &self.search)
            .finish_non_exhaustive()
    }
}

impl SearchIndex {
    /// Flatten and index every document.
    ///
    /// Records are keyed by URL: when two documents route to the same URL
    /// the later one replaces the earlier one.
    pub fn build(documents: &[Document], config: &Config) -> Result<Self> {
        let start = Instant::now();

        let mut schema_builder = Schema::builder();
        let url_field = schema_builder.add_text_field("url", STRING | STORED);
        let title_field = schema_builder.add_text_field("title", STORED);
        let page_title_field = schema_builder.add_text_field("page_title", STORED);
        let content_indexing = TextFieldIndexing::default()
            .set_tokenizer(CONTENT_TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let content_field = schema_builder.add_text_field(
            "content",
            TextOptions::default().set_indexing_options(content_indexing),
        );
        let schema = schema_builder.build();

        let index = Index::create_in_ram(schema);
        index
            .tokenizers()
            .register(CONTENT_TOKENIZER, content_analyzer());

        // single indexing thread keeps one segment and a stable doc order
        let mut writer: IndexWriter = index
            .writer_with_num_threads(1, WRITER_MEMORY_BUDGET)
            .map_err(|e| Error::Index(format!("Failed to create writer: {e}")))?;

        let mut urls = HashSet::with_capacity(documents.len());
        let mut total_bytes = 0usize;

        for document in documents {
            let record = SearchRecord::from_document(document, &config.routes);
            total_bytes += record.indexed_text.len();

            if !urls.insert(record.url.clone()) {
                warn!(
                    "Duplicate URL {} (document {}); replacing earlier record",
                    record.url, document.id
                );
            }

            writer.delete_term(Term::from_field_text(url_field, &record.url));
            writer
                .add_document(doc!(
                    url_field => record.url.as_str(),
                    title_field => record.title.as_str(),
                    page_title_field => record.page_title.as_str(),
                    content_field => record.indexed_text.as_str(),
                ))
                .map_err(|e| Error::Index(format!("Failed to add document: {e}")))?;
        }

        writer
            .commit()
            .map_err(|e| Error::Index(format!("Failed to commit: {e}")))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| Error::Index(format!("Failed to create reader: {e}")))?;

        info!(
            "Indexed {} documents ({} bytes) in {}ms",
            urls.len(),
            total_bytes,
            start.elapsed().as_millis()
        );

        Ok(Self {
            reader,
            url_field,
            title_field,
            page_title_field,
            content_field,
            search: config.search.clone(),
            len: urls.len(),
        })
    }

    /// Number of distinct records in the index.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no records.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ranked lookup. An empty query, a query with no indexable words, a
    /// zero limit, or no matches all give an empty result.
    pub fn search(&self, query_str: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let start = Instant::now();
        let limit = options.limit.unwrap_or(self.search.default_limit);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let tokens = Self::query_tokens(query_str);
        if tokens.is_empty() {
            debug!("Query '{}' has no searchable tokens", query_str);
            return Ok(Vec::new());
        }

        let query = self.build_query(&tokens)?;
        let searcher = self.reader.searcher();
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(|e| Error::Index(format!("Search failed: {e}")))?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (_score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(doc_address)
                .map_err(|e| Error::Index(format!("Failed to retrieve doc: {e}")))?;

            results.push(SearchResult {
                url: Self::field_text(&doc, self.url_field)?,
                title: Self::field_text(&doc, self.title_field)?,
                page_title: Self::field_text(&doc, self.page_title_field)?,
            });
        }

        debug!(
            "Found {} results for query '{}' in {}ms",
            results.len(),
            query_str,
            start.elapsed().as_millis()
        );

        Ok(results)
    }

    /// Query words folded like indexed content, deduplicated, in query
    /// order. Over-long words are kept so they match nothing.
    fn query_tokens(query_str: &str) -> Vec<String> {
        let mut analyzer = query_analyzer();

        let mut seen = HashSet::new();
        let mut tokens = Vec::new();
        let mut stream = analyzer.token_stream(query_str);
        while stream.advance() {
            let text = &stream.token().text;
            if seen.insert(text.clone()) {
                tokens.push(text.clone());
            }
        }

        tokens
    }

    /// Every token must match; adjacent-ish tokens earn a proximity boost.
    fn build_query(&self, tokens: &[String]) -> Result<BooleanQuery> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(tokens.len() + 1);

        for token in tokens {
            clauses.push((Occur::Must, self.token_query(token)?));
        }

        if tokens.len() > 1 {
            let terms = tokens
                .iter()
                .map(|token| Term::from_field_text(self.content_field, token))
                .collect();
            let mut phrase = PhraseQuery::new(terms);
            phrase.set_slop(self.search.context_depth);
            clauses.push((
                Occur::Should,
                Box::new(BoostQuery::new(Box::new(phrase), self.search.context_boost)),
            ));
        }

        Ok(BooleanQuery::new(clauses))
    }

    fn token_query(&self, token: &str) -> Result<Box<dyn Query>> {
        let exact: Box<dyn Query> = Box::new(TermQuery::new(
            Term::from_field_text(self.content_field, token),
            IndexRecordOption::WithFreqs,
        ));

        let pattern = match self.search.tokenize {
            Tokenize::Strict => return Ok(exact),
            Tokenize::Forward => format!("{}.*", regex::escape(token)),
            Tokenize::Full => format!(".*{}.*", regex::escape(token)),
        };

        let partial = RegexQuery::from_pattern(&pattern, self.content_field)
            .map_err(|e| Error::Index(format!("Invalid token pattern '{pattern}': {e}")))?;

        Ok(Box::new(BooleanQuery::new(vec![
            (Occur::Should, exact),
            (Occur::Should, Box::new(partial)),
        ])))
    }

    fn field_text(doc: &TantivyDocument, field: Field) -> Result<String> {
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .map(std::string::ToString::to_string)
            .ok_or_else(|| Error::Index("Field not found in document".into()))
    }
}

fn content_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .filter(AsciiFoldingFilter)
        .build()
}

fn query_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(AsciiFoldingFilter)
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::types::{HeadingLevel, ImageBlock, PageType, RichTextBlock};

    fn page(slug: &str, title: &str, page_type: PageType, body: &[&str]) -> Document {
        Document {
            id: format!("id-{slug}"),
            title: title.to_string(),
            slug: slug.to_string(),
            page_type,
            meta_description: None,
            content: body
                .iter()
                .map(|text| RichTextBlock::paragraph(*text))
                .collect(),
        }
    }

    fn create_test_corpus() -> Vec<Document> {
        vec![
            page(
                "coherent-ofdm-radar",
                "Coherent OFDM Radar Backscatter",
                PageType::Dataset,
                &["Raw backscatter captures from a software defined radar."],
            ),
            page(
                "about-us",
                "About Us",
                PageType::Introduction,
                &["We publish open datasets for aerial autonomy research."],
            ),
            page(
                "ddad-dataset",
                "DDAD - Dense Depth for Autonomous Driving",
                PageType::Dataset,
                &["Dense depth estimation benchmark with long range lidar."],
            ),
            page(
                "getting-started",
                "Getting Started",
                PageType::General,
                &[
                    "Download a dataset, then read the depth of field notes and the dense appendix.",
                ],
            ),
        ]
    }

    fn build(documents: &[Document]) -> SearchIndex {
        SearchIndex::build(documents, &Config::default()).expect("Should build index")
    }

    fn urls(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.url.as_str()).collect()
    }

    #[test]
    fn test_build_counts_documents() {
        let index = build(&create_test_corpus());
        assert_eq!(index.len(), 4);
        assert!(!index.is_empty());

        let empty = build(&[]);
        assert!(empty.is_empty());
        assert!(
            empty
                .search("radar", &SearchOptions::default())
                .expect("search")
                .is_empty()
        );
    }

    #[test]
    fn test_title_term_routes_dataset() {
        let documents = vec![
            page(
                "uav-payload",
                "UAV Payload Detection",
                PageType::Dataset,
                &["Thermal imagery of drones."],
            ),
            page(
                "faq",
                "Frequently Asked Questions",
                PageType::General,
                &["How to cite the data."],
            ),
        ];
        let index = build(&documents);

        let hits = index
            .search("Payload", &SearchOptions::default())
            .expect("Should search");

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "/datasets/uav-payload");
        assert_eq!(hits[0].title, "UAV Payload Detection");
        assert_eq!(hits[0].page_title, "UAV Payload Detection");
    }

    #[test]
    fn test_body_text_is_searchable() {
        let index = build(&create_test_corpus());
        let hits = index
            .search("lidar", &SearchOptions::default())
            .expect("Should search");
        assert_eq!(urls(&hits), vec!["/datasets/ddad-dataset"]);
    }

    #[test]
    fn test_empty_and_symbol_queries() {
        let index = build(&create_test_corpus());
        for query in ["", "   ", "!!! ???", "()[]{}"] {
            let hits = index
                .search(query, &SearchOptions::default())
                .expect("Should not error");
            assert!(hits.is_empty(), "query {query:?} should find nothing");
        }
    }

    #[test]
    fn test_no_results() {
        let index = build(&create_test_corpus());
        let hits = index
            .search("nonexistentterm12345", &SearchOptions::default())
            .expect("Should search");
        assert!(hits.is_empty());
    }

    #[test]
    fn test_all_tokens_required() {
        let index = build(&create_test_corpus());
        let hits = index
            .search("radar lidar", &SearchOptions::default())
            .expect("Should search");
        assert!(hits.is_empty(), "no document has both words");
    }

    #[test]
    fn test_over_long_query_word_still_required() {
        let index = SearchIndex::build(
            &[page("radar", "Radar", PageType::General, &[])],
            &Config::default(),
        )
        .expect("build");

        let opts = SearchOptions::default();
        assert_eq!(index.search("radar", &opts).unwrap().len(), 1);

        let query = format!("radar {}", "a".repeat(45));
        assert!(index.search(&query, &opts).unwrap().is_empty());
    }

    #[test]
    fn test_search_limit() {
        let documents: Vec<Document> = (0..12)
            .map(|i| {
                page(
                    &format!("page-{i}"),
                    &format!("Flight log {i}"),
                    PageType::General,
                    &["Telemetry from a quadcopter flight."],
                )
            })
            .collect();
        let index = build(&documents);

        let limited = index
            .search("telemetry", &SearchOptions::with_limit(3))
            .expect("Should search");
        assert_eq!(limited.len(), 3);

        let defaulted = index
            .search("telemetry", &SearchOptions::default())
            .expect("Should search");
        assert_eq!(defaulted.len(), 12);

        let none = index
            .search("telemetry", &SearchOptions::with_limit(0))
            .expect("Should search");
        assert!(none.is_empty());
    }

    #[test]
    fn test_configured_default_limit() {
        let documents: Vec<Document> = (0..5)
            .map(|i| page(&format!("p{i}"), "Radar", PageType::Dataset, &[]))
            .collect();
        let mut config = Config::default();
        config.search.default_limit = 2;
        let index = SearchIndex::build(&documents, &config).expect("build");

        let hits = index
            .search("radar", &SearchOptions::default())
            .expect("Should search");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_results_are_deterministic() {
        let index = build(&create_test_corpus());
        let first = index
            .search("dense depth", &SearchOptions::default())
            .expect("Should search");
        for _ in 0..5 {
            let again = index
                .search("dense depth", &SearchOptions::default())
                .expect("Should search");
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_proximity_ranks_adjacent_words_first() {
        let index = build(&create_test_corpus());
        let hits = index
            .search("dense depth", &SearchOptions::default())
            .expect("Should search");

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "/datasets/ddad-dataset");
        assert_eq!(hits[1].url, "/docs/getting-started");
    }

    #[test]
    fn test_title_matches_rank_higher() {
        let documents = vec![
            page(
                "notes",
                "Field Notes",
                PageType::General,
                &[
                    "A long page about many things: batteries, propellers, weather, maps, \
                     cameras, storage, and one mention of gimbal hardware near the end.",
                ],
            ),
            page(
                "gimbal",
                "Gimbal Calibration",
                PageType::General,
                &["Step by step gimbal alignment."],
            ),
        ];
        let index = build(&documents);

        let hits = index
            .search("gimbal", &SearchOptions::default())
            .expect("Should search");
        assert_eq!(urls(&hits), vec!["/docs/gimbal", "/docs/notes"]);
    }

    #[test]
    fn test_tokenize_modes() {
        let documents = vec![page(
            "radar",
            "Radar",
            PageType::Dataset,
            &["Backscatter measurements."],
        )];

        let mut config = Config::default();
        config.search.tokenize = Tokenize::Strict;
        let strict = SearchIndex::build(&documents, &config).expect("build");
        assert_eq!(strict.search("radar", &SearchOptions::default()).expect("s").len(), 1);
        assert!(strict.search("rad", &SearchOptions::default()).expect("s").is_empty());

        config.search.tokenize = Tokenize::Forward;
        let forward = SearchIndex::build(&documents, &config).expect("build");
        assert_eq!(forward.search("rad", &SearchOptions::default()).expect("s").len(), 1);
        assert!(forward.search("scatter", &SearchOptions::default()).expect("s").is_empty());

        config.search.tokenize = Tokenize::Full;
        let full = SearchIndex::build(&documents, &config).expect("build");
        assert_eq!(full.search("scatter", &SearchOptions::default()).expect("s").len(), 1);
        assert_eq!(full.search("MEASURE", &SearchOptions::default()).expect("s").len(), 1);
    }

    #[test]
    fn test_accents_fold() {
        let documents = vec![page(
            "cafe",
            "Café Sensors",
            PageType::General,
            &["Données brutes."],
        )];
        let index = build(&documents);

        assert_eq!(index.search("cafe", &SearchOptions::default()).expect("s").len(), 1);
        assert_eq!(index.search("donnees", &SearchOptions::default()).expect("s").len(), 1);
    }

    #[test]
    fn test_duplicate_url_later_document_wins() {
        let documents = vec![
            page("same", "First Version", PageType::Dataset, &["alpha content"]),
            page("same", "Second Version", PageType::Dataset, &["bravo content"]),
        ];
        let index = build(&documents);

        assert_eq!(index.len(), 1);
        assert!(
            index
                .search("alpha", &SearchOptions::default())
                .expect("s")
                .is_empty()
        );
        let hits = index
            .search("bravo", &SearchOptions::default())
            .expect("s");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Second Version");
    }

    #[test]
    fn test_non_text_content_indexes_title_only() {
        let documents = vec![Document {
            id: "img".to_string(),
            title: "Gallery".to_string(),
            slug: "gallery".to_string(),
            page_type: PageType::General,
            meta_description: None,
            content: vec![
                RichTextBlock::Image(ImageBlock {
                    caption: Some("hidden caption".to_string()),
                    ..ImageBlock::default()
                }),
                RichTextBlock::heading(HeadingLevel::H2, ""),
            ],
        }];
        let index = build(&documents);

        assert_eq!(index.search("gallery", &SearchOptions::default()).expect("s").len(), 1);
        assert!(
            index
                .search("caption", &SearchOptions::default())
                .expect("s")
                .is_empty()
        );
    }

    #[test]
    fn test_search_performance() {
        let documents: Vec<Document> = (0..200)
            .map(|i| {
                page(
                    &format!("page-{i}"),
                    &format!("Dataset {i}"),
                    PageType::Dataset,
                    &["Radar, lidar, and camera captures with calibration files and documentation."],
                )
            })
            .collect();
        let index = build(&documents);

        let start = Instant::now();
        let hits = index
            .search("calibration", &SearchOptions::with_limit(50))
            .expect("Should search");
        let duration = start.elapsed();

        assert_eq!(hits.len(), 50);
        assert!(
            duration.as_millis() < 200,
            "Search should be fast (<200ms), took {}ms",
            duration.as_millis()
        );
    }
}
