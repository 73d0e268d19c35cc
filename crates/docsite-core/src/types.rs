use crate::config::RoutesConfig;
use serde::{Deserialize, Deserializer, Serialize};

/// One unit of authored rich-text content.
///
/// The wire form is the portable-text JSON produced by the content store,
/// tagged by `_type`. Only `Text` carries content the outline extractor and
/// the indexer look at; the other variants are kept so a corpus
/// round-trips, and any tag this crate does not know reads as `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum RichTextBlock {
    /// Paragraph or heading made of inline spans.
    #[serde(rename = "block")]
    Text(TextBlock),
    /// Highlighted note or warning with nested rich text.
    #[serde(rename = "calloutBlock")]
    Callout(CalloutBlock),
    /// Source listing.
    #[serde(rename = "codeBlock")]
    Code(CodeBlock),
    /// Figure with caption.
    #[serde(rename = "imageBlock")]
    Image(ImageBlock),
    /// Tabular data.
    #[serde(rename = "tableBlock")]
    Table(TableBlock),
    /// Any block kind this crate does not model.
    #[serde(other)]
    Unknown,
}

impl RichTextBlock {
    /// Shorthand for a text block with the given style and a single span.
    pub fn text(style: BlockStyle, text: impl Into<String>) -> Self {
        Self::Text(TextBlock {
            style,
            children: vec![TextSpan::new(text)],
        })
    }

    /// Shorthand for a heading block.
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Self::text(BlockStyle::Heading(level), text)
    }

    /// Shorthand for a body paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::text(BlockStyle::Body, text)
    }
}

/// Paragraph or heading: a style plus inline spans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Heading level, or body text.
    #[serde(default)]
    pub style: BlockStyle,
    /// Inline spans, in reading order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<TextSpan>,
}

impl TextBlock {
    /// Concatenated text of all spans, in order.
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|span| span.text.as_str()).collect()
    }
}

/// A run of inline text with its marks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<String>,
}

impl TextSpan {
    /// Unmarked span.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }
}

/// Heading depth of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// Parse a style tag such as `h2`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(Self::H1),
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            "h4" => Some(Self::H4),
            "h5" => Some(Self::H5),
            "h6" => Some(Self::H6),
            _ => None,
        }
    }

    /// Style tag as written in the wire form.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
        }
    }

    /// Numeric depth, 1 through 6.
    pub const fn depth(self) -> u8 {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
            Self::H3 => 3,
            Self::H4 => 4,
            Self::H5 => 5,
            Self::H6 => 6,
        }
    }
}

/// Style of a text block: a heading level, or body text.
///
/// Any style tag that is not `h1`..`h6` (`normal`, `blockquote`, a missing
/// style) reads as `Body`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlockStyle {
    Heading(HeadingLevel),
    #[default]
    Body,
}

impl Serialize for BlockStyle {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Heading(level) => serializer.serialize_str(level.tag()),
            Self::Body => serializer.serialize_str("normal"),
        }
    }
}

impl<'de> Deserialize<'de> for BlockStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag: Option<String> = Option::deserialize(deserializer)?;
        Ok(tag
            .as_deref()
            .and_then(HeadingLevel::from_tag)
            .map_or(Self::Body, Self::Heading))
    }
}

/// Callout box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalloutBlock {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Vec<RichTextBlock>,
}

/// Code listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Image with caption and layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
}

/// Image asset reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub alt: Option<String>,
}

/// Table with header row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

/// One table row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<String>,
}

/// Kind of page, which decides where it is routed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Dataset,
    Introduction,
    #[default]
    #[serde(other)]
    General,
}

/// A page as authored in the content store. Read-only to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "slug_value")]
    pub slug: String,
    #[serde(rename = "pageType", default)]
    pub page_type: PageType,
    #[serde(
        rename = "metaDescription",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub meta_description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<RichTextBlock>,
}

impl Document {
    /// Canonical site URL: dataset pages live under the dataset prefix,
    /// every other page type under the docs prefix.
    pub fn url(&self, routes: &RoutesConfig) -> String {
        route(self.page_type, &self.slug, routes)
    }

    /// Listing entry for this document.
    pub fn summary(&self) -> PageSummary {
        PageSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            slug: self.slug.clone(),
            page_type: self.page_type,
        }
    }
}

/// Listing entry for a page, without its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "slug_value")]
    pub slug: String,
    #[serde(rename = "pageType", default)]
    pub page_type: PageType,
}

impl PageSummary {
    /// Canonical site URL, routed like [`Document::url`].
    pub fn url(&self, routes: &RoutesConfig) -> String {
        route(self.page_type, &self.slug, routes)
    }
}

fn route(page_type: PageType, slug: &str, routes: &RoutesConfig) -> String {
    let prefix = match page_type {
        PageType::Dataset => &routes.dataset_prefix,
        PageType::Introduction | PageType::General => &routes.docs_prefix,
    };
    format!("{}/{slug}", prefix.trim_end_matches('/'))
}

/// Top-level table of contents entry, produced from an H1 or H2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSection {
    pub id: String,
    pub title: String,
    pub children: Vec<OutlineSubsection>,
}

/// Nested table of contents entry, produced from an H3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSubsection {
    pub id: String,
    pub title: String,
}

/// Anchor assigned to a heading block when it is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingAnchor {
    /// Position of the block in the document content.
    pub block_index: usize,
    pub level: u8,
    pub title: String,
    pub id: String,
}

/// Flattened, searchable form of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub url: String,
    #[serde(rename = "indexedText")]
    pub indexed_text: String,
    pub title: String,
    #[serde(rename = "pageTitle")]
    pub page_title: String,
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    #[serde(rename = "pageTitle")]
    pub page_title: String,
}

/// Per-query options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of results; the configured default when `None`.
    pub limit: Option<usize>,
}

impl SearchOptions {
    /// Options capped at `limit` results.
    pub const fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }
}

/// A single page ready for rendering: the document plus its navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub url: String,
    pub document: Document,
    pub outline: Vec<OutlineSection>,
    pub anchors: Vec<HeadingAnchor>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `"my-page"` as well as `{ "current": "my-page" }`.
fn slug_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Slug {
        Plain(String),
        Object { current: String },
    }

    Ok(match Slug::deserialize(deserializer)? {
        Slug::Plain(slug) | Slug::Object { current: slug } => slug,
    })
}
