//! News article model
//!
//! This module provides:
//! - `News` entity representing a single article
//! - Input types for creating and updating articles
//! - `NewsSearchParams` for the filtered, paginated listing query
//! - `NewsPage` pagination container

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// News article entity.
///
/// Relations are plain foreign-key fields (`author_id`, `category_id`);
/// tags live in the `news_tags` join table and are resolved by lookup,
/// never via embedded back-pointers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Headline
    pub title: String,
    /// Short summary shown in listings
    pub summary: Option<String>,
    /// Body content
    pub content: String,
    /// Cover image URL
    pub cover_image: Option<String>,
    /// Video URL
    pub video_url: Option<String>,
    /// Whether the article is visible in public listings
    pub is_published: bool,
    /// Editorially featured
    pub is_featured: bool,
    /// Breaking news flag
    pub is_breaking: bool,
    /// View count
    pub view_count: i64,
    /// Like count
    pub like_count: i64,
    /// Comment count
    pub comment_count: i64,
    /// Owning author user ID
    pub author_id: i64,
    /// Category ID
    pub category_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a news article
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNewsInput {
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub video_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_breaking: bool,
    pub category_id: i64,
    /// Tags to associate with the article
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Input for updating a news article.
///
/// Partial-update semantics: a field that is absent from the request is left
/// untouched. Nullable columns use a double `Option` so that an explicit
/// `null` clears the stored value while absence keeps it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNewsInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, with = "double_option")]
    pub summary: Option<Option<String>>,
    pub content: Option<String>,
    #[serde(default, with = "double_option")]
    pub cover_image: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub video_url: Option<Option<String>>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_breaking: Option<bool>,
    pub category_id: Option<i64>,
    /// When present, replaces the article's tag set wholesale
    pub tag_ids: Option<Vec<i64>>,
}

/// Serde helper distinguishing "absent" from "present but null".
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}

/// Search and pagination parameters for the news listing.
///
/// All filters are optional and AND-combined; the listing itself always
/// restricts to published articles.
#[derive(Debug, Clone, Default)]
pub struct NewsSearchParams {
    /// Case-insensitive substring match over title/summary/content
    pub q: Option<String>,
    /// Exact category filter
    pub category_id: Option<i64>,
    /// Match articles carrying any of these tags
    pub tag_ids: Vec<i64>,
    /// Featured flag filter
    pub is_featured: Option<bool>,
    /// Breaking flag filter
    pub is_breaking: Option<bool>,
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page
    pub size: u32,
}

impl NewsSearchParams {
    /// Create parameters with page/size normalized to valid ranges
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.clamp(1, 100),
            ..Default::default()
        }
    }

    /// Offset for the database query
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.size) as i64
    }

    /// Limit for the database query
    pub fn limit(&self) -> i64 {
        self.size as i64
    }
}

/// Paginated news listing result
#[derive(Debug, Clone, Serialize)]
pub struct NewsPage {
    /// Items in the current page
    pub items: Vec<News>,
    /// Total number of matches across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Items per page
    pub size: u32,
    /// Total number of pages
    pub pages: u32,
}

impl NewsPage {
    /// Build a page, computing `pages = ceil(total / size)`
    pub fn new(items: Vec<News>, total: i64, params: &NewsSearchParams) -> Self {
        let size = params.size.max(1);
        let pages = ((total as u64 + size as u64 - 1) / size as u64) as u32;
        Self {
            items,
            total,
            page: params.page,
            size,
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_params_normalization() {
        let params = NewsSearchParams::new(0, 10);
        assert_eq!(params.page, 1);
        assert_eq!(params.offset(), 0);

        let params = NewsSearchParams::new(3, 5);
        assert_eq!(params.offset(), 10);
        assert_eq!(params.limit(), 5);

        let params = NewsSearchParams::new(1, 500);
        assert_eq!(params.size, 100);

        let params = NewsSearchParams::new(1, 0);
        assert_eq!(params.size, 1);
    }

    #[test]
    fn test_news_page_math() {
        let params = NewsSearchParams::new(3, 10);
        let page = NewsPage::new(Vec::new(), 25, &params);
        assert_eq!(page.pages, 3);
        assert_eq!(page.page, 3);
        assert_eq!(page.size, 10);

        let page = NewsPage::new(Vec::new(), 0, &params);
        assert_eq!(page.pages, 0);

        let page = NewsPage::new(Vec::new(), 30, &params);
        assert_eq!(page.pages, 3);

        let page = NewsPage::new(Vec::new(), 31, &params);
        assert_eq!(page.pages, 4);
    }

    #[test]
    fn test_update_input_double_option() {
        // absent -> None
        let input: UpdateNewsInput = serde_json::from_str(r#"{"title": "t"}"#).unwrap();
        assert_eq!(input.title.as_deref(), Some("t"));
        assert!(input.summary.is_none());

        // explicit null -> Some(None), clearing the column
        let input: UpdateNewsInput = serde_json::from_str(r#"{"summary": null}"#).unwrap();
        assert_eq!(input.summary, Some(None));

        // explicit value -> Some(Some(..))
        let input: UpdateNewsInput = serde_json::from_str(r#"{"summary": "s"}"#).unwrap();
        assert_eq!(input.summary, Some(Some("s".to_string())));
    }
}
