//! Shared API response types
//!
//! Response structures used across multiple endpoints, with conversions
//! from the domain models. Timestamps are serialized as RFC 3339 strings.

use serde::{Deserialize, Serialize};

use crate::models::{Category, News, Tag, User};

/// Public user representation; never carries the password hash
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub last_login: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            full_name: user.full_name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
            avatar_url: user.avatar_url,
            bio: user.bio,
            phone: user.phone,
            last_login: user.last_login.map(|dt| dt.to_rfc3339()),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// Token pair returned by login and refresh
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Full news article response
#[derive(Debug, Serialize, Deserialize)]
pub struct NewsResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub video_url: Option<String>,
    pub is_published: bool,
    pub is_featured: bool,
    pub is_breaking: bool,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub author_id: i64,
    pub category_id: i64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagResponse>>,
}

impl From<News> for NewsResponse {
    fn from(news: News) -> Self {
        Self {
            id: news.id,
            title: news.title,
            slug: news.slug,
            summary: news.summary,
            content: news.content,
            cover_image: news.cover_image,
            video_url: news.video_url,
            is_published: news.is_published,
            is_featured: news.is_featured,
            is_breaking: news.is_breaking,
            view_count: news.view_count,
            like_count: news.like_count,
            comment_count: news.comment_count,
            author_id: news.author_id,
            category_id: news.category_id,
            created_at: news.created_at.to_rfc3339(),
            updated_at: news.updated_at.to_rfc3339(),
            category: None,
            tags: None,
        }
    }
}

impl NewsResponse {
    /// Embed category info in the response
    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category.map(Into::into);
        self
    }

    /// Embed tag info in the response
    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

/// Paginated news listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct NewsListResponse {
    pub items: Vec<NewsResponse>,
    pub total: i64,
    pub page: u32,
    pub size: u32,
    pub pages: u32,
}

/// Category response
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            slug: category.slug,
            is_active: category.is_active,
            created_at: category.created_at.to_rfc3339(),
            updated_at: category.updated_at.to_rfc3339(),
        }
    }
}

/// Tag response
#[derive(Debug, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub color: Option<String>,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
            color: tag.color,
        }
    }
}

/// Simple confirmation message
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
