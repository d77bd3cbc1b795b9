//! The [`Post`] entity and the creation flow that resolves slug collisions.
//!
//! The original platform grew a generic Page entity with Post inheriting
//! from it; here there is a single [`Post`] whose `dated` listing behavior
//! falls out of the `draft` flag and publish timestamp instead of virtual
//! dispatch.

use crate::repo::{self, Repository};
use crate::slug;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub uuid: Uuid,
    pub site: Uuid,
    pub author: Uuid,

    pub title: String,

    /// URL-safe identifier, unique within the site. Derived from the title
    /// at creation time and never regenerated on edit.
    pub slug: String,

    /// Markdown body; rendered to HTML when the template context is built.
    pub body: String,

    /// Short plain-text description, used in listings and feed items.
    #[serde(default)]
    pub description: String,

    /// Cleaned tag slugs.
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default = "Utc::now")]
    pub published: DateTime<Utc>,

    /// Drafts are excluded from every public artifact.
    #[serde(default)]
    pub draft: bool,
}

/// Fields supplied by the authoring layer when a post is created. Tags
/// arrive as the raw comma-separated string the author typed.
#[derive(Clone, Debug)]
pub struct NewPost {
    pub site: Uuid,
    pub author: Uuid,
    pub title: String,
    pub body: String,
    pub description: String,
    pub tags: String,
    pub draft: bool,
}

/// Selection criteria for repository post queries. The zero value selects
/// every published post.
#[derive(Clone, Debug, Default)]
pub struct PostFilter {
    pub tag: Option<String>,
    pub author: Option<Uuid>,
    pub title: Option<String>,
    pub include_drafts: bool,
}

impl PostFilter {
    pub fn published() -> PostFilter {
        PostFilter::default()
    }

    pub fn with_tag(tag: &str) -> PostFilter {
        PostFilter {
            tag: Some(tag.to_owned()),
            ..PostFilter::default()
        }
    }

    pub fn with_author(author: &Uuid) -> PostFilter {
        PostFilter {
            author: Some(*author),
            ..PostFilter::default()
        }
    }

    pub fn with_title(title: &str) -> PostFilter {
        PostFilter {
            title: Some(title.to_owned()),
            // slug disambiguation counts drafts too; a collision is a
            // collision whether or not the earlier post is published
            include_drafts: true,
            ..PostFilter::default()
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        if !self.include_drafts && post.draft {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !post.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if post.author != *author {
                return false;
            }
        }
        if let Some(title) = &self.title {
            if post.title != *title {
                return false;
            }
        }
        true
    }
}

/// Persists a new post. The slug is derived from the title; if it collides
/// with an existing slug in the same site, the persist is retried exactly
/// once with a disambiguated slug. A second collision propagates.
pub fn create_post(repo: &dyn Repository, new: NewPost) -> repo::Result<Post> {
    let mut post = Post {
        uuid: Uuid::new_v4(),
        site: new.site,
        author: new.author,
        slug: slug::from_text(&new.title),
        title: new.title,
        body: new.body,
        description: new.description,
        tags: slug::parse_tags(&new.tags),
        published: Utc::now(),
        draft: new.draft,
    };

    match repo.insert_post(post.clone()) {
        Ok(()) => Ok(post),
        Err(repo::Error::Conflict { .. }) => {
            let shared =
                repo.count_posts(&post.site, &PostFilter::with_title(&post.title))?;
            post.slug = slug::disambiguate(&post.slug, shared);
            info!(slug = %post.slug, "slug collision, retrying with disambiguated slug");
            repo.insert_post(post.clone())?;
            Ok(post)
        }
        Err(err) => Err(err),
    }
}
