//! The repository abstraction over the durable record store, and an
//! in-memory implementation backing tests and the worker binary.
//!
//! The pipeline only assumes single-entity read consistency: every read
//! reflects committed state at call time, nothing more. Post listings are
//! always ordered by publish timestamp descending, matching what every
//! artifact wants.

use crate::post::{Post, PostFilter};
use crate::site::Site;
use crate::user::User;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

pub trait Repository: Send + Sync {
    fn user_by_id(&self, id: &Uuid) -> Result<User>;
    fn site_by_id(&self, id: &Uuid) -> Result<Site>;
    fn site_by_domain(&self, domain: &str) -> Result<Site>;
    fn post_by_id(&self, id: &Uuid) -> Result<Post>;

    /// Fails with [`Error::Conflict`] on a duplicate email.
    fn insert_user(&self, user: User) -> Result<()>;

    /// Fails with [`Error::Conflict`] on a duplicate domain.
    fn insert_site(&self, site: Site) -> Result<()>;

    /// Fails with [`Error::Conflict`] on a duplicate (site, slug) pair.
    fn insert_post(&self, post: Post) -> Result<()>;

    /// Overwrites a site record. Fails with [`Error::Conflict`] if the new
    /// domain belongs to some other site.
    fn update_site(&self, site: &Site) -> Result<()>;

    fn update_post(&self, post: &Post) -> Result<()>;

    /// Removes a post and returns its final state, so callers can plan the
    /// artifact cleanup from the snapshot.
    fn delete_post(&self, id: &Uuid) -> Result<Post>;

    fn delete_site(&self, id: &Uuid) -> Result<()>;

    fn members_of_site(&self, site: &Uuid) -> Result<Vec<User>>;

    /// Posts of a site matching `filter`, ordered by publish timestamp
    /// descending, windowed by `offset`/`limit`.
    fn posts_of_site(
        &self,
        site: &Uuid,
        filter: &PostFilter,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Post>>;

    fn count_posts(&self, site: &Uuid, filter: &PostFilter) -> Result<usize>;

    /// Distinct tags across a site's published posts, sorted.
    fn tags_of_site(&self, site: &Uuid) -> Result<Vec<String>>;
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    #[error("no {entity} matching '{key}'")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} '{key}' already exists")]
    Conflict { entity: &'static str, key: String },
}

impl Error {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Error {
        Error::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn conflict(entity: &'static str, key: impl ToString) -> Error {
        Error::Conflict {
            entity,
            key: key.to_string(),
        }
    }
}

/// Hash-map tables behind a single lock. Uniqueness checks live here so the
/// trait's conflict contract holds without a real database.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    sites: HashMap<Uuid, Site>,
    posts: HashMap<Uuid, Post>,
}

impl MemoryRepository {
    pub fn new() -> MemoryRepository {
        MemoryRepository::default()
    }
}

impl Repository for MemoryRepository {
    fn user_by_id(&self, id: &Uuid) -> Result<User> {
        self.tables
            .read()
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("user", id))
    }

    fn site_by_id(&self, id: &Uuid) -> Result<Site> {
        self.tables
            .read()
            .sites
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("site", id))
    }

    fn site_by_domain(&self, domain: &str) -> Result<Site> {
        self.tables
            .read()
            .sites
            .values()
            .find(|site| site.domain == domain)
            .cloned()
            .ok_or_else(|| Error::not_found("site", domain))
    }

    fn post_by_id(&self, id: &Uuid) -> Result<Post> {
        self.tables
            .read()
            .posts
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("post", id))
    }

    fn insert_user(&self, user: User) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(Error::conflict("user", &user.email));
        }
        tables.users.insert(user.uuid, user);
        Ok(())
    }

    fn insert_site(&self, site: Site) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.sites.values().any(|s| s.domain == site.domain) {
            return Err(Error::conflict("site", &site.domain));
        }
        tables.sites.insert(site.uuid, site);
        Ok(())
    }

    fn insert_post(&self, post: Post) -> Result<()> {
        let mut tables = self.tables.write();
        if tables
            .posts
            .values()
            .any(|p| p.site == post.site && p.slug == post.slug)
        {
            return Err(Error::conflict("post", &post.slug));
        }
        tables.posts.insert(post.uuid, post);
        Ok(())
    }

    fn update_site(&self, site: &Site) -> Result<()> {
        let mut tables = self.tables.write();
        if !tables.sites.contains_key(&site.uuid) {
            return Err(Error::not_found("site", site.uuid));
        }
        if tables
            .sites
            .values()
            .any(|s| s.uuid != site.uuid && s.domain == site.domain)
        {
            return Err(Error::conflict("site", &site.domain));
        }
        tables.sites.insert(site.uuid, site.clone());
        Ok(())
    }

    fn update_post(&self, post: &Post) -> Result<()> {
        let mut tables = self.tables.write();
        if !tables.posts.contains_key(&post.uuid) {
            return Err(Error::not_found("post", post.uuid));
        }
        tables.posts.insert(post.uuid, post.clone());
        Ok(())
    }

    fn delete_post(&self, id: &Uuid) -> Result<Post> {
        self.tables
            .write()
            .posts
            .remove(id)
            .ok_or_else(|| Error::not_found("post", id))
    }

    fn delete_site(&self, id: &Uuid) -> Result<()> {
        let mut tables = self.tables.write();
        tables
            .sites
            .remove(id)
            .ok_or_else(|| Error::not_found("site", id))?;
        tables.posts.retain(|_, post| post.site != *id);
        Ok(())
    }

    fn members_of_site(&self, site: &Uuid) -> Result<Vec<User>> {
        let tables = self.tables.read();
        let site = tables
            .sites
            .get(site)
            .ok_or_else(|| Error::not_found("site", site))?;
        Ok(site
            .members
            .iter()
            .filter_map(|id| tables.users.get(id))
            .cloned()
            .collect())
    }

    fn posts_of_site(
        &self,
        site: &Uuid,
        filter: &PostFilter,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Post>> {
        let tables = self.tables.read();
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|post| post.site == *site && filter.matches(post))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.published.cmp(&a.published));
        Ok(posts
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    fn count_posts(&self, site: &Uuid, filter: &PostFilter) -> Result<usize> {
        Ok(self
            .tables
            .read()
            .posts
            .values()
            .filter(|post| post.site == *site && filter.matches(post))
            .count())
    }

    fn tags_of_site(&self, site: &Uuid) -> Result<Vec<String>> {
        let tags: BTreeSet<String> = self
            .tables
            .read()
            .posts
            .values()
            .filter(|post| post.site == *site && !post.draft)
            .flat_map(|post| post.tags.iter().cloned())
            .collect();
        Ok(tags.into_iter().collect())
    }
}
