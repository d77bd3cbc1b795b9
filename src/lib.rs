//! The library code for the `inkstone` blog host. The architecture can be
//! generally broken down into three distinct layers:
//!
//! 1. Entities and the repository abstraction over the record store
//!    ([`crate::user`], [`crate::site`], [`crate::post`], [`crate::repo`])
//! 2. Artifact generation: templating, pagination, feeds, and the on-disk
//!    site tree ([`crate::render`], [`crate::paginate`], [`crate::feed`],
//!    [`crate::sitedir`], [`crate::build`])
//! 3. Trigger wiring: content-mutation events mapped to regeneration tasks
//!    and a queue that drains them ([`crate::tasks`], [`crate::queue`])
//!
//! Of the three, the second layer is the most involved. Every site owns an
//! identifier-addressed directory of derived files (post pages, paginated
//! listings, tag and user pages, RSS, sitemap, robots.txt, theme assets),
//! and a domain-addressed symlink that public requests resolve through.
//! Artifacts are never patched in place: each one is fully recomputed from
//! repository state and atomically overwritten, which is what makes every
//! regeneration task safe to run twice or concurrently with itself.
//!
//! The third layer keeps the derived files in sync. An event (post created,
//! domain changed, theme edited, ...) is planned into an ordered set of
//! tasks, and each task can chain follow-up tasks once its own side effects
//! are on disk.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
pub mod paginate;
pub mod paths;
pub mod post;
pub mod queue;
pub mod render;
pub mod repo;
pub mod site;
pub mod sitedir;
pub mod slug;
pub mod tasks;
pub mod user;
pub mod write;
