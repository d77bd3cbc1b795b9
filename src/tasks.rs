//! The regeneration trigger rules: content-mutation events map to ordered
//! task lists ([`plan`]), and tasks yield explicit follow-up tasks when they
//! complete ([`execute`]). Together those two functions are the whole task
//! graph, so the ordering and idempotence contracts are testable without a
//! live queue; [`crate::queue`] is just a transport that drains them.
//!
//! Ordering only exists inside a chain (a task's follow-ups run after its
//! side effects are visible). Tasks scheduled as siblings have no ordering
//! guarantee and must not need one.

use crate::build::{Result, SiteBuilder};
use crate::site::ThemeAsset;
use std::collections::VecDeque;
use uuid::Uuid;

/// A content mutation raised by the platform layer. Deletion events carry a
/// snapshot of the fields the pipeline needs, because the record is gone by
/// the time the tasks run.
#[derive(Clone, Debug)]
pub enum Event {
    SiteCreated {
        site: Uuid,
    },
    PostCreated {
        post: Uuid,
    },
    PostEdited {
        post: Uuid,
        site: Uuid,
        /// The tag set before the edit, used to clean pages for removed
        /// tags. `None` means the caller lost track of it, in which case
        /// every tag the site currently has is regenerated.
        previous_tags: Option<Vec<String>>,
    },
    PostDeleted {
        site: Uuid,
        slug: String,
        tags: Vec<String>,
    },
    DomainChanged {
        site: Uuid,
        new_domain: String,
    },
    ThemeEdited {
        site: Uuid,
        asset: ThemeAsset,
    },
    SiteMetaEdited {
        site: Uuid,
    },
    SiteDeleted {
        site: Uuid,
        domain: String,
    },
}

/// One schedulable unit of regeneration work. Every variant is idempotent
/// and re-entrant; running a task twice converges on the same output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    InitializeSite { site: Uuid },
    BindDomainAlias { site: Uuid },
    WriteThemeAssets { site: Uuid },
    WriteThemeAsset { site: Uuid, asset: ThemeAsset },
    UpdateSite { site: Uuid },
    UpdateTag { site: Uuid, tag: String },
    UpdateAllTags { site: Uuid },
    UpdateUserPages { site: Uuid, user: Uuid },
    UpdateAllUserPages { site: Uuid },
    RenderPost { post: Uuid },
    RenderAllPosts { site: Uuid },
    DeletePostArtifact { site: Uuid, slug: String },
    ChangeDomain { site: Uuid, new_domain: String },
    TeardownSite { site: Uuid, domain: String },
}

/// Maps an event to the initial tasks to schedule. Pure; fan-out that
/// depends on repository state (a post's current tags, a site's member
/// list) happens in [`execute`] instead, where the data is at hand.
pub fn plan(event: &Event) -> Vec<Task> {
    match event {
        Event::SiteCreated { site } => vec![Task::InitializeSite { site: *site }],

        Event::PostCreated { post } => vec![Task::RenderPost { post: *post }],

        Event::PostEdited {
            post,
            site,
            previous_tags,
        } => {
            let mut tasks = vec![Task::RenderPost { post: *post }];
            match previous_tags {
                // tags removed by the edit still need their pages rebuilt;
                // the post's current tags are handled by RenderPost's
                // follow-ups
                Some(tags) => tasks.extend(tags.iter().map(|tag| Task::UpdateTag {
                    site: *site,
                    tag: tag.clone(),
                })),
                None => tasks.push(Task::UpdateAllTags { site: *site }),
            }
            tasks
        }

        Event::PostDeleted { site, slug, tags } => {
            let mut tasks = vec![
                Task::DeletePostArtifact {
                    site: *site,
                    slug: slug.clone(),
                },
                Task::UpdateSite { site: *site },
            ];
            tasks.extend(tags.iter().map(|tag| Task::UpdateTag {
                site: *site,
                tag: tag.clone(),
            }));
            tasks
        }

        Event::DomainChanged { site, new_domain } => vec![Task::ChangeDomain {
            site: *site,
            new_domain: new_domain.clone(),
        }],

        Event::ThemeEdited { site, asset } => match asset {
            // the template feeds every rendered page, so editing it means a
            // full regen; css/js are served verbatim and only need their
            // own file rewritten
            ThemeAsset::Template => vec![
                Task::WriteThemeAsset {
                    site: *site,
                    asset: *asset,
                },
                Task::UpdateSite { site: *site },
                Task::UpdateAllTags { site: *site },
                Task::UpdateAllUserPages { site: *site },
                Task::RenderAllPosts { site: *site },
            ],
            _ => vec![Task::WriteThemeAsset {
                site: *site,
                asset: *asset,
            }],
        },

        Event::SiteMetaEdited { site } => vec![Task::UpdateSite { site: *site }],

        Event::SiteDeleted { site, domain } => vec![Task::TeardownSite {
            site: *site,
            domain: domain.clone(),
        }],
    }
}

/// Runs one task against the builder and returns its follow-up tasks. The
/// site-creation chain and the data-dependent fan-outs live here.
pub fn execute(builder: &SiteBuilder, task: &Task) -> Result<Vec<Task>> {
    match task {
        Task::InitializeSite { site } => {
            builder.initialize_site(site)?;
            Ok(vec![Task::BindDomainAlias { site: *site }])
        }

        Task::BindDomainAlias { site } => {
            builder.bind_domain_alias(site)?;
            Ok(vec![Task::WriteThemeAssets { site: *site }])
        }

        Task::WriteThemeAssets { site } => {
            builder.write_theme_assets(site)?;
            Ok(vec![Task::UpdateSite { site: *site }])
        }

        Task::WriteThemeAsset { site, asset } => {
            builder.write_theme_asset(site, *asset)?;
            Ok(Vec::new())
        }

        Task::UpdateSite { site } => {
            builder.update_site(site)?;
            Ok(Vec::new())
        }

        Task::UpdateTag { site, tag } => {
            builder.update_tag(site, tag)?;
            Ok(Vec::new())
        }

        Task::UpdateAllTags { site } => Ok(builder
            .site_tags(site)?
            .into_iter()
            .map(|tag| Task::UpdateTag { site: *site, tag })
            .collect()),

        Task::UpdateUserPages { site, user } => {
            builder.update_user_pages(site, user)?;
            Ok(Vec::new())
        }

        Task::UpdateAllUserPages { site } => Ok(builder
            .site_members(site)?
            .into_iter()
            .map(|user| Task::UpdateUserPages {
                site: *site,
                user: user.uuid,
            })
            .collect()),

        Task::RenderPost { post } => {
            let post = builder.render_post(post)?;
            let mut follow_ups = vec![Task::UpdateSite { site: post.site }];
            follow_ups.extend(post.tags.iter().map(|tag| Task::UpdateTag {
                site: post.site,
                tag: tag.clone(),
            }));
            Ok(follow_ups)
        }

        Task::RenderAllPosts { site } => {
            builder.render_all_posts(site)?;
            Ok(Vec::new())
        }

        Task::DeletePostArtifact { site, slug } => {
            builder.delete_post_artifact(site, slug)?;
            Ok(Vec::new())
        }

        Task::ChangeDomain { site, new_domain } => {
            builder.change_domain(site, new_domain)?;
            Ok(vec![Task::UpdateSite { site: *site }])
        }

        Task::TeardownSite { site, domain } => {
            builder.teardown_site(site, domain)?;
            Ok(Vec::new())
        }
    }
}

/// Drains a task list synchronously, FIFO, executing follow-ups after their
/// parents. Used by tests and one-shot rebuilds; the worker pool in
/// [`crate::queue`] provides the asynchronous equivalent.
pub fn run_inline(builder: &SiteBuilder, initial: Vec<Task>) -> Result<()> {
    let mut pending: VecDeque<Task> = initial.into();
    while let Some(task) = pending.pop_front() {
        pending.extend(execute(builder, &task)?);
    }
    Ok(())
}
