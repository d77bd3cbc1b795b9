//! Exports [`SiteBuilder`], which owns every regeneration operation the
//! pipeline can perform against a single site: individual artifacts (index,
//! feeds, robots, post pages, theme assets) and the multi-page listing runs
//! (pagination, archive, tag pages, user pages).
//!
//! Two contracts hold for every operation here:
//!
//! 1. Idempotence — running an operation twice with no intervening content
//!    change converges on the same bytes, because every artifact is a full
//!    recomputation from repository state written through
//!    [`crate::write::write_atomic`].
//! 2. Delete-then-rebuild — multi-page runs clear their whole output
//!    directory before regenerating, so a shrinking post count can never
//!    leave orphaned stale pages behind.

use crate::config::Config;
use crate::feed;
use crate::paginate::paginate;
use crate::paths::PathResolver;
use crate::post::{Post, PostFilter};
use crate::render;
use crate::repo::{self, Repository};
use crate::site::{Site, ThemeAsset};
use crate::sitedir;
use crate::user::User;
use crate::write;
use gtmpl::Value;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct SiteBuilder {
    repo: Arc<dyn Repository>,
    paths: PathResolver,
    page_size: usize,
    feed_limit: usize,
}

impl SiteBuilder {
    pub fn new(repo: Arc<dyn Repository>, config: &Config) -> SiteBuilder {
        SiteBuilder {
            repo,
            paths: PathResolver::new(&config.output_root),
            page_size: config.page_size,
            feed_limit: config.feed_limit,
        }
    }

    pub fn repo(&self) -> &dyn Repository {
        self.repo.as_ref()
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    /// Creates the site's directory tree and seeds it with robots.txt.
    pub fn initialize_site(&self, site: &Uuid) -> Result<()> {
        let site = self.repo.site_by_id(site)?;
        sitedir::create_tree(&self.paths, &site)?;
        self.write_robots(&site)?;
        Ok(())
    }

    /// Binds the domain alias for an existing site tree.
    pub fn bind_domain_alias(&self, site: &Uuid) -> Result<()> {
        let site = self.repo.site_by_id(site)?;
        sitedir::bind_alias(&self.paths, &site)?;
        Ok(())
    }

    /// Moves a site to a new domain: unbind the old alias, persist the new
    /// domain, bind the new alias. The id-addressed content never moves, so
    /// it stays reachable throughout; only the alias has a transient gap. A
    /// domain conflict propagates after the old alias is gone, which leaves
    /// the site temporarily unaliased but never pointing at foreign data.
    pub fn change_domain(&self, site: &Uuid, new_domain: &str) -> Result<()> {
        let mut site = self.repo.site_by_id(site)?;
        let old_domain = std::mem::replace(&mut site.domain, new_domain.to_owned());
        sitedir::unbind_alias(&self.paths, &old_domain);
        self.repo.update_site(&site)?;
        sitedir::bind_alias(&self.paths, &site)?;
        info!(site = %site.uuid, from = %old_domain, to = %new_domain, "changed domain");
        Ok(())
    }

    /// Removes everything on disk for a site. Takes a snapshot of the
    /// identity because the record is typically deleted before this runs.
    pub fn teardown_site(&self, site: &Uuid, domain: &str) -> Result<()> {
        sitedir::teardown(&self.paths, site, domain)?;
        Ok(())
    }

    /// Writes one theme file verbatim from the site record.
    pub fn write_theme_asset(&self, site: &Uuid, asset: ThemeAsset) -> Result<()> {
        let site = self.repo.site_by_id(site)?;
        let (path, text) = match asset {
            ThemeAsset::Css => (self.paths.css_file(&site.uuid), &site.css),
            ThemeAsset::Js => (self.paths.js_file(&site.uuid), &site.js),
            ThemeAsset::Template => {
                (self.paths.template_file(&site.uuid), &site.template)
            }
        };
        write::write_atomic(&path, text.as_bytes())?;
        Ok(())
    }

    /// Writes all three theme files; part of the site-creation chain.
    pub fn write_theme_assets(&self, site: &Uuid) -> Result<()> {
        for asset in [ThemeAsset::Css, ThemeAsset::Js, ThemeAsset::Template] {
            self.write_theme_asset(site, asset)?;
        }
        Ok(())
    }

    /// Regenerates every site-level artifact: index, RSS, sitemap,
    /// robots.txt, the site metadata blob, and the pagination and archive
    /// runs.
    pub fn update_site(&self, site: &Uuid) -> Result<()> {
        let site = self.repo.site_by_id(site)?;
        self.write_index(&site)?;
        self.write_rss(&site)?;
        self.write_sitemap(&site)?;
        self.write_robots(&site)?;
        self.write_site_json(&site)?;
        self.write_paginations(&site)?;
        self.write_archive(&site)?;
        info!(site = %site.uuid, "updated site artifacts");
        Ok(())
    }

    /// Regenerates the listing run for one tag.
    pub fn update_tag(&self, site: &Uuid, tag: &str) -> Result<()> {
        let site = self.repo.site_by_id(site)?;
        self.write_listing_run(
            &self.paths.tag_dir(&site.uuid, tag),
            &site,
            &format!("Posts Tagged With {}", tag),
            &PostFilter::with_tag(tag),
        )
    }

    /// Regenerates the listing run for one member's authored posts, plus
    /// their metadata blob.
    pub fn update_user_pages(&self, site: &Uuid, user: &Uuid) -> Result<()> {
        let site = self.repo.site_by_id(site)?;
        let user = self.repo.user_by_id(user)?;
        self.write_listing_run(
            &self.paths.user_dir(&site.uuid, &user.uuid),
            &site,
            &format!("Posts By {}", user.name),
            &PostFilter::with_author(&user.uuid),
        )?;
        self.write_user_json(&site, &user)
    }

    /// Renders a post's page, or removes it if the post is a draft. Returns
    /// the post snapshot so the caller can fan out per-tag regeneration.
    pub fn render_post(&self, post: &Uuid) -> Result<Post> {
        let post = self.repo.post_by_id(post)?;
        let site = self.repo.site_by_id(&post.site)?;
        let path = self.paths.post_file(&site.uuid, &post.slug);
        if post.draft {
            // an edit can turn a published post back into a draft; the
            // public artifact has to disappear with it
            write::delete_file(&path)?;
            return Ok(post);
        }
        let author = self.repo.user_by_id(&post.author)?;
        let html = render::render(
            &site.template,
            render::post_page_value(&site, &post, &author),
        )?;
        write::write_atomic(&path, html.as_bytes())?;
        Ok(post)
    }

    /// Re-renders every published post page; used when the template changes.
    pub fn render_all_posts(&self, site: &Uuid) -> Result<()> {
        let posts = self.repo.posts_of_site(
            site,
            &PostFilter::published(),
            0,
            None,
        )?;
        for post in posts {
            self.render_post(&post.uuid)?;
        }
        Ok(())
    }

    /// Removes a deleted post's page from disk.
    pub fn delete_post_artifact(&self, site: &Uuid, slug: &str) -> Result<()> {
        write::delete_file(&self.paths.post_file(site, slug))?;
        Ok(())
    }

    /// Distinct tags of a site, for per-tag fan-out.
    pub fn site_tags(&self, site: &Uuid) -> Result<Vec<String>> {
        Ok(self.repo.tags_of_site(site)?)
    }

    /// Members of a site, for per-user fan-out.
    pub fn site_members(&self, site: &Uuid) -> Result<Vec<User>> {
        Ok(self.repo.members_of_site(site)?)
    }

    fn write_index(&self, site: &Site) -> Result<()> {
        let filter = PostFilter::published();
        let count = self.repo.count_posts(&site.uuid, &filter)?;
        let total_pages = match count % self.page_size {
            0 => count / self.page_size,
            _ => count / self.page_size + 1,
        };
        let posts = self.repo.posts_of_site(
            &site.uuid,
            &filter,
            0,
            Some(self.page_size),
        )?;
        let html = render::render(
            &site.template,
            render::listing_value(
                site,
                self.post_values(&posts)?,
                &site.title,
                1,
                total_pages,
            ),
        )?;
        write::write_atomic(&self.paths.index_file(&site.uuid), html.as_bytes())?;
        Ok(())
    }

    fn write_rss(&self, site: &Site) -> Result<()> {
        let posts = self.repo.posts_of_site(
            &site.uuid,
            &PostFilter::published(),
            0,
            Some(self.feed_limit),
        )?;
        write::write_atomic(
            &self.paths.rss_file(&site.uuid),
            feed::rss_feed(site, &posts).as_bytes(),
        )?;
        Ok(())
    }

    fn write_sitemap(&self, site: &Site) -> Result<()> {
        let posts = self.repo.posts_of_site(
            &site.uuid,
            &PostFilter::published(),
            0,
            None,
        )?;
        write::write_atomic(
            &self.paths.sitemap_file(&site.uuid),
            feed::sitemap(site, &posts).as_bytes(),
        )?;
        Ok(())
    }

    fn write_robots(&self, site: &Site) -> Result<()> {
        write::write_atomic(
            &self.paths.robots_file(&site.uuid),
            feed::robots_txt(site).as_bytes(),
        )?;
        Ok(())
    }

    fn write_site_json(&self, site: &Site) -> Result<()> {
        let about = SiteAbout {
            uuid: site.uuid.to_string(),
            domain: &site.domain,
            title: &site.title,
            description: &site.description,
            language: &site.language,
            owner: site.owner.to_string(),
            created: site.created.to_rfc3339(),
        };
        write::write_atomic(
            &self.paths.site_json_file(&site.uuid),
            serde_json::to_string_pretty(&about)?.as_bytes(),
        )?;
        Ok(())
    }

    fn write_user_json(&self, site: &Site, user: &User) -> Result<()> {
        let about = UserAbout {
            uuid: user.uuid.to_string(),
            name: &user.name,
            email: &user.public_email,
            created: user.created.to_rfc3339(),
        };
        write::write_atomic(
            &self.paths.user_json_file(&site.uuid, &user.uuid),
            serde_json::to_string_pretty(&about)?.as_bytes(),
        )?;
        Ok(())
    }

    fn write_paginations(&self, site: &Site) -> Result<()> {
        self.write_listing_run(
            &self.paths.paginate_dir(&site.uuid),
            site,
            &site.title,
            &PostFilter::published(),
        )
    }

    fn write_archive(&self, site: &Site) -> Result<()> {
        self.write_listing_run(
            &self.paths.archive_dir(&site.uuid),
            site,
            "Archive",
            &PostFilter::published(),
        )
    }

    // Delete-then-rebuild for one multi-page run: clear the directory, then
    // write page files 1..=N and the index.html alias for page 1. Zero
    // matching posts leaves the directory empty.
    fn write_listing_run(
        &self,
        dir: &Path,
        site: &Site,
        title: &str,
        filter: &PostFilter,
    ) -> Result<()> {
        write::remove_dir_recursive(dir)?;
        write::ensure_dir(dir)?;

        let posts = self.repo.posts_of_site(&site.uuid, filter, 0, None)?;
        let values = self.post_values(&posts)?;
        for page in paginate(&values, self.page_size) {
            let html = render::render(
                &site.template,
                render::listing_value(
                    site,
                    page.items.to_vec(),
                    title,
                    page.number,
                    page.total_pages,
                ),
            )?;
            write::write_atomic(
                &dir.join(format!("{}.html", page.number)),
                html.as_bytes(),
            )?;
            if page.number == 1 {
                write::write_atomic(&dir.join("index.html"), html.as_bytes())?;
            }
        }
        Ok(())
    }

    fn post_values(&self, posts: &[Post]) -> Result<Vec<Value>> {
        let mut authors: HashMap<Uuid, User> = HashMap::new();
        let mut values = Vec::with_capacity(posts.len());
        for post in posts {
            if !authors.contains_key(&post.author) {
                authors.insert(post.author, self.repo.user_by_id(&post.author)?);
            }
            values.push(render::post_value(post, &authors[&post.author]));
        }
        Ok(values)
    }
}

#[derive(Serialize)]
struct SiteAbout<'a> {
    uuid: String,
    domain: &'a str,
    title: &'a str,
    description: &'a str,
    language: &'a str,
    owner: String,
    created: String,
}

#[derive(Serialize)]
struct UserAbout<'a> {
    uuid: String,
    name: &'a str,
    email: &'a str,
    created: String,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type for regeneration operations. Repository misses surface as
/// [`Error::Repo`] so the queue can retry them a bounded number of times;
/// render and write failures fail the task outright.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Repo(#[from] repo::Error),

    #[error(transparent)]
    Render(#[from] render::Error),

    #[error(transparent)]
    Write(#[from] write::Error),

    #[error("encoding metadata blob: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::{create_post, NewPost};
    use crate::repo::MemoryRepository;
    use pretty_assertions::assert_eq;
    use std::fs;

    const LISTING_TEMPLATE: &str =
        "{{.title}}|p{{.current_page}}/{{.total_pages}}|{{range .posts}}{{.slug}};{{end}}";
    const POST_TEMPLATE: &str = "{{.site.title}}:{{.post.slug}}";

    struct Fixture {
        _dir: tempfile::TempDir,
        repo: Arc<MemoryRepository>,
        builder: SiteBuilder,
        site: Site,
        owner: User,
    }

    fn fixture(template: &str, page_size: usize) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(MemoryRepository::new());
        let owner = User::new("o@example.com", "hash", "Owner");
        let mut site = Site::new("foo.example", &owner, "Foo Blog");
        site.template = template.to_owned();
        site.css = String::from("body {}");
        site.js = String::from("console.log(1);");
        repo.insert_user(owner.clone()).unwrap();
        repo.insert_site(site.clone()).unwrap();

        let config = Config {
            output_root: dir.path().to_owned(),
            page_size,
            feed_limit: 20,
            workers: 1,
            max_task_retries: 3,
        };
        let builder = SiteBuilder::new(repo.clone(), &config);
        builder.initialize_site(&site.uuid).unwrap();
        Fixture {
            _dir: dir,
            repo,
            builder,
            site,
            owner,
        }
    }

    fn add_post(fx: &Fixture, title: &str, tags: &str) -> Post {
        let post = create_post(
            fx.repo.as_ref(),
            NewPost {
                site: fx.site.uuid,
                author: fx.owner.uuid,
                title: title.to_owned(),
                body: format!("body of {}", title),
                description: format!("about {}", title),
                tags: tags.to_owned(),
                draft: false,
            },
        )
        .unwrap();
        // spread publish timestamps so posts added later are strictly newer
        let mut dated = post.clone();
        dated.published = chrono::Utc::now()
            + chrono::Duration::seconds(fx
                .repo
                .count_posts(&fx.site.uuid, &PostFilter::published())
                .unwrap() as i64);
        fx.repo.update_post(&dated).unwrap();
        dated
    }

    #[test]
    fn test_initialize_site_writes_tree_and_robots() {
        let fx = fixture(LISTING_TEMPLATE, 10);
        let paths = fx.builder.paths();
        assert!(paths.post_dir(&fx.site.uuid).is_dir());
        assert!(paths.paginate_dir(&fx.site.uuid).is_dir());
        let robots =
            fs::read_to_string(paths.robots_file(&fx.site.uuid)).unwrap();
        assert!(robots.contains("Sitemap: http://foo.example/sitemap.xml"));
    }

    #[test]
    fn test_pagination_completeness() {
        let fx = fixture(LISTING_TEMPLATE, 2);
        for i in 0..5 {
            add_post(&fx, &format!("Post {}", i), "");
        }
        fx.builder.update_site(&fx.site.uuid).unwrap();

        let dir = fx.builder.paths().paginate_dir(&fx.site.uuid);
        assert!(dir.join("1.html").is_file());
        assert!(dir.join("2.html").is_file());
        assert!(dir.join("3.html").is_file());
        assert!(!dir.join("4.html").exists());

        // page 1 and the index alias are byte-identical
        assert_eq!(
            fs::read(dir.join("1.html")).unwrap(),
            fs::read(dir.join("index.html")).unwrap(),
        );

        // last page reports no next page, earlier ones do
        let page1 = fs::read_to_string(dir.join("1.html")).unwrap();
        let page3 = fs::read_to_string(dir.join("3.html")).unwrap();
        assert!(page1.contains("p1/3"));
        assert!(page3.contains("p3/3"));
    }

    #[test]
    fn test_page_one_holds_most_recent_posts() {
        let fx = fixture(LISTING_TEMPLATE, 2);
        add_post(&fx, "Oldest", "");
        add_post(&fx, "Middle", "");
        add_post(&fx, "Newest", "");
        fx.builder.update_site(&fx.site.uuid).unwrap();

        let dir = fx.builder.paths().paginate_dir(&fx.site.uuid);
        let page1 = fs::read_to_string(dir.join("1.html")).unwrap();
        let page2 = fs::read_to_string(dir.join("2.html")).unwrap();
        assert!(page1.contains("newest;middle;"));
        assert!(page2.contains("oldest;"));
        assert!(!page2.contains("newest"));
    }

    #[test]
    fn test_zero_posts_clears_stale_pages() {
        let fx = fixture(LISTING_TEMPLATE, 2);
        let posts: Vec<Post> = (0..5)
            .map(|i| add_post(&fx, &format!("Post {}", i), "tag"))
            .collect();
        fx.builder.update_site(&fx.site.uuid).unwrap();
        fx.builder.update_tag(&fx.site.uuid, "tag").unwrap();
        assert!(fx
            .builder
            .paths()
            .paginate_dir(&fx.site.uuid)
            .join("3.html")
            .is_file());

        for post in &posts {
            fx.repo.delete_post(&post.uuid).unwrap();
        }
        fx.builder.update_site(&fx.site.uuid).unwrap();
        fx.builder.update_tag(&fx.site.uuid, "tag").unwrap();

        for dir in [
            fx.builder.paths().paginate_dir(&fx.site.uuid),
            fx.builder.paths().archive_dir(&fx.site.uuid),
            fx.builder.paths().tag_dir(&fx.site.uuid, "tag"),
        ] {
            let entries: Vec<_> = fs::read_dir(&dir).unwrap().collect();
            assert!(
                entries.is_empty(),
                "expected {} to be empty",
                dir.display()
            );
        }
    }

    #[test]
    fn test_tag_pages_list_only_tagged_posts() {
        let fx = fixture(LISTING_TEMPLATE, 10);
        add_post(&fx, "Both", "a, b");
        add_post(&fx, "Only B", "b");
        fx.builder.update_tag(&fx.site.uuid, "a").unwrap();
        fx.builder.update_tag(&fx.site.uuid, "b").unwrap();

        let paths = fx.builder.paths();
        let tag_a = fs::read_to_string(
            paths.tag_dir(&fx.site.uuid, "a").join("1.html"),
        )
        .unwrap();
        let tag_b = fs::read_to_string(
            paths.tag_dir(&fx.site.uuid, "b").join("1.html"),
        )
        .unwrap();

        assert!(tag_a.contains("both;"));
        assert!(!tag_a.contains("only-b"));
        // ordered publish-desc: "Only B" is newer than "Both"
        assert!(tag_b.contains("only-b;both;"));
        assert!(tag_a.contains("Posts Tagged With a"));
    }

    #[test]
    fn test_update_site_is_idempotent() {
        let fx = fixture(LISTING_TEMPLATE, 2);
        for i in 0..3 {
            add_post(&fx, &format!("Post {}", i), "");
        }
        fx.builder.update_site(&fx.site.uuid).unwrap();
        let paths = fx.builder.paths();
        let sitemap_a = fs::read(paths.sitemap_file(&fx.site.uuid)).unwrap();
        let robots_a = fs::read(paths.robots_file(&fx.site.uuid)).unwrap();
        let page_a = fs::read(paths.paginate_dir(&fx.site.uuid).join("1.html"))
            .unwrap();

        fx.builder.update_site(&fx.site.uuid).unwrap();
        assert_eq!(
            sitemap_a,
            fs::read(paths.sitemap_file(&fx.site.uuid)).unwrap()
        );
        assert_eq!(
            robots_a,
            fs::read(paths.robots_file(&fx.site.uuid)).unwrap()
        );
        assert_eq!(
            page_a,
            fs::read(paths.paginate_dir(&fx.site.uuid).join("1.html")).unwrap()
        );
    }

    #[test]
    fn test_render_post_writes_and_deletes() {
        let fx = fixture(POST_TEMPLATE, 10);
        let post = add_post(&fx, "Hello World", "");
        fx.builder.render_post(&post.uuid).unwrap();

        let path = fx.builder.paths().post_file(&fx.site.uuid, &post.slug);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Foo Blog:hello-world"
        );

        // turning the post back into a draft removes the artifact
        let mut draft = post.clone();
        draft.draft = true;
        fx.repo.update_post(&draft).unwrap();
        fx.builder.render_post(&post.uuid).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_delete_post_artifact() {
        let fx = fixture(POST_TEMPLATE, 10);
        let post = add_post(&fx, "Doomed", "");
        fx.builder.render_post(&post.uuid).unwrap();
        let path = fx.builder.paths().post_file(&fx.site.uuid, &post.slug);
        assert!(path.is_file());

        fx.builder
            .delete_post_artifact(&fx.site.uuid, &post.slug)
            .unwrap();
        assert!(!path.exists());
        // idempotent
        fx.builder
            .delete_post_artifact(&fx.site.uuid, &post.slug)
            .unwrap();
    }

    #[test]
    fn test_bad_template_keeps_last_good_artifact() {
        let fx = fixture(LISTING_TEMPLATE, 10);
        add_post(&fx, "Fine", "");
        fx.builder.update_site(&fx.site.uuid).unwrap();
        let paths = fx.builder.paths();
        let index = fs::read(paths.index_file(&fx.site.uuid)).unwrap();

        let mut broken = fx.repo.site_by_id(&fx.site.uuid).unwrap();
        broken.template = String::from("{{range .posts}} no end");
        fx.repo.update_site(&broken).unwrap();

        assert!(fx.builder.update_site(&fx.site.uuid).is_err());
        assert_eq!(
            index,
            fs::read(paths.index_file(&fx.site.uuid)).unwrap(),
            "failed render must not replace the artifact"
        );
    }

    #[test]
    fn test_change_domain_swaps_alias_and_feeds() {
        let fx = fixture(LISTING_TEMPLATE, 10);
        add_post(&fx, "Post", "");
        fx.builder.bind_domain_alias(&fx.site.uuid).unwrap();
        fx.builder.update_site(&fx.site.uuid).unwrap();

        fx.builder
            .change_domain(&fx.site.uuid, "new.example")
            .unwrap();
        fx.builder.update_site(&fx.site.uuid).unwrap();

        let paths = fx.builder.paths();
        assert!(fs::symlink_metadata(paths.domain_alias("foo.example")).is_err());
        assert_eq!(
            fs::read_link(paths.domain_alias("new.example")).unwrap(),
            paths.site_root(&fx.site.uuid),
        );

        let sitemap =
            fs::read_to_string(paths.sitemap_file(&fx.site.uuid)).unwrap();
        let rss = fs::read_to_string(paths.rss_file(&fx.site.uuid)).unwrap();
        assert!(!sitemap.contains("foo.example"));
        assert!(sitemap.contains("http://new.example/post/post.html"));
        assert!(rss.contains("http://new.example/"));
        assert!(!rss.contains("foo.example"));
    }

    #[test]
    fn test_theme_assets_written_verbatim() {
        let fx = fixture(LISTING_TEMPLATE, 10);
        fx.builder.write_theme_assets(&fx.site.uuid).unwrap();
        let paths = fx.builder.paths();
        assert_eq!(
            fs::read_to_string(paths.css_file(&fx.site.uuid)).unwrap(),
            "body {}"
        );
        assert_eq!(
            fs::read_to_string(paths.js_file(&fx.site.uuid)).unwrap(),
            "console.log(1);"
        );
        assert_eq!(
            fs::read_to_string(paths.template_file(&fx.site.uuid)).unwrap(),
            LISTING_TEMPLATE
        );
    }

    #[test]
    fn test_user_pages_list_authored_posts() {
        let fx = fixture(LISTING_TEMPLATE, 10);
        add_post(&fx, "Mine", "");
        fx.builder
            .update_user_pages(&fx.site.uuid, &fx.owner.uuid)
            .unwrap();

        let paths = fx.builder.paths();
        let page = fs::read_to_string(
            paths.user_dir(&fx.site.uuid, &fx.owner.uuid).join("1.html"),
        )
        .unwrap();
        assert!(page.contains("mine;"));
        assert!(page.contains("Posts By Owner"));

        let about = fs::read_to_string(
            paths.user_json_file(&fx.site.uuid, &fx.owner.uuid),
        )
        .unwrap();
        assert!(about.contains(&fx.owner.uuid.to_string()));
    }

    #[test]
    fn test_rss_respects_feed_limit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(MemoryRepository::new());
        let owner = User::new("o@example.com", "hash", "Owner");
        let mut site = Site::new("foo.example", &owner, "Foo");
        site.template = LISTING_TEMPLATE.to_owned();
        repo.insert_user(owner.clone()).unwrap();
        repo.insert_site(site.clone()).unwrap();
        let config = Config {
            output_root: dir.path().to_owned(),
            page_size: 10,
            feed_limit: 2,
            workers: 1,
            max_task_retries: 3,
        };
        let builder = SiteBuilder::new(repo.clone(), &config);
        builder.initialize_site(&site.uuid).unwrap();

        for i in 0..4 {
            create_post(
                repo.as_ref(),
                NewPost {
                    site: site.uuid,
                    author: owner.uuid,
                    title: format!("Post {}", i),
                    body: String::new(),
                    description: String::new(),
                    tags: String::new(),
                    draft: false,
                },
            )
            .unwrap();
        }
        builder.update_site(&site.uuid).unwrap();
        let rss = fs::read_to_string(
            builder.paths().rss_file(&site.uuid),
        )
        .unwrap();
        assert_eq!(rss.matches("<item>").count(), 2);
    }

    #[test]
    fn test_teardown_site() {
        let fx = fixture(LISTING_TEMPLATE, 10);
        fx.builder.bind_domain_alias(&fx.site.uuid).unwrap();
        fx.builder
            .teardown_site(&fx.site.uuid, "foo.example")
            .unwrap();
        let paths = fx.builder.paths();
        assert!(!paths.site_root(&fx.site.uuid).exists());
        assert!(fs::symlink_metadata(paths.domain_alias("foo.example")).is_err());
    }
}
