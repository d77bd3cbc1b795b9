//! Maps site identity to filesystem locations. Pure and total: every method
//! returns a path without touching the disk.
//!
//! Two independent trees hang off the output root. The identifier-addressed
//! tree (`sites/id/{uuid}/...`) holds all of a site's content and is stable
//! across domain renames. The domain-addressed tree (`sites/domain/{domain}`)
//! holds one symlink per site, pointing into the id tree; public requests
//! resolve by hostname through that link, so a domain change only ever moves
//! the link, never the content.

use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct PathResolver {
    by_id: PathBuf,
    by_domain: PathBuf,
}

impl PathResolver {
    pub fn new(output_root: &Path) -> Self {
        let sites = output_root.join("sites");
        PathResolver {
            by_id: sites.join("id"),
            by_domain: sites.join("domain"),
        }
    }

    /// Root of the identifier-addressed tree.
    pub fn by_id_root(&self) -> &Path {
        &self.by_id
    }

    /// Root of the domain-addressed alias tree.
    pub fn by_domain_root(&self) -> &Path {
        &self.by_domain
    }

    /// A site's identifier-addressed root directory.
    pub fn site_root(&self, site: &Uuid) -> PathBuf {
        self.by_id.join(site.to_string())
    }

    /// The alias symlink for a domain.
    pub fn domain_alias(&self, domain: &str) -> PathBuf {
        self.by_domain.join(domain)
    }

    /// Every per-site subdirectory created at site initialization.
    pub fn site_subdirectories(&self, site: &Uuid) -> Vec<PathBuf> {
        let root = self.site_root(site);
        ["post", "tag", "paginate", "archive", "img", "podcast", "user", "json"]
            .iter()
            .map(|sub| root.join(sub))
            .collect()
    }

    pub fn post_dir(&self, site: &Uuid) -> PathBuf {
        self.site_root(site).join("post")
    }

    pub fn post_file(&self, site: &Uuid, slug: &str) -> PathBuf {
        self.post_dir(site).join(format!("{}.html", slug))
    }

    pub fn tags_dir(&self, site: &Uuid) -> PathBuf {
        self.site_root(site).join("tag")
    }

    pub fn tag_dir(&self, site: &Uuid, tag: &str) -> PathBuf {
        self.tags_dir(site).join(tag)
    }

    pub fn paginate_dir(&self, site: &Uuid) -> PathBuf {
        self.site_root(site).join("paginate")
    }

    pub fn archive_dir(&self, site: &Uuid) -> PathBuf {
        self.site_root(site).join("archive")
    }

    pub fn users_dir(&self, site: &Uuid) -> PathBuf {
        self.site_root(site).join("user")
    }

    pub fn user_dir(&self, site: &Uuid, user: &Uuid) -> PathBuf {
        self.users_dir(site).join(user.to_string())
    }

    pub fn index_file(&self, site: &Uuid) -> PathBuf {
        self.site_root(site).join("index.html")
    }

    pub fn rss_file(&self, site: &Uuid) -> PathBuf {
        self.site_root(site).join("rss.xml")
    }

    pub fn sitemap_file(&self, site: &Uuid) -> PathBuf {
        self.site_root(site).join("sitemap.xml")
    }

    pub fn robots_file(&self, site: &Uuid) -> PathBuf {
        self.site_root(site).join("robots.txt")
    }

    pub fn css_file(&self, site: &Uuid) -> PathBuf {
        self.site_root(site).join("main.css")
    }

    pub fn js_file(&self, site: &Uuid) -> PathBuf {
        self.site_root(site).join("main.js")
    }

    pub fn template_file(&self, site: &Uuid) -> PathBuf {
        self.site_root(site).join("template.hbs")
    }

    pub fn site_json_file(&self, site: &Uuid) -> PathBuf {
        self.site_root(site).join("json").join("about.json")
    }

    pub fn user_json_file(&self, site: &Uuid, user: &Uuid) -> PathBuf {
        self.site_root(site)
            .join("json")
            .join("user")
            .join(format!("{}.json", user))
    }
}
