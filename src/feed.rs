//! Feed-style artifacts: RSS, sitemap, and robots.txt. Each is a pure
//! function from site metadata plus a post listing to one complete text
//! artifact, so the three can be regenerated in any order or in parallel.

use crate::post::Post;
use crate::site::Site;
use chrono::Utc;
use rss::{ChannelBuilder, GuidBuilder, Item, ItemBuilder};

/// Builds the RSS 2.0 channel for a site. `posts` should already be the
/// most-recent window (the builder passes the configured feed limit, newest
/// first). Item dates are RFC-2822; `lastBuildDate` is the moment of
/// generation and is recomputed on every call rather than persisted.
pub fn rss_feed(site: &Site, posts: &[Post]) -> String {
    let items: Vec<Item> = posts.iter().map(|post| rss_item(site, post)).collect();
    ChannelBuilder::default()
        .title(site.title.clone())
        .link(format!("http://{}/", site.domain))
        .description(site.description.clone())
        .language(site.language.clone())
        .last_build_date(Utc::now().to_rfc2822())
        .items(items)
        .build()
        .to_string()
}

fn rss_item(site: &Site, post: &Post) -> Item {
    let url = post_url(site, post);
    ItemBuilder::default()
        .title(post.title.clone())
        .link(url.clone())
        .description(post.description.clone())
        .guid(GuidBuilder::default().value(url).permalink(true).build())
        .pub_date(post.published.to_rfc2822())
        .build()
}

/// Builds the sitemap: one `<url>` per post, `lastmod` as `YYYY-MM-DD`.
/// Drafts never reach this function; the caller queries published posts
/// only.
pub fn sitemap(site: &Site, posts: &[Post]) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for post in posts {
        out.push_str("<url>\n");
        out.push_str(&format!(" <loc>{}</loc>\n", post_url(site, post)));
        out.push_str(&format!(
            " <lastmod>{}</lastmod>\n",
            post.published.format("%Y-%m-%d")
        ));
        out.push_str("</url>\n");
    }
    out.push_str("</urlset>\n");
    out
}

/// Static crawling policy plus a pointer at the site's own sitemap.
pub fn robots_txt(site: &Site) -> String {
    format!(
        "# www.robotstxt.org/\n\
         Sitemap: http://{}/sitemap.xml\n\
         # Allow crawling of all content\n\
         User-agent: *\n\
         Disallow:\n",
        site.domain
    )
}

fn post_url(site: &Site, post: &Post) -> String {
    format!("http://{}/post/{}.html", site.domain, post.slug)
}
