//! Template rendering and context construction.
//!
//! Site themes are user-supplied template text, so rendering is strictly
//! data-driven: the engine receives a [`Value`] tree and can never execute
//! code. Rendering is deterministic for identical inputs, and a render
//! failure propagates — callers must never write partial output, so the
//! on-disk artifact keeps its last-good bytes until the theme is fixed.

use crate::post::Post;
use crate::site::Site;
use crate::user::User;
use gtmpl::Value;
use pulldown_cmark::{html, Parser};
use std::collections::HashMap;

/// Renders `template_text` against `context` and returns the complete
/// output. The template is parsed fresh on every call; themes are stored as
/// text on the site record, not precompiled.
pub fn render(template_text: &str, context: Value) -> Result<String> {
    let mut template = gtmpl::Template::default();
    template.parse(template_text).map_err(Error::Parse)?;

    let mut buf: Vec<u8> = Vec::new();
    template
        .execute(&mut buf, &gtmpl::Context::from(context).unwrap())
        .map_err(Error::Render)?;
    Ok(String::from_utf8(buf)?)
}

/// Converts a markdown post body into HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(markdown));
    out
}

pub fn site_value(site: &Site) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("uuid".to_owned(), Value::String(site.uuid.to_string()));
    m.insert("title".to_owned(), Value::String(site.title.clone()));
    m.insert(
        "description".to_owned(),
        Value::String(site.description.clone()),
    );
    m.insert("domain".to_owned(), Value::String(site.domain.clone()));
    m.insert("language".to_owned(), Value::String(site.language.clone()));
    m.insert(
        "created".to_owned(),
        Value::String(site.created.to_rfc3339()),
    );
    Value::Object(m)
}

pub fn user_value(user: &User) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("uuid".to_owned(), Value::String(user.uuid.to_string()));
    m.insert("name".to_owned(), Value::String(user.name.clone()));
    m.insert(
        "email".to_owned(),
        Value::String(user.public_email.clone()),
    );
    m.insert(
        "created".to_owned(),
        Value::String(user.created.to_rfc3339()),
    );
    Value::Object(m)
}

fn tag_value(tag: &str) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("tag".to_owned(), Value::String(tag.to_owned()));
    m.insert("url".to_owned(), Value::String(format!("/tag/{}/", tag)));
    Value::Object(m)
}

/// Builds the context object for a single post, with the body already
/// converted from markdown.
pub fn post_value(post: &Post, author: &User) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("uuid".to_owned(), Value::String(post.uuid.to_string()));
    m.insert("title".to_owned(), Value::String(post.title.clone()));
    m.insert("slug".to_owned(), Value::String(post.slug.clone()));
    m.insert(
        "url".to_owned(),
        Value::String(format!("/post/{}.html", post.slug)),
    );
    m.insert(
        "description".to_owned(),
        Value::String(post.description.clone()),
    );
    m.insert(
        "body".to_owned(),
        Value::String(markdown_to_html(&post.body)),
    );
    m.insert(
        "tags".to_owned(),
        Value::Array(post.tags.iter().map(|t| tag_value(t)).collect()),
    );
    m.insert(
        "published".to_owned(),
        Value::String(post.published.to_rfc3339()),
    );
    m.insert("author".to_owned(), user_value(author));
    Value::Object(m)
}

/// Context for a single post page: `{site, post}`.
pub fn post_page_value(site: &Site, post: &Post, author: &User) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("site".to_owned(), site_value(site));
    m.insert("post".to_owned(), post_value(post, author));
    Value::Object(m)
}

/// Context for one page of a listing run (index, pagination, archive, tag,
/// user): `{site, posts, title, current_page, total_pages, has_previous,
/// has_next}`.
pub fn listing_value(
    site: &Site,
    posts: Vec<Value>,
    title: &str,
    current_page: usize,
    total_pages: usize,
) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("site".to_owned(), site_value(site));
    m.insert("posts".to_owned(), Value::Array(posts));
    m.insert("title".to_owned(), Value::String(title.to_owned()));
    m.insert(
        "current_page".to_owned(),
        Value::from(current_page as u64),
    );
    m.insert("total_pages".to_owned(), Value::from(total_pages as u64));
    m.insert(
        "has_previous".to_owned(),
        Value::from(current_page > 1),
    );
    m.insert(
        "has_next".to_owned(),
        Value::from(current_page < total_pages),
    );
    Value::Object(m)
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("parsing template: {0}")]
    Parse(String),

    #[error("rendering template: {0}")]
    Render(String),

    #[error("template produced invalid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
