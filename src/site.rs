use crate::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_language() -> String {
    String::from("en-us")
}

/// The three theme files a site carries. Editing one triggers a rewrite of
/// just that static asset; template edits additionally trigger a full regen
/// of every templated artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeAsset {
    Css,
    Js,
    Template,
}

/// A tenant's blog. The `domain` is globally unique and is the only key by
/// which public requests resolve to a site's directory; all content lives
/// under the identifier-addressed tree keyed by `uuid`, so renaming the
/// domain never moves content.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Site {
    pub uuid: Uuid,
    pub domain: String,
    pub owner: Uuid,

    /// Users allowed to author posts. Always contains the owner.
    pub members: Vec<Uuid>,

    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_language")]
    pub language: String,

    /// Theme: stylesheet text, script text, and the HTML template every
    /// templated artifact is rendered from.
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub js: String,
    #[serde(default)]
    pub template: String,

    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
}

impl Site {
    pub fn new(domain: &str, owner: &User, title: &str) -> Site {
        Site {
            uuid: Uuid::new_v4(),
            domain: domain.to_owned(),
            owner: owner.uuid,
            members: vec![owner.uuid],
            title: title.to_owned(),
            description: String::new(),
            language: default_language(),
            css: String::new(),
            js: String::new(),
            template: String::new(),
            created: Utc::now(),
        }
    }

    pub fn is_member(&self, user: &Uuid) -> bool {
        self.members.contains(user)
    }

    /// Adds a member; the membership set behaves like the original's unique
    /// (site, user) index, so re-adding is a no-op.
    pub fn add_member(&mut self, user: &Uuid) {
        if !self.is_member(user) {
            self.members.push(*user);
        }
    }
}
