//! Placeholder substitution in raw manifest text.
//!
//! Base and override manifests may reference `{version}`, `{name}` and
//! `{commit}`; they are substituted before the text is split into documents.
//! Other brace text, such as JSON payloads inside a `ConfigMap` or template
//! syntax meant for another tool, is left untouched.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

const PLACEHOLDER_PATTERN: &str = r"\{(version|name|commit)\}";

#[expect(
    clippy::expect_used,
    reason = "the placeholder pattern is a literal and always compiles"
)]
fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"))
}

/// Values substituted into manifest templates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TemplateVars<'a> {
    /// Replaces `{version}`.
    pub version: &'a str,
    /// Replaces `{name}`; the service name.
    pub name: &'a str,
    /// Replaces `{commit}`; usually a short commit hash.
    pub commit: &'a str,
}

impl TemplateVars<'_> {
    /// `key` is one of the names matched by the placeholder pattern.
    fn lookup(&self, key: &str) -> &str {
        match key {
            "version" => self.version,
            "name" => self.name,
            _ => self.commit,
        }
    }
}

/// Substitute known placeholders in `source`.
///
/// Returns the input unchanged (borrowed) when it contains no placeholder.
///
/// # Examples
///
/// ```rust
/// use upmerge::template::{TemplateVars, render_template};
///
/// let vars = TemplateVars { version: "12", name: "api", commit: "abc1234" };
/// let text = render_template("image: registry/{name}:{commit}\nraw: {\"a\": 1}", &vars);
/// assert_eq!(text, "image: registry/api:abc1234\nraw: {\"a\": 1}");
/// ```
#[must_use]
pub fn render_template<'s>(source: &'s str, vars: &TemplateVars<'_>) -> Cow<'s, str> {
    placeholder().replace_all(source, |caps: &Captures<'_>| {
        let (_, [key]) = caps.extract();
        vars.lookup(key).to_owned()
    })
}
