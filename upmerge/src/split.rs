//! Splitting of multi-document manifest streams.

use std::sync::OnceLock;

use regex::Regex;

/// A fence line starts with three or more dashes. Only the dashes are
/// consumed; anything after them on the same line stays with the next
/// fragment.
const FENCE_PATTERN: &str = r"(?m)^-{3,}";

#[expect(
    clippy::expect_used,
    reason = "the fence pattern is a literal and always compiles"
)]
fn fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(FENCE_PATTERN).expect("fence pattern is valid"))
}

/// Split `text` on fence lines, returning every fragment untrimmed.
///
/// An empty blob yields one empty fragment, and text without fences yields
/// itself. Callers that only want documents should use [`fragments`].
///
/// # Examples
///
/// ```rust
/// let parts = upmerge::split::split("a: 1\n---\nb: 2\n");
/// assert_eq!(parts, vec!["a: 1\n", "\nb: 2\n"]);
/// assert_eq!(upmerge::split::split(""), vec![""]);
/// ```
#[must_use]
pub fn split(text: &str) -> Vec<&str> {
    fence().split(text).collect()
}

/// Split `text` on fence lines and yield trimmed, non-blank fragments.
pub fn fragments(text: &str) -> impl Iterator<Item = &str> {
    fence()
        .split(text)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{fragments, split};
    use rstest::rstest;

    #[rstest]
    #[case("", vec![""])]
    #[case("kind: A", vec!["kind: A"])]
    #[case("---\nkind: A", vec!["", "\nkind: A"])]
    #[case("kind: A\n-----\nkind: B\n", vec!["kind: A\n", "\nkind: B\n"])]
    #[case("kind: A\n--- # trailing\nkind: B", vec!["kind: A\n", " # trailing\nkind: B"])]
    fn splits_on_fence_lines(#[case] text: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split(text), expected);
    }

    #[rstest]
    #[case("data: a--- b")]
    #[case("data:\n  --- indented")]
    #[case("-- two dashes")]
    fn ignores_dashes_that_are_not_fences(#[case] text: &str) {
        assert_eq!(split(text), vec![text]);
    }

    #[rstest]
    fn fragments_trim_and_drop_blank_parts() {
        let text = "\n---\nkind: A\n---\n   \n---\nkind: B\n---\n";
        let parts: Vec<&str> = fragments(text).collect();
        assert_eq!(parts, vec!["kind: A", "kind: B"]);
    }

    #[rstest]
    fn empty_text_has_no_fragments() {
        assert_eq!(fragments("").count(), 0);
    }
}
