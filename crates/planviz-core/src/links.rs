//! Stage link prefixing.
//!
//! When the UI is served behind a proxy, every page lives under a path prefix such as
//! `/sparkui/<cluster>/driver-<id>`. The plan emitter writes stage links as `href=/stage...`, so
//! they have to be rebased onto the prefix the page was actually served from. The prefix is
//! recovered from the visualization stylesheet link, which always points into `<prefix>/static`.

use std::borrow::Cow;

const STAGE_LINK: &str = "href=/stage";

/// Returns the path prefix in front of `/static` in the stylesheet href.
pub fn stage_link_prefix(stylesheet_href: &str) -> Option<&str> {
    stylesheet_href
        .find("/static")
        .map(|pos| &stylesheet_href[..pos])
}

/// Rewrites `href=/stage` links in the description so they resolve under the page prefix.
///
/// An href without `/static` leaves the text untouched.
pub fn rewrite_stage_links<'a>(text: &'a str, stylesheet_href: Option<&str>) -> Cow<'a, str> {
    let Some(prefix) = stylesheet_href.and_then(stage_link_prefix) else {
        return Cow::Borrowed(text);
    };
    if prefix.is_empty() || !text.contains(STAGE_LINK) {
        return Cow::Borrowed(text);
    }
    tracing::debug!(prefix, "rebasing stage links");
    Cow::Owned(text.replace(STAGE_LINK, &format!("href={prefix}/stage")))
}
