//! Structural rewrite of third-party article bodies.
//!
//! The body is parsed into a tree and re-serialized node by node, so nested
//! or escaped markup can never be corrupted by pattern substitution. Rules:
//! images become absolute links, headings become paragraphs, hyperlinks get a
//! fixed label and open in a new tab, whitespace is collapsed, and active or
//! embedded content is dropped.

use crate::shared::html::collapse_whitespace;
use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{ElementRef, Html, Node};
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

pub const LINK_LABEL: &str = "Click here to be redirected to the link";
pub const IMAGE_LABEL: &str = "Click to see image";

/// Nesting deeper than this is treated as a malformed fragment.
const MAX_DEPTH: usize = 256;

/// Elements dropped together with everything inside them.
const DROPPED: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "head", "title",
    "meta", "link", "base", "input", "button", "select", "textarea", "form", "source", "track",
    "area", "param", "col",
];

/// Containers whose whitespace-only text children carry no meaning.
const STRUCTURAL: &[&str] = &[
    "ul", "ol", "dl", "table", "thead", "tbody", "tfoot", "tr", "colgroup",
];

/// Link schemes allowed to survive as anchors.
const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("cannot resolve '{reference}' against the origin: {source}")]
    Url {
        reference: String,
        #[source]
        source: url::ParseError,
    },

    #[error("markup nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

/// Rewrite an article body. Output is deterministic for a given input.
pub fn rewrite_body(html: &str, origin: &Url) -> Result<String, RewriteError> {
    let fragment = Html::parse_fragment(html);
    let mut rewriter = Rewriter {
        origin,
        seen_links: HashSet::new(),
    };
    let mut out = String::with_capacity(html.len());
    rewriter.children(fragment.root_element(), &mut out, 0, false)?;
    Ok(compact(&out))
}

struct Rewriter<'a> {
    origin: &'a Url,
    /// Targets already emitted; repeated links to the same target are dropped.
    seen_links: HashSet<String>,
}

impl Rewriter<'_> {
    fn children(
        &mut self,
        parent: ElementRef<'_>,
        out: &mut String,
        depth: usize,
        structural: bool,
    ) -> Result<(), RewriteError> {
        for child in parent.children() {
            match child.value() {
                Node::Text(text) => {
                    if structural && text.trim().is_empty() {
                        continue;
                    }
                    out.push_str(&encode_text(&collapse_whitespace(text)));
                }
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        self.element(element, out, depth + 1)?;
                    }
                }
                // comments, doctypes, processing instructions
                _ => {}
            }
        }
        Ok(())
    }

    fn element(
        &mut self,
        el: ElementRef<'_>,
        out: &mut String,
        depth: usize,
    ) -> Result<(), RewriteError> {
        if depth > MAX_DEPTH {
            return Err(RewriteError::TooDeep);
        }
        let name = el.value().name();
        match name {
            _ if DROPPED.contains(&name) => {}
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let text = collapse_whitespace(&el.text().collect::<String>());
                out.push_str("<p class=\"news-paragraph\">");
                out.push_str(&encode_text(text.trim()));
                out.push_str("</p>");
                // Images carry no text; their links follow the paragraph.
                for img in el
                    .descendants()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| e.value().name() == "img")
                {
                    self.image(img, out)?;
                }
            }
            "img" => self.image(el, out)?,
            "a" => self.link(el, out, depth)?,
            "br" => out.push_str("<br>"),
            "hr" | "wbr" => {
                out.push('<');
                out.push_str(name);
                out.push('>');
            }
            "li" => {
                let mut inner = String::new();
                self.children(el, &mut inner, depth, false)?;
                out.push_str("<li>");
                out.push_str(inner.trim());
                out.push_str("</li>");
            }
            _ => {
                // Attributes are never carried over.
                out.push('<');
                out.push_str(name);
                out.push('>');
                self.children(el, out, depth, STRUCTURAL.contains(&name))?;
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
        Ok(())
    }

    fn link(
        &mut self,
        el: ElementRef<'_>,
        out: &mut String,
        depth: usize,
    ) -> Result<(), RewriteError> {
        let href = el.value().attr("href").map(str::trim).unwrap_or_default();
        if href.is_empty() || href.starts_with('#') {
            // Not a navigable link: keep the text, lose the anchor.
            return self.children(el, out, depth, false);
        }

        let target = self.absolutize(href)?;
        if !SAFE_SCHEMES.contains(&target.scheme()) {
            return self.children(el, out, depth, false);
        }
        if self.seen_links.insert(target.to_string()) {
            push_anchor(out, target.as_str(), LINK_LABEL);
        }
        Ok(())
    }

    fn image(&self, el: ElementRef<'_>, out: &mut String) -> Result<(), RewriteError> {
        let src = el.value().attr("src").map(str::trim).unwrap_or_default();
        if !src.is_empty() {
            let target = self.absolutize(src)?;
            push_anchor(out, target.as_str(), IMAGE_LABEL);
        }
        Ok(())
    }

    fn absolutize(&self, reference: &str) -> Result<Url, RewriteError> {
        self.origin.join(reference).map_err(|source| RewriteError::Url {
            reference: reference.to_string(),
            source,
        })
    }
}

fn push_anchor(out: &mut String, href: &str, label: &str) {
    out.push_str("<a href=\"");
    out.push_str(&encode_double_quoted_attribute(href));
    out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
    out.push_str(label);
    out.push_str("</a>");
}

/// Canonical line breaks: no whitespace hugging `<br>`, nothing at the edges.
///
/// Safe as a textual pass because all text and attribute values were escaped,
/// so a literal `<br>` can only be one we emitted.
fn compact(s: &str) -> String {
    let mut out = s.to_string();
    while out.contains(" <br>") || out.contains("<br> ") {
        out = out.replace(" <br>", "<br>").replace("<br> ", "<br>");
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://www.gomotionapp.com").unwrap()
    }

    fn rewrite(html: &str) -> String {
        rewrite_body(html, &origin()).unwrap()
    }

    #[test]
    fn headings_become_plain_paragraphs() {
        assert_eq!(
            rewrite(r#"<h2 style="color:red">  Meet   <em>Results</em> </h2><p class="x">Great <b>job</b>!</p>"#),
            r#"<p class="news-paragraph">Meet Results</p><p>Great <b>job</b>!</p>"#
        );
    }

    #[test]
    fn images_become_absolute_links() {
        assert_eq!(
            rewrite(r#"<p><img src="/uploads/pool.jpg" alt="pool"></p>"#),
            r#"<p><a href="https://www.gomotionapp.com/uploads/pool.jpg" target="_blank" rel="noopener noreferrer">Click to see image</a></p>"#
        );
    }

    #[test]
    fn image_inside_heading_is_kept_after_the_paragraph() {
        assert_eq!(
            rewrite(r#"<h2><img src="/a.jpg"> Results</h2>"#),
            concat!(
                r#"<p class="news-paragraph">Results</p>"#,
                r#"<a href="https://www.gomotionapp.com/a.jpg" target="_blank" rel="noopener noreferrer">Click to see image</a>"#
            )
        );
    }

    #[test]
    fn links_get_fixed_label_absolute_url_and_new_tab() {
        assert_eq!(
            rewrite(r#"<p>See <a href="/team/cadas/page/meets">the meet page</a> and <a href="https://example.org/x" target="_self">this</a>.</p>"#),
            concat!(
                r#"<p>See <a href="https://www.gomotionapp.com/team/cadas/page/meets" target="_blank" rel="noopener noreferrer">Click here to be redirected to the link</a>"#,
                r#" and <a href="https://example.org/x" target="_blank" rel="noopener noreferrer">Click here to be redirected to the link</a>.</p>"#
            )
        );
    }

    #[test]
    fn repeated_links_are_emitted_once() {
        let out = rewrite(r#"<a href="/a">first</a> <a href="/a">second</a>"#);
        assert_eq!(out.matches("<a ").count(), 1);
    }

    #[test]
    fn unsafe_and_fragment_links_keep_only_their_text() {
        assert_eq!(
            rewrite(r##"<p><a href="javascript:alert(1)">click <i>me</i></a> <a href="#top">top</a></p>"##),
            "<p>click <i>me</i> top</p>"
        );
    }

    #[test]
    fn whitespace_line_breaks_and_lists_are_compacted() {
        assert_eq!(
            rewrite("<ul>\n  <li>  One\n</li>\n  <li>Two  <br>  lines</li>\n</ul>\n<p>a<br>\n b</p>"),
            "<ul><li>One</li><li>Two<br>lines</li></ul> <p>a<br>b</p>"
        );
    }

    #[test]
    fn active_content_and_comments_are_dropped() {
        assert_eq!(
            rewrite("<p>Hi</p><script>alert(1)</script><!-- note --><style>p{}</style>"),
            "<p>Hi</p>"
        );
    }

    #[test]
    fn text_is_re_escaped() {
        assert_eq!(rewrite("<p>Fish &amp; Chips &lt;3</p>"), "<p>Fish &amp; Chips &lt;3</p>");
    }

    #[test]
    fn unresolvable_reference_is_an_error() {
        let err = rewrite_body(r#"<a href="http://exa mple.com/">bad</a>"#, &origin()).unwrap_err();
        assert!(matches!(err, RewriteError::Url { .. }));
    }

    #[test]
    fn absurd_nesting_is_an_error() {
        let html = "<div>".repeat(MAX_DEPTH + 10);
        assert!(matches!(
            rewrite_body(&html, &origin()),
            Err(RewriteError::TooDeep)
        ));
    }
}
