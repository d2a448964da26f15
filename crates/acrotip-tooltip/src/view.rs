//! Tooltip content.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use acrotip_protocols::{LookupResult, LookupSource};

pub const LOADING_LABEL: &str = "Looking up...";
pub const NOT_FOUND_MESSAGE: &str = "No definitions found.";
pub const EXTENSION_ERROR_MESSAGE: &str = "Something went wrong. Try again.";
pub const DISMISS_LABEL: &str = "Don't show again";
pub const OTHERS_SUMMARY: &str = "Not right? See other definitions";

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Invalid wiki base URL '{url}': {source}")]
    InvalidBase {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Builds outbound links to the wiki's word page.
#[derive(Debug, Clone)]
pub struct TooltipLinks {
    word_page: Url,
}

impl TooltipLinks {
    pub fn new(base_url: &str) -> Result<Self, LinkError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let invalid = |source: url::ParseError| LinkError::InvalidBase {
            url: base_url.to_string(),
            source,
        };
        let word_page = Url::parse(&base)
            .and_then(|b| b.join("word/"))
            .map_err(invalid)?;
        Ok(Self { word_page })
    }

    /// `<base>/word/?word=<term>`
    pub fn word_url(&self, term: &str) -> String {
        let mut url = self.word_page.clone();
        url.query_pairs_mut().append_pair("word", term);
        url.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    PrimarySource,
    AiGenerated,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::PrimarySource => "primary source",
            Badge::AiGenerated => "AI-generated",
        }
    }
}

/// What the tooltip shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TooltipView {
    Loading {
        term: String,
        link: String,
    },
    Definition {
        term: String,
        badge: Badge,
        text: String,
        /// Up-votes of the top definition, when the source reports votes.
        upvotes: Option<u32>,
        others: Vec<String>,
        link: String,
    },
    NotFound {
        term: String,
        link: String,
    },
    ExtensionError {
        term: String,
        link: String,
    },
}

impl TooltipView {
    pub fn loading(term: &str, links: &TooltipLinks) -> Self {
        TooltipView::Loading {
            term: term.to_string(),
            link: links.word_url(term),
        }
    }

    pub fn extension_error(term: &str, links: &TooltipLinks) -> Self {
        TooltipView::ExtensionError {
            term: term.to_string(),
            link: links.word_url(term),
        }
    }

    /// View for a finished lookup. Empty results render as not found.
    pub fn from_result(result: &LookupResult, links: &TooltipLinks, max_others: usize) -> Self {
        let term = result.term.clone();
        let link = links.word_url(&term);
        if result.is_empty() {
            return TooltipView::NotFound { term, link };
        }

        match result.source {
            LookupSource::Primary => {
                let mut definitions = result.definitions.iter();
                let Some(top) = definitions.next() else {
                    return TooltipView::NotFound { term, link };
                };
                TooltipView::Definition {
                    term,
                    badge: Badge::PrimarySource,
                    text: top.text.clone(),
                    upvotes: (top.upvote_count > 0).then_some(top.upvote_count),
                    others: definitions.take(max_others).map(|d| d.text.clone()).collect(),
                    link,
                }
            }
            LookupSource::Ai => TooltipView::Definition {
                term,
                badge: Badge::AiGenerated,
                text: result.top_definition().unwrap_or_default().trim().to_string(),
                upvotes: None,
                others: Vec::new(),
                link,
            },
            LookupSource::None => TooltipView::NotFound { term, link },
        }
    }

    pub fn term(&self) -> &str {
        match self {
            TooltipView::Loading { term, .. }
            | TooltipView::Definition { term, .. }
            | TooltipView::NotFound { term, .. }
            | TooltipView::ExtensionError { term, .. } => term,
        }
    }

    pub fn link(&self) -> &str {
        match self {
            TooltipView::Loading { link, .. }
            | TooltipView::Definition { link, .. }
            | TooltipView::NotFound { link, .. }
            | TooltipView::ExtensionError { link, .. } => link,
        }
    }

    pub fn link_label(&self) -> &'static str {
        match self {
            TooltipView::Definition {
                badge: Badge::PrimarySource,
                ..
            }
            | TooltipView::Loading { .. } => "View on wiki",
            TooltipView::Definition { .. } | TooltipView::NotFound { .. } => "Define on wiki",
            TooltipView::ExtensionError { .. } => "Try on wiki",
        }
    }

    /// Whether the "don't show again" affordance is offered.
    pub fn is_dismissible(&self) -> bool {
        !matches!(self, TooltipView::Loading { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, TooltipView::Loading { .. })
    }
}

/// Render the view as an HTML fragment. All text is escaped.
pub fn render_html(view: &TooltipView) -> String {
    let term = escape_html(view.term());
    let mut html = String::from("<div class=\"acrotip-header\">");
    html.push_str(&format!("<span class=\"acrotip-term\">{}</span>", term));

    match view {
        TooltipView::Loading { .. } => {
            html.push_str("</div>");
            html.push_str(&format!(
                "<div class=\"acrotip-loading\"><div class=\"acrotip-spinner\" role=\"progressbar\"></div><div>{}</div></div>",
                LOADING_LABEL
            ));
            return html;
        }
        TooltipView::Definition {
            badge,
            text,
            upvotes,
            others,
            ..
        } => {
            let modifier = match badge {
                Badge::PrimarySource => "",
                Badge::AiGenerated => " acrotip-badge--ai",
            };
            html.push_str(&format!(
                "<span class=\"acrotip-badge{}\">{}</span>",
                modifier,
                badge.label()
            ));
            if let Some(votes) = upvotes {
                html.push_str(&format!("<span class=\"acrotip-votes\">{}</span>", votes));
            }
            html.push_str("</div>");
            html.push_str(&format!(
                "<div class=\"acrotip-primary-def\"><p class=\"acrotip-def-text\">{}</p></div>",
                escape_html(text)
            ));
            if !others.is_empty() {
                html.push_str("<hr class=\"acrotip-divider\"><details class=\"acrotip-other-defs\">");
                html.push_str(&format!("<summary>{}</summary>", OTHERS_SUMMARY));
                for other in others {
                    html.push_str(&format!(
                        "<div class=\"acrotip-def-row\"><p>{}</p></div>",
                        escape_html(other)
                    ));
                }
                html.push_str("</details>");
            }
        }
        TooltipView::NotFound { .. } => {
            html.push_str("</div>");
            html.push_str(&format!("<div class=\"acrotip-empty\">{}</div>", NOT_FOUND_MESSAGE));
        }
        TooltipView::ExtensionError { .. } => {
            html.push_str("</div>");
            html.push_str(&format!(
                "<div class=\"acrotip-error\">{}</div>",
                EXTENSION_ERROR_MESSAGE
            ));
        }
    }

    html.push_str("<div class=\"acrotip-footer\">");
    html.push_str(&format!(
        "<a class=\"acrotip-link\" href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
        escape_html(view.link()),
        view.link_label()
    ));
    if view.is_dismissible() {
        html.push_str(&format!(
            "<button class=\"acrotip-dismiss\" data-term=\"{}\">{}</button>",
            term,
            escape_html(DISMISS_LABEL)
        ));
    }
    html.push_str("</div>");
    html
}

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
