//! Subcommand handlers for acrotip.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use acrotip_detector::{DismissalStore, Document};
use acrotip_protocols::{normalize_term, PageContext, Request, Response};
use acrotip_runtime::{highlighter_for, HeadlessSurface, PageDeps, PageSession};
use acrotip_tooltip::{TooltipLinks, TooltipView, EXTENSION_ERROR_MESSAGE, NOT_FOUND_MESSAGE};

use crate::app::App;
use crate::cli::{CacheAction, KeyAction, SiteAction};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Page label used for lookups typed on the command line.
const CLI_PAGE_SOURCE: &str = "Command line";

#[derive(Serialize)]
struct ScanRow {
    term: String,
    occurrences: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    definition: Option<TooltipView>,
}

/// Detect acronyms in a page file.
pub(crate) async fn scan(app: &App, file: &Path, define: bool, format: &str) -> CommandResult {
    let content = std::fs::read_to_string(file)?;
    let is_json = file
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let document = if is_json {
        Document::from_json(&content)?
    } else {
        Document::from_plain_text(&content)
    };

    let mut session = PageSession::new(PageDeps {
        highlighter: highlighter_for(app.config.detector.highlight),
        config: app.config.clone(),
        document,
        dismissals: DismissalStore::new(app.sync.clone()),
        preferences: app.preferences.clone(),
        sender: app.sender.clone(),
        surface: Box::new(HeadlessSurface::default()),
    })?;
    if !session.init().await {
        println!("Detection is disabled on {}.", session.document().hostname());
        return Ok(());
    }

    let snapshot = session.snapshot();
    let links = TooltipLinks::new(&app.config.primary.base_url)?;
    let mut rows = Vec::with_capacity(snapshot.terms.len());
    for term in &snapshot.terms {
        let occurrences = snapshot.candidates.iter().filter(|c| &c.term == term).count();
        let definition = if define {
            let context = session.lookup_context(term);
            Some(resolve(app, term, Some(context), &links).await)
        } else {
            None
        };
        rows.push(ScanRow {
            term: term.clone(),
            occurrences,
            definition,
        });
    }
    info!("Scanned {}: {} distinct acronyms", file.display(), rows.len());

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No acronyms found.");
        return Ok(());
    }
    println!("{:<10} {:<6} {}", "TERM", "COUNT", "DEFINITION");
    println!("{}", "-".repeat(60));
    for row in rows {
        let summary = row.definition.as_ref().map(summary_line).unwrap_or_default();
        println!("{:<10} {:<6} {}", row.term, row.occurrences, summary);
    }
    Ok(())
}

/// Look up a single term and print the tooltip content.
pub(crate) async fn lookup(app: &App, term: &str, context: Option<String>) -> CommandResult {
    let links = TooltipLinks::new(&app.config.primary.base_url)?;
    let context = context.map(|text| PageContext::new(text, CLI_PAGE_SOURCE));
    let view = resolve(app, term, context, &links).await;
    print_view(&view);
    Ok(())
}

async fn resolve(
    app: &App,
    term: &str,
    context: Option<PageContext>,
    links: &TooltipLinks,
) -> TooltipView {
    let request = match context {
        Some(context) => Request::ResolveLookup {
            term: term.to_string(),
            context,
        },
        None => Request::ManualLookup {
            term: term.to_string(),
        },
    };
    match app.sender.request(request).await {
        Ok(Response::Lookup { result }) => {
            TooltipView::from_result(&result, links, app.config.tooltip.max_other_definitions)
        }
        Ok(other) => {
            warn!("Unexpected reply to lookup: {:?}", other);
            TooltipView::extension_error(term, links)
        }
        Err(e) => {
            warn!("Lookup for {} failed: {}", term, e);
            TooltipView::extension_error(term, links)
        }
    }
}

fn summary_line(view: &TooltipView) -> String {
    match view {
        TooltipView::Definition { badge, text, .. } => format!("{} [{}]", text, badge.label()),
        TooltipView::NotFound { .. } => NOT_FOUND_MESSAGE.to_string(),
        TooltipView::ExtensionError { .. } => EXTENSION_ERROR_MESSAGE.to_string(),
        TooltipView::Loading { .. } => String::new(),
    }
}

fn print_view(view: &TooltipView) {
    match view {
        TooltipView::Definition {
            term,
            badge,
            text,
            upvotes,
            others,
            ..
        } => {
            println!("{} ({})", term, badge.label());
            println!("  {}", text);
            if let Some(votes) = upvotes {
                println!("  +{}", votes);
            }
            if !others.is_empty() {
                println!("  Other definitions:");
                for other in others {
                    println!("    - {}", other);
                }
            }
        }
        TooltipView::NotFound { term, .. } => println!("{}: {}", term, NOT_FOUND_MESSAGE),
        TooltipView::ExtensionError { term, .. } => {
            println!("{}: {}", term, EXTENSION_ERROR_MESSAGE)
        }
        TooltipView::Loading { .. } => {}
    }
    println!("{}: {}", view.link_label(), view.link());
}

/// Add a term to the dismissed list.
pub(crate) async fn dismiss(app: &App, term: &str) -> CommandResult {
    let mut store = DismissalStore::new(app.sync.clone());
    store.load().await;
    let term = normalize_term(term);
    if store.dismiss(&term).await {
        println!("{} will no longer be highlighted.", term);
    } else {
        println!("{} was already dismissed.", term);
    }
    Ok(())
}

/// Remove a term from the dismissed list.
pub(crate) async fn enable(app: &App, term: &str) -> CommandResult {
    let mut store = DismissalStore::new(app.sync.clone());
    store.load().await;
    let term = normalize_term(term);
    if store.re_enable(&term).await {
        println!("{} will be highlighted again.", term);
    } else {
        println!("{} was not dismissed.", term);
    }
    Ok(())
}

pub(crate) async fn dismissed(app: &App) -> CommandResult {
    let mut store = DismissalStore::new(app.sync.clone());
    store.load().await;
    let terms = store.sorted_terms();
    if terms.is_empty() {
        println!("No dismissed terms.");
    }
    for term in terms {
        println!("{}", term);
    }
    Ok(())
}

pub(crate) async fn site(app: &App, action: SiteAction) -> CommandResult {
    match action {
        SiteAction::Enable { host } => {
            app.preferences.set_site_enabled(&host, true).await?;
            println!("Enabled on {}.", host);
        }
        SiteAction::Disable { host } => {
            app.preferences.set_site_enabled(&host, false).await?;
            println!("Disabled on {}.", host);
        }
        SiteAction::List => {
            let sites = app.preferences.disabled_sites().await;
            if sites.is_empty() {
                println!("Enabled on every site.");
            }
            for site in sites {
                println!("{}", site);
            }
        }
    }
    Ok(())
}

pub(crate) async fn key(app: &App, action: KeyAction) -> CommandResult {
    match action {
        KeyAction::Set { key } => {
            app.preferences.set_credential(Some(&key)).await?;
            println!("AI key saved.");
        }
        KeyAction::Clear => {
            app.preferences.set_credential(None).await?;
            println!("AI key removed.");
        }
    }
    Ok(())
}

pub(crate) async fn delay(app: &App, ms: Option<u64>) -> CommandResult {
    match ms {
        Some(ms) => {
            app.preferences.set_tooltip_delay(ms).await?;
            println!("Tooltip delay set to {} ms.", ms);
        }
        None => {
            let current = app
                .preferences
                .tooltip_delay()
                .await
                .unwrap_or(app.config.tooltip.show_delay_ms);
            println!("{} ms", current);
        }
    }
    Ok(())
}

pub(crate) async fn cache(app: &App, action: CacheAction) -> CommandResult {
    match action {
        CacheAction::Clear => {
            app.sender.request(Request::ClearCache).await?;
            println!("Cache cleared.");
        }
    }
    Ok(())
}

pub(crate) async fn recent(app: &App) -> CommandResult {
    match app.sender.request(Request::RecentLookups).await? {
        Response::Recent { terms } if !terms.is_empty() => {
            for term in terms {
                println!("{}", term);
            }
        }
        _ => println!("No recent lookups."),
    }
    Ok(())
}
