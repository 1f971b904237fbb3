use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

/// Plain text of an HTML page.
///
/// With a non-empty `classes` list only elements carrying one of those CSS
/// classes contribute, each once even when matches nest. An empty list keeps
/// the whole `<body>`.
pub fn extract_text(html: &str, classes: &[String]) -> Result<String> {
    let document = Html::parse_document(html);
    if classes.is_empty() {
        return Ok(body_text(&document));
    }

    let selector = class_selector(classes)?;
    let blocks: Vec<String> = document
        .select(&selector)
        .filter(|el| !has_matching_ancestor(el, &selector))
        .map(|el| el.text().collect::<String>())
        .collect();
    Ok(blocks.join("\n"))
}

fn class_selector(classes: &[String]) -> Result<Selector> {
    let css = classes.iter().map(|c| format!(".{}", c.trim())).collect::<Vec<_>>().join(", ");
    Selector::parse(&css).map_err(|e| anyhow!("invalid class filter {css:?}: {e}"))
}

fn has_matching_ancestor(element: &ElementRef<'_>, selector: &Selector) -> bool {
    element.ancestors().filter_map(ElementRef::wrap).any(|a| selector.matches(&a))
}

fn body_text(document: &Html) -> String {
    let body = Selector::parse("body").ok();
    match body.as_ref().and_then(|s| document.select(s).next()) {
        Some(body) => body.text().collect(),
        None => document.root_element().text().collect(),
    }
}
