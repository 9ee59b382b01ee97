//! Lyrics extraction from provider web pages
//!
//! The provider's markup is not a stable contract, so extraction is an ordered
//! list of independent strategies. The first strategy that yields non-empty
//! text wins; new page layouts are supported by adding a strategy.

use scraper::{ElementRef, Html, Node, Selector};

/// Selectors tried in order, most specific first
pub const DEFAULT_SELECTORS: &[(&str, &str)] = &[
    ("data-lyrics-container", r#"[data-lyrics-container="true"]"#),
    ("lyrics-container-class", r#"div[class^="Lyrics__Container"]"#),
    ("legacy-lyrics-class", ".lyrics"),
    ("generic-lyrics-class", r#"[class*="lyrics"]"#),
];

/// Phrases the provider renders in place of real lyrics
pub const DEFAULT_PLACEHOLDER_PHRASES: &[&str] = &[
    "Coming soon",
    "No lyrics found",
    "Lyrics for this song have yet to be released",
];

/// A single way of locating lyrics in a parsed page
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Lyrics text found by this strategy, or `None` if it matched nothing
    /// with text in it
    fn extract(&self, document: &Html) -> Option<String>;
}

/// Collects the text of every element matching a CSS selector
pub struct CssStrategy {
    name: String,
    selector: Selector,
}

impl CssStrategy {
    pub fn new(name: impl Into<String>, css: &str) -> Result<Self, String> {
        let selector =
            Selector::parse(css).map_err(|e| format!("Invalid CSS selector '{}': {:?}", css, e))?;
        Ok(Self {
            name: name.into(),
            selector,
        })
    }
}

impl ExtractionStrategy for CssStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, document: &Html) -> Option<String> {
        let blocks: Vec<String> = document
            .select(&self.selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect();

        if blocks.is_empty() {
            return None;
        }

        tracing::debug!(
            "Found {} lyrics containers with strategy: {}",
            blocks.len(),
            self.name
        );
        Some(blocks.join("\n"))
    }
}

/// Text of one container with `<br>` and block boundaries turned into line breaks
fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(element, &mut raw);

    raw.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Elements whose content renders on its own line
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "section", "h1", "h2", "h3", "h4", "h5", "h6",
];

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            // source indentation between block elements
            Node::Text(text) if text.trim().is_empty() && text.contains('\n') => {}
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            // page chrome (contributor counts, headers) embedded in the container
            Node::Element(el) if el.attr("data-exclude-from-selection") == Some("true") => {}
            Node::Element(el) => {
                let block = BLOCK_ELEMENTS.contains(&el.name());
                if block {
                    end_line(out);
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    push_text(child_ref, out);
                }
                if block {
                    end_line(out);
                }
            }
            _ => {}
        }
    }
}

/// Start a new line unless the current one is still blank
fn end_line(out: &mut String) {
    let line_start = out.rfind('\n').map_or(0, |i| i + 1);
    if out[line_start..].trim().is_empty() {
        out.truncate(line_start);
    } else {
        out.push('\n');
    }
}

/// Lyrics text plus the strategy that found it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub strategy: String,
}

/// Ordered set of extraction strategies
pub struct Extractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Extractor {
    /// Create an extractor with no strategies
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Add a strategy after the existing ones (builder pattern)
    pub fn with_strategy(mut self, strategy: Box<dyn ExtractionStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the strategies in order against `html`, stopping at the first hit
    pub fn extract(&self, html: &str) -> Option<Extraction> {
        let document = Html::parse_document(html);

        for strategy in &self.strategies {
            if let Some(text) = strategy.extract(&document) {
                return Some(Extraction {
                    text,
                    strategy: strategy.name().to_string(),
                });
            }
        }

        tracing::debug!("No lyrics found with any strategy");
        None
    }
}

impl Default for Extractor {
    fn default() -> Self {
        DEFAULT_SELECTORS
            .iter()
            .fold(Self::empty(), |extractor, (name, css)| {
                match CssStrategy::new(*name, css) {
                    Ok(strategy) => extractor.with_strategy(Box::new(strategy)),
                    Err(e) => {
                        tracing::error!("Skipping lyrics strategy {}: {}", name, e);
                        extractor
                    }
                }
            })
    }
}

/// Recognises placeholder copy that stands in for missing lyrics
#[derive(Debug, Clone, Default)]
pub struct PlaceholderFilter {
    phrases: Vec<String>,
}

impl PlaceholderFilter {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// True when `text` starts with one of the configured phrases (ignoring case)
    pub fn is_placeholder(&self, text: &str) -> bool {
        let text = text.trim_start().to_lowercase();
        self.phrases.iter().any(|p| text.starts_with(p.as_str()))
    }
}
