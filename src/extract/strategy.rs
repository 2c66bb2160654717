use crate::navigator::Page;
use crate::ConfigError;
use regex::{Regex, RegexBuilder};
use scraper::Selector;
use serde::Deserialize;

/// One way of finding a field's value, as declared in a profile
///
/// ```toml
/// strategies = [
///     { kind = "css", selector = "form > div:nth-of-type(3) > p > a", attr = "href" },
///     { kind = "external-link", exclude-host = "businessbroker.net" },
///     { kind = "page-url" },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Strategy {
    /// Text, or an attribute, of the first element matching a CSS selector
    Css {
        selector: String,
        #[serde(default)]
        attr: Option<String>,
    },

    /// First absolute link leaving the directory's own site
    ExternalLink {
        #[serde(default, rename = "exclude-host")]
        exclude_host: Option<String>,
    },

    /// First capture group of a case-insensitive pattern over the page source
    ///
    /// Unrelated page text can match; profiles list this last.
    Pattern { regex: String },

    /// The address of the page itself
    PageUrl,

    /// A fixed default value
    Constant { value: String },
}

impl Strategy {
    pub fn compile(&self) -> Result<CompiledStrategy, ConfigError> {
        Ok(match self {
            Self::Css { selector, attr } => CompiledStrategy::Css {
                selector: Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
                    selector: selector.clone(),
                    message: format!("{:?}", e),
                })?,
                attr: attr.clone(),
            },
            Self::ExternalLink { exclude_host } => CompiledStrategy::ExternalLink {
                anchors: Selector::parse("a[href]").map_err(|e| ConfigError::InvalidSelector {
                    selector: "a[href]".to_string(),
                    message: format!("{:?}", e),
                })?,
                exclude_host: exclude_host.as_ref().map(|h| h.trim().to_lowercase()),
            },
            Self::Pattern { regex } => CompiledStrategy::Pattern(
                RegexBuilder::new(regex)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ConfigError::InvalidPattern {
                        pattern: regex.clone(),
                        message: e.to_string(),
                    })?,
            ),
            Self::PageUrl => CompiledStrategy::PageUrl,
            Self::Constant { value } => CompiledStrategy::Constant(value.clone()),
        })
    }
}

/// A strategy ready to run against a page
#[derive(Debug, Clone)]
pub enum CompiledStrategy {
    Css {
        selector: Selector,
        attr: Option<String>,
    },
    ExternalLink {
        anchors: Selector,
        exclude_host: Option<String>,
    },
    Pattern(Regex),
    PageUrl,
    Constant(String),
}

impl CompiledStrategy {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Css { .. } => "css",
            Self::ExternalLink { .. } => "external-link",
            Self::Pattern(_) => "pattern",
            Self::PageUrl => "page-url",
            Self::Constant(_) => "constant",
        }
    }

    /// Runs the strategy; `None` means "no value"
    pub fn apply(&self, page: &Page) -> Option<String> {
        match self {
            Self::Css { selector, attr } => {
                let element = page.first(selector)?;
                match attr.as_deref() {
                    None => Some(element.text().to_string()),
                    Some(name @ ("href" | "src")) => {
                        let raw = element.attr(name)?;
                        page.resolve(raw).or_else(|| Some(raw.to_string()))
                    }
                    Some(name) => element.attr(name).map(str::to_string),
                }
            }
            Self::ExternalLink {
                anchors,
                exclude_host,
            } => {
                let own_host = page
                    .url()
                    .and_then(|u| u.host_str())
                    .map(str::to_lowercase);
                page.all(anchors).into_iter().find_map(|el| {
                    let href = page.resolve(el.href()?)?;
                    let host = url::Url::parse(&href).ok()?.host_str()?.to_lowercase();
                    let is_own = own_host.as_deref().is_some_and(|own| same_site(&host, own));
                    let is_excluded = exclude_host
                        .as_deref()
                        .is_some_and(|excluded| same_site(&host, excluded));
                    (!is_own && !is_excluded).then_some(href)
                })
            }
            Self::Pattern(regex) => {
                let captures = regex.captures(page.raw_html())?;
                captures
                    .get(1)
                    .or_else(|| captures.get(0))
                    .map(|m| m.as_str().to_string())
            }
            Self::PageUrl => page.url().map(|u| u.to_string()),
            Self::Constant(value) => Some(value.clone()),
        }
    }
}

/// True if `host` is `site` or one of its subdomains
fn same_site(host: &str, site: &str) -> bool {
    let host = host.trim_start_matches("www.");
    let site = site.trim_start_matches("www.");
    host == site || host.ends_with(&format!(".{}", site))
}
