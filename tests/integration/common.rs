//! Shared fixtures: a small broker directory and its profile

use dircrawl::config::{parse_config, Config};
use dircrawl::navigator::FixtureNavigator;

pub const BASE: &str = "https://dir.example";

/// Profile for the test directory; `extra` is appended verbatim
pub fn profile(start_url: &str, output: &str, extra: &str) -> Config {
    parse_config(&format!(
        r#"
        [directory]
        name = "Test Brokers"
        start-url = "{start_url}"
        manual-gate = false

        [crawler]
        flush-threshold = 5
        ready-timeout-ms = 100
        retry-backoff = {{ min-ms = 0, max-ms = 0 }}
        request-delay = {{ min-ms = 0, max-ms = 0 }}

        [listing]
        link-selectors = ["a.firm"]

        [pagination]
        numbered = false
        next-selectors = ["a.next"]

        [detail]
        ready-selector = "h1.name"

        [output]
        path = "{output}"

        [[field]]
        name = "Company"
        strategies = [{{ kind = "css", selector = "h1.name" }}]

        [[field]]
        name = "Website"
        strategies = [
            {{ kind = "css", selector = "a.website", attr = "href" }},
            {{ kind = "external-link" }},
        ]

        [[field]]
        name = "Location"
        strategies = [
            {{ kind = "css", selector = ".location" }},
            {{ kind = "pattern", regex = "Located in ([A-Za-z ]+)\\." }},
        ]

        {extra}
        "#
    ))
    .unwrap()
}

/// A listing page with entity links and an optional "Next" link
pub fn listing_page(firms: &[(&str, &str)], next: Option<&str>) -> String {
    let links: String = firms
        .iter()
        .map(|(name, href)| format!(r#"<li><a class="firm" href="{href}">{name}</a></li>"#))
        .collect();
    let next = match next {
        Some(href) => format!(r#"<a class="next" href="{href}">Next</a>"#),
        None => r#"<a class="next disabled">Next</a>"#.to_string(),
    };
    format!("<html><body><ul>{links}</ul>{next}</body></html>")
}

/// A detail page; the website is only exposed as a bare external link
pub fn detail_page(name: &str, website: &str) -> String {
    format!(
        r#"<html><body>
            <h1 class="name">{name}</h1>
            <a href="/firms">Back</a>
            <a href="{website}">Visit</a>
            <p>Located in Denver.</p>
        </body></html>"#
    )
}

pub fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

pub fn detail_url(name: &str) -> String {
    format!("{BASE}/firms/{}", slug(name))
}

/// Directory whose pages list `pages[i]` firms each, chained by "Next"
pub fn directory(pages: &[&[&str]]) -> FixtureNavigator {
    let mut nav = FixtureNavigator::new();
    for (i, firms) in pages.iter().enumerate() {
        let url = page_url(i);
        let next = (i + 1 < pages.len()).then(|| page_url(i + 1));
        let links: Vec<(&str, String)> = firms
            .iter()
            .map(|name| (*name, format!("/firms/{}", slug(name))))
            .collect();
        let links: Vec<(&str, &str)> = links.iter().map(|(n, h)| (*n, h.as_str())).collect();
        nav = nav.with_page(&url, listing_page(&links, next.as_deref()));
        for name in firms.iter() {
            nav = nav.with_page(
                &detail_url(name),
                detail_page(name, &format!("https://{}.example", slug(name))),
            );
        }
    }
    nav
}

pub fn page_url(index: usize) -> String {
    if index == 0 {
        format!("{BASE}/firms")
    } else {
        format!("{BASE}/firms?page={}", index + 1)
    }
}
