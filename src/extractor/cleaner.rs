//! Removes regions of a parsed page that never hold the main content.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static STRUCTURAL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "script, style, noscript, template, iframe, svg, nav, header, footer, aside, \
         [role='navigation'], [role='banner'], [role='contentinfo'], [role='complementary'], \
         [aria-hidden='true']",
    )
    .unwrap()
});

static ALL_ELEMENTS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("*").unwrap());

/// Words that mark a class or id as advertising, sidebar, menu, cookie or popup chrome.
const NOISE_TOKENS: &[&str] = &[
    "ad",
    "ads",
    "adsense",
    "advert",
    "advertising",
    "advertisement",
    "sponsored",
    "sidebar",
    "menu",
    "navbar",
    "cookie",
    "cookies",
    "consent",
    "gdpr",
    "popup",
    "modal",
    "overlay",
];

/// Detaches boilerplate regions from `document` in place.
pub fn prune(document: &mut Html) {
    let mut doomed: Vec<_> = document
        .select(&STRUCTURAL_SELECTOR)
        .map(|element| element.id())
        .collect();

    doomed.extend(
        document
            .select(&ALL_ELEMENTS)
            .filter(|element| is_noise(element))
            .map(|element| element.id()),
    );

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn is_noise(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    if matches!(value.name(), "html" | "body" | "main" | "article") {
        return false;
    }

    let class_hit = value.classes().any(has_noise_token);
    let id_hit = value.id().is_some_and(has_noise_token);
    class_hit || id_hit
}

// "cookie-banner" and "ad_slot" match, "header" and "download" do not.
fn has_noise_token(name: &str) -> bool {
    name.split(['-', '_'])
        .any(|part| NOISE_TOKENS.contains(&part.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pruned_text(markup: &str) -> String {
        let mut document = Html::parse_document(markup);
        prune(&mut document);
        document.root_element().text().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_removes_structural_regions() {
        let text = pruned_text(
            r#"<html><head><style>p{}</style></head><body>
            <header>Site header</header><nav>Home About</nav>
            <p>Keep me</p><script>var x = 1;</script>
            <aside>Related links</aside><footer>Footer links</footer></body></html>"#,
        );
        assert!(text.contains("Keep me"));
        for gone in ["Site header", "Home About", "var x", "Related links", "Footer links", "p{}"] {
            assert!(!text.contains(gone), "{gone} should be pruned");
        }
    }

    #[test]
    fn test_removes_noise_by_class_and_id() {
        let text = pruned_text(
            r#"<body>
            <div class="cookie-banner">We use cookies</div>
            <div id="sidebar_right">Popular posts</div>
            <div class="ad-slot top">Buy now</div>
            <div class="main-menu">Menu items</div>
            <div class="newsletter-popup">Join</div>
            <div class="download-header shadow">Kept text</div>
            </body>"#,
        );
        assert!(text.contains("Kept text"));
        for gone in ["We use cookies", "Popular posts", "Buy now", "Menu items", "Join"] {
            assert!(!text.contains(gone), "{gone} should be pruned");
        }
    }

    #[test]
    fn test_never_removes_body() {
        let text = pruned_text(r#"<body class="has-sidebar"><p>Body text</p></body>"#);
        assert!(text.contains("Body text"));
    }
}
