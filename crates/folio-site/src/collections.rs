//! The `posts` and `redirects` collections.

use std::collections::BTreeMap;
use std::path::PathBuf;

use folio_content::{ContentItem, Permalink};
use serde::Serialize;

use crate::config::{DEFAULT_POST_PERMALINK, DEFAULT_REDIRECT_FROM};

/// A legacy URL that should send readers to a post's canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectRecord {
    /// Legacy URL, e.g. `/hello-world/`
    pub old_url: String,
    /// Canonical URL, e.g. `/writing/hello-world/`
    pub new_url: String,
    /// The post's slug
    pub slug: String,
}

/// Posts for listing pages: most recent first.
///
/// `items` must be in natural (ascending) order, as returned by the loader.
pub fn posts(items: &[ContentItem]) -> Vec<&ContentItem> {
    items.iter().rev().collect()
}

/// One redirect per item from `/<slug>/` to `/writing/<slug>/`.
pub fn build_redirects(items: &[ContentItem]) -> Vec<RedirectRecord> {
    build_redirects_from(
        items,
        &Permalink::new(DEFAULT_REDIRECT_FROM),
        &Permalink::new(DEFAULT_POST_PERMALINK),
    )
}

/// One redirect per item from `from` to `to`, both rendered with the slug.
///
/// Both URLs depend on the slug alone; a post's own `permalink` override
/// does not move its redirect target. Order follows `items`. Duplicate
/// slugs produce duplicate records.
pub fn build_redirects_from(
    items: &[ContentItem],
    from: &Permalink,
    to: &Permalink,
) -> Vec<RedirectRecord> {
    items
        .iter()
        .map(|item| RedirectRecord {
            old_url: from.render(&item.slug),
            new_url: to.render(&item.slug),
            slug: item.slug.clone(),
        })
        .collect()
}

/// Two or more posts that share a slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCollision {
    pub slug: String,
    pub sources: Vec<PathBuf>,
}

/// Find every slug used by more than one item.
pub fn slug_collisions(items: &[ContentItem]) -> Vec<SlugCollision> {
    let mut by_slug: BTreeMap<&str, Vec<PathBuf>> = BTreeMap::new();

    for item in items {
        by_slug
            .entry(item.slug.as_str())
            .or_default()
            .push(item.source_path.clone());
    }

    by_slug
        .into_iter()
        .filter(|(_, sources)| sources.len() > 1)
        .map(|(slug, sources)| SlugCollision {
            slug: slug.to_string(),
            sources,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::Path;

    use folio_content::DirectoryData;
    use pretty_assertions::assert_eq;

    fn item(name: &str) -> ContentItem {
        item_with(name, "")
    }

    fn item_with(name: &str, source: &str) -> ContentItem {
        ContentItem::from_source(
            Path::new(&format!("_posts/{}.md", name)),
            source,
            &DirectoryData::default(),
            &Permalink::new("/writing/{slug}/"),
        )
        .unwrap()
    }

    #[test]
    fn builds_redirect_for_dated_post() {
        let redirects = build_redirects(&[item("2024-01-05-hello-world")]);

        assert_eq!(
            redirects,
            vec![RedirectRecord {
                old_url: "/hello-world/".to_string(),
                new_url: "/writing/hello-world/".to_string(),
                slug: "hello-world".to_string(),
            }]
        );
    }

    #[test]
    fn keeps_natural_order() {
        let items = vec![
            item("2023-01-01-a"),
            item("2023-06-01-b"),
            item("about"),
        ];

        let slugs: Vec<_> = build_redirects(&items)
            .into_iter()
            .map(|r| r.slug)
            .collect();

        assert_eq!(slugs, vec!["a", "b", "about"]);
    }

    #[test]
    fn distinct_slugs_give_distinct_urls() {
        let items: Vec<_> = ["2023-01-01-a", "2023-01-02-b", "2023-01-03-c", "d"]
            .into_iter()
            .map(item)
            .collect();

        let redirects = build_redirects(&items);
        let old: HashSet<_> = redirects.iter().map(|r| &r.old_url).collect();
        let new: HashSet<_> = redirects.iter().map(|r| &r.new_url).collect();

        assert_eq!(redirects.len(), items.len());
        assert_eq!(old.len(), items.len());
        assert_eq!(new.len(), items.len());
    }

    #[test]
    fn duplicate_slugs_are_not_deduplicated() {
        let items = vec![item("2023-01-01-same"), item("2024-01-01-same")];

        let redirects = build_redirects(&items);

        assert_eq!(redirects.len(), 2);
        assert_eq!(redirects[0], redirects[1]);
    }

    #[test]
    fn reports_slug_collisions() {
        let items = vec![
            item("2023-01-01-same"),
            item("2023-02-01-other"),
            item("2024-01-01-same"),
        ];

        let collisions = slug_collisions(&items);

        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].slug, "same");
        assert_eq!(collisions[0].sources.len(), 2);
    }

    #[test]
    fn custom_redirect_pattern() {
        let redirects = build_redirects_from(
            &[item("2024-01-05-x")],
            &Permalink::new("/blog/{slug}.html"),
            &Permalink::new("/essays/{slug}/"),
        );

        assert_eq!(redirects[0].old_url, "/blog/x.html");
        assert_eq!(redirects[0].new_url, "/essays/x/");
    }

    #[test]
    fn frontmatter_permalink_does_not_move_redirect_target() {
        let moved = item_with("2024-01-05-x", "---\npermalink: /notes/{slug}/\n---\n");
        assert_eq!(moved.url(), "/notes/x/");

        let redirects = build_redirects(&[moved]);

        assert_eq!(redirects[0].old_url, "/x/");
        assert_eq!(redirects[0].new_url, "/writing/x/");
    }

    #[test]
    fn posts_are_most_recent_first() {
        let items = vec![item("2023-01-01-old"), item("2024-01-01-new")];

        let listed: Vec<_> = posts(&items).iter().map(|p| p.slug.as_str()).collect();

        assert_eq!(listed, vec!["new", "old"]);
    }

    #[test]
    fn serializes_camel_case_for_templates() {
        let record = &build_redirects(&[item("2024-01-05-hi")])[0];

        let value = serde_yaml::to_value(record).unwrap();

        assert_eq!(value["oldUrl"].as_str(), Some("/hi/"));
        assert_eq!(value["newUrl"].as_str(), Some("/writing/hi/"));
    }
}
