//! Template engine for rendering layouts and template pages.

use std::collections::BTreeMap;
use std::path::Path;

use folio_content::ContentItem;
use minijinja::{context, path_loader, AutoEscape, Environment, Value};
use serde::Serialize;

use crate::collections::RedirectRecord;
use crate::filters::readable_date;

/// A post as seen from listing templates (`collections.posts`).
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    /// Frontmatter title, or the slug
    pub title: String,
    /// Canonical URL
    pub url: String,
    /// Slug without date prefix
    pub slug: String,
    /// File name without extension
    pub file_slug: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub description: Option<String>,
    /// Remaining frontmatter keys
    pub data: BTreeMap<String, serde_yaml::Value>,
}

impl From<&ContentItem> for PostSummary {
    fn from(item: &ContentItem) -> Self {
        Self {
            title: item.title().to_string(),
            url: item.url(),
            slug: item.slug.clone(),
            file_slug: item.file_name.clone(),
            date: item.date.format("%Y-%m-%d").to_string(),
            description: item.frontmatter.description.clone(),
            data: item.frontmatter.extra.clone(),
        }
    }
}

/// Collections exposed to every template.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Collections {
    pub posts: Vec<PostSummary>,
    pub redirects: Vec<RedirectRecord>,
}

/// Site-wide values.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteContext {
    pub title: String,
}

/// Per-page values under `page`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageInfo {
    pub url: String,
    pub file_slug: String,
    pub slug: String,
    pub date: Option<String>,
    pub input_path: String,
}

/// Context for rendering a page.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Page title
    pub title: Option<String>,
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    /// Rendered body HTML
    pub content: String,
    pub page: PageInfo,
    /// Remaining frontmatter keys
    pub data: BTreeMap<String, serde_yaml::Value>,
}

/// Template engine using minijinja.
///
/// Layouts are loaded from disk on demand, so a fresh engine picks up edits.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create an engine that loads layouts from `layouts_dir`.
    ///
    /// Built-in `base.html` and `redirect.html` are used only when the
    /// layouts directory does not provide its own.
    pub fn new(layouts_dir: &Path) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_loader(path_loader(layouts_dir));
        // Escaping would turn every `/` in a URL into `&#x2f;`
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("readableDate", readable_date);

        for (name, source) in [
            (BASE_LAYOUT, BASE_TEMPLATE),
            (REDIRECT_LAYOUT, REDIRECT_TEMPLATE),
        ] {
            if !layouts_dir.join(name).is_file() {
                env.add_template_owned(name.to_string(), source.to_string())?;
            }
        }

        Ok(Self { env })
    }

    /// Wrap rendered content in a layout.
    pub fn render_layout(
        &self,
        layout: &str,
        context: &Context,
        site: &SiteContext,
        collections: &Collections,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(layout)?;
        tmpl.render(Self::values(context, site, collections))
    }

    /// Render a page whose body is itself a template.
    ///
    /// `name` is used in error messages.
    pub fn render_page_template(
        &self,
        name: &str,
        source: &str,
        context: &Context,
        site: &SiteContext,
        collections: &Collections,
    ) -> Result<String, minijinja::Error> {
        self.env
            .render_named_str(name, source, Self::values(context, site, collections))
    }

    /// Render the page written at a redirect's legacy URL.
    pub fn render_redirect(
        &self,
        redirect: &RedirectRecord,
        site: &SiteContext,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(REDIRECT_LAYOUT)?;
        tmpl.render(context! {
            redirect => redirect,
            site => site,
        })
    }

    fn values(context: &Context, site: &SiteContext, collections: &Collections) -> Value {
        context! {
            title => &context.title,
            description => &context.description,
            date => &context.date,
            content => Value::from_safe_string(context.content.clone()),
            page => &context.page,
            data => &context.data,
            site => site,
            collections => collections,
        }
    }
}

/// Default layout for posts.
pub const BASE_LAYOUT: &str = "base.html";

/// Layout for legacy URL redirect pages.
pub const REDIRECT_LAYOUT: &str = "redirect.html";

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% if title %}{{ title }} - {% endif %}{{ site.title }}</title>
  {% if description %}<meta name="description" content="{{ description }}">
  {% endif %}<link rel="canonical" href="{{ page.url }}">
</head>
<body>
  <header>
    <a href="/">{{ site.title }}</a>
  </header>
  <main>
    <article>
      {% if title %}<h1>{{ title }}</h1>{% endif %}
      {% if date %}<time datetime="{{ date }}">{{ date | readableDate }}</time>{% endif %}
      {{ content }}
    </article>
  </main>
</body>
</html>"##;

const REDIRECT_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Redirecting to {{ redirect.newUrl }}</title>
  <link rel="canonical" href="{{ redirect.newUrl }}">
  <meta http-equiv="refresh" content="0; url={{ redirect.newUrl }}">
  <meta name="robots" content="noindex">
</head>
<body>
  <p>This page has moved to <a href="{{ redirect.newUrl }}">{{ redirect.newUrl }}</a>.</p>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn site() -> SiteContext {
        SiteContext {
            title: "My Blog".to_string(),
        }
    }

    #[test]
    fn renders_builtin_base_layout() {
        let temp = tempdir().unwrap();
        let engine = TemplateEngine::new(temp.path()).unwrap();

        let context = Context {
            title: Some("Hello".to_string()),
            date: Some("2024-01-05".to_string()),
            content: "<p>Hello world</p>".to_string(),
            ..Default::default()
        };

        let html = engine
            .render_layout(BASE_LAYOUT, &context, &site(), &Collections::default())
            .unwrap();

        assert!(html.contains("<title>Hello - My Blog</title>"));
        assert!(html.contains("<p>Hello world</p>"));
        assert!(html.contains("January 5, 2024"));
    }

    #[test]
    fn prefers_layouts_on_disk() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("base.html"),
            "<main>{{ content }}</main>",
        )
        .unwrap();
        let engine = TemplateEngine::new(temp.path()).unwrap();

        let context = Context {
            content: "<em>hi</em>".to_string(),
            ..Default::default()
        };

        let html = engine
            .render_layout(BASE_LAYOUT, &context, &site(), &Collections::default())
            .unwrap();

        assert_eq!(html, "<main><em>hi</em></main>");
    }

    #[test]
    fn renders_redirect_page() {
        let temp = tempdir().unwrap();
        let engine = TemplateEngine::new(temp.path()).unwrap();

        let redirect = RedirectRecord {
            old_url: "/hello-world/".to_string(),
            new_url: "/writing/hello-world/".to_string(),
            slug: "hello-world".to_string(),
        };

        let html = engine.render_redirect(&redirect, &site()).unwrap();

        assert!(html.contains(r#"content="0; url=/writing/hello-world/""#));
        assert!(html.contains(r#"<link rel="canonical" href="/writing/hello-world/">"#));
    }

    #[test]
    fn page_templates_see_collections() {
        let temp = tempdir().unwrap();
        let engine = TemplateEngine::new(temp.path()).unwrap();

        let collections = Collections {
            posts: vec![PostSummary {
                title: "First".to_string(),
                url: "/writing/first/".to_string(),
                slug: "first".to_string(),
                file_slug: "2024-01-05-first".to_string(),
                date: "2024-01-05".to_string(),
                description: None,
                data: BTreeMap::new(),
            }],
            redirects: vec![],
        };

        let html = engine
            .render_page_template(
                "index.html",
                "{% for post in collections.posts %}<a href=\"{{ post.url }}\">{{ post.title }}</a> {{ post.date | readableDate }}{% endfor %}",
                &Context::default(),
                &site(),
                &collections,
            )
            .unwrap();

        assert_eq!(html, "<a href=\"/writing/first/\">First</a> January 5, 2024");
    }

    #[test]
    fn page_templates_can_extend_layouts() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("shell.html"),
            "<body>{% block main %}{% endblock %}</body>",
        )
        .unwrap();
        let engine = TemplateEngine::new(temp.path()).unwrap();

        let html = engine
            .render_page_template(
                "about.html",
                "{% extends \"shell.html\" %}{% block main %}About {{ site.title }}{% endblock %}",
                &Context::default(),
                &site(),
                &Collections::default(),
            )
            .unwrap();

        assert_eq!(html, "<body>About My Blog</body>");
    }

    #[test]
    fn missing_layout_is_an_error() {
        let temp = tempdir().unwrap();
        let engine = TemplateEngine::new(temp.path()).unwrap();

        let result = engine.render_layout(
            "nope.html",
            &Context::default(),
            &site(),
            &Collections::default(),
        );

        assert!(result.is_err());
    }
}
