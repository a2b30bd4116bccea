//! Scaffold a new blog.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Files written by `folio init`, relative to the project root.
const SCAFFOLD: &[(&str, &str)] = &[
    ("folio.toml", DEFAULT_CONFIG),
    ("_posts/_posts.toml", DEFAULT_POSTS_DATA),
    ("_posts/2024-01-05-hello-world.md", DEFAULT_POST),
    ("_layouts/base.html", DEFAULT_LAYOUT),
    ("index.html", DEFAULT_INDEX),
    (".nojekyll", ""),
];

/// Run the init command.
pub async fn run(root: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing folio...");

    let posts_dir = root.join("_posts");

    // Check if posts already exist
    if posts_dir.exists() && !yes {
        tracing::warn!("_posts/ directory already exists. Use --yes to overwrite.");
        return Ok(());
    }

    for (relative, content) in SCAFFOLD {
        let path = root.join(relative);

        if path.exists() && !yes {
            tracing::info!("Keeping existing {}", relative);
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write {}", relative))?;
        tracing::info!("Created {}", relative);
    }

    fs::create_dir_all(root.join("img")).context("Failed to create img directory")?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'folio dev' to start the development server.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Folio Configuration

[site]
# Source directory
input = "."

# Output directory for the built site
output = "_site"

# Layouts directory, relative to input
layouts = "_layouts"

# Site title
title = "Writing"

# Copied verbatim into the output
passthrough = ["img", "CNAME", "keybase.txt", "favicon.svg", ".nojekyll"]

[posts]
# Posts directory, relative to input
dir = "_posts"

# Canonical URL of each post
permalink = "/writing/{slug}/"

# Old URLs that redirect to the canonical one
redirect_from = "/{slug}/"
redirects = true
"#;

const DEFAULT_POSTS_DATA: &str = r#"# Defaults for every post in this directory
layout = "base.html"
permalink = "/writing/{slug}/"
"#;

const DEFAULT_POST: &str = r#"---
title: Hello World
description: The first post.
---

Welcome to your new blog. This post lives at `/writing/hello-world/`;
the old address `/hello-world/` redirects here.

Posts are markdown files named `YYYY-MM-DD-slug.md` in `_posts/`.
"#;

const DEFAULT_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% if title %}{{ title }} - {% endif %}{{ site.title }}</title>
</head>
<body>
  <header><a href="/">{{ site.title }}</a></header>
  <main>
    {% if date %}<h1>{{ title }}</h1>
    <time datetime="{{ date }}">{{ date | readableDate }}</time>{% endif %}
    {{ content }}
  </main>
</body>
</html>
"#;

const DEFAULT_INDEX: &str = r#"---
title: Writing
layout: base.html
---
<ul class="posts">
{% for post in collections.posts %}
  <li>
    <a href="{{ post.url }}">{{ post.title }}</a>
    <time datetime="{{ post.date }}">{{ post.date | readableDate }}</time>
  </li>
{% endfor %}
</ul>
"#;
