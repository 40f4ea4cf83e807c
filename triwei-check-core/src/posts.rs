//! Blog post scaffolding

use std::{
    fs,
    sync::LazyLock,
};

use chrono::{
    Datelike,
    Local,
    NaiveDate,
};
use regex::Regex;
use serde::Serialize;

use crate::{
    error::{
        CheckError,
        CheckResult,
    },
    site::Site,
};

static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap_or_else(|e| panic!("slug regex: {e}")));

/// Options for a new post
#[derive(Debug, Clone, Default)]
pub struct PostRequest {
    /// Topic; picked from the configured rotation when absent
    pub topic: Option<String>,
    /// Publication date; today when absent
    pub date:  Option<NaiveDate>,
    /// Replace an existing file
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct PostFrontMatter<'a> {
    title:  &'a str,
    date:   String,
    author: &'a str,
}

/// A post written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPost {
    /// Path relative to the site root
    pub path:  String,
    /// Rendered title
    pub title: String,
}

/// Lowercase, collapse anything outside `[a-z0-9]` into `-`
pub fn slugify(value: &str) -> String {
    NON_SLUG.replace_all(&value.to_lowercase(), "-").trim_matches('-').to_string()
}

/// Uppercase the first letter of every word and lowercase the rest
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut word_start = true;
    for c in value.chars() {
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}

/// Topic for `date` from the rotation, one per day of the year
pub fn topic_for_day<'a>(topics: &'a [String], date: NaiveDate) -> Option<&'a str> {
    if topics.is_empty() {
        return None;
    }
    Some(topics[date.ordinal0() as usize % topics.len()].as_str())
}

/// Render the full Markdown document for a post
pub fn render_post(topic: &str, date: NaiveDate, author: &str) -> CheckResult<(String, String)> {
    let heading = title_case(topic);
    let title = format!("{}: {}", date.format("%B %d, %Y"), heading);
    let front_matter = PostFrontMatter {
        title: &title,
        date: date.format("%Y-%m-%d").to_string(),
        author,
    };
    let yaml = serde_yaml::to_string(&front_matter)
        .map_err(|e| CheckError::Site(format!("Failed to render front matter: {}", e)))?;

    let body = format!(
        "## {heading}\n\n\
         This article discusses recent developments and tools in the world of artificial intelligence. \
         It serves as a placeholder example to be replaced with researched content.\n\n\
         ## Summary\n\n\
         This week's highlights include ... (add summary here).\n\n\
         ## Resources\n\n\
         - [Example AI article](https://example.com)\n\
         - [Another resource](https://example.com)\n"
    );

    Ok((title, format!("---\n{}---\n\n{}", yaml, body)))
}

/// Write a new post under the configured posts directory
pub fn generate_post(site: &Site, request: &PostRequest) -> CheckResult<GeneratedPost> {
    let config = &site.config().posts;
    let date = request.date.unwrap_or_else(|| Local::now().date_naive());
    let topic = match request.topic.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(topic) => topic,
        None => topic_for_day(&config.topics, date)
            .ok_or_else(|| CheckError::Config("No post topics configured".to_string()))?,
    };

    let slug = slugify(topic);
    if slug.is_empty() {
        return Err(CheckError::Site(format!("Topic has no usable characters: {:?}", topic)));
    }

    let rel = format!("{}/{}-{}.md", config.dir, slug, date.format("%Y%m%d"));
    if site.is_file(&rel) && !request.force {
        return Err(CheckError::Site(format!("Post already exists: {} (use --force to overwrite)", rel)));
    }

    let (title, document) = render_post(topic, date, &config.author)?;
    let dir = site.abs(&config.dir);
    fs::create_dir_all(&dir).map_err(|e| CheckError::io(&dir, e))?;
    let path = site.abs(&rel);
    fs::write(&path, document).map_err(|e| CheckError::io(&path, e))?;

    Ok(GeneratedPost { path: rel, title })
}
