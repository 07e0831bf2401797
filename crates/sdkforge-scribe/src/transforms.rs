//! The named transform vocabulary shared by file templates, fragment
//! templates, and inline `((#name))` blocks. Every transform is a pure
//! `&str -> String` function; the registry is built once per engine from
//! a docs-config snapshot and installed on the template environment as
//! filters under the same names.

use std::sync::Arc;

use heck::ToTitleCase;
use indexmap::IndexMap;
use minijinja::Environment;

use sdkforge_core::config::DocsConfig;

pub type Transform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Width at which `ellipsis` cuts.
const ELLIPSIS_WIDTH: usize = 60;

pub struct TransformRegistry {
    map: IndexMap<&'static str, Transform>,
}

impl TransformRegistry {
    pub fn new(docs: &DocsConfig) -> Self {
        let mut map: IndexMap<&'static str, Transform> = IndexMap::new();
        map.insert("fluent", Arc::new(fluent));
        map.insert("anchor", Arc::new(anchor));
        map.insert("words", Arc::new(words));
        map.insert("ellipsis", Arc::new(ellipsis));
        map.insert("payload_label", Arc::new(payload_label));
        map.insert("comment", Arc::new(comment));
        map.insert("strip_refs", Arc::new(strip_refs));

        let host = docs.host.clone();
        map.insert(
            "crossref",
            Arc::new(move |text: &str| crossref(text, &host)),
        );
        let host = docs.host.clone();
        map.insert(
            "markdown",
            Arc::new(move |text: &str| markdown(text, &host)),
        );
        let docs = docs.clone();
        map.insert(
            "host_url",
            Arc::new(move |text: &str| host_url(text, &docs)),
        );

        Self { map }
    }

    pub fn get(&self, name: &str) -> Option<&Transform> {
        self.map.get(name)
    }

    /// Register every transform as a template filter of the same name.
    pub fn install(&self, env: &mut Environment<'static>) {
        for (name, transform) in &self.map {
            let transform = Arc::clone(transform);
            env.add_filter(*name, move |value: String| -> String { transform(&value) });
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.map.keys().copied()
    }
}

/// Render a dotted path as a fluent accessor chain: `a.b.c` -> `a()->b()->c()`.
fn fluent(path: &str) -> String {
    path.split('.')
        .filter(|s| !s.is_empty())
        .map(|s| format!("{s}()"))
        .collect::<Vec<_>>()
        .join("->")
}

/// URL-anchor-safe slug: lowercase, alphanumerics kept, everything else
/// collapsed to single dashes.
fn anchor(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            prev_dash = false;
        } else if !prev_dash && !out.is_empty() {
            out.push('-');
            prev_dash = true;
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Split camel-case words: `FooBarBaz` -> `Foo Bar Baz`.
fn words(name: &str) -> String {
    name.to_title_case()
}

/// Truncate overlong text with a trailing ellipsis.
fn ellipsis(text: &str) -> String {
    if text.chars().count() <= ELLIPSIS_WIDTH {
        return text.to_string();
    }
    let cut: String = text.chars().take(ELLIPSIS_WIDTH - 1).collect();
    format!("{cut}…")
}

/// Label for a model name: request payload models carry a `Payload` prefix.
fn payload_label(name: &str) -> String {
    if name.starts_with("Payload") {
        "payload".to_string()
    } else {
        "model".to_string()
    }
}

/// Prefix every line with a line comment marker.
fn comment(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                "//".to_string()
            } else {
                format!("// {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrite `>> Name <<` cross-reference markers into links against the
/// hosted API docs anchor scheme.
fn crossref(text: &str, host: &str) -> String {
    rewrite_markers(text, |name| {
        format!("[{name}]({host}/api#{})", anchor(name))
    })
}

/// Rewrite `>> Name <<` markers to the bare name.
fn strip_refs(text: &str) -> String {
    rewrite_markers(text, str::to_string)
}

fn rewrite_markers(text: &str, replace: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(">> ") {
        let Some(len) = rest[start + 3..].find(" <<") else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&replace(rest[start + 3..start + 3 + len].trim()));
        rest = &rest[start + 3 + len + 3..];
    }
    out.push_str(rest);
    out
}

/// HTML to Markdown cleanup. `<table>` and `<pre>` blocks pass through
/// verbatim, `<br>` variants become newlines, other tags are dropped, and
/// cross-reference markers become links.
fn markdown(text: &str, host: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut preserve: Option<&str> = None;
    for line in text.lines() {
        let trimmed = line.trim_start();
        if preserve.is_none() {
            if trimmed.starts_with("<table") {
                preserve = Some("</table>");
            } else if trimmed.starts_with("<pre") {
                preserve = Some("</pre>");
            }
        }
        if let Some(closer) = preserve {
            out.push_str(line);
            out.push('\n');
            if line.contains(closer) {
                preserve = None;
            }
            continue;
        }
        let line = line
            .replace("<br>", "\n")
            .replace("<br/>", "\n")
            .replace("<br />", "\n");
        out.push_str(&crossref(&strip_tags(&line), host));
        out.push('\n');
    }
    out
}

fn strip_tags(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

/// Swap the production docs host for the local-dev host unless the
/// production flag is set.
fn host_url(text: &str, docs: &DocsConfig) -> String {
    if docs.production {
        text.to_string()
    } else {
        text.replace(&docs.host, &docs.dev_host)
    }
}
