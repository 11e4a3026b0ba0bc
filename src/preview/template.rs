use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::Result;
use crate::preview::sanitize::SafeText;
use crate::storage::{BackendLocal, StorageManager};

pub const TEMPLATE_PREFIX: &str = "linktools_linkpreview_";
pub const DEFAULT_TEMPLATE_NAME: &str = "linktools_linkpreview_default";
const TEMPLATE_FILE_EXT: &str = ".html";

/// Body of the shared template used by helpers that bring none of their own.
pub const DEFAULT_TEMPLATE: &str = r#"<div class="lkt-link-preview" style="margin-top: 7px;"><a href="{$url}" class="lkt-link-preview-title">{$title}</a><div class="lkt-link-preview-description">{$description}</div></div>"#;

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\$([A-Za-z_][A-Za-z0-9_]*)\}").expect("Failed to compile placeholder regex")
});

/// Name of the template owned by the helper with the given key.
pub fn template_name_for(helper_key: &str) -> String {
    format!("{TEMPLATE_PREFIX}{}", helper_key.to_lowercase())
}

/// Where template bodies come from. Hosts implement this to serve
/// administrator-customized templates.
pub trait TemplateSource: Send + Sync {
    /// Current body of the template called `name`, if there is one.
    fn get(&self, name: &str) -> Option<String>;
}

/// Values for a template's `{$name}` placeholders.
#[derive(Debug, Default, Clone)]
pub struct TemplateVars {
    vars: HashMap<&'static str, SafeText>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &'static str, value: impl Into<SafeText>) -> Self {
        self.vars.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&SafeText> {
        self.vars.get(name)
    }
}

/// Fills `{$name}` placeholders in `body`. Placeholders without a value
/// render as nothing.
pub fn render(body: &str, vars: &TemplateVars) -> String {
    PLACEHOLDER_REGEX
        .replace_all(body, |caps: &Captures| {
            vars.get(&caps[1])
                .map(|value| value.as_str().to_string())
                .unwrap_or_default()
        })
        .into_owned()
}

/// In-memory template store, layered: built-in bodies first, then files from
/// a template directory, then explicit overrides.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: BTreeMap<String, String>,
}

impl TemplateSet {
    /// A set holding only the shared default template.
    pub fn new() -> Self {
        let mut set = Self::default();
        set.insert(DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE);
        set
    }

    pub fn insert(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.templates.insert(name.into(), body.into());
    }

    pub fn with(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(name, body);
        self
    }

    /// Loads every `<name>.html` file in `dir`, replacing templates of the
    /// same name.
    pub fn load_dir(&mut self, dir: &str) -> Result<usize> {
        let store = BackendLocal::open(dir)?;
        let mut loaded = 0;

        for file in store.list() {
            let Some(name) = file.strip_suffix(TEMPLATE_FILE_EXT) else {
                continue;
            };
            let body = String::from_utf8_lossy(&store.read(&file)?).into_owned();
            log::debug!("template {name} loaded from {dir}");
            self.insert(name, body);
            loaded += 1;
        }

        Ok(loaded)
    }
}

impl TemplateSource for TemplateSet {
    fn get(&self, name: &str) -> Option<String> {
        self.templates.get(name).cloned()
    }
}

/// A resolved template, ready to be filled.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub body: String,
}

impl Template {
    pub fn render(&self, vars: &TemplateVars) -> String {
        render(&self.body, vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::sanitize::sanitize;

    #[test]
    fn test_template_name_for() {
        assert_eq!(template_name_for("YouTubeVideo"), "linktools_linkpreview_youtubevideo");
    }

    #[test]
    fn test_render_fills_placeholders() {
        let vars = TemplateVars::new()
            .set("youtube_id", sanitize("dQw4w9WgXcQ"))
            .set("start", 42u64);

        assert_eq!(
            render("embed/{$youtube_id}?start={$start}", &vars),
            "embed/dQw4w9WgXcQ?start=42"
        );
    }

    #[test]
    fn test_render_unknown_placeholder_is_empty() {
        let vars = TemplateVars::new().set("a", sanitize("x"));
        assert_eq!(render("[{$a}][{$b}]", &vars), "[x][]");
    }

    #[test]
    fn test_render_leaves_other_braces() {
        let vars = TemplateVars::new();
        assert_eq!(render("{a} {$ b} $c", &vars), "{a} {$ b} $c");
    }

    #[test]
    fn test_set_has_default_template() {
        let set = TemplateSet::new();
        assert_eq!(set.get(DEFAULT_TEMPLATE_NAME).as_deref(), Some(DEFAULT_TEMPLATE));
        assert!(set.get("linktools_linkpreview_missing").is_none());
    }

    #[test]
    fn test_load_dir_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("linktools_linkpreview_default.html"), "<p>{$title}</p>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut set = TemplateSet::new();
        let loaded = set.load_dir(dir.path().to_str().unwrap()).unwrap();

        assert_eq!(loaded, 1);
        assert_eq!(set.get(DEFAULT_TEMPLATE_NAME).as_deref(), Some("<p>{$title}</p>"));
        assert!(set.get("notes").is_none());
    }
}
