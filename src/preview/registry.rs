use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::preview::normalize::normalize_url;
use crate::preview::previewers::{builtin_previewers, LinkPreviewer};
use crate::preview::template::{
    template_name_for, Template, TemplateSet, TemplateSource, DEFAULT_TEMPLATE_NAME,
};
use crate::preview::types::{ContentNeedPolicy, HelperInfo, PreviewRequest};

/// Compiled form of a helper's link pattern.
#[derive(Debug, Clone)]
pub enum LinkMatcher {
    Normalized(Regex),
    Raw(Regex),
}

impl LinkMatcher {
    pub fn is_match(&self, url: &str) -> bool {
        match self {
            LinkMatcher::Normalized(regex) => regex.is_match(&normalize_url(url)),
            LinkMatcher::Raw(regex) => regex.is_match(url),
        }
    }
}

/// A registered previewer together with its compiled pattern.
pub struct Helper {
    previewer: Arc<dyn LinkPreviewer>,
    matcher: LinkMatcher,
}

impl std::fmt::Debug for Helper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Helper")
            .field("key", &self.key())
            .field("priority", &self.priority())
            .field("matcher", &self.matcher)
            .finish()
    }
}

impl Helper {
    /// Compiles the previewer's pattern. The normalized pattern wins when both
    /// are declared.
    pub fn new(previewer: Arc<dyn LinkPreviewer>) -> Result<Self> {
        let descriptor = previewer.descriptor();
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|source| Error::InvalidPattern {
                helper: descriptor.key,
                source,
            })
        };

        let matcher = match (descriptor.norm_links_regex, descriptor.links_regex) {
            (Some(pattern), _) => LinkMatcher::Normalized(compile(pattern)?),
            (None, Some(pattern)) => LinkMatcher::Raw(compile(pattern)?),
            (None, None) => return Err(Error::MissingPattern(descriptor.key)),
        };

        Ok(Self { previewer, matcher })
    }

    pub fn supports(&self, url: &str) -> bool {
        self.matcher.is_match(url)
    }

    pub fn key(&self) -> &'static str {
        self.previewer.descriptor().key
    }

    pub fn priority(&self) -> i32 {
        self.previewer.descriptor().priority
    }

    pub fn version(&self) -> &'static str {
        self.previewer.descriptor().version
    }

    pub fn friendly_name(&self) -> &'static str {
        self.previewer.descriptor().friendly_name
    }

    pub fn content_need_policy(&self) -> ContentNeedPolicy {
        self.previewer.descriptor().needs_content
    }

    pub fn needs_content(&self, url: &str) -> bool {
        self.previewer.needs_content(url)
    }

    pub fn should_cache_preview(&self) -> bool {
        self.previewer.descriptor().should_cache_preview
    }

    /// Name of the template this helper renders through.
    pub fn template_name(&self) -> String {
        self.own_template_name()
            .unwrap_or_else(|| DEFAULT_TEMPLATE_NAME.to_string())
    }

    /// Name of the helper's own template, `None` when it uses the default one.
    pub fn own_template_name(&self) -> Option<String> {
        self.previewer
            .descriptor()
            .template
            .map(|_| template_name_for(self.key()))
    }

    /// Built-in body of the helper's own template.
    pub fn template_raw(&self) -> Option<&'static str> {
        self.previewer.descriptor().template
    }

    pub fn info(&self) -> HelperInfo {
        HelperInfo {
            key: self.key().to_string(),
            friendly_name: self.friendly_name().to_string(),
            version: self.version().to_string(),
            priority: self.priority(),
            needs_content: self.content_need_policy(),
            should_cache_preview: self.should_cache_preview(),
            template_name: self.template_name(),
        }
    }

    fn template(&self, templates: &dyn TemplateSource) -> Result<Template> {
        let name = self.template_name();
        let body = templates
            .get(&name)
            .ok_or_else(|| Error::MissingTemplate(name.clone()))?;
        Ok(Template { name, body })
    }

    /// Renders the preview for `url`.
    ///
    /// Returns `Ok(None)` when this helper does not support `url`, whether or
    /// not the caller already checked.
    pub fn get_preview(
        &self,
        url: &str,
        content: Option<&[u8]>,
        content_type: Option<&str>,
        templates: &dyn TemplateSource,
    ) -> Result<Option<String>> {
        if !self.supports(url) {
            return Ok(None);
        }

        let request = PreviewRequest::new(url).with_content(content, content_type);
        let template = self.template(templates)?;
        let preview = self.previewer.preview_contents(&request, &template)?;

        Ok(Some(preview))
    }
}

/// Outcome of picking a helper for a link.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// No registered helper supports the link.
    Unsupported,
    /// Render right away; the page need not be fetched.
    Ready(&'a Helper),
    /// Fetch the page, then render with this helper.
    NeedsContent(&'a Helper),
}

impl<'a> Resolution<'a> {
    pub fn helper(&self) -> Option<&'a Helper> {
        match self {
            Resolution::Unsupported => None,
            Resolution::Ready(helper) | Resolution::NeedsContent(helper) => Some(helper),
        }
    }

    pub fn needs_content(&self) -> bool {
        matches!(self, Resolution::NeedsContent(_))
    }

    pub fn report(&self) -> ResolutionReport {
        ResolutionReport {
            helper: self.helper().map(|helper| helper.key().to_string()),
            needs_content: self.needs_content(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolutionReport {
    pub helper: Option<String>,
    pub needs_content: bool,
}

/// Collects previewers before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    previewers: Vec<Arc<dyn LinkPreviewer>>,
}

impl RegistryBuilder {
    pub fn register(mut self, previewer: Arc<dyn LinkPreviewer>) -> Self {
        self.previewers.push(previewer);
        self
    }

    pub fn register_all(mut self, previewers: impl IntoIterator<Item = Arc<dyn LinkPreviewer>>) -> Self {
        self.previewers.extend(previewers);
        self
    }

    /// Compiles every pattern and checks that every template resolves.
    pub fn build(self, templates: Box<dyn TemplateSource>) -> Result<HelperRegistry> {
        let mut helpers: Vec<Helper> = Vec::with_capacity(self.previewers.len());

        for previewer in self.previewers {
            let helper = Helper::new(previewer)?;

            if helpers.iter().any(|existing| existing.key() == helper.key()) {
                return Err(Error::DuplicateHelper(helper.key()));
            }

            let template_name = helper.template_name();
            if templates.get(&template_name).is_none() {
                return Err(Error::MissingTemplate(template_name));
            }

            log::debug!(
                "helper={} priority={} registered",
                helper.key(),
                helper.priority()
            );
            helpers.push(helper);
        }

        Ok(HelperRegistry { helpers, templates })
    }
}

/// The table of enabled helpers. Built once at startup, read-only afterwards.
pub struct HelperRegistry {
    helpers: Vec<Helper>,
    templates: Box<dyn TemplateSource>,
}

impl std::fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelperRegistry")
            .field("helpers", &self.helpers)
            .finish_non_exhaustive()
    }
}

impl HelperRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registers the built-in previewers not disabled in `config`, with their
    /// built-in templates overlaid by the configured ones.
    pub fn from_config(config: &Config) -> Result<Self> {
        let previewers: Vec<_> = builtin_previewers()
            .into_iter()
            .filter(|previewer| !config.is_disabled(previewer.descriptor().key))
            .collect();

        let mut templates = TemplateSet::new();
        for previewer in &previewers {
            let descriptor = previewer.descriptor();
            if let Some(body) = descriptor.template {
                templates.insert(template_name_for(descriptor.key), body);
            }
        }
        if let Some(dir) = config.template_dir() {
            let loaded = templates.load_dir(dir)?;
            log::info!("loaded {loaded} templates from {dir}");
        }
        for (name, body) in &config.templates {
            templates.insert(name.clone(), body.clone());
        }

        Self::builder()
            .register_all(previewers)
            .build(Box::new(templates))
    }

    pub fn helpers(&self) -> &[Helper] {
        &self.helpers
    }

    pub fn get(&self, key: &str) -> Option<&Helper> {
        self.helpers.iter().find(|helper| helper.key() == key)
    }

    pub fn templates(&self) -> &dyn TemplateSource {
        self.templates.as_ref()
    }

    /// Helpers supporting `url`, highest priority first. Equal priorities keep
    /// registration order.
    pub fn candidates(&self, url: &str) -> Vec<&Helper> {
        let mut candidates: Vec<&Helper> = self
            .helpers
            .iter()
            .filter(|helper| helper.supports(url))
            .collect();
        // stable sort: first registered wins ties
        candidates.sort_by_key(|helper| std::cmp::Reverse(helper.priority()));
        candidates
    }

    /// The highest-priority helper supporting `url`.
    pub fn select(&self, url: &str) -> Option<&Helper> {
        self.candidates(url).into_iter().next()
    }

    /// Decides which helper previews `url` and whether the page must be
    /// fetched first.
    pub fn resolve(&self, url: &str) -> Resolution<'_> {
        let candidates = self.candidates(url);
        let Some(top) = candidates.first().copied() else {
            return Resolution::Unsupported;
        };

        let contentless = candidates.iter().copied().find(|helper| !helper.needs_content(url));
        if let Some(helper) = contentless {
            if helper.content_need_policy() == ContentNeedPolicy::NeverAndFinal {
                return Resolution::Ready(helper);
            }
        }

        if top.needs_content(url) {
            Resolution::NeedsContent(top)
        } else {
            Resolution::Ready(top)
        }
    }

    /// Renders the preview for `url` with the helper [`Self::resolve`] picks.
    ///
    /// `Ok(None)` means no helper supports the link. Helpers that need no
    /// content are called without it even when the host passed some.
    pub fn preview(
        &self,
        url: &str,
        content: Option<&[u8]>,
        content_type: Option<&str>,
    ) -> Result<Option<String>> {
        match self.resolve(url) {
            Resolution::Unsupported => {
                log::debug!("no helper supports {url}");
                Ok(None)
            }
            Resolution::Ready(helper) => {
                log::debug!("helper={} previewing {url} without content", helper.key());
                helper.get_preview(url, None, None, self.templates())
            }
            Resolution::NeedsContent(helper) => {
                if content.is_none() {
                    log::warn!("helper={} needs content for {url} but none was given", helper.key());
                }
                helper.get_preview(url, content, content_type, self.templates())
            }
        }
    }
}
