use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use crate::error::Result;
use crate::preview::normalize::parse_link;
use crate::preview::previewers::LinkPreviewer;
use crate::preview::sanitize::sanitize;
use crate::preview::template::{Template, TemplateVars};
use crate::preview::types::{ContentNeedPolicy, HelperDescriptor, PreviewRequest};

static DESCRIPTOR: HelperDescriptor = HelperDescriptor {
    key: "youtubevideo",
    friendly_name: "YouTube video",
    version: "1.0.0",
    priority: 0,
    norm_links_regex: Some(r"^http\(s\)://youtube\.com/watch\?"),
    needs_content: ContentNeedPolicy::NeverAndFinal,
    should_cache_preview: false,
    template: Some(
        r#"<div style="margin-top: 7px;"><iframe width="560" height="315" src="https://www.youtube-nocookie.com/embed/{$youtube_id}?start={$start}" frameborder="0" allowfullscreen></iframe></div>"#,
    ),
    ..HelperDescriptor::DEFAULT
};

static VIDEO_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Failed to compile video id regex"));

/// Embeds the player for `youtube.com/watch` links, starting at the offset
/// given by `start`, `time_continue` or `t`.
pub struct YouTubeVideoPreviewer;

impl YouTubeVideoPreviewer {
    /// Query parameters of `link`. A repeated key keeps its last value.
    fn query_params(link: &str) -> HashMap<String, String> {
        parse_link(link)
            .map(|url| url.query_pairs().into_owned().collect::<HashMap<_, _>>())
            .unwrap_or_default()
    }
}

/// A parameter counts as set unless it is missing, empty or `"0"`.
fn non_empty<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty() && *value != "0")
}

/// The raw start offset: `t` beats `time_continue`, which beats `start`.
pub fn effective_start(query: &HashMap<String, String>) -> Option<&str> {
    ["start", "time_continue", "t"]
        .into_iter()
        .filter_map(|key| non_empty(query, key))
        .last()
}

/// Converts a start offset to seconds.
///
/// Values made only of digits are seconds already. Anything else is read as
/// a timecode such as `1h2m3s`: digits accumulate until a unit letter
/// (`d`, `h`, `m`, `s`) claims them. Any other character discards the digits
/// read so far. Units that never appear count as zero.
pub fn start_seconds(value: &str) -> u64 {
    if value.chars().all(|c| c.is_ascii_digit()) {
        return parse_digits(value);
    }
    secs_from_timecode(value)
}

pub fn secs_from_timecode(tcode: &str) -> u64 {
    let (mut d, mut h, mut m, mut s) = (0u64, 0u64, 0u64, 0u64);
    let mut num = String::new();

    for c in tcode.chars() {
        if c.is_ascii_digit() {
            num.push(c);
            continue;
        }
        match c {
            'd' => d = parse_digits(&num),
            'h' => h = parse_digits(&num),
            'm' => m = parse_digits(&num),
            's' => s = parse_digits(&num),
            _ => {}
        }
        num.clear();
    }

    d.saturating_mul(24)
        .saturating_add(h)
        .saturating_mul(60)
        .saturating_add(m)
        .saturating_mul(60)
        .saturating_add(s)
}

fn parse_digits(digits: &str) -> u64 {
    digits.bytes().fold(0u64, |acc, b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    })
}

impl LinkPreviewer for YouTubeVideoPreviewer {
    fn descriptor(&self) -> &'static HelperDescriptor {
        &DESCRIPTOR
    }

    fn preview_contents(&self, request: &PreviewRequest<'_>, template: &Template) -> Result<String> {
        let query = Self::query_params(request.url);

        let youtube_id = match non_empty(&query, "v").map(sanitize) {
            Some(id) if VIDEO_ID_REGEX.is_match(id.as_str()) => id,
            Some(id) => {
                log::debug!("ignoring malformed video id {:?} in {}", id.as_str(), request.url);
                return Ok(String::new());
            }
            None => return Ok(String::new()),
        };

        let mut vars = TemplateVars::new().set("youtube_id", youtube_id);
        vars = match effective_start(&query) {
            Some(start) => vars.set("start", start_seconds(start)),
            None => vars.set("start", sanitize("")),
        };

        Ok(template.render(&vars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::template::template_name_for;

    fn template() -> Template {
        Template {
            name: template_name_for(DESCRIPTOR.key),
            body: "{$youtube_id}@{$start}".to_string(),
        }
    }

    fn preview(url: &str) -> String {
        YouTubeVideoPreviewer
            .preview_contents(&PreviewRequest::new(url), &template())
            .unwrap()
    }

    fn start_of(query: &str) -> Option<String> {
        let params = YouTubeVideoPreviewer::query_params(&format!("https://youtube.com/watch?{query}"));
        effective_start(&params).map(str::to_string)
    }

    #[test]
    fn test_plain_seconds() {
        assert_eq!(start_seconds("90"), 90);
    }

    #[test]
    fn test_timecodes() {
        assert_eq!(start_seconds("1m30s"), 90);
        assert_eq!(start_seconds("1h"), 3600);
        assert_eq!(start_seconds("2d"), 172800);
        assert_eq!(start_seconds("1h2m3s"), 3723);
    }

    #[test]
    fn test_timecode_units_in_any_order() {
        assert_eq!(secs_from_timecode("3s2m1h"), 3723);
    }

    #[test]
    fn test_timecode_unknown_char_discards_digits() {
        // the `x` drops the pending 2, only 3s and 1h are kept
        assert_eq!(secs_from_timecode("1h2x3s"), 3603);
    }

    #[test]
    fn test_timecode_trailing_digits_ignored() {
        assert_eq!(secs_from_timecode("1m30"), 60);
    }

    #[test]
    fn test_timecode_saturates() {
        assert_eq!(start_seconds("99999999999999999999999"), u64::MAX);
        assert_eq!(secs_from_timecode("99999999999999999999d"), u64::MAX);
    }

    #[test]
    fn test_parameter_precedence() {
        assert_eq!(start_of("start=10&time_continue=20").as_deref(), Some("20"));
        assert_eq!(start_of("start=10&time_continue=20&t=30").as_deref(), Some("30"));
        assert_eq!(start_of("start=15").as_deref(), Some("15"));
    }

    #[test]
    fn test_empty_parameters_do_not_override() {
        assert_eq!(start_of("start=10&time_continue=&t=").as_deref(), Some("10"));
        assert_eq!(start_of("start=10&t=0").as_deref(), Some("10"));
        assert_eq!(start_of("v=abc"), None);
    }

    #[test]
    fn test_repeated_parameter_last_wins() {
        assert_eq!(start_of("t=5&t=7").as_deref(), Some("7"));
    }

    #[test]
    fn test_preview_with_timecode() {
        assert_eq!(
            preview("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1m30s"),
            "dQw4w9WgXcQ@90"
        );
    }

    #[test]
    fn test_protocol_relative_link() {
        assert_eq!(
            preview("//www.youtube.com/watch?v=dQw4w9WgXcQ&t=30"),
            "dQw4w9WgXcQ@30"
        );
    }

    #[test]
    fn test_preview_without_start() {
        assert_eq!(preview("https://youtube.com/watch?v=dQw4w9WgXcQ"), "dQw4w9WgXcQ@");
    }

    #[test]
    fn test_missing_video_id_is_empty() {
        assert_eq!(preview("https://youtube.com/watch?start=10"), "");
        assert_eq!(preview("https://youtube.com/watch?v=&start=10"), "");
    }

    #[test]
    fn test_markup_in_video_id_rejected() {
        assert_eq!(
            preview("https://youtube.com/watch?v=%22%3E%3Cscript%3Ealert(1)%3C/script%3E"),
            ""
        );
    }

    #[test]
    fn test_builtin_template() {
        let template = Template {
            name: template_name_for(DESCRIPTOR.key),
            body: DESCRIPTOR.template.unwrap().to_string(),
        };
        let html = YouTubeVideoPreviewer
            .preview_contents(
                &PreviewRequest::new("https://youtube.com/watch?v=abc123&start=15"),
                &template,
            )
            .unwrap();

        assert!(html.contains(r#"src="https://www.youtube-nocookie.com/embed/abc123?start=15""#));
    }
}
