//! Strategies that dig captions out of the video's watch page.

use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use crate::extractor::{candidates::element_text, model::normalize_whitespace};
use crate::transcript::{
    StrategyContext, StrategyFailure, pick_track, timedtext::parse_xml_cues,
};

const INITIAL_DATA_MARKER: &str = "ytInitialData";
const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";

/// Known locations of caption cue text inside the initial-state blob.
/// `*` walks every element of an array.
const CUE_PATHS: &[&[&str]] = &[
    &[
        "engagementPanels", "*", "engagementPanelSectionListRenderer", "content",
        "transcriptRenderer", "body", "transcriptBodyRenderer", "cueGroups", "*",
        "transcriptCueGroupRenderer", "cues", "*", "transcriptCueRenderer", "cue", "simpleText",
    ],
    &[
        "engagementPanels", "*", "engagementPanelSectionListRenderer", "content",
        "transcriptRenderer", "content", "transcriptSearchPanelRenderer", "body",
        "transcriptSegmentListRenderer", "initialSegments", "*", "transcriptSegmentRenderer",
        "snippet", "runs", "*", "text",
    ],
    &[
        "actions", "*", "updateEngagementPanelAction", "content", "transcriptRenderer",
        "content", "transcriptSearchPanelRenderer", "body", "transcriptSegmentListRenderer",
        "initialSegments", "*", "transcriptSegmentRenderer", "snippet", "runs", "*", "text",
    ],
];

const CAPTION_TRACKS_PATH: &[&str] = &["captions", "playerCaptionsTracklistRenderer", "captionTracks"];

const MAX_ASSIGNMENT_GAP: usize = 16;

const TRANSCRIPT_KEYS: &[&str] = &["transcript", "captions"];

static LD_JSON_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[type='application/ld+json']").unwrap());

static TRANSCRIPT_CONTAINER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "[class*='transcript'], [id*='transcript'], [class*='caption'], [id*='caption']",
    )
    .unwrap()
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerCaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
}

/// 4. Cue arrays in the embedded initial state, then caption tracks listed in
/// the embedded player response.
pub async fn embedded_page_data(ctx: &StrategyContext<'_>) -> Result<String, StrategyFailure> {
    let page = ctx.watch_page().await?;

    if let Some(data) = embedded_json(page, INITIAL_DATA_MARKER) {
        let text = cue_text(&data);
        if !text.is_empty() {
            return Ok(text);
        }
    }

    let player =
        embedded_json(page, PLAYER_RESPONSE_MARKER).ok_or(StrategyFailure::NothingFound)?;
    let tracks: Vec<PlayerCaptionTrack> = walk(&player, CAPTION_TRACKS_PATH)
        .into_iter()
        .next()
        .and_then(|tracks| serde_json::from_value(tracks.clone()).ok())
        .unwrap_or_default();

    let track = pick_track(&tracks, ctx.retriever.languages(), |track| {
        track.language_code.as_str()
    })
    .ok_or(StrategyFailure::NothingFound)?;

    debug!(lang = %track.language_code, "fetching caption track from player response");
    let url = ctx.retriever.resolve(&track.base_url)?;
    let body = ctx.retriever.get_text(url).await?;
    Ok(parse_xml_cues(&body))
}

/// 5. `transcript` / `captions` fields of JSON-LD blocks.
pub async fn structured_metadata(ctx: &StrategyContext<'_>) -> Result<String, StrategyFailure> {
    let page = ctx.watch_page().await?;
    let document = Html::parse_document(page);

    let mut pieces = Vec::new();
    for script in document.select(&LD_JSON_SELECTOR) {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => collect_transcript_fields(&value, &mut pieces),
            Err(e) => debug!(error = %e, "skipping unparseable ld+json block"),
        }
    }

    if pieces.is_empty() {
        return Err(StrategyFailure::NothingFound);
    }
    Ok(normalize_whitespace(&pieces.join(" ")))
}

/// 6. Containers whose class or id mentions transcripts or captions.
pub async fn markup_patterns(ctx: &StrategyContext<'_>) -> Result<String, StrategyFailure> {
    let page = ctx.watch_page().await?;
    let text = transcript_container_text(page);
    if text.is_empty() {
        return Err(StrategyFailure::NothingFound);
    }
    Ok(text)
}

/// Parses the object literal assigned after `marker` in an inline script.
pub fn embedded_json(page: &str, marker: &str) -> Option<Value> {
    page.match_indices(marker).find_map(|(index, _)| {
        let rest = &page[index + marker.len()..];
        let open = rest.find('{')?;
        // The marker must be followed by an assignment, not used as a key or call.
        if open > MAX_ASSIGNMENT_GAP || !rest[..open].contains('=') {
            return None;
        }
        let object = balanced_object(&rest[open..])?;
        serde_json::from_str(object).ok()
    })
}

/// Returns the `{...}` prefix of `input`, honouring JSON strings and escapes.
fn balanced_object(input: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in input.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&input[..=index]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Every value reachable from `root` along `path`.
pub fn walk<'v>(root: &'v Value, path: &[&str]) -> Vec<&'v Value> {
    let mut current = vec![root];
    for segment in path {
        current = current
            .into_iter()
            .flat_map(|value| -> Vec<&'v Value> {
                match (*segment, value) {
                    ("*", Value::Array(items)) => items.iter().collect(),
                    (key, Value::Object(map)) => map.get(key).into_iter().collect(),
                    _ => Vec::new(),
                }
            })
            .collect();
    }
    current
}

fn cue_text(data: &Value) -> String {
    CUE_PATHS
        .iter()
        .map(|path| {
            let cues: Vec<&str> = walk(data, path).into_iter().filter_map(Value::as_str).collect();
            normalize_whitespace(&cues.join(" "))
        })
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn collect_transcript_fields(value: &Value, pieces: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                if TRANSCRIPT_KEYS.iter().any(|k| key.eq_ignore_ascii_case(k)) {
                    collect_text(nested, pieces);
                } else {
                    collect_transcript_fields(nested, pieces);
                }
            }
        }
        Value::Array(items) => items
            .iter()
            .for_each(|item| collect_transcript_fields(item, pieces)),
        _ => {}
    }
}

fn collect_text(value: &Value, pieces: &mut Vec<String>) {
    match value {
        Value::String(text) if !text.trim().is_empty() => pieces.push(text.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_text(item, pieces)),
        Value::Object(map) => {
            for key in ["text", "transcript", "description"] {
                if let Some(nested) = map.get(key) {
                    collect_text(nested, pieces);
                }
            }
        }
        _ => {}
    }
}

fn transcript_container_text(page: &str) -> String {
    let document = Html::parse_document(page);
    let matched: Vec<ElementRef<'_>> = document
        .select(&TRANSCRIPT_CONTAINER_SELECTOR)
        .filter(|element| !matches!(element.value().name(), "script" | "style" | "meta"))
        .collect();
    let ids: HashSet<_> = matched.iter().map(|element| element.id()).collect();

    // Only outermost containers, so nested cue wrappers are not counted twice.
    let texts: Vec<String> = matched
        .into_iter()
        .filter(|element| !element.ancestors().any(|ancestor| ids.contains(&ancestor.id())))
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect();
    texts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embedded_json_balances_braces_inside_strings() {
        let page = r#"<script>var ytInitialData = {"a":"}{ \" }","b":{"c":[1,2]}};var other = 1;</script>"#;
        let value = embedded_json(page, INITIAL_DATA_MARKER).unwrap();
        assert_eq!(value, json!({"a": "}{ \" }", "b": {"c": [1, 2]}}));
    }

    #[test]
    fn test_embedded_json_skips_non_assignments() {
        let page = r#"if (window.ytInitialData) {} ; window["ytInitialData"] = {"ok":true};"#;
        assert_eq!(embedded_json(page, INITIAL_DATA_MARKER), Some(json!({"ok": true})));
    }

    #[test]
    fn test_walk_with_wildcards() {
        let data = json!({"a": [{"b": "one"}, {"b": "two"}, {"c": "skip"}]});
        let found: Vec<_> = walk(&data, &["a", "*", "b"]);
        assert_eq!(found, vec![&json!("one"), &json!("two")]);
    }

    #[test]
    fn test_cue_text_from_segment_list() {
        let data = json!({
            "engagementPanels": [{
                "engagementPanelSectionListRenderer": {"content": {"transcriptRenderer": {"content": {
                    "transcriptSearchPanelRenderer": {"body": {"transcriptSegmentListRenderer": {
                        "initialSegments": [
                            {"transcriptSegmentRenderer": {"snippet": {"runs": [{"text": "first"}, {"text": "run"}]}}},
                            {"transcriptSegmentRenderer": {"snippet": {"runs": [{"text": "second"}]}}}
                        ]
                    }}}
                }}}}
            }]
        });
        assert_eq!(cue_text(&data), "first run second");
    }

    #[test]
    fn test_collect_transcript_fields() {
        let value = json!({
            "@type": "VideoObject",
            "name": "ignored",
            "transcript": "Spoken words here.",
            "hasPart": [{"captions": [{"text": "cue one"}, "cue two"]}]
        });
        let mut pieces = Vec::new();
        collect_transcript_fields(&value, &mut pieces);
        pieces.sort();
        assert_eq!(pieces, ["Spoken words here.", "cue one", "cue two"]);
    }

    #[test]
    fn test_transcript_container_text_uses_outermost() {
        let page = r#"<html><body>
            <div id="transcript-panel"><div class="transcript-cue">Line one</div><div class="transcript-cue">Line two</div></div>
            <span class="video-caption">Caption text</span>
            <p>Unrelated</p>
        </body></html>"#;
        assert_eq!(transcript_container_text(page), "Line one Line two Caption text");
    }
}
