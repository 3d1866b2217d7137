//! Strategies backed by the platform's timed-text caption endpoint.

use scraper::{Html, Selector};
use serde::Deserialize;
use std::sync::LazyLock;
use url::Url;

use crate::extractor::model::normalize_whitespace;
use crate::transcript::{StrategyContext, StrategyFailure, pick_track};

const TIMEDTEXT_PATH: &str = "/api/timedtext";

static CUE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("text, p").unwrap());
static TRACK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("track").unwrap());

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub lang_code: String,
    pub name: String,
}

/// 1. Default-language captions in the segment-list (json3) format.
pub async fn json_captions(ctx: &StrategyContext<'_>) -> Result<String, StrategyFailure> {
    let url = timedtext_url(ctx, &[("lang", default_language(ctx)), ("fmt", "json3")]);
    let body = ctx.retriever.get_text(url).await?;
    if body.trim().is_empty() {
        return Err(StrategyFailure::NothingFound);
    }
    parse_json3(&body)
}

/// 2. Same endpoint, XML serialization.
pub async fn xml_captions(ctx: &StrategyContext<'_>) -> Result<String, StrategyFailure> {
    let url = timedtext_url(ctx, &[("lang", default_language(ctx))]);
    let body = ctx.retriever.get_text(url).await?;
    Ok(parse_xml_cues(&body))
}

/// 3. Ask for the track list, then fetch the best-matching track.
pub async fn discovered_track(ctx: &StrategyContext<'_>) -> Result<String, StrategyFailure> {
    let list = ctx
        .retriever
        .get_text(timedtext_url(ctx, &[("type", "list")]))
        .await?;
    let tracks = parse_track_list(&list);

    let track = pick_track(&tracks, ctx.retriever.languages(), |track| {
        track.lang_code.as_str()
    })
    .ok_or(StrategyFailure::NothingFound)?;

    let mut params = vec![("lang", track.lang_code.as_str())];
    if !track.name.is_empty() {
        params.push(("name", track.name.as_str()));
    }
    let body = ctx.retriever.get_text(timedtext_url(ctx, &params)).await?;
    Ok(parse_xml_cues(&body))
}

fn default_language<'a>(ctx: &'a StrategyContext<'_>) -> &'a str {
    ctx.retriever
        .languages()
        .first()
        .map(String::as_str)
        .unwrap_or("en")
}

fn timedtext_url(ctx: &StrategyContext<'_>, params: &[(&str, &str)]) -> Url {
    let mut url = ctx.retriever.endpoint(TIMEDTEXT_PATH);
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("v", ctx.video_id);
        for (key, value) in params {
            query.append_pair(key, value);
        }
    }
    url
}

pub fn parse_json3(body: &str) -> Result<String, StrategyFailure> {
    let captions: Json3 =
        serde_json::from_str(body).map_err(|e| StrategyFailure::Payload(e.to_string()))?;

    let lines: Vec<String> = captions
        .events
        .iter()
        .map(|event| {
            event
                .segs
                .iter()
                .map(|segment| segment.utf8.as_str())
                .collect::<String>()
        })
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    Ok(normalize_whitespace(&lines.join(" ")))
}

/// Text of every `<text>` (classic) or `<p>` (srv3) cue, in document order.
pub fn parse_xml_cues(body: &str) -> String {
    let document = Html::parse_fragment(body);
    let lines: Vec<String> = document
        .select(&CUE_SELECTOR)
        .map(|cue| decode_entities(&cue.text().collect::<String>()))
        .map(|line| normalize_whitespace(&line))
        .filter(|line| !line.is_empty())
        .collect();
    lines.join(" ")
}

pub fn parse_track_list(body: &str) -> Vec<CaptionTrack> {
    let document = Html::parse_fragment(body);
    document
        .select(&TRACK_SELECTOR)
        .filter_map(|track| {
            let element = track.value();
            let lang_code = element.attr("lang_code")?.trim();
            (!lang_code.is_empty()).then(|| CaptionTrack {
                lang_code: lang_code.to_string(),
                name: element.attr("name").unwrap_or_default().to_string(),
            })
        })
        .collect()
}

// Caption payloads are often escaped twice ("&amp;#39;"); the parser undoes
// the first layer, this undoes the second.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    Html::parse_fragment(text)
        .root_element()
        .text()
        .collect::<String>()
}
