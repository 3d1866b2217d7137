//! Decides whether a URL points at a hosted video or an ordinary web page.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::entities::SourceKind;

static VIDEO_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

const VIDEO_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtube-nocookie.com",
    "www.youtube-nocookie.com",
];
const SHORT_LINK_HOST: &str = "youtu.be";

/// Path prefixes whose next segment is the video id.
const ID_PATH_PREFIXES: &[&str] = &["embed", "v", "shorts", "live", "e"];

pub fn classify(url: &Url) -> SourceKind {
    match video_id(url) {
        Some(id) => SourceKind::Video(id),
        None => SourceKind::GenericPage,
    }
}

pub fn video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();

    let candidate = if host == SHORT_LINK_HOST {
        url.path_segments()?.next().map(str::to_string)
    } else if VIDEO_HOSTS.contains(&host.as_str()) {
        from_query(url).or_else(|| from_path(url))
    } else {
        None
    }?;

    is_valid_id(&candidate).then_some(candidate)
}

pub fn is_valid_id(candidate: &str) -> bool {
    VIDEO_ID_REGEX.is_match(candidate)
}

// watch?v=<id>, and any other page carrying v=<id>
fn from_query(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.trim().to_string())
}

fn from_path(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    let prefix = segments.next()?;
    if !ID_PATH_PREFIXES.contains(&prefix) {
        return None;
    }
    segments.next().map(str::to_string)
}


#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_well_formed_ids_round_trip(id in "[A-Za-z0-9_-]{11}") {
            for url in [
                format!("https://www.youtube.com/watch?v={id}"),
                format!("https://youtu.be/{id}"),
                format!("https://www.youtube.com/embed/{id}"),
            ] {
                let parsed = Url::parse(&url).unwrap();
                prop_assert_eq!(classify(&parsed), SourceKind::Video(id.clone()));
            }
        }

        #[test]
        fn test_other_hosts_never_video(path in "[a-z0-9/]{0,30}") {
            let parsed = Url::parse(&format!("https://example.org/{path}")).unwrap();
            prop_assert_eq!(classify(&parsed), SourceKind::GenericPage);
        }
    }
}
