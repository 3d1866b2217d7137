use whatlang::{Lang, detect};

const MIN_CONFIDENCE: f64 = 0.25;
const MIN_TEXT_LENGTH: usize = 50;

/// Two-letter codes for the languages we see most; anything else keeps
/// whatlang's three-letter code.
const ISO_639_1: &[(Lang, &str)] = &[
    (Lang::Eng, "en"),
    (Lang::Spa, "es"),
    (Lang::Fra, "fr"),
    (Lang::Deu, "de"),
    (Lang::Por, "pt"),
    (Lang::Ita, "it"),
    (Lang::Nld, "nl"),
    (Lang::Rus, "ru"),
    (Lang::Cmn, "zh"),
    (Lang::Jpn, "ja"),
    (Lang::Kor, "ko"),
    (Lang::Ara, "ar"),
    (Lang::Hin, "hi"),
    (Lang::Tur, "tr"),
    (Lang::Pol, "pl"),
    (Lang::Swe, "sv"),
];

/// Best-effort language of extracted text; `None` when short or ambiguous.
pub fn detect_language(text: &str) -> Option<String> {
    if text.trim().chars().count() < MIN_TEXT_LENGTH {
        return None;
    }

    let info = detect(text).filter(|info| info.confidence() >= MIN_CONFIDENCE)?;
    let code = ISO_639_1
        .iter()
        .find(|(lang, _)| *lang == info.lang())
        .map(|(_, code)| *code)
        .unwrap_or_else(|| info.lang().code());
    Some(code.to_string())
}
