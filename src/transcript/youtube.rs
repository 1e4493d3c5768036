use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{FetchError, Segment, TranscriptSource};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player?key=";
const CONSENT_ACTION: &str = "action=\"https://consent.youtube.com/s\"";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

static API_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).unwrap());
static CONSENT_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name="v" value="(.*?)""#).unwrap());
static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap());

/// Caption track entry from the innertube player response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Fetches transcripts the way the YouTube web player does:
/// watch page → innertube player → timedtext XML.
#[derive(Debug, Clone, Default)]
pub struct YouTubeClient {
    http: reqwest::Client,
}

impl YouTubeClient {
    pub fn new() -> Self {
        Self::default()
    }

    async fn watch_html(&self, video_id: &str) -> Result<String, FetchError> {
        let html = self.get_watch(video_id, None).await?;
        if !is_consent_page(&html) {
            return Ok(html);
        }

        let value = consent_value(&html).ok_or_else(|| FetchError::Unparsable {
            video_id: video_id.to_string(),
            detail: "consent form without a value".into(),
        })?;
        debug!(video_id, "Retrying watch page with consent cookie");
        let html = self
            .get_watch(video_id, Some(&format!("CONSENT=YES+{value}")))
            .await?;
        if is_consent_page(&html) {
            return Err(FetchError::Unparsable {
                video_id: video_id.to_string(),
                detail: "consent cookie was not accepted".into(),
            });
        }
        Ok(html)
    }

    async fn get_watch(&self, video_id: &str, cookie: Option<&str>) -> Result<String, FetchError> {
        let mut req = self
            .http
            .get(format!("{WATCH_URL}{video_id}"))
            .header(ACCEPT_LANGUAGE, "en-US");
        if let Some(c) = cookie {
            req = req.header(COOKIE, c);
        }
        Ok(req.send().await?.error_for_status()?.text().await?)
    }

    async fn player(&self, video_id: &str, api_key: &str) -> Result<Value, FetchError> {
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });
        let resp = self
            .http
            .post(format!("{PLAYER_URL}{api_key}"))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    async fn timedtext(&self, track: &CaptionTrack) -> Result<String, FetchError> {
        let url = track.base_url.replace("&fmt=srv3", "");
        Ok(self
            .http
            .get(url)
            .header(ACCEPT_LANGUAGE, "en-US")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?)
    }
}

impl TranscriptSource for YouTubeClient {
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Vec<Segment>, FetchError> {
        let html = self.watch_html(video_id).await?;
        let api_key = extract_api_key(&html, video_id)?;
        let player = self.player(video_id, &api_key).await?;
        check_playability(&player, video_id)?;

        let tracks = caption_tracks(&player, video_id)?;
        let track = select_track(&tracks, languages, video_id)?;
        if track.base_url.contains("&exp=xpe") {
            return Err(FetchError::PoTokenRequired(video_id.to_string()));
        }
        debug!(
            video_id,
            language = %track.language_code,
            generated = track.is_generated(),
            "Selected caption track"
        );

        let xml = self.timedtext(track).await?;
        parse_transcript_xml(&xml)
    }
}

fn is_consent_page(html: &str) -> bool {
    html.contains(CONSENT_ACTION)
}

fn consent_value(html: &str) -> Option<String> {
    CONSENT_VALUE_RE
        .captures(html)
        .map(|caps| caps[1].to_string())
}

/// Pull the innertube API key out of the watch page.
pub fn extract_api_key(html: &str, video_id: &str) -> Result<String, FetchError> {
    if let Some(caps) = API_KEY_RE.captures(html) {
        return Ok(caps[1].to_string());
    }
    if html.contains("class=\"g-recaptcha\"") {
        return Err(FetchError::RequestBlocked(video_id.to_string()));
    }
    Err(FetchError::Unparsable {
        video_id: video_id.to_string(),
        detail: "INNERTUBE_API_KEY not found in watch page".into(),
    })
}

/// Map a non-OK `playabilityStatus` to the matching error.
pub fn check_playability(player: &Value, video_id: &str) -> Result<(), FetchError> {
    let Some(status) = player
        .pointer("/playabilityStatus/status")
        .and_then(Value::as_str)
    else {
        return Ok(());
    };
    if status == "OK" {
        return Ok(());
    }

    let reason = player
        .pointer("/playabilityStatus/reason")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match status {
        "LOGIN_REQUIRED" if reason.contains("not a bot") => {
            Err(FetchError::RequestBlocked(video_id.to_string()))
        }
        "ERROR" if reason == "This video is unavailable" => {
            Err(FetchError::VideoUnavailable(video_id.to_string()))
        }
        _ => Err(FetchError::VideoUnplayable {
            video_id: video_id.to_string(),
            reason: if reason.is_empty() {
                status.to_string()
            } else {
                reason.to_string()
            },
        }),
    }
}

pub fn caption_tracks(player: &Value, video_id: &str) -> Result<Vec<CaptionTrack>, FetchError> {
    let tracks = player
        .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")
        .ok_or_else(|| FetchError::TranscriptsDisabled(video_id.to_string()))?;

    serde_json::from_value(tracks.clone()).map_err(|e| FetchError::Unparsable {
        video_id: video_id.to_string(),
        detail: format!("caption tracks: {e}"),
    })
}

/// First preferred language wins; within a language, manual captions beat
/// auto-generated ones.
pub fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    languages: &[String],
    video_id: &str,
) -> Result<&'a CaptionTrack, FetchError> {
    for lang in languages {
        let candidates = || tracks.iter().filter(|t| &t.language_code == lang);
        if let Some(track) = candidates()
            .find(|t| !t.is_generated())
            .or_else(|| candidates().next())
        {
            return Ok(track);
        }
    }

    Err(FetchError::NoTranscriptFound {
        video_id: video_id.to_string(),
        requested: languages.to_vec(),
        available: tracks.iter().map(|t| t.language_code.clone()).collect(),
    })
}

/// Parse `<transcript><text start=".." dur="..">...</text></transcript>`.
pub fn parse_transcript_xml(xml: &str) -> Result<Vec<Segment>, FetchError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut segments = Vec::new();
    let mut timing: Option<(f64, f64)> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"text" => {
                timing = Some((attr_f64(&e, "start")?, attr_f64(&e, "dur")?));
                text.clear();
            }
            Event::Text(e) if timing.is_some() => {
                text.push_str(&e.unescape().map_err(quick_xml::Error::from)?)
            }
            Event::End(e) if e.name().as_ref() == b"text" => {
                if let Some((start, duration)) = timing.take() {
                    if !text.is_empty() {
                        segments.push(Segment {
                            text: clean_caption(&text),
                            start,
                            duration,
                        });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(segments)
}

fn attr_f64(e: &BytesStart, name: &str) -> Result<f64, quick_xml::Error> {
    Ok(match e.try_get_attribute(name)? {
        Some(attr) => attr.unescape_value()?.trim().parse().unwrap_or(0.0),
        None => 0.0,
    })
}

/// Captions arrive double-escaped (`&amp;#39;`) and may carry inline markup.
fn clean_caption(raw: &str) -> String {
    let unescaped = decode_entities(raw);
    HTML_TAG_RE.replace_all(&unescaped, "").into_owned()
}

/// Decode HTML5 named and numeric references one at a time; unknown or
/// invalid references and bare `&` stay as written.
fn decode_entities(raw: &str) -> String {
    ENTITY_RE
        .replace_all(raw, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = match name.strip_prefix('#') {
                Some(num) => {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.filter(|c| *c != 0)
                        .and_then(char::from_u32)
                        .map(String::from)
                }
                None => quick_xml::escape::resolve_html5_entity(name).map(str::to_string),
            };
            decoded.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn track(lang: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://www.youtube.com/api/timedtext?lang={lang}"),
            language_code: lang.to_string(),
            kind: kind.map(str::to_string),
        }
    }

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn api_key_found() {
        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaSyA-test_key9","X":1})</script>"#;
        assert_eq!(extract_api_key(html, "vid").unwrap(), "AIzaSyA-test_key9");
    }

    #[test]
    fn api_key_missing_on_captcha_page_is_blocked() {
        let html = r#"<div class="g-recaptcha"></div>"#;
        assert!(matches!(
            extract_api_key(html, "vid"),
            Err(FetchError::RequestBlocked(id)) if id == "vid"
        ));
        assert!(matches!(
            extract_api_key("<html></html>", "vid"),
            Err(FetchError::Unparsable { .. })
        ));
    }

    #[test]
    fn consent_page_detection() {
        let html = r#"<form action="https://consent.youtube.com/s"><input name="v" value="cb.20210328-17-p0.en+FX+123"></form>"#;
        assert!(is_consent_page(html));
        assert_eq!(consent_value(html).as_deref(), Some("cb.20210328-17-p0.en+FX+123"));
        assert!(!is_consent_page("<html>watch</html>"));
    }

    #[test]
    fn playability_ok_or_missing_passes() {
        assert!(check_playability(&json!({"playabilityStatus": {"status": "OK"}}), "v").is_ok());
        assert!(check_playability(&json!({}), "v").is_ok());
    }

    #[test]
    fn playability_errors_are_typed() {
        let unavailable = json!({"playabilityStatus": {"status": "ERROR", "reason": "This video is unavailable"}});
        assert!(matches!(
            check_playability(&unavailable, "v"),
            Err(FetchError::VideoUnavailable(_))
        ));

        let bot = json!({"playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "Sign in to confirm you’re not a bot"}});
        assert!(matches!(check_playability(&bot, "v"), Err(FetchError::RequestBlocked(_))));

        let private = json!({"playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "This video is private"}});
        match check_playability(&private, "v") {
            Err(FetchError::VideoUnplayable { reason, .. }) => assert_eq!(reason, "This video is private"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_captions_means_disabled() {
        let player = json!({"playabilityStatus": {"status": "OK"}});
        assert!(matches!(
            caption_tracks(&player, "v"),
            Err(FetchError::TranscriptsDisabled(_))
        ));
    }

    #[test]
    fn caption_tracks_deserialize() {
        let player = json!({
            "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                {"baseUrl": "https://x/timedtext?v=1&fmt=srv3", "languageCode": "en", "kind": "asr", "name": {"runs": [{"text": "English (auto-generated)"}]}},
                {"baseUrl": "https://x/timedtext?v=1&lang=de", "languageCode": "de"}
            ]}}
        });
        let tracks = caption_tracks(&player, "v").unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(tracks[0].is_generated());
        assert!(!tracks[1].is_generated());
    }

    #[test]
    fn manual_track_preferred_within_language() {
        let tracks = vec![track("en", Some("asr")), track("en", None), track("de", None)];
        let picked = select_track(&tracks, &langs(&["en"]), "v").unwrap();
        assert!(!picked.is_generated());
        assert_eq!(picked.language_code, "en");
    }

    #[test]
    fn language_order_beats_manual_preference() {
        let tracks = vec![track("de", None), track("en", Some("asr"))];
        let picked = select_track(&tracks, &langs(&["en", "de"]), "v").unwrap();
        assert_eq!(picked.language_code, "en");
        assert!(picked.is_generated());
    }

    #[test]
    fn no_matching_language() {
        let tracks = vec![track("fr", None)];
        match select_track(&tracks, &langs(&["en"]), "v") {
            Err(FetchError::NoTranscriptFound { requested, available, .. }) => {
                assert_eq!(requested, vec!["en"]);
                assert_eq!(available, vec!["fr"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn transcript_xml_parses_and_cleans() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0.08" dur="2.4">hey guys &amp;#39;sup</text>
<text start="2.5" dur="1.1">use &lt;font color=&quot;#E5E5E5&quot;&gt;MediaPipe&lt;/font&gt;</text>
<text start="3.6" dur="0.5"></text>
<text start="4.1"/>
<text start="4.2" dur="3">tom &amp;amp; jerry</text>
</transcript>"#;
        let segs = parse_transcript_xml(xml).unwrap();
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0].text, "hey guys 'sup");
        assert_eq!(segs[0].start, 0.08);
        assert_eq!(segs[0].duration, 2.4);
        assert_eq!(segs[1].text, "use MediaPipe");
        assert_eq!(segs[2].text, "tom & jerry");
    }

    #[test]
    fn html_entities_decode_individually() {
        let xml = r#"<transcript><text start="0" dur="1">it&amp;#39;s&amp;nbsp;fast</text>
<text start="1" dur="1">fish &amp;amp; chips &amp;#x2014; &amp;bogus; yum</text></transcript>"#;
        let segs = parse_transcript_xml(xml).unwrap();
        assert_eq!(segs[0].text, "it's\u{a0}fast");
        assert_eq!(segs[1].text, "fish & chips \u{2014} &bogus; yum");
    }

    #[test]
    fn stray_ampersand_does_not_block_decoding() {
        assert_eq!(decode_entities("a & b &eacute;t&#233; &#0;"), "a & b \u{e9}t\u{e9} &#0;");
    }

    #[test]
    fn missing_dur_defaults_to_zero() {
        let segs = parse_transcript_xml(r#"<transcript><text start="1.5">hi</text></transcript>"#).unwrap();
        assert_eq!(segs[0].duration, 0.0);
        assert_eq!(segs[0].start, 1.5);
    }
}
