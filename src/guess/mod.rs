// Release name parsing
//
// Turns a raw release filename ("The.Movie.2017.1080p.BluRay.x264-GRP")
// into a structured Information record. Parsing never fails: every field
// degrades to its absence value when its pattern doesn't match, and
// leftover tokens are bucketed into `rest`.
//
// Patterns adapted from
// https://github.com/divijbindlish/parse-torrent-name/blob/master/PTN/patterns.py

pub mod interval;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use self::interval::{Interval, join_intervals, strip_string};

static RE_SEASON: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(s?([0-9]{1,2}))[ex]").unwrap());
static RE_EPISODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([ex]([0-9]{2}))(?:[^0-9]|$)").unwrap());
static RE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b([\[\(]?(\d{4})[\]\)]?)\b").unwrap());
static RE_RESOLUTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b([0-9]{3,4}p)\b").unwrap());
static RE_RELEASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b((?:PPV\.)?[HP]DTV|(?:HD)?CAM|B[DR]Rip|(?:HD-?)?TS|(?:PPV )?WEB-?DL(?: DVDRip)?|HDRip|DVDRip|CamRip|W[EB]BRip|BluRay|Blu-ray|Blu Ray|DvDScr|telesync)\b").unwrap()
});
static RE_VIDEO_CODEC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(xvid|[hx]\.?26[45])\b").unwrap());
static RE_AUDIO_CODEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(MP3|DD5\.?1|Dual[\- ]Audio|LiNE|DTS|AAC[.-]LC|AAC(?:\.?2\.0)?|AC3(?:\.5\.1)?)\b").unwrap()
});
// Anchored near the end of the name so a hyphenated title word
// ("Extra-Terrestrial") is never mistaken for the release group. The
// token may only be followed by a container extension or a bracketed tag.
static RE_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(- ?([^-\.\[ ]+))(?:\.[a-z0-9]+$|\s*\[[^\]]*\]\s*$|$)").unwrap()
});
static RE_REGION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bR[0-9]\b").unwrap());
static RE_EXTENDED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(EXTENDED(?:.CUT)?)\b").unwrap());
static RE_REMASTERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bREMASTERED\b").unwrap());
static RE_THEATRICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(THEATRICAL(?:.CUT)?)\b").unwrap());
static RE_DIRECTORS_CUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:DC|DIRECTORS.CUT)\b").unwrap());
static RE_HARDCODED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bHC\b").unwrap());
static RE_PROPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bPROPER\b").unwrap());
static RE_CONTAINER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(MKV|AVI|MP4)\b").unwrap());
static RE_REPACK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bREPACK\b").unwrap());
static RE_WIDESCREEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bWS\b").unwrap());
static RE_WEBSITE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\[ ?([^\]]+?) ?\])").unwrap());
static RE_UNRATED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bUNRATED\b").unwrap());
static RE_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?(?:GB|MB))\b").unwrap());
static RE_THREE_D: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b3D\b").unwrap());

static RE_DOTS_LEFT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([ \.])([^ \.]{2,})").unwrap());
static RE_DOTS_RIGHT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^ \.]{2,})([ \.])").unwrap());
static RE_TWO_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\. ]{2,}").unwrap());

/// Data extracted from a media release name.
///
/// Every field is independently optional; absence is `0`, `""`, `false`
/// or an empty `rest`, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Information {
    /// Media title. "" if none.
    pub title: String,
    /// Season number. 0 if none.
    pub season: u32,
    /// Episode number. 0 if none.
    pub episode: u32,
    /// Media release year. 0 if none.
    pub year: u32,
    /// Video mode (1080p, 720i...). "" if none.
    pub resolution: String,
    /// Release type (BDRip, WEBRip...). "" if none.
    pub release: String,
    /// Video codec (XViD, h264...). "" if none.
    pub video_codec: String,
    /// Audio codec (AAC, MP3...). "" if none.
    pub audio_codec: String,
    /// Group responsible for the release. "" if none.
    pub group: String,
    /// Media region (R5...). "" if none.
    pub region: String,
    pub extended: bool,
    pub remastered: bool,
    pub theatrical: bool,
    pub directors_cut: bool,
    /// Media has hardcoded subtitles burned in.
    pub hardcoded: bool,
    /// Re-release fixing problems in a previous release.
    pub proper: bool,
    /// Container for the media (mkv, avi...). "" if none.
    pub container: String,
    pub repack: bool,
    pub widescreen: bool,
    /// Release website. "" if none.
    pub website: String,
    pub unrated: bool,
    /// Media size (900MB, 1.3GB). "" if none.
    pub size: String,
    pub three_d: bool,

    /// Tokens that couldn't be attributed to any known field.
    pub rest: Vec<String>,
}

/// Parses a release name, extracting the information in it.
pub fn parse(name: &str) -> Information {
    let mut info = Information::default();
    let mut spans: Vec<Interval> = Vec::new();

    // The season and episode matchers only consume their numeric part if
    // it parses; a failed conversion leaves the field absent.
    if let Some(caps) = RE_SEASON.captures(name) {
        if let Ok(season) = caps[2].parse::<u32>() {
            info.season = season;
            push_span(&mut spans, caps.get(1).map(|m| (m.start(), m.end())));
        }
    }
    if let Some(caps) = RE_EPISODE.captures(name) {
        if let Ok(episode) = caps[2].parse::<u32>() {
            info.episode = episode;
            push_span(&mut spans, caps.get(1).map(|m| (m.start(), m.end())));
        }
    }

    // Release names may embed an earlier year in the title, so the last
    // occurrence wins.
    if let Some(m) = RE_YEAR.find_iter(name).last() {
        if let Ok(year) = m.as_str().parse::<u32>() {
            info.year = year;
            push_span(&mut spans, Some((m.start(), m.end())));
        }
    }

    info.resolution = match_field(&RE_RESOLUTION, name, &mut spans);
    info.release = match_field(&RE_RELEASE, name, &mut spans);
    info.video_codec = match_field(&RE_VIDEO_CODEC, name, &mut spans);
    info.audio_codec = match_field(&RE_AUDIO_CODEC, name, &mut spans);

    if let Some(caps) = RE_GROUP.captures(name) {
        info.group = caps[2].to_string();
        push_span(&mut spans, caps.get(1).map(|m| (m.start(), m.end())));
    }

    info.region = match_field(&RE_REGION, name, &mut spans);

    // For boolean attributes we just need to find a match.
    info.extended = match_flag(&RE_EXTENDED, name, &mut spans);
    info.remastered = match_flag(&RE_REMASTERED, name, &mut spans);
    info.theatrical = match_flag(&RE_THEATRICAL, name, &mut spans);
    info.directors_cut = match_flag(&RE_DIRECTORS_CUT, name, &mut spans);
    info.hardcoded = match_flag(&RE_HARDCODED, name, &mut spans);
    info.proper = match_flag(&RE_PROPER, name, &mut spans);

    info.container = match_field(&RE_CONTAINER, name, &mut spans);

    info.repack = match_flag(&RE_REPACK, name, &mut spans);
    info.widescreen = match_flag(&RE_WIDESCREEN, name, &mut spans);

    // The website tag must anchor at the start of the name.
    if let Some(caps) = RE_WEBSITE.captures(name) {
        info.website = caps[2].to_string();
        push_span(&mut spans, caps.get(1).map(|m| (m.start(), m.end())));
    }

    info.unrated = match_flag(&RE_UNRATED, name, &mut spans);
    info.size = match_field(&RE_SIZE, name, &mut spans);
    info.three_d = match_flag(&RE_THREE_D, name, &mut spans);

    // Remove every character that was part of a match, then clean up the
    // residue into a title.
    let spans = join_intervals(spans);
    let stripped = strip_string(name, &spans);

    let cleaned = stripped
        .replace("()", "  ")
        .replace("[]", "  ")
        .replace('_', " ");
    let cleaned = cleaned.trim_matches(|c| c == ' ' || c == '\r' || c == '\t' || c == '\n');

    // Periods used as word separators become spaces, but a genuine
    // two-or-more-character token protects itself: single letters keep
    // their separators (S.H.I.E.L.D stays intact).
    let cleaned = RE_DOTS_LEFT.replace_all(cleaned, " $2");
    let cleaned = RE_DOTS_RIGHT.replace_all(&cleaned, "$1 ");

    // The first run of two or more separators ends the title; everything
    // after it couldn't be interpreted.
    match RE_TWO_SEPARATORS.find(&cleaned) {
        Some(m) => {
            info.rest = cleaned[m.start()..]
                .split_whitespace()
                .map(str::to_string)
                .collect();
            info.title = cleaned[..m.start()].to_string();
        }
        None => info.title = cleaned.to_string(),
    }

    info
}

/// Records the whole-match span and returns the matched text, or "" on
/// no match.
fn match_field(re: &Regex, name: &str, spans: &mut Vec<Interval>) -> String {
    match re.find(name) {
        Some(m) => {
            spans.push(Interval::new(m.start(), m.end()));
            m.as_str().to_string()
        }
        None => String::new(),
    }
}

/// True iff the pattern matches anywhere; the matched span is consumed.
fn match_flag(re: &Regex, name: &str, spans: &mut Vec<Interval>) -> bool {
    match re.find(name) {
        Some(m) => {
            spans.push(Interval::new(m.start(), m.end()));
            true
        }
        None => false,
    }
}

fn push_span(spans: &mut Vec<Interval>, span: Option<(usize, usize)>) {
    if let Some((start, end)) = span {
        spans.push(Interval::new(start, end));
    }
}
