use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::formats::{SUB_FORMATS, VIDEO_FORMATS};
use crate::domain::models::{MediaKind, VideoTarget};

/// Infers title/season/episode/year from a release-style filename.
pub trait MetadataGuesser {
    fn guess(&self, filename: &str) -> VideoTarget;
}

static LEADING_TAGS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\s*[\[【][^\]】]*[\]】])+").unwrap());

static SXXEXX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bs(\d{1,2})\s?e(\d{1,3})\b").unwrap());

static NXNN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})x(\d{1,3})\b").unwrap());

static VERBOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bseason\s*(\d{1,2})\s*episode\s*(\d{1,3})\b").unwrap());

static SEASON_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bs(\d{1,2})\b").unwrap());

static EPISODE_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bep?(\d{1,3})\b").unwrap());

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());

/// Tokens that end a title: quality, source, codec and subtitle language tags.
static STOP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(2160p|1080[pi]|720p|576p|480p|4k|uhd|hdr|blu-?ray|bdrip|brrip|web-?dl|webrip|web|hdtv|dvdrip|x26[45]|h\s?26[45]|hevc|avc|aac|dts|chs|cht|eng|chn|gb|big5)\b",
    )
    .unwrap()
});

static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Regex guesser for scene-style names such as `Show.S01E03.720p.chs.srt`
/// or `Inception.2010.1080p.BluRay.mkv`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilenameGuesser;

impl MetadataGuesser for FilenameGuesser {
    fn guess(&self, filename: &str) -> VideoTarget {
        let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
        let stem = strip_media_extension(base);
        let stem = LEADING_TAGS_RE.replace(stem, "");
        let text = stem.replace(['.', '_'], " ");

        let mut cut = text.len();
        let mut season = None;
        let mut episode = None;

        if let Some(caps) = SXXEXX_RE
            .captures(&text)
            .or_else(|| VERBOSE_RE.captures(&text))
            .or_else(|| NXNN_RE.captures(&text))
        {
            season = caps.get(1).and_then(|m| m.as_str().parse().ok());
            episode = caps.get(2).and_then(|m| m.as_str().parse().ok());
            cut = cut.min(caps.get(0).map_or(cut, |m| m.start()));
        } else if let Some(caps) = SEASON_ONLY_RE.captures(&text) {
            season = caps.get(1).and_then(|m| m.as_str().parse().ok());
            cut = cut.min(caps.get(0).map_or(cut, |m| m.start()));
        } else if let Some(caps) = EPISODE_ONLY_RE.captures(&text) {
            episode = caps.get(1).and_then(|m| m.as_str().parse().ok());
            cut = cut.min(caps.get(0).map_or(cut, |m| m.start()));
        }

        // A leading year is part of the title ("2012.2009.mkv").
        let year_match = YEAR_RE.find_iter(&text).find(|m| m.start() > 0);
        let year = year_match.and_then(|m| m.as_str().parse().ok());
        if let Some(m) = year_match {
            cut = cut.min(m.start());
        }
        if let Some(m) = STOP_RE.find(&text) {
            cut = cut.min(m.start());
        }

        let title = clean_title(&text[..cut]);
        let kind = if season.is_some() || episode.is_some() {
            MediaKind::Episode
        } else if title.is_empty() {
            MediaKind::Unknown
        } else {
            MediaKind::Movie
        };

        VideoTarget {
            title,
            season,
            episode,
            year,
            kind,
        }
    }
}

fn strip_media_extension(name: &str) -> &str {
    if let Some(pos) = name.rfind('.') {
        let ext = name[pos..].to_lowercase();
        if SUB_FORMATS.contains(&ext.as_str()) || VIDEO_FORMATS.contains(&ext.as_str()) {
            return &name[..pos];
        }
    }
    name
}

fn clean_title(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || "-([{".contains(c));
    MULTI_SPACE_RE.replace_all(trimmed, " ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess(name: &str) -> VideoTarget {
        FilenameGuesser.guess(name)
    }

    #[test]
    fn test_episode_with_language_tag() {
        let info = guess("Show.S01E03.chs.srt");
        assert_eq!(info.title, "show");
        assert_eq!(info.season, Some(1));
        assert_eq!(info.episode, Some(3));
        assert_eq!(info.year, None);
        assert_eq!(info.kind, MediaKind::Episode);
    }

    #[test]
    fn test_episode_video_name() {
        let info = guess("The.Big.Bang.Theory.S12E24.720p.HDTV.x264-AVS.mkv");
        assert_eq!(info.title, "the big bang theory");
        assert_eq!(info.season, Some(12));
        assert_eq!(info.episode, Some(24));
        assert_eq!(info.kind, MediaKind::Episode);
    }

    #[test]
    fn test_movie_with_year() {
        let info = guess("Inception.2010.1080p.BluRay.x264.mkv");
        assert_eq!(info.title, "inception");
        assert_eq!(info.year, Some(2010));
        assert_eq!(info.season, None);
        assert_eq!(info.kind, MediaKind::Movie);
    }

    #[test]
    fn test_leading_year_stays_in_title() {
        let info = guess("2012.2009.BluRay.mkv");
        assert_eq!(info.title, "2012");
        assert_eq!(info.year, Some(2009));
    }

    #[test]
    fn test_group_tags_and_nxnn() {
        let info = guess("[YYeTs] Friends 3x07.ass");
        assert_eq!(info.title, "friends");
        assert_eq!(info.season, Some(3));
        assert_eq!(info.episode, Some(7));
    }

    #[test]
    fn test_directory_components_are_ignored() {
        let info = guess("Season 1/Show.S01E04.srt");
        assert_eq!(info.title, "show");
        assert_eq!(info.episode, Some(4));
    }

    #[test]
    fn test_empty_name_is_unknown() {
        let info = guess("chs.srt");
        assert_eq!(info.title, "");
        assert_eq!(info.kind, MediaKind::Unknown);
    }
}
