use anyhow::Result;

use super::Matcher;
use crate::domain::models::{MediaKind, VideoTarget};
use crate::media::catalog::Catalog;
use crate::media::metadata::MetadataGuesser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    /// Wrong year, or wrong season/episode. Never an automatic winner.
    Disqualified,
    /// A folder record; holds a slot but is never selectable.
    Folder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub value: i32,
    pub verdict: Verdict,
}

impl Score {
    fn folder() -> Self {
        Self {
            value: 0,
            verdict: Verdict::Folder,
        }
    }

    fn disqualified(value: i32) -> Self {
        Self {
            value,
            verdict: Verdict::Disqualified,
        }
    }
}

const SIMPLIFIED_MARKERS: [&str; 3] = ["简体", "chs", ".gb."];
const TRADITIONAL_MARKERS: [&str; 3] = ["繁体", "cht", ".big5."];
const CHS_ENG_MARKERS: [&str; 2] = ["chs.eng", "chs&eng"];
const BILINGUAL_MARKERS: [&str; 4] = ["中英", "简英", "双语", "简体&英文"];

/// Score a decoded subtitle path against the video. Pure: same input, same score.
pub fn score(decoded_name: &str, target: &VideoTarget, guesser: &dyn MetadataGuesser) -> Score {
    let full = decoded_name.to_lowercase();
    if full.ends_with('/') {
        return Score::folder();
    }

    let base = full.rsplit('/').next().unwrap_or(&full);
    let sub = guesser.guess(base);
    let same_episode = target.season == sub.season && target.episode == sub.episode;

    if target.kind == MediaKind::Movie && target.year != sub.year {
        return Score::disqualified(0);
    }

    let mut value = if target.title == sub.title {
        if !same_episode {
            return Score::disqualified(0);
        }
        2
    } else if same_episode {
        2
    } else {
        return Score::disqualified(-2);
    };

    let has_any = |markers: &[&str]| markers.iter().any(|m| full.contains(m));
    if has_any(&SIMPLIFIED_MARKERS) {
        value += 5;
    }
    if has_any(&TRADITIONAL_MARKERS) {
        value += 3;
    }
    if has_any(&CHS_ENG_MARKERS) {
        value += 7;
    }
    if has_any(&BILINGUAL_MARKERS) {
        value += 9;
    }

    if full.contains("ass") || full.contains("ssa") {
        value += 2;
    }
    if full.contains("srt") {
        value += 1;
    }

    Score {
        value,
        verdict: Verdict::Eligible,
    }
}

/// Position of the strictly highest score; the earliest wins ties.
///
/// Without `query`, only an eligible positive score is accepted. With it,
/// the best non-folder candidate is returned whatever its score.
pub fn pick_winner(scores: &[Score], query: bool) -> Option<usize> {
    let mut best: Option<(usize, Score)> = None;
    for (pos, score) in scores.iter().enumerate() {
        if score.verdict == Verdict::Folder {
            continue;
        }
        if best.map_or(true, |(_, top)| score.value > top.value) {
            best = Some((pos, *score));
        }
    }

    let (pos, top) = best?;
    if !query && (top.value <= 0 || top.verdict != Verdict::Eligible) {
        return None;
    }
    Some(pos)
}

pub struct ScoreMatcher<'a> {
    pub guesser: &'a dyn MetadataGuesser,
    pub query: bool,
}

impl Matcher for ScoreMatcher<'_> {
    fn pick(&mut self, catalog: &Catalog, target: &VideoTarget) -> Result<Option<usize>> {
        if catalog.is_empty() {
            log::warn!("no subtitle in this archive");
            return Ok(None);
        }

        let scores: Vec<Score> = catalog
            .entries()
            .iter()
            .map(|entry| {
                if entry.is_directory {
                    Score::folder()
                } else {
                    score(&entry.decoded_path, target, self.guesser)
                }
            })
            .collect();
        for (entry, score) in catalog.entries().iter().zip(&scores) {
            log::debug!("{:>4} {:?} {}", score.value, score.verdict, entry.decoded_path);
        }

        Ok(pick_winner(&scores, self.query))
    }
}
