use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::console::Console;
use crate::domain::error::SubtitleError;
use crate::domain::models::{
    BatchSummary, ExtractionPlan, FailureRecord, SelectionMode, Video, VideoTarget,
};
use crate::infra::packages::{PackageInfo, PackageSource};
use crate::media::archive::{ArchiveFormat, ArchiveReader};
use crate::media::catalog::list_subtitle_entries;
use crate::media::metadata::MetadataGuesser;
use crate::workflows::matchers::manual::ManualMatcher;
use crate::workflows::matchers::score::ScoreMatcher;
use crate::workflows::prompt::{Chooser, PackageChoice};
use crate::workflows::selector::select;
use crate::workflows::writer::{save_original_archive, write_plan, WritePolicy};

#[derive(Debug, Clone)]
pub struct Options {
    /// Let the user pick packages, and accept non-positive matches.
    pub query: bool,
    /// Let the user pick the subtitle inside each package.
    pub single: bool,
    /// Also keep the downloaded package.
    pub more: bool,
    /// Extract the .ass/.srt companion of the winner as well.
    pub both: bool,
    /// Replace subtitles that already exist.
    pub over: bool,
    /// Tag output names with the language tag.
    pub plex: bool,
    pub debug: bool,
    pub sub_num: usize,
    pub language_tag: String,
    pub max_archive_depth: usize,
}

struct Candidate {
    source: usize,
    info: PackageInfo,
}

pub struct GetSubtitles<'a> {
    options: Options,
    sources: Vec<Box<dyn PackageSource + 'a>>,
    guesser: &'a dyn MetadataGuesser,
    console: &'a Console,
    chooser: Option<&'a mut dyn Chooser>,
}

impl<'a> GetSubtitles<'a> {
    pub fn new(
        options: Options,
        sources: Vec<Box<dyn PackageSource + 'a>>,
        guesser: &'a dyn MetadataGuesser,
        console: &'a Console,
        chooser: Option<&'a mut dyn Chooser>,
    ) -> Self {
        Self {
            options,
            sources,
            guesser,
            console,
            chooser,
        }
    }

    fn mode(&self) -> SelectionMode {
        if self.options.single {
            SelectionMode::Manual
        } else if self.options.query {
            SelectionMode::Query
        } else {
            SelectionMode::Automatic
        }
    }

    /// Process every video. A failing video is recorded and the batch moves on.
    pub fn run(&mut self, videos: &[Video]) -> BatchSummary {
        let mut failures = Vec::new();

        for video in videos {
            println!();
            self.console.line(&video.name);
            self.console.line(video.video_dir.display());
            self.console.blank();

            if let Err(e) = self.process_video(video) {
                let mut error = e.to_string();
                if !self.options.debug {
                    error.push_str(" add --debug to get more info of the error");
                }
                self.console.error(&error);
                failures.push(FailureRecord {
                    name: video.name.clone(),
                    path: video.video_dir.display().to_string(),
                    error,
                    trace_back: format!("{e:?}"),
                });
            }
        }

        BatchSummary {
            total: videos.len(),
            success: videos.len() - failures.len(),
            fail: failures.len(),
            fail_videos: failures,
        }
    }

    fn process_video(&mut self, video: &Video) -> Result<()> {
        if video.has_subtitle && !self.options.over {
            self.console
                .line("subtitle already exists, add '-o' to replace it.");
            return Ok(());
        }

        let target = self.guesser.guess(&video.name);
        let mut packages = self.search(video)?;
        if packages.is_empty() {
            bail!("no search results.");
        }

        let mut extracted: Vec<PathBuf> = Vec::new();
        while extracted.is_empty() && !packages.is_empty() {
            let chosen = if self.options.query {
                let infos: Vec<PackageInfo> = packages.iter().map(|c| c.info.clone()).collect();
                let chooser = self
                    .chooser
                    .as_deref_mut()
                    .context("query mode needs an interactive chooser")?;
                match chooser.choose_packages(&infos)? {
                    PackageChoice::Abort => return Ok(()),
                    PackageChoice::Chosen(positions) => positions,
                }
            } else {
                vec![0]
            };

            for (i, candidate) in take_positions(&mut packages, &chosen).into_iter().enumerate() {
                if self.options.query {
                    self.console.blank();
                }
                match self.process_package(video, &target, &candidate, i == 0) {
                    Ok(Some(written)) => extracted.extend(written),
                    Ok(None) => self.console.line("no matched subtitle in this archive"),
                    Err(e) => {
                        self.console.error(format!("{e:#}"));
                        self.console.blank();
                    }
                }
            }
        }

        if extracted.is_empty() {
            bail!("failed to guess one subtitle, use '-q' to try query mode.");
        }
        Ok(())
    }

    /// Ask each source in turn until `sub_num` packages are collected.
    fn search(&self, video: &Video) -> Result<Vec<Candidate>> {
        let mut packages = Vec::new();
        let mut unreachable = 0;

        for (source, package_source) in self.sources.iter().enumerate() {
            match package_source.search(&video.name, self.options.sub_num) {
                Ok(found) => packages.extend(found.into_iter().map(|info| Candidate { source, info })),
                Err(SubtitleError::Download(message)) => {
                    unreachable += 1;
                    self.console
                        .line(format!("{}: {message}, search next site.", package_source.name()));
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
            if packages.len() >= self.options.sub_num {
                break;
            }
        }

        if !self.sources.is_empty() && unreachable == self.sources.len() {
            bail!("PLEASE CHECK YOUR NETWORK STATUS");
        }
        Ok(packages)
    }

    /// Fetch, walk and match one package, then write the result.
    /// `Ok(None)` means the package had nothing suitable.
    fn process_package(
        &mut self,
        video: &Video,
        target: &VideoTarget,
        candidate: &Candidate,
        first: bool,
    ) -> Result<Option<Vec<PathBuf>>> {
        let fetched = self.sources[candidate.source].fetch(&candidate.info)?;
        let declared = ArchiveFormat::from_tag(&fetched.format_tag)
            .ok_or_else(|| SubtitleError::UnsupportedFormat(fetched.format_tag.clone()))?;
        let reader = ArchiveReader::open_package(declared, &fetched.bytes)?;
        let format = reader.format();
        let mut catalog = list_subtitle_entries(reader, self.options.max_archive_depth)?;

        let plan = match self.mode() {
            SelectionMode::Manual => {
                let chooser = self
                    .chooser
                    .as_deref_mut()
                    .context("single mode needs an interactive chooser")?;
                select(&catalog, target, &mut ManualMatcher { chooser }, self.options.both)?
            }
            mode => {
                let mut matcher = ScoreMatcher {
                    guesser: self.guesser,
                    query: mode == SelectionMode::Query,
                };
                select(&catalog, target, &mut matcher, self.options.both)?
            }
        };
        if plan.is_empty() {
            return Ok(None);
        }

        if self.options.both {
            if let Some(other) = missing_companion(&plan) {
                self.console.line(format!("no {other} subtitles in this archive"));
            }
        }

        let policy = WritePolicy {
            rename: first,
            tag_output: self.options.plex,
            language_tag: self.options.language_tag.clone(),
            delete_stale: first,
        };
        let written = write_plan(&mut catalog, &plan, &video.store_dir, video.stem(), &policy)?;
        for file in &plan.files {
            self.console.line(&file.decoded_name);
        }

        if self.options.more {
            let base = if first {
                video.stem().to_string()
            } else {
                package_stem(&candidate.info.name)
            };
            save_original_archive(&video.store_dir, &base, format, &fetched.bytes)?;
            self.console.line("save original file.");
        }

        Ok(Some(written))
    }
}

/// The companion extension a lone .ass or .srt winner went without.
fn missing_companion(plan: &ExtractionPlan) -> Option<&'static str> {
    match plan.files.as_slice() {
        [only] => match only.extension.to_lowercase().as_str() {
            ".ass" => Some(".srt"),
            ".srt" => Some(".ass"),
            _ => None,
        },
        _ => None,
    }
}

/// Remove the packages at `positions` (typed order, duplicates ignored).
fn take_positions(packages: &mut Vec<Candidate>, positions: &[usize]) -> Vec<Candidate> {
    let mut wanted: Vec<usize> = Vec::new();
    for &pos in positions {
        if pos < packages.len() && !wanted.contains(&pos) {
            wanted.push(pos);
        }
    }

    let mut slots: Vec<Option<Candidate>> = packages.drain(..).map(Some).collect();
    let picked = wanted.iter().filter_map(|&pos| slots[pos].take()).collect();
    packages.extend(slots.into_iter().flatten());
    picked
}

fn package_stem(name: &str) -> String {
    match name.rfind('.') {
        Some(pos) if pos > 0 && ArchiveFormat::from_tag(&name[pos..]).is_some() => name[..pos].to_string(),
        _ => name.to_string(),
    }
}

pub fn print_summary(summary: &BatchSummary, debug: bool) {
    if !summary.fail_videos.is_empty() {
        print!("\n===============================");
        println!("FAILED LIST===============================\n");
        for (i, one) in summary.fail_videos.iter().enumerate() {
            println!("{:>2}. name: {}", i + 1, one.name);
            println!("{:>3} path: {}", "", one.path);
            println!("{:>3} info: {}", "", one.error);
            if debug {
                println!("{:>3} TRACE_BACK: {}", "", one.trace_back);
            }
        }
    }

    println!(
        "\ntotal: {}  success: {}  fail: {}\n",
        summary.total, summary.success, summary.fail
    );
}
