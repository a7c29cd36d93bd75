use anyhow::Result;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::formats::{is_video, SUB_FORMATS};
use crate::domain::models::Video;

/// Turn the user's NAME argument into the list of videos to process.
///
/// `raw_path` may be a directory (walked recursively), an absolute video
/// path, or a bare video name. When `store_dir` is a valid directory,
/// subtitles go there and existing ones are looked up there.
pub fn discover(raw_path: &str, store_dir: Option<&Path>, language_tag: &str) -> Result<Vec<Video>> {
    let raw_path = raw_path.replace('"', "");
    let store_dir = store_dir.and_then(|dir| {
        let dir = absolute(dir);
        if dir.is_dir() {
            println!("subtitles will be saved to: {}", dir.display());
            Some(dir)
        } else {
            println!("store path is invalid: {}", dir.display());
            None
        }
    });
    let path = Path::new(&raw_path);

    if path.is_dir() {
        let mut videos = Vec::new();
        collect_videos_helper(&absolute(path), store_dir.as_deref(), language_tag, &mut videos)?;
        return Ok(videos);
    }

    if path.is_absolute() {
        let video_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| raw_path.clone());
        let store_dir = store_dir.unwrap_or_else(|| video_dir.clone());
        let existing = file_names_in(&store_dir);
        let has_subtitle = has_subtitle(&name, &existing, language_tag);
        return Ok(vec![Video {
            name,
            video_dir,
            store_dir,
            has_subtitle,
        }]);
    }

    // A bare name: nothing on disk to inspect.
    let store_dir = match store_dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };
    Ok(vec![Video {
        name: raw_path.clone(),
        video_dir: PathBuf::from(&raw_path),
        store_dir,
        has_subtitle: false,
    }])
}

fn collect_videos_helper(
    dir_path: &Path,
    store_dir: Option<&Path>,
    language_tag: &str,
    videos: &mut Vec<Video>,
) -> Result<()> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        } else if path.is_dir() {
            subdirs.push(path);
        }
    }
    files.sort();
    subdirs.sort();

    let target_dir = store_dir.map(Path::to_path_buf).unwrap_or_else(|| dir_path.to_path_buf());
    let existing = file_names_in(&target_dir);

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !is_video(&name) {
            continue;
        }
        videos.push(Video {
            has_subtitle: has_subtitle(&name, &existing, language_tag),
            name,
            video_dir: dir_path.to_path_buf(),
            store_dir: target_dir.clone(),
        });
    }

    for subdir in subdirs {
        collect_videos_helper(&subdir, store_dir, language_tag, videos)?;
    }
    Ok(())
}

/// `<stem><ext>` or the media-server variant `<stem>.<tag><ext>`.
fn has_subtitle(video_name: &str, existing: &HashSet<String>, language_tag: &str) -> bool {
    let stem = video_stem(video_name);
    SUB_FORMATS.iter().any(|ext| {
        existing.contains(&format!("{stem}{ext}"))
            || existing.contains(&format!("{stem}.{language_tag}{ext}"))
    })
}

fn video_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    }
}

fn file_names_in(dir: &Path) -> HashSet<String> {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
