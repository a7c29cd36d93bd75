use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::error::SubtitleError;
use crate::domain::formats::SUB_FORMATS;
use crate::domain::models::{ExtractionPlan, PlannedFile};
use crate::media::archive::ArchiveFormat;
use crate::media::catalog::Catalog;

/// How extracted subtitles are named and what they replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePolicy {
    /// Name outputs after the video instead of keeping the archive's name.
    pub rename: bool,
    /// Insert `.<language_tag>` before the extension of renamed outputs.
    pub tag_output: bool,
    pub language_tag: String,
    /// Remove the video's existing subtitles before writing.
    pub delete_stale: bool,
}

pub fn output_name(file: &PlannedFile, video_stem: &str, policy: &WritePolicy) -> String {
    if !policy.rename {
        return sanitize_filename(&file.decoded_name);
    }
    if policy.tag_output {
        format!("{video_stem}.{}{}", policy.language_tag, file.extension)
    } else {
        format!("{video_stem}{}", file.extension)
    }
}

/// Delete `<stem><ext>` and `<stem>.<tag><ext>` for every subtitle extension.
pub fn remove_stale_subtitles(
    dest_dir: &Path,
    video_stem: &str,
    language_tag: &str,
) -> Result<Vec<PathBuf>, SubtitleError> {
    let mut removed = Vec::new();
    for ext in SUB_FORMATS {
        for name in [
            format!("{video_stem}{ext}"),
            format!("{video_stem}.{language_tag}{ext}"),
        ] {
            let path = dest_dir.join(name);
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| SubtitleError::write(&path, e))?;
                log::debug!("removed stale subtitle {}", path.display());
                removed.push(path);
            }
        }
    }
    Ok(removed)
}

/// Write every planned file into `dest_dir`. Files are written in place, so
/// an interrupted write leaves a partial file behind.
pub fn write_plan(
    catalog: &mut Catalog,
    plan: &ExtractionPlan,
    dest_dir: &Path,
    video_stem: &str,
    policy: &WritePolicy,
) -> Result<Vec<PathBuf>, SubtitleError> {
    ensure_directory(dest_dir)?;

    // Existing subtitles are only removed once every entry has been read.
    let contents = plan
        .files
        .iter()
        .map(|file| catalog.read(&file.logical_path))
        .collect::<Result<Vec<_>, _>>()?;

    if policy.delete_stale {
        remove_stale_subtitles(dest_dir, video_stem, &policy.language_tag)?;
    }

    let mut written = Vec::with_capacity(plan.files.len());
    for (file, data) in plan.files.iter().zip(contents) {
        let path = dest_dir.join(output_name(file, video_stem, policy));
        fs::write(&path, data).map_err(|e| SubtitleError::write(&path, e))?;
        written.push(path);
    }
    Ok(written)
}

/// Keep the downloaded package next to the subtitles.
pub fn save_original_archive(
    dest_dir: &Path,
    base_name: &str,
    format: ArchiveFormat,
    bytes: &[u8],
) -> Result<PathBuf, SubtitleError> {
    ensure_directory(dest_dir)?;
    let path = dest_dir.join(format!("{}{}", sanitize_filename(base_name), format.extension()));
    fs::write(&path, bytes).map_err(|e| SubtitleError::write(&path, e))?;
    Ok(path)
}

fn ensure_directory(dest_dir: &Path) -> Result<(), SubtitleError> {
    if dest_dir.is_dir() {
        return Ok(());
    }
    Err(SubtitleError::write(
        dest_dir,
        io::Error::new(io::ErrorKind::NotFound, "destination is not a directory"),
    ))
}

fn sanitize_filename(name: &str) -> String {
    // Remove or replace invalid filename characters
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::archive::ArchiveReader;
    use crate::media::catalog::list_subtitle_entries;
    use std::fs::File;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn catalog_with(files: &[(&str, &[u8])]) -> Catalog {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in files {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        let bytes = writer.finish().unwrap().into_inner();
        let reader = ArchiveReader::open(ArchiveFormat::Zip, bytes).unwrap();
        list_subtitle_entries(reader, 8).unwrap()
    }

    fn planned(path: &str, name: &str, ext: &str) -> PlannedFile {
        PlannedFile {
            logical_path: path.to_string(),
            decoded_name: name.to_string(),
            extension: ext.to_string(),
        }
    }

    fn policy(rename: bool, tag_output: bool, delete_stale: bool) -> WritePolicy {
        WritePolicy {
            rename,
            tag_output,
            language_tag: "zh".to_string(),
            delete_stale,
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Normal Name"), "Normal Name");
        assert_eq!(sanitize_filename("Name/With/Slashes"), "Name-With-Slashes");
        assert_eq!(sanitize_filename("Name:With:Colons"), "Name-With-Colons");
        assert_eq!(sanitize_filename("[字幕]Name?"), "[字幕]Name-");
        assert_eq!(sanitize_filename("  Trim Me  "), "Trim Me");
    }

    #[test]
    fn test_output_name() {
        let file = planned("sub/Show.S01E03.chs.srt", "Show.S01E03.chs.srt", ".srt");
        assert_eq!(output_name(&file, "Show.S01E03.720p", &policy(true, false, true)), "Show.S01E03.720p.srt");
        assert_eq!(output_name(&file, "Show.S01E03.720p", &policy(true, true, true)), "Show.S01E03.720p.zh.srt");
        assert_eq!(output_name(&file, "Show.S01E03.720p", &policy(false, true, true)), "Show.S01E03.chs.srt");
    }

    #[test]
    fn test_stale_subtitles_are_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("MovieName.srt"), b"old").unwrap();
        File::create(dir.join("MovieName.zh.srt")).unwrap();
        File::create(dir.join("MovieName.zh.ass")).unwrap();
        File::create(dir.join("Other.srt")).unwrap();

        let mut catalog = catalog_with(&[("MovieName.2019.chs.srt", b"new")]);
        let plan = ExtractionPlan {
            files: vec![planned("MovieName.2019.chs.srt", "MovieName.2019.chs.srt", ".srt")],
        };

        let written = write_plan(&mut catalog, &plan, dir, "MovieName", &policy(true, false, true)).unwrap();
        assert_eq!(written, vec![dir.join("MovieName.srt")]);
        assert_eq!(fs::read(dir.join("MovieName.srt")).unwrap(), b"new");
        assert!(!dir.join("MovieName.zh.srt").exists());
        assert!(!dir.join("MovieName.zh.ass").exists());
        assert!(dir.join("Other.srt").exists());
    }

    #[test]
    fn test_unreadable_entry_keeps_existing_subtitle() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("MovieName.srt"), b"old").unwrap();

        let mut catalog = catalog_with(&[("MovieName.2019.chs.srt", b"new")]);
        let plan = ExtractionPlan {
            files: vec![
                planned("MovieName.2019.chs.srt", "MovieName.2019.chs.srt", ".srt"),
                planned("unreadable.ass", "unreadable.ass", ".ass"),
            ],
        };

        let result = write_plan(&mut catalog, &plan, dir, "MovieName", &policy(true, false, true));
        assert!(matches!(result, Err(SubtitleError::MissingEntry(_))));
        assert_eq!(fs::read(dir.join("MovieName.srt")).unwrap(), b"old");
        assert!(!dir.join("MovieName.ass").exists());
    }

    #[test]
    fn test_keep_names_without_deleting() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        File::create(dir.join("MovieName.srt")).unwrap();

        let mut catalog = catalog_with(&[("pack/Alt.Name.ass", b"alt")]);
        let plan = ExtractionPlan {
            files: vec![planned("pack/Alt.Name.ass", "Alt.Name.ass", ".ass")],
        };

        let written = write_plan(&mut catalog, &plan, dir, "MovieName", &policy(false, false, false)).unwrap();
        assert_eq!(written, vec![dir.join("Alt.Name.ass")]);
        assert!(dir.join("MovieName.srt").exists());
    }

    #[test]
    fn test_missing_destination_is_write_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog_with(&[("a.srt", b"x")]);
        let plan = ExtractionPlan {
            files: vec![planned("a.srt", "a.srt", ".srt")],
        };

        let result = write_plan(
            &mut catalog,
            &plan,
            &temp_dir.path().join("missing"),
            "Video",
            &policy(true, false, true),
        );
        assert!(matches!(result, Err(SubtitleError::Write { .. })));
    }

    #[test]
    fn test_save_original_archive() {
        let temp_dir = TempDir::new().unwrap();
        let path = save_original_archive(temp_dir.path(), "[site] Show/pack", ArchiveFormat::Rar, b"raw").unwrap();
        assert_eq!(path, temp_dir.path().join("[site] Show-pack.rar"));
        assert_eq!(fs::read(path).unwrap(), b"raw");
    }
}
