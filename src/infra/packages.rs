use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::SubtitleError;
use crate::domain::formats::extension_of;
use crate::media::archive::ArchiveFormat;
use crate::media::metadata::MetadataGuesser;

/// Language badges shown in the package list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Languages(u8);

impl Languages {
    pub const ENGLISH: u8 = 1;
    pub const TRADITIONAL: u8 = 2;
    pub const SIMPLIFIED: u8 = 4;
    pub const BILINGUAL: u8 = 8;

    pub fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Best-effort badges from a package name.
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        let mut bits = 0;
        if ["简", "chs", ".gb."].iter().any(|m| name.contains(m)) {
            bits |= Self::SIMPLIFIED;
        }
        if ["繁", "cht", ".big5."].iter().any(|m| name.contains(m)) {
            bits |= Self::TRADITIONAL;
        }
        if ["英", "eng"].iter().any(|m| name.contains(m)) {
            bits |= Self::ENGLISH;
        }
        if ["双语", "中英", "简英", "chs.eng", "chs&eng"].iter().any(|m| name.contains(m)) {
            bits |= Self::BILINGUAL;
        }
        Self(bits)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub id: String,
    pub languages: Languages,
}

#[derive(Debug, Clone)]
pub struct FetchedArchive {
    pub format_tag: String,
    pub bytes: Vec<u8>,
}

/// Where subtitle packages come from. Search results keep the source's order.
pub trait PackageSource {
    fn name(&self) -> &str;

    fn search(&self, video_name: &str, limit: usize) -> Result<Vec<PackageInfo>, SubtitleError>;

    fn fetch(&self, package: &PackageInfo) -> Result<FetchedArchive, SubtitleError>;
}

/// Archive files already on disk, given directly or found under directories.
pub struct LocalPackageSource<'a> {
    roots: Vec<PathBuf>,
    guesser: &'a dyn MetadataGuesser,
}

impl<'a> LocalPackageSource<'a> {
    pub fn new(roots: Vec<PathBuf>, guesser: &'a dyn MetadataGuesser) -> Self {
        Self { roots, guesser }
    }

    fn collect_archives(&self) -> Result<Vec<PathBuf>, SubtitleError> {
        let mut archives = Vec::new();
        for root in &self.roots {
            if root.is_file() {
                if is_archive(root) {
                    archives.push(root.clone());
                }
            } else if root.is_dir() {
                collect_archives_helper(root, &mut archives)
                    .map_err(|e| SubtitleError::Download(format!("{}: {e}", root.display())))?;
            } else {
                log::warn!("package location does not exist: {}", root.display());
            }
        }
        archives.sort();
        archives.dedup();
        Ok(archives)
    }
}

impl PackageSource for LocalPackageSource<'_> {
    fn name(&self) -> &str {
        "local"
    }

    /// Packages whose file name mentions the video's title come first.
    fn search(&self, video_name: &str, limit: usize) -> Result<Vec<PackageInfo>, SubtitleError> {
        let title = words_of(&self.guesser.guess(video_name).title);
        let (mut related, others): (Vec<PathBuf>, Vec<PathBuf>) =
            self.collect_archives()?.into_iter().partition(|path| {
                !title.is_empty() && words_of(&file_name(path)).contains(&title)
            });
        related.extend(others);

        Ok(related
            .into_iter()
            .take(limit)
            .map(|path| {
                let name = file_name(&path);
                PackageInfo {
                    languages: Languages::from_name(&name),
                    id: path.to_string_lossy().into_owned(),
                    name,
                }
            })
            .collect())
    }

    fn fetch(&self, package: &PackageInfo) -> Result<FetchedArchive, SubtitleError> {
        let path = Path::new(&package.id);
        let bytes = fs::read(path)
            .map_err(|e| SubtitleError::Download(format!("cannot read {}: {e}", path.display())))?;
        Ok(FetchedArchive {
            format_tag: extension_of(&package.name).unwrap_or_default(),
            bytes,
        })
    }
}

fn collect_archives_helper(dir_path: &Path, archives: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();
        if path.is_file() {
            if is_archive(&path) {
                archives.push(path);
            }
        } else if path.is_dir() {
            collect_archives_helper(&path, archives)?;
        }
    }
    Ok(())
}

fn is_archive(path: &Path) -> bool {
    extension_of(&file_name(path))
        .and_then(|ext| ArchiveFormat::from_tag(&ext))
        .is_some()
}

/// Lowercase words joined by single spaces; `.`, `_` and `-` separate words.
fn words_of(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| c.is_whitespace() || matches!(c, '.' | '_' | '-'))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::metadata::FilenameGuesser;
    use tempfile::TempDir;

    #[test]
    fn test_languages_from_name() {
        let langs = Languages::from_name("Show.S01E01.简体&英文.双语.zip");
        assert!(langs.has(Languages::SIMPLIFIED));
        assert!(langs.has(Languages::ENGLISH));
        assert!(langs.has(Languages::BILINGUAL));
        assert!(!langs.has(Languages::TRADITIONAL));
    }

    #[test]
    fn test_search_ranks_related_packages_first() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("aaa-other.zip"), b"x").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("show.s01e03.rar"), b"x").unwrap();
        fs::write(dir.join("notes.txt"), b"x").unwrap();

        let source = LocalPackageSource::new(vec![dir.to_path_buf()], &FilenameGuesser);
        let found = source.search("Show.S01E03.720p.mkv", 5).unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["show.s01e03.rar", "aaa-other.zip"]);

        let limited = source.search("Show.S01E03.720p.mkv", 1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_search_matches_multi_word_titles() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in ["A1.zip", "A2.zip", "A3.zip", "A4.zip", "A5.zip"] {
            fs::write(dir.join(name), b"x").unwrap();
        }
        fs::write(dir.join("The.Big.Bang.Theory.S12E24.zip"), b"x").unwrap();
        fs::write(dir.join("the_big_bang_theory_s12.rar"), b"x").unwrap();

        let source = LocalPackageSource::new(vec![dir.to_path_buf()], &FilenameGuesser);
        let found = source.search("The.Big.Bang.Theory.S12E24.720p.HDTV.mkv", 5).unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["The.Big.Bang.Theory.S12E24.zip", "the_big_bang_theory_s12.rar", "A1.zip", "A2.zip", "A3.zip"]
        );
    }

    #[test]
    fn test_words_of() {
        assert_eq!(words_of("The.Big_Bang-Theory  S12.zip"), "the big bang theory s12 zip");
        assert_eq!(words_of(""), "");
    }

    #[test]
    fn test_fetch_reports_format_from_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pack.7z");
        fs::write(&path, b"bytes").unwrap();

        let source = LocalPackageSource::new(vec![path], &FilenameGuesser);
        let package = source.search("anything.mkv", 5).unwrap().remove(0);
        let fetched = source.fetch(&package).unwrap();
        assert_eq!(fetched.format_tag, ".7z");
        assert_eq!(fetched.bytes, b"bytes");
    }

    #[test]
    fn test_fetch_missing_file_is_download_error() {
        let source = LocalPackageSource::new(Vec::new(), &FilenameGuesser);
        let package = PackageInfo {
            name: "gone.zip".to_string(),
            id: "/definitely/not/here/gone.zip".to_string(),
            languages: Languages::default(),
        };
        assert!(matches!(source.fetch(&package), Err(SubtitleError::Download(_))));
    }
}
