pub const SUB_FORMATS: [&str; 4] = [".ass", ".srt", ".ssa", ".sub"];

pub const VIDEO_FORMATS: [&str; 17] = [
    ".mkv", ".mp4", ".avi", ".rmvb", ".rm", ".mov", ".wmv", ".flv", ".ts", ".m2ts", ".webm",
    ".mpg", ".mpeg", ".m4v", ".3gp", ".vob", ".iso",
];

/// Lowercase extension of the last path segment, with the leading dot.
pub fn extension_of(name: &str) -> Option<String> {
    let base = name.rsplit('/').next().unwrap_or(name);
    match base.rfind('.') {
        Some(pos) if pos > 0 => Some(base[pos..].to_lowercase()),
        _ => None,
    }
}

pub fn is_subtitle(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| SUB_FORMATS.contains(&ext.as_str()))
}

pub fn is_video(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| VIDEO_FORMATS.contains(&ext.as_str()))
}
