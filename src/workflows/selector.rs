use anyhow::Result;

use crate::domain::models::{ExtractionPlan, PlannedFile, VideoTarget};
use crate::media::catalog::{Catalog, CatalogEntry};
use crate::workflows::matchers::Matcher;

/// Ask `matcher` for the winning entry and build the plan around it. With
/// `dual_format`, an `.ass`/`.srt` sibling of the winner is added when the
/// catalog has one.
pub fn select(
    catalog: &Catalog,
    target: &VideoTarget,
    matcher: &mut dyn Matcher,
    dual_format: bool,
) -> Result<ExtractionPlan> {
    let Some(pos) = matcher.pick(catalog, target)? else {
        return Ok(ExtractionPlan::default());
    };
    let winner = &catalog.entries()[pos];
    let mut plan = ExtractionPlan {
        files: vec![planned(winner)],
    };

    if dual_format {
        match companion_path(&winner.logical_path).and_then(|path| catalog.get(&path)) {
            Some(companion) => plan.files.push(planned(companion)),
            None => log::info!("no companion format for '{}' in this archive", winner.decoded_base_name()),
        }
    }

    Ok(plan)
}

fn planned(entry: &CatalogEntry) -> PlannedFile {
    let name = entry.decoded_base_name();
    let extension = match name.rfind('.') {
        Some(pos) if pos > 0 => name[pos..].to_string(),
        _ => String::new(),
    };
    PlannedFile {
        logical_path: entry.logical_path.clone(),
        decoded_name: name.to_string(),
        extension,
    }
}

/// `a/b.ass` <-> `a/b.srt`, keeping an all-caps extension all-caps.
fn companion_path(logical_path: &str) -> Option<String> {
    let base_start = logical_path.rfind('/').map_or(0, |pos| pos + 1);
    let dot = base_start + logical_path[base_start..].rfind('.')?;
    let ext = &logical_path[dot + 1..];

    let other = match ext.to_lowercase().as_str() {
        "ass" => "srt",
        "srt" => "ass",
        _ => return None,
    };
    let other = if ext.chars().all(|c| c.is_ascii_uppercase()) {
        other.to_uppercase()
    } else {
        other.to_string()
    };
    Some(format!("{}.{other}", &logical_path[..dot]))
}
