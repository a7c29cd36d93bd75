use anyhow::Result;

use super::Matcher;
use crate::domain::models::VideoTarget;
use crate::media::catalog::Catalog;
use crate::workflows::prompt::Chooser;

/// Lets a human pick the entry; no scoring involved.
pub struct ManualMatcher<'a> {
    pub chooser: &'a mut dyn Chooser,
}

impl Matcher for ManualMatcher<'_> {
    fn pick(&mut self, catalog: &Catalog, _target: &VideoTarget) -> Result<Option<usize>> {
        if catalog.is_empty() {
            log::warn!("no subtitle in this archive");
            return Ok(None);
        }
        self.chooser.choose_entry(catalog).map(Some)
    }
}
