use anyhow::Result;

use crate::domain::models::VideoTarget;
use crate::media::catalog::Catalog;

/// Picks one catalog entry (by position) for a video, or none.
pub trait Matcher {
    fn pick(&mut self, catalog: &Catalog, target: &VideoTarget) -> Result<Option<usize>>;
}

pub mod manual;
pub mod score;
