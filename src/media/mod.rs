pub mod archive;
pub mod catalog;
pub mod metadata;
pub mod names;
