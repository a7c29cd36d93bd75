pub mod packages;
pub mod videos;
