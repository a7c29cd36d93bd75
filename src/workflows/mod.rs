pub mod getsub;
pub mod matchers;
pub mod prompt;
pub mod selector;
pub mod writer;
