//! Rule stages and the rule-file loader.
//!
//! A rule file is a newline-delimited list of glob patterns grouped under
//! `[include]` and `[exclude]` markers. Every marker opens a new [`Stage`];
//! the stages of all loaded files, concatenated in load order, drive the
//! selection compiler.

pub mod loader;
pub mod stage;

pub use loader::LoadedRules;
pub use loader::load_rule_files;
pub use loader::parse_stages;
pub use stage::Polarity;
pub use stage::Rule;
pub use stage::Stage;
