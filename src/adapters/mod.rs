pub mod fetchers;
pub mod key_tools;
pub mod parsers;
