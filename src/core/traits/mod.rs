pub mod fetcher;
pub mod key_tool;
