pub mod check;
pub mod import;
pub mod init;
pub mod list;
