pub mod gpg_key_tool;
