pub mod armor_parser;
pub mod colons_parser;
pub mod import_result_parser;
