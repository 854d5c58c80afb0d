pub mod key_importer;
