pub mod import_decision;
pub mod import_outcome;
pub mod key;
pub mod key_record;
pub mod run_report;
