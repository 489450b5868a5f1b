pub mod eol;
pub mod inventory;
pub mod report;
