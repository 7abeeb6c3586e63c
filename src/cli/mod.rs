pub mod accounts;
pub mod report;
pub mod setup;
pub mod ui;
