pub mod advance;
pub mod auth;
pub mod bonification;
pub mod charge;
pub mod earnings;
pub mod expense;
pub mod person;
pub mod program;
pub mod report;
pub mod status;
pub mod transaction;
