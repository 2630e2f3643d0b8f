pub mod advance_service;
pub mod auth;
pub mod bonification_service;
pub mod charge_service;
pub mod earnings_service;
pub mod expense_service;
pub mod report_service;
pub mod transaction_service;
