pub mod advance_repo;
pub use advance_repo::CashAdvanceRepository;
pub mod bonification_repo;
pub use bonification_repo::BonificationRepository;
pub mod charge_repo;
pub use charge_repo::ChargeRepository;
pub mod expense_repo;
pub use expense_repo::ExpenseRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod person_repo;
pub use person_repo::PersonRepository;
pub mod program_repo;
pub use program_repo::ProgramRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
pub mod transaction_repo;
pub use transaction_repo::TransactionRepository;
