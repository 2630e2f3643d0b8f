// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::settlement;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Transactions ---
        handlers::transactions::create_transaction,
        handlers::transactions::list_transactions,
        handlers::transactions::get_transaction,
        handlers::transactions::update_transaction,
        handlers::transactions::approve_transaction,
        handlers::transactions::reject_transaction,

        // --- Earnings ---
        handlers::earnings::get_earnings,

        // --- Expenses ---
        handlers::expenses::create_expense,
        handlers::expenses::list_expenses,
        handlers::expenses::create_distribution,
        handlers::expenses::approve_expense,
        handlers::expenses::reject_expense,
        handlers::expenses::budget_status,

        // --- Charges ---
        handlers::charges::create_charge,
        handlers::charges::list_charges,
        handlers::charges::apply_charge,
        handlers::charges::cancel_charge,

        // --- Cash Advances ---
        handlers::advances::request_advance,
        handlers::advances::list_advances,
        handlers::advances::approve_advance,
        handlers::advances::reject_advance,

        // --- Bonifications ---
        handlers::bonifications::get_bonification,
        handlers::bonifications::list_bonifications,
        handlers::bonifications::get_config,
        handlers::bonifications::save_config,
        handlers::bonifications::record_hours,

        // --- Reports ---
        handlers::reports::program_report,
        handlers::reports::people_report,
    ),
    components(
        schemas(
            // Payloads
            handlers::transactions::CreateTransactionPayload,
            handlers::transactions::UpdateTransactionPayload,
            handlers::expenses::CreateExpensePayload,
            handlers::expenses::DistributionPayload,
            handlers::charges::CreateChargePayload,
            handlers::advances::RequestAdvancePayload,
            handlers::bonifications::SaveConfigPayload,
            handlers::bonifications::RecordHoursPayload,
            models::transaction::BookLineInput,
            settlement::distribution::IncentiveShare,

            // Transações
            models::status::ApprovalStatus,
            models::transaction::PaymentAmounts,
            models::transaction::Transaction,
            models::transaction::TransactionBookLine,
            models::transaction::TransactionDetail,
            models::transaction::InventoryShortfall,
            models::transaction::TransitionOutcome,

            // Ganhos
            models::earnings::EarningsReport,
            models::earnings::CommissionSummary,
            models::earnings::Deductions,
            models::earnings::BookBreakdown,
            models::earnings::DayBucket,

            // Despesas
            models::expense::Expense,
            models::expense::ExpenseDetail,
            models::expense::ExpenseDistribution,
            models::expense::BudgetInfo,
            models::expense::BudgetStatus,

            // Cobranças e adiantamentos
            models::charge::ChargeStatus,
            models::charge::Charge,
            models::charge::ChargeDetail,
            models::advance::CashAdvance,
            models::advance::CashAdvanceDetail,

            // Bonificação
            models::bonification::Tier,
            models::bonification::NextTarget,
            models::bonification::TierProgress,
            models::bonification::BonificationStatus,
            models::bonification::BonificationConfig,
            models::bonification::WorkHours,
            models::program::SelectedProgramIds,

            // Relatórios
            models::person::PersonType,
            models::report::TopSeller,
            models::report::SalesTotals,
            models::report::DayRollup,
            models::report::WeekRollup,
            models::report::MonthRollup,
            models::report::ProgramReport,
            models::report::PersonRollup,
            models::report::PeopleReport,
        )
    ),
    tags(
        (name = "Transactions", description = "Vendas diárias e ciclo de aprovação"),
        (name = "Earnings", description = "Comissão e valor líquido por pessoa"),
        (name = "Expenses", description = "Despesas, orçamento e rateio de incentivos"),
        (name = "Charges", description = "Cobranças descontadas dos ganhos"),
        (name = "Cash Advances", description = "Adiantamentos semanais"),
        (name = "Bonifications", description = "Níveis SILVER e GOLD e horas trabalhadas"),
        (name = "Reports", description = "Consolidados por período e por pessoa"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/transactions/{id}/approve"));
        assert!(doc.paths.paths.contains_key("/api/expenses/distributions"));
        assert!(doc.paths.paths.contains_key("/api/hours"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
