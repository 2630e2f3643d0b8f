// src/models/transaction.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::status::ApprovalStatus;

// --- Valores por forma de pagamento ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAmounts {
    #[serde(default)]
    #[schema(example = "80.00")]
    pub cash: Decimal,
    #[serde(default)]
    #[schema(example = "0.00")]
    pub checks: Decimal,
    #[serde(default)]
    #[schema(example = "20.00")]
    pub atm_mobile: Decimal,
    #[serde(default)]
    #[schema(example = "0.00")]
    pub paypal: Decimal,
}

impl PaymentAmounts {
    /// total = cash + checks + atmMobile + paypal, sempre.
    pub fn total(&self) -> Decimal {
        self.cash + self.checks + self.atm_mobile + self.paypal
    }

    pub fn has_negative(&self) -> bool {
        [self.cash, self.checks, self.atm_mobile, self.paypal]
            .iter()
            .any(|v| v.is_sign_negative() && !v.is_zero())
    }

    /// Aplica uma edição parcial sobre os valores atuais.
    pub fn merge(&self, patch: &PaymentAmountsPatch) -> PaymentAmounts {
        PaymentAmounts {
            cash: patch.cash.unwrap_or(self.cash),
            checks: patch.checks.unwrap_or(self.checks),
            atm_mobile: patch.atm_mobile.unwrap_or(self.atm_mobile),
            paypal: patch.paypal.unwrap_or(self.paypal),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAmountsPatch {
    pub cash: Option<Decimal>,
    pub checks: Option<Decimal>,
    pub atm_mobile: Option<Decimal>,
    pub paypal: Option<Decimal>,
}

// --- Entidades ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub program_id: i64,
    pub student_id: i64,
    pub leader_id: i64,
    #[schema(example = "80.00")]
    pub cash: Decimal,
    #[schema(example = "0.00")]
    pub checks: Decimal,
    #[schema(example = "20.00")]
    pub atm_mobile: Decimal,
    #[schema(example = "0.00")]
    pub paypal: Decimal,
    #[schema(example = "100.00")]
    pub total: Decimal,
    #[schema(value_type = String, format = Date, example = "2025-06-02")]
    pub transaction_date: NaiveDate,
    pub status: ApprovalStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn amounts(&self) -> PaymentAmounts {
        PaymentAmounts {
            cash: self.cash,
            checks: self.checks,
            atm_mobile: self.atm_mobile,
            paypal: self.paypal,
        }
    }
}

// Linha de livro com o título do catálogo (o preço é o capturado na venda)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBookLine {
    pub id: i64,
    pub transaction_id: i64,
    pub book_id: i64,
    #[schema(example = "O Grande Conflito")]
    pub title: String,
    #[schema(example = 3)]
    pub quantity: i32,
    #[schema(example = "25.00")]
    pub price: Decimal,
}

// Transação com os nomes legíveis ao lado das FKs
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub transaction: Transaction,
    #[schema(example = "Ana Souza")]
    pub student_name: String,
    #[schema(example = "Carlos Lima")]
    pub leader_name: String,
    #[sqlx(skip)]
    pub books: Vec<TransactionBookLine>,
}

// --- Entradas do motor ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookLineInput {
    pub book_id: i64,
    #[schema(example = 2)]
    pub quantity: i32,
    /// Se omitido, usa o preço do programa (ou o do catálogo).
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub student_id: i64,
    pub leader_id: i64,
    pub transaction_date: NaiveDate,
    pub amounts: PaymentAmounts,
    pub books: Vec<BookLineInput>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionChanges {
    pub student_id: Option<i64>,
    pub leader_id: Option<i64>,
    pub transaction_date: Option<NaiveDate>,
    pub amounts: PaymentAmountsPatch,
    pub books: Option<Vec<BookLineInput>>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<ApprovalStatus>,
    pub student_id: Option<i64>,
    pub leader_id: Option<i64>,
}

// Resultado da rejeição: quanto do estorno de estoque foi absorvido pelo piso zero
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryShortfall {
    pub book_id: i64,
    pub requested: i64,
    pub previous_sold: i64,
    pub absorbed: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
    #[serde(flatten)]
    pub transaction: TransactionDetail,
    pub inventory_shortfalls: Vec<InventoryShortfall>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amounts(cash: i64, checks: i64, atm: i64, paypal: i64) -> PaymentAmounts {
        PaymentAmounts {
            cash: Decimal::new(cash, 2),
            checks: Decimal::new(checks, 2),
            atm_mobile: Decimal::new(atm, 2),
            paypal: Decimal::new(paypal, 2),
        }
    }

    #[test]
    fn total_is_the_sum_of_the_four_methods() {
        let a = amounts(8000, 1050, 2000, 199);
        assert_eq!(a.total(), Decimal::new(11249, 2));
    }

    #[test]
    fn merge_keeps_untouched_methods_and_total_follows() {
        let current = amounts(10000, 0, 5000, 0);
        let patch = PaymentAmountsPatch {
            checks: Some(Decimal::new(2500, 2)),
            atm_mobile: Some(Decimal::ZERO),
            ..Default::default()
        };
        let merged = current.merge(&patch);
        assert_eq!(merged.cash, Decimal::new(10000, 2));
        assert_eq!(merged.checks, Decimal::new(2500, 2));
        assert_eq!(merged.atm_mobile, Decimal::ZERO);
        assert_eq!(merged.total(), Decimal::new(12500, 2));
    }

    #[test]
    fn detects_negative_amounts() {
        assert!(!amounts(0, 0, 0, 0).has_negative());
        assert!(amounts(100, -1, 0, 0).has_negative());
    }
}
