// src/models/program.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;

// --- Configuração financeira (somente leitura para o motor) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramFinancialConfig {
    pub program_id: i64,
    #[schema(example = "50.00")]
    pub colporter_percentage: Decimal,
    #[schema(example = "15.00")]
    pub leader_percentage: Decimal,
    #[schema(example = "20.00")]
    pub colporter_cash_advance_percentage: Decimal,
    #[schema(example = "20.00")]
    pub leader_cash_advance_percentage: Decimal,
    pub allow_budget_override: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramExpenseBudget {
    pub id: i64,
    pub program_id: i64,
    #[schema(example = "incentivos")]
    pub category: String,
    #[schema(example = "5000.00")]
    pub budget_amount: Decimal,
}

// Linha crua da tabela `bonification_configs`. O texto JSON nunca sai
// daqui sem passar por `SelectedProgramIds::parse`.
#[derive(Debug, Clone, FromRow)]
pub struct BonificationConfigRow {
    pub selected_program_ids: String,
}

// --- Lista tipada de programas vinculados ---

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgramIdsError {
    #[error("a lista de programas não é um JSON válido: {0}")]
    Malformed(String),
    #[error("a lista de programas está vazia")]
    Empty,
    #[error("id de programa inválido: {0}")]
    NotPositive(i64),
}

/// Programas cujas vendas e horas somam para a bonificação.
/// Sempre não vazia, sem repetição e com ids positivos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SelectedProgramIds(Vec<i64>);

impl SelectedProgramIds {
    /// Só o próprio programa (quando não há configuração).
    pub fn only(program_id: i64) -> Self {
        Self(vec![program_id])
    }

    pub fn new(ids: Vec<i64>) -> Result<Self, ProgramIdsError> {
        if ids.is_empty() {
            return Err(ProgramIdsError::Empty);
        }
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if id <= 0 {
                return Err(ProgramIdsError::NotPositive(id));
            }
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Ok(Self(unique))
    }

    /// Converte o texto gravado no banco (ex.: "[3, 7]").
    pub fn parse(raw: &str) -> Result<Self, ProgramIdsError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(raw)
            .map_err(|e| ProgramIdsError::Malformed(e.to_string()))?;

        let ids = values
            .iter()
            .map(|v| {
                v.as_i64()
                    .ok_or_else(|| ProgramIdsError::Malformed(format!("elemento não inteiro: {}", v)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(ids)
    }

    pub fn to_json(&self) -> String {
        serde_json::Value::from(self.0.clone()).to_string()
    }

    /// O primeiro programa define o percentual do colportor.
    pub fn first(&self) -> i64 {
        self.0[0]
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_json_list() {
        let ids = SelectedProgramIds::parse("[3, 7, 3]").unwrap();
        assert_eq!(ids.as_slice(), &[3, 7]);
        assert_eq!(ids.first(), 3);
    }

    #[test]
    fn rejects_non_integer_elements() {
        assert!(matches!(
            SelectedProgramIds::parse(r#"[1, "2"]"#),
            Err(ProgramIdsError::Malformed(_))
        ));
        assert!(matches!(
            SelectedProgramIds::parse("[1.5]"),
            Err(ProgramIdsError::Malformed(_))
        ));
        assert!(matches!(
            SelectedProgramIds::parse("{\"ids\": [1]}"),
            Err(ProgramIdsError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_empty_and_non_positive_ids() {
        assert_eq!(SelectedProgramIds::parse("[]"), Err(ProgramIdsError::Empty));
        assert_eq!(
            SelectedProgramIds::parse("[4, 0]"),
            Err(ProgramIdsError::NotPositive(0))
        );
        assert_eq!(
            SelectedProgramIds::new(vec![-2]),
            Err(ProgramIdsError::NotPositive(-2))
        );
    }

    #[test]
    fn serializes_back_to_the_stored_format() {
        let ids = SelectedProgramIds::new(vec![5, 9]).unwrap();
        assert_eq!(ids.to_json(), "[5,9]");
        assert_eq!(SelectedProgramIds::parse(&ids.to_json()).unwrap(), ids);
    }
}
