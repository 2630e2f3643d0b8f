// src/settlement/commission.rs

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::{
    models::{
        earnings::{BookBreakdown, BookQuantityRow, CommissionSummary, DayBucket, SaleRow},
        person::PersonType,
        program::ProgramFinancialConfig,
    },
    settlement::{apply_percentage, book_size::BookSize},
};

pub const DEFAULT_COLPORTER_PERCENTAGE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
pub const DEFAULT_LEADER_PERCENTAGE: Decimal = Decimal::from_parts(15, 0, 0, false, 0);

/// Percentuais usados quando o programa não tem configuração financeira.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionDefaults {
    pub colporter: Decimal,
    pub leader: Decimal,
}

impl Default for CommissionDefaults {
    fn default() -> Self {
        Self {
            colporter: DEFAULT_COLPORTER_PERCENTAGE,
            leader: DEFAULT_LEADER_PERCENTAGE,
        }
    }
}

/// Ordem de resolução:
/// - líder: percentual individual ativo > config do programa > padrão (15)
/// - colportor: config do programa > padrão (50)
pub fn resolve_percentage(
    person_type: PersonType,
    leader_override: Option<Decimal>,
    config: Option<&ProgramFinancialConfig>,
    defaults: CommissionDefaults,
) -> Decimal {
    match person_type {
        PersonType::Leader => leader_override
            .or_else(|| config.map(|c| c.leader_percentage))
            .unwrap_or(defaults.leader),
        PersonType::Colporter => config
            .map(|c| c.colporter_percentage)
            .unwrap_or(defaults.colporter),
    }
}

pub fn book_breakdown(rows: &[BookQuantityRow]) -> BookBreakdown {
    rows.iter().fold(BookBreakdown::default(), |mut acc, row| {
        match BookSize::classify(row.catalog_price) {
            BookSize::Large => acc.large_books += row.quantity,
            BookSize::Small => acc.small_books += row.quantity,
        }
        acc.total_books += row.quantity;
        acc
    })
}

/// Agrupa as vendas por dia, em ordem cronológica.
pub fn day_buckets(sales: &[SaleRow]) -> Vec<DayBucket> {
    let mut per_day: BTreeMap<_, (Decimal, u32)> = BTreeMap::new();
    for sale in sales {
        let entry = per_day.entry(sale.transaction_date).or_insert((Decimal::ZERO, 0));
        entry.0 += sale.total;
        entry.1 += 1;
    }

    per_day
        .into_iter()
        .map(|(date, (total, transactions))| DayBucket { date, total, transactions })
        .collect()
}

/// Maior total; em empate fica o dia mais antigo.
pub fn best_day(days: &[DayBucket]) -> Option<DayBucket> {
    days.iter()
        .fold(None::<&DayBucket>, |best, day| match best {
            Some(b) if b.total >= day.total => Some(b),
            _ => Some(day),
        })
        .cloned()
}

/// Menor total entre os dias com venda; dias zerados não contam.
pub fn worst_day(days: &[DayBucket]) -> Option<DayBucket> {
    days.iter()
        .filter(|d| d.total > Decimal::ZERO)
        .fold(None::<&DayBucket>, |worst, day| match worst {
            Some(w) if w.total <= day.total => Some(w),
            _ => Some(day),
        })
        .cloned()
}

/// Bruto, líquido, livros e dias de uma pessoa no período.
/// `sales` deve conter apenas transações APPROVED.
pub fn summarize(
    sales: &[SaleRow],
    books: &[BookQuantityRow],
    percentage: Decimal,
) -> CommissionSummary {
    let gross: Decimal = sales.iter().map(|s| s.total).sum();
    let days = day_buckets(sales);

    CommissionSummary {
        gross,
        percentage,
        net: apply_percentage(gross, percentage),
        books: book_breakdown(books),
        best_day: best_day(&days),
        worst_day: worst_day(&days),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn sale(d: u32, total: i64) -> SaleRow {
        SaleRow { transaction_date: date(d), total: Decimal::new(total, 0) }
    }

    fn config(colporter: i64, leader: i64) -> ProgramFinancialConfig {
        ProgramFinancialConfig {
            program_id: 1,
            colporter_percentage: Decimal::new(colporter, 0),
            leader_percentage: Decimal::new(leader, 0),
            colporter_cash_advance_percentage: Decimal::new(20, 0),
            leader_cash_advance_percentage: Decimal::new(20, 0),
            allow_budget_override: false,
        }
    }

    #[test]
    fn colporter_with_two_approved_sales() {
        let cfg = config(50, 15);
        let pct = resolve_percentage(PersonType::Colporter, None, Some(&cfg), CommissionDefaults::default());
        let summary = summarize(&[sale(2, 100), sale(3, 50)], &[], pct);

        assert_eq!(summary.gross, Decimal::new(150, 0));
        assert_eq!(summary.percentage, Decimal::new(50, 0));
        assert_eq!(summary.net, Decimal::new(75, 0));
    }

    #[test]
    fn leader_override_beats_program_default() {
        let cfg = config(50, 15);
        let pct = resolve_percentage(
            PersonType::Leader,
            Some(Decimal::new(30, 0)),
            Some(&cfg),
            CommissionDefaults::default(),
        );
        assert_eq!(pct, Decimal::new(30, 0));
    }

    #[test]
    fn falls_back_to_defaults_without_config() {
        let defaults = CommissionDefaults::default();
        assert_eq!(
            resolve_percentage(PersonType::Leader, None, None, defaults),
            Decimal::new(15, 0)
        );
        assert_eq!(
            resolve_percentage(PersonType::Colporter, None, None, defaults),
            Decimal::new(50, 0)
        );

        let cfg = config(45, 12);
        assert_eq!(
            resolve_percentage(PersonType::Leader, None, Some(&cfg), defaults),
            Decimal::new(12, 0)
        );
        // o override de líder nunca vale para colportor
        assert_eq!(
            resolve_percentage(PersonType::Colporter, Some(Decimal::new(30, 0)), Some(&cfg), defaults),
            Decimal::new(45, 0)
        );
    }

    #[test]
    fn books_split_by_catalog_price() {
        let rows = vec![
            BookQuantityRow { catalog_price: Decimal::new(1999, 2), quantity: 4 },
            BookQuantityRow { catalog_price: Decimal::new(2000, 2), quantity: 3 },
            BookQuantityRow { catalog_price: Decimal::new(35, 0), quantity: 1 },
        ];
        let b = book_breakdown(&rows);
        assert_eq!(b.small_books, 4);
        assert_eq!(b.large_books, 4);
        assert_eq!(b.total_books, 8);
    }

    #[test]
    fn worst_day_skips_days_without_sales() {
        let sales = vec![sale(2, 0), sale(3, 80), sale(4, 30), sale(4, 10), sale(5, 120)];
        let summary = summarize(&sales, &[], Decimal::new(50, 0));

        assert_eq!(summary.days.len(), 4);
        assert_eq!(summary.days[2].total, Decimal::new(40, 0));
        assert_eq!(summary.days[2].transactions, 2);
        assert_eq!(summary.best_day.unwrap().date, date(5));
        assert_eq!(summary.worst_day.unwrap().date, date(4));
    }

    #[test]
    fn ties_keep_the_earliest_day() {
        let days = day_buckets(&[sale(9, 50), sale(7, 50), sale(8, 50)]);
        assert_eq!(best_day(&days).unwrap().date, date(7));
        assert_eq!(worst_day(&days).unwrap().date, date(7));
    }

    #[test]
    fn empty_period() {
        let summary = summarize(&[], &[], Decimal::new(50, 0));
        assert_eq!(summary.gross, Decimal::ZERO);
        assert_eq!(summary.net, Decimal::ZERO);
        assert!(summary.best_day.is_none());
        assert!(summary.worst_day.is_none());
    }
}
