// src/settlement/report.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::{
    models::{
        person::PersonType,
        report::{
            DayRollup, MonthRollup, PeopleReport, PersonRollup, ProgramReport,
            ReportBookLine, ReportTransactionRow, SalesTotals, TopSeller, WeekRollup,
        },
    },
    settlement::book_size::BookSize,
};

/// Segunda-feira da semana da data.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Primeiro e último dia do mês da data.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date - Duration::days(i64::from(date.day0()));
    let last = first
        .checked_add_months(Months::new(1))
        .map(|next| next - Duration::days(1))
        .unwrap_or(NaiveDate::MAX);
    (first, last)
}

/// Intervalo de segunda a domingo recortado pelo mês de `day`.
pub fn week_span_in_month(week_start: NaiveDate, day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (first, last) = month_bounds(day);
    (week_start.max(first), (week_start + Duration::days(6)).min(last))
}

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

// Acumulador de um nó da árvore (dia, semana, mês, pessoa ou total)
#[derive(Debug, Default)]
struct TotalsBuilder {
    totals: SalesTotals,
    // book_id -> (título, quantidade); ordenado por id para o desempate
    books: BTreeMap<i64, (String, i64)>,
}

impl TotalsBuilder {
    fn add(&mut self, row: &ReportTransactionRow, lines: &[&ReportBookLine]) {
        let t = &mut self.totals;
        t.cash += row.cash;
        t.checks += row.checks;
        t.atm_mobile += row.atm_mobile;
        t.paypal += row.paypal;
        t.total += row.total;
        t.transactions += 1;

        for line in lines {
            match BookSize::classify(line.catalog_price) {
                BookSize::Large => t.large_books += line.quantity,
                BookSize::Small => t.small_books += line.quantity,
            }
            let entry = self
                .books
                .entry(line.book_id)
                .or_insert_with(|| (line.title.clone(), 0));
            entry.1 += line.quantity;
        }
    }

    fn finish(self) -> SalesTotals {
        SalesTotals {
            top_seller: top_seller(&self.books),
            ..self.totals
        }
    }
}

/// Livro com a maior quantidade somada. Empate: o menor `book_id`.
pub fn top_seller(books: &BTreeMap<i64, (String, i64)>) -> Option<TopSeller> {
    books
        .iter()
        .filter(|(_, (_, qty))| *qty > 0)
        .fold(None::<(i64, &String, i64)>, |best, (id, (title, qty))| match best {
            Some((_, _, best_qty)) if best_qty >= *qty => best,
            _ => Some((*id, title, *qty)),
        })
        .map(|(book_id, title, quantity)| TopSeller {
            book_id,
            title: title.clone(),
            quantity,
        })
}

fn lines_by_transaction(lines: &[ReportBookLine]) -> HashMap<i64, Vec<&ReportBookLine>> {
    let mut map: HashMap<i64, Vec<&ReportBookLine>> = HashMap::new();
    for line in lines {
        map.entry(line.transaction_id).or_default().push(line);
    }
    map
}

#[derive(Default)]
struct WeekAcc {
    totals: TotalsBuilder,
    days: BTreeMap<NaiveDate, TotalsBuilder>,
}

#[derive(Default)]
struct MonthAcc {
    totals: TotalsBuilder,
    weeks: BTreeMap<NaiveDate, WeekAcc>,
}

/// Mês -> semana -> dia. As linhas devem ser só de transações APPROVED.
/// Uma semana que cruza a virada do mês aparece nos dois meses, cada uma
/// com os dias do seu mês e com `weekStart`/`weekEnd` recortados ao mês.
pub fn build_program_report(
    program_id: i64,
    from: NaiveDate,
    to: NaiveDate,
    rows: &[ReportTransactionRow],
    lines: &[ReportBookLine],
) -> ProgramReport {
    let lines = lines_by_transaction(lines);
    let empty = Vec::new();

    let mut overall = TotalsBuilder::default();
    let mut months: BTreeMap<String, MonthAcc> = BTreeMap::new();

    for row in rows {
        let tx_lines = lines.get(&row.id).unwrap_or(&empty);
        let date = row.transaction_date;

        overall.add(row, tx_lines);

        let month = months.entry(month_key(date)).or_default();
        month.totals.add(row, tx_lines);

        let week = month.weeks.entry(week_start(date)).or_default();
        week.totals.add(row, tx_lines);

        week.days.entry(date).or_default().add(row, tx_lines);
    }

    let months = months
        .into_iter()
        .map(|(month, acc)| MonthRollup {
            month,
            totals: acc.totals.finish(),
            weeks: acc
                .weeks
                .into_iter()
                .map(|(monday, week)| {
                    let (week_start, week_end) = match week.days.keys().next() {
                        Some(day) => week_span_in_month(monday, *day),
                        None => (monday, monday + Duration::days(6)),
                    };
                    WeekRollup {
                        week_start,
                        week_end,
                        totals: week.totals.finish(),
                        days: week
                            .days
                            .into_iter()
                            .map(|(date, day)| DayRollup { date, totals: day.finish() })
                            .collect(),
                    }
                })
                .collect(),
        })
        .collect();

    ProgramReport {
        program_id,
        from,
        to,
        totals: overall.finish(),
        months,
    }
}

/// Totais por colportor ou por líder, do maior total para o menor.
pub fn build_people_report(
    program_id: i64,
    person_type: PersonType,
    from: NaiveDate,
    to: NaiveDate,
    rows: &[ReportTransactionRow],
    lines: &[ReportBookLine],
) -> PeopleReport {
    let lines = lines_by_transaction(lines);
    let empty = Vec::new();

    let mut per_person: BTreeMap<i64, (String, TotalsBuilder)> = BTreeMap::new();
    for row in rows {
        let (person_id, name) = match person_type {
            PersonType::Colporter => (row.student_id, &row.student_name),
            PersonType::Leader => (row.leader_id, &row.leader_name),
        };
        let entry = per_person
            .entry(person_id)
            .or_insert_with(|| (name.clone(), TotalsBuilder::default()));
        entry.1.add(row, lines.get(&row.id).unwrap_or(&empty));
    }

    let mut people: Vec<PersonRollup> = per_person
        .into_iter()
        .map(|(person_id, (person_name, builder))| PersonRollup {
            person_id,
            person_name,
            totals: builder.finish(),
        })
        .collect();

    // sort estável: empates mantêm a ordem por id
    people.sort_by(|a, b| b.totals.total.cmp(&a.totals.total));

    PeopleReport {
        program_id,
        person_type,
        from,
        to,
        people,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn tx(id: i64, student: i64, leader: i64, on: NaiveDate, cash: i64, atm: i64) -> ReportTransactionRow {
        ReportTransactionRow {
            id,
            student_id: student,
            student_name: format!("Colportor {}", student),
            leader_id: leader,
            leader_name: format!("Líder {}", leader),
            transaction_date: on,
            cash: Decimal::new(cash, 0),
            checks: Decimal::ZERO,
            atm_mobile: Decimal::new(atm, 0),
            paypal: Decimal::ZERO,
            total: Decimal::new(cash + atm, 0),
        }
    }

    fn line(transaction_id: i64, book_id: i64, price_cents: i64, quantity: i64) -> ReportBookLine {
        ReportBookLine {
            transaction_id,
            book_id,
            title: format!("Livro {}", book_id),
            catalog_price: Decimal::new(price_cents, 2),
            quantity,
        }
    }

    #[test]
    fn weeks_start_on_monday() {
        // 2025-06-04 é quarta-feira
        assert_eq!(week_start(date(6, 4)), date(6, 2));
        assert_eq!(week_start(date(6, 2)), date(6, 2));
        assert_eq!(week_start(date(6, 8)), date(6, 2));
        assert_eq!(month_key(date(6, 8)), "2025-06");
    }

    #[test]
    fn nests_days_into_weeks_and_months() {
        let rows = vec![
            tx(1, 10, 1, date(5, 30), 100, 0),
            tx(2, 10, 1, date(6, 2), 40, 10),
            tx(3, 11, 1, date(6, 2), 60, 0),
            tx(4, 11, 1, date(6, 10), 20, 0),
        ];
        let lines = vec![line(2, 1, 2500, 2), line(3, 2, 1500, 5), line(4, 1, 2500, 1)];

        let report = build_program_report(7, date(5, 1), date(6, 30), &rows, &lines);

        assert_eq!(report.totals.total, Decimal::new(230, 0));
        assert_eq!(report.totals.cash, Decimal::new(220, 0));
        assert_eq!(report.totals.atm_mobile, Decimal::new(10, 0));
        assert_eq!(report.totals.transactions, 4);
        assert_eq!(report.totals.large_books, 3);
        assert_eq!(report.totals.small_books, 5);

        assert_eq!(report.months.len(), 2);
        let june = &report.months[1];
        assert_eq!(june.month, "2025-06");
        assert_eq!(june.totals.total, Decimal::new(130, 0));
        assert_eq!(june.weeks.len(), 2);
        assert_eq!(june.weeks[0].week_start, date(6, 2));
        assert_eq!(june.weeks[0].week_end, date(6, 8));
        assert_eq!(june.weeks[0].days.len(), 1);
        assert_eq!(june.weeks[0].days[0].totals.total, Decimal::new(110, 0));
        assert_eq!(june.weeks[0].days[0].totals.transactions, 2);
    }

    #[test]
    fn week_crossing_month_end_is_clamped_in_each_month() {
        // 2025-05-26 é segunda; a semana vai até domingo 2025-06-01
        let rows = vec![
            tx(1, 10, 1, date(5, 30), 100, 0),
            tx(2, 10, 1, date(6, 1), 40, 0),
        ];

        let report = build_program_report(7, date(5, 1), date(6, 30), &rows, &[]);

        let may = &report.months[0];
        assert_eq!(may.weeks.len(), 1);
        assert_eq!(may.weeks[0].week_start, date(5, 26));
        assert_eq!(may.weeks[0].week_end, date(5, 31));
        assert_eq!(may.weeks[0].totals.total, Decimal::new(100, 0));

        let june = &report.months[1];
        assert_eq!(june.weeks.len(), 1);
        assert_eq!(june.weeks[0].week_start, date(6, 1));
        assert_eq!(june.weeks[0].week_end, date(6, 1));
        assert_eq!(june.weeks[0].totals.total, Decimal::new(40, 0));
    }

    #[test]
    fn month_bounds_handle_december_and_leap_february() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(month_bounds(d(2025, 12, 15)), (d(2025, 12, 1), d(2025, 12, 31)));
        assert_eq!(month_bounds(d(2024, 2, 10)), (d(2024, 2, 1), d(2024, 2, 29)));
    }

    #[test]
    fn top_seller_tie_goes_to_lowest_book_id() {
        let rows = vec![tx(1, 10, 1, date(6, 2), 100, 0)];
        // inseridos fora de ordem: 9 aparece primeiro
        let lines = vec![line(1, 9, 1000, 3), line(1, 4, 3000, 3), line(1, 6, 3000, 1)];

        let report = build_program_report(1, date(6, 1), date(6, 30), &rows, &lines);
        let top = report.totals.top_seller.unwrap();
        assert_eq!(top.book_id, 4);
        assert_eq!(top.quantity, 3);
    }

    #[test]
    fn top_seller_sums_across_transactions() {
        let rows = vec![tx(1, 10, 1, date(6, 2), 50, 0), tx(2, 11, 1, date(6, 3), 50, 0)];
        let lines = vec![line(1, 1, 2500, 2), line(1, 2, 1000, 3), line(2, 1, 2500, 2)];

        let report = build_program_report(1, date(6, 1), date(6, 30), &rows, &lines);
        assert_eq!(report.totals.top_seller.unwrap().book_id, 1);
    }

    #[test]
    fn empty_period_has_no_top_seller() {
        let report = build_program_report(1, date(6, 1), date(6, 30), &[], &[]);
        assert!(report.months.is_empty());
        assert_eq!(report.totals, SalesTotals::default());
    }

    #[test]
    fn people_report_groups_by_role() {
        let rows = vec![
            tx(1, 10, 1, date(6, 2), 100, 0),
            tx(2, 11, 2, date(6, 2), 300, 0),
            tx(3, 10, 1, date(6, 3), 50, 0),
        ];
        let lines = vec![line(1, 1, 1999, 1), line(3, 1, 1999, 2)];

        let colporters = build_people_report(1, PersonType::Colporter, date(6, 1), date(6, 30), &rows, &lines);
        assert_eq!(colporters.people.len(), 2);
        assert_eq!(colporters.people[0].person_id, 11);
        assert_eq!(colporters.people[1].person_id, 10);
        assert_eq!(colporters.people[1].totals.total, Decimal::new(150, 0));
        assert_eq!(colporters.people[1].totals.small_books, 3);

        let leaders = build_people_report(1, PersonType::Leader, date(6, 1), date(6, 30), &rows, &lines);
        assert_eq!(leaders.people[0].person_id, 2);
        assert_eq!(leaders.people[1].person_name, "Líder 1");
    }
}
