// src/settlement/transitions.rs

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{charge::ChargeStatus, status::ApprovalStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalAction {
    Approve,
    Reject,
}

/// O que acontece com o estoque (`program_books.sold`) numa transição.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryEffect {
    None,
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ApprovalStatus,
    pub to: ApprovalStatus,
    pub inventory: InventoryEffect,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("o registro já está aprovado")]
    AlreadyApproved,
    #[error("o registro já está rejeitado")]
    AlreadyRejected,
    #[error("um registro rejeitado não pode ser aprovado")]
    RejectedIsTerminal,
    #[error("a cobrança já foi aplicada")]
    AlreadyApplied,
    #[error("a cobrança já foi cancelada")]
    AlreadyCancelled,
}

/// PENDING -> APPROVED | REJECTED, APPROVED -> REJECTED. REJECTED é terminal.
pub fn plan_transition(
    from: ApprovalStatus,
    action: ApprovalAction,
) -> Result<Transition, TransitionError> {
    use ApprovalAction::*;
    use ApprovalStatus::*;

    let (to, inventory) = match (from, action) {
        (Pending, Approve) => (Approved, InventoryEffect::Increment),
        (Approved, Approve) => return Err(TransitionError::AlreadyApproved),
        (Rejected, Approve) => return Err(TransitionError::RejectedIsTerminal),
        (Pending, Reject) => (Rejected, InventoryEffect::None),
        (Approved, Reject) => (Rejected, InventoryEffect::Decrement),
        (Rejected, Reject) => return Err(TransitionError::AlreadyRejected),
    };

    Ok(Transition { from, to, inventory })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeAction {
    Apply,
    Cancel,
}

/// PENDING -> APPLIED | CANCELLED, APPLIED -> CANCELLED. CANCELLED é terminal.
pub fn plan_charge_transition(
    from: ChargeStatus,
    action: ChargeAction,
) -> Result<ChargeStatus, TransitionError> {
    match (from, action) {
        (ChargeStatus::Pending, ChargeAction::Apply) => Ok(ChargeStatus::Applied),
        (ChargeStatus::Applied, ChargeAction::Apply) => Err(TransitionError::AlreadyApplied),
        (ChargeStatus::Pending | ChargeStatus::Applied, ChargeAction::Cancel) => {
            Ok(ChargeStatus::Cancelled)
        }
        (ChargeStatus::Cancelled, _) => Err(TransitionError::AlreadyCancelled),
    }
}

/// Soma as quantidades por livro e aplica o sinal do efeito.
/// A ordem por `book_id` mantém a ordem dos locks estável entre requisições.
pub fn inventory_deltas(
    lines: impl IntoIterator<Item = (i64, i32)>,
    effect: InventoryEffect,
) -> Vec<(i64, i64)> {
    let sign = match effect {
        InventoryEffect::None => return Vec::new(),
        InventoryEffect::Increment => 1,
        InventoryEffect::Decrement => -1,
    };

    let mut per_book: BTreeMap<i64, i64> = BTreeMap::new();
    for (book_id, quantity) in lines {
        *per_book.entry(book_id).or_default() += i64::from(quantity);
    }

    per_book
        .into_iter()
        .filter(|(_, qty)| *qty != 0)
        .map(|(book_id, qty)| (book_id, sign * qty))
        .collect()
}

/// Aplica um delta com piso em zero. Retorna (novo valor, quanto foi absorvido).
pub fn apply_floored(current: i64, delta: i64) -> (i64, i64) {
    let raw = current + delta;
    if raw < 0 { (0, -raw) } else { (raw, 0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_approved_or_rejected() {
        let t = plan_transition(ApprovalStatus::Pending, ApprovalAction::Approve).unwrap();
        assert_eq!(t.to, ApprovalStatus::Approved);
        assert_eq!(t.inventory, InventoryEffect::Increment);

        let t = plan_transition(ApprovalStatus::Pending, ApprovalAction::Reject).unwrap();
        assert_eq!(t.to, ApprovalStatus::Rejected);
        assert_eq!(t.inventory, InventoryEffect::None);
    }

    #[test]
    fn approved_rejection_reverts_inventory() {
        let t = plan_transition(ApprovalStatus::Approved, ApprovalAction::Reject).unwrap();
        assert_eq!(t.from, ApprovalStatus::Approved);
        assert_eq!(t.to, ApprovalStatus::Rejected);
        assert_eq!(t.inventory, InventoryEffect::Decrement);
    }

    #[test]
    fn double_approval_and_double_rejection_conflict() {
        assert_eq!(
            plan_transition(ApprovalStatus::Approved, ApprovalAction::Approve),
            Err(TransitionError::AlreadyApproved)
        );
        assert_eq!(
            plan_transition(ApprovalStatus::Rejected, ApprovalAction::Reject),
            Err(TransitionError::AlreadyRejected)
        );
        assert_eq!(
            plan_transition(ApprovalStatus::Rejected, ApprovalAction::Approve),
            Err(TransitionError::RejectedIsTerminal)
        );
    }

    #[test]
    fn charge_lifecycle() {
        assert_eq!(
            plan_charge_transition(ChargeStatus::Pending, ChargeAction::Apply),
            Ok(ChargeStatus::Applied)
        );
        assert_eq!(
            plan_charge_transition(ChargeStatus::Applied, ChargeAction::Cancel),
            Ok(ChargeStatus::Cancelled)
        );
        assert_eq!(
            plan_charge_transition(ChargeStatus::Applied, ChargeAction::Apply),
            Err(TransitionError::AlreadyApplied)
        );
        assert_eq!(
            plan_charge_transition(ChargeStatus::Cancelled, ChargeAction::Apply),
            Err(TransitionError::AlreadyCancelled)
        );
    }

    #[test]
    fn deltas_are_grouped_per_book_and_signed() {
        let lines = vec![(7, 2), (3, 1), (7, 4)];
        assert_eq!(
            inventory_deltas(lines.clone(), InventoryEffect::Increment),
            vec![(3, 1), (7, 6)]
        );
        assert_eq!(
            inventory_deltas(lines.clone(), InventoryEffect::Decrement),
            vec![(3, -1), (7, -6)]
        );
        assert!(inventory_deltas(lines, InventoryEffect::None).is_empty());
    }

    #[test]
    fn approve_then_reject_restores_sold() {
        let lines = vec![(1, 3), (2, 5)];
        let mut sold: BTreeMap<i64, i64> = BTreeMap::from([(1, 10), (2, 0)]);
        let before = sold.clone();

        for (book, delta) in inventory_deltas(lines.clone(), InventoryEffect::Increment) {
            let entry = sold.entry(book).or_default();
            *entry = apply_floored(*entry, delta).0;
        }
        assert_eq!(sold[&1], 13);
        assert_eq!(sold[&2], 5);

        for (book, delta) in inventory_deltas(lines, InventoryEffect::Decrement) {
            let entry = sold.entry(book).or_default();
            let (next, absorbed) = apply_floored(*entry, delta);
            assert_eq!(absorbed, 0);
            *entry = next;
        }
        assert_eq!(sold, before);
    }

    #[test]
    fn floor_never_goes_negative() {
        assert_eq!(apply_floored(2, -5), (0, 3));
        assert_eq!(apply_floored(0, -1), (0, 1));
        assert_eq!(apply_floored(4, -4), (0, 0));
        assert_eq!(apply_floored(4, 2), (6, 0));
    }
}
