//! Payroll ledger operations.
//!
//! Every read-modify-write runs inside one transaction that first locks the parent row
//! (`SELECT ... FOR UPDATE`), so concurrent line-item edits on the same payslip serialize
//! instead of overwriting each other's totals.

use serde::Serialize;

pub mod benefit;
pub mod deduction;
pub mod payroll;
pub mod payslip;
pub mod status;
pub mod totals;
pub mod worker;

/// A line item after a mutation, with its payslip when the totals were recomputed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItemChange<T> {
    pub item: T,
    pub payslip: Option<crate::entity::payslip::Model>,
}

#[cfg(test)]
pub(crate) mod fixtures;
