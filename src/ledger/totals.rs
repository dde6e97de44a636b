use sea_orm::prelude::Decimal;

use crate::entity::{benefit, deduction, payslip};

pub fn net_salary(base_salary: Decimal, total_benefits: Decimal, total_deductions: Decimal) -> Decimal {
    base_salary + total_benefits - total_deductions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayslipTotals {
    pub total_benefits: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
}

impl PayslipTotals {
    /// Always a full re-sum of the current line items, never an adjustment of the stored totals.
    pub fn from_line_items(base_salary: Decimal, deductions: &[deduction::Model], benefits: &[benefit::Model]) -> Self {
        let total_deductions = deductions.iter().map(|d| d.value).sum();
        let total_benefits = benefits.iter().map(|b| b.value).sum();

        Self {
            total_benefits,
            total_deductions,
            net_salary: net_salary(base_salary, total_benefits, total_deductions),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayrollTotals {
    pub total_gross_salary: Decimal,
    pub total_benefits: Decimal,
    pub total_deductions: Decimal,
    pub total_net_salary: Decimal,
    pub employee_count: i32,
}

impl PayrollTotals {
    pub fn from_payslips<'a>(payslips: impl IntoIterator<Item = &'a payslip::Model>) -> Self {
        payslips.into_iter().fold(Self::default(), |acc, p| Self {
            total_gross_salary: acc.total_gross_salary + p.base_salary,
            total_benefits: acc.total_benefits + p.total_benefits,
            total_deductions: acc.total_deductions + p.total_deductions,
            total_net_salary: acc.total_net_salary + p.net_salary,
            employee_count: acc.employee_count + 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use sea_orm::prelude::Uuid;

    use crate::{entity::sea_orm_active_enums::PayslipStatus, ledger::fixtures::*};

    use super::*;

    #[test]
    fn test_net_salary() {
        assert_eq!(net_salary(dec!(5000), dec!(200), dec!(150)), dec!(5050));
        assert_eq!(net_salary(dec!(1000), dec!(0), dec!(1200.50)), dec!(-200.50));
    }

    #[test]
    fn test_payslip_totals_from_line_items() {
        let id = Uuid::new_v4();
        let deductions = [deduction(id, "INSS", dec!(150)), deduction(id, "IRRF", dec!(49.90))];
        let benefits = [benefit(id, "ALLOWANCE", dec!(200)), benefit(id, "VT", dec!(10.10))];

        let totals = PayslipTotals::from_line_items(dec!(5000), &deductions, &benefits);
        assert_eq!(totals.total_deductions, dec!(199.90));
        assert_eq!(totals.total_benefits, dec!(210.10));
        assert_eq!(totals.net_salary, dec!(5010.20));

        // Re-summing the same rows is idempotent
        assert_eq!(PayslipTotals::from_line_items(dec!(5000), &deductions, &benefits), totals);
    }

    #[test]
    fn test_payslip_totals_without_line_items() {
        let totals = PayslipTotals::from_line_items(dec!(5000), &[], &[]);
        assert_eq!(totals, PayslipTotals {
            total_benefits: dec!(0),
            total_deductions: dec!(0),
            net_salary: dec!(5000),
        });
    }

    #[test]
    fn test_payroll_totals_from_payslips() {
        let payslips = [
            payslip(dec!(5000), dec!(200), dec!(0), PayslipStatus::Draft),
            payslip(dec!(3000), dec!(0), dec!(120), PayslipStatus::Draft),
        ];

        let totals = PayrollTotals::from_payslips(&payslips);
        assert_eq!(totals, PayrollTotals {
            total_gross_salary: dec!(8000),
            total_benefits: dec!(200),
            total_deductions: dec!(120),
            total_net_salary: dec!(8080),
            employee_count: 2,
        });

        assert_eq!(PayrollTotals::from_payslips(std::iter::empty()), PayrollTotals::default());
    }
}
