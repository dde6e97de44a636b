use chrono::{Local, NaiveDate};
use sea_orm::{prelude::{Decimal, Uuid}, Transaction, Value};

use crate::entity::{
    benefit, deduction, payroll, payslip,
    sea_orm_active_enums::{PayrollStatus, PayslipStatus, RoleType, WorkerStatus},
    user, worker,
};

pub(crate) fn admin() -> user::Model {
    user::Model {
        id: Uuid::new_v4(),
        created_at: Local::now().into(),
        updated_at: Local::now().into(),
        username: "admin".to_string(),
        password: Vec::new(),
        role: RoleType::Admin,
    }
}

pub(crate) fn worker(salary: Decimal, allowance: Option<Decimal>) -> worker::Model {
    worker::Model {
        id: Uuid::new_v4(),
        created_at: Local::now().into(),
        updated_at: Local::now().into(),
        employee_code: "E001".to_string(),
        cpf: "52998224725".to_string(),
        name: "Ana Souza".to_string(),
        email: Some("ana.souza@example.com".to_string()),
        contract_type: "CLT".to_string(),
        position: Some("Analyst".to_string()),
        department: Some("Finance".to_string()),
        salary,
        allowance,
        admission_date: NaiveDate::from_ymd_opt(2021, 2, 1).unwrap(),
        termination_date: None,
        status: WorkerStatus::Active,
    }
}

pub(crate) fn payroll(month: i16, year: i16, status: PayrollStatus) -> payroll::Model {
    payroll::Model {
        id: Uuid::new_v4(),
        created_at: Local::now().into(),
        updated_at: Local::now().into(),
        month,
        year,
        status,
        total_gross_salary: Decimal::ZERO,
        total_benefits: Decimal::ZERO,
        total_deductions: Decimal::ZERO,
        total_net_salary: Decimal::ZERO,
        employee_count: 0,
        processed_at: None,
        processed_by: None,
    }
}

pub(crate) fn payslip(base_salary: Decimal, total_benefits: Decimal, total_deductions: Decimal, status: PayslipStatus) -> payslip::Model {
    payslip::Model {
        id: Uuid::new_v4(),
        created_at: Local::now().into(),
        updated_at: Local::now().into(),
        payroll_id: Uuid::new_v4(),
        worker_id: Uuid::new_v4(),
        employee_code: "E001".to_string(),
        employee_name: "Ana Souza".to_string(),
        department: Some("Finance".to_string()),
        position: Some("Analyst".to_string()),
        base_salary,
        total_benefits,
        total_deductions,
        net_salary: base_salary + total_benefits - total_deductions,
        status,
        payment_date: None,
    }
}

pub(crate) fn deduction(payslip_id: Uuid, code: &str, value: Decimal) -> deduction::Model {
    deduction::Model {
        id: Uuid::new_v4(),
        created_at: Local::now().into(),
        updated_at: Local::now().into(),
        payslip_id,
        code: code.to_string(),
        kind: "TAX".to_string(),
        description: None,
        value,
        percentage: None,
        is_required: false,
    }
}

pub(crate) fn benefit(payslip_id: Uuid, code: &str, value: Decimal) -> benefit::Model {
    benefit::Model {
        id: Uuid::new_v4(),
        created_at: Local::now().into(),
        updated_at: Local::now().into(),
        payslip_id,
        code: code.to_string(),
        kind: code.to_string(),
        description: None,
        value,
    }
}

/// Bound values of the last `UPDATE "<table>"` written to the mock connection
pub(crate) fn last_update(log: &[Transaction], table: &str) -> Vec<Value> {
    let prefix = format!(r#"UPDATE "{table}""#);

    log.iter()
        .flat_map(|txn| txn.statements())
        .filter(|stmt| stmt.sql.starts_with(&prefix))
        .last()
        .and_then(|stmt| stmt.values.clone())
        .map(|values| values.0)
        .unwrap_or_else(|| panic!("no update on `{table}` was written"))
}
