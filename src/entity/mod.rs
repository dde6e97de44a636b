pub mod prelude;

pub mod benefit;
pub mod deduction;
pub mod payroll;
pub mod payslip;
pub mod sea_orm_active_enums;
pub mod user;
pub mod worker;
