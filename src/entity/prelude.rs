pub use super::benefit::Entity as Benefit;
pub use super::deduction::Entity as Deduction;
pub use super::payroll::Entity as Payroll;
pub use super::payslip::Entity as Payslip;
pub use super::user::Entity as User;
pub use super::worker::Entity as Worker;
