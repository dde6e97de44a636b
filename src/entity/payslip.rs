use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PayslipStatus;

/// `employee_code`, `employee_name`, `department` and `position` are copied from the worker when
/// the payslip is created and are never re-synced.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payslip")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub payroll_id: Uuid,
    pub worker_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub employee_code: String,
    #[sea_orm(column_type = "Text")]
    pub employee_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub department: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub position: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub base_salary: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_benefits: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_deductions: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub net_salary: Decimal,
    pub status: PayslipStatus,
    pub payment_date: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::benefit::Entity")]
    Benefit,
    #[sea_orm(has_many = "super::deduction::Entity")]
    Deduction,
    #[sea_orm(
        belongs_to = "super::payroll::Entity",
        from = "Column::PayrollId",
        to = "super::payroll::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Payroll,
    #[sea_orm(
        belongs_to = "super::worker::Entity",
        from = "Column::WorkerId",
        to = "super::worker::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Worker,
}

impl Related<super::benefit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Benefit.def()
    }
}

impl Related<super::deduction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deduction.def()
    }
}

impl Related<super::payroll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payroll.def()
    }
}

impl Related<super::worker::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Worker.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
