use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PayrollStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payroll")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub month: i16,
    pub year: i16,
    pub status: PayrollStatus,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_gross_salary: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_benefits: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_deductions: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_net_salary: Decimal,
    pub employee_count: i32,
    pub processed_at: Option<DateTimeWithTimeZone>,
    pub processed_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payslip::Entity")]
    Payslip,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ProcessedBy",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    User,
}

impl Related<super::payslip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payslip.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
