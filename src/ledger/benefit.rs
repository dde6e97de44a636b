use sea_orm::{
    prelude::{Decimal, Uuid},
    ActiveValue::{Set, Unchanged},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    entity::{benefit, prelude::*},
    error::{LedgerError, Result},
    utils::{self, deserialize_some},
};

use super::{
    payslip::LockedPayslip,
    LineItemChange,
};

#[derive(Debug, Deserialize)]
pub struct NewBenefit {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    pub value: Decimal,
}

impl NewBenefit {
    fn validate(&self) -> Result<()> {
        utils::require_text("code", &self.code)?;
        utils::require_text("type", &self.kind)?;
        utils::require_positive("value", self.value)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BenefitPatch {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    pub value: Option<Decimal>,
}

impl BenefitPatch {
    fn validate(&self) -> Result<()> {
        if let Some(code) = &self.code {
            utils::require_text("code", code)?;
        }
        if let Some(kind) = &self.kind {
            utils::require_text("type", kind)?;
        }
        if let Some(value) = self.value {
            utils::require_positive("value", value)?;
        }

        Ok(())
    }
}

async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<benefit::Model> {
    Benefit::find_by_id(id)
        .one(db).await?
        .ok_or_else(|| LedgerError::NotFound(format!("benefit `{id}` not found")))
}

pub async fn list(db: &DatabaseConnection, payslip_id: Uuid) -> Result<Vec<benefit::Model>> {
    super::payslip::find(db, payslip_id).await?;

    let benefits = Benefit::find()
        .filter(benefit::Column::PayslipId.eq(payslip_id))
        .order_by_asc(benefit::Column::Code)
        .all(db).await?;

    Ok(benefits)
}

pub async fn add(db: &DatabaseConnection, payslip_id: Uuid, input: NewBenefit) -> Result<LineItemChange<benefit::Model>> {
    input.validate()?;

    let locked = LockedPayslip::acquire(db.begin().await?, payslip_id).await?;
    let now = utils::now();

    let benefit = Benefit::insert(benefit::ActiveModel {
        created_at: Set(now),
        updated_at: Set(now),
        payslip_id: Set(locked.id()),
        code: Set(input.code),
        kind: Set(input.kind),
        description: Set(input.description),
        value: Set(input.value),
        ..Default::default()
    }).exec_with_returning(locked.txn()).await?;

    let payslip = locked.recompute_and_commit().await?;

    info!(%payslip_id, code = %benefit.code, value = %benefit.value, "benefit added");

    Ok(LineItemChange { item: benefit, payslip: Some(payslip) })
}

pub async fn update(db: &DatabaseConnection, id: Uuid, changes: BenefitPatch) -> Result<LineItemChange<benefit::Model>> {
    changes.validate()?;

    let txn = db.begin().await?;

    let current = find(&txn, id).await?;
    let locked = LockedPayslip::acquire(txn, current.payslip_id).await?;

    let benefit = Benefit::update(benefit::ActiveModel {
        id: Unchanged(id),
        updated_at: Set(utils::now()),
        code: utils::patch(changes.code),
        kind: utils::patch(changes.kind),
        description: utils::patch(changes.description),
        value: utils::patch(changes.value),
        ..Default::default()
    }).exec(locked.txn()).await?;

    let payslip = match changes.value {
        Some(_) => Some(locked.recompute_and_commit().await?),
        None => {
            locked.commit().await?;
            None
        }
    };

    info!(benefit_id = %id, payslip_id = %benefit.payslip_id, "benefit updated");

    Ok(LineItemChange { item: benefit, payslip })
}

pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<LineItemChange<benefit::Model>> {
    let txn = db.begin().await?;

    let benefit = find(&txn, id).await?;
    let locked = LockedPayslip::acquire(txn, benefit.payslip_id).await?;

    Benefit::delete_by_id(id).exec(locked.txn()).await?;

    let payslip = locked.recompute_and_commit().await?;

    info!(benefit_id = %id, payslip_id = %payslip.id, "benefit deleted");

    Ok(LineItemChange { item: benefit, payslip: Some(payslip) })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::{entity::{payslip, sea_orm_active_enums::PayslipStatus}, ledger::fixtures};

    use super::*;

    fn meal_voucher(value: Decimal) -> NewBenefit {
        NewBenefit {
            code: "VR".to_string(),
            kind: "MEAL".to_string(),
            description: None,
            value,
        }
    }

    #[test]
    fn test_new_benefit_validation() {
        assert!(meal_voucher(dec!(300)).validate().is_ok());
        assert!(matches!(meal_voucher(dec!(-5)).validate(), Err(LedgerError::Validation(_))));
    }

    #[actix_web::test]
    async fn test_add_to_cancelled_payslip() {
        let cancelled = fixtures::payslip(dec!(5000), dec!(0), dec!(0), PayslipStatus::Cancelled);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([ vec![ cancelled.clone() ] ])
            .into_connection();

        let result = add(&db, cancelled.id, meal_voucher(dec!(300))).await;
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
    }

    #[actix_web::test]
    async fn test_update_value_recomputes() {
        let draft = fixtures::payslip(dec!(5000), dec!(300), dec!(0), PayslipStatus::Draft);
        let voucher = fixtures::benefit(draft.id, "VR", dec!(300));
        let raised = benefit::Model { value: dec!(450), ..voucher.clone() };
        let recomputed = payslip::Model {
            total_benefits: dec!(450),
            net_salary: dec!(5450),
            ..draft.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([ vec![ voucher.clone() ] ])
            .append_query_results([ vec![ draft.clone() ] ])
            .append_query_results([ vec![ raised.clone() ] ])
            .append_query_results([ Vec::<crate::entity::deduction::Model>::new() ])
            .append_query_results([ vec![ raised.clone() ] ])
            .append_query_results([ vec![ recomputed.clone() ] ])
            .into_connection();

        let changes = BenefitPatch { value: Some(dec!(450)), ..Default::default() };
        let change = update(&db, voucher.id, changes).await.unwrap();
        assert_eq!(change.item, raised);
        assert_eq!(change.payslip, Some(recomputed));
    }

    #[actix_web::test]
    async fn test_delete_on_cancelled_payslip() {
        let cancelled = fixtures::payslip(dec!(5000), dec!(300), dec!(0), PayslipStatus::Cancelled);
        let voucher = fixtures::benefit(cancelled.id, "VR", dec!(300));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([ vec![ voucher.clone() ] ])
            .append_query_results([ vec![ cancelled ] ])
            .into_connection();

        let result = delete(&db, voucher.id).await;
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
    }

    #[actix_web::test]
    async fn test_delete_missing_benefit() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([ Vec::<benefit::Model>::new() ])
            .into_connection();

        let result = delete(&db, Uuid::new_v4()).await;
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }
}
