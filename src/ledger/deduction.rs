use sea_orm::{
    prelude::{Decimal, Uuid},
    ActiveValue::{Set, Unchanged},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    entity::{deduction, prelude::*},
    error::{LedgerError, Result},
    utils::{self, deserialize_some},
};

use super::{
    payslip::LockedPayslip,
    LineItemChange,
};

#[derive(Debug, Deserialize)]
pub struct NewDeduction {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    pub value: Decimal,
    #[serde(default)]
    pub percentage: Option<Decimal>,
    #[serde(default)]
    pub is_required: bool,
}

impl NewDeduction {
    fn validate(&self) -> Result<()> {
        utils::require_text("code", &self.code)?;
        utils::require_text("type", &self.kind)?;
        utils::require_positive("value", self.value)?;
        validate_percentage(self.percentage)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeductionPatch {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    pub value: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub percentage: Option<Option<Decimal>>,
    pub is_required: Option<bool>,
}

impl DeductionPatch {
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
        validate_percentage(self.percentage.flatten())
    }
}

fn validate_percentage(percentage: Option<Decimal>) -> Result<()> {
    match percentage {
        Some(p) if p < Decimal::ZERO || p > Decimal::ONE_HUNDRED => {
            Err(LedgerError::Validation("`percentage` must be between 0 and 100".to_string()))
        }
        _ => Ok(()),
    }
}

async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<deduction::Model> {
    Deduction::find_by_id(id)
        .one(db).await?
        .ok_or_else(|| LedgerError::NotFound(format!("deduction `{id}` not found")))
}

pub async fn list(db: &DatabaseConnection, payslip_id: Uuid) -> Result<Vec<deduction::Model>> {
    super::payslip::find(db, payslip_id).await?;

    let deductions = Deduction::find()
        .filter(deduction::Column::PayslipId.eq(payslip_id))
        .order_by_asc(deduction::Column::Code)
        .all(db).await?;

    Ok(deductions)
}

pub async fn add(db: &DatabaseConnection, payslip_id: Uuid, input: NewDeduction) -> Result<LineItemChange<deduction::Model>> {
    input.validate()?;

    let locked = LockedPayslip::acquire(db.begin().await?, payslip_id).await?;
    let now = utils::now();

    let deduction = Deduction::insert(deduction::ActiveModel {
        created_at: Set(now),
        updated_at: Set(now),
        payslip_id: Set(locked.id()),
        code: Set(input.code),
        kind: Set(input.kind),
        description: Set(input.description),
        value: Set(input.value),
        percentage: Set(input.percentage),
        is_required: Set(input.is_required),
        ..Default::default()
    }).exec_with_returning(locked.txn()).await?;

    let payslip = locked.recompute_and_commit().await?;

    info!(%payslip_id, code = %deduction.code, value = %deduction.value, "deduction added");

    Ok(LineItemChange { item: deduction, payslip: Some(payslip) })
}

/// Totals are only recomputed when the patch carries a `value`
pub async fn update(db: &DatabaseConnection, id: Uuid, changes: DeductionPatch) -> Result<LineItemChange<deduction::Model>> {
    changes.validate()?;

    let txn = db.begin().await?;

    let current = find(&txn, id).await?;
    let locked = LockedPayslip::acquire(txn, current.payslip_id).await?;

    let deduction = Deduction::update(deduction::ActiveModel {
        id: Unchanged(id),
        updated_at: Set(utils::now()),
        code: utils::patch(changes.code),
        kind: utils::patch(changes.kind),
        description: utils::patch(changes.description),
        value: utils::patch(changes.value),
        percentage: utils::patch(changes.percentage),
        is_required: utils::patch(changes.is_required),
        ..Default::default()
    }).exec(locked.txn()).await?;

    let payslip = match changes.value {
        Some(_) => Some(locked.recompute_and_commit().await?),
        None => {
            locked.commit().await?;
            None
        }
    };

    info!(deduction_id = %id, payslip_id = %deduction.payslip_id, "deduction updated");

    Ok(LineItemChange { item: deduction, payslip })
}

pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<LineItemChange<deduction::Model>> {
    let txn = db.begin().await?;

    let deduction = find(&txn, id).await?;
    let locked = LockedPayslip::acquire(txn, deduction.payslip_id).await?;

    Deduction::delete_by_id(id).exec(locked.txn()).await?;

    let payslip = locked.recompute_and_commit().await?;

    info!(deduction_id = %id, payslip_id = %payslip.id, "deduction deleted");

    Ok(LineItemChange { item: deduction, payslip: Some(payslip) })
}
