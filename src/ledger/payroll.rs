use sea_orm::{
    prelude::{DateTimeWithTimeZone, Decimal, Uuid},
    ActiveValue::{Set, Unchanged},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    consts::{ALLOWANCE_BENEFIT_CODE, PAYROLL_MONTHS, PAYROLL_YEARS},
    entity::{
        benefit, payroll, payslip, prelude::*,
        sea_orm_active_enums::{PayrollStatus, PayslipStatus},
    },
    error::{LedgerError, Result},
    utils,
};

use super::totals::PayrollTotals;

#[derive(Debug, Serialize, Deserialize)]
pub struct NewPayroll {
    pub month: i16,
    pub year: i16,
}

impl NewPayroll {
    fn validate(&self) -> Result<()> {
        if !PAYROLL_MONTHS.contains(&self.month) {
            return Err(LedgerError::Validation("`month` must be between 1 and 12".to_string()));
        }
        if !PAYROLL_YEARS.contains(&self.year) {
            return Err(LedgerError::Validation(format!(
                "`year` must be between {} and {}",
                PAYROLL_YEARS.start(),
                PAYROLL_YEARS.end()
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ProcessOutcome {
    pub payroll: payroll::Model,
    pub payslips_created: u64,
}

pub(crate) async fn find<C: ConnectionTrait>(db: &C, payroll_id: Uuid) -> Result<payroll::Model> {
    Payroll::find_by_id(payroll_id)
        .one(db).await?
        .ok_or_else(|| LedgerError::NotFound(format!("payroll `{payroll_id}` not found")))
}

async fn lock<C: ConnectionTrait>(db: &C, payroll_id: Uuid) -> Result<payroll::Model> {
    Payroll::find_by_id(payroll_id)
        .lock_exclusive()
        .one(db).await?
        .ok_or_else(|| LedgerError::NotFound(format!("payroll `{payroll_id}` not found")))
}

fn totals_changed(payroll_id: Uuid, totals: PayrollTotals, now: DateTimeWithTimeZone) -> payroll::ActiveModel {
    payroll::ActiveModel {
        id: Unchanged(payroll_id),
        total_gross_salary: Set(totals.total_gross_salary),
        total_benefits: Set(totals.total_benefits),
        total_deductions: Set(totals.total_deductions),
        total_net_salary: Set(totals.total_net_salary),
        employee_count: Set(totals.employee_count),
        updated_at: Set(now),
        ..Default::default()
    }
}

fn allowance_benefit(payslip_id: Uuid, allowance: Decimal, now: DateTimeWithTimeZone) -> benefit::ActiveModel {
    benefit::ActiveModel {
        created_at: Set(now),
        updated_at: Set(now),
        payslip_id: Set(payslip_id),
        code: Set(ALLOWANCE_BENEFIT_CODE.to_string()),
        kind: Set(ALLOWANCE_BENEFIT_CODE.to_string()),
        description: Set(Some("Monthly allowance".to_string())),
        value: Set(allowance),
        ..Default::default()
    }
}

pub async fn get(db: &DatabaseConnection, payroll_id: Uuid) -> Result<payroll::Model> {
    find(db, payroll_id).await
}

/// Newest period first
pub async fn list(db: &DatabaseConnection, year: Option<i16>) -> Result<Vec<payroll::Model>> {
    let mut query = Payroll::find();

    if let Some(year) = year {
        query = query.filter(payroll::Column::Year.eq(year));
    }

    let payrolls = query
        .order_by_desc(payroll::Column::Year)
        .order_by_desc(payroll::Column::Month)
        .all(db).await?;

    Ok(payrolls)
}

pub async fn create(db: &DatabaseConnection, input: NewPayroll) -> Result<payroll::Model> {
    input.validate()?;

    let existing = Payroll::find()
        .filter(payroll::Column::Month.eq(input.month))
        .filter(payroll::Column::Year.eq(input.year))
        .one(db).await?;

    if existing.is_some() {
        return Err(LedgerError::Conflict(format!(
            "payroll for {:02}/{} already exists",
            input.month, input.year
        )));
    }

    let now = utils::now();

    let model = Payroll::insert(payroll::ActiveModel {
        created_at: Set(now),
        updated_at: Set(now),
        month: Set(input.month),
        year: Set(input.year),
        status: Set(PayrollStatus::Draft),
        total_gross_salary: Set(Decimal::ZERO),
        total_benefits: Set(Decimal::ZERO),
        total_deductions: Set(Decimal::ZERO),
        total_net_salary: Set(Decimal::ZERO),
        employee_count: Set(0),
        processed_at: Set(None),
        processed_by: Set(None),
        ..Default::default()
    }).exec_with_returning(db).await?;

    info!(payroll_id = %model.id, month = model.month, year = model.year, "payroll created");

    Ok(model)
}

pub async fn update_status(db: &DatabaseConnection, payroll_id: Uuid, status: PayrollStatus) -> Result<payroll::Model> {
    let txn = db.begin().await?;

    let payroll = lock(&txn, payroll_id).await?;

    if !payroll.status.can_transition_to(status) {
        return Err(LedgerError::InvalidState(format!(
            "payroll `{payroll_id}` cannot move from {:?} to {:?}",
            payroll.status, status
        )));
    }

    if payroll.status == status {
        debug!(%payroll_id, ?status, "payroll already in requested status");
        return Ok(payroll);
    }

    let model = Payroll::update(payroll::ActiveModel {
        id: Unchanged(payroll_id),
        status: Set(status),
        updated_at: Set(utils::now()),
        ..Default::default()
    }).exec(&txn).await?;

    txn.commit().await?;

    info!(%payroll_id, from = ?payroll.status, to = ?model.status, "payroll status changed");

    Ok(model)
}

pub async fn delete(db: &DatabaseConnection, payroll_id: Uuid) -> Result<payroll::Model> {
    let txn = db.begin().await?;

    let payroll = lock(&txn, payroll_id).await?;

    if !payroll.status.is_deletable() {
        return Err(LedgerError::InvalidState(format!(
            "payroll `{payroll_id}` is {:?} and cannot be deleted",
            payroll.status
        )));
    }

    let has_payslips = Payslip::find()
        .filter(payslip::Column::PayrollId.eq(payroll_id))
        .one(&txn).await?
        .is_some();

    if has_payslips {
        return Err(LedgerError::InvalidState(format!("payroll `{payroll_id}` still has payslips")));
    }

    Payroll::delete_by_id(payroll_id).exec(&txn).await?;

    txn.commit().await?;

    info!(%payroll_id, "payroll deleted");

    Ok(payroll)
}

/// Generates one payslip per active worker and snapshots the payroll totals.
///
/// A DRAFT payroll is regenerated from scratch. A payroll left in PROCESSING keeps the payslips
/// it already has and only fills in the workers that are missing one. Its totals and
/// `employee_count` then cover every non-cancelled payslip of the payroll, the kept ones
/// included, not only those created by this run.
///
/// Line items added to the payslips afterwards do not flow back into these totals, use
/// [`recompute_aggregates`] for that.
pub async fn process(db: &DatabaseConnection, payroll_id: Uuid, processed_by: Uuid) -> Result<ProcessOutcome> {
    let txn = db.begin().await?;

    let payroll = lock(&txn, payroll_id).await?;

    match payroll.status {
        PayrollStatus::Completed => {
            return Err(LedgerError::InvalidState(format!("payroll `{payroll_id}` has already been processed")));
        }
        PayrollStatus::Cancelled => {
            return Err(LedgerError::InvalidState(format!("payroll `{payroll_id}` is cancelled")));
        }
        PayrollStatus::Draft | PayrollStatus::Processing => {}
    }

    let workers = super::worker::active(&txn).await?;

    if workers.is_empty() {
        return Err(LedgerError::Validation("there are no active workers to process".to_string()));
    }

    let now = utils::now();

    Payroll::update(payroll::ActiveModel {
        id: Unchanged(payroll_id),
        status: Set(PayrollStatus::Processing),
        updated_at: Set(now),
        ..Default::default()
    }).exec(&txn).await?;

    let mut payslips = match payroll.status {
        PayrollStatus::Draft => {
            let cleared = Payslip::delete_many()
                .filter(payslip::Column::PayrollId.eq(payroll_id))
                .exec(&txn).await?;

            debug!(%payroll_id, removed = cleared.rows_affected, "cleared previous payslips");

            Vec::new()
        }
        _ => {
            let existing = Payslip::find()
                .filter(payslip::Column::PayrollId.eq(payroll_id))
                .all(&txn).await?;

            warn!(%payroll_id, kept = existing.len(), "reprocessing payroll, keeping existing payslips");

            existing
        }
    };

    let mut payslips_created = 0;

    for worker in workers {
        if payslips.iter().any(|p| p.worker_id == worker.id) {
            continue;
        }

        let allowance = worker.allowance.unwrap_or_default();

        let payslip = Payslip::insert(super::payslip::snapshot(payroll_id, &worker, worker.salary, allowance, now))
            .exec_with_returning(&txn).await?;

        if allowance > Decimal::ZERO {
            Benefit::insert(allowance_benefit(payslip.id, allowance, now))
                .exec_with_returning(&txn).await?;
        }

        payslips.push(payslip);
        payslips_created += 1;
    }

    let totals = PayrollTotals::from_payslips(payslips.iter().filter(|p| p.status != PayslipStatus::Cancelled));

    let model = Payroll::update(payroll::ActiveModel {
        status: Set(PayrollStatus::Completed),
        processed_at: Set(Some(now)),
        processed_by: Set(Some(processed_by)),
        ..totals_changed(payroll_id, totals, now)
    }).exec(&txn).await?;

    txn.commit().await?;

    info!(
        %payroll_id,
        payslips_created,
        employee_count = model.employee_count,
        total_net_salary = %model.total_net_salary,
        "payroll processed"
    );

    Ok(ProcessOutcome { payroll: model, payslips_created })
}

/// Re-sums the payroll totals from its current, non-cancelled payslips
pub async fn recompute_aggregates(db: &DatabaseConnection, payroll_id: Uuid) -> Result<payroll::Model> {
    let txn = db.begin().await?;

    lock(&txn, payroll_id).await?;

    let payslips = Payslip::find()
        .filter(payslip::Column::PayrollId.eq(payroll_id))
        .filter(payslip::Column::Status.ne(PayslipStatus::Cancelled))
        .all(&txn).await?;

    let totals = PayrollTotals::from_payslips(&payslips);

    let model = Payroll::update(totals_changed(payroll_id, totals, utils::now()))
        .exec(&txn).await?;

    txn.commit().await?;

    info!(%payroll_id, employee_count = model.employee_count, "payroll totals recomputed");

    Ok(model)
}
