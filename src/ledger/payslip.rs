use sea_orm::{
    prelude::{DateTimeWithTimeZone, Decimal, Uuid},
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    entity::{benefit, deduction, payslip, prelude::*, sea_orm_active_enums::PayslipStatus, worker},
    error::{LedgerError, Result},
    utils,
};

use super::totals::{net_salary, PayslipTotals};

#[derive(Debug, Deserialize)]
pub struct NewPayslip {
    pub payroll_id: Uuid,
    pub worker_id: Uuid,
    /// Defaults to the worker's current salary
    #[serde(default)]
    pub base_salary: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: PayslipStatus,
    #[serde(default)]
    pub payment_date: Option<DateTimeWithTimeZone>,
}

/// Manual override of the stored totals, it is not reconciled against the line items afterwards
#[derive(Debug, Default, Deserialize)]
pub struct PayslipFields {
    pub base_salary: Option<Decimal>,
    pub total_benefits: Option<Decimal>,
    pub total_deductions: Option<Decimal>,
    pub net_salary: Option<Decimal>,
}

impl PayslipFields {
    fn is_empty(&self) -> bool {
        self.base_salary.is_none()
            && self.total_benefits.is_none()
            && self.total_deductions.is_none()
            && self.net_salary.is_none()
    }

    fn validate(&self) -> Result<()> {
        let amounts = [
            ("base_salary", self.base_salary),
            ("total_benefits", self.total_benefits),
            ("total_deductions", self.total_deductions),
        ];

        for (field, value) in amounts {
            if let Some(value) = value {
                utils::require_non_negative(field, value)?;
            }
        }

        Ok(())
    }
}

pub(crate) async fn find<C: ConnectionTrait>(db: &C, payslip_id: Uuid) -> Result<payslip::Model> {
    Payslip::find_by_id(payslip_id)
        .one(db).await?
        .ok_or_else(|| LedgerError::NotFound(format!("payslip `{payslip_id}` not found")))
}

/// Row-locks the payslip for the rest of the transaction
pub(crate) async fn lock<C: ConnectionTrait>(db: &C, payslip_id: Uuid) -> Result<payslip::Model> {
    Payslip::find_by_id(payslip_id)
        .lock_exclusive()
        .one(db).await?
        .ok_or_else(|| LedgerError::NotFound(format!("payslip `{payslip_id}` not found")))
}

fn ensure_editable(payslip: &payslip::Model) -> Result<()> {
    if payslip.status.is_locked() {
        return Err(LedgerError::InvalidState(format!(
            "payslip `{}` is {:?} and can no longer be changed",
            payslip.id, payslip.status
        )));
    }

    Ok(())
}

async fn lock_editable<C: ConnectionTrait>(db: &C, payslip_id: Uuid) -> Result<payslip::Model> {
    let payslip = lock(db, payslip_id).await?;
    ensure_editable(&payslip)?;

    Ok(payslip)
}

/// Worker identity is copied as it is right now; later changes to the worker do not reach the payslip.
pub(crate) fn snapshot(
    payroll_id: Uuid,
    worker: &worker::Model,
    base_salary: Decimal,
    total_benefits: Decimal,
    now: DateTimeWithTimeZone,
) -> payslip::ActiveModel {
    payslip::ActiveModel {
        created_at: Set(now),
        updated_at: Set(now),
        payroll_id: Set(payroll_id),
        worker_id: Set(worker.id),
        employee_code: Set(worker.employee_code.clone()),
        employee_name: Set(worker.name.clone()),
        department: Set(worker.department.clone()),
        position: Set(worker.position.clone()),
        base_salary: Set(base_salary),
        total_benefits: Set(total_benefits),
        total_deductions: Set(Decimal::ZERO),
        net_salary: Set(net_salary(base_salary, total_benefits, Decimal::ZERO)),
        status: Set(PayslipStatus::Draft),
        payment_date: Set(None),
        ..Default::default()
    }
}

pub(crate) fn recomputed(
    payslip: &payslip::Model,
    deductions: &[deduction::Model],
    benefits: &[benefit::Model],
    now: DateTimeWithTimeZone,
) -> payslip::ActiveModel {
    let totals = PayslipTotals::from_line_items(payslip.base_salary, deductions, benefits);

    payslip::ActiveModel {
        id: Unchanged(payslip.id),
        total_benefits: Set(totals.total_benefits),
        total_deductions: Set(totals.total_deductions),
        net_salary: Set(totals.net_salary),
        updated_at: Set(now),
        ..Default::default()
    }
}

/// Caller must hold the payslip lock
async fn recompute_locked<C: ConnectionTrait>(db: &C, payslip: &payslip::Model) -> Result<payslip::Model> {
    let deductions = Deduction::find()
        .filter(deduction::Column::PayslipId.eq(payslip.id))
        .all(db).await?;

    let benefits = Benefit::find()
        .filter(benefit::Column::PayslipId.eq(payslip.id))
        .all(db).await?;

    let model = Payslip::update(recomputed(payslip, &deductions, &benefits, utils::now()))
        .exec(db).await?;

    debug!(
        payslip_id = %model.id,
        total_benefits = %model.total_benefits,
        total_deductions = %model.total_deductions,
        net_salary = %model.net_salary,
        "payslip totals recomputed"
    );

    Ok(model)
}

/// An open transaction holding the row lock of an editable payslip.
///
/// Line-item mutations run on [`LockedPayslip::txn`] and finish with either
/// [`LockedPayslip::recompute_and_commit`] or [`LockedPayslip::commit`]. Dropping it rolls back.
pub(crate) struct LockedPayslip {
    txn: DatabaseTransaction,
    payslip: payslip::Model,
}

impl LockedPayslip {
    /// Fails with NotFound when the payslip is missing and InvalidState when it is PAID or CANCELLED
    pub(crate) async fn acquire(txn: DatabaseTransaction, payslip_id: Uuid) -> Result<Self> {
        let payslip = lock_editable(&txn, payslip_id).await?;

        Ok(Self { txn, payslip })
    }

    pub(crate) fn txn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    pub(crate) fn id(&self) -> Uuid {
        self.payslip.id
    }

    pub(crate) async fn recompute_and_commit(self) -> Result<payslip::Model> {
        let model = recompute_locked(&self.txn, &self.payslip).await?;
        self.txn.commit().await?;

        Ok(model)
    }

    pub(crate) async fn commit(self) -> Result<()> {
        self.txn.commit().await?;

        Ok(())
    }
}

pub(crate) fn status_changed(
    payslip: &payslip::Model,
    change: &StatusChange,
    now: DateTimeWithTimeZone,
) -> payslip::ActiveModel {
    let payment_date = match change.status {
        PayslipStatus::Paid => Set(Some(change.payment_date.or(payslip.payment_date).unwrap_or(now))),
        _ => NotSet,
    };

    payslip::ActiveModel {
        id: Unchanged(payslip.id),
        status: Set(change.status),
        payment_date,
        updated_at: Set(now),
        ..Default::default()
    }
}

/// `None` when there is nothing to write. Without an explicit `net_salary` the net is derived
/// from the merged values: supplied ones win, stored ones fill the gaps.
pub(crate) fn merged_fields(
    payslip: &payslip::Model,
    fields: &PayslipFields,
    now: DateTimeWithTimeZone,
) -> Option<payslip::ActiveModel> {
    if fields.is_empty() {
        return None;
    }

    let net = fields.net_salary.unwrap_or_else(|| net_salary(
        fields.base_salary.unwrap_or(payslip.base_salary),
        fields.total_benefits.unwrap_or(payslip.total_benefits),
        fields.total_deductions.unwrap_or(payslip.total_deductions),
    ));

    Some(payslip::ActiveModel {
        id: Unchanged(payslip.id),
        base_salary: utils::patch(fields.base_salary),
        total_benefits: utils::patch(fields.total_benefits),
        total_deductions: utils::patch(fields.total_deductions),
        net_salary: Set(net),
        updated_at: Set(now),
        ..Default::default()
    })
}

pub async fn get(db: &DatabaseConnection, payslip_id: Uuid) -> Result<payslip::Model> {
    find(db, payslip_id).await
}

pub async fn list_for_payroll(db: &DatabaseConnection, payroll_id: Uuid) -> Result<Vec<payslip::Model>> {
    super::payroll::find(db, payroll_id).await?;

    let payslips = Payslip::find()
        .filter(payslip::Column::PayrollId.eq(payroll_id))
        .order_by_asc(payslip::Column::EmployeeCode)
        .all(db).await?;

    Ok(payslips)
}

pub async fn create(db: &DatabaseConnection, input: NewPayslip) -> Result<payslip::Model> {
    if let Some(base_salary) = input.base_salary {
        utils::require_non_negative("base_salary", base_salary)?;
    }

    let payroll = super::payroll::find(db, input.payroll_id).await?;
    let worker = super::worker::find(db, input.worker_id).await?;

    let existing = Payslip::find()
        .filter(payslip::Column::PayrollId.eq(payroll.id))
        .filter(payslip::Column::WorkerId.eq(worker.id))
        .one(db).await?;

    if existing.is_some() {
        return Err(LedgerError::Conflict(format!(
            "worker `{}` already has a payslip in payroll {:02}/{}",
            worker.employee_code, payroll.month, payroll.year
        )));
    }

    let base_salary = input.base_salary.unwrap_or(worker.salary);

    let model = Payslip::insert(snapshot(payroll.id, &worker, base_salary, Decimal::ZERO, utils::now()))
        .exec_with_returning(db).await?;

    info!(payslip_id = %model.id, payroll_id = %payroll.id, worker = %worker.employee_code, "payslip created");

    Ok(model)
}

pub async fn recompute(db: &DatabaseConnection, payslip_id: Uuid) -> Result<payslip::Model> {
    LockedPayslip::acquire(db.begin().await?, payslip_id).await?
        .recompute_and_commit().await
}

pub async fn update_status(db: &DatabaseConnection, payslip_id: Uuid, change: StatusChange) -> Result<payslip::Model> {
    let txn = db.begin().await?;

    let payslip = lock(&txn, payslip_id).await?;

    if !payslip.status.can_transition_to(change.status) {
        return Err(LedgerError::InvalidState(format!(
            "payslip `{}` cannot move from {:?} to {:?}",
            payslip.id, payslip.status, change.status
        )));
    }

    if payslip.status == change.status {
        debug!(%payslip_id, status = ?payslip.status, "payslip already in requested status");
        return Ok(payslip);
    }

    let model = Payslip::update(status_changed(&payslip, &change, utils::now()))
        .exec(&txn).await?;

    txn.commit().await?;

    info!(%payslip_id, from = ?payslip.status, to = ?model.status, "payslip status changed");

    Ok(model)
}

pub async fn update_fields(db: &DatabaseConnection, payslip_id: Uuid, fields: PayslipFields) -> Result<payslip::Model> {
    fields.validate()?;

    let txn = db.begin().await?;

    let payslip = lock_editable(&txn, payslip_id).await?;

    let Some(active) = merged_fields(&payslip, &fields, utils::now()) else {
        return Ok(payslip);
    };

    let model = Payslip::update(active).exec(&txn).await?;

    txn.commit().await?;

    info!(%payslip_id, net_salary = %model.net_salary, "payslip totals overridden");

    Ok(model)
}

/// Line items go with the payslip through the cascading foreign key
pub async fn delete(db: &DatabaseConnection, payslip_id: Uuid) -> Result<payslip::Model> {
    let txn = db.begin().await?;

    let payslip = lock(&txn, payslip_id).await?;

    if payslip.status == PayslipStatus::Paid {
        return Err(LedgerError::InvalidState(format!("payslip `{payslip_id}` is paid and cannot be deleted")));
    }

    Payslip::delete_by_id(payslip_id).exec(&txn).await?;

    txn.commit().await?;

    info!(%payslip_id, "payslip deleted");

    Ok(payslip)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local};
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::{entity::sea_orm_active_enums::PayrollStatus, ledger::fixtures};

    use super::*;

    #[test]
    fn test_recomputed_adds_and_removes_deduction() {
        let payslip = fixtures::payslip(dec!(5000), dec!(200), dec!(0), PayslipStatus::Draft);
        let allowance = fixtures::benefit(payslip.id, "ALLOWANCE", dec!(200));
        let inss = fixtures::deduction(payslip.id, "INSS", dec!(150));
        let now = utils::now();

        let added = recomputed(&payslip, &[inss], &[allowance.clone()], now);
        assert_eq!(added.id, Unchanged(payslip.id));
        assert_eq!(added.total_deductions, Set(dec!(150)));
        assert_eq!(added.total_benefits, Set(dec!(200)));
        assert_eq!(added.net_salary, Set(dec!(5050)));
        assert_eq!(added.base_salary, NotSet);

        let removed = recomputed(&payslip, &[], &[allowance], now);
        assert_eq!(removed.total_deductions, Set(dec!(0)));
        assert_eq!(removed.net_salary, Set(dec!(5200)));
    }

    #[test]
    fn test_snapshot_copies_worker_identity() {
        let worker = fixtures::worker(dec!(5000), Some(dec!(200)));
        let payroll_id = Uuid::new_v4();

        let active = snapshot(payroll_id, &worker, dec!(5000), dec!(200), utils::now());
        assert_eq!(active.payroll_id, Set(payroll_id));
        assert_eq!(active.worker_id, Set(worker.id));
        assert_eq!(active.employee_code, Set("E001".to_string()));
        assert_eq!(active.employee_name, Set("Ana Souza".to_string()));
        assert_eq!(active.department, Set(Some("Finance".to_string())));
        assert_eq!(active.total_deductions, Set(dec!(0)));
        assert_eq!(active.net_salary, Set(dec!(5200)));
        assert_eq!(active.status, Set(PayslipStatus::Draft));
    }

    #[test]
    fn test_paid_sets_payment_date() {
        let payslip = fixtures::payslip(dec!(5000), dec!(200), dec!(0), PayslipStatus::Processed);
        let now = utils::now();

        let active = status_changed(&payslip, &StatusChange { status: PayslipStatus::Paid, payment_date: None }, now);
        assert_eq!(active.status, Set(PayslipStatus::Paid));
        assert_eq!(active.payment_date, Set(Some(now)));

        let explicit = now - Duration::days(2);
        let active = status_changed(&payslip, &StatusChange { status: PayslipStatus::Paid, payment_date: Some(explicit) }, now);
        assert_eq!(active.payment_date, Set(Some(explicit)));

        let active = status_changed(&payslip, &StatusChange { status: PayslipStatus::Cancelled, payment_date: None }, now);
        assert_eq!(active.payment_date, NotSet);
    }

    #[test]
    fn test_paid_keeps_existing_payment_date() {
        let mut payslip = fixtures::payslip(dec!(5000), dec!(0), dec!(0), PayslipStatus::Processed);
        let earlier = Local::now().fixed_offset() - Duration::days(5);
        payslip.payment_date = Some(earlier);

        let active = status_changed(&payslip, &StatusChange { status: PayslipStatus::Paid, payment_date: None }, utils::now());
        assert_eq!(active.payment_date, Set(Some(earlier)));
    }

    #[test]
    fn test_merged_fields() {
        let payslip = fixtures::payslip(dec!(5000), dec!(200), dec!(150), PayslipStatus::Draft);
        let now = utils::now();

        assert!(merged_fields(&payslip, &PayslipFields::default(), now).is_none());

        let raise = PayslipFields { base_salary: Some(dec!(6000)), ..Default::default() };
        let active = merged_fields(&payslip, &raise, now).unwrap();
        assert_eq!(active.base_salary, Set(dec!(6000)));
        assert_eq!(active.total_benefits, NotSet);
        assert_eq!(active.net_salary, Set(dec!(6050)));

        let explicit = PayslipFields {
            total_deductions: Some(dec!(300)),
            net_salary: Some(dec!(4000)),
            ..Default::default()
        };
        let active = merged_fields(&payslip, &explicit, now).unwrap();
        assert_eq!(active.total_deductions, Set(dec!(300)));
        assert_eq!(active.net_salary, Set(dec!(4000)));
    }

    #[test]
    fn test_fields_reject_negative_amounts() {
        let fields = PayslipFields { total_benefits: Some(dec!(-1)), ..Default::default() };
        assert!(matches!(fields.validate(), Err(LedgerError::Validation(_))));
    }

    #[actix_web::test]
    async fn test_paid_payslip_cannot_go_back_to_draft() {
        let paid = fixtures::payslip(dec!(5000), dec!(200), dec!(0), PayslipStatus::Paid);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ paid.clone() ],
            ])
            .into_connection();

        let result = update_status(&db, paid.id, StatusChange { status: PayslipStatus::Draft, payment_date: None }).await;
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
    }

    #[actix_web::test]
    async fn test_cancelled_payslip_stays_cancelled() {
        let cancelled = fixtures::payslip(dec!(5000), dec!(0), dec!(0), PayslipStatus::Cancelled);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ cancelled.clone() ],
                vec![ cancelled.clone() ],
            ])
            .into_connection();

        let result = update_status(&db, cancelled.id, StatusChange { status: PayslipStatus::Processed, payment_date: None }).await;
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));

        let unchanged = update_status(&db, cancelled.id, StatusChange { status: PayslipStatus::Cancelled, payment_date: None }).await.unwrap();
        assert_eq!(unchanged, cancelled);
    }

    #[actix_web::test]
    async fn test_processed_payslip_is_paid() {
        let processed = fixtures::payslip(dec!(5000), dec!(200), dec!(0), PayslipStatus::Processed);
        let paid = payslip::Model {
            status: PayslipStatus::Paid,
            payment_date: Some(utils::now()),
            ..processed.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ processed.clone() ],
                vec![ paid.clone() ],
            ])
            .into_connection();

        let model = update_status(&db, processed.id, StatusChange { status: PayslipStatus::Paid, payment_date: None }).await.unwrap();
        assert_eq!(model.status, PayslipStatus::Paid);
        assert!(model.payment_date.is_some());
    }

    #[actix_web::test]
    async fn test_update_fields_on_cancelled_payslip() {
        let cancelled = fixtures::payslip(dec!(5000), dec!(0), dec!(0), PayslipStatus::Cancelled);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ cancelled.clone() ],
            ])
            .into_connection();

        let fields = PayslipFields { base_salary: Some(dec!(1)), ..Default::default() };
        let result = update_fields(&db, cancelled.id, fields).await;
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
    }

    #[actix_web::test]
    async fn test_recompute_missing_payslip() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                Vec::<payslip::Model>::new(),
            ])
            .into_connection();

        let result = recompute(&db, Uuid::new_v4()).await;
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_recompute_runs_full_resum() {
        let payslip = fixtures::payslip(dec!(5000), dec!(0), dec!(0), PayslipStatus::Draft);
        let inss = fixtures::deduction(payslip.id, "INSS", dec!(150));
        let allowance = fixtures::benefit(payslip.id, "ALLOWANCE", dec!(200));
        let updated = payslip::Model {
            total_benefits: dec!(200),
            total_deductions: dec!(150),
            net_salary: dec!(5050),
            ..payslip.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([ vec![ payslip.clone() ] ])
            .append_query_results([ vec![ inss ] ])
            .append_query_results([ vec![ allowance ] ])
            .append_query_results([ vec![ updated.clone() ] ])
            .into_connection();

        let model = recompute(&db, payslip.id).await.unwrap();
        assert_eq!(model, updated);
    }

    #[actix_web::test]
    async fn test_create_duplicate_payslip() {
        let payroll = fixtures::payroll(3, 2025, PayrollStatus::Draft);
        let worker = fixtures::worker(dec!(5000), None);
        let existing = fixtures::payslip(dec!(5000), dec!(0), dec!(0), PayslipStatus::Draft);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([ vec![ payroll.clone() ] ])
            .append_query_results([ vec![ worker.clone() ] ])
            .append_query_results([ vec![ existing ] ])
            .into_connection();

        let result = create(&db, NewPayslip { payroll_id: payroll.id, worker_id: worker.id, base_salary: None }).await;
        assert!(matches!(result, Err(LedgerError::Conflict(_))));
    }

    #[actix_web::test]
    async fn test_paid_payslip_cannot_be_deleted() {
        let paid = fixtures::payslip(dec!(5000), dec!(0), dec!(0), PayslipStatus::Paid);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([ vec![ paid.clone() ] ])
            .into_connection();

        let result = delete(&db, paid.id).await;
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
    }
}
