use chrono::NaiveDate;
use sea_orm::{
    prelude::{Decimal, Uuid},
    ActiveValue::{Set, Unchanged},
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    consts::CPF_DIGITS,
    entity::{payslip, prelude::*, sea_orm_active_enums::WorkerStatus, worker},
    error::{LedgerError, Result},
    utils::{self, deserialize_some},
};

#[derive(Debug, Deserialize)]
pub struct NewWorker {
    pub employee_code: String,
    pub cpf: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub contract_type: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    pub salary: Decimal,
    #[serde(default)]
    pub allowance: Option<Decimal>,
    pub admission_date: NaiveDate,
    #[serde(default)]
    pub status: Option<WorkerStatus>,
}

impl NewWorker {
    fn validate(&self) -> Result<()> {
        utils::require_text("employee_code", &self.employee_code)?;
        utils::require_text("name", &self.name)?;
        utils::require_text("contract_type", &self.contract_type)?;
        utils::require_positive("salary", self.salary)?;
        if let Some(allowance) = self.allowance {
            utils::require_non_negative("allowance", allowance)?;
        }

        Ok(())
    }
}

/// `employee_code` and `cpf` identify the worker and are not patchable
#[derive(Debug, Default, Deserialize)]
pub struct WorkerPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub email: Option<Option<String>>,
    pub contract_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub position: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub department: Option<Option<String>>,
    pub salary: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub allowance: Option<Option<Decimal>>,
    pub admission_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub termination_date: Option<Option<NaiveDate>>,
    pub status: Option<WorkerStatus>,
}

impl WorkerPatch {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            utils::require_text("name", name)?;
        }
        if let Some(contract_type) = &self.contract_type {
            utils::require_text("contract_type", contract_type)?;
        }
        if let Some(salary) = self.salary {
            utils::require_positive("salary", salary)?;
        }
        if let Some(Some(allowance)) = self.allowance {
            utils::require_non_negative("allowance", allowance)?;
        }

        Ok(())
    }
}

/// Strips the usual `000.000.000-00` punctuation and checks the digit count
pub fn normalize_cpf(cpf: &str) -> Result<String> {
    let digits: String = cpf.chars().filter(|c| !matches!(c, '.' | '-' | ' ')).collect();

    if digits.len() != CPF_DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(LedgerError::Validation(format!("`cpf` must have {CPF_DIGITS} digits")));
    }

    Ok(digits)
}

fn check_dates(admission_date: NaiveDate, termination_date: Option<NaiveDate>) -> Result<()> {
    match termination_date {
        Some(termination_date) if termination_date < admission_date => Err(LedgerError::Validation(
            "`termination_date` cannot be before `admission_date`".to_string(),
        )),
        _ => Ok(()),
    }
}

pub(crate) async fn find<C: ConnectionTrait>(db: &C, worker_id: Uuid) -> Result<worker::Model> {
    Worker::find_by_id(worker_id)
        .one(db).await?
        .ok_or_else(|| LedgerError::NotFound(format!("worker `{worker_id}` not found")))
}

async fn lock<C: ConnectionTrait>(db: &C, worker_id: Uuid) -> Result<worker::Model> {
    Worker::find_by_id(worker_id)
        .lock_exclusive()
        .one(db).await?
        .ok_or_else(|| LedgerError::NotFound(format!("worker `{worker_id}` not found")))
}

/// The workers a payroll run generates payslips for
pub(crate) async fn active<C: ConnectionTrait>(db: &C) -> Result<Vec<worker::Model>> {
    let workers = Worker::find()
        .filter(worker::Column::Status.eq(WorkerStatus::Active))
        .order_by_asc(worker::Column::EmployeeCode)
        .all(db).await?;

    Ok(workers)
}

pub async fn get(db: &DatabaseConnection, worker_id: Uuid) -> Result<worker::Model> {
    find(db, worker_id).await
}

pub async fn list(db: &DatabaseConnection, status: Option<WorkerStatus>) -> Result<Vec<worker::Model>> {
    let mut query = Worker::find();

    if let Some(status) = status {
        query = query.filter(worker::Column::Status.eq(status));
    }

    let workers = query
        .order_by_asc(worker::Column::Name)
        .all(db).await?;

    Ok(workers)
}

pub async fn create(db: &DatabaseConnection, input: NewWorker) -> Result<worker::Model> {
    input.validate()?;
    let cpf = normalize_cpf(&input.cpf)?;

    let existing = Worker::find()
        .filter(Condition::any()
            .add(worker::Column::EmployeeCode.eq(&input.employee_code))
            .add(worker::Column::Cpf.eq(&cpf)))
        .one(db).await?;

    if let Some(existing) = existing {
        return Err(LedgerError::Conflict(format!(
            "a worker with employee code `{}` or this cpf already exists",
            existing.employee_code
        )));
    }

    let now = utils::now();

    let model = Worker::insert(worker::ActiveModel {
        created_at: Set(now),
        updated_at: Set(now),
        employee_code: Set(input.employee_code),
        cpf: Set(cpf),
        name: Set(input.name),
        email: Set(input.email),
        contract_type: Set(input.contract_type),
        position: Set(input.position),
        department: Set(input.department),
        salary: Set(input.salary),
        allowance: Set(input.allowance),
        admission_date: Set(input.admission_date),
        termination_date: Set(None),
        status: Set(input.status.unwrap_or(WorkerStatus::Active)),
        ..Default::default()
    }).exec_with_returning(db).await?;

    info!(worker_id = %model.id, employee_code = %model.employee_code, "worker created");

    Ok(model)
}

pub async fn update(db: &DatabaseConnection, worker_id: Uuid, changes: WorkerPatch) -> Result<worker::Model> {
    changes.validate()?;

    let txn = db.begin().await?;

    let current = lock(&txn, worker_id).await?;

    check_dates(
        changes.admission_date.unwrap_or(current.admission_date),
        changes.termination_date.unwrap_or(current.termination_date),
    )?;

    let model = Worker::update(worker::ActiveModel {
        id: Unchanged(worker_id),
        updated_at: Set(utils::now()),
        name: utils::patch(changes.name),
        email: utils::patch(changes.email),
        contract_type: utils::patch(changes.contract_type),
        position: utils::patch(changes.position),
        department: utils::patch(changes.department),
        salary: utils::patch(changes.salary),
        allowance: utils::patch(changes.allowance),
        admission_date: utils::patch(changes.admission_date),
        termination_date: utils::patch(changes.termination_date),
        status: utils::patch(changes.status),
        ..Default::default()
    }).exec(&txn).await?;

    txn.commit().await?;

    info!(%worker_id, "worker updated");

    Ok(model)
}

/// Workers that already appear on a payslip are kept for the payroll history
pub async fn delete(db: &DatabaseConnection, worker_id: Uuid) -> Result<worker::Model> {
    let txn = db.begin().await?;

    let worker = lock(&txn, worker_id).await?;

    let referenced = Payslip::find()
        .filter(payslip::Column::WorkerId.eq(worker_id))
        .one(&txn).await?;

    if referenced.is_some() {
        return Err(LedgerError::InvalidState(format!(
            "worker `{}` has payslips and cannot be deleted",
            worker.employee_code
        )));
    }

    Worker::delete_by_id(worker_id).exec(&txn).await?;

    txn.commit().await?;

    info!(%worker_id, "worker deleted");

    Ok(worker)
}
