use std::collections::BTreeMap;

use actix_web::{delete, http::StatusCode, put, web, HttpResponse};
use sea_orm::{prelude::Uuid, DatabaseConnection};
use serde::Serialize;

use crate::{
    auth::Admin,
    entity::payslip,
    error::LedgerError,
    ledger::{self, benefit::BenefitPatch, deduction::DeductionPatch, LineItemChange},
};

use super::reply_with;

pub(super) fn deduction_config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(update_deduction)
        .service(delete_deduction);
}

pub(super) fn benefit_config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(update_benefit)
        .service(delete_benefit);
}

#[derive(Debug, Serialize)]
struct Changed<'a, T> {
    #[serde(flatten)]
    item: BTreeMap<&'a str, T>,
    payslip: Option<payslip::Model>,
}

/// `{"<key>": item, "payslip": ...}`, `payslip` is null when the totals were left alone
pub(super) fn reply_change<T: Serialize>(status: StatusCode, message: &str, key: &str, change: LineItemChange<T>) -> HttpResponse {
    reply_with(status, message, Changed {
        item: BTreeMap::from([(key, change.item)]),
        payslip: change.payslip,
    })
}

#[put("/{id}")]
async fn update_deduction(db: web::Data<DatabaseConnection>, _admin: Admin, id: web::Path<Uuid>, payload: web::Json<DeductionPatch>) -> Result<HttpResponse, LedgerError> {
    let change = ledger::deduction::update(db.get_ref(), *id, payload.into_inner()).await?;

    Ok(reply_change(StatusCode::OK, "deduction updated", "deduction", change))
}

#[delete("/{id}")]
async fn delete_deduction(db: web::Data<DatabaseConnection>, _admin: Admin, id: web::Path<Uuid>) -> Result<HttpResponse, LedgerError> {
    let change = ledger::deduction::delete(db.get_ref(), *id).await?;

    Ok(reply_change(StatusCode::OK, "deduction deleted", "deduction", change))
}

#[put("/{id}")]
async fn update_benefit(db: web::Data<DatabaseConnection>, _admin: Admin, id: web::Path<Uuid>, payload: web::Json<BenefitPatch>) -> Result<HttpResponse, LedgerError> {
    let change = ledger::benefit::update(db.get_ref(), *id, payload.into_inner()).await?;

    Ok(reply_change(StatusCode::OK, "benefit updated", "benefit", change))
}

#[delete("/{id}")]
async fn delete_benefit(db: web::Data<DatabaseConnection>, _admin: Admin, id: web::Path<Uuid>) -> Result<HttpResponse, LedgerError> {
    let change = ledger::benefit::delete(db.get_ref(), *id).await?;

    Ok(reply_change(StatusCode::OK, "benefit deleted", "benefit", change))
}
