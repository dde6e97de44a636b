use actix_web::{delete, get, http::StatusCode, post, put, web, HttpResponse};
use sea_orm::{prelude::Uuid, DatabaseConnection};
use serde::{Deserialize, Serialize};

use crate::{
    auth::Admin,
    entity::{payroll, sea_orm_active_enums::PayrollStatus},
    error::LedgerError,
    ledger::{self, payroll::NewPayroll},
};

use super::{reply, reply_with};
use model::*;

mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(create_payroll)
        .service(list_payrolls)
        .service(get_payroll)
        .service(delete_payroll)
        .service(update_status)
        .service(process_payroll)
        .service(recompute_payroll)
        .service(list_payslips);
}

#[post("")]
async fn create_payroll(db: web::Data<DatabaseConnection>, _admin: Admin, payload: web::Json<NewPayroll>) -> Result<HttpResponse, LedgerError> {
    let payroll = ledger::payroll::create(db.get_ref(), payload.into_inner()).await?;

    Ok(reply(StatusCode::CREATED, "payroll created", "payroll", payroll))
}

#[get("")]
async fn list_payrolls(db: web::Data<DatabaseConnection>, _admin: Admin, query: web::Query<PayrollQuery>) -> Result<HttpResponse, LedgerError> {
    let payrolls = ledger::payroll::list(db.get_ref(), query.year).await?;

    Ok(reply(StatusCode::OK, "payrolls listed", "payrolls", payrolls))
}

#[get("/{payroll_id}")]
async fn get_payroll(_admin: Admin, payroll: payroll::Model) -> HttpResponse {
    reply(StatusCode::OK, "payroll found", "payroll", payroll)
}

#[delete("/{payroll_id}")]
async fn delete_payroll(db: web::Data<DatabaseConnection>, _admin: Admin, payroll_id: web::Path<Uuid>) -> Result<HttpResponse, LedgerError> {
    let payroll = ledger::payroll::delete(db.get_ref(), *payroll_id).await?;

    Ok(reply(StatusCode::OK, "payroll deleted", "payroll", payroll))
}

#[put("/{payroll_id}/status")]
async fn update_status(db: web::Data<DatabaseConnection>, _admin: Admin, payroll_id: web::Path<Uuid>, payload: web::Json<StatusPayload>) -> Result<HttpResponse, LedgerError> {
    let payroll = ledger::payroll::update_status(db.get_ref(), *payroll_id, payload.status).await?;

    Ok(reply(StatusCode::OK, "payroll status updated", "payroll", payroll))
}

#[post("/{payroll_id}/process")]
async fn process_payroll(db: web::Data<DatabaseConnection>, admin: Admin, payroll_id: web::Path<Uuid>) -> Result<HttpResponse, LedgerError> {
    let outcome = ledger::payroll::process(db.get_ref(), *payroll_id, admin.id).await?;

    Ok(reply_with(StatusCode::OK, "payroll processed", outcome))
}

#[post("/{payroll_id}/recompute")]
async fn recompute_payroll(db: web::Data<DatabaseConnection>, _admin: Admin, payroll_id: web::Path<Uuid>) -> Result<HttpResponse, LedgerError> {
    let payroll = ledger::payroll::recompute_aggregates(db.get_ref(), *payroll_id).await?;

    Ok(reply(StatusCode::OK, "payroll totals recomputed", "payroll", payroll))
}

#[get("/{payroll_id}/payslips")]
async fn list_payslips(db: web::Data<DatabaseConnection>, _admin: Admin, payroll_id: web::Path<Uuid>) -> Result<HttpResponse, LedgerError> {
    let payslips = ledger::payslip::list_for_payroll(db.get_ref(), *payroll_id).await?;

    Ok(reply(StatusCode::OK, "payslips listed", "payslips", payslips))
}
