use actix_web::{delete, get, http::StatusCode, post, put, web, HttpResponse};
use sea_orm::{prelude::Uuid, DatabaseConnection};

use crate::{
    auth::Admin,
    entity::payslip,
    error::LedgerError,
    ledger::{
        self,
        benefit::NewBenefit,
        deduction::NewDeduction,
        payslip::{NewPayslip, PayslipFields, StatusChange},
    },
};

use super::{line_item::reply_change, reply};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(create_payslip)
        .service(get_payslip)
        .service(update_payslip)
        .service(delete_payslip)
        .service(update_status)
        .service(recompute_payslip)
        .service(list_deductions)
        .service(add_deduction)
        .service(list_benefits)
        .service(add_benefit);
}

#[post("")]
async fn create_payslip(db: web::Data<DatabaseConnection>, _admin: Admin, payload: web::Json<NewPayslip>) -> Result<HttpResponse, LedgerError> {
    let payslip = ledger::payslip::create(db.get_ref(), payload.into_inner()).await?;

    Ok(reply(StatusCode::CREATED, "payslip created", "payslip", payslip))
}

#[get("/{payslip_id}")]
async fn get_payslip(_admin: Admin, payslip: payslip::Model) -> HttpResponse {
    reply(StatusCode::OK, "payslip found", "payslip", payslip)
}

#[put("/{payslip_id}")]
async fn update_payslip(db: web::Data<DatabaseConnection>, _admin: Admin, payslip_id: web::Path<Uuid>, payload: web::Json<PayslipFields>) -> Result<HttpResponse, LedgerError> {
    let payslip = ledger::payslip::update_fields(db.get_ref(), *payslip_id, payload.into_inner()).await?;

    Ok(reply(StatusCode::OK, "payslip updated", "payslip", payslip))
}

#[delete("/{payslip_id}")]
async fn delete_payslip(db: web::Data<DatabaseConnection>, _admin: Admin, payslip_id: web::Path<Uuid>) -> Result<HttpResponse, LedgerError> {
    let payslip = ledger::payslip::delete(db.get_ref(), *payslip_id).await?;

    Ok(reply(StatusCode::OK, "payslip deleted", "payslip", payslip))
}

#[put("/{payslip_id}/status")]
async fn update_status(db: web::Data<DatabaseConnection>, _admin: Admin, payslip_id: web::Path<Uuid>, payload: web::Json<StatusChange>) -> Result<HttpResponse, LedgerError> {
    let payslip = ledger::payslip::update_status(db.get_ref(), *payslip_id, payload.into_inner()).await?;

    Ok(reply(StatusCode::OK, "payslip status updated", "payslip", payslip))
}

#[post("/{payslip_id}/recompute")]
async fn recompute_payslip(db: web::Data<DatabaseConnection>, _admin: Admin, payslip_id: web::Path<Uuid>) -> Result<HttpResponse, LedgerError> {
    let payslip = ledger::payslip::recompute(db.get_ref(), *payslip_id).await?;

    Ok(reply(StatusCode::OK, "payslip totals recomputed", "payslip", payslip))
}

#[get("/{payslip_id}/deductions")]
async fn list_deductions(db: web::Data<DatabaseConnection>, _admin: Admin, payslip_id: web::Path<Uuid>) -> Result<HttpResponse, LedgerError> {
    let deductions = ledger::deduction::list(db.get_ref(), *payslip_id).await?;

    Ok(reply(StatusCode::OK, "deductions listed", "deductions", deductions))
}

#[post("/{payslip_id}/deductions")]
async fn add_deduction(db: web::Data<DatabaseConnection>, _admin: Admin, payslip_id: web::Path<Uuid>, payload: web::Json<NewDeduction>) -> Result<HttpResponse, LedgerError> {
    let change = ledger::deduction::add(db.get_ref(), *payslip_id, payload.into_inner()).await?;

    Ok(reply_change(StatusCode::CREATED, "deduction added", "deduction", change))
}

#[get("/{payslip_id}/benefits")]
async fn list_benefits(db: web::Data<DatabaseConnection>, _admin: Admin, payslip_id: web::Path<Uuid>) -> Result<HttpResponse, LedgerError> {
    let benefits = ledger::benefit::list(db.get_ref(), *payslip_id).await?;

    Ok(reply(StatusCode::OK, "benefits listed", "benefits", benefits))
}

#[post("/{payslip_id}/benefits")]
async fn add_benefit(db: web::Data<DatabaseConnection>, _admin: Admin, payslip_id: web::Path<Uuid>, payload: web::Json<NewBenefit>) -> Result<HttpResponse, LedgerError> {
    let change = ledger::benefit::add(db.get_ref(), *payslip_id, payload.into_inner()).await?;

    Ok(reply_change(StatusCode::CREATED, "benefit added", "benefit", change))
}
