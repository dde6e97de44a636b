use actix_web::{delete, get, http::StatusCode, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::{
    auth::Admin,
    entity::{sea_orm_active_enums::WorkerStatus, worker},
    error::LedgerError,
    ledger::worker::{self as ledger, NewWorker, WorkerPatch},
};

use super::reply;
use model::*;

mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(create_worker)
        .service(list_workers)
        .service(get_worker)
        .service(update_worker)
        .service(delete_worker);
}

#[post("")]
async fn create_worker(db: web::Data<DatabaseConnection>, _admin: Admin, payload: web::Json<NewWorker>) -> Result<HttpResponse, LedgerError> {
    let worker = ledger::create(db.get_ref(), payload.into_inner()).await?;

    Ok(reply(StatusCode::CREATED, "worker created", "worker", worker))
}

#[get("")]
async fn list_workers(db: web::Data<DatabaseConnection>, _admin: Admin, query: web::Query<WorkerQuery>) -> Result<HttpResponse, LedgerError> {
    let workers = ledger::list(db.get_ref(), query.status).await?;

    Ok(reply(StatusCode::OK, "workers listed", "workers", workers))
}

#[get("/{worker_id}")]
async fn get_worker(_admin: Admin, worker: worker::Model) -> HttpResponse {
    reply(StatusCode::OK, "worker found", "worker", worker)
}

#[put("/{worker_id}")]
async fn update_worker(db: web::Data<DatabaseConnection>, _admin: Admin, worker_id: web::Path<uuid::Uuid>, payload: web::Json<WorkerPatch>) -> Result<HttpResponse, LedgerError> {
    let worker = ledger::update(db.get_ref(), *worker_id, payload.into_inner()).await?;

    Ok(reply(StatusCode::OK, "worker updated", "worker", worker))
}

#[delete("/{worker_id}")]
async fn delete_worker(db: web::Data<DatabaseConnection>, _admin: Admin, worker_id: web::Path<uuid::Uuid>) -> Result<HttpResponse, LedgerError> {
    let worker = ledger::delete(db.get_ref(), *worker_id).await?;

    Ok(reply(StatusCode::OK, "worker deleted", "worker", worker))
}
