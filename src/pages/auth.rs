use actix_web::{get, http::StatusCode, post, web, Responder};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::{auth::{Authority, Session}, entity::{prelude::*, user}, error::LedgerError};

use super::reply;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(login)
        .service(whoami);
}

#[derive(Debug, Serialize, Deserialize)]
struct Login {
    username: String,
    password: String,
}

#[post("/login")]
async fn login(db: web::Data<DatabaseConnection>, authority: web::Data<Authority>, credentials: web::Json<Login>) -> actix_web::Result<impl Responder> {
    let hashed_password = &Sha256::digest(&format!("{}:{}", credentials.password, credentials.username))[..];

    let Some(user) = User::find()
        .filter(user::Column::Username.eq(&credentials.username))
        .filter(user::Column::Password.eq(hashed_password))
        .one(db.get_ref()).await.map_err(LedgerError::from)?
    else {
        warn!(username = %credentials.username, "rejected login");
        return Err(actix_web::error::ErrorForbidden("invalid credentials"));
    };

    let token = authority.issue_for(&user)?;

    Ok(reply(StatusCode::OK, "logged in", "token", token))
}

#[get("")]
async fn whoami(session: Session) -> impl Responder {
    web::Json(session)
}
