use std::collections::BTreeMap;

use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Serialize;

mod auth;
mod extractor;
mod line_item;
mod payroll;
mod payslip;
mod worker;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(web::scope("/auth")
            .configure(auth::config))
        .service(web::scope("/workers")
            .configure(worker::config))
        .service(web::scope("/payrolls")
            .configure(payroll::config))
        .service(web::scope("/payslips")
            .configure(payslip::config))
        .service(web::scope("/deductions")
            .configure(line_item::deduction_config))
        .service(web::scope("/benefits")
            .configure(line_item::benefit_config));
}

#[derive(Debug, Serialize)]
struct Reply<'a, T> {
    success: bool,
    message: &'a str,
    #[serde(flatten)]
    body: T,
}

/// `{"success": true, "message": ..., <body fields>}`
fn reply_with<T: Serialize>(status: StatusCode, message: &str, body: T) -> HttpResponse {
    HttpResponse::build(status)
        .json(Reply { success: true, message, body })
}

/// `{"success": true, "message": ..., "<key>": entity}`
fn reply<T: Serialize>(status: StatusCode, message: &str, key: &str, entity: T) -> HttpResponse {
    reply_with(status, message, BTreeMap::from([(key, entity)]))
}
