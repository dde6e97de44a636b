use std::str::FromStr;

use actix_web::{dev, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use sea_orm::{prelude::Uuid, DatabaseConnection};

use crate::{entity::{payroll, payslip, worker}, ledger};

/// Loads the entity named by a path segment, so handlers can take the model directly.
///
/// A malformed id is a 400, an unknown one a 404.
macro_rules! path_entity {
    ($model:ty, $segment:literal, $load:path) => {
        impl FromRequest for $model {
            type Error = actix_web::Error;
            type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
                let req = req.clone();

                Box::pin(async move {
                    let id = req.match_info().get($segment).expect(concat!("This extractor must be used under `", $segment, "` path"));
                    let Ok(id) = Uuid::from_str(id) else {
                        return Err(actix_web::error::ErrorBadRequest(concat!("invalid `", $segment, "`")))
                    };

                    let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

                    Ok($load(db.get_ref(), id).await?)
                })
            }
        }
    };
}

path_entity!(payroll::Model, "payroll_id", ledger::payroll::get);
path_entity!(payslip::Model, "payslip_id", ledger::payslip::get);
path_entity!(worker::Model, "worker_id", ledger::worker::get);
