use sea_orm_migration::prelude::*;
use sha2::Digest as _;

use crate::m20251001_090000_init_ledger::{User, Worker};

const WORKERS: u128 = 20;
const ADMIN_ID: u128 = 12345;

const DEPARTMENTS: [&str; 4] = ["Finance", "Engineering", "Operations", "People"];

#[derive(DeriveMigrationName)]
pub struct Migration;

fn seed_id(i: u128) -> SimpleExpr {
    Expr::val(format!("{i:032x}")).cast_as("uuid")
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let time = Expr::val("2025-10-01T09:15:00.000Z").cast_as("timestamptz");

        let hashed_password = &sha2::Sha256::digest("admin:admin")[..];

        manager
            .exec_stmt(Query::insert()
                .into_table(User::Table)
                .columns(["id", "created_at", "updated_at", "username", "password", "role"])
                .values_panic([seed_id(ADMIN_ID), time.clone(), time.clone(), "admin".into(), hashed_password.into(), Expr::val("admin").cast_as("role_type")])
                .to_owned()
            ).await?;

        // Active workers with salaries between 3k and 15k, every third one gets an allowance
        for i in 1..=WORKERS {
            let salary = rand::random_range(3_000..=15_000);
            let allowance = (i % 3 == 0).then(|| rand::random_range(100..=800));
            let department = DEPARTMENTS[(i as usize) % DEPARTMENTS.len()];

            let allowance = match allowance {
                Some(allowance) => Expr::val(format!("{allowance}.00")).cast_as("numeric"),
                None => Expr::val(Option::<String>::None).cast_as("numeric"),
            };

            manager
                .exec_stmt(Query::insert()
                    .into_table(Worker::Table)
                    .columns([
                        "id", "created_at", "updated_at", "employee_code", "cpf", "name", "email",
                        "contract_type", "position", "department", "salary", "allowance", "admission_date", "status",
                    ])
                    .values_panic([
                        seed_id(i),
                        time.clone(),
                        time.clone(),
                        format!("E{i:03}").into(),
                        format!("{:011}", 10_000_000_000u64 + i as u64).into(),
                        format!("Worker {i}").into(),
                        format!("worker{i}@example.com").into(),
                        "CLT".into(),
                        "Analyst".into(),
                        department.into(),
                        Expr::val(format!("{salary}.00")).cast_as("numeric"),
                        allowance,
                        Expr::val("2024-01-02").cast_as("date"),
                        Expr::val("active").cast_as("worker_status"),
                    ])
                    .to_owned()
                ).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for i in 1..=WORKERS {
            manager
                .exec_stmt(Query::delete()
                    .from_table(Worker::Table)
                    .and_where(Expr::col("id").eq(seed_id(i)))
                    .to_owned()
                ).await?;
        }

        manager
            .exec_stmt(Query::delete()
                .from_table(User::Table)
                .and_where(Expr::col("id").eq(seed_id(ADMIN_ID)))
                .to_owned()
            ).await?;

        Ok(())
    }
}
