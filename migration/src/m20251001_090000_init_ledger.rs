use sea_orm_migration::{prelude::{extension::postgres::TypeDropStatement, *}, sea_orm::{ActiveEnum, DbBackend, DeriveActiveEnum, EnumIter, Schema}};

use crate::util::{default_table_statement, money, references};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(DbBackend::Postgres);

        manager.create_type(schema.create_enum_from_active_enum::<RoleType>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<WorkerStatus>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<PayrollStatus>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<PayslipStatus>()).await?;

        manager
            .create_table(default_table_statement()
                .table(User::Table)
                .col(ColumnDef::new(User::Username)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(User::Password)
                    .binary()
                    .not_null()) // sha256 of `password:username`
                .col(ColumnDef::new(User::Role)
                    .custom(RoleType::name())
                    .not_null())
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Worker::Table)
                .col(ColumnDef::new(Worker::EmployeeCode)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(Worker::Cpf)
                    .char_len(11)
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(Worker::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Worker::Email)
                    .text())
                .col(ColumnDef::new(Worker::ContractType)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Worker::Position)
                    .text())
                .col(ColumnDef::new(Worker::Department)
                    .text())
                .col(money(Worker::Salary))
                .col(ColumnDef::new(Worker::Allowance)
                    .decimal_len(14, 2))
                .col(ColumnDef::new(Worker::AdmissionDate)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Worker::TerminationDate)
                    .date())
                .col(ColumnDef::new(Worker::Status)
                    .custom(WorkerStatus::name())
                    .not_null()
                    .default("active"))
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Payroll::Table)
                .col(ColumnDef::new(Payroll::Month)
                    .small_integer()
                    .not_null()
                    .check(Expr::col(Payroll::Month).between(1, 12)))
                .col(ColumnDef::new(Payroll::Year)
                    .small_integer()
                    .not_null())
                .col(ColumnDef::new(Payroll::Status)
                    .custom(PayrollStatus::name())
                    .not_null()
                    .default("draft"))
                .col(money(Payroll::TotalGrossSalary))
                .col(money(Payroll::TotalBenefits))
                .col(money(Payroll::TotalDeductions))
                .col(money(Payroll::TotalNetSalary))
                .col(ColumnDef::new(Payroll::EmployeeCount)
                    .integer()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Payroll::ProcessedAt)
                    .timestamp_with_time_zone())
                .col(ColumnDef::new(Payroll::ProcessedBy)
                    .uuid())
                .take()
            ).await?;

        // One payroll per period
        manager
            .create_index(Index::create()
                .name("idx_payroll_period")
                .table(Payroll::Table)
                .col(Payroll::Year)
                .col(Payroll::Month)
                .unique()
                .take()
            ).await?;

        manager.create_foreign_key(references(Payroll::Table, Payroll::ProcessedBy, User::Table, ForeignKeyAction::SetNull)).await?;

        manager
            .create_table(default_table_statement()
                .table(Payslip::Table)
                .col(ColumnDef::new(Payslip::PayrollId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Payslip::WorkerId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Payslip::EmployeeCode)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Payslip::EmployeeName)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Payslip::Department)
                    .text())
                .col(ColumnDef::new(Payslip::Position)
                    .text())
                .col(money(Payslip::BaseSalary))
                .col(money(Payslip::TotalBenefits))
                .col(money(Payslip::TotalDeductions))
                .col(money(Payslip::NetSalary))
                .col(ColumnDef::new(Payslip::Status)
                    .custom(PayslipStatus::name())
                    .not_null()
                    .default("draft"))
                .col(ColumnDef::new(Payslip::PaymentDate)
                    .timestamp_with_time_zone())
                .take()
            ).await?;

        // A worker gets at most one payslip per payroll
        manager
            .create_index(Index::create()
                .name("idx_payslip_payroll_worker")
                .table(Payslip::Table)
                .col(Payslip::PayrollId)
                .col(Payslip::WorkerId)
                .unique()
                .take()
            ).await?;

        manager.create_foreign_key(references(Payslip::Table, Payslip::PayrollId, Payroll::Table, ForeignKeyAction::Restrict)).await?;
        manager.create_foreign_key(references(Payslip::Table, Payslip::WorkerId, Worker::Table, ForeignKeyAction::Restrict)).await?;

        manager
            .create_table(default_table_statement()
                .table(Deduction::Table)
                .col(ColumnDef::new(Deduction::PayslipId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Deduction::Code)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Deduction::Kind)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Deduction::Description)
                    .text())
                .col(money(Deduction::Value))
                .col(ColumnDef::new(Deduction::Percentage)
                    .decimal_len(5, 2))
                .col(ColumnDef::new(Deduction::IsRequired)
                    .boolean()
                    .not_null()
                    .default(false))
                .take()
            ).await?;

        manager.create_foreign_key(references(Deduction::Table, Deduction::PayslipId, Payslip::Table, ForeignKeyAction::Cascade)).await?;

        manager
            .create_table(default_table_statement()
                .table(Benefit::Table)
                .col(ColumnDef::new(Benefit::PayslipId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Benefit::Code)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Benefit::Kind)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Benefit::Description)
                    .text())
                .col(money(Benefit::Value))
                .take()
            ).await?;

        manager.create_foreign_key(references(Benefit::Table, Benefit::PayslipId, Payslip::Table, ForeignKeyAction::Cascade)).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first, the foreign keys go with their tables
        manager.drop_table(TableDropStatement::new().table(Benefit::Table).take()).await?;
        manager.drop_table(TableDropStatement::new().table(Deduction::Table).take()).await?;
        manager.drop_table(TableDropStatement::new().table(Payslip::Table).take()).await?;
        manager.drop_table(TableDropStatement::new().table(Payroll::Table).take()).await?;
        manager.drop_table(TableDropStatement::new().table(Worker::Table).take()).await?;
        manager.drop_table(TableDropStatement::new().table(User::Table).take()).await?;

        for name in [PayslipStatus::name(), PayrollStatus::name(), WorkerStatus::name(), RoleType::name()] {
            manager
                .drop_type(
                    TypeDropStatement::new()
                        .name(name)
                        .to_owned()
                ).await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum User {
    Table,
    Username,
    Password,
    Role,
}

#[derive(DeriveIden)]
pub(crate) enum Worker {
    Table,
    EmployeeCode,
    Cpf,
    Name,
    Email,
    ContractType,
    Position,
    Department,
    Salary,
    Allowance,
    AdmissionDate,
    TerminationDate,
    Status,
}

#[derive(DeriveIden)]
enum Payroll {
    Table,
    Month,
    Year,
    Status,
    TotalGrossSalary,
    TotalBenefits,
    TotalDeductions,
    TotalNetSalary,
    EmployeeCount,
    ProcessedAt,
    ProcessedBy,
}

#[derive(DeriveIden)]
enum Payslip {
    Table,
    PayrollId,
    WorkerId,
    EmployeeCode,
    EmployeeName,
    Department,
    Position,
    BaseSalary,
    TotalBenefits,
    TotalDeductions,
    NetSalary,
    Status,
    PaymentDate,
}

#[derive(DeriveIden)]
enum Deduction {
    Table,
    PayslipId,
    Code,
    #[sea_orm(iden = "type")]
    Kind,
    Description,
    Value,
    Percentage,
    IsRequired,
}

#[derive(DeriveIden)]
enum Benefit {
    Table,
    PayslipId,
    Code,
    #[sea_orm(iden = "type")]
    Kind,
    Description,
    Value,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role_type")]
enum RoleType {
    #[sea_orm(string_value = "employee")]
    Employee,
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "worker_status")]
enum WorkerStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "on_leave")]
    OnLeave,
    #[sea_orm(string_value = "terminated")]
    Terminated,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payroll_status")]
enum PayrollStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payslip_status")]
enum PayslipStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "processed")]
    Processed,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}
