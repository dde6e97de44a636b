use std::ops::RangeInclusive;

pub const PAYROLL_MONTHS: RangeInclusive<i16> = 1..=12;

pub const PAYROLL_YEARS: RangeInclusive<i16> = 2000..=2100;

/// Code and type of the benefit line written for a worker's allowance when a payroll is processed
pub const ALLOWANCE_BENEFIT_CODE: &str = "ALLOWANCE";

pub const CPF_DIGITS: usize = 11;
