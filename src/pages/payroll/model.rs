use super::*;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct PayrollQuery {
    pub(super) year: Option<i16>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct StatusPayload {
    pub(super) status: PayrollStatus,
}
