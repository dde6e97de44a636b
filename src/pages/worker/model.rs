use super::*;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WorkerQuery {
    pub(super) status: Option<WorkerStatus>,
}
