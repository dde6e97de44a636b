use crate::entity::sea_orm_active_enums::{PayrollStatus, PayslipStatus};

impl PayslipStatus {
    /// Paid and cancelled payslips are historical records, nothing on them changes anymore
    pub fn is_locked(self) -> bool {
        matches!(self, PayslipStatus::Paid | PayslipStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: PayslipStatus) -> bool {
        use PayslipStatus::*;

        match (self, next) {
            (current, next) if current == next => true,
            (Draft, Processed | Cancelled) => true,
            (Processed, Paid | Cancelled) => true,
            _ => false,
        }
    }
}

impl PayrollStatus {
    pub fn can_transition_to(self, next: PayrollStatus) -> bool {
        use PayrollStatus::*;

        match (self, next) {
            (current, next) if current == next => true,
            (Draft, Processing | Cancelled) => true,
            (Processing, Completed | Cancelled) => true,
            (Cancelled, Draft) => true,
            _ => false,
        }
    }

    pub fn is_deletable(self) -> bool {
        !matches!(self, PayrollStatus::Processing | PayrollStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Iterable as _;

    use super::*;

    #[test]
    fn test_payslip_transitions() {
        use PayslipStatus::*;

        assert!(Draft.can_transition_to(Processed));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(!Draft.can_transition_to(Paid));

        assert!(Processed.can_transition_to(Paid));
        assert!(Processed.can_transition_to(Cancelled));
        assert!(!Processed.can_transition_to(Draft));
    }

    #[test]
    fn test_terminal_payslip_states() {
        for next in PayslipStatus::iter() {
            assert_eq!(PayslipStatus::Paid.can_transition_to(next), next == PayslipStatus::Paid);
            assert_eq!(PayslipStatus::Cancelled.can_transition_to(next), next == PayslipStatus::Cancelled);
        }
    }

    #[test]
    fn test_payslip_lock() {
        assert!(!PayslipStatus::Draft.is_locked());
        assert!(!PayslipStatus::Processed.is_locked());
        assert!(PayslipStatus::Paid.is_locked());
        assert!(PayslipStatus::Cancelled.is_locked());
    }

    #[test]
    fn test_payroll_transitions() {
        use PayrollStatus::*;

        assert!(Draft.can_transition_to(Processing));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(!Draft.can_transition_to(Completed));

        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(!Processing.can_transition_to(Draft));

        for next in PayrollStatus::iter() {
            assert_eq!(Completed.can_transition_to(next), next == Completed);
        }

        assert!(Cancelled.can_transition_to(Draft));
        assert!(!Cancelled.can_transition_to(Processing));
        assert!(!Cancelled.can_transition_to(Completed));
    }

    #[test]
    fn test_payroll_deletable() {
        assert!(PayrollStatus::Draft.is_deletable());
        assert!(PayrollStatus::Cancelled.is_deletable());
        assert!(!PayrollStatus::Processing.is_deletable());
        assert!(!PayrollStatus::Completed.is_deletable());
    }
}
