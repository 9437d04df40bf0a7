use crate::db_types::CanonicalStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Apply(CanonicalStatus),
    /// The row is in a terminal status
    Terminal,
    /// The row is held by a human
    ManualHold,
    /// The row already has the resulting status
    Unchanged,
}

/// Decides what a reported status does to a row whose current status is `prior`.
pub fn next_status(prior: Option<CanonicalStatus>, reported: CanonicalStatus) -> Transition {
    if let Some(prior) = prior {
        if prior.is_manual_hold() {
            return Transition::ManualHold;
        }
        if prior.is_terminal() {
            return Transition::Terminal;
        }
    }
    let target = match (prior, reported) {
        (Some(CanonicalStatus::Incident), CanonicalStatus::Delivered) => CanonicalStatus::DeliveredAfterIncident,
        _ => reported,
    };
    if prior == Some(target) {
        Transition::Unchanged
    } else {
        Transition::Apply(target)
    }
}
