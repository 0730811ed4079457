//! Approval aggregation: folds the votes on a form (or the single vote on a
//! document) into one derived decision.

use super::domain::{ApprovalVote, Decision};

/// Any rejection fails the whole item immediately; approval requires every
/// seeded vote to be Approved; anything else is still Pending. Votes are
/// seeded one per required role at submission, so a full scan of `votes`
/// covers exactly the required role set.
pub fn derive_status(votes: &[ApprovalVote]) -> Decision {
    if votes.is_empty() {
        return Decision::Pending;
    }

    let mut all_approved = true;
    for vote in votes {
        match vote.decision {
            Decision::Rejected => return Decision::Rejected,
            Decision::Pending => all_approved = false,
            Decision::Approved => {}
        }
    }

    if all_approved {
        Decision::Approved
    } else {
        Decision::Pending
    }
}
