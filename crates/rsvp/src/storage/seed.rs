//! Sample invitations for a fresh database.

use crate::model::{InvitationType, NewInvitation};

/// `(id, name, email, party size, type)` for each sample invitation.
const SAMPLES: &[(&str, &str, &str, u32, InvitationType)] = &[
    ("1", "John Smith", "john.smith@email.com", 2, InvitationType::Family),
    ("2", "Sarah Johnson", "sarah.johnson@email.com", 4, InvitationType::Standard),
    ("3", "Michael Brown", "michael.brown@email.com", 1, InvitationType::BridalParty),
    ("4", "Emily Davis", "emily.davis@email.com", 3, InvitationType::PlusOne),
];

/// The sample invitations, in id order.
#[must_use]
pub fn sample_invitations() -> Vec<NewInvitation> {
    SAMPLES
        .iter()
        .map(|&(id, name, email, party_size, kind)| {
            NewInvitation::new(name, email, party_size, kind).with_id(id)
        })
        .collect()
}
