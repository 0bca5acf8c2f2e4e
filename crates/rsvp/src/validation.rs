//! Input validation for RSVPs and new invitations.
//!
//! Every rule is checked and all failures are reported together, so a form
//! can highlight every problem in one round trip.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{Event, Guest, Invitation, InvitationType, NewInvitation};

/// Largest party a single invitation may cover.
pub const MAX_PARTY_SIZE: u32 = 20;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email pattern"));

/// Check whether `email` has the `local@domain.tld` shape.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Problems with a single guest. `index` is 0-based; messages are 1-based.
#[must_use]
pub fn guest_problems(index: usize, guest: &Guest, invitation_type: InvitationType) -> Vec<String> {
    let n = index + 1;
    let mut problems = Vec::new();

    if guest.name.trim().is_empty() {
        problems.push(format!("Guest {n}: Name is required"));
    }

    if !guest.events.any() {
        problems.push(format!("Guest {n}: Please select at least one event"));
    }

    for event in guest.events.attending() {
        if !invitation_type.can_attend(event) {
            problems.push(format!(
                "Guest {n}: {event} is not included in a {invitation_type} invitation"
            ));
        }
    }

    let entrees = guest.entree_selection.selected();
    if guest.events.attends(Event::Reception) {
        if entrees.is_empty() {
            problems.push(format!(
                "Guest {n}: Please select an entrée for Sunday reception dinner"
            ));
        }
    } else if !entrees.is_empty() {
        problems.push(format!(
            "Guest {n}: Entrée selected without attending the reception"
        ));
    }
    if entrees.len() > 1 {
        problems.push(format!("Guest {n}: Please select only one entrée"));
    }

    problems
}

/// Validate the guest list of an RSVP against its invitation.
///
/// # Errors
///
/// Returns [`Error::Validation`] listing every failed rule.
pub fn validate_submission(invitation: &Invitation, guests: &[Guest]) -> Result<()> {
    let mut problems = Vec::new();

    if guests.is_empty() {
        problems.push("At least one guest is required".to_string());
    }

    let party_size = usize::try_from(invitation.party_size).unwrap_or(usize::MAX);
    if guests.len() > party_size {
        problems.push(format!(
            "Too many guests: invitation is for {} but {} were listed",
            invitation.party_size,
            guests.len()
        ));
    }

    for (index, guest) in guests.iter().enumerate() {
        problems.extend(guest_problems(index, guest, invitation.invitation_type));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation { problems })
    }
}

/// Validate an invitation before it is created.
///
/// # Errors
///
/// Returns [`Error::Validation`] listing every failed rule.
pub fn validate_new_invitation(input: &NewInvitation) -> Result<()> {
    let mut problems = Vec::new();

    if input.primary_guest_name.trim().is_empty() {
        problems.push("Primary guest name is required".to_string());
    }

    let email = input.email.trim();
    if email.is_empty() {
        problems.push("Email address is required".to_string());
    } else if !is_valid_email(email) {
        problems.push("Please enter a valid email address".to_string());
    }

    if !(1..=MAX_PARTY_SIZE).contains(&input.party_size) {
        problems.push(format!("Party size must be between 1 and {MAX_PARTY_SIZE}"));
    }

    if input.id.as_deref().is_some_and(|id| id.trim().is_empty()) {
        problems.push("Invitation id cannot be blank".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation { problems })
    }
}
