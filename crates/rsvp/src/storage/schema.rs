//! `SQLite` schema definitions for the RSVP store.
//!
//! Three tables form a strict hierarchy: an invitation owns its
//! submissions, and a submission owns its guests.

/// SQL statement to create the invitations table.
pub const CREATE_INVITATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS invitations (
    id TEXT PRIMARY KEY,
    primary_guest_name TEXT NOT NULL,
    email TEXT NOT NULL,
    party_size INTEGER NOT NULL,
    rsvp_status TEXT NOT NULL DEFAULT 'pending',
    invitation_type TEXT NOT NULL,
    phone TEXT,
    address TEXT,
    special_notes TEXT,
    table_assignment TEXT,
    invitation_sent_date TEXT,
    rsvp_deadline TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the submissions table.
pub const CREATE_SUBMISSIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS rsvp_submissions (
    id TEXT PRIMARY KEY,
    invitation_id TEXT NOT NULL REFERENCES invitations(id) ON DELETE CASCADE,
    submission_number INTEGER NOT NULL,
    submitted_at TEXT NOT NULL,
    is_current INTEGER NOT NULL DEFAULT 1,
    UNIQUE (invitation_id, submission_number)
)
";

/// SQL statement to create the guests table.
///
/// `position` keeps guests in the order they were entered on the form.
pub const CREATE_GUESTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS guests (
    id TEXT PRIMARY KEY,
    submission_id TEXT NOT NULL REFERENCES rsvp_submissions(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    bowling INTEGER NOT NULL DEFAULT 0,
    beers_and_cheers INTEGER NOT NULL DEFAULT 0,
    ceremony INTEGER NOT NULL DEFAULT 0,
    cocktail_hour INTEGER NOT NULL DEFAULT 0,
    reception INTEGER NOT NULL DEFAULT 0,
    after_party_brunch INTEGER NOT NULL DEFAULT 0,
    entree_beef INTEGER NOT NULL DEFAULT 0,
    entree_fish INTEGER NOT NULL DEFAULT 0,
    entree_vegetarian_vegan INTEGER NOT NULL DEFAULT 0,
    entree_kids_chicken INTEGER NOT NULL DEFAULT 0,
    vegetarian INTEGER NOT NULL DEFAULT 0,
    vegan INTEGER NOT NULL DEFAULT 0,
    gluten_free INTEGER NOT NULL DEFAULT 0,
    dairy_free INTEGER NOT NULL DEFAULT 0,
    nut_allergy INTEGER NOT NULL DEFAULT 0,
    shellfish INTEGER NOT NULL DEFAULT 0,
    kosher INTEGER NOT NULL DEFAULT 0,
    halal INTEGER NOT NULL DEFAULT 0,
    other_dietary TEXT
)
";

/// Index for e-mail lookups from the dashboard filter.
pub const CREATE_EMAIL_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_invitations_email ON invitations(email)
";

/// Index for guest name searches.
pub const CREATE_NAME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_invitations_name ON invitations(primary_guest_name)
";

/// Index for finding an invitation's submissions.
pub const CREATE_SUBMISSION_INVITATION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_submissions_invitation ON rsvp_submissions(invitation_id)
";

/// Index for finding a submission's guests.
pub const CREATE_GUEST_SUBMISSION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_guests_submission ON guests(submission_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_INVITATIONS_TABLE,
    CREATE_SUBMISSIONS_TABLE,
    CREATE_GUESTS_TABLE,
    CREATE_EMAIL_INDEX,
    CREATE_NAME_INDEX,
    CREATE_SUBMISSION_INVITATION_INDEX,
    CREATE_GUEST_SUBMISSION_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.trim().is_empty());
        }
    }

    #[test]
    fn test_tables_created_before_indexes() {
        let first_index = SCHEMA_STATEMENTS
            .iter()
            .position(|s| s.contains("CREATE INDEX"))
            .unwrap();
        let last_child_table = SCHEMA_STATEMENTS
            .iter()
            .position(|s| s.contains("CREATE TABLE IF NOT EXISTS guests"))
            .unwrap();
        assert!(last_child_table < first_index);
    }

    #[test]
    fn test_guests_table_has_every_flag() {
        for column in [
            "bowling",
            "beers_and_cheers",
            "ceremony",
            "cocktail_hour",
            "reception",
            "after_party_brunch",
            "entree_beef",
            "entree_fish",
            "entree_vegetarian_vegan",
            "entree_kids_chicken",
            "vegetarian",
            "vegan",
            "gluten_free",
            "dairy_free",
            "nut_allergy",
            "shellfish",
            "kosher",
            "halal",
            "other_dietary",
        ] {
            assert!(
                CREATE_GUESTS_TABLE.contains(&format!("    {column} ")),
                "missing column {column}"
            );
        }
    }

    #[test]
    fn test_submissions_are_unique_per_invitation() {
        assert!(CREATE_SUBMISSIONS_TABLE.contains("UNIQUE (invitation_id, submission_number)"));
    }
}
