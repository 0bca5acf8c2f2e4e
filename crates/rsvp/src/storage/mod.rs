//! Storage layer for the RSVP service.
//!
//! This module provides `SQLite`-based persistent storage for invitations,
//! the RSVP submissions made against them, and the guests listed on each
//! submission.

pub mod migrations;
pub mod schema;
pub mod seed;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{
    DietaryRestrictions, EntreeSelection, EventAttendance, Guest, Invitation, InvitationMetadata,
    InvitationType, NewInvitation, RsvpStatus, Submission,
};
use crate::report::ResponseGroup;
use crate::validation;

const INVITATION_COLUMNS: &str = "id, primary_guest_name, email, party_size, rsvp_status, \
     invitation_type, phone, address, special_notes, table_assignment, \
     invitation_sent_date, rsvp_deadline, created_at, updated_at";

const SUBMISSION_COLUMNS: &str = "id, invitation_id, submission_number, submitted_at, is_current";

const GUEST_COLUMNS: &str = "name, bowling, beers_and_cheers, ceremony, cocktail_hour, \
     reception, after_party_brunch, entree_beef, entree_fish, entree_vegetarian_vegan, \
     entree_kids_chicken, vegetarian, vegan, gluten_free, dairy_free, nut_allergy, \
     shellfish, kosher, halal, other_dietary";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage engine for invitations and RSVPs.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Invitation creation, lookup by name, filtering and deletion
/// - Versioned RSVP submissions, written atomically
/// - The current-response view used for reporting
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a trivial query to prove the database answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn check_connection(&self) -> Result<()> {
        let one: i64 = self.conn.query_row("SELECT 1", [], |row| row.get(0))?;
        debug!("Database connection check returned {}", one);
        Ok(())
    }

    /// (Re)create tables and indexes. Safe to call on an existing database.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails.
    pub fn initialize(&self) -> Result<()> {
        migrations::initialize_schema(&self.conn)?;
        info!("Database schema initialized");
        Ok(())
    }

    // === Invitations ===

    /// Create an invitation.
    ///
    /// The input is validated first. Name and e-mail are trimmed and the
    /// e-mail is lower-cased. An id is generated when none is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for bad input, [`Error::Conflict`] if
    /// the id is taken, or a database error.
    pub fn create_invitation(&self, input: &NewInvitation) -> Result<Invitation> {
        validation::validate_new_invitation(input)?;

        let id = input
            .id
            .as_deref()
            .map_or_else(|| new_id("inv"), |id| id.trim().to_string());

        if self.invitation_exists(&id)? {
            return Err(Error::conflict(format!("invitation {id}")));
        }

        let now = Utc::now();
        let invitation = Invitation {
            id,
            primary_guest_name: input.primary_guest_name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            party_size: input.party_size,
            invitation_type: input.invitation_type,
            rsvp_status: RsvpStatus::Pending,
            metadata: input.metadata.clone().normalized(),
            created_at: now,
            updated_at: now,
        };

        let metadata = &invitation.metadata;
        self.conn.execute(
            r"
            INSERT INTO invitations (
                id, primary_guest_name, email, party_size, rsvp_status, invitation_type,
                phone, address, special_notes, table_assignment,
                invitation_sent_date, rsvp_deadline, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ",
            params![
                invitation.id,
                invitation.primary_guest_name,
                invitation.email,
                invitation.party_size,
                invitation.rsvp_status.as_str(),
                invitation.invitation_type.as_str(),
                metadata.phone,
                metadata.address,
                metadata.special_notes,
                metadata.table_assignment,
                metadata.invitation_sent_date.map(format_date),
                metadata.rsvp_deadline.map(format_date),
                timestamp(invitation.created_at),
                timestamp(invitation.updated_at),
            ],
        )?;

        info!(
            "Created invitation {} for {}",
            invitation.id, invitation.primary_guest_name
        );
        Ok(invitation)
    }

    fn invitation_exists(&self, id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM invitations WHERE id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get an invitation by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_invitation(&self, id: &str) -> Result<Option<Invitation>> {
        let sql = format!("SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = ?1");
        let invitation = self
            .conn
            .query_row(&sql, [id], Self::row_to_invitation)
            .optional()?;
        Ok(invitation)
    }

    /// Find the invitation a guest is looking for.
    ///
    /// Matches `query` as a case-insensitive substring of the primary guest
    /// name and returns the first match in name order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank query, or a database error.
    pub fn find_invitation_by_name(&self, query: &str) -> Result<Option<Invitation>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::invalid("Please enter a name to search"));
        }

        let needle = fold_case(query);
        let sql = format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations \
             ORDER BY primary_guest_name COLLATE NOCASE, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query_map([], Self::row_to_invitation)?;
        let invitation = rows
            .find(|row| {
                row.as_ref()
                    .map_or(true, |i| fold_case(&i.primary_guest_name).contains(&needle))
            })
            .transpose()?;

        debug!("Name lookup {:?} matched {}", query, invitation.is_some());
        Ok(invitation)
    }

    /// List all invitations, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_invitations(&self) -> Result<Vec<Invitation>> {
        let sql = format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let invitations = stmt
            .query_map([], Self::row_to_invitation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(invitations)
    }

    /// Filter invitations by a case-insensitive substring of the name or
    /// e-mail, newest first. A blank term lists everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn search_invitations(&self, term: &str) -> Result<Vec<Invitation>> {
        let term = term.trim();
        if term.is_empty() {
            return self.list_invitations();
        }

        let needle = fold_case(term);
        let invitations = self
            .list_invitations()?
            .into_iter()
            .filter(|i| {
                fold_case(&i.primary_guest_name).contains(&needle)
                    || fold_case(&i.email).contains(&needle)
            })
            .collect();
        Ok(invitations)
    }

    /// Delete an invitation together with its submissions and guests.
    ///
    /// Returns `true` if an invitation was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_invitation(&mut self, id: &str) -> Result<bool> {
        let tx = self.conn.transaction()?;
        tx.execute(
            r"
            DELETE FROM guests WHERE submission_id IN (
                SELECT id FROM rsvp_submissions WHERE invitation_id = ?1
            )
            ",
            [id],
        )?;
        tx.execute("DELETE FROM rsvp_submissions WHERE invitation_id = ?1", [id])?;
        let affected = tx.execute("DELETE FROM invitations WHERE id = ?1", [id])?;
        tx.commit()?;

        if affected > 0 {
            info!("Deleted invitation {}", id);
        }
        Ok(affected > 0)
    }

    /// Count invitations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_invitations(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM invitations", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert the sample invitations if the database has none.
    ///
    /// Returns how many were inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn seed_sample_data(&self) -> Result<usize> {
        if self.count_invitations()? > 0 {
            info!("Sample data already exists, skipping seed");
            return Ok(0);
        }

        let samples = seed::sample_invitations();
        for sample in &samples {
            self.create_invitation(sample)?;
        }
        info!("Seeded {} sample invitations", samples.len());
        Ok(samples.len())
    }

    // === Submissions ===

    /// Record an RSVP for an invitation.
    ///
    /// The guests are validated against the invitation. The new submission
    /// becomes the current one, every earlier submission is marked
    /// superseded, and the invitation status moves to `completed` (first
    /// response) or `updated`. All writes happen in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown invitation,
    /// [`Error::Validation`] for a bad guest list, or a database error.
    pub fn submit_rsvp(&mut self, invitation_id: &str, guests: &[Guest]) -> Result<Submission> {
        let invitation = self
            .get_invitation(invitation_id)?
            .ok_or_else(|| Error::not_found("Invitation"))?;
        validation::validate_submission(&invitation, guests)?;

        let guests: Vec<Guest> = guests.iter().map(cleaned_guest).collect();
        let submission_id = new_id("sub");
        let submitted_at = Utc::now();

        let tx = self.conn.transaction()?;

        let submission_number: u32 = tx.query_row(
            r"
            SELECT COALESCE(MAX(submission_number), 0) + 1
            FROM rsvp_submissions WHERE invitation_id = ?1
            ",
            [invitation_id],
            |row| row.get(0),
        )?;

        tx.execute(
            "UPDATE rsvp_submissions SET is_current = 0 WHERE invitation_id = ?1",
            [invitation_id],
        )?;

        tx.execute(
            r"
            INSERT INTO rsvp_submissions (id, invitation_id, submission_number, submitted_at, is_current)
            VALUES (?1, ?2, ?3, ?4, 1)
            ",
            params![
                submission_id,
                invitation_id,
                submission_number,
                timestamp(submitted_at)
            ],
        )?;

        for (position, guest) in guests.iter().enumerate() {
            insert_guest(&tx, &submission_id, position, guest)?;
        }

        let status = if submission_number == 1 {
            RsvpStatus::Completed
        } else {
            RsvpStatus::Updated
        };
        tx.execute(
            "UPDATE invitations SET rsvp_status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), timestamp(submitted_at), invitation_id],
        )?;

        tx.commit()?;

        info!(
            "Recorded submission #{} for invitation {} ({} guests)",
            submission_number,
            invitation_id,
            guests.len()
        );

        Ok(Submission {
            id: submission_id,
            invitation_id: invitation_id.to_string(),
            submission_number,
            submitted_at,
            is_current: true,
            guests,
        })
    }

    /// All submissions for an invitation, oldest first, with their guests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown invitation, or a database error.
    pub fn submission_history(&self, invitation_id: &str) -> Result<Vec<Submission>> {
        if !self.invitation_exists(invitation_id)? {
            return Err(Error::not_found("Invitation"));
        }

        let sql = format!(
            r"
            SELECT {SUBMISSION_COLUMNS} FROM rsvp_submissions
            WHERE invitation_id = ?1 ORDER BY submission_number
            "
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut submissions = stmt
            .query_map([invitation_id], Self::row_to_submission)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for submission in &mut submissions {
            submission.guests = self.guests_for(&submission.id)?;
        }
        Ok(submissions)
    }

    /// The current submission for an invitation, if it has responded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn current_submission(&self, invitation_id: &str) -> Result<Option<Submission>> {
        let sql = format!(
            r"
            SELECT {SUBMISSION_COLUMNS} FROM rsvp_submissions
            WHERE invitation_id = ?1 AND is_current = 1
            ORDER BY submission_number DESC LIMIT 1
            "
        );
        let submission = self
            .conn
            .query_row(&sql, [invitation_id], Self::row_to_submission)
            .optional()?;

        match submission {
            Some(mut submission) => {
                submission.guests = self.guests_for(&submission.id)?;
                Ok(Some(submission))
            }
            None => Ok(None),
        }
    }

    /// Every invitation with the guests of its current submission, ordered
    /// by primary guest name. Invitations without a response have no guests.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn current_responses(&self) -> Result<Vec<ResponseGroup>> {
        let sql = format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations \
             ORDER BY primary_guest_name COLLATE NOCASE, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let invitations = stmt
            .query_map([], Self::row_to_invitation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut groups = Vec::with_capacity(invitations.len());
        for invitation in invitations {
            let submission = self.current_submission(&invitation.id)?;
            groups.push(ResponseGroup::new(invitation, submission));
        }
        Ok(groups)
    }

    fn guests_for(&self, submission_id: &str) -> Result<Vec<Guest>> {
        let sql = format!(
            "SELECT {GUEST_COLUMNS} FROM guests WHERE submission_id = ?1 ORDER BY position"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let guests = stmt
            .query_map([submission_id], Self::row_to_guest)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(guests)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let invitations = self.count_invitations()?;
        let responded: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM invitations WHERE rsvp_status != 'pending'",
            [],
            |row| row.get(0),
        )?;
        let submissions: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM rsvp_submissions", [], |row| row.get(0))?;
        let current_guests: i64 = self.conn.query_row(
            r"
            SELECT COUNT(*) FROM guests g
            JOIN rsvp_submissions s ON s.id = g.submission_id
            WHERE s.is_current = 1
            ",
            [],
            |row| row.get(0),
        )?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            invitations,
            responded,
            submissions,
            current_guests,
            db_size_bytes,
        })
    }

    // === Row mapping ===

    fn row_to_invitation(row: &rusqlite::Row) -> rusqlite::Result<Invitation> {
        let status_str: String = row.get(4)?;
        let type_str: String = row.get(5)?;
        let sent: Option<String> = row.get(10)?;
        let deadline: Option<String> = row.get(11)?;
        let created: String = row.get(12)?;
        let updated: String = row.get(13)?;

        let rsvp_status = status_str.parse().unwrap_or_else(|_| {
            warn!("Unknown rsvp status: {}, defaulting to pending", status_str);
            RsvpStatus::Pending
        });
        let invitation_type = type_str.parse().unwrap_or_else(|_| {
            warn!("Unknown invitation type: {}, defaulting to standard", type_str);
            InvitationType::Standard
        });

        Ok(Invitation {
            id: row.get(0)?,
            primary_guest_name: row.get(1)?,
            email: row.get(2)?,
            party_size: row.get(3)?,
            invitation_type,
            rsvp_status,
            metadata: InvitationMetadata {
                phone: row.get(6)?,
                address: row.get(7)?,
                special_notes: row.get(8)?,
                table_assignment: row.get(9)?,
                invitation_sent_date: sent.as_deref().and_then(parse_date),
                rsvp_deadline: deadline.as_deref().and_then(parse_date),
            },
            created_at: parse_timestamp(&created),
            updated_at: parse_timestamp(&updated),
        })
    }

    fn row_to_submission(row: &rusqlite::Row) -> rusqlite::Result<Submission> {
        let submitted: String = row.get(3)?;
        Ok(Submission {
            id: row.get(0)?,
            invitation_id: row.get(1)?,
            submission_number: row.get(2)?,
            submitted_at: parse_timestamp(&submitted),
            is_current: row.get(4)?,
            guests: Vec::new(),
        })
    }

    fn row_to_guest(row: &rusqlite::Row) -> rusqlite::Result<Guest> {
        let other: Option<String> = row.get(19)?;
        Ok(Guest {
            name: row.get(0)?,
            events: EventAttendance {
                bowling: row.get(1)?,
                beers_and_cheers: row.get(2)?,
                ceremony: row.get(3)?,
                cocktail_hour: row.get(4)?,
                reception: row.get(5)?,
                after_party_brunch: row.get(6)?,
            },
            entree_selection: EntreeSelection {
                beef: row.get(7)?,
                fish: row.get(8)?,
                vegetarian_vegan: row.get(9)?,
                kids_chicken: row.get(10)?,
            },
            dietary_restrictions: DietaryRestrictions {
                vegetarian: row.get(11)?,
                vegan: row.get(12)?,
                gluten_free: row.get(13)?,
                dairy_free: row.get(14)?,
                nut_allergy: row.get(15)?,
                shellfish: row.get(16)?,
                kosher: row.get(17)?,
                halal: row.get(18)?,
                other: other.unwrap_or_default(),
            },
        })
    }
}

fn insert_guest(conn: &Connection, submission_id: &str, position: usize, guest: &Guest) -> Result<()> {
    let events = &guest.events;
    let entree = &guest.entree_selection;
    let dietary = &guest.dietary_restrictions;

    conn.execute(
        &format!(
            r"
            INSERT INTO guests (id, submission_id, position, {GUEST_COLUMNS})
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                    ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)
            "
        ),
        params![
            new_id("guest"),
            submission_id,
            i64::try_from(position).unwrap_or(i64::MAX),
            guest.name,
            events.bowling,
            events.beers_and_cheers,
            events.ceremony,
            events.cocktail_hour,
            events.reception,
            events.after_party_brunch,
            entree.beef,
            entree.fish,
            entree.vegetarian_vegan,
            entree.kids_chicken,
            dietary.vegetarian,
            dietary.vegan,
            dietary.gluten_free,
            dietary.dairy_free,
            dietary.nut_allergy,
            dietary.shellfish,
            dietary.kosher,
            dietary.halal,
            dietary.other_text(),
        ],
    )?;
    Ok(())
}

/// The guest as it will be stored: trimmed name and free text.
fn cleaned_guest(guest: &Guest) -> Guest {
    let mut cleaned = guest.clone();
    cleaned.name = guest.name.trim().to_string();
    cleaned.dietary_restrictions.other = guest
        .dietary_restrictions
        .other_text()
        .unwrap_or_default()
        .to_string();
    cleaned
}

fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Fixed-width RFC 3339 so text ordering matches time ordering.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(
        |_| {
            warn!("Unparseable timestamp {:?}, using now", s);
            Utc::now()
        },
        |dt| dt.with_timezone(&Utc),
    )
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Unicode lower-casing used for name and e-mail matching. `SQLite`'s own
/// `LIKE` and `NOCASE` only fold ASCII.
fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of invitations.
    pub invitations: i64,
    /// Invitations that have responded at least once.
    pub responded: i64,
    /// Submissions of every version.
    pub submissions: i64,
    /// Guests on current submissions.
    pub current_guests: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
