//! Aggregation and export of RSVP responses.
//!
//! Everything here works on [`ResponseGroup`]s: each invitation paired with
//! the guests of its current submission.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    DietaryRestriction, DietaryRestrictions, Entree, EntreeSelection, Event, EventAttendance,
    Guest, Invitation, Submission,
};

/// An invitation with the guests of its current submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseGroup {
    /// The invitation.
    pub invitation: Invitation,
    /// Number of the current submission, absent before the first RSVP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_number: Option<u32>,
    /// When the current submission was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Guests on the current submission.
    pub guests: Vec<Guest>,
}

impl ResponseGroup {
    /// Pair an invitation with its current submission, if any.
    #[must_use]
    pub fn new(invitation: Invitation, current: Option<Submission>) -> Self {
        match current {
            Some(submission) => Self {
                invitation,
                submission_number: Some(submission.submission_number),
                submitted_at: Some(submission.submitted_at),
                guests: submission.guests,
            },
            None => Self {
                invitation,
                submission_number: None,
                submitted_at: None,
                guests: Vec::new(),
            },
        }
    }

    /// Whether the invitation has a current submission.
    #[must_use]
    pub fn has_responded(&self) -> bool {
        self.submission_number.is_some()
    }
}

/// Headline numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Invitations sent.
    pub total_invitations: usize,
    /// Invitations with a current submission.
    #[serde(rename = "completedRSVPs")]
    pub completed_rsvps: usize,
    /// `completed / total` as a percentage with one decimal, e.g. `50.0%`.
    pub response_rate: String,
    /// Guests across all current submissions.
    pub total_guests: usize,
}

/// Guests attending each event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct EventCounts {
    pub bowling: usize,
    pub beers_and_cheers: usize,
    pub ceremony: usize,
    pub cocktail_hour: usize,
    pub reception: usize,
    pub after_party_brunch: usize,
}

impl EventCounts {
    /// Count for one event.
    #[must_use]
    pub fn get(&self, event: Event) -> usize {
        match event {
            Event::Bowling => self.bowling,
            Event::BeersAndCheers => self.beers_and_cheers,
            Event::Ceremony => self.ceremony,
            Event::CocktailHour => self.cocktail_hour,
            Event::Reception => self.reception,
            Event::AfterPartyBrunch => self.after_party_brunch,
        }
    }

    fn record(&mut self, events: &EventAttendance) {
        self.bowling += usize::from(events.bowling);
        self.beers_and_cheers += usize::from(events.beers_and_cheers);
        self.ceremony += usize::from(events.ceremony);
        self.cocktail_hour += usize::from(events.cocktail_hour);
        self.reception += usize::from(events.reception);
        self.after_party_brunch += usize::from(events.after_party_brunch);
    }
}

/// Guests choosing each entrée.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct EntreeCounts {
    pub beef: usize,
    pub fish: usize,
    pub vegetarian_vegan: usize,
    pub kids_chicken: usize,
}

impl EntreeCounts {
    /// Count for one entrée.
    #[must_use]
    pub fn get(&self, entree: Entree) -> usize {
        match entree {
            Entree::Beef => self.beef,
            Entree::Fish => self.fish,
            Entree::VegetarianVegan => self.vegetarian_vegan,
            Entree::KidsChicken => self.kids_chicken,
        }
    }

    fn record(&mut self, selection: &EntreeSelection) {
        self.beef += usize::from(selection.beef);
        self.fish += usize::from(selection.fish);
        self.vegetarian_vegan += usize::from(selection.vegetarian_vegan);
        self.kids_chicken += usize::from(selection.kids_chicken);
    }
}

/// Guests with each dietary restriction. `other` counts non-blank free text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct DietaryCounts {
    pub vegetarian: usize,
    pub vegan: usize,
    pub gluten_free: usize,
    pub dairy_free: usize,
    pub nut_allergy: usize,
    pub shellfish: usize,
    pub kosher: usize,
    pub halal: usize,
    pub other: usize,
}

impl DietaryCounts {
    /// Count for one checkbox restriction.
    #[must_use]
    pub fn get(&self, restriction: DietaryRestriction) -> usize {
        match restriction {
            DietaryRestriction::Vegetarian => self.vegetarian,
            DietaryRestriction::Vegan => self.vegan,
            DietaryRestriction::GlutenFree => self.gluten_free,
            DietaryRestriction::DairyFree => self.dairy_free,
            DietaryRestriction::NutAllergy => self.nut_allergy,
            DietaryRestriction::Shellfish => self.shellfish,
            DietaryRestriction::Kosher => self.kosher,
            DietaryRestriction::Halal => self.halal,
        }
    }

    fn record(&mut self, dietary: &DietaryRestrictions) {
        self.vegetarian += usize::from(dietary.vegetarian);
        self.vegan += usize::from(dietary.vegan);
        self.gluten_free += usize::from(dietary.gluten_free);
        self.dairy_free += usize::from(dietary.dairy_free);
        self.nut_allergy += usize::from(dietary.nut_allergy);
        self.shellfish += usize::from(dietary.shellfish);
        self.kosher += usize::from(dietary.kosher);
        self.halal += usize::from(dietary.halal);
        self.other += usize::from(dietary.other_text().is_some());
    }
}

/// Aggregate view of every current response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Headline numbers.
    #[serde(rename = "summary")]
    pub totals: Totals,
    /// Per-event attendance.
    pub event_attendance: EventCounts,
    /// Per-entrée choices.
    pub entree_selections: EntreeCounts,
    /// Per-restriction counts.
    pub dietary_restrictions: DietaryCounts,
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    #[serde(flatten)]
    summary: &'a Summary,
    responses: &'a [ResponseGroup],
}

/// Compute totals and per-category counts over the current responses.
#[must_use]
pub fn summarize(groups: &[ResponseGroup]) -> Summary {
    let mut event_attendance = EventCounts::default();
    let mut entree_selections = EntreeCounts::default();
    let mut dietary_restrictions = DietaryCounts::default();

    for guest in groups.iter().flat_map(|g| &g.guests) {
        event_attendance.record(&guest.events);
        entree_selections.record(&guest.entree_selection);
        dietary_restrictions.record(&guest.dietary_restrictions);
    }

    let total_invitations = groups.len();
    let completed_rsvps = groups.iter().filter(|g| g.has_responded()).count();

    Summary {
        totals: Totals {
            total_invitations,
            completed_rsvps,
            response_rate: response_rate(completed_rsvps, total_invitations),
            total_guests: groups.iter().map(|g| g.guests.len()).sum(),
        },
        event_attendance,
        entree_selections,
        dietary_restrictions,
    }
}

#[allow(clippy::cast_precision_loss)]
fn response_rate(completed: usize, total: usize) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", completed as f64 * 100.0 / total as f64)
}

/// Dietary restrictions as one cell: labels joined by `; `, or `None`.
#[must_use]
pub fn dietary_summary(dietary: &DietaryRestrictions) -> String {
    let labels = dietary.labels();
    if labels.is_empty() {
        "None".to_string()
    } else {
        labels.join("; ")
    }
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// One CSV row per guest on a current submission, preceded by a header.
///
/// Every field is quoted and rows are separated by `\n`.
#[must_use]
pub fn to_csv(groups: &[ResponseGroup]) -> String {
    let mut header: Vec<String> = vec![
        "Primary Guest".to_string(),
        "Email".to_string(),
        "Guest Name".to_string(),
    ];
    header.extend(Event::ALL.iter().map(ToString::to_string));
    header.extend(Entree::ALL.iter().map(|e| format!("Entrée: {}", e.label())));
    header.push("Dietary Restrictions".to_string());

    let mut rows = vec![header];
    for group in groups {
        for guest in &group.guests {
            let mut row = vec![
                group.invitation.primary_guest_name.clone(),
                group.invitation.email.clone(),
                guest.name.clone(),
            ];
            row.extend(
                Event::ALL
                    .iter()
                    .map(|e| yes_no(guest.events.attends(*e)).to_string()),
            );
            row.extend(
                Entree::ALL
                    .iter()
                    .map(|e| yes_no(guest.entree_selection.has(*e)).to_string()),
            );
            row.push(dietary_summary(&guest.dietary_restrictions));
            rows.push(row);
        }
    }

    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| csv_field(cell))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty JSON of the response groups.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(groups: &[ResponseGroup]) -> Result<String> {
    Ok(serde_json::to_string_pretty(groups)?)
}

/// Pretty JSON of the summary followed by every response group.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn summary_report(groups: &[ResponseGroup]) -> Result<String> {
    let summary = summarize(groups);
    Ok(serde_json::to_string_pretty(&SummaryReport {
        summary: &summary,
        responses: groups,
    })?)
}

/// Plain-text recap of a submission, addressed to the primary guest.
#[must_use]
pub fn confirmation_text(event_name: &str, invitation: &Invitation, submission: &Submission) -> String {
    let mut text = format!("Dear {},\n\n", invitation.primary_guest_name);

    if submission.submission_number > 1 {
        text.push_str("Thank you for updating your RSVP! Here's your latest response:\n\n");
        text.push_str(&format!(
            "This is submission #{} for your party.\n\n",
            submission.submission_number
        ));
    } else {
        text.push_str("Thank you for your RSVP! Here's a summary of your response:\n\n");
    }

    let count = submission.guests.len();
    text.push_str(&format!(
        "Party Size: {count} {}\n\n",
        if count == 1 { "guest" } else { "guests" }
    ));

    for (index, guest) in submission.guests.iter().enumerate() {
        text.push_str(&format!("Guest {}: {}\n", index + 1, guest.name));

        let events: Vec<String> = guest.events.attending().map(|e| e.to_string()).collect();
        let attending = if events.is_empty() {
            "No events selected".to_string()
        } else {
            events.join(", ")
        };
        text.push_str(&format!("  Attending: {attending}\n"));

        if guest.events.reception {
            let entree = guest
                .entree_selection
                .choice()
                .map_or("No selection", Entree::label);
            text.push_str(&format!("  Reception Entrée: {entree}\n"));
        }

        let labels = guest.dietary_restrictions.labels();
        let dietary = if labels.is_empty() {
            "None specified".to_string()
        } else {
            labels.join(", ")
        };
        text.push_str(&format!("  Dietary Restrictions: {dietary}\n\n"));
    }

    if submission.submission_number > 1 {
        text.push_str(
            "Remember: You can update your RSVP anytime by searching for your name again.\n\n",
        );
    }

    text.push_str(&format!("We're so excited to celebrate {event_name} with you!"));
    text
}

/// Download formats offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One row per guest.
    #[default]
    Csv,
    /// Response groups as JSON.
    Json,
    /// Summary counts plus response groups as JSON.
    Summary,
}

impl ExportFormat {
    /// MIME type of the rendered export.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json | Self::Summary => "application/json",
        }
    }

    /// Render `groups` in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render(self, groups: &[ResponseGroup]) -> Result<String> {
        match self {
            Self::Csv => Ok(to_csv(groups)),
            Self::Json => to_json(groups),
            Self::Summary => summary_report(groups),
        }
    }

    /// Download name, e.g. `lily-terron-wedding-rsvp-2026-06-01.csv`.
    #[must_use]
    pub fn filename(self, event_name: &str, date: NaiveDate) -> String {
        let slug = slugify(event_name);
        let date = date.format("%Y-%m-%d");
        match self {
            Self::Csv => format!("{slug}-rsvp-{date}.csv"),
            Self::Json => format!("{slug}-rsvp-{date}.json"),
            Self::Summary => format!("{slug}-summary-{date}.json"),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "summary" => Ok(Self::Summary),
            other => Err(Error::invalid(format!(
                "unknown export format: {other} (expected csv, json or summary)"
            ))),
        }
    }
}

/// Lower-case the name and join its alphanumeric runs with `-`.
fn slugify(name: &str) -> String {
    let slug = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "event".to_string()
    } else {
        slug
    }
}
