//! Core RSVP types.
//!
//! This module defines the records the service stores and exchanges:
//! invitations, the submissions made against them, and the guests inside
//! each submission. JSON field names follow the web client (`camelCase`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// Which group of events an invitation grants access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvitationType {
    /// Ceremony weekend without the extras.
    #[default]
    Standard,
    /// Adds the Monday brunch.
    Family,
    /// Adds Friday bowling.
    BridalParty,
    /// Same access as standard, for guests bringing a companion.
    PlusOne,
}

impl InvitationType {
    /// All invitation types, in display order.
    pub const ALL: [Self; 4] = [Self::Standard, Self::Family, Self::BridalParty, Self::PlusOne];

    /// Stable identifier used in storage and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Family => "family",
            Self::BridalParty => "bridal-party",
            Self::PlusOne => "plus-one",
        }
    }

    /// Events guests on this invitation may attend.
    #[must_use]
    pub fn events(self) -> &'static [Event] {
        const BASE: &[Event] = &[
            Event::BeersAndCheers,
            Event::Ceremony,
            Event::CocktailHour,
            Event::Reception,
        ];
        match self {
            Self::Standard | Self::PlusOne => BASE,
            Self::Family => &[
                Event::BeersAndCheers,
                Event::Ceremony,
                Event::CocktailHour,
                Event::Reception,
                Event::AfterPartyBrunch,
            ],
            Self::BridalParty => &[
                Event::Bowling,
                Event::BeersAndCheers,
                Event::Ceremony,
                Event::CocktailHour,
                Event::Reception,
            ],
        }
    }

    /// Check whether guests on this invitation may attend `event`.
    #[must_use]
    pub fn can_attend(self, event: Event) -> bool {
        self.events().contains(&event)
    }
}

impl fmt::Display for InvitationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvitationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::invalid(format!("unknown invitation type: {s}")))
    }
}

/// Where an invitation is in the response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    /// No response yet.
    #[default]
    Pending,
    /// Responded once.
    Completed,
    /// Responded more than once.
    Updated,
}

impl RsvpStatus {
    /// Stable identifier used in storage and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Updated => "updated",
        }
    }

    /// Check whether the invitation has been answered.
    #[must_use]
    pub fn has_responded(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "updated" => Ok(Self::Updated),
            other => Err(Error::invalid(format!("unknown rsvp status: {other}"))),
        }
    }
}

/// One event of the wedding weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Event {
    /// Friday bowling.
    Bowling,
    /// Saturday get-together.
    BeersAndCheers,
    /// Sunday ceremony.
    Ceremony,
    /// Sunday cocktail hour.
    CocktailHour,
    /// Sunday reception dinner; the only event with an entrée.
    Reception,
    /// Monday brunch.
    AfterPartyBrunch,
}

impl Event {
    /// All events in schedule order.
    pub const ALL: [Self; 6] = [
        Self::Bowling,
        Self::BeersAndCheers,
        Self::Ceremony,
        Self::CocktailHour,
        Self::Reception,
        Self::AfterPartyBrunch,
    ];

    /// Day of the weekend the event takes place.
    #[must_use]
    pub fn day(self) -> &'static str {
        match self {
            Self::Bowling => "Friday",
            Self::BeersAndCheers => "Saturday",
            Self::Ceremony | Self::CocktailHour | Self::Reception => "Sunday",
            Self::AfterPartyBrunch => "Monday",
        }
    }

    /// Human readable name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Bowling => "Bowling",
            Self::BeersAndCheers => "Beers & Cheers",
            Self::Ceremony => "Ceremony",
            Self::CocktailHour => "Cocktail Hour",
            Self::Reception => "Reception",
            Self::AfterPartyBrunch => "After-Party Brunch",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.day(), self.label())
    }
}

/// Reception dinner choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Entree {
    /// Beef entrée.
    Beef,
    /// Fish entrée.
    Fish,
    /// Vegetarian/vegan entrée.
    VegetarianVegan,
    /// Children's chicken plate.
    KidsChicken,
}

impl Entree {
    /// All entrées in menu order.
    pub const ALL: [Self; 4] = [Self::Beef, Self::Fish, Self::VegetarianVegan, Self::KidsChicken];

    /// Human readable name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Beef => "Beef",
            Self::Fish => "Fish",
            Self::VegetarianVegan => "Vegetarian/Vegan",
            Self::KidsChicken => "Kid's Chicken",
        }
    }
}

impl fmt::Display for Entree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A checkbox dietary restriction. Free text lives in
/// [`DietaryRestrictions::other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DietaryRestriction {
    /// Vegetarian.
    Vegetarian,
    /// Vegan.
    Vegan,
    /// Gluten free.
    GlutenFree,
    /// Dairy free.
    DairyFree,
    /// Nut allergy.
    NutAllergy,
    /// Shellfish allergy.
    Shellfish,
    /// Kosher.
    Kosher,
    /// Halal.
    Halal,
}

impl DietaryRestriction {
    /// All restrictions in form order.
    pub const ALL: [Self; 8] = [
        Self::Vegetarian,
        Self::Vegan,
        Self::GlutenFree,
        Self::DairyFree,
        Self::NutAllergy,
        Self::Shellfish,
        Self::Kosher,
        Self::Halal,
    ];

    /// Human readable name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Vegetarian => "Vegetarian",
            Self::Vegan => "Vegan",
            Self::GlutenFree => "Gluten Free",
            Self::DairyFree => "Dairy Free",
            Self::NutAllergy => "Nut Allergy",
            Self::Shellfish => "Shellfish",
            Self::Kosher => "Kosher",
            Self::Halal => "Halal",
        }
    }
}

/// Per-guest event attendance flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct EventAttendance {
    /// Friday bowling.
    pub bowling: bool,
    /// Saturday get-together.
    pub beers_and_cheers: bool,
    /// Sunday ceremony.
    pub ceremony: bool,
    /// Sunday cocktail hour.
    pub cocktail_hour: bool,
    /// Sunday reception dinner.
    pub reception: bool,
    /// Monday brunch.
    pub after_party_brunch: bool,
}

impl EventAttendance {
    /// Whether the guest attends `event`.
    #[must_use]
    pub fn attends(&self, event: Event) -> bool {
        match event {
            Event::Bowling => self.bowling,
            Event::BeersAndCheers => self.beers_and_cheers,
            Event::Ceremony => self.ceremony,
            Event::CocktailHour => self.cocktail_hour,
            Event::Reception => self.reception,
            Event::AfterPartyBrunch => self.after_party_brunch,
        }
    }

    /// Mark attendance for `event`.
    pub fn set(&mut self, event: Event, attending: bool) {
        let flag = match event {
            Event::Bowling => &mut self.bowling,
            Event::BeersAndCheers => &mut self.beers_and_cheers,
            Event::Ceremony => &mut self.ceremony,
            Event::CocktailHour => &mut self.cocktail_hour,
            Event::Reception => &mut self.reception,
            Event::AfterPartyBrunch => &mut self.after_party_brunch,
        };
        *flag = attending;
    }

    /// Events the guest attends, in schedule order.
    pub fn attending(&self) -> impl Iterator<Item = Event> + '_ {
        Event::ALL.into_iter().filter(move |e| self.attends(*e))
    }

    /// Whether at least one event is selected.
    #[must_use]
    pub fn any(&self) -> bool {
        self.attending().next().is_some()
    }
}

/// Per-guest entrée flags. At most one should be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntreeSelection {
    /// Beef.
    pub beef: bool,
    /// Fish.
    pub fish: bool,
    /// Vegetarian/vegan.
    pub vegetarian_vegan: bool,
    /// Children's chicken.
    pub kids_chicken: bool,
}

impl EntreeSelection {
    /// A selection with exactly `entree` set.
    #[must_use]
    pub fn only(entree: Entree) -> Self {
        let mut selection = Self::default();
        match entree {
            Entree::Beef => selection.beef = true,
            Entree::Fish => selection.fish = true,
            Entree::VegetarianVegan => selection.vegetarian_vegan = true,
            Entree::KidsChicken => selection.kids_chicken = true,
        }
        selection
    }

    /// Whether `entree` is selected.
    #[must_use]
    pub fn has(&self, entree: Entree) -> bool {
        match entree {
            Entree::Beef => self.beef,
            Entree::Fish => self.fish,
            Entree::VegetarianVegan => self.vegetarian_vegan,
            Entree::KidsChicken => self.kids_chicken,
        }
    }

    /// Every selected entrée, in menu order.
    #[must_use]
    pub fn selected(&self) -> Vec<Entree> {
        Entree::ALL.into_iter().filter(|e| self.has(*e)).collect()
    }

    /// The first selected entrée, if any.
    #[must_use]
    pub fn choice(&self) -> Option<Entree> {
        Entree::ALL.into_iter().find(|e| self.has(*e))
    }
}

/// Per-guest dietary restrictions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct DietaryRestrictions {
    /// Vegetarian.
    pub vegetarian: bool,
    /// Vegan.
    pub vegan: bool,
    /// Gluten free.
    pub gluten_free: bool,
    /// Dairy free.
    pub dairy_free: bool,
    /// Nut allergy.
    pub nut_allergy: bool,
    /// Shellfish allergy.
    pub shellfish: bool,
    /// Kosher.
    pub kosher: bool,
    /// Halal.
    pub halal: bool,
    /// Anything the checkboxes don't cover.
    #[serde(deserialize_with = "null_as_empty")]
    pub other: String,
}

impl DietaryRestrictions {
    /// Whether `restriction` is checked.
    #[must_use]
    pub fn has(&self, restriction: DietaryRestriction) -> bool {
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

    /// Check or uncheck `restriction`.
    pub fn set(&mut self, restriction: DietaryRestriction, value: bool) {
        let flag = match restriction {
            DietaryRestriction::Vegetarian => &mut self.vegetarian,
            DietaryRestriction::Vegan => &mut self.vegan,
            DietaryRestriction::GlutenFree => &mut self.gluten_free,
            DietaryRestriction::DairyFree => &mut self.dairy_free,
            DietaryRestriction::NutAllergy => &mut self.nut_allergy,
            DietaryRestriction::Shellfish => &mut self.shellfish,
            DietaryRestriction::Kosher => &mut self.kosher,
            DietaryRestriction::Halal => &mut self.halal,
        };
        *flag = value;
    }

    /// The free-text restriction, if it has any content.
    #[must_use]
    pub fn other_text(&self) -> Option<&str> {
        let trimmed = self.other.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Labels of the checked restrictions followed by the free text.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = DietaryRestriction::ALL
            .into_iter()
            .filter(|r| self.has(*r))
            .map(DietaryRestriction::label)
            .collect();
        if let Some(other) = self.other_text() {
            labels.push(other);
        }
        labels
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One named attendee within a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    /// Guest name as entered on the form.
    pub name: String,
    /// Which events the guest will attend.
    #[serde(default)]
    pub events: EventAttendance,
    /// Reception dinner choice.
    #[serde(default)]
    pub entree_selection: EntreeSelection,
    /// Dietary needs.
    #[serde(default)]
    pub dietary_restrictions: DietaryRestrictions,
}

impl Guest {
    /// Create a guest with nothing selected.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Optional organizer notes attached to an invitation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvitationMetadata {
    /// Contact phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_notes: Option<String>,
    /// Seating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_assignment: Option<String>,
    /// When the invitation went out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_sent_date: Option<NaiveDate>,
    /// Reply-by date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsvp_deadline: Option<NaiveDate>,
}

impl InvitationMetadata {
    /// Trim every text field and drop the empty ones.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        }
        Self {
            phone: clean(self.phone),
            address: clean(self.address),
            special_notes: clean(self.special_notes),
            table_assignment: clean(self.table_assignment),
            ..self
        }
    }
}

/// A household or party that was invited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    /// Identifier.
    pub id: String,
    /// Name guests search for.
    pub primary_guest_name: String,
    /// Contact e-mail, lower-cased.
    pub email: String,
    /// How many guests may be listed.
    pub party_size: u32,
    /// Which events the party may attend.
    pub invitation_type: InvitationType,
    /// Response state.
    pub rsvp_status: RsvpStatus,
    /// Organizer notes.
    #[serde(default)]
    pub metadata: InvitationMetadata,
    /// When the invitation was created.
    pub created_at: DateTime<Utc>,
    /// Last change, including RSVPs.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an invitation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvitation {
    /// Explicit identifier; generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// Name guests search for.
    pub primary_guest_name: String,
    /// Contact e-mail.
    pub email: String,
    /// How many guests may be listed.
    pub party_size: u32,
    /// Which events the party may attend.
    #[serde(default)]
    pub invitation_type: InvitationType,
    /// Organizer notes.
    #[serde(default)]
    pub metadata: InvitationMetadata,
}

impl NewInvitation {
    /// Create an input with the required fields and no metadata.
    #[must_use]
    pub fn new(
        primary_guest_name: impl Into<String>,
        email: impl Into<String>,
        party_size: u32,
        invitation_type: InvitationType,
    ) -> Self {
        Self {
            id: None,
            primary_guest_name: primary_guest_name.into(),
            email: email.into(),
            party_size,
            invitation_type,
            metadata: InvitationMetadata::default(),
        }
    }

    /// Set an explicit identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// One timestamped RSVP for an invitation. Later submissions supersede
/// earlier ones for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Identifier.
    pub id: String,
    /// Owning invitation.
    pub invitation_id: String,
    /// 1-based sequence number within the invitation.
    pub submission_number: u32,
    /// When the RSVP was received.
    pub submitted_at: DateTime<Utc>,
    /// Whether this is the authoritative submission.
    pub is_current: bool,
    /// Guests listed on this submission.
    pub guests: Vec<Guest>,
}
