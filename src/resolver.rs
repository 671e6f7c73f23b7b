//! Turn free-text origin/destination input into ranked place suggestions
//!
//! Every keystroke with at least [`MIN_QUERY_CHARS`] characters issues one autocomplete query.
//! Queries are not cancelled, instead each field counts the queries it issued and only the
//! answer to the most recent one is applied. Failures are logged and keep the previous list.
use crate::services::AutocompleteService;
use crate::Error;
use log::{debug, trace, warn};
use std::fmt;

/// Shorter input clears the suggestions without asking the backend
pub const MIN_QUERY_CHARS: usize = 3;

/// Whether `text` is long enough to query suggestions for.
///
/// Length is counted in UTF-16 code units, the way the mobile text fields measure their input,
/// so a character outside the basic multilingual plane counts twice.
pub fn is_queryable(text: &str) -> bool {
    text.encode_utf16().count() >= MIN_QUERY_CHARS
}

/// Which text field of the search form the input belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Origin,
    Destination,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Origin => write!(f, "origin"),
            Field::Destination => write!(f, "destination"),
        }
    }
}

/// A backend ranked candidate address
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceSuggestion {
    id: String,
    description: String,
}

impl PlaceSuggestion {
    pub fn new(id: String, description: String) -> Self {
        PlaceSuggestion { id, description }
    }

    /// Opaque place identifier assigned by the backend
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// An autocomplete query that still has to be sent, see [`AddressResolver::input`]
#[derive(Debug)]
pub struct SuggestionQuery {
    field: Field,
    generation: u64,
    text: String,
}

impl SuggestionQuery {
    pub fn field(&self) -> Field {
        self.field
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Ask the backend for suggestions, the answer must be handed back to the resolver
    pub async fn fetch(self, service: &dyn AutocompleteService) -> SuggestionResponse {
        trace!("fetching {} suggestions for {:?}", self.field, self.text);
        let result = service.autocomplete(&self.text).await;
        SuggestionResponse {
            field: self.field,
            generation: self.generation,
            result,
        }
    }
}

/// Outcome of a [`SuggestionQuery`]
#[derive(Debug)]
pub struct SuggestionResponse {
    field: Field,
    generation: u64,
    result: Result<Vec<PlaceSuggestion>, Error>,
}

#[derive(Debug, Default)]
struct FieldState {
    text: String,
    suggestions: Vec<PlaceSuggestion>,
    generation: u64,
}

impl FieldState {
    /// Invalidate every query issued so far and return the new generation
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

/// Holds the text and suggestion list of the origin and destination fields
#[derive(Debug, Default)]
pub struct AddressResolver {
    origin: FieldState,
    destination: FieldState,
}

impl AddressResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn field(&self, field: Field) -> &FieldState {
        match field {
            Field::Origin => &self.origin,
            Field::Destination => &self.destination,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut FieldState {
        match field {
            Field::Origin => &mut self.origin,
            Field::Destination => &mut self.destination,
        }
    }

    /// Current text of a field
    pub fn text(&self, field: Field) -> &str {
        &self.field(field).text
    }

    /// Suggestions currently shown below a field
    pub fn suggestions(&self, field: Field) -> &[PlaceSuggestion] {
        &self.field(field).suggestions
    }

    /// Handle a keystroke in a field.
    ///
    /// Returns the query to send, or `None` when the input is too short, in which case the
    /// suggestions of the field are cleared right away.
    pub fn input(&mut self, field: Field, text: &str) -> Option<SuggestionQuery> {
        let state = self.field_mut(field);
        state.text = text.to_string();
        let generation = state.next_generation();
        if !is_queryable(text) {
            state.suggestions.clear();
            return None;
        }
        Some(SuggestionQuery {
            field,
            generation,
            text: text.to_string(),
        })
    }

    /// Replace the text of a field without querying suggestions, e.g. with the current location
    pub fn set_text(&mut self, field: Field, text: &str) {
        let state = self.field_mut(field);
        state.text = text.to_string();
        state.suggestions.clear();
        state.next_generation();
    }

    /// Apply the answer to a query, returns false when the answer was discarded.
    ///
    /// Answers to superseded queries are dropped, failures leave the visible list untouched.
    pub fn apply(&mut self, response: SuggestionResponse) -> bool {
        let field = response.field;
        let state = self.field_mut(field);
        if response.generation != state.generation {
            debug!(
                "discarding stale {} suggestions (generation {} != {})",
                field, response.generation, state.generation
            );
            return false;
        }
        match response.result {
            Ok(suggestions) => {
                debug!("{} {} suggestions", suggestions.len(), field);
                state.suggestions = suggestions;
                true
            }
            Err(e) => {
                warn!("Error fetching {} suggestions: {}", field, e);
                false
            }
        }
    }

    /// Handle a keystroke and wait for its suggestions
    pub async fn suggest(
        &mut self,
        field: Field,
        text: &str,
        service: &dyn AutocompleteService,
    ) -> &[PlaceSuggestion] {
        if let Some(query) = self.input(field, text) {
            let response = query.fetch(service).await;
            self.apply(response);
        }
        self.suggestions(field)
    }

    /// Pick a suggestion, its description becomes the field text and the list is closed
    pub fn select(&mut self, field: Field, index: usize) -> Option<&str> {
        let state = self.field_mut(field);
        if index >= state.suggestions.len() {
            return None;
        }
        let chosen = state.suggestions.swap_remove(index);
        state.text = chosen.description;
        state.suggestions.clear();
        state.next_generation();
        Some(state.text.as_str())
    }
}
