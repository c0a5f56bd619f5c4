use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── FACETS ────────────────────────────────────────────────────────────────────
//

/// One of the four categorical filter dimensions of a question search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Grade,
    Subject,
    Category,
    Topic,
}

impl Facet {
    pub const ALL: [Facet; 4] = [Facet::Grade, Facet::Subject, Facet::Category, Facet::Topic];

    /// Query-string key used by the backend for this facet.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Facet::Grade => "grade",
            Facet::Subject => "subject",
            Facet::Category => "category",
            Facet::Topic => "topic",
        }
    }

    /// The fixed vocabulary shown before any filter interaction.
    #[must_use]
    pub fn defaults(self) -> &'static [&'static str] {
        match self {
            Facet::Grade => GRADE_DEFAULTS,
            Facet::Subject => SUBJECT_DEFAULTS,
            Facet::Category => CATEGORY_DEFAULTS,
            Facet::Topic => TOPIC_DEFAULTS,
        }
    }

    #[must_use]
    pub fn default_options(self) -> Vec<String> {
        self.defaults().iter().map(|s| (*s).to_owned()).collect()
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown facet: {0}")]
pub struct UnknownFacet(pub String);

impl FromStr for Facet {
    type Err = UnknownFacet;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grade" => Ok(Facet::Grade),
            "subject" => Ok(Facet::Subject),
            "category" => Ok(Facet::Category),
            "topic" => Ok(Facet::Topic),
            other => Err(UnknownFacet(other.to_owned())),
        }
    }
}

pub const GRADE_DEFAULTS: &[&str] = &[
    "grade1", "grade2", "grade3", "grade4", "grade5", "grade6", "grade7", "grade8", "grade9",
    "grade10", "grade11", "grade12",
];

pub const SUBJECT_DEFAULTS: &[&str] = &["language science", "natural science", "social science"];

pub const CATEGORY_DEFAULTS: &[&str] = &[
    "Adaptations",
    "Adaptations and natural selection",
    "Age of Exploration",
    "Analyzing literature",
    "Anatomy and physiology",
    "Animals",
    "Asia: society and environment",
    "Astronomy",
    "Atoms and molecules",
    "Author's purpose",
    "Author's purpose and tone",
    "Basic economic principles",
    "Banking and finance",
    "Biochemistry",
    "Capitalization",
    "Categories",
    "Cells",
    "Chemical reactions",
    "Cities",
    "Classification",
    "Classification and scientific names",
    "Climate change",
    "Colonial America",
    "Comprehension strategies",
    "Conservation",
    "Conservation and natural resources",
    "Context clues",
    "Creative techniques",
    "Cultural celebrations",
    "Designing experiments",
    "Descriptive details",
    "Developing and supporting arguments",
    "Domain-specific vocabulary",
    "Early 19th century American history",
    "Early China",
    "Early Modern Europe",
    "Early Americas",
    "Earth events",
    "Earth's features",
    "Economics",
    "Editing and revising",
    "Electricity",
    "Ecological interactions",
    "Engineering practices",
    "English colonies in North America",
    "Fossils",
    "Force and motion",
    "Formatting",
    "Genes to traits",
    "Geography",
    "Greece",
    "Government",
    "Heat and thermal energy",
    "Heredity",
    "Historical figures",
    "Independent reading comprehension",
    "Informational texts: level 1",
    "Islamic empires",
    "Kinetic and potential energy",
    "Literary devices",
    "Magnets",
    "Maps",
    "Materials",
    "Mixtures",
    "Natural resources and human impacts",
    "Oceania: geography",
    "Oceans and continents",
    "Opinion writing",
    "Particle motion and energy",
    "Persuasive strategies",
    "Phrases and clauses",
    "Photosynthesis",
    "Physical Geography",
    "Physical and chemical change",
    "Plant reproduction",
    "Plants",
    "Poetry elements",
    "Pronouns",
    "Pronouns and antecedents",
    "Read-alone texts",
    "Reading-comprehension",
    "Reference skills",
    "Research skills",
    "Rhyming",
    "Rocks and minerals",
    "Scientific names",
    "Science-and-engineering-practices",
    "Sentences, fragments, and run-ons",
    "Shades of meaning",
    "Short and long vowels",
    "Social studies skills",
    "Solutions",
    "States",
    "State capitals",
    "States of matter",
    "Supply and demand",
    "Text structure",
    "The Americas: geography",
    "The Antebellum period",
    "The American Revolution",
    "The Civil War",
    "The Civil War and Reconstruction",
    "The Constitution",
    "The Early Republic",
    "The Jacksonian period",
    "The Silk Road",
    "Thermal energy",
    "Topographic maps",
    "Traits",
    "Traits and heredity",
    "Units and measurement",
    "Velocity, acceleration, and forces",
    "Verb tense",
    "Visual elements",
    "Water cycle",
    "Weather and climate",
    "Word usage and nuance",
    "World religions",
];

pub const TOPIC_DEFAULTS: &[&str] = &[
    "capitalization",
    "chemistry",
    "civics",
    "culture",
    "economics",
    "earth-science",
    "figurative-language",
    "global-studies",
    "grammar",
    "literacy-in-science",
    "phonological-awareness",
    "physics",
    "pronouns",
    "punctuation",
    "reading-comprehension",
    "reference-skills",
    "science-and-engineering-practices",
    "units-and-measurement",
    "us-history",
    "verbs",
    "vocabulary",
    "word-study",
    "world-history",
    "writing-strategies",
];

//
// ─── FILTER STATE ──────────────────────────────────────────────────────────────
//

/// Current selections of a question search screen.
///
/// `None` means the facet has not been chosen yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub grade: Option<String>,
    pub subject: Option<String>,
    pub category: Option<String>,
    pub topic: Option<String>,
    pub query: String,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Grade => self.grade.as_deref(),
            Facet::Subject => self.subject.as_deref(),
            Facet::Category => self.category.as_deref(),
            Facet::Topic => self.topic.as_deref(),
        }
    }

    /// Sets or clears a facet. Blank values clear it.
    pub fn set(&mut self, facet: Facet, value: Option<String>) {
        let value = value.and_then(|v| {
            let trimmed = v.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        });
        match facet {
            Facet::Grade => self.grade = value,
            Facet::Subject => self.subject = value,
            Facet::Category => self.category = value,
            Facet::Topic => self.topic = value,
        }
    }

    pub fn clear(&mut self, facet: Facet) {
        self.set(facet, None);
    }

    pub fn set_query(&mut self, query: impl AsRef<str>) {
        self.query = query.as_ref().trim().to_owned();
    }

    /// True when no facet is selected and the query is blank.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        Facet::ALL.iter().all(|f| self.get(*f).is_none()) && self.query.trim().is_empty()
    }

    /// A copy of this state with `facet` left unconstrained.
    #[must_use]
    pub fn without(&self, facet: Facet) -> Self {
        let mut next = self.clone();
        next.clear(facet);
        next
    }
}

/// Facet values of one search result, as sampled for narrowing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSample {
    pub grade: Option<String>,
    pub subject: Option<String>,
    pub category: Option<String>,
    pub topic: Option<String>,
}

impl FacetSample {
    /// The trimmed, non-empty value of `facet`, if any.
    #[must_use]
    pub fn value(&self, facet: Facet) -> Option<&str> {
        let raw = match facet {
            Facet::Grade => self.grade.as_deref(),
            Facet::Subject => self.subject.as_deref(),
            Facet::Category => self.category.as_deref(),
            Facet::Topic => self.topic.as_deref(),
        }?;
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Adds every distinct value of `facet` found in `samples` to `into`.
pub fn collect_values<'a, I>(facet: Facet, samples: I, into: &mut BTreeSet<String>)
where
    I: IntoIterator<Item = &'a FacetSample>,
{
    for sample in samples {
        if let Some(value) = sample.value(facet) {
            if !into.contains(value) {
                into.insert(value.to_owned());
            }
        }
    }
}

//
// ─── OPTION LISTS ──────────────────────────────────────────────────────────────
//

/// Last-known-good option lists for the picker of each facet.
///
/// Grade never narrows from loaded results; its list is always the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOptions {
    subject: Vec<String>,
    category: Vec<String>,
    topic: Vec<String>,
}

impl Default for FacetOptions {
    fn default() -> Self {
        Self {
            subject: Facet::Subject.default_options(),
            category: Facet::Category.default_options(),
            topic: Facet::Topic.default_options(),
        }
    }
}

impl FacetOptions {
    #[must_use]
    pub fn current(&self, facet: Facet) -> Vec<String> {
        match facet {
            Facet::Grade => Facet::Grade.default_options(),
            Facet::Subject => self.subject.clone(),
            Facet::Category => self.category.clone(),
            Facet::Topic => self.topic.clone(),
        }
    }

    #[must_use]
    pub fn contains(&self, facet: Facet, value: &str) -> bool {
        match facet {
            Facet::Grade => GRADE_DEFAULTS.contains(&value),
            Facet::Subject => self.subject.iter().any(|v| v == value),
            Facet::Category => self.category.iter().any(|v| v == value),
            Facet::Topic => self.topic.iter().any(|v| v == value),
        }
    }

    /// Options for a picker: the computed list, or the last-known-good list
    /// when narrowing produced nothing.
    #[must_use]
    pub fn or_fallback(&self, facet: Facet, computed: Vec<String>) -> Vec<String> {
        if computed.is_empty() {
            self.current(facet)
        } else {
            computed
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rebuilds option lists from freshly loaded results and clears any
    /// selection that is no longer a member of its facet's list.
    ///
    /// Returns the facets whose selection was cleared.
    pub fn rebuild(&mut self, state: &mut FilterState, loaded: &[FacetSample]) -> Vec<Facet> {
        if state.is_pristine() || loaded.is_empty() {
            self.reset();
            return Vec::new();
        }

        for facet in [Facet::Subject, Facet::Category, Facet::Topic] {
            let mut seen = BTreeSet::new();
            collect_values(facet, loaded, &mut seen);
            if seen.is_empty() {
                continue;
            }
            let list: Vec<String> = seen.into_iter().collect();
            match facet {
                Facet::Subject => self.subject = list,
                Facet::Category => self.category = list,
                Facet::Topic => self.topic = list,
                Facet::Grade => {}
            }
        }

        let mut cleared = Vec::new();
        for facet in Facet::ALL {
            let stale = state
                .get(facet)
                .is_some_and(|selected| !self.contains(facet, selected));
            if stale {
                state.clear(facet);
                cleared.push(facet);
            }
        }
        cleared
    }
}

/// The locally decidable part of option narrowing.
///
/// Returns `Some` when the answer does not need server samples: the static
/// defaults before any interaction, or the current selection of `target`.
/// `None` means the options must be sampled from the server.
#[must_use]
pub fn local_options(target: Facet, state: &FilterState) -> Option<Vec<String>> {
    if state.is_pristine() {
        return Some(target.default_options());
    }
    state.get(target).map(|selected| vec![selected.to_owned()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(subject: &str, category: &str, topic: &str) -> FacetSample {
        FacetSample {
            grade: Some("grade3".into()),
            subject: Some(subject.into()),
            category: Some(category.into()),
            topic: Some(topic.into()),
        }
    }

    #[test]
    fn vocabularies_have_expected_sizes() {
        assert_eq!(GRADE_DEFAULTS.len(), 12);
        assert_eq!(SUBJECT_DEFAULTS.len(), 3);
        assert_eq!(TOPIC_DEFAULTS.len(), 24);
        assert!(CATEGORY_DEFAULTS.len() > 100);
    }

    #[test]
    fn facet_parses_case_insensitively() {
        assert_eq!("Subject".parse::<Facet>().unwrap(), Facet::Subject);
        assert!("colour".parse::<Facet>().is_err());
    }

    #[test]
    fn pristine_state_uses_declared_defaults() {
        let state = FilterState::new();
        let options = local_options(Facet::Subject, &state).unwrap();
        assert_eq!(
            options,
            vec!["language science", "natural science", "social science"]
        );
    }

    #[test]
    fn query_alone_ends_pristine_state() {
        let mut state = FilterState::new();
        state.set_query("  plants ");
        assert_eq!(state.query, "plants");
        assert!(!state.is_pristine());
        assert_eq!(local_options(Facet::Topic, &state), None);
    }

    #[test]
    fn selected_target_yields_singleton() {
        let mut state = FilterState::new();
        state.set(Facet::Subject, Some("language science".into()));
        assert_eq!(
            local_options(Facet::Subject, &state),
            Some(vec!["language science".to_owned()])
        );
        assert_eq!(local_options(Facet::Grade, &state), None);
    }

    #[test]
    fn blank_selection_clears_facet() {
        let mut state = FilterState::new();
        state.set(Facet::Topic, Some("   ".into()));
        assert!(state.topic.is_none());
        assert!(state.is_pristine());
    }

    #[test]
    fn collect_values_trims_and_skips_empty() {
        let samples = vec![
            FacetSample {
                subject: Some(" natural science ".into()),
                ..FacetSample::default()
            },
            FacetSample {
                subject: Some("".into()),
                ..FacetSample::default()
            },
            FacetSample::default(),
        ];
        let mut out = BTreeSet::new();
        collect_values(Facet::Subject, &samples, &mut out);
        assert_eq!(out.into_iter().collect::<Vec<_>>(), vec!["natural science"]);
    }

    #[test]
    fn rebuild_clears_selection_missing_from_results() {
        let mut options = FacetOptions::default();
        let mut state = FilterState::new();
        state.set(Facet::Grade, Some("grade3".into()));
        state.set(Facet::Topic, Some("physics".into()));

        let loaded = vec![sample("natural science", "Magnets", "chemistry")];
        let cleared = options.rebuild(&mut state, &loaded);

        assert_eq!(cleared, vec![Facet::Topic]);
        assert_eq!(state.grade.as_deref(), Some("grade3"));
        assert!(state.topic.is_none());
        assert_eq!(options.current(Facet::Topic), vec!["chemistry"]);
        assert_eq!(options.current(Facet::Subject), vec!["natural science"]);
    }

    #[test]
    fn rebuild_resets_when_nothing_loaded() {
        let mut options = FacetOptions::default();
        let mut state = FilterState::new();
        state.set(Facet::Subject, Some("social science".into()));
        options.rebuild(&mut state, &[sample("social science", "Maps", "civics")]);
        assert_eq!(options.current(Facet::Category), vec!["Maps"]);

        let cleared = options.rebuild(&mut state, &[]);
        assert!(cleared.is_empty());
        assert_eq!(options.current(Facet::Category).len(), CATEGORY_DEFAULTS.len());
        assert_eq!(state.subject.as_deref(), Some("social science"));
    }

    #[test]
    fn rebuild_keeps_previous_list_when_facet_absent_from_results() {
        let mut options = FacetOptions::default();
        let mut state = FilterState::new();
        state.set_query("cells");
        let loaded = vec![FacetSample {
            subject: Some("natural science".into()),
            ..FacetSample::default()
        }];
        options.rebuild(&mut state, &loaded);
        assert_eq!(options.current(Facet::Topic).len(), TOPIC_DEFAULTS.len());
        assert_eq!(options.current(Facet::Subject), vec!["natural science"]);
    }

    #[test]
    fn fallback_only_applies_to_empty_lists() {
        let options = FacetOptions::default();
        assert_eq!(
            options.or_fallback(Facet::Grade, Vec::new()).len(),
            GRADE_DEFAULTS.len()
        );
        assert_eq!(
            options.or_fallback(Facet::Grade, vec!["grade2".into()]),
            vec!["grade2"]
        );
    }
}
