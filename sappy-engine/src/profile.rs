//! Onboarding questionnaire and the household profile derived from it.
//!
//! The questionnaire asks three fixed questions. Whatever was answered is
//! flattened into a [`Profile`], the fixed-shape record the inference
//! service expects as `customer_data`.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

pub const RESIDENCY: &str = "residency";
pub const ASSETS: &str = "assets";
pub const APPLIANCES: &str = "appliances";

pub const RESIDENCY_FLAT: &str = "Flat";
pub const RESIDENCY_SINGLE_FAMILY: &str = "Single family";
pub const RESIDENCY_OTHER: &str = "Other";

pub const ASSET_POOL: &str = "Pool";
pub const ASSET_IRRIGATION: &str = "Irrigation system";
pub const ASSET_GARDEN: &str = "Garden";

pub const APPLIANCE_DISHWASHER: &str = "Dishwasher";
pub const APPLIANCE_WASHING_MACHINE: &str = "Washing machine";
pub const APPLIANCE_BOTH: &str = "Both";

/// A single onboarding question.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Question {
    pub id: &'static str,
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    pub multi_select: bool,
}

/// The questions in the order they are asked.
pub static QUESTIONS: [Question; 3] = [
    Question {
        id: RESIDENCY,
        prompt: "What is your residency type?",
        options: &[RESIDENCY_FLAT, RESIDENCY_SINGLE_FAMILY, RESIDENCY_OTHER],
        multi_select: true,
    },
    Question {
        id: ASSETS,
        prompt: "Do you have any of these assets at home?",
        options: &[ASSET_POOL, ASSET_IRRIGATION, ASSET_GARDEN],
        multi_select: true,
    },
    Question {
        id: APPLIANCES,
        prompt: "Which water-using appliances do you have?",
        options: &[APPLIANCE_DISHWASHER, APPLIANCE_WASHING_MACHINE, APPLIANCE_BOTH],
        multi_select: false,
    },
];

/// Selected options keyed by question id.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Answers(BTreeMap<String, BTreeSet<String>>);

impl Answers {
    pub fn new() -> Self {
        Answers::default()
    }

    /// Replace the answer recorded for `question_id`.
    pub fn set<I, S>(&mut self, question_id: &str, options: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.insert(
            question_id.to_string(),
            options.into_iter().map(Into::into).collect(),
        );
    }

    /// Builder form of [`Answers::set`].
    pub fn with<I, S>(mut self, question_id: &str, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(question_id, options);
        self
    }

    /// Options recorded for a question; unanswered questions yield nothing.
    pub fn selected(&self, question_id: &str) -> impl Iterator<Item = &str> {
        self.0
            .get(question_id)
            .into_iter()
            .flat_map(|options| options.iter().map(String::as_str))
    }

    pub fn contains(&self, question_id: &str, option: &str) -> bool {
        self.0
            .get(question_id)
            .is_some_and(|options| options.contains(option))
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.0
            .get(question_id)
            .is_some_and(|options| !options.is_empty())
    }

    fn toggle(&mut self, question_id: &str, option: &str) {
        let options = self.0.entry(question_id.to_string()).or_default();
        if !options.remove(option) {
            options.insert(option.to_string());
        }
    }
}

/// Household profile sent to the inference service.
///
/// Flags are 0 or 1. Fields the questionnaire does not ask about carry the
/// fixed defaults from [`Profile::default`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "residency_Flat")]
    pub residency_flat: u8,
    #[serde(rename = "residency_Single_Family")]
    pub residency_single_family: u8,
    #[serde(rename = "residency_Other")]
    pub residency_other: u8,
    pub household_pool: u8,
    pub household_irrigation_system: u8,
    pub household_garden: u8,
    #[serde(rename = "Dishwasher")]
    pub dishwasher: u8,
    #[serde(rename = "Washing_Machine")]
    pub washing_machine: u8,
    pub household_size: u32,
    pub household_bedrooms: u32,
    pub household_children: u32,
    pub household_seniors: u32,
    #[serde(rename = "Shower")]
    pub shower: u8,
    #[serde(rename = "Toilet")]
    pub toilet: u8,
    #[serde(rename = "Bathtub")]
    pub bathtub: u8,
    #[serde(rename = "Hot_Tub")]
    pub hot_tub: u8,
    #[serde(rename = "Water_Tank")]
    pub water_tank: u8,
    #[serde(rename = "Evaporative_Cooler")]
    pub evaporative_cooler: u8,
    #[serde(rename = "Fridge_Dispenser")]
    pub fridge_dispenser: u8,
    #[serde(rename = "Sprinkler_System")]
    pub sprinkler_system: u8,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            residency_flat: 0,
            residency_single_family: 0,
            residency_other: 0,
            household_pool: 0,
            household_irrigation_system: 0,
            household_garden: 0,
            dishwasher: 0,
            washing_machine: 0,
            household_size: 2,
            household_bedrooms: 2,
            household_children: 0,
            household_seniors: 0,
            shower: 1,
            toilet: 1,
            bathtub: 0,
            hot_tub: 0,
            water_tank: 0,
            evaporative_cooler: 0,
            fridge_dispenser: 0,
            sprinkler_system: 0,
        }
    }
}

fn flag(set: bool) -> u8 {
    u8::from(set)
}

/// Flatten questionnaire answers into a [`Profile`].
///
/// Never fails: an unanswered question counts as nothing selected.
/// Residency flags are independent, so several may be 1 at once.
pub fn aggregate(answers: &Answers) -> Profile {
    let residency = |option| answers.contains(RESIDENCY, option);
    let asset = |option| answers.contains(ASSETS, option);
    let both = answers.contains(APPLIANCES, APPLIANCE_BOTH);

    Profile {
        residency_flat: flag(residency(RESIDENCY_FLAT)),
        residency_single_family: flag(residency(RESIDENCY_SINGLE_FAMILY)),
        residency_other: flag(residency(RESIDENCY_OTHER)),
        household_pool: flag(asset(ASSET_POOL)),
        household_irrigation_system: flag(asset(ASSET_IRRIGATION)),
        household_garden: flag(asset(ASSET_GARDEN)),
        dishwasher: flag(both || answers.contains(APPLIANCES, APPLIANCE_DISHWASHER)),
        washing_machine: flag(
            both || answers.contains(APPLIANCES, APPLIANCE_WASHING_MACHINE),
        ),
        ..Profile::default()
    }
}

/// Result of trying to move past the current question.
#[derive(Debug, PartialEq, Clone)]
pub enum Step {
    /// The current question has nothing selected yet
    Blocked,
    /// Moved on to the question at this index
    Next(usize),
    /// All questions answered
    Complete(Answers),
}

/// One pass through the onboarding questions.
///
/// Dropping it before completion discards the answers.
#[derive(Debug, Default)]
pub struct Questionnaire {
    current: usize,
    answers: Answers,
}

impl Questionnaire {
    pub fn new() -> Self {
        Questionnaire::default()
    }

    pub fn current(&self) -> &'static Question {
        &QUESTIONS[self.current]
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Select or deselect an option of the current question.
    ///
    /// Multi-select questions flip the option; single-select questions
    /// replace the answer. Options the question does not offer are ignored
    /// and reported as `false`.
    pub fn toggle(&mut self, option: &str) -> bool {
        let question = self.current();
        if !question.options.contains(&option) {
            debug!("Ignoring unknown option {:?} for {}", option, question.id);
            return false;
        }
        if question.multi_select {
            self.answers.toggle(question.id, option);
        } else {
            self.answers.set(question.id, [option]);
        }
        true
    }

    pub fn can_advance(&self) -> bool {
        self.answers.is_answered(self.current().id)
    }

    pub fn advance(&mut self) -> Step {
        if !self.can_advance() {
            return Step::Blocked;
        }
        self.next_step()
    }

    /// Move on without answering; the question aggregates as nothing selected.
    pub fn skip(&mut self) -> Step {
        debug!("Skipping {}", self.current().id);
        self.next_step()
    }

    fn next_step(&mut self) -> Step {
        if self.current + 1 < QUESTIONS.len() {
            self.current += 1;
            Step::Next(self.current)
        } else {
            Step::Complete(self.answers.clone())
        }
    }

    /// Progress bar fill, counting the current question as reached.
    pub fn progress_percent(&self) -> f64 {
        (self.current + 1) as f64 / QUESTIONS.len() as f64 * 100.0
    }
}
