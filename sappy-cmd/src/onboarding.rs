//! Onboarding profile and prediction commands.

use std::time::Duration;

use log::{info, warn};
use sappy_engine::gateway::{GatewayConfig, InferenceGateway};
use sappy_engine::profile::{
    aggregate, Answers, Profile, Questionnaire, Step, APPLIANCES, ASSETS, RESIDENCY,
};

use crate::{AnswerArgs, GatewayArgs};

fn options_for<'a>(args: &'a AnswerArgs, question_id: &str) -> Vec<&'a str> {
    match question_id {
        RESIDENCY => args.residency.iter().map(String::as_str).collect(),
        ASSETS => args.assets.iter().map(String::as_str).collect(),
        APPLIANCES => args.appliances.iter().map(String::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Walk the questionnaire with the command-line answers.
///
/// Options a question does not offer are dropped with a warning, and
/// questions with nothing given are skipped.
pub fn answers_from_args(args: &AnswerArgs) -> Answers {
    let mut questionnaire = Questionnaire::new();
    loop {
        let question = questionnaire.current();
        for option in options_for(args, question.id) {
            if questionnaire.answers().contains(question.id, option) {
                continue;
            }
            if !questionnaire.toggle(option) {
                warn!(
                    "Ignoring {:?}: not an option for {} ({})",
                    option,
                    question.id,
                    question.options.join(", ")
                );
            }
        }
        let step = if questionnaire.can_advance() {
            questionnaire.advance()
        } else {
            questionnaire.skip()
        };
        if let Step::Complete(answers) = step {
            return answers;
        }
    }
}

fn build_profile(args: &AnswerArgs) -> Profile {
    let answers = answers_from_args(args);
    info!("Aggregating onboarding answers: {:?}", answers);
    aggregate(&answers)
}

/// Print the profile as the JSON the inference service receives.
pub fn run_profile(args: &AnswerArgs) -> anyhow::Result<()> {
    let profile = build_profile(args);
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

/// Send the profile for a prediction. A failed call is logged and the
/// command still succeeds.
pub async fn run_predict(args: &AnswerArgs, gateway_args: &GatewayArgs) -> anyhow::Result<()> {
    let profile = build_profile(args);
    let gateway = InferenceGateway::new(GatewayConfig {
        base_url: gateway_args.base_url.clone(),
        meter_id: gateway_args.meter_id.clone(),
        timeout: Duration::from_secs(gateway_args.timeout_secs),
    })?;

    match gateway.predict_best_effort(&profile).await {
        Some(prediction) => println!("{}", serde_json::to_string_pretty(&prediction)?),
        None => println!("No prediction available, continuing to the dashboard."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_from_args() {
        let args = AnswerArgs {
            residency: vec!["Flat".to_string()],
            assets: vec!["Pool".to_string(), "Garden".to_string()],
            appliances: Some("Both".to_string()),
        };
        let profile = aggregate(&answers_from_args(&args));
        assert_eq!(profile.residency_flat, 1);
        assert_eq!(profile.household_pool, 1);
        assert_eq!(profile.household_garden, 1);
        assert_eq!(profile.dishwasher, 1);
        assert_eq!(profile.washing_machine, 1);
    }

    #[test]
    fn test_unknown_options_are_dropped() {
        let args = AnswerArgs {
            residency: vec!["Castle".to_string(), "Flat".to_string(), "Flat".to_string()],
            assets: vec!["pool".to_string()],
            appliances: Some("Dish washer".to_string()),
        };
        let answers = answers_from_args(&args);
        assert_eq!(answers.selected(RESIDENCY).collect::<Vec<_>>(), vec!["Flat"]);
        assert!(!answers.is_answered(ASSETS));
        assert!(!answers.is_answered(APPLIANCES));

        let profile = aggregate(&answers);
        assert_eq!(profile.residency_flat, 1);
        assert_eq!(profile.household_pool, 0);
        assert_eq!(profile.dishwasher, 0);
        assert_eq!(profile.washing_machine, 0);
    }

    #[test]
    fn test_missing_answers_stay_unanswered() {
        let answers = answers_from_args(&AnswerArgs::default());
        assert!(!answers.is_answered(RESIDENCY));
        assert_eq!(aggregate(&answers), Profile::default());
    }
}
