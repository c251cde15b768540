//! Command implementations for the Sappy CLI.
//!
//! Provides subcommands for checking Sappy's state, running the onboarding
//! profile through the inference service, and shopping in the store.

use clap::{Args, Subcommand};
use sappy_engine::gateway::{DEFAULT_BASE_URL, DEFAULT_METER_ID, DEFAULT_TIMEOUT_SECS};
use sappy_engine::usage::DEFAULT_DAILY_LIMIT_LITERS;

pub mod onboarding;
pub mod status;
pub mod store;

/// Answers to the three onboarding questions.
#[derive(Args, Debug, Clone, Default)]
pub struct AnswerArgs {
    /// Residency type(s): "Flat", "Single family", "Other"
    #[arg(short = 'r', long)]
    pub residency: Vec<String>,

    /// Assets at home: "Pool", "Irrigation system", "Garden"
    #[arg(short = 'a', long)]
    pub assets: Vec<String>,

    /// Water-using appliances: "Dishwasher", "Washing machine" or "Both"
    #[arg(short = 'p', long)]
    pub appliances: Option<String>,
}

/// Inference service connection settings.
#[derive(Args, Debug, Clone)]
pub struct GatewayArgs {
    /// Base URL of the inference service
    #[arg(long, env = "SAPPY_INFERENCE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Smart meter identifier sent with the request
    #[arg(short = 'm', long, env = "SAPPY_METER_ID", default_value = DEFAULT_METER_ID)]
    pub meter_id: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show Sappy's state for a day's water usage
    Status {
        /// Liters used so far today
        #[arg(short = 'u', long)]
        used: f64,

        /// Daily limit in liters
        #[arg(short = 'l', long, env = "SAPPY_DAILY_LIMIT", default_value_t = DEFAULT_DAILY_LIMIT_LITERS)]
        limit: f64,
    },

    /// Close out a day of usage readings and report the points earned
    Day {
        /// Individual usage readings in liters
        #[arg(short = 'u', long = "usage", required = true)]
        readings: Vec<f64>,

        /// Daily limit in liters
        #[arg(short = 'l', long, env = "SAPPY_DAILY_LIMIT", default_value_t = DEFAULT_DAILY_LIMIT_LITERS)]
        limit: f64,

        /// Points already banked
        #[arg(long, default_value_t = 0)]
        points: u32,
    },

    /// Print the profile built from onboarding answers
    Profile {
        #[command(flatten)]
        answers: AnswerArgs,
    },

    /// Send the onboarding profile to the inference service
    Predict {
        #[command(flatten)]
        answers: AnswerArgs,

        #[command(flatten)]
        gateway: GatewayArgs,
    },

    /// List the store catalog
    Catalog,

    /// Select items and buy them with the given points
    Store {
        /// Points available to spend
        #[arg(long)]
        points: u32,

        /// Item ids to select
        #[arg(short = 'i', long = "item")]
        items: Vec<String>,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Status { used, limit } => status::run_status(used, limit),
        Command::Day {
            readings,
            limit,
            points,
        } => status::run_day(&readings, limit, points),
        Command::Profile { answers } => onboarding::run_profile(&answers),
        Command::Predict { answers, gateway } => {
            onboarding::run_predict(&answers, &gateway).await
        }
        Command::Catalog => store::run_catalog(),
        Command::Store { points, items } => store::run_store(points, &items),
    }
}
