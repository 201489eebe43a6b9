//! Randomness tools: dice, coins, choices, and bounded integers.

use rand::Rng;
use regex::Regex;
use rmcp::{
    handler::server::tool::ToolRoute,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::instrument;

use super::common::{error_result, route, success_result, tool_model};
use crate::core::config::Config;

static DICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)d(\d+)([+-]\d+)?$").unwrap());

const MAX_DICE: u32 = 100;
const MAX_SIDES: u32 = 1000;
const MAX_FLIPS: u32 = 100;

/// Parameters for the roll dice tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RollDiceParams {
    /// Dice notation, e.g. '2d6' or '1d20+5'.
    pub notation: String,
}

/// Roll dice tool.
pub struct RollDiceTool;

impl RollDiceTool {
    pub const NAME: &'static str = "roll_dice";

    pub const DESCRIPTION: &'static str =
        "Roll dice using standard notation like '2d6' or '1d20+5'. Up to 100 dice with 2-1000 sides.";

    #[instrument(skip_all, fields(notation = %params.notation))]
    pub fn execute(params: &RollDiceParams, _config: &Config) -> CallToolResult {
        let notation = params.notation.trim();

        let Some(captures) = DICE_RE.captures(notation) else {
            return error_result(&format!(
                "Error: Invalid dice notation '{}'. Use format like '2d6' or '1d20+5'",
                notation
            ));
        };

        // Counts too large for u32 fall out of bounds anyway
        let dice: u32 = captures[1].parse().unwrap_or(u32::MAX);
        let sides: u32 = captures[2].parse().unwrap_or(u32::MAX);
        let modifier: i64 = captures
            .get(3)
            .map(|m| m.as_str().parse().unwrap_or(0))
            .unwrap_or(0);

        if dice < 1 || dice > MAX_DICE {
            return error_result("Error: Number of dice must be between 1 and 100");
        }
        if sides < 2 || sides > MAX_SIDES {
            return error_result("Error: Number of sides must be between 2 and 1000");
        }

        let mut rng = rand::thread_rng();
        let rolls: Vec<i64> = (0..dice).map(|_| rng.gen_range(1..=sides) as i64).collect();
        let total: i64 = rolls.iter().sum::<i64>() + modifier;

        let rolls_text = rolls
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let modifier_text = match modifier {
            0 => String::new(),
            m if m > 0 => format!(" + {}", m),
            m => format!(" - {}", -m),
        };

        success_result(format!(
            "{}: [{}]{} = {}",
            notation, rolls_text, modifier_text, total
        ))
    }

    pub fn to_tool() -> Tool {
        tool_model::<RollDiceParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

fn default_flip_count() -> u32 {
    1
}

/// Parameters for the flip coin tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FlipCoinParams {
    /// Number of coins to flip (1-100).
    #[serde(default = "default_flip_count")]
    pub count: u32,
}

/// Flip coin tool.
pub struct FlipCoinTool;

impl FlipCoinTool {
    pub const NAME: &'static str = "flip_coin";

    pub const DESCRIPTION: &'static str = "Flip one or more coins (up to 100).";

    #[instrument(skip_all, fields(count = params.count))]
    pub fn execute(params: &FlipCoinParams, _config: &Config) -> CallToolResult {
        if params.count < 1 || params.count > MAX_FLIPS {
            return error_result("Error: Count must be between 1 and 100");
        }

        let mut rng = rand::thread_rng();
        let flips: Vec<&str> = (0..params.count)
            .map(|_| if rng.gen_bool(0.5) { "Heads" } else { "Tails" })
            .collect();

        if params.count == 1 {
            return success_result(flips[0].to_string());
        }

        let heads = flips.iter().filter(|f| **f == "Heads").count();
        success_result(format!(
            "Flipped {} coins: {} ({} heads, {} tails)",
            params.count,
            flips.join(", "),
            heads,
            flips.len() - heads
        ))
    }

    pub fn to_tool() -> Tool {
        tool_model::<FlipCoinParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the random choice tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RandomChoiceParams {
    /// Comma-separated options to choose from (at least 2).
    pub options: String,
}

/// Random choice tool.
pub struct RandomChoiceTool;

impl RandomChoiceTool {
    pub const NAME: &'static str = "random_choice";

    pub const DESCRIPTION: &'static str =
        "Pick one option at random from a comma-separated list.";

    #[instrument(skip_all)]
    pub fn execute(params: &RandomChoiceParams, _config: &Config) -> CallToolResult {
        let options: Vec<&str> = params
            .options
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .collect();

        if options.len() < 2 {
            return error_result("Error: Provide at least 2 comma-separated options");
        }

        let mut rng = rand::thread_rng();
        let chosen = options[rng.gen_range(0..options.len())];
        success_result(format!("Chose: {}", chosen))
    }

    pub fn to_tool() -> Tool {
        tool_model::<RandomChoiceParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}

/// Parameters for the random number tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RandomNumberParams {
    /// Lower bound (inclusive).
    pub min: i64,

    /// Upper bound (inclusive); must be greater than min.
    pub max: i64,
}

/// Random number tool.
pub struct RandomNumberTool;

impl RandomNumberTool {
    pub const NAME: &'static str = "random_number";

    pub const DESCRIPTION: &'static str =
        "Generate a random integer between min and max, inclusive.";

    #[instrument(skip_all, fields(min = params.min, max = params.max))]
    pub fn execute(params: &RandomNumberParams, _config: &Config) -> CallToolResult {
        if params.min >= params.max {
            return error_result("Error: min must be less than max");
        }

        let mut rng = rand::thread_rng();
        let number = rng.gen_range(params.min..=params.max);
        success_result(number.to_string())
    }

    pub fn to_tool() -> Tool {
        tool_model::<RandomNumberParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        route(Self::to_tool(), config, Self::execute)
    }
}
