/// Who an agent is. Rendered into its system prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl AgentProfile {
    pub fn new(role: &str, goal: &str, backstory: &str) -> Self {
        Self {
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
        }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are {role}. {backstory}\n\n\
             Your personal goal is: {goal}\n\n\
             Use the tools available to you when you need live data. Tool results are JSON; \
             a result with \"success\": false explains what went wrong, so work with what you \
             have instead of retrying the same call. When you are done, reply with your \
             complete final answer and no tool calls.",
            role = self.role,
            backstory = self.backstory,
            goal = self.goal,
        )
    }
}

/// What a task asks for. `{key}` placeholders are filled from kickoff inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskBrief {
    pub description: String,
    pub expected_output: String,
}

impl TaskBrief {
    pub fn new(description: &str, expected_output: &str) -> Self {
        Self {
            description: description.to_string(),
            expected_output: expected_output.to_string(),
        }
    }
}

/// Built-in profile for the default crew's agents.
pub fn agent_profile(name: &str) -> Option<AgentProfile> {
    let profile = match name {
        "chart_analyst" => AgentProfile::new(
            "Senior Technical Chart Analyst",
            "Extract trading pair, timeframe, indicators, patterns and key levels from \
             recorded trading chart videos",
            "You have spent fifteen years reading price action for a proprietary desk and \
             you only report what the chart actually shows.",
        ),
        "financial_data_agent" => AgentProfile::new(
            "Real-Time Market Data Specialist",
            "Gather current prices, spreads, session status and news sentiment for the \
             instrument under analysis",
            "You run the market data desk. You know which feed to query for crypto and \
             which for forex, and you flag stale or missing data instead of guessing.",
        ),
        "strategy_agent" => AgentProfile::new(
            "Trading Strategy Architect",
            "Turn chart analysis and live market data into a concrete, risk-managed trade plan",
            "You design trade plans for a risk-conscious fund. Every plan you sign off has a \
             sized position, a stop and a target that make sense together.",
        ),
        _ => return None,
    };
    Some(profile)
}

/// Built-in brief for the default crew's tasks.
pub fn task_brief(name: &str) -> Option<TaskBrief> {
    let brief = match name {
        "chart_analysis_task" => TaskBrief::new(
            "Analyze the trading chart video at {video_path} using the video analysis tool. \
             Identify the trading pair, timeframe, visible technical indicators, chart patterns, \
             support and resistance levels, and the trend direction and strength. The user \
             expects the pair to be {trading_pair}; note any mismatch.",
            "A structured chart analysis: trading pair, timeframe, indicators, patterns with \
             confidence, support and resistance levels, trend direction and strength, key \
             observations and an overall confidence score.",
        ),
        "market_data_task" => TaskBrief::new(
            "Using the chart analysis, fetch real-time market data for {trading_pair}. Use the \
             crypto connector for cryptocurrency pairs and the forex fetcher for currency \
             pairs. Pull recent news sentiment for the instrument. Compare the live price with \
             the levels from the chart analysis.",
            "A market data report: current price, bid/ask and spread, market status, news \
             sentiment summary and how the live price sits relative to the charted levels.",
        ),
        "strategy_formulation_task" => TaskBrief::new(
            "Formulate a trading strategy for {trading_pair} from the chart analysis and the \
             market data. Decide direction, entry, stop loss and take profit. Size the \
             position with the risk calculator (assume a 10000 account and 2% risk unless \
             told otherwise) and check the plan with the strategy validator.",
            "A markdown trading strategy with: summary, direction, entry, stop loss, take \
             profit, position size, reward/risk ratio, rationale tied to the chart and the \
             market data, validation results and key risks.",
        ),
        _ => return None,
    };
    Some(brief)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_agents_have_profiles() {
        for name in ["chart_analyst", "financial_data_agent", "strategy_agent"] {
            let profile = agent_profile(name).unwrap();
            assert!(!profile.role.is_empty(), "{name}");
        }
        assert!(agent_profile("nobody").is_none());
    }

    #[test]
    fn default_tasks_have_briefs() {
        let chart = task_brief("chart_analysis_task").unwrap();
        assert!(chart.description.contains("{video_path}"));
        assert!(task_brief("market_data_task").unwrap().description.contains("{trading_pair}"));
        assert!(task_brief("strategy_formulation_task").is_some());
        assert!(task_brief("unknown_task").is_none());
    }

    #[test]
    fn system_prompt_includes_profile() {
        let prompt = agent_profile("strategy_agent").unwrap().system_prompt();
        assert!(prompt.starts_with("You are Trading Strategy Architect."));
        assert!(prompt.contains("Your personal goal is: Turn chart analysis"));
    }
}
