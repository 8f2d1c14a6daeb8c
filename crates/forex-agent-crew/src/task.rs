use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::CrewError;
use crate::prompts::TaskBrief;

/// One unit of work in the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    pub name: String,
    pub brief: TaskBrief,
    /// Name of the agent that performs this task.
    pub agent: String,
    /// Earlier tasks whose outputs are handed to this one, in this order.
    pub context: Vec<String>,
    /// Where the final answer is written, relative to the crew's output dir.
    pub output_file: Option<PathBuf>,
}

impl TaskSpec {
    pub fn new(name: &str, agent: &str, brief: TaskBrief) -> Self {
        Self {
            name: name.to_string(),
            brief,
            agent: agent.to_string(),
            context: Vec::new(),
            output_file: None,
        }
    }

    pub fn with_context(mut self, context: &[&str]) -> Self {
        self.context = context.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// The user prompt for this task: brief plus the outputs it depends on.
    pub fn render(
        &self,
        inputs: &HashMap<String, String>,
        context: &[(&str, &str)],
    ) -> Result<String, CrewError> {
        let mut prompt = format!(
            "{}\n\nThis is the expected criteria for your final answer: {}\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            interpolate(&self.brief.description, inputs)?,
            interpolate(&self.brief.expected_output, inputs)?,
        );

        if !context.is_empty() {
            prompt.push_str("\n\nThis is the context you're working with:");
            for (task, output) in context {
                prompt.push_str(&format!("\n\n## Output of {task}\n{output}"));
            }
        }
        Ok(prompt)
    }
}

/// Replace `{key}` with `inputs[key]`.
///
/// Only identifier-like keys count as placeholders, so literal JSON in a
/// brief passes through untouched. A placeholder with no input is an error.
pub fn interpolate(template: &str, inputs: &HashMap<String, String>) -> Result<String, CrewError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let key_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let key = &after[..key_len];

        if !key.is_empty() && after[key_len..].starts_with('}') {
            let value = inputs
                .get(key)
                .ok_or_else(|| CrewError::MissingInput(key.to_string()))?;
            out.push_str(value);
            rest = &after[key_len + 1..];
        } else {
            out.push('{');
            rest = after;
        }
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> HashMap<String, String> {
        HashMap::from([
            ("video_path".to_string(), "charts/eurusd.mp4".to_string()),
            ("trading_pair".to_string(), "EUR/USD".to_string()),
        ])
    }

    #[test]
    fn fills_known_placeholders() {
        let text = interpolate("Analyze {video_path} for {trading_pair}.", &inputs()).unwrap();
        assert_eq!(text, "Analyze charts/eurusd.mp4 for EUR/USD.");
    }

    #[test]
    fn leaves_json_braces_alone() {
        let template = r#"Return {"pair": "{trading_pair}", "levels": {}} please"#;
        let text = interpolate(template, &inputs()).unwrap();
        assert_eq!(text, r#"Return {"pair": "EUR/USD", "levels": {}} please"#);
    }

    #[test]
    fn missing_input_is_error() {
        match interpolate("Balance {account_balance}", &inputs()) {
            Err(CrewError::MissingInput(key)) => assert_eq!(key, "account_balance"),
            other => panic!("expected MissingInput, got {other:?}"),
        }
    }

    #[test]
    fn trailing_open_brace() {
        assert_eq!(interpolate("odd {", &inputs()).unwrap(), "odd {");
    }

    #[test]
    fn render_appends_context_in_order() {
        let task = TaskSpec::new(
            "strategy_formulation_task",
            "strategy_agent",
            TaskBrief::new("Plan {trading_pair}", "A plan"),
        );
        let prompt = task
            .render(
                &inputs(),
                &[("chart_analysis_task", "uptrend"), ("market_data_task", "1.0850")],
            )
            .unwrap();

        assert!(prompt.starts_with("Plan EUR/USD"));
        assert!(prompt.contains("expected criteria for your final answer: A plan"));
        let chart = prompt.find("## Output of chart_analysis_task\nuptrend").unwrap();
        let market = prompt.find("## Output of market_data_task\n1.0850").unwrap();
        assert!(chart < market);
    }

    #[test]
    fn render_without_context_has_no_context_section() {
        let task = TaskSpec::new("t", "a", TaskBrief::new("Do it", "Done"));
        let prompt = task.render(&HashMap::new(), &[]).unwrap();
        assert!(!prompt.contains("context you're working with"));
    }
}
