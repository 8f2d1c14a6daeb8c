use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use forex_agent_models::{CrewConfig, CrewOutput, TaskOutput};
use forex_agent_tools::Toolbox;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agent::Agent;
use crate::error::CrewError;
use crate::llm::LlmClient;
use crate::prompts::{agent_profile, task_brief, AgentProfile, TaskBrief};
use crate::task::TaskSpec;

/// Agents and the tasks they run, strictly in order.
pub struct Crew {
    agents: Vec<Agent>,
    tasks: Vec<TaskSpec>,
    llm: Arc<dyn LlmClient>,
    output_dir: PathBuf,
}

impl Crew {
    /// Build a crew, rejecting bad agent or context references up front.
    pub fn new(agents: Vec<Agent>, tasks: Vec<TaskSpec>, llm: Arc<dyn LlmClient>) -> Result<Self, CrewError> {
        let crew = Self {
            agents,
            tasks,
            llm,
            output_dir: PathBuf::from("."),
        };
        crew.validate()?;
        Ok(crew)
    }

    /// Build from config. Each agent gets the subset of `toolbox` it names.
    pub fn from_config(
        config: &CrewConfig,
        toolbox: &Toolbox,
        llm: Arc<dyn LlmClient>,
    ) -> Result<Self, CrewError> {
        let mut agents = Vec::with_capacity(config.agents.len());
        for agent in &config.agents {
            let profile = match (&agent.role, &agent.goal, &agent.backstory) {
                (Some(role), Some(goal), Some(backstory)) => AgentProfile::new(role, goal, backstory),
                _ => {
                    let mut profile = agent_profile(&agent.name).ok_or_else(|| {
                        CrewError::Config(format!(
                            "agent {} has no built-in profile; set role, goal and backstory",
                            agent.name
                        ))
                    })?;
                    if let Some(role) = &agent.role {
                        profile.role = role.clone();
                    }
                    if let Some(goal) = &agent.goal {
                        profile.goal = goal.clone();
                    }
                    if let Some(backstory) = &agent.backstory {
                        profile.backstory = backstory.clone();
                    }
                    profile
                }
            };

            let tools = toolbox
                .subset(&agent.tools)
                .map_err(|tool| CrewError::UnknownTool {
                    agent: agent.name.clone(),
                    tool,
                })?;

            agents.push(
                Agent::new(&agent.name, profile, tools)
                    .with_max_iter(agent.max_iter)
                    .with_model(agent.model.clone()),
            );
        }

        let mut tasks = Vec::with_capacity(config.tasks.len());
        for task in &config.tasks {
            let brief = match (&task.description, &task.expected_output) {
                (Some(description), Some(expected)) => TaskBrief::new(description, expected),
                _ => {
                    let mut brief = task_brief(&task.name).ok_or_else(|| {
                        CrewError::Config(format!(
                            "task {} has no built-in brief; set description and expected_output",
                            task.name
                        ))
                    })?;
                    if let Some(description) = &task.description {
                        brief.description = description.clone();
                    }
                    if let Some(expected) = &task.expected_output {
                        brief.expected_output = expected.clone();
                    }
                    brief
                }
            };

            tasks.push(TaskSpec {
                name: task.name.clone(),
                brief,
                agent: task.agent.clone(),
                context: task.context.clone(),
                output_file: task.output_file.as_ref().map(PathBuf::from),
            });
        }

        Ok(Self::new(agents, tasks, llm)?.with_output_dir(&config.output_dir))
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    /// Every task names a known agent and only takes context from tasks
    /// that run before it. Task names are unique.
    pub fn validate(&self) -> Result<(), CrewError> {
        if self.tasks.is_empty() {
            return Err(CrewError::Config("crew has no tasks".to_string()));
        }

        let mut agent_names = HashSet::new();
        for agent in &self.agents {
            if !agent_names.insert(agent.name.as_str()) {
                return Err(CrewError::Config(format!("duplicate agent {}", agent.name)));
            }
        }

        let mut earlier: HashSet<&str> = HashSet::new();
        for task in &self.tasks {
            if !agent_names.contains(task.agent.as_str()) {
                return Err(CrewError::UnknownAgent {
                    task: task.name.clone(),
                    agent: task.agent.clone(),
                });
            }
            for context in &task.context {
                if !earlier.contains(context.as_str()) {
                    return Err(CrewError::ContextOrder {
                        task: task.name.clone(),
                        context: context.clone(),
                    });
                }
            }
            if !earlier.insert(task.name.as_str()) {
                return Err(CrewError::Config(format!("duplicate task {}", task.name)));
            }
        }
        Ok(())
    }

    fn agent(&self, name: &str) -> Result<&Agent, CrewError> {
        self.agents
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| CrewError::Config(format!("unknown agent {name}")))
    }

    /// Run every task in order and return their outputs.
    ///
    /// `inputs` fill the `{key}` placeholders in task briefs. All briefs are
    /// checked before the first LLM call.
    pub async fn kickoff(&self, inputs: &HashMap<String, String>) -> Result<CrewOutput, CrewError> {
        self.validate()?;
        for task in &self.tasks {
            task.render(inputs, &[]).map_err(|e| e.in_task(&task.name))?;
        }

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let crew_start = Instant::now();
        info!(%run_id, tasks = self.tasks.len(), "Crew kickoff");

        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());
        let mut output_file = None;

        for task in &self.tasks {
            let agent = self.agent(&task.agent)?;
            let context: Vec<(&str, &str)> = task
                .context
                .iter()
                .filter_map(|name| {
                    outputs
                        .iter()
                        .find(|o| &o.task == name)
                        .map(|o| (o.task.as_str(), o.output.as_str()))
                })
                .collect();
            let prompt = task.render(inputs, &context).map_err(|e| e.in_task(&task.name))?;

            info!(task = %task.name, agent = %agent.name, "Task started");
            let task_start = Instant::now();
            let run = agent
                .execute(self.llm.as_ref(), prompt)
                .await
                .map_err(|e| e.in_task(&task.name))?;
            let elapsed_ms = task_start.elapsed().as_millis() as u64;

            let failed_tools = run.tool_calls.iter().filter(|c| !c.success).count();
            if failed_tools > 0 {
                warn!(task = %task.name, failed_tools, "Task finished with failed tool calls");
            }
            info!(
                task = %task.name,
                agent = %agent.name,
                tool_calls = run.tool_calls.len(),
                turns = run.turns,
                elapsed_ms,
                "Task complete"
            );

            if let Some(file) = &task.output_file {
                let path = self
                    .write_output(file, &run.output)
                    .await
                    .map_err(|e| e.in_task(&task.name))?;
                output_file = Some(path.display().to_string());
            }

            outputs.push(TaskOutput {
                task: task.name.clone(),
                agent: agent.name.clone(),
                output: run.output,
                tool_calls: run.tool_calls,
                elapsed_ms,
            });
        }

        let final_output = outputs
            .last()
            .map(|o| o.output.clone())
            .unwrap_or_default();
        info!(
            %run_id,
            elapsed_ms = crew_start.elapsed().as_millis() as u64,
            "Crew finished"
        );

        Ok(CrewOutput {
            run_id,
            started_at,
            tasks: outputs,
            final_output,
            output_file,
        })
    }

    async fn write_output(&self, file: &Path, content: &str) -> Result<PathBuf, CrewError> {
        let path = if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.output_dir.join(file)
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&path, content).await?;
        info!(path = %path.display(), bytes = content.len(), "Wrote task output");
        Ok(path)
    }
}
