//! Driving Docker Compose.
//!
//! Argument construction is pure ([`ComposeCli::command_for`]); only
//! [`ComposeCli::run`] touches the system.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::info;

use super::StackError;
use super::descriptor::APP_UNIT;
use super::env::StackEnv;

/// Whether `down` also deletes named volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// `down`: units removed, data kept.
    KeepVolumes,
    /// `down -v`: units and named volumes removed. Irreversible.
    RemoveVolumes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpOptions {
    pub build: bool,
    pub detach: bool,
}

impl Default for UpOptions {
    fn default() -> Self {
        Self {
            build: true,
            detach: false,
        }
    }
}

/// An orchestrator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeAction {
    Up(UpOptions),
    Down(Teardown),
    /// One-off command inside a running unit.
    Exec { unit: String, argv: Vec<String> },
}

/// Starts, stops and runs one-off commands in the stack.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn up(&self, options: UpOptions) -> Result<(), StackError>;

    async fn down(&self, teardown: Teardown) -> Result<(), StackError>;

    async fn exec(&self, unit: &str, argv: Vec<String>) -> Result<(), StackError>;
}

fn admin_argv(command: &str) -> Vec<String> {
    vec!["admin".to_string(), command.to_string()]
}

/// Runs the schema migration inside the application unit.
pub async fn migrate_in_stack<O: Orchestrator + ?Sized>(
    orchestrator: &O,
) -> Result<(), StackError> {
    orchestrator.exec(APP_UNIT, admin_argv("migrate")).await
}

/// Runs the seed step inside the application unit.
pub async fn seed_in_stack<O: Orchestrator + ?Sized>(orchestrator: &O) -> Result<(), StackError> {
    orchestrator.exec(APP_UNIT, admin_argv("seed")).await
}

/// Starts the units detached, then migrates and seeds. Stops at the first
/// failing step.
pub async fn bootstrap<O: Orchestrator + ?Sized>(
    orchestrator: &O,
    build: bool,
) -> Result<(), StackError> {
    orchestrator
        .up(UpOptions {
            build,
            detach: true,
        })
        .await?;
    migrate_in_stack(orchestrator).await?;
    seed_in_stack(orchestrator).await
}

/// `docker-compose` / `docker compose` driver.
///
/// Holding a [`StackEnv`] is required to build one, so no command can be
/// issued with an unbound variable. The bound values are exported to the
/// child process, where Compose interpolates them into the template.
pub struct ComposeCli {
    program: String,
    prefix: Vec<String>,
    compose_file: PathBuf,
    project: String,
    env: StackEnv,
}

impl ComposeCli {
    /// Uses the `docker compose` plugin.
    pub fn new(
        compose_file: impl Into<PathBuf>,
        project: impl Into<String>,
        env: StackEnv,
    ) -> Self {
        Self {
            program: "docker".to_string(),
            prefix: vec!["compose".to_string()],
            compose_file: compose_file.into(),
            project: project.into(),
            env,
        }
    }

    /// Prefers a standalone `docker-compose` on `PATH`, falling back to
    /// the `docker compose` plugin.
    pub async fn detect(
        compose_file: impl Into<PathBuf>,
        project: impl Into<String>,
        env: StackEnv,
    ) -> Self {
        let mut cli = Self::new(compose_file, project, env);

        let standalone = Command::new("which")
            .arg("docker-compose")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false);

        if standalone {
            cli.program = "docker-compose".to_string();
            cli.prefix.clear();
        }
        cli
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to [`Self::program`] for `action`.
    pub fn command_for(&self, action: &ComposeAction) -> Vec<String> {
        let mut args = self.prefix.clone();
        args.push("-f".to_string());
        args.push(self.compose_file.display().to_string());
        args.push("-p".to_string());
        args.push(self.project.clone());

        match action {
            ComposeAction::Up(options) => {
                args.push("up".to_string());
                if options.build {
                    args.push("--build".to_string());
                }
                if options.detach {
                    args.push("-d".to_string());
                }
            }
            ComposeAction::Down(teardown) => {
                args.push("down".to_string());
                if *teardown == Teardown::RemoveVolumes {
                    args.push("-v".to_string());
                }
            }
            ComposeAction::Exec { unit, argv } => {
                args.push("exec".to_string());
                args.push("-T".to_string());
                args.push(unit.clone());
                args.extend(argv.iter().cloned());
            }
        }

        args
    }

    /// Runs `action`, inheriting stdio.
    ///
    /// # Errors
    ///
    /// - [`StackError::Spawn`] if the program cannot be started
    /// - [`StackError::CommandFailed`] on a non-zero exit
    pub async fn run(&self, action: &ComposeAction) -> Result<(), StackError> {
        let args = self.command_for(action);
        let command_line = format!("{} {}", self.program, args.join(" "));
        info!(command = %command_line, "Running orchestrator command");

        let status = Command::new(&self.program)
            .args(&args)
            .envs(self.env.vars())
            .status()
            .await
            .map_err(|source| StackError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(StackError::CommandFailed {
                command: command_line,
                code: status.code(),
            })
        }
    }
}

#[async_trait]
impl Orchestrator for ComposeCli {
    async fn up(&self, options: UpOptions) -> Result<(), StackError> {
        self.run(&ComposeAction::Up(options)).await
    }

    async fn down(&self, teardown: Teardown) -> Result<(), StackError> {
        self.run(&ComposeAction::Down(teardown)).await
    }

    async fn exec(&self, unit: &str, argv: Vec<String>) -> Result<(), StackError> {
        self.run(&ComposeAction::Exec {
            unit: unit.to_string(),
            argv,
        })
        .await
    }
}
