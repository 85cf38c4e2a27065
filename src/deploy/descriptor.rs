//! Declarative description of the runtime units and their Compose rendering.
//!
//! Ports and database credentials are always variable references. A
//! descriptor renders either as a template, where each reference becomes
//! `${VAR:?VAR must be set}` so Compose itself refuses to start with an
//! unbound variable, or resolved against a bound [`StackEnv`].

use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, BTreeSet};

use super::StackError;
use super::env::StackEnv;

pub const APP_UNIT: &str = "app";
pub const DB_UNIT: &str = "db";
pub const DATA_VOLUME: &str = "postgres_data";
pub const POSTGRES_IMAGE: &str = "postgres:16-alpine";

/// A value in a unit definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Literal(String),
    /// Reference to a required environment variable.
    Var(&'static str),
}

impl EnvValue {
    pub fn literal(value: impl Into<String>) -> Self {
        EnvValue::Literal(value.into())
    }

    fn render(&self, interpolation: Interpolation<'_>) -> String {
        match (self, interpolation) {
            (EnvValue::Literal(value), _) => value.clone(),
            (EnvValue::Var(name), Interpolation::Template) => {
                format!("${{{name}:?{name} must be set}}")
            }
            (EnvValue::Var(name), Interpolation::Resolved(env)) => {
                env.get(name).unwrap_or_default().to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitSource {
    /// Built from a local build context.
    Build { context: String },
    Image(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    No,
    Always,
    OnFailure,
    UnlessStopped,
}

impl RestartPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestartPolicy::No => "no",
            RestartPolicy::Always => "always",
            RestartPolicy::OnFailure => "on-failure",
            RestartPolicy::UnlessStopped => "unless-stopped",
        }
    }
}

/// `host:container` port publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    pub host: EnvValue,
    pub container: EnvValue,
}

impl PortMapping {
    /// Publishes the port bound to `var` on the same number inside the unit.
    pub fn same(var: &'static str) -> Self {
        Self {
            host: EnvValue::Var(var),
            container: EnvValue::Var(var),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountSource {
    /// Host path, relative to the project directory.
    Bind(String),
    /// A declared named volume.
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    pub source: MountSource,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeUnit {
    pub name: String,
    pub source: UnitSource,
    pub restart: RestartPolicy,
    pub env_file: Option<String>,
    pub environment: BTreeMap<String, EnvValue>,
    pub ports: Vec<PortMapping>,
    pub depends_on: Vec<String>,
    pub volumes: Vec<VolumeMount>,
}

impl RuntimeUnit {
    fn variables(&self) -> impl Iterator<Item = &'static str> + '_ {
        let env = self.environment.values();
        let ports = self.ports.iter().flat_map(|p| [&p.host, &p.container]);
        env.chain(ports).filter_map(|v| match v {
            EnvValue::Var(name) => Some(*name),
            EnvValue::Literal(_) => None,
        })
    }
}

/// Durable storage that outlives unit recreation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedVolume {
    pub name: String,
}

/// How variable references are rendered.
#[derive(Debug, Clone, Copy)]
pub enum Interpolation<'a> {
    Template,
    Resolved(&'a StackEnv),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub units: Vec<RuntimeUnit>,
    pub volumes: Vec<NamedVolume>,
}

impl Descriptor {
    /// The Task Tracker topology: the HTTP application and its PostgreSQL
    /// database.
    pub fn task_tracker() -> Self {
        let mut app_env: BTreeMap<String, EnvValue> =
            ["DB_NAME", "DB_USER", "DB_PASSWORD", "DB_PORT"]
                .into_iter()
                .map(|var| (var.to_string(), EnvValue::Var(var)))
                .collect();
        app_env.insert("APP_HOST".to_string(), EnvValue::literal("0.0.0.0"));
        app_env.insert("APP_PORT".to_string(), EnvValue::Var("APP_PORT"));
        app_env.insert("DB_HOST".to_string(), EnvValue::literal(DB_UNIT));

        let app = RuntimeUnit {
            name: APP_UNIT.to_string(),
            source: UnitSource::Build {
                context: ".".to_string(),
            },
            restart: RestartPolicy::Always,
            env_file: Some(".env".to_string()),
            environment: app_env,
            ports: vec![PortMapping::same("APP_PORT")],
            depends_on: vec![DB_UNIT.to_string()],
            volumes: vec![VolumeMount {
                source: MountSource::Bind(".".to_string()),
                target: "/app".to_string(),
            }],
        };

        let db_env: BTreeMap<String, EnvValue> = [
            ("POSTGRES_DB", "DB_NAME"),
            ("POSTGRES_USER", "DB_USER"),
            ("POSTGRES_PASSWORD", "DB_PASSWORD"),
            ("PGPORT", "DB_PORT"),
        ]
        .into_iter()
        .map(|(key, var)| (key.to_string(), EnvValue::Var(var)))
        .collect();

        let db = RuntimeUnit {
            name: DB_UNIT.to_string(),
            source: UnitSource::Image(POSTGRES_IMAGE.to_string()),
            restart: RestartPolicy::Always,
            env_file: None,
            environment: db_env,
            ports: vec![PortMapping::same("DB_PORT")],
            depends_on: Vec::new(),
            volumes: vec![VolumeMount {
                source: MountSource::Named(DATA_VOLUME.to_string()),
                target: "/var/lib/postgresql/data".to_string(),
            }],
        };

        Self {
            units: vec![app, db],
            volumes: vec![NamedVolume {
                name: DATA_VOLUME.to_string(),
            }],
        }
    }

    pub fn unit(&self, name: &str) -> Option<&RuntimeUnit> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Checks unit names, dependencies and volume ownership.
    ///
    /// # Errors
    ///
    /// - [`StackError::DuplicateUnit`] if two units share a name
    /// - [`StackError::UnknownDependency`] for a dependency on a missing unit
    /// - [`StackError::DependencyCycle`] if dependencies loop
    /// - [`StackError::UndeclaredVolume`] for a mount of an undeclared named volume
    /// - [`StackError::SharedVolume`] if a named volume is mounted by two units
    pub fn validate(&self) -> Result<(), StackError> {
        let mut names = BTreeSet::new();
        for unit in &self.units {
            if !names.insert(unit.name.as_str()) {
                return Err(StackError::DuplicateUnit(unit.name.clone()));
            }
        }

        for unit in &self.units {
            if let Some(missing) = unit.depends_on.iter().find(|d| !names.contains(d.as_str())) {
                return Err(StackError::UnknownDependency {
                    unit: unit.name.clone(),
                    dependency: missing.clone(),
                });
            }
        }

        let declared: BTreeSet<&str> = self.volumes.iter().map(|v| v.name.as_str()).collect();
        let mut owners: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for unit in &self.units {
            for mount in &unit.volumes {
                if let MountSource::Named(volume) = &mount.source {
                    if !declared.contains(volume.as_str()) {
                        return Err(StackError::UndeclaredVolume {
                            unit: unit.name.clone(),
                            volume: volume.clone(),
                        });
                    }
                    owners.entry(volume.as_str()).or_default().push(unit.name.clone());
                }
            }
        }
        if let Some((volume, units)) = owners.into_iter().find(|(_, units)| units.len() > 1) {
            return Err(StackError::SharedVolume {
                volume: volume.to_string(),
                units,
            });
        }

        self.startup_order().map(|_| ())
    }

    /// Units in the order the orchestrator starts them: every unit after
    /// its dependencies, ties broken by declaration order.
    pub fn startup_order(&self) -> Result<Vec<&RuntimeUnit>, StackError> {
        let mut started: BTreeSet<&str> = BTreeSet::new();
        let mut order = Vec::with_capacity(self.units.len());

        while order.len() < self.units.len() {
            let next = self.units.iter().find(|u| {
                !started.contains(u.name.as_str())
                    && u.depends_on.iter().all(|d| started.contains(d.as_str()))
            });

            match next {
                Some(unit) => {
                    started.insert(unit.name.as_str());
                    order.push(unit);
                }
                None => {
                    let stuck = self
                        .units
                        .iter()
                        .filter(|u| !started.contains(u.name.as_str()))
                        .map(|u| u.name.clone())
                        .collect();
                    return Err(StackError::DependencyCycle(stuck));
                }
            }
        }

        Ok(order)
    }

    /// Every variable referenced by any unit, sorted.
    pub fn required_variables(&self) -> Vec<&'static str> {
        let set: BTreeSet<&'static str> = self.units.iter().flat_map(|u| u.variables()).collect();
        set.into_iter().collect()
    }

    /// Renders a Compose document. Same descriptor and environment give
    /// byte-identical output.
    pub fn render(&self, interpolation: Interpolation<'_>) -> Result<String, StackError> {
        Ok(serde_yaml::to_string(&self.to_compose(interpolation))?)
    }

    fn to_compose(&self, interpolation: Interpolation<'_>) -> Value {
        let mut services = Mapping::new();
        for unit in &self.units {
            services.insert(
                Value::from(unit.name.clone()),
                Value::Mapping(unit_to_compose(unit, interpolation)),
            );
        }

        let mut volumes = Mapping::new();
        for volume in &self.volumes {
            volumes.insert(
                Value::from(volume.name.clone()),
                Value::Mapping(Mapping::new()),
            );
        }

        let mut doc = Mapping::new();
        doc.insert("services".into(), Value::Mapping(services));
        if !volumes.is_empty() {
            doc.insert("volumes".into(), Value::Mapping(volumes));
        }
        Value::Mapping(doc)
    }
}

fn strings(items: impl IntoIterator<Item = String>) -> Value {
    Value::Sequence(items.into_iter().map(Value::from).collect())
}

fn unit_to_compose(unit: &RuntimeUnit, interpolation: Interpolation<'_>) -> Mapping {
    let mut m = Mapping::new();

    match &unit.source {
        UnitSource::Build { context } => {
            m.insert("build".into(), Value::from(context.clone()));
        }
        UnitSource::Image(image) => {
            m.insert("image".into(), Value::from(image.clone()));
        }
    }

    m.insert("restart".into(), Value::from(unit.restart.as_str()));

    if let Some(env_file) = &unit.env_file {
        m.insert("env_file".into(), Value::from(env_file.clone()));
    }

    if !unit.environment.is_empty() {
        let mut env = Mapping::new();
        for (key, value) in &unit.environment {
            env.insert(
                Value::from(key.clone()),
                Value::from(value.render(interpolation)),
            );
        }
        m.insert("environment".into(), Value::Mapping(env));
    }

    if !unit.ports.is_empty() {
        m.insert(
            "ports".into(),
            strings(unit.ports.iter().map(|p| {
                format!(
                    "{}:{}",
                    p.host.render(interpolation),
                    p.container.render(interpolation)
                )
            })),
        );
    }

    if !unit.depends_on.is_empty() {
        m.insert("depends_on".into(), strings(unit.depends_on.iter().cloned()));
    }

    if !unit.volumes.is_empty() {
        m.insert(
            "volumes".into(),
            strings(unit.volumes.iter().map(|v| {
                let source = match &v.source {
                    MountSource::Bind(path) | MountSource::Named(path) => path,
                };
                format!("{}:{}", source, v.target)
            })),
        );
    }

    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_env() -> StackEnv {
        let values: BTreeMap<&str, &str> = [
            ("APP_PORT", "8000"),
            ("DB_PORT", "5432"),
            ("DB_NAME", "tracker"),
            ("DB_USER", "admin"),
            ("DB_PASSWORD", "secret"),
        ]
        .into_iter()
        .collect();

        StackEnv::bind(&Descriptor::task_tracker(), |name| {
            values.get(name).map(|v| v.to_string())
        })
        .unwrap()
    }

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_task_tracker_is_valid_with_two_units() {
        let descriptor = Descriptor::task_tracker();
        descriptor.validate().unwrap();
        assert_eq!(descriptor.units.len(), 2);
    }

    #[test]
    fn test_database_starts_first() {
        let descriptor = Descriptor::task_tracker();
        let order: Vec<&str> = descriptor
            .startup_order()
            .unwrap()
            .iter()
            .map(|u| u.name.as_str())
            .collect();
        assert_eq!(order, vec![DB_UNIT, APP_UNIT]);
    }

    #[test]
    fn test_required_variables() {
        assert_eq!(
            Descriptor::task_tracker().required_variables(),
            vec!["APP_PORT", "DB_NAME", "DB_PASSWORD", "DB_PORT", "DB_USER"]
        );
    }

    #[test]
    fn test_no_literal_ports_or_credentials() {
        let descriptor = Descriptor::task_tracker();
        for unit in &descriptor.units {
            for port in &unit.ports {
                assert!(matches!(port.host, EnvValue::Var(_)));
                assert!(matches!(port.container, EnvValue::Var(_)));
            }
        }
        let db = descriptor.unit(DB_UNIT).unwrap();
        assert!(db.environment.values().all(|v| matches!(v, EnvValue::Var(_))));
    }

    #[test]
    fn test_resolved_render_publishes_scenario_ports() {
        let env = scenario_env();
        let doc = parse(
            &Descriptor::task_tracker()
                .render(Interpolation::Resolved(&env))
                .unwrap(),
        );

        assert_eq!(doc["services"]["app"]["ports"][0], Value::from("8000:8000"));
        assert_eq!(doc["services"]["db"]["ports"][0], Value::from("5432:5432"));
        assert_eq!(
            doc["services"]["db"]["environment"]["POSTGRES_DB"],
            Value::from("tracker")
        );
        assert_eq!(
            doc["services"]["db"]["environment"]["PGPORT"],
            Value::from("5432")
        );
        assert_eq!(
            doc["services"]["app"]["environment"]["DB_HOST"],
            Value::from("db")
        );
    }

    #[test]
    fn test_template_render_fails_fast_on_unbound_variables() {
        let rendered = Descriptor::task_tracker()
            .render(Interpolation::Template)
            .unwrap();
        let doc = parse(&rendered);

        assert_eq!(
            doc["services"]["app"]["ports"][0],
            Value::from("${APP_PORT:?APP_PORT must be set}:${APP_PORT:?APP_PORT must be set}")
        );
        assert!(!rendered.contains("8000"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let env = scenario_env();
        let descriptor = Descriptor::task_tracker();
        assert_eq!(
            descriptor.render(Interpolation::Resolved(&env)).unwrap(),
            descriptor.render(Interpolation::Resolved(&env)).unwrap()
        );
    }

    #[test]
    fn test_checked_in_compose_file_matches_template() {
        let checked_in = parse(include_str!("../../docker-compose.yml"));
        let rendered = parse(
            &Descriptor::task_tracker()
                .render(Interpolation::Template)
                .unwrap(),
        );
        assert_eq!(checked_in, rendered);
    }

    #[test]
    fn test_named_volume_and_bind_mount() {
        let doc = parse(
            &Descriptor::task_tracker()
                .render(Interpolation::Template)
                .unwrap(),
        );
        assert_eq!(doc["services"]["app"]["volumes"][0], Value::from(".:/app"));
        assert_eq!(
            doc["services"]["db"]["volumes"][0],
            Value::from("postgres_data:/var/lib/postgresql/data")
        );
        assert!(doc["volumes"]["postgres_data"].is_mapping());
    }

    #[test]
    fn test_validate_rejects_unknown_dependency() {
        let mut descriptor = Descriptor::task_tracker();
        descriptor.units[0].depends_on.push("cache".to_string());
        assert!(matches!(
            descriptor.validate(),
            Err(StackError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_cycle() {
        let mut descriptor = Descriptor::task_tracker();
        descriptor.units[1].depends_on.push(APP_UNIT.to_string());
        assert!(matches!(
            descriptor.validate(),
            Err(StackError::DependencyCycle(_))
        ));
    }

    #[test]
    fn test_validate_rejects_shared_volume() {
        let mut descriptor = Descriptor::task_tracker();
        descriptor.units[0].volumes.push(VolumeMount {
            source: MountSource::Named(DATA_VOLUME.to_string()),
            target: "/data".to_string(),
        });
        assert!(matches!(
            descriptor.validate(),
            Err(StackError::SharedVolume { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_undeclared_volume() {
        let mut descriptor = Descriptor::task_tracker();
        descriptor.volumes.clear();
        assert!(matches!(
            descriptor.validate(),
            Err(StackError::UndeclaredVolume { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_unit() {
        let mut descriptor = Descriptor::task_tracker();
        let copy = descriptor.units[1].clone();
        descriptor.units.push(copy);
        assert!(matches!(
            descriptor.validate(),
            Err(StackError::DuplicateUnit(_))
        ));
    }
}
