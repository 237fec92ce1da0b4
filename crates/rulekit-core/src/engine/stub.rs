//! In-memory reference engine.
//!
//! Implements the full engine capability against a deliberately tiny rule
//! form so the pipeline, loader, and CLI can be exercised end to end without
//! the real compiler. This is a test double, not a rule engine: one
//! comparison per rule, one assignment per rule, text sources only.
//!
//! The rule form it understands:
//!
//! ```text
//! rule "Mark adult"
//! when age >= 18
//! then set adult true
//! end
//! ```
//!
//! Anything it cannot parse in a `.drl`/`.dslr` source becomes an ERROR
//! diagnostic; `.dsl` dialect definitions are accepted but not interpreted.
//! Archives are JSON documents carrying the staged descriptor plus the
//! compiled rules, so repeat builds of the same tree are byte-identical.

use super::{
    BuildSession, CompiledModule, Diagnostic, ModuleId, RuleContainer, RuleEngine,
    StatelessSession,
};
use crate::descriptor;
use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Reference implementation of [`RuleEngine`].
#[derive(Default)]
pub struct StubEngine {
    modules: Mutex<BTreeMap<String, Arc<StubModuleDoc>>>,
    next_module: AtomicU64,
    harden_calls: AtomicUsize,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times [`RuleEngine::harden_xml_parsers`] ran on this engine.
    pub fn harden_count(&self) -> usize {
        self.harden_calls.load(Ordering::Relaxed)
    }
}

impl RuleEngine for StubEngine {
    fn new_build_session(&self) -> Box<dyn BuildSession> {
        Box::new(StubBuildSession { entries: Vec::new() })
    }

    fn register_module(&self, bytes: &[u8]) -> anyhow::Result<ModuleId> {
        let doc: StubModuleDoc =
            serde_json::from_slice(bytes).context("archive is not a rulekit stub module")?;
        let id = ModuleId(format!(
            "stub:{}",
            self.next_module.fetch_add(1, Ordering::Relaxed)
        ));
        self.modules
            .lock()
            .unwrap()
            .insert(id.0.clone(), Arc::new(doc));
        Ok(id)
    }

    fn new_container(&self, id: &ModuleId) -> anyhow::Result<Box<dyn RuleContainer>> {
        let doc = self
            .modules
            .lock()
            .unwrap()
            .get(&id.0)
            .cloned()
            .ok_or_else(|| anyhow!("module not registered: {id}"))?;
        Ok(Box::new(StubContainer { doc }))
    }

    fn harden_xml_parsers(&self) {
        self.harden_calls.fetch_add(1, Ordering::Relaxed);
    }
}

/// What a stub archive deserializes to. Field order is the serialization
/// order, which keeps repeat builds byte-identical.
#[derive(Debug, Serialize, Deserialize)]
struct StubModuleDoc {
    descriptor: String,
    rules: Vec<StubRule>,
}

/// One compiled rule: a single comparison guarding a single assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StubRule {
    name: String,
    field: String,
    op: Comparator,
    threshold: f64,
    set_field: String,
    set_value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Comparator {
    Ge,
    Gt,
    Le,
    Lt,
    Eq,
}

impl Comparator {
    fn parse(token: &str) -> Option<Self> {
        match token {
            ">=" => Some(Self::Ge),
            ">" => Some(Self::Gt),
            "<=" => Some(Self::Le),
            "<" => Some(Self::Lt),
            "==" => Some(Self::Eq),
            _ => None,
        }
    }

    fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Ge => lhs >= rhs,
            Self::Gt => lhs > rhs,
            Self::Le => lhs <= rhs,
            Self::Lt => lhs < rhs,
            Self::Eq => lhs == rhs,
        }
    }
}

struct StubBuildSession {
    // Stage-call order; diagnostics are reported in this order.
    entries: Vec<(String, Vec<u8>)>,
}

impl BuildSession for StubBuildSession {
    fn stage(&mut self, path: &str, bytes: Vec<u8>) -> anyhow::Result<()> {
        self.entries.push((path.to_string(), bytes));
        Ok(())
    }

    fn build(self: Box<Self>) -> anyhow::Result<(Box<dyn CompiledModule>, Vec<Diagnostic>)> {
        let mut diagnostics = Vec::new();
        let mut rules = Vec::new();

        let descriptor = match self
            .entries
            .iter()
            .find(|(path, _)| path == descriptor::DESCRIPTOR_PATH)
        {
            Some((_, bytes)) => match std::str::from_utf8(bytes) {
                Ok(text) => text.to_string(),
                Err(_) => {
                    diagnostics.push(Diagnostic::error("module descriptor is not valid UTF-8"));
                    String::new()
                }
            },
            None => {
                diagnostics.push(Diagnostic::error(format!(
                    "missing module descriptor at {}",
                    descriptor::DESCRIPTOR_PATH
                )));
                String::new()
            }
        };

        let has_dialect = self.entries.iter().any(|(path, _)| path.ends_with(".dsl"));
        for (path, bytes) in &self.entries {
            if !(path.ends_with(".drl") || path.ends_with(".dslr")) {
                continue;
            }
            if path.ends_with(".dslr") && !has_dialect {
                diagnostics.push(Diagnostic::warning(format!(
                    "{path}: no dialect definition staged; expanding verbatim"
                )));
            }
            match std::str::from_utf8(bytes) {
                Ok(text) => parse_source(path, text, &mut rules, &mut diagnostics),
                Err(_) => diagnostics.push(Diagnostic::error(format!(
                    "{path}: rule source is not valid UTF-8"
                ))),
            }
        }

        diagnostics.push(Diagnostic::info(format!("compiled {} rule(s)", rules.len())));

        let module = StubCompiledModule {
            doc: StubModuleDoc { descriptor, rules },
        };
        Ok((Box::new(module), diagnostics))
    }
}

/// Parse every rule block in one source file. The first malformed line
/// fails the whole file with a single ERROR diagnostic.
fn parse_source(path: &str, text: &str, rules: &mut Vec<StubRule>, diagnostics: &mut Vec<Diagnostic>) {
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("//"))
        .filter(|l| !l.starts_with("package ") && !l.starts_with("import "));

    while let Some(line) = lines.next() {
        let Some(raw_name) = line.strip_prefix("rule") else {
            diagnostics.push(Diagnostic::error(format!(
                "{path}: expected 'rule', found '{line}'"
            )));
            return;
        };
        let name = raw_name.trim().trim_matches('"').to_string();

        let Some((field, op, threshold)) = lines.next().and_then(parse_condition) else {
            diagnostics.push(Diagnostic::error(format!(
                "{path}: rule '{name}' has no valid 'when <field> <op> <number>' line"
            )));
            return;
        };
        let Some((set_field, set_value)) = lines.next().and_then(parse_action) else {
            diagnostics.push(Diagnostic::error(format!(
                "{path}: rule '{name}' has no valid 'then set <field> <value>' line"
            )));
            return;
        };
        if lines.next() != Some("end") {
            diagnostics.push(Diagnostic::error(format!(
                "{path}: rule '{name}' is not terminated by 'end'"
            )));
            return;
        }

        rules.push(StubRule {
            name,
            field,
            op,
            threshold,
            set_field,
            set_value,
        });
    }
}

fn parse_condition(line: &str) -> Option<(String, Comparator, f64)> {
    let rest = line.strip_prefix("when ")?;
    let mut parts = rest.split_whitespace();
    let field = parts.next()?.to_string();
    let op = Comparator::parse(parts.next()?)?;
    let threshold: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((field, op, threshold))
}

fn parse_action(line: &str) -> Option<(String, Value)> {
    let rest = line.strip_prefix("then set ")?;
    let mut parts = rest.split_whitespace();
    let field = parts.next()?.to_string();
    let token = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let value = match token {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => match other.parse::<f64>() {
            Ok(n) => serde_json::json!(n),
            Err(_) => Value::String(other.trim_matches('"').to_string()),
        },
    };
    Some((field, value))
}

#[derive(Debug)]
struct StubCompiledModule {
    doc: StubModuleDoc,
}

impl CompiledModule for StubCompiledModule {
    fn bytes(&self) -> anyhow::Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.doc).context("serialize stub module")
    }
}

#[derive(Debug)]
struct StubContainer {
    doc: Arc<StubModuleDoc>,
}

impl RuleContainer for StubContainer {
    fn new_stateless_session(&self, name: &str) -> anyhow::Result<Box<dyn StatelessSession>> {
        if !session_names(&self.doc.descriptor).iter().any(|n| n == name) {
            bail!("no ksession named '{name}' declared by the module descriptor");
        }
        Ok(Box::new(StubSession {
            rules: self.doc.rules.clone(),
        }))
    }
}

/// Session names declared by the descriptor document, in declaration order.
fn session_names(descriptor: &str) -> Vec<String> {
    const MARKER: &str = "<ksession name=\"";
    let mut names = Vec::new();
    let mut rest = descriptor;
    while let Some(idx) = rest.find(MARKER) {
        let tail = &rest[idx + MARKER.len()..];
        match tail.find('"') {
            Some(end) => {
                names.push(tail[..end].to_string());
                rest = &tail[end..];
            }
            None => break,
        }
    }
    names
}

#[derive(Debug)]
struct StubSession {
    rules: Vec<StubRule>,
}

impl StatelessSession for StubSession {
    fn execute(&self, facts: &mut [Value]) -> anyhow::Result<()> {
        for fact in facts.iter_mut() {
            for rule in &self.rules {
                let holds = fact
                    .get(&rule.field)
                    .and_then(Value::as_f64)
                    .map(|lhs| rule.op.holds(lhs, rule.threshold))
                    .unwrap_or(false);
                if holds {
                    if let Some(obj) = fact.as_object_mut() {
                        obj.insert(rule.set_field.clone(), rule.set_value.clone());
                    }
                }
            }
        }
        Ok(())
    }
}
