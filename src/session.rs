//! Line-oriented command session.
//!
//! A [`Session`] owns one hash table and one instance of each of the other
//! structures, executes text commands against them, and returns each result
//! as JSON together with the time the operation took.

use crate::error::TableError;
use crate::hashing::{HashStep, UniversalParams};
use crate::structures::{Bst, SelfOrganizingList, SkipList};
use crate::table::HashTable;
use serde::Serialize;
use serde_json::{Value, json};
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;

/// Errors produced while parsing or executing a command.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The command line could not be parsed.
    #[error("{0}")]
    Parse(String),

    /// The table rejected the operation.
    #[error(transparent)]
    Table(#[from] TableError),

    /// A result could not be serialized.
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Operation on one of the auxiliary structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureOp {
    /// Insert a key.
    Insert,
    /// Search for a key.
    Search,
    /// Remove a key.
    Remove,
}

impl FromStr for StructureOp {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" | "add" => Ok(Self::Insert),
            "search" | "find" | "get" => Ok(Self::Search),
            "remove" | "delete" => Ok(Self::Remove),
            other => Err(SessionError::Parse(format!(
                "unknown operation '{}' (expected insert, search, or remove)",
                other
            ))),
        }
    }
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `set <key> <value>`
    Set(String, String),
    /// `get <key>`
    Get(String),
    /// `remove <key>`
    Remove(String),
    /// `resize <size>`
    Resize(usize),
    /// `strategy <hashing> <collision>`
    Strategy(String, String),
    /// `params <p> <a> <b>`
    Params(UniversalParams),
    /// `hash <key>`
    Hash(String),
    /// `stats`
    Stats,
    /// `buckets`
    Buckets,
    /// `clear`
    Clear,
    /// `bst <op> <key>`
    Bst(StructureOp, String),
    /// `list <op> <key> [value]`
    List(StructureOp, String, Option<String>),
    /// `skip <op> <key>`
    Skip(StructureOp, String),
}

impl FromStr for Command {
    type Err = SessionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words
            .next()
            .ok_or_else(|| SessionError::Parse("empty command".to_string()))?;
        let args: Vec<&str> = words.collect();

        let arg = |i: usize, what: &str| -> Result<String, SessionError> {
            args.get(i)
                .map(|s| s.to_string())
                .ok_or_else(|| SessionError::Parse(format!("{}: missing {}", name, what)))
        };
        let number = |i: usize, what: &str| -> Result<u64, SessionError> {
            let raw = arg(i, what)?;
            raw.parse()
                .map_err(|e| SessionError::Parse(format!("{}: invalid {} '{}': {}", name, what, raw, e)))
        };

        match name {
            "set" | "put" | "insert" => {
                let key = arg(0, "key")?;
                let value = args.get(1..).map(|rest| rest.join(" ")).unwrap_or_default();
                Ok(Self::Set(key, value))
            }
            "get" | "search" => Ok(Self::Get(arg(0, "key")?)),
            "remove" | "delete" => Ok(Self::Remove(arg(0, "key")?)),
            "resize" => Ok(Self::Resize(number(0, "size")? as usize)),
            "strategy" => Ok(Self::Strategy(arg(0, "hashing")?, arg(1, "collision")?)),
            "params" => Ok(Self::Params(UniversalParams {
                p: number(0, "p")?,
                a: number(1, "a")?,
                b: number(2, "b")?,
            })),
            "hash" => Ok(Self::Hash(arg(0, "key")?)),
            "stats" => Ok(Self::Stats),
            "buckets" => Ok(Self::Buckets),
            "clear" => Ok(Self::Clear),
            "bst" => Ok(Self::Bst(arg(0, "operation")?.parse()?, arg(1, "key")?)),
            "list" => Ok(Self::List(
                arg(0, "operation")?.parse()?,
                arg(1, "key")?,
                args.get(2..)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| rest.join(" ")),
            )),
            "skip" => Ok(Self::Skip(arg(0, "operation")?.parse()?, arg(1, "key")?)),
            other => Err(SessionError::Parse(format!("unknown command '{}'", other))),
        }
    }
}

/// A command result with its execution time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// The command line as received.
    pub command: String,
    /// Wall-clock time spent executing the operation, in microseconds.
    pub elapsed_us: f64,
    /// The structured result.
    pub result: Value,
}

/// Result of the `hash` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashReport {
    /// Primary hash index.
    pub initial_index: usize,
    /// Per-character derivation; simple hashing only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<HashStep>>,
    /// Probe step; double hashing only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
}

/// One table plus the auxiliary structures.
pub struct Session {
    table: HashTable,
    bst: Bst<String>,
    list: SelfOrganizingList<String, String>,
    skip: SkipList<String>,
}

impl Session {
    /// Create a session around `table`.
    pub fn new(table: HashTable) -> Self {
        Self {
            table,
            bst: Bst::new(),
            list: SelfOrganizingList::new(),
            skip: SkipList::new(),
        }
    }

    /// The session's hash table.
    pub fn table(&self) -> &HashTable {
        &self.table
    }

    /// Parse and execute one line.
    pub fn run_line(&mut self, line: &str) -> Result<Response, SessionError> {
        let command: Command = line.parse()?;
        let start = Instant::now();
        let result = self.execute(command)?;
        let elapsed = start.elapsed();

        Ok(Response {
            command: line.trim().to_string(),
            elapsed_us: elapsed.as_secs_f64() * 1_000_000.0,
            result,
        })
    }

    /// Execute a parsed command.
    pub fn execute(&mut self, command: Command) -> Result<Value, SessionError> {
        let value = match command {
            Command::Set(key, value) => serde_json::to_value(self.table.set(&key, &value)?)?,
            Command::Get(key) => serde_json::to_value(self.table.get(&key))?,
            Command::Remove(key) => serde_json::to_value(self.table.remove(&key))?,
            Command::Resize(size) => serde_json::to_value(self.table.resize(size)?)?,
            Command::Strategy(hashing, collision) => {
                let substitutions = self.table.set_strategies_by_name(&hashing, &collision);
                let (hashing, collision) = self.table.strategies();
                json!({
                    "hashing": hashing,
                    "collision": collision,
                    "tableSize": self.table.table_size(),
                    "substitutions": substitutions,
                })
            }
            Command::Params(params) => {
                serde_json::to_value(self.table.set_universal_params(params))?
            }
            Command::Hash(key) => {
                let hashed = self.table.hash(&key);
                serde_json::to_value(HashReport {
                    initial_index: hashed.index,
                    steps: hashed.steps,
                    step: self.table.hash2(&key),
                })?
            }
            Command::Stats => serde_json::to_value(self.table.stats())?,
            Command::Buckets => serde_json::to_value(self.table.buckets())?,
            Command::Clear => {
                self.table.clear();
                serde_json::to_value(self.table.stats())?
            }
            Command::Bst(op, key) => match op {
                StructureOp::Insert => serde_json::to_value(self.bst.insert(key))?,
                StructureOp::Search => serde_json::to_value(self.bst.search(&key))?,
                StructureOp::Remove => serde_json::to_value(self.bst.remove(&key))?,
            },
            Command::List(op, key, value) => match op {
                StructureOp::Insert => {
                    let inserted = self.list.insert(key, value.unwrap_or_default());
                    json!({ "inserted": inserted, "len": self.list.len() })
                }
                StructureOp::Search => serde_json::to_value(self.list.search(&key))?,
                StructureOp::Remove => serde_json::to_value(self.list.remove(&key))?,
            },
            Command::Skip(op, key) => match op {
                StructureOp::Insert => serde_json::to_value(self.skip.insert(key))?,
                StructureOp::Search => serde_json::to_value(self.skip.search(&key))?,
                StructureOp::Remove => serde_json::to_value(self.skip.remove(&key))?,
            },
        };
        Ok(value)
    }
}
