//! Program event parsing
//!
//! The escrow factory program emits events as log lines of the form
//! `Program log: Name: key=value, key=value, ...`. Arguments keep their
//! emission order so they can be addressed by position.

use escrow_factory::events::{ESCROW_CREATED, ESCROW_CREATED_ESCROW_ARG, FACTORY_INITIALIZED};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use thiserror::Error;

const PROGRAM_LOG_PREFIX: &str = "Program log: ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventParseError {
    #[error("expected {expected} event, found {found}")]
    WrongEvent { expected: &'static str, found: String },
    #[error("missing argument {index} ({key})")]
    MissingArg { index: usize, key: &'static str },
    #[error("argument {index} is '{found}', expected '{key}'")]
    UnexpectedArg {
        index: usize,
        key: &'static str,
        found: String,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// A named event with its arguments in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramEvent {
    pub name: String,
    pub args: Vec<(String, String)>,
}

impl ProgramEvent {
    /// Parse a single transaction log line. Returns None for lines that are
    /// not program events (invoke/success lines, plain messages).
    pub fn parse_log_line(line: &str) -> Option<Self> {
        let body = line.strip_prefix(PROGRAM_LOG_PREFIX)?;
        let (name, rest) = body.split_once(": ")?;
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }

        let args = rest
            .split(", ")
            .map(|kv| {
                kv.split_once('=')
                    .map(|(k, v)| (k.to_string(), v.to_string()))
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            name: name.to_string(),
            args,
        })
    }

    /// Value of the argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(|(_, v)| v.as_str())
    }

    /// Value of the first argument named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check that the argument at `index` is named `key` and return its value.
    fn positional(&self, index: usize, key: &'static str) -> Result<&str, EventParseError> {
        let (found, value) = self
            .args
            .get(index)
            .ok_or(EventParseError::MissingArg { index, key })?;
        if found != key {
            return Err(EventParseError::UnexpectedArg {
                index,
                key,
                found: found.clone(),
            });
        }
        Ok(value.as_str())
    }

    fn expect_name(&self, expected: &'static str) -> Result<(), EventParseError> {
        if self.name != expected {
            return Err(EventParseError::WrongEvent {
                expected,
                found: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Parse every program event in a transaction's logs, in order.
pub fn parse_events(logs: &[String]) -> Vec<ProgramEvent> {
    logs.iter()
        .filter_map(|line| ProgramEvent::parse_log_line(line))
        .collect()
}

fn parse_pubkey(key: &'static str, value: &str) -> Result<Pubkey, EventParseError> {
    Pubkey::from_str(value).map_err(|_| EventParseError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_u64(key: &'static str, value: &str) -> Result<u64, EventParseError> {
    value.parse().map_err(|_| EventParseError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// `EscrowCreated` event. The escrow address is argument 4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowCreated {
    pub factory: Pubkey,
    pub arbiter: Pubkey,
    pub player1: Pubkey,
    pub player2: Pubkey,
    pub escrow: Pubkey,
    pub escrow_index: u64,
    pub player1_bet_amount: u64,
    pub player2_bet_amount: u64,
}

impl TryFrom<&ProgramEvent> for EscrowCreated {
    type Error = EventParseError;

    fn try_from(event: &ProgramEvent) -> Result<Self, Self::Error> {
        event.expect_name(ESCROW_CREATED)?;
        let pubkey_arg = |index: usize, key: &'static str| -> Result<Pubkey, EventParseError> {
            parse_pubkey(key, event.positional(index, key)?)
        };
        let u64_arg = |index: usize, key: &'static str| -> Result<u64, EventParseError> {
            parse_u64(key, event.positional(index, key)?)
        };

        Ok(Self {
            factory: pubkey_arg(0, "factory")?,
            arbiter: pubkey_arg(1, "arbiter")?,
            player1: pubkey_arg(2, "player1")?,
            player2: pubkey_arg(3, "player2")?,
            escrow: pubkey_arg(ESCROW_CREATED_ESCROW_ARG, "escrow")?,
            escrow_index: u64_arg(5, "escrow_index")?,
            player1_bet_amount: u64_arg(6, "player1_bet_amount")?,
            player2_bet_amount: u64_arg(7, "player2_bet_amount")?,
        })
    }
}

/// `FactoryInitialized` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryInitialized {
    pub factory: Pubkey,
    pub authority: Pubkey,
}

impl TryFrom<&ProgramEvent> for FactoryInitialized {
    type Error = EventParseError;

    fn try_from(event: &ProgramEvent) -> Result<Self, Self::Error> {
        event.expect_name(FACTORY_INITIALIZED)?;
        Ok(Self {
            factory: parse_pubkey("factory", event.positional(0, "factory")?)?,
            authority: parse_pubkey("authority", event.positional(1, "authority")?)?,
        })
    }
}

/// First event named `name` in the logs, if any.
pub fn first_event<'a>(events: &'a [ProgramEvent], name: &str) -> Option<&'a ProgramEvent> {
    events.iter().find(|e| e.name == name)
}
