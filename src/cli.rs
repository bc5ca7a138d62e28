//! Session commands and rendering shared by the `beatchain` binary.
//!
//! The shell only reads ledger state and calls its operations; field checks
//! it performs (such as refusing a blank sealer name) are advisory and live
//! here rather than in the ledger.

use crate::blockchain::{Block, Ledger};
use crate::error::{ChainError, Result};
use crate::transaction::{Amount, Transaction};
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

pub const HELP: &str = "\
Commands:
  submit <sender> <recipient> <amount> [description...]   queue a transaction
  mine <name>                                             seal pending transactions
  chain                                                   show sealed blocks
  pending                                                 show pending transactions
  validate [--strict]                                     check chain integrity
  tamper <block> <tx> <description...>                    rewrite a sealed record
  export                                                  print the chain as JSON
  reset                                                   start over from genesis
  help                                                    show this text
  quit                                                    leave the session";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Submit {
        sender: String,
        recipient: String,
        amount: Amount,
        description: String,
    },
    Mine {
        sealer: String,
    },
    Chain,
    Pending,
    Validate {
        strict: bool,
    },
    Tamper {
        block: u64,
        tx: usize,
        description: String,
    },
    Export,
    Reset,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();

        let command = match verb.to_ascii_lowercase().as_str() {
            "submit" | "add" => {
                if rest.len() < 3 {
                    return Err(usage("submit <sender> <recipient> <amount> [description...]"));
                }
                let amount = rest[2]
                    .parse::<Amount>()
                    .map_err(|e| ChainError::Parse(format!("invalid amount {:?}: {}", rest[2], e)))?;
                Command::Submit {
                    sender: rest[0].to_string(),
                    recipient: rest[1].to_string(),
                    amount,
                    description: rest[3..].join(" "),
                }
            }
            "mine" => Command::Mine {
                sealer: rest.join(" "),
            },
            "chain" | "blocks" => Command::Chain,
            "pending" => Command::Pending,
            "validate" => match rest.as_slice() {
                [] => Command::Validate { strict: false },
                ["--strict"] => Command::Validate { strict: true },
                _ => return Err(usage("validate [--strict]")),
            },
            "tamper" => {
                if rest.len() < 2 {
                    return Err(usage("tamper <block> <tx> <description...>"));
                }
                Command::Tamper {
                    block: parse_index(rest[0])?,
                    tx: parse_index(rest[1])?,
                    description: rest[2..].join(" "),
                }
            }
            "export" => Command::Export,
            "reset" | "restart" => Command::Reset,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ChainError::Parse(format!("unknown command {:?}; try 'help'", other))),
        };
        Ok(Some(command))
    }
}

fn usage(text: &str) -> ChainError {
    ChainError::Parse(format!("usage: {}", text))
}

fn parse_index<T: std::str::FromStr>(word: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    word.parse::<T>()
        .map_err(|e| ChainError::Parse(format!("invalid index {:?}: {}", word, e)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub tone: Tone,
    pub text: String,
}

impl Reply {
    fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self { tone, text: text.into() }
    }
}

/// What the shell should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(Reply),
    Quit,
}

/// One user's view of a ledger for the length of a session.
pub struct Session {
    ledger: Ledger,
}

impl Session {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn execute(&mut self, command: Command) -> Outcome {
        let reply = match command {
            Command::Submit {
                sender,
                recipient,
                amount,
                description,
            } => {
                let tx = Transaction::new(sender, recipient, amount, description);
                let id = tx.id().to_string();
                match self.ledger.try_submit(tx) {
                    Ok(()) => Reply::new(Tone::Success, format!("Transaction added ({})", short_hash(&id))),
                    Err(reason) => Reply::new(Tone::Error, format!("Transaction rejected: {}", reason)),
                }
            }
            Command::Mine { sealer } => {
                if sealer.trim().is_empty() {
                    Reply::new(Tone::Error, "Please enter the sealer's name")
                } else {
                    match self.ledger.try_mine(&sealer) {
                        Ok(block) => Reply::new(
                            Tone::Success,
                            format!(
                                "Block {} sealed with {} transactions: {}",
                                block.index(),
                                block.transactions().len(),
                                block.hash()
                            ),
                        ),
                        Err(ChainError::EmptyPending) => {
                            Reply::new(Tone::Warning, "No pending transactions to seal")
                        }
                        Err(e) => Reply::new(Tone::Error, e.to_string()),
                    }
                }
            }
            Command::Chain => Reply::new(Tone::Info, render_chain(self.ledger.chain())),
            Command::Pending => Reply::new(Tone::Info, render_pending(self.ledger.pending())),
            Command::Validate { strict } => {
                let result = if strict {
                    self.ledger.verify_strict()
                } else {
                    self.ledger.verify()
                };
                match result {
                    Ok(()) => Reply::new(Tone::Success, "The chain is valid"),
                    Err(fault) => Reply::new(Tone::Error, format!("The chain is not valid: {}", fault)),
                }
            }
            Command::Tamper { block, tx, description } => {
                match self.rewrite_description(block, tx, description) {
                    Ok(()) => Reply::new(
                        Tone::Warning,
                        format!("Block {} transaction {} rewritten without resealing", block, tx),
                    ),
                    Err(e) => Reply::new(Tone::Error, e.to_string()),
                }
            }
            Command::Export => match export_chain(self.ledger.chain()) {
                Ok(json) => Reply::new(Tone::Info, json),
                Err(e) => Reply::new(Tone::Error, e.to_string()),
            },
            Command::Reset => {
                self.ledger.reset();
                Reply::new(Tone::Success, "Ledger reset to a fresh genesis block")
            }
            Command::Help => Reply::new(Tone::Info, HELP),
            Command::Quit => return Outcome::Quit,
        };
        Outcome::Continue(reply)
    }

    fn rewrite_description(&mut self, block: u64, tx: usize, description: String) -> Result<()> {
        let mut handle = self.ledger.tamper(block)?;
        handle.set_description(tx, description)?;
        Ok(())
    }
}

/// First ten and last six characters of a long digest.
pub(crate) fn short_hash(hash: &str) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() > 20 {
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 6..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        hash.to_string()
    }
}

/// Render Unix nanoseconds as a UTC date with microseconds.
pub fn format_timestamp(nanos: u64) -> String {
    i64::try_from(nanos)
        .map(DateTime::<Utc>::from_timestamp_nanos)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S%.6f UTC").to_string())
        .unwrap_or_else(|_| nanos.to_string())
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

pub fn render_pending(pending: &[Transaction]) -> String {
    if pending.is_empty() {
        return "No pending transactions.".to_string();
    }
    let mut table = new_table(&["#", "Transaction", "Id"]);
    for (i, tx) in pending.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i),
            Cell::new(tx.to_string()),
            Cell::new(short_hash(tx.id())),
        ]);
    }
    table.to_string()
}

pub fn render_block(block: &Block) -> String {
    let mut table = new_table(&["Field", "Value"]);
    table.add_row(vec![Cell::new("Timestamp"), Cell::new(format_timestamp(block.created_at()))]);
    table.add_row(vec![Cell::new("Hash"), Cell::new(block.hash())]);
    table.add_row(vec![Cell::new("Previous hash"), Cell::new(block.previous_hash())]);
    table.add_row(vec![Cell::new("Nonce"), Cell::new(block.nonce())]);
    let transactions = if block.transactions().is_empty() {
        "No transactions in this block.".to_string()
    } else {
        block
            .transactions()
            .iter()
            .map(|tx| format!("- {}", tx))
            .collect::<Vec<_>>()
            .join("\n")
    };
    table.add_row(vec![Cell::new("Transactions"), Cell::new(transactions)]);
    format!("Block {}\n{}", block.index(), table)
}

pub fn render_chain(blocks: &[Block]) -> String {
    blocks.iter().map(render_block).collect::<Vec<_>>().join("\n")
}

pub fn export_chain(blocks: &[Block]) -> Result<String> {
    Ok(serde_json::to_string_pretty(blocks)?)
}
