//! Flag parsing helpers shared by the subcommands.

use alloy_primitives::{Address, U256};
use chainbalances_core::{CodecVariant, WireWord};
use chainbalances_evm::BlockTag;

/// Parsed `--flag value` pairs plus boolean switches.
#[derive(Debug, Default)]
pub struct Flags {
    pub url: Option<String>,
    pub account: Option<String>,
    pub tokens: Option<String>,
    pub codec: Option<String>,
    pub config: Option<String>,
    pub collector: Option<String>,
    pub block: Option<String>,
    pub total: Option<String>,
    pub words: Option<String>,
    pub json: bool,
}

const QUERY_FLAGS: &[&str] = &[
    "--url", "--account", "--tokens", "--codec", "--config", "--block", "--json",
];
const ONCHAIN_FLAGS: &[&str] = &[
    "--url", "--account", "--tokens", "--codec", "--config", "--block", "--json", "--collector",
];
const DECODE_FLAGS: &[&str] = &["--codec", "--config", "--total", "--words", "--json"];

/// Flags accepted by a subcommand.
fn allowed(command: &str) -> &'static [&'static str] {
    match command {
        "collect" => QUERY_FLAGS,
        "onchain" => ONCHAIN_FLAGS,
        "decode" => DECODE_FLAGS,
        _ => &[],
    }
}

impl Flags {
    /// Parse the arguments that follow `command`, rejecting flags it does not take.
    pub fn parse(command: &str, args: &[String]) -> Result<Self, String> {
        let mut flags = Self::default();
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            if is_known(flag) && !allowed(command).contains(&flag) {
                return Err(format!("{flag} is not valid for {command}"));
            }
            let slot = match flag {
                "--json" => {
                    flags.json = true;
                    i += 1;
                    continue;
                }
                "--url" => &mut flags.url,
                "--account" => &mut flags.account,
                "--tokens" => &mut flags.tokens,
                "--codec" => &mut flags.codec,
                "--config" => &mut flags.config,
                "--collector" => &mut flags.collector,
                "--block" => &mut flags.block,
                "--total" => &mut flags.total,
                "--words" => &mut flags.words,
                flag => return Err(format!("Unknown flag: {flag}")),
            };
            let value = args
                .get(i + 1)
                .ok_or_else(|| format!("{} requires a value", args[i]))?;
            *slot = Some(value.clone());
            i += 2;
        }
        Ok(flags)
    }
}

fn is_known(flag: &str) -> bool {
    ONCHAIN_FLAGS.contains(&flag) || DECODE_FLAGS.contains(&flag)
}

pub fn parse_address(s: &str) -> Result<Address, String> {
    s.trim()
        .parse()
        .map_err(|e| format!("invalid address '{s}': {e}"))
}

/// Comma-separated addresses; an empty string is an empty list.
pub fn parse_tokens(s: &str) -> Result<Vec<Address>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(parse_address)
        .collect()
}

pub fn parse_codec(s: &str) -> Result<CodecVariant, String> {
    s.parse()
}

pub fn parse_block(s: &str) -> Result<BlockTag, String> {
    s.parse()
}

pub fn parse_total(s: &str) -> Result<usize, String> {
    s.trim()
        .parse()
        .map_err(|e| format!("invalid --total '{s}': {e}"))
}

/// Comma-separated 256-bit words, hex (`0x…`) or decimal.
pub fn parse_words(s: &str) -> Result<Vec<WireWord>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(|w| {
            let parsed = match w.strip_prefix("0x") {
                Some(hex) => U256::from_str_radix(hex, 16),
                None => U256::from_str_radix(w, 10),
            };
            parsed
                .map(WireWord::from_u256)
                .map_err(|e| format!("invalid word '{w}': {e}"))
        })
        .collect()
}
