//! chainbalances CLI — collect and decode compressed token balances.
//!
//! Usage:
//! ```bash
//! # Query balances over JSON-RPC and compress them locally
//! chainbalances collect --url https://cloudflare-eth.com \
//!     --account 0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045 \
//!     --tokens 0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48,0xdAC17F958D2ee523a2206206994597C13D831ec7
//!
//! # Ask a deployed collector contract instead
//! chainbalances onchain --url ... --collector 0x... --account 0x... --tokens ... --codec legacy
//!
//! # Decode words copied from somewhere else
//! chainbalances decode --codec improved --total 3 --words 0x...,0x...
//! ```

mod args;
mod config;
mod tracing_setup;

use std::env;
use std::process;

use alloy_primitives::Address;
use chainbalances_core::{
    Balance240, BalanceCollector, CollectedBalances, CodecVariant, Target, WireSequence,
};
use chainbalances_evm::{HttpRpcClient, OnchainCollector, RpcBalanceSource, RpcConfig};
use serde_json::json;

use crate::args::{parse_address, parse_block, parse_codec, parse_tokens, parse_total, parse_words, Flags};
use crate::config::AppConfig;
use crate::tracing_setup::init_tracing;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    match command {
        "help" | "--help" | "-h" => {
            print_usage();
            return;
        }
        "version" | "--version" | "-V" => {
            println!("chainbalances {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        "collect" | "onchain" | "decode" => {}
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }

    let result = match setup(command, &args[2..]) {
        Ok((flags, config)) => match command {
            "collect" => cmd_collect(flags, config).await,
            "onchain" => cmd_onchain(flags, config).await,
            _ => cmd_decode(flags, config),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("chainbalances {}", env!("CARGO_PKG_VERSION"));
    println!("Collect native and token balances in one compressed batch\n");
    println!("USAGE:");
    println!("    chainbalances <COMMAND> [FLAGS]\n");
    println!("COMMANDS:");
    println!("    collect   Query balances over JSON-RPC and compress them");
    println!("    onchain   Call a deployed collector contract and decode its reply");
    println!("    decode    Decode compressed words into one balance per target");
    println!("    version   Print version");
    println!("    help      Print this help\n");
    println!("COLLECT / ONCHAIN FLAGS:");
    println!("    --url <URL>          RPC endpoint URL  [required unless set in --config]");
    println!("    --account <ADDR>     Account to query  [required]");
    println!("    --tokens <A,B,...>   Token contract addresses, comma-separated");
    println!("    --collector <ADDR>   Collector contract address  [onchain only, required]");
    println!("    --codec <VARIANT>    legacy | improved  (default: improved)");
    println!("    --block <TAG>        latest | safe | finalized | pending | <number>");
    println!("    --config <FILE>      JSON config file");
    println!("    --json               Output as JSON\n");
    println!("DECODE FLAGS:");
    println!("    --codec <VARIANT>    legacy | improved  [required]");
    println!("    --total <N>          Expected number of balances, native included  [required]");
    println!("    --words <W,W,...>    Wire words, 0x-prefixed hex or decimal");
    println!("    --json               Output as JSON");
}

fn setup(command: &str, args: &[String]) -> Result<(Flags, AppConfig), String> {
    let flags = Flags::parse(command, args)?;
    let mut config = match &flags.config {
        Some(path) => AppConfig::from_json_file(path).map_err(|e| format!("{path}: {e}"))?,
        None => AppConfig::default(),
    };
    if let Some(codec) = &flags.codec {
        config.collector.codec = parse_codec(codec)?;
    }
    init_tracing(&config.log);
    Ok((flags, config))
}

fn rpc_config(flags: &Flags, config: &AppConfig) -> Result<RpcConfig, String> {
    let mut rpc = config
        .rpc_with_url(flags.url.clone())
        .map_err(|e| e.to_string())?;
    if let Some(block) = &flags.block {
        rpc.block = parse_block(block)?;
    }
    Ok(rpc)
}

fn account_and_tokens(flags: &Flags) -> Result<(Address, Vec<Address>), String> {
    let account = parse_address(flags.account.as_deref().ok_or("--account is required")?)?;
    let tokens = match &flags.tokens {
        Some(list) => parse_tokens(list)?,
        None => Vec::new(),
    };
    Ok((account, tokens))
}

async fn cmd_collect(flags: Flags, config: AppConfig) -> Result<(), String> {
    let rpc = rpc_config(&flags, &config)?;
    let (account, tokens) = account_and_tokens(&flags)?;

    let client = HttpRpcClient::from_config(&rpc).map_err(|e| e.to_string())?;
    let collector = BalanceCollector::new(
        RpcBalanceSource::new(client, rpc.block),
        config.collector.clone(),
    );
    let collected = collector
        .collect(account, &tokens)
        .await
        .map_err(|e| e.to_string())?;

    if flags.json {
        print_json(&collected_json(&collected))
    } else {
        print_collected(&collected);
        Ok(())
    }
}

async fn cmd_onchain(flags: Flags, config: AppConfig) -> Result<(), String> {
    let rpc = rpc_config(&flags, &config)?;
    let (account, tokens) = account_and_tokens(&flags)?;
    let address = parse_address(flags.collector.as_deref().ok_or("--collector is required")?)?;

    let client = HttpRpcClient::from_config(&rpc).map_err(|e| e.to_string())?;
    let onchain = OnchainCollector::new(client, address, config.collector.codec).at_block(rpc.block);
    let wire = onchain
        .fetch_wire(account, &tokens)
        .await
        .map_err(|e| e.to_string())?;
    let values = wire.decode(tokens.len() + 1).map_err(|e| e.to_string())?;

    let targets: Vec<Target> = std::iter::once(Target::Native)
        .chain(tokens.iter().copied().map(Target::Token))
        .collect();

    if flags.json {
        let balances: Vec<_> = targets
            .iter()
            .zip(&values)
            .enumerate()
            .map(|(i, (t, v))| json!({ "index": i, "target": t, "value": v.to_string() }))
            .collect();
        print_json(&json!({
            "account": account,
            "collector": address,
            "codec": wire.variant(),
            "balances": balances,
            "wire": wire_strings(&wire),
        }))
    } else {
        println!("Account:   {account}");
        println!("Collector: {address}");
        println!("Codec:     {}", wire.variant());
        print_balances(targets.iter().zip(&values).map(|(t, v)| (*t, *v, None)));
        print_wire(&wire);
        Ok(())
    }
}

fn cmd_decode(flags: Flags, config: AppConfig) -> Result<(), String> {
    let variant = match &flags.codec {
        Some(_) => config.collector.codec,
        None => return Err("--codec is required".into()),
    };
    let total = parse_total(flags.total.as_deref().ok_or("--total is required")?)?;
    let words = match &flags.words {
        Some(list) => parse_words(list)?,
        None => Vec::new(),
    };

    let wire = WireSequence::new(variant, words);
    let values = wire.decode(total).map_err(|e| e.to_string())?;

    if flags.json {
        print_json(&json!({
            "codec": variant,
            "total": total,
            "balances": values.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
        }))
    } else {
        println!("Codec: {variant}");
        for (i, value) in values.iter().enumerate() {
            println!("  [{i:>3}] {}", describe(variant, *value));
        }
        Ok(())
    }
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn collected_json(collected: &CollectedBalances) -> serde_json::Value {
    let balances: Vec<_> = collected
        .raw
        .results
        .iter()
        .zip(&collected.values)
        .enumerate()
        .map(|(i, (r, v))| {
            json!({
                "index": i,
                "target": r.target,
                "value": v.to_string(),
                "error": r.result.as_ref().err(),
            })
        })
        .collect();

    json!({
        "account": collected.raw.account,
        "codec": collected.wire.variant(),
        "balances": balances,
        "failures": collected.raw.failure_count(),
        "wire": wire_strings(&collected.wire),
    })
}

fn print_collected(collected: &CollectedBalances) {
    println!("Account: {}", collected.raw.account);
    println!("Codec:   {}", collected.wire.variant());
    print_balances(
        collected
            .raw
            .results
            .iter()
            .zip(&collected.values)
            .map(|(r, v)| (r.target, *v, r.result.as_ref().err().map(|e| e.to_string()))),
    );
    print_wire(&collected.wire);
}

fn print_balances(rows: impl Iterator<Item = (Target, Balance240, Option<String>)>) {
    println!("Balances:");
    for (i, (target, value, error)) in rows.enumerate() {
        let target = target.to_string();
        match error {
            Some(e) => println!("  [{i:>3}] {target:<42}  {value}  ({e})"),
            None => println!("  [{i:>3}] {target:<42}  {value}"),
        }
    }
}

fn print_wire(wire: &WireSequence) {
    println!("Wire ({} words):", wire.len());
    for word in wire.words() {
        println!("  {word}");
    }
}

fn wire_strings(wire: &WireSequence) -> Vec<String> {
    wire.words().iter().map(|w| w.to_string()).collect()
}

fn describe(variant: CodecVariant, value: Balance240) -> String {
    if variant == CodecVariant::RunLength && value.is_error() {
        "ERROR (lookup failed)".into()
    } else {
        value.to_string()
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization error: {e}"))?;
    println!("{text}");
    Ok(())
}
