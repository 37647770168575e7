// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! protolens-echo - Decode Protobuf payloads and print them as JSON lines
//!
//! Reads one payload (or a varint-length-prefixed stream of payloads) from a
//! file or stdin, decodes it against a descriptor bundle and prints one JSON
//! line per message.

use anyhow::{anyhow, bail, Context};
use base64::Engine;
use clap::Parser;
use colored::*;
use protolens::{Diagnostics, MessageDeserializer, Protolens, ProtolensConfig};
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Decode Protobuf payloads against a descriptor bundle
#[derive(Parser, Debug)]
#[command(name = "protolens-echo")]
#[command(version)]
#[command(about = "Decode Protobuf payloads to single-line JSON")]
struct Args {
    /// Payload file, or `-` for stdin
    #[arg(default_value = "-")]
    input: String,

    /// Descriptor bundle: a path, or a file name inside --dir
    #[arg(short, long)]
    desc: Option<String>,

    /// Message type, simple (`Order`) or fully qualified (`shop.Order`)
    #[arg(short = 't', long = "type")]
    type_name: Option<String>,

    /// Descriptor directory (overrides the config file)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Topic name used in error reports
    #[arg(long, default_value = "stdin")]
    topic: String,

    /// Input encoding: raw, hex, base64
    #[arg(short = 'f', long, default_value = "raw")]
    input_format: InputFormat,

    /// Input is a stream of varint-length-prefixed messages
    #[arg(long)]
    delimited: bool,

    /// List bundle files in the descriptor directory and exit
    #[arg(long)]
    list_files: bool,

    /// List message types of --desc (or of every bundle) and exit
    #[arg(long)]
    list_types: bool,

    /// Log filter when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InputFormat {
    Raw,
    Hex,
    Base64,
}

impl std::str::FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" | "bin" | "binary" => Ok(InputFormat::Raw),
            "hex" | "x" => Ok(InputFormat::Hex),
            "base64" | "b64" => Ok(InputFormat::Base64),
            _ => Err(format!("Unknown input format: {}", s)),
        }
    }
}

fn main() {
    let args = Args::parse();

    if args.no_color || !io::stderr().is_terminal() {
        colored::control::set_override(false);
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ProtolensConfig::from_file(path)?,
        None => ProtolensConfig::default(),
    };
    if let Some(dir) = &args.dir {
        config = config.with_directory(dir);
    }
    let lens = Arc::new(Protolens::new(config, Diagnostics::tracing()));

    if args.list_files {
        for file in lens.desc_files() {
            println!("{}", file);
        }
        return Ok(());
    }

    if args.list_types {
        match &args.desc {
            Some(desc) => {
                for name in lens.message_types(desc)? {
                    println!("{}", name);
                }
            }
            None => {
                for (file, name) in lens.all_message_types()? {
                    println!("{}\t{}", file, name);
                }
            }
        }
        return Ok(());
    }

    let desc = args
        .desc
        .as_deref()
        .ok_or_else(|| anyhow!("--desc is required to decode"))?;
    let type_name = args
        .type_name
        .as_deref()
        .ok_or_else(|| anyhow!("--type is required to decode"))?;

    // Fail on a bad bundle or type before touching the input.
    let bundle = lens.bundle(desc)?;
    lens.select_type(&bundle, type_name)?;

    let input = read_input(&args.input)?;
    let payloads = split_payloads(&input, args.input_format, args.delimited)?;
    let deserializer = lens.deserializer(args.topic.as_str(), desc, type_name);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;
    for (seq, payload) in payloads.iter().enumerate() {
        match deserializer.deserialize_message(payload) {
            Ok(json) => writeln!(out, "{}", json)?,
            Err(e) => {
                failures += 1;
                eprintln!("{} #{}: {}", "Error".red().bold(), seq + 1, e);
            }
        }
    }
    out.flush()?;

    if failures > 0 {
        bail!("{} of {} message(s) failed to decode", failures, payloads.len());
    }
    Ok(())
}

fn read_input(input: &str) -> anyhow::Result<Vec<u8>> {
    if input == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("cannot read stdin")?;
        Ok(buf)
    } else {
        std::fs::read(input).with_context(|| format!("cannot read {}", input))
    }
}

/// Turn the raw input into payloads.
///
/// Without `--delimited`, raw input is one message and text input carries
/// one message per non-empty line.
fn split_payloads(
    input: &[u8],
    format: InputFormat,
    delimited: bool,
) -> anyhow::Result<Vec<Vec<u8>>> {
    if format == InputFormat::Raw {
        return if delimited {
            split_delimited(input)
        } else {
            Ok(vec![input.to_vec()])
        };
    }

    let text = std::str::from_utf8(input).context("text input is not UTF-8")?;
    if delimited {
        let joined: String = text.split_whitespace().collect();
        return split_delimited(&decode_text(&joined, format)?);
    }
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| decode_text(line, format))
        .collect()
}

fn decode_text(text: &str, format: InputFormat) -> anyhow::Result<Vec<u8>> {
    match format {
        InputFormat::Raw => Ok(text.as_bytes().to_vec()),
        InputFormat::Hex => decode_hex(text),
        InputFormat::Base64 => base64::engine::general_purpose::STANDARD
            .decode(text)
            .context("invalid base64 input"),
    }
}

fn decode_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let digits: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        bail!("hex input has an odd number of digits");
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = hex_digit(pair[0])?;
            let lo = hex_digit(pair[1])?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

fn hex_digit(b: u8) -> anyhow::Result<u8> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(anyhow!("invalid hex digit {:?}", b as char)),
    }
}

/// Split a stream of `varint length || message` records.
fn split_delimited(mut data: &[u8]) -> anyhow::Result<Vec<Vec<u8>>> {
    let mut payloads = Vec::new();
    let mut offset = 0usize;
    while !data.is_empty() {
        let before = data.len();
        let len = prost::encoding::decode_varint(&mut data)
            .map_err(|e| anyhow!("bad length prefix at byte {}: {}", offset, e))?;
        offset += before - data.len();
        let len = usize::try_from(len)
            .map_err(|_| anyhow!("length prefix too large at byte {}", offset))?;
        if len > data.len() {
            bail!(
                "message at byte {} needs {} byte(s), {} left",
                offset,
                len,
                data.len()
            );
        }
        let (payload, rest) = data.split_at(len);
        payloads.push(payload.to_vec());
        data = rest;
        offset += len;
    }
    Ok(payloads)
}
