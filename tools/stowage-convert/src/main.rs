// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

mod document;

use clap::{Parser, Subcommand};
use document::Format;
use std::path::{Path, PathBuf};
use stowage::{SendOptions, TransportPolicy};

#[derive(Parser)]
#[command(name = "stowage-convert")]
#[command(about = "Convert documents between XML and JSON through the stowage DOM")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to another wire form
    Convert {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Input format (extension or content sniffing if not specified)
        #[arg(long, value_enum)]
        from: Option<Format>,

        /// Output format
        #[arg(long, value_enum)]
        to: Format,

        /// Root name to expect on input and write on output
        #[arg(long)]
        root: Option<String>,

        /// Tabs and line feeds
        #[arg(long)]
        pretty: bool,

        /// Emit the XML prolog
        #[arg(long)]
        prolog: bool,

        /// Transport policy profile file (YAML or JSON)
        #[arg(long, value_name = "FILE")]
        policy: Option<PathBuf>,

        /// Profile to use from the policy file
        #[arg(long, requires = "policy")]
        profile: Option<String>,
    },

    /// Parse a document and report the first syntax error
    Check {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Input format (extension or content sniffing if not specified)
        #[arg(long, value_enum)]
        from: Option<Format>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            from,
            to,
            root,
            pretty,
            prolog,
            policy,
            profile,
        } => {
            let policy = load_policy(policy.as_deref(), profile.as_deref())?;
            let options = if pretty {
                SendOptions::pretty()
            } else {
                SendOptions::new()
            }
            .prolog(prolog);
            cmd_convert(&input, output, from, to, root.as_deref(), &options, &policy)?;
        }
        Commands::Check { input, from } => {
            cmd_check(&input, from)?;
        }
    }

    Ok(())
}

fn load_policy(path: Option<&Path>, profile: Option<&str>) -> anyhow::Result<TransportPolicy> {
    match path {
        Some(path) => {
            let policy = TransportPolicy::load(path, profile)?;
            log::info!("[load_policy] {} ({})", path.display(), profile.unwrap_or("default"));
            Ok(policy)
        }
        None => Ok(TransportPolicy::default()),
    }
}

fn cmd_convert(
    input: &Path,
    output: Option<PathBuf>,
    from: Option<Format>,
    to: Format,
    root: Option<&str>,
    options: &SendOptions,
    policy: &TransportPolicy,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(input)?;
    let from = Format::resolve(from, input, &text)?;

    let document = document::read(from, &text, root, policy)
        .map_err(|e| anyhow::anyhow!("{}: {}", input.display(), e))?;
    let rendered = document::write(to, &document, options, policy)?;

    if let Some(out_path) = output {
        std::fs::write(&out_path, &rendered)?;
        println!("[OK] {:?} written to: {}", to, out_path.display());
    } else {
        print!("{rendered}");
    }

    Ok(())
}

fn cmd_check(input: &Path, from: Option<Format>) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(input)?;
    let from = Format::resolve(from, input, &text)?;

    match document::check(from, &text) {
        Ok(Some(root)) => {
            println!("[OK] {} is well-formed {:?} (root '{}')", input.display(), from, root);
            Ok(())
        }
        Ok(None) => {
            println!("[OK] {} is well-formed {:?}", input.display(), from);
            Ok(())
        }
        Err(e) => {
            eprintln!("[ERROR] {}: {}", input.display(), e);
            anyhow::bail!("{} is not well-formed {:?}", input.display(), from);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_convert_file_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let input = dir.path().join("in.json");
        let middle = dir.path().join("mid.xml");
        let back = dir.path().join("out.json");
        std::fs::write(&input, r#"{"c":{"d":"hello"}}"#).expect("write input");

        let policy = TransportPolicy::default();
        cmd_convert(
            &input,
            Some(middle.clone()),
            None,
            Format::Xml,
            Some("doc"),
            &SendOptions::pretty(),
            &policy,
        )
        .expect("json to xml");
        let xml = std::fs::read_to_string(&middle).expect("read xml");
        assert!(xml.starts_with("<doc>"));

        cmd_convert(
            &middle,
            Some(back.clone()),
            None,
            Format::Json,
            None,
            &SendOptions::new(),
            &policy,
        )
        .expect("xml to json");
        let json = std::fs::read_to_string(&back).expect("read json");
        assert_eq!(json, "{\"c\":{\"d\":\"hello\"}}\n");
    }

    #[test]
    fn test_policy_profile_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("policy.json");
        std::fs::write(
            &path,
            r#"{"profiles":{"loose":{"lexical":"skip"}},"default_profile":"loose"}"#,
        )
        .expect("write policy");
        let policy = load_policy(Some(&path), None).expect("policy");
        assert_eq!(policy.lexical, stowage::LexicalPolicy::Skip);
        assert!(load_policy(Some(&path), Some("absent")).is_err());
    }
}
