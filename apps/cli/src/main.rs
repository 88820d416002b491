//! MerkleDrop CLI
//!
//! Command-line front end for the airdrop eligibility engine: inspect the
//! allowlist root, check eligibility, and produce proofs and claim
//! arguments for the transaction layer.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use merkledrop_core::{
    format_tokens, parse_address, parse_amount, parse_tokens, Allowlist, Eligibility, Hash, Leaf,
    LeafEncoding,
};
use merkledrop_logging::LogLevel;
use merkledrop_prover::{ClaimTarget, EligibilityEngine};
use merkledrop_settings::{default_settings_path, load_allowlist, Settings};

/// MerkleDrop - Merkle airdrop eligibility and claim proofs
#[derive(Parser)]
#[command(name = "merkledrop")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to the per-user config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Allowlist file, overriding the settings
    #[arg(short, long)]
    allowlist: Option<PathBuf>,

    /// Leaf encoding (packed|standard), overriding the settings
    #[arg(short, long)]
    encoding: Option<LeafEncoding>,

    /// Expected Merkle root, overriding the settings
    #[arg(long)]
    expected_root: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Merkle root of the allowlist
    Root,

    /// Check whether an address is eligible
    Check {
        /// Address to check
        address: String,
    },

    /// Generate an inclusion proof
    Prove {
        /// Address to prove
        address: String,

        /// Also require this exact amount (smallest unit)
        #[arg(long)]
        amount: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Verify a proof against a root
    Verify {
        /// Leaf hash (hex)
        #[arg(long)]
        leaf: String,

        /// Root (hex)
        #[arg(long)]
        root: String,

        /// Sibling hashes, leaf to root (hex)
        #[arg(short, long = "proof")]
        proof: Vec<String>,
    },

    /// Print the claim call arguments as JSON
    Claim {
        /// Claiming address
        address: String,

        /// Amount to claim, in whole tokens
        amount: String,

        /// Interpret the amount in the smallest unit instead
        #[arg(long)]
        wei: bool,
    },

    /// Write a settings file
    InitSettings {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    merkledrop_logging::init(LogLevel::from_verbose(cli.verbose));

    let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);
    let settings = Settings::load_from(&settings_path)
        .with_context(|| format!("Failed to load settings from {:?}", settings_path))?;

    match &cli.command {
        Commands::Root => root(&cli, &settings)?,
        Commands::Check { address } => check(&cli, &settings, address)?,
        Commands::Prove {
            address,
            amount,
            json,
        } => prove(&cli, &settings, address, amount.as_deref(), *json)?,
        Commands::Verify { leaf, root, proof } => verify(leaf, root, proof)?,
        Commands::Claim {
            address,
            amount,
            wei,
        } => claim(&cli, &settings, address, amount, *wei)?,
        Commands::InitSettings { force } => init_settings(&cli, settings, &settings_path, *force)?,
    }

    Ok(())
}

// ============================================================================
// Setup
// ============================================================================

fn engine(cli: &Cli, settings: &Settings) -> Result<EligibilityEngine> {
    let encoding = cli.encoding.unwrap_or(settings.tree.leaf_encoding);
    let expected_root = match &cli.expected_root {
        Some(root) => Some(parse_hash(root).context("Invalid --expected-root")?),
        None => settings.tree.expected_root()?,
    };

    debug!("Using {} leaf encoding", encoding);
    let engine = EligibilityEngine::new(encoding);
    Ok(match expected_root {
        Some(root) => engine.with_expected_root(root),
        None => engine,
    })
}

fn allowlist(cli: &Cli, settings: &Settings) -> Result<Allowlist> {
    let path = cli
        .allowlist
        .as_ref()
        .or(settings.allowlist.path.as_ref())
        .context("No allowlist configured: pass --allowlist or set allowlist.path in settings")?;
    load_allowlist(path).with_context(|| format!("Failed to load allowlist {:?}", path))
}

fn parse_hash(s: &str) -> Result<Hash> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(s.trim().trim_start_matches("0x"), &mut out)
        .with_context(|| format!("'{}' is not a 32-byte hex value", s))?;
    Ok(out)
}

fn hex32(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

// ============================================================================
// Commands
// ============================================================================

fn root(cli: &Cli, settings: &Settings) -> Result<()> {
    let allowlist = allowlist(cli, settings)?;
    let engine = engine(cli, settings)?;
    let tree = engine.build_tree(&allowlist)?;

    println!("Merkle root: {}", hex32(&tree.root()));
    println!("Encoding:    {}", engine.encoding());
    println!("Leaves:      {}", tree.leaf_count());
    println!("Depth:       {}", tree.depth());
    println!("Total:       {} tokens", format_tokens(allowlist.total_assigned()?));
    Ok(())
}

fn check(cli: &Cli, settings: &Settings, address: &str) -> Result<()> {
    let allowlist = allowlist(cli, settings)?;
    let address = parse_address(address)?;

    match engine(cli, settings)?.check_eligibility(&allowlist, &address) {
        Eligibility::Eligible {
            index,
            total_assigned,
        } => {
            println!("{} is eligible", address);
            println!("Assigned: {} tokens", format_tokens(total_assigned));
            println!("Leaf:     {}", index);
        }
        Eligibility::NotEligible => {
            println!("{} is not eligible", address);
        }
    }
    Ok(())
}

fn prove(
    cli: &Cli,
    settings: &Settings,
    address: &str,
    amount: Option<&str>,
    json: bool,
) -> Result<()> {
    let allowlist = allowlist(cli, settings)?;
    let engine = engine(cli, settings)?;
    let address = parse_address(address)?;
    let target = match amount {
        Some(amount) => ClaimTarget::Exact(Leaf::new(address, parse_amount(amount)?)),
        None => ClaimTarget::Address(address),
    };

    let proof = engine.generate_proof(&allowlist, &target)?;
    let root = engine.root(&allowlist)?;
    info!("Proof for leaf {} has {} siblings", proof.leaf_index, proof.siblings.len());

    if json {
        let value = serde_json::json!({
            "address": address.to_string(),
            "leafIndex": proof.leaf_index,
            "leaf": hex32(&proof.leaf),
            "proof": proof.siblings.iter().map(hex32).collect::<Vec<_>>(),
            "root": hex32(&root),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Leaf index: {}", proof.leaf_index);
        println!("Leaf hash:  {}", hex32(&proof.leaf));
        println!("Root:       {}", hex32(&root));
        println!("Proof:");
        for (i, sibling) in proof.siblings.iter().enumerate() {
            println!("  [{}] {}", i, hex32(sibling));
        }
    }
    Ok(())
}

fn verify(leaf: &str, root: &str, proof: &[String]) -> Result<()> {
    let leaf = parse_hash(leaf).context("Invalid --leaf")?;
    let root = parse_hash(root).context("Invalid --root")?;
    let siblings = proof
        .iter()
        .map(|s| parse_hash(s))
        .collect::<Result<Vec<_>>>()?;

    if merkledrop_prover::verify_proof(&leaf, &siblings, &root) {
        println!("Proof valid");
        Ok(())
    } else {
        bail!("Proof does not reconstruct root {}", hex32(&root))
    }
}

fn claim(cli: &Cli, settings: &Settings, address: &str, amount: &str, wei: bool) -> Result<()> {
    let allowlist = allowlist(cli, settings)?;
    let engine = engine(cli, settings)?;
    let address = parse_address(address)?;
    let claimed = if wei {
        parse_amount(amount)?
    } else {
        parse_tokens(amount)?
    };

    let call = engine.prepare_claim(&allowlist, &address, claimed)?;
    info!(
        "Claiming {} of {} tokens for {}",
        format_tokens(call.claimed_amount),
        format_tokens(call.total_assigned),
        call.account
    );
    println!("{}", serde_json::to_string_pretty(&call)?);
    Ok(())
}

fn init_settings(cli: &Cli, mut settings: Settings, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{:?} already exists (use --force to overwrite)", path);
    }

    if let Some(allowlist) = &cli.allowlist {
        settings.allowlist.path = Some(allowlist.clone());
    }
    if let Some(encoding) = cli.encoding {
        settings.tree.leaf_encoding = encoding;
    }
    if let Some(root) = &cli.expected_root {
        settings.tree.expected_root = Some(hex32(&parse_hash(root)?));
    }

    settings.save_to(path)?;
    println!("Wrote settings to {:?}", path);
    Ok(())
}
