mod config;
mod error;
mod explorer;
mod solidity;
mod utils;
mod verifier;

use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use config::Config;
use explorer::{Chain, ExplorerClient, License, VerificationRequest};
use serde_json::Value;
use solidity::{versions, SolcCompiler};
use tracing::{error, info, warn};
use verifier::Verifier;

fn cli() -> Command {
    Command::new("contract-verifier")
        .version("0.1.0")
        .about("Verify Solidity contract source code on Etherscan-compatible block explorers")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file"),
        )
        .arg(
            Arg::new("chain")
                .short('n')
                .long("chain")
                .value_name("CHAIN")
                .help("Chain the contract is deployed on (slug or name, see --list-chains)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("Explorer API key"),
        )
        .arg(
            Arg::new("address")
                .short('a')
                .long("address")
                .value_name("ADDRESS")
                .help("Address of the deployed contract"),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .value_name("CONTRACT")
                .help("Contract name, exactly as declared in the source"),
        )
        .arg(
            Arg::new("compiler-version")
                .long("compiler-version")
                .value_name("VERSION")
                .help("Compiler build, e.g. v0.8.27+commit.40a35a09 (see --list-compilers)"),
        )
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("FILE")
                .help("Solidity source file (single file, flattened)"),
        )
        .arg(
            Arg::new("optimize")
                .long("optimize")
                .help("The contract was compiled with the optimizer enabled")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-optimize")
                .long("no-optimize")
                .help("The contract was compiled without the optimizer, overriding the config file")
                .conflicts_with("optimize")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("runs")
                .long("runs")
                .value_name("RUNS")
                .value_parser(clap::value_parser!(u32))
                .help("Optimizer runs (only sent when --optimize is set)"),
        )
        .arg(
            Arg::new("license")
                .short('l')
                .long("license")
                .value_name("LICENSE")
                .help("License name or explorer id (see --list-licenses)"),
        )
        .arg(
            Arg::new("constructor-args")
                .long("constructor-args")
                .value_name("JSON")
                .help("Constructor arguments as a JSON array; defaults are derived when omitted"),
        )
        .arg(
            Arg::new("list-chains")
                .long("list-chains")
                .help("List supported chains and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-licenses")
                .long("list-licenses")
                .help("List license choices and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-compilers")
                .long("list-compilers")
                .value_name("FAMILY")
                .num_args(0..=1)
                .default_missing_value("all")
                .help("List known compiler builds, optionally for one family (e.g. 0.8), and exit"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .help("Generate a sample configuration file and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config-path")
                .long("config-path")
                .help("Print the default configuration file path and exit")
                .action(ArgAction::SetTrue),
        )
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("--{} is required", id))
}

fn print_compilers(family: &str) -> Result<()> {
    if family == "all" {
        for (family, builds) in versions::SOLIDITY_VERSIONS {
            println!("{}:", family);
            for build in builds.iter() {
                println!("  {}", build);
            }
        }
        return Ok(());
    }

    let builds = versions::family_builds(family)
        .ok_or_else(|| anyhow!("Unknown compiler family: '{}'", family))?;
    for build in builds {
        println!("{}", build);
    }
    Ok(())
}

fn parse_constructor_args(raw: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(values)) => Ok(values),
        Ok(other) => Err(anyhow!(
            "Constructor arguments must be a JSON array, got: {}",
            other
        )),
        Err(e) => Err(anyhow!("Invalid constructor arguments JSON: {}", e)),
    }
}

/// Collect the request fields from flags, falling back to the config file.
async fn build_request(
    matches: &ArgMatches,
    config: &Config,
) -> Result<(Chain, VerificationRequest, Option<Vec<Value>>)> {
    let selection = matches
        .get_one::<String>("chain")
        .or(config.default_chain.as_ref())
        .ok_or_else(|| anyhow!("No chain selected. Pass --chain or set default_chain"))?;
    let chain: Chain = selection.parse()?;

    let api_key = match matches.get_one::<String>("api-key") {
        Some(key) => key.clone(),
        None => config
            .api_key_for(chain)
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow!(
                    "No API key for {}. Pass --api-key, configure api_keys.{} or set ETHERSCAN_API_KEY",
                    chain,
                    chain.slug()
                )
            })?,
    };

    let contract_address = utils::validate_address(required(matches, "address")?)?;

    let contract_name = required(matches, "name")?.trim().to_string();
    utils::validate_contract_name(&contract_name)?;

    let compiler_version = required(matches, "compiler-version")?.trim().to_string();
    if !versions::is_known(&compiler_version) {
        warn!(
            "Compiler version {} is not in the known catalog, sending it as given",
            compiler_version
        );
    }

    let optimizer = if matches.get_flag("optimize") {
        true
    } else if matches.get_flag("no-optimize") {
        false
    } else {
        config.compiler.optimizer
    };
    let runs = match matches.get_one::<u32>("runs") {
        Some(runs) => {
            if !optimizer {
                warn!("--runs is ignored without --optimize, sending 200");
            }
            *runs
        }
        None => config.compiler.runs,
    };

    let license: License = matches
        .get_one::<String>("license")
        .unwrap_or(&config.license)
        .parse()?;

    let source_path = required(matches, "source")?;
    let source_code = tokio::fs::read_to_string(source_path)
        .await
        .map_err(|e| anyhow!("Failed to read source file {:?}: {}", source_path, e))?;

    let constructor_args = matches
        .get_one::<String>("constructor-args")
        .map(|raw| parse_constructor_args(raw))
        .transpose()?;

    let request = VerificationRequest {
        chain: selection.clone(),
        api_key,
        contract_address,
        contract_name,
        compiler_version,
        optimizer,
        runs,
        license,
        source_code,
        constructor_arguments: String::new(),
    };

    Ok((chain, request, constructor_args))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout only carries the result
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let matches = cli().get_matches();

    // Handle special commands first
    if matches.get_flag("generate-config") {
        println!("{}", Config::generate_sample());
        return Ok(());
    }

    if matches.get_flag("config-path") {
        match Config::default_config_path() {
            Ok(path) => {
                println!("{}", path.display());
                return Ok(());
            }
            Err(e) => {
                error!("Could not determine default config path: {}", e);
                return Err(e);
            }
        }
    }

    if matches.get_flag("list-chains") {
        for chain in Chain::ALL {
            println!("{:<16} {:<28} {}", chain.slug(), chain.label(), chain.api_url());
        }
        return Ok(());
    }

    if matches.get_flag("list-licenses") {
        for license in License::ALL {
            println!("{:>2}  {}", license.id(), license.name());
        }
        return Ok(());
    }

    if let Some(family) = matches.get_one::<String>("list-compilers") {
        return print_compilers(family);
    }

    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());
    let config = match config_path {
        Some(path) => Config::load_or_default(Some(path)).await,
        None => {
            let default_path = Config::default_config_path().ok().filter(|p| p.exists());
            Config::load_or_default(default_path).await
        }
    };

    let (chain, request, constructor_args) = build_request(&matches, &config).await?;

    let mut client = ExplorerClient::new();
    if let Some(url) = config.api_url_for(chain) {
        info!("Using configured explorer URL for {}: {}", chain, url);
        client = client.with_api_url(url);
    }

    let verifier = Verifier::new(SolcCompiler::new(&config.compiler.solc_path), client);

    match verifier.run(request, constructor_args.as_deref()).await {
        Ok(result) if result.success => {
            println!("{}", result.message);
            Ok(())
        }
        Ok(result) => {
            error!("Verification failed: {}", result.message);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Verification aborted: {}", e);
            std::process::exit(1);
        }
    }
}
