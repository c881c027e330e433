// RAN CU operator hook dispatcher
use anyhow::{Context as _, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use ran_cu_operator::config::{ConfigLoader, Settings};
use ran_cu_operator::hook_tools::HookTools;
use ran_cu_operator::logging::{init_logging, LogConfig};
use ran_cu_operator::operator::{
    dispatch, ClusterTarget, Context, K8sPrivileged, MultusAttachments, Trigger, UnitModel,
};
use ran_cu_operator::pebble::PebbleClient;

/// Handle one runtime event for the CU unit
#[derive(Debug, Parser)]
#[command(name = "ran-cu-operator", version, about)]
struct Cli {
    /// Hook name or `hooks/<name>` dispatch path
    #[arg(long, env = "JUJU_DISPATCH_PATH")]
    hook: Option<String>,

    /// Settings file (TOML)
    #[arg(long, env = "RAN_CU_SETTINGS")]
    settings: Option<String>,

    /// Model name
    #[arg(long, env = "JUJU_MODEL_NAME")]
    model: Option<String>,

    /// Unit name, `<app>/<number>`
    #[arg(long, env = "JUJU_UNIT_NAME")]
    unit: Option<String>,

    /// Print a sample settings file and exit
    #[arg(long)]
    print_sample_settings: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.print_sample_settings {
        return match Settings::sample_toml() {
            Ok(sample) => {
                print!("{}", sample);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{:#}", e);
                ExitCode::FAILURE
            }
        };
    }

    let settings = match ConfigLoader::new()
        .load_from_file(cli.settings.as_deref())
        .load_from_env()
        .build()
    {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = match init_logging(&LogConfig::from_settings(&settings.logging)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Hook failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, settings: Settings) -> Result<()> {
    let trigger = Trigger::from_hook(cli.hook.as_deref().unwrap_or_default());
    let model = cli.model.context("JUJU_MODEL_NAME is not set")?;
    let unit = cli.unit.context("JUJU_UNIT_NAME is not set")?;

    info!("Starting RAN CU operator for {} ({})", unit, trigger);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    let client = runtime
        .block_on(kube::Client::try_default())
        .context("Failed to create Kubernetes client")?;

    let hook_tools = Arc::new(HookTools::new(&settings.hook_tools, model.as_str(), unit.as_str()));
    let namespace = settings.kubernetes.namespace.clone().unwrap_or(model);
    let statefulset = match &settings.kubernetes.statefulset_name {
        Some(name) => name.clone(),
        None => hook_tools.app_name()?,
    };
    let target = ClusterTarget::new(client, runtime.handle().clone(), namespace, statefulset);

    let ctx = Context::new(
        hook_tools.clone(),
        hook_tools,
        Arc::new(PebbleClient::from_settings(&settings)),
        Arc::new(K8sPrivileged::new(target.clone())),
        Arc::new(MultusAttachments::new(target)),
        settings,
    );

    let outcome = dispatch(&ctx, trigger)?;
    info!(
        effects = outcome.effects.len(),
        "Hook {} handled, status {}", trigger, outcome.status
    );
    Ok(())
}
