//! Litmus CLI - End-to-end verification of Kubernetes installations

use clap::{Args, Parser, Subcommand};
use litmus_kube::{Kubectl, KubectlConfig};
use std::path::PathBuf;

mod commands;
mod display;
mod error;
mod exit_codes;

use commands::installation::Check;

#[derive(Parser)]
#[command(name = "litmus")]
#[command(version)]
#[command(about = "End-to-end verification of Kubernetes installations", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// kubectl executable [env: KUBECTL_PATH] [default: /usr/local/bin/kubectl]
    #[arg(long, global = true)]
    kubectl: Option<PathBuf>,

    /// Namespace for components that do not declare one [env: LITMUS_NAMESPACE] [default: litmus]
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    /// kubeconfig context (defaults to the current context)
    #[arg(long, global = true)]
    context: Option<String>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Args)]
struct Descriptor {
    /// Installation descriptor (YAML)
    #[arg(short = 'f', long = "file")]
    file: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that every component of the installation exists
    Deployed {
        #[command(flatten)]
        descriptor: Descriptor,
    },

    /// Check that every pod component has all containers ready
    Running {
        #[command(flatten)]
        descriptor: Descriptor,
    },

    /// Check that no component of the installation exists anymore
    Deleted {
        #[command(flatten)]
        descriptor: Descriptor,
    },

    /// Evaluate a condition against the components behind an alias
    Condition {
        /// Component alias
        alias: String,

        /// Condition, e.g. is-unique-node, is-pvc-bound
        condition: String,

        #[command(flatten)]
        descriptor: Descriptor,
    },

    /// Perform an action on the pods behind an alias
    Action {
        /// Component alias
        alias: String,

        /// Action, e.g. delete-oldest-pod
        action: String,

        #[command(flatten)]
        descriptor: Descriptor,
    },

    /// Print a property of the component behind an alias
    Fetch {
        /// Component alias
        alias: String,

        /// Property, e.g. service-ip
        property: String,

        #[command(flatten)]
        descriptor: Descriptor,

        /// Output values as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the cluster answers
    Connected,

    /// Uncordon every node of the cluster
    UncordonAll {
        /// Keep going when a node fails to uncordon
        #[arg(long)]
        ignore_errors: bool,
    },

    /// Apply a manifest file
    Apply {
        /// Manifest path, or `-` to read the manifest from stdin
        file: PathBuf,
    },

    /// Delete the resources of a manifest file
    Teardown {
        /// Manifest path
        file: PathBuf,
    },
}

impl Cli {
    /// Flags take precedence over the environment
    fn kubectl_config(&self, mut config: KubectlConfig) -> KubectlConfig {
        if let Some(path) = &self.kubectl {
            config.path = path.clone();
        }
        if let Some(namespace) = self.namespace.as_deref().filter(|n| !n.trim().is_empty()) {
            config.namespace = namespace.to_string();
        }
        match &self.context {
            Some(context) => config.with_context(context.clone()),
            None => config,
        }
    }
}

fn init_log(debug: bool) {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_log(cli.debug);

    let kubectl = Kubectl::new(cli.kubectl_config(KubectlConfig::from_env()));
    let result = match cli.command {
        Commands::Deployed { descriptor } => {
            commands::installation::run(kubectl, &descriptor.file, Check::Deployed).await
        }
        Commands::Running { descriptor } => {
            commands::installation::run(kubectl, &descriptor.file, Check::Running).await
        }
        Commands::Deleted { descriptor } => {
            commands::installation::run(kubectl, &descriptor.file, Check::Deleted).await
        }
        Commands::Condition {
            alias,
            condition,
            descriptor,
        } => commands::condition::run(kubectl, &descriptor.file, &alias, &condition).await,
        Commands::Action {
            alias,
            action,
            descriptor,
        } => commands::action::run(kubectl, &descriptor.file, &alias, &action).await,
        Commands::Fetch {
            alias,
            property,
            descriptor,
            json,
        } => commands::fetch::run(kubectl, &descriptor.file, &alias, &property, json).await,
        Commands::Connected => commands::cluster::connected(kubectl).await,
        Commands::UncordonAll { ignore_errors } => {
            commands::cluster::uncordon_all(kubectl, ignore_errors).await
        }
        Commands::Apply { file } => commands::cluster::apply(kubectl, &file).await,
        Commands::Teardown { file } => commands::cluster::teardown(kubectl, &file).await,
    };

    let code = match result {
        Ok(true) => exit_codes::SUCCESS,
        Ok(false) => exit_codes::VERDICT_FALSE,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            code
        }
    };

    std::process::exit(code);
}
