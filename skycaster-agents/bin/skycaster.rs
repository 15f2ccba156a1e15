use clap::Parser;
use skycaster_agents::config::{self, AppConfig};
use skycaster_agents::repl;
use skycaster_agents::weather_agent::create_weather_agent;
use skycaster_agents::Agent;
use skycaster_llm_sdk::openai::OpenAIClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Ask Skycaster about the weather", long_about = None)]
struct Args {
    /// Answer a single question and exit instead of starting the prompt loop
    #[arg(short, long)]
    prompt: Option<String>,

    /// Path to config file containing API keys and weather defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default city when a question names none
    #[arg(long)]
    city: Option<String>,

    /// Chat model to use
    #[arg(long)]
    model: Option<String>,

    /// Use live Open-Meteo data instead of the mock reading
    #[arg(long)]
    live: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(false),
        )
        .init();

    let args = Args::parse();

    let file = args
        .config
        .as_deref()
        .map(config::load_config)
        .transpose()?;
    let app_config =
        AppConfig::from_env(file.as_ref())?.with_overrides(args.city, args.model, args.live)?;

    let client = OpenAIClient::new(app_config.api_key()?)?.with_model(app_config.model.clone());
    let agent = create_weather_agent(Arc::new(client), &app_config)?;

    tracing::debug!("System prompt:\n{}", agent.system_prompt());
    tracing::info!(
        "Running agent: {} (mode {:?})",
        agent.objective(),
        app_config.weather_mode()
    );

    match args.prompt {
        Some(prompt) => println!("{}", repl::answer(&agent, &prompt).await),
        None => {
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            repl::run_repl(&agent, stdin.lock(), &mut stdout).await?;
        }
    }

    Ok(())
}
