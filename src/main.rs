use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use cli::fixture::Fixture;
use cli::replay::{DryRunTraining, MajorityFactory, ReplayFactory};
use recsel::config::SelectionConfig;
use recsel::domain::{RecommenderEvent, User, event_types};
use recsel::engine::FactoryRegistry;
use recsel::service::{ActiveRecommenders, ChannelEventPublisher};
use recsel::task::{
    RecommendationServices, SelectionOutcome, SelectionTask, Task, TaskContext, TaskEvent, TaskScheduler, WorkerPoolScheduler,
};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recsel")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("recsel.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn run_application(cli: &Cli, config: &SelectionConfig) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Select { fixture, user } => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            runtime.block_on(handle_select_command(fixture, user.as_deref(), config, cli.is_verbose()))
        }
        Commands::Config => handle_config_command(config),
    }
}

fn handle_config_command(config: &SelectionConfig) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    println!("{}", yaml);
    Ok(())
}

async fn handle_select_command(path: &Path, user: Option<&str>, config: &SelectionConfig, verbose: bool) -> Result<()> {
    info!("Running selection over fixture: {}", path.display());
    let fixture = Fixture::load(path)?;
    let owner = User::new(user.unwrap_or(&fixture.user));

    let factories = FactoryRegistry::new()
        .with_factory(Arc::new(ReplayFactory::new(fixture.recordings())))
        .with_factory(Arc::new(MajorityFactory));
    let (scheduler, mut task_events) = WorkerPoolScheduler::new(&config.scheduler);
    let scheduler = Arc::new(scheduler);
    let (publisher, mut events) = ChannelEventPublisher::new(config.events.capacity);
    let activation = Arc::new(ActiveRecommenders::new());

    let services = RecommendationServices::new(
        Arc::new(fixture.repository()),
        Arc::new(fixture.document_source()),
        Arc::new(factories),
        scheduler.clone(),
        Arc::new(DryRunTraining),
    )
    .with_activation(activation.clone())
    .with_events(Arc::new(publisher))
    .with_config(config.clone());

    let context = TaskContext::new(owner.clone(), fixture.project.clone(), "recsel select");
    let task = Arc::new(SelectionTask::new(context, services).context("Failed to create selection task")?);

    println!(
        "{} {} ({} as {})",
        "Selecting recommenders for".cyan(),
        fixture.project.name.bold(),
        fixture.documents.len(),
        owner.username
    );

    scheduler.enqueue(task.clone()).context("Failed to schedule selection")?;
    scheduler.wait_idle().await;

    while let Ok(event) = task_events.try_recv() {
        match event {
            TaskEvent::Failed { title, error, .. } => println!("{} {}: {}", "Task failed:".red(), title, error),
            other if verbose => println!("{} {:?}", "Task:".dimmed(), other),
            _ => {}
        }
    }

    for layer in fixture.layers() {
        let evaluated = activation.evaluated_recommenders(&owner, &layer);
        if evaluated.is_empty() {
            continue;
        }
        println!("\n{}", layer.ui_name.bold());
        for decision in evaluated.iter() {
            let marker = if decision.is_active() { "active".green() } else { "inactive".red() };
            let score = decision
                .evaluation_result()
                .filter(|r| !r.is_evaluation_skipped())
                .map(|r| format!(" (F1 {:.4})", r.f1_score()))
                .unwrap_or_default();
            println!(
                "  {:<8} {}{}: {}",
                marker,
                decision.recommender().name,
                score,
                decision.reason()
            );
        }
    }

    while let Ok(event) = events.try_recv() {
        if let RecommenderEvent::Notification(notification) = &event {
            if event.is_failure() || event.event_type() == event_types::MISSING_FACTORY {
                println!("{} {}", "!".red(), notification.message.message);
            } else if verbose {
                println!("{} {}", "-".dimmed(), notification.message.message);
            }
        }
    }

    if verbose {
        println!();
        for message in task.monitor().messages() {
            println!("  {}", message);
        }
    }

    let summary = match task.outcome() {
        Some(SelectionOutcome::TrainingScheduled) => "Training scheduled".green(),
        Some(SelectionOutcome::NothingActivated) => "No recommender activated".yellow(),
        Some(SelectionOutcome::NothingToDo) => "No recommenders to evaluate".yellow(),
        None => "Selection did not complete".red(),
    };
    println!("\n{}", summary);
    Ok(())
}

fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = SelectionConfig::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
