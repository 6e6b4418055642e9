use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use potential_engine::assessment::{
    assessment_router, AnswerValue, AssessmentCatalog, AssessmentEngine, AssessmentService,
    InMemorySessionStore, ScoringRule, Stage,
};
use potential_engine::config::AppConfig;
use potential_engine::error::AppError;
use potential_engine::telemetry;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct HealthState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Potential Assessment Engine",
    about = "Serve or demo the adaptive potential assessment engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a scripted assessment session and print the synthesized result
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Simulated time spent per question in milliseconds
    #[arg(long, default_value_t = 30_000)]
    pace_ms: u64,
    /// Print the engagement snapshot after every answer
    #[arg(long)]
    trace_engagement: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

fn load_catalog(config: &AppConfig) -> Result<AssessmentCatalog, AppError> {
    match &config.catalog.path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Ok(AssessmentCatalog::from_json(&raw)?)
        }
        None => Ok(AssessmentCatalog::standard()),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(load_catalog(&config)?);
    let service = Arc::new(AssessmentService::new(
        catalog.clone(),
        Arc::new(InMemorySessionStore::default()),
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = HealthState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(assessment_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        questions = catalog.len(),
        "potential assessment engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<HealthState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<HealthState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let catalog = Arc::new(AssessmentCatalog::standard());
    let mut engine = AssessmentEngine::new(catalog.clone());

    println!("Potential assessment demo");
    println!(
        "Catalog: {} questions across {} dimensions (sections of {})",
        catalog.len(),
        catalog.dimensions().len(),
        catalog.section_size()
    );

    // Walk the whole flow: intro, every section, every question.
    while engine.stage() != Stage::Results {
        match engine.stage() {
            Stage::Intro | Stage::SectionIntro | Stage::EnergyBreak | Stage::Processing => {
                let stage = engine.stage();
                engine.next()?;
                if stage == Stage::SectionIntro {
                    if let Some(question) = engine.current_question() {
                        if let Some(dimension) = catalog.dimension(&question.dimension) {
                            println!("\n-- Section: {} --", dimension.name);
                        }
                    }
                }
            }
            Stage::Assessment => {
                let Some(question) = engine.current_question().cloned() else {
                    break;
                };
                let value = demo_answer(&question.rule);
                let outcome = engine.submit_answer(question.id.clone(), value, args.pace_ms)?;

                println!(
                    "answered {} [{}]",
                    question.id,
                    question.interaction.label()
                );
                if args.trace_engagement {
                    println!(
                        "  energy {:.1}, trend {}, quality avg {:.1}",
                        outcome.engagement.energy_level,
                        outcome.engagement.trend.label(),
                        outcome.engagement.avg_quality
                    );
                }
                if outcome.break_inserted {
                    println!("  -> energy break inserted");
                }
                if let Some(recommendation) = &outcome.recommendation {
                    println!(
                        "  hint ({}, {:?}): {}",
                        recommendation.kind.label(),
                        recommendation.priority,
                        recommendation.message
                    );
                }
            }
            Stage::Results => break,
        }
    }

    let result = engine.result()?;

    println!("\nOverall score: {} ({})", result.overall, result.level.label());
    println!("Percentile (proxy): {}", result.percentile);

    println!("\nDimension scores");
    for dimension in catalog.dimensions() {
        let score = result
            .dimension_scores
            .get(&dimension.id)
            .copied()
            .unwrap_or(0);
        println!("- {}: {}", dimension.name, score);
    }

    println!("\nInsights");
    for insight in &result.insights {
        println!("- {insight}");
    }

    println!("\nGrowth plan");
    for action in &result.growth_plan {
        println!("- {}", action.headline);
        for step in &action.actions {
            println!("  * {step}");
        }
    }

    if result.achievements.is_empty() {
        println!("\nAchievements: none");
    } else {
        println!("\nAchievements");
        for achievement in &result.achievements {
            println!("- {}", achievement.label());
        }
    }

    Ok(())
}

fn demo_answer(rule: &ScoringRule) -> AnswerValue {
    match rule {
        ScoringRule::Direct { max_points } => AnswerValue::Scalar(max_points * 0.8),
        ScoringRule::Weighted { weights } => AnswerValue::Scalar(weights.len() as f64),
        ScoringRule::Percentage => AnswerValue::Scalar(75.0),
        ScoringRule::RankPenalty { item } => AnswerValue::Ranking(vec![
            item.clone(),
            "second_choice".to_string(),
            "third_choice".to_string(),
        ]),
    }
}
