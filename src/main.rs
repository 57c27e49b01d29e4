// src/main.rs
// =============================================================================
// This is the entry point of the `indexnow` CLI.
//
// What happens here:
// 1. Install the tracing subscriber (RUST_LOG, default "warn", to stderr)
// 2. Parse command-line arguments using clap
// 3. Build the configuration: JSON file, then environment, then flags
// 4. Dispatch to the subcommand handler
// 5. Exit with proper code (0 = success, 1 = rejected or blocked, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use indexnow_notifier::engine;
use indexnow_notifier::guard::format_remaining;
use indexnow_notifier::key::verification::{self, KeyUrlCheck};
use indexnow_notifier::submit::{BLOCKED_MESSAGE, NO_URLS_MESSAGE};
use indexnow_notifier::{
    ActivityLog, ApiKey, Config, ErrorKind, FileSlot, IndexNowError, KeyStore, ReqwestTransport,
    SpamGuard, SubmissionOutcome, SubmitterOptions, Transport, UrlSubmitter,
};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(hint) = e.downcast_ref::<IndexNowError>().and_then(remediation) {
                eprintln!("💡 {}", hint);
            }
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Submit {
            urls,
            engine,
            key_location,
            json,
        } => handle_submit(&config, urls, engine, key_location, json).await,
        Commands::GenerateKey => handle_generate_key(&config),
        Commands::ShowKey => handle_show_key(&config),
        Commands::Status => handle_status(&config).await,
        Commands::ResetBlock { yes } => handle_reset_block(&config, yes),
        Commands::Logs => handle_logs(&config),
        Commands::ClearLogs => handle_clear_logs(&config),
        Commands::WriteKeyFile { dir } => handle_write_key_file(&config, &dir),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let mut config = config.with_env();
    if let Some(app_url) = &cli.app_url {
        config.app_url = Some(app_url.clone());
    }
    Ok(config)
}

// -----------------------------------------------------------------------------
// Wiring: each component gets its own slot under the storage directory
// -----------------------------------------------------------------------------

fn activity_log(config: &Config) -> ActivityLog {
    ActivityLog::new(config.log_path(), config.enable_logging)
}

fn key_store(config: &Config) -> KeyStore {
    KeyStore::new(Box::new(FileSlot::new(config.key_path())), activity_log(config))
        .with_configured_key(config.api_key.clone())
}

fn spam_guard(config: &Config) -> SpamGuard {
    SpamGuard::new(Box::new(FileSlot::new(config.block_path())), activity_log(config))
        .with_detection(config.enable_spam_detection)
        .with_blocking_hours(config.spam_blocking_hours)
}

/// A configured key must be valid as given; otherwise the stored key is
/// read, and regenerated when missing or corrupt.
fn current_key(store: &KeyStore) -> Result<ApiKey> {
    let key = if store.has_configured_key() {
        store.get_from_config()?
    } else {
        store.get_or_create()?
    };
    Ok(key)
}

// -----------------------------------------------------------------------------
// Subcommands
// -----------------------------------------------------------------------------

async fn handle_submit(
    config: &Config,
    urls: Vec<String>,
    engine: Option<String>,
    key_location: Option<String>,
    json: bool,
) -> Result<i32> {
    let key = current_key(&key_store(config))?;
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(config.timeout())?);

    let mut submitter = UrlSubmitter::new(
        engine.as_deref().unwrap_or(&config.search_engine),
        key,
        SubmitterOptions {
            enable_submissions: config.enable_submissions,
            base_url: config.app_url.clone(),
        },
        Arc::new(spam_guard(config)),
        transport,
        activity_log(config),
    )?;

    if let Some(location) = &key_location {
        submitter
            .use_key_location(location)
            .await
            .with_context(|| format!("Could not use the key hosted at {}", location))?;
    }

    if !json {
        println!(
            "📤 Submitting {} URL(s) to {}",
            urls.len(),
            submitter.search_engine()
        );
    }

    let outcome = submitter.submit(Some(urls.into())).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(exit_code_for(&outcome))
}

fn exit_code_for(outcome: &SubmissionOutcome) -> i32 {
    match outcome {
        SubmissionOutcome::Submitted(report) if report.is_success() => 0,
        SubmissionOutcome::Submitted(_) => 1,
        SubmissionOutcome::Skipped(message) if message == BLOCKED_MESSAGE => 1,
        SubmissionOutcome::Skipped(_) => 0,
    }
}

fn print_outcome(outcome: &SubmissionOutcome) {
    match outcome {
        SubmissionOutcome::Submitted(report) => {
            let icon = if report.is_success() { "✅" } else { "❌" };
            println!(
                "{} {} answered {} {}",
                icon, report.search_engine, report.status, report.info
            );
            for url in &report.urls {
                println!("   {}", url);
            }
        }
        SubmissionOutcome::Skipped(message) if message == NO_URLS_MESSAGE => {
            println!("⚠️  {}", message);
        }
        SubmissionOutcome::Skipped(message) => {
            println!("⏸️  {}", message);
        }
    }
}

fn handle_generate_key(config: &Config) -> Result<i32> {
    let store = key_store(config);
    let key = store.generate()?;

    println!("🔑 New IndexNow key: {}", key);
    if store.has_configured_key() {
        println!("⚠️  INDEXNOW_API_KEY is set and takes precedence over the stored key");
    }
    if let Some(app_url) = &config.app_url {
        println!("   Publish it at {}", verification::key_url(app_url, &key));
    }
    Ok(0)
}

fn handle_show_key(config: &Config) -> Result<i32> {
    let key = current_key(&key_store(config))?;
    println!("{}", key);
    Ok(0)
}

fn handle_write_key_file(config: &Config, dir: &Path) -> Result<i32> {
    let key = current_key(&key_store(config))?;
    let path = verification::write_key_file(dir, &key)?;

    println!("📄 Wrote {}", path.display());
    println!(
        "   Serve it at {} with Content-Type: {}",
        verification::route_path(&key),
        verification::CONTENT_TYPE
    );
    Ok(0)
}

fn handle_logs(config: &Config) -> Result<i32> {
    let contents = activity_log(config).show()?;
    if contents.is_empty() {
        println!("📭 The activity log is empty");
    } else {
        print!("{}", contents);
    }
    Ok(0)
}

fn handle_clear_logs(config: &Config) -> Result<i32> {
    if activity_log(config).clear()? {
        println!("🧹 Activity log cleared");
    } else {
        println!("📭 No activity log to clear");
    }
    Ok(0)
}

fn handle_reset_block(config: &Config, yes: bool) -> Result<i32> {
    let guard = spam_guard(config);
    let remaining = guard.remaining_block_time();

    if remaining.is_zero() {
        println!("✅ No active blocking found. Submissions are already allowed.");
        return Ok(0);
    }

    println!(
        "⛔ Currently blocked for {} remaining.",
        format_remaining(remaining)
    );

    if !yes && !confirm("Do you want to reset the block and allow submissions again? [Y/n] ")? {
        println!("Operation cancelled. Block remains active.");
        return Ok(0);
    }

    if guard.reset_blocking() {
        println!("✅ Block has been successfully reset. Submissions are now allowed.");
        Ok(0)
    } else {
        eprintln!("❌ Failed to reset blocking state.");
        Ok(2)
    }
}

/// Reads a yes/no answer from stdin; an empty answer means yes.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "" | "y" | "yes"
    ))
}

async fn handle_status(config: &Config) -> Result<i32> {
    println!("\n📋 IndexNow status");
    println!("{}", "=".repeat(40));

    let mut ready = true;

    // Key
    // Report only; a missing or invalid key is not regenerated here
    let key = match key_store(config).current() {
        Ok(key) => {
            println!("🔑 API key: ✅ {} (valid)", key.masked());
            Some(key)
        }
        Err(e) => {
            ready = false;
            let label = match e.kind() {
                ErrorKind::KeyFileMissing => "Missing",
                ErrorKind::InvalidKey => "Invalid",
                _ => "Error",
            };
            println!("🔑 API key: ❌ {}: {}", label, e);
            if let Some(hint) = remediation(&e) {
                println!("   💡 {}", hint);
            }
            None
        }
    };

    // Key URL
    if let Some(key) = &key {
        match &config.app_url {
            Some(app_url) => {
                let url = verification::key_url(app_url, key);
                println!("🌐 Key URL: {}", url);

                let transport = ReqwestTransport::new(config.timeout())?;
                match verification::check_key_url(&transport, &url, key).await {
                    KeyUrlCheck::Reachable => println!("   ✅ Accessible"),
                    KeyUrlCheck::Mismatch => {
                        println!("   ❌ Reachable but does not contain the key");
                        println!("   💡 Run `indexnow write-key-file <public dir>` to publish it");
                    }
                    KeyUrlCheck::Unreachable(reason) => {
                        println!("   ❌ Not accessible: {}", reason);
                        println!("   💡 Make sure the key file is publicly accessible");
                    }
                }
            }
            None => {
                println!("🌐 Key URL: ⚠️  unknown, set APP_URL or --app-url");
            }
        }
    }

    // Search engine
    match engine::resolve(&config.search_engine) {
        Some(host) => println!("🔍 Search engine: {} ({})", config.search_engine, host),
        None => {
            ready = false;
            println!("🔍 Search engine: ❌ {} is unknown", config.search_engine);
            println!(
                "   💡 Valid options: {}",
                engine::identifiers().collect::<Vec<_>>().join(", ")
            );
        }
    }

    // Flags
    println!("📤 Submissions enabled: {}", yes_no(config.enable_submissions));
    if !config.enable_submissions {
        ready = false;
        println!("   💡 Set INDEXNOW_ENABLE_SUBMISSIONS=true to enable URL submissions");
    }

    println!("📝 Logging enabled: {}", yes_no(config.enable_logging));
    if config.enable_logging {
        let found = config.log_path().exists();
        println!(
            "   Log file: {}",
            if found { "found" } else { "not created yet" }
        );
    }

    // Spam guard
    let guard = spam_guard(config);
    println!(
        "🛡️  Spam protection: {}",
        if guard.is_enabled() { "enabled" } else { "disabled" }
    );
    let remaining = guard.remaining_block_time();
    let blocked = !remaining.is_zero();
    if blocked {
        println!(
            "   ⛔ Submissions currently blocked for {}",
            format_remaining(remaining)
        );
        println!("   💡 Wait for the block to expire or run `indexnow reset-block`");
    } else {
        println!("   ✅ No active blocks, submissions allowed");
    }
    println!("   Block duration when triggered: {} hours", guard.blocking_hours());

    // Summary
    println!("{}", "=".repeat(40));
    if blocked {
        println!("⛔ Submissions are temporarily blocked due to rate limiting");
    } else if ready {
        println!("✅ IndexNow is configured and ready to submit URLs");
    } else {
        println!("⚠️  Address the issues above to finish configuring IndexNow");
    }
    println!();

    Ok(0)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// What the operator can do about a failure.
fn remediation(err: &IndexNowError) -> Option<&'static str> {
    match err.kind() {
        ErrorKind::InvalidKey => Some(
            "Configure a valid key (8-128 letters and digits) with INDEXNOW_API_KEY, \
             or run `indexnow generate-key`",
        ),
        ErrorKind::KeyFileMissing => Some("Run `indexnow generate-key` or set INDEXNOW_API_KEY"),
        ErrorKind::SearchEngineUnknown => {
            Some("Valid engines: indexnow, microsoft_bing, naver, seznam, yandex")
        }
        ErrorKind::ExcessUrls => Some("Split the submission into batches of at most 10,000 URLs"),
        ErrorKind::NonAbsoluteUrl => Some("Pass absolute URLs or set APP_URL / --app-url"),
        ErrorKind::Mixed => Some("Check network access to the search engine and try again later"),
        ErrorKind::Storage => Some("Check that the storage directory is writable"),
        ErrorKind::HttpClient => None,
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is main() not returning Result?
//    - We want full control over the exit code (0, 1 or 2)
//    - run() returns Result<i32>; main() turns errors into exit code 2
//
// 2. What does downcast_ref do?
//    - anyhow::Error can hold any error type
//    - downcast_ref::<IndexNowError>() gets our own error back, if that is
//      what it holds, so we can print a hint for its kind
//
// 3. Why Arc<dyn Transport>?
//    - The submitter only needs "something that can send requests"
//    - In tests a fake is passed instead of the real HTTP client
// -----------------------------------------------------------------------------
