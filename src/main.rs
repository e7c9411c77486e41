use clap::{Arg, Command};
use job_tracker::config::Config;
use job_tracker::extractors::{extract_company, extract_job_title};
use job_tracker::mailbox::parse_rfc822;
use job_tracker::runner::{run_configured_scan, run_daemon};
use job_tracker::scheduler::{disable_auto_scan, enable_auto_scan, FileScheduler};
use job_tracker::store::{SqliteStore, Store, HEADER};
use job_tracker::tracker::{full_reset, recolor_all_rows, status_counts};
use job_tracker::StatusClassifier;
use log::LevelFilter;
use std::io::{self, BufRead, Write};
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("job-tracker")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Keeps a job application log in sync with your mailbox")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("job-tracker.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Check the configuration and classification patterns")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("scan")
                .long("scan")
                .help("Discover new applications and update tracked ones")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("enable-auto-scan")
                .long("enable-auto-scan")
                .help("Schedule a daily scan at the configured hour")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("disable-auto-scan")
                .long("disable-auto-scan")
                .help("Remove the daily scan")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("recolor")
                .long("recolor")
                .help("Reapply status colours to every row")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("reset")
                .long("reset")
                .help("Delete all tracked applications and scheduled triggers")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("yes")
                .long("yes")
                .help("Skip the confirmation prompt for --reset")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("daemon")
                .short('d')
                .long("daemon")
                .help("Stay running and scan at the scheduled hour")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Show application counts per status")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("Print the application log")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("test-email")
                .long("test-email")
                .value_name("FILE")
                .help("Show how a single email file would be classified")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("job-tracker.yaml");

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        test_config(&config);
        return;
    }

    if let Some(email_file) = matches.get_one::<String>("test-email") {
        test_email_file(&config, email_file);
        return;
    }

    if matches.get_flag("enable-auto-scan") {
        let mut scheduler = FileScheduler::new(&config.schedule_path);
        match enable_auto_scan(&mut scheduler, config.schedule_hour) {
            Ok(trigger) => println!("✅ Daily scan enabled at {:02}:00", trigger.hour),
            Err(e) => fail("Failed to enable daily scan", e),
        }
        return;
    }

    if matches.get_flag("disable-auto-scan") {
        let mut scheduler = FileScheduler::new(&config.schedule_path);
        match disable_auto_scan(&mut scheduler) {
            Ok(0) => println!("No daily scan was scheduled"),
            Ok(_) => println!("✅ Daily scan disabled"),
            Err(e) => fail("Failed to disable daily scan", e),
        }
        return;
    }

    if matches.get_flag("reset") {
        if !matches.get_flag("yes") && !confirm_reset() {
            println!("Reset cancelled");
            return;
        }
        let mut store = open_store(&config);
        let mut scheduler = FileScheduler::new(&config.schedule_path);
        match full_reset(&mut store, &mut scheduler) {
            Ok(summary) => println!(
                "✅ Reset complete: {} applications and {} scheduled triggers removed",
                summary.rows_removed, summary.triggers_removed
            ),
            Err(e) => fail("Reset failed", e),
        }
        return;
    }

    if matches.get_flag("recolor") {
        match recolor_all_rows(&mut open_store(&config)) {
            Ok(count) => println!("✅ Recolored {count} rows"),
            Err(e) => fail("Recolor failed", e),
        }
        return;
    }

    if matches.get_flag("stats") {
        show_stats(&config);
        return;
    }

    if matches.get_flag("list") {
        list_applications(&config);
        return;
    }

    if matches.get_flag("daemon") {
        log::info!("Starting job-tracker daemon...");
        if let Err(e) = run_daemon(config, tokio::signal::ctrl_c()).await {
            log::error!("Daemon error: {e:#}");
            process::exit(1);
        }
        return;
    }

    // --scan, and the default when no other action is requested
    match run_configured_scan(&config) {
        Ok(summary) => println!("✅ {summary}"),
        Err(e) => fail("Scan failed", e),
    }
}

fn fail(context: &str, e: anyhow::Error) -> ! {
    eprintln!("❌ {context}: {e:#}");
    process::exit(1);
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::warn!(
            "Configuration file '{path}' not found, using default configuration"
        );
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

fn test_config(config: &Config) {
    println!("🔍 Testing configuration...");
    println!();
    println!("Store: {}", config.store_path);
    println!("Mailbox export: {}", config.mailbox_path);
    println!(
        "Lookback: {} days, daily scan hour: {:02}:00",
        config.lookback_days, config.schedule_hour
    );
    println!("Search subjects: {}", config.search_subjects.len());

    let classifier = StatusClassifier::new(&config.rules);
    for rule in &config.rules {
        println!("  {}: {} patterns", rule.status, rule.patterns.len());
    }

    let degraded = classifier.degraded_patterns();
    if degraded.is_empty() {
        println!(
            "All {} classification patterns compiled successfully.",
            classifier.pattern_count()
        );
    } else {
        println!("⚠️  Patterns matched as plain text (invalid regex):");
        for pattern in degraded {
            println!("  • {pattern}");
        }
    }
}

fn confirm_reset() -> bool {
    print!(
        "Delete every tracked application and scheduled trigger? Type RESET to continue: "
    );
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => answer.trim() == "RESET",
        Err(_) => false,
    }
}

fn open_store(config: &Config) -> SqliteStore {
    match SqliteStore::open(&config.store_path) {
        Ok(store) => store,
        Err(e) => fail("Failed to open application log", e),
    }
}

fn show_stats(config: &Config) {
    let counts = match status_counts(&open_store(config)) {
        Ok(counts) => counts,
        Err(e) => fail("Failed to read application log", e),
    };
    let total: usize = counts.values().sum();

    println!("📊 Job Application Statistics");
    println!("═══════════════════════════════════════");
    println!("  Total Applications: {total}");
    let mut entries = counts.iter().peekable();
    while let Some((status, count)) = entries.next() {
        let last = entries.peek().is_none();
        let branch = if last { "└─" } else { "├─" };
        if total > 0 {
            let pct = (*count as f64 / total as f64) * 100.0;
            println!("  {branch} {status}: {count} ({pct:.1}%)");
        } else {
            println!("  {branch} {status}: {count}");
        }
    }
}

fn list_applications(config: &Config) {
    let records = match open_store(config).read_all() {
        Ok(records) => records,
        Err(e) => fail("Failed to read application log", e),
    };
    if records.is_empty() {
        println!("📭 No applications tracked yet");
        return;
    }

    println!(
        "{:<24} {:<28} {:<12} {:<10} {:<18} {}",
        HEADER[0], HEADER[1], HEADER[2], HEADER[3], HEADER[4], HEADER[5]
    );
    for record in &records {
        let row = record.to_row();
        println!(
            "{:<24} {:<28} {:<12} {:<10} {:<18} {}",
            truncate_string(&row[0], 24),
            truncate_string(&row[1], 28),
            row[2],
            row[3],
            truncate_string(&row[4], 18),
            row[5]
        );
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn test_email_file(config: &Config, email_file: &str) {
    println!("🧪 Testing email file: {}", email_file);
    println!();

    let email_content = match std::fs::read_to_string(email_file) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("❌ Error reading email file: {}", e);
            process::exit(1);
        }
    };

    let email = parse_rfc822(&email_content);

    println!("📧 Email Details:");
    println!("   From: {}", email.from);
    println!("   Subject: {}", email.subject);
    println!();

    let classifier = StatusClassifier::new(&config.rules);
    let company = extract_company(&email.subject, &email.from, &config.generic_domain_tokens);
    println!("   Company: {company}");
    let mut title = extract_job_title(&email.subject, &email.body);
    if title.is_empty() {
        title = "(unknown)".to_string();
    }
    println!("   Job Title: {title}");
    match classifier.classify_with_evidence(&email.subject, &email.body) {
        Some(classification) => println!(
            "   Status: {} (matched '{}')",
            classification.status, classification.pattern
        ),
        None => println!("   Status: not application mail, would be skipped"),
    }
}
