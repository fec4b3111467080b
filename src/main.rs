use clap::{Arg, Command};
use log::LevelFilter;
use mail_triage::demo;
use mail_triage::filter::InboxQuery;
use mail_triage::model::{ConfidenceBand, MailStatus, Role};
use mail_triage::review::ReviewAction;
use mail_triage::{Config, Session};
use std::process;

fn main() {
    let matches = Command::new("mail-triage")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Role-based postal mail triage engine")
        .long_about(
            "Mail Triage - role-scoped review of scanned postal mail:\n\
             • Operators scan envelopes; recognition output becomes mail items\n\
             • High-confidence items auto-route, the rest queue for review\n\
             • Supervisors and admins approve, escalate, or revert items\n\
             • Per-operator performance and center analytics built in",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("mail-triage.yaml"),
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
                .help("Test configuration validity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("demo")
                .long("demo")
                .help("Run a scripted triage session over the demo dataset")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("role")
                .long("role")
                .value_name("ROLE")
                .help("Acting role for the demo session (operator, supervisor, admin)")
                .default_value("admin"),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .value_name("FORMAT")
                .help("Print a statistics report over the demo dataset (json, csv)")
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

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        println!("🔍 Testing configuration...");
        println!();
        println!("Auto-approve threshold: {}%", config.auto_approve_threshold);
        println!("Escalation threshold:   {}%", config.escalation_threshold);
        println!("Configured centers:     {}", config.centers.len());
        for center in &config.centers {
            println!("  • {center}");
        }
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed:");
                println!("Error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    if let Some(format) = matches.get_one::<String>("report") {
        print_report(&config, format);
        return;
    }

    if matches.get_flag("demo") {
        let role_arg = matches.get_one::<String>("role").unwrap();
        let role = match Role::parse(role_arg) {
            Some(role) => role,
            None => {
                eprintln!("❌ Unknown role: {role_arg}. Use operator, supervisor, or admin");
                process::exit(1);
            }
        };
        run_demo(&config, role);
        return;
    }

    // No action flag given; point at the useful ones instead of doing
    // nothing silently.
    println!("Nothing to do. Try --demo, --report json, or --help.");
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
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

fn run_demo(config: &Config, role: Role) {
    let user = demo::demo_user_for(role);
    println!("📮 Mail Triage demo session");
    println!("═══════════════════════════════════════");
    println!(
        "Acting user: {} ({}, {})",
        user.name,
        user.role.display_name(),
        user.center
    );
    println!();

    let mut session = Session::seeded(user, config.clone());

    println!("📥 Visible mail items:");
    print_item_table(&session);
    println!();

    if role.can_review() {
        // Work the queue a little: approve the first pending item and
        // escalate the next one.
        let pending: Vec<String> = session
            .visible()
            .iter()
            .filter(|i| i.status == MailStatus::Pending)
            .map(|i| i.id.clone())
            .collect();

        if let Some(first) = pending.first() {
            match session.apply(first, ReviewAction::Approve) {
                Ok(()) => println!("✅ Approved {first}"),
                Err(e) => println!("❌ Could not approve {first}: {e}"),
            }
        }
        if let Some(second) = pending.get(1) {
            let action = ReviewAction::Escalate {
                reason: Some("Demo escalation".to_string()),
            };
            match session.apply(second, action) {
                Ok(()) => println!("⚠️  Escalated {second}"),
                Err(e) => println!("❌ Could not escalate {second}: {e}"),
            }
        }
        println!();
    } else {
        // Operators demonstrate the scan flow instead.
        let envelope = demo_scan_envelope();
        let id = session.scan(envelope);
        let item = session.get(&id).unwrap();
        println!(
            "📷 Scanned new envelope {id}: confidence {}%, status {}",
            item.confidence, item.status
        );
        println!();
    }

    println!("👷 Operator performance (visible items):");
    print_performance_table(&session);
    println!();

    print_stats_summary(&session);
}

fn demo_scan_envelope() -> mail_triage::RecognizedEnvelope {
    use mail_triage::model::{AddressFields, AiSuggestion};

    mail_triage::RecognizedEnvelope {
        image_ref: "scan-demo.jpg".to_string(),
        ocr_text: "Mr. Mohan Lal, 9 Subhash Road, Shastri Nagar, Jaipur 302016".to_string(),
        fields: AddressFields {
            name: "Mr. Mohan Lal".to_string(),
            house_no: "9".to_string(),
            street: "Subhash Road".to_string(),
            locality: "Shastri Nagar".to_string(),
            city: "Jaipur".to_string(),
            state: "Rajasthan".to_string(),
            pincode: "302016".to_string(),
        },
        suggestion: AiSuggestion {
            corrected_pincode: "302016".to_string(),
            delivery_hub: "DH-302".to_string(),
            nodal_center: "NC-30".to_string(),
            confidence: 81,
            flags: vec!["Manual review suggested".to_string()],
            reasoning: "Address fields extracted but manual verification recommended."
                .to_string(),
        },
    }
}

fn print_item_table(session: &Session) {
    let items = session.inbox(&InboxQuery::default());
    if items.is_empty() {
        println!("  (no items visible)");
        return;
    }

    println!("┌───────────┬──────────────────┬─────────────┬─────────┬───────┬───────────┬──────────────────┐");
    println!("│ ID        │ Locality         │ City        │ PIN     │ Conf. │ Status    │ Scanned By       │");
    println!("├───────────┼──────────────────┼─────────────┼─────────┼───────┼───────────┼──────────────────┤");
    for item in items {
        println!(
            "│ {:<9} │ {:<16} │ {:<11} │ {:<7} │ {:>4}% │ {:<9} │ {:<16} │",
            truncate_string(&item.id, 9),
            truncate_string(&item.fields.locality, 16),
            truncate_string(&item.fields.city, 11),
            item.fields.pincode,
            item.confidence,
            item.status,
            truncate_string(&item.uploaded_by_name, 16),
        );
    }
    println!("└───────────┴──────────────────┴─────────────┴─────────┴───────┴───────────┴──────────────────┘");
}

fn print_performance_table(session: &Session) {
    let performance = session.performance();
    if performance.is_empty() {
        println!("  (no performance data)");
        return;
    }

    println!("┌──────────────────┬─────────┬─────────────┬──────────┬──────────────┬──────────┐");
    println!("│ Operator         │ Scanned │ Auto-routed │ Reviewed │ Auto-route % │ Avg time │");
    println!("├──────────────────┼─────────┼─────────────┼──────────┼──────────────┼──────────┤");
    for stats in &performance {
        println!(
            "│ {:<16} │ {:>7} │ {:>11} │ {:>8} │ {:>11}% │ {:>7}s │",
            truncate_string(&stats.operator_name, 16),
            stats.scanned,
            stats.auto_routed,
            stats.reviewed,
            stats.auto_route_percentage(),
            stats.avg_time(),
        );
    }
    println!("└──────────────────┴─────────┴─────────────┴──────────┴──────────────┴──────────┘");
}

fn print_stats_summary(session: &Session) {
    let stats = session.stats();

    println!("📊 Dashboard summary:");
    println!("  Items total:        {}", stats.total);
    println!("  In queue:           {}", stats.in_queue);
    println!(
        "  Auto-routed:        {} ({}%)",
        stats.auto_routed,
        stats.auto_route_percentage()
    );
    println!("  Needs review:       {}", stats.needs_review);
    println!("  Escalated:          {}", stats.escalated);
    println!("  Avg. processing:    {}s", stats.avg_processing_time());
    println!();

    println!("  Status breakdown:");
    for (status, count) in &stats.status_breakdown {
        println!("    {:<10} {}", format!("{status}:"), count);
    }
    println!();

    let dist = &stats.confidence_distribution;
    println!("  Confidence distribution:");
    println!("    {:<17} {}", ConfidenceBand::High.label(), dist.high);
    println!("    {:<17} {}", ConfidenceBand::Medium.label(), dist.medium);
    println!("    {:<17} {}", ConfidenceBand::Low.label(), dist.low);

    if !stats.flag_tallies.is_empty() {
        println!();
        println!("  Common error types:");
        for (flag, count) in stats.flag_tallies.iter().take(5) {
            println!("    {:<28} {}", flag, count);
        }
    }

    let centers = mail_triage::statistics::center_summary(session.visible());
    if !centers.is_empty() {
        println!();
        println!("  Center performance:");
        for center in centers {
            println!(
                "    {:<18} {} items, avg {}s",
                center.center,
                center.scanned,
                center.avg_time()
            );
        }
    }
}

fn print_report(config: &Config, format: &str) {
    let session = Session::seeded(demo::admin_priya(), config.clone());
    let stats = session.stats();
    let performance = session.performance();

    match format.to_lowercase().as_str() {
        "json" => {
            let avg_processing_time = stats.avg_processing_time();
            let auto_route_percentage = stats.auto_route_percentage();
            let report = serde_json::json!({
                "system": format!("mail-triage v{}", env!("CARGO_PKG_VERSION")),
                "auto_approve_threshold": config.auto_approve_threshold,
                "escalation_threshold": config.escalation_threshold,
                "global": stats,
                "avg_processing_time": avg_processing_time,
                "auto_route_percentage": auto_route_percentage,
                "operators": performance
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "operator_id": p.operator_id,
                            "operator_name": p.operator_name,
                            "scanned": p.scanned,
                            "auto_routed": p.auto_routed,
                            "reviewed": p.reviewed,
                            "auto_route_percentage": p.auto_route_percentage(),
                            "avg_time": p.avg_time(),
                        })
                    })
                    .collect::<Vec<_>>(),
            });
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("❌ Failed to serialize report: {e}");
                    process::exit(1);
                }
            }
        }
        "csv" => {
            println!("metric,value");
            println!("version,{}", env!("CARGO_PKG_VERSION"));
            println!("total,{}", stats.total);
            println!("in_queue,{}", stats.in_queue);
            println!("auto_routed,{}", stats.auto_routed);
            println!("needs_review,{}", stats.needs_review);
            println!("escalated,{}", stats.escalated);
            println!("avg_processing_time,{}", stats.avg_processing_time());
            println!("auto_route_percentage,{}", stats.auto_route_percentage());
            for p in &performance {
                println!(
                    "operator.{}.scanned,{}",
                    p.operator_id, p.scanned
                );
                println!(
                    "operator.{}.auto_route_percentage,{}",
                    p.operator_id,
                    p.auto_route_percentage()
                );
            }
        }
        _ => {
            eprintln!("❌ Unsupported format: {format}. Use json or csv");
            process::exit(1);
        }
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}
