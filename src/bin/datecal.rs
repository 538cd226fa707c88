// Binary entry point for the command-line application.
use anyhow::{Context, Result};
use datecal::cli::{self, CliArgs, Command, Mode};
use datecal::config::Config;
use datecal::context::StandardContext;
use datecal::document;
use datecal::extract::{DateExtractor, filter_by_confidence};
use datecal::ics::{CalendarEmitter, assessment_to_event};
use datecal::model::CalendarEvent;
use datecal::syllabus::StructuredExtractor;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::env;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let binary_name = args.first().map(String::as_str).unwrap_or("datecal");
    let binary_name = binary_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("datecal")
        .to_string();

    let cli_args = match cli::parse_args(args.get(1..).unwrap_or_default()) {
        Ok(Command::Help) => {
            cli::print_help(&binary_name);
            return Ok(());
        }
        Ok(Command::Run(a)) => a,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run '{} --help' for usage.", binary_name);
            std::process::exit(2);
        }
    };

    let level = if cli_args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    run(cli_args)
}

fn run(args: CliArgs) -> Result<()> {
    let ctx = StandardContext::new(args.override_root.clone());
    let config = Config::load_or_default(&ctx)?;
    let text = document::load_text(&args.input)
        .with_context(|| format!("Could not read {}", args.input.display()))?;

    let events = match args.mode {
        Mode::Extract => generic_events(&text, &config, &args),
        Mode::Syllabus => {
            let assessments = StructuredExtractor::new(&config).extract(&text);
            if assessments.is_empty() {
                log::info!("No structured assessments found, falling back to date extraction");
                generic_events(&text, &config, &args)
            } else {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&assessments)?);
                } else {
                    println!("Found {} assessments:", assessments.len());
                    for a in &assessments {
                        println!("  {}  {:<32} {}", a.date, a.title, a.time);
                    }
                }
                let default_time = config.event_time();
                assessments
                    .iter()
                    .filter_map(|a| assessment_to_event(a, default_time))
                    .collect()
            }
        }
    };

    if args.dry_run {
        return Ok(());
    }
    if events.is_empty() {
        println!("Nothing to write.");
        return Ok(());
    }

    let mut emitter = CalendarEmitter::from_config(&config, &ctx)?;
    if let Some(dir) = args.output {
        emitter = emitter.with_output_dir(dir);
    }
    let written = emitter.emit_all(&events);
    println!(
        "Wrote {} of {} calendar files to {}",
        written.len(),
        events.len(),
        emitter.output_dir().display()
    );
    Ok(())
}

fn generic_events(text: &str, config: &Config, args: &CliArgs) -> Vec<CalendarEvent> {
    let min = args.min_confidence.unwrap_or(config.min_confidence);
    let candidates = DateExtractor::new(config).extract_events(text);
    let total = candidates.len();
    let kept = filter_by_confidence(candidates, min);

    println!(
        "Found {} dates, {} with confidence >= {:.2}:",
        total,
        kept.len(),
        min
    );
    for c in &kept {
        println!(
            "  [{:.2}] {}  {:<24} {}",
            c.confidence, c.formatted_date, c.date_str, c.title
        );
    }
    kept.iter().map(|c| c.to_calendar_event()).collect()
}
