use anyhow::Result;
use clap::CommandFactory;
use log::{error, info, LevelFilter};
use std::process;
use whoxyfinder::{Args, Seed, WhoxyFinderEngine};

const BANNER: &str = r#"
 _       ____                      _______           __
| |     / / /_  ____  _  ____  __/ ____(_)___  ____/ /__  _____
| | /| / / __ \/ __ \| |/_/ / / / /_  / / __ \/ __  / _ \/ ___/
| |/ |/ / / / / /_/ />  </ /_/ / __/ / / / / / /_/ /  __/ /
|__/|__/_/ /_/\____/_/|_|\__, /_/   /_/_/ /_/\__,_/\___/_/
                        /____/
        Reverse WHOIS discovery, verified
"#;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_env();

    let level = if args.quiet {
        LevelFilter::Error
    } else if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if args.has_no_seed() {
        error!("Please provide arguments or -h for help");
        eprintln!("{}", Args::command().render_usage());
        process::exit(1);
    }

    let seed = match args.seed() {
        Ok(seed) => seed,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    if !args.quiet && !matches!(seed, Seed::Inspect { .. }) {
        eprintln!("{}", BANNER);
    }

    dotenv::dotenv().ok();

    let engine = WhoxyFinderEngine::new(&args)?;

    match engine.run(&seed).await {
        Ok(Some(report)) => {
            info!(
                "Finished in {:.2}s: {} candidates, {} verified",
                report.duration.as_secs_f64(),
                report.candidates,
                report.verified_count
            );
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
