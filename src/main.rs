use anyhow::Result;
use clap::Parser;
use gridmdp::config::{Args, OutputFormat};
use gridmdp::report::RunReport;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.resolve()?;

    let reports = config
        .rewards
        .iter()
        .map(|&r| RunReport::solve(r, &config))
        .collect::<gridmdp::Result<Vec<_>>>()?;

    match args.format {
        OutputFormat::Text => {
            for report in &reports {
                println!("---------------------------------------");
                println!("{}", report.render());
            }
            println!("---------------------------------------");
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    Ok(())
}
