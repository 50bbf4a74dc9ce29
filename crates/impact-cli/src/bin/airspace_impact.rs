use anyhow::Result;
use clap::{Parser, Subcommand};
use impact_cli::{decode, render, ImpactClient};
use impact_core::{
    Airport, FeatureCollection, HeatmapProperties, Period, RouteComparison, StatsSummary,
    ZoneProperties,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Query route impact data from the airspace impact server")]
struct Args {
    /// Impact server URL
    #[arg(long, env = "IMPACT_URL", default_value = "http://localhost:3000")]
    url: String,

    /// Print the raw JSON response
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare a route before and during the conflict
    Compare { origin: String, destination: String },
    /// Fleet statistics for a period
    Stats {
        #[arg(long, default_value = "baseline")]
        period: Period,
    },
    /// Congestion heatmap summary
    Heatmap {
        #[arg(long, default_value = "during")]
        period: Period,
    },
    /// Conflict zones active in a period
    Conflicts {
        #[arg(long, default_value = "during")]
        period: Period,
    },
    /// List airports, or show one
    Airports { iata: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = ImpactClient::new(args.url);

    let (raw, text) = match args.command {
        Command::Compare { origin, destination } => {
            let raw = client.compare(&origin, &destination).await?;
            let cmp: RouteComparison = decode(raw.clone())?;
            let text = render::comparison(&origin, &destination, &cmp);
            (raw, text)
        }
        Command::Stats { period } => {
            let raw = client.stats(period).await?;
            let summary: StatsSummary = decode(raw.clone())?;
            (raw, render::stats(period, &summary))
        }
        Command::Heatmap { period } => {
            let raw = client.heatmap(period).await?;
            let layer: FeatureCollection<HeatmapProperties> = decode(raw.clone())?;
            let text = render::heatmap(period, &layer);
            (raw, text)
        }
        Command::Conflicts { period } => {
            let raw = client.conflicts(period).await?;
            let zones: FeatureCollection<ZoneProperties> = decode(raw.clone())?;
            let text = render::conflicts(period, &zones);
            (raw, text)
        }
        Command::Airports { iata: Some(iata) } => {
            let raw = client.airport(&iata).await?;
            let airport: Airport = decode(raw.clone())?;
            (raw, render::airports(std::slice::from_ref(&airport)))
        }
        Command::Airports { iata: None } => {
            let raw = client.airports().await?;
            let airports: Vec<Airport> = decode(raw.clone())?;
            (raw, render::airports(&airports))
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&raw)?);
    } else {
        print!("{}", text);
    }
    Ok(())
}
