use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use cabfare::api::AppState;
use cabfare::fare::{ChargeSource, FareEstimator, RandomCharge};
use cabfare::map::RouteMap;
use cabfare::models::{ImprovementCharge, Passengers, PaymentMethod, TripDetails, Vendor};
use cabfare::shell::Shell;
use cabfare::{
    CabFareConfig, FareError, NominatimGeocoder, TomTomRouter, TripPlanner, TripSession, telemetry,
    web,
};
use clap::{Parser, Subcommand};
use tracing::debug;

/// Route lookup and cab fare prediction
///
/// Examples:
///   cabfare route Thane "Kharghar Railway Station"
///   cabfare estimate Thane Kharghar --vendor uber --passengers 2
///   cabfare shell
///   cabfare serve --port 8080
#[derive(Parser)]
#[command(name = "cabfare", version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults to the user config dir, then ./config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of configuration
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find the driving route between two places
    Route {
        start: String,
        end: String,
        /// Departure time, e.g. 2025-03-01T08:30:00
        #[arg(long)]
        depart_at: Option<String>,
        /// Write the route map as GeoJSON
        #[arg(long)]
        map: Option<PathBuf>,
    },

    /// Find a route and predict its fare in one go
    Estimate {
        start: String,
        end: String,
        #[arg(long)]
        depart_at: Option<String>,
        /// Cab provider: ola or uber
        #[arg(long, default_value = "ola")]
        vendor: Vendor,
        /// Number of passengers (1-6)
        #[arg(long, default_value = "1")]
        passengers: Passengers,
        /// Payment method: cash, card or other
        #[arg(long, default_value = "cash")]
        payment: PaymentMethod,
        /// Improvement charge (0, 0.5 or 1). Drawn at random when omitted
        #[arg(long)]
        improvement_charge: Option<ImprovementCharge>,
    },

    /// Interactive session: find routes and price them
    Shell {
        /// Write the map of each route found as GeoJSON
        #[arg(long)]
        map: Option<PathBuf>,
    },

    /// Serve the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<FareError>() {
                Some(fare_error) => eprintln!("Error: {}", fare_error.user_message()),
                None => eprintln!("Error: {e:#}"),
            }
            debug!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = CabFareConfig::load_from_path(cli.config)?;
    telemetry::init(&config.logging, cli.verbose)?;
    debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Command::Route {
            start,
            end,
            depart_at,
            map,
        } => {
            let planner = planner(&config)?;
            let planned = planner
                .plan_route(&start, &end, depart_at.as_deref())
                .await?;

            println!("Start: {} ({})", planned.start.label(), planned.start.coordinate);
            println!("Destination: {} ({})", planned.end.label(), planned.end.coordinate);
            println!("Distance: {} km", planned.summary.distance_km);
            println!("Estimated Time: {} mins", planned.summary.duration_min);

            if let Some(path) = map {
                RouteMap::new(&planned).write_to(&path)?;
                println!("Map written to {}", path.display());
            }
        }
        Command::Estimate {
            start,
            end,
            depart_at,
            vendor,
            passengers,
            payment,
            improvement_charge,
        } => {
            let planner = planner(&config)?;
            let estimator = FareEstimator::from_config(&config.model);
            let mut session = TripSession::new();

            let planned = planner
                .find_route(&mut session, &start, &end, depart_at.as_deref())
                .await?;
            println!("Distance: {} km", planned.summary.distance_km);
            println!("Estimated Time: {} mins", planned.summary.duration_min);

            let details = TripDetails {
                vendor,
                passengers,
                payment,
            };
            let charge = improvement_charge.unwrap_or_else(|| RandomCharge.draw());
            println!("Extra Charges: {charge}");

            let estimate = estimator.estimate(&session, &details, charge)?;
            println!("Model Input Data:\n{}", estimate.features.table());
            println!("Estimated Fare: {estimate}");
        }
        Command::Shell { map } => {
            let planner = planner(&config)?;
            let estimator = FareEstimator::from_config(&config.model);

            let mut shell = Shell::new(&planner, &estimator, RandomCharge);
            if let Some(path) = map {
                shell = shell.with_map_output(path);
            }
            shell.run(io::stdin().lock(), io::stdout().lock()).await?;
        }
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            web::run(AppState::from_config(&config)?, &host, port).await?;
        }
    }

    Ok(())
}

fn planner(config: &CabFareConfig) -> cabfare::Result<TripPlanner<NominatimGeocoder, TomTomRouter>> {
    Ok(TripPlanner::new(
        NominatimGeocoder::new(&config.geocoding)?,
        TomTomRouter::new(&config.routing)?,
    ))
}
