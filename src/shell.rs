//! Interactive terminal session
//!
//! A line-oriented loop that owns one [`TripSession`]: `route` looks up a
//! trip and remembers it, `fare` prices the remembered trip. Errors are
//! printed and the loop carries on.

use std::io::{self, BufRead, Lines, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::FareError;
use crate::fare::{ChargeSource, FareEstimator};
use crate::geocoding::Geocoder;
use crate::map::RouteMap;
use crate::models::{Passengers, PaymentMethod, TripDetails, Vendor};
use crate::planner::TripPlanner;
use crate::routing::RouteProvider;
use crate::session::TripSession;

pub const DEFAULT_START: &str = "Thane";
pub const DEFAULT_DESTINATION: &str = "Kharghar Railway Station";

const HELP: &str = "Commands:
  route   find a route between two places
  fare    predict the fare for the last route found
  status  show the route remembered in this session
  help    show this message
  quit    leave the session";

struct Console<I, O> {
    lines: Lines<I>,
    out: O,
}

impl<I: BufRead, O: Write> Console<I, O> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next().transpose()
    }

    /// Prompt with a default shown in brackets; blank input takes the default
    fn ask(&mut self, prompt: &str, default: &str) -> io::Result<Option<String>> {
        if default.is_empty() {
            write!(self.out, "{prompt}: ")?;
        } else {
            write!(self.out, "{prompt} [{default}]: ")?;
        }
        self.out.flush()?;

        Ok(self.read_line()?.map(|line| {
            let line = line.trim();
            if line.is_empty() {
                default.to_string()
            } else {
                line.to_string()
            }
        }))
    }
}

pub struct Shell<'a, G, R, C> {
    planner: &'a TripPlanner<G, R>,
    estimator: &'a FareEstimator,
    charges: C,
    session: TripSession,
    map_path: Option<PathBuf>,
}

impl<'a, G: Geocoder, R: RouteProvider, C: ChargeSource> Shell<'a, G, R, C> {
    pub fn new(planner: &'a TripPlanner<G, R>, estimator: &'a FareEstimator, charges: C) -> Self {
        Self {
            planner,
            estimator,
            charges,
            session: TripSession::new(),
            map_path: None,
        }
    }

    /// Write the GeoJSON map of every route found to `path`
    #[must_use]
    pub fn with_map_output(mut self, path: PathBuf) -> Self {
        self.map_path = Some(path);
        self
    }

    #[must_use]
    pub fn session(&self) -> &TripSession {
        &self.session
    }

    pub async fn run<I: BufRead, O: Write>(&mut self, input: I, out: O) -> io::Result<()> {
        let mut console = Console {
            lines: input.lines(),
            out,
        };

        writeln!(console.out, "Cab Fare Prediction. Type 'help' for commands.")?;
        loop {
            write!(console.out, "> ")?;
            console.out.flush()?;

            let Some(line) = console.read_line()? else {
                break;
            };
            match line.trim() {
                "" => continue,
                "route" => self.route(&mut console).await?,
                "fare" => self.fare(&mut console)?,
                "status" => self.status(&mut console.out)?,
                "help" => writeln!(console.out, "{HELP}")?,
                "quit" | "exit" => break,
                other => writeln!(
                    console.out,
                    "Unknown command '{other}'. Type 'help' for commands."
                )?,
            }
        }
        Ok(())
    }

    async fn route<I: BufRead, O: Write>(&mut self, console: &mut Console<I, O>) -> io::Result<()> {
        let Some(start) = console.ask("Enter Start Location", DEFAULT_START)? else {
            return Ok(());
        };
        let Some(end) = console.ask("Enter Destination Location", DEFAULT_DESTINATION)? else {
            return Ok(());
        };
        let Some(depart_at) =
            console.ask("Enter Departure Time (YYYY-MM-DDTHH:MM:SS) (Optional)", "")?
        else {
            return Ok(());
        };

        let depart_at = Some(depart_at.as_str()).filter(|d| !d.is_empty());
        let planned = match self
            .planner
            .find_route(&mut self.session, &start, &end, depart_at)
            .await
        {
            Ok(planned) => planned,
            Err(e) => return report(&mut console.out, &e),
        };

        let out = &mut console.out;
        writeln!(out, "Start: {} ({})", planned.start.label(), planned.start.coordinate)?;
        writeln!(out, "Destination: {} ({})", planned.end.label(), planned.end.coordinate)?;
        writeln!(out, "Distance: {} km", planned.summary.distance_km)?;
        writeln!(out, "Estimated Time: {} mins", planned.summary.duration_min)?;

        if let Some(path) = &self.map_path {
            match RouteMap::new(&planned).write_to(path) {
                Ok(()) => writeln!(out, "Map written to {}", path.display())?,
                Err(e) => report(out, &e)?,
            }
        }
        Ok(())
    }

    fn fare<I: BufRead, O: Write>(&mut self, console: &mut Console<I, O>) -> io::Result<()> {
        let Some(route) = self.session.current() else {
            return report(&mut console.out, &FareError::NoRoute);
        };
        writeln!(console.out, "Trip Distance: {} km", route.distance_km)?;
        writeln!(console.out, "Trip Duration: {} mins", route.duration_min)?;

        let Some(details) = read_trip_details(console)? else {
            return Ok(());
        };
        let details = match details {
            Ok(details) => details,
            Err(e) => return report(&mut console.out, &e),
        };

        let charge = self.charges.draw();
        writeln!(console.out, "Extra Charges: {charge}")?;
        debug!("Predicting fare for {:?} with charge {:?}", details, charge);

        match self.estimator.estimate(&self.session, &details, charge) {
            Ok(estimate) => {
                writeln!(console.out, "Model Input Data:\n{}", estimate.features.table())?;
                writeln!(console.out, "Estimated Fare: {estimate}")
            }
            Err(e) => report(&mut console.out, &e),
        }
    }

    fn status<O: Write>(&self, out: &mut O) -> io::Result<()> {
        match self.session.current() {
            Some(route) => writeln!(
                out,
                "Route available: {} km, {} mins",
                route.distance_km, route.duration_min
            ),
            None => writeln!(out, "No route yet. Use 'route' first."),
        }
    }
}

/// Outer `None` means input ended; inner `Err` is a rejected answer
fn read_trip_details<I: BufRead, O: Write>(
    console: &mut Console<I, O>,
) -> io::Result<Option<Result<TripDetails, FareError>>> {
    let Some(vendor) = console.ask("Cab Provider (1=OLA, 2=UBER)", "1")? else {
        return Ok(None);
    };
    let Some(passengers) = console.ask("Passengers (1-6)", "1")? else {
        return Ok(None);
    };
    let Some(payment) = console.ask("Payment Method (1=Cash, 2=Card, 3=Other)", "1")? else {
        return Ok(None);
    };

    Ok(Some(parse_trip_details(&vendor, &passengers, &payment)))
}

fn parse_trip_details(vendor: &str, passengers: &str, payment: &str) -> crate::Result<TripDetails> {
    Ok(TripDetails {
        vendor: vendor.parse::<Vendor>()?,
        passengers: passengers.parse::<Passengers>()?,
        payment: payment.parse::<PaymentMethod>()?,
    })
}

fn report<O: Write>(out: &mut O, error: &FareError) -> io::Result<()> {
    debug!("Action failed: {}", error);
    writeln!(out, "Error: {}", error.user_message())
}
