use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use subwaymap_lib::{ApiClient, Error as LibError, StopPath, SubwayNetwork, DEFAULT_API_URL};

#[derive(Parser, Debug)]
#[command(author, version, about = "Subway network routing utilities")]
struct Cli {
    /// Base URL of the transit API.
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Emit machine-readable JSON instead of text where supported.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the long names of all subway routes.
    Routes,
    /// Summarize the network: stop-count extremes, transfer stops, size.
    Stats,
    /// Compute the shortest path between two stops (partial names accepted).
    Path {
        /// Starting stop name.
        #[arg(long = "from")]
        from: String,
        /// Destination stop name.
        #[arg(long = "to")]
        to: String,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let network = load_network(&cli.api_url)?;

    match cli.command {
        Command::Routes => handle_routes(&network),
        Command::Stats => handle_stats(&network),
        Command::Path { from, to } => handle_path(&network, &from, &to, cli.json),
    }
}

fn load_network(api_url: &str) -> Result<SubwayNetwork> {
    let client =
        ApiClient::new(api_url).context("failed to configure the transit API client")?;
    let network =
        SubwayNetwork::fetch(&client).context("failed to fetch subway routes and stops")?;
    info!(
        vertices = network.graph().num_vertices(),
        edges = network.graph().num_edges(),
        "loaded subway network"
    );
    Ok(network)
}

fn handle_routes(network: &SubwayNetwork) -> Result<()> {
    for name in network.route_long_names() {
        println!("{name}");
    }
    Ok(())
}

fn handle_stats(network: &SubwayNetwork) -> Result<()> {
    println!("Route(s) with the fewest stops:");
    for route in network.routes_with_fewest_stops() {
        println!("  {} ({} stops)", route.long_name, route.num_stops());
    }

    println!("Route(s) with the most stops:");
    for route in network.routes_with_most_stops() {
        println!("  {} ({} stops)", route.long_name, route.num_stops());
    }

    println!("Transfer stops (two or more connecting routes):");
    for stop in network.transfer_stops() {
        let names: Vec<&str> = stop
            .connects_to
            .iter()
            .map(|route_id| {
                network
                    .routes()
                    .iter()
                    .find(|route| &route.id == route_id)
                    .map(|route| route.long_name.as_str())
                    .unwrap_or(route_id.as_str())
            })
            .collect();
        println!("  {} [{}]", stop.name, names.join(", "));
    }

    println!("Vertices |V| = {}", network.graph().num_vertices());
    println!("Edges |E| = {}", network.graph().num_edges());
    Ok(())
}

fn handle_path(network: &SubwayNetwork, from: &str, to: &str, json: bool) -> Result<()> {
    match network.shortest_route(from, to) {
        Ok(path) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&path)?);
            } else {
                print_path(&path);
            }
            Ok(())
        }
        // An unreachable goal is an expected outcome, not a failure.
        Err(err @ LibError::PathNotFound { .. }) => {
            println!("{err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn print_path(path: &StopPath) {
    println!("Found path ({} hops):", path.hop_count());
    for step in &path.steps {
        println!("-> {} [{}]", step.name, step.routes.join(", "));
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
