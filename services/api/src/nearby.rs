use clap::Args;
use sos_dispatch::config::AppConfig;
use sos_dispatch::dispatch::{
    parse_query_coordinates, rank_services, DispatchError, EmergencyService, EmergencyStore,
    MemoryStore, RankedService, ServiceCsvImporter, DEFAULT_NEARBY_LIMIT,
};
use sos_dispatch::error::AppError;
use sos_dispatch::geo::Coordinates;
use sos_dispatch::overpass::{GeodataSource, OverpassClient};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct NearbyArgs {
    /// Latitude of the caller in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lat: String,
    /// Longitude of the caller in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lon: String,
    /// Number of services to list
    #[arg(long, default_value_t = DEFAULT_NEARBY_LIMIT)]
    pub(crate) limit: usize,
    /// Rank services from a CSV export instead of the demo data
    #[arg(long, conflicts_with = "live")]
    pub(crate) services_csv: Option<PathBuf>,
    /// Query OpenStreetMap through the configured Overpass endpoint
    #[arg(long)]
    pub(crate) live: bool,
    /// Override the configured search radius in meters (live lookups only)
    #[arg(long)]
    pub(crate) radius: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServiceSource {
    Demo,
    Csv,
    Overpass,
}

impl ServiceSource {
    fn label(self) -> &'static str {
        match self {
            ServiceSource::Demo => "demo data",
            ServiceSource::Csv => "CSV import",
            ServiceSource::Overpass => "OpenStreetMap (Overpass)",
        }
    }
}

pub(crate) async fn run_nearby(args: NearbyArgs) -> Result<(), AppError> {
    let origin = parse_query_coordinates(Some(&args.lat), Some(&args.lon))
        .map_err(DispatchError::from)?;
    let (services, source) = load_services(&args, origin).await?;
    let ranked = rank_services(&services, Some(origin), args.limit);
    render_ranking(origin, source, services.len(), &ranked);
    Ok(())
}

async fn load_services(
    args: &NearbyArgs,
    origin: Coordinates,
) -> Result<(Vec<EmergencyService>, ServiceSource), AppError> {
    if args.live {
        let config = AppConfig::load()?;
        let radius = args.radius.unwrap_or(config.overpass.radius_meters);
        let client = OverpassClient::new(&config.overpass)?;
        let services = client.nearby_services(origin, radius).await?;
        return Ok((services, ServiceSource::Overpass));
    }

    if let Some(path) = &args.services_csv {
        let services = ServiceCsvImporter::from_path(path)?;
        return Ok((services, ServiceSource::Csv));
    }

    let store = MemoryStore::seeded().map_err(DispatchError::from)?;
    let services = store.services().map_err(DispatchError::from)?;
    Ok((services, ServiceSource::Demo))
}

fn render_ranking(
    origin: Coordinates,
    source: ServiceSource,
    considered: usize,
    ranked: &[RankedService],
) {
    println!(
        "Nearest emergency services to {:.5}, {:.5}",
        origin.latitude, origin.longitude
    );
    println!(
        "Source: {} ({} candidates considered)",
        source.label(),
        considered
    );

    if ranked.is_empty() {
        println!("\nNo services found");
        return;
    }

    println!();
    for (index, entry) in ranked.iter().enumerate() {
        let service = &entry.service;
        println!(
            "{:>2}. {} [{}] {:.2} mi",
            index + 1,
            service.name,
            service.kind.label(),
            entry.distance
        );
        println!("    {} | {}", service.address, service.phone);
    }
}
