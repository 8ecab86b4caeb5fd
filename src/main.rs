use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::env;
use uuid::Uuid;

use plate_catalog::{
    logging, seed_defaults, setup_database, CatalogConfig, PlateService, PlateTransfer,
    SqlitePlateStore,
};

const USAGE: &str = "usage: plate-catalog <init | list [page] [size] [asc|desc] | markup | sell <id>>";

fn main() -> Result<()> {
    logging::init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = CatalogConfig::from_env()?;

    match args.first().map(String::as_str) {
        Some("init") => run_init(&config),
        Some("list") => run_list(&config, &args[1..]),
        Some("markup") => run_markup(&config),
        Some("sell") => run_sell(&config, args.get(1)),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn open_service(config: &CatalogConfig) -> Result<PlateService<SqlitePlateStore>> {
    let conn = Connection::open(&config.database_path)
        .with_context(|| format!("failed to open database {:?}", config.database_path))?;
    let store = SqlitePlateStore::new(conn)?;
    Ok(PlateService::new(store))
}

fn run_init(config: &CatalogConfig) -> Result<()> {
    println!("🗄️  Plate Catalog - database setup");

    let conn = Connection::open(&config.database_path)?;
    setup_database(&conn)?;
    println!("✓ Schema ready at {:?}", config.database_path);

    let seeded = seed_defaults(&conn)?;
    println!("✓ Seeded {} default plates", seeded);

    Ok(())
}

fn run_list(config: &CatalogConfig, args: &[String]) -> Result<()> {
    let page: u32 = match args.first() {
        Some(s) => s.parse().context("page must be a positive number")?,
        None => 1,
    };
    let size: u32 = match args.get(1) {
        Some(s) => s.parse().context("size must be a positive number")?,
        None => 10,
    };
    let sort = args.get(2).map(String::as_str);

    let service = open_service(config)?;
    let plates = service.list(page, size, sort, None, None)?;

    print_plates(&plates);
    Ok(())
}

fn run_markup(config: &CatalogConfig) -> Result<()> {
    let service = open_service(config)?;
    let plates = service.apply_markup()?;

    println!("✓ Markup applied to {} plates", plates.len());
    print_plates(&plates);
    Ok(())
}

fn run_sell(config: &CatalogConfig, id: Option<&String>) -> Result<()> {
    let Some(id) = id else {
        bail!("{}", USAGE);
    };
    let id = Uuid::parse_str(id).context("invalid plate id")?;

    let service = open_service(config)?;
    if service.mark_as_sold(id)? {
        println!("✓ Plate {} marked as sold", id);
    } else {
        println!("❌ Plate {} not found", id);
    }

    Ok(())
}

fn print_plates(plates: &[PlateTransfer]) {
    for plate in plates {
        println!(
            "{:<20} {:>12} {:>12} {}",
            plate.registration,
            plate.purchase_price,
            plate.sale_price,
            if plate.is_for_sale { "for sale" } else { "sold" }
        );
    }
}
