//! # Seed Data Generator
//!
//! Populates the database with demo data for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p fonda-db --bin seed
//!
//! # Specify database path
//! cargo run -p fonda-db --bin seed -- --db ./data/fonda.db
//! ```
//!
//! ## Generated Data
//! - Staff: one admin, cashier, waiter, and cook
//! - 8 dining tables
//! - Pantry products with opening stock (entered through the ledger)
//! - Dishes with complete recipes
//!
//! Finishes by verifying ledger consistency for every product.

use std::env;

use fonda_core::Role;
use fonda_db::{Database, DbConfig, InitialStock};

/// Pantry products: (name, unit, opening qty, opening unit cost).
const PRODUCTS: &[(&str, &str, f64, f64)] = &[
    ("Tomate", "kg", 12.0, 28.50),
    ("Cebolla", "kg", 8.0, 19.00),
    ("Arroz", "kg", 25.0, 22.00),
    ("Frijol negro", "kg", 15.0, 34.00),
    ("Pollo", "kg", 18.0, 78.00),
    ("Carne de res", "kg", 10.0, 145.00),
    ("Queso fresco", "kg", 4.0, 96.00),
    ("Tortillas", "kg", 6.0, 18.00),
    ("Aceite", "lt", 10.0, 42.00),
    ("Crema", "lt", 3.0, 55.00),
    ("Refresco cola", "unit", 48.0, 12.50),
    ("Agua embotellada", "unit", 60.0, 7.00),
];

/// Dishes: (name, price, recipe as (product name, qty per unit)).
const DISHES: &[(&str, f64, &[(&str, f64)])] = &[
    (
        "Tacos de pollo",
        85.0,
        &[("Pollo", 0.15), ("Tortillas", 0.12), ("Cebolla", 0.03)],
    ),
    (
        "Arroz con frijol",
        55.0,
        &[("Arroz", 0.2), ("Frijol negro", 0.15), ("Aceite", 0.02)],
    ),
    (
        "Bistec con arroz",
        140.0,
        &[("Carne de res", 0.25), ("Arroz", 0.15), ("Tomate", 0.05)],
    ),
    (
        "Quesadillas",
        70.0,
        &[("Queso fresco", 0.1), ("Tortillas", 0.1), ("Crema", 0.03)],
    ),
    ("Refresco", 20.0, &[("Refresco cola", 1.0)]),
    ("Agua", 12.0, &[("Agua embotellada", 1.0)]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./fonda_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Fonda POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./fonda_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Fonda POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Refuse to double-seed
    let existing = db.products().list(true).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Staff
    println!();
    println!("Creating staff...");
    for (username, role) in [
        ("admin", Role::Admin),
        ("caja1", Role::Cashier),
        ("mesero1", Role::Waiter),
        ("cocina1", Role::Kitchen),
    ] {
        db.staff().create(username, role).await?;
        println!("  {} ({:?})", username, role);
    }

    // Tables
    println!();
    println!("Creating tables...");
    for number in 1..=8 {
        db.catalog().create_table(number).await?;
    }
    println!("  8 tables created");

    // Products with opening stock through the ledger
    println!();
    println!("Creating products...");
    let start = std::time::Instant::now();
    for (name, unit, quantity, unit_cost) in PRODUCTS {
        let product = db
            .catalog()
            .create_product(
                name,
                unit,
                Some(InitialStock {
                    quantity: *quantity,
                    unit_cost: *unit_cost,
                }),
            )
            .await?;
        println!(
            "  {:<20} {:>8.3} {} @ {:.2}",
            product.name, product.stock, unit, product.avg_cost
        );
    }

    // Dishes with recipes
    println!();
    println!("Creating dishes...");
    let products = db.products().list(false).await?;
    let product_id = |name: &str| {
        products
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id.clone())
            .ok_or_else(|| format!("seed product missing: {}", name))
    };

    for (name, price, recipe) in DISHES {
        let ingredients: Vec<(String, f64)> = recipe
            .iter()
            .map(|(product_name, qty)| Ok((product_id(product_name)?, *qty)))
            .collect::<Result<_, String>>()?;

        db.catalog().create_dish(name, *price, &ingredients).await?;
        println!("  {:<20} ${:>7.2} ({} ingredients)", name, price, recipe.len());
    }

    // Ledger consistency check over everything just written
    println!();
    println!("Verifying ledger consistency...");
    for product in &products {
        db.inventory().assert_consistency(&product.id).await?;
    }
    println!("  {} products consistent", products.len());

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}
