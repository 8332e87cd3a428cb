//! # Seed Data Generator
//!
//! Populates a database with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./data/stockroom.db
//! cargo run -p stockroom-db --bin seed
//!
//! # Specify database path, also record a few demo movements
//! cargo run -p stockroom-db --bin seed -- --db ./dev.db --movements
//! ```
//!
//! ## Generated Data
//! - Categories and suppliers (upserted, safe to re-run)
//! - One product per catalog entry below, with random starting stock
//! - An `admin` account (password `admin123`)
//! - Optionally, an inbound and an outbound movement

use std::env;

use rand::Rng;
use stockroom_core::{
    Category, LineItem, MovementType, NewProduct, NewStockMovement, NewUser, Supplier,
    UserIdentity,
};
use stockroom_db::{Database, DbConfig};

const CATEGORIES: &[(&str, &str)] = &[
    ("C001", "Makanan"),
    ("C002", "Minuman"),
    ("C003", "Kebutuhan Rumah Tangga"),
    ("C004", "Alat Tulis"),
    ("C005", "Lainnya"),
];

const SUPPLIERS: &[(&str, &str, &str, &str)] = &[
    ("S001", "PT Sumber Makmur", "021-5550101", "Jakarta"),
    ("S002", "CV Berkah Jaya", "022-5550202", "Bandung"),
    ("S003", "UD Sinar Abadi", "031-5550303", "Surabaya"),
    ("S004", "PT Segar Sentosa", "024-5550404", "Semarang"),
];

/// (name, category, supplier, description, unit price)
const PRODUCTS: &[(&str, &str, &str, &str, i64)] = &[
    ("Beras Premium 5kg", "C001", "S001", "Beras pulen kemasan 5kg", 72_000),
    ("Gula Pasir 1kg", "C001", "S001", "Gula kristal putih", 15_500),
    ("Minyak Goreng 2L", "C001", "S002", "Minyak sawit kemasan pouch", 34_000),
    ("Mie Instan Goreng", "C001", "S003", "Isi 1 bungkus", 3_500),
    ("Kopi Bubuk 200g", "C002", "S004", "Kopi robusta", 18_000),
    ("Teh Celup isi 25", "C002", "S004", "Teh melati", 7_500),
    ("Air Mineral 600ml", "C002", "S002", "Botol plastik", 3_000),
    ("Sabun Cuci Piring 750ml", "C003", "S003", "Aroma jeruk nipis", 14_000),
    ("Deterjen Bubuk 800g", "C003", "S003", "", 21_000),
    ("Pulpen Hitam", "C004", "S001", "Tinta gel 0.5mm", 4_000),
    ("Buku Tulis 38 Lembar", "C004", "S001", "", 5_000),
    ("Baterai AA isi 2", "C005", "S002", "Alkaline", 12_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./data/stockroom.db");
    let mut with_movements = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--movements" | "-m" => with_movements = true,
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./data/stockroom.db)");
                println!("  -m, --movements    Also record demo stock movements");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    println!("Stockroom Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let catalog = db.catalog();
    for (id, name) in CATEGORIES {
        catalog
            .upsert_category(&Category {
                id: id.to_string(),
                name: name.to_string(),
            })
            .await?;
    }
    for (id, name, contact, address) in SUPPLIERS {
        catalog
            .upsert_supplier(&Supplier {
                id: id.to_string(),
                name: name.to_string(),
                contact: Some(contact.to_string()),
                address: Some(address.to_string()),
            })
            .await?;
    }
    println!(
        "✓ {} categories, {} suppliers",
        CATEGORIES.len(),
        SUPPLIERS.len()
    );

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping products to avoid duplicates.");
    } else {
        for (name, category, supplier, description, price) in PRODUCTS {
            let stock = rand::thread_rng().gen_range(0..60);
            let product = db
                .products()
                .create(NewProduct {
                    name: name.to_string(),
                    category_id: Some(category.to_string()),
                    supplier_id: Some(supplier.to_string()),
                    description: description.to_string(),
                    unit_price: *price,
                    stock,
                    photo: None,
                })
                .await?;
            println!("  + {} {} (stock {})", product.id, product.name, product.stock);
        }
        println!("✓ Generated {} products", PRODUCTS.len());
    }

    let admin = match db.users().find_by_login("admin").await? {
        Some(user) => user.summary(),
        None => {
            let user = db
                .users()
                .register(NewUser {
                    username: "admin".to_string(),
                    email: "admin@stockroom.local".to_string(),
                    password: "admin123".to_string(),
                })
                .await?;
            println!("✓ Created user admin / admin123 ({})", user.id);
            user
        }
    };

    if with_movements {
        let identity = UserIdentity {
            username: Some(admin.username.clone()),
            user_id: None,
        };

        let mut inbound = NewStockMovement::new(
            MovementType::In,
            vec![LineItem::new("P001", 20), LineItem::new("P002", 30)],
        );
        inbound.supplier_id = Some("S001".to_string());
        inbound.note = Some("Stok awal".to_string());
        inbound.user = identity.clone();
        let recorded = db.recorder().record(inbound).await?;
        println!("✓ Recorded {} ({} units in)", recorded.id, recorded.total_quantity);

        let mut outbound = NewStockMovement::new(MovementType::Out, vec![LineItem::new("P001", 5)]);
        outbound.note = Some("Penjualan".to_string());
        outbound.user = identity;
        let recorded = db.recorder().record(outbound).await?;
        println!("✓ Recorded {} ({} units out)", recorded.id, recorded.total_quantity);
    }

    db.close().await;
    println!();
    println!("Done.");
    Ok(())
}
