//! Seed script for development — populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` and `JWT_SECRET` environment variables (reads .env).

use sqlx::PgPool;
use uuid::Uuid;

const ADMIN_PASSWORD: &str = "Admin123!";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Run migrations first
    sqlx::migrate!("./migrations").run(&pool).await?;

    println!("=== stockdesk Seed Script ===");

    seed_employees(&pool).await?;
    seed_suppliers(&pool).await?;
    seed_warehouses(&pool).await?;
    seed_customers(&pool).await?;
    seed_products(&pool).await?;
    seed_goods_receipts(&pool).await?;

    println!("\n=== Seed complete! ===");
    println!("Admin login: admin / {ADMIN_PASSWORD}");

    Ok(())
}

async fn seed_employees(pool: &PgPool) -> anyhow::Result<()> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM employees WHERE username = 'admin')")
            .fetch_one(pool)
            .await?;

    let hash = stockdesk::services::auth::hash_password(ADMIN_PASSWORD)?;

    if exists {
        // Update password for existing admin account
        sqlx::query("UPDATE employees SET password_hash = $1 WHERE username = 'admin'")
            .bind(&hash)
            .execute(pool)
            .await?;
        println!("[done] Updated admin password");
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO employees (username, email, password_hash, full_name, role)
         VALUES ('admin', 'admin@stockdesk.local', $1, 'Store Administrator', 'Admin')",
    )
    .bind(&hash)
    .execute(pool)
    .await?;

    // Also create manager and staff accounts for testing the role guards
    let manager_hash = stockdesk::services::auth::hash_password("Manager123!")?;
    sqlx::query(
        "INSERT INTO employees (username, email, password_hash, full_name, role)
         VALUES ('manager', 'manager@stockdesk.local', $1, 'Floor Manager', 'Manager')",
    )
    .bind(&manager_hash)
    .execute(pool)
    .await?;

    let staff_hash = stockdesk::services::auth::hash_password("Staff123!")?;
    sqlx::query(
        "INSERT INTO employees (username, email, password_hash, full_name, role)
         VALUES ('staff', 'staff@stockdesk.local', $1, 'Sales Assistant', 'Staff')",
    )
    .bind(&staff_hash)
    .execute(pool)
    .await?;

    println!("[done] Created admin, manager, and staff accounts");
    Ok(())
}

async fn seed_suppliers(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Suppliers already exist ({count})");
        return Ok(());
    }

    let suppliers = vec![
        ("Nordic Roasters AB", "Elin Berg", "orders@nordicroasters.example", "+46 8 123 4567"),
        ("Baltic Packaging OÜ", "Marten Kask", "sales@balticpack.example", "+372 5123 456"),
        ("GreenLeaf Wholesale", "Priya Nair", "accounts@greenleaf.example", "+44 20 7946 0321"),
    ];

    for (name, contact, email, phone) in suppliers {
        sqlx::query(
            "INSERT INTO suppliers (name, contact_person, email, phone, address)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(name)
        .bind(contact)
        .bind(email)
        .bind(phone)
        .bind(format!("{name} head office"))
        .execute(pool)
        .await?;
    }

    println!("[done] Created 3 sample suppliers");
    Ok(())
}

async fn seed_warehouses(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM warehouses")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Warehouses already exist ({count})");
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO warehouses (name, location, capacity) VALUES
         ('Central DC', 'Stockholm, Västberga allé 5', 12000),
         ('North Hub', 'Umeå, Industrivägen 14', 4500)",
    )
    .execute(pool)
    .await?;

    println!("[done] Created 2 sample warehouses");
    Ok(())
}

async fn seed_customers(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Customers already exist ({count})");
        return Ok(());
    }

    let customers = vec![
        ("Anna Lindqvist", "anna.lindqvist@example.com", "+46 70 111 2233", "Sveavägen 10, Stockholm"),
        ("Oskar Holm", "oskar.holm@example.com", "+46 73 444 5566", "Storgatan 2, Göteborg"),
        ("Maja Eriksson", "maja.eriksson@example.com", "+46 76 777 8899", "Kyrkogatan 7, Lund"),
        ("Johan Åberg", "johan.aberg@example.com", "+46 72 123 9876", "Hamngatan 21, Malmö"),
    ];

    for (name, email, phone, address) in customers {
        sqlx::query(
            "INSERT INTO customers (name, email, phone, address) VALUES ($1, $2, $3, $4)",
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(address)
        .execute(pool)
        .await?;
    }

    println!("[done] Created 4 sample customers");
    Ok(())
}

async fn seed_products(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Products already exist ({count})");
        return Ok(());
    }

    // Enough rows that the storefront feed spans more than one cursor page.
    let products = vec![
        ("COF-001", "Espresso Blend 500g", 12.50, "bag"),
        ("COF-002", "Filter Roast 500g", 10.90, "bag"),
        ("COF-003", "Decaf Dark 250g", 7.40, "bag"),
        ("TEA-001", "Earl Grey Loose 100g", 5.80, "tin"),
        ("TEA-002", "Sencha Green 100g", 6.20, "tin"),
        ("EQP-001", "Ceramic Pour-Over Dripper", 18.00, "pcs"),
        ("EQP-002", "Goose-Neck Kettle 1L", 42.00, "pcs"),
        ("EQP-003", "Burr Grinder Compact", 89.00, "pcs"),
        ("CUP-001", "Stoneware Mug 300ml", 9.50, "pcs"),
        ("CUP-002", "Double-Wall Glass 250ml", 11.00, "pcs"),
        ("SYR-001", "Vanilla Syrup 750ml", 8.30, "bottle"),
        ("SYR-002", "Caramel Syrup 750ml", 8.30, "bottle"),
    ];

    for (sku, name, price, unit) in products {
        sqlx::query(
            "INSERT INTO products (sku, name, description, price, unit)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(sku)
        .bind(name)
        .bind(format!("{name} — stockdesk house range"))
        .bind(price)
        .bind(unit)
        .execute(pool)
        .await?;
    }

    println!("[done] Created 12 sample products");
    Ok(())
}

async fn seed_goods_receipts(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM goods_receipts")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Goods receipts already exist ({count})");
        return Ok(());
    }

    let supplier_id: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM suppliers WHERE name = 'Nordic Roasters AB'")
            .fetch_optional(pool)
            .await?;
    let warehouse_id: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM warehouses WHERE name = 'Central DC'")
            .fetch_optional(pool)
            .await?;
    let product_ids: Vec<Uuid> = sqlx::query_scalar(
        "SELECT id FROM products WHERE sku IN ('COF-001', 'COF-002') ORDER BY sku",
    )
    .fetch_all(pool)
    .await?;

    let (Some(supplier_id), Some(warehouse_id)) = (supplier_id, warehouse_id) else {
        println!("[warn] Supplier or warehouse missing — skipping goods receipt");
        return Ok(());
    };
    if product_ids.len() < 2 {
        println!("[warn] Products missing — skipping goods receipt");
        return Ok(());
    }

    let items = serde_json::json!([
        { "productId": product_ids[0], "quantity": 40, "unitCost": 7.10 },
        { "productId": product_ids[1], "quantity": 24, "unitCost": 6.35 },
    ]);

    sqlx::query(
        "INSERT INTO goods_receipts (reference, supplier_id, warehouse_id, note, items)
         VALUES ('GR-2025-0001', $1, $2, 'Opening stock delivery', $3)",
    )
    .bind(supplier_id)
    .bind(warehouse_id)
    .bind(items)
    .execute(pool)
    .await?;

    println!("[done] Created 1 sample goods receipt");
    Ok(())
}
