//! Utility to inspect the database schema and print the clinic's table structures.

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;

const CLINIC_TABLES: [&str; 4] = ["owners", "vets", "specialties", "vet_specialties"];

/// Main entry point for the schema inspection utility.
///
/// Connects to the database and lists columns and row counts for each clinic table.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL")
        .or_else(|_| env::var("DB_URL"))
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT table_name FROM information_schema.tables WHERE table_schema = 'public' AND table_name = ANY($1) ORDER BY table_name",
    )
    .bind(&CLINIC_TABLES[..])
    .fetch_all(&pool)
    .await?;

    if tables.is_empty() {
        println!("No clinic tables found. Start the server once to apply migrations.");
        return Ok(());
    }

    println!("Found clinic tables:");
    for (table,) in &tables {
        // Names come from the fixed list above
        let (rows,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&pool)
            .await?;
        println!("- {} ({} rows)", table, rows);

        let columns: Vec<(String, String)> = sqlx::query_as(
            "SELECT column_name, data_type FROM information_schema.columns WHERE table_schema = 'public' AND table_name = $1 ORDER BY ordinal_position"
        )
        .bind(table)
        .fetch_all(&pool)
        .await?;

        for (col, type_) in columns {
            println!("  - {}: {}", col, type_);
        }
        println!();
    }

    Ok(())
}
