use mortar::prelude::*;
use mortar::{CastType, Mortar, RawOutcome, SortDirection};

fn main() -> mortar::Result<()> {
    println!("=== Mortar - Basic Usage Examples ===\n");

    // Reads MORTAR_DB_* from the environment or a .env file
    let db = Mortar::from_env()?;

    // Build without running
    let listing = db
        .get_some("users", ["username", "full_name"])
        .where_(("username", "<>", "Tadhg"))?
        .order_by("first_name", SortDirection::Asc)
        .limit(5);
    println!("1. SELECT:\n   {}\n", listing);

    let rows = listing.execute()?;
    println!("   fetched {} rows\n", rows.len());

    // Multi-hop joins with casts applied after fetching
    let admins = db
        .get_all("users")
        .inner_join(|j| j.table("users_groups").on("user_id", "id"))?
        .inner_join(|j| j.table("groups").through("users_groups").on("id", "group_id"))?
        .where_(("groups.name", "Admins"))?
        .cast("id", CastType::Int)
        .execute()?;
    println!("2. JOIN: {} admins\n", admins.len());

    // Upsert
    let inserted = db
        .insert(
            "users",
            [("username", "Aberdeener"), ("full_name", "Tadhg Boyle")],
        )
        .on_duplicate_key([("full_name", "Tadhg Boyle")])
        .execute()?;
    println!("3. INSERT: {} rows affected\n", inserted);

    // Conditional filters
    let only_active = true;
    let updated = db
        .update("users", [("visits", 0)])
        .when(only_active, |q| q.where_eq("active", 1))?
        .unless(only_active, |q| q.all_rows())?
        .execute()?;
    println!("4. UPDATE: {} rows affected\n", updated);

    // Hand-written statements
    match db.execute("SELECT COUNT(*) AS total FROM users")? {
        RawOutcome::Rows(rows) => println!("5. RAW: {:?}", rows.first()),
        RawOutcome::Affected(count) => println!("5. RAW: {} rows affected", count),
    }

    Ok(())
}
