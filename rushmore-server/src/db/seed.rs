//! Sample categories inserted into an empty database

use sqlx::PgPool;

/// Default categories as `(name, description)`
pub const SAMPLE_CATEGORIES: &[(&str, &str)] = &[
    ("Essays", "Thoughtful explorations of ideas and concepts"),
    (
        "Reviews",
        "Critical analysis and opinions on books, films, and other media",
    ),
    ("Interviews", "Conversations with interesting people"),
    ("Personal", "Reflections and personal experiences"),
    ("Photography", "Visual storytelling and photography"),
    ("Travel", "Adventures and explorations from around the world"),
    ("Creative Writing", "Fiction, poetry, and other creative works"),
];

/// Insert [`SAMPLE_CATEGORIES`] if the categories table is empty.
///
/// Returns the number of rows inserted (0 when categories already exist).
pub async fn seed_categories(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Blocks concurrent seeders until commit; plain reads still proceed
    sqlx::query("LOCK TABLE categories IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await?;

    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
        .fetch_one(&mut *tx)
        .await?;

    if existing > 0 {
        tracing::info!(existing, "Categories already exist, skipping insertion");
        return Ok(0);
    }

    let mut inserted = 0;
    for (name, description) in SAMPLE_CATEGORIES {
        inserted += sqlx::query("INSERT INTO categories (name, description) VALUES ($1, $2)")
            .bind(name)
            .bind(description)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    tx.commit().await?;
    tracing::info!(inserted, "Sample categories inserted");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_names_are_unique() {
        let mut names: Vec<_> = SAMPLE_CATEGORIES.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SAMPLE_CATEGORIES.len());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_seeding_inserts_once() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");
        crate::db::migrations::run(&pool).await.expect("migrations failed");

        let (a, b) = tokio::join!(seed_categories(&pool), seed_categories(&pool));
        let total = a.unwrap() + b.unwrap();
        assert!(total == 0 || total == SAMPLE_CATEGORIES.len() as u64);

        let names: Vec<&str> = SAMPLE_CATEGORIES.iter().map(|(n, _)| *n).collect();
        let duplicated: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM categories WHERE name = ANY($1) GROUP BY name HAVING COUNT(*) > 1",
        )
        .bind(&names)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert!(duplicated.is_empty(), "{duplicated:?}");
    }
}
