//! Seed the store database from a YAML file.
//!
//! The file lists regions, catalogs (with their products, items, aliases and
//! per-region prices) and customer accounts. Everything is validated before
//! connecting and written in one transaction. Regions are upserted by id;
//! catalogs whose title already exists and accounts whose email is taken are
//! skipped, so a file can be loaded more than once.
//!
//! ```yaml
//! regions:
//!   - id: 1
//!     title: United States
//!     currency: USD
//! catalogs:
//!   - title: Hand Tools
//!     products:
//!       - title: Hand Saw
//!         shortname: hand-saw
//!         path: tools/saws/hand-saw
//!         items:
//!           - sku: SAW-20
//!             description: 20 inch blade
//!             aliases: [HS20]
//!             prices: { 1: "24.50" }
//! accounts:
//!   - email: sam@example.com
//!     fullname: Sam Shopper
//!     password: correct-horse
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{Postgres, Transaction};
use tracing::{error, info};

use tidewater_core::{CurrencyCode, ItemStatus, Sku};
use tidewater_storefront::services::hash_password;

use super::connect;

/// Top level of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub regions: Vec<RegionSeed>,
    #[serde(default)]
    pub catalogs: Vec<CatalogSeed>,
    #[serde(default)]
    pub accounts: Vec<AccountSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionSeed {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub currency: CurrencyCode,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSeed {
    pub title: String,
    #[serde(default = "default_in_season")]
    pub in_season: bool,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSeed {
    pub title: String,
    pub shortname: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub items: Vec<ItemSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemSeed {
    pub sku: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default = "default_part_count")]
    pub part_count: i32,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Price per region id. An item is only visible where it has a price.
    #[serde(default)]
    pub prices: BTreeMap<i32, Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSeed {
    pub email: String,
    pub fullname: Option<String>,
    pub password: String,
}

const fn default_in_season() -> bool {
    true
}

const fn default_part_count() -> i32 {
    1
}

/// What a seed run wrote.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub regions: usize,
    pub catalogs: usize,
    pub catalogs_skipped: usize,
    pub items: usize,
    pub aliases: usize,
    pub accounts: usize,
    pub accounts_skipped: usize,
}

/// Check a seed file for problems the database would reject or that would
/// leave items unreachable from the quick order page.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();
    let regions: HashSet<i32> = seed.regions.iter().map(|r| r.id).collect();
    let mut skus = HashSet::new();

    for catalog in &seed.catalogs {
        if catalog.title.trim().is_empty() {
            errors.push("catalog with blank title".to_owned());
        }

        for product in &catalog.products {
            for item in &product.items {
                let label = format!("item {:?} of product {:?}", item.sku, product.title);

                match Sku::parse(&item.sku) {
                    Ok(sku) if !skus.insert(sku.lookup_key()) => {
                        errors.push(format!("{label}: duplicate SKU"));
                    }
                    Ok(_) => {}
                    Err(e) => errors.push(format!("{label}: {e}")),
                }

                for alias in &item.aliases {
                    if let Err(e) = Sku::parse(alias) {
                        errors.push(format!("{label}: alias {alias:?}: {e}"));
                    }
                }

                if item.part_count < 1 {
                    errors.push(format!("{label}: part_count must be at least 1"));
                }

                for (region, price) in &item.prices {
                    if !regions.contains(region) {
                        errors.push(format!("{label}: unknown region {region}"));
                    }
                    if price.is_sign_negative() {
                        errors.push(format!("{label}: negative price in region {region}"));
                    }
                }
            }
        }
    }

    for account in &seed.accounts {
        if !account.email.contains('@') {
            errors.push(format!("account {:?}: invalid email", account.email));
        }
    }

    errors
}

/// Seed the database from the YAML file at `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or the database rejects it.
pub async fn run(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed file");
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = connect().await?;
    let mut tx = pool.begin().await?;
    let summary = write(&mut tx, &seed).await?;
    tx.commit().await?;

    info!("Seeding complete!");
    info!("  Regions: {}", summary.regions);
    info!(
        "  Catalogs: {} ({} skipped)",
        summary.catalogs, summary.catalogs_skipped
    );
    info!("  Items: {} ({} aliases)", summary.items, summary.aliases);
    info!(
        "  Accounts: {} ({} skipped)",
        summary.accounts, summary.accounts_skipped
    );

    Ok(())
}

async fn write(
    tx: &mut Transaction<'_, Postgres>,
    seed: &SeedFile,
) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let mut summary = SeedSummary::default();

    for region in &seed.regions {
        sqlx::query(
            r"
            INSERT INTO region (id, title, currency_code)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title, currency_code = EXCLUDED.currency_code
            ",
        )
        .bind(region.id)
        .bind(&region.title)
        .bind(region.currency.as_str())
        .execute(&mut **tx)
        .await?;
        summary.regions += 1;
    }

    if !seed.regions.is_empty() {
        // Explicit ids bypass the serial sequence.
        sqlx::query(
            "SELECT setval(pg_get_serial_sequence('region', 'id'), (SELECT MAX(id) FROM region))",
        )
        .execute(&mut **tx)
        .await?;
    }

    for catalog in &seed.catalogs {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM catalog WHERE title = $1)",
        )
        .bind(&catalog.title)
        .fetch_one(&mut **tx)
        .await?;
        if exists {
            info!(title = %catalog.title, "Catalog exists, skipping");
            summary.catalogs_skipped += 1;
            continue;
        }

        let catalog_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO catalog (title, in_season) VALUES ($1, $2) RETURNING id",
        )
        .bind(&catalog.title)
        .bind(catalog.in_season)
        .fetch_one(&mut **tx)
        .await?;
        summary.catalogs += 1;

        for product in &catalog.products {
            let product_id = sqlx::query_scalar::<_, i32>(
                r"
                INSERT INTO product (catalog, title, shortname, path)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                ",
            )
            .bind(catalog_id)
            .bind(&product.title)
            .bind(&product.shortname)
            .bind(product.path.trim_matches('/'))
            .fetch_one(&mut **tx)
            .await?;

            for item in &product.items {
                write_item(tx, product_id, item, &mut summary).await?;
            }
        }
    }

    for account in &seed.accounts {
        let password_hash = hash_password(&account.password)?;
        let inserted = sqlx::query(
            r"
            INSERT INTO account (email, fullname, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT ((lower(email))) DO NOTHING
            ",
        )
        .bind(&account.email)
        .bind(&account.fullname)
        .bind(password_hash)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            summary.accounts_skipped += 1;
        } else {
            summary.accounts += 1;
        }
    }

    Ok(summary)
}

async fn write_item(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i32,
    item: &ItemSeed,
    summary: &mut SeedSummary,
) -> Result<(), sqlx::Error> {
    let item_id = sqlx::query_scalar::<_, i32>(
        r"
        INSERT INTO item (product, sku, description, status, part_count)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        ",
    )
    .bind(product_id)
    .bind(item.sku.trim())
    .bind(&item.description)
    .bind(item.status.as_str())
    .bind(item.part_count)
    .fetch_one(&mut **tx)
    .await?;
    summary.items += 1;

    for alias in &item.aliases {
        sqlx::query("INSERT INTO item_alias (item, sku) VALUES ($1, $2)")
            .bind(item_id)
            .bind(alias.trim())
            .execute(&mut **tx)
            .await?;
        summary.aliases += 1;
    }

    for (region, price) in &item.prices {
        sqlx::query("INSERT INTO item_region (item, region, price) VALUES ($1, $2, $3)")
            .bind(item_id)
            .bind(region)
            .bind(price)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
regions:
  - id: 1
    title: United States
catalogs:
  - title: Hand Tools
    products:
      - title: Hand Saw
        shortname: hand-saw
        path: tools/saws/hand-saw
        items:
          - sku: SAW-20
            description: 20 inch blade
            aliases: [HS20]
            prices: { 1: "24.50" }
          - sku: SAW-KIT
            status: backordered
            part_count: 3
            prices: { 1: "60.00" }
accounts:
  - email: sam@example.com
    password: correct-horse
"#;

    #[test]
    fn test_parse_sample() {
        let seed: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(seed.regions[0].currency, CurrencyCode::USD);

        let catalog = &seed.catalogs[0];
        assert!(catalog.in_season);

        let items = &catalog.products[0].items;
        assert_eq!(items[0].part_count, 1);
        assert_eq!(items[0].status, ItemStatus::Available);
        assert_eq!(items[0].prices[&1], Decimal::new(2450, 2));
        assert_eq!(items[1].status, ItemStatus::Backordered);

        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<SeedFile, _> = serde_yaml::from_str("catalogs:\n  - titel: Oops\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_reports_problems() {
        let seed: SeedFile = serde_yaml::from_str(
            r#"
catalogs:
  - title: Tools
    products:
      - title: Saw
        shortname: saw
        items:
          - sku: SAW-1
            prices: { 2: "5.00" }
          - sku: saw-1
          - sku: "  "
            part_count: 0
"#,
        )
        .unwrap();

        let errors = validate(&seed);
        assert!(errors.iter().any(|e| e.contains("unknown region 2")));
        assert!(errors.iter().any(|e| e.contains("duplicate SKU")));
        assert!(errors.iter().any(|e| e.contains("part_count")));
        assert_eq!(errors.len(), 4);
    }
}
