//! CSV exports of the catalog

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{CocktailType, Language};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// A rendered CSV file
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

#[derive(Debug, FromRow)]
struct IngredientExportRow {
    id: Uuid,
    name: String,
    category: String,
    subcategory: Option<String>,
    is_alcoholic: bool,
    base_spirit: Option<String>,
    cost_per_unit: Option<Decimal>,
    cost_unit: Option<String>,
    stock_quantity: Option<Decimal>,
    stock_unit: Option<String>,
    available: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CocktailExportRow {
    id: Uuid,
    name: String,
    cocktail_type: CocktailType,
    glass: String,
    base_spirit: Option<String>,
    ice: bool,
    ice_type: Option<String>,
    method: String,
    garnish: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct LinkExportRow {
    cocktail_id: Uuid,
    ingredient_name: String,
    quantity: Option<Decimal>,
    unit: Option<String>,
}

const INGREDIENT_HEADERS_FR: [&str; 12] = [
    "ID",
    "Nom",
    "Catégorie",
    "Sous-catégorie",
    "Alcoolisé",
    "Alcool de base",
    "Coût unitaire",
    "Unité de coût",
    "Stock actuel",
    "Unité de stock",
    "Disponible au bar",
    "Date de création",
];

const INGREDIENT_HEADERS_EN: [&str; 12] = [
    "ID",
    "Name",
    "Category",
    "Subcategory",
    "Alcoholic",
    "Base spirit",
    "Unit cost",
    "Cost unit",
    "Current stock",
    "Stock unit",
    "Available at bar",
    "Created at",
];

const COCKTAIL_HEADERS_FR: [&str; 11] = [
    "ID",
    "Nom",
    "Type",
    "Verre",
    "Alcool de base",
    "Glaçons",
    "Type de glace",
    "Méthode",
    "Garniture",
    "Ingrédients",
    "Date de création",
];

const COCKTAIL_HEADERS_EN: [&str; 11] = [
    "ID",
    "Name",
    "Type",
    "Glass",
    "Base spirit",
    "Ice",
    "Ice type",
    "Method",
    "Garnish",
    "Ingredients",
    "Created at",
];

fn yes_no(value: bool, lang: Language) -> &'static str {
    match (lang, value) {
        (Language::French, true) => "Oui",
        (Language::French, false) => "Non",
        (Language::English, true) => "Yes",
        (Language::English, false) => "No",
    }
}

fn format_date(date: DateTime<Utc>, lang: Language) -> String {
    match lang {
        Language::French => date.format("%d/%m/%Y").to_string(),
        Language::English => date.format("%Y-%m-%d").to_string(),
    }
}

fn format_amount(amount: Option<Decimal>) -> String {
    amount.map(|a| a.round_dp(2).to_string()).unwrap_or_default()
}

/// "Gin (5cl); Tonic (15cl); Citron"
fn ingredient_summary(links: &[LinkExportRow]) -> String {
    links
        .iter()
        .map(|l| match l.quantity {
            Some(q) => format!(
                "{} ({}{})",
                l.ingredient_name,
                q.normalize(),
                l.unit.as_deref().unwrap_or("")
            ),
            None => l.ingredient_name.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Every field quoted, one header row
fn render<const N: usize>(headers: [&str; N], rows: Vec<[String; N]>) -> AppResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(vec![]);

    wtr.write_record(headers)
        .map_err(|e| AppError::Export(format!("CSV write error: {}", e)))?;
    for row in rows {
        wtr.write_record(&row)
            .map_err(|e| AppError::Export(format!("CSV write error: {}", e)))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Export(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Export(format!("CSV encoding error: {}", e)))
}

fn dated_filename(prefix: &str) -> String {
    format!("{}_{}.csv", prefix, Utc::now().format("%Y-%m-%d"))
}

pub struct ExportService {
    db: PgPool,
}

impl ExportService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn ingredients(&self, lang: Language) -> AppResult<CsvExport> {
        let rows = sqlx::query_as::<_, IngredientExportRow>(
            r#"
            SELECT i.id, i.name, i.category, i.subcategory, i.is_alcoholic, i.base_spirit,
                   i.cost_per_unit, i.cost_unit, s.quantity AS stock_quantity,
                   s.unit AS stock_unit, COALESCE(ba.available, FALSE) AS available,
                   i.created_at
            FROM ingredients i
            LEFT JOIN stock s ON s.ingredient_id = i.id
            LEFT JOIN bar_availability ba ON ba.ingredient_id = i.id
            ORDER BY i.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let headers = match lang {
            Language::French => INGREDIENT_HEADERS_FR,
            Language::English => INGREDIENT_HEADERS_EN,
        };
        let count = rows.len();
        let records = rows
            .into_iter()
            .map(|r| {
                [
                    r.id.to_string(),
                    r.name,
                    r.category,
                    r.subcategory.unwrap_or_default(),
                    yes_no(r.is_alcoholic, lang).to_string(),
                    r.base_spirit.unwrap_or_default(),
                    format_amount(r.cost_per_unit),
                    r.cost_unit.unwrap_or_default(),
                    format_amount(r.stock_quantity),
                    r.stock_unit.unwrap_or_default(),
                    yes_no(r.available, lang).to_string(),
                    format_date(r.created_at, lang),
                ]
            })
            .collect();

        tracing::info!(rows = count, lang = lang.code(), "Ingredients exported");
        Ok(CsvExport {
            filename: dated_filename("ingredients"),
            body: render(headers, records)?,
        })
    }

    pub async fn cocktails(&self, lang: Language) -> AppResult<CsvExport> {
        let cocktails = sqlx::query_as::<_, CocktailExportRow>(
            r#"
            SELECT id, name, cocktail_type, glass, base_spirit, ice, ice_type, method,
                   garnish, created_at
            FROM cocktails
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let links = sqlx::query_as::<_, LinkExportRow>(
            r#"
            SELECT ci.cocktail_id, i.name AS ingredient_name, ci.quantity, ci.unit
            FROM cocktail_ingredients ci
            JOIN ingredients i ON i.id = ci.ingredient_id
            ORDER BY ci.cocktail_id, ci.position
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut by_cocktail: HashMap<Uuid, Vec<LinkExportRow>> = HashMap::new();
        for link in links {
            by_cocktail.entry(link.cocktail_id).or_default().push(link);
        }

        let headers = match lang {
            Language::French => COCKTAIL_HEADERS_FR,
            Language::English => COCKTAIL_HEADERS_EN,
        };
        let count = cocktails.len();
        let records = cocktails
            .into_iter()
            .map(|c| {
                let summary = by_cocktail
                    .get(&c.id)
                    .map(|l| ingredient_summary(l))
                    .unwrap_or_default();
                [
                    c.id.to_string(),
                    c.name,
                    c.cocktail_type.to_string(),
                    c.glass,
                    c.base_spirit.unwrap_or_default(),
                    yes_no(c.ice, lang).to_string(),
                    c.ice_type.unwrap_or_default(),
                    c.method.replace('\n', " "),
                    c.garnish.unwrap_or_default(),
                    summary,
                    format_date(c.created_at, lang),
                ]
            })
            .collect();

        tracing::info!(rows = count, lang = lang.code(), "Cocktails exported");
        Ok(CsvExport {
            filename: dated_filename("cocktails"),
            body: render(headers, records)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_every_field_is_quoted() {
        let body = render(["A", "B"], vec![["x".to_string(), "say \"hi\"".to_string()]]).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines, vec![r#""A","B""#, r#""x","say ""hi""""#]);
    }

    #[test]
    fn test_ingredient_summary() {
        let id = Uuid::new_v4();
        let links = vec![
            LinkExportRow {
                cocktail_id: id,
                ingredient_name: "Gin".into(),
                quantity: Some(dec!(5.000)),
                unit: Some("cl".into()),
            },
            LinkExportRow {
                cocktail_id: id,
                ingredient_name: "Citron".into(),
                quantity: None,
                unit: None,
            },
        ];
        assert_eq!(ingredient_summary(&links), "Gin (5cl); Citron");
    }

    #[test]
    fn test_labels_follow_language() {
        assert_eq!(yes_no(true, Language::French), "Oui");
        assert_eq!(yes_no(false, Language::English), "No");
        assert_eq!(format_amount(Some(dec!(1.2345))), "1.23");
        assert_eq!(format_amount(None), "");
    }

    #[test]
    fn test_filename_is_dated() {
        let name = dated_filename("cocktails");
        assert!(name.starts_with("cocktails_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "cocktails_2024-01-01.csv".len());
    }
}
