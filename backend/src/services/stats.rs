//! Dashboard statistics

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppResult;
use crate::services::stock::{StockService, StockView};

const TOP_COCKTAILS: i64 = 5;
const MAX_ALERTS: usize = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub cocktails: i64,
    pub ingredients: i64,
    pub users: i64,
    pub low_stock: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCounts {
    pub total: i64,
    pub last_7_days: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PopularCocktail {
    pub id: Uuid,
    pub name: String,
    pub views: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub counts: Counts,
    pub views: ViewCounts,
    pub top_cocktails: Vec<PopularCocktail>,
    pub stock_alerts: Vec<StockView>,
}

pub struct StatsService {
    db: PgPool,
    stock: StockService,
}

impl StatsService {
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            stock: StockService::new(db.clone(), config),
            db,
        }
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let (cocktails, ingredients, users, total_views, recent_views) =
            sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM cocktails),
                    (SELECT COUNT(*) FROM ingredients),
                    (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM cocktail_views),
                    (SELECT COUNT(*) FROM cocktail_views
                     WHERE viewed_at >= NOW() - INTERVAL '7 days')
                "#,
            )
            .fetch_one(&self.db)
            .await?;

        let top_cocktails = sqlx::query_as::<_, PopularCocktail>(
            r#"
            SELECT c.id, c.name, COUNT(v.id) AS views
            FROM cocktails c
            JOIN cocktail_views v ON v.cocktail_id = c.id
            GROUP BY c.id, c.name
            ORDER BY views DESC, c.name
            LIMIT $1
            "#,
        )
        .bind(TOP_COCKTAILS)
        .fetch_all(&self.db)
        .await?;

        let alerts = self.stock.alerts().await?;
        let low_stock = alerts.len();

        Ok(DashboardStats {
            counts: Counts {
                cocktails,
                ingredients,
                users,
                low_stock,
            },
            views: ViewCounts {
                total: total_views,
                last_7_days: recent_views,
            },
            top_cocktails,
            stock_alerts: alerts.into_iter().take(MAX_ALERTS).collect(),
        })
    }
}
