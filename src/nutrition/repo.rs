use anyhow::Context;
use async_trait::async_trait;
use lazy_static::lazy_static;
use sqlx::PgPool;

use super::dates::UtcRange;
use super::repo_types::{MacroSums, Macronutrient, PredictionRow};

/// Read-only view of the nutrition document container.
#[async_trait]
pub trait NutritionStore: Send + Sync {
    /// Sums every macronutrient over records with `start <= timestamp < end`.
    async fn sum_macros(&self, range: &UtcRange) -> anyhow::Result<MacroSums>;
    /// Timestamp/prediction/probability triples in the same window.
    async fn list_predictions(&self, range: &UtcRange) -> anyhow::Result<Vec<PredictionRow>>;
}

pub const CONTAINER: &str = "nutrition_data";

lazy_static! {
    static ref SUM_MACROS_SQL: String = {
        let sums = Macronutrient::ALL
            .iter()
            .map(|m| {
                format!(
                    "SUM(CASE WHEN jsonb_typeof(d.body -> '{f}') = 'number' \
                     THEN (d.body ->> '{f}')::float8 END) AS {c}",
                    f = m.field(),
                    c = m.column()
                )
            })
            .collect::<Vec<_>>()
            .join(",\n       ");
        format!(
            "SELECT {sums}\n  FROM {CONTAINER} d\n \
             WHERE d.body ->> 'timestamp' >= $1 AND d.body ->> 'timestamp' < $2"
        )
    };
}

const LIST_PREDICTIONS_SQL: &str = r#"
    SELECT d.body ->> 'timestamp' AS timestamp,
           d.body ->> 'prediction' AS prediction,
           CASE WHEN jsonb_typeof(d.body -> 'probability') = 'number'
                THEN (d.body ->> 'probability')::float8 END AS probability
      FROM nutrition_data d
     WHERE d.body ->> 'timestamp' >= $1 AND d.body ->> 'timestamp' < $2
     ORDER BY d.body ->> 'timestamp' ASC
"#;

#[derive(Clone)]
pub struct PgNutritionStore {
    db: PgPool,
}

impl PgNutritionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NutritionStore for PgNutritionStore {
    async fn sum_macros(&self, range: &UtcRange) -> anyhow::Result<MacroSums> {
        let sums = sqlx::query_as::<_, MacroSums>(SUM_MACROS_SQL.as_str())
            .bind(&range.start)
            .bind(&range.end)
            .fetch_one(&self.db)
            .await
            .context("sum macronutrients")?;
        Ok(sums)
    }

    async fn list_predictions(&self, range: &UtcRange) -> anyhow::Result<Vec<PredictionRow>> {
        let rows = sqlx::query_as::<_, PredictionRow>(LIST_PREDICTIONS_SQL)
            .bind(&range.start)
            .bind(&range.end)
            .fetch_all(&self.db)
            .await
            .context("list predictions")?;
        Ok(rows)
    }
}
