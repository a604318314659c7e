use crate::config::AppConfig;
use crate::db;
use crate::nutrition::repo::{NutritionStore, PgNutritionStore};
use crate::storage::{Storage, StorageClient};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub label_storage: Arc<dyn StorageClient>,
    pub food_storage: Arc<dyn StorageClient>,
    pub nutrition: Arc<dyn NutritionStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let label_storage = Arc::new(
            Storage::new(&config.label_storage, &config.storage_region).await?,
        ) as Arc<dyn StorageClient>;
        let food_storage = Arc::new(
            Storage::new(&config.food_storage, &config.storage_region).await?,
        ) as Arc<dyn StorageClient>;

        let pool = db::connect(&config.document_store).await?;
        db::migrate(&pool).await?;
        let nutrition = Arc::new(PgNutritionStore::new(pool)) as Arc<dyn NutritionStore>;

        Ok(Self::from_parts(config, label_storage, food_storage, nutrition))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        label_storage: Arc<dyn StorageClient>,
        food_storage: Arc<dyn StorageClient>,
        nutrition: Arc<dyn NutritionStore>,
    ) -> Self {
        Self {
            config,
            label_storage,
            food_storage,
            nutrition,
        }
    }
}
