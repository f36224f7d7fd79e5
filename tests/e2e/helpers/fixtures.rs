use anyhow::Result;
use my_feed_backend::infrastructure::db::DbPool;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

pub struct TestFixtures {
    pool: Arc<DbPool>,
    data_dir: PathBuf,
}

impl TestFixtures {
    pub fn new(pool: Arc<DbPool>, data_dir: PathBuf) -> Self {
        Self { pool, data_dir }
    }

    /// Write a batch file with one JSON record per line
    pub fn write_batch(&self, name: &str, records: &[Value]) -> Result<PathBuf> {
        let mut body = String::new();
        for record in records {
            body.push_str(&serde_json::to_string(record)?);
            body.push('\n');
        }
        self.write_raw(name, &body)
    }

    /// Write a batch file verbatim
    pub fn write_raw(&self, name: &str, body: &str) -> Result<PathBuf> {
        let path = self.data_dir.join(name);
        std::fs::write(&path, body)?;
        Ok(path)
    }

    /// File names currently in the batch directory, sorted
    pub fn batch_files(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = std::fs::read_dir(&self.data_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    pub async fn count_items(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM feedmodel")
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(count)
    }

    /// Overwrite the stored `data` text of an item, bypassing ingestion
    pub async fn corrupt_data(&self, model_id: &str, raw: &str) -> Result<()> {
        sqlx::query("UPDATE feedmodel SET data = ? WHERE model_id = ?")
            .bind(raw)
            .bind(model_id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
