//! Vacancy record operations.
//!
//! A vacancy is written exactly once, when the pipeline first evaluates its
//! URL. Re-saving an existing URL is a no-op rather than an update: the store
//! is the audit trail of what was seen and how it scored at discovery time.

use super::connection::StoreDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// A persisted posting evaluation.
///
/// `description` holds the oracle's reasoning (or an empty string when
/// scoring failed), not the scraped page text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vacancy {
    pub url: String,
    pub description: String,
    pub score: f64,
    pub discovered_at: String,
}

impl Vacancy {
    /// Build a record stamped with the current time.
    pub fn new(url: impl Into<String>, description: impl Into<String>, score: f64) -> Self {
        Self {
            url: url.into(),
            description: description.into(),
            score,
            discovered_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl StoreDb {
    /// Insert a vacancy record, keyed by URL.
    ///
    /// Insert-once semantics: if the URL already exists the call is a no-op.
    /// A record is never updated after it is written.
    pub async fn save_vacancy(&self, vacancy: &Vacancy) -> Result<(), Error> {
        let vacancy = vacancy.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO vacancies (url, description, score, discovered_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(url) DO NOTHING",
                    params![&vacancy.url, &vacancy.description, vacancy.score, &vacancy.discovered_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Check whether a URL has already been evaluated.
    pub async fn vacancy_exists(&self, url: &str) -> Result<bool, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn
                    .query_row(
                        "SELECT EXISTS(SELECT 1 FROM vacancies WHERE url = ?1)",
                        params![url],
                        |row| row.get(0),
                    )
                    .map_err(Error::from)?;

                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Total number of stored vacancy records.
    pub async fn count_vacancies(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM vacancies", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// All stored vacancies, newest first.
    pub async fn list_vacancies(&self) -> Result<Vec<Vacancy>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<Vacancy>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, description, score, discovered_at
                     FROM vacancies ORDER BY discovered_at DESC",
                )?;

                let rows = stmt.query_map([], |row| {
                    Ok(Vacancy {
                        url: row.get(0)?,
                        description: row.get(1)?,
                        score: row.get(2)?,
                        discovered_at: row.get(3)?,
                    })
                })?;

                let mut vacancies = Vec::new();
                for row in rows {
                    vacancies.push(row?);
                }
                Ok(vacancies)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_exists() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let vacancy = Vacancy::new("https://work.ua/jobs/12345", "strong match", 9.0);

        assert!(!db.vacancy_exists(&vacancy.url).await.unwrap());
        db.save_vacancy(&vacancy).await.unwrap();
        assert!(db.vacancy_exists(&vacancy.url).await.unwrap());
    }

    #[tokio::test]
    async fn test_save_is_insert_once() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let first = Vacancy::new("https://djinni.co/jobs/777", "initial evaluation", 4.0);
        let second = Vacancy::new("https://djinni.co/jobs/777", "should be ignored", 9.5);

        db.save_vacancy(&first).await.unwrap();
        db.save_vacancy(&second).await.unwrap();

        let all = db.list_vacancies().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].description, "initial evaluation");
        assert_eq!(all[0].score, 4.0);
    }

    #[tokio::test]
    async fn test_count_vacancies() {
        let db = StoreDb::open_in_memory().await.unwrap();
        assert_eq!(db.count_vacancies().await.unwrap(), 0);

        db.save_vacancy(&Vacancy::new("https://robota.ua/vacancy/1", "", 0.0))
            .await
            .unwrap();
        db.save_vacancy(&Vacancy::new("https://robota.ua/vacancy/2", "", 0.0))
            .await
            .unwrap();

        assert_eq!(db.count_vacancies().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_vacancies_preserves_fields() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let vacancy = Vacancy::new("https://jobs.dou.ua/vacancies/99", "junior match, react stack", 8.0);
        db.save_vacancy(&vacancy).await.unwrap();

        let all = db.list_vacancies().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].url, vacancy.url);
        assert_eq!(all[0].description, "junior match, react stack");
        assert_eq!(all[0].score, 8.0);
        assert_eq!(all[0].discovered_at, vacancy.discovered_at);
    }

    #[tokio::test]
    async fn test_exists_unknown_url() {
        let db = StoreDb::open_in_memory().await.unwrap();
        assert!(!db.vacancy_exists("https://example.com/never-seen").await.unwrap());
    }
}
