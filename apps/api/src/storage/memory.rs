//! In-memory storage for router and pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{BlobStore, ResumeRepository};
use crate::models::records::{
    ApplicationStatus, MasterResumeRow, NewMasterResume, NewTailoredResume, TailoredResumeRow,
};

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryBlobStore {
    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<()> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes.to_vec(), content_type.to_string()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| anyhow!("no such key: {key}"))
    }

    async fn download_url(&self, key: &str) -> Result<String> {
        Ok(format!("memory://{key}"))
    }
}

#[derive(Default)]
pub struct MemoryResumeRepository {
    masters: Mutex<HashMap<Uuid, MasterResumeRow>>,
    tailored: Mutex<Vec<TailoredResumeRow>>,
}

impl MemoryResumeRepository {
    pub fn tailored_count(&self) -> usize {
        self.tailored.lock().unwrap().len()
    }
}

#[async_trait]
impl ResumeRepository for MemoryResumeRepository {
    async fn insert_master(&self, new: NewMasterResume<'_>) -> Result<MasterResumeRow> {
        let now = Utc::now();
        let row = MasterResumeRow {
            id: Uuid::new_v4(),
            user_id: new.user_id.to_string(),
            original_file_name: new.original_file_name.to_string(),
            file_size: new.file_size,
            blob_key: new.blob_key.to_string(),
            content: None,
            section_set: None,
            parsed_at: None,
            uploaded_at: now,
            updated_at: now,
        };
        self.masters.lock().unwrap().insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_master(&self, id: Uuid) -> Result<Option<MasterResumeRow>> {
        Ok(self.masters.lock().unwrap().get(&id).cloned())
    }

    async fn record_parse(&self, id: Uuid, content: &Value) -> Result<()> {
        let mut masters = self.masters.lock().unwrap();
        let row = masters
            .get_mut(&id)
            .ok_or_else(|| anyhow!("master resume {id} not found"))?;
        let now = Utc::now();
        row.content = Some(content.clone());
        row.parsed_at = Some(now);
        row.updated_at = now;
        Ok(())
    }

    async fn insert_tailored(
        &self,
        new: NewTailoredResume<'_>,
        section_set: Option<&[String]>,
    ) -> Result<TailoredResumeRow> {
        if let Some(sections) = section_set {
            let mut masters = self.masters.lock().unwrap();
            let master = masters
                .get_mut(&new.master_resume_id)
                .ok_or_else(|| anyhow!("master resume {} not found", new.master_resume_id))?;
            master.section_set = Some(sections.to_vec());
        }

        let mut tailored = self.tailored.lock().unwrap();
        // Strictly increasing timestamps keep "newest first" deterministic.
        let created_at = Utc::now() + Duration::milliseconds(tailored.len() as i64);
        let row = TailoredResumeRow {
            id: Uuid::new_v4(),
            user_id: new.user_id.to_string(),
            master_resume_id: new.master_resume_id,
            job_title: new.job_title.map(str::to_string),
            company: new.company.map(str::to_string),
            job_description: new.job_description.to_string(),
            tailored_content: new.tailored_content.clone(),
            section_order: new.section_order.to_vec(),
            status: ApplicationStatus::Draft.as_str().to_string(),
            created_at,
        };
        tailored.push(row.clone());
        Ok(row)
    }

    async fn get_tailored(&self, id: Uuid) -> Result<Option<TailoredResumeRow>> {
        Ok(self
            .tailored
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn list_tailored(&self, user_id: &str) -> Result<Vec<TailoredResumeRow>> {
        let mut rows: Vec<TailoredResumeRow> = self
            .tailored
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<TailoredResumeRow>> {
        let mut tailored = self.tailored.lock().unwrap();
        Ok(tailored.iter_mut().find(|row| row.id == id).map(|row| {
            row.status = status.as_str().to_string();
            row.clone()
        }))
    }
}
