//! In-memory port implementations for orchestration tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mirror::{
    properties, DatabaseId, Issue, IssueSource, MirrorStore, PageCursor, PageId, PortError,
    PropertySet, PropertyValue, RepositoryRef, RowPage, Service,
};
use tokio::sync::Notify;

pub struct FakeSource {
    issues: Result<Vec<Issue>, PortError>,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_issues(issues: Vec<Issue>) -> Self {
        Self {
            issues: Ok(issues),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: PortError) -> Self {
        Self {
            issues: Err(error),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IssueSource for FakeSource {
    async fn list_issues(&self, _repo: &RepositoryRef) -> Result<Vec<Issue>, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.issues.clone()
    }
}

#[derive(Default)]
pub struct FakeStore {
    pages: Vec<RowPage>,
    query_failure: Option<(usize, PortError)>,
    failing_issues: HashSet<u64>,
    gate: Option<Arc<Notify>>,
    queried: Mutex<Vec<Option<String>>>,
    pub created: Mutex<Vec<(DatabaseId, PropertySet)>>,
    pub updated: Mutex<Vec<(PageId, PropertySet)>>,
}

impl FakeStore {
    pub fn with_pages(pages: Vec<RowPage>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    /// Makes the `call`-th query (zero based) fail.
    pub fn failing_query_at(mut self, call: usize, error: PortError) -> Self {
        self.query_failure = Some((call, error));
        self
    }

    /// Makes every write for these issue numbers fail.
    pub fn failing_issues(mut self, numbers: impl IntoIterator<Item = u64>) -> Self {
        self.failing_issues = numbers.into_iter().collect();
        self
    }

    /// Holds every query until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn queried_cursors(&self) -> Vec<Option<String>> {
        self.queried.lock().unwrap().clone()
    }

    pub fn created_numbers(&self) -> Vec<u64> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|(_, props)| issue_number(props))
            .collect()
    }

    pub fn updated_pages(&self) -> Vec<(String, u64)> {
        self.updated
            .lock()
            .unwrap()
            .iter()
            .map(|(page, props)| (page.to_string(), issue_number(props)))
            .collect()
    }

    fn check_write(&self, props: &PropertySet) -> Result<(), PortError> {
        let number = issue_number(props);
        if self.failing_issues.contains(&number) {
            Err(PortError::from_status(
                Service::Notion,
                409,
                format!("conflict writing issue {number}"),
                None,
            ))
        } else {
            Ok(())
        }
    }
}

fn issue_number(props: &PropertySet) -> u64 {
    match props.get(properties::ISSUE_NUMBER) {
        Some(PropertyValue::Number(n)) => *n,
        other => panic!("missing issue number property: {other:?}"),
    }
}

#[async_trait]
impl MirrorStore for FakeStore {
    async fn query_rows(
        &self,
        _database: &DatabaseId,
        cursor: Option<&PageCursor>,
    ) -> Result<RowPage, PortError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let call = {
            let mut queried = self.queried.lock().unwrap();
            queried.push(cursor.map(|c| c.to_string()));
            queried.len() - 1
        };
        if let Some((at, error)) = &self.query_failure {
            if *at == call {
                return Err(error.clone());
            }
        }
        Ok(self.pages.get(call).cloned().unwrap_or_default())
    }

    async fn create_page(
        &self,
        database: &DatabaseId,
        properties: &PropertySet,
    ) -> Result<PageId, PortError> {
        tokio::task::yield_now().await;
        self.check_write(properties)?;
        let mut created = self.created.lock().unwrap();
        created.push((database.clone(), properties.clone()));
        Ok(PageId::new(format!("new_{}", created.len())).unwrap())
    }

    async fn update_page(&self, page: &PageId, properties: &PropertySet) -> Result<(), PortError> {
        tokio::task::yield_now().await;
        self.check_write(properties)?;
        self.updated
            .lock()
            .unwrap()
            .push((page.clone(), properties.clone()));
        Ok(())
    }
}
