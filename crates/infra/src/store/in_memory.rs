use std::sync::RwLock;

use chrono::{DateTime, NaiveDate, Utc};

use holotrack_core::{find_by_key, CartonId, CartonNo, DomainError, IssueId};
use holotrack_inventory::{total_available, Carton, CartonBox, NewCarton};
use holotrack_issuance::{plan_issue, sort_newest_first, Issue, IssueRequest};

use super::r#trait::{HologramStore, StoreError};

#[derive(Debug, Default)]
struct State {
    cartons: Vec<Carton>,
    boxes: Vec<CartonBox>,
    issues: Vec<Issue>,
    last_carton_id: i64,
    last_issue_id: i64,
}

/// In-memory hologram store.
///
/// Intended for tests/dev. Each mutation holds the write lock for the whole
/// unit of work and swaps in the new box counters only on success.
#[derive(Debug, Default)]
pub struct InMemoryHologramStore {
    state: RwLock<State>,
}

impl InMemoryHologramStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::database("read", "lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::database("write", "lock poisoned"))
    }
}

#[async_trait::async_trait]
impl HologramStore for InMemoryHologramStore {
    async fn create_carton(
        &self,
        carton: NewCarton,
        created_at: DateTime<Utc>,
    ) -> Result<(Carton, Vec<CartonBox>), StoreError> {
        let mut state = self.write()?;

        if find_by_key(&state.cartons, &carton.carton_no).is_some() {
            return Err(DomainError::duplicate("carton", carton.carton_no.as_str()).into());
        }

        let id = CartonId::new(state.last_carton_id + 1);
        let boxes = carton.boxes(id);
        let carton = carton.into_carton(id, created_at);

        state.last_carton_id = id.get();
        state.boxes.extend(boxes.iter().cloned());
        state.cartons.push(carton.clone());

        Ok((carton, boxes))
    }

    async fn delete_carton(&self, carton_no: &CartonNo) -> Result<(), StoreError> {
        let mut state = self.write()?;

        let id = find_by_key(&state.cartons, carton_no)
            .map(|c| c.id)
            .ok_or(DomainError::NotFound)?;

        if state.boxes.iter().any(|b| b.carton_id == id && b.issued_upto > 0) {
            return Err(DomainError::CartonInUse(carton_no.to_string()).into());
        }

        state.boxes.retain(|b| b.carton_id != id);
        state.cartons.retain(|c| c.id != id);
        Ok(())
    }

    async fn record_issue(&self, request: IssueRequest) -> Result<Issue, StoreError> {
        let mut state = self.write()?;

        let wanted = request.issue_no.trim();
        let taken = state.issues.iter().any(|i| i.issue_no.as_str() == wanted);

        let mut working = state.boxes.clone();
        let plan = plan_issue(&request, taken, &mut working)?;

        let id = IssueId::new(state.last_issue_id + 1);
        let issue = plan.into_issue(id);

        state.boxes = working;
        state.last_issue_id = id.get();
        state.issues.push(issue.clone());

        Ok(issue)
    }

    async fn cartons(&self) -> Result<Vec<Carton>, StoreError> {
        Ok(self.read()?.cartons.clone())
    }

    async fn boxes(&self) -> Result<Vec<CartonBox>, StoreError> {
        let mut boxes = self.read()?.boxes.clone();
        boxes.sort_by_key(CartonBox::canonical_key);
        Ok(boxes)
    }

    async fn issues(&self, limit: Option<usize>) -> Result<Vec<Issue>, StoreError> {
        let mut issues = self.read()?.issues.clone();
        sort_newest_first(&mut issues);
        if let Some(limit) = limit {
            issues.truncate(limit);
        }
        Ok(issues)
    }

    async fn issues_between(&self, from: NaiveDate, until: NaiveDate) -> Result<Vec<Issue>, StoreError> {
        let state = self.read()?;
        Ok(state
            .issues
            .iter()
            .filter(|i| i.issue_date >= from && i.issue_date < until)
            .cloned()
            .collect())
    }

    async fn count_cartons(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.cartons.len() as u64)
    }

    async fn count_issues(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.issues.len() as u64)
    }

    async fn total_available(&self) -> Result<u64, StoreError> {
        Ok(total_available(&self.read()?.boxes))
    }
}
