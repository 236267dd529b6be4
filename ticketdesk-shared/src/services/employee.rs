/// Employee lookups

use super::{cancellable, ServiceResult};
use crate::{dto::EmployeeDto, store::EntityStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Employee operations over an [`EntityStore`]
#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn EntityStore>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Fetches an employee with the IDs of its assigned tickets
    pub async fn get_employee_by_id(
        &self,
        employee_id: i32,
        token: &CancellationToken,
    ) -> ServiceResult<Option<EmployeeDto>> {
        info!(employee_id, "Getting employee by id");

        let record = cancellable(token, self.store.find_employee(employee_id)).await?;
        if record.is_none() {
            warn!(employee_id, "Employee not found");
        }

        Ok(record.map(EmployeeDto::from))
    }

    /// Lists every employee, ordered by ID
    pub async fn get_all_employees(&self, token: &CancellationToken) -> ServiceResult<Vec<EmployeeDto>> {
        info!("Getting all employees");

        let records = cancellable(token, self.store.list_employees()).await?;
        Ok(records.into_iter().map(EmployeeDto::from).collect())
    }
}
