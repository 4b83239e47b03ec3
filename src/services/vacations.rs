use crate::{
    entities::{
        employee::{self, Entity as Employee},
        vacation::{self, Entity as Vacation, VacationStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CreateVacationInput {
    pub tenant_id: Uuid,
    pub employee_id: Uuid,
    pub vacation_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

/// Vacation scheduling with conflict detection: no two pending or approved
/// vacations of one employee may overlap in dates.
#[derive(Clone)]
pub struct VacationService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl VacationService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id, employee_id = %input.employee_id))]
    pub async fn create_vacation(
        &self,
        input: CreateVacationInput,
    ) -> Result<vacation::Model, ServiceError> {
        if input.end_date < input.start_date {
            return Err(ServiceError::ValidationError(
                "end date must not precede start date".to_string(),
            ));
        }

        let emp = Employee::find_by_id(input.employee_id)
            .filter(employee::Column::TenantId.eq(input.tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Employee {} not found", input.employee_id))
            })?;
        if !emp.is_active() {
            return Err(ServiceError::InvalidOperation(format!(
                "employee {} {} is not active",
                emp.first_name, emp.last_name
            )));
        }

        // Two ranges overlap when each starts no later than the other ends.
        let conflicting = Vacation::find()
            .filter(vacation::Column::TenantId.eq(input.tenant_id))
            .filter(vacation::Column::EmployeeId.eq(input.employee_id))
            .filter(
                vacation::Column::Status.is_in([
                    VacationStatus::Pending.as_str(),
                    VacationStatus::Approved.as_str(),
                ]),
            )
            .filter(vacation::Column::StartDate.lte(input.end_date))
            .filter(vacation::Column::EndDate.gte(input.start_date))
            .one(&*self.db)
            .await?;
        if let Some(existing) = conflicting {
            return Err(ServiceError::Conflict(format!(
                "vacation request overlaps an existing {} request from {} to {}",
                existing.status, existing.start_date, existing.end_date
            )));
        }

        let days = inclusive_day_count(input.start_date, input.end_date);

        let created = vacation::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(input.tenant_id),
            employee_id: Set(input.employee_id),
            vacation_type: Set(input.vacation_type),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            days: Set(days),
            status: Set(VacationStatus::Pending.as_str().to_string()),
            reason: Set(input.reason),
            rejection_reason: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::VacationRequested {
                vacation_id: created.id,
                tenant_id: created.tenant_id,
                employee_id: created.employee_id,
                start_date: created.start_date,
                end_date: created.end_date,
            })
            .await;

        info!(vacation_id = %created.id, days, "vacation requested");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn approve_vacation(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        approver: Uuid,
    ) -> Result<vacation::Model, ServiceError> {
        let vac = self.require_pending(id, tenant_id, VacationStatus::Approved).await?;

        let mut active: vacation::ActiveModel = vac.into();
        active.status = Set(VacationStatus::Approved.as_str().to_string());
        active.approved_by = Set(Some(approver));
        active.approved_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::VacationApproved {
                vacation_id: id,
                tenant_id,
            })
            .await;

        Ok(updated)
    }

    #[instrument(skip(self, reason))]
    pub async fn reject_vacation(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        approver: Uuid,
        reason: Option<String>,
    ) -> Result<vacation::Model, ServiceError> {
        let vac = self.require_pending(id, tenant_id, VacationStatus::Rejected).await?;

        let mut active: vacation::ActiveModel = vac.into();
        active.status = Set(VacationStatus::Rejected.as_str().to_string());
        active.approved_by = Set(Some(approver));
        active.approved_at = Set(Some(Utc::now()));
        active.rejection_reason = Set(reason);

        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::VacationRejected {
                vacation_id: id,
                tenant_id,
            })
            .await;

        Ok(updated)
    }

    pub async fn list_vacations(
        &self,
        employee_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Vec<vacation::Model>, ServiceError> {
        let vacations = Vacation::find()
            .filter(vacation::Column::TenantId.eq(tenant_id))
            .filter(vacation::Column::EmployeeId.eq(employee_id))
            .order_by_desc(vacation::Column::StartDate)
            .all(&*self.db)
            .await?;
        Ok(vacations)
    }

    async fn require_pending(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        target: VacationStatus,
    ) -> Result<vacation::Model, ServiceError> {
        let vac = Vacation::find_by_id(id)
            .filter(vacation::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vacation {} not found", id)))?;

        match vac.status() {
            Some(VacationStatus::Pending) => Ok(vac),
            Some(current) => Err(ServiceError::invalid_transition(current, target)),
            None => Err(ServiceError::InternalError(format!(
                "vacation {} has unknown status {}",
                vac.id, vac.status
            ))),
        }
    }
}

/// Inclusive day count: a single-day vacation is 1 day.
fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i32 {
    (end - start).num_days() as i32 + 1
}
