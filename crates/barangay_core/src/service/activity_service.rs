//! Community activity scheduling service.

use super::{RecordResult, RecordServiceError};
use crate::model::activity::{Activity, ActivityId, ActivityStatus};
use crate::repo::activity_repo::{ActivityListQuery, ActivityRepository};
use log::info;

pub struct ActivityService<A: ActivityRepository> {
    repo: A,
}

impl<A: ActivityRepository> ActivityService<A> {
    pub fn new(repo: A) -> Self {
        Self { repo }
    }

    pub fn schedule_activity(&self, activity: &Activity) -> RecordResult<Activity> {
        let mut activity = activity.clone();
        activity.normalize()?;
        let id = self.repo.create_activity(&activity)?;
        info!(
            "event=activity_schedule module=service status=ok activity_id={id} activity_status={}",
            activity.status.as_str()
        );
        self.fetch(id)
    }

    pub fn update_activity(&self, activity: &Activity) -> RecordResult<Activity> {
        let mut activity = activity.clone();
        activity.normalize()?;
        self.repo.update_activity(&activity)?;
        self.fetch(activity.id)
    }

    /// Moves the activity to `status`, optionally recording attendance.
    pub fn set_status(
        &self,
        id: ActivityId,
        status: ActivityStatus,
        participants_count: Option<u32>,
    ) -> RecordResult<Activity> {
        let mut activity = self.fetch(id)?;
        activity.status = status;
        if participants_count.is_some() {
            activity.participants_count = participants_count;
        }
        self.repo.update_activity(&activity)?;
        self.fetch(id)
    }

    pub fn list_activities(&self, status: Option<ActivityStatus>) -> RecordResult<Vec<Activity>> {
        Ok(self.repo.list_activities(&ActivityListQuery { status })?)
    }

    pub fn delete_activity(&self, id: ActivityId) -> RecordResult<()> {
        self.repo.delete_activity(id)?;
        Ok(())
    }

    fn fetch(&self, id: ActivityId) -> RecordResult<Activity> {
        self.repo
            .get_activity(id)?
            .ok_or(RecordServiceError::NotFound {
                table: "activities",
                id,
            })
    }
}
