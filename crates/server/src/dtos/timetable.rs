use super::{PaginationMeta, default_page, default_per_page, default_true};
use chrono::{NaiveDateTime, NaiveTime};
use database::{entities::timetables, services::timetable::TeacherAssignment};
use models::{
    activity::{Activity, Subject},
    availability::Booking,
    days::Day,
    grid::{Grid, GridEntry},
    slot::{SlotKey, TimeSlot},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimetableResponse {
    pub id: Uuid,
    pub year: String,
    pub branch: String,
    pub section: String,
    pub academic_year: String,
    /// e.g. `2nd Year CSE A`
    pub class_label: String,
    /// `draft`, `published` or `unpublished`
    pub state: String,
    /// Slots of the day in order, as `HH:MM-HH:MM`
    #[schema(value_type = Vec<String>)]
    pub slots: Vec<TimeSlot>,
    #[schema(value_type = Vec<Object>)]
    pub grid: Grid,
    pub is_published: bool,
    pub published_at: Option<NaiveDateTime>,
    pub last_published_at: Option<NaiveDateTime>,
    pub created_by: String,
    pub last_modified_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<timetables::Model> for TimetableResponse {
    fn from(model: timetables::Model) -> Self {
        let class_label = model.identity().label();
        let state = model.state().to_string();
        let slots = model.effective_catalog().slots().to_vec();

        Self {
            id: model.id,
            year: model.year,
            branch: model.branch,
            section: model.section,
            academic_year: model.academic_year,
            class_label,
            state,
            slots,
            grid: model.grid,
            is_published: model.is_published,
            published_at: model.published_at,
            last_published_at: model.last_published_at,
            created_by: model.created_by,
            last_modified_by: model.last_modified_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimetableRequest {
    pub year: String,
    pub branch: String,
    pub section: String,
    pub academic_year: String,
    /// Omit for the standard day
    #[schema(value_type = Option<Vec<String>>)]
    pub slots: Option<Vec<TimeSlot>>,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub grid: Grid,
}

/// `grid` replaces every cell, `cells` upserts the given ones. At most one
/// of the two may be sent.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimetableRequest {
    #[schema(value_type = Option<Vec<String>>)]
    pub slots: Option<Vec<TimeSlot>>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub grid: Option<Grid>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub cells: Option<Vec<GridEntry>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub is_published: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignCellRequest {
    #[schema(value_type = String, example = "Monday")]
    pub day: Day,
    #[schema(value_type = String, example = "08:50-09:50")]
    pub time_slot: TimeSlot,
    /// Tagged by `kind`: lecture, lab, split-lab, lunch, break, library,
    /// mini-project or mentor
    #[schema(value_type = Object)]
    pub activity: Activity,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignCellResponse {
    pub timetable: TimetableResponse,
    /// False when the identical activity was already in place
    pub changed: bool,
    #[schema(value_type = Vec<Object>)]
    pub cells: Vec<SlotKey>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CellQuery {
    #[param(value_type = String)]
    pub day: Day,
    #[param(value_type = String)]
    pub time_slot: TimeSlot,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", tag = "action")]
pub enum SlotEditRequest {
    Add {
        #[schema(value_type = String)]
        slot: TimeSlot,
    },
    Remove {
        #[schema(value_type = String)]
        slot: TimeSlot,
    },
    /// Later slots shift by the same amount
    Resize {
        #[schema(value_type = String)]
        slot: TimeSlot,
        #[schema(value_type = String, example = "10:00:00")]
        end: NaiveTime,
    },
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TimetableListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub year: Option<String>,
    pub branch: Option<String>,
    pub section: Option<String>,
    pub academic_year: Option<String>,
    /// Ignored for non-coordinators, who only see published timetables
    pub is_published: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedTimetablesResponse {
    pub timetables: Vec<TimetableResponse>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ClassQuery {
    pub year: Option<String>,
    pub academic_year: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ClashQuery {
    #[param(value_type = String)]
    pub day: Day,
    /// The slot to check, as `HH:MM-HH:MM`
    #[param(value_type = String)]
    pub slot_key: TimeSlot,
    /// Honoured for coordinators; other readers only see published timetables
    #[serde(default = "default_true")]
    pub include_drafts: bool,
    /// Timetable to leave out, usually the one being edited
    pub exclude: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClashResponse {
    pub busy_teachers: Vec<Uuid>,
    #[schema(value_type = Vec<Object>)]
    pub clashes: Vec<Booking>,
}

/// One slot a teacher holds
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSlotResponse {
    pub timetable_id: Uuid,
    pub class_label: String,
    pub academic_year: String,
    #[schema(value_type = String)]
    pub day: Day,
    #[schema(value_type = String)]
    pub time_slot: TimeSlot,
    #[schema(value_type = Object)]
    pub activity: Activity,
    /// What this teacher covers; for split labs, their own batch's subject
    #[schema(value_type = Option<Object>)]
    pub subject: Option<Subject>,
    pub is_continuation: bool,
}

impl From<TeacherAssignment> for TeacherSlotResponse {
    fn from(assignment: TeacherAssignment) -> Self {
        Self {
            timetable_id: assignment.timetable_id,
            class_label: assignment.class.label(),
            academic_year: assignment.class.academic_year,
            day: assignment.day,
            time_slot: assignment.time_slot,
            activity: assignment.activity,
            subject: assignment.subject,
            is_continuation: assignment.is_continuation,
        }
    }
}
