use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum TaskStatus {
    #[serde(rename = "PENDIENTE")]
    #[sqlx(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "EN_PROGRESO")]
    #[sqlx(rename = "EN_PROGRESO")]
    InProgress,
    #[serde(rename = "COMPLETADA")]
    #[sqlx(rename = "COMPLETADA")]
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDIENTE",
            Self::InProgress => "EN_PROGRESO",
            Self::Completed => "COMPLETADA",
        }
    }

    /// Value of the derived `completed` flag for a task in this status.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub completed: bool,
    pub fecha: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for the store's `create`.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub fecha: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NewTaskRequest {
    #[schema(example = "Completar proyecto")]
    pub title: String,
    #[schema(example = "Finalizar la implementación de la API")]
    pub description: String,
    /// Due date, defaults to the creation time.
    #[serde(default)]
    #[schema(example = "2025-12-31T23:59:59Z", format = DateTime)]
    pub fecha: Option<String>,
}

impl NewTaskRequest {
    pub fn validate(self) -> Result<NewTask, AppError> {
        if self.title.is_empty() {
            return Err(AppError::Validation(
                "title is required and must not be empty".to_string(),
            ));
        }
        if self.description.is_empty() {
            return Err(AppError::Validation(
                "description is required and must not be empty".to_string(),
            ));
        }
        let fecha = self.fecha.as_deref().map(parse_fecha).transpose()?;

        Ok(NewTask {
            title: self.title,
            description: self.description,
            fecha,
        })
    }
}

/// Accepts an RFC 3339 date-time, a zoneless ISO-8601 date-time or a bare
/// `YYYY-MM-DD` date. Values without an offset are read as UTC.
fn parse_fecha(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::Validation(format!("fecha must be an ISO-8601 date: {raw}")))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskStatusRequest {
    #[schema(example = "COMPLETADA")]
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskQueryParams {
    /// Filter by status. Unrecognized values are ignored.
    #[param(value_type = Option<TaskStatus>)]
    pub estado: Option<String>,
}

// Read from raw pairs so a repeated `estado` key cannot fail the request.
impl<'de> Deserialize<'de> for TaskQueryParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = Vec::<(String, String)>::deserialize(deserializer)?;
        Ok(Self::from_pairs(pairs))
    }
}

impl TaskQueryParams {
    /// Takes the first `estado` from raw query pairs; repeated keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self {
            estado: pairs
                .into_iter()
                .find(|(key, _)| key == "estado")
                .map(|(_, value)| value),
        }
    }

    pub fn into_filter(self) -> TaskFilter {
        TaskFilter {
            status: self.estado.as_deref().and_then(|s| s.parse().ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, description: &str, fecha: Option<&str>) -> NewTaskRequest {
        NewTaskRequest {
            title: title.to_string(),
            description: description.to_string(),
            fecha: fecha.map(str::to_string),
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!("EN_PROGRESO".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!(TaskStatus::Completed.to_string(), "COMPLETADA");
        assert!("IN_PROGRESS".parse::<TaskStatus>().is_err());

        let json = serde_json::to_string(&TaskStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDIENTE\"");
    }

    #[test]
    fn test_only_completed_status_is_completed() {
        assert!(TaskStatus::Completed.is_completed());
        assert!(!TaskStatus::Pending.is_completed());
        assert!(!TaskStatus::InProgress.is_completed());
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(matches!(
            request("", "B", None).validate(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            request("A", "", None).validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_accepts_whitespace_only_fields() {
        let task = request("   ", " ", None).validate().unwrap();
        assert_eq!(task.title, "   ");
        assert_eq!(task.description, " ");
    }

    #[test]
    fn test_validate_parses_fecha() {
        let task = request("A", "B", Some("2025-12-31T23:59:59Z")).validate().unwrap();
        assert_eq!(task.fecha.unwrap().to_rfc3339(), "2025-12-31T23:59:59+00:00");

        let task = request("A", "B", Some("2025-12-31")).validate().unwrap();
        assert_eq!(task.fecha.unwrap().to_rfc3339(), "2025-12-31T00:00:00+00:00");

        let task = request("A", "B", Some("2025-12-31T23:59:59")).validate().unwrap();
        assert_eq!(task.fecha.unwrap().to_rfc3339(), "2025-12-31T23:59:59+00:00");

        let task = request("A", "B", Some("2025-12-31T23:59:59.250")).validate().unwrap();
        assert_eq!(task.fecha.unwrap().to_rfc3339(), "2025-12-31T23:59:59.250+00:00");

        let task = request("A", "B", Some("2025-12-31T23:59")).validate().unwrap();
        assert_eq!(task.fecha.unwrap().to_rfc3339(), "2025-12-31T23:59:00+00:00");

        let task = request("A", "B", None).validate().unwrap();
        assert!(task.fecha.is_none());

        assert!(matches!(
            request("A", "B", Some("mañana")).validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_estado_means_no_filter() {
        let params = TaskQueryParams {
            estado: Some("DONE".to_string()),
        };
        assert_eq!(params.into_filter(), TaskFilter::default());

        let params = TaskQueryParams {
            estado: Some("EN_PROGRESO".to_string()),
        };
        assert_eq!(params.into_filter().status, Some(TaskStatus::InProgress));
    }

    #[test]
    fn test_repeated_estado_takes_first() {
        let pairs = vec![
            ("estado".to_string(), "EN_PROGRESO".to_string()),
            ("estado".to_string(), "COMPLETADA".to_string()),
        ];
        let filter = TaskQueryParams::from_pairs(pairs).into_filter();
        assert_eq!(filter.status, Some(TaskStatus::InProgress));

        let filter = TaskQueryParams::from_pairs(Vec::new()).into_filter();
        assert_eq!(filter, TaskFilter::default());
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let now = Utc::now();
        let task = Task {
            id: "t1".to_string(),
            title: "A".to_string(),
            description: "B".to_string(),
            status: TaskStatus::Pending,
            completed: false,
            fecha: now,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["status"], "PENDIENTE");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("created_at").is_none());
    }
}
