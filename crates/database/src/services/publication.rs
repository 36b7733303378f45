use crate::{
    entities::timetables,
    error::ServiceError,
    notification::{Notification, NotificationKind, NotificationSink},
    services::timetable::TimetableService,
};
use log::{info, warn};
use models::publication::Role;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

pub struct PublicationService;

impl PublicationService {
    /// Makes a timetable visible to students and teachers. A class without
    /// year, branch or section cannot be published.
    pub async fn publish(
        db: &DatabaseConnection,
        id: Uuid,
        actor: &str,
        notifier: &dyn NotificationSink,
    ) -> Result<timetables::Model, ServiceError> {
        let model = TimetableService::get(db, id).await?;

        let missing = model.identity().missing_fields();
        if !missing.is_empty() {
            return Err(ServiceError::Validation(format!(
                "cannot publish without {}",
                missing.join(", ")
            )));
        }

        let published = TimetableService::set_published(db, id, true, actor).await?;
        info!("Published timetable {id} by {actor}");

        let notification = Notification {
            kind: NotificationKind::TimetablePublished,
            timetable_id: id,
            class_label: published.identity().label(),
            actor_id: actor.to_string(),
        };
        if let Err(err) = notifier.notify(&notification) {
            warn!("Publishing timetable {id} succeeded but {err}");
        }

        Ok(published)
    }

    /// Hides a timetable again. The last publication time is kept.
    pub async fn unpublish(
        db: &DatabaseConnection,
        id: Uuid,
        actor: &str,
    ) -> Result<timetables::Model, ServiceError> {
        let unpublished = TimetableService::set_published(db, id, false, actor).await?;
        info!("Unpublished timetable {id} by {actor}");
        Ok(unpublished)
    }

    pub async fn set_published(
        db: &DatabaseConnection,
        id: Uuid,
        is_published: bool,
        actor: &str,
        notifier: &dyn NotificationSink,
    ) -> Result<timetables::Model, ServiceError> {
        if is_published {
            Self::publish(db, id, actor, notifier).await
        } else {
            Self::unpublish(db, id, actor).await
        }
    }

    /// Reads a timetable as `role` may see it. Hidden timetables look absent.
    pub async fn get_visible(
        db: &DatabaseConnection,
        id: Uuid,
        role: Role,
    ) -> Result<timetables::Model, ServiceError> {
        let model = TimetableService::get(db, id).await?;
        if model.state().is_visible_to(role) {
            Ok(model)
        } else {
            Err(ServiceError::NotFound(format!("timetable {id}")))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        notification::{LogNotifier, NotifyError},
        services::timetable::NewTimetable,
        testing::memory_db,
    };
    use models::{identity::ClassIdentity, publication::PublicationState};

    struct FailingNotifier;

    impl NotificationSink for FailingNotifier {
        fn notify(&self, _: &Notification) -> Result<(), NotifyError> {
            Err(NotifyError("mail relay down".to_string()))
        }
    }

    async fn create(db: &DatabaseConnection, identity: ClassIdentity) -> timetables::Model {
        TimetableService::create(
            db,
            NewTimetable {
                identity,
                ..Default::default()
            },
            "coord-1",
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_publish_requires_identity() {
        let db = memory_db().await;
        let model = create(&db, ClassIdentity::new("2nd Year", "mech", "", "2025-26")).await;

        let err = PublicationService::publish(&db, model.id, "coord-1", &LogNotifier)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m.contains("section")));

        let unchanged = TimetableService::get(&db, model.id).await.unwrap();
        assert!(!unchanged.is_published);
    }

    #[tokio::test]
    async fn test_publish_unpublish_cycle() {
        let db = memory_db().await;
        let model = create(&db, ClassIdentity::new("2nd Year", "mech", "A", "2025-26")).await;
        assert_eq!(model.state(), PublicationState::Draft);

        let published = PublicationService::publish(&db, model.id, "coord-1", &LogNotifier)
            .await
            .unwrap();
        assert_eq!(published.state(), PublicationState::Published);
        assert!(published.published_at.is_some());
        assert_eq!(published.published_at, published.last_published_at);

        let unpublished = PublicationService::unpublish(&db, model.id, "coord-1")
            .await
            .unwrap();
        assert_eq!(unpublished.state(), PublicationState::Unpublished);
        assert!(unpublished.published_at.is_none());
        assert_eq!(unpublished.last_published_at, published.last_published_at);
    }

    #[tokio::test]
    async fn test_notification_failure_is_swallowed() {
        let db = memory_db().await;
        let model = create(&db, ClassIdentity::new("4th Year", "civil", "B", "2025-26")).await;

        let published = PublicationService::publish(&db, model.id, "coord-1", &FailingNotifier)
            .await
            .unwrap();
        assert!(published.is_published);
    }

    #[tokio::test]
    async fn test_visibility_by_role() {
        let db = memory_db().await;
        let model = create(&db, ClassIdentity::new("1st Year", "it", "C", "2025-26")).await;

        assert!(
            PublicationService::get_visible(&db, model.id, Role::Coordinator)
                .await
                .is_ok()
        );
        let err = PublicationService::get_visible(&db, model.id, Role::Student)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        PublicationService::publish(&db, model.id, "coord-1", &LogNotifier)
            .await
            .unwrap();
        assert!(
            PublicationService::get_visible(&db, model.id, Role::Teacher)
                .await
                .is_ok()
        );
    }
}
