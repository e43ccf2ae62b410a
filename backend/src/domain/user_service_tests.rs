//! Tests for the user service.

use std::sync::Arc;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{EventBusError, MockEventPublisher, MockUserRepository};
use chrono::{DateTime, Local, TimeZone, Utc};
use event_contracts::{Envelope, Topic};
use mockable::MockClock;
use mockall::predicate::{always, eq};
use rstest::{fixture, rstest};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 15, 11, 17, 5)
        .single()
        .expect("valid date")
}

fn clock(now: DateTime<Utc>) -> MockClock {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(now);
    clock.expect_local().return_const(now.with_timezone(&Local));
    clock
}

fn service(
    repository: MockUserRepository,
    publisher: MockEventPublisher,
    now: DateTime<Utc>,
) -> UserService {
    UserService::new(Arc::new(repository), Arc::new(publisher), Arc::new(clock(now)))
}

fn existing_user(count: u32) -> User {
    let mut user = User::from_draft(UserDraft {
        name: "Ada".to_owned(),
    });
    user.registered_objects = count;
    user
}

fn expect_confirmation(
    publisher: &mut MockEventPublisher,
    object_id: String,
    timestamp: String,
) {
    publisher
        .expect_publish()
        .with(eq(Topic::Confirmation), always())
        .times(1)
        .returning(move |_, payload| {
            let message = ConfirmationMessage::decode(&payload).expect("valid envelope");
            assert_eq!(message.object_id, object_id);
            assert_eq!(message.confirmation_timestamp, timestamp);
            Ok(())
        });
}

#[rstest]
#[tokio::test]
async fn create_publishes_confirmation_keyed_by_user(now: DateTime<Utc>) {
    let mut repository = MockUserRepository::new();
    repository
        .expect_insert()
        .withf(|user| user.registered_objects == 0 && user.name == "Grace")
        .times(1)
        .return_once(|_| Ok(()));
    let mut publisher = MockEventPublisher::new();
    publisher
        .expect_publish()
        .with(eq(Topic::Confirmation), always())
        .times(1)
        .returning(move |_, payload| {
            let message = ConfirmationMessage::decode(&payload).expect("valid envelope");
            let stamped = DateTime::parse_from_rfc3339(&message.confirmation_timestamp)
                .expect("rfc3339 timestamp");
            assert_eq!(stamped.with_timezone(&Utc), now);
            Ok(())
        });

    let user = service(repository, publisher, now)
        .create(UserDraft {
            name: "Grace".to_owned(),
        })
        .await
        .expect("create succeeds");
    assert_eq!(user.registered_objects, 0);
}

#[rstest]
#[tokio::test]
async fn create_succeeds_when_publish_fails(now: DateTime<Utc>) {
    let mut repository = MockUserRepository::new();
    repository.expect_insert().return_once(|_| Ok(()));
    let mut publisher = MockEventPublisher::new();
    publisher
        .expect_publish()
        .return_once(|_, _| Err(EventBusError::rejected("full")));

    let result = service(repository, publisher, now)
        .create(UserDraft::default())
        .await;
    assert!(result.is_ok());
}

#[rstest]
#[tokio::test]
async fn get_by_id_reports_missing_user(now: DateTime<Utc>) {
    let mut repository = MockUserRepository::new();
    repository.expect_find_by_id().return_once(|_| Ok(None));

    let err = service(repository, MockEventPublisher::new(), now)
        .get_by_id(&ObjectId::generate())
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_missing_user_does_not_mutate(now: DateTime<Utc>) {
    let mut repository = MockUserRepository::new();
    repository.expect_find_by_id().return_once(|_| Ok(None));
    repository.expect_delete().never();

    let err = service(repository, MockEventPublisher::new(), now)
        .delete(&ObjectId::generate())
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_removes_existing_user(now: DateTime<Utc>) {
    let user = existing_user(3);
    let id = user.id;
    let mut repository = MockUserRepository::new();
    repository
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));
    repository
        .expect_delete()
        .with(eq(id))
        .times(1)
        .return_once(|_| Ok(()));

    service(repository, MockEventPublisher::new(), now)
        .delete(&id)
        .await
        .expect("delete succeeds");
}

#[rstest]
#[case(0, 1)]
#[case(7, 8)]
#[tokio::test]
async fn process_news_increments_counter_once_and_confirms_news(
    now: DateTime<Utc>,
    #[case] before: u32,
    #[case] after: u32,
) {
    let user = existing_user(before);
    let user_id = user.id;
    let news_id = ObjectId::generate().to_string();
    let mut repository = MockUserRepository::new();
    repository
        .expect_find_by_id()
        .with(eq(user_id))
        .return_once(move |_| Ok(Some(user)));
    repository
        .expect_update()
        .withf(move |stored| stored.id == user_id && stored.registered_objects == after)
        .times(1)
        .return_once(|_| Ok(()));
    let mut publisher = MockEventPublisher::new();
    expect_confirmation(&mut publisher, news_id.clone(), now.to_rfc3339());

    let updated = service(repository, publisher, now)
        .process_news(&NewsProcessMessage::new(news_id, user_id.to_string()))
        .await
        .expect("processing succeeds");
    assert_eq!(updated.registered_objects, after);
}

#[rstest]
#[tokio::test]
async fn process_news_for_missing_user_publishes_nothing(now: DateTime<Utc>) {
    let mut repository = MockUserRepository::new();
    repository.expect_find_by_id().return_once(|_| Ok(None));
    repository.expect_update().never();
    let mut publisher = MockEventPublisher::new();
    publisher.expect_publish().never();

    let err = service(repository, publisher, now)
        .process_news(&NewsProcessMessage::new(
            ObjectId::generate().to_string(),
            ObjectId::generate().to_string(),
        ))
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn process_news_rejects_unreadable_user_id(now: DateTime<Utc>) {
    let mut repository = MockUserRepository::new();
    repository.expect_find_by_id().never();

    let err = service(repository, MockEventPublisher::new(), now)
        .process_news(&NewsProcessMessage::new("news", "someone"))
        .await
        .expect_err("invalid id");
    assert_eq!(err.code(), ErrorCode::Unprocessable);
}

#[rstest]
#[tokio::test]
async fn process_news_surfaces_store_failure(now: DateTime<Utc>) {
    let user = existing_user(0);
    let user_id = user.id;
    let mut repository = MockUserRepository::new();
    repository
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));
    repository
        .expect_update()
        .return_once(|_| Err(UserRepositoryError::query("deadlock")));
    let mut publisher = MockEventPublisher::new();
    publisher.expect_publish().never();

    let err = service(repository, publisher, now)
        .process_news(&NewsProcessMessage::new("news", user_id.to_string()))
        .await
        .expect_err("store failure");
    assert_eq!(err.code(), ErrorCode::Unprocessable);
}
