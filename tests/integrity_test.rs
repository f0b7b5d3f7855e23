//! Reference validation and delete guards, exercised through the services.
//!
//! Run with: cargo test --test integrity_test

mod common;

use chrono::{Duration, TimeZone, Utc};
use fleet_db::entity::devices::DeviceStatus;
use fleet_db::entity::{devices, readings, EntityKind};
use fleet_db::error::AppError;
use fleet_db::integrity::{IntegrityEngine, IntegrityError, Record};
use fleet_db::services::{self, devices as device_service, readings as reading_service};
use fleet_db::services::{sensors as sensor_service, users as user_service, zones as zone_service};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use uuid::Uuid;

fn new_device(serial: &str, owner_id: Uuid, zone_id: Uuid) -> device_service::NewDevice {
    device_service::NewDevice {
        serial_number: serial.into(),
        model: Some("ESP32-WROOM".into()),
        owner_id,
        zone_id,
        installed_at: None,
        status: DeviceStatus::default(),
        sensors: vec![],
    }
}

async fn record_reading(db: &DatabaseConnection, sensor_id: Uuid, minutes_ago: i64, value: f64) {
    reading_service::create(
        db,
        reading_service::NewReading {
            sensor_id,
            time: Some(Utc::now() - Duration::minutes(minutes_ago)),
            value,
        },
    )
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Create: references must resolve
// ---------------------------------------------------------------------------

#[tokio::test]
async fn device_with_existing_owner_and_zone_is_created_active() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let zone = common::zone(&t.db, "Z1").await;

    let device = device_service::create(&t.db, new_device("SN-2024-001", owner, zone))
        .await
        .unwrap();

    assert_eq!(device.owner_id, owner);
    assert_eq!(device.zone_id, zone);
    assert_eq!(device.status, DeviceStatus::Active);
    assert!(device.sensors.0.is_empty());
}

#[tokio::test]
async fn device_with_unknown_owner_is_rejected_without_insert() {
    let t = common::test_db().await;
    let zone = common::zone(&t.db, "Z1").await;
    let ghost = Uuid::new_v4();

    let err = device_service::create(&t.db, new_device("SN-1", ghost, zone))
        .await
        .unwrap_err();

    match err {
        AppError::Integrity(IntegrityError::MissingReference { field, target, id }) => {
            assert_eq!(field, "ownerId");
            assert_eq!(target, EntityKind::User);
            assert_eq!(id, ghost);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(devices::Entity::find().count(&t.db).await.unwrap(), 0);
}

#[tokio::test]
async fn device_with_unknown_zone_names_zone_id() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;

    let err = device_service::create(&t.db, new_device("SN-1", owner, Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Integrity(IntegrityError::MissingReference { field: "zoneId", target: EntityKind::Zone, .. })
    ));
}

#[tokio::test]
async fn first_missing_reference_in_registry_order_is_reported() {
    let t = common::test_db().await;

    let err = device_service::create(&t.db, new_device("SN-1", Uuid::new_v4(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Integrity(IntegrityError::MissingReference { field: "ownerId", .. })
    ));
}

#[tokio::test]
async fn reading_for_unknown_sensor_is_rejected_without_insert() {
    let t = common::test_db().await;

    let err = reading_service::create(
        &t.db,
        reading_service::NewReading {
            sensor_id: Uuid::new_v4(),
            time: None,
            value: 25.4,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        AppError::Integrity(IntegrityError::MissingReference { field: "sensorId", target: EntityKind::Sensor, .. })
    ));
    assert_eq!(readings::Entity::find().count(&t.db).await.unwrap(), 0);
}

#[tokio::test]
async fn reading_keeps_its_sensor_reference() {
    let t = common::test_db().await;
    let sensor = common::sensor(&t.db, "Boiler room").await;

    let reading = reading_service::create(
        &t.db,
        reading_service::NewReading {
            sensor_id: sensor,
            time: None,
            value: 25.4,
        },
    )
    .await
    .unwrap();

    assert_eq!(reading.sensor_id, sensor);
    assert!((reading.value - 25.4).abs() < f64::EPSILON);
}

// ---------------------------------------------------------------------------
// Update: changed references are resolved again
// ---------------------------------------------------------------------------

#[tokio::test]
async fn device_update_to_unknown_zone_is_rejected_and_leaves_record_untouched() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let zone = common::zone(&t.db, "Z1").await;
    let device = device_service::create(&t.db, new_device("SN-1", owner, zone))
        .await
        .unwrap();

    let err = device_service::update(
        &t.db,
        device.id,
        device_service::DevicePatch {
            zone_id: Some(Uuid::new_v4()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        AppError::Integrity(IntegrityError::MissingReference { field: "zoneId", .. })
    ));
    let stored = device_service::get(&t.db, device.id).await.unwrap();
    assert_eq!(stored.zone_id, zone);
}

#[tokio::test]
async fn device_update_persists_and_returns_new_values() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let zone = common::zone(&t.db, "Z1").await;
    let other_zone = common::zone(&t.db, "Z2").await;
    let device = device_service::create(&t.db, new_device("SN-1", owner, zone))
        .await
        .unwrap();

    let updated = device_service::update(
        &t.db,
        device.id,
        device_service::DevicePatch {
            zone_id: Some(other_zone),
            status: Some(DeviceStatus::Maintenance),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.zone_id, other_zone);
    assert_eq!(updated.status, DeviceStatus::Maintenance);
    assert_eq!(updated.serial_number, "SN-1");

    let stored = device_service::get(&t.db, device.id).await.unwrap();
    assert_eq!(stored.zone_id, other_zone);
    assert_eq!(stored.status, DeviceStatus::Maintenance);
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let t = common::test_db().await;

    let err = zone_service::update(&t.db, Uuid::new_v4(), Default::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// Delete: restricting edges
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sensor_with_reading_cannot_be_deleted_until_reading_is_removed() {
    let t = common::test_db().await;
    let sensor = common::sensor(&t.db, "S1").await;
    let reading = reading_service::create(
        &t.db,
        reading_service::NewReading {
            sensor_id: sensor,
            time: None,
            value: 25.4,
        },
    )
    .await
    .unwrap();

    let err = sensor_service::delete(&t.db, sensor).await.unwrap_err();
    match err {
        AppError::Integrity(IntegrityError::DependentsExist {
            dependent,
            field,
            count,
        }) => {
            assert_eq!(dependent, EntityKind::Reading);
            assert_eq!(field, "sensorId");
            assert_eq!(count, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(sensor_service::get(&t.db, sensor).await.is_ok());

    reading_service::delete(&t.db, reading.id).await.unwrap();
    let removed = sensor_service::delete(&t.db, sensor).await.unwrap();

    assert_eq!(removed.id, sensor);
    assert!(matches!(
        sensor_service::get(&t.db, sensor).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn dependent_count_is_exact() {
    let t = common::test_db().await;
    let sensor = common::sensor(&t.db, "S1").await;
    let other = common::sensor(&t.db, "S2").await;
    for i in 0..3 {
        record_reading(&t.db, sensor, i, 20.0 + i as f64).await;
    }
    record_reading(&t.db, other, 0, 1.0).await;

    let err = sensor_service::delete(&t.db, sensor).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Integrity(IntegrityError::DependentsExist { count: 3, .. })
    ));
}

#[tokio::test]
async fn user_owning_devices_cannot_be_deleted() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let zone = common::zone(&t.db, "Z1").await;
    device_service::create(&t.db, new_device("SN-1", owner, zone))
        .await
        .unwrap();
    device_service::create(&t.db, new_device("SN-2", owner, zone))
        .await
        .unwrap();

    let err = user_service::delete(&t.db, owner).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Integrity(IntegrityError::DependentsExist {
            dependent: EntityKind::Device,
            field: "ownerId",
            count: 2,
        })
    ));
    assert!(user_service::get(&t.db, owner).await.is_ok());
}

#[tokio::test]
async fn zone_with_devices_cannot_be_deleted() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let zone = common::zone(&t.db, "Z1").await;
    let device = device_service::create(&t.db, new_device("SN-1", owner, zone))
        .await
        .unwrap();

    let err = zone_service::delete(&t.db, zone).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Integrity(IntegrityError::DependentsExist {
            field: "zoneId",
            count: 1,
            ..
        })
    ));

    device_service::delete(&t.db, device.id).await.unwrap();
    zone_service::delete(&t.db, zone).await.unwrap();
    user_service::delete(&t.db, owner).await.unwrap();
}

#[tokio::test]
async fn targets_without_dependents_are_deleted() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let zone = common::zone(&t.db, "Z1").await;
    let sensor = common::sensor(&t.db, "S1").await;

    user_service::delete(&t.db, owner).await.unwrap();
    zone_service::delete(&t.db, zone).await.unwrap();
    sensor_service::delete(&t.db, sensor).await.unwrap();
}

#[tokio::test]
async fn delete_of_missing_record_is_not_found() {
    let t = common::test_db().await;

    let err = user_service::delete(&t.db, Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// Delete: device self-guard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn device_without_sensors_is_deleted() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let zone = common::zone(&t.db, "Z1").await;
    let device = device_service::create(&t.db, new_device("SN-1", owner, zone))
        .await
        .unwrap();

    let removed = device_service::delete(&t.db, device.id).await.unwrap();

    assert_eq!(removed.id, device.id);
    assert_eq!(devices::Entity::find().count(&t.db).await.unwrap(), 0);
}

#[tokio::test]
async fn device_listing_sensors_is_guarded_until_detached() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let zone = common::zone(&t.db, "Z1").await;
    let s1 = common::sensor(&t.db, "S1").await;
    let s2 = common::sensor(&t.db, "S2").await;
    let mut input = new_device("SN-1", owner, zone);
    input.sensors = vec![s1, s2];
    let device = device_service::create(&t.db, input).await.unwrap();
    assert_eq!(device.sensors.0, vec![s1, s2]);

    let err = device_service::delete(&t.db, device.id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Integrity(IntegrityError::ListNotEmpty {
            field: "sensors",
            len: 2
        })
    ));
    assert!(device_service::get(&t.db, device.id).await.is_ok());

    device_service::update(
        &t.db,
        device.id,
        device_service::DevicePatch {
            sensors: Some(vec![]),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    device_service::delete(&t.db, device.id).await.unwrap();
}

#[tokio::test]
async fn mounted_sensor_is_not_guarded_by_its_device() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let zone = common::zone(&t.db, "Z1").await;
    let sensor = common::sensor(&t.db, "S1").await;
    let mut input = new_device("SN-1", owner, zone);
    input.sensors = vec![sensor];
    device_service::create(&t.db, input).await.unwrap();

    sensor_service::delete(&t.db, sensor).await.unwrap();
}

// ---------------------------------------------------------------------------
// Listing and projection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sensor_history_is_most_recent_first() {
    let t = common::test_db().await;
    let sensor = common::sensor(&t.db, "S1").await;
    let other = common::sensor(&t.db, "S2").await;
    for (minutes_ago, value) in [(30, 1.0), (5, 2.0), (60, 3.0), (15, 4.0)] {
        record_reading(&t.db, sensor, minutes_ago, value).await;
    }
    record_reading(&t.db, other, 1, 99.0).await;

    let history = reading_service::list_by_sensor(&t.db, sensor, Default::default())
        .await
        .unwrap();

    assert_eq!(history.len(), 4);
    assert!(history.iter().all(|r| r.sensor_id == sensor));
    assert!(history.windows(2).all(|w| w[0].time >= w[1].time));
    let values: Vec<f64> = history.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![2.0, 4.0, 1.0, 3.0]);
}

#[tokio::test]
async fn sensor_history_respects_time_bounds() {
    let t = common::test_db().await;
    let sensor = common::sensor(&t.db, "S1").await;
    let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    for hour in 0..5 {
        reading_service::create(
            &t.db,
            reading_service::NewReading {
                sensor_id: sensor,
                time: Some(base + Duration::hours(hour)),
                value: hour as f64,
            },
        )
        .await
        .unwrap();
    }

    let range = reading_service::TimeRange {
        start: Some(base + Duration::hours(1)),
        end: Some(base + Duration::hours(3)),
    };
    let history = reading_service::list_by_sensor(&t.db, sensor, range)
        .await
        .unwrap();

    let values: Vec<f64> = history.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![3.0, 2.0, 1.0]);
}

#[tokio::test]
async fn unknown_sensor_history_is_empty() {
    let t = common::test_db().await;

    let history = reading_service::list_by_sensor(&t.db, Uuid::new_v4(), Default::default())
        .await
        .unwrap();

    assert!(history.is_empty());
}

#[tokio::test]
async fn user_reads_never_expose_the_password() {
    let t = common::test_db().await;
    let id = common::user(&t.db, "u1@example.com").await;
    common::user(&t.db, "u2@example.com").await;

    let one = serde_json::to_value(user_service::get(&t.db, id).await.unwrap()).unwrap();
    let all = serde_json::to_value(user_service::list(&t.db).await.unwrap()).unwrap();
    let updated = serde_json::to_value(
        user_service::update(
            &t.db,
            id,
            user_service::UserPatch {
                password: Some("rotated".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap(),
    )
    .unwrap();

    for value in [&one, &updated] {
        let obj = value.as_object().unwrap();
        assert!(!obj.keys().any(|k| k.to_lowercase().contains("password")));
    }
    for value in all.as_array().unwrap() {
        let obj = value.as_object().unwrap();
        assert!(!obj.keys().any(|k| k.to_lowercase().contains("password")));
    }
}

#[tokio::test]
async fn stored_password_is_a_verifiable_hash() {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    let t = common::test_db().await;
    let id = common::user(&t.db, "u1@example.com").await;

    let stored = fleet_db::entity::users::Entity::find_by_id(id)
        .one(&t.db)
        .await
        .unwrap()
        .unwrap();

    assert_ne!(stored.password_hash, "correct horse battery staple");
    let parsed = PasswordHash::new(&stored.password_hash).unwrap();
    assert!(argon2::Argon2::default()
        .verify_password(b"correct horse battery staple", &parsed)
        .is_ok());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict_from_the_store() {
    let t = common::test_db().await;
    common::user(&t.db, "dup@example.com").await;

    let err = user_service::create(
        &t.db,
        user_service::NewUser {
            name: "Other".into(),
            email: "dup@example.com".into(),
            password: "pw".into(),
            role: Default::default(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Database(_)));
    assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn device_list_filters_by_zone() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let z1 = common::zone(&t.db, "Z1").await;
    let z2 = common::zone(&t.db, "Z2").await;
    device_service::create(&t.db, new_device("SN-1", owner, z1))
        .await
        .unwrap();
    device_service::create(&t.db, new_device("SN-2", owner, z2))
        .await
        .unwrap();

    let in_z2 = device_service::list(
        &t.db,
        device_service::DeviceFilter {
            zone_id: Some(z2),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(in_z2.len(), 1);
    assert_eq!(in_z2[0].serial_number, "SN-2");
}

// ---------------------------------------------------------------------------
// Engine directly
// ---------------------------------------------------------------------------

struct OrphanReading;

impl Record for OrphanReading {
    const KIND: EntityKind = EntityKind::Reading;
}

#[tokio::test]
async fn unset_required_reference_is_reported() {
    let t = common::test_db().await;

    let err = IntegrityEngine::new(&t.db)
        .validate_references(&OrphanReading)
        .await
        .unwrap_err();

    assert!(matches!(err, IntegrityError::UnsetReference { field: "sensorId" }));
}

#[tokio::test]
async fn guards_come_only_from_the_registry() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let zone = common::zone(&t.db, "Z1").await;
    device_service::create(&t.db, new_device("SN-1", owner, zone))
        .await
        .unwrap();
    let stored = fleet_db::entity::users::Entity::find_by_id(owner)
        .one(&t.db)
        .await
        .unwrap()
        .unwrap();

    let unguarded = IntegrityEngine::with_relations(&t.db, &[]);
    assert!(unguarded.check_deletable(owner, &stored).await.is_ok());
    assert!(IntegrityEngine::new(&t.db)
        .check_deletable(owner, &stored)
        .await
        .is_err());
}

#[tokio::test]
async fn blank_required_text_is_a_bad_request() {
    let t = common::test_db().await;

    let err = services::zones::create(
        &t.db,
        zone_service::NewZone {
            name: "  ".into(),
            description: None,
            is_active: true,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
}

// ---------------------------------------------------------------------------
// Kind-addressed store queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_counts_references_by_column() {
    let t = common::test_db().await;
    let sensor = common::sensor(&t.db, "S1").await;
    record_reading(&t.db, sensor, 0, 1.0).await;
    record_reading(&t.db, sensor, 1, 2.0).await;

    let count = fleet_db::store::count_referencing(&t.db, EntityKind::Reading, "sensor_id", sensor)
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert!(fleet_db::store::exists(&t.db, EntityKind::Sensor, sensor).await.unwrap());
    assert!(!fleet_db::store::exists(&t.db, EntityKind::Sensor, Uuid::new_v4())
        .await
        .unwrap());
}

// ---------------------------------------------------------------------------
// Expanded reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn device_reads_resolve_owner_zone_and_sensors_in_order() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let zone = common::zone(&t.db, "Z1").await;
    let s1 = common::sensor(&t.db, "S1").await;
    let s2 = common::sensor(&t.db, "S2").await;
    let mut input = new_device("SN-1", owner, zone);
    input.sensors = vec![s2, s1];
    let device = device_service::create(&t.db, input).await.unwrap();

    let expanded = device_service::get_with_relations(&t.db, device.id).await.unwrap();

    assert_eq!(expanded.device.id, device.id);
    assert_eq!(expanded.owner.map(|u| u.email), Some("u1@example.com".to_string()));
    assert_eq!(expanded.zone.map(|z| z.name), Some("Z1".to_string()));
    let ids: Vec<Uuid> = expanded.sensors.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![s2, s1]);
}

#[tokio::test]
async fn vanished_sensor_is_left_out_of_the_expanded_device() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let zone = common::zone(&t.db, "Z1").await;
    let kept = common::sensor(&t.db, "S1").await;
    let removed = common::sensor(&t.db, "S2").await;
    let mut input = new_device("SN-1", owner, zone);
    input.sensors = vec![kept, removed];
    device_service::create(&t.db, input).await.unwrap();
    sensor_service::delete(&t.db, removed).await.unwrap();

    let listed = device_service::list_with_relations(&t.db, Default::default())
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].device.sensors.0, vec![kept, removed]);
    let ids: Vec<Uuid> = listed[0].sensors.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![kept]);
}

#[tokio::test]
async fn readings_resolve_their_sensor() {
    let t = common::test_db().await;
    let sensor = common::sensor(&t.db, "Boiler room").await;
    record_reading(&t.db, sensor, 0, 21.5).await;

    let listed = reading_service::list_with_sensor(&t.db).await.unwrap();
    assert_eq!(listed.len(), 1);
    let attached = listed[0].sensor.as_ref().unwrap();
    assert_eq!(attached.id, sensor);
    assert_eq!(attached.location, "Boiler room");

    let one = reading_service::get_with_sensor(&t.db, listed[0].reading.id)
        .await
        .unwrap();
    assert_eq!(one.sensor.map(|s| s.id), Some(sensor));
}

// ---------------------------------------------------------------------------
// Clearing optional fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patch_can_clear_optional_device_model() {
    let t = common::test_db().await;
    let owner = common::user(&t.db, "u1@example.com").await;
    let zone = common::zone(&t.db, "Z1").await;
    let device = device_service::create(&t.db, new_device("SN-1", owner, zone))
        .await
        .unwrap();
    assert!(device.model.is_some());

    let untouched = device_service::update(&t.db, device.id, Default::default())
        .await
        .unwrap();
    assert_eq!(untouched.model, device.model);

    let cleared = device_service::update(
        &t.db,
        device.id,
        device_service::DevicePatch {
            model: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.model, None);
    assert_eq!(device_service::get(&t.db, device.id).await.unwrap().model, None);
}
