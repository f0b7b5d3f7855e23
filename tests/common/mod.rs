//! Shared fixtures: a migrated SQLite database in a temporary directory.

#![allow(dead_code)]

use fleet_db::config::Config;
use fleet_db::entity::sensors::SensorType;
use fleet_db::services::{sensors, users, zones};
use sea_orm::DatabaseConnection;
use tempfile::TempDir;
use uuid::Uuid;

pub struct TestDb {
    pub db: DatabaseConnection,
    pub config: Config,
    _dir: TempDir,
}

pub async fn test_db() -> TestDb {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("fleet.db").display());
    let config = Config::for_database(url);
    let db = fleet_db::db::connect(&config).await.unwrap();
    TestDb {
        db,
        config,
        _dir: dir,
    }
}

pub async fn user(db: &DatabaseConnection, email: &str) -> Uuid {
    users::create(
        db,
        users::NewUser {
            name: "Ana Torres".into(),
            email: email.into(),
            password: "correct horse battery staple".into(),
            role: Default::default(),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn zone(db: &DatabaseConnection, name: &str) -> Uuid {
    zones::create(
        db,
        zones::NewZone {
            name: name.into(),
            description: None,
            is_active: true,
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn sensor(db: &DatabaseConnection, location: &str) -> Uuid {
    sensors::create(
        db,
        sensors::NewSensor {
            sensor_type: SensorType::Temperature,
            unit: "°C".into(),
            model: Some("DHT22".into()),
            location: location.into(),
            is_active: true,
        },
    )
    .await
    .unwrap()
    .id
}
