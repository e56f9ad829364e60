//! CSV export integration tests

mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test};
use chrono::NaiveDate;
use modtelemetry::errors::TelemetryError;
use modtelemetry::storage::UsageKey;
use modtelemetry::utils::{parse_csv, parse_export};

use common::{PASSWORD, TestEnv, files_in, setup};

async fn seed(env: &TestEnv) {
    let storage = &env.context.storage;
    storage.insert_mod("coolmod", "Cool Mod").await.unwrap();
    storage.insert_mod("othermod", "Other Mod").await.unwrap();

    let today = NaiveDate::from_ymd_opt(2025, 1, 22).unwrap();
    let pings = [
        ("coolmod", "1.20", "2.1", "fabric"),
        ("coolmod", "1.20", "2.1", "fabric"),
        ("coolmod", "1.19", "2.0", "forge"),
        ("othermod", "1.20", "1.0", "quilt"),
    ];
    for (mod_id, game_version, mod_version, loader) in pings {
        let key = UsageKey {
            mod_id: mod_id.to_string(),
            game_version: game_version.to_string(),
            mod_version: mod_version.to_string(),
            loader: loader.to_string(),
        };
        storage.record_usage(&key, today).await.unwrap();
    }
}

#[actix_rt::test]
async fn test_export_streams_csv_and_removes_file() {
    let env = setup(Some(PASSWORD)).await;
    seed(&env).await;
    let context = env.context.clone();
    let app = test::init_service(App::new().configure(move |cfg| context.configure(cfg))).await;

    let req = test::TestRequest::get()
        .uri(&format!("/telemetry/export/csv?password={}", PASSWORD))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let content_type = resp.headers().get("Content-Type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/csv"));
    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"telemetry_export_"));
    assert!(disposition.ends_with(".csv\""));

    let body = test::read_body(resp).await;
    let rows = parse_csv(body.as_ref()).unwrap();

    // 每条记录一行，mod 列是外部 mod_id
    assert_eq!(rows.len(), 3);
    let mut mod_ids: Vec<&str> = rows.iter().map(|r| r.mod_id.as_str()).collect();
    mod_ids.sort();
    assert_eq!(mod_ids, vec!["coolmod", "coolmod", "othermod"]);
    let hot = rows
        .iter()
        .find(|r| r.mod_id == "coolmod" && r.loader == "fabric")
        .unwrap();
    assert_eq!(hot.count, 2);
    assert_eq!(hot.last_used, "2025-01-22");

    assert_eq!(files_in(&env.export_dir), 0);
}

#[actix_rt::test]
async fn test_export_can_run_repeatedly() {
    let env = setup(Some(PASSWORD)).await;
    seed(&env).await;
    let context = env.context.clone();
    let app = test::init_service(App::new().configure(move |cfg| context.configure(cfg))).await;

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri(&format!("/telemetry/export/csv?password={}", PASSWORD))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(parse_csv(body.as_ref()).unwrap().len(), 3);
        assert_eq!(files_in(&env.export_dir), 0);
    }
}

#[actix_rt::test]
async fn test_export_with_wrong_password_creates_no_file() {
    let env = setup(Some(PASSWORD)).await;
    seed(&env).await;
    let context = env.context.clone();
    let app = test::init_service(App::new().configure(move |cfg| context.configure(cfg))).await;

    for uri in ["/telemetry/export/csv", "/telemetry/export/csv?password=nope"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(files_in(&env.export_dir), 0);
    }
}

#[actix_rt::test]
async fn test_empty_export_has_header_only() {
    let env = setup(Some(PASSWORD)).await;
    let context = env.context.clone();
    let app = test::init_service(App::new().configure(move |cfg| context.configure(cfg))).await;

    let req = test::TestRequest::get()
        .uri(&format!("/telemetry/export/csv?password={}", PASSWORD))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(
        std::str::from_utf8(&body).unwrap(),
        "mod_id,game_version,mod_version,loader,count,last_used\n"
    );
}

#[actix_rt::test]
async fn test_export_handle_owns_file() {
    let env = setup(Some(PASSWORD)).await;
    seed(&env).await;

    let export = env.context.reporting.export_csv(Some(PASSWORD)).await.unwrap();
    assert_eq!(export.rows(), 3);
    assert!(export.path().starts_with(&env.export_dir));
    assert_eq!(files_in(&env.export_dir), 1);

    let rows = parse_export(export.path()).unwrap();
    assert_eq!(rows.len(), 3);

    drop(export);
    assert_eq!(files_in(&env.export_dir), 0);

    let err = env.context.reporting.export_csv(None).await.unwrap_err();
    assert!(matches!(err, TelemetryError::Unauthorized(_)));
    assert_eq!(files_in(&env.export_dir), 0);
}

#[actix_rt::test]
async fn test_export_after_file_removed_externally() {
    let env = setup(Some(PASSWORD)).await;
    seed(&env).await;

    let export = env.context.reporting.export_csv(Some(PASSWORD)).await.unwrap();
    std::fs::remove_file(export.path()).unwrap();
    drop(export);

    let again = env.context.reporting.export_csv(Some(PASSWORD)).await.unwrap();
    assert_eq!(parse_export(again.path()).unwrap().len(), 3);
}

#[actix_rt::test]
async fn test_statistics_sum_matches_recorded_pings() {
    let env = setup(Some(PASSWORD)).await;
    seed(&env).await;
    let reporting = &env.context.reporting;

    let mods = reporting.most_used_mods(Some(PASSWORD)).await.unwrap();
    assert_eq!(mods[0].mod_name, "Cool Mod");
    assert_eq!(mods[0].usage, 3);
    assert_eq!(mods.iter().map(|m| m.usage).sum::<i64>(), 4);

    let games = reporting.most_used_game_versions(Some(PASSWORD)).await.unwrap();
    assert_eq!(games[0].game_version, "1.20");
    assert_eq!(games[0].usage, 3);
    assert_eq!(games.iter().map(|g| g.usage).sum::<i64>(), 4);

    let versions = reporting
        .most_used_mod_versions(Some(PASSWORD), "coolmod")
        .await
        .unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].mod_version, "2.1");
    assert_eq!(versions[0].usage, 2);
}
