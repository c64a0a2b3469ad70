// ==========================================
// DashboardApi 集成测试
// ==========================================
// 测试目标: 会话生命周期、交互查询、报告与导出、配置驱动
// ==========================================


use chrono::{NaiveDate, NaiveDateTime};
use seistrack_power::config::{config_keys, ConfigManager};
use seistrack_power::domain::types::{CanonicalField, Channel};
use seistrack_power::logging;
use seistrack_power::{ApiError, CalibrationReference, DashboardApi, HarvestGridOutcome};
use test_helpers::{approx_eq, build_csv, canonical_csv, inputs_for, sample_rows};

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 4, 9)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

/// 已完成一次成功运行的会话
fn ready_api(locale: &str) -> DashboardApi {
    let mut api = DashboardApi::new(0.5, locale);
    api.on_inputs_changed(inputs_for("plant_day.csv", &canonical_csv(4)))
        .expect("运行失败");
    api
}

// ==========================================
// 会话生命周期
// ==========================================

#[test]
fn test_session_rerun_replaces_result() {
    logging::init_test();

    let mut api = ready_api("en");
    let first_run = api.current().expect("应有结果").run_id.clone();

    let mut inputs = inputs_for("plant_day.csv", &canonical_csv(4));
    inputs.calibration_reference = CalibrationReference {
        input_min: 0.0,
        input_max: 100.0,
        output_min: 0.0,
        output_max: 50.0,
    };
    let out = api.on_inputs_changed(inputs).expect("重跑失败");
    assert_ne!(out.run_id, first_run);
    assert!(approx_eq(out.records[0].pv_w, 500.0));
    assert_eq!(api.last_inputs().map(|i| i.file_name.as_str()), Some("plant_day.csv"));
}

#[test]
fn test_failed_rerun_leaves_no_result() {
    logging::init_test();

    let mut api = ready_api("en");
    let mut inputs = inputs_for("plant_day.csv", &canonical_csv(4));
    inputs.calibration_reference = CalibrationReference {
        input_min: 5.0,
        input_max: 5.0,
        output_min: 0.0,
        output_max: 10.0,
    };

    let err = api.on_inputs_changed(inputs).unwrap_err();
    assert_eq!(err.kind(), "DEGENERATE_CALIBRATION");
    assert!(matches!(api.current(), Err(ApiError::NoResult)));
    assert!(matches!(api.report(), Err(ApiError::NoResult)));
    assert!(matches!(api.export_csv_bytes(), Err(ApiError::NoResult)));
}

#[test]
fn test_preview_then_map() {
    logging::init_test();

    let text = build_csv(Some("Time,Inverter,Meter(W),House"), &sample_rows(3));
    let mut api = DashboardApi::new(0.5, "en");

    let preview = api
        .preview_columns("renamed.csv", text.as_bytes(), &Default::default())
        .expect("预览失败");
    assert_eq!(preview.missing_fields, vec![CanonicalField::Pv, CanonicalField::Load]);
    assert_eq!(preview.candidates, vec!["Inverter", "House"]);
    assert_eq!(preview.head.len(), 3);

    let mut inputs = inputs_for("renamed.csv", &text);
    inputs.mapping_choices = vec![
        (CanonicalField::Pv, "Inverter".to_string()),
        (CanonicalField::Load, "House".to_string()),
    ];
    let out = api.on_inputs_changed(inputs).expect("映射后运行失败");
    assert_eq!(out.records.len(), 3);
}

// ==========================================
// 交互查询
// ==========================================

#[test]
fn test_split_and_filter_queries() {
    logging::init_test();

    let api = ready_api("en");

    match api.split(at(10, 0), at(10, 5)).expect("拆分失败") {
        HarvestGridOutcome::Split(split) => {
            assert_eq!(split.record_count, 2);
            assert!(approx_eq(split.solar_kw, 3.0));
            assert!(approx_eq(split.grid_kw, 0.6));
        }
        other => panic!("应有数据: {:?}", other),
    }
    assert!(api.split(at(10, 10), at(10, 5)).expect("拆分失败").is_empty());

    // Meter 按带符号值筛选，闭区间
    let hits = api.filter(Channel::Meter, -600.0, -400.0).expect("筛选失败");
    assert_eq!(hits.len(), 2);
    assert!(api.filter(Channel::Meter, 400.0, 600.0).expect("筛选失败").is_empty());
    assert!(api.filter(Channel::Pv, 3000.0, 1000.0).expect("筛选失败").is_empty());
    assert!(matches!(
        api.filter(Channel::Pv, f64::NAN, 1.0),
        Err(ApiError::InvalidInput(_))
    ));

    assert_eq!(
        api.default_band(Channel::Pv).expect("查询失败"),
        Some((1000.0, 4000.0))
    );
}

#[test]
fn test_probe_is_independent_of_session() {
    logging::init_test();

    let api = DashboardApi::new(0.5, "en");
    let reference = CalibrationReference {
        input_min: 10.0,
        input_max: 110.0,
        output_min: 0.0,
        output_max: 200.0,
    };
    let result = api.evaluate_probe(&reference, 60.0).expect("试算失败");
    assert!(approx_eq(result, 100.0));

    let degenerate = CalibrationReference {
        input_min: 1.0,
        input_max: 1.0,
        ..reference
    };
    assert_eq!(
        api.evaluate_probe(&degenerate, 1.0).unwrap_err().kind(),
        "DEGENERATE_CALIBRATION"
    );
}

// ==========================================
// 报告与导出
// ==========================================

#[test]
fn test_report_in_english() {
    logging::init_test();

    let report = ready_api("en").report().expect("报告生成失败");
    assert!(report.contains("plant_day.csv"));
    assert!(report.contains("Date: Apr 09, 2025"));
    assert!(report.contains("Valid records: 4 / 4"));
    assert!(report.contains("PV: total 10, min 1, max 4"));
}

#[test]
fn test_report_follows_locale() {
    logging::init_test();

    let mut api = ready_api("zh-CN");
    assert!(api.report().expect("报告生成失败").contains("有效记录: 4 / 4"));

    api.set_locale("en-US");
    assert_eq!(api.locale(), "en");
    assert!(api.changelog().starts_with("Seistrack Power Analysis - Changelog"));
}

#[test]
fn test_export_to_file_and_json() {
    logging::init_test();

    let api = ready_api("en");
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("processed_data.csv");
    api.export_csv_to(&path).expect("导出失败");

    let on_disk = std::fs::read(&path).expect("读取导出文件失败");
    assert_eq!(on_disk, api.export_csv_bytes().expect("导出失败"));

    let json: serde_json::Value =
        serde_json::from_str(&api.output_json().expect("序列化失败")).expect("JSON 无效");
    assert_eq!(json["records"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["summary"]["date_label"], "Apr 09, 2025");
}

// ==========================================
// 配置驱动
// ==========================================

#[test]
fn test_api_from_config_file() {
    logging::init_test();

    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "calibration/input_max": 200,
            "calibration/output_max": 180,
            "dq/interval_tolerance_ratio": 0.2,
            "ui/locale": "en"
        }"#,
    )
    .expect("写入配置失败");

    let config = ConfigManager::from_file(&path)
        .expect("加载配置失败")
        .with_env_prefix("SEISTRACK_DASHBOARD_TEST");
    config.set_config_value(config_keys::CALIBRATION_PROBE_VALUE, "50");

    let mut api = DashboardApi::from_config(&config).expect("创建 API 失败");
    assert_eq!(api.locale(), "en");

    let mut inputs = inputs_for("plant_day.csv", &canonical_csv(4));
    inputs.calibration_reference = config.calibration_reference().expect("读取校准参数失败");
    inputs.probe_value = config.probe_value().expect("读取试算值失败");
    let out = api.on_inputs_changed(inputs).expect("运行失败");

    assert!(approx_eq(out.params.scale, 0.9));
    assert!(approx_eq(out.probe_result, 45.0));
}

#[test]
fn test_invalid_config_value_surfaces_as_config_error() {
    logging::init_test();

    let config = ConfigManager::new().with_env_prefix("SEISTRACK_DASHBOARD_TEST");
    config.set_config_value(config_keys::DQ_INTERVAL_TOLERANCE_RATIO, "-1");

    match DashboardApi::from_config(&config) {
        Err(err) => assert_eq!(err.kind(), "CONFIG_ERROR"),
        Ok(_) => panic!("负容差应被拒绝"),
    }
}
