//! 成绩采集流程测试（假驱动）

mod common;

use common::{FakeDriver, FakeState};
use kou_grade_fetch::config::Config;
use kou_grade_fetch::workflow::GradeCollector;
use serde_json::json;

fn test_config() -> Config {
    Config {
        default_timeout_secs: 1,
        modal_wait_secs: 1,
        ..Config::default()
    }
}

/// 搭好成绩页面的假状态：主页菜单、学期下拉框、课程表格、详情弹窗
fn grades_page_state(config: &Config) -> FakeState {
    let mut state = FakeState::default();
    state.url = config.main_page_url.clone();
    state.set_count("#DersIslemleri", 1);
    state.set_count("a[name='YariyilNotDurumuYeni/DersIslemleri']", 1);
    state.set_count("#Donem", 1);
    state.set_count("#ModalBody", 1);
    state.set_count("a[name='Detay/MAT101']", 1);

    // 学期选项：两个有效 + 空值 + 空标签（后两者必须被过滤）
    state.on_eval(
        "sel.options[i].value",
        json!([
            { "value": "20241", "text": "2024-2025 Güz" },
            { "value": "20242", "text": "2024-2025 Bahar" },
            { "value": "", "text": "Seçiniz" },
            { "value": "20239", "text": "   " },
        ]),
    );
    // 选学期的 change 事件
    state.on_eval("dispatchEvent", json!(true));
    // 两个学期都返回同一张表：一行完整课程（详情键相同）、
    // 一行空代码（丢弃）、一行只有 9 个单元格（丢弃）
    state.on_eval(
        "getElementsByTagName('tr')",
        json!([
            {
                "cells": ["1", "MAT101", "Matematik I\nZorunlu", "Devam", "Türkçe",
                          "6", "80", "90", "", "85", "BA"],
                "detail_key": "Detay/MAT101"
            },
            {
                "cells": ["2", "  ", "Adsız Ders", "Devam", "Türkçe",
                          "6", "80", "90", "", "85", "BA"],
                "detail_key": ""
            },
            {
                "cells": ["3", "FIZ101", "Fizik I", "Devam", "Türkçe", "6", "70", "75", "80"],
                "detail_key": ""
            }
        ]),
    );
    // 详情弹窗内容
    state.on_eval(
        "ModalBody",
        json!({
            "instructor": "Dersin Öğretim Elemanı: Dr. Kemal Demir",
            "activity_rows": [
                ["Vize", "80", "-", "%40", "-", "32"],
                ["Kısa metin"]
            ]
        }),
    );
    state.on_eval("modal('hide')", json!(true));
    state
}

#[tokio::test]
async fn collects_filters_and_memoizes() {
    let config = test_config();
    let driver = FakeDriver::new(grades_page_state(&config));

    let mut collector = GradeCollector::new(&driver, &config);
    let data = collector.collect_all().await;

    // 只有两个有效学期
    assert_eq!(data.len(), 2);
    let keys: Vec<&str> = data.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["20241", "20242"]);

    for (_, semester) in data.iter() {
        // 空代码行和 9 单元格行都被排除
        assert_eq!(semester.courses.len(), 1);
        let course = &semester.courses[0];
        assert_eq!(course.code, "MAT101");
        assert_eq!(course.name, "Matematik I");
        assert_eq!(course.bd, "BA");
        // 详情已补全
        assert_eq!(course.instructor, "Dr. Kemal Demir");
        assert_eq!(course.activities.len(), 1);
        assert_eq!(course.activities[0].activity_type, "Vize");
        assert_eq!(course.activities[0].percentage, "%40");
        assert_eq!(course.activities[0].semester_effect, "32");
    }

    // 两个学期共享同一个详情键：弹窗只提取一次，其余走记忆表
    assert_eq!(driver.eval_count("ModalBody"), 1);
}

#[tokio::test]
async fn navigation_failure_yields_empty_result() {
    let config = test_config();
    // 主页菜单始终不出现
    let mut state = FakeState::default();
    state.url = config.main_page_url.clone();
    let driver = FakeDriver::new(state);

    let mut collector = GradeCollector::new(&driver, &config);
    let data = collector.collect_all().await;

    assert!(data.is_empty());
}

#[tokio::test]
async fn empty_semester_selector_aborts_collection() {
    let config = test_config();
    let mut state = grades_page_state(&config);
    // 下拉框只有占位选项
    state.eval_responses.clear();
    state.on_eval("sel.options[i].value", json!([{ "value": "", "text": "Seçiniz" }]));
    let driver = FakeDriver::new(state);

    let mut collector = GradeCollector::new(&driver, &config);
    let data = collector.collect_all().await;

    assert!(data.is_empty());
}

#[tokio::test]
async fn semester_without_rows_is_skipped() {
    let config = test_config();
    let mut state = grades_page_state(&config);
    // 第二个学期的表格为空：该学期不进结果，循环继续
    for (marker, queue) in state.eval_responses.iter_mut() {
        if marker == "getElementsByTagName('tr')" {
            let table = queue.front().cloned().unwrap();
            queue.clear();
            queue.push_back(table);
            queue.push_back(json!([]));
        }
    }
    let driver = FakeDriver::new(state);

    let mut collector = GradeCollector::new(&driver, &config);
    let data = collector.collect_all().await;

    assert_eq!(data.len(), 1);
    assert_eq!(data.first_key(), Some("20241"));
}

#[tokio::test]
async fn missing_detail_modal_leaves_blanks() {
    let config = test_config();
    let mut state = grades_page_state(&config);
    // 弹窗永远不出现：课程保留，教师和构成留白
    state.set_count("#ModalBody", 0);
    let driver = FakeDriver::new(state);

    let mut collector = GradeCollector::new(&driver, &config);
    let data = collector.collect_all().await;

    assert_eq!(data.len(), 2);
    let course = &data.get("20241").unwrap().courses[0];
    assert_eq!(course.code, "MAT101");
    assert_eq!(course.instructor, "");
    assert!(course.activities.is_empty());
}
