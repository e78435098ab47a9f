//! 页面数据提取
//!
//! 表格和弹窗内容都靠一次性批量 JS 求值拿回来，避免逐单元格的
//! 协议往返；JS 只负责原样搬运文本，字段定位和清洗在 Rust 侧完成

use serde::Deserialize;

use crate::models::{CourseActivity, CourseInfo};
use crate::utils::text::TextCache;

/// 课程行最少单元格数，不足的不是课程行
pub const MIN_COURSE_CELLS: usize = 11;

/// 成绩构成行最少子列数
pub const MIN_ACTIVITY_COLUMNS: usize = 6;

/// 弹窗里教师姓名横幅的固定前缀
pub const INSTRUCTOR_PREFIX: &str = "Dersin Öğretim Elemanı:";

/// 读取学期下拉框全部选项
pub const SEMESTER_OPTIONS_JS: &str = r#"
(function () {
    var sel = document.getElementById('Donem');
    if (!sel) return [];
    var out = [];
    for (var i = 0; i < sel.options.length; i++) {
        out.push({ value: sel.options[i].value, text: sel.options[i].textContent });
    }
    return out;
})()
"#;

/// 批量提取课程表格所有行
///
/// 门户有两种布局，按顺序尝试多个选择器，取第一个行数超过表头的表格
pub const COURSE_TABLE_JS: &str = r#"
(function () {
    var selectors = ["table.table.table-condensed", "table[border='1']", "div#AlinanDersler table", "table"];
    var table = null;
    for (var s = 0; s < selectors.length && !table; s++) {
        var candidates = document.querySelectorAll(selectors[s]);
        for (var i = 0; i < candidates.length; i++) {
            if (candidates[i].getElementsByTagName('tr').length > 1) {
                table = candidates[i];
                break;
            }
        }
    }
    if (!table) return [];
    var rows = table.getElementsByTagName('tr');
    var data = [];
    for (var r = 1; r < rows.length; r++) {
        var cells = rows[r].getElementsByTagName('td');
        var texts = [];
        for (var c = 0; c < cells.length; c++) texts.push(cells[c].textContent);
        var link = cells.length > 2 ? cells[2].querySelector('a') : null;
        data.push({ cells: texts, detail_key: link ? (link.getAttribute('name') || '') : '' });
    }
    return data;
})()
"#;

/// 提取详情弹窗内容（教师横幅 + 成绩构成行）
pub const COURSE_DETAIL_JS: &str = r#"
(function () {
    var modal = document.getElementById('ModalBody');
    if (!modal) return null;
    var out = { instructor: '', activity_rows: [] };
    var banner = modal.querySelector('h4.alert.alert-info');
    if (banner) out.instructor = banner.textContent;
    var rows = modal.querySelectorAll('div.bg-warning');
    for (var i = 0; i < rows.length; i++) {
        var cols = rows[i].querySelectorAll("div[class*='col-lg-']");
        var texts = [];
        for (var c = 0; c < cols.length; c++) texts.push(cols[c].textContent);
        out.activity_rows.push(texts);
    }
    return out;
})()
"#;

/// 关闭详情弹窗
pub const DISMISS_MODAL_JS: &str =
    "(function () { try { $('#Modal').modal('hide'); } catch (e) {} return true; })()";

/// 选中指定学期并触发 AJAX 刷新
pub fn select_semester_js(value: &str) -> String {
    format!(
        r#"
(function () {{
    var sel = document.getElementById('Donem');
    if (!sel) return false;
    sel.value = '{}';
    sel.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return true;
}})()
"#,
        escape_attr_value(value)
    )
}

/// 转义嵌入单引号字符串 / 属性选择器的值
pub fn escape_attr_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// JS 搬回来的原始课程行
#[derive(Debug, Clone, Deserialize)]
pub struct RawCourseRow {
    #[serde(default)]
    pub cells: Vec<String>,
    #[serde(default)]
    pub detail_key: String,
}

/// JS 搬回来的原始弹窗内容
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCourseDetail {
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub activity_rows: Vec<Vec<String>>,
}

/// 一门课程的详情提取结果
#[derive(Debug, Clone, Default)]
pub struct CourseDetail {
    pub instructor: String,
    pub activities: Vec<CourseActivity>,
}

/// 原始行转课程记录
///
/// 不足 11 个单元格的行不算课程行；清洗后代码或名称为空的
/// 记录整条丢弃（结构完整性过滤）
pub fn rows_to_courses(rows: Vec<RawCourseRow>, text_cache: &mut TextCache) -> Vec<CourseInfo> {
    let mut courses = Vec::new();

    for row in rows {
        if row.cells.len() < MIN_COURSE_CELLS {
            continue;
        }

        // 名称单元格的首行才是课程名，后面的行是门户附加的角标
        let name_line = row.cells[2].split('\n').next().unwrap_or("");

        let course = CourseInfo {
            sequence: text_cache.clean(&row.cells[0]),
            code: text_cache.clean(&row.cells[1]),
            name: text_cache.clean(name_line),
            attendance: text_cache.clean(&row.cells[3]),
            language: text_cache.clean(&row.cells[4]),
            ects: text_cache.clean(&row.cells[5]),
            yio: text_cache.clean(&row.cells[6]),
            yys: text_cache.clean(&row.cells[7]),
            but: text_cache.clean(&row.cells[8]),
            bn: text_cache.clean(&row.cells[9]),
            bd: text_cache.clean(&row.cells[10]),
            detail_key: row.detail_key,
            ..Default::default()
        };

        if course.code.is_empty() || course.name.is_empty() {
            continue;
        }
        courses.push(course);
    }

    courses
}

/// 原始弹窗内容转详情
///
/// 教师横幅必须带固定前缀才算数；子列不足 6 个的构成行丢弃，
/// 分数 / 占比 / 学期影响按固定列偏移取值
pub fn parse_detail(raw: RawCourseDetail, text_cache: &mut TextCache) -> CourseDetail {
    let banner = text_cache.clean(&raw.instructor);
    let instructor = if banner.contains(INSTRUCTOR_PREFIX) {
        banner.replace(INSTRUCTOR_PREFIX, "").trim().to_string()
    } else {
        String::new()
    };

    let mut activities = Vec::new();
    for cols in raw.activity_rows {
        if cols.len() < MIN_ACTIVITY_COLUMNS {
            continue;
        }
        activities.push(CourseActivity {
            activity_type: text_cache.clean(&cols[0]),
            score: text_cache.clean(&cols[1]),
            percentage: text_cache.clean(&cols[3]),
            semester_effect: text_cache.clean(&cols[5]),
        });
    }

    CourseDetail {
        instructor,
        activities,
    }
}
