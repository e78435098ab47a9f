use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 学期下拉框选项
///
/// 只有 value 和 label 都非空的选项才算有效学期
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SemesterOption {
    pub value: String,
    pub text: String,
}

/// 单项成绩构成（期中、测验等），每行一条
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseActivity {
    pub activity_type: String,
    pub score: String,
    pub percentage: String,
    pub semester_effect: String,
}

/// 一门课程的全部信息
///
/// yio / yys / but / bn 是门户的四个阶段成绩代码，bd 为最终等级。
/// `detail_key` 只在采集过程中用于定位详情弹窗，不持久化。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CourseInfo {
    pub sequence: String,
    pub code: String,
    pub name: String,
    pub attendance: String,
    pub language: String,
    pub ects: String,
    pub yio: String,
    pub yys: String,
    pub but: String,
    pub bn: String,
    pub bd: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub activities: Vec<CourseActivity>,
    #[serde(default)]
    pub semester_average: String,
    #[serde(skip)]
    pub detail_key: String,
}

/// 一个学期的采集结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SemesterData {
    pub semester_name: String,
    pub courses: Vec<CourseInfo>,
}

/// 按学期键组织的全部采集数据
///
/// 门户返回的学期通常按时间倒序排列，第一项即当前学期，
/// 因此必须保持插入顺序。序列化为 JSON 对象时按原顺序写出，
/// 反序列化时按文档顺序还原（自定义 Visitor，见下）。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemesterMap {
    entries: Vec<(String, SemesterData)>,
}

impl SemesterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一个学期；相同键覆盖旧值，位置不变
    pub fn insert(&mut self, key: impl Into<String>, data: SemesterData) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = data;
        } else {
            self.entries.push((key, data));
        }
    }

    pub fn get(&self, key: &str) -> Option<&SemesterData> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// 第一个学期键（即当前学期）
    pub fn first_key(&self) -> Option<&str> {
        self.entries.first().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SemesterData)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 所有学期的课程总数
    pub fn total_courses(&self) -> usize {
        self.entries.iter().map(|(_, d)| d.courses.len()).sum()
    }
}

impl Serialize for SemesterMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SemesterMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SemesterMapVisitor;

        impl<'de> Visitor<'de> for SemesterMapVisitor {
            type Value = SemesterMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of semester key to semester data")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                // MapAccess 按文档顺序产出条目，顺序因此得以保留
                while let Some((key, value)) = access.next_entry::<String, SemesterData>()? {
                    entries.push((key, value));
                }
                Ok(SemesterMap { entries })
            }
        }

        deserializer.deserialize_map(SemesterMapVisitor)
    }
}
