//! 成绩采集流程
//!
//! 登录后的页面是有状态的：选学期、开弹窗都会改变共享 UI，
//! 因此所有浏览器操作严格串行。失败面收敛原则：导航失败整轮
//! 作废；单个学期、单门课程的失败只影响自己。

use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{CollectError, Result};
use crate::infrastructure::{wait_for_element, PortalDriver};
use crate::models::{CourseInfo, SemesterData, SemesterMap, SemesterOption};
use crate::utils::text::TextCache;
use crate::workflow::extract::{
    escape_attr_value, parse_detail, rows_to_courses, select_semester_js, CourseDetail,
    RawCourseDetail, RawCourseRow, COURSE_DETAIL_JS, COURSE_TABLE_JS, DISMISS_MODAL_JS,
    SEMESTER_OPTIONS_JS,
};

/// 元素轮询间隔
const POLL: Duration = Duration::from_millis(300);
/// 点击菜单后的短暂停
const CLICK_SETTLE: Duration = Duration::from_millis(300);
/// AJAX 刷新等待
const AJAX_SETTLE: Duration = Duration::from_millis(1500);
/// 打开弹窗后的短暂停
const MODAL_SETTLE: Duration = Duration::from_millis(300);
/// 关闭弹窗后的短暂停
const DISMISS_SETTLE: Duration = Duration::from_millis(100);

/// 课程操作下拉菜单
const MENU_SELECTOR: &str = "#DersIslemleri";
/// 学期成绩页链接
const GRADES_LINK_SELECTOR: &str = "a[name='YariyilNotDurumuYeni/DersIslemleri']";
/// 学期下拉框
const SEMESTER_SELECT: &str = "#Donem";
/// 旧版布局的成绩容器
const GRADES_CONTAINER: &str = "#AlinanDersler";
/// 课程详情弹窗主体
const MODAL_BODY: &str = "#ModalBody";

/// 成绩采集器
///
/// 详情记忆表按详情键索引并由实例持有：同一门课跨学期共享
/// 详情目标时只提取一次，多个采集器实例互不影响
pub struct GradeCollector<'a, D: PortalDriver + ?Sized> {
    driver: &'a D,
    config: &'a Config,
    detail_cache: HashMap<String, CourseDetail>,
    text_cache: TextCache,
}

impl<'a, D: PortalDriver + ?Sized> GradeCollector<'a, D> {
    pub fn new(driver: &'a D, config: &'a Config) -> Self {
        Self {
            driver,
            config,
            detail_cache: HashMap::new(),
            text_cache: TextCache::new(),
        }
    }

    /// 采集全部学期数据
    ///
    /// 导航失败返回空结果；学期间错误互相隔离
    pub async fn collect_all(&mut self) -> SemesterMap {
        info!("正在采集全部学期数据...");

        if let Err(e) = self.navigate_to_grades().await {
            error!("成绩页面导航失败: {}", e);
            return SemesterMap::new();
        }

        let semesters = match self.available_semesters().await {
            Ok(semesters) if !semesters.is_empty() => semesters,
            Ok(_) => {
                error!("学期列表为空，采集中止");
                return SemesterMap::new();
            }
            Err(e) => {
                error!("学期列表获取失败: {}", e);
                return SemesterMap::new();
            }
        };

        let total = semesters.len();
        let mut all_data = SemesterMap::new();

        for (index, semester) in semesters.iter().enumerate() {
            info!("[{}/{}] 正在处理: {}", index + 1, total, semester.text);

            let mut courses = match self.load_semester_courses(&semester.value).await {
                Ok(courses) => courses,
                Err(e) => {
                    warn!("学期 {} 加载失败，跳过: {}", semester.text, e);
                    continue;
                }
            };

            // 没有课程行的学期不进入结果
            if courses.is_empty() {
                debug!("学期 {} 没有课程行，跳过", semester.text);
                continue;
            }

            self.enrich_details(&mut courses).await;

            all_data.insert(
                semester.value.clone(),
                SemesterData {
                    semester_name: semester.text.clone(),
                    courses,
                },
            );
        }

        info!("共采集 {} 个学期的数据", all_data.len());
        all_data
    }

    /// 从主页进入学期成绩页面
    async fn navigate_to_grades(&self) -> Result<()> {
        debug!("正在导航到成绩页面...");

        let current_url = self.driver.current_url().await.unwrap_or_default();
        if !current_url.contains("AnaGiris.cfm") {
            self.driver.navigate(&self.config.main_page_url).await?;
            tokio::time::sleep(Duration::from_millis(1000)).await;
        }

        let timeout = Duration::from_secs(self.config.default_timeout_secs);

        if !wait_for_element(self.driver, MENU_SELECTOR, timeout, POLL).await {
            return Err(CollectError::navigation(
                self.config.main_page_url.clone(),
                "课程操作菜单未出现",
            ));
        }
        self.driver.click(MENU_SELECTOR).await?;
        tokio::time::sleep(CLICK_SETTLE).await;

        if !wait_for_element(self.driver, GRADES_LINK_SELECTOR, timeout, POLL).await {
            return Err(CollectError::navigation(
                self.config.main_page_url.clone(),
                "学期成绩链接未出现",
            ));
        }
        self.driver.click(GRADES_LINK_SELECTOR).await?;
        tokio::time::sleep(AJAX_SETTLE).await;

        // 门户有两种渲染布局，两个容器出现任意一个即算就绪
        if wait_for_element(self.driver, SEMESTER_SELECT, timeout, POLL).await {
            debug!("成绩页面就绪");
            return Ok(());
        }
        if wait_for_element(self.driver, GRADES_CONTAINER, timeout, POLL).await {
            debug!("成绩区域就绪");
            return Ok(());
        }

        Err(CollectError::navigation(
            self.config.main_page_url.clone(),
            "成绩页面容器未出现",
        ))
    }

    /// 枚举可用学期
    ///
    /// value 和 label 都非空的选项才算有效
    async fn available_semesters(&self) -> Result<Vec<SemesterOption>> {
        if !wait_for_element(self.driver, SEMESTER_SELECT, Duration::from_secs(5), POLL).await {
            return Err(CollectError::extraction("学期下拉框", "元素未出现"));
        }

        let value = self.driver.eval(SEMESTER_OPTIONS_JS).await?;
        let options: Vec<SemesterOption> = serde_json::from_value(value)?;

        Ok(options
            .into_iter()
            .map(|o| SemesterOption {
                value: o.value.trim().to_string(),
                text: o.text.trim().to_string(),
            })
            .filter(|o| !o.value.is_empty() && !o.text.is_empty())
            .collect())
    }

    /// 选中学期并批量提取课程表格
    async fn load_semester_courses(&mut self, semester_value: &str) -> Result<Vec<CourseInfo>> {
        self.driver.eval(&select_semester_js(semester_value)).await?;
        tokio::time::sleep(AJAX_SETTLE).await;

        let value = self.driver.eval(COURSE_TABLE_JS).await?;
        let rows: Vec<RawCourseRow> = serde_json::from_value(value)?;
        let courses = rows_to_courses(rows, &mut self.text_cache);

        debug!("表格解析完成: {} 门课程", courses.len());
        Ok(courses)
    }

    /// 逐门提取课程详情（教师、成绩构成）
    ///
    /// 详情键相同的课程复用记忆表；单门失败只留白，不中断批次。
    /// 弹窗是共享元素，此处绝不并行
    async fn enrich_details(&mut self, courses: &mut [CourseInfo]) {
        let pending = courses.iter().filter(|c| !c.detail_key.is_empty()).count();
        if pending == 0 {
            return;
        }
        debug!("正在提取 {} 门课程的详情...", pending);

        for course in courses.iter_mut() {
            if course.detail_key.is_empty() {
                continue;
            }

            if !self.detail_cache.contains_key(&course.detail_key) {
                let detail = match self.extract_course_detail(&course.detail_key).await {
                    Ok(detail) => detail,
                    Err(e) => {
                        debug!("课程 {} 详情提取失败: {}", course.code, e);
                        CourseDetail::default()
                    }
                };
                self.detail_cache.insert(course.detail_key.clone(), detail);
            }

            let detail = self
                .detail_cache
                .get(&course.detail_key)
                .cloned()
                .unwrap_or_default();
            course.instructor = detail.instructor;
            course.activities = detail.activities;
        }
    }

    /// 打开一门课程的详情弹窗并提取内容
    async fn extract_course_detail(&mut self, detail_key: &str) -> Result<CourseDetail> {
        let link_selector = format!("a[name='{}']", escape_attr_value(detail_key));
        if self.driver.element_count(&link_selector).await? == 0 {
            return Ok(CourseDetail::default());
        }

        self.driver.click(&link_selector).await?;
        tokio::time::sleep(MODAL_SETTLE).await;

        // 详情面板要么很快出现要么基本不存在，等待窗口刻意很短
        let modal_timeout = Duration::from_secs(self.config.modal_wait_secs);
        if !wait_for_element(self.driver, MODAL_BODY, modal_timeout, POLL).await {
            return Ok(CourseDetail::default());
        }

        let value = self.driver.eval(COURSE_DETAIL_JS).await?;
        let raw: Option<RawCourseDetail> = serde_json::from_value(value)?;
        let detail = raw
            .map(|raw| parse_detail(raw, &mut self.text_cache))
            .unwrap_or_default();

        let _ = self.driver.eval(DISMISS_MODAL_JS).await;
        tokio::time::sleep(DISMISS_SETTLE).await;

        Ok(detail)
    }
}
