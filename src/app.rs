//! 交互式终端前端
//!
//! 只消费核心的公开操作：登录、采集、缓存读写。
//! 有缓存时秒级离线展示，没有或刷新时才启动浏览器

use anyhow::Result;
use std::io::Write;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::browser::launch_portal_browser;
use crate::config::Config;
use crate::infrastructure::{ChromiumDriver, PortalDriver};
use crate::models::{CourseInfo, LoginCredentials, SemesterMap};
use crate::services::UserDataCache;
use crate::utils::format::{format_file_size, format_time_ago};
use crate::utils::retry::RetryPolicy;
use crate::workflow::{Authenticator, GradeCollector};

/// 应用主结构
pub struct KouManager {
    config: Config,
    cache: UserDataCache,
    username: String,
    cached_data: Option<SemesterMap>,
}

impl KouManager {
    pub fn new(config: Config) -> Self {
        let cache = UserDataCache::new(&config.data_dir);
        Self {
            config,
            cache,
            username: String::new(),
            cached_data: None,
        }
    }

    /// 应用入口
    pub async fn run(&mut self) -> Result<()> {
        show_banner();

        self.username = prompt_line("学号: ")?;
        if self.username.is_empty() {
            println!("学号不能为空!");
            return Ok(());
        }

        if self.show_cache_panel() {
            println!("离线模式：正在从缓存加载数据...");
            if let Some(data) = self.cache.load(&self.username) {
                println!(
                    "⚡ 数据已加载: {} 个学期, {} 门课程",
                    data.len(),
                    data.total_courses()
                );
                self.cached_data = Some(data);
                return self.main_loop().await;
            }
            println!("缓存加载失败，需要重新采集数据。");
        } else {
            println!("首次使用或缓存缺失，开始采集数据...");
        }

        let credentials = self.ask_credentials()?;
        if self.collect_fresh(&credentials).await {
            println!("数据采集并保存成功！下次启动将直接离线加载。");
            self.main_loop().await
        } else {
            println!("数据采集失败!");
            Ok(())
        }
    }

    /// 主菜单循环
    async fn main_loop(&mut self) -> Result<()> {
        loop {
            println!();
            println!("──── 主菜单 ────");
            println!("1. 当前学期成绩");
            println!("2. 选择学期");
            println!("3. 从服务器刷新数据");
            println!("4. 退出");

            match prompt_line("请选择 (1-4): ")?.as_str() {
                "1" => {
                    let Some(key) = self
                        .cached_data
                        .as_ref()
                        .and_then(|d| d.first_key())
                        .map(|k| k.to_string())
                    else {
                        println!("没有当前学期数据!");
                        continue;
                    };
                    self.display_semester(&key);
                }
                "2" => {
                    if let Some(key) = self.pick_semester()? {
                        self.display_semester(&key);
                    }
                }
                "3" => {
                    if self.refresh().await? {
                        println!("数据刷新成功!");
                    } else {
                        println!("数据刷新失败!");
                    }
                }
                "4" | "q" => break,
                _ => continue,
            }
        }
        Ok(())
    }

    /// 展示缓存概要；返回是否存在可用缓存
    fn show_cache_panel(&self) -> bool {
        if !self.cache.exists(&self.username) {
            return false;
        }
        let Some(info) = self.cache.info(&self.username) else {
            return false;
        };

        println!();
        println!("──── 缓存信息 ────");
        println!("大小: {}", format_file_size(info.file_size));
        println!("学期数: {}", count_or_unknown(info.total_semesters));
        println!("课程数: {}", count_or_unknown(info.total_courses));
        println!("最近更新: {}", format_time_ago(info.last_updated));
        true
    }

    fn ask_credentials(&self) -> Result<LoginCredentials> {
        let password = rpassword::prompt_password("密码: ")?;
        Ok(LoginCredentials::new(self.username.clone(), password))
    }

    /// 启动浏览器完成登录和采集
    ///
    /// 浏览器在所有退出路径上（成功、失败、Ctrl-C）都会被关闭
    async fn collect_fresh(&mut self, credentials: &LoginCredentials) -> bool {
        let driver = match launch_portal_browser(&self.config).await {
            Ok(driver) => driver,
            Err(e) => {
                error!("浏览器启动失败: {}", e);
                return false;
            }
        };

        let result = tokio::select! {
            result = self.collect_with_driver(&driver, credentials) => result,
            _ = tokio::signal::ctrl_c() => {
                warn!("收到中断信号，正在退出...");
                false
            }
        };

        let _ = driver.quit().await;
        result
    }

    async fn collect_with_driver(
        &mut self,
        driver: &ChromiumDriver,
        credentials: &LoginCredentials,
    ) -> bool {
        let authenticator = Authenticator::new(driver, &self.config);
        if !authenticator.login_with_session(credentials).await {
            error!("登录失败!");
            return false;
        }

        let mut collector = GradeCollector::new(driver, &self.config);
        let data = collector.collect_all().await;
        if data.is_empty() {
            error!("未采集到任何数据!");
            return false;
        }

        if !self.cache.save(&credentials.username, &data) {
            error!("数据保存失败!");
            return false;
        }

        self.cached_data = Some(data);
        true
    }

    /// 刷新：重新登录并整体覆盖缓存
    async fn refresh(&mut self) -> Result<bool> {
        if let Some(info) = self.cache.info(&self.username) {
            println!();
            println!("──── 刷新前缓存 ────");
            println!("大小: {}", format_file_size(info.file_size));
            println!("最近更新: {}", format_time_ago(info.last_updated));
        }

        let answer = prompt_line("确定要从服务器刷新数据吗? (e/h): ")?;
        if !matches!(answer.to_lowercase().as_str(), "e" | "y" | "evet") {
            println!("刷新已取消。");
            return Ok(false);
        }

        let credentials = self.ask_credentials()?;

        let policy = RetryPolicy::new(2, Duration::from_secs(1));
        for attempt in policy.attempts() {
            println!("🔄 正在从服务器刷新数据...");
            if self.collect_fresh(&credentials).await {
                return Ok(true);
            }
            if policy.has_next(attempt) {
                warn!("刷新失败，重试中...");
                policy.pause().await;
            }
        }
        Ok(false)
    }

    /// 学期选择菜单
    fn pick_semester(&self) -> Result<Option<String>> {
        let Some(data) = self.cached_data.as_ref() else {
            println!("数据未加载!");
            return Ok(None);
        };

        println!();
        println!("📅 学期选择");
        let entries: Vec<(String, String, usize)> = data
            .iter()
            .map(|(key, sem)| (key.to_string(), sem.semester_name.clone(), sem.courses.len()))
            .collect();
        for (index, (_, name, count)) in entries.iter().enumerate() {
            println!("{}. {} ({} 门课程)", index + 1, name, count);
        }

        let choice = prompt_line(&format!("选择学期 (1-{}): ", entries.len()))?;
        let Ok(n) = choice.parse::<usize>() else {
            return Ok(None);
        };
        if n == 0 || n > entries.len() {
            return Ok(None);
        }
        Ok(Some(entries[n - 1].0.clone()))
    }

    /// 展示一个学期的课程表
    fn display_semester(&self, semester_key: &str) {
        let Some(semester) = self
            .cached_data
            .as_ref()
            .and_then(|d| d.get(semester_key))
        else {
            println!("没有找到该学期的数据!");
            return;
        };

        if semester.courses.is_empty() {
            println!("该学期没有课程!");
            return;
        }

        println!();
        println!("📊 {}", semester.semester_name);
        println!(
            "{:<4} {:<10} {:<32} {:<18} {:>5} {:>5} {:>5} {:>5} {:>5}",
            "No", "代码", "课程名", "教师", "YIO", "YYS", "BUT", "BN", "BD"
        );
        for course in &semester.courses {
            println!(
                "{:<4} {:<10} {:<32} {:<18} {:>5} {:>5} {:>5} {:>5} {:>5}",
                course.sequence,
                course.code,
                truncate(&course.name, 30),
                truncate(&course.instructor, 16),
                grade_or_dash(&course.yio),
                grade_or_dash(&course.yys),
                grade_or_dash(&course.but),
                grade_or_dash(&course.bn),
                grade_or_dash(&course.bd),
            );
        }

        let with_activities: Vec<&CourseInfo> = semester
            .courses
            .iter()
            .filter(|c| !c.activities.is_empty())
            .collect();
        if with_activities.is_empty() {
            return;
        }

        println!();
        println!("💡 {} 门课程有成绩构成明细", with_activities.len());
        if let Ok(answer) = prompt_line("显示成绩构成明细吗? (e/h): ") {
            if matches!(answer.to_lowercase().as_str(), "e" | "y" | "evet") {
                for course in with_activities {
                    self.display_activities(course);
                }
            }
        }
    }

    fn display_activities(&self, course: &CourseInfo) {
        println!();
        print!("{} - {}", course.code, course.name);
        if course.instructor.is_empty() {
            println!();
        } else {
            println!(" ({})", course.instructor);
        }
        println!(
            "  {:<20} {:>8} {:>8} {:>10}",
            "构成项", "分数", "占比", "学期影响"
        );
        for activity in &course.activities {
            println!(
                "  {:<20} {:>8} {:>8} {:>10}",
                activity.activity_type,
                grade_or_dash(&activity.score),
                grade_or_dash(&activity.percentage),
                grade_or_dash(&activity.semester_effect),
            );
        }
    }
}

fn show_banner() {
    info!("⚡ KOU 成绩系统 v{}", env!("CARGO_PKG_VERSION"));
    println!("────────────────────────────");
    println!("⚡ KOU 成绩查询 v{}", env!("CARGO_PKG_VERSION"));
    println!("• 全量成绩采集");
    println!("• 离线秒级访问");
    println!("────────────────────────────");
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn grade_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "—"
    } else {
        value
    }
}

fn count_or_unknown(value: Option<usize>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "—".to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        text.chars().take(max_chars - 3).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
