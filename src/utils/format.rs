//! 展示格式化辅助函数

/// 文件大小格式化（B / KB / MB）
pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes < 1024 {
        format!("{}B", size_bytes)
    } else if size_bytes < 1024 * 1024 {
        format!("{:.1}KB", size_bytes as f64 / 1024.0)
    } else {
        format!("{:.1}MB", size_bytes as f64 / (1024.0 * 1024.0))
    }
}

/// 把 epoch 秒时间戳格式化为"多久之前"
pub fn format_time_ago(timestamp: Option<f64>) -> String {
    let Some(timestamp) = timestamp else {
        return "未知".to_string();
    };

    let now = chrono::Local::now().timestamp() as f64;
    let diff = now - timestamp;
    if diff < 0.0 {
        return "未知".to_string();
    }

    if diff < 60.0 {
        format!("{} 秒前", diff as u64)
    } else if diff < 3600.0 {
        format!("{} 分钟前", (diff / 60.0) as u64)
    } else if diff < 86400.0 {
        format!("{} 小时前", (diff / 3600.0) as u64)
    } else {
        format!("{} 天前", (diff / 86400.0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_size_units() {
        assert_eq!(format_file_size(512), "512B");
        assert_eq!(format_file_size(2048), "2.0KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.0MB");
    }

    #[test]
    fn time_ago_buckets() {
        let now = chrono::Local::now().timestamp() as f64;
        assert!(format_time_ago(Some(now - 5.0)).ends_with("秒前"));
        assert!(format_time_ago(Some(now - 120.0)).ends_with("分钟前"));
        assert!(format_time_ago(Some(now - 7200.0)).ends_with("小时前"));
        assert!(format_time_ago(Some(now - 200_000.0)).ends_with("天前"));
        assert_eq!(format_time_ago(None), "未知");
    }
}
