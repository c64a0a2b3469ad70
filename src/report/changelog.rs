// ==========================================
// 光伏功率分析系统 - 版本记录
// ==========================================
// 职责: 生成可下载的静态版本记录文本
// 规则: 与数据管道无关，同一语言下内容逐字节固定
// ==========================================

use crate::i18n::t_in;
use crate::report::error::ReportResult;
use std::path::Path;

/// 默认文件名
pub const CHANGELOG_FILE_NAME: &str = "changelog.txt";

/// 版本记录文本
pub fn changelog_text(locale: &str) -> String {
    format!(
        "{}\n\n{}",
        t_in(locale, "changelog.title", &[]),
        t_in(locale, "changelog.body", &[])
    )
}

/// 写出版本记录文件
pub fn write_changelog<P: AsRef<Path>>(path: P, locale: &str) -> ReportResult<()> {
    std::fs::write(path, changelog_text(locale))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changelog_is_static() {
        assert_eq!(changelog_text("en"), changelog_text("en"));
        assert!(changelog_text("en").starts_with("Seistrack Power Analysis - Changelog"));
        assert!(changelog_text("zh-CN").contains("processed_data.csv"));
    }

    #[test]
    fn test_changelog_keeps_version_history() {
        let text = changelog_text("en");
        let first = text.find("Version 1.0").unwrap();
        let calibration = text.find("Version 3: calibration").unwrap();
        let latest = text.find("Version 4.0").unwrap();
        assert!(first < calibration && calibration < latest);
        assert!(changelog_text("zh-CN").contains("版本 1.9"));
    }

    #[test]
    fn test_write_changelog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CHANGELOG_FILE_NAME);
        write_changelog(&path, "en").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), changelog_text("en"));
    }
}
