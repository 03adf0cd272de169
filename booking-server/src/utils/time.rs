//! 时间工具函数：业务时区转换
//!
//! 日期/时刻 → 时间戳的转换只在 API handler 层和创建时段时完成，
//! 订单与时段状态机只接收 `i64` Unix millis。

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析时刻字符串 (HH:MM 或 HH:MM:SS)
pub fn parse_time(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| AppError::validation(format!("Invalid time format: {}", time)))
}

/// 日期 + 时刻 → Unix millis (业务时区)
///
/// 夏令时跳跃中不存在的本地时间返回 `None`；重复的本地时间取较晚的一次。
pub fn local_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<i64> {
    date.and_time(time)
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
}

/// 今天 (业务时区)
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// 校验日期区间: from <= to 且跨度不超过 `max_days`
pub fn validate_range(from: NaiveDate, to: NaiveDate, max_days: i64) -> AppResult<()> {
    if from > to {
        return Err(AppError::validation(format!(
            "Range start {} is after end {}",
            from, to
        )));
    }
    let span = (to - from).num_days() + 1;
    if span > max_days {
        return Err(AppError::validation(format!(
            "Range of {} days exceeds the maximum of {}",
            span, max_days
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(
            parse_time("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("09:30:15").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 15).unwrap()
        );
        assert!(parse_time("9h30").is_err());
    }

    #[test]
    fn test_local_to_millis_applies_offset() {
        let date = parse_date("2026-01-15").unwrap();
        let time = parse_time("10:00").unwrap();
        let utc = local_to_millis(date, time, chrono_tz::UTC).unwrap();
        let madrid = local_to_millis(date, time, chrono_tz::Europe::Madrid).unwrap();
        // Madrid is UTC+1 in January
        assert_eq!(utc - madrid, 3_600_000);
    }

    #[test]
    fn test_dst_gap_has_no_instant() {
        // 02:30 does not exist in Madrid on 2026-03-29
        let date = parse_date("2026-03-29").unwrap();
        let time = parse_time("02:30").unwrap();
        let madrid = chrono_tz::Europe::Madrid;
        assert_eq!(local_to_millis(date, time, madrid), None);
        assert!(local_to_millis(date, parse_time("03:00").unwrap(), madrid).is_some());
    }

    #[test]
    fn test_validate_range() {
        let d = |s| parse_date(s).unwrap();
        assert!(validate_range(d("2026-03-01"), d("2026-03-01"), 1).is_ok());
        assert!(validate_range(d("2026-03-01"), d("2026-03-02"), 1).is_err());
        assert!(validate_range(d("2026-03-05"), d("2026-03-01"), 62).is_err());
    }
}
