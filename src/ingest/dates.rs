use crate::error::LoadError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc, Weekday};
use chrono_tz::Tz;

/// 依次尝试的日期格式, 歧义时统一按"日在前"约定
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// 宽松解析日期字符串, 带时间的只保留日期部分; 解析失败返回 None
pub fn parse_date_flexible(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// 最近一个已完成的营业日: 周一回退到上周五, 其余回退一天
pub fn previous_business_day(today: NaiveDate) -> NaiveDate {
    let back = if today.weekday() == Weekday::Mon { 3 } else { 1 };
    today - Duration::days(back)
}

/// 统计日期: 显式覆盖优先, 否则按时区取"今天"再回推.
///
/// 覆盖值解析失败是致命错误; 未知时区同样在此处拦下.
pub fn determine_stats_date(
    date_str: Option<&str>,
    tz_name: Option<&str>,
) -> Result<NaiveDate, LoadError> {
    if let Some(raw) = date_str {
        return parse_date_flexible(raw).ok_or_else(|| LoadError::DateParse(raw.to_string()));
    }
    let today = match tz_name {
        Some(name) => {
            let tz: Tz = name
                .parse()
                .map_err(|_| LoadError::Config(format!("unknown time zone '{name}'")))?;
            Utc::now().with_timezone(&tz).date_naive()
        }
        None => chrono::Local::now().date_naive(),
    };
    Ok(previous_business_day(today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monday_rolls_back_to_friday() {
        // 2024-05-13 是周一
        assert_eq!(previous_business_day(date(2024, 5, 13)), date(2024, 5, 10));
    }

    #[test]
    fn other_weekdays_roll_back_one_day() {
        for day in 14..=19 {
            // 周二到周日
            assert_eq!(
                previous_business_day(date(2024, 5, day)),
                date(2024, 5, day - 1)
            );
        }
    }

    #[test]
    fn explicit_override_takes_precedence() {
        let got = determine_stats_date(Some("2024-05-13"), Some("Europe/Moscow")).unwrap();
        // 周一的覆盖值不走回退规则
        assert_eq!(got, date(2024, 5, 13));
    }

    #[test]
    fn day_first_formats_parse() {
        assert_eq!(parse_date_flexible("10.05.2024"), Some(date(2024, 5, 10)));
        assert_eq!(parse_date_flexible("10/05/2024"), Some(date(2024, 5, 10)));
        assert_eq!(parse_date_flexible("10-05-2024"), Some(date(2024, 5, 10)));
    }

    #[test]
    fn datetime_strings_keep_only_date() {
        assert_eq!(
            parse_date_flexible("2024-05-10 15:30:00"),
            Some(date(2024, 5, 10))
        );
        assert_eq!(
            parse_date_flexible("10.05.2024 15:30"),
            Some(date(2024, 5, 10))
        );
        assert_eq!(
            parse_date_flexible("2024-05-10T15:30:00+03:00"),
            Some(date(2024, 5, 10))
        );
    }

    #[test]
    fn garbage_is_none_and_fatal_as_override() {
        assert_eq!(parse_date_flexible("not-a-date"), None);
        let err = determine_stats_date(Some("not-a-date"), None).unwrap_err();
        assert!(matches!(err, LoadError::DateParse(_)));
    }

    #[test]
    fn unknown_time_zone_is_config_error() {
        let err = determine_stats_date(None, Some("Mars/Olympus")).unwrap_err();
        assert!(matches!(err, LoadError::Config(_)));
    }
}
