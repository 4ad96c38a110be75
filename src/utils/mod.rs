pub mod logging;

pub use logging::truncate_text;

use std::time::Duration;

/// 四舍五入到指定小数位
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// 小时数转成 `Duration`，负数、NaN 或超出 `Duration` 表示范围时返回 None
pub fn hours_to_duration(hours: f64) -> Option<Duration> {
    if hours.is_nan() || hours < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(hours * 3600.0).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_to_duration() {
        assert_eq!(hours_to_duration(0.0), Some(Duration::ZERO));
        assert_eq!(hours_to_duration(1.5), Some(Duration::from_secs(5400)));
        assert_eq!(hours_to_duration(-1.0), None);
        assert_eq!(hours_to_duration(f64::NAN), None);
        assert_eq!(hours_to_duration(f64::INFINITY), None);
        assert_eq!(hours_to_duration(1e20), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(33.333_333, 1), 33.3);
        assert_eq!(round_to(66.666_666, 2), 66.67);
        assert_eq!(round_to(0.0, 2), 0.0);
    }
}
