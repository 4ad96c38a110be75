use crate::error::ConfigError;
use crate::utils::hours_to_duration;
use std::str::FromStr;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时运行的工作线程数
    pub max_workers: usize,
    /// 单个批次最多允许的文本数
    pub max_batch_size: usize,
    /// 单条文本的处理时限（秒），None 表示不限时
    pub unit_timeout_secs: Option<u64>,
    /// 批次记录保留时长（小时）
    pub reap_max_age_hours: f64,
    /// 待处理 TOML 文件目录
    pub input_folder: String,
    /// 结果 JSON 输出目录
    pub output_folder: String,
    /// TOML 中未指定模式时使用的默认模式
    pub default_mode: String,
    /// 运行期间输出进度的间隔（毫秒）
    pub progress_interval_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_workers: 5,
            max_batch_size: 50,
            unit_timeout_secs: None,
            reap_max_age_hours: 24.0,
            input_folder: "input_toml".to_string(),
            output_folder: "output_json".to_string(),
            default_mode: "balanced".to_string(),
            progress_interval_ms: 500,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置的项使用默认值
    ///
    /// 设置了但无法解析的值会返回错误，而不是静默回退
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        let config = Self {
            max_workers: parse_env("MAX_WORKERS", "usize")?.unwrap_or(default.max_workers),
            max_batch_size: parse_env("MAX_BATCH_SIZE", "usize")?
                .unwrap_or(default.max_batch_size),
            unit_timeout_secs: parse_env("UNIT_TIMEOUT_SECS", "u64")?
                .or(default.unit_timeout_secs),
            reap_max_age_hours: parse_env("REAP_MAX_AGE_HOURS", "f64")?
                .unwrap_or(default.reap_max_age_hours),
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(default.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            default_mode: std::env::var("DEFAULT_MODE").unwrap_or(default.default_mode),
            progress_interval_ms: parse_env("PROGRESS_INTERVAL_MS", "u64")?
                .unwrap_or(default.progress_interval_ms),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        };
        config.validate()?;
        Ok(config)
    }

    /// 检查配置是否合法
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(invalid("max_workers", "至少需要 1 个工作线程"));
        }
        if self.max_batch_size == 0 {
            return Err(invalid("max_batch_size", "批次上限必须大于 0"));
        }
        if hours_to_duration(self.reap_max_age_hours).is_none() {
            return Err(invalid("reap_max_age_hours", "必须是非负数且不能过大"));
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
