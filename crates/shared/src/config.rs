//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Kafka 配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    pub brokers: String,
    pub consumer_group: String,
    /// 订单事件 topic 名称
    pub topic: String,
    pub auto_offset_reset: String,
    pub session_timeout_ms: u32,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            consumer_group: "order-consumers".to_string(),
            topic: "order_topics".to_string(),
            auto_offset_reset: "earliest".to_string(),
            session_timeout_ms: 6000,
        }
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
    pub metrics_enabled: bool,
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_port: 9090,
        }
    }
}

impl ObservabilityConfig {
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub kafka: KafkaConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 配置目录由 `CONFIG_DIR` 指定（默认 `config`），环境名由 `ORDERS_ENV`
    /// 指定（默认 `development`）。分层规则见 [`AppConfig::load_from`]。
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("ORDERS_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(Path::new(&config_dir), &env, service_name)
    }

    /// 从指定目录加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. 内置默认值（消费组默认等于服务名）
    /// 2. {config_dir}/default.toml
    /// 3. {config_dir}/{environment}.toml
    /// 4. {config_dir}/{service_name}.toml
    /// 5. 环境变量（ORDERS_ 前缀，`__` 分隔层级，如 ORDERS_KAFKA__TOPIC -> kafka.topic）
    pub fn load_from(
        config_dir: &Path,
        environment: &str,
        service_name: &str,
    ) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", environment)?
            .set_default("kafka.consumer_group", service_name)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                File::from(config_dir.join(format!("{environment}.toml"))).required(false),
            )
            .add_source(
                File::from(config_dir.join(format!("{service_name}.toml"))).required(false),
            )
            .add_source(
                Environment::with_prefix("ORDERS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
