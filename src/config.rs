use ::config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 防抖窗口默认值 (毫秒)
pub const DEFAULT_DEBOUNCE_MS: u64 = 2000;
/// 条码锁释放延迟默认值 (毫秒)
pub const DEFAULT_LOCK_RELEASE_MS: u64 = 250;
/// 非销售场景下缺省的商品名
pub const DEFAULT_PLACEHOLDER_NAME: &str = "Unknown product";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 连续扫码聚合参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// 同一条码的防抖窗口
    pub debounce_ms: u64,
    /// 插入前获取的条码锁持有时长
    pub lock_release_ms: u64,
    /// 商品名缺失时使用的占位名
    pub placeholder_name: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            lock_release_ms: DEFAULT_LOCK_RELEASE_MS,
            placeholder_name: DEFAULT_PLACEHOLDER_NAME.to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            scan: ScanConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> config/stock-scan.* 文件 (可选) -> STOCK_SCAN__* 环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080_i64)?
            .set_default("scan.debounce_ms", DEFAULT_DEBOUNCE_MS as i64)?
            .set_default("scan.lock_release_ms", DEFAULT_LOCK_RELEASE_MS as i64)?
            .set_default("scan.placeholder_name", DEFAULT_PLACEHOLDER_NAME)?
            .add_source(File::with_name("config/stock-scan").required(false))
            .add_source(
                Environment::with_prefix("STOCK_SCAN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
